use crate::{BranchError, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use zip::ZipArchive;

/// Capability: unpack archive `archive` into directory `dest`.
///
/// Called from a blocking worker thread.
pub trait ArchiveExtractor: Send + Sync {
    fn extract(&self, archive: &Path, dest: &Path) -> Result<()>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ZipExtractor;

impl ArchiveExtractor for ZipExtractor {
    fn extract(&self, archive: &Path, dest: &Path) -> Result<()> {
        let file = File::open(archive)?;
        let mut zip = ZipArchive::new(BufReader::new(file))
            .map_err(|err| BranchError::Archive(format!("open {}: {err}", archive.display())))?;
        let entries = zip.len();
        zip.extract(dest).map_err(|err| {
            BranchError::Archive(format!(
                "extract {} into {}: {err}",
                archive.display(),
                dest.display()
            ))
        })?;
        log::info!(
            "Extracted {entries} entries from {} into {}",
            archive.display(),
            dest.display()
        );
        Ok(())
    }
}
