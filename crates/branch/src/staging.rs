use crate::Result;
use std::path::{Path, PathBuf};

/// Staging directory that is removed when dropped, on every exit path.
pub(crate) struct StagingDir {
    path: PathBuf,
}

impl StagingDir {
    /// Creates `path` empty, discarding leftovers from an interrupted run.
    pub(crate) async fn create(path: PathBuf) -> Result<Self> {
        match tokio::fs::remove_dir_all(&path).await {
            Ok(()) => log::warn!("Removed stale staging directory {}", path.display()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }
        tokio::fs::create_dir_all(&path).await?;
        Ok(Self { path })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StagingDir {
    fn drop(&mut self) {
        match std::fs::remove_dir_all(&self.path) {
            Ok(()) => log::debug!("Removed staging directory {}", self.path.display()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => log::warn!(
                "Failed to remove staging directory {}: {err}",
                self.path.display()
            ),
        }
    }
}
