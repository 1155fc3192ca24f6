use crate::history::unquote;
use crate::{BranchError, BranchRegistry, Result};
use symsync_symbols::{symbol_index_path, SeenHashes, Symbol, STAGING_DIR_NAME};

/// Separator between name and hash in the store's index records.
const NAME_HASH_SEPARATOR: char = '\\';

/// Raw fields of one index record before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry<'a> {
    pub name: &'a str,
    pub hash: &'a str,
    pub path: &'a str,
}

/// Parses `"<name>\<hash>","<path>"`.
pub fn parse_index_line(line: &str) -> Option<IndexEntry<'_>> {
    let (key, path) = line.split_once(',')?;
    let mut parts = unquote(key).split(NAME_HASH_SEPARATOR);
    let (Some(name), Some(hash), None) = (parts.next(), parts.next(), parts.next()) else {
        return None;
    };
    Some(IndexEntry {
        name,
        hash,
        path: unquote(path),
    })
}

/// Drops everything up to and including the staging directory marker.
pub fn trim_staging_prefix(path: &str) -> &str {
    match path.find(STAGING_DIR_NAME) {
        Some(idx) => &path[idx + STAGING_DIR_NAME.len()..],
        None => path,
    }
}

impl BranchRegistry {
    /// Reads the index file of `build_id` and hands every unique,
    /// non-excluded symbol to `handler`.
    ///
    /// Uniqueness is by hash within this call. The count includes a symbol
    /// the handler rejected; the failure comes back as
    /// [`BranchError::Interrupted`].
    pub async fn parse_symbols<F>(&self, build_id: &str, mut handler: F) -> Result<usize>
    where
        F: FnMut(Symbol) -> Result<()>,
    {
        let Some(build) = self.get_build("", build_id) else {
            log::error!("Build {build_id} does not exist for {}", self.name());
            return Err(BranchError::BuildNotExist(build_id.to_string()));
        };

        let paths = self.paths()?;
        let path = symbol_index_path(&paths.store, build_id);
        let bytes = tokio::fs::read(&path).await.map_err(|err| {
            log::error!("Open symbol index {} failed: {err}", path.display());
            BranchError::from(err)
        })?;
        let text = String::from_utf8_lossy(&bytes);

        let mut seen = SeenHashes::new();
        let mut total = 0;
        for line in text.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let Some(entry) = parse_index_line(line) else {
                log::warn!("Invalid line ({line}) in symbol index {build_id}");
                continue;
            };
            if self.classifier.is_excluded(entry.name) {
                continue;
            }
            if !seen.insert(entry.hash) {
                continue;
            }

            let path = trim_staging_prefix(entry.path);
            let symbol = Symbol {
                name: entry.name.to_string(),
                hash: entry.hash.to_string(),
                path: path.to_string(),
                arch: self.classifier.detect_architecture(path),
                version: build.version.clone(),
            };
            total += 1;
            if let Err(err) = handler(symbol) {
                return Err(BranchError::interrupted(total, err));
            }
        }
        Ok(total)
    }

    /// Parses the symbols of `build_id` and keeps them for [`BranchRegistry::get_symbol`].
    pub async fn load_symbols(&self, build_id: &str) -> Result<Vec<Symbol>> {
        let mut symbols = Vec::new();
        self.parse_symbols(build_id, |symbol| {
            symbols.push(symbol);
            Ok(())
        })
        .await?;
        self.retain_symbols(&symbols);
        Ok(symbols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_the_documented_record() {
        let line = r#""cbt_client.pdb\8E3868FEE1FA4AC8A42D0FACA65E0BE41","S:\script\temp\000Unzip\x64\cbt_client.pdb""#;
        let entry = parse_index_line(line).expect("entry");
        assert_eq!(
            entry,
            IndexEntry {
                name: "cbt_client.pdb",
                hash: "8E3868FEE1FA4AC8A42D0FACA65E0BE41",
                path: r"S:\script\temp\000Unzip\x64\cbt_client.pdb",
            }
        );
        assert_eq!(trim_staging_prefix(entry.path), r"\x64\cbt_client.pdb");
    }

    #[test]
    fn key_must_split_into_name_and_hash() {
        assert!(parse_index_line(r#""cbt_client.pdb","S:\a.pdb""#).is_none());
        assert!(parse_index_line(r#""a\b\c","S:\a.pdb""#).is_none());
        assert!(parse_index_line(r#""a.pdb\HASH""#).is_none());
    }

    #[test]
    fn paths_without_marker_are_kept() {
        assert_eq!(trim_staging_prefix(r"C:\out\a.pdb"), r"C:\out\a.pdb");
    }
}
