use crate::{BranchError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use symsync_symbols::SymbolClassifier;

pub const DEFAULT_LATEST_BUILD_FILE: &str = "latestbuild.txt";
pub const DEFAULT_SYMBOL_ARCHIVE: &str = "debug.zip";
pub const DEFAULT_SYMSTORE_EXE: &str = "symstore.exe";

/// Static settings shared by every branch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SyncConfig {
    /// Root directory holding one symbol store per branch.
    pub destination: PathBuf,
    /// Root of the build server share.
    pub build_source: PathBuf,
    /// Name of the "latest build" pointer file on both sides.
    pub latest_build_file: String,
    /// Archive file inside each `Build<version>` directory.
    pub symbol_archive: String,
    pub symstore_exe: PathBuf,
    /// Symbol names never published, compared case-insensitively.
    pub exclude: Vec<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            destination: PathBuf::new(),
            build_source: PathBuf::new(),
            latest_build_file: DEFAULT_LATEST_BUILD_FILE.to_string(),
            symbol_archive: DEFAULT_SYMBOL_ARCHIVE.to_string(),
            symstore_exe: PathBuf::from(DEFAULT_SYMSTORE_EXE),
            exclude: Vec::new(),
        }
    }
}

impl SyncConfig {
    pub async fn load(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path).await.map_err(|err| {
            BranchError::Config(format!("read config {}: {err}", path.display()))
        })?;
        Self::from_toml(&text)
            .map_err(|err| BranchError::Config(format!("parse config {}: {err}", path.display())))
    }

    pub fn from_toml(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn classifier(&self) -> SymbolClassifier {
        SymbolClassifier::new(&self.exclude)
    }
}
