use crate::{Result, SyncConfig};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const BRANCH_SNAPSHOT_SCHEMA_VERSION: u32 = 1;

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Identity and configuration of one product branch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Branch {
    /// Branch name on the build server.
    pub build_name: String,
    /// Branch name in the symbol store, also passed to the store tool.
    pub store_name: String,
    pub store_path: PathBuf,
    pub build_path: PathBuf,
    /// Version of the last build published to the store.
    #[serde(default)]
    pub latest_build: String,
    #[serde(default)]
    pub builds_count: u64,
    #[serde(default)]
    pub update_date: String,
}

impl Branch {
    pub fn new(build_name: impl Into<String>, store_name: impl Into<String>) -> Self {
        Self {
            build_name: build_name.into(),
            store_name: store_name.into(),
            update_date: Local::now().format(DATE_FORMAT).to_string(),
            ..Self::default()
        }
    }

    /// Fills empty paths from the configured roots.
    #[must_use]
    pub fn with_default_paths(mut self, config: &SyncConfig) -> Self {
        if self.store_path.as_os_str().is_empty() && !self.store_name.is_empty() {
            self.store_path = default_store_path(config, &self.store_name);
        }
        if self.build_path.as_os_str().is_empty() && !self.build_name.is_empty() {
            self.build_path = default_build_path(config, &self.build_name);
        }
        self
    }
}

pub(crate) fn default_store_path(config: &SyncConfig, store_name: &str) -> PathBuf {
    config.destination.join(store_name)
}

pub(crate) fn default_build_path(config: &SyncConfig, build_name: &str) -> PathBuf {
    config.build_source.join(build_name).join("Release")
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedBranch {
    schema_version: u32,
    branch: Branch,
}

pub(crate) async fn write_branch_snapshot(path: &Path, branch: &Branch) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let persisted = PersistedBranch {
        schema_version: BRANCH_SNAPSHOT_SCHEMA_VERSION,
        branch: branch.clone(),
    };
    let bytes = serde_json::to_vec_pretty(&persisted)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

pub(crate) async fn read_branch_snapshot(path: &Path) -> Result<Branch> {
    let bytes = tokio::fs::read(path).await?;
    let persisted: PersistedBranch = serde_json::from_slice(&bytes)?;
    Ok(persisted.branch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config() -> SyncConfig {
        SyncConfig {
            destination: PathBuf::from("/symbols"),
            build_source: PathBuf::from("/builds"),
            ..SyncConfig::default()
        }
    }

    #[test]
    fn default_paths_come_from_config_roots() {
        let branch = Branch::new("UDPv6.5U2", "Titanium").with_default_paths(&config());
        assert_eq!(branch.store_path, PathBuf::from("/symbols/Titanium"));
        assert_eq!(
            branch.build_path,
            PathBuf::from("/builds/UDPv6.5U2/Release")
        );
    }

    #[test]
    fn explicit_paths_are_kept() {
        let branch = Branch {
            store_path: PathBuf::from("/elsewhere"),
            ..Branch::new("b", "s")
        }
        .with_default_paths(&config());
        assert_eq!(branch.store_path, PathBuf::from("/elsewhere"));
        assert_eq!(branch.build_path, PathBuf::from("/builds/b/Release"));
    }

    #[test]
    fn unnamed_branch_keeps_empty_paths() {
        let branch = Branch::default().with_default_paths(&config());
        assert!(branch.store_path.as_os_str().is_empty());
        assert!(branch.build_path.as_os_str().is_empty());
    }

    #[tokio::test]
    async fn snapshot_round_trips() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let path = dir.path().join("000Admin").join("branch.json");
        let branch = Branch {
            latest_build: "4175.2-538".to_string(),
            builds_count: 3,
            ..Branch::new("b", "s").with_default_paths(&config())
        };

        write_branch_snapshot(&path, &branch).await.expect("write");
        assert!(!path.with_extension("json.tmp").exists());
        let loaded = read_branch_snapshot(&path).await.expect("read");
        assert_eq!(loaded, branch);
    }
}
