use crate::archive::{ArchiveExtractor, ZipExtractor};
use crate::branch::{
    default_build_path, default_store_path, read_branch_snapshot, write_branch_snapshot, Branch,
};
use crate::pointer::{read_pointer, write_pointer};
use crate::symstore::{SymStoreCommand, SymbolStoreTool};
use crate::{BranchError, Result, SyncConfig};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Arc;
use symsync_symbols::{
    admin_dir, branch_snapshot_path, last_id_path, local_pointer_path, symbol_file_path, Build,
    Symbol, SymbolClassifier,
};

/// In-memory registry of one branch's builds and symbols.
///
/// Builds are keyed by their zero-padded id, so iteration is chronological.
/// The lock guards map mutation only and is never held across I/O.
pub struct BranchRegistry {
    pub(crate) config: Arc<SyncConfig>,
    pub(crate) classifier: SymbolClassifier,
    pub(crate) tool: Arc<dyn SymbolStoreTool>,
    pub(crate) extractor: Arc<dyn ArchiveExtractor>,
    state: RwLock<RegistryState>,
}

struct RegistryState {
    branch: Branch,
    builds: BTreeMap<String, Build>,
    symbols: HashMap<String, Symbol>,
}

/// Resolved locations of an initialized branch.
#[derive(Debug, Clone)]
pub(crate) struct BranchPaths {
    pub name: String,
    pub store: PathBuf,
    pub build: PathBuf,
}

impl BranchRegistry {
    /// Call [`BranchRegistry::load`] afterwards to pick up a persisted snapshot.
    pub fn new(
        build_name: impl Into<String>,
        store_name: impl Into<String>,
        config: Arc<SyncConfig>,
    ) -> Self {
        Self::from_branch(Branch::new(build_name, store_name), config)
    }

    pub fn from_branch(branch: Branch, config: Arc<SyncConfig>) -> Self {
        let branch = branch.with_default_paths(&config);
        let classifier = config.classifier();
        let tool: Arc<dyn SymbolStoreTool> =
            Arc::new(SymStoreCommand::new(config.symstore_exe.clone()));
        Self {
            classifier,
            tool,
            extractor: Arc::new(ZipExtractor),
            state: RwLock::new(RegistryState {
                branch,
                builds: BTreeMap::new(),
                symbols: HashMap::new(),
            }),
            config,
        }
    }

    #[must_use]
    pub fn with_tool(mut self, tool: Arc<dyn SymbolStoreTool>) -> Self {
        self.tool = tool;
        self
    }

    #[must_use]
    pub fn with_extractor(mut self, extractor: Arc<dyn ArchiveExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Name of the branch in the symbol store.
    pub fn name(&self) -> String {
        self.state.read().branch.store_name.clone()
    }

    pub fn branch(&self) -> Branch {
        self.state.read().branch.clone()
    }

    pub fn builds_count(&self) -> u64 {
        self.state.read().branch.builds_count
    }

    pub(crate) fn paths(&self) -> Result<BranchPaths> {
        let state = self.state.read();
        let branch = &state.branch;
        if branch.store_path.as_os_str().is_empty() || branch.build_path.as_os_str().is_empty() {
            let name = if branch.store_name.is_empty() {
                branch.build_name.clone()
            } else {
                branch.store_name.clone()
            };
            return Err(BranchError::BranchNotInitialized(name));
        }
        Ok(BranchPaths {
            name: branch.store_name.clone(),
            store: branch.store_path.clone(),
            build: branch.build_path.clone(),
        })
    }

    /// True when the local store has an administrative directory.
    pub fn can_browse(&self) -> bool {
        let Ok(paths) = self.paths() else {
            return false;
        };
        let admin = admin_dir(&paths.store);
        if admin.is_dir() {
            return true;
        }
        log::trace!("Access symbol path {} failed", admin.display());
        false
    }

    /// True when the build server publishes a latest build pointer.
    pub fn can_update(&self) -> bool {
        let Ok(paths) = self.paths() else {
            return false;
        };
        let pointer = paths.build.join(&self.config.latest_build_file);
        if pointer.is_file() {
            return true;
        }
        log::trace!("Access build path {} failed", pointer.display());
        false
    }

    /// Re-roots the branch under the configured destination and build source.
    ///
    /// Empty subpaths fall back to the branch names. The store's admin
    /// directory is created; the build server path must already exist.
    pub async fn set_subpath(&self, build_server: &str, local_store: &str) -> Result<()> {
        let (build_name, store_name) = {
            let state = self.state.read();
            (state.branch.build_name.clone(), state.branch.store_name.clone())
        };

        let store = if local_store.is_empty() {
            default_store_path(&self.config, &store_name)
        } else {
            self.config.destination.join(local_store)
        };
        if let Err(err) = tokio::fs::create_dir_all(admin_dir(&store)).await {
            log::error!(
                "Init symbol store path {} for {store_name} failed: {err}",
                store.display()
            );
            return Err(BranchError::InvalidStorePath(store));
        }

        let build = if build_server.is_empty() {
            default_build_path(&self.config, &build_name)
        } else {
            self.config.build_source.join(build_server)
        };

        {
            let mut state = self.state.write();
            state.branch.store_path = store;
            state.branch.build_path = build.clone();
        }

        if !build.exists() {
            log::error!("Invalid build server path {} for {store_name}", build.display());
            return Err(BranchError::InvalidBuildServerPath(build));
        }
        Ok(())
    }

    /// Full path of a published symbol file.
    pub fn symbol_path(&self, hash: &str, name: &str) -> PathBuf {
        let store = self.state.read().branch.store_path.clone();
        symbol_file_path(&store, hash, name)
    }

    /// Saves the branch record (not its builds or symbols).
    pub async fn persist(&self) -> Result<()> {
        let paths = self.paths()?;
        let branch = self.branch();
        let path = branch_snapshot_path(&paths.store);
        log::trace!("Save branch {branch:?}");
        write_branch_snapshot(&path, &branch).await.map_err(|err| {
            log::error!("Persist branch {} failed: {err}", paths.name);
            err
        })
    }

    /// Replaces the branch record with the persisted snapshot.
    ///
    /// A missing snapshot is expected on first run and is not logged;
    /// check [`BranchError::is_not_found`].
    pub async fn load(&self) -> Result<()> {
        let paths = self.paths()?;
        let branch = read_branch_snapshot(&branch_snapshot_path(&paths.store)).await?;
        self.state.write().branch = branch;
        Ok(())
    }

    /// Removes the snapshot; build history and store content are untouched.
    pub async fn delete(&self) -> Result<()> {
        let paths = self.paths()?;
        log::info!("Delete branch {:?}", self.branch());
        tokio::fs::remove_file(branch_snapshot_path(&paths.store)).await?;
        Ok(())
    }

    /// Reads the local or build server "latest build" pointer.
    pub async fn read_latest_build(&self, local: bool) -> Result<String> {
        let paths = self.paths()?;
        let path = if local {
            local_pointer_path(&paths.store, &self.config.latest_build_file)
        } else {
            paths.build.join(&self.config.latest_build_file)
        };
        read_pointer(&path).await
    }

    pub async fn update_latest_build(&self, version: &str) -> Result<()> {
        let paths = self.paths()?;
        let path = local_pointer_path(&paths.store, &self.config.latest_build_file);
        write_pointer(&path, version).await.map_err(|err| {
            log::error!(
                "Write local latest build {} failed: {err}",
                path.display()
            );
            err
        })
    }

    /// Last build id assigned by the store tool, or empty when unknown.
    pub async fn latest_id(&self) -> String {
        let Ok(paths) = self.paths() else {
            return String::new();
        };
        let path = last_id_path(&paths.store);
        match read_pointer(&path).await {
            Ok(id) => id,
            Err(err) => {
                log::error!("Read latest build id {} failed: {err}", path.display());
                String::new()
            }
        }
    }

    /// Looks a build up by version first, then by id. Empty keys are ignored.
    pub fn get_build(&self, version: &str, id: &str) -> Option<Build> {
        let state = self.state.read();
        if !version.is_empty() {
            if let Some(build) = state.builds.values().find(|b| b.version == version) {
                return Some(build.clone());
            }
        }
        if !id.is_empty() {
            return state.builds.get(id).cloned();
        }
        None
    }

    /// In-memory builds in id order.
    pub fn builds(&self) -> Vec<Build> {
        self.state.read().builds.values().cloned().collect()
    }

    pub(crate) fn has_builds(&self) -> bool {
        !self.state.read().builds.is_empty()
    }

    /// Inserts or replaces a build by id and makes it the latest one.
    ///
    /// The count only grows for ids not seen before.
    pub(crate) fn commit_build(&self, build: Build) {
        let mut state = self.state.write();
        state.branch.update_date = build.date.clone();
        state.branch.latest_build = build.version.clone();
        if state.builds.insert(build.id.clone(), build).is_none() {
            state.branch.builds_count += 1;
        }
    }

    /// Runs `f` on the build count; used to re-derive it from history.
    pub(crate) fn with_builds_count<T>(&self, f: impl FnOnce(&mut u64) -> T) -> T {
        f(&mut self.state.write().branch.builds_count)
    }

    pub(crate) fn retain_symbols(&self, symbols: &[Symbol]) {
        let mut state = self.state.write();
        for symbol in symbols {
            state
                .symbols
                .insert(symbol.hash.clone(), symbol.clone());
        }
    }

    pub fn get_symbol(&self, hash: &str) -> Option<Symbol> {
        self.state.read().symbols.get(hash).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn build(id: &str, version: &str) -> Build {
        Build {
            id: id.to_string(),
            date: "2017-07-04 14:44:14".to_string(),
            branch: "Titanium".to_string(),
            version: version.to_string(),
            comment: String::new(),
        }
    }

    fn registry() -> BranchRegistry {
        let config = SyncConfig {
            destination: PathBuf::from("/symbols"),
            build_source: PathBuf::from("/builds"),
            ..SyncConfig::default()
        };
        BranchRegistry::new("UDP", "Titanium", Arc::new(config))
    }

    #[test]
    fn commit_replaces_by_id_and_counts_new_ids_only() {
        let registry = registry();
        registry.commit_build(build("0000000001", "1.0"));
        registry.commit_build(build("0000000002", "1.1"));
        registry.commit_build(build("0000000002", "1.2"));

        assert_eq!(registry.builds_count(), 2);
        assert_eq!(registry.branch().latest_build, "1.2");
        assert!(registry.get_build("1.1", "").is_none());
        assert_eq!(
            registry.get_build("", "0000000002").map(|b| b.version),
            Some("1.2".to_string())
        );
    }

    #[test]
    fn builds_iterate_in_id_order() {
        let registry = registry();
        registry.commit_build(build("0000000010", "c"));
        registry.commit_build(build("0000000002", "a"));
        registry.commit_build(build("0000000005", "b"));

        let versions: Vec<String> = registry.builds().into_iter().map(|b| b.version).collect();
        assert_eq!(versions, vec!["a", "b", "c"]);
    }

    #[test]
    fn lookup_prefers_version_then_id() {
        let registry = registry();
        registry.commit_build(build("0000000001", "0000000002"));
        registry.commit_build(build("0000000002", "2.0"));

        let found = registry.get_build("0000000002", "0000000002").expect("build");
        assert_eq!(found.id, "0000000001");
        assert!(registry.get_build("", "").is_none());
    }

    #[test]
    fn unnamed_branch_is_not_initialized() {
        let registry = BranchRegistry::from_branch(Branch::default(), Arc::default());
        assert!(matches!(
            registry.paths(),
            Err(BranchError::BranchNotInitialized(_))
        ));
        assert!(!registry.can_browse());
        assert!(!registry.can_update());
    }

    #[test]
    fn symbol_path_is_under_store() {
        assert_eq!(
            registry().symbol_path("ABC1", "foo.pdb"),
            PathBuf::from("/symbols/Titanium/foo.pdb/ABC1/foo.pdb")
        );
    }
}
