use std::path::{Path, PathBuf};

/// Administrative directory; its presence marks a valid store root.
pub const ADMIN_DIR_NAME: &str = "000Admin";
/// Staging directory an archive is extracted into during one sync.
pub const STAGING_DIR_NAME: &str = "000Unzip";

/// Last build id assigned by the store tool.
pub const LAST_ID_FILE_NAME: &str = "lastid.txt";
/// Build history written by the store tool.
pub const HISTORY_LOG_FILE_NAME: &str = "server.txt";
pub const BRANCH_SNAPSHOT_FILE_NAME: &str = "branch.json";

#[must_use]
pub fn admin_dir(store: &Path) -> PathBuf {
    store.join(ADMIN_DIR_NAME)
}

#[must_use]
pub fn staging_dir(store: &Path) -> PathBuf {
    store.join(STAGING_DIR_NAME)
}

#[must_use]
pub fn last_id_path(store: &Path) -> PathBuf {
    admin_dir(store).join(LAST_ID_FILE_NAME)
}

#[must_use]
pub fn history_log_path(store: &Path) -> PathBuf {
    admin_dir(store).join(HISTORY_LOG_FILE_NAME)
}

#[must_use]
pub fn branch_snapshot_path(store: &Path) -> PathBuf {
    admin_dir(store).join(BRANCH_SNAPSHOT_FILE_NAME)
}

/// Per-build index file, named after the build id.
#[must_use]
pub fn symbol_index_path(store: &Path, build_id: &str) -> PathBuf {
    admin_dir(store).join(build_id)
}

/// Local copy of the build server's "latest build" pointer.
#[must_use]
pub fn local_pointer_path(store: &Path, pointer_file: &str) -> PathBuf {
    admin_dir(store).join(pointer_file)
}

/// Published symbol file: `<store>/<name>/<hash>/<name>`.
#[must_use]
pub fn symbol_file_path(store: &Path, hash: &str, name: &str) -> PathBuf {
    store.join(name).join(hash).join(name)
}
