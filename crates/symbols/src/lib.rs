//! # Symbol Sync: symbols
//!
//! Data model and pure logic shared by the branch engine.
//!
//! ## Layout
//!
//! ```text
//! <store>
//!     │
//!     ├──> 000Admin/         (marks a valid store root)
//!     │      ├─> server.txt  (build history log)
//!     │      ├─> lastid.txt  (last assigned build id)
//!     │      └─> 0000000042  (per-build symbol index)
//!     │
//!     ├──> 000Unzip/         (staging, exists only during a sync)
//!     │
//!     └──> <name>/<hash>/<name>
//! ```

mod classifier;
mod dedup;
mod layout;
mod types;

pub use classifier::{detect_architecture, SymbolClassifier, X64_MARKERS};
pub use dedup::SeenHashes;
pub use layout::{
    admin_dir, branch_snapshot_path, history_log_path, last_id_path, local_pointer_path,
    staging_dir, symbol_file_path, symbol_index_path, ADMIN_DIR_NAME, BRANCH_SNAPSHOT_FILE_NAME,
    HISTORY_LOG_FILE_NAME, LAST_ID_FILE_NAME, STAGING_DIR_NAME,
};
pub use types::{Arch, Build, Symbol};
