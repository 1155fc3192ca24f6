//! # Symbol Sync: branch
//!
//! Tracks the symbol publications of one product branch and keeps the
//! symbol store in step with the build server.
//!
//! ## Pipeline
//!
//! ```text
//! Build server
//!     │
//!     ├──> latest build pointer (changed?)
//!     │
//!     ├──> Build<version>/debug.zip ──> 000Unzip (staging)
//!     │      └─> extracted symbol tree
//!     │
//!     ├──> symbol store tool (add)
//!     │      └─> lastid.txt, server.txt, per-build index
//!     │
//!     └──> BranchRegistry (builds, symbols)
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use symsync_branch::{BranchRegistry, SyncConfig};
//!
//! #[tokio::main]
//! async fn main() -> symsync_branch::Result<()> {
//!     let config = Arc::new(SyncConfig::load("symsync.toml".as_ref()).await?);
//!     let branch = BranchRegistry::new("UDPv6.5U2", "Titanium", config);
//!     if let Err(err) = branch.load().await {
//!         if !err.is_not_found() {
//!             return Err(err);
//!         }
//!     }
//!
//!     let outcome = branch.add_build("").await?;
//!     branch.persist().await?;
//!     println!("{outcome:?}");
//!     Ok(())
//! }
//! ```

mod archive;
mod branch;
mod config;
mod error;
mod history;
mod index;
mod pointer;
mod registry;
mod staging;
mod symstore;
mod sync;

pub use archive::{ArchiveExtractor, ZipExtractor};
pub use branch::{Branch, BRANCH_SNAPSHOT_SCHEMA_VERSION};
pub use config::{
    SyncConfig, DEFAULT_LATEST_BUILD_FILE, DEFAULT_SYMBOL_ARCHIVE, DEFAULT_SYMSTORE_EXE,
};
pub use error::{BranchError, Result};
pub use history::parse_history_line;
pub use index::{parse_index_line, trim_staging_prefix, IndexEntry};
pub use registry::BranchRegistry;
pub use symstore::{StoreRequest, SymStoreCommand, SymbolStoreTool, ToolOutput};
pub use sync::SyncOutcome;

pub use symsync_symbols::{Arch, Build, Symbol};
pub use tokio_util::sync::CancellationToken;
