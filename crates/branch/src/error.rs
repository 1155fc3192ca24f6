use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BranchError>;

#[derive(Error, Debug)]
pub enum BranchError {
    #[error("build {0} does not exist")]
    BuildNotExist(String),

    #[error("branch {0} is not initialized")]
    BranchNotInitialized(String),

    #[error("invalid branch path on symbol store: {}", .0.display())]
    InvalidStorePath(PathBuf),

    #[error("invalid branch path on build server: {}", .0.display())]
    InvalidBuildServerPath(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("failed to launch symbol store tool: {0}")]
    ToolLaunch(String),

    #[error("symbol store tool exited with {status}: {output}")]
    ToolFailed { status: String, output: String },

    #[error("symbol store tool did not assign a build id ({})", .0.display())]
    MissingBuildId(PathBuf),

    #[error("operation cancelled")]
    Cancelled,

    /// Raised by parse callbacks to stop a pass.
    #[error("{0}")]
    Handler(String),

    #[error("stopped after {parsed} records: {source}")]
    Interrupted {
        parsed: usize,
        #[source]
        source: Box<BranchError>,
    },

    #[error("{0}")]
    Other(String),
}

impl BranchError {
    /// True for a missing file, e.g. no snapshot yet on first run.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io(err) if err.kind() == std::io::ErrorKind::NotFound)
    }

    /// Records delivered before a callback stopped the pass.
    pub fn parsed(&self) -> Option<usize> {
        match self {
            Self::Interrupted { parsed, .. } => Some(*parsed),
            _ => None,
        }
    }

    pub(crate) fn interrupted(parsed: usize, source: BranchError) -> Self {
        Self::Interrupted {
            parsed,
            source: Box::new(source),
        }
    }
}
