use serde::{Deserialize, Serialize};
use std::fmt;

/// CPU architecture a symbol was built for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Arch {
    #[default]
    X86,
    X64,
}

impl Arch {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::X86 => "x86",
            Self::X64 => "x64",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One committed publication of a branch's symbols.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Build {
    /// Store-assigned identifier, zero padded (`0000000001`).
    pub id: String,
    /// Commit time, `YYYY-MM-DD HH:MM:SS` when it could be parsed.
    pub date: String,
    pub branch: String,
    /// Version string from the build server.
    pub version: String,
    pub comment: String,
}

/// One debug symbol file belonging to a build.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    /// Content fingerprint; the store's unique key.
    pub hash: String,
    /// Path relative to the staging root the build was published from.
    pub path: String,
    pub arch: Arch,
    /// Version of the owning build.
    pub version: String,
}
