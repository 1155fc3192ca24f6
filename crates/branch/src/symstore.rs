use crate::{BranchError, Result};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Arguments for one `add` transaction against the symbol store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreRequest {
    pub store_path: PathBuf,
    /// Product name recorded by the store, the branch's store name.
    pub product: String,
    pub version: String,
    pub comment: String,
    /// Directory holding the extracted symbol tree.
    pub symbols: PathBuf,
}

impl StoreRequest {
    /// `add /r /f <symbols> /s <store> /t <product> /v <version> /c <comment>`
    pub fn args(&self) -> Vec<OsString> {
        vec![
            "add".into(),
            "/r".into(),
            "/f".into(),
            self.symbols.clone().into_os_string(),
            "/s".into(),
            self.store_path.clone().into_os_string(),
            "/t".into(),
            self.product.clone().into(),
            "/v".into(),
            self.version.clone().into(),
            "/c".into(),
            self.comment.clone().into(),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Combined stdout and stderr, kept for diagnostics only.
    pub output: String,
    pub elapsed: Duration,
}

/// External tool that commits a symbol tree into the store.
///
/// On success the tool is expected to have written the store's last id file.
#[async_trait]
pub trait SymbolStoreTool: Send + Sync {
    async fn add(&self, request: &StoreRequest, cancel: &CancellationToken) -> Result<ToolOutput>;
}

/// Runs the store executable as a child process.
#[derive(Debug, Clone)]
pub struct SymStoreCommand {
    exe: PathBuf,
}

impl SymStoreCommand {
    pub fn new(exe: impl Into<PathBuf>) -> Self {
        Self { exe: exe.into() }
    }
}

#[async_trait]
impl SymbolStoreTool for SymStoreCommand {
    async fn add(&self, request: &StoreRequest, cancel: &CancellationToken) -> Result<ToolOutput> {
        let start = Instant::now();
        let mut command = tokio::process::Command::new(&self.exe);
        command
            .args(request.args())
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(BranchError::Cancelled),
            output = command.output() => output.map_err(|err| {
                BranchError::ToolLaunch(format!("{}: {err}", self.exe.display()))
            })?,
        };

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        if !output.status.success() {
            return Err(BranchError::ToolFailed {
                status: output.status.to_string(),
                output: combined,
            });
        }
        Ok(ToolOutput {
            output: combined,
            elapsed: start.elapsed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn request() -> StoreRequest {
        StoreRequest {
            store_path: PathBuf::from("S:/SymbolServer/Titanium"),
            product: "Titanium".to_string(),
            version: "4175.2-538".to_string(),
            comment: "2017-07-04_14:44:14".to_string(),
            symbols: PathBuf::from("S:/SymbolServer/Titanium/000Unzip"),
        }
    }

    #[test]
    fn args_follow_symstore_add_syntax() {
        let args: Vec<String> = request()
            .args()
            .into_iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            vec![
                "add",
                "/r",
                "/f",
                "S:/SymbolServer/Titanium/000Unzip",
                "/s",
                "S:/SymbolServer/Titanium",
                "/t",
                "Titanium",
                "/v",
                "4175.2-538",
                "/c",
                "2017-07-04_14:44:14",
            ]
        );
    }

    #[tokio::test]
    async fn missing_executable_is_a_launch_error() {
        let tool = SymStoreCommand::new("/definitely/not/a/symstore.exe");
        let err = tool
            .add(&request(), &CancellationToken::new())
            .await
            .expect_err("launch");
        assert!(matches!(err, BranchError::ToolLaunch(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_is_a_tool_failure() {
        let tool = SymStoreCommand::new("false");
        let err = tool
            .add(&request(), &CancellationToken::new())
            .await
            .expect_err("exit status");
        assert!(matches!(err, BranchError::ToolFailed { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn zero_exit_is_success() {
        let tool = SymStoreCommand::new("true");
        tool.add(&request(), &CancellationToken::new())
            .await
            .expect("success");
    }

    #[tokio::test]
    async fn cancelled_before_start() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let tool = SymStoreCommand::new("/definitely/not/a/symstore.exe");
        let err = tool.add(&request(), &cancel).await.expect_err("cancelled");
        assert!(matches!(err, BranchError::Cancelled));
    }
}
