use crate::Result;
use std::path::Path;

/// Reads the first line of a pointer file, trimmed of spaces and line breaks.
pub(crate) async fn read_pointer(path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path).await?;
    let text = String::from_utf8_lossy(&bytes);
    let first = text.split('\n').next().unwrap_or_default();
    Ok(first.trim_matches(|c| c == ' ' || c == '\r' || c == '\n').to_string())
}

pub(crate) async fn write_pointer(path: &Path, value: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, value.as_bytes()).await?;
    Ok(())
}
