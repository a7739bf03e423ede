//! Random identifier fixtures for exercising a deployment end to end.

use std::path::Path;
use uuid::Uuid;

use crate::error::Result;

/// `count` distinct identifiers in UUID v4 simple (32 hex digit) form
pub fn generate_identifiers(count: usize) -> Vec<String> {
    (0..count)
        .map(|_| Uuid::new_v4().simple().to_string())
        .collect()
}

/// Write identifiers joined by `delimiter`, readable by [`super::read_identifiers`]
pub async fn write_identifiers(path: &Path, ids: &[String], delimiter: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, ids.join(delimiter)).await?;
    Ok(())
}
