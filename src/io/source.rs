//! Identifier source: a delimited text file.

use std::path::Path;
use tracing::debug;

use crate::error::{BatchFetchError, Result};

/// Split `text` on `delimiter`, trimming each token and dropping empty ones.
pub fn parse_identifiers(text: &str, delimiter: &str) -> Vec<String> {
    text.split(delimiter)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read and parse the identifier file. A file with no identifiers is an error.
pub async fn read_identifiers(path: &Path, delimiter: &str) -> Result<Vec<String>> {
    let text = tokio::fs::read_to_string(path).await?;
    let ids = parse_identifiers(&text, delimiter);

    if ids.is_empty() {
        return Err(BatchFetchError::EmptySource(path.display().to_string()));
    }

    debug!(path = %path.display(), count = ids.len(), "Read identifiers");
    Ok(ids)
}
