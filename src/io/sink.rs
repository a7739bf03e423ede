//! # Result and Metadata Sinks
//!
//! Results are written as `{"result": [{"Id": .., "Response": ..}]}` sorted by
//! identifier, metadata as pretty-printed [`RunMetadata`]. Parent directories are
//! created on demand.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

use crate::engine::RunMetadata;
use crate::error::Result;

/// One identifier and its payload in the result document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Response")]
    pub response: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultDocument {
    pub result: Vec<ResultRecord>,
}

impl ResultDocument {
    pub fn from_results(results: &HashMap<String, String>) -> Self {
        let mut result: Vec<ResultRecord> = results
            .iter()
            .map(|(id, response)| ResultRecord {
                id: id.clone(),
                response: response.clone(),
            })
            .collect();
        result.sort_by(|a, b| a.id.cmp(&b.id));
        Self { result }
    }
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let body = serde_json::to_vec_pretty(value)?;
    tokio::fs::write(path, body).await?;
    Ok(())
}

pub async fn write_results(path: &Path, results: &HashMap<String, String>) -> Result<()> {
    let document = ResultDocument::from_results(results);
    write_json(path, &document).await?;
    info!(path = %path.display(), records = document.result.len(), "Wrote results");
    Ok(())
}

pub async fn write_metadata(path: &Path, metadata: &RunMetadata) -> Result<()> {
    write_json(path, metadata).await?;
    info!(path = %path.display(), "Wrote run metadata");
    Ok(())
}
