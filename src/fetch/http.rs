//! # HTTP Fetcher
//!
//! `GET {base_url}{identifier}` with an `Authorization` header, using a shared
//! reqwest client so connections are pooled across a window.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::credentials::{CredentialSource, StaticCredential};
use super::outcome::{classify_status, FetchOutcome, StatusClass};
use super::Fetcher;
use crate::config::FetchConfig;
use crate::error::{BatchFetchError, FetchError, Result};

/// Configuration for the HTTP fetcher
#[derive(Debug, Clone)]
pub struct HttpFetcherConfig {
    /// The identifier is appended verbatim to this address
    pub base_url: String,
    pub timeout: Duration,
    pub credentials: Arc<dyn CredentialSource>,
}

impl HttpFetcherConfig {
    pub fn from_fetch_config(config: &FetchConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            timeout: config.request_timeout(),
            credentials: Arc::new(StaticCredential::new(config.auth_token.clone())),
        }
    }
}

/// reqwest-backed [`Fetcher`]
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    config: HttpFetcherConfig,
}

impl HttpFetcher {
    pub fn new(config: HttpFetcherConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(format!("batchfetch/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                BatchFetchError::HttpClient(format!("Failed to create HTTP client: {}", e))
            })?;

        debug!(
            base_url = %config.base_url,
            timeout_ms = config.timeout.as_millis() as u64,
            "Created HTTP fetcher"
        );

        Ok(Self { client, config })
    }

    pub fn url_for(&self, identifier: &str) -> String {
        format!("{}{}", self.config.base_url, identifier)
    }

    fn classify_transport_error(&self, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout(self.config.timeout)
        } else {
            FetchError::Transport(error.to_string())
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, identifier: &str) -> FetchOutcome {
        let url = self.url_for(identifier);
        let mut request = self.client.get(&url);
        if let Some(credential) = self.config.credentials.credential_for(identifier) {
            request = request.header(AUTHORIZATION, credential);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return FetchOutcome::Failed(self.classify_transport_error(e)),
        };

        let status = response.status().as_u16();
        match classify_status(status) {
            StatusClass::Success => match response.bytes().await {
                Ok(bytes) => match String::from_utf8(bytes.to_vec()) {
                    Ok(body) => FetchOutcome::Success(body),
                    Err(e) => FetchOutcome::Failed(FetchError::BodyRead(format!(
                        "body is not valid UTF-8: {e}"
                    ))),
                },
                Err(e) if e.is_timeout() => {
                    FetchOutcome::Failed(FetchError::Timeout(self.config.timeout))
                }
                Err(e) => FetchOutcome::Failed(FetchError::BodyRead(e.to_string())),
            },
            StatusClass::RateLimited => FetchOutcome::RateLimited,
            StatusClass::Unexpected => {
                FetchOutcome::Failed(FetchError::UnexpectedStatus { status })
            }
        }
    }
}
