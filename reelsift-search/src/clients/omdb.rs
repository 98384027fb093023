//! OMDb metadata provider client
//!
//! One `GET ?i=<externalId>&apikey=<key>` per movie. Only `Poster`, `Rated` and `Plot`
//! are consumed. A non-2xx status or an OMDb `"Response": "False"` body fails that
//! single lookup; callers decide how failures aggregate.

use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use serde::Deserialize;
use std::num::NonZeroU32;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Metadata provider errors (per lookup)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Provider API error {0}: {1}")]
    Api(u16, String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Display metadata supplied by the provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProviderMetadata {
    #[serde(rename = "Poster")]
    pub poster: Option<String>,
    #[serde(rename = "Rated")]
    pub rated: Option<String>,
    #[serde(rename = "Plot")]
    pub plot: Option<String>,
}

/// OMDb envelope; metadata fields are flattened beside the status flag
#[derive(Debug, Deserialize)]
struct OmdbResponse {
    #[serde(rename = "Response")]
    response: Option<String>,
    #[serde(rename = "Error")]
    error: Option<String>,
    #[serde(flatten)]
    metadata: ProviderMetadata,
}

/// Per-movie metadata lookup seam
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    async fn lookup(&self, external_id: &str) -> Result<ProviderMetadata, ProviderError>;
}

type DirectLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// reqwest-backed OMDb client
pub struct OmdbClient {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: String,
    /// Absent unless a per-second ceiling is configured
    rate_limiter: Option<DirectLimiter>,
}

impl OmdbClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let http_client = reqwest::Client::builder()
            .user_agent(super::USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            rate_limiter: None,
        })
    }

    /// Cap outbound lookups at `per_second`; `None` or zero leaves the client unthrottled
    pub fn with_rate_limit(mut self, per_second: Option<u32>) -> Self {
        self.rate_limiter = per_second
            .and_then(NonZeroU32::new)
            .map(|rate| RateLimiter::direct(Quota::per_second(rate)));
        self
    }

    pub fn is_rate_limited(&self) -> bool {
        self.rate_limiter.is_some()
    }
}

#[async_trait]
impl MetadataProvider for OmdbClient {
    async fn lookup(&self, external_id: &str) -> Result<ProviderMetadata, ProviderError> {
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        debug!(external_id = %external_id, "Querying metadata provider");

        let response = self
            .http_client
            .get(&self.endpoint)
            .query(&[("i", external_id), ("apikey", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api(status.as_u16(), error_text));
        }

        let body: OmdbResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        if body.response.as_deref() == Some("False") {
            return Err(ProviderError::NotFound(format!(
                "{}: {}",
                external_id,
                body.error.unwrap_or_else(|| "unknown error".to_string())
            )));
        }

        Ok(body.metadata)
    }
}
