//! Catalog search client
//!
//! POSTs the derived [`SearchQuery`] as JSON and returns raw candidates in catalog order.
//! Failures are reported once; the session never retries on its own.

use crate::models::{RawCandidate, SearchQuery};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Catalog client errors
#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Catalog API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Catalog search seam
#[async_trait]
pub trait CatalogSearch: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<RawCandidate>, CatalogError>;
}

/// reqwest-backed catalog client
pub struct CatalogClient {
    http_client: reqwest::Client,
    endpoint: String,
}

impl CatalogClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, CatalogError> {
        let http_client = reqwest::Client::builder()
            .user_agent(super::USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CatalogSearch for CatalogClient {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<RawCandidate>, CatalogError> {
        debug!(endpoint = %self.endpoint, ?query, "Querying catalog");

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(query)
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CatalogError::Api(status.as_u16(), error_text));
        }

        let candidates: Vec<RawCandidate> = response
            .json()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))?;

        info!(count = candidates.len(), "Catalog returned candidates");
        Ok(candidates)
    }
}
