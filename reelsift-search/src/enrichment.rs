//! Enrichment fan-out
//!
//! Upgrades each [`RawCandidate`] into an [`EnrichedMovie`] through one metadata lookup
//! per candidate. All lookups of a batch are issued concurrently and the batch settles
//! once every lookup has resolved. Each lookup settles independently; how failures
//! aggregate is decided by [`EnrichmentPolicy`].

use crate::clients::{MetadataProvider, ProviderError, ProviderMetadata};
use crate::error::DiscoverError;
use crate::models::{EnrichedMovie, RawCandidate};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub use reelsift_common::config::EnrichmentPolicy;

const EXTERNAL_ID_PREFIX: &str = "tt";
const EXTERNAL_ID_DIGITS: usize = 7;

/// Canonical external identifier: `tt` + id zero-padded to 7 characters
///
/// Longer ids are kept whole. An id that already carries the prefix is padded the same way.
pub fn derive_external_id(id: &str) -> String {
    let id = id.trim();
    let digits = id.strip_prefix(EXTERNAL_ID_PREFIX).unwrap_or(id);
    format!(
        "{}{:0>width$}",
        EXTERNAL_ID_PREFIX,
        digits,
        width = EXTERNAL_ID_DIGITS
    )
}

/// Combine catalog fields with provider metadata
///
/// Title, year and genres come from the catalog; poster and plot from the provider.
/// The provider's rating wins, falling back to the catalog's when omitted.
pub fn merge(candidate: RawCandidate, external_id: String, metadata: ProviderMetadata) -> EnrichedMovie {
    let genres = candidate
        .genres
        .split('|')
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(str::to_string)
        .collect();

    EnrichedMovie {
        external_id,
        title: candidate.title,
        genres,
        year: candidate.year,
        rated: metadata.rated.unwrap_or(candidate.rated),
        poster_url: metadata.poster.unwrap_or_default(),
        plot: metadata.plot.unwrap_or_default(),
    }
}

/// A lookup that did not produce a movie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentFailure {
    pub external_id: String,
    pub reason: String,
}

/// Settled batch: enriched movies plus per-item failures
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichmentReport {
    pub movies: Vec<EnrichedMovie>,
    pub failures: Vec<EnrichmentFailure>,
}

impl EnrichmentReport {
    pub fn failed_ids(&self) -> Vec<String> {
        self.failures.iter().map(|f| f.external_id.clone()).collect()
    }
}

/// Concurrent per-candidate enrichment
#[derive(Clone)]
pub struct Enricher {
    provider: Arc<dyn MetadataProvider>,
    policy: EnrichmentPolicy,
}

impl Enricher {
    pub fn new(provider: Arc<dyn MetadataProvider>, policy: EnrichmentPolicy) -> Self {
        Self { provider, policy }
    }

    pub fn policy(&self) -> EnrichmentPolicy {
        self.policy
    }

    /// Enrich a whole batch
    ///
    /// Candidates sharing an external id collapse onto the first one, so each id is looked
    /// up once and appears at most once in the result.
    ///
    /// # Errors
    /// `EnrichmentFailed` when the policy is all-or-nothing and any lookup failed, or
    /// under either policy when every lookup of a non-empty batch failed.
    pub async fn enrich(
        &self,
        candidates: Vec<RawCandidate>,
    ) -> Result<EnrichmentReport, DiscoverError> {
        let mut seen = HashSet::with_capacity(candidates.len());
        let unique: Vec<(String, RawCandidate)> = candidates
            .into_iter()
            .filter_map(|candidate| {
                let external_id = derive_external_id(&candidate.id);
                if seen.insert(external_id.clone()) {
                    Some((external_id, candidate))
                } else {
                    debug!(external_id = %external_id, "Dropping duplicate candidate");
                    None
                }
            })
            .collect();

        let lookups = unique.into_iter().map(|(external_id, candidate)| {
            let provider = Arc::clone(&self.provider);
            async move {
                let outcome = provider.lookup(&external_id).await;
                (external_id, candidate, outcome)
            }
        });

        let mut report = EnrichmentReport::default();
        for (external_id, candidate, outcome) in join_all(lookups).await {
            match outcome {
                Ok(metadata) => report.movies.push(merge(candidate, external_id, metadata)),
                Err(e) => {
                    warn!(
                        external_id = %external_id,
                        error = %e,
                        "Metadata lookup failed"
                    );
                    report.failures.push(failure(external_id, &e));
                }
            }
        }

        // A batch with nothing enriched fails under either policy
        let nothing_enriched = report.movies.is_empty();
        if !report.failures.is_empty()
            && (self.policy == EnrichmentPolicy::AllOrNothing || nothing_enriched)
        {
            return Err(DiscoverError::EnrichmentFailed {
                failures: report.failures,
            });
        }

        info!(
            enriched = report.movies.len(),
            failed = report.failures.len(),
            "Enrichment batch settled"
        );
        Ok(report)
    }
}

fn failure(external_id: String, error: &ProviderError) -> EnrichmentFailure {
    EnrichmentFailure {
        external_id,
        reason: error.to_string(),
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Provider double answering from a fixed table; unknown ids are 404s
    #[derive(Default)]
    pub struct StaticProvider {
        pub responses: HashMap<String, Result<ProviderMetadata, ProviderError>>,
        pub calls: Mutex<Vec<String>>,
    }

    impl StaticProvider {
        pub fn with(mut self, id: &str, result: Result<ProviderMetadata, ProviderError>) -> Self {
            self.responses.insert(id.to_string(), result);
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl MetadataProvider for StaticProvider {
        async fn lookup(&self, external_id: &str) -> Result<ProviderMetadata, ProviderError> {
            self.calls.lock().unwrap().push(external_id.to_string());
            self.responses
                .get(external_id)
                .cloned()
                .unwrap_or_else(|| Err(ProviderError::Api(404, "not found".to_string())))
        }
    }

    pub fn metadata(poster: &str, rated: &str, plot: &str) -> ProviderMetadata {
        ProviderMetadata {
            poster: Some(poster.to_string()),
            rated: Some(rated.to_string()),
            plot: Some(plot.to_string()),
        }
    }

    pub fn candidate(id: &str, title: &str, genres: &str) -> RawCandidate {
        RawCandidate {
            id: id.to_string(),
            title: title.to_string(),
            genres: genres.to_string(),
            year: "2000".to_string(),
            rated: "PG".to_string(),
            poster_url: None,
        }
    }
}
