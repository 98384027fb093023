//! Search session
//!
//! Owns the live filter state, the displayed results, the selection set and the
//! clustering options. Each filter change initiates a search cycle tagged with a
//! monotonically increasing number; a cycle's outcome is applied only while it is
//! still the latest initiated cycle. Superseded cycles run to completion and are dropped.
//!
//! Results and selection are two independently owned collections keyed by external id.

use crate::clients::{CatalogClient, CatalogSearch, OmdbClient};
use crate::clustering::{ClusteringOptions, ClusteringSpec};
use crate::enrichment::{EnrichmentFailure, EnrichmentReport, Enricher};
use crate::error::DiscoverError;
use crate::models::{ClusteringDimension, EnrichedMovie, FilterChange, FilterState, SearchQuery};
use crate::query_builder::build_query;
use crate::selection::SelectionSet;
use chrono::Utc;
use reelsift_common::config::TomlConfig;
use reelsift_common::events::{EventBus, FailureKind, ReelsiftEvent};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Handle for an initiated cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleTicket {
    pub cycle: u64,
    pub query: SearchQuery,
}

/// How a cycle ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Results replaced the displayed list
    Applied {
        cycle: u64,
        movie_count: usize,
        failed_ids: Vec<String>,
    },
    /// Displayed list replaced by an error state
    Failed { cycle: u64, kind: FailureKind },
    /// A newer cycle was initiated first; nothing was touched
    Superseded { cycle: u64, latest: u64 },
}

/// User-visible error state of the results list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorState {
    pub kind: FailureKind,
    pub message: String,
}

/// What the view layer renders for the current results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsView {
    /// Cycle that produced this view (0 before any cycle resolved)
    pub cycle: u64,
    /// A newer cycle is in flight
    pub loading: bool,
    pub movies: Vec<EnrichedMovie>,
    /// Per-item lookup failures of the displayed cycle
    pub failures: Vec<EnrichmentFailure>,
    pub error: Option<ErrorState>,
}

pub struct SearchSession {
    catalog: Arc<dyn CatalogSearch>,
    enricher: Enricher,
    event_bus: EventBus,
    latest_cycle: AtomicU64,
    filters: RwLock<FilterState>,
    results: RwLock<ResultsView>,
    selection: RwLock<SelectionSet>,
    clustering: RwLock<ClusteringOptions>,
}

impl SearchSession {
    pub fn new(catalog: Arc<dyn CatalogSearch>, enricher: Enricher, event_bus: EventBus) -> Self {
        Self {
            catalog,
            enricher,
            event_bus,
            latest_cycle: AtomicU64::new(0),
            filters: RwLock::new(FilterState::default()),
            results: RwLock::new(ResultsView::default()),
            selection: RwLock::new(SelectionSet::new()),
            clustering: RwLock::new(ClusteringOptions::default()),
        }
    }

    /// Build the reqwest clients described by a resolved configuration
    pub fn from_config(config: &TomlConfig, event_bus: EventBus) -> reelsift_common::Result<Self> {
        let timeout = Duration::from_secs(config.request_timeout_secs);
        let api_key = config
            .omdb_api_key
            .clone()
            .ok_or_else(|| reelsift_common::Error::Config("OMDb API key not configured".to_string()))?;

        let catalog = CatalogClient::new(config.catalog_url.clone(), timeout)
            .map_err(|e| reelsift_common::Error::Config(format!("Catalog client: {}", e)))?;
        let provider = OmdbClient::new(config.omdb_url.clone(), api_key, timeout)
            .map_err(|e| reelsift_common::Error::Config(format!("OMDb client: {}", e)))?
            .with_rate_limit(config.omdb_requests_per_second);

        let enricher = Enricher::new(Arc::new(provider), config.enrichment_policy);
        Ok(Self::new(Arc::new(catalog), enricher, event_bus))
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Most recently initiated cycle number
    pub fn latest_cycle(&self) -> u64 {
        self.latest_cycle.load(Ordering::SeqCst)
    }

    // ------------------------------------------------------------------------
    // Search cycles
    // ------------------------------------------------------------------------

    /// Apply a filter change and initiate a cycle for the resulting filters
    ///
    /// Every change initiates a cycle, including no-op changes; there is no debouncing.
    pub async fn update_filters(&self, change: FilterChange) -> CycleTicket {
        // Filters stay locked until the cycle number is assigned, so cycle order
        // always matches filter order.
        let mut filters = self.filters.write().await;
        let changed = filters.apply(change);
        debug!(changed, filters = ?*filters, "Filter change applied");
        let query = build_query(&filters);
        self.begin_cycle(query).await
    }

    /// Initiate a cycle for the current filters without changing them
    pub async fn reload(&self) -> CycleTicket {
        let filters = self.filters.write().await;
        let query = build_query(&filters);
        self.begin_cycle(query).await
    }

    async fn begin_cycle(&self, query: SearchQuery) -> CycleTicket {
        let mut results = self.results.write().await;
        let cycle = self.latest_cycle.fetch_add(1, Ordering::SeqCst) + 1;
        results.loading = true;
        drop(results);

        info!(cycle, ?query, "Search cycle initiated");
        self.event_bus.emit_lossy(ReelsiftEvent::SearchStarted {
            cycle,
            query: serde_json::to_value(&query).unwrap_or_default(),
            timestamp: Utc::now(),
        });

        CycleTicket { cycle, query }
    }

    /// Search, enrich, and apply the outcome if the cycle is still current
    pub async fn run_cycle(&self, ticket: CycleTicket) -> CycleOutcome {
        let outcome = self.search_and_enrich(&ticket.query).await;

        let mut results = self.results.write().await;
        let latest = self.latest_cycle.load(Ordering::SeqCst);
        if ticket.cycle != latest {
            drop(results);
            info!(cycle = ticket.cycle, latest, "Discarding superseded cycle");
            self.event_bus.emit_lossy(ReelsiftEvent::CycleDiscarded {
                cycle: ticket.cycle,
                latest,
                timestamp: Utc::now(),
            });
            return CycleOutcome::Superseded {
                cycle: ticket.cycle,
                latest,
            };
        }

        match outcome {
            Ok(report) => {
                let failed_ids = report.failed_ids();
                let movie_count = report.movies.len();
                *results = ResultsView {
                    cycle: ticket.cycle,
                    loading: false,
                    movies: report.movies,
                    failures: report.failures,
                    error: None,
                };
                drop(results);

                info!(cycle = ticket.cycle, movie_count, "Search cycle applied");
                self.event_bus.emit_lossy(ReelsiftEvent::ResultsUpdated {
                    cycle: ticket.cycle,
                    movie_count,
                    failed_ids: failed_ids.clone(),
                    timestamp: Utc::now(),
                });
                CycleOutcome::Applied {
                    cycle: ticket.cycle,
                    movie_count,
                    failed_ids,
                }
            }
            Err(err) => {
                let kind = err.failure_kind().unwrap_or(FailureKind::SearchUnavailable);
                let failures = match &err {
                    DiscoverError::EnrichmentFailed { failures } => failures.clone(),
                    _ => Vec::new(),
                };
                let message = err.to_string();
                *results = ResultsView {
                    cycle: ticket.cycle,
                    loading: false,
                    movies: Vec::new(),
                    failures,
                    error: Some(ErrorState {
                        kind,
                        message: message.clone(),
                    }),
                };
                drop(results);

                warn!(cycle = ticket.cycle, kind = kind.as_str(), error = %message, "Search cycle failed");
                self.event_bus.emit_lossy(ReelsiftEvent::SearchFailed {
                    cycle: ticket.cycle,
                    kind,
                    message,
                    timestamp: Utc::now(),
                });
                CycleOutcome::Failed {
                    cycle: ticket.cycle,
                    kind,
                }
            }
        }
    }

    /// [`update_filters`](Self::update_filters) followed by [`run_cycle`](Self::run_cycle)
    pub async fn refresh(&self, change: FilterChange) -> CycleOutcome {
        let ticket = self.update_filters(change).await;
        self.run_cycle(ticket).await
    }

    async fn search_and_enrich(&self, query: &SearchQuery) -> Result<EnrichmentReport, DiscoverError> {
        let candidates = self.catalog.search(query).await?;
        self.enricher.enrich(candidates).await
    }

    pub async fn filters(&self) -> FilterState {
        self.filters.read().await.clone()
    }

    pub async fn results(&self) -> ResultsView {
        self.results.read().await.clone()
    }

    // ------------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------------

    /// Select a movie from the displayed results by external id
    pub async fn select(&self, external_id: &str) -> Result<bool, DiscoverError> {
        let movie = self
            .results
            .read()
            .await
            .movies
            .iter()
            .find(|m| m.external_id == external_id)
            .cloned()
            .ok_or_else(|| DiscoverError::NotInResults(external_id.to_string()))?;

        Ok(self.select_movie(movie).await)
    }

    /// Add a movie to the selection; duplicates by external id are ignored
    pub async fn select_movie(&self, movie: EnrichedMovie) -> bool {
        let mut selection = self.selection.write().await;
        let added = selection.add(movie);
        let ids = selection.ids();
        drop(selection);

        if added {
            self.emit_selection(ids);
        }
        added
    }

    /// Remove a movie from the selection; unknown ids are a no-op
    pub async fn deselect(&self, external_id: &str) -> bool {
        let mut selection = self.selection.write().await;
        let removed = selection.remove(external_id);
        let ids = selection.ids();
        drop(selection);

        if removed {
            self.emit_selection(ids);
        }
        removed
    }

    pub async fn selection(&self) -> SelectionSet {
        self.selection.read().await.clone()
    }

    fn emit_selection(&self, selected_ids: Vec<String>) {
        debug!(count = selected_ids.len(), "Selection changed");
        self.event_bus.emit_lossy(ReelsiftEvent::SelectionChanged {
            selected_ids,
            timestamp: Utc::now(),
        });
    }

    // ------------------------------------------------------------------------
    // Clustering
    // ------------------------------------------------------------------------

    /// Store options from the options input, defaults applied
    pub async fn set_clustering_options(
        &self,
        dimensions: Vec<ClusteringDimension>,
        k: i64,
    ) -> ClusteringOptions {
        let options = ClusteringOptions::from_input(dimensions, k);
        *self.clustering.write().await = options.clone();
        options
    }

    pub async fn clustering_options(&self) -> ClusteringOptions {
        self.clustering.read().await.clone()
    }

    /// Validate the current selection and options for the clustering view
    pub async fn submit_clustering(&self) -> Result<ClusteringSpec, DiscoverError> {
        let selection = self.selection.read().await;
        let options = self.clustering.read().await;
        let spec = ClusteringSpec::prepare(&selection, &options)?;
        info!(
            selected = spec.selected_ids.len(),
            k = spec.k,
            "Clustering query prepared"
        );
        Ok(spec)
    }
}
