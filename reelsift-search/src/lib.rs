//! reelsift-search library interface
//!
//! The Search-Enrich-Select pipeline behind the movie-discovery UI:
//! filter state → catalog query → raw candidates → concurrent metadata enrichment →
//! displayed movies → user selection → clustering query string.

pub mod api;
pub mod clients;
pub mod clustering;
pub mod enrichment;
pub mod error;
pub mod models;
pub mod query_builder;
pub mod selection;
pub mod session;

pub use crate::error::{ApiError, ApiResult, DiscoverError};
pub use crate::session::{CycleOutcome, CycleTicket, ResultsView, SearchSession};

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<SearchSession>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(session: Arc<SearchSession>) -> Self {
        Self {
            session,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::filter_routes())
        .merge(api::movie_routes())
        .merge(api::selection_routes())
        .merge(api::clustering_routes())
        .merge(api::health_routes())
        .route("/events", axum::routing::get(api::event_stream))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
