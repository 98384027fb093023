//! HTTP API consumed by the view layer
//!
//! Filter changes answer `202 Accepted` immediately; the cycle runs in the background
//! and its outcome arrives through `GET /movies` or the `/events` stream.

pub mod clustering;
pub mod filters;
pub mod health;
pub mod movies;
pub mod selection;
pub mod sse;

pub use clustering::clustering_routes;
pub use filters::filter_routes;
pub use health::health_routes;
pub use movies::movie_routes;
pub use selection::selection_routes;
pub use sse::event_stream;

use crate::session::{CycleTicket, SearchSession};
use std::sync::Arc;

/// Run an initiated cycle without blocking the request
pub(crate) fn spawn_cycle(session: &Arc<SearchSession>, ticket: CycleTicket) {
    let session = Arc::clone(session);
    tokio::spawn(async move {
        session.run_cycle(ticket).await;
    });
}
