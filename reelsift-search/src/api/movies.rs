//! Results endpoints

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use super::spawn_cycle;
use crate::session::{CycleTicket, ResultsView};
use crate::AppState;

/// GET /movies
pub async fn get_results(State(state): State<AppState>) -> Json<ResultsView> {
    Json(state.session.results().await)
}

/// POST /movies/reload
///
/// Re-runs the search for the current filters, e.g. after an error state.
pub async fn reload(State(state): State<AppState>) -> (StatusCode, Json<CycleTicket>) {
    let ticket = state.session.reload().await;
    spawn_cycle(&state.session, ticket.clone());
    (StatusCode::ACCEPTED, Json(ticket))
}

pub fn movie_routes() -> Router<AppState> {
    Router::new()
        .route("/movies", get(get_results))
        .route("/movies/reload", post(reload))
}
