//! Filter endpoints

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};

use super::spawn_cycle;
use crate::models::{FilterChange, FilterState};
use crate::query_builder::current_year_choices;
use crate::session::CycleTicket;
use crate::AppState;

/// GET /filters
pub async fn get_filters(State(state): State<AppState>) -> Json<FilterState> {
    Json(state.session.filters().await)
}

/// PATCH /filters
///
/// Applies one change and starts a new search cycle for it.
pub async fn update_filters(
    State(state): State<AppState>,
    Json(change): Json<FilterChange>,
) -> (StatusCode, Json<CycleTicket>) {
    let ticket = state.session.update_filters(change).await;
    spawn_cycle(&state.session, ticket.clone());
    (StatusCode::ACCEPTED, Json(ticket))
}

/// GET /filters/years
pub async fn year_choices() -> Json<Vec<i32>> {
    Json(current_year_choices())
}

pub fn filter_routes() -> Router<AppState> {
    Router::new()
        .route("/filters", get(get_filters).patch(update_filters))
        .route("/filters/years", get(year_choices))
}
