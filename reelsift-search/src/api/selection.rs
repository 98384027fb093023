//! Selection endpoints

use axum::{
    extract::{Path, State},
    routing::{delete, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::models::EnrichedMovie;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectRequest {
    pub external_id: String,
}

/// Selection after a mutation, plus whether the mutation changed anything
#[derive(Debug, Serialize)]
pub struct SelectionResponse {
    pub changed: bool,
    pub selection: Vec<EnrichedMovie>,
}

/// GET /selection
pub async fn get_selection(State(state): State<AppState>) -> Json<Vec<EnrichedMovie>> {
    Json(state.session.selection().await.movies().to_vec())
}

/// POST /selection
///
/// Adds a movie from the displayed results; 404 when it is not displayed.
pub async fn add_selection(
    State(state): State<AppState>,
    Json(request): Json<SelectRequest>,
) -> ApiResult<Json<SelectionResponse>> {
    let changed = state.session.select(&request.external_id).await?;
    Ok(Json(SelectionResponse {
        changed,
        selection: state.session.selection().await.movies().to_vec(),
    }))
}

/// DELETE /selection/:external_id
pub async fn remove_selection(
    State(state): State<AppState>,
    Path(external_id): Path<String>,
) -> Json<SelectionResponse> {
    let changed = state.session.deselect(&external_id).await;
    Json(SelectionResponse {
        changed,
        selection: state.session.selection().await.movies().to_vec(),
    })
}

pub fn selection_routes() -> Router<AppState> {
    Router::new()
        .route("/selection", get(get_selection).post(add_selection))
        .route("/selection/:external_id", delete(remove_selection))
}
