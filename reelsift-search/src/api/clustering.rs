//! Clustering endpoints

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::clustering::{ClusteringOptions, ClusteringSpec};
use crate::error::ApiResult;
use crate::models::ClusteringDimension;
use crate::AppState;

/// Raw options input; defaults are applied on receipt
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OptionsInput {
    pub dimensions: Vec<ClusteringDimension>,
    pub k: i64,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub query: String,
    /// Target the view layer opens in a new tab
    pub url: String,
    pub spec: ClusteringSpec,
}

/// GET /clustering/options
pub async fn get_options(State(state): State<AppState>) -> Json<ClusteringOptions> {
    Json(state.session.clustering_options().await)
}

/// PUT /clustering/options
pub async fn set_options(
    State(state): State<AppState>,
    Json(input): Json<OptionsInput>,
) -> Json<ClusteringOptions> {
    Json(
        state
            .session
            .set_clustering_options(input.dimensions, input.k)
            .await,
    )
}

/// POST /clustering/submit
///
/// 422 `VALIDATION_REFUSED` when k < 3.
pub async fn submit(State(state): State<AppState>) -> ApiResult<Json<SubmitResponse>> {
    let spec = state.session.submit_clustering().await?;
    Ok(Json(SubmitResponse {
        query: spec.to_query_string(),
        url: spec.navigation_target(),
        spec,
    }))
}

pub fn clustering_routes() -> Router<AppState> {
    Router::new()
        .route("/clustering/options", get(get_options).put(set_options))
        .route("/clustering/submit", post(submit))
}
