//! Stats endpoint

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::models::StatusCounts;
use crate::tracker;

/// Stats response
#[derive(Serialize)]
pub struct StatsResponse {
    pub success: bool,
    pub stats: StatusCounts,
}

/// GET /stats - recommendation counts per status
async fn get_stats(State(state): State<Arc<AppState>>) -> Result<Json<StatsResponse>, ApiError> {
    let stats = tracker::compute_stats(state.store.as_ref()).await?;

    Ok(Json(StatsResponse {
        success: true,
        stats,
    }))
}

/// Stats routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/stats", get(get_stats))
}
