//! Recommendations-by-status endpoint

use std::sync::Arc;

use axum::{
    extract::{rejection::PathRejection, Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::models::Recommendation;
use crate::tracker;

/// Recommendations response
#[derive(Serialize)]
pub struct RecommendationsResponse {
    pub success: bool,
    pub recommendations: Vec<Recommendation>,
}

/// GET /recommendations/{status} - recommendations with that exact status
///
/// The path segment is not validated: an unknown status gives an empty list.
/// Only a segment that cannot be decoded at all is a 400.
async fn list_by_status(
    State(state): State<Arc<AppState>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<RecommendationsResponse>, ApiError> {
    let Path(status) = path?;
    let recommendations =
        tracker::list_recommendations_by_status(state.store.as_ref(), &status).await?;

    tracing::debug!(status = %status, count = recommendations.len(), "listed recommendations");

    Ok(Json(RecommendationsResponse {
        success: true,
        recommendations,
    }))
}

/// Recommendation routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/recommendations/{status}", get(list_by_status))
}
