//! Section listing endpoint

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::models::SectionListing;
use crate::tracker;

/// Sections response
#[derive(Serialize)]
pub struct SectionsResponse {
    pub success: bool,
    pub sections: Vec<SectionListing>,
}

/// GET /sections - sections with at least one recommendation
async fn list_sections(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SectionsResponse>, ApiError> {
    let sections = tracker::list_sections(state.store.as_ref()).await?;

    Ok(Json(SectionsResponse {
        success: true,
        sections,
    }))
}

/// Section routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/sections", get(list_sections))
}
