use std::sync::Arc;

use axum::{
    Extension,
    extract::Path,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use tracing::warn;

use crate::{
    recommend::{RecommendationEngine, RecommendationError},
    types::{RecommendationResult, Track},
};

pub const DEFAULT_LIMIT: usize = 20;

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    #[serde(default)]
    pub tracks: Vec<Track>,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl IntoResponse for RecommendationError {
    fn into_response(self) -> Response {
        let status = match &self {
            RecommendationError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            RecommendationError::NoDataAvailable(_) => StatusCode::NOT_FOUND,
            RecommendationError::CatalogUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            RecommendationError::ProfileStore(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            warn!(status = status.as_u16(), error = %self, "recommendation request failed");
        }
        (status, Json(self)).into_response()
    }
}

pub async fn recommend_independent(
    Extension(engine): Extension<Arc<RecommendationEngine>>,
    Json(body): Json<RecommendationRequest>,
) -> Result<Json<RecommendationResult>, RecommendationError> {
    engine
        .recommend_independent(&body.tracks, body.limit)
        .await
        .map(Json)
}

pub async fn recommend_for_user(
    Extension(engine): Extension<Arc<RecommendationEngine>>,
    Path(user_id): Path<String>,
    Json(body): Json<RecommendationRequest>,
) -> Result<Json<RecommendationResult>, RecommendationError> {
    engine
        .recommend_user_based(&user_id, &body.tracks, body.limit)
        .await
        .map(Json)
}
