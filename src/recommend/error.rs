//! Typed errors for the recommendation engine and its collaborators.
//!
//! `RecommendationError` implements `Serialize` so the web layer can hand it
//! back to callers as `{"type": ..., "message": ...}`.

use serde::Serialize;
use thiserror::Error;

/// Errors returned by the recommendation facade.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "message")]
pub enum RecommendationError {
    /// Independent mode called without input tracks, a limit out of range or
    /// an unusable user id
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// User-based mode without input tracks and no collected profile
    #[error("No listening data available for user '{0}'. Run collection first.")]
    NoDataAvailable(String),

    /// The catalog could not be reached in time
    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),

    /// The profile store failed while reading
    #[error("Profile store error: {0}")]
    ProfileStore(String),
}

/// Failure of a single catalog call.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("catalog returned status {0}: {1}")]
    Status(u16, String),

    #[error("rate limited, retry after {0}s")]
    RateLimited(u64),

    #[error("authorization failed: {0}")]
    Auth(String),
}

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt profile: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("invalid user id '{0}'")]
    InvalidUserId(String),
}

impl From<ProfileError> for RecommendationError {
    fn from(e: ProfileError) -> Self {
        match e {
            ProfileError::InvalidUserId(_) => RecommendationError::InvalidInput(e.to_string()),
            _ => RecommendationError::ProfileStore(e.to_string()),
        }
    }
}
