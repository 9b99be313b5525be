//! # API Module
//!
//! HTTP handlers served by the local axum server.
//!
//! ## Endpoints
//!
//! - [`health`] - `GET /health`, status and version
//! - [`callback`] - `GET /callback`, OAuth PKCE redirect target used by
//!   `seedlist auth`
//! - [`recommend_independent`] - `POST /api/recommendations/independent`
//! - [`recommend_for_user`] - `POST /api/recommendations/users/{user_id}`
//!
//! Both recommendation endpoints take `{"tracks": [...], "limit": n}`; `limit`
//! defaults to 20. Engine errors are answered with their serialized form:
//!
//! | error                | status |
//! |----------------------|--------|
//! | `InvalidInput`       | 400    |
//! | `NoDataAvailable`    | 404    |
//! | `CatalogUnavailable` | 503    |
//! | `ProfileStore`       | 500    |

mod callback;
mod health;
mod recommend;

pub use callback::callback;
pub use health::health;
pub use recommend::{DEFAULT_LIMIT, RecommendationRequest, recommend_for_user, recommend_independent};
