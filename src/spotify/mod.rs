//! # Spotify Integration Module
//!
//! Everything that talks to Spotify lives here.
//!
//! ```text
//! Application Layer (CLI, HTTP API, profile collection)
//!          ↓
//! Spotify Integration Layer
//!     ├── Authentication (OAuth 2.0 PKCE, token refresh)
//!     ├── Catalog (search, tracks, artists, user listening data)
//!     └── Playlist Operations (create, lookup, add tracks)
//!          ↓
//! HTTP Layer (reqwest, JSON)
//! ```
//!
//! [`SpotifyCatalog`] implements [`crate::recommend::CatalogService`], which
//! is the only piece of this module the recommendation engine depends on.
//!
//! ## Error Handling
//!
//! - **429 Too Many Requests**: waited out once when `Retry-After` is at most
//!   two minutes, reported as [`crate::recommend::CatalogError::RateLimited`]
//!   otherwise
//! - **502 Bad Gateway**: retried once after a short pause
//! - **401 Unauthorized**: reported as an auth error; run `seedlist auth` again
//!
//! Access tokens are refreshed four minutes before they expire.

pub mod auth;
pub mod client;
pub mod playlist;

pub use client::SpotifyCatalog;
