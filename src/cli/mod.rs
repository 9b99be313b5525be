//! # CLI Module
//!
//! User-facing commands of the `seedlist` binary. Each command wires the
//! Spotify adapter, the profile store and the recommendation engine together
//! and renders the outcome with the crate's colored output macros, `indicatif`
//! spinners and `tabled` tables.
//!
//! ## Commands
//!
//! - [`auth`] - Spotify OAuth 2.0 PKCE login, token cached locally
//! - [`collect`] - Pull a listening profile from Spotify and store it
//! - [`show_profile`] - Summary table of a stored profile
//! - [`recommend`] - Independent or user-based recommendations, optionally
//!   saved as a private playlist
//! - [`serve`] - Run the HTTP recommendation API
//!
//! ## Typical Session
//!
//! ```bash
//! seedlist auth
//! seedlist collect
//! seedlist recommend --user me --limit 30 --playlist "Fresh picks"
//! seedlist recommend --track 4uLU6hMCjMI75M1A2tKUQC --track spotify:track:7ouMYWpwJ422jRcDASZB7P
//! ```

mod auth;
mod collect;
mod profile;
mod recommend;
mod serve;

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::{error, spotify::SpotifyCatalog};

pub use auth::auth;
pub use collect::collect;
pub use profile::show_profile;
pub use recommend::{RecommendOptions, recommend};
pub use serve::serve;

/// Catalog client from the cached token; exits when nobody is logged in.
async fn connect() -> SpotifyCatalog {
    match SpotifyCatalog::from_cache().await {
        Ok(catalog) => catalog,
        Err(e) => error!(
            "No usable Spotify token ({}). Run `seedlist auth` first.",
            e
        ),
    }
}

/// Resolves `me` or a missing user to the id of the authorized account.
async fn resolve_user(catalog: &SpotifyCatalog, user: Option<String>) -> String {
    match user {
        Some(user) if user != "me" => user,
        _ => match catalog.current_user().await {
            Ok(me) => me.id,
            Err(e) => error!("Cannot determine current Spotify user. Err: {}", e),
        },
    }
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb
}
