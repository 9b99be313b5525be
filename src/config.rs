//! Configuration management for seedlist.
//!
//! This module handles loading and accessing configuration values from environment
//! variables and `.env` files. It provides a centralized way to manage application
//! configuration including Spotify API credentials, server settings, and the
//! tuning knobs of the recommendation engine.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)

use std::{env, path::PathBuf, str::FromStr, time::Duration};

use tracing::warn;

use crate::recommend::{ScoringConfig, seeds::MAX_SEEDS};

const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8888";
const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const DEFAULT_SCOPE: &str = "user-top-read user-read-recently-played user-library-read playlist-read-private playlist-modify-private";

/// Returns the local data directory of the application.
///
/// - Linux: `~/.local/share/seedlist`
/// - macOS: `~/Library/Application Support/seedlist`
/// - Windows: `%LOCALAPPDATA%/seedlist`
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("seedlist");
    path
}

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the data directory if it doesn't exist. A missing `.env` file is
/// not an error: every value can also come from the process environment.
///
/// # Errors
///
/// Returns an error string if the directory cannot be created or the `.env`
/// file exists but cannot be parsed.
///
/// # Example
///
/// ```
/// use seedlist::config;
///
/// #[tokio::main]
/// async fn main() {
///     if let Err(e) = config::load_env().await {
///         eprintln!("Configuration error: {}", e);
///     }
/// }
/// ```
pub async fn load_env() -> Result<(), String> {
    let dir = data_dir();
    async_fs::create_dir_all(&dir)
        .await
        .map_err(|e| e.to_string())?;

    let path = dir.join(".env");
    if !path.is_file() {
        return Ok(());
    }

    dotenv::from_path(&path).map_err(|e| e.to_string())
}

/// Returns the address for the local HTTP server (OAuth callback and the
/// recommendation API). Defaults to `127.0.0.1:8888`.
pub fn server_addr() -> String {
    env::var("SERVER_ADDRESS").unwrap_or_else(|_| DEFAULT_SERVER_ADDRESS.to_string())
}

/// Returns the Spotify API client ID for authentication.
///
/// # Panics
///
/// Panics if the `SPOTIFY_API_AUTH_CLIENT_ID` environment variable is not set.
pub fn spotify_client_id() -> String {
    env::var("SPOTIFY_API_AUTH_CLIENT_ID").expect("SPOTIFY_API_AUTH_CLIENT_ID must be set")
}

/// Returns the Spotify OAuth redirect URI.
///
/// This must match the redirect URI registered in the Spotify application settings.
///
/// # Panics
///
/// Panics if the `SPOTIFY_API_REDIRECT_URI` environment variable is not set.
pub fn spotify_redirect_uri() -> String {
    env::var("SPOTIFY_API_REDIRECT_URI").expect("SPOTIFY_API_REDIRECT_URI must be set")
}

/// Returns the Spotify API scope permissions requested during authentication.
///
/// Defaults to the scopes needed for profile collection and playlist creation.
pub fn spotify_scope() -> String {
    env::var("SPOTIFY_API_AUTH_SCOPE").unwrap_or_else(|_| DEFAULT_SCOPE.to_string())
}

/// Returns the Spotify OAuth authorization URL.
pub fn spotify_apiauth_url() -> String {
    env::var("SPOTIFY_API_AUTH_URL").unwrap_or_else(|_| DEFAULT_AUTH_URL.to_string())
}

/// Returns the Spotify Web API base URL.
pub fn spotify_apiurl() -> String {
    env::var("SPOTIFY_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string())
}

/// Returns the Spotify OAuth token exchange URL.
pub fn spotify_apitoken_url() -> String {
    env::var("SPOTIFY_API_TOKEN_URL").unwrap_or_else(|_| DEFAULT_TOKEN_URL.to_string())
}

/// Tuning of the recommendation engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Pause between two catalog calls of the same strategy.
    pub search_delay: Duration,
    /// Upper bound for a whole recommendation request.
    pub request_timeout: Duration,
    pub max_seeds: usize,
    /// In user-based mode, also exclude every track found in the profile.
    pub exclude_known_tracks: bool,
    pub scoring: ScoringConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            search_delay: Duration::from_millis(100),
            request_timeout: Duration::from_secs(30),
            max_seeds: MAX_SEEDS,
            exclude_known_tracks: true,
            scoring: ScoringConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Reads `SEEDLIST_*` variables over the defaults.
    ///
    /// | variable                          | default |
    /// |-----------------------------------|---------|
    /// | `SEEDLIST_SEARCH_DELAY_MS`        | 100     |
    /// | `SEEDLIST_REQUEST_TIMEOUT_SECS`   | 30      |
    /// | `SEEDLIST_MAX_SEEDS`              | 5       |
    /// | `SEEDLIST_EXCLUDE_KNOWN_TRACKS`   | true    |
    /// | `SEEDLIST_ARTIST_MATCH_BONUS`     | 0.3     |
    /// | `SEEDLIST_GENRE_MATCH_BONUS`      | 0.0     |
    /// | `SEEDLIST_RECENCY_BONUS`          | 0.1     |
    /// | `SEEDLIST_RECENCY_WINDOW_YEARS`   | 3       |
    /// | `SEEDLIST_RANDOM_AMPLITUDE`       | 0.2     |
    ///
    /// Values that do not parse are reported and ignored.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let scoring = defaults.scoring.clone();

        Self {
            search_delay: Duration::from_millis(env_or(
                "SEEDLIST_SEARCH_DELAY_MS",
                defaults.search_delay.as_millis() as u64,
            )),
            request_timeout: Duration::from_secs(env_or(
                "SEEDLIST_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout.as_secs(),
            )),
            max_seeds: env_or("SEEDLIST_MAX_SEEDS", defaults.max_seeds).clamp(1, MAX_SEEDS),
            exclude_known_tracks: env_or(
                "SEEDLIST_EXCLUDE_KNOWN_TRACKS",
                defaults.exclude_known_tracks,
            ),
            scoring: ScoringConfig {
                artist_match_bonus: env_or(
                    "SEEDLIST_ARTIST_MATCH_BONUS",
                    scoring.artist_match_bonus,
                ),
                genre_match_bonus: env_or("SEEDLIST_GENRE_MATCH_BONUS", scoring.genre_match_bonus),
                recency_bonus: env_or("SEEDLIST_RECENCY_BONUS", scoring.recency_bonus),
                recency_window_years: env_or(
                    "SEEDLIST_RECENCY_WINDOW_YEARS",
                    scoring.recency_window_years,
                ),
                random_amplitude: env_or("SEEDLIST_RANDOM_AMPLITUDE", scoring.random_amplitude),
            },
        }
    }
}

fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match env::var(key) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warn!(key, value = %raw, "ignoring unparsable configuration value");
                default
            }
        },
        Err(_) => default,
    }
}
