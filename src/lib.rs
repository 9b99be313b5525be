//! seedlist library
//!
//! Builds track recommendations for Spotify listeners. Discovery strategies
//! search the catalog around a few seed tracks (and, for known users, around
//! their favourite genres), the results are merged, filtered and ranked.
//!
//! # Modules
//!
//! - `api` - HTTP handlers for the local server
//! - `cli` - Command-line interface implementations
//! - `config` - Environment configuration and engine tuning
//! - `management` - Token cache and stored listening profiles
//! - `profile` - Listening profile collection from Spotify
//! - `recommend` - The recommendation engine
//! - `server` - Local HTTP server (OAuth callback, recommendation API)
//! - `spotify` - Spotify Web API client implementation
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers

pub mod api;
pub mod cli;
pub mod config;
pub mod management;
pub mod profile;
pub mod recommend;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

/// Result alias for CLI and server plumbing, where errors are only reported.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational line with a blue `o` marker.
///
/// These macros are for people reading the terminal; diagnostics go through
/// `tracing` instead.
///
/// ```
/// info!("Collecting listening data...");
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success line with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error line with a red `!` and exits with status 1.
///
/// Only for failures the command cannot continue from.
///
/// ```
/// error!("No usable Spotify token");
/// // never reached
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning line with a yellow `!`.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
