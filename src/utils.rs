use std::{cmp::Ordering, collections::HashMap};

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};

use crate::types::{Artist, GenreCount};

pub fn generate_code_verifier() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(128)
        .map(char::from)
        .collect()
}

pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Formats a track length as `m:ss`.
pub fn format_duration(duration_ms: u64) -> String {
    let total_secs = duration_ms / 1000;
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

/// Extracts a track id from a raw id, a `spotify:track:` URI or an
/// `open.spotify.com/track/` link.
pub fn parse_track_id(input: &str) -> Result<String, String> {
    let trimmed = input.trim();

    if let Some(id) = trimmed.strip_prefix("spotify:track:") {
        return Ok(id.to_string());
    }

    if let Some(rest) = trimmed.split("/track/").nth(1) {
        let id = rest.split(['?', '/']).next().unwrap_or(rest);
        if !id.is_empty() {
            return Ok(id.to_string());
        }
    }

    if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Ok(trimmed.to_string());
    }

    Err(format!("Could not extract a track id from: {}", input))
}

/// Counts genre occurrences across artists, most frequent first, ties by name.
pub fn count_genres<'a>(artists: impl IntoIterator<Item = &'a Artist>) -> Vec<GenreCount> {
    let mut counts: HashMap<String, u32> = HashMap::new();
    for genre in artists.into_iter().flat_map(|a| a.genres.iter()) {
        *counts.entry(genre.to_lowercase()).or_insert(0) += 1;
    }

    let mut genres: Vec<GenreCount> = counts
        .into_iter()
        .map(|(name, count)| GenreCount { name, count })
        .collect();
    genres.sort_by(|a, b| match b.count.cmp(&a.count) {
        Ordering::Equal => a.name.cmp(&b.name),
        other => other,
    });
    genres
}

/// Shortens `text` to `max` characters, marking the cut with an ellipsis.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", cut)
}
