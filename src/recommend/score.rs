//! Relevance scoring and ranking of candidate tracks.
//!
//! The score is additive: popularity, a bonus for artists the caller already
//! listens to, a bonus for recent releases, an optional genre bonus, and a
//! random discovery term so repeated requests do not return the same list.
//! The random source is injected; tests pass a seeded or fixed one.

use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};

use chrono::{Datelike, Utc};
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::types::{GenreCount, Track};

/// Source of uniform samples in `[0, 1)`.
pub trait RandomSource: Send + Sync {
    fn next_unit(&self) -> f64;
}

/// Thread-local generator, used in production.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_unit(&self) -> f64 {
        rand::rng().random::<f64>()
    }
}

/// Reproducible generator for a given seed.
pub struct SeededRandom(Mutex<StdRng>);

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self(Mutex::new(StdRng::seed_from_u64(seed)))
    }
}

impl RandomSource for SeededRandom {
    fn next_unit(&self) -> f64 {
        match self.0.lock() {
            Ok(mut rng) => rng.random::<f64>(),
            Err(poisoned) => poisoned.into_inner().random::<f64>(),
        }
    }
}

/// Always returns the same sample.
#[derive(Debug, Clone, Copy)]
pub struct FixedRandom(pub f64);

impl RandomSource for FixedRandom {
    fn next_unit(&self) -> f64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub artist_match_bonus: f64,
    pub genre_match_bonus: f64,
    pub recency_bonus: f64,
    pub recency_window_years: i32,
    pub random_amplitude: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            artist_match_bonus: 0.3,
            genre_match_bonus: 0.0,
            recency_bonus: 0.1,
            recency_window_years: 3,
            random_amplitude: 0.2,
        }
    }
}

/// What the candidates are scored against: the input tracks' artists and,
/// in user-based mode, the profile's top genres. All names are lowercase.
#[derive(Debug, Clone, Default)]
pub struct ScoringContext {
    artists: HashSet<String>,
    genres: HashSet<String>,
}

impl ScoringContext {
    pub fn from_inputs(inputs: &[Track]) -> Self {
        Self {
            artists: inputs
                .iter()
                .flat_map(|t| t.artists.iter())
                .map(|a| a.name.to_lowercase())
                .collect(),
            genres: HashSet::new(),
        }
    }

    pub fn with_genres(mut self, top_genres: &[GenreCount]) -> Self {
        self.genres = top_genres.iter().map(|g| g.name.to_lowercase()).collect();
        self
    }

    fn shares_artist(&self, track: &Track) -> bool {
        track
            .artists
            .iter()
            .any(|a| self.artists.contains(&a.name.to_lowercase()))
    }

    fn shares_genre(&self, track: &Track) -> bool {
        track
            .artists
            .iter()
            .flat_map(|a| a.genres.iter())
            .any(|g| self.genres.contains(&g.to_lowercase()))
    }
}

#[derive(Debug, Clone)]
pub struct ScoredTrack {
    pub track: Track,
    pub score: f64,
}

pub struct Scorer {
    config: ScoringConfig,
    random: Arc<dyn RandomSource>,
    current_year: i32,
}

impl Scorer {
    pub fn new(config: ScoringConfig, random: Arc<dyn RandomSource>) -> Self {
        Self {
            config,
            random,
            current_year: Utc::now().year(),
        }
    }

    /// Pins the year the recency window is measured from.
    pub fn with_current_year(mut self, year: i32) -> Self {
        self.current_year = year;
        self
    }

    /// Draws one random sample per call.
    pub fn score(&self, candidate: &Track, context: &ScoringContext) -> f64 {
        let mut score = f64::from(candidate.popularity.min(100)) / 100.0;

        if context.shares_artist(candidate) {
            score += self.config.artist_match_bonus;
        }

        if let Some(year) = candidate.album.release_year() {
            if year >= self.current_year - self.config.recency_window_years {
                score += self.config.recency_bonus;
            }
        }

        if context.shares_genre(candidate) {
            score += self.config.genre_match_bonus;
        }

        score + self.config.random_amplitude * self.random.next_unit()
    }

    /// Scores every candidate in pool order, sorts by descending score and
    /// keeps the first `limit`. Equal scores keep pool order.
    pub fn rank(
        &self,
        candidates: Vec<Track>,
        context: &ScoringContext,
        limit: usize,
    ) -> Vec<ScoredTrack> {
        let mut scored: Vec<ScoredTrack> = candidates
            .into_iter()
            .map(|track| {
                let score = self.score(&track, context);
                ScoredTrack { track, score }
            })
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(limit);
        scored
    }
}
