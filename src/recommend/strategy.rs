//! Discovery strategies that turn seed tracks into catalog searches.
//!
//! Every strategy accumulates into its own list and contains its own search
//! failures: a failed call is logged, counted and skipped. Calls inside one
//! strategy are spaced by a fixed delay to stay under the upstream rate limit.

use std::{collections::HashSet, time::Duration};

use async_trait::async_trait;
use futures_util::future::join_all;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::{
    recommend::{error::CatalogError, ports::CatalogService},
    types::{GenreCount, RecommendationMode, StrategyKind, StrategyReport, Track},
};

/// Candidate pool target is `limit * CANDIDATE_HEADROOM` to leave room for filtering.
pub const CANDIDATE_HEADROOM: usize = 3;

const ARTIST_FAN_OUT: usize = 5;
const ARTIST_RESULTS: u32 = 10;

const GENRE_FAN_OUT: usize = 3;
const GENRE_RESULTS: u32 = 8;
const GENRE_FALLBACK_RESULTS: u32 = 5;

const KEYWORD_FAN_OUT: usize = 5;
const KEYWORD_RESULTS: u32 = 6;
const KEYWORD_MIN_CHARS: usize = 3;

/// Per-strategy result budgets for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrategyBudgets {
    pub artist: usize,
    pub genre: usize,
    pub keyword: usize,
}

impl StrategyBudgets {
    /// Splits `limit * CANDIDATE_HEADROOM` by the mode's percentages.
    ///
    /// | mode        | artist | genre | keyword |
    /// |-------------|--------|-------|---------|
    /// | user-based  | 40     | 30    | 30      |
    /// | independent | 50     | 0     | 50      |
    pub fn allocate(mode: RecommendationMode, limit: usize) -> Self {
        let target = limit.saturating_mul(CANDIDATE_HEADROOM);
        let (artist, genre, keyword) = match mode {
            RecommendationMode::UserBased => (40, 30, 30),
            RecommendationMode::Independent => (50, 0, 50),
        };

        let share = |pct: usize| target / 100 * pct + target % 100 * pct / 100;
        Self {
            artist: share(artist),
            genre: share(genre),
            keyword: share(keyword),
        }
    }
}

/// What one strategy produced for one request.
#[derive(Debug, Clone)]
pub struct StrategyOutcome {
    pub kind: StrategyKind,
    pub budget: usize,
    pub tracks: Vec<Track>,
    pub failed_queries: usize,
}

impl StrategyOutcome {
    fn new(kind: StrategyKind, budget: usize) -> Self {
        Self {
            kind,
            budget,
            tracks: Vec::new(),
            failed_queries: 0,
        }
    }

    fn is_full(&self) -> bool {
        self.tracks.len() >= self.budget
    }

    fn extend(&mut self, tracks: Vec<Track>) {
        let room = self.budget.saturating_sub(self.tracks.len());
        self.tracks.extend(tracks.into_iter().take(room));
    }

    fn record_failure(&mut self, query: &str, err: &CatalogError) {
        warn!(strategy = %self.kind, query = %query, "catalog search failed: {err}");
        self.failed_queries += 1;
    }

    pub fn report(&self) -> StrategyReport {
        StrategyReport {
            kind: self.kind,
            budget: self.budget,
            returned: self.tracks.len(),
            failed_queries: self.failed_queries,
        }
    }
}

#[async_trait]
pub trait DiscoveryStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// Returns at most `budget` tracks. Never fails.
    async fn run(
        &self,
        catalog: &dyn CatalogService,
        seeds: &[Track],
        budget: usize,
    ) -> StrategyOutcome;
}

/// Catalog handle that waits `delay` before every call but the first.
struct PacedSearch<'a> {
    catalog: &'a dyn CatalogService,
    delay: Duration,
    calls: usize,
}

impl<'a> PacedSearch<'a> {
    fn new(catalog: &'a dyn CatalogService, delay: Duration) -> Self {
        Self {
            catalog,
            delay,
            calls: 0,
        }
    }

    async fn search(&mut self, query: &str, limit: u32) -> Result<Vec<Track>, CatalogError> {
        if self.calls > 0 && !self.delay.is_zero() {
            sleep(self.delay).await;
        }
        self.calls += 1;
        debug!(query = %query, limit, "catalog search");
        self.catalog.search_tracks(query, limit).await
    }
}

/// Builds a field-scoped query, quoting values that contain whitespace.
pub fn field_query(field: &str, value: &str) -> String {
    let value = value.replace('"', "");
    if value.contains(char::is_whitespace) {
        format!("{field}:\"{value}\"")
    } else {
        format!("{field}:{value}")
    }
}

/// Searches once per distinct seed artist.
pub struct ArtistStrategy {
    delay: Duration,
}

impl ArtistStrategy {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl DiscoveryStrategy for ArtistStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Artist
    }

    async fn run(
        &self,
        catalog: &dyn CatalogService,
        seeds: &[Track],
        budget: usize,
    ) -> StrategyOutcome {
        let mut outcome = StrategyOutcome::new(self.kind(), budget);
        let mut search = PacedSearch::new(catalog, self.delay);

        // Artists without a catalog id (local files) are told apart by name.
        let mut seen = HashSet::new();
        let artists: Vec<&str> = seeds
            .iter()
            .flat_map(|t| t.artists.iter())
            .filter(|a| !a.name.trim().is_empty())
            .filter(|a| {
                let key = if a.id.is_empty() {
                    format!("name:{}", a.name.to_lowercase())
                } else {
                    format!("id:{}", a.id)
                };
                seen.insert(key)
            })
            .map(|a| a.name.as_str())
            .take(ARTIST_FAN_OUT)
            .collect();

        for name in artists {
            if outcome.is_full() {
                break;
            }
            let query = field_query("artist", name);
            match search.search(&query, ARTIST_RESULTS).await {
                Ok(tracks) => outcome.extend(tracks),
                Err(e) => outcome.record_failure(&query, &e),
            }
        }

        outcome
    }
}

/// Searches the profile's strongest genres.
pub struct GenreStrategy {
    genres: Vec<String>,
    delay: Duration,
}

impl GenreStrategy {
    /// `top_genres` must be ordered by descending frequency.
    pub fn new(top_genres: &[GenreCount], delay: Duration) -> Self {
        Self {
            genres: top_genres
                .iter()
                .take(GENRE_FAN_OUT)
                .map(|g| g.name.clone())
                .collect(),
            delay,
        }
    }
}

#[async_trait]
impl DiscoveryStrategy for GenreStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Genre
    }

    async fn run(
        &self,
        catalog: &dyn CatalogService,
        _seeds: &[Track],
        budget: usize,
    ) -> StrategyOutcome {
        let mut outcome = StrategyOutcome::new(self.kind(), budget);
        let mut search = PacedSearch::new(catalog, self.delay);

        for genre in &self.genres {
            if outcome.is_full() {
                break;
            }

            let query = field_query("genre", genre);
            match search.search(&query, GENRE_RESULTS).await {
                Ok(tracks) => {
                    outcome.extend(tracks);
                    continue;
                }
                Err(e) => outcome.record_failure(&query, &e),
            }

            // Some catalogs reject `genre:`; retry on the first word as plain text.
            let Some(keyword) = genre.split_whitespace().next() else {
                continue;
            };
            match search.search(keyword, GENRE_FALLBACK_RESULTS).await {
                Ok(tracks) => outcome.extend(tracks),
                Err(e) => outcome.record_failure(keyword, &e),
            }
        }

        outcome
    }
}

/// Lowercase words longer than two characters from the seeds' artist names,
/// unique in first-seen order.
pub fn derive_keywords(seeds: &[Track]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut keywords = Vec::new();

    for artist in seeds.iter().flat_map(|t| t.artists.iter()) {
        for word in artist.name.to_lowercase().split_whitespace() {
            if word.chars().count() < KEYWORD_MIN_CHARS {
                continue;
            }
            if seen.insert(word.to_string()) {
                keywords.push(word.to_string());
            }
        }
    }

    keywords.truncate(KEYWORD_FAN_OUT);
    keywords
}

/// Free-text search on words taken from the seed artists' names.
pub struct KeywordStrategy {
    delay: Duration,
}

impl KeywordStrategy {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl DiscoveryStrategy for KeywordStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Keyword
    }

    async fn run(
        &self,
        catalog: &dyn CatalogService,
        seeds: &[Track],
        budget: usize,
    ) -> StrategyOutcome {
        let mut outcome = StrategyOutcome::new(self.kind(), budget);
        let mut search = PacedSearch::new(catalog, self.delay);

        for keyword in derive_keywords(seeds) {
            if outcome.is_full() {
                break;
            }
            match search.search(&keyword, KEYWORD_RESULTS).await {
                Ok(tracks) => outcome.extend(tracks),
                Err(e) => outcome.record_failure(&keyword, &e),
            }
        }

        outcome
    }
}

/// Runs the strategies a mode calls for, concurrently, and returns their
/// outcomes in artist, genre, keyword order.
pub struct StrategyRunner {
    search_delay: Duration,
}

impl StrategyRunner {
    pub fn new(search_delay: Duration) -> Self {
        Self { search_delay }
    }

    pub async fn run(
        &self,
        catalog: &dyn CatalogService,
        mode: RecommendationMode,
        seeds: &[Track],
        top_genres: &[GenreCount],
        limit: usize,
    ) -> Vec<StrategyOutcome> {
        let budgets = StrategyBudgets::allocate(mode, limit);

        let mut plan: Vec<(Box<dyn DiscoveryStrategy>, usize)> =
            vec![(Box::new(ArtistStrategy::new(self.search_delay)), budgets.artist)];
        if mode == RecommendationMode::UserBased {
            plan.push((
                Box::new(GenreStrategy::new(top_genres, self.search_delay)),
                budgets.genre,
            ));
        }
        plan.push((
            Box::new(KeywordStrategy::new(self.search_delay)),
            budgets.keyword,
        ));

        let outcomes = join_all(
            plan.iter()
                .map(|(strategy, budget)| strategy.run(catalog, seeds, *budget)),
        )
        .await;

        for outcome in &outcomes {
            debug!(
                strategy = %outcome.kind,
                budget = outcome.budget,
                returned = outcome.tracks.len(),
                failed = outcome.failed_queries,
                "strategy finished"
            );
        }

        outcomes
    }
}
