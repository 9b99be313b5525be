//! Recommendation facade.
//!
//! Orchestrates seed selection, the discovery strategies, aggregation and
//! ranking for the two operating modes:
//!
//! - **independent**: caller-supplied tracks only, artist + keyword strategies
//! - **user-based**: supplied tracks or a sample of the stored profile, plus
//!   the genre strategy driven by the profile's top genres
//!
//! The engine keeps no state between calls beyond its collaborator handles.

use std::{collections::HashSet, future::Future, sync::Arc};

use chrono::Utc;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::{
    config::EngineConfig,
    recommend::{
        aggregate::{aggregate, track_ids},
        error::RecommendationError,
        ports::{CatalogService, ProfileStore},
        score::{RandomSource, ScoredTrack, Scorer, ScoringContext, ThreadRandom},
        seeds::{sample_distinct, select_seeds},
        strategy::StrategyRunner,
    },
    types::{
        GenreCount, ListeningProfile, RecommendationMetadata, RecommendationMode,
        RecommendationResult, RecommendedTrack, StrategyReport, TimeWindow, Track,
    },
    utils,
};

/// Tracks taken from each profile list when deriving seed material.
const PROFILE_SAMPLE_PER_SOURCE: usize = 10;

/// Largest `limit` a request may ask for.
pub const MAX_LIMIT: usize = 100;

/// Everything one generation pass needs after mode-specific preparation.
struct Request {
    mode: RecommendationMode,
    inputs: Vec<Track>,
    excluded: HashSet<String>,
    top_genres: Vec<GenreCount>,
    limit: usize,
}

pub struct RecommendationEngine {
    catalog: Arc<dyn CatalogService>,
    profiles: Arc<dyn ProfileStore>,
    runner: StrategyRunner,
    scorer: Scorer,
    config: EngineConfig,
}

impl RecommendationEngine {
    pub fn new(
        catalog: Arc<dyn CatalogService>,
        profiles: Arc<dyn ProfileStore>,
        config: EngineConfig,
    ) -> Self {
        Self::with_random(catalog, profiles, config, Arc::new(ThreadRandom))
    }

    /// Same as [`RecommendationEngine::new`] with an explicit random source
    /// for the discovery term.
    pub fn with_random(
        catalog: Arc<dyn CatalogService>,
        profiles: Arc<dyn ProfileStore>,
        config: EngineConfig,
        random: Arc<dyn RandomSource>,
    ) -> Self {
        Self {
            catalog,
            profiles,
            runner: StrategyRunner::new(config.search_delay),
            scorer: Scorer::new(config.scoring.clone(), random),
            config,
        }
    }

    /// Recommendations driven only by `inputs`.
    pub async fn recommend_independent(
        &self,
        inputs: &[Track],
        limit: usize,
    ) -> Result<RecommendationResult, RecommendationError> {
        if inputs.is_empty() {
            return Err(RecommendationError::InvalidInput(
                "at least one input track is required".to_string(),
            ));
        }
        check_limit(limit)?;

        let request = Request {
            mode: RecommendationMode::Independent,
            inputs: inputs.to_vec(),
            excluded: track_ids(inputs),
            top_genres: Vec::new(),
            limit,
        };

        self.within_timeout(async { Ok(self.generate(request).await) })
            .await
    }

    /// Recommendations informed by the user's stored listening profile.
    ///
    /// With empty `inputs` the seed material is sampled from the profile, and
    /// a missing profile is `NoDataAvailable`.
    pub async fn recommend_user_based(
        &self,
        user_id: &str,
        inputs: &[Track],
        limit: usize,
    ) -> Result<RecommendationResult, RecommendationError> {
        check_limit(limit)?;
        self.within_timeout(self.prepare_and_generate(user_id, inputs, limit))
            .await
    }

    async fn prepare_and_generate(
        &self,
        user_id: &str,
        inputs: &[Track],
        limit: usize,
    ) -> Result<RecommendationResult, RecommendationError> {
        let profile = self.profiles.get_listening_profile(user_id).await?;

        let seed_material = if inputs.is_empty() {
            let Some(profile) = profile.as_ref() else {
                return Err(RecommendationError::NoDataAvailable(user_id.to_string()));
            };
            let sample = profile_sample(profile);
            if sample.is_empty() && profile.top_genres.is_empty() {
                return Err(RecommendationError::NoDataAvailable(user_id.to_string()));
            }
            sample
        } else {
            inputs.to_vec()
        };

        let mut excluded = track_ids(&seed_material);
        let mut top_genres = Vec::new();
        if let Some(profile) = profile.as_ref() {
            if self.config.exclude_known_tracks {
                excluded.extend(track_ids(profile.known_tracks()));
            }
            top_genres = profile.top_genres.clone();
        }

        let request = Request {
            mode: RecommendationMode::UserBased,
            inputs: seed_material,
            excluded,
            top_genres,
            limit,
        };

        Ok(self.generate(request).await)
    }

    async fn within_timeout<F>(&self, work: F) -> Result<RecommendationResult, RecommendationError>
    where
        F: Future<Output = Result<RecommendationResult, RecommendationError>>,
    {
        match timeout(self.config.request_timeout, work).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    timeout_ms = self.config.request_timeout.as_millis() as u64,
                    "recommendation request timed out"
                );
                Err(RecommendationError::CatalogUnavailable(format!(
                    "request timed out after {} ms",
                    self.config.request_timeout.as_millis()
                )))
            }
        }
    }

    async fn generate(&self, request: Request) -> RecommendationResult {
        let seeds = select_seeds(&request.inputs, self.config.max_seeds);
        info!(
            mode = %request.mode,
            inputs = request.inputs.len(),
            seeds = seeds.len(),
            limit = request.limit,
            "generating recommendations"
        );

        let outcomes = self
            .runner
            .run(
                self.catalog.as_ref(),
                request.mode,
                &seeds,
                &request.top_genres,
                request.limit,
            )
            .await;

        let strategies: Vec<StrategyReport> = outcomes.iter().map(|o| o.report()).collect();
        let total_candidates: usize = outcomes.iter().map(|o| o.tracks.len()).sum();
        let mut pool = aggregate(
            outcomes.into_iter().map(|o| o.tracks).collect(),
            &request.excluded,
        );
        if !request.top_genres.is_empty() && self.config.scoring.genre_match_bonus > 0.0 {
            self.attach_genres(&mut pool).await;
        }

        let context = ScoringContext::from_inputs(&request.inputs).with_genres(&request.top_genres);
        let recommendations: Vec<RecommendedTrack> = self
            .scorer
            .rank(pool, &context, request.limit)
            .into_iter()
            .filter_map(format_track)
            .collect();

        info!(
            mode = %request.mode,
            candidates = total_candidates,
            returned = recommendations.len(),
            "recommendations ready"
        );

        RecommendationResult {
            metadata: RecommendationMetadata {
                input_count: request.inputs.len(),
                seeds_used: seeds
                    .iter()
                    .filter_map(|t| t.track_id())
                    .map(str::to_string)
                    .collect(),
                total_candidates,
                final_count: recommendations.len(),
                mode: request.mode,
                generated_at: Utc::now(),
                strategies,
            },
            recommendations,
        }
    }
}

impl RecommendationEngine {
    /// Fills in artist genres on the pool from the catalog. Search results
    /// carry none, so without this the genre bonus never applies.
    async fn attach_genres(&self, pool: &mut [Track]) {
        let mut artist_ids: Vec<String> = Vec::new();
        for artist in pool.iter().flat_map(|t| t.artists.iter()) {
            if !artist.id.is_empty() && !artist_ids.contains(&artist.id) {
                artist_ids.push(artist.id.clone());
            }
        }
        if artist_ids.is_empty() {
            return;
        }

        match self.catalog.artist_genres(&artist_ids).await {
            Ok(genres) => {
                for artist in pool.iter_mut().flat_map(|t| t.artists.iter_mut()) {
                    if let Some(found) = genres.get(&artist.id) {
                        artist.genres = found.clone();
                    }
                }
            }
            Err(e) => warn!(artists = artist_ids.len(), error = %e, "artist genre lookup failed"),
        }
    }
}

fn check_limit(limit: usize) -> Result<(), RecommendationError> {
    if limit == 0 || limit > MAX_LIMIT {
        return Err(RecommendationError::InvalidInput(format!(
            "limit must be between 1 and {}, got {}",
            MAX_LIMIT, limit
        )));
    }
    Ok(())
}

fn profile_sample(profile: &ListeningProfile) -> Vec<Track> {
    sample_distinct(
        &[
            profile.top_tracks.get(TimeWindow::ShortTerm),
            profile.top_tracks.get(TimeWindow::MediumTerm),
            profile.recently_played.as_slice(),
        ],
        PROFILE_SAMPLE_PER_SOURCE,
    )
}

fn format_track(scored: ScoredTrack) -> Option<RecommendedTrack> {
    let ScoredTrack { track, score } = scored;
    let id = track.track_id()?.to_string();

    Some(RecommendedTrack {
        id,
        artists: track.artists.iter().map(|a| a.name.clone()).collect(),
        duration: utils::format_duration(track.duration_ms),
        name: track.name,
        album: track.album.name,
        release_date: track.album.release_date,
        duration_ms: track.duration_ms,
        popularity: track.popularity,
        preview_url: track.preview_url,
        external_url: track.external_urls.spotify,
        uri: track.uri,
        score,
    })
}
