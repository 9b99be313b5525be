use std::sync::Arc;

use chrono::Local;
use tabled::Table;

use crate::{
    config::EngineConfig,
    error, info,
    management::ProfileManager,
    recommend::RecommendationEngine,
    spotify::SpotifyCatalog,
    success,
    types::{RecommendationResult, RecommendationTableRow, Track},
    utils, warning,
};

use super::{connect, resolve_user, spinner};

#[derive(Debug, Clone)]
pub struct RecommendOptions {
    /// Track ids, `spotify:track:` uris or open.spotify.com links.
    pub tracks: Vec<String>,
    /// User-based mode when set; `me` is the authorized account.
    pub user: Option<String>,
    pub limit: usize,
    pub playlist: Option<String>,
    pub json: bool,
}

pub async fn recommend(opts: RecommendOptions) {
    if opts.tracks.is_empty() && opts.user.is_none() {
        error!("Pass at least one --track, or --user for profile based recommendations.");
    }

    let catalog = Arc::new(connect().await);
    let inputs = resolve_tracks(&catalog, &opts.tracks).await;

    let engine = RecommendationEngine::new(
        catalog.clone(),
        Arc::new(ProfileManager::new()),
        EngineConfig::from_env(),
    );

    let pb = spinner("Searching for recommendations...");
    let outcome = match opts.user.clone() {
        Some(user) => {
            let user_id = resolve_user(&catalog, Some(user)).await;
            engine
                .recommend_user_based(&user_id, &inputs, opts.limit)
                .await
        }
        None => engine.recommend_independent(&inputs, opts.limit).await,
    };
    pb.finish_and_clear();

    let result = match outcome {
        Ok(result) => result,
        Err(e) => error!("{}", e),
    };

    if opts.json {
        match serde_json::to_string_pretty(&result) {
            Ok(json) => println!("{}", json),
            Err(e) => error!("Failed to serialize recommendations. Err: {}", e),
        }
    } else {
        print_table(&result);
    }

    if let Some(name) = opts.playlist {
        save_playlist(&catalog, &name, &result).await;
    }
}

async fn resolve_tracks(catalog: &SpotifyCatalog, raw: &[String]) -> Vec<Track> {
    if raw.is_empty() {
        return Vec::new();
    }

    let mut ids = Vec::with_capacity(raw.len());
    for input in raw {
        match utils::parse_track_id(input) {
            Ok(id) => ids.push(id),
            Err(e) => warning!("{}", e),
        }
    }

    match catalog.get_tracks(&ids).await {
        Ok(tracks) => {
            if tracks.len() < ids.len() {
                warning!(
                    "{} of {} tracks were not found",
                    ids.len() - tracks.len(),
                    ids.len()
                );
            }
            tracks
        }
        Err(e) => error!("Failed to look up input tracks. Err: {}", e),
    }
}

fn print_table(result: &RecommendationResult) {
    if result.recommendations.is_empty() {
        warning!("No recommendations found.");
        return;
    }

    let rows: Vec<RecommendationTableRow> = result
        .recommendations
        .iter()
        .enumerate()
        .map(|(i, r)| RecommendationTableRow {
            rank: i + 1,
            name: utils::truncate(&r.name, 40),
            artists: utils::truncate(&r.artists.join(", "), 30),
            album: utils::truncate(&r.album, 30),
            length: r.duration.clone(),
            score: format!("{:.3}", r.score),
        })
        .collect();

    println!("{}", Table::new(rows));
    info!(
        "{} of {} candidates, {} mode, seeds: {}",
        result.metadata.final_count,
        result.metadata.total_candidates,
        result.metadata.mode,
        result.metadata.seeds_used.join(", ")
    );
}

async fn save_playlist(catalog: &SpotifyCatalog, name: &str, result: &RecommendationResult) {
    let uris: Vec<String> = result
        .recommendations
        .iter()
        .filter_map(|r| r.uri.clone())
        .collect();
    if uris.is_empty() {
        warning!("Nothing to add, playlist {} not created", name);
        return;
    }

    match catalog.playlist_exists(name).await {
        Ok(true) => {
            info!("Playlist {} already exists", name);
            return;
        }
        Ok(false) => {}
        Err(e) => warning!("Failed to check if playlist exists: {}", e),
    }

    let owner = resolve_user(catalog, None).await;
    let description = format!(
        "{} mode recommendations, generated {}",
        result.metadata.mode,
        Local::now().format("%Y-%m-%d")
    );

    let playlist = match catalog.create_playlist(&owner, name, &description).await {
        Ok(p) => p,
        Err(e) => error!("Failed to create playlist: {}", e),
    };

    match catalog.add_tracks(&playlist.id, &uris).await {
        Ok(_) => success!("Playlist {} created with {} tracks", name, uris.len()),
        Err(e) => warning!("Playlist {} created, adding tracks failed: {}", name, e),
    }
}
