#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
    time::Duration,
};

use async_trait::async_trait;
use tokio::time::Instant;

use seedlist::{
    config::EngineConfig,
    recommend::{CatalogError, CatalogService, ProfileError, ProfileStore},
    types::{AlbumRef, ArtistRef, ListeningProfile, Track},
};

pub fn track(id: &str, name: &str, artist: &str, popularity: u8) -> Track {
    Track {
        id: Some(id.to_string()),
        name: name.to_string(),
        artists: vec![ArtistRef {
            id: artist.to_lowercase().replace(' ', "-"),
            name: artist.to_string(),
            genres: Vec::new(),
        }],
        album: AlbumRef {
            id: None,
            name: format!("{} album", name),
            release_date: Some("2001-01-01".to_string()),
        },
        duration_ms: 200_000,
        popularity,
        uri: Some(format!("spotify:track:{}", id)),
        ..Default::default()
    }
}

pub fn ids(tracks: &[seedlist::types::RecommendedTrack]) -> Vec<&str> {
    tracks.iter().map(|t| t.id.as_str()).collect()
}

pub fn test_config() -> EngineConfig {
    EngineConfig {
        search_delay: Duration::ZERO,
        ..Default::default()
    }
}

/// Catalog answering from a fixed query table and recording every call.
#[derive(Default)]
pub struct FakeCatalog {
    responses: HashMap<String, Vec<Track>>,
    failing: HashSet<String>,
    hang: bool,
    calls: Mutex<Vec<(String, u32, Instant)>>,
    genres: HashMap<String, Vec<String>>,
    genre_lookup_fails: bool,
    genre_lookups: Mutex<Vec<Vec<String>>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, query: &str, tracks: Vec<Track>) -> Self {
        self.responses.insert(query.to_string(), tracks);
        self
    }

    pub fn fail(mut self, query: &str) -> Self {
        self.failing.insert(query.to_string());
        self
    }

    pub fn artist_genres(mut self, artist_id: &str, genres: &[&str]) -> Self {
        self.genres.insert(
            artist_id.to_string(),
            genres.iter().map(|g| g.to_string()).collect(),
        );
        self
    }

    pub fn fail_genre_lookup(mut self) -> Self {
        self.genre_lookup_fails = true;
        self
    }

    pub fn genre_lookups(&self) -> Vec<Vec<String>> {
        self.genre_lookups.lock().unwrap().clone()
    }

    pub fn hanging() -> Self {
        Self {
            hang: true,
            ..Default::default()
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(q, _, _)| q.clone())
            .collect()
    }

    pub fn calls(&self) -> Vec<(String, u32, Instant)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CatalogService for FakeCatalog {
    async fn search_tracks(&self, query: &str, limit: u32) -> Result<Vec<Track>, CatalogError> {
        self.calls
            .lock()
            .unwrap()
            .push((query.to_string(), limit, Instant::now()));

        if self.hang {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        if self.failing.contains(query) {
            return Err(CatalogError::Status(400, format!("rejected {}", query)));
        }
        Ok(self.responses.get(query).cloned().unwrap_or_default())
    }

    async fn artist_genres(
        &self,
        artist_ids: &[String],
    ) -> Result<HashMap<String, Vec<String>>, CatalogError> {
        self.genre_lookups.lock().unwrap().push(artist_ids.to_vec());
        if self.genre_lookup_fails {
            return Err(CatalogError::Status(503, "artists unavailable".to_string()));
        }
        Ok(artist_ids
            .iter()
            .filter_map(|id| self.genres.get(id).map(|g| (id.clone(), g.clone())))
            .collect())
    }
}

#[derive(Default)]
pub struct FakeProfiles {
    profiles: HashMap<String, ListeningProfile>,
    broken: bool,
}

impl FakeProfiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, profile: ListeningProfile) -> Self {
        self.profiles.insert(profile.user_id.clone(), profile);
        self
    }

    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl ProfileStore for FakeProfiles {
    async fn get_listening_profile(
        &self,
        user_id: &str,
    ) -> Result<Option<ListeningProfile>, ProfileError> {
        if self.broken {
            return Err(ProfileError::Io(std::io::Error::other("disk gone")));
        }
        Ok(self.profiles.get(user_id).cloned())
    }
}
