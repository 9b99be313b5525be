//! Spotify Web API adapter.
//!
//! [`SpotifyCatalog`] is the production [`CatalogService`] and also exposes
//! the user-data endpoints used when collecting a listening profile.

use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use tokio::{sync::Mutex, time::sleep};
use tracing::{debug, warn};

use crate::{
    config,
    management::TokenManager,
    recommend::{CatalogError, CatalogService},
    types::{
        Artist, CurrentUser, Paging, PlayHistoryItem, SavedTrackItem, SearchTracksResponse,
        SeveralArtistsResponse, SeveralTracksResponse, TimeWindow, Track,
    },
};

/// Largest page Spotify serves for search, top items and library endpoints.
pub const MAX_PAGE_SIZE: u32 = 50;

/// Largest `Retry-After` we are willing to wait out.
const MAX_RETRY_AFTER_SECS: u64 = 120;

const BAD_GATEWAY_PAUSE: Duration = Duration::from_secs(2);

pub struct SpotifyCatalog {
    http: Client,
    base_url: String,
    tokens: Mutex<TokenManager>,
}

impl SpotifyCatalog {
    pub fn new(tokens: TokenManager) -> Self {
        Self::with_base_url(&config::spotify_apiurl(), tokens)
    }

    /// Client against a custom API root, e.g. a mock server.
    pub fn with_base_url(base_url: &str, tokens: TokenManager) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens: Mutex::new(tokens),
        }
    }

    /// Builds a client from the cached token of `seedlist auth`.
    pub async fn from_cache() -> Result<Self, String> {
        TokenManager::load().await.map(Self::new)
    }

    async fn token(&self) -> String {
        self.tokens.lock().await.get_valid_token().await
    }

    /// Sends a request and decodes the JSON answer.
    ///
    /// A 429 with an acceptable `Retry-After` and a 502 are each retried once.
    pub(crate) async fn request<B, T>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<T, CatalogError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let mut retried = false;

        loop {
            let token = self.token().await;
            let mut builder = self
                .http
                .request(method.clone(), &url)
                .bearer_auth(&token)
                .query(query);
            if let Some(body) = body {
                builder = builder.json(body);
            }

            let response = builder.send().await?;
            let status = response.status();

            if status.is_success() {
                return Ok(response.json::<T>().await?);
            }

            match status {
                StatusCode::TOO_MANY_REQUESTS => {
                    let retry_after = response
                        .headers()
                        .get("retry-after")
                        .and_then(|v| v.to_str().ok())
                        .and_then(|v| v.parse::<u64>().ok())
                        .unwrap_or(1);
                    if retried || retry_after > MAX_RETRY_AFTER_SECS {
                        return Err(CatalogError::RateLimited(retry_after));
                    }
                    warn!(path, retry_after, "rate limited by Spotify, waiting");
                    sleep(Duration::from_secs(retry_after)).await;
                    retried = true;
                }
                StatusCode::BAD_GATEWAY if !retried => {
                    debug!(path, "bad gateway, retrying once");
                    sleep(BAD_GATEWAY_PAUSE).await;
                    retried = true;
                }
                StatusCode::UNAUTHORIZED => {
                    let body = response.text().await.unwrap_or_default();
                    return Err(CatalogError::Auth(body));
                }
                _ => {
                    let body = response.text().await.unwrap_or_default();
                    return Err(CatalogError::Status(status.as_u16(), body));
                }
            }
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, CatalogError> {
        self.request::<(), T>(Method::GET, path, query, None).await
    }

    /// Full track objects for the given ids, fetched 50 at a time. Unknown ids
    /// are skipped.
    pub async fn get_tracks(&self, ids: &[String]) -> Result<Vec<Track>, CatalogError> {
        let mut tracks = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(MAX_PAGE_SIZE as usize) {
            let res: SeveralTracksResponse =
                self.get("/tracks", &[("ids", chunk.join(","))]).await?;
            tracks.extend(res.tracks.into_iter().flatten());
        }
        Ok(tracks)
    }

    /// Full artist objects (with genres) for the given ids.
    pub async fn get_artists(&self, ids: &[String]) -> Result<Vec<Artist>, CatalogError> {
        let mut artists = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(MAX_PAGE_SIZE as usize) {
            let res: SeveralArtistsResponse =
                self.get("/artists", &[("ids", chunk.join(","))]).await?;
            artists.extend(res.artists.into_iter().flatten());
        }
        Ok(artists)
    }

    pub async fn current_user(&self) -> Result<CurrentUser, CatalogError> {
        self.get("/me", &[]).await
    }

    pub async fn top_tracks(
        &self,
        window: TimeWindow,
        limit: u32,
    ) -> Result<Vec<Track>, CatalogError> {
        let page: Paging<Track> = self
            .get(
                "/me/top/tracks",
                &[
                    ("time_range", window.as_str().to_string()),
                    ("limit", page_size(limit)),
                ],
            )
            .await?;
        Ok(page.items)
    }

    pub async fn top_artists(
        &self,
        window: TimeWindow,
        limit: u32,
    ) -> Result<Vec<Artist>, CatalogError> {
        let page: Paging<Artist> = self
            .get(
                "/me/top/artists",
                &[
                    ("time_range", window.as_str().to_string()),
                    ("limit", page_size(limit)),
                ],
            )
            .await?;
        Ok(page.items)
    }

    pub async fn recently_played(&self, limit: u32) -> Result<Vec<Track>, CatalogError> {
        let page: Paging<PlayHistoryItem> = self
            .get("/me/player/recently-played", &[("limit", page_size(limit))])
            .await?;
        Ok(page.items.into_iter().map(|i| i.track).collect())
    }

    pub async fn saved_tracks(&self, limit: u32) -> Result<Vec<Track>, CatalogError> {
        let page: Paging<SavedTrackItem> = self
            .get("/me/tracks", &[("limit", page_size(limit))])
            .await?;
        Ok(page.items.into_iter().map(|i| i.track).collect())
    }
}

#[async_trait]
impl CatalogService for SpotifyCatalog {
    async fn search_tracks(&self, query: &str, limit: u32) -> Result<Vec<Track>, CatalogError> {
        let res: SearchTracksResponse = self
            .get(
                "/search",
                &[
                    ("q", query.to_string()),
                    ("type", "track".to_string()),
                    ("limit", page_size(limit)),
                ],
            )
            .await?;
        Ok(res.tracks.items)
    }

    async fn artist_genres(
        &self,
        artist_ids: &[String],
    ) -> Result<HashMap<String, Vec<String>>, CatalogError> {
        Ok(self
            .get_artists(artist_ids)
            .await?
            .into_iter()
            .map(|a| (a.id, a.genres))
            .collect())
    }
}

fn page_size(limit: u32) -> String {
    limit.clamp(1, MAX_PAGE_SIZE).to_string()
}
