use reqwest::Method;

use crate::{
    recommend::CatalogError,
    types::{
        AddTrackToPlaylistRequest, AddTrackToPlaylistResponse, CreatePlaylistRequest,
        CreatePlaylistResponse, Paging, Playlist,
    },
};

use super::client::{MAX_PAGE_SIZE, SpotifyCatalog};

/// Spotify accepts at most 100 uris per add request.
const MAX_TRACKS_PER_REQUEST: usize = 100;

impl SpotifyCatalog {
    /// Checks whether the current user already has a playlist called `name`.
    pub async fn playlist_exists(&self, name: &str) -> Result<bool, CatalogError> {
        let mut offset = 0u32;
        loop {
            let page: Paging<Playlist> = self
                .request::<(), _>(
                    Method::GET,
                    "/me/playlists",
                    &[
                        ("limit", MAX_PAGE_SIZE.to_string()),
                        ("offset", offset.to_string()),
                    ],
                    None,
                )
                .await?;

            if page.items.iter().any(|p| p.name == name) {
                return Ok(true);
            }
            if page.next.is_none() || page.items.is_empty() {
                return Ok(false);
            }
            offset += page.items.len() as u32;
        }
    }

    /// Creates a private playlist for `user_id`.
    pub async fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        description: &str,
    ) -> Result<CreatePlaylistResponse, CatalogError> {
        let body = CreatePlaylistRequest {
            name: name.to_string(),
            description: description.to_string(),
            public: false,
            collaborative: false,
        };
        self.request(
            Method::POST,
            &format!("/users/{}/playlists", user_id),
            &[],
            Some(&body),
        )
        .await
    }

    /// Adds `uris` in request-sized batches and returns the last snapshot id.
    pub async fn add_tracks(
        &self,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<Option<String>, CatalogError> {
        let path = format!("/playlists/{}/tracks", playlist_id);
        let mut snapshot = None;

        for chunk in uris.chunks(MAX_TRACKS_PER_REQUEST) {
            let body = AddTrackToPlaylistRequest {
                uris: chunk.to_vec(),
            };
            let res: AddTrackToPlaylistResponse = self
                .request(Method::POST, &path, &[], Some(&body))
                .await?;
            snapshot = Some(res.snapshot_id);
        }

        Ok(snapshot)
    }
}
