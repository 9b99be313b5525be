//! Collaborator contracts consumed by the engine.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::{
    recommend::error::{CatalogError, ProfileError},
    types::{ListeningProfile, Track},
};

/// Remote track catalog.
///
/// `query` may be free text or field-scoped (`artist:...`, `genre:...`).
/// A failing call is an error for that call only, never a partial result.
#[async_trait]
pub trait CatalogService: Send + Sync {
    async fn search_tracks(&self, query: &str, limit: u32) -> Result<Vec<Track>, CatalogError>;

    /// Genres of the given artists, keyed by artist id. Artists the catalog
    /// does not know are left out.
    async fn artist_genres(
        &self,
        artist_ids: &[String],
    ) -> Result<HashMap<String, Vec<String>>, CatalogError> {
        let _ = artist_ids;
        Ok(HashMap::new())
    }
}

/// Read-only access to collected listening history.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// `Ok(None)` when nothing was collected for the user yet.
    async fn get_listening_profile(
        &self,
        user_id: &str,
    ) -> Result<Option<ListeningProfile>, ProfileError>;
}
