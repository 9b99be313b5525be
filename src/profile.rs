//! Listening profile collection.
//!
//! Pulls a user's top items, recent plays and saved tracks from Spotify and
//! condenses the genres of their top artists into a ranked list.

use tracing::{debug, info};

use crate::{
    recommend::CatalogError,
    spotify::{SpotifyCatalog, client::MAX_PAGE_SIZE},
    types::{ListeningProfile, TimeWindow},
    utils,
};

/// Collects a fresh profile for `user_id` using the authorized account.
pub async fn collect(
    catalog: &SpotifyCatalog,
    user_id: &str,
) -> Result<ListeningProfile, CatalogError> {
    let mut profile = ListeningProfile::new(user_id);

    for window in TimeWindow::ALL {
        let tracks = catalog.top_tracks(window, MAX_PAGE_SIZE).await?;
        let artists = catalog.top_artists(window, MAX_PAGE_SIZE).await?;
        debug!(
            window = window.as_str(),
            tracks = tracks.len(),
            artists = artists.len(),
            "collected top items"
        );
        profile.top_tracks.set(window, tracks);
        profile.top_artists.set(window, artists);
    }

    profile.recently_played = catalog.recently_played(MAX_PAGE_SIZE).await?;
    profile.saved_tracks = catalog.saved_tracks(MAX_PAGE_SIZE).await?;
    profile.top_genres = utils::count_genres(
        TimeWindow::ALL
            .iter()
            .flat_map(|w| profile.top_artists.get(*w).iter()),
    );

    info!(
        user = user_id,
        known_tracks = profile.known_tracks().count(),
        genres = profile.top_genres.len(),
        "listening profile collected"
    );

    Ok(profile)
}
