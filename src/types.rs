use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    pub scope: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

#[derive(Debug, Clone)]
pub struct PkceToken {
    pub code_verifier: String,
    pub token: Option<Token>,
}

/// Artist as referenced from a track. Search results never carry genres,
/// profile data may.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArtistRef {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlbumRef {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub release_date: Option<String>,
}

impl AlbumRef {
    /// Year part of the release date; the catalog reports `YYYY`, `YYYY-MM`
    /// or `YYYY-MM-DD` depending on precision.
    pub fn release_year(&self) -> Option<i32> {
        let date = self.release_date.as_deref()?;
        if let Ok(parsed) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
            return Some(parsed.year());
        }
        date.split('-').next().and_then(|y| y.parse::<i32>().ok())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExternalUrls {
    #[serde(default)]
    pub spotify: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Track {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    #[serde(default)]
    pub album: AlbumRef,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub popularity: u8,
    #[serde(default)]
    pub preview_url: Option<String>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    #[serde(default)]
    pub uri: Option<String>,
}

impl Track {
    /// The catalog id, treating an empty string like a missing one.
    pub fn track_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn artist_names(&self) -> String {
        self.artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<&str>>()
            .join(", ")
    }
}

/// Full artist object as returned by `/artists` and `/me/top/artists`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub popularity: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeWindow {
    ShortTerm,
    MediumTerm,
    LongTerm,
}

impl TimeWindow {
    pub const ALL: [TimeWindow; 3] = [
        TimeWindow::ShortTerm,
        TimeWindow::MediumTerm,
        TimeWindow::LongTerm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeWindow::ShortTerm => "short_term",
            TimeWindow::MediumTerm => "medium_term",
            TimeWindow::LongTerm => "long_term",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ByWindow<T> {
    #[serde(default)]
    pub short_term: Vec<T>,
    #[serde(default)]
    pub medium_term: Vec<T>,
    #[serde(default)]
    pub long_term: Vec<T>,
}

impl<T> Default for ByWindow<T> {
    fn default() -> Self {
        Self {
            short_term: Vec::new(),
            medium_term: Vec::new(),
            long_term: Vec::new(),
        }
    }
}

impl<T> ByWindow<T> {
    pub fn get(&self, window: TimeWindow) -> &[T] {
        match window {
            TimeWindow::ShortTerm => &self.short_term,
            TimeWindow::MediumTerm => &self.medium_term,
            TimeWindow::LongTerm => &self.long_term,
        }
    }

    pub fn set(&mut self, window: TimeWindow, items: Vec<T>) {
        match window {
            TimeWindow::ShortTerm => self.short_term = items,
            TimeWindow::MediumTerm => self.medium_term = items,
            TimeWindow::LongTerm => self.long_term = items,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreCount {
    pub name: String,
    pub count: u32,
}

/// A stored copy of a user's listening history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListeningProfile {
    pub user_id: String,
    pub collected_at: DateTime<Utc>,
    #[serde(default)]
    pub top_tracks: ByWindow<Track>,
    #[serde(default)]
    pub top_artists: ByWindow<Artist>,
    #[serde(default)]
    pub recently_played: Vec<Track>,
    #[serde(default)]
    pub saved_tracks: Vec<Track>,
    /// Ordered by descending count.
    #[serde(default)]
    pub top_genres: Vec<GenreCount>,
}

impl ListeningProfile {
    pub fn new(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            collected_at: Utc::now(),
            top_tracks: ByWindow::default(),
            top_artists: ByWindow::default(),
            recently_played: Vec::new(),
            saved_tracks: Vec::new(),
            top_genres: Vec::new(),
        }
    }

    /// Every track the profile knows about, in no particular order.
    pub fn known_tracks(&self) -> impl Iterator<Item = &Track> {
        TimeWindow::ALL
            .iter()
            .flat_map(|w| self.top_tracks.get(*w).iter())
            .chain(self.recently_played.iter())
            .chain(self.saved_tracks.iter())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationMode {
    Independent,
    UserBased,
}

impl std::fmt::Display for RecommendationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecommendationMode::Independent => write!(f, "independent"),
            RecommendationMode::UserBased => write!(f, "user_based"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Artist,
    Genre,
    Keyword,
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StrategyKind::Artist => write!(f, "artist"),
            StrategyKind::Genre => write!(f, "genre"),
            StrategyKind::Keyword => write!(f, "keyword"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyReport {
    pub kind: StrategyKind,
    pub budget: usize,
    pub returned: usize,
    pub failed_queries: usize,
}

/// A recommended track in the shape handed back to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendedTrack {
    pub id: String,
    pub name: String,
    pub artists: Vec<String>,
    pub album: String,
    pub release_date: Option<String>,
    pub duration_ms: u64,
    pub duration: String,
    pub popularity: u8,
    pub preview_url: Option<String>,
    pub external_url: Option<String>,
    pub uri: Option<String>,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationMetadata {
    pub input_count: usize,
    pub seeds_used: Vec<String>,
    pub total_candidates: usize,
    pub final_count: usize,
    pub mode: RecommendationMode,
    pub generated_at: DateTime<Utc>,
    pub strategies: Vec<StrategyReport>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub recommendations: Vec<RecommendedTrack>,
    pub metadata: RecommendationMetadata,
}

#[derive(Tabled)]
pub struct RecommendationTableRow {
    #[tabled(rename = "#")]
    pub rank: usize,
    pub name: String,
    pub artists: String,
    pub album: String,
    pub length: String,
    pub score: String,
}

#[derive(Tabled)]
pub struct ProfileTableRow {
    pub section: String,
    pub entries: usize,
    pub highlights: String,
}

// ── Spotify Web API payloads ─────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paging<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchTracksResponse {
    pub tracks: Paging<Track>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeveralTracksResponse {
    pub tracks: Vec<Option<Track>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeveralArtistsResponse {
    pub artists: Vec<Option<Artist>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayHistoryItem {
    pub track: Track,
    #[serde(default)]
    pub played_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedTrackItem {
    pub track: Track,
    #[serde(default)]
    pub added_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub description: String,
    pub public: bool,
    pub collaborative: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistResponse {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub public: Option<bool>,
    pub collaborative: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTrackToPlaylistRequest {
    pub uris: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTrackToPlaylistResponse {
    pub snapshot_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub public: Option<bool>,
    pub collaborative: bool,
    pub snapshot_id: String,
}
