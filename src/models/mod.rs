use serde::{Deserialize, Serialize};

pub mod account;
pub mod admin;
pub mod content;
pub mod favourite;
pub mod user;

pub use account::{AccountRecord, SessionRecord};
pub use admin::{AuditAction, AuditLogEntry, FeatureFlagSet, NewAuditEntry, RECENT_AUDIT_LIMIT};
pub use content::ContentItem;
pub use favourite::FavouriteRecord;
pub use user::{ProfilePatch, ProfileUpdate, UserProfile};

/// OMDb uses this literal for missing values
const OMDB_MISSING: &str = "N/A";

/// A title returned by the metadata search
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetadataTitle {
    pub imdb_id: String,
    pub title: String,
    /// Release year or year range, e.g. "2019–2021"
    pub year: Option<String>,
    pub poster: Option<String>,
    pub kind: TitleKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum TitleKind {
    Movie,
    Series,
    Episode,
    Other,
}

impl TitleKind {
    fn from_omdb(raw: &str) -> Self {
        match raw {
            "movie" => TitleKind::Movie,
            "series" => TitleKind::Series,
            "episode" => TitleKind::Episode,
            _ => TitleKind::Other,
        }
    }
}

/// Full metadata for one title
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetadataDetails {
    pub imdb_id: String,
    pub title: String,
    pub year: Option<String>,
    pub rated: Option<String>,
    pub genre: Option<String>,
    pub director: Option<String>,
    pub actors: Option<String>,
    pub plot: Option<String>,
    pub poster: Option<String>,
    pub imdb_rating: Option<String>,
}

/// Best-match trailer for a title
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrailerMatch {
    pub video_id: String,
    pub title: Option<String>,
    pub watch_url: String,
}

impl TrailerMatch {
    pub fn new(video_id: String, title: Option<String>) -> Self {
        let watch_url = format!("https://www.youtube.com/watch?v={}", video_id);
        Self {
            video_id,
            title,
            watch_url,
        }
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty() && v != OMDB_MISSING)
}

// ============================================================================
// OMDb API Types
// ============================================================================

/// Raw response from `?s=` searches
#[derive(Debug, Clone, Deserialize)]
pub struct OmdbSearchResponse {
    #[serde(rename = "Search", default)]
    pub search: Vec<OmdbSearchItem>,
    #[serde(rename = "Response")]
    pub response: String,
    #[serde(rename = "Error", default)]
    pub error: Option<String>,
}

impl OmdbSearchResponse {
    pub fn is_success(&self) -> bool {
        self.response.eq_ignore_ascii_case("true")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OmdbSearchItem {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Year", default)]
    pub year: Option<String>,
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    #[serde(rename = "Type", default)]
    pub kind: String,
    #[serde(rename = "Poster", default)]
    pub poster: Option<String>,
}

impl From<OmdbSearchItem> for MetadataTitle {
    fn from(item: OmdbSearchItem) -> Self {
        MetadataTitle {
            imdb_id: item.imdb_id,
            title: item.title,
            year: present(item.year),
            poster: present(item.poster),
            kind: TitleKind::from_omdb(&item.kind),
        }
    }
}

/// Raw response from `?i=` lookups
#[derive(Debug, Clone, Deserialize)]
pub struct OmdbDetails {
    #[serde(rename = "Response")]
    pub response: String,
    #[serde(rename = "Error", default)]
    pub error: Option<String>,
    #[serde(rename = "imdbID", default)]
    pub imdb_id: Option<String>,
    #[serde(rename = "Title", default)]
    pub title: Option<String>,
    #[serde(rename = "Year", default)]
    pub year: Option<String>,
    #[serde(rename = "Rated", default)]
    pub rated: Option<String>,
    #[serde(rename = "Genre", default)]
    pub genre: Option<String>,
    #[serde(rename = "Director", default)]
    pub director: Option<String>,
    #[serde(rename = "Actors", default)]
    pub actors: Option<String>,
    #[serde(rename = "Plot", default)]
    pub plot: Option<String>,
    #[serde(rename = "Poster", default)]
    pub poster: Option<String>,
    #[serde(rename = "imdbRating", default)]
    pub imdb_rating: Option<String>,
}

impl OmdbDetails {
    pub fn is_success(&self) -> bool {
        self.response.eq_ignore_ascii_case("true")
    }

    /// Converts a successful lookup; `None` when the body reports a failure
    pub fn into_details(self) -> Option<MetadataDetails> {
        if !self.is_success() {
            return None;
        }
        Some(MetadataDetails {
            imdb_id: self.imdb_id?,
            title: self.title.unwrap_or_default(),
            year: present(self.year),
            rated: present(self.rated),
            genre: present(self.genre),
            director: present(self.director),
            actors: present(self.actors),
            plot: present(self.plot),
            poster: present(self.poster),
            imdb_rating: present(self.imdb_rating),
        })
    }
}

// ============================================================================
// YouTube Data API Types
// ============================================================================

pub const YOUTUBE_VIDEO_KIND: &str = "youtube#video";

#[derive(Debug, Clone, Deserialize)]
pub struct YoutubeSearchResponse {
    #[serde(default)]
    pub items: Vec<YoutubeSearchItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YoutubeSearchItem {
    pub id: YoutubeItemId,
    #[serde(default)]
    pub snippet: Option<YoutubeSnippet>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YoutubeItemId {
    pub kind: String,
    #[serde(default)]
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YoutubeSnippet {
    #[serde(default)]
    pub title: Option<String>,
}

impl YoutubeSearchResponse {
    /// First result, if it is a video
    pub fn best_match(self) -> Option<TrailerMatch> {
        let first = self.items.into_iter().next()?;
        if first.id.kind != YOUTUBE_VIDEO_KIND {
            return None;
        }
        let video_id = first.id.video_id?;
        Some(TrailerMatch::new(
            video_id,
            first.snippet.and_then(|s| s.title),
        ))
    }
}
