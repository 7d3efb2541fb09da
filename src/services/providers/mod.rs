//! External search providers.
//!
//! Title metadata and trailer lookups go through these traits so the HTTP
//! clients can be swapped or stubbed. Both bundled providers put an optional
//! Redis cache in front of their API calls.

use crate::{
    error::{AppError, AppResult},
    models::{MetadataDetails, MetadataTitle, TrailerMatch},
};

pub mod omdb;
pub mod youtube;

pub use omdb::OmdbProvider;
pub use youtube::YoutubeProvider;

/// Title metadata source
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Titles matching a free-text query; an unknown title yields an empty list
    async fn search_titles(&self, query: &str) -> AppResult<Vec<MetadataTitle>>;

    /// Full metadata for one title
    async fn title_details(&self, imdb_id: &str) -> AppResult<MetadataDetails>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Video search used to find trailers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait VideoSearchProvider: Send + Sync {
    /// Best matching video for the query, if any
    async fn find_video(&self, query: &str) -> AppResult<Option<TrailerMatch>>;

    fn name(&self) -> &'static str;
}

/// Maps a non-2xx response to `ExternalApi`, keeping the body for the log
async fn ensure_success(
    response: reqwest::Response,
    provider: &'static str,
) -> AppResult<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    tracing::error!(provider, status = %status, body = %body, "Provider request failed");
    Err(AppError::ExternalApi(format!(
        "{} returned status {}",
        provider, status
    )))
}
