/// YouTube Data API provider
///
/// Runs a single-result video search and accepts the hit only when it is a
/// video rather than a channel or playlist.
use crate::{
    cached,
    db::{redis::DETAILS_TTL_SECS, Cache, CacheKey},
    error::{AppError, AppResult},
    models::{TrailerMatch, YoutubeSearchResponse},
    services::providers::{ensure_success, VideoSearchProvider},
};
use reqwest::Client as HttpClient;

const PROVIDER: &str = "youtube";

#[derive(Clone)]
pub struct YoutubeProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    cache: Option<Cache>,
}

impl YoutubeProvider {
    pub fn new(cache: Option<Cache>, api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            cache,
        }
    }

    async fn fetch_video(&self, query: &str) -> AppResult<Option<TrailerMatch>> {
        let response = self
            .http_client
            .get(format!("{}/youtube/v3/search", self.api_url))
            .query(&[
                ("part", "snippet"),
                ("q", query),
                ("type", "video"),
                ("maxResults", "1"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;
        let response = ensure_success(response, PROVIDER).await?;

        let body: YoutubeSearchResponse = response.json().await?;
        let found = body.best_match();
        tracing::info!(
            query = %query,
            found = found.is_some(),
            provider = PROVIDER,
            "Video search completed"
        );
        Ok(found)
    }
}

#[async_trait::async_trait]
impl VideoSearchProvider for YoutubeProvider {
    async fn find_video(&self, query: &str) -> AppResult<Option<TrailerMatch>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::InvalidInput(
                "Video query cannot be empty".to_string(),
            ));
        }

        match &self.cache {
            Some(cache) => cached!(
                cache,
                CacheKey::TrailerSearch(query.to_string()),
                DETAILS_TTL_SECS,
                self.fetch_video(query)
            ),
            None => self.fetch_video(query).await,
        }
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }
}
