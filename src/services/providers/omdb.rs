/// OMDb API provider
///
/// Search uses `?s=` and detail lookups use `?i=`. OMDb answers unknown
/// titles with HTTP 200 and `"Response": "False"`, which searches treat as an
/// empty result and lookups as not found.
use crate::{
    cached,
    db::{
        redis::{DETAILS_TTL_SECS, SEARCH_TTL_SECS},
        Cache, CacheKey,
    },
    error::{AppError, AppResult},
    models::{MetadataDetails, MetadataTitle, OmdbDetails, OmdbSearchResponse},
    services::providers::{ensure_success, MetadataProvider},
};
use reqwest::Client as HttpClient;

const PROVIDER: &str = "omdb";

#[derive(Clone)]
pub struct OmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    cache: Option<Cache>,
}

impl OmdbProvider {
    pub fn new(cache: Option<Cache>, api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            cache,
        }
    }

    async fn fetch_search(&self, query: &str) -> AppResult<Vec<MetadataTitle>> {
        let response = self
            .http_client
            .get(format!("{}/", self.api_url))
            .query(&[("s", query), ("apikey", self.api_key.as_str())])
            .send()
            .await?;
        let response = ensure_success(response, PROVIDER).await?;

        let body: OmdbSearchResponse = response.json().await?;
        if !body.is_success() {
            tracing::warn!(
                query = %query,
                reason = body.error.as_deref().unwrap_or("unknown"),
                "OMDb search returned no results"
            );
            return Ok(Vec::new());
        }

        let titles: Vec<MetadataTitle> = body.search.into_iter().map(Into::into).collect();
        tracing::info!(
            query = %query,
            results = titles.len(),
            provider = PROVIDER,
            "Title search completed"
        );
        Ok(titles)
    }

    async fn fetch_details(&self, imdb_id: &str) -> AppResult<MetadataDetails> {
        let response = self
            .http_client
            .get(format!("{}/", self.api_url))
            .query(&[
                ("i", imdb_id),
                ("plot", "full"),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?;
        let response = ensure_success(response, PROVIDER).await?;

        let body: OmdbDetails = response.json().await?;
        let reason = body.error.clone();
        body.into_details().ok_or_else(|| {
            AppError::NotFound(format!(
                "Title {} not found: {}",
                imdb_id,
                reason.unwrap_or_else(|| "no details".to_string())
            ))
        })
    }
}

#[async_trait::async_trait]
impl MetadataProvider for OmdbProvider {
    async fn search_titles(&self, query: &str) -> AppResult<Vec<MetadataTitle>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        match &self.cache {
            Some(cache) => cached!(
                cache,
                CacheKey::MetadataSearch(query.to_string()),
                SEARCH_TTL_SECS,
                self.fetch_search(query)
            ),
            None => self.fetch_search(query).await,
        }
    }

    async fn title_details(&self, imdb_id: &str) -> AppResult<MetadataDetails> {
        let imdb_id = imdb_id.trim();
        if imdb_id.is_empty() {
            return Err(AppError::InvalidInput("Title id cannot be empty".to_string()));
        }

        match &self.cache {
            Some(cache) => cached!(
                cache,
                CacheKey::MetadataDetails(imdb_id.to_string()),
                DETAILS_TTL_SECS,
                self.fetch_details(imdb_id)
            ),
            None => self.fetch_details(imdb_id).await,
        }
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }
}
