use crate::{
    error::{AppError, AppResult},
    models::{MetadataDetails, MetadataTitle, TrailerMatch},
    services::providers::{MetadataProvider, VideoSearchProvider},
};

/// Service function for title search
///
/// Delegates to the configured MetadataProvider, keeping HTTP routing
/// separate from provider details.
pub async fn search_titles(
    provider: &dyn MetadataProvider,
    query: &str,
) -> AppResult<Vec<MetadataTitle>> {
    provider.search_titles(query).await
}

pub async fn title_details(
    provider: &dyn MetadataProvider,
    imdb_id: &str,
) -> AppResult<MetadataDetails> {
    provider.title_details(imdb_id).await
}

/// Search phrase for a title's trailer, e.g. "Squid Game Netflix official trailer"
pub fn trailer_query(title: &str, platform: Option<&str>) -> String {
    match platform.map(str::trim).filter(|p| !p.is_empty()) {
        Some(platform) => format!("{} {} official trailer", title.trim(), platform),
        None => format!("{} official trailer", title.trim()),
    }
}

/// Finds the trailer for a title; no match is `NotFound`
pub async fn find_trailer(
    provider: &dyn VideoSearchProvider,
    title: &str,
    platform: Option<&str>,
) -> AppResult<TrailerMatch> {
    if title.trim().is_empty() {
        return Err(AppError::InvalidInput("Title is required".to_string()));
    }

    let query = trailer_query(title, platform);
    provider.find_video(&query).await?.ok_or_else(|| {
        tracing::warn!(query = %query, provider = provider.name(), "No trailer found");
        AppError::NotFound(format!("No trailer found for {}", title.trim()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::{MockMetadataProvider, MockVideoSearchProvider};

    #[test]
    fn test_trailer_query() {
        assert_eq!(
            trailer_query("Squid Game", Some("Netflix")),
            "Squid Game Netflix official trailer"
        );
        assert_eq!(trailer_query("Squid Game", None), "Squid Game official trailer");
        assert_eq!(trailer_query(" Dear X ", Some("  ")), "Dear X official trailer");
    }

    #[tokio::test]
    async fn test_find_trailer_queries_provider() {
        let mut provider = MockVideoSearchProvider::new();
        provider
            .expect_find_video()
            .withf(|query| query == "Squid Game Netflix official trailer")
            .times(1)
            .returning(|_| {
                Ok(Some(TrailerMatch::new(
                    "oqxAJKy0ii4".to_string(),
                    None,
                )))
            });

        let trailer = find_trailer(&provider, "Squid Game", Some("Netflix"))
            .await
            .unwrap();
        assert_eq!(trailer.video_id, "oqxAJKy0ii4");
    }

    #[tokio::test]
    async fn test_find_trailer_without_match_is_not_found() {
        let mut provider = MockVideoSearchProvider::new();
        provider.expect_find_video().returning(|_| Ok(None));
        provider.expect_name().return_const("mock");

        let err = find_trailer(&provider, "Obscure Title", None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_search_titles_propagates_provider_error() {
        let mut provider = MockMetadataProvider::new();
        provider
            .expect_search_titles()
            .returning(|_| Err(AppError::ExternalApi("timeout".to_string())));

        let err = search_titles(&provider, "squid").await.unwrap_err();
        assert!(err.is_retryable());
    }
}
