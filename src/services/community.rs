use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    db::{CommunityPostStore, ProfileStore},
    error::{AppError, AppResult},
    models::{
        content::{parse_rating, UNRATED},
        ContentItem,
    },
};

/// A community post as submitted
#[derive(Debug, Clone, Deserialize)]
pub struct NewPost {
    pub title: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub cast: String,
    #[serde(default)]
    pub rating: Option<String>,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub description: String,
}

impl NewPost {
    fn into_item(self) -> AppResult<ContentItem> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(AppError::InvalidInput("Title is required".to_string()));
        }

        let rating = match self.rating.as_deref().map(str::trim) {
            None | Some("") => UNRATED.to_string(),
            Some(raw) => {
                parse_rating(raw)?;
                raw.to_string()
            }
        };

        let genre = self
            .genres
            .iter()
            .map(|g| g.trim())
            .filter(|g| !g.is_empty())
            .collect::<Vec<_>>()
            .join(", ");

        Ok(ContentItem {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            genre,
            cast: self.cast.trim().to_string(),
            rating,
            platform: self.platform.trim().to_string(),
            image: self.image,
            description: self.description.trim().to_string(),
            anticipated_release: false,
        })
    }
}

/// Titles shared by VIP members and administrators
#[derive(Clone)]
pub struct CommunityService {
    profiles: Arc<dyn ProfileStore>,
    posts: Arc<dyn CommunityPostStore>,
}

impl CommunityService {
    pub fn new(profiles: Arc<dyn ProfileStore>, posts: Arc<dyn CommunityPostStore>) -> Self {
        Self { profiles, posts }
    }

    pub async fn create_post(&self, author: &AuthUser, post: NewPost) -> AppResult<ContentItem> {
        let allowed = self
            .profiles
            .get_profile(&author.id)
            .await?
            .is_some_and(|p| p.premium || p.is_admin);
        if !allowed {
            return Err(AppError::Forbidden(
                "Posting requires a VIP membership".to_string(),
            ));
        }

        let item = post.into_item()?;
        let item = self.posts.create_post(&author.id, item).await?;
        tracing::info!(author_id = %author.id, post_id = %item.id, "Community post created");
        Ok(item)
    }

    pub async fn list_posts(&self) -> AppResult<Vec<ContentItem>> {
        self.posts.list_posts().await
    }
}
