use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ContentItem;

/// A title saved to a user's favourites; existence of the record is membership
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FavouriteRecord {
    pub user_id: String,
    pub item: ContentItem,
    pub added_at: DateTime<Utc>,
}

impl FavouriteRecord {
    pub fn new(user_id: impl Into<String>, item: ContentItem) -> Self {
        Self {
            user_id: user_id.into(),
            item,
            added_at: Utc::now(),
        }
    }

    pub fn content_id(&self) -> &str {
        &self.item.id
    }
}
