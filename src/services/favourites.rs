use std::sync::Arc;

use crate::{db::FavouriteStore, error::AppResult, models::ContentItem};

/// A user's favourites, mirrored locally from the remote collection.
///
/// Local state only changes after the remote write or delete has been
/// confirmed, so a failed call leaves membership exactly as it was.
pub struct FavouritesSync {
    user_id: String,
    store: Arc<dyn FavouriteStore>,
    items: Vec<ContentItem>,
}

impl FavouritesSync {
    /// Seeds the local set with one scan of the user's favourites
    pub async fn load(user_id: impl Into<String>, store: Arc<dyn FavouriteStore>) -> AppResult<Self> {
        let user_id = user_id.into();
        let items = store
            .list_favourites(&user_id)
            .await?
            .into_iter()
            .map(|record| record.item)
            .collect();

        Ok(Self {
            user_id,
            store,
            items,
        })
    }

    pub fn contains(&self, content_id: &str) -> bool {
        self.items.iter().any(|i| i.id == content_id)
    }

    /// Flips membership of `item`, returning the new membership
    pub async fn toggle(&mut self, item: &ContentItem) -> AppResult<bool> {
        if self.contains(&item.id) {
            self.store.delete_favourite(&self.user_id, &item.id).await?;
            self.items.retain(|i| i.id != item.id);
            tracing::info!(user_id = %self.user_id, content_id = %item.id, "Removed favourite");
            Ok(false)
        } else {
            self.store.put_favourite(&self.user_id, item).await?;
            self.items.push(item.clone());
            tracing::info!(user_id = %self.user_id, content_id = %item.id, "Added favourite");
            Ok(true)
        }
    }

    /// Deletes the record whether or not it is known locally
    pub async fn remove(&mut self, content_id: &str) -> AppResult<()> {
        self.store.delete_favourite(&self.user_id, content_id).await?;
        self.items.retain(|i| i.id != content_id);
        Ok(())
    }

    /// Stored snapshots, oldest first
    pub fn list(&self) -> &[ContentItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<ContentItem> {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{MemoryStore, MockFavouriteStore},
        error::AppError,
        models::FavouriteRecord,
        services::catalog::Catalog,
    };

    fn squid_game() -> ContentItem {
        Catalog::sample().find("8").cloned().unwrap()
    }

    #[tokio::test]
    async fn test_toggle_squid_game_persists_then_removes() {
        let store = Arc::new(MemoryStore::new());
        let mut favourites = FavouritesSync::load("u1", store.clone()).await.unwrap();

        assert!(favourites.toggle(&squid_game()).await.unwrap());
        assert!(favourites.contains("8"));
        let stored = store.list_favourites("u1").await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].content_id(), "8");

        assert!(!favourites.toggle(&squid_game()).await.unwrap());
        assert!(!favourites.contains("8"));
        assert!(store.list_favourites("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_toggle_twice_restores_membership_for_every_item() {
        let store = Arc::new(MemoryStore::new());
        let catalog = Catalog::sample();
        let mut favourites = FavouritesSync::load("u1", store.clone()).await.unwrap();

        // Start with every other item present
        for item in catalog.items().iter().step_by(2) {
            favourites.toggle(item).await.unwrap();
        }

        for item in catalog.items() {
            let before = favourites.contains(&item.id);
            favourites.toggle(item).await.unwrap();
            favourites.toggle(item).await.unwrap();
            assert_eq!(favourites.contains(&item.id), before, "item {}", item.id);
        }

        let reloaded = FavouritesSync::load("u1", store).await.unwrap();
        assert_eq!(reloaded.list().len(), favourites.list().len());
    }

    #[tokio::test]
    async fn test_failed_put_leaves_local_state_unchanged() {
        let mut store = MockFavouriteStore::new();
        store.expect_list_favourites().returning(|_| Ok(Vec::new()));
        store
            .expect_put_favourite()
            .times(1)
            .returning(|_, _| Err(AppError::ExternalApi("network unavailable".to_string())));

        let mut favourites = FavouritesSync::load("u1", Arc::new(store)).await.unwrap();
        let err = favourites.toggle(&squid_game()).await.unwrap_err();

        assert!(err.is_retryable());
        assert!(!favourites.contains("8"));
        assert!(favourites.list().is_empty());
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_membership() {
        let mut store = MockFavouriteStore::new();
        store
            .expect_list_favourites()
            .returning(|user_id| Ok(vec![FavouriteRecord::new(user_id, squid_game())]));
        store
            .expect_delete_favourite()
            .times(1)
            .returning(|_, _| Err(AppError::Forbidden("permission denied".to_string())));

        let mut favourites = FavouritesSync::load("u1", Arc::new(store)).await.unwrap();
        assert!(favourites.contains("8"));

        assert!(favourites.toggle(&squid_game()).await.is_err());
        assert!(favourites.contains("8"));
    }

    #[tokio::test]
    async fn test_remove_unknown_item_is_ok() {
        let store = Arc::new(MemoryStore::new());
        let mut favourites = FavouritesSync::load("u1", store).await.unwrap();
        favourites.remove("404").await.unwrap();
        assert!(favourites.list().is_empty());
    }
}
