//! Storage contracts for the document collections the app uses.
//!
//! Each trait mirrors one collection of the remote document database:
//! per-user profiles and favourites, the shared app-config document, the
//! append-only audit log and the community posts. Credentials and issued
//! session tokens live beside them so accounts survive a restart. Backends implement all of
//! them; services only ever see the trait they need.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    db::Subscription,
    error::AppResult,
    models::{
        AccountRecord, AuditLogEntry, ContentItem, FavouriteRecord, FeatureFlagSet,
        NewAuditEntry, ProfilePatch, SessionRecord, UserProfile,
    },
};

/// Per-user profile documents
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ProfileStore: Send + Sync {
    /// Point read
    async fn get_profile(&self, user_id: &str) -> AppResult<Option<UserProfile>>;

    /// Merge-write; creates the document when it does not exist yet
    async fn merge_profile(&self, user_id: &str, patch: ProfilePatch) -> AppResult<UserProfile>;

    /// Equality query on the (lower-cased) email field
    async fn find_by_email(&self, email: &str) -> AppResult<Vec<UserProfile>>;
}

/// Per-user favourites sub-collection
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait FavouriteStore: Send + Sync {
    async fn list_favourites(&self, user_id: &str) -> AppResult<Vec<FavouriteRecord>>;

    /// Create or overwrite the record keyed by the item's id
    async fn put_favourite(&self, user_id: &str, item: &ContentItem) -> AppResult<()>;

    /// Deleting a missing record is not an error
    async fn delete_favourite(&self, user_id: &str, content_id: &str) -> AppResult<()>;
}

/// Shared app-config document holding the feature flags
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait AppConfigStore: Send + Sync {
    async fn feature_flags(&self) -> AppResult<FeatureFlagSet>;

    /// Writes one flag and returns the resulting set
    async fn set_feature_flag(&self, name: &str, enabled: bool) -> AppResult<FeatureFlagSet>;

    /// Current set first, then the full set after every change
    async fn watch_feature_flags(&self) -> AppResult<Subscription<FeatureFlagSet>>;
}

/// Append-only audit-log collection
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait AuditLogStore: Send + Sync {
    /// Appends an entry; the store assigns id and timestamp
    async fn append(&self, entry: NewAuditEntry) -> AppResult<AuditLogEntry>;

    /// Unordered collection scan
    async fn entries(&self) -> AppResult<Vec<AuditLogEntry>>;

    /// Every entry appended after the call
    async fn watch_entries(&self) -> AppResult<Subscription<AuditLogEntry>>;
}

/// Community posts authored by VIP and admin users
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CommunityPostStore: Send + Sync {
    async fn create_post(&self, author_id: &str, item: ContentItem) -> AppResult<ContentItem>;

    /// Newest first
    async fn list_posts(&self) -> AppResult<Vec<ContentItem>>;
}

/// Email/password accounts and their session tokens
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait AccountStore: Send + Sync {
    /// Fails with `Conflict` when the email is already registered
    async fn create_account(&self, account: AccountRecord) -> AppResult<()>;

    /// Lookup by lower-cased email
    async fn find_account(&self, email: &str) -> AppResult<Option<AccountRecord>>;

    /// Removes the account and every session issued to it
    async fn delete_account(&self, user_id: &str) -> AppResult<()>;

    async fn insert_session(&self, session: SessionRecord) -> AppResult<()>;

    async fn get_session(&self, token: &str) -> AppResult<Option<SessionRecord>>;

    /// Returns the removed session, if there was one
    async fn delete_session(&self, token: &str) -> AppResult<Option<SessionRecord>>;

    /// Drops sessions issued before `cutoff`, returning how many went
    async fn purge_sessions(&self, cutoff: DateTime<Utc>) -> AppResult<u64>;
}

/// One handle per collection, all backed by the same backend
#[derive(Clone)]
pub struct Stores {
    pub accounts: Arc<dyn AccountStore>,
    pub profiles: Arc<dyn ProfileStore>,
    pub favourites: Arc<dyn FavouriteStore>,
    pub app_config: Arc<dyn AppConfigStore>,
    pub audit_log: Arc<dyn AuditLogStore>,
    pub community: Arc<dyn CommunityPostStore>,
}

impl Stores {
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: AccountStore
            + ProfileStore
            + FavouriteStore
            + AppConfigStore
            + AuditLogStore
            + CommunityPostStore
            + 'static,
    {
        Self {
            accounts: backend.clone(),
            profiles: backend.clone(),
            favourites: backend.clone(),
            app_config: backend.clone(),
            audit_log: backend.clone(),
            community: backend,
        }
    }
}
