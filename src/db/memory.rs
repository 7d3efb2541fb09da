use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, RwLock};

use crate::{
    db::{
        subscription::CHANNEL_CAPACITY, AccountStore, AppConfigStore, AuditLogStore,
        CommunityPostStore, FavouriteStore, ProfileStore, Subscription,
    },
    error::{AppError, AppResult},
    models::{
        AccountRecord, AuditLogEntry, ContentItem, FavouriteRecord, FeatureFlagSet,
        NewAuditEntry, ProfilePatch, SessionRecord, UserProfile,
    },
};

/// In-process document store.
///
/// Used when no database is configured and by the test suite. Real-time
/// listeners are broadcast channels; each subscription holds one receiver.
pub struct MemoryStore {
    /// Keyed by lower-cased email
    accounts: RwLock<HashMap<String, AccountRecord>>,
    /// Keyed by token
    sessions: RwLock<HashMap<String, SessionRecord>>,
    profiles: RwLock<HashMap<String, UserProfile>>,
    favourites: RwLock<HashMap<String, HashMap<String, FavouriteRecord>>>,
    feature_flags: RwLock<FeatureFlagSet>,
    audit_log: RwLock<Vec<AuditLogEntry>>,
    posts: RwLock<Vec<(DateTime<Utc>, ContentItem)>>,
    flags_tx: broadcast::Sender<FeatureFlagSet>,
    audit_tx: broadcast::Sender<AuditLogEntry>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_feature_flags(FeatureFlagSet::new())
    }

    /// Creates a store whose app-config document starts with `flags`
    pub fn with_feature_flags(flags: FeatureFlagSet) -> Self {
        let (flags_tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        let (audit_tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            accounts: RwLock::new(HashMap::new()),
            sessions: RwLock::new(HashMap::new()),
            profiles: RwLock::new(HashMap::new()),
            favourites: RwLock::new(HashMap::new()),
            feature_flags: RwLock::new(flags),
            audit_log: RwLock::new(Vec::new()),
            posts: RwLock::new(Vec::new()),
            flags_tx,
            audit_tx,
        }
    }

    /// Number of live feature-flag listeners
    pub fn feature_flag_listeners(&self) -> usize {
        self.flags_tx.receiver_count()
    }

    /// Number of live audit-log listeners
    pub fn audit_listeners(&self) -> usize {
        self.audit_tx.receiver_count()
    }

    /// Number of stored session tokens, expired or not
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait::async_trait]
impl AccountStore for MemoryStore {
    async fn create_account(&self, account: AccountRecord) -> AppResult<()> {
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&account.email) {
            return Err(AppError::Conflict("Email already in use".to_string()));
        }
        accounts.insert(account.email.clone(), account);
        Ok(())
    }

    async fn find_account(&self, email: &str) -> AppResult<Option<AccountRecord>> {
        Ok(self.accounts.read().await.get(email).cloned())
    }

    async fn delete_account(&self, user_id: &str) -> AppResult<()> {
        self.accounts
            .write()
            .await
            .retain(|_, account| account.user_id != user_id);
        self.sessions
            .write()
            .await
            .retain(|_, session| session.user_id != user_id);
        Ok(())
    }

    async fn insert_session(&self, session: SessionRecord) -> AppResult<()> {
        self.sessions
            .write()
            .await
            .insert(session.token.clone(), session);
        Ok(())
    }

    async fn get_session(&self, token: &str) -> AppResult<Option<SessionRecord>> {
        Ok(self.sessions.read().await.get(token).cloned())
    }

    async fn delete_session(&self, token: &str) -> AppResult<Option<SessionRecord>> {
        Ok(self.sessions.write().await.remove(token))
    }

    async fn purge_sessions(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.issued_at >= cutoff);
        Ok((before - sessions.len()) as u64)
    }
}

#[async_trait::async_trait]
impl ProfileStore for MemoryStore {
    async fn get_profile(&self, user_id: &str) -> AppResult<Option<UserProfile>> {
        Ok(self.profiles.read().await.get(user_id).cloned())
    }

    async fn merge_profile(&self, user_id: &str, patch: ProfilePatch) -> AppResult<UserProfile> {
        let mut profiles = self.profiles.write().await;
        let profile = profiles
            .entry(user_id.to_string())
            .or_insert_with(|| UserProfile::new(user_id));
        profile.apply(patch);
        Ok(profile.clone())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Vec<UserProfile>> {
        let profiles = self.profiles.read().await;
        let mut matches: Vec<UserProfile> = profiles
            .values()
            .filter(|p| p.email.as_deref() == Some(email))
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(matches)
    }
}

#[async_trait::async_trait]
impl FavouriteStore for MemoryStore {
    async fn list_favourites(&self, user_id: &str) -> AppResult<Vec<FavouriteRecord>> {
        let favourites = self.favourites.read().await;
        let mut records: Vec<FavouriteRecord> = favourites
            .get(user_id)
            .map(|records| records.values().cloned().collect())
            .unwrap_or_default();
        records.sort_by(|a, b| a.added_at.cmp(&b.added_at));
        Ok(records)
    }

    async fn put_favourite(&self, user_id: &str, item: &ContentItem) -> AppResult<()> {
        let mut favourites = self.favourites.write().await;
        favourites
            .entry(user_id.to_string())
            .or_default()
            .insert(item.id.clone(), FavouriteRecord::new(user_id, item.clone()));
        Ok(())
    }

    async fn delete_favourite(&self, user_id: &str, content_id: &str) -> AppResult<()> {
        let mut favourites = self.favourites.write().await;
        if let Some(records) = favourites.get_mut(user_id) {
            records.remove(content_id);
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl AppConfigStore for MemoryStore {
    async fn feature_flags(&self) -> AppResult<FeatureFlagSet> {
        Ok(self.feature_flags.read().await.clone())
    }

    async fn set_feature_flag(&self, name: &str, enabled: bool) -> AppResult<FeatureFlagSet> {
        let mut flags = self.feature_flags.write().await;
        flags.insert(name.to_string(), enabled);
        let snapshot = flags.clone();
        // Published under the write lock so listeners see writes in order.
        // No listeners is fine.
        let _ = self.flags_tx.send(snapshot.clone());
        Ok(snapshot)
    }

    async fn watch_feature_flags(&self) -> AppResult<Subscription<FeatureFlagSet>> {
        let rx = self.flags_tx.subscribe();
        let snapshot = self.feature_flags.read().await.clone();
        Ok(Subscription::new(Some(snapshot), rx))
    }
}

#[async_trait::async_trait]
impl AuditLogStore for MemoryStore {
    async fn append(&self, entry: NewAuditEntry) -> AppResult<AuditLogEntry> {
        let entry = AuditLogEntry::record(entry, Utc::now());
        self.audit_log.write().await.push(entry.clone());
        let _ = self.audit_tx.send(entry.clone());
        Ok(entry)
    }

    async fn entries(&self) -> AppResult<Vec<AuditLogEntry>> {
        Ok(self.audit_log.read().await.clone())
    }

    async fn watch_entries(&self) -> AppResult<Subscription<AuditLogEntry>> {
        Ok(Subscription::new(None, self.audit_tx.subscribe()))
    }
}

#[async_trait::async_trait]
impl CommunityPostStore for MemoryStore {
    async fn create_post(&self, _author_id: &str, item: ContentItem) -> AppResult<ContentItem> {
        self.posts.write().await.push((Utc::now(), item.clone()));
        Ok(item)
    }

    async fn list_posts(&self) -> AppResult<Vec<ContentItem>> {
        let posts = self.posts.read().await;
        // Insertion order is creation order
        Ok(posts.iter().rev().map(|(_, item)| item.clone()).collect())
    }
}
