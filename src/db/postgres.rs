use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::{
    postgres::{PgListener, PgPoolOptions, PgRow},
    types::Json,
    PgPool, Row,
};
use tokio::{sync::broadcast, task::JoinHandle};
use uuid::Uuid;

use crate::{
    db::{
        subscription::CHANNEL_CAPACITY, AccountStore, AppConfigStore, AuditLogStore,
        CommunityPostStore, FavouriteStore, ProfileStore, Subscription,
    },
    error::{AppError, AppResult},
    models::{
        AccountRecord, AuditAction, AuditLogEntry, ContentItem, FavouriteRecord,
        FeatureFlagSet, NewAuditEntry, ProfilePatch, SessionRecord, UserProfile,
    },
};

const APP_CONFIG_ID: &str = "config";
const FLAGS_CHANNEL: &str = "feature_flags_changed";
const AUDIT_CHANNEL: &str = "audit_log_appended";
const LISTENER_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Applies the embedded schema migrations
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Postgres-backed document store.
///
/// Documents live in JSONB columns. Feature-flag and audit-log writes
/// `pg_notify` their payload in the same transaction, and a single
/// `LISTEN` task fans those notifications out to local subscribers, so every
/// API instance sees every admin change.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    flags_tx: broadcast::Sender<FeatureFlagSet>,
    audit_tx: broadcast::Sender<AuditLogEntry>,
}

/// Owns the notification listener task; dropping it stops the task
pub struct ListenerHandle {
    task: JoinHandle<()>,
}

impl ListenerHandle {
    pub fn shutdown(self) {
        tracing::info!("Stopping Postgres notification listener");
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl PgStore {
    /// Creates the store and starts the notification listener
    pub async fn connect(pool: PgPool) -> AppResult<(Self, ListenerHandle)> {
        let (flags_tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        let (audit_tx, _) = broadcast::channel(CHANNEL_CAPACITY);

        let mut listener = PgListener::connect_with(&pool).await?;
        listener.listen_all([FLAGS_CHANNEL, AUDIT_CHANNEL]).await?;

        let task = tokio::spawn(Self::listener_task(
            listener,
            flags_tx.clone(),
            audit_tx.clone(),
        ));

        let store = Self {
            pool,
            flags_tx,
            audit_tx,
        };

        Ok((store, ListenerHandle { task }))
    }

    /// Forwards NOTIFY payloads to the broadcast channels
    async fn listener_task(
        mut listener: PgListener,
        flags_tx: broadcast::Sender<FeatureFlagSet>,
        audit_tx: broadcast::Sender<AuditLogEntry>,
    ) {
        tracing::info!("Postgres notification listener started");

        loop {
            match listener.recv().await {
                Ok(notification) => match notification.channel() {
                    FLAGS_CHANNEL => match serde_json::from_str::<Value>(notification.payload()) {
                        Ok(value) => {
                            let _ = flags_tx.send(flags_from_json(value));
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "Malformed feature flag notification")
                        }
                    },
                    AUDIT_CHANNEL => {
                        match serde_json::from_str::<AuditLogEntry>(notification.payload()) {
                            Ok(entry) => {
                                let _ = audit_tx.send(entry);
                            }
                            Err(e) => {
                                tracing::warn!(error = %e, "Malformed audit log notification")
                            }
                        }
                    }
                    other => tracing::debug!(channel = %other, "Ignoring notification"),
                },
                Err(e) => {
                    // The listener reconnects on the next recv
                    tracing::error!(error = %e, "Postgres notification listener error");
                    tokio::time::sleep(LISTENER_RETRY_DELAY).await;
                }
            }
        }
    }

    fn audit_entry_from_row(row: &PgRow) -> AppResult<Option<AuditLogEntry>> {
        let raw_action: String = row.try_get("action")?;
        let Some(action) = AuditAction::parse(&raw_action) else {
            tracing::warn!(action = %raw_action, "Skipping audit entry with unknown action");
            return Ok(None);
        };

        Ok(Some(AuditLogEntry {
            id: row.try_get("id")?,
            action,
            admin_id: row.try_get("admin_id")?,
            admin_email: row.try_get("admin_email")?,
            target_user_email: row.try_get("target_user_email")?,
            details: row.try_get::<Json<Map<String, Value>>, _>("details")?.0,
            timestamp: row.try_get("recorded_at")?,
        }))
    }
}

/// Reads the flag document leniently: every key is a toggle, non-boolean
/// values read as off
fn flags_from_json(value: Value) -> FeatureFlagSet {
    match value {
        Value::Object(map) => map
            .into_iter()
            .map(|(name, value)| (name, value.as_bool().unwrap_or(false)))
            .collect(),
        _ => FeatureFlagSet::new(),
    }
}

fn to_payload<T: serde::Serialize>(value: &T) -> AppResult<String> {
    serde_json::to_string(value)
        .map_err(|e| AppError::Internal(format!("Notification serialization error: {}", e)))
}

fn session_from_row(token: &str, row: &PgRow) -> AppResult<SessionRecord> {
    Ok(SessionRecord {
        token: token.to_string(),
        user_id: row.try_get("user_id")?,
        email: row.try_get("email")?,
        issued_at: row.try_get("issued_at")?,
    })
}

#[async_trait::async_trait]
impl AccountStore for PgStore {
    async fn create_account(&self, account: AccountRecord) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO accounts (user_id, email, password_hash)
            VALUES ($1, $2, $3)
            ON CONFLICT (email) DO NOTHING
            "#,
        )
        .bind(&account.user_id)
        .bind(&account.email)
        .bind(&account.password_hash)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict("Email already in use".to_string()));
        }
        Ok(())
    }

    async fn find_account(&self, email: &str) -> AppResult<Option<AccountRecord>> {
        let row = sqlx::query("SELECT user_id, email, password_hash FROM accounts WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| {
            Ok(AccountRecord {
                user_id: row.try_get("user_id")?,
                email: row.try_get("email")?,
                password_hash: row.try_get("password_hash")?,
            })
        })
        .transpose()
    }

    async fn delete_account(&self, user_id: &str) -> AppResult<()> {
        // Sessions go with it (ON DELETE CASCADE)
        sqlx::query("DELETE FROM accounts WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn insert_session(&self, session: SessionRecord) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO auth_sessions (token, user_id, email, issued_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(&session.token)
        .bind(&session.user_id)
        .bind(&session.email)
        .bind(session.issued_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_session(&self, token: &str) -> AppResult<Option<SessionRecord>> {
        let row = sqlx::query("SELECT user_id, email, issued_at FROM auth_sessions WHERE token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| session_from_row(token, &row)).transpose()
    }

    async fn delete_session(&self, token: &str) -> AppResult<Option<SessionRecord>> {
        let row = sqlx::query(
            "DELETE FROM auth_sessions WHERE token = $1 RETURNING user_id, email, issued_at",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| session_from_row(token, &row)).transpose()
    }

    async fn purge_sessions(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM auth_sessions WHERE issued_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[async_trait::async_trait]
impl ProfileStore for PgStore {
    async fn get_profile(&self, user_id: &str) -> AppResult<Option<UserProfile>> {
        let row = sqlx::query("SELECT document FROM user_profiles WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| Ok(row.try_get::<Json<UserProfile>, _>("document")?.0))
            .transpose()
    }

    async fn merge_profile(&self, user_id: &str, patch: ProfilePatch) -> AppResult<UserProfile> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT document FROM user_profiles WHERE id = $1 FOR UPDATE")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;

        let mut profile = match row {
            Some(row) => row.try_get::<Json<UserProfile>, _>("document")?.0,
            None => UserProfile::new(user_id),
        };
        profile.apply(patch);

        sqlx::query(
            r#"
            INSERT INTO user_profiles (id, email, document, updated_at)
            VALUES ($1, $2, $3, now())
            ON CONFLICT (id) DO UPDATE
            SET email = EXCLUDED.email, document = EXCLUDED.document, updated_at = now()
            "#,
        )
        .bind(user_id)
        .bind(profile.email.as_deref())
        .bind(Json(&profile))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(profile)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Vec<UserProfile>> {
        let rows = sqlx::query("SELECT document FROM user_profiles WHERE email = $1 ORDER BY id")
            .bind(email)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| Ok(row.try_get::<Json<UserProfile>, _>("document")?.0))
            .collect()
    }
}

#[async_trait::async_trait]
impl FavouriteStore for PgStore {
    async fn list_favourites(&self, user_id: &str) -> AppResult<Vec<FavouriteRecord>> {
        let rows = sqlx::query(
            "SELECT item, added_at FROM favourites WHERE user_id = $1 ORDER BY added_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(FavouriteRecord {
                    user_id: user_id.to_string(),
                    item: row.try_get::<Json<ContentItem>, _>("item")?.0,
                    added_at: row.try_get::<DateTime<Utc>, _>("added_at")?,
                })
            })
            .collect()
    }

    async fn put_favourite(&self, user_id: &str, item: &ContentItem) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO favourites (user_id, content_id, item)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, content_id) DO UPDATE SET item = EXCLUDED.item
            "#,
        )
        .bind(user_id)
        .bind(&item.id)
        .bind(Json(item))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_favourite(&self, user_id: &str, content_id: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM favourites WHERE user_id = $1 AND content_id = $2")
            .bind(user_id)
            .bind(content_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl AppConfigStore for PgStore {
    async fn feature_flags(&self) -> AppResult<FeatureFlagSet> {
        let row = sqlx::query("SELECT features FROM app_config WHERE id = $1")
            .bind(APP_CONFIG_ID)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(flags_from_json(row.try_get::<Json<Value>, _>("features")?.0)),
            None => Ok(FeatureFlagSet::new()),
        }
    }

    async fn set_feature_flag(&self, name: &str, enabled: bool) -> AppResult<FeatureFlagSet> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            INSERT INTO app_config (id, features)
            VALUES ($1, jsonb_build_object($2::text, $3::boolean))
            ON CONFLICT (id) DO UPDATE
            SET features = app_config.features || EXCLUDED.features
            RETURNING features
            "#,
        )
        .bind(APP_CONFIG_ID)
        .bind(name)
        .bind(enabled)
        .fetch_one(&mut *tx)
        .await?;

        let flags = flags_from_json(row.try_get::<Json<Value>, _>("features")?.0);

        sqlx::query("SELECT pg_notify($1, $2)")
            .bind(FLAGS_CHANNEL)
            .bind(to_payload(&flags)?)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(flags)
    }

    async fn watch_feature_flags(&self) -> AppResult<Subscription<FeatureFlagSet>> {
        let rx = self.flags_tx.subscribe();
        let snapshot = self.feature_flags().await?;
        Ok(Subscription::new(Some(snapshot), rx))
    }
}

#[async_trait::async_trait]
impl AuditLogStore for PgStore {
    async fn append(&self, entry: NewAuditEntry) -> AppResult<AuditLogEntry> {
        let mut tx = self.pool.begin().await?;
        let id = Uuid::new_v4();

        let row = sqlx::query(
            r#"
            INSERT INTO audit_log (id, action, admin_id, admin_email, target_user_email, details)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING recorded_at
            "#,
        )
        .bind(id)
        .bind(entry.action.as_str())
        .bind(&entry.admin_id)
        .bind(entry.admin_email.as_deref())
        .bind(entry.target_user_email.as_deref())
        .bind(Json(&entry.details))
        .fetch_one(&mut *tx)
        .await?;

        let recorded = AuditLogEntry {
            id,
            action: entry.action,
            admin_id: entry.admin_id,
            admin_email: entry.admin_email,
            target_user_email: entry.target_user_email,
            details: entry.details,
            timestamp: row.try_get("recorded_at")?,
        };

        sqlx::query("SELECT pg_notify($1, $2)")
            .bind(AUDIT_CHANNEL)
            .bind(to_payload(&recorded)?)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(recorded)
    }

    async fn entries(&self) -> AppResult<Vec<AuditLogEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT id, action, admin_id, admin_email, target_user_email, details, recorded_at
            FROM audit_log
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in &rows {
            if let Some(entry) = Self::audit_entry_from_row(row)? {
                entries.push(entry);
            }
        }
        Ok(entries)
    }

    async fn watch_entries(&self) -> AppResult<Subscription<AuditLogEntry>> {
        Ok(Subscription::new(None, self.audit_tx.subscribe()))
    }
}

#[async_trait::async_trait]
impl CommunityPostStore for PgStore {
    async fn create_post(&self, author_id: &str, item: ContentItem) -> AppResult<ContentItem> {
        sqlx::query("INSERT INTO community_posts (id, author_id, item) VALUES ($1, $2, $3)")
            .bind(&item.id)
            .bind(author_id)
            .bind(Json(&item))
            .execute(&self.pool)
            .await?;

        Ok(item)
    }

    async fn list_posts(&self) -> AppResult<Vec<ContentItem>> {
        let rows = sqlx::query("SELECT item FROM community_posts ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| Ok(row.try_get::<Json<ContentItem>, _>("item")?.0))
            .collect()
    }
}
