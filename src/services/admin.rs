//! Administrative actions and the live admin panel.
//!
//! Every mutation performs one write to its target and then one append to
//! the audit log. The two are not atomic: the audit append is best-effort,
//! and a failed append is logged and swallowed rather than undoing the
//! mutation that already happened.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::{
    auth::AuthUser,
    db::{AppConfigStore, AuditLogStore, ProfileStore, Stores, Subscription},
    error::{AppError, AppResult},
    models::{
        admin::most_recent, AuditAction, AuditLogEntry, FeatureFlagSet, NewAuditEntry,
        ProfilePatch, UserProfile,
    },
};

/// Proof that the caller is an administrator; only `AdminService::authorize`
/// hands these out
#[derive(Debug, Clone)]
pub struct AdminActor {
    id: String,
    email: Option<String>,
}

impl AdminActor {
    pub fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Clone)]
pub struct AdminService {
    profiles: Arc<dyn ProfileStore>,
    app_config: Arc<dyn AppConfigStore>,
    audit_log: Arc<dyn AuditLogStore>,
}

impl AdminService {
    pub fn new(
        profiles: Arc<dyn ProfileStore>,
        app_config: Arc<dyn AppConfigStore>,
        audit_log: Arc<dyn AuditLogStore>,
    ) -> Self {
        Self {
            profiles,
            app_config,
            audit_log,
        }
    }

    pub fn from_stores(stores: &Stores) -> Self {
        Self::new(
            stores.profiles.clone(),
            stores.app_config.clone(),
            stores.audit_log.clone(),
        )
    }

    /// Checks the caller's profile for the admin flag
    pub async fn authorize(&self, user: &AuthUser) -> AppResult<AdminActor> {
        let profile = self.profiles.get_profile(&user.id).await?;
        match profile {
            Some(profile) if profile.is_admin => Ok(AdminActor {
                id: user.id.clone(),
                email: profile.email.or_else(|| Some(user.email.clone())),
            }),
            _ => {
                tracing::warn!(user_id = %user.id, "Non-admin attempted an admin action");
                Err(AppError::Forbidden(
                    "Administrator access required".to_string(),
                ))
            }
        }
    }

    /// Looks a user up by email; the first match wins
    pub async fn search_user(&self, actor: &AdminActor, email: &str) -> AppResult<UserProfile> {
        let email = email.trim().to_lowercase();
        if email.is_empty() {
            return Err(AppError::InvalidInput("Please enter an email".to_string()));
        }

        let found = self.profiles.find_by_email(&email).await?.into_iter().next();
        match found {
            Some(profile) => {
                self.audit(actor, AuditAction::SearchUser, Some(email), Map::new())
                    .await;
                Ok(profile)
            }
            None => {
                self.audit(
                    actor,
                    AuditAction::SearchUserFailed,
                    Some(email.clone()),
                    details(json!({ "reason": "User not found" })),
                )
                .await;
                Err(AppError::NotFound(format!("No user with email {}", email)))
            }
        }
    }

    /// Grants or revokes premium for an existing user
    pub async fn set_premium(
        &self,
        actor: &AdminActor,
        user_id: &str,
        premium: bool,
    ) -> AppResult<UserProfile> {
        if self.profiles.get_profile(user_id).await?.is_none() {
            return Err(AppError::NotFound(format!("User {} not found", user_id)));
        }

        let profile = self
            .profiles
            .merge_profile(
                user_id,
                ProfilePatch {
                    premium: Some(premium),
                    ..Default::default()
                },
            )
            .await?;

        let action = if premium {
            AuditAction::GrantPremium
        } else {
            AuditAction::RevokePremium
        };
        self.audit(
            actor,
            action,
            profile.email.clone(),
            details(json!({ "newStatus": premium })),
        )
        .await;

        Ok(profile)
    }

    pub async fn feature_flags(&self, _actor: &AdminActor) -> AppResult<FeatureFlagSet> {
        self.app_config.feature_flags().await
    }

    pub async fn set_feature_flag(
        &self,
        actor: &AdminActor,
        name: &str,
        enabled: bool,
    ) -> AppResult<FeatureFlagSet> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::InvalidInput(
                "Feature flag name cannot be empty".to_string(),
            ));
        }

        let flags = self.app_config.set_feature_flag(name, enabled).await?;
        self.audit(
            actor,
            AuditAction::ToggleFeatureFlag,
            None,
            details(json!({ "flag": name, "newValue": enabled })),
        )
        .await;

        Ok(flags)
    }

    /// The newest audit entries, newest first
    pub async fn recent_activity(&self, _actor: &AdminActor) -> AppResult<Vec<AuditLogEntry>> {
        Ok(most_recent(self.audit_log.entries().await?))
    }

    /// Opens the live panel feed
    pub async fn open_panel(&self, _actor: &AdminActor) -> AppResult<AdminPanelFeed> {
        AdminPanelFeed::open(self.app_config.as_ref(), self.audit_log.as_ref()).await
    }

    async fn audit(
        &self,
        actor: &AdminActor,
        action: AuditAction,
        target_user_email: Option<String>,
        details: Map<String, Value>,
    ) {
        let entry = NewAuditEntry {
            action,
            admin_id: actor.id.clone(),
            admin_email: actor.email.clone(),
            target_user_email,
            details,
        };

        if let Err(e) = self.audit_log.append(entry).await {
            tracing::warn!(
                error = %e,
                action = %action,
                admin_id = %actor.id,
                "Failed to append audit entry"
            );
        }
    }
}

fn details(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// What the admin panel renders
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct AdminPanelView {
    pub flags: FeatureFlagSet,
    /// Newest first
    pub recent: Vec<AuditLogEntry>,
}

/// Live admin panel state backed by two real-time subscriptions.
///
/// Dropping the feed releases both listeners.
pub struct AdminPanelFeed {
    flags: Subscription<FeatureFlagSet>,
    audit: Subscription<AuditLogEntry>,
    view: AdminPanelView,
}

impl AdminPanelFeed {
    pub async fn open(config: &dyn AppConfigStore, audit: &dyn AuditLogStore) -> AppResult<Self> {
        let mut flags = config.watch_feature_flags().await?;
        // Subscribe before the scan so nothing appended in between is lost
        let audit_sub = audit.watch_entries().await?;
        let entries = audit.entries().await?;

        let snapshot = match flags.take_initial() {
            Some(snapshot) => snapshot,
            None => config.feature_flags().await?,
        };

        Ok(Self {
            flags,
            audit: audit_sub,
            view: AdminPanelView {
                flags: snapshot,
                recent: most_recent(entries),
            },
        })
    }

    pub fn view(&self) -> &AdminPanelView {
        &self.view
    }

    /// Waits for either subscription to fire and merges the change.
    ///
    /// Returns `None` once either publisher has gone away.
    pub async fn next_update(&mut self) -> Option<&AdminPanelView> {
        tokio::select! {
            flags = self.flags.next() => {
                self.view.flags = flags?;
            }
            entry = self.audit.next() => {
                let entry = entry?;
                if !self.view.recent.iter().any(|e| e.id == entry.id) {
                    self.view.recent.push(entry);
                }
                self.view.recent = most_recent(std::mem::take(&mut self.view.recent));
            }
        }
        Some(&self.view)
    }

    pub fn close(self) {}
}
