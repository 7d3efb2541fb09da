use std::collections::BTreeMap;
use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Number of audit entries shown in the admin panel
pub const RECENT_AUDIT_LIMIT: usize = 10;

/// Shared name → enabled mapping
pub type FeatureFlagSet = BTreeMap<String, bool>;

/// Administrative actions recorded in the audit log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    SearchUser,
    SearchUserFailed,
    GrantPremium,
    RevokePremium,
    ToggleFeatureFlag,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::SearchUser => "SEARCH_USER",
            AuditAction::SearchUserFailed => "SEARCH_USER_FAILED",
            AuditAction::GrantPremium => "GRANT_PREMIUM",
            AuditAction::RevokePremium => "REVOKE_PREMIUM",
            AuditAction::ToggleFeatureFlag => "TOGGLE_FEATURE_FLAG",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "SEARCH_USER" => Some(AuditAction::SearchUser),
            "SEARCH_USER_FAILED" => Some(AuditAction::SearchUserFailed),
            "GRANT_PREMIUM" => Some(AuditAction::GrantPremium),
            "REVOKE_PREMIUM" => Some(AuditAction::RevokePremium),
            "TOGGLE_FEATURE_FLAG" => Some(AuditAction::ToggleFeatureFlag),
            _ => None,
        }
    }
}

impl Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Audit record as submitted by the admin service; the store assigns the id
/// and timestamp
#[derive(Debug, Clone, PartialEq)]
pub struct NewAuditEntry {
    pub action: AuditAction,
    pub admin_id: String,
    pub admin_email: Option<String>,
    pub target_user_email: Option<String>,
    pub details: Map<String, Value>,
}

/// Append-only audit record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditLogEntry {
    pub id: Uuid,
    pub action: AuditAction,
    pub admin_id: String,
    pub admin_email: Option<String>,
    pub target_user_email: Option<String>,
    #[serde(default)]
    pub details: Map<String, Value>,
    pub timestamp: DateTime<Utc>,
}

impl AuditLogEntry {
    pub fn record(entry: NewAuditEntry, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            action: entry.action,
            admin_id: entry.admin_id,
            admin_email: entry.admin_email,
            target_user_email: entry.target_user_email,
            details: entry.details,
            timestamp,
        }
    }
}

/// Sorts newest first and keeps the most recent `RECENT_AUDIT_LIMIT` entries
pub fn most_recent(mut entries: Vec<AuditLogEntry>) -> Vec<AuditLogEntry> {
    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    entries.truncate(RECENT_AUDIT_LIMIT);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn entry(action: AuditAction, offset_secs: i64) -> AuditLogEntry {
        AuditLogEntry::record(
            NewAuditEntry {
                action,
                admin_id: "admin".to_string(),
                admin_email: Some("root@cinecloud.app".to_string()),
                target_user_email: None,
                details: Map::new(),
            },
            Utc::now() + Duration::seconds(offset_secs),
        )
    }

    #[test]
    fn test_action_serialization() {
        let json = serde_json::to_string(&AuditAction::GrantPremium).unwrap();
        assert_eq!(json, "\"GRANT_PREMIUM\"");

        let json = serde_json::to_string(&AuditAction::SearchUserFailed).unwrap();
        assert_eq!(json, "\"SEARCH_USER_FAILED\"");
    }

    #[test]
    fn test_action_parse_matches_display() {
        for action in [
            AuditAction::SearchUser,
            AuditAction::SearchUserFailed,
            AuditAction::GrantPremium,
            AuditAction::RevokePremium,
            AuditAction::ToggleFeatureFlag,
        ] {
            assert_eq!(AuditAction::parse(&action.to_string()), Some(action));
        }
        assert_eq!(AuditAction::parse("DELETE_USER"), None);
    }

    #[test]
    fn test_most_recent_sorts_descending_and_truncates() {
        let entries: Vec<AuditLogEntry> = (0..15)
            .map(|i| entry(AuditAction::ToggleFeatureFlag, i))
            .collect();
        let newest = entries[14].id;

        let recent = most_recent(entries);
        assert_eq!(recent.len(), RECENT_AUDIT_LIMIT);
        assert_eq!(recent[0].id, newest);
        assert!(recent
            .windows(2)
            .all(|pair| pair[0].timestamp >= pair[1].timestamp));
    }
}
