use chrono::{DateTime, Utc};

use crate::auth::AuthUser;

/// Stored email/password credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRecord {
    pub user_id: String,
    /// Lower-cased
    pub email: String,
    /// Argon2 PHC string
    pub password_hash: String,
}

/// An issued bearer token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub token: String,
    pub user_id: String,
    pub email: String,
    pub issued_at: DateTime<Utc>,
}

impl AccountRecord {
    pub fn user(&self) -> AuthUser {
        AuthUser {
            id: self.user_id.clone(),
            email: self.email.clone(),
        }
    }
}

impl SessionRecord {
    pub fn issue(token: String, user: &AuthUser, issued_at: DateTime<Utc>) -> Self {
        Self {
            token,
            user_id: user.id.clone(),
            email: user.email.clone(),
            issued_at,
        }
    }

    pub fn user(&self) -> AuthUser {
        AuthUser {
            id: self.user_id.clone(),
            email: self.email.clone(),
        }
    }
}
