//! Authentication provider abstraction.
//!
//! The provider checks credentials, issues and resolves session tokens and
//! publishes sign-in and sign-out events so the session gate can follow them.

use serde::{Deserialize, Serialize};

use crate::{db::Subscription, error::AppResult};

pub mod local;

pub use local::LocalAuthProvider;

/// The authenticated subject
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
}

/// Issued on sign-up and sign-in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub user: AuthUser,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn(AuthUser),
    SignedOut { user_id: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_up(&self, request: SignUpRequest) -> AppResult<AuthSession>;

    async fn sign_in(&self, credentials: Credentials) -> AppResult<AuthSession>;

    /// Revokes the token; revoking an unknown token is a no-op
    async fn sign_out(&self, token: &str) -> AppResult<()>;

    /// Resolves a bearer token to its user
    async fn verify_token(&self, token: &str) -> AppResult<AuthUser>;

    /// Removes an account along with its sessions, e.g. when sign-up could
    /// not be completed
    async fn delete_account(&self, user: &AuthUser) -> AppResult<()>;

    /// Sign-in and sign-out events from now on
    fn subscribe(&self) -> Subscription<AuthEvent>;
}
