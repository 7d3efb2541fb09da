use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::{
    auth::{AuthEvent, AuthProvider, AuthSession, AuthUser, Credentials, SignUpRequest},
    db::{subscription::CHANNEL_CAPACITY, AccountStore, Subscription},
    error::{AppError, AppResult},
    models::{AccountRecord, SessionRecord},
};

pub const MIN_PASSWORD_LEN: usize = 6;
const DEFAULT_SESSION_TTL_DAYS: i64 = 30;

/// Email/password provider with Argon2 hashes and opaque tokens.
///
/// Accounts and sessions are kept in the document backend, so they outlive
/// the process. Expired sessions are dropped when they are presented and
/// swept whenever a new session is issued.
pub struct LocalAuthProvider {
    store: Arc<dyn AccountStore>,
    events: broadcast::Sender<AuthEvent>,
    session_ttl: Duration,
}

impl LocalAuthProvider {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        let (events, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            store,
            events,
            session_ttl: Duration::days(DEFAULT_SESSION_TTL_DAYS),
        }
    }

    pub fn with_session_ttl(mut self, session_ttl: Duration) -> Self {
        self.session_ttl = session_ttl;
        self
    }

    fn validate_sign_up(request: &SignUpRequest) -> AppResult<String> {
        let email = request.email.trim().to_lowercase();
        if !email.contains('@') {
            return Err(AppError::InvalidInput("Invalid email address".to_string()));
        }
        if request.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::InvalidInput(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        if request.password != request.confirm_password {
            return Err(AppError::InvalidInput("Passwords do not match".to_string()));
        }
        Ok(email)
    }

    async fn hash_password(password: String) -> AppResult<String> {
        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            Argon2::default()
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    async fn verify_password(password: String, hash: String) -> AppResult<bool> {
        tokio::task::spawn_blocking(move || {
            let parsed = match PasswordHash::new(&hash) {
                Ok(parsed) => parsed,
                Err(_) => return false,
            };
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))
    }

    async fn open_session(&self, user: AuthUser) -> AppResult<AuthSession> {
        let now = Utc::now();
        let purged = self.store.purge_sessions(now - self.session_ttl).await?;
        if purged > 0 {
            tracing::debug!(purged, "Removed expired sessions");
        }

        let token = Uuid::new_v4().to_string();
        self.store
            .insert_session(SessionRecord::issue(token.clone(), &user, now))
            .await?;

        // No listeners is fine
        let _ = self.events.send(AuthEvent::SignedIn(user.clone()));
        Ok(AuthSession { token, user })
    }
}

#[async_trait::async_trait]
impl AuthProvider for LocalAuthProvider {
    async fn sign_up(&self, request: SignUpRequest) -> AppResult<AuthSession> {
        let email = Self::validate_sign_up(&request)?;

        if self.store.find_account(&email).await?.is_some() {
            return Err(AppError::Conflict("Email already in use".to_string()));
        }

        let account = AccountRecord {
            user_id: Uuid::new_v4().to_string(),
            email,
            password_hash: Self::hash_password(request.password).await?,
        };
        let user = account.user();
        // The store re-checks the email; a concurrent sign-up may have won
        self.store.create_account(account).await?;

        tracing::info!(user_id = %user.id, "Account created");
        self.open_session(user).await
    }

    async fn sign_in(&self, credentials: Credentials) -> AppResult<AuthSession> {
        let email = credentials.email.trim().to_lowercase();
        let Some(account) = self.store.find_account(&email).await? else {
            return Err(AppError::Authentication("Invalid email or password".to_string()));
        };

        let user = account.user();
        if !Self::verify_password(credentials.password, account.password_hash).await? {
            tracing::warn!(user_id = %user.id, "Rejected sign-in");
            return Err(AppError::Authentication("Invalid email or password".to_string()));
        }

        self.open_session(user).await
    }

    async fn sign_out(&self, token: &str) -> AppResult<()> {
        if let Some(session) = self.store.delete_session(token).await? {
            let _ = self.events.send(AuthEvent::SignedOut {
                user_id: session.user_id,
            });
        }
        Ok(())
    }

    async fn verify_token(&self, token: &str) -> AppResult<AuthUser> {
        let session = self
            .store
            .get_session(token)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid session token".to_string()))?;

        if Utc::now() - session.issued_at > self.session_ttl {
            self.store.delete_session(token).await?;
            return Err(AppError::Authentication("Session expired".to_string()));
        }

        Ok(session.user())
    }

    async fn delete_account(&self, user: &AuthUser) -> AppResult<()> {
        self.store.delete_account(&user.id).await?;
        tracing::info!(user_id = %user.id, "Account removed");
        Ok(())
    }

    fn subscribe(&self) -> Subscription<AuthEvent> {
        Subscription::new(None, self.events.subscribe())
    }
}
