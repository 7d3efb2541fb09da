use std::sync::Arc;

use serde::Serialize;
use tokio::{sync::watch, task::JoinHandle};

use crate::{
    auth::{AuthEvent, AuthUser},
    db::{ProfileStore, Subscription},
    error::AppResult,
};

/// Which experience the current session gets
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    Unauthenticated,
    Standard { user: AuthUser },
    Premium { user: AuthUser },
    Admin { user: AuthUser, premium: bool },
}

/// First screen for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Landing {
    Login,
    Catalog,
}

impl SessionState {
    pub fn landing(&self) -> Landing {
        match self {
            SessionState::Unauthenticated => Landing::Login,
            _ => Landing::Catalog,
        }
    }

    /// VIP entitlements apply to premium users and administrators
    pub fn shows_vip_tab(&self) -> bool {
        matches!(self, SessionState::Premium { .. } | SessionState::Admin { .. })
    }

    pub fn can_post(&self) -> bool {
        self.shows_vip_tab()
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, SessionState::Admin { .. })
    }

    pub fn user(&self) -> Option<&AuthUser> {
        match self {
            SessionState::Unauthenticated => None,
            SessionState::Standard { user }
            | SessionState::Premium { user }
            | SessionState::Admin { user, .. } => Some(user),
        }
    }
}

/// Derives the session state from the signed-in user's profile
#[derive(Clone)]
pub struct SessionGate {
    profiles: Arc<dyn ProfileStore>,
}

impl SessionGate {
    pub fn new(profiles: Arc<dyn ProfileStore>) -> Self {
        Self { profiles }
    }

    pub async fn resolve(&self, user: Option<&AuthUser>) -> AppResult<SessionState> {
        let Some(user) = user else {
            return Ok(SessionState::Unauthenticated);
        };

        let user = user.clone();
        let state = match self.profiles.get_profile(&user.id).await? {
            Some(profile) if profile.is_admin => SessionState::Admin {
                user,
                premium: profile.premium,
            },
            Some(profile) if profile.premium => SessionState::Premium { user },
            _ => SessionState::Standard { user },
        };
        Ok(state)
    }

    /// Follows auth events in the background and publishes each new state
    pub fn spawn(self, mut events: Subscription<AuthEvent>) -> SessionHandle {
        let (tx, rx) = watch::channel(SessionState::Unauthenticated);

        let task = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                let next = match event {
                    AuthEvent::SignedIn(user) => match self.resolve(Some(&user)).await {
                        Ok(state) => state,
                        Err(e) => {
                            tracing::warn!(
                                error = %e,
                                user_id = %user.id,
                                "Profile lookup failed, using standard session"
                            );
                            SessionState::Standard { user }
                        }
                    },
                    AuthEvent::SignedOut { user_id } => {
                        let current = tx.borrow().user().map(|u| u.id.clone());
                        if current.as_deref() != Some(user_id.as_str()) {
                            continue;
                        }
                        SessionState::Unauthenticated
                    }
                };

                if tx.send(next).is_err() {
                    break;
                }
            }
            tracing::debug!("Session gate stopped");
        });

        SessionHandle { rx, task }
    }
}

/// Live session state; dropping it stops the background task
pub struct SessionHandle {
    rx: watch::Receiver<SessionState>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    pub fn current(&self) -> SessionState {
        self.rx.borrow().clone()
    }

    /// Waits for the next state, `None` once the gate has stopped
    pub async fn changed(&mut self) -> Option<SessionState> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
