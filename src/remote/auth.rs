use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{error::RemoteError, observer::Observers};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> Result<User, RemoteError>;
    async fn sign_in(&self, email: &str, password: &str) -> Result<User, RemoteError>;
    async fn sign_out(&self) -> Result<(), RemoteError>;
}

/// Result of a register/login attempt. Exactly one side is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthOutcome {
    pub user: Option<User>,
    pub error: Option<String>,
}

impl AuthOutcome {
    fn from_result(result: Result<User, RemoteError>) -> Self {
        match result {
            Ok(user) => Self {
                user: Some(user),
                error: None,
            },
            Err(e) => Self {
                user: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Session holder. Backend failures come back as messages, and listeners
/// hear about every sign-in and sign-out.
pub struct Auth<B> {
    backend: B,
    current: Option<User>,
    listeners: Observers<Option<User>>,
}

impl<B: AuthBackend> Auth<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            current: None,
            listeners: Observers::default(),
        }
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current.as_ref()
    }

    /// Registers `callback` and immediately tells it the current user.
    pub fn on_auth_change<F>(&mut self, mut callback: F)
    where
        F: FnMut(&Option<User>) + Send + 'static,
    {
        callback(&self.current);
        self.listeners.subscribe(callback);
    }

    pub async fn register(&mut self, email: &str, password: &str) -> AuthOutcome {
        let outcome = AuthOutcome::from_result(self.backend.sign_up(email, password).await);
        self.apply(&outcome, "register");
        outcome
    }

    pub async fn login(&mut self, email: &str, password: &str) -> AuthOutcome {
        let outcome = AuthOutcome::from_result(self.backend.sign_in(email, password).await);
        self.apply(&outcome, "login");
        outcome
    }

    /// Returns the error message if sign-out failed; the session is kept then.
    pub async fn logout(&mut self) -> Option<String> {
        match self.backend.sign_out().await {
            Ok(()) => {
                if self.current.take().is_some() {
                    self.listeners.notify(&self.current);
                }
                None
            }
            Err(e) => {
                tracing::error!(error = %e, "logout failed");
                Some(e.to_string())
            }
        }
    }

    fn apply(&mut self, outcome: &AuthOutcome, action: &str) {
        match (&outcome.user, &outcome.error) {
            (Some(user), _) => {
                self.current = Some(user.clone());
                self.listeners.notify(&self.current);
            }
            (None, Some(error)) => tracing::error!(%error, action, "authentication failed"),
            (None, None) => {}
        }
    }
}
