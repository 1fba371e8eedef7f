//! Session lifecycle effects
//!
//! Reacts to auth actions: talks to the backend for login and signup,
//! persists the token, arms the expiry timer and restores a stored session
//! on start. The expiry timer is a spawned task that sends `Logout` into the
//! store's scheduled-action channel when the token runs out.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::domain::result::Result;
use crate::domain::{AccessToken, AuthRequest};
use crate::ports::storage::STORAGE_KEY_AUTH_TOKEN;
use crate::ports::{Clock, KeyValueStore, Navigator, RecipeBookApi};
use crate::store::{Action, AuthAction, RootState};

pub struct SessionService {
    api: Arc<dyn RecipeBookApi>,
    storage: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    navigator: Arc<dyn Navigator>,
    scheduler: UnboundedSender<Action>,
    expiry_timer: Option<JoinHandle<()>>,
}

impl SessionService {
    pub fn new(
        api: Arc<dyn RecipeBookApi>,
        storage: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        navigator: Arc<dyn Navigator>,
        scheduler: UnboundedSender<Action>,
    ) -> Self {
        Self {
            api,
            storage,
            clock,
            navigator,
            scheduler,
            expiry_timer: None,
        }
    }

    /// Whether an expiry timer is armed and has not fired yet
    pub fn has_expiry_timer(&self) -> bool {
        self.expiry_timer
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
    }

    pub async fn handle(&mut self, action: &AuthAction, _state: &RootState) -> Vec<Action> {
        match action {
            AuthAction::LoginRequest { username, password } => {
                let request = AuthRequest::new(username.clone(), password.clone());
                let action = match self.api.login(&request).await.and_then(|r| login_success(&r.token)) {
                    Ok(action) => action,
                    Err(e) => AuthAction::LoginFailed {
                        error: format!("Login failed on error: {}", e),
                    },
                };
                vec![action.into()]
            }
            AuthAction::SignupRequest { username, password } => {
                let request = AuthRequest::new(username.clone(), password.clone());
                let action = match self.api.signup(&request).await.and_then(|r| login_success(&r.token)) {
                    Ok(action) => action,
                    Err(e) => AuthAction::SignupFailed {
                        error: format!("Sign up failed on error: {}", e),
                    },
                };
                vec![action.into()]
            }
            AuthAction::LoginSuccess { token, expires_at, .. } => {
                if let Err(e) = self.storage.set(STORAGE_KEY_AUTH_TOKEN, token) {
                    tracing::warn!("Failed to store access token: {}", e);
                }
                self.arm_expiry_timer(*expires_at);
                vec![]
            }
            AuthAction::Logout { return_url, .. } => {
                self.cancel_expiry_timer();
                if let Err(e) = self.storage.remove(STORAGE_KEY_AUTH_TOKEN) {
                    tracing::warn!("Failed to remove stored access token: {}", e);
                }
                let return_url = return_url.clone().or_else(|| self.navigator.current_url());
                self.navigator.to_login(return_url.as_deref());
                vec![]
            }
            AuthAction::RestoreSession => self.restore().await,
            AuthAction::LoginFailed { .. }
            | AuthAction::SignupFailed { .. }
            | AuthAction::SetInitialized
            | AuthAction::ClearError => vec![],
        }
    }

    async fn restore(&mut self) -> Vec<Action> {
        let stored = match self.storage.get(STORAGE_KEY_AUTH_TOKEN) {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!("Failed to read stored access token: {}", e);
                None
            }
        };

        let Some(token) = stored.filter(|t| !t.trim().is_empty()) else {
            return vec![AuthAction::SetInitialized.into()];
        };

        let claims = match AccessToken::decode(&token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::warn!("Failed to decode stored access token: {}", e);
                if let Err(e) = self.storage.remove(STORAGE_KEY_AUTH_TOKEN) {
                    tracing::warn!("Failed to remove stored access token: {}", e);
                }
                return vec![AuthAction::SetInitialized.into()];
            }
        };

        tracing::debug!("Restoring current session");
        if claims.is_expired(self.clock.now()) {
            tracing::debug!("Access token is expired -> initializing logout");
            return vec![AuthAction::Logout {
                set_initialized: true,
                return_url: None,
            }
            .into()];
        }

        if let Some(expires_at) = claims.expires_at() {
            tracing::debug!("Session expires at {}", expires_at);
        }

        let user = match self.api.current_user(&token).await {
            Ok(user) => user,
            Err(e) if e.is_unauthorized() => {
                tracing::info!("Stored session was rejected by the backend: {}", e);
                return vec![AuthAction::Logout {
                    set_initialized: true,
                    return_url: None,
                }
                .into()];
            }
            Err(e) => {
                tracing::warn!("Current user query failed: {}", e);
                claims.user()
            }
        };

        vec![AuthAction::LoginSuccess {
            token,
            expires_at: claims.expires_at(),
            user,
        }
        .into()]
    }

    fn arm_expiry_timer(&mut self, expires_at: Option<DateTime<Utc>>) {
        self.cancel_expiry_timer();

        let Some(expires_at) = expires_at else {
            return;
        };

        let time_left = (expires_at - self.clock.now()).to_std().unwrap_or_default();
        let scheduler = self.scheduler.clone();

        self.expiry_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(time_left).await;
            tracing::info!("Session expired -> logging out");
            let _ = scheduler.send(
                AuthAction::Logout {
                    set_initialized: false,
                    return_url: None,
                }
                .into(),
            );
        }));
    }

    fn cancel_expiry_timer(&mut self) {
        if let Some(timer) = self.expiry_timer.take() {
            timer.abort();
        }
    }
}

/// Success action for a freshly issued token
fn login_success(token: &str) -> Result<AuthAction> {
    let claims = AccessToken::decode(token)?;
    Ok(AuthAction::LoginSuccess {
        token: token.to_string(),
        expires_at: claims.expires_at(),
        user: claims.user(),
    })
}

impl Drop for SessionService {
    fn drop(&mut self) {
        self.cancel_expiry_timer();
    }
}
