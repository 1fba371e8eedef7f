//! Authentication state slice

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::User;

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Nothing has been restored yet
    #[default]
    Uninitialized,
    /// A stored token is being checked
    Restoring,
    Authenticated,
    Unauthenticated,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AuthState {
    pub status: SessionStatus,
    /// Bearer token for backend calls
    #[serde(skip_serializing)]
    pub token: Option<String>,
    pub token_expires_at: Option<DateTime<Utc>>,
    pub user: Option<User>,
    pub pending_authentication: bool,
    pub error: Option<String>,
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn is_pending_authentication(&self) -> bool {
        self.pending_authentication
    }

    pub fn is_pending_initialization(&self) -> bool {
        matches!(self.status, SessionStatus::Uninitialized | SessionStatus::Restoring)
    }

    pub fn is_pending_state_change(&self) -> bool {
        self.is_pending_initialization() || self.pending_authentication
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn token_expires_at(&self) -> Option<DateTime<Utc>> {
        self.token_expires_at
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[derive(Clone, PartialEq)]
pub enum AuthAction {
    LoginRequest {
        username: String,
        password: String,
    },
    SignupRequest {
        username: String,
        password: String,
    },
    LoginSuccess {
        token: String,
        expires_at: Option<DateTime<Utc>>,
        user: User,
    },
    LoginFailed {
        error: String,
    },
    SignupFailed {
        error: String,
    },
    /// End the session. `set_initialized` also ends a pending initialization;
    /// `return_url` is where the user goes after logging in again.
    Logout {
        set_initialized: bool,
        return_url: Option<String>,
    },
    RestoreSession,
    SetInitialized,
    ClearError,
}

impl AuthAction {
    pub fn name(&self) -> &'static str {
        match self {
            AuthAction::LoginRequest { .. } => "[Auth] Login Request",
            AuthAction::SignupRequest { .. } => "[Auth] Signup Request",
            AuthAction::LoginSuccess { .. } => "[Auth] Login Success",
            AuthAction::LoginFailed { .. } => "[Auth] Login Failed",
            AuthAction::SignupFailed { .. } => "[Auth] Signup Failed",
            AuthAction::Logout { .. } => "[Auth] Logout",
            AuthAction::RestoreSession => "[Auth] Restore Session",
            AuthAction::SetInitialized => "[Auth] Set Initialized",
            AuthAction::ClearError => "[Auth] Clear Error",
        }
    }
}

// Passwords and tokens stay out of logs
impl std::fmt::Debug for AuthAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthAction::LoginRequest { username, .. } | AuthAction::SignupRequest { username, .. } => {
                write!(f, "{} {{ username: {:?} }}", self.name(), username)
            }
            AuthAction::LoginSuccess { expires_at, user, .. } => {
                write!(f, "{} {{ user: {:?}, expires_at: {:?} }}", self.name(), user, expires_at)
            }
            AuthAction::LoginFailed { error } | AuthAction::SignupFailed { error } => {
                write!(f, "{} {{ error: {:?} }}", self.name(), error)
            }
            AuthAction::Logout {
                set_initialized,
                return_url,
            } => write!(
                f,
                "{} {{ set_initialized: {}, return_url: {:?} }}",
                self.name(),
                set_initialized,
                return_url
            ),
            _ => f.write_str(self.name()),
        }
    }
}

pub fn reduce(state: &AuthState, action: &AuthAction) -> AuthState {
    match action {
        AuthAction::LoginRequest { .. } | AuthAction::SignupRequest { .. } => AuthState {
            pending_authentication: true,
            error: None,
            ..state.clone()
        },
        AuthAction::LoginSuccess {
            token,
            expires_at,
            user,
        } => AuthState {
            status: SessionStatus::Authenticated,
            token: Some(token.clone()),
            token_expires_at: *expires_at,
            user: Some(user.clone()),
            pending_authentication: false,
            error: None,
        },
        AuthAction::LoginFailed { error } | AuthAction::SignupFailed { error } => AuthState {
            token: None,
            token_expires_at: None,
            user: None,
            pending_authentication: false,
            error: Some(error.clone()),
            ..state.clone()
        },
        AuthAction::Logout { set_initialized, .. } => {
            let status = if *set_initialized || !state.is_pending_initialization() {
                SessionStatus::Unauthenticated
            } else {
                state.status
            };
            AuthState {
                status,
                ..AuthState::default()
            }
        }
        AuthAction::RestoreSession => {
            if state.status == SessionStatus::Uninitialized {
                AuthState {
                    status: SessionStatus::Restoring,
                    ..state.clone()
                }
            } else {
                state.clone()
            }
        }
        AuthAction::SetInitialized => {
            if state.is_pending_initialization() {
                AuthState {
                    status: SessionStatus::Unauthenticated,
                    ..state.clone()
                }
            } else {
                state.clone()
            }
        }
        AuthAction::ClearError => {
            if state.error.is_some() {
                AuthState {
                    error: None,
                    ..state.clone()
                }
            } else {
                state.clone()
            }
        }
    }
}
