//! Route guard for views that need a logged-in user

use serde::Serialize;

use crate::store::AuthState;

use super::routes;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum GuardDecision {
    Allow,
    /// The session is still being restored; ask again later
    Wait,
    RedirectToLogin { return_url: String },
}

/// Views only an authenticated user may enter
pub fn requires_auth(url: &str) -> bool {
    let path = url.split('?').next().unwrap_or(url);
    [routes::RECIPES, routes::SHOPPING_LIST]
        .iter()
        .any(|protected| path == *protected || path.starts_with(&format!("{}/", protected)))
}

/// Decide whether the view at `url` may be entered
pub fn can_activate(auth: &AuthState, url: &str) -> GuardDecision {
    if !requires_auth(url) {
        return GuardDecision::Allow;
    }
    if auth.is_pending_initialization() {
        return GuardDecision::Wait;
    }
    if auth.is_authenticated() {
        GuardDecision::Allow
    } else {
        GuardDecision::RedirectToLogin {
            return_url: url.to_string(),
        }
    }
}
