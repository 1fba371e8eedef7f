//! Effects and application services
//!
//! Effects run after an action has been reduced into state. They talk to the
//! backend and storage and answer with follow-up actions.

pub mod guard;
pub mod ingredient_cache;
pub mod recipes;
pub mod session;
pub mod shopping_list;

pub use guard::{can_activate, GuardDecision};
pub use ingredient_cache::IngredientCache;
pub use recipes::RecipeEffects;
pub use session::SessionService;
pub use shopping_list::ShoppingListEffects;

use crate::domain::result::Error;
use crate::store::{Action, AuthAction};

/// View paths
pub mod routes {
    pub const AUTH: &str = "/auth";
    pub const RECIPES: &str = "/recipes";
    pub const SHOPPING_LIST: &str = "/shopping-list";

    /// Landing view after login
    pub const HOME: &str = RECIPES;
}

/// The failure action, followed by a logout when the backend rejected the
/// session token
pub(crate) fn failure_actions(error: &Error, failure: Action) -> Vec<Action> {
    let mut actions = vec![failure];
    if error.is_unauthorized() {
        tracing::info!("Backend rejected the session -> logging out");
        actions.push(
            AuthAction::Logout {
                set_initialized: false,
                return_url: None,
            }
            .into(),
        );
    }
    actions
}
