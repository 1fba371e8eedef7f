//! Application store
//!
//! State is changed only by dispatching actions. Each action is first reduced
//! into a new `RootState` by the pure reducers of its slice, then handed to
//! the effects together with the reduced state. Actions returned by effects
//! are queued and processed in FIFO order until the queue is empty.
//!
//! Timers (session expiry) cannot call back into the store; they send
//! actions into a channel that `process_pending` and `next_scheduled` drain.

pub mod auth;
pub mod recipes;
pub mod shopping_list;

use std::collections::VecDeque;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc::{self, UnboundedReceiver};

pub use auth::{AuthAction, AuthState, SessionStatus};
pub use recipes::{RecipeAction, RecipeState};
pub use shopping_list::{ShoppingListAction, ShoppingListState};

use crate::ports::{Clock, KeyValueStore, Navigator, RecipeBookApi};
use crate::services::{IngredientCache, RecipeEffects, SessionService, ShoppingListEffects};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Auth(AuthAction),
    Recipes(RecipeAction),
    ShoppingList(ShoppingListAction),
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Auth(a) => a.name(),
            Action::Recipes(a) => a.name(),
            Action::ShoppingList(a) => a.name(),
        }
    }
}

impl From<AuthAction> for Action {
    fn from(action: AuthAction) -> Self {
        Action::Auth(action)
    }
}

impl From<RecipeAction> for Action {
    fn from(action: RecipeAction) -> Self {
        Action::Recipes(action)
    }
}

impl From<ShoppingListAction> for Action {
    fn from(action: ShoppingListAction) -> Self {
        Action::ShoppingList(action)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RootState {
    pub auth: AuthState,
    pub recipes: RecipeState,
    pub shopping_list: ShoppingListState,
}

pub fn reduce(state: &RootState, action: &Action) -> RootState {
    match action {
        Action::Auth(a) => RootState {
            auth: auth::reduce(&state.auth, a),
            ..state.clone()
        },
        Action::Recipes(a) => RootState {
            recipes: recipes::reduce(&state.recipes, a),
            ..state.clone()
        },
        Action::ShoppingList(a) => RootState {
            shopping_list: shopping_list::reduce(&state.shopping_list, a),
            ..state.clone()
        },
    }
}

pub struct Store {
    state: RootState,
    queue: VecDeque<Action>,
    scheduled: UnboundedReceiver<Action>,
    ingredients: Arc<IngredientCache>,
    session: SessionService,
    recipes: RecipeEffects,
    shopping_list: ShoppingListEffects,
}

impl Store {
    pub fn new(
        api: Arc<dyn RecipeBookApi>,
        storage: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let (scheduler, scheduled) = mpsc::unbounded_channel();
        let ingredients = Arc::new(IngredientCache::new(api.clone()));

        Self {
            state: RootState::default(),
            queue: VecDeque::new(),
            scheduled,
            session: SessionService::new(api.clone(), storage.clone(), clock, navigator, scheduler),
            recipes: RecipeEffects::new(api, ingredients.clone()),
            shopping_list: ShoppingListEffects::new(storage, ingredients.clone()),
            ingredients,
        }
    }

    pub fn state(&self) -> &RootState {
        &self.state
    }

    pub fn ingredients(&self) -> &IngredientCache {
        &self.ingredients
    }

    /// Load every known ingredient into the cache.
    ///
    /// A rejected session token ends the session like any other backend call.
    pub async fn preload_ingredients(&mut self) -> crate::Result<usize> {
        let token = self.state.auth.token().map(str::to_string);
        let result = self.ingredients.preload(token.as_deref()).await;
        if let Err(e) = &result {
            if e.is_unauthorized() {
                tracing::info!("Backend rejected the session -> logging out");
                self.dispatch(AuthAction::Logout {
                    set_initialized: false,
                    return_url: None,
                })
                .await;
            }
        }
        result
    }

    pub fn has_expiry_timer(&self) -> bool {
        self.session.has_expiry_timer()
    }

    /// Dispatch an action and everything it leads to.
    ///
    /// Returns the processed actions in processing order, starting with the
    /// dispatched one.
    pub async fn dispatch(&mut self, action: impl Into<Action>) -> Vec<Action> {
        self.queue.push_back(action.into());
        self.run().await
    }

    /// Process actions sent by timers that are already waiting
    pub async fn process_pending(&mut self) -> Vec<Action> {
        while let Ok(action) = self.scheduled.try_recv() {
            self.queue.push_back(action);
        }
        self.run().await
    }

    /// Wait for the next timer action and process it
    pub async fn next_scheduled(&mut self) -> Vec<Action> {
        match self.scheduled.recv().await {
            Some(action) => self.dispatch(action).await,
            None => Vec::new(),
        }
    }

    async fn run(&mut self) -> Vec<Action> {
        let mut processed = Vec::new();

        while let Some(action) = self.queue.pop_front() {
            tracing::debug!("{:?}", action);
            self.state = reduce(&self.state, &action);

            let follow_ups = match &action {
                Action::Auth(a) => self.session.handle(a, &self.state).await,
                Action::Recipes(a) => self.recipes.handle(a, &self.state).await,
                Action::ShoppingList(a) => self.shopping_list.handle(a, &self.state).await,
            };

            self.queue.extend(follow_ups);
            processed.push(action);
        }

        processed
    }
}
