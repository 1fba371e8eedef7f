//! Recipe Book Core - state management for the recipe book application
//!
//! This crate follows hexagonal architecture:
//!
//! - **domain**: Core entities (Recipe, Ingredient, ShoppingListItem, ...)
//! - **ports**: Trait definitions for external collaborators (backend API, storage, clock)
//! - **adapters**: Concrete implementations (HTTP client, in-memory mock backend, file storage)
//! - **store**: Actions, state slices and their reducers
//! - **services**: Effects reacting to actions (session, recipes, shopping list)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;
pub mod store;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result as AnyResult};

use adapters::{FileStorage, HttpApi, MockBackend, RecordingNavigator, SystemClock};
use config::Config;
use ports::{Clock, KeyValueStore, RecipeBookApi};

// Re-export commonly used types at crate root
pub use domain::result::{Error, Result};
pub use domain::{
    Ingredient, Recipe, RecipePayload, RecipeUnit, ShoppingListItem, ShoppingListItemRequest, User,
};
pub use store::{Action, AuthAction, RecipeAction, RootState, ShoppingListAction, Store};

/// Main context for recipe book operations
///
/// Wires configuration, storage, the backend (HTTP or mock) and the store.
pub struct RecipeBookContext {
    pub config: Config,
    pub data_dir: PathBuf,
    pub storage: Arc<FileStorage>,
    pub navigator: Arc<RecordingNavigator>,
    pub store: Store,
}

impl RecipeBookContext {
    /// Create a context backed by the data directory
    pub fn new(data_dir: &Path) -> AnyResult<Self> {
        let config = Config::load(data_dir)?;
        let storage = Arc::new(
            FileStorage::new(data_dir)
                .with_context(|| format!("Failed to open storage in {:?}", data_dir))?,
        );
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let api: Arc<dyn RecipeBookApi> = if config.enable_backend_mock {
            tracing::debug!("Using in-process mock backend");
            let backend_storage: Arc<dyn KeyValueStore> = storage.clone();
            Arc::new(
                MockBackend::with_storage(backend_storage, clock.clone())
                    .with_session_ttl(chrono::Duration::seconds(config.session_ttl_seconds)),
            )
        } else {
            Arc::new(HttpApi::new(&config.backend_server_base_url)?)
        };

        let navigator = Arc::new(RecordingNavigator::new());
        let store = Store::new(api, storage.clone(), clock, navigator.clone());

        Ok(Self {
            config,
            data_dir: data_dir.to_path_buf(),
            storage,
            navigator,
            store,
        })
    }

    /// Restore the stored session and shopping list
    pub async fn initialize(&mut self) -> Vec<Action> {
        let mut processed = self.store.dispatch(AuthAction::RestoreSession).await;
        processed.extend(
            self.store
                .dispatch(ShoppingListAction::LoadStoredItemsRequest)
                .await,
        );
        processed
    }
}
