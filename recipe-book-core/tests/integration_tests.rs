//! Integration tests for recipe-book-core
//!
//! These tests drive the store end to end against the in-process mock
//! backend. Time is paused for the session tests so that expiry timers fire
//! deterministically.
//!
//! Run with: cargo test --test integration_tests -- --nocapture

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use tempfile::TempDir;

use recipe_book_core::adapters::mock_backend::DEFAULT_SESSION_TTL_SECONDS;
use recipe_book_core::adapters::{FileStorage, FixedClock, MemoryStorage, MockBackend, RecordingNavigator};
use recipe_book_core::domain::{AccessToken, RecipeIngredientPayload};
use recipe_book_core::ports::storage::{STORAGE_KEY_AUTH_TOKEN, STORAGE_KEY_SHOPPING_LIST};
use recipe_book_core::ports::{Clock, Endpoint, KeyValueStore};
use recipe_book_core::store::SessionStatus;
use recipe_book_core::{
    Action, AuthAction, RecipeAction, RecipePayload, RecipeUnit, ShoppingListAction, ShoppingListItemRequest,
    Store,
};

// ============================================================================
// Test Helpers
// ============================================================================

struct Harness {
    store: Store,
    backend: Arc<MockBackend>,
    storage: Arc<dyn KeyValueStore>,
    clock: Arc<FixedClock>,
    navigator: Arc<RecordingNavigator>,
}

fn harness_with_storage(storage: Arc<dyn KeyValueStore>) -> Harness {
    let clock = Arc::new(FixedClock::new(Utc::now()));
    let backend = Arc::new(MockBackend::new(clock.clone()));
    let navigator = Arc::new(RecordingNavigator::new());
    let store = Store::new(backend.clone(), storage.clone(), clock.clone(), navigator.clone());

    Harness {
        store,
        backend,
        storage,
        clock,
        navigator,
    }
}

fn harness() -> Harness {
    harness_with_storage(Arc::new(MemoryStorage::new()))
}

fn names(actions: &[Action]) -> Vec<&'static str> {
    actions.iter().map(|a| a.name()).collect()
}

fn login_request(username: &str, password: &str) -> AuthAction {
    AuthAction::LoginRequest {
        username: username.to_string(),
        password: password.to_string(),
    }
}

async fn login(h: &mut Harness) {
    h.store.dispatch(login_request("testUser", "testUser")).await;
    assert!(h.store.state().auth.is_authenticated());
}

fn pcs(name: &str, amount: i64) -> ShoppingListItemRequest {
    ShoppingListItemRequest::new(name, Decimal::new(amount, 0), RecipeUnit::Pcs)
}

fn pancakes() -> RecipePayload {
    RecipePayload {
        name: "Pancakes".to_string(),
        description: "Sunday breakfast".to_string(),
        image_url: String::new(),
        ingredient_items: vec![
            RecipeIngredientPayload::new("flour", Decimal::new(250, 0), RecipeUnit::Grams, Some("batter")),
            RecipeIngredientPayload::new("eggs", Decimal::new(2, 0), RecipeUnit::Pcs, Some("batter")),
            RecipeIngredientPayload::new("milk", Decimal::new(5, 1), RecipeUnit::Liter, Some("batter")),
            RecipeIngredientPayload::new("maple syrup", Decimal::new(3, 0), RecipeUnit::TableSpoon, Some("topping")),
        ],
    }
}

// ============================================================================
// Session Lifecycle Tests
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_login_persists_token_and_arms_timer() {
    let mut h = harness();
    h.store.dispatch(AuthAction::RestoreSession).await;
    assert_eq!(h.store.state().auth.status, SessionStatus::Unauthenticated);

    login(&mut h).await;

    let auth = &h.store.state().auth;
    assert_eq!(auth.status, SessionStatus::Authenticated);
    assert_eq!(auth.user.as_ref().unwrap().username, "testUser");
    assert!(auth.token_expires_at().unwrap() > h.clock.now());
    assert_eq!(
        h.storage.get(STORAGE_KEY_AUTH_TOKEN).unwrap().as_deref(),
        auth.token()
    );
    assert!(h.store.has_expiry_timer());
}

#[tokio::test]
async fn test_login_failure_message() {
    let mut h = harness();
    let processed = h.store.dispatch(login_request("testUser", "wrong")).await;

    assert_eq!(names(&processed), vec!["[Auth] Login Request", "[Auth] Login Failed"]);
    let auth = &h.store.state().auth;
    assert!(!auth.is_authenticated());
    assert!(!auth.is_pending_authentication());
    assert_eq!(auth.error(), Some("Login failed on error: invalid username or password"));

    h.store.dispatch(AuthAction::ClearError).await;
    assert!(h.store.state().auth.error().is_none());
}

#[tokio::test]
async fn test_signup_conflict_and_success() {
    let mut h = harness();
    h.store
        .dispatch(AuthAction::SignupRequest {
            username: "testUser".to_string(),
            password: "x".to_string(),
        })
        .await;
    assert_eq!(
        h.store.state().auth.error(),
        Some("Sign up failed on error: username already exists")
    );

    h.store
        .dispatch(AuthAction::SignupRequest {
            username: "chef".to_string(),
            password: "secret".to_string(),
        })
        .await;
    let auth = &h.store.state().auth;
    assert!(auth.is_authenticated());
    assert_eq!(auth.user.as_ref().unwrap().username, "chef");
}

#[tokio::test(start_paused = true)]
async fn test_expiry_timer_logs_out() {
    let mut h = harness();
    login(&mut h).await;
    h.navigator.visit("/shopping-list");

    tokio::time::sleep(StdDuration::from_secs(DEFAULT_SESSION_TTL_SECONDS as u64 + 1)).await;
    let processed = h.store.process_pending().await;

    assert_eq!(names(&processed), vec!["[Auth] Logout"]);
    assert!(!h.store.state().auth.is_authenticated());
    assert!(h.storage.get(STORAGE_KEY_AUTH_TOKEN).unwrap().is_none());
    assert_eq!(h.navigator.login_redirects(), vec![Some("/shopping-list".to_string())]);
    assert!(!h.store.has_expiry_timer());
}

#[tokio::test(start_paused = true)]
async fn test_next_scheduled_waits_for_expiry() {
    let mut h = harness();
    login(&mut h).await;

    let processed = h.store.next_scheduled().await;
    assert_eq!(names(&processed), vec!["[Auth] Logout"]);
    assert_eq!(h.store.state().auth.status, SessionStatus::Unauthenticated);
}

#[tokio::test(start_paused = true)]
async fn test_logout_cancels_timer() {
    let mut h = harness();
    login(&mut h).await;
    assert!(h.store.has_expiry_timer());

    h.store
        .dispatch(AuthAction::Logout {
            set_initialized: false,
            return_url: Some("/recipes".to_string()),
        })
        .await;

    assert!(!h.store.has_expiry_timer());
    assert!(h.storage.get(STORAGE_KEY_AUTH_TOKEN).unwrap().is_none());
    assert_eq!(h.navigator.take_login_redirects(), vec![Some("/recipes".to_string())]);

    // Nothing fires after the original expiry
    tokio::time::sleep(StdDuration::from_secs(DEFAULT_SESSION_TTL_SECONDS as u64 * 2)).await;
    assert!(h.store.process_pending().await.is_empty());
    assert!(h.navigator.login_redirects().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_relogin_replaces_timer() {
    let mut h = harness();
    login(&mut h).await;

    tokio::time::sleep(StdDuration::from_secs(DEFAULT_SESSION_TTL_SECONDS as u64 / 2)).await;
    h.clock.advance(Duration::seconds(DEFAULT_SESSION_TTL_SECONDS / 2));
    login(&mut h).await;

    // The first token's expiry passes without a logout
    tokio::time::sleep(StdDuration::from_secs(DEFAULT_SESSION_TTL_SECONDS as u64 / 2 + 5)).await;
    assert!(h.store.process_pending().await.is_empty());
    assert!(h.store.state().auth.is_authenticated());
}

#[tokio::test(start_paused = true)]
async fn test_restore_with_valid_token() {
    let mut h = harness();
    let token = h.backend.issue_token("testUser").unwrap();
    h.storage.set(STORAGE_KEY_AUTH_TOKEN, &token).unwrap();

    let processed = h.store.dispatch(AuthAction::RestoreSession).await;

    assert_eq!(names(&processed), vec!["[Auth] Restore Session", "[Auth] Login Success"]);
    let auth = &h.store.state().auth;
    assert_eq!(auth.status, SessionStatus::Authenticated);
    assert_eq!(auth.token(), Some(token.as_str()));
    assert_eq!(h.backend.calls(Endpoint::CurrentUser), 1);
    assert!(h.store.has_expiry_timer());
}

#[tokio::test(start_paused = true)]
async fn test_restore_with_expired_token_logs_out_immediately() {
    let mut h = harness();
    let expired = AccessToken::new(1, "testUser", Some((h.clock.now() - Duration::seconds(10)).timestamp()))
        .encode_unsigned()
        .unwrap();
    h.storage.set(STORAGE_KEY_AUTH_TOKEN, &expired).unwrap();

    let processed = h.store.dispatch(AuthAction::RestoreSession).await;

    assert_eq!(names(&processed), vec!["[Auth] Restore Session", "[Auth] Logout"]);
    assert_eq!(h.store.state().auth.status, SessionStatus::Unauthenticated);
    assert!(h.storage.get(STORAGE_KEY_AUTH_TOKEN).unwrap().is_none());
    assert!(!h.store.has_expiry_timer());
    assert_eq!(h.backend.total_calls(), 0);
}

#[tokio::test]
async fn test_restore_with_garbage_token() {
    let mut h = harness();
    h.storage.set(STORAGE_KEY_AUTH_TOKEN, "not-a-token").unwrap();

    let processed = h.store.dispatch(AuthAction::RestoreSession).await;

    assert_eq!(names(&processed), vec!["[Auth] Restore Session", "[Auth] Set Initialized"]);
    assert_eq!(h.store.state().auth.status, SessionStatus::Unauthenticated);
    assert!(h.storage.get(STORAGE_KEY_AUTH_TOKEN).unwrap().is_none());
    assert!(h.navigator.login_redirects().is_empty());
}

#[tokio::test]
async fn test_restore_rejected_by_backend() {
    let mut h = harness();
    let foreign = AccessToken::new(99, "ghost", Some((h.clock.now() + Duration::hours(1)).timestamp()))
        .encode_unsigned()
        .unwrap();
    h.storage.set(STORAGE_KEY_AUTH_TOKEN, &foreign).unwrap();

    let processed = h.store.dispatch(AuthAction::RestoreSession).await;

    assert_eq!(names(&processed), vec!["[Auth] Restore Session", "[Auth] Logout"]);
    assert_eq!(h.store.state().auth.status, SessionStatus::Unauthenticated);
    assert!(h.storage.get(STORAGE_KEY_AUTH_TOKEN).unwrap().is_none());
}

// ============================================================================
// Recipe Tests
// ============================================================================

#[tokio::test]
async fn test_fetch_recipes_warms_ingredient_cache() {
    let mut h = harness();
    login(&mut h).await;

    h.store.dispatch(RecipeAction::FetchRecipesRequest).await;
    let recipes = &h.store.state().recipes;
    assert!(!recipes.loading);
    assert_eq!(recipes.items.len(), 3);

    let burger = recipes.items.iter().find(|r| r.name == "A Mighty Burger").unwrap().clone();
    h.store
        .dispatch(ShoppingListAction::AddRecipeRequest {
            recipe_id: burger.id.clone(),
        })
        .await;

    assert_eq!(h.store.state().shopping_list.items.len(), burger.item_count());
    assert_eq!(h.backend.calls(Endpoint::AddIngredients), 0);
}

#[tokio::test]
async fn test_add_recipe_resolves_ingredients_in_one_batch() {
    let mut h = harness();
    login(&mut h).await;

    let processed = h
        .store
        .dispatch(RecipeAction::AddRecipeRequest { payload: pancakes() })
        .await;
    assert_eq!(
        names(&processed),
        vec!["[Recipes] Add Recipe Request", "[Recipes] Add Recipe Success"]
    );
    assert_eq!(h.backend.calls(Endpoint::AddIngredients), 1);

    let recipe = h.store.state().recipes.items[0].clone();
    assert_eq!(recipe.phases.len(), 2);
    assert_eq!(
        recipe.items().iter().map(|it| it.ordinal).collect::<Vec<_>>(),
        vec![1, 2, 3, 4]
    );
    assert!(uuid::Uuid::parse_str(&recipe.id).is_ok());

    // Same ingredients again: served from the cache
    h.store
        .dispatch(RecipeAction::AddRecipeRequest { payload: pancakes() })
        .await;
    assert_eq!(h.backend.calls(Endpoint::AddIngredients), 1);
}

#[tokio::test]
async fn test_update_store_and_refetch() {
    let mut h = harness();
    login(&mut h).await;
    h.store
        .dispatch(RecipeAction::AddRecipeRequest { payload: pancakes() })
        .await;
    let id = h.store.state().recipes.items[0].id.clone();
    h.store
        .dispatch(RecipeAction::SetSelectedRecipe { id: Some(id.clone()) })
        .await;

    let mut payload = pancakes();
    payload.ingredient_items.remove(3);
    h.store
        .dispatch(RecipeAction::UpdateRecipeRequest {
            id: id.clone(),
            payload,
        })
        .await;
    assert_eq!(h.store.state().recipes.selected.as_ref().unwrap().item_count(), 3);

    h.store.dispatch(RecipeAction::StoreRecipesRequest).await;
    h.store.dispatch(RecipeAction::FetchRecipesRequest).await;

    let recipes = &h.store.state().recipes;
    assert_eq!(recipes.items.len(), 1);
    assert_eq!(recipes.selected.as_ref().unwrap().id, id);
    assert!(recipes.error.is_none());
}

#[tokio::test]
async fn test_update_unknown_recipe_fails() {
    let mut h = harness();
    login(&mut h).await;
    h.store
        .dispatch(RecipeAction::UpdateRecipeRequest {
            id: "missing".to_string(),
            payload: pancakes(),
        })
        .await;

    let error = h.store.state().recipes.error.clone().unwrap();
    assert!(error.starts_with("Updating recipe failed on error: "));
    assert!(h.store.state().auth.is_authenticated());
}

#[tokio::test]
async fn test_add_recipe_without_session_logs_out() {
    let mut h = harness();
    h.navigator.visit("/recipes/new");

    let processed = h
        .store
        .dispatch(RecipeAction::AddRecipeRequest { payload: pancakes() })
        .await;

    assert_eq!(
        names(&processed),
        vec!["[Recipes] Add Recipe Request", "[Recipes] Recipes Error", "[Auth] Logout"]
    );
    assert!(h
        .store
        .state()
        .recipes
        .error
        .as_deref()
        .unwrap()
        .starts_with("Adding recipe failed on error: "));
    assert_eq!(h.navigator.login_redirects(), vec![Some("/recipes/new".to_string())]);
}

// ============================================================================
// Shopping List Tests
// ============================================================================

#[tokio::test]
async fn test_adding_same_ingredient_twice_merges() {
    let mut h = harness();
    login(&mut h).await;

    h.store
        .dispatch(ShoppingListAction::AddItemsRequest {
            items: vec![pcs("eggs", 2)],
        })
        .await;
    h.store
        .dispatch(ShoppingListAction::AddItemsRequest {
            items: vec![pcs("eggs", 3)],
        })
        .await;

    let list = &h.store.state().shopping_list;
    assert_eq!(list.items.len(), 1);
    assert_eq!(list.items[0].ingredient.name, "eggs");
    assert_eq!(list.items[0].amount, Decimal::new(5, 0));
    assert_eq!(list.items[0].unit, RecipeUnit::Pcs);
    assert_eq!(list.pending_changes, 0);
    assert_eq!(h.backend.calls(Endpoint::AddIngredients), 1);
}

#[tokio::test]
async fn test_amount_overflow_is_rejected_not_panicking() {
    let mut h = harness();
    login(&mut h).await;

    let max = ShoppingListItemRequest::new("eggs", Decimal::MAX, RecipeUnit::Pcs);
    h.store
        .dispatch(ShoppingListAction::AddItemRequest { item: max.clone() })
        .await;
    h.store.dispatch(ShoppingListAction::AddItemRequest { item: max }).await;

    let list = &h.store.state().shopping_list;
    assert_eq!(list.items.len(), 1);
    assert_eq!(list.items[0].amount, Decimal::MAX);
    assert_eq!(list.pending_changes, 0);
    assert!(list.error.as_deref().unwrap().contains("too large"));
}

#[tokio::test]
async fn test_same_ingredient_in_other_unit_gets_own_row() {
    let mut h = harness();
    login(&mut h).await;

    h.store
        .dispatch(ShoppingListAction::AddItemRequest { item: pcs("milk", 1) })
        .await;
    h.store
        .dispatch(ShoppingListAction::AddItemRequest {
            item: ShoppingListItemRequest::new("milk", Decimal::new(5, 1), RecipeUnit::Liter),
        })
        .await;

    assert_eq!(h.store.state().shopping_list.items.len(), 2);
}

#[tokio::test]
async fn test_list_is_persisted_and_restored() {
    let mut h = harness();
    login(&mut h).await;

    h.store
        .dispatch(ShoppingListAction::AddItemsRequest {
            items: vec![pcs("eggs", 2), pcs("lemons", 3), pcs("limes", 1)],
        })
        .await;
    h.store.dispatch(ShoppingListAction::RemoveItem { ordinal: 2 }).await;
    let items = h.store.state().shopping_list.items.clone();
    assert_eq!(items.iter().map(|it| it.ordinal).collect::<Vec<_>>(), vec![1, 2]);

    let mut restored = harness_with_storage(h.storage.clone());
    restored
        .store
        .dispatch(ShoppingListAction::LoadStoredItemsRequest)
        .await;
    assert_eq!(restored.store.state().shopping_list.items, items);

    restored.store.dispatch(ShoppingListAction::ClearItems).await;
    assert!(restored.storage.get(STORAGE_KEY_SHOPPING_LIST).unwrap().is_none());
}

#[tokio::test]
async fn test_update_item_folds_into_existing_row() {
    let mut h = harness();
    login(&mut h).await;
    h.store
        .dispatch(ShoppingListAction::AddItemsRequest {
            items: vec![pcs("eggs", 2), pcs("apples", 4)],
        })
        .await;

    h.store
        .dispatch(ShoppingListAction::UpdateItemRequest {
            ordinal: 2,
            item: pcs("eggs", 1),
        })
        .await;

    let list = &h.store.state().shopping_list;
    assert_eq!(list.items.len(), 1);
    assert_eq!(list.items[0].amount, Decimal::new(3, 0));
}

#[tokio::test]
async fn test_add_item_without_session_reports_failure() {
    let mut h = harness();
    let processed = h
        .store
        .dispatch(ShoppingListAction::AddItemRequest { item: pcs("eggs", 1) })
        .await;

    assert_eq!(
        names(&processed),
        vec![
            "[Shopping List] Add Item Request",
            "[Shopping List] Update Failed",
            "[Auth] Logout"
        ]
    );
    let list = &h.store.state().shopping_list;
    assert!(list.items.is_empty());
    assert_eq!(list.pending_changes, 0);
    assert!(list
        .error
        .as_deref()
        .unwrap()
        .starts_with("Shopping list update failed on error: "));
}

#[tokio::test]
async fn test_add_unknown_recipe_to_list() {
    let mut h = harness();
    login(&mut h).await;
    h.store
        .dispatch(ShoppingListAction::AddRecipeRequest {
            recipe_id: "nope".to_string(),
        })
        .await;

    let error = h.store.state().shopping_list.error.clone().unwrap();
    assert!(error.starts_with("Adding to shopping list operation failed on error: "));
}

#[tokio::test]
async fn test_corrupt_stored_list_loads_empty() {
    let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStorage::new());
    storage.set(STORAGE_KEY_SHOPPING_LIST, "{not a list").unwrap();

    let mut h = harness_with_storage(storage);
    let processed = h
        .store
        .dispatch(ShoppingListAction::LoadStoredItemsRequest)
        .await;

    assert_eq!(processed.len(), 2);
    assert!(h.store.state().shopping_list.items.is_empty());
}

// ============================================================================
// File Storage Tests
// ============================================================================

#[tokio::test]
async fn test_session_survives_restart_with_file_storage() {
    let temp_dir = TempDir::new().unwrap();
    let storage: Arc<dyn KeyValueStore> = Arc::new(FileStorage::new(temp_dir.path()).unwrap());

    let mut first = harness_with_storage(storage.clone());
    login(&mut first).await;
    first
        .store
        .dispatch(ShoppingListAction::AddItemRequest { item: pcs("eggs", 6) })
        .await;
    let token = first.store.state().auth.token().map(str::to_string);
    drop(first);

    let storage: Arc<dyn KeyValueStore> = Arc::new(FileStorage::new(temp_dir.path()).unwrap());
    let mut second = harness_with_storage(storage);
    second.store.dispatch(AuthAction::RestoreSession).await;
    second
        .store
        .dispatch(ShoppingListAction::LoadStoredItemsRequest)
        .await;

    // The second harness has its own mock backend, which knows testUser too
    assert_eq!(second.store.state().auth.token().map(str::to_string), token);
    assert_eq!(second.store.state().shopping_list.items.len(), 1);
}

// ============================================================================
// Context Tests
// ============================================================================

#[tokio::test]
async fn test_context_initializes_fresh_data_dir() {
    let temp_dir = TempDir::new().unwrap();
    let mut ctx = recipe_book_core::RecipeBookContext::new(temp_dir.path()).unwrap();
    assert!(ctx.config.enable_backend_mock);

    let processed = ctx.initialize().await;
    assert_eq!(
        names(&processed),
        vec![
            "[Auth] Restore Session",
            "[Auth] Set Initialized",
            "[Shopping List] Load Stored Items Request",
            "[Shopping List] Load Stored Items Success"
        ]
    );
    assert_eq!(ctx.store.state().auth.status, SessionStatus::Unauthenticated);

    ctx.store.dispatch(login_request("testUser", "testUser")).await;
    ctx.store.dispatch(RecipeAction::FetchRecipesRequest).await;
    assert_eq!(ctx.store.state().recipes.items.len(), 3);
    assert!(ctx.storage.path().exists());
}
