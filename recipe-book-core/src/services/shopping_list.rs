//! Shopping list effects
//!
//! Resolves ingredient names through the cache before an item reaches the
//! list, and keeps the `shoppingList` storage snapshot in step with the
//! state after every change.

use std::sync::Arc;

use crate::domain::result::Error;
use crate::domain::{ResolvedItem, ShoppingListItem, ShoppingListItemRequest};
use crate::ports::storage::{load_json, save_json, STORAGE_KEY_SHOPPING_LIST};
use crate::ports::KeyValueStore;
use crate::store::{Action, RootState, ShoppingListAction};

use super::failure_actions;
use super::ingredient_cache::IngredientCache;

pub struct ShoppingListEffects {
    storage: Arc<dyn KeyValueStore>,
    ingredients: Arc<IngredientCache>,
}

impl ShoppingListEffects {
    pub fn new(storage: Arc<dyn KeyValueStore>, ingredients: Arc<IngredientCache>) -> Self {
        Self { storage, ingredients }
    }

    pub async fn handle(&self, action: &ShoppingListAction, state: &RootState) -> Vec<Action> {
        let token = state.auth.token();

        if action.changes_items() {
            self.store_items(&state.shopping_list.items);
        }

        match action {
            ShoppingListAction::AddItemRequest { item } => match self.resolve(token, item).await {
                Ok(item) => vec![ShoppingListAction::AddItemSuccess { item }.into()],
                Err(e) => failure_actions(&e, update_failed("Shopping list update", &e)),
            },
            ShoppingListAction::UpdateItemRequest { ordinal, item } => match self.resolve(token, item).await {
                Ok(item) => vec![ShoppingListAction::UpdateItemSuccess {
                    ordinal: *ordinal,
                    item,
                }
                .into()],
                Err(e) => failure_actions(&e, update_failed("Shopping list update", &e)),
            },
            ShoppingListAction::AddItemsRequest { items } => {
                let names: Vec<String> = items.iter().map(|it| it.ingredient_name.clone()).collect();
                match self.ingredients.get_or_add_many(token, &names).await {
                    Ok(ingredients) => {
                        let items = items
                            .iter()
                            .zip(ingredients)
                            .map(|(it, ingredient)| ResolvedItem::new(ingredient, it.amount, it.unit))
                            .collect();
                        vec![ShoppingListAction::AddItemsSuccess { items }.into()]
                    }
                    Err(e) => failure_actions(&e, update_failed("Adding to shopping list operation", &e)),
                }
            }
            ShoppingListAction::AddRecipeRequest { recipe_id } => match state.recipes.find(recipe_id) {
                Some(recipe) => vec![ShoppingListAction::AddItemsRequest {
                    items: ShoppingListItemRequest::from_recipe(recipe),
                }
                .into()],
                None => {
                    let e = Error::not_found(format!("recipe '{}'", recipe_id));
                    vec![update_failed("Adding to shopping list operation", &e)]
                }
            },
            ShoppingListAction::ClearItems => {
                match self.storage.remove(STORAGE_KEY_SHOPPING_LIST) {
                    Ok(()) => tracing::debug!("Stored shopping list cleared"),
                    Err(e) => tracing::warn!("Failed to clear stored shopping list: {}", e),
                }
                vec![]
            }
            ShoppingListAction::LoadStoredItemsRequest => {
                let items = self.load_items();
                vec![ShoppingListAction::LoadStoredItemsSuccess { items }.into()]
            }
            ShoppingListAction::AddItemSuccess { .. }
            | ShoppingListAction::AddItemsSuccess { .. }
            | ShoppingListAction::UpdateItemSuccess { .. }
            | ShoppingListAction::RemoveItem { .. }
            | ShoppingListAction::UpdateFailed { .. }
            | ShoppingListAction::ClearUpdateError
            | ShoppingListAction::SetSelectedItem { .. }
            | ShoppingListAction::LoadStoredItemsSuccess { .. } => vec![],
        }
    }

    async fn resolve(&self, token: Option<&str>, item: &ShoppingListItemRequest) -> crate::Result<ResolvedItem> {
        let ingredient = self.ingredients.get_or_add(token, &item.ingredient_name).await?;
        Ok(ResolvedItem::new(ingredient, item.amount, item.unit))
    }

    fn store_items(&self, items: &[ShoppingListItem]) {
        match save_json(self.storage.as_ref(), STORAGE_KEY_SHOPPING_LIST, items) {
            Ok(()) => tracing::debug!("Stored shopping list updated: {} item(s)", items.len()),
            Err(e) => tracing::warn!("Failed to store shopping list: {}", e),
        }
    }

    fn load_items(&self) -> Vec<ShoppingListItem> {
        match load_json::<Vec<ShoppingListItem>>(self.storage.as_ref(), STORAGE_KEY_SHOPPING_LIST) {
            Ok(Some(items)) => {
                tracing::debug!("Restored shopping list: {} item(s)", items.len());
                self.ingredients.remember(items.iter().map(|it| &it.ingredient));
                items
            }
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to parse stored shopping list: {}", e);
                Vec::new()
            }
        }
    }
}

fn update_failed(operation: &str, error: &Error) -> Action {
    ShoppingListAction::UpdateFailed {
        error: format!("{} failed on error: {}", operation, error),
    }
    .into()
}
