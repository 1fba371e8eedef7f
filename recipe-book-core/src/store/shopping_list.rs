//! Shopping list state slice

use serde::Serialize;

use crate::domain::result::Error;
use crate::domain::shopping_list::{merge_items, remove_item, update_item};
use crate::domain::{ResolvedItem, ShoppingListItem, ShoppingListItemRequest};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ShoppingListState {
    pub items: Vec<ShoppingListItem>,
    pub selected: Option<ShoppingListItem>,
    /// Change requests still waiting for their ingredients
    pub pending_changes: u32,
    pub error: Option<String>,
}

impl ShoppingListState {
    pub fn is_updating(&self) -> bool {
        self.pending_changes > 0
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShoppingListAction {
    AddItemRequest { item: ShoppingListItemRequest },
    AddItemSuccess { item: ResolvedItem },
    AddItemsRequest { items: Vec<ShoppingListItemRequest> },
    AddItemsSuccess { items: Vec<ResolvedItem> },
    /// Add every ingredient line of a loaded recipe
    AddRecipeRequest { recipe_id: String },
    UpdateItemRequest { ordinal: u32, item: ShoppingListItemRequest },
    UpdateItemSuccess { ordinal: u32, item: ResolvedItem },
    RemoveItem { ordinal: u32 },
    UpdateFailed { error: String },
    ClearItems,
    ClearUpdateError,
    SetSelectedItem { ordinal: Option<u32> },
    LoadStoredItemsRequest,
    LoadStoredItemsSuccess { items: Vec<ShoppingListItem> },
}

impl ShoppingListAction {
    pub fn name(&self) -> &'static str {
        match self {
            ShoppingListAction::AddItemRequest { .. } => "[Shopping List] Add Item Request",
            ShoppingListAction::AddItemSuccess { .. } => "[Shopping List] Add Item Success",
            ShoppingListAction::AddItemsRequest { .. } => "[Shopping List] Add Items Request",
            ShoppingListAction::AddItemsSuccess { .. } => "[Shopping List] Add Items Success",
            ShoppingListAction::AddRecipeRequest { .. } => "[Shopping List] Add Recipe Request",
            ShoppingListAction::UpdateItemRequest { .. } => "[Shopping List] Update Item Request",
            ShoppingListAction::UpdateItemSuccess { .. } => "[Shopping List] Update Item Success",
            ShoppingListAction::RemoveItem { .. } => "[Shopping List] Remove Item",
            ShoppingListAction::UpdateFailed { .. } => "[Shopping List] Update Failed",
            ShoppingListAction::ClearItems => "[Shopping List] Clear Items",
            ShoppingListAction::ClearUpdateError => "[Shopping List] Clear Update Error",
            ShoppingListAction::SetSelectedItem { .. } => "[Shopping List] Set Selected Item",
            ShoppingListAction::LoadStoredItemsRequest => "[Shopping List] Load Stored Items Request",
            ShoppingListAction::LoadStoredItemsSuccess { .. } => "[Shopping List] Load Stored Items Success",
        }
    }

    /// Whether the list content changes and should be written to storage
    pub fn changes_items(&self) -> bool {
        matches!(
            self,
            ShoppingListAction::AddItemSuccess { .. }
                | ShoppingListAction::AddItemsSuccess { .. }
                | ShoppingListAction::UpdateItemSuccess { .. }
                | ShoppingListAction::RemoveItem { .. }
        )
    }
}

/// Find the previously selected row again after the list changed
fn reselect(selected: &Option<ShoppingListItem>, items: &[ShoppingListItem]) -> Option<ShoppingListItem> {
    let selected = selected.as_ref()?;
    items
        .iter()
        .find(|it| it.ingredient.name == selected.ingredient.name && it.unit == selected.unit)
        .cloned()
}

/// Keep the list as it was and record why the change was dropped
fn rejected(state: &ShoppingListState, error: &Error) -> ShoppingListState {
    ShoppingListState {
        pending_changes: state.pending_changes.saturating_sub(1),
        error: Some(format!("Shopping list update failed on error: {}", error)),
        ..state.clone()
    }
}

fn merged(state: &ShoppingListState, new_items: &[ResolvedItem]) -> ShoppingListState {
    let items = match merge_items(&state.items, new_items) {
        Ok(items) => items,
        Err(e) => return rejected(state, &e),
    };
    ShoppingListState {
        selected: reselect(&state.selected, &items),
        items,
        pending_changes: state.pending_changes.saturating_sub(1),
        error: None,
    }
}

pub fn reduce(state: &ShoppingListState, action: &ShoppingListAction) -> ShoppingListState {
    match action {
        ShoppingListAction::ClearItems => ShoppingListState::default(),
        ShoppingListAction::AddItemRequest { .. }
        | ShoppingListAction::AddItemsRequest { .. }
        | ShoppingListAction::UpdateItemRequest { .. } => ShoppingListState {
            pending_changes: state.pending_changes + 1,
            error: None,
            ..state.clone()
        },
        ShoppingListAction::AddItemSuccess { item } => merged(state, std::slice::from_ref(item)),
        ShoppingListAction::AddItemsSuccess { items } => merged(state, items),
        ShoppingListAction::UpdateItemSuccess { ordinal, item } => {
            let (items, new_ordinal) = match update_item(&state.items, *ordinal, item) {
                Ok(updated) => updated,
                Err(e) => return rejected(state, &e),
            };
            let selected = match &state.selected {
                Some(s) if s.ordinal == *ordinal => {
                    new_ordinal.and_then(|o| items.iter().find(|it| it.ordinal == o).cloned())
                }
                other => reselect(other, &items),
            };
            ShoppingListState {
                items,
                selected,
                pending_changes: state.pending_changes.saturating_sub(1),
                error: None,
            }
        }
        ShoppingListAction::RemoveItem { ordinal } => {
            let items = remove_item(&state.items, *ordinal);
            let selected = match &state.selected {
                Some(s) if s.ordinal == *ordinal => None,
                other => reselect(other, &items),
            };
            ShoppingListState {
                items,
                selected,
                error: None,
                ..state.clone()
            }
        }
        ShoppingListAction::UpdateFailed { error } => ShoppingListState {
            pending_changes: state.pending_changes.saturating_sub(1),
            error: Some(error.clone()),
            ..state.clone()
        },
        ShoppingListAction::ClearUpdateError => {
            if state.error.is_some() {
                ShoppingListState {
                    error: None,
                    ..state.clone()
                }
            } else {
                state.clone()
            }
        }
        ShoppingListAction::SetSelectedItem { ordinal } => ShoppingListState {
            selected: ordinal.and_then(|o| state.items.iter().find(|it| it.ordinal == o).cloned()),
            ..state.clone()
        },
        ShoppingListAction::LoadStoredItemsSuccess { items } => ShoppingListState {
            selected: state
                .selected
                .as_ref()
                .and_then(|s| items.iter().find(|it| it.ordinal == s.ordinal).cloned()),
            items: items.clone(),
            ..state.clone()
        },
        ShoppingListAction::AddRecipeRequest { .. } | ShoppingListAction::LoadStoredItemsRequest => state.clone(),
    }
}
