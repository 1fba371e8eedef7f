//! Recipe state slice

use serde::Serialize;

use crate::domain::{Recipe, RecipePayload};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecipeState {
    pub items: Vec<Recipe>,
    pub selected: Option<Recipe>,
    /// A change operation is in flight
    pub loading: bool,
    pub error: Option<String>,
}

impl RecipeState {
    pub fn find(&self, id: &str) -> Option<&Recipe> {
        self.items.iter().find(|r| r.id == id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecipeAction {
    FetchRecipesRequest,
    FetchRecipesSuccess { items: Vec<Recipe> },
    /// Push the whole local collection to the backend
    StoreRecipesRequest,
    StoreRecipesSuccess,
    AddRecipeRequest { payload: RecipePayload },
    AddRecipeSuccess { recipe: Recipe },
    UpdateRecipeRequest { id: String, payload: RecipePayload },
    UpdateRecipeSuccess { recipe: Recipe },
    DeleteRecipe { id: String },
    SetSelectedRecipe { id: Option<String> },
    RecipesError { error: String },
    ClearError,
}

impl RecipeAction {
    pub fn name(&self) -> &'static str {
        match self {
            RecipeAction::FetchRecipesRequest => "[Recipes] Fetch Recipes Request",
            RecipeAction::FetchRecipesSuccess { .. } => "[Recipes] Fetch Recipes Success",
            RecipeAction::StoreRecipesRequest => "[Recipes] Store Recipes Request",
            RecipeAction::StoreRecipesSuccess => "[Recipes] Store Recipes Success",
            RecipeAction::AddRecipeRequest { .. } => "[Recipes] Add Recipe Request",
            RecipeAction::AddRecipeSuccess { .. } => "[Recipes] Add Recipe Success",
            RecipeAction::UpdateRecipeRequest { .. } => "[Recipes] Update Recipe Request",
            RecipeAction::UpdateRecipeSuccess { .. } => "[Recipes] Update Recipe Success",
            RecipeAction::DeleteRecipe { .. } => "[Recipes] Delete Recipe",
            RecipeAction::SetSelectedRecipe { .. } => "[Recipes] Set Selected Recipe",
            RecipeAction::RecipesError { .. } => "[Recipes] Recipes Error",
            RecipeAction::ClearError => "[Recipes] Clear Error",
        }
    }
}

pub fn reduce(state: &RecipeState, action: &RecipeAction) -> RecipeState {
    match action {
        RecipeAction::FetchRecipesRequest
        | RecipeAction::StoreRecipesRequest
        | RecipeAction::AddRecipeRequest { .. }
        | RecipeAction::UpdateRecipeRequest { .. } => RecipeState {
            loading: true,
            error: None,
            ..state.clone()
        },
        RecipeAction::FetchRecipesSuccess { items } => RecipeState {
            selected: state
                .selected
                .as_ref()
                .and_then(|s| items.iter().find(|r| r.id == s.id).cloned()),
            items: items.clone(),
            loading: false,
            error: None,
        },
        RecipeAction::StoreRecipesSuccess => RecipeState {
            loading: false,
            error: None,
            ..state.clone()
        },
        RecipeAction::AddRecipeSuccess { recipe } => {
            let mut items = state.items.clone();
            items.push(recipe.clone());
            RecipeState {
                items,
                loading: false,
                error: None,
                ..state.clone()
            }
        }
        RecipeAction::UpdateRecipeSuccess { recipe } => RecipeState {
            items: state
                .items
                .iter()
                .map(|r| if r.id == recipe.id { recipe.clone() } else { r.clone() })
                .collect(),
            selected: match &state.selected {
                Some(s) if s.id == recipe.id => Some(recipe.clone()),
                other => other.clone(),
            },
            loading: false,
            error: None,
        },
        RecipeAction::DeleteRecipe { id } => RecipeState {
            items: state.items.iter().filter(|r| &r.id != id).cloned().collect(),
            selected: state.selected.clone().filter(|s| &s.id != id),
            ..state.clone()
        },
        RecipeAction::SetSelectedRecipe { id } => RecipeState {
            selected: id.as_deref().and_then(|id| state.find(id).cloned()),
            ..state.clone()
        },
        RecipeAction::RecipesError { error } => RecipeState {
            loading: false,
            error: Some(error.clone()),
            ..state.clone()
        },
        RecipeAction::ClearError => {
            if state.error.is_some() {
                RecipeState {
                    error: None,
                    ..state.clone()
                }
            } else {
                state.clone()
            }
        }
    }
}
