//! Recipe effects

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{Recipe, RecipePayload};
use crate::ports::RecipeBookApi;
use crate::store::{Action, RecipeAction, RootState};

use super::ingredient_cache::IngredientCache;
use super::failure_actions;

pub struct RecipeEffects {
    api: Arc<dyn RecipeBookApi>,
    ingredients: Arc<IngredientCache>,
}

impl RecipeEffects {
    pub fn new(api: Arc<dyn RecipeBookApi>, ingredients: Arc<IngredientCache>) -> Self {
        Self { api, ingredients }
    }

    pub async fn handle(&self, action: &RecipeAction, state: &RootState) -> Vec<Action> {
        let token = state.auth.token();

        match action {
            RecipeAction::FetchRecipesRequest => match self.api.get_recipes(token).await {
                Ok(items) => {
                    self.ingredients
                        .remember(items.iter().flat_map(|r| r.items()).map(|it| &it.ingredient));
                    tracing::debug!("Fetched {} recipe(s)", items.len());
                    vec![RecipeAction::FetchRecipesSuccess { items }.into()]
                }
                Err(e) => failure_actions(&e, recipes_error("Fetching recipes", &e)),
            },
            RecipeAction::StoreRecipesRequest => {
                match self.api.replace_recipes(token, &state.recipes.items).await {
                    Ok(()) => vec![RecipeAction::StoreRecipesSuccess.into()],
                    Err(e) => failure_actions(&e, recipes_error("Storing recipes", &e)),
                }
            }
            RecipeAction::AddRecipeRequest { payload } => {
                let id = Uuid::new_v4().to_string();
                match self.build(token, id, payload).await {
                    Ok(recipe) => vec![RecipeAction::AddRecipeSuccess { recipe }.into()],
                    Err(e) => failure_actions(&e, recipes_error("Adding recipe", &e)),
                }
            }
            RecipeAction::UpdateRecipeRequest { id, payload } => {
                let result = match state.recipes.find(id) {
                    Some(existing) => self.build(token, existing.id.clone(), payload).await,
                    None => Err(Error::not_found(format!("recipe '{}'", id))),
                };
                match result {
                    Ok(recipe) => vec![RecipeAction::UpdateRecipeSuccess { recipe }.into()],
                    Err(e) => failure_actions(&e, recipes_error("Updating recipe", &e)),
                }
            }
            RecipeAction::FetchRecipesSuccess { .. }
            | RecipeAction::StoreRecipesSuccess
            | RecipeAction::AddRecipeSuccess { .. }
            | RecipeAction::UpdateRecipeSuccess { .. }
            | RecipeAction::DeleteRecipe { .. }
            | RecipeAction::SetSelectedRecipe { .. }
            | RecipeAction::RecipesError { .. }
            | RecipeAction::ClearError => vec![],
        }
    }

    /// Resolve the payload's ingredients in one batch and build the recipe
    async fn build(&self, token: Option<&str>, id: String, payload: &RecipePayload) -> Result<Recipe> {
        let ingredients = self
            .ingredients
            .get_or_add_many(token, &payload.ingredient_names())
            .await?;
        let recipe = payload.to_recipe(id, &ingredients)?;
        recipe.validate().map_err(Error::validation)?;
        Ok(recipe)
    }
}

fn recipes_error(operation: &str, error: &Error) -> Action {
    RecipeAction::RecipesError {
        error: format!("{} failed on error: {}", operation, error),
    }
    .into()
}
