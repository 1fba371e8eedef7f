//! Ingredient cache
//!
//! Ingredients are created by the backend on first use of a name. The cache
//! remembers every ingredient seen in this session so that a name is sent to
//! the backend at most once.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::result::{Error, Result};
use crate::domain::Ingredient;
use crate::ports::RecipeBookApi;

pub struct IngredientCache {
    api: Arc<dyn RecipeBookApi>,
    by_name: Mutex<HashMap<String, Ingredient>>,
}

impl IngredientCache {
    pub fn new(api: Arc<dyn RecipeBookApi>) -> Self {
        Self {
            api,
            by_name: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Ingredient>> {
        self.by_name.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn cached(&self, name: &str) -> Option<Ingredient> {
        self.lock().get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Remember ingredients learned elsewhere (e.g. from fetched recipes)
    pub fn remember<'a>(&self, ingredients: impl IntoIterator<Item = &'a Ingredient>) {
        let mut cache = self.lock();
        for ingredient in ingredients {
            cache
                .entry(ingredient.name.clone())
                .or_insert_with(|| ingredient.clone());
        }
    }

    /// Every cached ingredient, sorted by id
    pub fn ingredients(&self) -> Vec<Ingredient> {
        let mut all: Vec<Ingredient> = self.lock().values().cloned().collect();
        all.sort_by_key(|i| i.id);
        all
    }

    /// Fill the cache with everything the backend knows
    pub async fn preload(&self, token: Option<&str>) -> Result<usize> {
        let ingredients = self.api.get_ingredients(token).await?;
        self.remember(&ingredients);
        tracing::debug!("Preloaded {} ingredient(s)", ingredients.len());
        Ok(ingredients.len())
    }

    /// Ingredient for `name`, created by the backend when not cached
    pub async fn get_or_add(&self, token: Option<&str>, name: &str) -> Result<Ingredient> {
        let mut found = self.get_or_add_many(token, &[name.to_string()]).await?;
        found
            .pop()
            .ok_or_else(|| Error::not_found(format!("ingredient '{}'", name)))
    }

    /// Ingredients for `names`, in the same order.
    ///
    /// All names missing from the cache are resolved with a single backend
    /// call; a fully cached batch makes no call at all.
    pub async fn get_or_add_many(&self, token: Option<&str>, names: &[String]) -> Result<Vec<Ingredient>> {
        let missing: Vec<String> = {
            let cache = self.lock();
            let mut missing: Vec<String> = Vec::new();
            for name in names {
                if !cache.contains_key(name) && !missing.contains(name) {
                    missing.push(name.clone());
                }
            }
            missing
        };

        if !missing.is_empty() {
            tracing::debug!("Resolving {} new ingredient name(s)", missing.len());
            let resolved = self.api.get_or_add_ingredients(token, &missing).await?;
            self.remember(&resolved);
        }

        let cache = self.lock();
        names
            .iter()
            .map(|name| {
                cache
                    .get(name)
                    .cloned()
                    .ok_or_else(|| Error::not_found(format!("ingredient '{}' was not returned by the backend", name)))
            })
            .collect()
    }
}
