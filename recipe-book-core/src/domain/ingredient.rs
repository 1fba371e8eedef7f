//! Ingredient domain model

use serde::{Deserialize, Serialize};

/// An ingredient known to the backend. The name is the natural key; the id
/// is assigned by the backend the first time the name is used.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: u64,
    pub name: String,
}

impl Ingredient {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Body of the batched get-or-add ingredients call
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientNamesRequest {
    pub ingredient_names: Vec<String>,
}
