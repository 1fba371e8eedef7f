//! Recipe domain model
//!
//! A recipe stores its ingredient line items grouped into named phases
//! ("sauce", "topping", ...). The unnamed phase `""` is used when a recipe
//! does not group its items at all. Item ordinals run across the whole
//! recipe, not per phase, and are kept contiguous `1..N` after every edit.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::result::{Error, Result};
use super::{Ingredient, RecipeUnit};

/// Name of the phase used when no grouping is in use
pub const UNNAMED_PHASE: &str = "";

/// A single ingredient line of a recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeItem {
    pub ordinal: u32,
    pub ingredient: Ingredient,
    pub amount: Decimal,
    pub unit: RecipeUnit,
}

/// Named, ordered group of recipe items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipePhase {
    pub name: String,
    #[serde(default)]
    pub items: Vec<RecipeItem>,
}

impl RecipePhase {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub phases: Vec<RecipePhase>,
}

impl Recipe {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            image_url: image_url.into(),
            phases: Vec::new(),
        }
    }

    /// Append an ingredient line to the named phase, creating the phase when
    /// it does not exist yet. The item gets the next ordinal of the recipe.
    pub fn add_ingredient(
        &mut self,
        ingredient: Ingredient,
        amount: Decimal,
        unit: RecipeUnit,
        phase_name: Option<&str>,
    ) -> &mut Self {
        self.renumber();
        let ordinal = self.item_count() as u32 + 1;
        let phase = self.get_or_add_phase(phase_name.unwrap_or(UNNAMED_PHASE));
        phase.items.push(RecipeItem {
            ordinal,
            ingredient,
            amount,
            unit,
        });
        self
    }

    /// Remove every phase and item
    pub fn clear_items(&mut self) {
        self.phases.clear();
    }

    /// Remove the item with the given ordinal and renumber the rest.
    ///
    /// The phase that held the item is kept even when it becomes empty.
    pub fn remove_item(&mut self, ordinal: u32) -> Option<RecipeItem> {
        let removed = self.phases.iter_mut().find_map(|phase| {
            phase
                .items
                .iter()
                .position(|it| it.ordinal == ordinal)
                .map(|index| phase.items.remove(index))
        })?;

        self.renumber();
        Some(removed)
    }

    /// All items across phases, ordered by ordinal
    pub fn items(&self) -> Vec<&RecipeItem> {
        let mut items: Vec<&RecipeItem> = self.phases.iter().flat_map(|p| p.items.iter()).collect();
        items.sort_by_key(|it| it.ordinal);
        items
    }

    pub fn item_count(&self) -> usize {
        self.phases.iter().map(|p| p.items.len()).sum()
    }

    pub fn phase(&self, name: &str) -> Option<&RecipePhase> {
        self.phases.iter().find(|p| p.name == name)
    }

    /// True when the recipe groups its items into named phases
    pub fn uses_phases(&self) -> bool {
        self.phases.iter().any(|p| p.name != UNNAMED_PHASE)
    }

    /// A phase may be deleted once no item references it
    pub fn is_phase_deletable(&self, name: &str) -> bool {
        self.phase(name).map(|p| p.items.is_empty()).unwrap_or(false)
    }

    /// Delete an empty phase
    pub fn remove_phase(&mut self, name: &str) -> Result<()> {
        let index = self
            .phases
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| Error::not_found(format!("phase '{}'", name)))?;

        if !self.phases[index].items.is_empty() {
            return Err(Error::validation(format!(
                "phase '{}' still has {} item(s)",
                name,
                self.phases[index].items.len()
            )));
        }

        self.phases.remove(index);
        Ok(())
    }

    /// Validate recipe data
    pub fn validate(&self) -> std::result::Result<(), &'static str> {
        if self.name.trim().is_empty() {
            return Err("recipe name cannot be empty");
        }
        if self.items().iter().any(|it| it.amount <= Decimal::ZERO) {
            return Err("item amounts must be positive");
        }
        Ok(())
    }

    fn get_or_add_phase(&mut self, name: &str) -> &mut RecipePhase {
        match self.phases.iter().position(|p| p.name == name) {
            Some(index) => &mut self.phases[index],
            None => {
                self.phases.push(RecipePhase::new(name));
                let last = self.phases.len() - 1;
                &mut self.phases[last]
            }
        }
    }

    /// Reassign ordinals `1..N`, keeping the existing relative order.
    ///
    /// Items sharing an ordinal keep their phase order.
    fn renumber(&mut self) {
        let mut positions: Vec<(u32, usize, usize)> = self
            .phases
            .iter()
            .enumerate()
            .flat_map(|(p, phase)| phase.items.iter().enumerate().map(move |(i, it)| (it.ordinal, p, i)))
            .collect();
        positions.sort_by_key(|&(ordinal, _, _)| ordinal);

        for (rank, (_, p, i)) in positions.into_iter().enumerate() {
            self.phases[p].items[i].ordinal = rank as u32 + 1;
        }
    }
}

/// One ingredient line of an add/update recipe request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeIngredientPayload {
    pub ingredient_name: String,
    pub amount: Decimal,
    pub unit: RecipeUnit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
}

impl RecipeIngredientPayload {
    pub fn new(
        ingredient_name: impl Into<String>,
        amount: Decimal,
        unit: RecipeUnit,
        phase: Option<&str>,
    ) -> Self {
        Self {
            ingredient_name: ingredient_name.into(),
            amount,
            unit,
            phase: phase.map(str::to_string),
        }
    }
}

/// Data needed to create or replace a recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipePayload {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub ingredient_items: Vec<RecipeIngredientPayload>,
}

impl RecipePayload {
    /// Distinct ingredient names in first-use order
    pub fn ingredient_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for item in &self.ingredient_items {
            if !names.contains(&item.ingredient_name) {
                names.push(item.ingredient_name.clone());
            }
        }
        names
    }

    /// Build a recipe from this payload. Every ingredient name must be
    /// present in `ingredients`.
    pub fn to_recipe(&self, id: impl Into<String>, ingredients: &[Ingredient]) -> Result<Recipe> {
        let mut recipe = Recipe::new(id, &self.name, &self.description, &self.image_url);

        for item in &self.ingredient_items {
            let ingredient = ingredients
                .iter()
                .find(|i| i.name == item.ingredient_name)
                .cloned()
                .ok_or_else(|| Error::not_found(format!("ingredient '{}'", item.ingredient_name)))?;

            recipe.add_ingredient(ingredient, item.amount, item.unit, item.phase.as_deref());
        }

        Ok(recipe)
    }
}
