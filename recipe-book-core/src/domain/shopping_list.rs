//! Shopping list domain model
//!
//! A shopping list holds at most one row per (ingredient, unit) pair. Adding
//! the same pair again sums the amounts instead of appending a new row, so a
//! list built from several recipes stays compact.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::result::{Error, Result};
use super::{Ingredient, Recipe, RecipeUnit};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingListItem {
    pub ordinal: u32,
    pub ingredient: Ingredient,
    pub amount: Decimal,
    pub unit: RecipeUnit,
}

impl ShoppingListItem {
    fn same_key(&self, ingredient: &Ingredient, unit: RecipeUnit) -> bool {
        self.ingredient.name == ingredient.name && self.unit == unit
    }

    fn add_amount(&mut self, amount: Decimal) -> Result<()> {
        self.amount = self.amount.checked_add(amount).ok_or_else(|| {
            Error::validation(format!(
                "amount of '{}' ({}) is too large",
                self.ingredient.name, self.unit
            ))
        })?;
        Ok(())
    }
}

/// Requested shopping list line, before its ingredient is resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingListItemRequest {
    pub ingredient_name: String,
    pub amount: Decimal,
    pub unit: RecipeUnit,
}

impl ShoppingListItemRequest {
    pub fn new(ingredient_name: impl Into<String>, amount: Decimal, unit: RecipeUnit) -> Self {
        Self {
            ingredient_name: ingredient_name.into(),
            amount,
            unit,
        }
    }

    /// One request per line of a recipe
    pub fn from_recipe(recipe: &Recipe) -> Vec<Self> {
        recipe
            .items()
            .into_iter()
            .map(|it| Self::new(it.ingredient.name.clone(), it.amount, it.unit))
            .collect()
    }
}

/// Shopping list line with a resolved ingredient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedItem {
    pub ingredient: Ingredient,
    pub amount: Decimal,
    pub unit: RecipeUnit,
}

impl ResolvedItem {
    pub fn new(ingredient: Ingredient, amount: Decimal, unit: RecipeUnit) -> Self {
        Self {
            ingredient,
            amount,
            unit,
        }
    }
}

/// Merge new lines into an existing list.
///
/// Lines matching an existing (ingredient, unit) row add to its amount;
/// other lines are appended with the next ordinal. Fails when a sum does not
/// fit in a `Decimal`.
pub fn merge_items(existing: &[ShoppingListItem], new_items: &[ResolvedItem]) -> Result<Vec<ShoppingListItem>> {
    let mut merged = existing.to_vec();

    for new_item in new_items {
        match merged
            .iter_mut()
            .find(|it| it.same_key(&new_item.ingredient, new_item.unit))
        {
            Some(row) => row.add_amount(new_item.amount)?,
            None => {
                let ordinal = merged.len() as u32 + 1;
                merged.push(ShoppingListItem {
                    ordinal,
                    ingredient: new_item.ingredient.clone(),
                    amount: new_item.amount,
                    unit: new_item.unit,
                });
            }
        }
    }

    Ok(merged)
}

/// Replace the row at `ordinal`.
///
/// When the replacement collides with another row's (ingredient, unit) it is
/// folded into that row and the list is renumbered. Returns the list and the
/// ordinal the updated line ends up at.
pub fn update_item(
    existing: &[ShoppingListItem],
    ordinal: u32,
    replacement: &ResolvedItem,
) -> Result<(Vec<ShoppingListItem>, Option<u32>)> {
    if !existing.iter().any(|it| it.ordinal == ordinal) {
        return Ok((existing.to_vec(), None));
    }

    let collision = existing
        .iter()
        .find(|it| it.ordinal != ordinal && it.same_key(&replacement.ingredient, replacement.unit))
        .map(|it| it.ingredient.name.clone());

    match collision {
        Some(name) => {
            let folded = existing
                .iter()
                .filter(|it| it.ordinal != ordinal)
                .map(|it| {
                    let mut it = it.clone();
                    if it.same_key(&replacement.ingredient, replacement.unit) {
                        it.add_amount(replacement.amount)?;
                    }
                    Ok(it)
                })
                .collect::<Result<Vec<_>>>()?;
            let items = renumber(folded);
            let new_ordinal = items
                .iter()
                .find(|it| it.ingredient.name == name && it.unit == replacement.unit)
                .map(|it| it.ordinal);
            Ok((items, new_ordinal))
        }
        None => {
            let items = existing
                .iter()
                .map(|it| {
                    if it.ordinal == ordinal {
                        ShoppingListItem {
                            ordinal,
                            ingredient: replacement.ingredient.clone(),
                            amount: replacement.amount,
                            unit: replacement.unit,
                        }
                    } else {
                        it.clone()
                    }
                })
                .collect();
            Ok((items, Some(ordinal)))
        }
    }
}

/// Remove the row at `ordinal` and renumber the remaining rows `1..N`
pub fn remove_item(existing: &[ShoppingListItem], ordinal: u32) -> Vec<ShoppingListItem> {
    renumber(
        existing
            .iter()
            .filter(|it| it.ordinal != ordinal)
            .cloned()
            .collect(),
    )
}

fn renumber(mut items: Vec<ShoppingListItem>) -> Vec<ShoppingListItem> {
    for (index, item) in items.iter_mut().enumerate() {
        item.ordinal = index as u32 + 1;
    }
    items
}
