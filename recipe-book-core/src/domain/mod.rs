//! Core domain entities
//!
//! All business entities are defined here. These are pure data structures
//! with validation logic - no I/O or external dependencies.

mod ingredient;
pub mod recipe;
pub mod result;
pub mod shopping_list;
mod token;
mod unit;
mod user;

pub use ingredient::{Ingredient, IngredientNamesRequest};
pub use recipe::{Recipe, RecipeIngredientPayload, RecipeItem, RecipePayload, RecipePhase};
pub use shopping_list::{ResolvedItem, ShoppingListItem, ShoppingListItemRequest};
pub use token::AccessToken;
pub use unit::RecipeUnit;
pub use user::{AuthRequest, AuthResponse, User};
