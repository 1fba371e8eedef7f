//! CLI command implementations

pub mod auth;
pub mod ingredients;
pub mod recipes;
pub mod shell;
pub mod shopping;
pub mod status;

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use recipe_book_core::domain::RecipeIngredientPayload;
use recipe_book_core::ports::Navigator;
use recipe_book_core::services::{can_activate, GuardDecision};
use recipe_book_core::{Recipe, RecipeAction, RecipeBookContext, RecipeUnit};
use rust_decimal::Decimal;

/// Get the data directory from environment or default
pub fn get_data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("RECIPE_BOOK_DIR") {
        return Ok(PathBuf::from(dir));
    }
    Ok(dirs::home_dir()
        .context("Could not find home directory")?
        .join(".recipe-book"))
}

/// Open the context and restore the stored session and shopping list
pub async fn get_context() -> Result<RecipeBookContext> {
    let data_dir = get_data_dir()?;

    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory: {:?}", data_dir))?;
    tracing::debug!("Using data directory {:?}", data_dir);

    let mut ctx = RecipeBookContext::new(&data_dir).context("Failed to initialize recipe book context")?;
    ctx.initialize().await;
    Ok(ctx)
}

/// Enter `view`, or fail when it needs a session the user doesn't have
pub fn require_login(ctx: &RecipeBookContext, view: &str) -> Result<()> {
    match can_activate(&ctx.store.state().auth, view) {
        GuardDecision::Allow => {
            ctx.navigator.visit(view);
            Ok(())
        }
        GuardDecision::Wait => bail!("Session is still being restored"),
        GuardDecision::RedirectToLogin { return_url } => {
            ctx.navigator.to_login(Some(&return_url));
            bail!("Not logged in. Run `rb login` first.")
        }
    }
}

/// Load the recipe collection from the backend
pub async fn fetch_recipes(ctx: &mut RecipeBookContext) -> Result<()> {
    ctx.store.dispatch(RecipeAction::FetchRecipesRequest).await;
    recipes_result(ctx)
}

/// Fail with the recipe slice error left by the last dispatch
pub fn recipes_result(ctx: &RecipeBookContext) -> Result<()> {
    match &ctx.store.state().recipes.error {
        Some(error) => bail!("{}", error),
        None => Ok(()),
    }
}

/// Fail with the shopping list error left by the last dispatch
pub fn shopping_result(ctx: &RecipeBookContext) -> Result<()> {
    match &ctx.store.state().shopping_list.error {
        Some(error) => bail!("{}", error),
        None => Ok(()),
    }
}

/// Find a loaded recipe by id, id prefix or name (case-insensitive)
pub fn find_recipe<'a>(ctx: &'a RecipeBookContext, key: &str) -> Result<&'a Recipe> {
    let recipes = &ctx.store.state().recipes.items;
    let key_lower = key.trim().to_lowercase();

    if let Some(recipe) = recipes
        .iter()
        .find(|r| r.id == key || r.name.to_lowercase() == key_lower)
    {
        return Ok(recipe);
    }

    let matches: Vec<&Recipe> = recipes.iter().filter(|r| r.id.starts_with(key.trim())).collect();
    match matches.as_slice() {
        [recipe] => Ok(*recipe),
        [] => bail!("Recipe '{}' not found", key),
        _ => bail!("Recipe id '{}' is ambiguous", key),
    }
}

pub fn parse_amount(s: &str) -> Result<Decimal> {
    let amount = Decimal::from_str(s.trim()).with_context(|| format!("Invalid amount '{}'", s))?;
    if amount <= Decimal::ZERO {
        bail!("Amount must be positive, got {}", s);
    }
    Ok(amount)
}

pub fn parse_unit(s: Option<&str>) -> Result<RecipeUnit> {
    match s {
        Some(s) => Ok(RecipeUnit::from_str(s)?),
        None => Ok(RecipeUnit::Pcs),
    }
}

/// Parse a recipe line `NAME:AMOUNT[:UNIT[:PHASE]]`
pub fn parse_item_line(line: &str) -> Result<RecipeIngredientPayload> {
    let parts: Vec<&str> = line.split(':').map(str::trim).collect();
    let (name, amount, unit, phase) = match parts.as_slice() {
        [name, amount] => (*name, *amount, None, None),
        [name, amount, unit] => (*name, *amount, Some(*unit), None),
        [name, amount, unit, phase] => (*name, *amount, Some(*unit), Some(*phase)),
        _ => bail!("Invalid item '{}', expected NAME:AMOUNT[:UNIT[:PHASE]]", line),
    };

    if name.is_empty() {
        bail!("Invalid item '{}': ingredient name is empty", line);
    }

    Ok(RecipeIngredientPayload::new(
        name,
        parse_amount(amount)?,
        parse_unit(unit.filter(|u| !u.is_empty()))?,
        phase.filter(|p| !p.is_empty()),
    ))
}
