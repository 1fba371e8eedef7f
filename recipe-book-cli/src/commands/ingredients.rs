//! Ingredients command - list every ingredient the backend knows

use anyhow::{Context, Result};
use colored::Colorize;
use recipe_book_core::services::routes;
use recipe_book_core::RecipeBookContext;

use super::{get_context, require_login};
use crate::output;

pub async fn run(json: bool) -> Result<()> {
    let mut ctx = get_context().await?;
    print_ingredients(&mut ctx, json).await
}

pub async fn print_ingredients(ctx: &mut RecipeBookContext, json: bool) -> Result<()> {
    require_login(ctx, routes::RECIPES)?;

    ctx.store
        .preload_ingredients()
        .await
        .context("Failed to load ingredients")?;
    let ingredients = ctx.store.ingredients().ingredients();

    if json {
        println!("{}", serde_json::to_string_pretty(&ingredients)?);
        return Ok(());
    }

    if ingredients.is_empty() {
        println!("{}", "No ingredients yet".dimmed());
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["ID", "Name"]);
    for ingredient in &ingredients {
        table.add_row(vec![ingredient.id.to_string(), ingredient.name.clone()]);
    }
    println!("{}", table);
    Ok(())
}
