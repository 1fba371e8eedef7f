//! Shopping list commands

use anyhow::{bail, Result};
use clap::Subcommand;
use colored::Colorize;
use recipe_book_core::services::routes;
use recipe_book_core::domain::ShoppingListItem;
use recipe_book_core::{RecipeBookContext, RecipeUnit, ShoppingListAction, ShoppingListItemRequest};

use super::{fetch_recipes, find_recipe, get_context, parse_amount, parse_unit, require_login, shopping_result};
use crate::output;

#[derive(Subcommand)]
pub enum ShoppingCommands {
    /// Show the shopping list
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add an ingredient; adding one already on the list sums the amounts
    Add {
        /// Ingredient name
        ingredient: String,
        amount: String,
        /// Unit (pcs, g, kg, cup, tsp, tbsp, l, dl, ml)
        unit: Option<String>,
    },

    /// Add every ingredient of a recipe
    AddRecipe {
        /// Recipe id, id prefix or name
        recipe: String,
    },

    /// Remove a line by its number
    Remove { ordinal: u32 },

    /// Remove every line
    Clear,
}

pub async fn run(command: ShoppingCommands) -> Result<()> {
    let mut ctx = get_context().await?;

    match command {
        ShoppingCommands::List { json } => print_list(&ctx, json),
        ShoppingCommands::Add { ingredient, amount, unit } => {
            add_item(&mut ctx, &ingredient, &amount, unit.as_deref()).await
        }
        ShoppingCommands::AddRecipe { recipe } => add_recipe(&mut ctx, &recipe).await,
        ShoppingCommands::Remove { ordinal } => remove_item(&mut ctx, ordinal).await,
        ShoppingCommands::Clear => clear(&mut ctx).await,
    }
}

pub fn print_list(ctx: &RecipeBookContext, json: bool) -> Result<()> {
    let items = &ctx.store.state().shopping_list.items;

    if json {
        println!("{}", serde_json::to_string_pretty(items)?);
        return Ok(());
    }

    if items.is_empty() {
        println!("{}", "Shopping list is empty".dimmed());
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["#", "Ingredient", "Amount", "Unit"]);
    for item in items {
        table.add_row(vec![
            item.ordinal.to_string(),
            item.ingredient.name.clone(),
            output::format_amount(item.amount),
            item.unit.to_string(),
        ]);
    }
    println!("{}", table);
    Ok(())
}

pub async fn add_item(ctx: &mut RecipeBookContext, ingredient: &str, amount: &str, unit: Option<&str>) -> Result<()> {
    require_login(ctx, routes::SHOPPING_LIST)?;
    let name = ingredient.trim();
    if name.is_empty() {
        bail!("Ingredient name must not be empty");
    }
    let unit = parse_unit(unit)?;
    let item = ShoppingListItemRequest::new(name, parse_amount(amount)?, unit);

    ctx.store.dispatch(ShoppingListAction::AddItemRequest { item }).await;
    shopping_result(ctx)?;

    if let Some(row) = find_row(&ctx.store.state().shopping_list.items, name, unit) {
        println!(
            "{} {} {} {}",
            "✓".green(),
            row.ingredient.name,
            output::format_amount(row.amount),
            row.unit
        );
    }
    Ok(())
}

/// The row an added (name, unit) pair ends up in
fn find_row<'a>(items: &'a [ShoppingListItem], name: &str, unit: RecipeUnit) -> Option<&'a ShoppingListItem> {
    items.iter().find(|it| it.ingredient.name == name && it.unit == unit)
}

pub async fn add_recipe(ctx: &mut RecipeBookContext, key: &str) -> Result<()> {
    require_login(ctx, routes::SHOPPING_LIST)?;
    fetch_recipes(ctx).await?;
    let recipe = find_recipe(ctx, key)?.clone();

    ctx.store
        .dispatch(ShoppingListAction::AddRecipeRequest {
            recipe_id: recipe.id.clone(),
        })
        .await;
    shopping_result(ctx)?;

    println!(
        "{} Added {} ingredient(s) of '{}'",
        "✓".green(),
        recipe.item_count(),
        recipe.name
    );
    Ok(())
}

pub async fn remove_item(ctx: &mut RecipeBookContext, ordinal: u32) -> Result<()> {
    let Some(item) = ctx
        .store
        .state()
        .shopping_list
        .items
        .iter()
        .find(|it| it.ordinal == ordinal)
        .cloned()
    else {
        bail!("No line {} on the shopping list", ordinal);
    };

    ctx.store.dispatch(ShoppingListAction::RemoveItem { ordinal }).await;
    println!("{} Removed {}", "✓".green(), item.ingredient.name);
    Ok(())
}

pub async fn clear(ctx: &mut RecipeBookContext) -> Result<()> {
    if ctx.store.state().shopping_list.items.is_empty() {
        output::info("Shopping list is already empty");
        return Ok(());
    }
    ctx.store.dispatch(ShoppingListAction::ClearItems).await;
    output::success("Shopping list cleared");
    Ok(())
}
