//! Recipe commands

use anyhow::{bail, Result};
use clap::Subcommand;
use colored::Colorize;
use dialoguer::Confirm;
use recipe_book_core::domain::recipe::UNNAMED_PHASE;
use recipe_book_core::services::routes;
use recipe_book_core::{Recipe, RecipeAction, RecipeBookContext, RecipePayload};

use super::{fetch_recipes, find_recipe, get_context, parse_item_line, recipes_result, require_login};
use crate::output;

#[derive(Subcommand)]
pub enum RecipesCommands {
    /// List all recipes
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one recipe with its ingredients
    Show {
        /// Recipe id, id prefix or name
        recipe: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a recipe
    Add {
        /// Recipe name
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        image_url: String,
        /// Ingredient line NAME:AMOUNT[:UNIT[:PHASE]] (repeatable)
        #[arg(long = "item", required = true)]
        items: Vec<String>,
    },

    /// Delete a recipe
    Delete {
        /// Recipe id, id prefix or name
        recipe: String,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

pub async fn run(command: RecipesCommands) -> Result<()> {
    let mut ctx = get_context().await?;
    require_login(&ctx, routes::RECIPES)?;
    fetch_recipes(&mut ctx).await?;

    match command {
        RecipesCommands::List { json } => print_recipes(&ctx, json),
        RecipesCommands::Show { recipe, json } => print_recipe(&ctx, &recipe, json),
        RecipesCommands::Add {
            name,
            description,
            image_url,
            items,
        } => {
            let ingredient_items = items.iter().map(|s| parse_item_line(s)).collect::<Result<Vec<_>>>()?;
            let payload = RecipePayload {
                name,
                description,
                image_url,
                ingredient_items,
            };
            add_recipe(&mut ctx, payload).await
        }
        RecipesCommands::Delete { recipe, force } => delete_recipe(&mut ctx, &recipe, force).await,
    }
}

pub fn print_recipes(ctx: &RecipeBookContext, json: bool) -> Result<()> {
    let recipes = &ctx.store.state().recipes.items;

    if json {
        println!("{}", serde_json::to_string_pretty(recipes)?);
        return Ok(());
    }

    if recipes.is_empty() {
        println!("{}", "No recipes yet".dimmed());
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["ID", "Name", "Ingredients", "Description"]);
    for recipe in recipes {
        table.add_row(vec![
            output::short_id(&recipe.id).to_string(),
            recipe.name.clone(),
            recipe.item_count().to_string(),
            recipe.description.clone(),
        ]);
    }
    println!("{}", table);
    Ok(())
}

pub fn print_recipe(ctx: &RecipeBookContext, key: &str, json: bool) -> Result<()> {
    let recipe = find_recipe(ctx, key)?;

    if json {
        println!("{}", serde_json::to_string_pretty(recipe)?);
        return Ok(());
    }

    println!("{}", recipe.name.bold());
    if !recipe.description.is_empty() {
        println!("{}", recipe.description);
    }
    if !recipe.image_url.is_empty() {
        println!("{}", recipe.image_url.dimmed());
    }
    println!("{}", format!("id: {}", recipe.id).dimmed());
    println!();

    for phase in recipe.phases.iter().filter(|p| !p.items.is_empty()) {
        if phase.name != UNNAMED_PHASE {
            println!("{}", phase.name.cyan());
        }
        let mut table = output::create_table();
        table.set_header(vec!["#", "Ingredient", "Amount", "Unit"]);
        for item in &phase.items {
            table.add_row(vec![
                item.ordinal.to_string(),
                item.ingredient.name.clone(),
                output::format_amount(item.amount),
                item.unit.to_string(),
            ]);
        }
        println!("{}", table);
    }
    Ok(())
}

async fn add_recipe(ctx: &mut RecipeBookContext, payload: RecipePayload) -> Result<()> {
    ctx.store.dispatch(RecipeAction::AddRecipeRequest { payload }).await;
    recipes_result(ctx)?;

    let Some(recipe) = ctx.store.state().recipes.items.last().cloned() else {
        bail!("Recipe was not added");
    };
    store_recipes(ctx).await?;

    println!(
        "{} Added recipe '{}' ({} ingredient(s))",
        "✓".green(),
        recipe.name,
        recipe.item_count()
    );
    println!("{}", format!("id: {}", recipe.id).dimmed());
    Ok(())
}

async fn delete_recipe(ctx: &mut RecipeBookContext, key: &str, force: bool) -> Result<()> {
    let recipe: Recipe = find_recipe(ctx, key)?.clone();

    if !force {
        println!("\n{}", format!("This will delete the recipe '{}'.", recipe.name).yellow());
        if !Confirm::new()
            .with_prompt("Are you sure?")
            .default(false)
            .interact()?
        {
            println!("{}\n", "Cancelled".dimmed());
            return Ok(());
        }
    }

    ctx.store
        .dispatch(RecipeAction::DeleteRecipe { id: recipe.id.clone() })
        .await;
    store_recipes(ctx).await?;

    println!("{} Recipe '{}' deleted", "✓".green(), recipe.name);
    Ok(())
}

/// Push the local collection to the backend
async fn store_recipes(ctx: &mut RecipeBookContext) -> Result<()> {
    ctx.store.dispatch(RecipeAction::StoreRecipesRequest).await;
    recipes_result(ctx)
}
