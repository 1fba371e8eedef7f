//! Status command - show session and shopping list summary

use anyhow::Result;
use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use recipe_book_core::RecipeBookContext;
use serde_json::json;

use super::get_context;

pub async fn run(json: bool) -> Result<()> {
    let ctx = get_context().await?;
    print_status(&ctx, json)
}

pub fn print_status(ctx: &RecipeBookContext, json: bool) -> Result<()> {
    let state = ctx.store.state();
    let backend = if ctx.config.enable_backend_mock {
        "mock".to_string()
    } else {
        ctx.config.backend_server_base_url.clone()
    };

    if json {
        let status = json!({
            "dataDir": ctx.data_dir,
            "backend": backend,
            "authenticated": state.auth.is_authenticated(),
            "user": state.auth.user,
            "tokenExpiresAt": state.auth.token_expires_at(),
            "shoppingListItems": state.shopping_list.count(),
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("{}", "Recipe Book Status".bold());
    println!();

    let user = match &state.auth.user {
        Some(user) => user.username.clone(),
        None => "not logged in".to_string(),
    };
    let expires = state
        .auth
        .token_expires_at()
        .map(|at| at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string());

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.add_row(vec!["User", &user]);
    table.add_row(vec!["Session expires", &expires]);
    table.add_row(vec!["Shopping list items", &state.shopping_list.count().to_string()]);
    table.add_row(vec!["Backend", &backend]);
    table.add_row(vec!["Data directory", &ctx.data_dir.display().to_string()]);

    println!("{}", table);
    Ok(())
}
