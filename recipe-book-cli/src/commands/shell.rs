//! Interactive shell
//!
//! Keeps one store alive across commands, so the session expiry timer can
//! log the user out while the shell is waiting for input.

use std::io::Write;

use anyhow::{bail, Result};
use colored::Colorize;
use recipe_book_core::services::routes;
use recipe_book_core::{Action, AuthAction, RecipeBookContext};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::{auth, fetch_recipes, get_context, ingredients, recipes, require_login, shopping, status};
use crate::output;

const HELP: &str = "\
Commands:
  status                          session and list summary
  login <username> <password>     log in
  signup <username> <password>    create an account and log in
  logout                          end the session
  recipes                         list recipes
  show <recipe>                   show a recipe
  ingredients                     list known ingredients
  list                            show the shopping list
  add <ingredient> <amount> [unit]
  add-recipe <recipe>             add a recipe's ingredients to the list
  remove <number>                 remove a shopping list line
  clear                           empty the shopping list
  help
  quit";

enum Flow {
    Continue,
    Quit,
}

pub async fn run() -> Result<()> {
    let mut ctx = get_context().await?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    output::info("Recipe Book shell. Type 'help' for commands.");
    prompt()?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match execute(&mut ctx, &line).await {
                    Ok(Flow::Quit) => break,
                    Ok(Flow::Continue) => {}
                    Err(e) => output::error(&format!("{:#}", e)),
                }
                prompt()?;
            }
            processed = ctx.store.next_scheduled() => {
                if processed.iter().any(|a| matches!(a, Action::Auth(AuthAction::Logout { .. }))) {
                    println!();
                    output::warning("Session expired. Log in again to continue.");
                    prompt()?;
                }
            }
        }
    }

    Ok(())
}

fn prompt() -> Result<()> {
    print!("{} ", "rb>".bold());
    std::io::stdout().flush()?;
    Ok(())
}

async fn execute(ctx: &mut RecipeBookContext, line: &str) -> Result<Flow> {
    let args: Vec<&str> = line.split_whitespace().collect();
    let Some((command, rest)) = args.split_first() else {
        return Ok(Flow::Continue);
    };

    match (*command, rest) {
        ("quit" | "exit", _) => return Ok(Flow::Quit),
        ("help", _) => println!("{}", HELP),
        ("status", _) => status::print_status(ctx, false)?,
        ("login", [username, password]) => {
            auth::authenticate(ctx, username.to_string(), password.to_string(), false).await?
        }
        ("signup", [username, password]) => {
            auth::authenticate(ctx, username.to_string(), password.to_string(), true).await?
        }
        ("logout", []) => {
            if !ctx.store.state().auth.is_authenticated() {
                bail!("Not logged in");
            }
            auth::end_session(ctx).await;
        }
        ("recipes", []) => {
            require_login(ctx, routes::RECIPES)?;
            fetch_recipes(ctx).await?;
            recipes::print_recipes(ctx, false)?;
        }
        ("show", [_, ..]) => {
            require_login(ctx, routes::RECIPES)?;
            if ctx.store.state().recipes.items.is_empty() {
                fetch_recipes(ctx).await?;
            }
            recipes::print_recipe(ctx, &rest.join(" "), false)?;
        }
        ("ingredients", []) => ingredients::print_ingredients(ctx, false).await?,
        ("list", []) => shopping::print_list(ctx, false)?,
        ("add", [ingredient, amount]) => shopping::add_item(ctx, ingredient, amount, None).await?,
        ("add", [ingredient, amount, unit]) => shopping::add_item(ctx, ingredient, amount, Some(*unit)).await?,
        ("add-recipe", [_, ..]) => shopping::add_recipe(ctx, &rest.join(" ")).await?,
        ("remove", [ordinal]) => match ordinal.parse::<u32>() {
            Ok(ordinal) => shopping::remove_item(ctx, ordinal).await?,
            Err(_) => bail!("'{}' is not a line number", ordinal),
        },
        ("clear", []) => shopping::clear(ctx).await?,
        _ => bail!("Unknown command '{}'. Type 'help' for commands.", line.trim()),
    }

    Ok(Flow::Continue)
}
