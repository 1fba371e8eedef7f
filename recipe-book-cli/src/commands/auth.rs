//! Login, signup and logout commands

use anyhow::{bail, Result};
use colored::Colorize;
use dialoguer::{Input, Password};
use recipe_book_core::{AuthAction, RecipeBookContext};

use super::get_context;

pub async fn login(username: Option<String>, password: Option<String>) -> Result<()> {
    let mut ctx = get_context().await?;
    let (username, password) = credentials(username, password, false)?;
    authenticate(&mut ctx, username, password, false).await
}

pub async fn signup(username: Option<String>, password: Option<String>) -> Result<()> {
    let mut ctx = get_context().await?;
    let (username, password) = credentials(username, password, true)?;
    authenticate(&mut ctx, username, password, true).await
}

pub async fn logout() -> Result<()> {
    let mut ctx = get_context().await?;
    if !ctx.store.state().auth.is_authenticated() {
        println!("{}", "Not logged in".dimmed());
        return Ok(());
    }
    end_session(&mut ctx).await;
    Ok(())
}

/// Prompt for whatever was not given on the command line
fn credentials(username: Option<String>, password: Option<String>, confirm: bool) -> Result<(String, String)> {
    let username = match username {
        Some(u) => u,
        None => Input::new().with_prompt("Username").interact_text()?,
    };

    let password = match password {
        Some(p) => p,
        None => {
            let prompt = Password::new().with_prompt("Password");
            if confirm {
                prompt
                    .with_confirmation("Confirm password", "Passwords do not match")
                    .interact()?
            } else {
                prompt.interact()?
            }
        }
    };

    Ok((username, password))
}

/// Log in (or sign up) on an open context
pub async fn authenticate(ctx: &mut RecipeBookContext, username: String, password: String, signup: bool) -> Result<()> {
    let action = if signup {
        AuthAction::SignupRequest { username, password }
    } else {
        AuthAction::LoginRequest { username, password }
    };
    ctx.store.dispatch(action).await;

    let auth = &ctx.store.state().auth;
    if let Some(error) = auth.error() {
        bail!("{}", error);
    }

    if let Some(user) = &auth.user {
        println!("{} Logged in as {}", "✓".green(), user.username.bold());
    }
    if let Some(expires_at) = auth.token_expires_at() {
        println!(
            "{}",
            format!(
                "Session expires at {}",
                expires_at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M")
            )
            .dimmed()
        );
    }
    Ok(())
}

pub async fn end_session(ctx: &mut RecipeBookContext) {
    ctx.store
        .dispatch(AuthAction::Logout {
            set_initialized: true,
            return_url: None,
        })
        .await;
    println!("{} Logged out", "✓".green());
}
