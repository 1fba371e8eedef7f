//! Recipe Book CLI - recipes and shopping lists in your terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{auth, ingredients, recipes, shell, shopping, status};

/// Recipe Book - recipes and shopping lists in your terminal
#[derive(Parser)]
#[command(name = "rb", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in with an existing account
    Login {
        /// Username (prompted when omitted)
        #[arg(short, long)]
        username: Option<String>,
        /// Password (prompted when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Create an account and log in
    Signup {
        /// Username (prompted when omitted)
        #[arg(short, long)]
        username: Option<String>,
        /// Password (prompted when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// End the current session
    Logout,

    /// Show session and shopping list status
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage recipes
    Recipes {
        #[command(subcommand)]
        command: recipes::RecipesCommands,
    },

    /// List known ingredients
    Ingredients {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage the shopping list
    Shopping {
        #[command(subcommand)]
        command: shopping::ShoppingCommands,
    },

    /// Interactive shell keeping one session open
    Shell,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr, filtered by `RUST_LOG` (default `warn`)
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Login { username, password } => auth::login(username, password).await,
        Commands::Signup { username, password } => auth::signup(username, password).await,
        Commands::Logout => auth::logout().await,
        Commands::Status { json } => status::run(json).await,
        Commands::Recipes { command } => recipes::run(command).await,
        Commands::Ingredients { json } => ingredients::run(json).await,
        Commands::Shopping { command } => shopping::run(command).await,
        Commands::Shell => shell::run().await,
    }
}
