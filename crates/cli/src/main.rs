//! eshop CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations
//! eshop-cli migrate
//!
//! # Create a superuser who can log into the admin panel
//! eshop-cli user create-superuser -u admin -e admin@example.com -p 'long passphrase'
//!
//! # Insert the default size labels
//! eshop-cli seed sizes
//! ```
//!
//! # Environment Variables
//!
//! - `ESHOP_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "eshop-cli")]
#[command(author, version, about = "eshop CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply database migrations
    Migrate,
    /// Manage user accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Insert reference data
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a staff superuser
    CreateSuperuser {
        /// Login name
        #[arg(short, long)]
        username: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password (at least 8 characters)
        #[arg(short, long)]
        password: String,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert the default size labels that are missing
    Sizes,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::User { action } => match action {
            UserAction::CreateSuperuser {
                username,
                email,
                password,
            } => {
                commands::user::create_superuser(&username, &email, &password).await?;
            }
        },
        Commands::Seed { target } => match target {
            SeedTarget::Sizes => commands::seed::sizes().await?,
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_create_superuser() {
        let cli = Cli::try_parse_from([
            "eshop-cli",
            "user",
            "create-superuser",
            "-u",
            "admin",
            "-e",
            "admin@shop.test",
            "-p",
            "correct horse",
        ])
        .unwrap_or_else(|e| panic!("{e}"));

        let Commands::User {
            action:
                UserAction::CreateSuperuser {
                    username,
                    email,
                    password,
                },
        } = cli.command
        else {
            panic!("expected user create-superuser");
        };
        assert_eq!(username, "admin");
        assert_eq!(email, "admin@shop.test");
        assert_eq!(password, "correct horse");
    }

    #[test]
    fn test_parses_seed_sizes() {
        let cli = Cli::try_parse_from(["eshop-cli", "seed", "sizes"]).unwrap_or_else(|e| panic!("{e}"));
        assert!(matches!(
            cli.command,
            Commands::Seed {
                target: SeedTarget::Sizes
            }
        ));
    }
}
