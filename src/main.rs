//! # Servyre IT Main Entry Point
//!
//! Runs the HTTP API by default; `migrate` and `seed` prepare a database
//! without starting the server.

use anyhow::Context;
use clap::{Parser, Subcommand};
use servyre_it::{
    config::ConfigLoader,
    db,
    migration::{Migrator, MigratorTrait},
    seeds,
    server::run_server,
};

#[derive(Debug, Parser)]
#[command(name = "servyre-it", version, about = "Servyre IT ticketing API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Start the HTTP server
    Serve,
    /// Apply pending database migrations
    Migrate,
    /// Insert the default statuses, priorities and departments
    Seed,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration from layered env files and variables
    let config = ConfigLoader::new()
        .load()
        .context("Failed to load configuration")?;

    println!("Loaded configuration for profile: {}", config.profile);
    if let Ok(redacted_json) = config.redacted_json() {
        println!("Configuration: {}", redacted_json);
    }

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => run_server(config).await,
        Command::Migrate => {
            let db = db::init_pool(&config).await?;
            Migrator::up(&db, None)
                .await
                .context("Failed to apply database migrations")?;
            println!("Migrations applied");
            Ok(())
        }
        Command::Seed => {
            let db = db::init_pool(&config).await?;
            seeds::seed_defaults(&db)
                .await
                .context("Failed to seed default taxonomy")?;
            println!("Default taxonomy seeded");
            Ok(())
        }
    }
}
