//! Database migration runner for the top-up ledger.
//!
//! Usage:
//!   migrator [up]    - Run all pending migrations
//!   migrator down    - Rollback last migration
//!   migrator status  - Show migration status
//!   migrator fresh   - Drop all tables and re-run migrations
//!
//! Connects with the server's `[database]` configuration. `DATABASE_URL`
//! overrides the configured URL.

use anyhow::{Context, bail};
use sea_orm_migration::MigratorTrait;
use topup_db::{connect_with, migration::Migrator};
use topup_shared::config::DatabaseConfig;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sqlx=warn".into()),
        )
        .init();

    let mut database = DatabaseConfig::load().context("Failed to load database configuration")?;
    if let Ok(url) = std::env::var("DATABASE_URL") {
        database.url = url;
    }
    let command = std::env::args().nth(1).unwrap_or_else(|| "up".to_string());

    let db = connect_with(&database)
        .await
        .context("Failed to connect to database")?;

    match command.as_str() {
        "up" => Migrator::up(&db, None).await?,
        "down" => Migrator::down(&db, Some(1)).await?,
        "status" => Migrator::status(&db).await?,
        "fresh" => Migrator::fresh(&db).await?,
        other => bail!("Unknown command '{other}', expected up, down, status or fresh"),
    }

    info!(command = %command, "Migration command finished");
    Ok(())
}
