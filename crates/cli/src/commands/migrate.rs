//! Database migration commands.
//!
//! # Usage
//!
//! ```bash
//! # Run favorites schema and session store migrations
//! fairweather-cli migrate
//!
//! # Only create the session store table
//! fairweather-cli migrate --sessions-only
//! ```
//!
//! # Environment Variables
//!
//! - `FAIRWEATHER_DATABASE_URL` - `PostgreSQL` connection string
//!   (falls back to `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Favorites schema: `crates/server/migrations/`, embedded at build time.
//! The session table is created by `tower-sessions-sqlx-store`.

use fairweather_server::{MIGRATOR, config::get_database_url, db};
use tower_sessions_sqlx_store::PostgresStore;

/// Errors from migration commands.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run database migrations.
///
/// # Errors
///
/// Returns error if the database URL is missing, the database is unreachable,
/// or a migration fails.
pub async fn run(sessions_only: bool) -> Result<(), MigrationError> {
    let database_url = get_database_url("FAIRWEATHER_DATABASE_URL")
        .ok_or(MigrationError::MissingEnvVar("FAIRWEATHER_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    if !sessions_only {
        tracing::info!("Running favorites migrations...");
        MIGRATOR.run(&pool).await?;
    }

    tracing::info!("Running session store migration...");
    PostgresStore::new(pool).migrate().await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
