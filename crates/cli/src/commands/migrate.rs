//! Database migration command.
//!
//! Migrations live in `crates/web/migrations/` and are embedded in the
//! `washboard-web` library.
//!
//! ```text
//! migrations/
//! ├── 20261019000001_create_washboard_schema.sql
//! └── 20261019000002_create_sessions.sql
//! ```

use super::{CommandError, connect};

/// Run all pending migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running migrations...");
    washboard_web::db::run_migrations(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
