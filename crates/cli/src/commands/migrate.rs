//! Database migration command.
//!
//! Runs the storefront schema migrations and creates the tower-sessions
//! table. Neither the storefront binary nor the seed command runs
//! migrations implicitly; this command is the only place they happen.

use tower_sessions_sqlx_store::PostgresStore;

use super::CommandError;

/// Run all storefront migrations.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or a migration
/// fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = super::connect().await?;

    tracing::info!("Running storefront migrations...");
    sqlx::migrate!("../storefront/migrations").run(&pool).await?;

    tracing::info!("Creating session store table...");
    PostgresStore::new(pool.clone()).migrate().await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
