//! Persistence layer for the capstone workflow service.
//!
//! Models live in [`models`], one zero-sized repository struct per table in
//! [`repositories`]. Functions suffixed `_tx` run inside a caller-owned
//! transaction so the lifecycle engine can compose them atomically.

use sqlx::postgres::PgPoolOptions;

pub mod models;
pub mod repositories;

pub type DbPool = sqlx::PgPool;

/// A PostgreSQL transaction borrowed from the pool.
pub type DbTx<'a> = sqlx::Transaction<'a, sqlx::Postgres>;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply the embedded migrations in `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    tracing::info!("Running database migrations");
    sqlx::migrate!("../../db/migrations").run(pool).await
}
