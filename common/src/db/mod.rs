//! PostgreSQL connection helpers

use sqlx::{postgres::PgPoolOptions, PgPool, Pool, Postgres};
use tracing::info;

use crate::config::StoreConfig;
use crate::error::{Error, Result};

/// Database pool type
pub type DbPool = Pool<Postgres>;

/// Embedded schema migrations (`migrations/` at the workspace root)
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../migrations");

/// Connect to the database named by the store configuration
pub async fn connect(config: &StoreConfig) -> Result<DbPool> {
    let url = config
        .postgres_url()?
        .ok_or_else(|| Error::ConfigurationError("Store backend is not PostgreSQL".to_string()))?;

    info!("Connecting to PostgreSQL database with pool size: {}", config.db_pool_size);

    let pool = PgPoolOptions::new()
        .max_connections(config.db_pool_size.max(1))
        .connect(&url)
        .await?;

    info!("Connected to PostgreSQL database");
    Ok(pool)
}

/// Run migrations on the database
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    MIGRATOR.run(pool).await?;
    Ok(())
}
