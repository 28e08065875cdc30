use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

use crate::config::Config;
use crate::error::{AppError, AppResult};

pub async fn connect(config: &Config) -> AppResult<DatabaseConnection> {
    let mut options = ConnectOptions::new(config.database_url.clone());
    options.sqlx_logging(false);

    Database::connect(options)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to connect to database: {}", e)))
}

/// Fresh in-memory database with every migration applied.
///
/// A single pooled connection keeps the schema alive for the lifetime of the
/// returned handle.
pub async fn connect_in_memory() -> AppResult<DatabaseConnection> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to open in-memory database: {}", e)))?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}
