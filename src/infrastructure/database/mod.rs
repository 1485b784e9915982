//! SQLite persistence through SeaORM

pub mod entities;
pub mod migrator;
pub mod repositories;

pub use repositories::SeaOrmRepositoryProvider;

use std::sync::Arc;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::domain::RepositoryProvider;
use crate::infrastructure::storage::InMemoryRepositoryProvider;
use migrator::Migrator;

/// URL value that selects the in-process store
pub const MEMORY_URL: &str = "memory";

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// SeaORM URL (e.g. `sqlite://./park-eazy.db?mode=rwc`) or `memory`
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://./park-eazy.db?mode=rwc".to_string(),
        }
    }
}

impl DatabaseConfig {
    pub fn sqlite(path: &str) -> Self {
        Self {
            url: format!("sqlite://{}?mode=rwc", path),
        }
    }

    pub fn memory() -> Self {
        Self {
            url: MEMORY_URL.to_string(),
        }
    }

    pub fn is_memory(&self) -> bool {
        self.url.eq_ignore_ascii_case(MEMORY_URL)
    }
}

/// Connect without running migrations.
pub async fn init_database(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    info!(url = %config.url, "Connecting to database");
    let mut options = ConnectOptions::new(config.url.clone());
    options.sqlx_logging(false);
    let db = Database::connect(options).await?;
    info!("Database connected");
    Ok(db)
}

/// Repositories for the configured backend. The connection is returned
/// for health checks and shutdown; it is `None` for the in-memory store.
pub async fn open_repositories(
    config: &DatabaseConfig,
    auto_migrate: bool,
) -> Result<(Arc<dyn RepositoryProvider>, Option<DatabaseConnection>), DbErr> {
    if config.is_memory() {
        info!("Using in-memory store; data is lost on exit");
        return Ok((Arc::new(InMemoryRepositoryProvider::new()), None));
    }

    let db = init_database(config).await?;
    if auto_migrate {
        info!("Running database migrations");
        Migrator::up(&db, None).await?;
        info!("Migrations completed");
    }
    Ok((Arc::new(SeaOrmRepositoryProvider::new(db.clone())), Some(db)))
}
