pub mod filter;
pub mod foods;
pub mod models;
pub mod recipes;

use crate::config::DatabaseConfig;
use crate::error::Result;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub type DbPool = Pool<Sqlite>;

/// Create the parent directory of a file-backed SQLite database
async fn ensure_parent_dir(database_url: &str) -> Result<()> {
    if let Some(path) = database_url.strip_prefix("sqlite:") {
        if is_memory_url(database_url) {
            return Ok(());
        }
        if let Some(parent) = Path::new(path).parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    Ok(())
}

fn is_memory_url(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

/// Initialize database connection pool
pub async fn init_pool(database_url: &str) -> Result<DbPool> {
    ensure_parent_dir(database_url).await?;

    // Every connection to an in-memory database opens a fresh, empty one,
    // so the pool is pinned to a single long-lived connection.
    let options = if is_memory_url(database_url) {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new()
    };

    let pool = options.connect(database_url).await?;
    Ok(pool)
}

/// Initialize database connection pool with custom configuration
pub async fn init_pool_with_config(config: &DatabaseConfig) -> Result<DbPool> {
    if is_memory_url(&config.url) {
        return init_pool(&config.url).await;
    }

    ensure_parent_dir(&config.url).await?;

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connection_timeout_seconds))
        .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
        .connect(&config.url)
        .await?;

    Ok(pool)
}

/// Run database migrations, then fill search columns left empty by older rows
pub async fn run_migrations(pool: &DbPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;

    let recipes = recipes::backfill_search_columns(pool).await?;
    let foods = foods::backfill_search_columns(pool).await?;
    if recipes + foods > 0 {
        info!(
            "Backfilled search text for {} recipes and {} foods",
            recipes, foods
        );
    }
    Ok(())
}
