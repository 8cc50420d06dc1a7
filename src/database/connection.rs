use crate::config::DatabaseConfig;
use crate::error::AppResult;
use crate::store::{MemoryStore, PgStore, SharedStore};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::sync::Arc;

pub type DbPool = DatabaseConnection;

pub async fn create_pool(config: &DatabaseConfig) -> AppResult<DbPool> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .sqlx_logging(false);

    let pool = Database::connect(options).await?;
    Ok(pool)
}

pub async fn run_migrations(pool: &DbPool) -> AppResult<()> {
    Migrator::up(pool, None).await?;
    Ok(())
}

/// 根据 database.url 创建文档存储：memory:// 使用进程内存储，其余按 Postgres 连接并迁移
pub async fn create_store(config: &DatabaseConfig) -> AppResult<SharedStore> {
    if config.is_memory() {
        log::warn!("Using in-memory store; data is lost on restart");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let pool = create_pool(config).await?;
    run_migrations(&pool).await?;
    log::info!("Database connected and migrations applied");
    Ok(Arc::new(PgStore::new(pool)))
}
