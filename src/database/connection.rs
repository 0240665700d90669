use anyhow::{Context, Result};
use r2d2_sqlite::SqliteConnectionManager;

pub type DbPool = r2d2::Pool<SqliteConnectionManager>;
pub type DbConn = r2d2::PooledConnection<SqliteConnectionManager>;

const DEFAULT_DATABASE_PATH: &str = "scholarz_ratings.db";

/// Resolve the database location, honoring the DATABASE_PATH override.
pub fn database_path() -> String {
    std::env::var("DATABASE_PATH").unwrap_or_else(|_| DEFAULT_DATABASE_PATH.to_string())
}

pub fn create_pool(database_path: &str) -> Result<DbPool> {
    build_pool(SqliteConnectionManager::file(database_path))
}

fn build_pool(manager: SqliteConnectionManager) -> Result<DbPool> {
    r2d2::Pool::builder()
        .build(manager)
        .context("Failed to create database connection pool")
}

pub fn get_connection(pool: &DbPool) -> Result<DbConn> {
    pool.get()
        .context("Failed to get database connection from pool")
}
