use eyre::Result;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(database_url.to_owned());
    opt.sqlx_logging(false); // Disable SQLx log

    Database::connect(opt).await
}

/// Single-connection SQLite database living in memory. Every pooled
/// connection would otherwise see its own empty database.
pub async fn connect_in_memory() -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new("sqlite::memory:".to_owned());
    opt.max_connections(1).min_connections(1).sqlx_logging(false);

    Database::connect(opt).await
}
