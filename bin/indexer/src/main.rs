use std::sync::Arc;

use common::config::{IndexerConfig, LoadFromEnv};
use database::client::DbClient;
use evm::EvmEventSource;
use eyre::{Result, WrapErr};
use generic_indexer::indexer::{Indexer, IndexerOptions};
use migration::{Migrator, MigratorTrait};
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cfg = IndexerConfig::load()?;

    let db_conn = database::connect::connect(&cfg.database.url).await?;
    info!("Connected to Indexer's DB");
    Migrator::up(&db_conn, None)
        .await
        .wrap_err("Failed to run database migrations")?;

    let arc_db = Arc::new(DbClient::new(db_conn));
    let source = Arc::new(EvmEventSource::from_config(&cfg)?);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupt received, shutting down");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => warn!("Failed to listen for interrupt signal: {:?}", e),
        }
    });

    let mut indexer = Indexer::new(source, arc_db, IndexerOptions::from_config(&cfg));
    indexer.run(shutdown_rx).await?;

    info!("Indexer stopped");
    Ok(())
}
