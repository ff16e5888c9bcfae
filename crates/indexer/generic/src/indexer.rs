use std::{sync::Arc, time::Duration};

use common::config::IndexerConfig;
use database::client::DbClient;
use eyre::WrapErr;
use tokio::sync::watch;
use tracing::{error, info, instrument, warn};

use crate::{
    backfill::{BackfillOutcome, BackfillReader},
    live::LiveSubscriber,
    pipeline::ProjectionPipeline,
    progress::ProgressTracker,
    projector::EventProjector,
    source::EventSource,
    state::{IndexerPhase, IndexerState},
};

#[derive(Debug, Clone)]
pub struct IndexerOptions {
    pub contract_address: String,
    pub start_block: u64,
    pub batch_size: u64,
    pub projection_retries: u32,
    pub retry_delay: Duration,
}

impl IndexerOptions {
    pub fn from_config(config: &IndexerConfig) -> Self {
        Self {
            contract_address: config.contract.address.clone(),
            start_block: config.chain.start_block,
            batch_size: config.chain.block_sync_batch_size,
            projection_retries: config.settings.projection_retries,
            retry_delay: Duration::from_millis(config.settings.retry_delay_ms),
        }
    }
}

pub struct Indexer<S: EventSource> {
    source: Arc<S>,
    pipeline: Arc<ProjectionPipeline>,
    batch_size: u64,
    state: IndexerState,
}

impl<S: EventSource> Indexer<S> {
    pub fn new(source: Arc<S>, db: Arc<DbClient>, options: IndexerOptions) -> Self {
        let projector = EventProjector::new(db.clone(), options.contract_address);
        let progress = ProgressTracker::new(db, options.start_block);
        let pipeline = ProjectionPipeline::new(
            projector,
            progress,
            options.projection_retries,
            options.retry_delay,
        );

        Self {
            source,
            pipeline: Arc::new(pipeline),
            batch_size: options.batch_size,
            state: IndexerState::default(),
        }
    }

    pub fn phase(&self) -> IndexerPhase {
        self.state.phase()
    }

    pub fn pipeline(&self) -> &ProjectionPipeline {
        &self.pipeline
    }

    /// Runs until shutdown is signalled (`Ok`) or the source or store fails
    /// for good (`Err`). Either way the indexer ends `Terminated`.
    #[instrument(skip_all)]
    pub async fn run(&mut self, shutdown: watch::Receiver<bool>) -> eyre::Result<()> {
        let result = self.drive(&shutdown).await;

        if let Err(e) = &result {
            error!("Indexer stopped with error: {:?}", e);
        }
        self.state.transition(IndexerPhase::Terminated)?;

        result
    }

    async fn drive(&mut self, shutdown: &watch::Receiver<bool>) -> eyre::Result<()> {
        let from_block = self.pipeline.progress().get_progress().await;
        info!("Starting indexer from block {}", from_block);

        self.state.transition(IndexerPhase::Backfilling)?;
        let backfill = BackfillReader::new(
            self.source.clone(),
            self.pipeline.clone(),
            self.batch_size,
        );

        let next_block = match backfill.run(from_block, shutdown).await? {
            BackfillOutcome::Completed { next_block } => next_block,
            BackfillOutcome::Interrupted => return Ok(()),
        };

        // Subscribe before the catch-up pass so nothing emitted in between
        // is missed. Overlap between the two is absorbed by deduplication.
        let stream = self
            .source
            .subscribe()
            .await
            .wrap_err("Failed to subscribe to contract events")?;
        self.state.transition(IndexerPhase::CaughtUp)?;

        if let BackfillOutcome::Interrupted = backfill.run(next_block, shutdown).await? {
            drop(stream);
            if let Err(e) = self.source.unsubscribe().await {
                warn!("Failed to unsubscribe from contract events: {:?}", e);
            }
            return Ok(());
        }

        self.state.transition(IndexerPhase::Live)?;
        LiveSubscriber::new(self.source.clone(), self.pipeline.clone())
            .run(stream, shutdown)
            .await
    }
}
