use std::sync::Arc;

use eyre::WrapErr;
use tokio::sync::watch;
use tracing::{debug, info, instrument};

use crate::{
    pipeline::ProjectionPipeline,
    source::{EventDecoder, EventSource},
    types::sort_by_position,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackfillOutcome {
    /// Everything up to the head seen at the start of the run is consumed.
    Completed { next_block: u64 },
    /// Shutdown was requested between two events.
    Interrupted,
}

/// Walks the source from a starting block to its current head in fixed
/// width ranges, projecting each range in chain order.
pub struct BackfillReader<S: EventSource> {
    source: Arc<S>,
    pipeline: Arc<ProjectionPipeline>,
    batch_size: u64,
}

impl<S: EventSource> BackfillReader<S> {
    pub fn new(source: Arc<S>, pipeline: Arc<ProjectionPipeline>, batch_size: u64) -> Self {
        Self {
            source,
            pipeline,
            batch_size: batch_size.max(1),
        }
    }

    #[instrument(skip_all, fields(from = from_block))]
    pub async fn run(
        &self,
        from_block: u64,
        shutdown: &watch::Receiver<bool>,
    ) -> eyre::Result<BackfillOutcome> {
        let head = self
            .source
            .head_position()
            .await
            .wrap_err("Failed to read current head block")?;

        if from_block > head {
            info!("Already at head {}, nothing to backfill", head);
            return Ok(BackfillOutcome::Completed {
                next_block: from_block,
            });
        }

        info!("Backfilling blocks {} to {}", from_block, head);

        let mut start_block = from_block;
        while start_block <= head {
            let end_block = start_block
                .saturating_add(self.batch_size - 1)
                .min(head);

            let logs = self
                .source
                .fetch_logs(start_block, end_block)
                .await
                .wrap_err_with(|| {
                    format!("Failed to fetch logs for blocks {start_block} to {end_block}")
                })?;

            if logs.is_empty() {
                debug!("No logs in blocks {} to {}", start_block, end_block);
            } else {
                info!(
                    "Processing {} logs from blocks {} to {} and lagging by {} blocks",
                    logs.len(),
                    start_block,
                    end_block,
                    head - end_block
                );

                // Block times are resolved once per batch.
                let mut decoder = EventDecoder::new(self.source.as_ref());
                let mut events = Vec::with_capacity(logs.len());
                for log in &logs {
                    if let Some(event) = decoder.canonicalize(log).await? {
                        events.push(event);
                    }
                }
                sort_by_position(&mut events);

                for event in &events {
                    if *shutdown.borrow() {
                        info!(
                            "Shutdown requested, stopping backfill before block {} log {}",
                            event.block_number, event.log_index
                        );
                        return Ok(BackfillOutcome::Interrupted);
                    }
                    self.pipeline.consume(event).await?;
                }
            }

            self.pipeline.progress().set_progress(end_block).await;

            if *shutdown.borrow() {
                info!("Shutdown requested, stopping backfill after block {}", end_block);
                return Ok(BackfillOutcome::Interrupted);
            }

            start_block = end_block + 1;
        }

        info!("Backfill reached head {}", head);
        Ok(BackfillOutcome::Completed {
            next_block: head + 1,
        })
    }
}
