use std::time::Duration;

use common::indexer::with_retry;
use tracing::error;

use crate::{
    progress::ProgressTracker,
    projector::{EventProjector, ProjectionOutcome},
    types::RawEvent,
};

/// Projector and progress tracker glued into the single path every
/// event takes, whether it came from backfill or the live stream.
pub struct ProjectionPipeline {
    projector: EventProjector,
    progress: ProgressTracker,
    retries: u32,
    retry_delay: Duration,
}

impl ProjectionPipeline {
    pub fn new(
        projector: EventProjector,
        progress: ProgressTracker,
        retries: u32,
        retry_delay: Duration,
    ) -> Self {
        Self {
            projector,
            progress,
            retries,
            retry_delay,
        }
    }

    pub fn progress(&self) -> &ProgressTracker {
        &self.progress
    }

    /// Projects `event` and, once it is consumed, advances progress to its
    /// block. Storage errors are retried; when retries run out the error is
    /// returned and progress stays where it was.
    pub async fn consume(&self, event: &RawEvent) -> eyre::Result<ProjectionOutcome> {
        let outcome = with_retry(self.retries, self.retry_delay, || {
            self.projector.project(event)
        })
        .await
        .inspect_err(|e| {
            error!(
                event = event.kind.name(),
                tx = %event.tx_hash,
                block = event.block_number,
                log_index = event.log_index,
                "Projection failed, progress not advanced: {:?}",
                e
            );
        })?;

        self.progress.set_progress(event.block_number).await;
        Ok(outcome)
    }
}
