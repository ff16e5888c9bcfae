use std::sync::Arc;

use futures_util::StreamExt;
use tokio::sync::watch;
use tracing::{error, info, instrument, warn};

use crate::{
    pipeline::ProjectionPipeline,
    source::{EventDecoder, EventSource, LogStream},
};

/// Feeds pushed logs through the same pipeline the backfill uses.
pub struct LiveSubscriber<S: EventSource> {
    source: Arc<S>,
    pipeline: Arc<ProjectionPipeline>,
}

impl<S: EventSource> LiveSubscriber<S> {
    pub fn new(source: Arc<S>, pipeline: Arc<ProjectionPipeline>) -> Self {
        Self { source, pipeline }
    }

    /// Consumes `stream` until shutdown or failure. `Ok` only for a
    /// requested shutdown; the stream ending is an error so the process
    /// exits and a supervisor can restart it from stored progress.
    #[instrument(skip_all)]
    pub async fn run(
        &self,
        mut stream: LogStream<S::Log>,
        shutdown: &watch::Receiver<bool>,
    ) -> eyre::Result<()> {
        let mut shutdown = shutdown.clone();
        let mut shutdown_open = true;

        info!("Listening for new contract events");

        let result = loop {
            if *shutdown.borrow() {
                break Ok(());
            }

            tokio::select! {
                biased;

                changed = shutdown.changed(), if shutdown_open => {
                    if changed.is_err() {
                        shutdown_open = false;
                    }
                }

                next = stream.next() => {
                    let Some(log) = next else {
                        error!("Live subscription ended");
                        break Err(eyre::eyre!("Live subscription ended"));
                    };

                    // In-flight projection always finishes before shutdown is looked at again.
                    let mut decoder = EventDecoder::new(self.source.as_ref());
                    let event = match decoder.canonicalize(&log).await {
                        Ok(Some(event)) => event,
                        Ok(None) => continue,
                        Err(e) => break Err(e),
                    };

                    info!(
                        "Received {} at block {} log {}",
                        event.kind.name(),
                        event.block_number,
                        event.log_index
                    );

                    if let Err(e) = self.pipeline.consume(&event).await {
                        break Err(e);
                    }
                }
            }
        };

        drop(stream);
        if let Err(e) = self.source.unsubscribe().await {
            warn!("Failed to unsubscribe from contract events: {:?}", e);
        } else {
            info!("Unsubscribed from contract events");
        }

        result
    }
}
