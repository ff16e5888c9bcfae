use std::sync::{Arc, Mutex};

use database::client::DbClient;
use tracing::{debug, error, info, warn};

/// Durable checkpoint of the last block whose events are all projected.
pub struct ProgressTracker {
    db: Arc<DbClient>,
    start_block: u64,
    last_recorded: Mutex<Option<u64>>,
}

impl ProgressTracker {
    pub fn new(db: Arc<DbClient>, start_block: u64) -> Self {
        Self {
            db,
            start_block,
            last_recorded: Mutex::new(None),
        }
    }

    /// Position to resume from. Falls back to the configured start block
    /// when nothing is stored or the store cannot be read.
    pub async fn get_progress(&self) -> u64 {
        match self.db.get_last_indexed_block().await {
            Ok(Some(block)) => {
                self.remember(block);
                block
            }
            Ok(None) => {
                info!(
                    "No indexed block recorded, starting from configured block {}",
                    self.start_block
                );
                self.start_block
            }
            Err(e) => {
                error!(
                    "Error getting latest indexed block from DB, starting from {}: {:?}",
                    self.start_block, e
                );
                self.start_block
            }
        }
    }

    /// Records `block_number`. Lower positions are ignored with a warning
    /// and repeats of the current one are no-ops. A failed write is logged
    /// and indexing carries on; the cost is reprocessing after a restart.
    pub async fn set_progress(&self, block_number: u64) {
        if let Some(last) = self.last_recorded() {
            if block_number < last {
                warn!(
                    last,
                    requested = block_number,
                    "Refusing to move indexed block backwards"
                );
                return;
            }
            if block_number == last {
                return;
            }
        }

        match self.db.upsert_last_indexed_block(block_number).await {
            Ok(true) => {
                debug!("Indexed block advanced to {}", block_number);
                self.remember(block_number);
            }
            Ok(false) => {
                debug!(
                    "Stored indexed block already at or past {}",
                    block_number
                );
            }
            Err(e) => {
                error!(
                    "Error updating latest indexed block in DB for block {}: {:?}",
                    block_number, e
                );
            }
        }
    }

    pub fn last_recorded(&self) -> Option<u64> {
        *self
            .last_recorded
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn remember(&self, block_number: u64) {
        let mut last = self
            .last_recorded
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *last = Some(last.map_or(block_number, |l| l.max(block_number)));
    }
}
