use std::fmt;

use tracing::info;

/// Lifecycle of one indexer process. There is no way back from `Live` to
/// `Backfilling`; a restart begins again at `Starting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexerPhase {
    Starting,
    Backfilling,
    CaughtUp,
    Live,
    Terminated,
}

impl IndexerPhase {
    pub fn can_transition_to(self, next: IndexerPhase) -> bool {
        use IndexerPhase::*;

        matches!(
            (self, next),
            (Starting, Backfilling)
                | (Backfilling, CaughtUp)
                | (CaughtUp, Live)
                | (Starting | Backfilling | CaughtUp | Live, Terminated)
        )
    }
}

impl fmt::Display for IndexerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IndexerPhase::Starting => "STARTING",
            IndexerPhase::Backfilling => "BACKFILLING",
            IndexerPhase::CaughtUp => "CAUGHT_UP",
            IndexerPhase::Live => "LIVE",
            IndexerPhase::Terminated => "TERMINATED",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct IndexerState {
    phase: IndexerPhase,
}

impl Default for IndexerState {
    fn default() -> Self {
        Self {
            phase: IndexerPhase::Starting,
        }
    }
}

impl IndexerState {
    pub fn phase(&self) -> IndexerPhase {
        self.phase
    }

    pub fn transition(&mut self, next: IndexerPhase) -> eyre::Result<()> {
        if !self.phase.can_transition_to(next) {
            return Err(eyre::eyre!(
                "Invalid indexer transition from {} to {}",
                self.phase,
                next
            ));
        }

        info!("Indexer phase {} -> {}", self.phase, next);
        self.phase = next;
        Ok(())
    }
}
