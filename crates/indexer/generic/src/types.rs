use chrono::{DateTime, Utc};

pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Contract events the indexer understands. Anything else decodes to
/// [`EventKind::Unknown`] so it can be consumed without blocking progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Manufactured {
        drug_id: String,
        product_id: String,
        batch_id: String,
        manufacturer: String,
        timestamp: u64,
    },
    Transferred {
        drug_id: String,
        from: String,
        to: String,
        new_status: String,
        timestamp: u64,
    },
    ColdChainViolation {
        drug_id: String,
        details: String,
        timestamp: u64,
    },
    /// Contract-level ownership change, not part of any drug's history.
    OwnershipTransferred {
        previous_owner: String,
        new_owner: String,
    },
    /// Contract-level access control change.
    RoleChanged {
        role: String,
        account: String,
        granted: bool,
    },
    Unknown {
        signature: String,
    },
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::Manufactured { .. } => "DrugManufactured",
            EventKind::Transferred { .. } => "DrugTransferred",
            EventKind::ColdChainViolation { .. } => "ColdChainViolation",
            EventKind::OwnershipTransferred { .. } => "OwnershipTransferred",
            EventKind::RoleChanged { granted: true, .. } => "RoleGranted",
            EventKind::RoleChanged { granted: false, .. } => "RoleRevoked",
            EventKind::Unknown { .. } => "Unknown",
        }
    }
}

/// Canonical event shape fed to the projector, whether it came from a
/// historical range query or a live subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    pub kind: EventKind,
    pub tx_hash: String,
    pub block_number: u64,
    pub log_index: u64,
    /// Seconds since the epoch of the containing block, once resolved.
    pub block_timestamp: Option<u64>,
}

impl RawEvent {
    /// Chain order: block first, then position inside the block.
    pub fn position(&self) -> (u64, u64) {
        (self.block_number, self.log_index)
    }

    pub fn block_time(&self) -> Option<DateTime<Utc>> {
        self.block_timestamp.and_then(unix_seconds)
    }
}

pub fn unix_seconds(secs: u64) -> Option<DateTime<Utc>> {
    i64::try_from(secs)
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
}

/// Sorts a batch into the order its events were emitted on chain.
pub fn sort_by_position(events: &mut [RawEvent]) {
    events.sort_by_key(RawEvent::position);
}
