use chrono::{DateTime, Utc};
use entities::{drug_history_events, drugs};

pub mod client;
pub mod connect;
pub mod entities;
pub mod progress;
pub mod projection;
pub mod reader;

/// A single write inside one projection unit.
#[derive(Debug, Clone)]
pub enum DbOperations {
    /// Insert the drug, or overwrite it if the id already exists.
    UpsertDrug(drugs::ActiveModel),
    /// Move an existing drug to a new owner and status.
    TransferDrug {
        drug_id: String,
        new_owner: String,
        new_status: String,
        updated_at: DateTime<Utc>,
        block_number: i64,
    },
    InsertHistory(drug_history_events::ActiveModel),
}

/// Result of running one projection unit against the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitOutcome {
    Committed,
    /// A history row with the same (transaction hash, log index) already exists.
    Duplicate,
}
