use std::sync::Arc;

use chrono::{DateTime, Utc};
use database::{
    DbOperations, UnitOutcome,
    client::DbClient,
    entities::{drug_history_events, drugs},
};
use sea_orm::ActiveValue::Set;
use tracing::{info, instrument, warn};

use crate::types::{EventKind, RawEvent, ZERO_ADDRESS, unix_seconds};

pub const STATUS_MANUFACTURED: &str = "MANUFACTURED";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionOutcome {
    Projected,
    /// Already applied under the same (transaction hash, log index).
    Duplicate,
    /// Contract-level event, consumed without writing.
    Filtered,
    /// Unrecognised event, consumed without writing.
    UnknownType,
}

/// What projecting one event amounts to, before touching the store.
#[derive(Debug)]
pub enum Projection {
    Write(Vec<DbOperations>),
    Filtered,
    Unknown,
}

/// Maps canonical events onto the `drugs` and `drug_history_events` tables.
pub struct EventProjector {
    db: Arc<DbClient>,
    contract_address: String,
}

impl EventProjector {
    pub fn new(db: Arc<DbClient>, contract_address: impl Into<String>) -> Self {
        Self {
            db,
            contract_address: contract_address.into(),
        }
    }

    /// Applies `event` as one atomic unit: duplicate check, at most one drug
    /// write and one history insert. On error nothing was written.
    #[instrument(skip_all, fields(event = event.kind.name(), tx = %event.tx_hash, block = event.block_number, log_index = event.log_index))]
    pub async fn project(&self, event: &RawEvent) -> eyre::Result<ProjectionOutcome> {
        match self.plan(event) {
            Projection::Filtered => Ok(ProjectionOutcome::Filtered),
            Projection::Unknown => Ok(ProjectionOutcome::UnknownType),
            Projection::Write(ops) => {
                let outcome = self
                    .db
                    .apply_projection_unit(&event.tx_hash, event.log_index, ops)
                    .await?;

                match outcome {
                    UnitOutcome::Committed => {
                        info!("Successfully processed {}", event.kind.name());
                        Ok(ProjectionOutcome::Projected)
                    }
                    UnitOutcome::Duplicate => {
                        info!("Event already processed");
                        Ok(ProjectionOutcome::Duplicate)
                    }
                }
            }
        }
    }

    pub fn plan(&self, event: &RawEvent) -> Projection {
        let event_time = self.event_time(event);
        let block_number = event.block_number as i64;

        match &event.kind {
            EventKind::Manufactured {
                drug_id,
                product_id,
                batch_id,
                manufacturer,
                timestamp,
            } => {
                let manufactured_at = unix_seconds(*timestamp).unwrap_or(event_time);
                let drug = drugs::ActiveModel {
                    id: Set(drug_id.clone()),
                    product_id: Set(product_id.clone()),
                    batch_id: Set(batch_id.clone()),
                    manufacturer_address: Set(manufacturer.clone()),
                    current_owner_address: Set(manufacturer.clone()),
                    status: Set(STATUS_MANUFACTURED.to_owned()),
                    manufacture_timestamp: Set(manufactured_at),
                    last_update_timestamp: Set(manufactured_at),
                    contract_address: Set(self.contract_address.clone()),
                    last_synced_block: Set(block_number),
                };
                let history = self.history(
                    event,
                    drug_id,
                    Some(ZERO_ADDRESS.to_owned()),
                    Some(manufacturer.clone()),
                    Some(STATUS_MANUFACTURED.to_owned()),
                    format!("Manufactured by {manufacturer}. Product: {product_id}, Batch: {batch_id}"),
                    event_time,
                );

                Projection::Write(vec![
                    DbOperations::UpsertDrug(drug),
                    DbOperations::InsertHistory(history),
                ])
            }
            EventKind::Transferred {
                drug_id,
                from,
                to,
                new_status,
                timestamp,
            } => {
                let history = self.history(
                    event,
                    drug_id,
                    Some(from.clone()),
                    Some(to.clone()),
                    Some(new_status.clone()),
                    format!("Transferred from {from} to {to}. New Status: {new_status}"),
                    event_time,
                );

                Projection::Write(vec![
                    DbOperations::TransferDrug {
                        drug_id: drug_id.clone(),
                        new_owner: to.clone(),
                        new_status: new_status.clone(),
                        updated_at: unix_seconds(*timestamp).unwrap_or(event_time),
                        block_number,
                    },
                    DbOperations::InsertHistory(history),
                ])
            }
            EventKind::ColdChainViolation {
                drug_id, details, ..
            } => {
                let history = self.history(
                    event,
                    drug_id,
                    None,
                    None,
                    None,
                    format!("Cold Chain Violation: {details}"),
                    event_time,
                );

                Projection::Write(vec![DbOperations::InsertHistory(history)])
            }
            EventKind::OwnershipTransferred {
                previous_owner,
                new_owner,
            } => {
                info!(
                    "Ownership of contract transferred from {} to {}",
                    previous_owner, new_owner
                );
                Projection::Filtered
            }
            EventKind::RoleChanged {
                role,
                account,
                granted,
            } => {
                let action = if *granted { "granted to" } else { "revoked from" };
                info!("Contract role {} {} {}", role, action, account);
                Projection::Filtered
            }
            EventKind::Unknown { signature } => {
                warn!(signature = %signature, "Unknown event type, skipping");
                Projection::Unknown
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn history(
        &self,
        event: &RawEvent,
        drug_id: &str,
        from: Option<String>,
        to: Option<String>,
        status: Option<String>,
        details: String,
        event_time: DateTime<Utc>,
    ) -> drug_history_events::ActiveModel {
        drug_history_events::ActiveModel {
            transaction_hash: Set(event.tx_hash.clone()),
            log_index: Set(event.log_index as i64),
            drug_id: Set(drug_id.to_owned()),
            event_type: Set(event.kind.name().to_owned()),
            from_address: Set(from),
            to_address: Set(to),
            status: Set(status),
            details: Set(Some(details)),
            event_timestamp: Set(event_time),
            block_number: Set(event.block_number as i64),
        }
    }

    fn event_time(&self, event: &RawEvent) -> DateTime<Utc> {
        event.block_time().unwrap_or_else(|| {
            warn!(
                "Missing or invalid block timestamp in {}. Using now.",
                event.kind.name()
            );
            Utc::now()
        })
    }
}
