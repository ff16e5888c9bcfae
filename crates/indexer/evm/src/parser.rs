use alloy::{primitives::B256, rpc::types::Log, sol_types::SolEvent};
use generic_indexer::types::{EventKind, RawEvent};

use crate::{
    contract::{
        ColdChainViolation, DEFAULT_ADMIN_ROLE, DrugManufactured, DrugTransferred,
        OwnershipTransferred, RoleGranted, RoleRevoked,
    },
    error::ParserError,
};

fn decode<T: SolEvent>(log: &Log, event_name: &'static str) -> Result<T, ParserError> {
    log.log_decode::<T>()
        .map(|decoded| decoded.inner.data)
        .map_err(|e| ParserError::DecodeError {
            event_type: event_name,
            source: Box::new(e),
        })
}

fn role_label(role: B256, admin_role: Option<B256>) -> String {
    if admin_role == Some(role) {
        DEFAULT_ADMIN_ROLE.to_owned()
    } else {
        format!("{role:?}")
    }
}

/// Decodes a contract log into the canonical event shape. Logs whose
/// signature is not part of the contract schema become
/// [`EventKind::Unknown`]; only logs that claim a known signature but fail
/// to decode, or lack their chain position, are errors.
pub fn parse_log(log: &Log, admin_role: Option<B256>) -> Result<RawEvent, ParserError> {
    let tx_hash = log
        .transaction_hash
        .ok_or(ParserError::MissingTransactionHash)?;
    let block_number = log.block_number.ok_or(ParserError::MissingBlockNumber)?;
    let log_index = log.log_index.ok_or(ParserError::MissingLogIndex)?;
    let sig = log.topic0().ok_or(ParserError::MissingTopic)?;

    let kind = match *sig {
        DrugManufactured::SIGNATURE_HASH => {
            let data = decode::<DrugManufactured>(log, "DrugManufactured")?;
            EventKind::Manufactured {
                drug_id: data.id,
                product_id: data.productId,
                batch_id: data.batchId,
                manufacturer: data.manufacturer.to_checksum(None),
                timestamp: data.timestamp.saturating_to::<u64>(),
            }
        }
        DrugTransferred::SIGNATURE_HASH => {
            let data = decode::<DrugTransferred>(log, "DrugTransferred")?;
            EventKind::Transferred {
                drug_id: data.id,
                from: data.from.to_checksum(None),
                to: data.to.to_checksum(None),
                new_status: data.newStatus,
                timestamp: data.timestamp.saturating_to::<u64>(),
            }
        }
        ColdChainViolation::SIGNATURE_HASH => {
            let data = decode::<ColdChainViolation>(log, "ColdChainViolation")?;
            EventKind::ColdChainViolation {
                drug_id: data.id,
                details: data.details,
                timestamp: data.timestamp.saturating_to::<u64>(),
            }
        }
        OwnershipTransferred::SIGNATURE_HASH => {
            let data = decode::<OwnershipTransferred>(log, "OwnershipTransferred")?;
            EventKind::OwnershipTransferred {
                previous_owner: data.previousOwner.to_checksum(None),
                new_owner: data.newOwner.to_checksum(None),
            }
        }
        RoleGranted::SIGNATURE_HASH => {
            let data = decode::<RoleGranted>(log, "RoleGranted")?;
            EventKind::RoleChanged {
                role: role_label(data.role, admin_role),
                account: data.account.to_checksum(None),
                granted: true,
            }
        }
        RoleRevoked::SIGNATURE_HASH => {
            let data = decode::<RoleRevoked>(log, "RoleRevoked")?;
            EventKind::RoleChanged {
                role: role_label(data.role, admin_role),
                account: data.account.to_checksum(None),
                granted: false,
            }
        }
        other => EventKind::Unknown {
            signature: format!("0x{}", hex::encode(other)),
        },
    };

    Ok(RawEvent {
        kind,
        tx_hash: format!("{tx_hash:?}"),
        block_number,
        log_index,
        block_timestamp: log.block_timestamp,
    })
}
