use alloy::{primitives::FixedBytes, sol, sol_types::SolEvent};

sol! {
    #[derive(Debug)]
    event DrugManufactured(
        string id,
        string productId,
        string batchId,
        address indexed manufacturer,
        uint256 timestamp
    );

    #[derive(Debug)]
    event DrugTransferred(
        string id,
        address indexed from,
        address indexed to,
        string newStatus,
        uint256 timestamp
    );

    #[derive(Debug)]
    event ColdChainViolation(string id, string details, uint256 timestamp);

    #[derive(Debug)]
    event OwnershipTransferred(address indexed previousOwner, address indexed newOwner);

    #[derive(Debug)]
    event RoleGranted(bytes32 indexed role, address indexed account, address indexed sender);

    #[derive(Debug)]
    event RoleRevoked(bytes32 indexed role, address indexed account, address indexed sender);
}

/// Label used for the contract's admin role in logs.
pub const DEFAULT_ADMIN_ROLE: &str = "DEFAULT_ADMIN_ROLE";

pub const SUPPLY_CHAIN_EVENT_SIGNATURES: &[&str] = &[
    DrugManufactured::SIGNATURE,
    DrugTransferred::SIGNATURE,
    ColdChainViolation::SIGNATURE,
    OwnershipTransferred::SIGNATURE,
    RoleGranted::SIGNATURE,
    RoleRevoked::SIGNATURE,
];

pub fn get_event_name_from_signature_hash(sig: &FixedBytes<32>) -> &'static str {
    match *sig {
        DrugManufactured::SIGNATURE_HASH => "DrugManufactured",
        DrugTransferred::SIGNATURE_HASH => "DrugTransferred",
        ColdChainViolation::SIGNATURE_HASH => "ColdChainViolation",
        OwnershipTransferred::SIGNATURE_HASH => "OwnershipTransferred",
        RoleGranted::SIGNATURE_HASH => "RoleGranted",
        RoleRevoked::SIGNATURE_HASH => "RoleRevoked",
        _ => "Unknown Event",
    }
}
