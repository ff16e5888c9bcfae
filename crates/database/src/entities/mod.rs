pub mod drug_history_events;
pub mod drugs;
pub mod indexer_state;
