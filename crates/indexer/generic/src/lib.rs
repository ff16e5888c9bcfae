pub mod backfill;
pub mod indexer;
pub mod live;
pub mod pipeline;
pub mod progress;
pub mod projector;
pub mod source;
pub mod state;
pub mod types;
