pub mod contract;
pub mod error;
pub mod parser;
pub mod provider;
pub mod source;

pub use source::EvmEventSource;
