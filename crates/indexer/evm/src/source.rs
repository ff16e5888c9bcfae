use alloy::{
    primitives::{Address, B256},
    rpc::types::Log,
};
use async_trait::async_trait;
use common::config::IndexerConfig;
use futures_util::StreamExt;
use generic_indexer::{
    source::{EventSource, LogStream},
    types::RawEvent,
};
use tracing::{debug, info};

use crate::{
    contract::{SUPPLY_CHAIN_EVENT_SIGNATURES, get_event_name_from_signature_hash},
    parser::parse_log,
    provider::EvmProvider,
};

/// The supply chain contract seen through an EVM JSON-RPC node.
pub struct EvmEventSource {
    provider: EvmProvider,
    contract: Address,
    admin_role: Option<B256>,
}

impl EvmEventSource {
    pub fn new(provider: EvmProvider, contract: Address, admin_role: Option<B256>) -> Self {
        Self {
            provider,
            contract,
            admin_role,
        }
    }

    pub fn from_config(config: &IndexerConfig) -> eyre::Result<Self> {
        let provider = EvmProvider::new(&config.chain.http_rpc_url, &config.chain.ws_rpc_url)?;
        let contract = config
            .contract
            .address
            .parse::<Address>()
            .map_err(|e| eyre::eyre!("Invalid contract address: {}", e))?;
        let admin_role = config
            .contract
            .default_admin_role
            .as_deref()
            .map(str::parse::<B256>)
            .transpose()
            .map_err(|e| eyre::eyre!("Invalid default admin role: {}", e))?;

        Ok(Self::new(provider, contract, admin_role))
    }
}

#[async_trait]
impl EventSource for EvmEventSource {
    type Log = Log;

    async fn head_position(&self) -> eyre::Result<u64> {
        self.provider.get_block_number().await
    }

    async fn fetch_logs(&self, from: u64, to: u64) -> eyre::Result<Vec<Log>> {
        self.provider
            .get_logs(self.contract, SUPPLY_CHAIN_EVENT_SIGNATURES, from, to)
            .await
    }

    async fn subscribe(&self) -> eyre::Result<LogStream<Log>> {
        let stream = self
            .provider
            .subscribe_logs(self.contract, SUPPLY_CHAIN_EVENT_SIGNATURES)
            .await?;
        info!(contract = %self.contract, "Subscribed to contract events");

        Ok(stream.boxed())
    }

    async fn unsubscribe(&self) -> eyre::Result<()> {
        self.provider.unsubscribe().await
    }

    fn decode_log(&self, log: &Log) -> eyre::Result<RawEvent> {
        if let Some(sig) = log.topic0() {
            debug!(
                "Received event '{}' in block {:?} (signature hash: 0x{})",
                get_event_name_from_signature_hash(sig),
                log.block_number,
                hex::encode(sig),
            );
        }

        parse_log(log, self.admin_role).map_err(eyre::Report::from)
    }

    async fn block_timestamp(&self, block_number: u64) -> eyre::Result<u64> {
        self.provider.get_block_timestamp(block_number).await
    }
}
