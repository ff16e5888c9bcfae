use std::sync::{Arc, Mutex};

use alloy::{
    eips::BlockNumberOrTag,
    primitives::{Address, B256},
    providers::{Provider, ProviderBuilder, WsConnect},
    rpc::types::{Filter, Log},
};
use common::indexer::{MAX_RETRIES, RETRY_DELAY, with_retry};
use futures_util::Stream;
use tokio::sync::OnceCell;
use tracing::info;

#[derive(Clone)]
pub struct EvmProvider {
    http: Arc<dyn Provider + Send + Sync>,
    ws: Arc<OnceCell<Arc<dyn Provider + Send + Sync>>>,
    subscription_id: Arc<Mutex<Option<B256>>>,
    ws_url: String,
}

impl EvmProvider {
    pub fn new(http_url: &str, ws_url: &str) -> eyre::Result<Self> {
        let parsed_url = http_url
            .parse()
            .map_err(|e| eyre::eyre!("Invalid HTTP URL: {}", e))?;
        let http = ProviderBuilder::new().connect_http(parsed_url);

        Ok(Self {
            http: Arc::new(http),
            ws: Arc::new(OnceCell::new()),
            subscription_id: Arc::new(Mutex::new(None)),
            ws_url: ws_url.to_string(),
        })
    }

    async fn ws_provider(&self) -> eyre::Result<&Arc<dyn Provider + Send + Sync>> {
        self.ws
            .get_or_try_init(|| async {
                let provider = with_retry(MAX_RETRIES, RETRY_DELAY, || async {
                    ProviderBuilder::new()
                        .connect_ws(WsConnect::new(self.ws_url.clone()))
                        .await
                        .map_err(eyre::Report::from)
                })
                .await?;
                info!("WS connection established");

                let provider: Arc<dyn Provider + Send + Sync> = Arc::new(provider);
                Ok(provider)
            })
            .await
    }

    pub async fn get_logs(
        &self,
        address: Address,
        topics: &[&str],
        from_block: u64,
        to_block: u64,
    ) -> eyre::Result<Vec<Log>> {
        let filter = Filter::new()
            .address(address)
            .events(topics)
            .from_block(from_block)
            .to_block(to_block);

        self.http
            .get_logs(&filter)
            .await
            .map_err(eyre::Report::from)
    }

    /// Opens a log subscription over WS. Only one subscription is tracked;
    /// a later call replaces the id used by [`Self::unsubscribe`].
    pub async fn subscribe_logs(
        &self,
        address: Address,
        topics: &[&str],
    ) -> eyre::Result<impl Stream<Item = Log> + Send + 'static> {
        let filter = Filter::new().address(address).events(topics);
        let ws_provider = self.ws_provider().await?;

        let subscription = ws_provider
            .subscribe_logs(&filter)
            .await
            .map_err(eyre::Report::from)?;

        *self
            .subscription_id
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(*subscription.local_id());

        Ok(subscription.into_stream())
    }

    pub async fn unsubscribe(&self) -> eyre::Result<()> {
        let id = self
            .subscription_id
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();

        match (id, self.ws.get()) {
            (Some(id), Some(ws)) => ws.unsubscribe(id).await.map_err(eyre::Report::from),
            _ => Ok(()),
        }
    }

    pub async fn get_block_number(&self) -> eyre::Result<u64> {
        self.http.get_block_number().await.map_err(Into::into)
    }

    pub async fn get_block_timestamp(&self, block_number: u64) -> eyre::Result<u64> {
        let block = self
            .http
            .get_block_by_number(BlockNumberOrTag::Number(block_number))
            .await?
            .ok_or_else(|| eyre::eyre!("Block {} not found", block_number))?;

        Ok(block.header.timestamp)
    }
}
