use std::{collections::HashMap, fmt::Debug};

use async_trait::async_trait;
use eyre::WrapErr;
use futures_util::stream::BoxStream;
use tracing::warn;

use crate::types::RawEvent;

pub type LogStream<L> = BoxStream<'static, L>;

/// The external, append-only event log the indexer reads from.
#[async_trait]
pub trait EventSource: Send + Sync {
    type Log: Clone + Debug + Send + Sync + 'static;

    async fn head_position(&self) -> eyre::Result<u64>;

    /// Logs emitted by the tracked contract in `from..=to`, in whatever
    /// order the source returns them.
    async fn fetch_logs(&self, from: u64, to: u64) -> eyre::Result<Vec<Self::Log>>;

    /// Push subscription to new logs of the tracked contract. The stream
    /// ending means the connection is gone.
    async fn subscribe(&self) -> eyre::Result<LogStream<Self::Log>>;

    async fn unsubscribe(&self) -> eyre::Result<()>;

    /// Decodes a raw log against the contract's event schema. Logs with an
    /// unrecognised signature still decode, to [`crate::types::EventKind::Unknown`].
    fn decode_log(&self, log: &Self::Log) -> eyre::Result<RawEvent>;

    async fn block_timestamp(&self, block_number: u64) -> eyre::Result<u64>;
}

/// Turns raw logs into canonical [`RawEvent`]s: decode, then resolve the
/// block time for logs that did not carry it. Block times are cached for
/// the life of the decoder.
pub struct EventDecoder<'a, S: EventSource> {
    source: &'a S,
    timestamps: HashMap<u64, u64>,
}

impl<'a, S: EventSource> EventDecoder<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            timestamps: HashMap::new(),
        }
    }

    /// `Ok(None)` for a log that cannot be decoded; it is logged and
    /// skipped. Errors only come from the source itself.
    pub async fn canonicalize(&mut self, log: &S::Log) -> eyre::Result<Option<RawEvent>> {
        let mut event = match self.source.decode_log(log) {
            Ok(event) => event,
            Err(e) => {
                warn!(?log, "Skipping undecodable log: {:#}", e);
                return Ok(None);
            }
        };

        if event.block_timestamp.is_none() {
            event.block_timestamp = Some(self.timestamp_of(event.block_number).await?);
        }

        Ok(Some(event))
    }

    async fn timestamp_of(&mut self, block_number: u64) -> eyre::Result<u64> {
        if let Some(ts) = self.timestamps.get(&block_number) {
            return Ok(*ts);
        }

        let ts = self
            .source
            .block_timestamp(block_number)
            .await
            .wrap_err_with(|| format!("Failed to resolve timestamp of block {block_number}"))?;
        self.timestamps.insert(block_number, ts);
        Ok(ts)
    }
}
