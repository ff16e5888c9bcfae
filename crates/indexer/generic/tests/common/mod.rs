#![allow(dead_code)]

use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use database::{client::DbClient, connect::connect_in_memory};
use futures_util::StreamExt;
use generic_indexer::{
    indexer::IndexerOptions,
    pipeline::ProjectionPipeline,
    progress::ProgressTracker,
    projector::EventProjector,
    source::{EventSource, LogStream},
    types::{EventKind, RawEvent},
};
use migration::{Migrator, MigratorTrait};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

pub const CONTRACT: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";

#[derive(Debug, Clone)]
pub enum FakeLog {
    Event(RawEvent),
    Malformed { block_number: u64 },
}

impl FakeLog {
    fn block_number(&self) -> u64 {
        match self {
            FakeLog::Event(e) => e.block_number,
            FakeLog::Malformed { block_number } => *block_number,
        }
    }
}

/// In-memory chain. Historical logs are returned in insertion order, live
/// logs are pushed through the sender returned by [`FakeSource::new`].
pub struct FakeSource {
    head: AtomicU64,
    logs: Mutex<Vec<FakeLog>>,
    live: Mutex<Option<mpsc::UnboundedReceiver<FakeLog>>>,
    fail_fetch: AtomicBool,
    unsubscribed: AtomicBool,
    fetched_ranges: Mutex<Vec<(u64, u64)>>,
}

impl FakeSource {
    pub fn new(head: u64) -> (Arc<Self>, mpsc::UnboundedSender<FakeLog>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let source = Self {
            head: AtomicU64::new(head),
            logs: Mutex::new(Vec::new()),
            live: Mutex::new(Some(rx)),
            fail_fetch: AtomicBool::new(false),
            unsubscribed: AtomicBool::new(false),
            fetched_ranges: Mutex::new(Vec::new()),
        };
        (Arc::new(source), tx)
    }

    pub fn push(&self, log: FakeLog) {
        self.logs.lock().unwrap().push(log);
    }

    pub fn push_event(&self, event: RawEvent) {
        self.push(FakeLog::Event(event));
    }

    pub fn set_head(&self, head: u64) {
        self.head.store(head, Ordering::SeqCst);
    }

    pub fn fail_fetches(&self) {
        self.fail_fetch.store(true, Ordering::SeqCst);
    }

    pub fn was_unsubscribed(&self) -> bool {
        self.unsubscribed.load(Ordering::SeqCst)
    }

    pub fn fetched_ranges(&self) -> Vec<(u64, u64)> {
        self.fetched_ranges.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventSource for FakeSource {
    type Log = FakeLog;

    async fn head_position(&self) -> eyre::Result<u64> {
        Ok(self.head.load(Ordering::SeqCst))
    }

    async fn fetch_logs(&self, from: u64, to: u64) -> eyre::Result<Vec<FakeLog>> {
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(eyre::eyre!("connection refused"));
        }
        self.fetched_ranges.lock().unwrap().push((from, to));

        Ok(self
            .logs
            .lock()
            .unwrap()
            .iter()
            .filter(|log| (from..=to).contains(&log.block_number()))
            .cloned()
            .collect())
    }

    async fn subscribe(&self) -> eyre::Result<LogStream<FakeLog>> {
        let rx = self
            .live
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| eyre::eyre!("already subscribed"))?;
        Ok(UnboundedReceiverStream::new(rx).boxed())
    }

    async fn unsubscribe(&self) -> eyre::Result<()> {
        self.unsubscribed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn decode_log(&self, log: &FakeLog) -> eyre::Result<RawEvent> {
        match log {
            FakeLog::Event(event) => Ok(event.clone()),
            FakeLog::Malformed { .. } => Err(eyre::eyre!("data too short")),
        }
    }

    async fn block_timestamp(&self, block_number: u64) -> eyre::Result<u64> {
        Ok(block_number * 10)
    }
}

pub async fn setup_db() -> Arc<DbClient> {
    let conn = connect_in_memory().await.unwrap();
    Migrator::up(&conn, None).await.unwrap();
    Arc::new(DbClient::new(conn))
}

pub fn options(start_block: u64, batch_size: u64) -> IndexerOptions {
    IndexerOptions {
        contract_address: CONTRACT.to_owned(),
        start_block,
        batch_size,
        projection_retries: 1,
        retry_delay: Duration::from_millis(1),
    }
}

pub fn pipeline(db: &Arc<DbClient>, start_block: u64) -> Arc<ProjectionPipeline> {
    Arc::new(ProjectionPipeline::new(
        EventProjector::new(db.clone(), CONTRACT),
        ProgressTracker::new(db.clone(), start_block),
        1,
        Duration::from_millis(1),
    ))
}

fn raw(kind: EventKind, tx: &str, block_number: u64, log_index: u64) -> RawEvent {
    RawEvent {
        kind,
        tx_hash: tx.to_owned(),
        block_number,
        log_index,
        block_timestamp: None,
    }
}

pub fn manufactured(id: &str, manufacturer: &str, tx: &str, block: u64, log: u64) -> RawEvent {
    raw(
        EventKind::Manufactured {
            drug_id: id.to_owned(),
            product_id: "P1".to_owned(),
            batch_id: "B1".to_owned(),
            manufacturer: manufacturer.to_owned(),
            timestamp: 100,
        },
        tx,
        block,
        log,
    )
}

pub fn transferred(
    id: &str,
    from: &str,
    to: &str,
    status: &str,
    tx: &str,
    block: u64,
    log: u64,
) -> RawEvent {
    raw(
        EventKind::Transferred {
            drug_id: id.to_owned(),
            from: from.to_owned(),
            to: to.to_owned(),
            new_status: status.to_owned(),
            timestamp: 200,
        },
        tx,
        block,
        log,
    )
}

pub fn violation(id: &str, details: &str, tx: &str, block: u64, log: u64) -> RawEvent {
    raw(
        EventKind::ColdChainViolation {
            drug_id: id.to_owned(),
            details: details.to_owned(),
            timestamp: 300,
        },
        tx,
        block,
        log,
    )
}

pub fn unknown(tx: &str, block: u64, log: u64) -> RawEvent {
    raw(
        EventKind::Unknown {
            signature: "0xdeadbeef".to_owned(),
        },
        tx,
        block,
        log,
    )
}

pub fn ownership(tx: &str, block: u64, log: u64) -> RawEvent {
    raw(
        EventKind::OwnershipTransferred {
            previous_owner: "0xA".to_owned(),
            new_owner: "0xB".to_owned(),
        },
        tx,
        block,
        log,
    )
}
