//! Background writer for history snapshots.
//!
//! Writes are queued to a dedicated task and applied in order. When several
//! writes for the same key are waiting, only the newest is applied.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::kv::KeyValueStore;
use crate::metrics::{record_persist_failure, PersistTimer};

/// A full-state write for one key.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    Put(String),
    Remove,
}

impl WriteOp {
    fn name(&self) -> &'static str {
        match self {
            Self::Put(_) => "set",
            Self::Remove => "remove",
        }
    }
}

#[derive(Debug)]
enum Command {
    Write { key: String, op: WriteOp },
    Flush(oneshot::Sender<()>),
}

/// Applies a write, logging and counting any failure.
///
/// Returns whether the write succeeded.
pub async fn apply_write(store: &dyn KeyValueStore, key: &str, op: &WriteOp) -> bool {
    let timer = PersistTimer::new(op.name());
    let result = match op {
        WriteOp::Put(value) => store.set(key, value).await,
        WriteOp::Remove => store.remove(key).await,
    };
    timer.record();

    match result {
        Ok(()) => true,
        Err(e) => {
            error!(key = %key, operation = op.name(), error = %e, "Failed to persist alert history");
            record_persist_failure(op.name());
            false
        }
    }
}

/// Handle to the writer task.
///
/// Dropping the handle lets the task drain its queue and exit.
#[derive(Debug)]
pub struct HistoryWriter {
    tx: mpsc::UnboundedSender<Command>,
    handle: JoinHandle<()>,
}

impl HistoryWriter {
    /// Spawns the writer task on the current runtime.
    pub fn spawn(store: Arc<dyn KeyValueStore>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run(store, rx));
        Self { tx, handle }
    }

    /// Queues a write. Never blocks.
    pub fn submit(&self, key: &str, op: WriteOp) {
        let command = Command::Write {
            key: key.to_string(),
            op,
        };
        if self.tx.send(command).is_err() {
            error!(key = %key, "History writer has stopped; write dropped");
            record_persist_failure("enqueue");
        }
    }

    /// Waits until every write queued so far has been applied.
    pub async fn flush(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(Command::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.await;
        }
    }

    /// Applies outstanding writes and stops the task.
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(e) = self.handle.await {
            error!(error = %e, "History writer task failed");
        }
    }
}

async fn run(store: Arc<dyn KeyValueStore>, mut rx: mpsc::UnboundedReceiver<Command>) {
    debug!("History writer started");

    while let Some(first) = rx.recv().await {
        let mut pending: Vec<(String, WriteOp)> = Vec::new();
        let mut acks = Vec::new();

        let mut next = Some(first);
        while let Some(command) = next {
            match command {
                Command::Write { key, op } => {
                    pending.retain(|(k, _)| *k != key);
                    pending.push((key, op));
                }
                Command::Flush(ack) => acks.push(ack),
            }
            next = rx.try_recv().ok();
        }

        for (key, op) in &pending {
            apply_write(store.as_ref(), key, op).await;
        }
        for ack in acks {
            let _ = ack.send(());
        }
    }

    debug!("History writer stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKeyValueStore;

    #[tokio::test]
    async fn test_writes_are_applied_in_order() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let writer = HistoryWriter::spawn(store.clone());

        writer.submit("history", WriteOp::Put("[1]".to_string()));
        writer.submit("history", WriteOp::Put("[1,2]".to_string()));
        writer.submit("sessions", WriteOp::Put("{}".to_string()));
        writer.flush().await;

        assert_eq!(store.snapshot("history").as_deref(), Some("[1,2]"));
        assert_eq!(store.snapshot("sessions").as_deref(), Some("{}"));

        writer.submit("history", WriteOp::Remove);
        writer.shutdown().await;
        assert_eq!(store.snapshot("history"), None);
    }

    #[tokio::test]
    async fn test_failed_write_does_not_stop_writer() {
        let store = Arc::new(MemoryKeyValueStore::failing());
        let writer = HistoryWriter::spawn(store.clone());

        writer.submit("history", WriteOp::Put("[1]".to_string()));
        writer.flush().await;
        assert_eq!(store.snapshot("history"), None);

        store.set_simulate_failure(false);
        writer.submit("history", WriteOp::Put("[2]".to_string()));
        writer.flush().await;
        assert_eq!(store.snapshot("history").as_deref(), Some("[2]"));
    }

    #[tokio::test]
    async fn test_apply_write_reports_outcome() {
        let store = MemoryKeyValueStore::new();
        assert!(apply_write(&store, "k", &WriteOp::Put("v".to_string())).await);
        store.set_simulate_failure(true);
        assert!(!apply_write(&store, "k", &WriteOp::Remove).await);
        assert_eq!(store.snapshot("k").as_deref(), Some("v"));
    }
}
