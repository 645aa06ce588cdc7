//! Background save writer.
//!
//! Mutations hand serialized snapshots to a [`SaveHandle`] and return
//! immediately; a Tokio task owns the backend and performs the writes. When
//! several snapshots queue up only the newest one is written. Failed writes
//! are logged and forwarded on the failure channel returned by
//! [`SaveWriter::spawn`], gameplay never waits on them.

use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use crate::kv::KvStore;
use crate::PersistError;

/// A write that did not reach the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveFailure {
    pub key: String,
    pub message: String,
}

/// Receiving end of the failure-reporting channel.
pub type SaveFailures = mpsc::UnboundedReceiver<SaveFailure>;

enum Command {
    Save(String),
    Flush(oneshot::Sender<()>),
}

/// Cheap, cloneable handle to the writer task.
#[derive(Clone)]
pub struct SaveHandle {
    tx: mpsc::UnboundedSender<Command>,
    store: Arc<dyn KvStore>,
    key: Arc<str>,
}

impl std::fmt::Debug for SaveHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaveHandle").field("key", &self.key).finish()
    }
}

impl SaveHandle {
    /// The slot this handle writes to.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Queue `payload` for writing. Never blocks.
    pub fn submit(&self, payload: String) {
        if self.tx.send(Command::Save(payload)).is_err() {
            warn!(key = %self.key, "save writer stopped; snapshot dropped");
        }
    }

    /// Wait until every previously submitted snapshot has been handled.
    pub async fn flush(&self) -> Result<(), PersistError> {
        let (done_tx, done_rx) = oneshot::channel();
        self.tx
            .send(Command::Flush(done_tx))
            .map_err(|_| PersistError::WriterClosed)?;
        done_rx.await.map_err(|_| PersistError::WriterClosed)
    }

    /// Read the slot directly from the backend.
    pub async fn load(&self) -> Result<Option<String>, PersistError> {
        self.store.get_item(&self.key).await
    }

    /// Clear the slot, after writing out anything still queued.
    pub async fn clear(&self) -> Result<(), PersistError> {
        self.flush().await?;
        self.store.remove_item(&self.key).await
    }
}

/// Spawns the writer task.
pub struct SaveWriter;

impl SaveWriter {
    /// Start a writer for `key` on `store`. Must be called inside a Tokio runtime.
    ///
    /// The task exits once every [`SaveHandle`] clone has been dropped.
    pub fn spawn(store: Arc<dyn KvStore>, key: impl Into<String>) -> (SaveHandle, SaveFailures) {
        let key: Arc<str> = Arc::from(key.into());
        let (tx, rx) = mpsc::unbounded_channel();
        let (fail_tx, fail_rx) = mpsc::unbounded_channel();
        tokio::spawn(run(store.clone(), key.clone(), rx, fail_tx));
        info!(key = %key, "save writer started");
        (SaveHandle { tx, store, key }, fail_rx)
    }
}

async fn run(
    store: Arc<dyn KvStore>,
    key: Arc<str>,
    mut rx: mpsc::UnboundedReceiver<Command>,
    failures: mpsc::UnboundedSender<SaveFailure>,
) {
    while let Some(first) = rx.recv().await {
        let mut latest = None;
        let mut waiters = Vec::new();
        let mut coalesced = 0usize;
        let mut next = Some(first);
        while let Some(cmd) = next {
            match cmd {
                Command::Save(payload) => {
                    if latest.replace(payload).is_some() {
                        coalesced += 1;
                    }
                }
                Command::Flush(done) => waiters.push(done),
            }
            next = rx.try_recv().ok();
        }
        if let Some(payload) = latest {
            match store.set_item(&key, &payload).await {
                Ok(()) => debug!(key = %key, bytes = payload.len(), coalesced, "snapshot saved"),
                Err(e) => {
                    error!(key = %key, error = %e, "failed to save snapshot");
                    // Nobody listening is fine.
                    let _ = failures.send(SaveFailure {
                        key: key.to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }
        for done in waiters {
            let _ = done.send(());
        }
    }
    info!(key = %key, "save writer stopped");
}
