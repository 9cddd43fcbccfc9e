//! In-process versioned key-value store.
//!
//! Each key is a single `tokio::sync::watch` cell holding the latest
//! `Option<Value>`. Writers replace the cell, watchers wake on change and read
//! the latest content, so intermediate writes coalesce exactly like a remote
//! config service watch does.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use tokio::sync::watch;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::trace;

use super::ConfigServiceClient;
use super::Store;
use super::Value;
use super::ValueWatch;
use crate::Result;

/// A [`MemValueWatch`] holds a waiting receiver and a read-only one.
const RECEIVERS_PER_WATCH: usize = 2;

#[derive(Debug, Default)]
pub struct MemStore {
    keys: DashMap<String, watch::Sender<Option<Value>>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `data` under `key` with the next version, returning that version.
    ///
    /// Versions start at 1 for a key that never held a value and saturate at
    /// `i64::MAX`.
    pub fn set(
        &self,
        key: &str,
        data: impl Into<Bytes>,
    ) -> i64 {
        let data = data.into();
        let cell = self.cell(key);
        let mut version = 0;
        cell.send_modify(|current| {
            version = current.as_ref().map(|v| v.version().saturating_add(1)).unwrap_or(1);
            *current = Some(Value::new(version, data));
        });
        trace!(key, version, "value set");
        version
    }

    /// Stores `data` under `key` with an explicit version.
    ///
    /// No ordering check is made, which allows replaying stale or duplicate
    /// versions the way a misbehaving remote store would deliver them.
    pub fn set_with_version(
        &self,
        key: &str,
        version: i64,
        data: impl Into<Bytes>,
    ) {
        self.cell(key).send_replace(Some(Value::new(version, data)));
        trace!(key, version, "value set with explicit version");
    }

    /// Marks `key` as absent. Watchers are woken and observe `None`.
    pub fn delete(
        &self,
        key: &str,
    ) {
        self.cell(key).send_replace(None);
        trace!(key, "value deleted");
    }

    /// Ends every watch on `key` as if the remote side dropped the stream.
    ///
    /// The key's content is forgotten; a later write starts a fresh cell.
    pub fn close_key(
        &self,
        key: &str,
    ) {
        if self.keys.remove(key).is_some() {
            debug!(key, "watch stream closed by store");
        }
    }

    /// Number of live watches on `key`.
    pub fn watcher_count(
        &self,
        key: &str,
    ) -> usize {
        self.keys
            .get(key)
            .map(|cell| cell.receiver_count() / RECEIVERS_PER_WATCH)
            .unwrap_or(0)
    }

    fn cell(
        &self,
        key: &str,
    ) -> watch::Sender<Option<Value>> {
        self.keys
            .entry(key.to_string())
            .or_insert_with(|| watch::channel(None).0)
            .clone()
    }
}

impl Store for MemStore {
    fn watch(
        &self,
        key: &str,
    ) -> Result<Arc<dyn ValueWatch>> {
        let mut receiver = self.cell(key).subscribe();
        if receiver.borrow().is_some() {
            receiver.mark_changed();
        }
        let latest = receiver.clone();

        debug!(key, "watch established");
        Ok(Arc::new(MemValueWatch {
            receiver: Mutex::new(receiver),
            latest,
            closed: CancellationToken::new(),
        }))
    }

    fn get(
        &self,
        key: &str,
    ) -> Result<Option<Value>> {
        let value = match self.keys.get(key) {
            Some(cell) => cell.borrow().clone(),
            None => None,
        };
        Ok(value)
    }
}

/// Watch handed out by [`MemStore`].
#[derive(Debug)]
pub struct MemValueWatch {
    /// Tracks which content the waiting task has already been woken for
    receiver: Mutex<watch::Receiver<Option<Value>>>,
    /// Read-only view used by `get`, never marks content as seen
    latest: watch::Receiver<Option<Value>>,
    closed: CancellationToken,
}

#[async_trait]
impl ValueWatch for MemValueWatch {
    fn get(&self) -> Option<Value> {
        self.latest.borrow().clone()
    }

    async fn changed(&self) -> bool {
        if self.closed.is_cancelled() {
            return false;
        }

        let mut receiver = self.receiver.lock().await;
        tokio::select! {
            biased;
            _ = self.closed.cancelled() => false,
            result = receiver.changed() => {
                if result.is_err() {
                    debug!("watch stream ended by store");
                }
                result.is_ok()
            }
        }
    }

    fn close(&self) {
        self.closed.cancel();
    }
}

/// [`ConfigServiceClient`] serving a shared [`MemStore`].
#[derive(Debug, Clone, Default)]
pub struct MemClient {
    store: Arc<MemStore>,
}

impl MemClient {
    pub fn new(store: Arc<MemStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<MemStore> {
        &self.store
    }
}

impl ConfigServiceClient for MemClient {
    fn kv(&self) -> Result<Arc<dyn Store>> {
        Ok(self.store.clone())
    }
}
