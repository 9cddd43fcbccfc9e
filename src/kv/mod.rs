//! Remote key-value store abstraction
//!
//! The registry never talks to the backing store directly. It goes through a
//! [`ConfigServiceClient`], asks it for a [`Store`] and follows exactly one key
//! through a [`ValueWatch`]: a "get latest" accessor paired with a "wake on
//! change" signal.
//!
//! Signals coalesce. A watcher that has not consumed the previous signal
//! observes a single wake-up for any number of intervening writes, and must
//! always re-read the latest value with [`ValueWatch::get`] after waking.
//!
//! [`MemStore`] is the in-process implementation, used by embedded
//! deployments and as the deterministic backend in tests.

mod mem;
pub use mem::*;


use std::sync::Arc;

use bytes::Bytes;
#[cfg(test)]
use mockall::automock;
use async_trait::async_trait;

use crate::KvError;
use crate::Result;

/// A versioned payload read from the remote store.
///
/// Values are replaced wholesale on every update and never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Value {
    version: i64,
    data: Bytes,
}

impl Value {
    pub fn new(
        version: i64,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            version,
            data: data.into(),
        }
    }

    pub fn version(&self) -> i64 {
        self.version
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Whether this value supersedes `other` according to the store's versioning.
    ///
    /// Any value is newer than no value at all.
    pub fn is_newer(
        &self,
        other: Option<&Value>,
    ) -> bool {
        match other {
            Some(other) => self.version > other.version,
            None => true,
        }
    }

    /// Decodes the payload into a protobuf message.
    pub fn unmarshal<M>(&self) -> std::result::Result<M, KvError>
    where
        M: prost::Message + Default,
    {
        M::decode(self.data.clone()).map_err(|source| KvError::Decode {
            version: self.version,
            source,
        })
    }
}

/// Live handle on a single versioned key.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ValueWatch: Send + Sync + 'static {
    /// Latest value of the key, `None` when the key is absent.
    fn get(&self) -> Option<Value>;

    /// Suspends until a new value may be available.
    ///
    /// Returns `false` once the notification stream has terminated, either
    /// because [`ValueWatch::close`] was called or because the remote side
    /// ended the watch. Only one task is expected to wait at a time.
    async fn changed(&self) -> bool;

    /// Terminates the notification stream and releases remote resources.
    fn close(&self);
}

/// Versioned key-value store.
#[cfg_attr(test, automock)]
pub trait Store: Send + Sync + 'static {
    /// Starts watching `key`.
    ///
    /// The returned watch is signalled right away when the key already holds a
    /// value.
    fn watch(
        &self,
        key: &str,
    ) -> Result<Arc<dyn ValueWatch>>;

    /// Latest value of `key`, `None` when absent.
    fn get(
        &self,
        key: &str,
    ) -> Result<Option<Value>>;
}

/// Client of the configuration service that owns the key-value store.
#[cfg_attr(test, automock)]
pub trait ConfigServiceClient: Send + Sync + 'static {
    fn kv(&self) -> Result<Arc<dyn Store>>;
}
