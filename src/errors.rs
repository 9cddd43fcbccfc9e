//! Namespace Registry Error Hierarchy
//!
//! Defines the error types of the dynamic namespace registry, categorized by
//! layer: configuration, remote key-value store, namespace validation,
//! broadcast and registry lifecycle.

use std::time::Duration;

use config::ConfigError;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid options or unloadable configuration sources
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The first value did not show up before the configured deadline
    #[error("timed out waiting for initial value after {0:?}")]
    InitTimeout(Duration),

    /// Remote key-value store failures
    #[error(transparent)]
    Kv(#[from] KvError),

    /// Namespace document failed validation
    #[error(transparent)]
    Namespace(#[from] NamespaceError),

    /// Registry lifecycle violations
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Broadcast hub lifecycle violations
    #[error(transparent)]
    Broadcast(#[from] BroadcastError),

    /// Metric collector construction failures
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl Error {
    /// True when initialization gave up waiting for the first value.
    ///
    /// Callers usually retry these with backoff, whereas configuration errors
    /// are programming mistakes and should fail fast.
    pub fn is_init_timeout(&self) -> bool {
        matches!(self, Error::InitTimeout(_))
    }

    /// True for every "already closed" flavour of lifecycle error.
    pub fn is_closed(&self) -> bool {
        matches!(
            self,
            Error::Registry(RegistryError::Closed)
                | Error::Registry(RegistryError::AlreadyClosed)
                | Error::Broadcast(BroadcastError::Closed)
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum KvError {
    /// Client could not hand out a store
    #[error("Key-value store unavailable: {0}")]
    StoreUnavailable(String),

    /// Watch could not be established
    #[error("Failed to watch key {key}: {reason}")]
    WatchFailed { key: String, reason: String },

    /// Payload could not be decoded into the requested message
    #[error("Failed to decode value at version {version}: {source}")]
    Decode {
        version: i64,
        #[source]
        source: prost::DecodeError,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum NamespaceError {
    #[error("no namespace metadata provided")]
    EmptyMetadatas,

    #[error("namespace id must not be empty")]
    EmptyId,

    #[error("duplicate namespace: {0}")]
    Duplicate(String),

    /// Namespace entry is missing a required section
    #[error("namespace {id}: missing {field}")]
    MissingField { id: String, field: &'static str },

    #[error("namespace {id}: invalid options: {reason}")]
    InvalidOptions { id: String, reason: String },

    /// Registry document failed to decode
    #[error("could not parse latest value from config service")]
    InvalidRegistry,
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Operation attempted on a closed registry
    #[error("registry closed")]
    Closed,

    /// Close called more than once
    #[error("registry already closed")]
    AlreadyClosed,
}

#[derive(Debug, thiserror::Error)]
pub enum BroadcastError {
    #[error("broadcast hub closed")]
    Closed,
}
