//! Protocol Buffer definitions of the namespace registry document.
//!
//! These messages mirror the schema stored under the registry key in the
//! config service. They are declared with `prost` derives instead of being
//! generated at build time, so the crate has no `protoc` requirement.
//!
//! Durations travel as signed nanoseconds.

use std::collections::HashMap;

/// Top-level document: every namespace keyed by its id.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Registry {
    #[prost(map = "string, message", tag = "1")]
    pub namespaces: HashMap<String, NamespaceOptions>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NamespaceOptions {
    #[prost(bool, tag = "1")]
    pub bootstrap_enabled: bool,
    #[prost(bool, tag = "2")]
    pub flush_enabled: bool,
    #[prost(bool, tag = "3")]
    pub writes_to_commit_log: bool,
    #[prost(bool, tag = "4")]
    pub cleanup_enabled: bool,
    #[prost(bool, tag = "5")]
    pub repair_enabled: bool,
    #[prost(message, optional, tag = "6")]
    pub retention_options: Option<RetentionOptions>,
    #[prost(bool, tag = "7")]
    pub snapshot_enabled: bool,
    #[prost(message, optional, tag = "8")]
    pub index_options: Option<IndexOptions>,
    #[prost(bool, tag = "9")]
    pub cold_writes_enabled: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RetentionOptions {
    #[prost(int64, tag = "1")]
    pub retention_period_nanos: i64,
    #[prost(int64, tag = "2")]
    pub block_size_nanos: i64,
    #[prost(int64, tag = "3")]
    pub buffer_future_nanos: i64,
    #[prost(int64, tag = "4")]
    pub buffer_past_nanos: i64,
    #[prost(bool, tag = "5")]
    pub block_data_expiry: bool,
    #[prost(int64, tag = "6")]
    pub block_data_expiry_after_not_accessed_period_nanos: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct IndexOptions {
    #[prost(bool, tag = "1")]
    pub enabled: bool,
    #[prost(int64, tag = "2")]
    pub block_size_nanos: i64,
}
