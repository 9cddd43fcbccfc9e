//! # nsregistry
//!
//! Namespace registry for a distributed time-series storage node.
//!
//! A node's namespace topology (the set of namespaces it stores and their
//! retention, index and lifecycle options) lives in a remote config service.
//! This crate follows that topology, validates every change and republishes
//! it to any number of in-process consumers.
//!
//! ```text
//!   config service key ──► ValueWatch ──► DynamicRegistry ──► BroadcastHub ──► NamespaceWatch (xN)
//!                                          │ validate
//!                                          │ dedupe
//!                                          └ invalid_update counter
//! ```
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use nsregistry::kv::{MemClient, MemStore};
//! use nsregistry::{DynamicInitializer, DynamicOptions, Initializer};
//!
//! let store = Arc::new(MemStore::new());
//! let opts = DynamicOptions::new().with_config_service_client(Arc::new(MemClient::new(store)));
//! let registry = DynamicInitializer::new(opts).init().await?;
//!
//! let mut watch = registry.watch()?;
//! while let Some(map) = watch.next().await {
//!     for id in map.ids() {
//!         println!("serving namespace {id}");
//!     }
//! }
//! ```

mod broadcast;
mod config;
mod errors;
pub mod kv;
mod metrics;
mod namespace;
pub mod proto;
mod registry;
mod utils;

pub use crate::config::*;
pub use broadcast::*;
pub use errors::*;
pub use metrics::*;
pub use namespace::*;
pub use registry::*;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub mod test_utils;
