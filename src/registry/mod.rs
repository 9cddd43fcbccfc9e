//! Namespace registries
//!
//! A [`Registry`] owns the namespace topology of a storage node and publishes
//! it to any number of in-process consumers through [`NamespaceWatch`]es.
//!
//! - [`DynamicRegistry`] follows a key in a remote config service, validating
//!   every update before republishing it. Stale, duplicate, unparsable or
//!   semantically identical updates are counted and dropped; the last good
//!   map keeps being served.
//! - [`StaticRegistry`] serves a fixed map for deployments without a config
//!   service.
//!
//! Registries are obtained from an [`Initializer`], which builds at most one
//! registry no matter how many callers ask for it.

mod dynamic;
mod options;
mod static_registry;
mod watch;


use std::sync::Arc;

use async_trait::async_trait;
pub use dynamic::*;
pub use options::*;
pub use static_registry::*;
pub use watch::*;

use crate::NamespaceMap;
use crate::Result;

pub trait Registry: Send + Sync + 'static {
    /// Subscribes to the namespace maps served by this registry.
    ///
    /// # Errors
    /// `RegistryError::Closed` once the registry has been closed.
    fn watch(&self) -> Result<NamespaceWatch>;

    /// Map currently served.
    fn namespaces(&self) -> NamespaceMap;

    /// Version of the remote value the current map was built from, if any.
    fn version(&self) -> Option<i64>;

    /// Releases the registry and terminates every watch.
    ///
    /// Dropping the last handle does not close a registry: its background
    /// tasks keep following the remote key until `close` is called.
    ///
    /// # Errors
    /// `RegistryError::AlreadyClosed` when called more than once.
    fn close(&self) -> Result<()>;
}

#[async_trait]
pub trait Initializer: Send + Sync {
    /// Returns the registry owned by this initializer, building it on first use.
    async fn init(&self) -> Result<Arc<dyn Registry>>;
}
