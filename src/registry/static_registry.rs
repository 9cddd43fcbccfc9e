use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;
use tracing::info;

use super::Initializer;
use super::NamespaceWatch;
use super::Registry;
use crate::broadcast::BroadcastHub;
use crate::NamespaceMap;
use crate::RegistryError;
use crate::Result;

/// Serves a fixed namespace map.
pub struct StaticInitializer {
    registry: Arc<StaticRegistry>,
}

impl StaticInitializer {
    pub fn new(map: NamespaceMap) -> Self {
        Self {
            registry: Arc::new(StaticRegistry::new(map)),
        }
    }
}

#[async_trait]
impl Initializer for StaticInitializer {
    async fn init(&self) -> Result<Arc<dyn Registry>> {
        let registry: Arc<dyn Registry> = self.registry.clone();
        Ok(registry)
    }
}

/// Registry whose map never changes. Watches receive the map once and then
/// wait until the registry is closed.
#[derive(Debug)]
pub struct StaticRegistry {
    map: NamespaceMap,
    hub: BroadcastHub<NamespaceMap>,
    closed: Mutex<bool>,
}

impl StaticRegistry {
    pub fn new(map: NamespaceMap) -> Self {
        Self {
            hub: BroadcastHub::with_value(map.clone()),
            map,
            closed: Mutex::new(false),
        }
    }
}

impl Registry for StaticRegistry {
    fn watch(&self) -> Result<NamespaceWatch> {
        let subscription = self.hub.subscribe().map_err(|_| RegistryError::Closed)?;
        Ok(NamespaceWatch::new(subscription))
    }

    fn namespaces(&self) -> NamespaceMap {
        self.map.clone()
    }

    fn version(&self) -> Option<i64> {
        None
    }

    fn close(&self) -> Result<()> {
        let mut closed = self.closed.lock();
        if *closed {
            return Err(RegistryError::AlreadyClosed.into());
        }
        *closed = true;
        if let Err(e) = self.hub.close() {
            debug!("namespace broadcast hub already closed: {}", e);
        }

        info!(namespaces = self.map.len(), "static namespace registry closed");
        Ok(())
    }
}
