//! Dynamic namespace registry backed by a remote config service key.
//!
//! # Lifecycle
//!
//! ```text
//! DynamicInitializer::init()
//!   └─ validate options
//!   └─ ConfigServiceClient::kv() ─► Store::watch(key)
//!   └─ wait for first value (bounded by init_timeout, skipped when zero)
//!   └─ parse first value ─► seed BroadcastHub
//!   └─ spawn: update loop, metrics sampler
//! ```
//!
//! The update loop only mutates state through one path: a value that is
//! present, strictly newer than the current one, parses, and differs from the
//! current map. Anything else increments `invalid_update` and is dropped, so
//! subscribers only ever observe valid, advancing, distinct maps.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use parking_lot::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use super::DynamicOptions;
use super::Initializer;
use super::NamespaceWatch;
use super::Registry;
use crate::broadcast::BroadcastHub;
use crate::kv::Value;
use crate::kv::ValueWatch;
use crate::metrics::RegistryMetrics;
use crate::namespace::map_from_value;
use crate::utils::async_task::spawn_task;
use crate::Error;
use crate::NamespaceError;
use crate::NamespaceMap;
use crate::RegistryError;
use crate::Result;

/// Builds the dynamic registry exactly once.
///
/// Concurrent `init` calls are serialized; every caller gets the same
/// registry once one call has succeeded. A failed attempt leaves the
/// initializer empty so a later call can retry.
pub struct DynamicInitializer {
    opts: DynamicOptions,
    registry: tokio::sync::Mutex<Option<Arc<DynamicRegistry>>>,
}

impl DynamicInitializer {
    pub fn new(opts: DynamicOptions) -> Self {
        Self {
            opts,
            registry: tokio::sync::Mutex::new(None),
        }
    }

    /// Same as [`Initializer::init`], keeping the concrete type.
    pub async fn init_dynamic(&self) -> Result<Arc<DynamicRegistry>> {
        let mut registry = self.registry.lock().await;
        if let Some(existing) = registry.as_ref() {
            return Ok(existing.clone());
        }

        self.opts.validate()?;

        let created = DynamicRegistry::new(&self.opts).await?;
        *registry = Some(created.clone());
        Ok(created)
    }
}

#[async_trait]
impl Initializer for DynamicInitializer {
    async fn init(&self) -> Result<Arc<dyn Registry>> {
        let registry: Arc<dyn Registry> = self.init_dynamic().await?;
        Ok(registry)
    }
}

/// Reasons an update from the config service is dropped.
#[derive(Debug, thiserror::Error)]
pub(crate) enum UpdateRejection {
    #[error("received absent value")]
    Absent,

    #[error("received version {version} not newer than current {current:?}")]
    Stale { version: i64, current: Option<i64> },

    #[error("received invalid update at version {version}: {source}")]
    Invalid {
        version: i64,
        #[source]
        source: NamespaceError,
    },

    #[error("received identical update at version {version}")]
    Unchanged { version: i64 },

    #[error("registry closed before version {version} could be applied")]
    Closed { version: i64 },
}

/// Value and map are always replaced together.
#[derive(Debug)]
struct RegistryState {
    current_value: Option<Value>,
    current_map: NamespaceMap,
    closed: bool,
}

pub struct DynamicRegistry {
    key: String,
    report_interval: Duration,
    metrics: RegistryMetrics,
    hub: BroadcastHub<NamespaceMap>,
    kv_watch: Arc<dyn ValueWatch>,
    state: RwLock<RegistryState>,
    shutdown: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl std::fmt::Debug for DynamicRegistry {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("DynamicRegistry")
            .field("key", &self.key)
            .field("state", &*self.state.read())
            .finish_non_exhaustive()
    }
}

impl DynamicRegistry {
    /// Connects to the config service and starts following the registry key.
    ///
    /// Options are expected to be validated already.
    ///
    /// # Errors
    /// - `Error::Config` when no config service client is set
    /// - `Error::Kv` when the store or the watch cannot be obtained
    /// - `Error::InitTimeout` when no value arrives within the init timeout
    /// - `Error::Namespace` when the first value does not parse
    /// - `Error::Metrics` when the collectors cannot be created
    pub(crate) async fn new(opts: &DynamicOptions) -> Result<Arc<Self>> {
        let client = opts.config_service_client().ok_or_else(|| {
            Error::Config(config::ConfigError::Message(
                "invalid dynamic options: config service client is not set".into(),
            ))
        })?;
        let instrument = opts.instrument_options();

        let key = opts.namespace_registry_key().to_string();
        let store = client.kv()?;
        let kv_watch = store.watch(&key)?;

        let init_timeout = opts.init_timeout();
        if let Err(e) = wait_on_init(kv_watch.as_ref(), init_timeout).await {
            error!(
                "dynamic namespace registry initialization failed after waiting up to {:?}: {}",
                init_timeout, e
            );
            kv_watch.close();
            return Err(e);
        }

        let init_value = kv_watch.get();
        let (hub, init_map) = match &init_value {
            Some(value) => match map_from_value(value) {
                Ok(map) => (BroadcastHub::with_value(map.clone()), map),
                Err(e) => {
                    error!("dynamic namespace registry received invalid initial value: {}", e);
                    kv_watch.close();
                    return Err(e.into());
                }
            },
            None if init_timeout.is_zero() => {
                info!(
                    key = %key,
                    "dynamic namespace registry starting without initial value"
                );
                (BroadcastHub::new(), NamespaceMap::empty())
            }
            None => {
                error!("dynamic namespace registry received absent initial value");
                kv_watch.close();
                return Err(NamespaceError::InvalidRegistry.into());
            }
        };

        // Collectors are only registered for a registry that is returned.
        let metrics = match RegistryMetrics::new(instrument.metrics_registry(), instrument.metrics_scope()) {
            Ok(metrics) => metrics,
            Err(e) => {
                error!("dynamic namespace registry could not register metrics: {}", e);
                kv_watch.close();
                return Err(e.into());
            }
        };

        if let Some(value) = &init_value {
            info!(
                key = %key,
                version = value.version(),
                namespaces = init_map.len(),
                "dynamic namespace registry initialized"
            );
        }

        let registry = Arc::new(Self {
            key,
            report_interval: instrument.report_interval(),
            metrics,
            hub,
            kv_watch,
            state: RwLock::new(RegistryState {
                current_value: init_value,
                current_map: init_map,
                closed: false,
            }),
            shutdown: CancellationToken::new(),
            tasks: Mutex::new(Vec::with_capacity(2)),
        });

        let run = spawn_task("namespace_registry_run", registry.clone().run());
        let report = spawn_task("namespace_registry_metrics", registry.clone().report_metrics());
        registry.tasks.lock().extend([run, report]);

        Ok(registry)
    }

    pub fn is_closed(&self) -> bool {
        self.state.read().closed
    }

    /// Remote value the current map was built from.
    pub fn value(&self) -> Option<Value> {
        self.state.read().current_value.clone()
    }

    /// Map currently served.
    pub fn maps(&self) -> NamespaceMap {
        self.state.read().current_map.clone()
    }

    /// Key followed in the config service.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn metrics(&self) -> &RegistryMetrics {
        &self.metrics
    }

    /// Whether both background tasks have exited.
    pub fn background_tasks_finished(&self) -> bool {
        self.tasks.lock().iter().all(|task| task.is_finished())
    }

    async fn run(self: Arc<Self>) -> Result<()> {
        while !self.is_closed() {
            let notified = tokio::select! {
                _ = self.shutdown.cancelled() => break,
                notified = self.kv_watch.changed() => notified,
            };

            if !notified {
                info!(key = %self.key, "namespace registry watch stream ended, closing registry");
                if let Err(e) = self.close() {
                    debug!("registry already closed when watch stream ended: {}", e);
                }
                break;
            }

            match self.process_update() {
                Ok(version) => {
                    info!("dynamic namespace registry updated to version: {}", version);
                }
                Err(UpdateRejection::Closed { version }) => {
                    debug!("dynamic namespace registry discarded version {} after close", version);
                }
                Err(rejection) => {
                    self.metrics.invalid_updates.inc();
                    warn!("dynamic namespace registry {}, skipping", rejection);
                }
            }
        }
        Ok(())
    }

    /// Applies the latest remote value, returning its version.
    pub(crate) fn process_update(&self) -> std::result::Result<i64, UpdateRejection> {
        let value = self.kv_watch.get().ok_or(UpdateRejection::Absent)?;
        let version = value.version();

        let current = self.value();
        if !value.is_newer(current.as_ref()) {
            return Err(UpdateRejection::Stale {
                version,
                current: current.map(|v| v.version()),
            });
        }

        let map = map_from_value(&value).map_err(|source| UpdateRejection::Invalid { version, source })?;

        if map == self.maps() {
            return Err(UpdateRejection::Unchanged { version });
        }

        let mut state = self.state.write();
        if state.closed {
            return Err(UpdateRejection::Closed { version });
        }
        state.current_value = Some(value);
        state.current_map = map.clone();
        if let Err(e) = self.hub.update(map) {
            warn!("dynamic namespace registry could not publish version {}: {}", version, e);
        }
        Ok(version)
    }

    async fn report_metrics(self: Arc<Self>) -> Result<()> {
        let mut ticker = tokio::time::interval(self.report_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => return Ok(()),
                _ = ticker.tick() => {}
            }

            if self.is_closed() {
                return Ok(());
            }

            if let Some(value) = self.value() {
                self.metrics.current_version.set(value.version() as f64);
            }
        }
    }
}

impl Registry for DynamicRegistry {
    fn watch(&self) -> Result<NamespaceWatch> {
        if self.is_closed() {
            return Err(RegistryError::Closed.into());
        }
        // A close racing this call leaves the hub closed as well.
        let subscription = self.hub.subscribe().map_err(|_| RegistryError::Closed)?;
        Ok(NamespaceWatch::new(subscription))
    }

    fn namespaces(&self) -> NamespaceMap {
        self.maps()
    }

    fn version(&self) -> Option<i64> {
        self.state.read().current_value.as_ref().map(Value::version)
    }

    fn close(&self) -> Result<()> {
        let mut state = self.state.write();
        if state.closed {
            return Err(RegistryError::AlreadyClosed.into());
        }
        state.closed = true;

        self.kv_watch.close();
        if let Err(e) = self.hub.close() {
            debug!("namespace broadcast hub already closed: {}", e);
        }
        self.shutdown.cancel();
        self.metrics.unregister();

        info!(key = %self.key, "dynamic namespace registry closed");
        Ok(())
    }
}

/// Blocks until the watch signals or `timeout` elapses. Zero means no wait.
async fn wait_on_init(
    watch: &dyn ValueWatch,
    timeout: Duration,
) -> Result<()> {
    if timeout.is_zero() {
        return Ok(());
    }

    match tokio::time::timeout(timeout, watch.changed()).await {
        Ok(true) => Ok(()),
        // The latest value, if any, is still readable and decides the outcome.
        Ok(false) => {
            warn!("namespace registry watch ended during the initial wait");
            Ok(())
        }
        Err(_) => Err(Error::InitTimeout(timeout)),
    }
}
