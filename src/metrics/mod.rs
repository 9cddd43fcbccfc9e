use prometheus::core::Collector;
use prometheus::proto::MetricType;
use prometheus::{Gauge, IntCounter, Opts, Registry};
use parking_lot::Mutex;
use tracing::warn;


pub const INVALID_UPDATE_METRIC: &str = "invalid_update";
pub const CURRENT_VERSION_METRIC: &str = "current_version";

/// Metrics emitted by a dynamic registry.
pub struct RegistryMetrics {
    /// Incremented once for every rejected update
    pub invalid_updates: IntCounter,
    /// Version of the value currently served, sampled periodically
    pub current_version: Gauge,
    registry: Registry,
    /// Whether each collector above is the one exported by `registry`
    exported: Mutex<[bool; 2]>,
}

impl std::fmt::Debug for RegistryMetrics {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("RegistryMetrics")
            .field("invalid_updates", &self.invalid_updates.get())
            .field("current_version", &self.current_version.get())
            .field("exported", &*self.exported.lock())
            .finish()
    }
}

impl RegistryMetrics {
    /// Creates the collectors under `scope` and registers them in `registry`.
    ///
    /// A collector already registered under the same name (two registries
    /// sharing one scope) is tolerated: the new collector keeps counting but is
    /// not exported.
    pub fn new(
        registry: &Registry,
        scope: &str,
    ) -> prometheus::Result<Self> {
        let invalid_updates = IntCounter::with_opts(
            Opts::new(INVALID_UPDATE_METRIC, "Number of namespace registry updates rejected").namespace(scope),
        )?;
        let current_version = Gauge::with_opts(
            Opts::new(CURRENT_VERSION_METRIC, "Version of the namespace registry value in use").namespace(scope),
        )?;

        let counter_exported = register(registry, Box::new(invalid_updates.clone()))?;
        let gauge_exported = match register(registry, Box::new(current_version.clone())) {
            Ok(exported) => exported,
            Err(e) => {
                if counter_exported {
                    if let Err(e) = registry.unregister(Box::new(invalid_updates.clone())) {
                        warn!("failed to unregister metric collector: {}", e);
                    }
                }
                return Err(e);
            }
        };

        Ok(Self {
            invalid_updates,
            current_version,
            registry: registry.clone(),
            exported: Mutex::new([counter_exported, gauge_exported]),
        })
    }

    /// Removes the collectors this instance exported from the registry.
    ///
    /// Collectors owned by another instance under the same names are left in
    /// place. Calling it again is a no-op.
    pub fn unregister(&self) {
        let collectors: [Box<dyn Collector>; 2] =
            [Box::new(self.invalid_updates.clone()), Box::new(self.current_version.clone())];
        let mut exported = self.exported.lock();
        for (exported, collector) in exported.iter_mut().zip(collectors) {
            if !*exported {
                continue;
            }
            if let Err(e) = self.registry.unregister(collector) {
                warn!("failed to unregister metric collector: {}", e);
            }
            *exported = false;
        }
    }
}

/// Returns whether `collector` is now exported by `registry`.
fn register(
    registry: &Registry,
    collector: Box<dyn Collector>,
) -> prometheus::Result<bool> {
    match registry.register(collector) {
        Ok(()) => Ok(true),
        Err(prometheus::Error::AlreadyReg) => {
            warn!("metric collector already registered by a live registry, keeping it unexported");
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

/// Sum of the samples of metric family `name` in `registry`.
///
/// Convenience for embedding systems and tests reading back counters.
pub fn gathered_value(
    registry: &Registry,
    name: &str,
) -> Option<f64> {
    registry
        .gather()
        .into_iter()
        .find(|family| family.get_name() == name)
        .map(|family| {
            family
                .get_metric()
                .iter()
                .map(|m| {
                    if family.get_field_type() == MetricType::COUNTER {
                        m.get_counter().get_value()
                    } else {
                        m.get_gauge().get_value()
                    }
                })
                .sum()
        })
}
