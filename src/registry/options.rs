use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use config::ConfigError;

use crate::config::is_valid_scope;
use crate::kv::ConfigServiceClient;
use crate::{Error, RegistryConfig, Result};

/// Where and how often the registry reports its metrics.
#[derive(Clone)]
pub struct InstrumentOptions {
    metrics_registry: prometheus::Registry,
    metrics_scope: String,
    report_interval: Duration,
}

impl Default for InstrumentOptions {
    fn default() -> Self {
        let monitoring = crate::MonitoringConfig::default();
        Self {
            metrics_registry: prometheus::Registry::new(),
            metrics_scope: monitoring.metrics_scope.clone(),
            report_interval: monitoring.report_interval(),
        }
    }
}

impl fmt::Debug for InstrumentOptions {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("InstrumentOptions")
            .field("metrics_scope", &self.metrics_scope)
            .field("report_interval", &self.report_interval)
            .finish_non_exhaustive()
    }
}

impl InstrumentOptions {
    pub fn with_metrics_registry(
        mut self,
        registry: prometheus::Registry,
    ) -> Self {
        self.metrics_registry = registry;
        self
    }

    pub fn with_metrics_scope(
        mut self,
        scope: impl Into<String>,
    ) -> Self {
        self.metrics_scope = scope.into();
        self
    }

    pub fn with_report_interval(
        mut self,
        interval: Duration,
    ) -> Self {
        self.report_interval = interval;
        self
    }

    pub fn metrics_registry(&self) -> &prometheus::Registry {
        &self.metrics_registry
    }

    pub fn metrics_scope(&self) -> &str {
        &self.metrics_scope
    }

    pub fn report_interval(&self) -> Duration {
        self.report_interval
    }
}

/// Runtime options of a dynamic namespace registry.
#[derive(Clone)]
pub struct DynamicOptions {
    config_service_client: Option<Arc<dyn ConfigServiceClient>>,
    namespace_registry_key: String,
    init_timeout: Duration,
    instrument: InstrumentOptions,
}

impl fmt::Debug for DynamicOptions {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("DynamicOptions")
            .field("config_service_client", &self.config_service_client.is_some())
            .field("namespace_registry_key", &self.namespace_registry_key)
            .field("init_timeout", &self.init_timeout)
            .field("instrument", &self.instrument)
            .finish()
    }
}

impl Default for DynamicOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl DynamicOptions {
    /// Options with the default key, timeout and instrumentation.
    ///
    /// A config service client must still be supplied.
    pub fn new() -> Self {
        Self::from_config(&RegistryConfig::default())
    }

    /// Options carrying the settings of a loaded configuration.
    pub fn from_config(config: &RegistryConfig) -> Self {
        Self {
            config_service_client: None,
            namespace_registry_key: config.registry.namespace_registry_key.clone(),
            init_timeout: config.registry.init_timeout(),
            instrument: InstrumentOptions::default()
                .with_metrics_scope(config.monitoring.metrics_scope.clone())
                .with_report_interval(config.monitoring.report_interval()),
        }
    }

    pub fn with_config_service_client(
        mut self,
        client: Arc<dyn ConfigServiceClient>,
    ) -> Self {
        self.config_service_client = Some(client);
        self
    }

    pub fn with_namespace_registry_key(
        mut self,
        key: impl Into<String>,
    ) -> Self {
        self.namespace_registry_key = key.into();
        self
    }

    /// Zero means "do not wait for the first value".
    pub fn with_init_timeout(
        mut self,
        timeout: Duration,
    ) -> Self {
        self.init_timeout = timeout;
        self
    }

    pub fn with_instrument_options(
        mut self,
        instrument: InstrumentOptions,
    ) -> Self {
        self.instrument = instrument;
        self
    }

    pub fn config_service_client(&self) -> Option<&Arc<dyn ConfigServiceClient>> {
        self.config_service_client.as_ref()
    }

    pub fn namespace_registry_key(&self) -> &str {
        &self.namespace_registry_key
    }

    pub fn init_timeout(&self) -> Duration {
        self.init_timeout
    }

    pub fn instrument_options(&self) -> &InstrumentOptions {
        &self.instrument
    }

    /// Checks the options before any I/O is attempted.
    pub fn validate(&self) -> Result<()> {
        if self.config_service_client.is_none() {
            return Err(invalid("config service client is not set"));
        }
        if self.namespace_registry_key.trim().is_empty() {
            return Err(invalid("namespace registry key is empty"));
        }
        if self.instrument.report_interval.is_zero() {
            return Err(invalid("report interval must be greater than 0"));
        }
        if !is_valid_scope(&self.instrument.metrics_scope) {
            return Err(invalid(&format!(
                "metrics scope {:?} is not a valid metric namespace",
                self.instrument.metrics_scope
            )));
        }
        Ok(())
    }
}

fn invalid(msg: &str) -> Error {
    Error::Config(ConfigError::Message(format!("invalid dynamic options: {msg}")))
}
