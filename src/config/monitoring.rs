use std::time::Duration;

use config::ConfigError;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{Error, Result};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MonitoringConfig {
    /// Prefix of every metric the registry emits
    #[serde(default = "default_metrics_scope")]
    pub metrics_scope: String,

    /// Interval at which the current version gauge is sampled
    #[serde(default = "default_report_interval_ms")]
    pub report_interval_ms: u64,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            metrics_scope: default_metrics_scope(),
            report_interval_ms: default_report_interval_ms(),
        }
    }
}

impl MonitoringConfig {
    /// Validates monitoring configuration
    /// # Errors
    /// Returns `Error::Config` when:
    /// - The scope is not a valid Prometheus metric namespace
    /// - The report interval is zero
    pub fn validate(&self) -> Result<()> {
        if !is_valid_scope(&self.metrics_scope) {
            return Err(Error::Config(ConfigError::Message(format!(
                "monitoring.metrics_scope {:?} is not a valid metric namespace",
                self.metrics_scope
            ))));
        }

        if self.report_interval_ms == 0 {
            return Err(Error::Config(ConfigError::Message(
                "monitoring.report_interval_ms must be greater than 0".into(),
            )));
        }

        if self.report_interval_ms > 60_000 {
            warn!(
                "monitoring.report_interval_ms ({}) is above one minute; current_version will lag",
                self.report_interval_ms
            );
        }

        Ok(())
    }

    pub fn report_interval(&self) -> Duration {
        Duration::from_millis(self.report_interval_ms)
    }
}

/// Prometheus namespaces follow `[a-zA-Z_][a-zA-Z0-9_]*`.
pub(crate) fn is_valid_scope(scope: &str) -> bool {
    let mut chars = scope.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn default_metrics_scope() -> String {
    "namespace_registry".to_string()
}

fn default_report_interval_ms() -> u64 {
    1_000
}
