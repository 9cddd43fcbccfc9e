use std::time::Duration;

use config::ConfigError;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Settings for the remote key the registry follows.
///
/// ```toml
/// [registry]
/// namespace_registry_key = "namespace_registry"
/// init_timeout_ms = 30000
/// ```
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DynamicRegistryConfig {
    /// Key holding the namespace registry document in the config service
    #[serde(default = "default_namespace_registry_key")]
    pub namespace_registry_key: String,

    /// How long initialization waits for the first value.
    ///
    /// `0` means "do not wait": the registry starts immediately and picks the
    /// first value up through its update loop.
    #[serde(default = "default_init_timeout_ms")]
    pub init_timeout_ms: i64,
}

impl Default for DynamicRegistryConfig {
    fn default() -> Self {
        Self {
            namespace_registry_key: default_namespace_registry_key(),
            init_timeout_ms: default_init_timeout_ms(),
        }
    }
}

impl DynamicRegistryConfig {
    pub fn validate(&self) -> Result<()> {
        if self.namespace_registry_key.trim().is_empty() {
            return Err(Error::Config(ConfigError::Message(
                "registry.namespace_registry_key must not be empty".into(),
            )));
        }

        if self.init_timeout_ms < 0 {
            return Err(Error::Config(ConfigError::Message(format!(
                "registry.init_timeout_ms must be non-negative, got {}",
                self.init_timeout_ms
            ))));
        }

        Ok(())
    }

    /// Initial wait as a `Duration`; negative values clamp to zero.
    pub fn init_timeout(&self) -> Duration {
        Duration::from_millis(self.init_timeout_ms.max(0) as u64)
    }
}

fn default_namespace_registry_key() -> String {
    "namespace_registry".to_string()
}

fn default_init_timeout_ms() -> i64 {
    30_000
}
