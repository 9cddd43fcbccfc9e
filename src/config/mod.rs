//! Configuration management for the namespace registry.
//!
//! Provides hierarchical configuration loading from multiple sources with priority:
//! 1. Default values (hardcoded)
//! 2. Config file named by `CONFIG_PATH`
//! 3. Explicit override file (`with_override_config`)
//! 4. Environment variables prefixed with `NSREG__` (highest priority)
//!
//! Loading never validates. Call [`RegistryConfig::validate`] once all
//! overrides have been applied.

mod monitoring;
mod registry;
pub use monitoring::*;
pub use registry::*;

#[cfg(test)]
mod config_test;

//---
use std::env;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::Result;

const ENV_PREFIX: &str = "NSREG";

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct RegistryConfig {
    /// Remote key and initialization behaviour
    #[serde(default)]
    pub registry: DynamicRegistryConfig,
    /// Metric naming and sampling
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

impl RegistryConfig {
    /// Creates a configuration from defaults, `CONFIG_PATH` and environment.
    ///
    /// # Errors
    /// Returns `Error::Config` when a source is unreadable or a value does not
    /// deserialize.
    pub fn new() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Ok(config_path) = env::var("CONFIG_PATH") {
            builder = builder.add_source(File::with_name(&config_path).required(true));
        }

        builder = builder.add_source(environment());

        let config: Self = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Applies additional configuration overrides from file without validation.
    ///
    /// Merging order (later sources override earlier):
    /// 1. Current configuration values
    /// 2. New configuration file
    /// 3. Latest environment variables (highest priority)
    pub fn with_override_config(
        &self,
        path: &str,
    ) -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(Config::try_from(self)?)
            .add_source(File::with_name(path))
            .add_source(environment())
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Validates every section and returns the validated instance.
    pub fn validate(self) -> Result<Self> {
        self.registry.validate()?;
        self.monitoring.validate()?;
        Ok(self)
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .ignore_empty(true)
        .try_parsing(true)
}
