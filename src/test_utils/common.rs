use std::sync::Arc;
use std::time::Duration;

use prost::Message;

use crate::kv::MemClient;
use crate::kv::MemStore;
use crate::proto;
use crate::DynamicOptions;
use crate::InstrumentOptions;
use crate::NamespaceMap;
use crate::NamespaceMetadata;
use crate::NamespaceOptions;
use crate::RetentionOptions;

pub const DAY: u64 = 86_400;

pub const TEST_KEY: &str = "namespace_registry";
pub const TEST_SCOPE: &str = "test_registry";

/// Namespace with default options and a retention of `retention_secs`.
pub fn metadata_with_retention(
    id: &str,
    retention_secs: u64,
) -> NamespaceMetadata {
    let options = NamespaceOptions::default()
        .with_retention(RetentionOptions::default().with_retention_period(Duration::from_secs(retention_secs)));
    NamespaceMetadata::new(id, options).expect("valid test namespace")
}

pub fn namespace_map(namespaces: &[(&str, u64)]) -> NamespaceMap {
    NamespaceMap::new(
        namespaces
            .iter()
            .map(|(id, retention)| metadata_with_retention(id, *retention)),
    )
    .expect("valid test map")
}

pub fn registry_proto(namespaces: &[(&str, u64)]) -> proto::Registry {
    namespace_map(namespaces).to_proto()
}

pub fn registry_bytes(namespaces: &[(&str, u64)]) -> Vec<u8> {
    registry_proto(namespaces).encode_to_vec()
}

/// Options wired to `store` with a private metrics registry.
pub fn mem_options(
    store: Arc<MemStore>,
    init_timeout: Duration,
) -> (DynamicOptions, prometheus::Registry) {
    let metrics_registry = prometheus::Registry::new();
    let opts = DynamicOptions::new()
        .with_config_service_client(Arc::new(MemClient::new(store)))
        .with_namespace_registry_key(TEST_KEY)
        .with_init_timeout(init_timeout)
        .with_instrument_options(
            InstrumentOptions::default()
                .with_metrics_registry(metrics_registry.clone())
                .with_metrics_scope(TEST_SCOPE)
                .with_report_interval(Duration::from_millis(100)),
        );
    (opts, metrics_registry)
}

pub fn invalid_update_count(registry: &prometheus::Registry) -> f64 {
    crate::gathered_value(registry, &format!("{TEST_SCOPE}_{}", crate::INVALID_UPDATE_METRIC)).unwrap_or(0.0)
}

pub fn current_version_gauge(registry: &prometheus::Registry) -> f64 {
    crate::gathered_value(registry, &format!("{TEST_SCOPE}_{}", crate::CURRENT_VERSION_METRIC)).unwrap_or(0.0)
}

/// Polls `condition` until it holds, yielding to the runtime in between.
///
/// Panics after `timeout`.
pub async fn wait_until<F>(
    timeout: Duration,
    mut condition: F,
) where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    while !condition() {
        if tokio::time::Instant::now() >= deadline {
            panic!("condition not met within {timeout:?}");
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
