use std::sync::Arc;
use std::time::Duration;

use nsregistry::kv::MemClient;
use nsregistry::kv::MemStore;
use nsregistry::DynamicOptions;
use nsregistry::InstrumentOptions;
use nsregistry::NamespaceMap;
use nsregistry::NamespaceMetadata;
use nsregistry::NamespaceOptions;
use nsregistry::RetentionOptions;
use prost::Message;

pub const DAY: u64 = 86_400;
pub const KEY: &str = "namespace_registry";
pub const SCOPE: &str = "it_registry";
pub const WAIT: Duration = Duration::from_secs(5);

pub fn namespace_map(namespaces: &[(&str, u64)]) -> NamespaceMap {
    NamespaceMap::new(namespaces.iter().map(|(id, retention_secs)| {
        let retention = RetentionOptions::default().with_retention_period(Duration::from_secs(*retention_secs));
        NamespaceMetadata::new(*id, NamespaceOptions::default().with_retention(retention)).unwrap()
    }))
    .unwrap()
}

pub fn document(namespaces: &[(&str, u64)]) -> Vec<u8> {
    namespace_map(namespaces).to_proto().encode_to_vec()
}

pub fn options(store: Arc<MemStore>) -> (DynamicOptions, prometheus::Registry) {
    let metrics = prometheus::Registry::new();
    let opts = DynamicOptions::new()
        .with_config_service_client(Arc::new(MemClient::new(store)))
        .with_namespace_registry_key(KEY)
        .with_init_timeout(Duration::from_secs(1))
        .with_instrument_options(
            InstrumentOptions::default()
                .with_metrics_registry(metrics.clone())
                .with_metrics_scope(SCOPE)
                .with_report_interval(Duration::from_millis(50)),
        );
    (opts, metrics)
}

pub fn invalid_updates(metrics: &prometheus::Registry) -> f64 {
    nsregistry::gathered_value(metrics, &format!("{SCOPE}_{}", nsregistry::INVALID_UPDATE_METRIC)).unwrap_or(0.0)
}

pub async fn eventually<F>(mut condition: F)
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + WAIT;
    while !condition() {
        assert!(tokio::time::Instant::now() < deadline, "condition not met within {WAIT:?}");
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
