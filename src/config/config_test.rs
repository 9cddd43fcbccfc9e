use serial_test::serial;
use temp_env::with_vars;

use super::*;
use crate::Error;

fn cleanup_all_nsreg_env_vars() {
    for (key, _) in std::env::vars() {
        if key.starts_with("NSREG__") || key == "CONFIG_PATH" {
            std::env::remove_var(&key);
        }
    }
}

#[test]
#[serial]
fn default_config_should_initialize_with_hardcoded_values() {
    let config = RegistryConfig::default();

    assert_eq!(config.registry.namespace_registry_key, "namespace_registry");
    assert_eq!(config.registry.init_timeout_ms, 30_000);
    assert_eq!(config.monitoring.metrics_scope, "namespace_registry");
    assert_eq!(config.monitoring.report_interval_ms, 1_000);
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn new_should_merge_environment_overrides() {
    cleanup_all_nsreg_env_vars();
    with_vars(
        vec![
            ("NSREG__REGISTRY__NAMESPACE_REGISTRY_KEY", Some("m3db.node.namespaces")),
            ("NSREG__MONITORING__REPORT_INTERVAL_MS", Some("250")),
        ],
        || {
            let config = RegistryConfig::new().unwrap();

            assert_eq!(config.registry.namespace_registry_key, "m3db.node.namespaces");
            assert_eq!(config.monitoring.report_interval_ms, 250);
        },
    );
}

#[test]
#[serial]
fn with_override_config_should_merge_file_settings() {
    cleanup_all_nsreg_env_vars();
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("registry_override.toml");

    std::fs::write(
        &config_path,
        r#"
        [registry]
        init_timeout_ms = 0

        [monitoring]
        metrics_scope = "dbnode_namespaces"
        "#,
    )
    .unwrap();

    let empty_vars: Vec<(&str, Option<&str>)> = vec![];
    with_vars(empty_vars, || {
        let base_config = RegistryConfig::new().expect("success");
        let config = base_config
            .with_override_config(config_path.to_str().unwrap())
            .expect("override applies");

        assert_eq!(config.registry.init_timeout_ms, 0);
        assert_eq!(config.registry.namespace_registry_key, "namespace_registry");
        assert_eq!(config.monitoring.metrics_scope, "dbnode_namespaces");
    });
}

#[test]
#[serial]
fn environment_variables_should_have_highest_priority() {
    cleanup_all_nsreg_env_vars();
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("registry.toml");
    std::fs::write(
        &config_path,
        r#"
        [registry]
        init_timeout_ms = 5000
        "#,
    )
    .unwrap();

    with_vars(
        vec![
            ("CONFIG_PATH", Some(config_path.to_str().unwrap())),
            ("NSREG__REGISTRY__INIT_TIMEOUT_MS", Some("7000")),
        ],
        || {
            let config = RegistryConfig::new().unwrap();
            assert_eq!(config.registry.init_timeout_ms, 7000);
        },
    );
}

#[test]
#[serial]
fn missing_config_path_file_should_fail_to_load() {
    cleanup_all_nsreg_env_vars();
    with_vars(vec![("CONFIG_PATH", Some("/nonexistent/nsreg/config.toml"))], || {
        let result = RegistryConfig::new();
        assert!(matches!(result, Err(Error::Config(_))));
    });
}

#[test]
fn validation_should_reject_empty_registry_key() {
    let mut config = RegistryConfig::default();
    config.registry.namespace_registry_key = "  ".to_string();

    assert!(matches!(config.validate(), Err(Error::Config(_))));
}

#[test]
fn validation_should_reject_negative_init_timeout() {
    let mut config = RegistryConfig::default();
    config.registry.init_timeout_ms = -1;

    assert!(config.validate().is_err());
}

#[test]
fn zero_init_timeout_is_valid() {
    let mut config = RegistryConfig::default();
    config.registry.init_timeout_ms = 0;

    let config = config.validate().expect("zero timeout is allowed");
    assert_eq!(config.registry.init_timeout(), std::time::Duration::ZERO);
}

#[test]
fn validation_should_reject_zero_report_interval() {
    let mut config = RegistryConfig::default();
    config.monitoring.report_interval_ms = 0;

    assert!(config.validate().is_err());
}

#[test]
fn validation_should_reject_invalid_metrics_scope() {
    for scope in ["", "1abc", "namespace-registry", "ns registry"] {
        let mut config = RegistryConfig::default();
        config.monitoring.metrics_scope = scope.to_string();
        assert!(config.validate().is_err(), "scope {scope:?} should be rejected");
    }

    let mut config = RegistryConfig::default();
    config.monitoring.metrics_scope = "_dbnode_ns1".to_string();
    assert!(config.validate().is_ok());
}
