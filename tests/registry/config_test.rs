use std::io::Write;
use std::time::Duration;

use nsregistry::DynamicOptions;
use nsregistry::RegistryConfig;
use serial_test::serial;
use tempfile::NamedTempFile;

#[test]
#[serial]
fn test_options_follow_loaded_config() {
    let mut file = NamedTempFile::with_suffix(".toml").unwrap();
    writeln!(
        file,
        r#"
[registry]
namespace_registry_key = "cluster_a/namespaces"
init_timeout_ms = 0

[monitoring]
metrics_scope = "cluster_a"
"#
    )
    .unwrap();
    let path = file.path().to_str().unwrap().to_string();

    temp_env::with_vars(
        [
            ("CONFIG_PATH", None::<&str>),
            ("NSREG__MONITORING__REPORT_INTERVAL_MS", Some("250")),
        ],
        || {
            let config = RegistryConfig::new()
                .unwrap()
                .with_override_config(&path)
                .unwrap()
                .validate()
                .unwrap();
            let opts = DynamicOptions::from_config(&config);

            assert_eq!(opts.namespace_registry_key(), "cluster_a/namespaces");
            assert_eq!(opts.init_timeout(), Duration::ZERO);
            assert_eq!(opts.instrument_options().metrics_scope(), "cluster_a");
            assert_eq!(opts.instrument_options().report_interval(), Duration::from_millis(250));
        },
    );
}
