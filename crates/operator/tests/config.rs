use dns_healthcheck_operator::config::{OperatorConfig, ProviderMode};
use serial_test::serial;
use std::io::Write;
use tempfile::TempDir;

const VARS: [&str; 5] = ["HC_PROVIDER_MODE", "AWS_REGION", "HC_WATCH_NAMESPACE", "HC_METRICS_ADDR", "HC_REPORTER"];

fn write_cfg(dir: &TempDir, content: &str) {
    let path = dir.path().join("config.toml");
    let mut f = std::fs::File::create(&path).unwrap();
    f.write_all(content.as_bytes()).unwrap();
    std::env::set_var("HC_OPERATOR_CONFIG", &path);
    for v in VARS { std::env::remove_var(v); }
}

#[test]
#[serial]
fn missing_file_gives_defaults() {
    let td = TempDir::new().unwrap();
    std::env::set_var("HC_OPERATOR_CONFIG", td.path().join("absent.toml"));
    for v in VARS { std::env::remove_var(v); }
    let cfg = OperatorConfig::load().unwrap();
    assert_eq!(cfg.provider, ProviderMode::Mock);
    assert!(cfg.namespace.is_none());
    assert_eq!(cfg.metrics_addr.port(), 9090);
    assert_eq!(cfg.reporter, "dns-healthcheck-operator");
}

#[test]
#[serial]
fn file_values_then_env_overrides() {
    let td = TempDir::new().unwrap();
    write_cfg(&td, "provider = 'aws'\nregion = 'eu-west-1'\nnamespace = 'monitoring'\nmetrics_addr = '127.0.0.1:9100'\n");
    let cfg = OperatorConfig::load().unwrap();
    assert_eq!(cfg.provider, ProviderMode::Aws);
    assert_eq!(cfg.region.as_deref(), Some("eu-west-1"));
    assert_eq!(cfg.namespace.as_deref(), Some("monitoring"));
    assert_eq!(cfg.metrics_addr.to_string(), "127.0.0.1:9100");

    std::env::set_var("HC_PROVIDER_MODE", "mock");
    std::env::set_var("HC_WATCH_NAMESPACE", "team-a");
    let cfg = OperatorConfig::load().unwrap();
    assert_eq!(cfg.provider, ProviderMode::Mock);
    assert_eq!(cfg.namespace.as_deref(), Some("team-a"));
    for v in VARS { std::env::remove_var(v); }
}

#[test]
#[serial]
fn invalid_values_are_errors() {
    let td = TempDir::new().unwrap();
    write_cfg(&td, "provider = [unclosed");
    let err = OperatorConfig::load().unwrap_err();
    assert!(format!("{err:#}").contains("failed to parse config"), "got: {err:#}");

    write_cfg(&td, "provider = 'gcp'");
    let err = OperatorConfig::load().unwrap_err();
    assert!(err.to_string().contains("unknown provider mode"), "got: {err:#}");
}
