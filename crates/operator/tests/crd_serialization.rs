use dns_healthcheck_operator::{HealthCheck, HealthCheckSpec, HealthCheckStatus};
use kube::CustomResourceExt;
use serde_json::json;

#[test]
fn spec_uses_camel_case_and_defaults() {
    let spec: HealthCheckSpec = serde_json::from_value(json!({
        "namePrefix": "example-site.prod",
        "domain": "example.com",
        "type": "HTTPS",
        "port": 443,
        "alarmActions": ["example.action.arn"]
    })).unwrap();
    assert_eq!(spec.probe_type, "HTTPS");
    assert_eq!(spec.resource_path, "");
    assert!(!spec.disabled && !spec.alarm_disabled);
    assert!(spec.ok_actions.is_empty());
    let j = serde_json::to_value(&spec).unwrap();
    assert_eq!(j["namePrefix"], "example-site.prod");
    assert_eq!(j["alarmDisabled"], false);
}

#[test]
fn status_serializes_every_field() {
    let j = serde_json::to_value(HealthCheckStatus::default()).unwrap();
    assert_eq!(j, json!({"healthCheckId": "", "alarmName": "", "alarmState": ""}));
}

#[test]
fn crd_metadata() {
    let crd = HealthCheck::crd();
    assert_eq!(crd.spec.group, "dnsmonitor.dev");
    assert_eq!(crd.spec.names.kind, "HealthCheck");
    assert_eq!(crd.spec.scope, "Namespaced");
    let version = &crd.spec.versions[0];
    assert_eq!(version.name, "v1alpha1");
    assert!(version.subresources.as_ref().and_then(|s| s.status.as_ref()).is_some());
}
