use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Desired health-check declaration. One object maps onto exactly one probe and at most one alarm.
#[derive(CustomResource, Serialize, Deserialize, Debug, Clone, JsonSchema, PartialEq)]
#[kube(
    group = "dnsmonitor.dev",
    version = "v1alpha1",
    kind = "HealthCheck",
    plural = "healthchecks",
    shortname = "hc",
    namespaced,
    status = "HealthCheckStatus",
    printcolumn = r#"{"name":"DOMAIN", "type":"string", "jsonPath":".spec.domain"}"#,
    printcolumn = r#"{"name":"ID", "type":"string", "jsonPath":".status.healthCheckId"}"#,
    printcolumn = r#"{"name":"ALARM", "type":"string", "jsonPath":".status.alarmState"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheckSpec {
    pub name_prefix: String,
    pub domain: String,
    /// Probe type understood by the provider (HTTP, HTTPS, TCP, HTTPS_STR_MATCH, ...).
    #[serde(rename = "type")]
    pub probe_type: String,
    pub port: i32,
    #[serde(default)]
    pub resource_path: String,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub alarm_disabled: bool,
    #[serde(default)]
    pub alarm_actions: Vec<String>,
    #[serde(default)]
    pub ok_actions: Vec<String>,
}

/// Projection of the last successful sync. Every field is always serialized so a merge patch
/// overwrites the whole status.
#[derive(Serialize, Deserialize, Debug, Clone, Default, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheckStatus {
    #[serde(default)]
    pub health_check_id: String,
    #[serde(default)]
    pub alarm_name: String,
    #[serde(default)]
    pub alarm_state: String,
}
