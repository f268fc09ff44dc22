use tracing::{debug, info};

use crate::crd::{HealthCheckSpec, HealthCheckStatus};
use crate::error::{Error, Result};
use crate::providers::{AlarmProvider, AlarmRequest, Comparison, Dimension, MetricSpec, Statistic};

/// Route53 publishes 1 for healthy and 0 for unhealthy; a single unhealthy minute fires the alarm.
pub fn health_metric() -> MetricSpec {
    MetricSpec {
        namespace: "AWS/Route53".into(),
        metric_name: "HealthCheckStatus".into(),
        statistic: Statistic::Minimum,
        period_secs: 60,
        evaluation_periods: 1,
        threshold: 1.0,
        comparison: Comparison::LessThanThreshold,
    }
}

pub fn alarm_request(spec: &HealthCheckSpec, probe_id: &str, alarm_name: &str) -> AlarmRequest {
    AlarmRequest {
        name: alarm_name.to_string(),
        description: format!("Health check for {} is failing", spec.domain),
        alarm_actions: spec.alarm_actions.clone(),
        ok_actions: spec.ok_actions.clone(),
        metric: health_metric(),
        dimension: Dimension { name: "HealthCheckId".into(), value: probe_id.to_string() },
    }
}

/// Upsert or remove the alarm according to `spec.alarm_disabled`. Returns the name to record in
/// status ("" when disabled).
///
/// Removal uses the alarm name from the persisted status rather than the derived one, so an alarm
/// created under an earlier name is the one that gets deleted. When the derived name moved (the
/// prefix or object name changed), the alarm under the persisted name is dropped once the new one
/// is in place, leaving a single alarm per declaration.
pub async fn sync_alarm(
    provider: &dyn AlarmProvider,
    spec: &HealthCheckSpec,
    persisted: &HealthCheckStatus,
    probe_id: &str,
    alarm_name: &str,
) -> Result<String> {
    if spec.alarm_disabled {
        if !persisted.alarm_name.is_empty() {
            provider.delete(&persisted.alarm_name).await.map_err(Error::Alarm)?;
            info!(alarm=%persisted.alarm_name, "alarm.deleted");
        }
        return Ok(String::new());
    }
    provider.put(&alarm_request(spec, probe_id, alarm_name)).await.map_err(Error::Alarm)?;
    debug!(alarm=%alarm_name, health_check_id=%probe_id, "alarm.synced");
    if !persisted.alarm_name.is_empty() && persisted.alarm_name != alarm_name {
        provider.delete(&persisted.alarm_name).await.map_err(Error::Alarm)?;
        info!(old=%persisted.alarm_name, new=%alarm_name, "alarm.renamed");
    }
    Ok(alarm_name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::memory::{Call, MemoryCloud};

    fn spec(disabled: bool) -> HealthCheckSpec {
        HealthCheckSpec {
            name_prefix: "example-site.prod".into(), domain: "example.com".into(), probe_type: "HTTPS".into(), port: 443,
            resource_path: "/".into(), disabled: false, alarm_disabled: disabled,
            alarm_actions: vec!["example.action.arn".into()], ok_actions: vec!["example.ok.arn".into()],
        }
    }

    #[tokio::test]
    async fn enabled_alarm_uses_fixed_threshold() {
        let cloud = MemoryCloud::default();
        let name = sync_alarm(&cloud, &spec(false), &HealthCheckStatus::default(), "hc-1", "example-site.prod-test-healthcheck").await.unwrap();
        assert_eq!(name, "example-site.prod-test-healthcheck");
        let stored = cloud.alarm(&name).unwrap().request;
        assert_eq!(stored.metric, health_metric());
        assert_eq!(stored.dimension, Dimension { name: "HealthCheckId".into(), value: "hc-1".into() });
        assert_eq!(stored.alarm_actions, vec!["example.action.arn".to_string()]);
        assert_eq!(stored.ok_actions, vec!["example.ok.arn".to_string()]);
    }

    #[tokio::test]
    async fn disabled_deletes_persisted_name() {
        let cloud = MemoryCloud::default();
        sync_alarm(&cloud, &spec(false), &HealthCheckStatus::default(), "hc-1", "old-name-healthz").await.unwrap();
        let persisted = HealthCheckStatus { health_check_id: "hc-1".into(), alarm_name: "old-name-healthz".into(), alarm_state: "OK".into() };
        let name = sync_alarm(&cloud, &spec(true), &persisted, "hc-1", "new-name-healthcheck").await.unwrap();
        assert_eq!(name, "");
        assert!(cloud.alarm("old-name-healthz").is_none());
        assert_eq!(cloud.calls().last(), Some(&Call::DeleteAlarm("old-name-healthz".into())));
    }

    #[tokio::test]
    async fn renamed_alarm_replaces_persisted_one() {
        let cloud = MemoryCloud::default();
        sync_alarm(&cloud, &spec(false), &HealthCheckStatus::default(), "hc-1", "old-test-healthcheck").await.unwrap();
        let persisted = HealthCheckStatus { health_check_id: "hc-1".into(), alarm_name: "old-test-healthcheck".into(), alarm_state: "OK".into() };
        cloud.clear_calls();
        let name = sync_alarm(&cloud, &spec(false), &persisted, "hc-1", "new-test-healthcheck").await.unwrap();
        assert_eq!(name, "new-test-healthcheck");
        assert_eq!(cloud.alarm_count(), 1);
        assert!(cloud.alarm("old-test-healthcheck").is_none());
        assert_eq!(cloud.calls(), vec![
            Call::PutAlarm("new-test-healthcheck".into()),
            Call::DeleteAlarm("old-test-healthcheck".into()),
        ]);
    }

    #[tokio::test]
    async fn unchanged_name_is_not_deleted() {
        let cloud = MemoryCloud::default();
        let persisted = HealthCheckStatus { health_check_id: "hc-1".into(), alarm_name: "x-healthcheck".into(), alarm_state: "OK".into() };
        sync_alarm(&cloud, &spec(false), &persisted, "hc-1", "x-healthcheck").await.unwrap();
        assert_eq!(cloud.calls(), vec![Call::PutAlarm("x-healthcheck".into())]);
    }

    #[tokio::test]
    async fn disabled_without_persisted_name_is_noop() {
        let cloud = MemoryCloud::default();
        let name = sync_alarm(&cloud, &spec(true), &HealthCheckStatus::default(), "hc-1", "x-healthcheck").await.unwrap();
        assert_eq!(name, "");
        assert!(cloud.calls().is_empty());
    }
}
