use async_trait::async_trait;
use aws_config::BehaviorVersion;
use std::sync::Arc;
use tracing::{debug, warn};

use super::{AlarmProvider, AlarmRequest, AlarmState, Comparison, ProbeProvider, ProbeRequest, Providers, Statistic};

/// Route53 is a global service; its API lives in us-east-1 regardless of where alarms are kept.
const ROUTE53_REGION: &str = "us-east-1";

pub async fn build(region: Option<&str>) -> anyhow::Result<Providers> {
    let region = region.unwrap_or(ROUTE53_REGION).to_string();
    let shared = aws_config::defaults(BehaviorVersion::latest())
        .region(aws_config::Region::new(region))
        .load()
        .await;
    let r53_conf = aws_sdk_route53::config::Builder::from(&shared)
        .region(aws_sdk_route53::config::Region::new(ROUTE53_REGION))
        .build();
    Ok(Providers {
        probes: Arc::new(Route53Probes { client: aws_sdk_route53::Client::from_conf(r53_conf) }),
        alarms: Arc::new(CloudWatchAlarms { client: aws_sdk_cloudwatch::Client::new(&shared) }),
    })
}

#[derive(Clone)]
pub struct Route53Probes { client: aws_sdk_route53::Client }

impl std::fmt::Debug for Route53Probes { fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.debug_struct("Route53Probes").finish() } }

#[async_trait]
impl ProbeProvider for Route53Probes {
    async fn create(&self, req: &ProbeRequest) -> anyhow::Result<String> {
        use aws_sdk_route53::types::{HealthCheckConfig, HealthCheckType};
        let mut cfg = HealthCheckConfig::builder()
            .r#type(HealthCheckType::from(req.probe_type.as_str()))
            .fully_qualified_domain_name(&req.domain)
            .port(req.port)
            .disabled(req.disabled)
            .enable_sni(req.enable_sni);
        if !req.resource_path.is_empty() { cfg = cfg.resource_path(&req.resource_path); }
        let out = self.client.create_health_check()
            .caller_reference(&req.caller_reference)
            .health_check_config(cfg.build()?)
            .send()
            .await?;
        let id = out.health_check().map(|h| h.id().to_string())
            .ok_or_else(|| anyhow::anyhow!("create_health_check returned no health check"))?;
        debug!(%id, caller_reference=%req.caller_reference, "route53.create_health_check");
        Ok(id)
    }

    async fn tag(&self, probe_id: &str, name: &str) -> anyhow::Result<()> {
        use aws_sdk_route53::types::{Tag, TagResourceType};
        self.client.change_tags_for_resource()
            .resource_type(TagResourceType::Healthcheck)
            .resource_id(probe_id)
            .add_tags(Tag::builder().key("Name").value(name).build())
            .send()
            .await?;
        Ok(())
    }

    async fn delete(&self, probe_id: &str) -> anyhow::Result<()> {
        match self.client.delete_health_check().health_check_id(probe_id).send().await {
            Ok(_) => Ok(()),
            Err(e) if e.as_service_error().is_some_and(|se| se.is_no_such_health_check()) => {
                warn!(%probe_id, "route53.health_check_already_gone");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Clone)]
pub struct CloudWatchAlarms { client: aws_sdk_cloudwatch::Client }

impl std::fmt::Debug for CloudWatchAlarms { fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.debug_struct("CloudWatchAlarms").finish() } }

#[async_trait]
impl AlarmProvider for CloudWatchAlarms {
    async fn put(&self, req: &AlarmRequest) -> anyhow::Result<()> {
        use aws_sdk_cloudwatch::types::{ComparisonOperator, Dimension, Statistic as CwStatistic};
        let m = &req.metric;
        let statistic = match m.statistic {
            Statistic::Minimum => CwStatistic::Minimum,
            Statistic::Maximum => CwStatistic::Maximum,
            Statistic::Average => CwStatistic::Average,
        };
        let comparison = match m.comparison {
            Comparison::LessThanThreshold => ComparisonOperator::LessThanThreshold,
            Comparison::GreaterThanThreshold => ComparisonOperator::GreaterThanThreshold,
        };
        self.client.put_metric_alarm()
            .alarm_name(&req.name)
            .alarm_description(&req.description)
            .actions_enabled(true)
            .set_alarm_actions(Some(req.alarm_actions.clone()))
            .set_ok_actions(Some(req.ok_actions.clone()))
            .namespace(&m.namespace)
            .metric_name(&m.metric_name)
            .statistic(statistic)
            .period(m.period_secs)
            .evaluation_periods(m.evaluation_periods)
            .threshold(m.threshold)
            .comparison_operator(comparison)
            .dimensions(Dimension::builder().name(&req.dimension.name).value(&req.dimension.value).build())
            .send()
            .await?;
        Ok(())
    }

    async fn describe(&self, name: &str) -> anyhow::Result<Option<AlarmState>> {
        let out = self.client.describe_alarms().alarm_names(name).max_records(1).send().await?;
        Ok(out.metric_alarms().first()
            .and_then(|a| a.state_value())
            .and_then(|s| AlarmState::parse(s.as_str())))
    }

    async fn delete(&self, name: &str) -> anyhow::Result<()> {
        match self.client.delete_alarms().alarm_names(name).send().await {
            Ok(_) => Ok(()),
            Err(e) if e.as_service_error().is_some_and(|se| se.is_resource_not_found()) => {
                warn!(alarm=%name, "cloudwatch.alarm_already_gone");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
