//! Capability traits for the two external services plus backend selection.
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::{OperatorConfig, ProviderMode};

#[cfg(feature = "aws")]
pub mod aws;
pub mod memory;

/// Everything the probe provider needs to create (or match) a health check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeRequest {
    pub caller_reference: String,
    pub probe_type: String,
    pub domain: String,
    pub port: i32,
    pub resource_path: String,
    pub disabled: bool,
    pub enable_sni: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statistic { Minimum, Maximum, Average }

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison { LessThanThreshold, GreaterThanThreshold }

/// Which metric the alarm watches and when it fires.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSpec {
    pub namespace: String,
    pub metric_name: String,
    pub statistic: Statistic,
    pub period_secs: i32,
    pub evaluation_periods: i32,
    pub threshold: f64,
    pub comparison: Comparison,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dimension { pub name: String, pub value: String }

/// Full alarm definition; `put` overwrites any alarm with the same name.
#[derive(Debug, Clone, PartialEq)]
pub struct AlarmRequest {
    pub name: String,
    pub description: String,
    pub alarm_actions: Vec<String>,
    pub ok_actions: Vec<String>,
    pub metric: MetricSpec,
    pub dimension: Dimension,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmState { Ok, Alarm, InsufficientData }

impl AlarmState {
    pub fn as_str(&self) -> &'static str {
        match self { Self::Ok => "OK", Self::Alarm => "ALARM", Self::InsufficientData => "INSUFFICIENT_DATA" }
    }
    pub fn parse(s: &str) -> Option<Self> {
        match s { "OK" => Some(Self::Ok), "ALARM" => Some(Self::Alarm), "INSUFFICIENT_DATA" => Some(Self::InsufficientData), _ => None }
    }
}

impl fmt::Display for AlarmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[async_trait]
pub trait ProbeProvider: Send + Sync + 'static {
    /// Idempotent on `caller_reference`: repeating the call returns the existing probe id.
    async fn create(&self, req: &ProbeRequest) -> anyhow::Result<String>;
    async fn tag(&self, probe_id: &str, name: &str) -> anyhow::Result<()>;
    /// Deleting a probe that no longer exists succeeds.
    async fn delete(&self, probe_id: &str) -> anyhow::Result<()>;
}

#[async_trait]
pub trait AlarmProvider: Send + Sync + 'static {
    async fn put(&self, req: &AlarmRequest) -> anyhow::Result<()>;
    async fn describe(&self, name: &str) -> anyhow::Result<Option<AlarmState>>;
    /// Deleting an alarm that no longer exists succeeds.
    async fn delete(&self, name: &str) -> anyhow::Result<()>;
}

/// The pair of provider clients shared by every reconcile pass.
#[derive(Clone)]
pub struct Providers {
    pub probes: Arc<dyn ProbeProvider>,
    pub alarms: Arc<dyn AlarmProvider>,
}

impl fmt::Debug for Providers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.debug_struct("Providers").finish() }
}

impl Providers {
    pub fn memory() -> Self {
        let cloud = Arc::new(memory::MemoryCloud::default());
        Self { probes: cloud.clone(), alarms: cloud }
    }

    pub async fn from_config(cfg: &OperatorConfig) -> anyhow::Result<Self> {
        if cfg.provider == ProviderMode::Aws {
            #[cfg(feature = "aws")]
            {
                let p = aws::build(cfg.region.as_deref()).await?;
                info!(region=?cfg.region, "providers.init_aws");
                return Ok(p);
            }
            #[cfg(not(feature = "aws"))]
            warn!("aws feature not enabled, falling back to in-memory providers");
        }
        info!(mode=%cfg.provider, "providers.init_memory");
        Ok(Self::memory())
    }
}

#[cfg(test)]
mod tests {
    use super::AlarmState;

    #[test]
    fn alarm_state_strings() {
        for s in [AlarmState::Ok, AlarmState::Alarm, AlarmState::InsufficientData] {
            assert_eq!(AlarmState::parse(s.as_str()), Some(s));
        }
        assert_eq!(AlarmState::parse("UNKNOWN"), None);
    }
}
