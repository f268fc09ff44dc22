//! Finalizer protocol: the cleanup marker keeps a deleted declaration around until its
//! external probe and alarm are gone.
use kube::ResourceExt;
use tracing::{debug, info};

use crate::crd::{HealthCheck, HealthCheckStatus};
use crate::error::{Error, Result};
use crate::providers::Providers;

pub const FINALIZER: &str = "dnsmonitor.dev/cleanup";

/// Finalizer list with set semantics. Entries owned by other controllers keep their order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinalizerSet(Vec<String>);

impl FinalizerSet {
    pub fn of(hc: &HealthCheck) -> Self { hc.finalizers().iter().cloned().collect() }

    pub fn contains(&self, f: &str) -> bool { self.0.iter().any(|x| x == f) }

    /// Returns true when the set changed.
    pub fn insert(&mut self, f: &str) -> bool {
        if self.contains(f) { return false; }
        self.0.push(f.to_string());
        true
    }

    /// Returns true when the set changed.
    pub fn remove(&mut self, f: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|x| x != f);
        self.0.len() != before
    }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }
    pub fn as_slice(&self) -> &[String] { &self.0 }
}

impl FromIterator<String> for FinalizerSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = Self::default();
        for f in iter { set.insert(&f); }
        set
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Not being deleted.
    Active,
    /// Deletion requested, our marker still attached: teardown pending.
    Finalizing,
    /// Deletion requested and our marker gone: nothing left for us to do.
    Released,
}

impl Lifecycle {
    pub fn of(hc: &HealthCheck) -> Self {
        match (hc.metadata.deletion_timestamp.is_some(), FinalizerSet::of(hc).contains(FINALIZER)) {
            (false, _) => Self::Active,
            (true, true) => Self::Finalizing,
            (true, false) => Self::Released,
        }
    }
}

/// Remove the alarm, then the probe it references. Both deletes tolerate already-missing
/// resources, so a retried teardown repeats safely.
///
/// An empty recorded alarm name falls back to `derived_alarm`: a first pass can put the alarm and
/// then fail before status is written.
pub async fn teardown(providers: &Providers, status: &HealthCheckStatus, derived_alarm: &str) -> Result<()> {
    let alarm = if status.alarm_name.is_empty() { derived_alarm } else { status.alarm_name.as_str() };
    if !alarm.is_empty() {
        providers.alarms.delete(alarm).await.map_err(Error::Alarm)?;
        info!(%alarm, recorded=!status.alarm_name.is_empty(), "teardown.alarm_deleted");
    } else {
        debug!("teardown.no_alarm");
    }
    if !status.health_check_id.is_empty() {
        providers.probes.delete(&status.health_check_id).await.map_err(Error::Probe)?;
        info!(health_check_id=%status.health_check_id, "teardown.probe_deleted");
    } else {
        debug!("teardown.no_probe");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::HealthCheckSpec;
    use crate::providers::memory::{Call, MemoryCloud};

    fn object(finalizers: &[&str], deleting: bool) -> HealthCheck {
        let mut hc = HealthCheck::new("web", HealthCheckSpec {
            name_prefix: "p".into(), domain: "example.com".into(), probe_type: "HTTPS".into(), port: 443,
            resource_path: "/".into(), disabled: false, alarm_disabled: false, alarm_actions: vec![], ok_actions: vec![],
        });
        hc.metadata.finalizers = Some(finalizers.iter().map(|s| s.to_string()).collect());
        if deleting {
            hc.metadata.deletion_timestamp = serde_json::from_value(serde_json::json!("2024-01-01T00:00:00Z")).ok();
        }
        hc
    }

    #[test]
    fn set_semantics() {
        let mut set: FinalizerSet = ["a", "b", "a"].iter().map(|s| s.to_string()).collect();
        assert_eq!(set.as_slice(), ["a", "b"]);
        assert!(set.insert(FINALIZER));
        assert!(!set.insert(FINALIZER));
        assert_eq!(set.as_slice(), ["a", "b", FINALIZER]);
        assert!(set.remove("a"));
        assert!(!set.remove("a"));
        assert_eq!(set.as_slice(), ["b", FINALIZER]);
    }

    #[test]
    fn lifecycle_states() {
        assert_eq!(Lifecycle::of(&object(&[], false)), Lifecycle::Active);
        assert_eq!(Lifecycle::of(&object(&[FINALIZER], false)), Lifecycle::Active);
        assert_eq!(Lifecycle::of(&object(&[FINALIZER, "other"], true)), Lifecycle::Finalizing);
        assert_eq!(Lifecycle::of(&object(&["other"], true)), Lifecycle::Released);
    }

    #[tokio::test]
    async fn teardown_prefers_recorded_alarm_name() {
        let cloud = std::sync::Arc::new(MemoryCloud::default());
        let providers = Providers { probes: cloud.clone(), alarms: cloud.clone() };
        let status = HealthCheckStatus { health_check_id: "hc-1".into(), alarm_name: "old-web-healthcheck".into(), alarm_state: "OK".into() };
        teardown(&providers, &status, "new-web-healthcheck").await.unwrap();
        assert_eq!(cloud.calls(), vec![Call::DeleteAlarm("old-web-healthcheck".into()), Call::DeleteProbe("hc-1".into())]);
    }

    #[tokio::test]
    async fn teardown_falls_back_to_derived_alarm_name() {
        let cloud = std::sync::Arc::new(MemoryCloud::default());
        let providers = Providers { probes: cloud.clone(), alarms: cloud.clone() };
        teardown(&providers, &HealthCheckStatus::default(), "p-web-healthcheck").await.unwrap();
        assert_eq!(cloud.calls(), vec![Call::DeleteAlarm("p-web-healthcheck".into())]);
    }
}
