//! Status republishing: compare field by field, write only when something changed.
use std::fmt;
use tracing::info;

use crate::crd::{HealthCheck, HealthCheckStatus};
use crate::error::{Error, Result};
use crate::events::{EngineEvent, EventSink};
use crate::store::{DeclarationStore, ObjectKey};
use crate::telemetry::STATUS_WRITES;

/// A changed field: (name, old, new).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange { pub field: &'static str, pub old: String, pub new: String }

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusDiff { pub changes: Vec<FieldChange> }

impl StatusDiff {
    pub fn between(current: &HealthCheckStatus, desired: &HealthCheckStatus) -> Self {
        let mut changes = Vec::new();
        let mut cmp = |field: &'static str, old: &str, new: &str| {
            if old != new { changes.push(FieldChange { field, old: old.into(), new: new.into() }); }
        };
        cmp("healthCheckId", &current.health_check_id, &desired.health_check_id);
        cmp("alarmName", &current.alarm_name, &desired.alarm_name);
        cmp("alarmState", &current.alarm_state, &desired.alarm_state);
        Self { changes }
    }

    pub fn is_empty(&self) -> bool { self.changes.is_empty() }
}

impl fmt::Display for StatusDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, c) in self.changes.iter().enumerate() {
            if i > 0 { f.write_str(", ")?; }
            write!(f, "{}: {:?} -> {:?}", c.field, c.old, c.new)?;
        }
        Ok(())
    }
}

/// Persist `desired` if it differs from `current`. Returns whether a write happened.
pub async fn publish_status(
    store: &dyn DeclarationStore,
    events: &dyn EventSink,
    hc: &HealthCheck,
    current: &HealthCheckStatus,
    desired: &HealthCheckStatus,
) -> Result<bool> {
    let diff = StatusDiff::between(current, desired);
    if diff.is_empty() { return Ok(false); }
    store.replace_status(hc, desired).await.map_err(Error::Store)?;
    STATUS_WRITES.inc();
    info!(object=%ObjectKey::of(hc), diff=%diff, "status.updated");
    events.publish(hc, EngineEvent::status_changed(diff.to_string())).await;
    Ok(true)
}
