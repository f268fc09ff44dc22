//! The convergence engine: one idempotent pass per trigger for one declaration.
use kube::ResourceExt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::crd::{HealthCheck, HealthCheckStatus};
use crate::error::{Error, Result};
use crate::events::{EngineEvent, EventSink};
use crate::finalizer::{self, FinalizerSet, Lifecycle, FINALIZER};
use crate::identity::{self, Identity};
use crate::providers::Providers;
use crate::status::publish_status;
use crate::store::{DeclarationStore, ObjectKey};
use crate::sync;
use crate::telemetry::{RECONCILE_TOTAL, TEARDOWN_TOTAL};

/// Requested delay before the next periodic pass after a successful sync.
pub const RESYNC_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// External state matches the declaration; check again after `RESYNC_INTERVAL`.
    Synced { status_written: bool },
    /// Teardown finished and the marker was dropped, or it already was.
    Released,
    /// The declaration no longer exists.
    Missing,
}

impl Outcome {
    fn label(&self) -> &'static str {
        match self { Self::Synced { .. } => "synced", Self::Released => "released", Self::Missing => "missing" }
    }
}

#[derive(Clone)]
pub struct Engine {
    providers: Providers,
    store: Arc<dyn DeclarationStore>,
    events: Arc<dyn EventSink>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.debug_struct("Engine").finish() }
}

impl Engine {
    pub fn new(providers: Providers, store: Arc<dyn DeclarationStore>, events: Arc<dyn EventSink>) -> Self {
        Self { providers, store, events }
    }

    pub async fn reconcile(&self, key: &ObjectKey) -> Result<Outcome> {
        let span = info_span!("reconcile", namespace=%key.namespace, name=%key.name);
        let result = self.reconcile_inner(key).instrument(span).await;
        let label = match &result { Ok(o) => o.label(), Err(e) => e.kind() };
        RECONCILE_TOTAL.with_label_values(&[label]).inc();
        result
    }

    async fn reconcile_inner(&self, key: &ObjectKey) -> Result<Outcome> {
        let Some(hc) = self.store.get(key).await.map_err(Error::Store)? else {
            debug!("reconcile.missing");
            return Ok(Outcome::Missing);
        };
        match Lifecycle::of(&hc) {
            Lifecycle::Finalizing => return self.finalize(hc).await,
            Lifecycle::Released => return Ok(Outcome::Released),
            Lifecycle::Active => {}
        }
        let hc = self.ensure_finalizer(hc).await?;
        let current = hc.status.clone().unwrap_or_default();
        let desired = match self.sync(&hc, &current).await {
            Ok(s) => s,
            Err(e) => {
                if e.is_permanent() {
                    warn!(error=%e, "reconcile.permanent_failure");
                    self.events.publish(&hc, EngineEvent::sync_failed(e.to_string())).await;
                }
                return Err(e);
            }
        };
        let status_written = publish_status(self.store.as_ref(), self.events.as_ref(), &hc, &current, &desired).await?;
        debug!(status_written, "reconcile.synced");
        Ok(Outcome::Synced { status_written })
    }

    /// Probe before alarm (the alarm is dimensioned by the probe id), then the observed state.
    async fn sync(&self, hc: &HealthCheck, current: &HealthCheckStatus) -> Result<HealthCheckStatus> {
        let ids = Identity::derive(hc)?;
        let health_check_id = sync::sync_probe(self.providers.probes.as_ref(), &hc.spec, &ids.caller_reference, &ids.resource_name).await?;
        let alarm_name = sync::sync_alarm(self.providers.alarms.as_ref(), &hc.spec, current, &health_check_id, &ids.alarm_name).await?;
        let alarm_state = sync::read_alarm_state(self.providers.alarms.as_ref(), &alarm_name).await?;
        Ok(HealthCheckStatus { health_check_id, alarm_name, alarm_state })
    }

    async fn ensure_finalizer(&self, hc: HealthCheck) -> Result<HealthCheck> {
        let mut finalizers = FinalizerSet::of(&hc);
        if !finalizers.insert(FINALIZER) { return Ok(hc); }
        let updated = self.store.replace_finalizers(&hc, &finalizers).await.map_err(Error::Store)?;
        info!("finalizer.added");
        Ok(updated)
    }

    /// Teardown then release. On failure the marker stays so the next pass retries.
    async fn finalize(&self, hc: HealthCheck) -> Result<Outcome> {
        let status = hc.status.clone().unwrap_or_default();
        let derived_alarm = identity::alarm_name(&identity::resource_name(&hc.spec.name_prefix, &hc.name_any()));
        if let Err(e) = finalizer::teardown(&self.providers, &status, &derived_alarm).await {
            TEARDOWN_TOTAL.with_label_values(&["error"]).inc();
            warn!(error=%e, "teardown.failed");
            return Err(e);
        }
        TEARDOWN_TOTAL.with_label_values(&["ok"]).inc();
        self.events.publish(&hc, EngineEvent::cleaned_up("external health check and alarm removed")).await;
        let mut finalizers = FinalizerSet::of(&hc);
        finalizers.remove(FINALIZER);
        self.store.replace_finalizers(&hc, &finalizers).await.map_err(Error::Store)?;
        info!(health_check_id=%status.health_check_id, alarm=%status.alarm_name, "finalizer.removed");
        Ok(Outcome::Released)
    }
}
