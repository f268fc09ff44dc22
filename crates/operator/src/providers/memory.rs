//! In-memory stand-in for both cloud services. Backs the `mock` provider mode and the tests.
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

use super::{AlarmProvider, AlarmRequest, AlarmState, ProbeProvider, ProbeRequest};

/// One provider call, recorded in the order it was made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateProbe(String),
    TagProbe { id: String, name: String },
    DeleteProbe(String),
    PutAlarm(String),
    DescribeAlarm(String),
    DeleteAlarm(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredProbe { pub request: ProbeRequest, pub name_tag: Option<String> }

#[derive(Debug, Clone, PartialEq)]
pub struct StoredAlarm { pub request: AlarmRequest, pub state: AlarmState }

#[derive(Debug, Default)]
struct Inner {
    next_id: u64,
    by_reference: HashMap<String, String>,
    probes: HashMap<String, StoredProbe>,
    alarms: HashMap<String, StoredAlarm>,
    calls: Vec<Call>,
    fail: HashMap<&'static str, String>,
}

#[derive(Debug, Default)]
pub struct MemoryCloud { inner: Mutex<Inner> }

impl MemoryCloud {
    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Make every call of `op` ("create", "tag", "delete_probe", "put", "describe",
    /// "delete_alarm") fail with `message` until cleared.
    pub fn fail(&self, op: &'static str, message: impl Into<String>) { self.lock().fail.insert(op, message.into()); }
    pub fn clear_failures(&self) { self.lock().fail.clear(); }

    pub fn calls(&self) -> Vec<Call> { self.lock().calls.clone() }
    pub fn clear_calls(&self) { self.lock().calls.clear(); }

    pub fn probe(&self, id: &str) -> Option<StoredProbe> { self.lock().probes.get(id).cloned() }
    pub fn probe_count(&self) -> usize { self.lock().probes.len() }
    pub fn alarm(&self, name: &str) -> Option<StoredAlarm> { self.lock().alarms.get(name).cloned() }
    pub fn alarm_count(&self) -> usize { self.lock().alarms.len() }

    /// Simulates the metric service evaluating an alarm.
    pub fn set_alarm_state(&self, name: &str, state: AlarmState) {
        if let Some(a) = self.lock().alarms.get_mut(name) { a.state = state; }
    }

    /// Simulates an out-of-band edit of the probe's name tag.
    pub fn set_name_tag(&self, id: &str, name: &str) {
        if let Some(p) = self.lock().probes.get_mut(id) { p.name_tag = Some(name.to_string()); }
    }

    fn begin(&self, op: &'static str, call: Call) -> anyhow::Result<std::sync::MutexGuard<'_, Inner>> {
        let mut g = self.lock();
        g.calls.push(call);
        if let Some(msg) = g.fail.get(op) { anyhow::bail!("{op}: {msg}"); }
        Ok(g)
    }
}

#[async_trait]
impl ProbeProvider for MemoryCloud {
    async fn create(&self, req: &ProbeRequest) -> anyhow::Result<String> {
        let mut g = self.begin("create", Call::CreateProbe(req.caller_reference.clone()))?;
        if let Some(id) = g.by_reference.get(&req.caller_reference).cloned() {
            // same reference with different settings is rejected upstream
            if g.probes.get(&id).is_some_and(|p| p.request != *req) {
                anyhow::bail!("health check with caller reference {} already exists with different settings", req.caller_reference);
            }
            debug!(%id, "memory.probe.matched");
            return Ok(id);
        }
        g.next_id += 1;
        let id = format!("{:08x}-0000-4000-8000-{:012x}", g.next_id, g.next_id);
        g.by_reference.insert(req.caller_reference.clone(), id.clone());
        g.probes.insert(id.clone(), StoredProbe { request: req.clone(), name_tag: None });
        debug!(%id, "memory.probe.created");
        Ok(id)
    }

    async fn tag(&self, probe_id: &str, name: &str) -> anyhow::Result<()> {
        let mut g = self.begin("tag", Call::TagProbe { id: probe_id.into(), name: name.into() })?;
        let probe = g.probes.get_mut(probe_id).ok_or_else(|| anyhow::anyhow!("no such health check {probe_id}"))?;
        probe.name_tag = Some(name.to_string());
        Ok(())
    }

    async fn delete(&self, probe_id: &str) -> anyhow::Result<()> {
        let mut g = self.begin("delete_probe", Call::DeleteProbe(probe_id.into()))?;
        if let Some(alarm) = g.alarms.values().find(|a| a.request.dimension.value == probe_id) {
            anyhow::bail!("health check {probe_id} is in use by alarm {}", alarm.request.name);
        }
        g.probes.remove(probe_id);
        g.by_reference.retain(|_, id| id != probe_id);
        Ok(())
    }
}

#[async_trait]
impl AlarmProvider for MemoryCloud {
    async fn put(&self, req: &AlarmRequest) -> anyhow::Result<()> {
        let mut g = self.begin("put", Call::PutAlarm(req.name.clone()))?;
        let state = g.alarms.get(&req.name).map(|a| a.state).unwrap_or(AlarmState::InsufficientData);
        g.alarms.insert(req.name.clone(), StoredAlarm { request: req.clone(), state });
        Ok(())
    }

    async fn describe(&self, name: &str) -> anyhow::Result<Option<AlarmState>> {
        let g = self.begin("describe", Call::DescribeAlarm(name.into()))?;
        Ok(g.alarms.get(name).map(|a| a.state))
    }

    async fn delete(&self, name: &str) -> anyhow::Result<()> {
        let mut g = self.begin("delete_alarm", Call::DeleteAlarm(name.into()))?;
        g.alarms.remove(name);
        Ok(())
    }
}
