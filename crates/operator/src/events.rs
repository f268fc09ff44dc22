use async_trait::async_trait;
use kube::{Client, Resource};
use kube_runtime::events::{Event, EventType, Recorder, Reporter};
use std::sync::Mutex;
use tracing::warn;

use crate::crd::HealthCheck;
use crate::store::ObjectKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind { Normal, Warning }

/// Something worth telling the object's owner about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineEvent {
    pub kind: EventKind,
    pub reason: &'static str,
    pub action: &'static str,
    pub note: String,
}

impl EngineEvent {
    pub fn status_changed(diff: impl Into<String>) -> Self {
        Self { kind: EventKind::Normal, reason: "StatusChanged", action: "Sync", note: diff.into() }
    }
    pub fn sync_failed(note: impl Into<String>) -> Self {
        Self { kind: EventKind::Warning, reason: "SyncFailed", action: "Sync", note: note.into() }
    }
    pub fn cleaned_up(note: impl Into<String>) -> Self {
        Self { kind: EventKind::Normal, reason: "CleanedUp", action: "Finalize", note: note.into() }
    }
}

/// Best effort: a failed publish is logged and never fails the pass.
#[async_trait]
pub trait EventSink: Send + Sync + 'static {
    async fn publish(&self, hc: &HealthCheck, event: EngineEvent);
}

/// Publishes Kubernetes Events referencing the HealthCheck.
pub struct RecorderEvents { recorder: Recorder }

impl RecorderEvents {
    pub fn new(client: Client, reporter: &str) -> Self {
        let reporter = Reporter { controller: reporter.to_string(), instance: std::env::var("POD_NAME").ok() };
        Self { recorder: Recorder::new(client, reporter) }
    }
}

#[async_trait]
impl EventSink for RecorderEvents {
    async fn publish(&self, hc: &HealthCheck, event: EngineEvent) {
        let reference = hc.object_ref(&());
        let ev = Event {
            type_: match event.kind { EventKind::Normal => EventType::Normal, EventKind::Warning => EventType::Warning },
            reason: event.reason.into(),
            note: Some(event.note),
            action: event.action.into(),
            secondary: None,
        };
        if let Err(e) = self.recorder.publish(&ev, &reference).await {
            warn!(error=%e, object=%ObjectKey::of(hc), reason=event.reason, "event.publish_failed");
        }
    }
}

/// Keeps events in memory for assertions in tests.
#[derive(Debug, Default)]
pub struct MemoryEvents { events: Mutex<Vec<(ObjectKey, EngineEvent)>> }

impl MemoryEvents {
    pub fn events(&self) -> Vec<(ObjectKey, EngineEvent)> {
        self.events.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }
    pub fn reasons(&self) -> Vec<&'static str> { self.events().into_iter().map(|(_, e)| e.reason).collect() }
}

#[async_trait]
impl EventSink for MemoryEvents {
    async fn publish(&self, hc: &HealthCheck, event: EngineEvent) {
        self.events.lock().unwrap_or_else(|p| p.into_inner()).push((ObjectKey::of(hc), event));
    }
}
