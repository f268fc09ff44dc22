use async_trait::async_trait;
use kube::ResourceExt;
use std::collections::BTreeMap;
use std::sync::Mutex;

use super::{DeclarationStore, ObjectKey};
use crate::crd::{HealthCheck, HealthCheckSpec, HealthCheckStatus};
use crate::finalizer::FinalizerSet;

#[derive(Debug, Default)]
struct Inner {
    objects: BTreeMap<ObjectKey, HealthCheck>,
    version: u64,
    writes: usize,
}

/// In-process object store with API-server semantics for the parts the engine relies on:
/// uid assignment, resourceVersion conflicts, and erasure once a deleted object has no finalizers.
#[derive(Debug, Default)]
pub struct MemoryStore { inner: Mutex<Inner> }

impl MemoryStore {
    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Create an object. A uid is assigned unless the caller already set one.
    pub fn create(&self, mut hc: HealthCheck) -> HealthCheck {
        let mut g = self.lock();
        g.version += 1;
        if hc.metadata.namespace.is_none() { hc.metadata.namespace = Some("default".into()); }
        if hc.metadata.uid.is_none() { hc.metadata.uid = Some(uuid::Uuid::new_v4().to_string()); }
        hc.metadata.resource_version = Some(g.version.to_string());
        g.objects.insert(ObjectKey::of(&hc), hc.clone());
        hc
    }

    /// Edit the spec the way a user would with `kubectl apply`.
    pub fn update_spec(&self, key: &ObjectKey, edit: impl FnOnce(&mut HealthCheckSpec)) {
        let mut g = self.lock();
        g.version += 1;
        let version = g.version.to_string();
        if let Some(hc) = g.objects.get_mut(key) {
            edit(&mut hc.spec);
            hc.metadata.resource_version = Some(version);
        }
    }

    /// Request deletion: erase immediately without finalizers, tombstone otherwise.
    pub fn delete(&self, key: &ObjectKey) {
        let mut g = self.lock();
        g.version += 1;
        let version = g.version.to_string();
        let Some(hc) = g.objects.get_mut(key) else { return };
        if hc.finalizers().is_empty() {
            g.objects.remove(key);
            return;
        }
        if hc.metadata.deletion_timestamp.is_none() {
            let now = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
            hc.metadata.deletion_timestamp = serde_json::from_value(serde_json::Value::String(now)).ok();
        }
        hc.metadata.resource_version = Some(version);
    }

    pub fn object(&self, key: &ObjectKey) -> Option<HealthCheck> { self.lock().objects.get(key).cloned() }

    /// Number of successful finalizer and status writes so far.
    pub fn writes(&self) -> usize { self.lock().writes }

    fn check_version(g: &Inner, hc: &HealthCheck) -> anyhow::Result<ObjectKey> {
        let key = ObjectKey::of(hc);
        let Some(current) = g.objects.get(&key) else { anyhow::bail!("{key} not found") };
        if current.resource_version() != hc.resource_version() {
            anyhow::bail!(
                "conflict: {key} was modified (have {:?}, stored {:?})",
                hc.resource_version(),
                current.resource_version()
            );
        }
        Ok(key)
    }
}

#[async_trait]
impl DeclarationStore for MemoryStore {
    async fn get(&self, key: &ObjectKey) -> anyhow::Result<Option<HealthCheck>> { Ok(self.object(key)) }

    async fn replace_finalizers(&self, hc: &HealthCheck, finalizers: &FinalizerSet) -> anyhow::Result<HealthCheck> {
        let mut g = self.lock();
        let key = Self::check_version(&g, hc)?;
        g.version += 1;
        g.writes += 1;
        let version = g.version.to_string();
        let mut updated = g.objects.get(&key).cloned().ok_or_else(|| anyhow::anyhow!("{key} not found"))?;
        updated.metadata.finalizers = Some(finalizers.as_slice().to_vec());
        updated.metadata.resource_version = Some(version);
        if updated.metadata.deletion_timestamp.is_some() && finalizers.is_empty() {
            g.objects.remove(&key);
        } else {
            g.objects.insert(key, updated.clone());
        }
        Ok(updated)
    }

    async fn replace_status(&self, hc: &HealthCheck, status: &HealthCheckStatus) -> anyhow::Result<()> {
        let mut g = self.lock();
        let key = Self::check_version(&g, hc)?;
        g.version += 1;
        g.writes += 1;
        let version = g.version.to_string();
        if let Some(stored) = g.objects.get_mut(&key) {
            stored.status = Some(status.clone());
            stored.metadata.resource_version = Some(version);
        }
        Ok(())
    }
}
