use anyhow::Context;
use async_trait::async_trait;
use kube::{api::{Patch, PatchParams}, Api, Client, ResourceExt};
use serde_json::json;

use super::{DeclarationStore, ObjectKey};
use crate::crd::{HealthCheck, HealthCheckStatus};
use crate::finalizer::FinalizerSet;

/// Declarations stored in the Kubernetes API server. Merge patches include
/// `metadata.resourceVersion`, which makes the server reject stale writes with 409.
#[derive(Clone)]
pub struct ClusterStore { client: Client }

impl ClusterStore {
    pub fn new(client: Client) -> Self { Self { client } }

    fn api(&self, namespace: &str) -> Api<HealthCheck> { Api::namespaced(self.client.clone(), namespace) }

    fn api_for(&self, hc: &HealthCheck) -> Api<HealthCheck> { self.api(&hc.namespace().unwrap_or_default()) }
}

impl std::fmt::Debug for ClusterStore { fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.debug_struct("ClusterStore").finish() } }

#[async_trait]
impl DeclarationStore for ClusterStore {
    async fn get(&self, key: &ObjectKey) -> anyhow::Result<Option<HealthCheck>> {
        self.api(&key.namespace).get_opt(&key.name).await.with_context(|| format!("get {key}"))
    }

    async fn replace_finalizers(&self, hc: &HealthCheck, finalizers: &FinalizerSet) -> anyhow::Result<HealthCheck> {
        let patch = json!({
            "metadata": {
                "resourceVersion": hc.resource_version(),
                "finalizers": finalizers.as_slice(),
            }
        });
        self.api_for(hc)
            .patch(&hc.name_any(), &PatchParams::default(), &Patch::Merge(&patch))
            .await
            .with_context(|| format!("update finalizers of {}", ObjectKey::of(hc)))
    }

    async fn replace_status(&self, hc: &HealthCheck, status: &HealthCheckStatus) -> anyhow::Result<()> {
        let patch = json!({
            "metadata": { "resourceVersion": hc.resource_version() },
            "status": status,
        });
        self.api_for(hc)
            .patch_status(&hc.name_any(), &PatchParams::default(), &Patch::Merge(&patch))
            .await
            .with_context(|| format!("update status of {}", ObjectKey::of(hc)))?;
        Ok(())
    }
}
