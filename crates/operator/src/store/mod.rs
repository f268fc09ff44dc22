//! Access to persisted declarations. Every write carries the resourceVersion of the object it was
//! computed from and fails if the object changed since it was read.
use async_trait::async_trait;
use kube::ResourceExt;
use std::fmt;

use crate::crd::{HealthCheck, HealthCheckStatus};
use crate::finalizer::FinalizerSet;

mod cluster;
pub mod memory;

pub use cluster::ClusterStore;
pub use memory::MemoryStore;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey { pub namespace: String, pub name: String }

impl ObjectKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self { namespace: namespace.into(), name: name.into() }
    }
    pub fn of(hc: &HealthCheck) -> Self { Self::new(hc.namespace().unwrap_or_default(), hc.name_any()) }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}/{}", self.namespace, self.name) }
}

#[async_trait]
pub trait DeclarationStore: Send + Sync + 'static {
    /// Ok(None) when the object does not exist (anymore).
    async fn get(&self, key: &ObjectKey) -> anyhow::Result<Option<HealthCheck>>;
    /// Replace the object's finalizer list; returns the updated object.
    async fn replace_finalizers(&self, hc: &HealthCheck, finalizers: &FinalizerSet) -> anyhow::Result<HealthCheck>;
    /// Overwrite the status sub-resource as a whole.
    async fn replace_status(&self, hc: &HealthCheck, status: &HealthCheckStatus) -> anyhow::Result<()>;
}
