use tracing::debug;

use crate::crd::HealthCheckSpec;
use crate::error::{Error, Result};
use crate::providers::{ProbeProvider, ProbeRequest};

pub fn probe_request(spec: &HealthCheckSpec, caller_reference: &str) -> ProbeRequest {
    ProbeRequest {
        caller_reference: caller_reference.to_string(),
        probe_type: spec.probe_type.clone(),
        domain: spec.domain.clone(),
        port: spec.port,
        resource_path: spec.resource_path.clone(),
        disabled: spec.disabled,
        enable_sni: true,
    }
}

/// Create-or-match the probe for `caller_reference`, then (re)apply its Name tag.
/// The tag is written every pass so out-of-band edits are undone.
pub async fn sync_probe(provider: &dyn ProbeProvider, spec: &HealthCheckSpec, caller_reference: &str, resource_name: &str) -> Result<String> {
    let id = provider.create(&probe_request(spec, caller_reference)).await.map_err(Error::Probe)?;
    provider.tag(&id, resource_name).await.map_err(Error::Probe)?;
    debug!(health_check_id=%id, name=%resource_name, "probe.synced");
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::memory::{Call, MemoryCloud};

    fn spec() -> HealthCheckSpec {
        HealthCheckSpec {
            name_prefix: "shop".into(), domain: "shop.example.com".into(), probe_type: "HTTPS".into(), port: 443,
            resource_path: "/healthz".into(), disabled: false, alarm_disabled: false, alarm_actions: vec![], ok_actions: vec![],
        }
    }

    #[tokio::test]
    async fn repeated_sync_returns_same_id() {
        let cloud = MemoryCloud::default();
        let a = sync_probe(&cloud, &spec(), "abc123", "shop-web").await.unwrap();
        let b = sync_probe(&cloud, &spec(), "abc123", "shop-web").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(cloud.probe_count(), 1);
        let stored = cloud.probe(&a).unwrap();
        assert!(stored.request.enable_sni);
        assert_eq!(stored.request.resource_path, "/healthz");
        assert_eq!(stored.name_tag.as_deref(), Some("shop-web"));
    }

    #[tokio::test]
    async fn tag_reapplied_every_pass() {
        let cloud = MemoryCloud::default();
        let id = sync_probe(&cloud, &spec(), "abc123", "shop-web").await.unwrap();
        cloud.set_name_tag(&id, "edited-by-hand");
        sync_probe(&cloud, &spec(), "abc123", "shop-web").await.unwrap();
        assert_eq!(cloud.probe(&id).unwrap().name_tag.as_deref(), Some("shop-web"));
        let tags = cloud.calls().into_iter().filter(|c| matches!(c, Call::TagProbe { .. })).count();
        assert_eq!(tags, 2);
    }

    #[tokio::test]
    async fn provider_errors_pass_through() {
        let cloud = MemoryCloud::default();
        cloud.fail("create", "Throttling: rate exceeded");
        let err = sync_probe(&cloud, &spec(), "abc123", "shop-web").await.unwrap_err();
        assert!(matches!(err, Error::Probe(_)));
        assert!(err.to_string().contains("rate exceeded"));
        assert!(!err.is_permanent());
        // no tag attempt after a failed create
        assert_eq!(cloud.calls(), vec![Call::CreateProbe("abc123".into())]);
    }
}
