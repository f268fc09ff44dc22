//! Naming and idempotency tokens derived from a declaration.
//!
//! Nothing here is stored: every pass recomputes names from the spec and metadata, so the
//! alarm suffix must never change for objects that were already synced.
use crate::crd::HealthCheck;
use crate::error::{Error, Result, MAX_CALLER_REFERENCE_LEN};
use kube::ResourceExt;

pub const ALARM_SUFFIX: &str = "-healthcheck";

/// Strip hyphens from the object's UID to build the probe provider's caller reference.
pub fn caller_reference(uid: &str) -> Result<String> {
    let token: String = uid.chars().filter(|c| *c != '-').collect();
    let len = token.chars().count();
    if len > MAX_CALLER_REFERENCE_LEN {
        return Err(Error::TokenTooLong { token, len });
    }
    Ok(token)
}

pub fn resource_name(prefix: &str, name: &str) -> String { format!("{prefix}-{name}") }

pub fn alarm_name(resource_name: &str) -> String { format!("{resource_name}{ALARM_SUFFIX}") }

/// All identifiers one sync pass needs for a declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub caller_reference: String,
    pub resource_name: String,
    pub alarm_name: String,
}

impl Identity {
    pub fn derive(hc: &HealthCheck) -> Result<Self> {
        let uid = hc.uid().ok_or_else(|| Error::MissingUid(object_label(hc)))?;
        let caller_reference = caller_reference(&uid)?;
        let resource_name = resource_name(&hc.spec.name_prefix, &hc.name_any());
        let alarm_name = alarm_name(&resource_name);
        Ok(Self { caller_reference, resource_name, alarm_name })
    }
}

pub(crate) fn object_label(hc: &HealthCheck) -> String {
    format!("{}/{}", hc.namespace().unwrap_or_default(), hc.name_any())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_hyphens_from_uuid() {
        let t = caller_reference("550e8400-e29b-41d4-a716-446655440000").unwrap();
        assert_eq!(t, "550e8400e29b41d4a716446655440000");
        assert_eq!(t.len(), 32);
    }

    #[test]
    fn token_is_deterministic_and_distinct() {
        let a = caller_reference("11111111-2222-3333-4444-555555555555").unwrap();
        let b = caller_reference("11111111-2222-3333-4444-555555555555").unwrap();
        let c = caller_reference("11111111-2222-3333-4444-555555555556").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn rejects_tokens_over_limit() {
        let err = caller_reference(&"a".repeat(33)).unwrap_err();
        assert!(matches!(err, Error::TokenTooLong { len: 33, .. }));
        assert!(err.is_permanent());
        // hyphens do not count towards the limit
        assert!(caller_reference(&format!("{}-", "a".repeat(32))).is_ok());
    }

    #[test]
    fn derived_names() {
        let r = resource_name("example-site.prod", "test");
        assert_eq!(r, "example-site.prod-test");
        assert_eq!(alarm_name(&r), "example-site.prod-test-healthcheck");
    }
}
