use thiserror::Error;

/// Caller references longer than this are rejected by the probe provider.
pub const MAX_CALLER_REFERENCE_LEN: usize = 32;

#[derive(Error, Debug)]
pub enum Error {
    #[error("object {0} has no uid assigned")]
    MissingUid(String),
    #[error("caller reference {token:?} is {len} characters, provider limit is {MAX_CALLER_REFERENCE_LEN}")]
    TokenTooLong { token: String, len: usize },
    #[error("probe provider: {0:#}")]
    Probe(#[source] anyhow::Error),
    #[error("alarm provider: {0:#}")]
    Alarm(#[source] anyhow::Error),
    #[error("declaration store: {0:#}")]
    Store(#[source] anyhow::Error),
}

impl Error {
    /// Permanent errors will not clear up by waiting; they need a change to the declaration.
    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::MissingUid(_) | Self::TokenTooLong { .. })
    }

    /// Short machine-friendly label used for metrics and event reasons.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingUid(_) => "missing_uid",
            Self::TokenTooLong { .. } => "token_too_long",
            Self::Probe(_) => "probe",
            Self::Alarm(_) => "alarm",
            Self::Store(_) => "store",
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_validation_errors_are_permanent() {
        assert!(Error::MissingUid("ns/a".into()).is_permanent());
        assert!(Error::TokenTooLong { token: "x".repeat(33), len: 33 }.is_permanent());
        assert!(!Error::Probe(anyhow::anyhow!("throttled")).is_permanent());
        assert!(!Error::Store(anyhow::anyhow!("conflict")).is_permanent());
    }

    #[test]
    fn provider_error_message_keeps_cause() {
        let e = Error::Alarm(anyhow::anyhow!("access denied").context("put alarm"));
        assert_eq!(e.to_string(), "alarm provider: put alarm: access denied");
    }
}
