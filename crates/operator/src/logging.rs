//! Subscriber setup for the operator process. `RUST_LOG` wins over `--log-level` when set.
use anyhow::Result;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Client-side crates that log every watch event and HTTP round trip at debug.
const QUIET_DEPENDENCIES: &[&str] = &["kube_client", "kube_runtime", "hyper", "hyper_util", "tower", "aws_smithy_runtime"];

#[derive(clap::ValueEnum, Clone, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// One compact line per event, for terminals.
    #[default]
    Text,
    /// One JSON object per event carrying the reconcile span's namespace and name.
    Json,
}

/// Directives for `level`, keeping the kube and HTTP client crates at warn unless asked for trace.
pub fn filter_directives(level: &str) -> String {
    if level.eq_ignore_ascii_case("trace") { return level.to_string(); }
    QUIET_DEPENDENCIES.iter().fold(level.to_string(), |acc, dep| format!("{acc},{dep}=warn"))
}

pub fn init_logging(level: &str, format: &LogFormat) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => EnvFilter::try_new(filter_directives(level))?,
    };
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(true).with_span_list(false).with_writer(std::io::stderr))
            .try_init()?,
        LogFormat::Text => registry
            .with(fmt::layer().compact().with_target(false).with_writer(std::io::stderr))
            .try_init()?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dependencies_are_quieted_below_trace() {
        let d = filter_directives("debug");
        assert!(d.starts_with("debug,"));
        assert!(d.contains("kube_runtime=warn"));
        assert!(d.contains("hyper=warn"));
        assert_eq!(filter_directives("trace"), "trace");
    }

    #[test]
    fn directives_parse() {
        assert!(EnvFilter::try_new(filter_directives("info")).is_ok());
    }
}
