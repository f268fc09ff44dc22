use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fmt, fs, net::SocketAddr, path::PathBuf, str::FromStr};
use tracing::debug;

const DEFAULT_METRICS_ADDR: &str = "0.0.0.0:9090";
const DEFAULT_REPORTER: &str = "dns-healthcheck-operator";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderMode { #[default] Mock, Aws }

impl FromStr for ProviderMode {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mock" | "memory" => Ok(Self::Mock),
            "aws" => Ok(Self::Aws),
            other => anyhow::bail!("unknown provider mode {other:?} (expected mock|aws)"),
        }
    }
}

impl fmt::Display for ProviderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(match self { Self::Mock => "mock", Self::Aws => "aws" }) }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    pub provider: Option<String>,
    pub region: Option<String>,
    pub namespace: Option<String>,
    pub metrics_addr: Option<String>,
    pub reporter: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OperatorConfig {
    pub provider: ProviderMode,
    pub region: Option<String>,
    /// None watches every namespace.
    pub namespace: Option<String>,
    pub metrics_addr: SocketAddr,
    pub reporter: String,
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self {
            provider: ProviderMode::Mock,
            region: None,
            namespace: None,
            metrics_addr: DEFAULT_METRICS_ADDR.parse().unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], 9090))),
            reporter: DEFAULT_REPORTER.into(),
        }
    }
}

impl OperatorConfig {
    /// File first, then HC_* / AWS_REGION environment overrides.
    pub fn load() -> Result<Self> {
        let path = config_file_path();
        debug!(path=?path, exists=path.exists(), "config.load.attempt");
        let file_cfg: FileConfig = if path.exists() {
            let content = fs::read_to_string(&path).with_context(|| format!("failed to read config {path:?}"))?;
            toml::from_str(&content).with_context(|| format!("failed to parse config {path:?}"))?
        } else { FileConfig::default() };
        let env = |k: &str| std::env::var(k).ok().filter(|v| !v.is_empty());
        let defaults = Self::default();
        let provider = match env("HC_PROVIDER_MODE").or(file_cfg.provider) {
            Some(p) => p.parse()?,
            None => defaults.provider,
        };
        let metrics_addr = match env("HC_METRICS_ADDR").or(file_cfg.metrics_addr) {
            Some(a) => a.parse().with_context(|| format!("invalid metrics address {a:?}"))?,
            None => defaults.metrics_addr,
        };
        let cfg = Self {
            provider,
            region: env("AWS_REGION").or(file_cfg.region),
            namespace: env("HC_WATCH_NAMESPACE").or(file_cfg.namespace).filter(|n| !n.is_empty()),
            metrics_addr,
            reporter: env("HC_REPORTER").or(file_cfg.reporter).unwrap_or(defaults.reporter),
        };
        debug!(provider=%cfg.provider, namespace=?cfg.namespace, "config.loaded");
        Ok(cfg)
    }
}

pub fn config_dir() -> PathBuf { dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join("dns-healthcheck-operator") }

pub fn config_file_path() -> PathBuf {
    match std::env::var("HC_OPERATOR_CONFIG") {
        Ok(p) if !p.is_empty() => PathBuf::from(p),
        _ => config_dir().join("config.toml"),
    }
}
