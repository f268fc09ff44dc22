use clap::Parser;
use dns_healthcheck_operator::{
    config::{OperatorConfig, ProviderMode},
    controller,
    logging::{init_logging, LogFormat},
    providers::Providers,
    telemetry,
};
use kube::Client;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "dns-healthcheck-operator", version, about = "Keeps Route53 health checks and CloudWatch alarms in line with HealthCheck resources")]
struct Cli {
    /// trace|debug|info|warn|error (RUST_LOG takes precedence)
    #[arg(long, default_value = "info")]
    log_level: String,
    #[arg(long, value_enum, default_value = "text")]
    log_format: LogFormat,
    /// Watch a single namespace instead of the whole cluster
    #[arg(long)]
    namespace: Option<String>,
    /// Provider backend: mock|aws
    #[arg(long)]
    provider: Option<ProviderMode>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, &cli.log_format)?;
    let mut cfg = OperatorConfig::load()?;
    if let Some(ns) = cli.namespace { cfg.namespace = Some(ns); }
    if let Some(p) = cli.provider { cfg.provider = p; }
    info!(provider=%cfg.provider, namespace=?cfg.namespace, "operator starting");

    let providers = Providers::from_config(&cfg).await?;
    let client = Client::try_default().await?;
    let metrics_addr = cfg.metrics_addr;
    tokio::spawn(async move {
        if let Err(e) = telemetry::serve(metrics_addr).await { warn!(error=%e, "metrics server stopped"); }
    });
    controller::run(client, &cfg, providers).await
}
