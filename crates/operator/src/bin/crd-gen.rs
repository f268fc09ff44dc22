use dns_healthcheck_operator::HealthCheck;
use kube::CustomResourceExt;

fn main() -> anyhow::Result<()> {
    let yaml = serde_yaml::to_string(&HealthCheck::crd())?;
    println!("{yaml}");
    Ok(())
}
