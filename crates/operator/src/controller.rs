//! Glue between kube-runtime's work queue and the engine.
use futures_util::StreamExt;
use kube::{Api, Client, ResourceExt};
use kube_runtime::controller::{Action, Controller};
use kube_runtime::watcher;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::OperatorConfig;
use crate::crd::HealthCheck;
use crate::error::Error;
use crate::events::RecorderEvents;
use crate::providers::Providers;
use crate::reconciler::{Engine, Outcome, RESYNC_INTERVAL};
use crate::store::{ClusterStore, ObjectKey};

const TRANSIENT_RETRY: Duration = Duration::from_secs(15);
const PERMANENT_RETRY: Duration = Duration::from_secs(300);

pub struct Context { pub engine: Engine }

/// What the host should do after a pass.
pub fn action_for(outcome: &Outcome) -> Action {
    match outcome {
        Outcome::Synced { .. } => Action::requeue(RESYNC_INTERVAL),
        Outcome::Released | Outcome::Missing => Action::await_change(),
    }
}

pub fn retry_delay(err: &Error) -> Duration {
    if err.is_permanent() { PERMANENT_RETRY } else { TRANSIENT_RETRY }
}

async fn reconcile(obj: Arc<HealthCheck>, ctx: Arc<Context>) -> Result<Action, Error> {
    let key = ObjectKey::new(obj.namespace().unwrap_or_default(), obj.name_any());
    let outcome = ctx.engine.reconcile(&key).await?;
    Ok(action_for(&outcome))
}

fn error_policy(obj: Arc<HealthCheck>, err: &Error, _ctx: Arc<Context>) -> Action {
    let delay = retry_delay(err);
    warn!(object=%ObjectKey::of(&obj), error=%err, permanent=err.is_permanent(), retry_secs=delay.as_secs(), "reconcile.failed");
    Action::requeue(delay)
}

/// Run the controller until the process receives a shutdown signal.
pub async fn run(client: Client, cfg: &OperatorConfig, providers: Providers) -> anyhow::Result<()> {
    let api: Api<HealthCheck> = match &cfg.namespace {
        Some(ns) => Api::namespaced(client.clone(), ns),
        None => Api::all(client.clone()),
    };
    let engine = Engine::new(
        providers,
        Arc::new(ClusterStore::new(client.clone())),
        Arc::new(RecorderEvents::new(client, &cfg.reporter)),
    );
    info!(namespace=?cfg.namespace, "controller.starting");
    Controller::new(api, watcher::Config::default())
        .shutdown_on_signal()
        .run(reconcile, error_policy, Arc::new(Context { engine }))
        .for_each(|res| async move {
            match res {
                Ok((obj, _)) => debug!(object=%obj.name, "controller.reconciled"),
                Err(e) => debug!(error=%e, "controller.reconcile_error"),
            }
        })
        .await;
    info!("controller.stopped");
    Ok(())
}
