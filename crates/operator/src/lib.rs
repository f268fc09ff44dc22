pub mod config;
pub mod controller;
pub mod crd;
pub mod error;
pub mod events;
pub mod finalizer;
pub mod identity;
pub mod logging;
pub mod providers;
pub mod reconciler;
pub mod status;
pub mod store;
pub mod sync;
pub mod telemetry;

// Re-export commonly used symbols for convenience in binaries/tests.
pub use crd::{HealthCheck, HealthCheckSpec, HealthCheckStatus};
pub use error::Error;
pub use reconciler::{Engine, Outcome};
