//! One synchronization pass against the external services: probe, then alarm, then observed state.
pub mod alarm;
pub mod probe;
pub mod state;

pub use alarm::{alarm_request, sync_alarm};
pub use probe::{probe_request, sync_probe};
pub use state::read_alarm_state;
