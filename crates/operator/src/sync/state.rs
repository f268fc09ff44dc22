use crate::error::{Error, Result};
use crate::providers::AlarmProvider;

/// Current state of the named alarm, or "" when there is no such alarm.
pub async fn read_alarm_state(provider: &dyn AlarmProvider, alarm_name: &str) -> Result<String> {
    if alarm_name.is_empty() { return Ok(String::new()); }
    let state = provider.describe(alarm_name).await.map_err(Error::Alarm)?;
    Ok(state.map(|s| s.as_str().to_string()).unwrap_or_default())
}
