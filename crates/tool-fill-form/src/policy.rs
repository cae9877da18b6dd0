use action_primitives::WaitOptions;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FillPolicy {
    /// Bound on the HTML snapshot attached to field errors
    pub snapshot_max_len: usize,
    pub locate_timeout_ms: u64,
    pub poll_interval_ms: u64,
    /// Type `/` in textareas through script injection instead of key events
    pub slash_safe_textarea: bool,
    pub submit_delay_ms: u64,
}

impl FillPolicy {
    pub fn wait_options(&self) -> WaitOptions {
        WaitOptions::new(
            Duration::from_millis(self.locate_timeout_ms),
            Duration::from_millis(self.poll_interval_ms),
        )
    }

    pub fn submit_delay(&self) -> Duration {
        Duration::from_millis(self.submit_delay_ms)
    }
}

impl Default for FillPolicy {
    fn default() -> Self {
        Self {
            snapshot_max_len: 100,
            locate_timeout_ms: 10_000,
            poll_interval_ms: 250,
            slash_safe_textarea: true,
            submit_delay_ms: 0,
        }
    }
}
