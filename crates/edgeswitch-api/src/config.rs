use std::time::Duration;

use url::Url;

use crate::auth::Credentials;
use crate::transport::TransportConfig;

/// Timing of the long-running operation poll loop and the ping tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Status checks before an upgrade/restore is declared timed out.
    pub max_attempts: u32,
    /// Delay between two status checks.
    pub interval: Duration,
    /// How long `ping` waits per requested packet before stopping the tool.
    pub ping_wait_per_packet: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            interval: Duration::from_secs(2),
            ping_wait_per_packet: Duration::from_secs(1),
        }
    }
}

/// Everything needed to open a session against one switch.
#[derive(Debug, Clone)]
pub struct SwitchConfig {
    /// Switch root URL, e.g. `https://10.0.0.3`.
    pub url: Url,
    pub credentials: Credentials,
    pub transport: TransportConfig,
    pub poll: PollSettings,
}
