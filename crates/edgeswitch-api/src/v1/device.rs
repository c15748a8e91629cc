// Device information and counters

use tracing::debug;

use crate::error::Error;
use crate::response::Body;
use crate::v1::client::{Session, referer};

impl Session {
    /// Get device information (model, firmware, uptime, ...).
    ///
    /// `GET api/v1.0/device`
    ///
    /// Returns loosely-typed JSON because the field set varies by model
    /// and firmware version.
    pub async fn device_info(&self) -> Result<Body, Error> {
        debug!("getting device information");
        self.get("device", referer::ROOT).await
    }

    /// Get per-port traffic statistics.
    ///
    /// `GET api/v1.0/statistics`
    pub async fn statistics(&self) -> Result<Body, Error> {
        debug!("getting statistics");
        self.get("statistics", referer::ROOT).await
    }
}
