// Diagnostic tools: MAC table and ping
//
// The ping tool is stateful on the device: start it, let it run, stop it,
// then read the accumulated result. Stop is sent on every path once start
// has been attempted.

use std::time::Duration;

use serde_json::json;
use tracing::debug;

use crate::error::{Error, PingPhase};
use crate::response::Body;
use crate::v1::client::{Session, referer};
use crate::v1::models::PingRequest;

/// Packet size the web UI uses.
const PING_PACKET_SIZE: u32 = 56;

impl Session {
    /// Get the learned MAC address table.
    ///
    /// `GET api/v1.0/tools/mac-table`
    pub async fn mac_table(&self) -> Result<Body, Error> {
        debug!("getting MAC table");
        self.get("tools/mac-table", referer::MAC_TABLE).await
    }

    /// Ping `destination` from the switch, `count` packets one second apart.
    ///
    /// A stop failure takes precedence over a start failure; the result
    /// fetch only happens when both start and stop succeeded.
    pub async fn ping(&self, destination: &str, count: u32) -> Result<Body, Error> {
        debug!(destination, count, "starting ping");
        let request = PingRequest {
            count,
            interval: 1,
            packet_size: PING_PACKET_SIZE,
            destination,
        };
        let started = self
            .post_json("tools/ping/start", referer::PING, &request)
            .await;

        match &started {
            Ok(_) => {
                tokio::time::sleep(ping_wait(self.poll_settings().ping_wait_per_packet, count)).await;
            }
            Err(e) => debug!(error = %e, "failed to start ping"),
        }

        let stopped = self
            .post_json("tools/ping/stop", referer::PING, &json!({}))
            .await;
        if let Err(e) = stopped {
            debug!(error = %e, "failed to stop ping");
            return Err(ping_error(PingPhase::Stop, e));
        }
        if let Err(e) = started {
            return Err(ping_error(PingPhase::Start, e));
        }

        self.get("tools/ping", referer::PING).await.map_err(|e| {
            debug!(error = %e, "failed to retrieve ping result");
            ping_error(PingPhase::Fetch, e)
        })
    }
}

/// Time the tool needs for `count` packets.
fn ping_wait(per_packet: Duration, count: u32) -> Duration {
    per_packet.saturating_mul(count)
}

fn ping_error(phase: PingPhase, source: Error) -> Error {
    Error::Ping {
        phase,
        source: Box::new(source),
    }
}
