// Port configuration

use serde_json::Value;
use tracing::debug;

use crate::error::Error;
use crate::response::Body;
use crate::v1::client::{Session, referer};

impl Session {
    /// List interface (port profile) configuration.
    ///
    /// `GET api/v1.0/interfaces`
    pub async fn interfaces(&self) -> Result<Body, Error> {
        debug!("listing interfaces");
        self.get("interfaces", referer::ROOT).await
    }

    /// Replace interface configuration.
    ///
    /// `PUT api/v1.0/interfaces`. `config` is typically the array returned
    /// by [`interfaces`](Self::interfaces) with the desired fields edited.
    pub async fn set_interfaces(&self, config: &Value) -> Result<Body, Error> {
        debug!("updating interfaces");
        self.put_json("interfaces", referer::ROOT, config).await
    }
}
