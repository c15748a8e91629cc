// System endpoints
//
// Reboot, firmware upgrade, configuration backup and restore.

use std::path::{Path, PathBuf};

use chrono::Utc;
use reqwest::Method;
use serde_json::json;
use tracing::debug;

use crate::error::Error;
use crate::response::Body;
use crate::v1::client::{Payload, Session, referer};
use crate::v1::operation::{CONFIG_RESTORE, FIRMWARE_UPGRADE, command_status};

const BACKUP_PREFIX: &str = "ubnt_edgeswitch_";

impl Session {
    /// Reboot the switch.
    ///
    /// `POST api/v1.0/system/reboot`. The device confirms with
    /// `statusCode: 200`; anything else is `Error::CommandRejected`.
    pub async fn reboot(&self) -> Result<Body, Error> {
        debug!("rebooting the switch");
        let body = self
            .post_json("system/reboot", referer::SETTINGS, &json!({}))
            .await?;
        let status = command_status(&body);
        if status.accepted() {
            Ok(body)
        } else {
            Err(Error::CommandRejected {
                status_code: status.status_code,
                detail: status.detail_or_default(),
            })
        }
    }

    /// Upload a firmware image and wait for the upgrade to finish.
    ///
    /// `POST api/v1.0/system/upgrade/direct`, then polls
    /// `GET api/v1.0/system/upgrade`. The switch still has to be rebooted
    /// to boot the new image.
    pub async fn upgrade_firmware(&self, firmware: impl AsRef<Path>) -> Result<Body, Error> {
        debug!(firmware = %firmware.as_ref().display(), "upgrading firmware");
        self.run_operation(FIRMWARE_UPGRADE, firmware.as_ref()).await
    }

    /// Upload a configuration backup and wait for the restore to finish.
    ///
    /// `POST api/v1.0/system/backup/restore/direct`, then polls
    /// `GET api/v1.0/system/backup/restore`.
    pub async fn restore(&self, backup: impl AsRef<Path>) -> Result<Body, Error> {
        debug!(backup = %backup.as_ref().display(), "restoring configuration");
        self.run_operation(CONFIG_RESTORE, backup.as_ref()).await
    }

    /// Download the running configuration into `dir`.
    ///
    /// `GET api/v1.0/system/backup`. The body is written exactly as received;
    /// the content type only picks the file name. Returns the written path.
    pub async fn backup(&self, dir: impl AsRef<Path>) -> Result<PathBuf, Error> {
        debug!("backing up the switch");
        let reply = self
            .request(Method::GET, "system/backup", referer::SETTINGS, Payload::None)
            .await?;
        if !reply.is_ok() {
            return Err(reply.into_error());
        }

        let name = backup_file_name(reply.content_type(), Utc::now().timestamp());
        let path = dir.as_ref().join(name);
        tokio::fs::write(&path, &reply.raw)
            .await
            .map_err(|e| Error::io(&path, e))?;

        debug!(path = %path.display(), "backup written");
        Ok(path)
    }
}

/// `ubnt_edgeswitch_<timestamp>`, with `.tar.gz` when the switch declared
/// a gzip body.
pub fn backup_file_name(content_type: Option<&str>, timestamp: i64) -> String {
    let gzip = content_type.is_some_and(|ct| ct.contains("application/gzip"));
    if gzip {
        format!("{BACKUP_PREFIX}{timestamp}.tar.gz")
    } else {
        format!("{BACKUP_PREFIX}{timestamp}")
    }
}
