// Long-running device operations
//
// Firmware upgrade and configuration restore share one protocol: upload a
// file to a "direct" endpoint, then poll a status endpoint until it reports
// `finished` or the attempt budget runs out.

use std::path::Path;

use reqwest::Method;
use serde::Deserialize;
use tracing::{debug, error, warn};

use crate::error::Error;
use crate::response::Body;
use crate::v1::client::{FileUpload, Payload, Session, referer};
use crate::v1::models::{CommandStatus, OperationState, OperationStatus};

/// Endpoints and media type of one long-running operation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LongRunning {
    pub name: &'static str,
    pub transfer_path: &'static str,
    pub status_path: &'static str,
    pub media_type: &'static str,
}

pub(crate) const FIRMWARE_UPGRADE: LongRunning = LongRunning {
    name: "firmware upgrade",
    transfer_path: "system/upgrade/direct",
    status_path: "system/upgrade",
    media_type: "application/octet-stream",
};

pub(crate) const CONFIG_RESTORE: LongRunning = LongRunning {
    name: "configuration restore",
    transfer_path: "system/backup/restore/direct",
    status_path: "system/backup/restore",
    media_type: "application/x-gzip",
};

impl Session {
    /// Upload `file` and wait for the device to finish processing it.
    pub(crate) async fn run_operation(&self, op: LongRunning, file: &Path) -> Result<Body, Error> {
        let upload = FileUpload::from_path(file, op.media_type).await?;
        debug!(operation = op.name, file = %upload.file_name, "transferring file");
        self.transfer(op, upload).await?;
        debug!(operation = op.name, "waiting for the device to finish");
        self.poll_until_finished(op).await
    }

    /// Transfer phase. The device acknowledges with `statusCode: 200`.
    async fn transfer(&self, op: LongRunning, upload: FileUpload) -> Result<(), Error> {
        let body = self
            .request(
                Method::POST,
                op.transfer_path,
                referer::SETTINGS,
                Payload::File(upload),
            )
            .await?
            .into_result()?;

        let status = command_status(&body);
        if !status.accepted() {
            return Err(Error::UploadRejected {
                status_code: status.status_code,
                detail: status.detail_or_default(),
            });
        }

        debug!(operation = op.name, "transfer succeeded");
        Ok(())
    }

    /// Poll phase. Every status check, successful or not, uses one attempt.
    async fn poll_until_finished(&self, op: LongRunning) -> Result<Body, Error> {
        let settings = self.poll_settings();

        for attempt in 1..=settings.max_attempts {
            if attempt > 1 {
                tokio::time::sleep(settings.interval).await;
            }

            let reply = match self
                .request(Method::GET, op.status_path, referer::SETTINGS, Payload::None)
                .await
            {
                Ok(reply) => reply,
                Err(e) if e.is_transient() || matches!(e, Error::Deserialization { .. }) => {
                    warn!(operation = op.name, attempt, error = %e, "status check failed");
                    continue;
                }
                Err(e) => return Err(e),
            };

            if !reply.is_ok() {
                warn!(
                    operation = op.name,
                    attempt,
                    status = %reply.status,
                    "failed to retrieve operation status"
                );
                continue;
            }

            let status = reply
                .body
                .as_json()
                .and_then(|v| OperationStatus::deserialize(v).ok());
            match status.as_ref().map(OperationStatus::state) {
                Some(OperationState::Finished) => {
                    debug!(operation = op.name, attempt, "operation finished");
                    return Ok(reply.body);
                }
                Some(OperationState::InProgress) => {
                    let progress = status.and_then(|s| s.progress_percent);
                    debug!(operation = op.name, attempt, ?progress, "operation in progress");
                }
                _ => {
                    warn!(operation = op.name, attempt, body = %reply.body, "unrecognized operation status");
                }
            }
        }

        error!(
            operation = op.name,
            attempts = settings.max_attempts,
            "gave up waiting for operation"
        );
        Err(Error::PollTimeout {
            operation: op.name,
            attempts: settings.max_attempts,
        })
    }
}

/// `statusCode`/`detail` of a command reply; empty for non-JSON bodies.
pub(crate) fn command_status(body: &Body) -> CommandStatus {
    body.as_json().map_or(
        CommandStatus {
            status_code: None,
            detail: None,
        },
        CommandStatus::from_value,
    )
}
