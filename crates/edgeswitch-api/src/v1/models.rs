// Wire models for the v1.0 REST API
//
// Only the envelope fields the client acts on are typed. Device payloads
// (device info, interfaces, statistics, MAC table) vary by firmware and
// are handed back as `serde_json::Value`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `POST user/login` request.
#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// `POST user/login` response body.
#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    #[serde(default)]
    pub error: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

/// `POST user/change-password` request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChangePasswordRequest<'a> {
    pub username: &'a str,
    pub old_password: &'a str,
    pub new_password: &'a str,
}

/// `POST tools/ping/start` request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PingRequest<'a> {
    pub count: u32,
    /// Seconds between echo requests.
    pub interval: u32,
    pub packet_size: u32,
    pub destination: &'a str,
}

/// Command envelope returned by reboot and the upload "direct" endpoints.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CommandStatus {
    #[serde(default)]
    pub status_code: Option<i64>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl CommandStatus {
    pub fn from_value(value: &Value) -> Self {
        Self::deserialize(value).unwrap_or(Self {
            status_code: None,
            detail: None,
        })
    }

    pub fn accepted(&self) -> bool {
        self.status_code == Some(200)
    }

    pub fn detail_or_default(&self) -> String {
        self.detail
            .clone()
            .unwrap_or_else(|| "no detail provided".into())
    }
}

/// Status endpoint body for upgrade/restore.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub progress_percent: Option<f64>,
}

impl OperationStatus {
    pub fn state(&self) -> OperationState {
        OperationState::from_status(&self.status)
    }
}

/// Coarse state of a long-running device operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationState {
    InProgress,
    Finished,
    Unknown,
}

impl OperationState {
    /// Classify a `status` string. The device sometimes decorates the
    /// value, so this matches on substrings.
    pub fn from_status(status: &str) -> Self {
        if status.contains("finished") {
            Self::Finished
        } else if status.contains("in_progress") {
            Self::InProgress
        } else {
            Self::Unknown
        }
    }
}
