// v1.0 REST API client modules
//
// Hand-written client for the EdgeSwitch `api/v1.0/` endpoints: session
// lifecycle, device queries, diagnostic tools, port configuration, and
// system operations (reboot, upgrade, backup, restore).

pub mod auth;
pub mod client;
pub mod device;
pub mod interfaces;
pub mod models;
pub(crate) mod operation;
pub mod system;
pub mod tools;

pub use client::{FileUpload, Payload, Session, SwitchClient};
pub use models::{OperationState, OperationStatus};
pub use system::backup_file_name;
