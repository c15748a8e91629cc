// edgeswitch-api: Async Rust client for the Ubiquiti EdgeSwitch REST management API

pub mod auth;
pub mod config;
pub mod error;
pub mod response;
pub mod transport;
pub mod v1;

pub use auth::{AUTH_TOKEN_HEADER, Credentials, DEFAULT_USERNAME};
pub use config::{PollSettings, SwitchConfig};
pub use error::{Error, PingPhase};
pub use response::{Body, Reply};
pub use transport::{TlsMode, TransportConfig};
pub use v1::{OperationState, OperationStatus, Session, SwitchClient, backup_file_name};
