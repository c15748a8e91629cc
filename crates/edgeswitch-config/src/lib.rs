//! Configuration for EdgeSwitch tools.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext), and
//! translation to `edgeswitch_api::SwitchConfig`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use edgeswitch_api::{Credentials, DEFAULT_USERNAME, PollSettings, SwitchConfig, TlsMode, TransportConfig};

const ENV_PREFIX: &str = "EDGESWITCH_";
const KEYRING_SERVICE: &str = "edgeswitch";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no profile named '{profile}'")]
    UnknownProfile { profile: String },

    #[error("no password configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is named explicitly.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named switch profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    /// Accept self-signed certificates.
    #[serde(default = "default_insecure")]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,

    #[serde(default = "default_poll_attempts")]
    pub poll_attempts: u32,

    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            insecure: default_insecure(),
            timeout: default_timeout(),
            connect_timeout: default_connect_timeout(),
            poll_attempts: default_poll_attempts(),
            poll_interval_secs: default_poll_interval(),
        }
    }
}

fn default_insecure() -> bool {
    true
}
fn default_timeout() -> u64 {
    30
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_poll_attempts() -> u32 {
    5
}
fn default_poll_interval() -> u64 {
    2
}

/// A named switch profile.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Switch base URL (e.g., "https://10.0.0.3").
    pub host: String,

    /// Account name; falls back to `EDGESWITCH_USERNAME`, then `ubnt`.
    pub username: Option<String>,

    /// Password (plaintext — prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override request timeout (seconds).
    pub timeout: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("org", "waggle-sensor", "edgeswitch").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("edgeswitch");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file, then layer `EDGESWITCH_*` variables on top
/// (`EDGESWITCH_DEFAULTS__TIMEOUT=60`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    Ok(figment.extract()?)
}

/// Parse a TOML document over the built-in defaults (no environment).
pub fn parse_config(toml_src: &str) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::string(toml_src));

    Ok(figment.extract()?)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(())
}

// ── Profile selection ───────────────────────────────────────────────

/// Pick `requested`, else the configured default profile, else `"default"`.
pub fn active_profile<'a>(
    config: &'a Config,
    requested: Option<&'a str>,
) -> Result<(&'a str, &'a Profile), ConfigError> {
    let name = requested
        .or(config.default_profile.as_deref())
        .unwrap_or("default");
    config
        .profiles
        .get(name)
        .map(|profile| (name, profile))
        .ok_or_else(|| ConfigError::UnknownProfile {
            profile: name.into(),
        })
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the password for a profile.
///
/// Order: the profile's `password_env` variable, `EDGESWITCH_PASSWORD`,
/// the system keyring (`edgeswitch` / `<profile>/password`), plaintext.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    resolve_password_with(
        profile,
        profile_name,
        |name| std::env::var(name).ok(),
        |account| {
            keyring::Entry::new(KEYRING_SERVICE, account)
                .and_then(|entry| entry.get_password())
                .ok()
        },
    )
}

/// `resolve_password` with the environment and keyring lookups supplied.
fn resolve_password_with(
    profile: &Profile,
    profile_name: &str,
    env: impl Fn(&str) -> Option<String>,
    keyring: impl Fn(&str) -> Option<String>,
) -> Result<SecretString, ConfigError> {
    let found = profile
        .password_env
        .as_deref()
        .and_then(|name| env(name))
        .or_else(|| env(&format!("{ENV_PREFIX}PASSWORD")))
        .or_else(|| keyring(&format!("{profile_name}/password")))
        .or_else(|| profile.password.clone());

    found.map(SecretString::from).ok_or_else(|| ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Resolve username + password for a profile.
pub fn resolve_credentials(profile: &Profile, profile_name: &str) -> Result<Credentials, ConfigError> {
    let username = profile
        .username
        .clone()
        .or_else(|| std::env::var(format!("{ENV_PREFIX}USERNAME")).ok())
        .unwrap_or_else(|| DEFAULT_USERNAME.into());
    let password = resolve_password(profile, profile_name)?;
    Ok(Credentials { username, password })
}

/// Build a `SwitchConfig` from a profile and the global defaults.
pub fn profile_to_switch_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<SwitchConfig, ConfigError> {
    let url: url::Url = profile.host.parse().map_err(|_| ConfigError::Validation {
        field: "host".into(),
        reason: format!("invalid URL: {}", profile.host),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "host".into(),
            reason: format!("expected an http(s) URL, got '{}'", profile.host),
        });
    }

    if defaults.poll_attempts == 0 {
        return Err(ConfigError::Validation {
            field: "poll_attempts".into(),
            reason: "must be at least 1".into(),
        });
    }

    let credentials = resolve_credentials(profile, profile_name)?;

    let tls = if profile.insecure == Some(true) {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else if profile.insecure.unwrap_or(defaults.insecure) {
        TlsMode::DangerAcceptInvalid
    } else {
        TlsMode::System
    };

    let transport = TransportConfig {
        tls,
        timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
        connect_timeout: Duration::from_secs(defaults.connect_timeout),
        cookie_jar: None,
    };

    let poll = PollSettings {
        max_attempts: defaults.poll_attempts,
        interval: Duration::from_secs(defaults.poll_interval_secs),
        ..PollSettings::default()
    };

    Ok(SwitchConfig {
        url,
        credentials,
        transport,
        poll,
    })
}
