// v1.0 REST API HTTP client
//
// `SwitchClient` owns the unauthenticated HTTP context (TLS, timeouts,
// cookies). `Session` is the record produced by a successful login; it
// carries the token inside an immutable default-header set and is the only
// type that exposes authenticated operations. Endpoint groups (tools,
// system, interfaces, ...) are inherent `Session` methods in sibling files.

use std::path::Path;

use reqwest::Method;
use reqwest::header::{ACCEPT, CONNECTION, CONTENT_TYPE, HeaderMap, HeaderValue, REFERER};
use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::auth::AUTH_TOKEN_HEADER;
use crate::config::{PollSettings, SwitchConfig};
use crate::error::Error;
use crate::response::{Body, Reply};
use crate::transport::TransportConfig;

/// Every endpoint lives under this prefix.
const API_PREFIX: &str = "api/v1.0/";

/// Web UI pages the switch expects in the `Referer` header, relative to the
/// host root.
pub(crate) mod referer {
    pub const ROOT: &str = "";
    pub const LOGOUT: &str = "logout";
    pub const SETTINGS: &str = "settings";
    pub const MAC_TABLE: &str = "tools/mac-table";
    pub const PING: &str = "tools/ping";
}

// ── Request payload ──────────────────────────────────────────────────

/// A file sent as the `file` field of a multipart upload.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub content: Vec<u8>,
    pub media_type: &'static str,
}

impl FileUpload {
    /// Read `path` into memory; the upload is named after its base name.
    pub async fn from_path(path: &Path, media_type: &'static str) -> Result<Self, Error> {
        let content = tokio::fs::read(path)
            .await
            .map_err(|e| Error::io(path, e))?;
        let file_name = path
            .file_name()
            .map_or_else(|| "upload".into(), |n| n.to_string_lossy().into_owned());
        Ok(Self {
            file_name,
            content,
            media_type,
        })
    }
}

/// Request body. The variant decides header construction: file uploads
/// never carry a manual `Content-Type`.
#[derive(Debug, Clone)]
pub enum Payload {
    None,
    /// Pre-serialized JSON text.
    Json(String),
    File(FileUpload),
}

impl Payload {
    pub fn json(value: &impl Serialize) -> Result<Self, Error> {
        serde_json::to_string(value)
            .map(Self::Json)
            .map_err(Error::Serialization)
    }
}

// ── Client ───────────────────────────────────────────────────────────

/// Unauthenticated HTTP context for one switch.
///
/// Use [`open`](Self::open) to log in and obtain a [`Session`].
#[derive(Debug, Clone)]
pub struct SwitchClient {
    http: reqwest::Client,
    base_url: Url,
    poll: PollSettings,
}

impl SwitchClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// A cookie jar is added if the config doesn't carry one. `base_url` is
    /// the switch root, e.g. `https://10.0.0.3`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        let http = config.build_client()?;
        Ok(Self::with_client(http, base_url))
    }

    /// Build the client described by a [`SwitchConfig`].
    pub fn from_config(config: &SwitchConfig) -> Result<Self, Error> {
        Ok(Self::new(config.url.clone(), &config.transport)?.with_poll_settings(config.poll))
    }

    /// Wrap a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url: normalize_base_url(base_url),
            poll: PollSettings::default(),
        }
    }

    pub fn with_poll_settings(mut self, poll: PollSettings) -> Self {
        self.poll = poll;
        self
    }

    /// The switch root URL (always ends in `/`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn poll_settings(&self) -> PollSettings {
        self.poll
    }

    // ── URL / header builders ────────────────────────────────────────

    /// `{base}api/v1.0/{path}`
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(API_PREFIX)?.join(path)?)
    }

    fn referer(&self, page: &str) -> Result<HeaderValue, Error> {
        let url = self.base_url.join(page)?;
        Ok(HeaderValue::from_str(url.as_str())?)
    }

    /// Headers sent on every request, authenticated or not.
    pub(crate) fn base_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        headers
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send one request and hand back the raw response.
    ///
    /// `defaults` is merged with the call's `Referer`; `Content-Type` is
    /// dropped for multipart bodies so the encoder can set the boundary.
    pub(crate) async fn execute(
        &self,
        method: Method,
        path: &str,
        page: &str,
        defaults: &HeaderMap,
        payload: Payload,
    ) -> Result<reqwest::Response, Error> {
        let url = self.endpoint(path)?;
        let mut headers = defaults.clone();
        headers.insert(REFERER, self.referer(page)?);
        if matches!(payload, Payload::File(_)) {
            headers.remove(CONTENT_TYPE);
        }

        debug!(%method, %url, "requesting");
        debug!(?headers, "with headers");

        let builder = self.http.request(method, url).headers(headers);
        let builder = match payload {
            Payload::None => builder,
            Payload::Json(text) => builder.body(text),
            Payload::File(upload) => {
                let part = Part::bytes(upload.content)
                    .file_name(upload.file_name)
                    .mime_str(upload.media_type)?;
                builder.multipart(Form::new().part("file", part))
            }
        };

        Ok(builder.send().await?)
    }

    /// Send one request and interpret the response body.
    pub(crate) async fn request(
        &self,
        method: Method,
        path: &str,
        page: &str,
        defaults: &HeaderMap,
        payload: Payload,
    ) -> Result<Reply, Error> {
        let resp = self.execute(method, path, page, defaults, payload).await?;
        Reply::read(resp).await
    }
}

/// Make sure the root URL ends in `/` so `join` appends instead of
/// replacing the last path segment.
fn normalize_base_url(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

// ── Session ──────────────────────────────────────────────────────────

/// An authenticated session, produced by [`SwitchClient::open`].
///
/// The token is fixed for the lifetime of the record and never refreshed.
/// [`close`](Self::close) consumes the session, so a logged-out token
/// cannot be used again.
#[derive(Debug)]
pub struct Session {
    client: SwitchClient,
    token: SecretString,
    headers: HeaderMap,
}

impl Session {
    pub(crate) fn new(client: SwitchClient, token: SecretString) -> Result<Self, Error> {
        let mut headers = SwitchClient::base_headers();
        let mut value = HeaderValue::from_str(token.expose_secret())?;
        value.set_sensitive(true);
        headers.insert(AUTH_TOKEN_HEADER, value);
        Ok(Self {
            client,
            token,
            headers,
        })
    }

    /// The token returned by login.
    pub fn token(&self) -> &SecretString {
        &self.token
    }

    /// The default headers sent with every request of this session.
    pub fn default_headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn client(&self) -> &SwitchClient {
        &self.client
    }

    pub(crate) fn poll_settings(&self) -> PollSettings {
        self.client.poll
    }

    pub(crate) async fn request(
        &self,
        method: Method,
        path: &str,
        page: &str,
        payload: Payload,
    ) -> Result<Reply, Error> {
        self.client
            .request(method, path, page, &self.headers, payload)
            .await
    }

    /// GET, returning the body on 200.
    pub(crate) async fn get(&self, path: &str, page: &str) -> Result<Body, Error> {
        self.request(Method::GET, path, page, Payload::None)
            .await?
            .into_result()
    }

    /// POST a JSON body, returning the response body on 200.
    pub(crate) async fn post_json(
        &self,
        path: &str,
        page: &str,
        body: &impl Serialize,
    ) -> Result<Body, Error> {
        self.request(Method::POST, path, page, Payload::json(body)?)
            .await?
            .into_result()
    }

    /// PUT a JSON body, returning the response body on 200.
    pub(crate) async fn put_json(
        &self,
        path: &str,
        page: &str,
        body: &impl Serialize,
    ) -> Result<Body, Error> {
        self.request(Method::PUT, path, page, Payload::json(body)?)
            .await?
            .into_result()
    }
}
