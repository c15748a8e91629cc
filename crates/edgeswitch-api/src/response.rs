// Response interpretation
//
// Classifies a response body by its declared content type. Header lookup goes
// through `HeaderMap`, so `Content-Type`, `Content-type` and `content-type`
// are all the same key.

use std::fmt;

use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::Error;

/// Content types returned to the caller as raw bytes.
const BINARY_TYPES: [&str; 3] = ["image/jpeg", "application/octet-stream", "application/gzip"];

/// A decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// `application/json`
    Json(Value),
    /// `image/jpeg`, `application/octet-stream`, `application/gzip`
    Bytes(Bytes),
    /// Any other declared type, or no `Content-Type` at all.
    Text(String),
}

impl Body {
    /// Decode `bytes` according to `content_type`.
    pub fn from_parts(content_type: Option<&str>, bytes: Bytes) -> Result<Self, Error> {
        let Some(content_type) = content_type else {
            return Ok(Self::Text(String::from_utf8_lossy(&bytes).into_owned()));
        };

        if content_type.contains("application/json") {
            return serde_json::from_slice(&bytes)
                .map(Self::Json)
                .map_err(|e| Error::Deserialization {
                    message: e.to_string(),
                    body: String::from_utf8_lossy(&bytes).into_owned(),
                });
        }

        if BINARY_TYPES.iter().any(|t| content_type.contains(t)) {
            return Ok(Self::Bytes(bytes));
        }

        Ok(Self::Text(String::from_utf8_lossy(&bytes).into_owned()))
    }

    /// The JSON value, if this is a JSON body.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(v) => Some(v),
            _ => None,
        }
    }

    /// Consume into the JSON value, if this is a JSON body.
    pub fn into_json(self) -> Option<Value> {
        match self {
            Self::Json(v) => Some(v),
            _ => None,
        }
    }

    /// A top-level string field of a JSON object body.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.as_json()?.get(key)?.as_str()
    }

    /// The `message` field the switch puts on most error bodies.
    pub fn message(&self) -> Option<&str> {
        self.str_field("message")
    }

    /// Bytes of the decoded body, re-encoding JSON if needed. Use
    /// [`Reply::raw`] for the bytes exactly as sent.
    pub fn to_bytes(&self) -> Bytes {
        match self {
            Self::Bytes(b) => b.clone(),
            Self::Text(t) => Bytes::from(t.clone()),
            Self::Json(v) => Bytes::from(v.to_string()),
        }
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(v) => write!(f, "{v}"),
            Self::Text(t) => f.write_str(t),
            Self::Bytes(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

/// A fully interpreted HTTP response.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Body,
    /// The body exactly as received.
    pub raw: Bytes,
}

impl Reply {
    /// Read and interpret a `reqwest::Response`.
    ///
    /// Non-200 statuses are logged; the body is still returned. A non-200
    /// body that fails to decode as JSON is kept as text so the status is
    /// not lost.
    pub async fn read(resp: reqwest::Response) -> Result<Self, Error> {
        let status = resp.status();
        let headers = resp.headers().clone();
        debug!(%status, ?headers, "received response");

        let bytes = resp.bytes().await?;
        if let Some(ct) = content_type(&headers) {
            debug!(content_type = ct, "decoding body");
        }
        Self::from_parts(status, headers, bytes)
    }

    pub(crate) fn from_parts(status: StatusCode, headers: HeaderMap, raw: Bytes) -> Result<Self, Error> {
        let body = match Body::from_parts(content_type(&headers), raw.clone()) {
            Ok(body) => body,
            Err(Error::Deserialization { body, .. }) if status != StatusCode::OK => Body::Text(body),
            Err(e) => return Err(e),
        };

        if status != StatusCode::OK {
            warn!(%status, ?body, "switch returned non-200 status");
        }

        Ok(Self {
            status,
            headers,
            body,
            raw,
        })
    }

    pub fn is_ok(&self) -> bool {
        self.status == StatusCode::OK
    }

    /// The declared `Content-Type`, if any.
    pub fn content_type(&self) -> Option<&str> {
        content_type(&self.headers)
    }

    /// `Ok(body)` on 200, otherwise `Error::Request` carrying the body.
    pub fn into_result(self) -> Result<Body, Error> {
        if self.is_ok() {
            Ok(self.body)
        } else {
            Err(self.into_error())
        }
    }

    /// Convert into `Error::Request`, regardless of status.
    pub fn into_error(self) -> Error {
        Error::Request {
            status: self.status,
            message: self.body.message().map(str::to_owned),
            body: self.body,
        }
    }
}

fn content_type(headers: &HeaderMap) -> Option<&str> {
    headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
}
