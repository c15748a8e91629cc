// Session lifecycle
//
// Token login/logout and account management. Login returns the token in
// the `x-auth-token` response header; `Session` sends it back on every
// request.

use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::auth::{AUTH_TOKEN_HEADER, Credentials};
use crate::config::SwitchConfig;
use crate::error::Error;
use crate::response::Body;
use crate::v1::client::{Payload, Session, SwitchClient, referer};
use crate::v1::models::{ChangePasswordRequest, LoginRequest, LoginResponse};

impl SwitchClient {
    /// Exchange username/password for a session token.
    ///
    /// `POST api/v1.0/user/login`. Succeeds only on HTTP 200 with
    /// `"error": 0` in the body; otherwise the body's `message` (or the
    /// whole body for non-200 replies) becomes the `Error::Authentication`
    /// message.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<SecretString, Error> {
        debug!(username, url = %self.base_url(), "logging in");

        let payload = Payload::json(&LoginRequest {
            username,
            password: password.expose_secret(),
        })?;
        let reply = self
            .request(
                Method::POST,
                "user/login",
                referer::ROOT,
                &Self::base_headers(),
                payload,
            )
            .await?;

        if !reply.is_ok() {
            return Err(Error::Authentication {
                message: format!("login failed (HTTP {}): {}", reply.status, reply.body),
            });
        }

        let login = reply
            .body
            .as_json()
            .and_then(|v| LoginResponse::deserialize(v).ok())
            .ok_or_else(|| Error::Authentication {
                message: format!("unexpected login response: {}", reply.body),
            })?;

        if login.error != Some(0) {
            return Err(Error::Authentication {
                message: login.message.unwrap_or_else(|| match login.error {
                    Some(code) => format!("login rejected with error {code}"),
                    None => "login response carried no error code".into(),
                }),
            });
        }

        let token = reply
            .headers
            .get(AUTH_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| Error::Authentication {
                message: format!("login response carried no {AUTH_TOKEN_HEADER} header"),
            })?;

        debug!("token received");
        Ok(SecretString::from(token.to_owned()))
    }

    /// Log in and return the authenticated [`Session`].
    pub async fn open(&self, username: &str, password: &SecretString) -> Result<Session, Error> {
        let token = self.authenticate(username, password).await?;
        let session = Session::new(self.clone(), token)?;
        debug!("session open");
        Ok(session)
    }

    /// [`open`](Self::open) with a [`Credentials`] pair.
    pub async fn open_with(&self, credentials: &Credentials) -> Result<Session, Error> {
        self.open(&credentials.username, &credentials.password).await
    }

    /// Build a client from `config` and open a session with its credentials.
    pub async fn connect(config: &SwitchConfig) -> Result<Session, Error> {
        Self::from_config(config)?
            .open_with(&config.credentials)
            .await
    }

    /// Run `f` inside an open session.
    ///
    /// Logout is attempted after `f` completes, whether it returned `Ok` or
    /// `Err`. A logout failure is logged and does not replace `f`'s result.
    pub async fn with_session<T, F>(
        &self,
        username: &str,
        password: &SecretString,
        f: F,
    ) -> Result<T, Error>
    where
        F: AsyncFnOnce(&Session) -> Result<T, Error>,
    {
        let session = self.open(username, password).await?;
        let result = f(&session).await;
        if let Err(e) = session.close().await {
            warn!(error = %e, "failed to close session");
        }
        result
    }
}

impl Session {
    /// End the session.
    ///
    /// `POST api/v1.0/user/logout`. Consumes the session; the token is
    /// invalid afterwards whether or not the switch acknowledged it.
    pub async fn close(self) -> Result<Body, Error> {
        let body = self
            .post_json("user/logout", referer::LOGOUT, &json!({}))
            .await?;
        debug!("session closed");
        Ok(body)
    }

    /// Change an account password.
    ///
    /// `POST api/v1.0/user/change-password`. `user` is usually
    /// [`DEFAULT_USERNAME`](crate::auth::DEFAULT_USERNAME); the device
    /// requires new passwords longer than 8 characters.
    pub async fn change_password(
        &self,
        user: &str,
        old_password: &SecretString,
        new_password: &SecretString,
    ) -> Result<Body, Error> {
        debug!(user, "changing password");
        let body = ChangePasswordRequest {
            username: user,
            old_password: old_password.expose_secret(),
            new_password: new_password.expose_secret(),
        };
        self.post_json("user/change-password", referer::ROOT, &body)
            .await
    }
}
