#![allow(clippy::unwrap_used, dead_code)]
// Shared wiremock fixtures for the integration tests.

use std::time::Duration;

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use edgeswitch_api::{PollSettings, Session, SwitchClient};

pub const TOKEN: &str = "0f6c2a7e-test-token";
pub const USERNAME: &str = "ubnt";
pub const PASSWORD: &str = "changemetosomething";

/// Fast timings so poll loops and ping waits don't slow the suite down.
pub fn fast_polling() -> PollSettings {
    PollSettings {
        max_attempts: 5,
        interval: Duration::from_millis(10),
        ping_wait_per_packet: Duration::from_millis(5),
    }
}

pub async fn setup() -> (MockServer, SwitchClient) {
    let server = MockServer::start().await;
    let client = client_for(&server, reqwest::Client::new());
    (server, client)
}

pub fn client_for(server: &MockServer, http: reqwest::Client) -> SwitchClient {
    let base_url = Url::parse(&server.uri()).unwrap();
    SwitchClient::with_client(http, base_url).with_poll_settings(fast_polling())
}

pub fn api(suffix: &str) -> String {
    format!("/api/v1.0/{suffix}")
}

pub fn referer(server: &MockServer, page: &str) -> String {
    format!("{}/{page}", server.uri())
}

pub fn password() -> secrecy::SecretString {
    PASSWORD.to_string().into()
}

/// Mount a login endpoint that accepts the fixture credentials exactly once.
pub async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(api("user/login")))
        .and(header("referer", referer(server, "").as_str()))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({ "username": USERNAME, "password": PASSWORD })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-auth-token", TOKEN)
                .set_body_json(json!({ "error": 0, "message": "", "detail": "" })),
        )
        .expect(1)
        .mount(server)
        .await;
}

pub async fn open_session(server: &MockServer, client: &SwitchClient) -> Session {
    mount_login(server).await;
    client.open(USERNAME, &password()).await.unwrap()
}
