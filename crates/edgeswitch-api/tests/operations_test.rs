#![allow(clippy::unwrap_used)]
// Single-shot operations, ping and backup, using wiremock.

mod common;

use std::time::Duration;

use reqwest::StatusCode;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use edgeswitch_api::{Body, DEFAULT_USERNAME, Error, PingPhase};

use common::{TOKEN, api, client_for, open_session, referer, setup};

// ── Device / configuration ──────────────────────────────────────────

#[tokio::test]
async fn test_device_info() {
    let (server, client) = setup().await;
    let session = open_session(&server, &client).await;

    let info = json!({
        "model": "ES-24-250W",
        "firmware": { "version": "1.9.2" },
        "uptime": 86400
    });

    Mock::given(method("GET"))
        .and(path(api("device")))
        .respond_with(ResponseTemplate::new(200).set_body_json(&info))
        .mount(&server)
        .await;

    let body = session.device_info().await.unwrap();
    assert_eq!(body, Body::Json(info));
}

#[tokio::test]
async fn test_device_info_failure_keeps_body() {
    let (server, client) = setup().await;
    let session = open_session(&server, &client).await;

    Mock::given(method("GET"))
        .and(path(api("device")))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": 5 })))
        .mount(&server)
        .await;

    match session.device_info().await {
        Err(Error::Request {
            status,
            message,
            body,
        }) => {
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(message, None);
            assert_eq!(body, Body::Json(json!({ "error": 5 })));
        }
        other => panic!("expected Request error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_non_200_with_broken_json_keeps_status() {
    let (server, client) = setup().await;
    let session = open_session(&server, &client).await;

    Mock::given(method("GET"))
        .and(path(api("device")))
        .respond_with(
            ResponseTemplate::new(502).set_body_raw("<html>Bad Gateway</html>", "application/json"),
        )
        .mount(&server)
        .await;

    let err = session.device_info().await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::BAD_GATEWAY));
    assert_eq!(err.body(), Some(&Body::Text("<html>Bad Gateway</html>".into())));
}

#[tokio::test]
async fn test_mac_table_failure_surfaces_message() {
    let (server, client) = setup().await;
    let session = open_session(&server, &client).await;

    Mock::given(method("GET"))
        .and(path(api("tools/mac-table")))
        .and(header("referer", referer(&server, "tools/mac-table").as_str()))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Session expired" })),
        )
        .mount(&server)
        .await;

    let err = session.mac_table().await.unwrap_err();
    assert!(err.is_auth_failure());
    match err {
        Error::Request { message, .. } => assert_eq!(message.as_deref(), Some("Session expired")),
        other => panic!("expected Request error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_change_password() {
    let (server, client) = setup().await;
    let session = open_session(&server, &client).await;

    Mock::given(method("POST"))
        .and(path(api("user/change-password")))
        .and(header("x-auth-token", TOKEN))
        .and(body_json(json!({
            "username": "ubnt",
            "oldPassword": "ubnt",
            "newPassword": "changemetosomething"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "error": 0 })))
        .expect(1)
        .mount(&server)
        .await;

    session
        .change_password(
            DEFAULT_USERNAME,
            &"ubnt".to_string().into(),
            &"changemetosomething".to_string().into(),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_interfaces_round_trip() {
    let (server, client) = setup().await;
    let session = open_session(&server, &client).await;

    let ports = json!([
        { "identification": { "id": "0/1" }, "status": { "enabled": true } },
        { "identification": { "id": "0/2" }, "status": { "enabled": false } }
    ]);

    Mock::given(method("GET"))
        .and(path(api("interfaces")))
        .respond_with(ResponseTemplate::new(200).set_body_json(&ports))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path(api("interfaces")))
        .and(header("content-type", "application/json"))
        .and(body_json(&ports))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "statusCode": 200 })))
        .expect(1)
        .mount(&server)
        .await;

    let current = session.interfaces().await.unwrap().into_json().unwrap();
    session.set_interfaces(&current).await.unwrap();
}

// ── Reboot ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_reboot_accepted() {
    let (server, client) = setup().await;
    let session = open_session(&server, &client).await;

    Mock::given(method("POST"))
        .and(path(api("system/reboot")))
        .and(header("referer", referer(&server, "settings").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "statusCode": 200 })))
        .expect(1)
        .mount(&server)
        .await;

    session.reboot().await.unwrap();
}

#[tokio::test]
async fn test_reboot_rejected_surfaces_detail() {
    let (server, client) = setup().await;
    let session = open_session(&server, &client).await;

    Mock::given(method("POST"))
        .and(path(api("system/reboot")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "statusCode": 409, "detail": "upgrade in progress" })),
        )
        .mount(&server)
        .await;

    match session.reboot().await {
        Err(Error::CommandRejected {
            status_code,
            detail,
        }) => {
            assert_eq!(status_code, Some(409));
            assert_eq!(detail, "upgrade in progress");
        }
        other => panic!("expected CommandRejected error, got: {other:?}"),
    }
}

// ── Ping ────────────────────────────────────────────────────────────

async fn mount_ping_stop(server: &wiremock::MockServer, status: u16) {
    Mock::given(method("POST"))
        .and(path(api("tools/ping/stop")))
        .and(header("referer", referer(server, "tools/ping").as_str()))
        .respond_with(
            ResponseTemplate::new(status).set_body_json(json!({ "message": "stop status" })),
        )
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_ping_success_fetches_result() {
    let (server, client) = setup().await;
    let session = open_session(&server, &client).await;

    Mock::given(method("POST"))
        .and(path(api("tools/ping/start")))
        .and(body_json(json!({
            "count": 3,
            "interval": 1,
            "packetSize": 56,
            "destination": "10.0.0.1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    mount_ping_stop(&server, 200).await;

    let result = json!({ "transmitted": 3, "received": 3, "lines": ["64 bytes from 10.0.0.1"] });
    Mock::given(method("GET"))
        .and(path(api("tools/ping")))
        .respond_with(ResponseTemplate::new(200).set_body_json(&result))
        .expect(1)
        .mount(&server)
        .await;

    let body = session.ping("10.0.0.1", 3).await.unwrap();
    assert_eq!(body, Body::Json(result));
}

#[tokio::test]
async fn test_ping_stop_failure_returns_stop_payload() {
    let (server, client) = setup().await;
    let session = open_session(&server, &client).await;

    Mock::given(method("POST"))
        .and(path(api("tools/ping/start")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;
    mount_ping_stop(&server, 500).await;

    Mock::given(method("GET"))
        .and(path(api("tools/ping")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let err = session.ping("10.0.0.1", 1).await.unwrap_err();
    assert!(
        matches!(err, Error::Ping { phase: PingPhase::Stop, .. }),
        "expected stop failure, got: {err:?}"
    );
    assert_eq!(err.body(), Some(&Body::Json(json!({ "message": "stop status" }))));
}

#[tokio::test]
async fn test_ping_stop_failure_wins_over_start_failure() {
    let (server, client) = setup().await;
    let session = open_session(&server, &client).await;

    Mock::given(method("POST"))
        .and(path(api("tools/ping/start")))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "message": "bad destination" })))
        .mount(&server)
        .await;
    mount_ping_stop(&server, 500).await;

    let err = session.ping("not-an-ip", 1).await.unwrap_err();
    assert!(matches!(err, Error::Ping { phase: PingPhase::Stop, .. }));
    assert_eq!(err.body(), Some(&Body::Json(json!({ "message": "stop status" }))));
}

#[tokio::test]
async fn test_ping_stop_runs_after_start_transport_error() {
    let server = wiremock::MockServer::start().await;
    let http = reqwest::Client::builder()
        .timeout(Duration::from_millis(200))
        .build()
        .unwrap();
    let client = client_for(&server, http);
    let session = open_session(&server, &client).await;

    Mock::given(method("POST"))
        .and(path(api("tools/ping/start")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;
    mount_ping_stop(&server, 200).await;

    let err = session.ping("10.0.0.1", 1).await.unwrap_err();
    match err {
        Error::Ping {
            phase: PingPhase::Start,
            source,
        } => assert!(matches!(*source, Error::Transport(_)), "got: {source:?}"),
        other => panic!("expected start failure, got: {other:?}"),
    }
}

// ── Backup ──────────────────────────────────────────────────────────

fn backup_timestamp(file: &std::path::Path, suffix: &str) -> i64 {
    let name = file.file_name().unwrap().to_str().unwrap();
    name.strip_prefix("ubnt_edgeswitch_")
        .and_then(|rest| rest.strip_suffix(suffix))
        .unwrap()
        .parse()
        .unwrap()
}

#[tokio::test]
async fn test_backup_gzip_gets_tar_gz_name() {
    let (server, client) = setup().await;
    let session = open_session(&server, &client).await;
    let dir = tempfile::tempdir().unwrap();

    let archive: Vec<u8> = vec![0x1f, 0x8b, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x03];
    Mock::given(method("GET"))
        .and(path(api("system/backup")))
        .and(header("referer", referer(&server, "settings").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_raw(archive.clone(), "application/gzip"))
        .mount(&server)
        .await;

    let before = chrono::Utc::now().timestamp();
    let written = session.backup(dir.path()).await.unwrap();
    let after = chrono::Utc::now().timestamp();

    assert_eq!(written.parent().unwrap(), dir.path());
    let ts = backup_timestamp(&written, ".tar.gz");
    assert!((before..=after).contains(&ts));
    assert_eq!(std::fs::read(&written).unwrap(), archive);
}

#[tokio::test]
async fn test_backup_without_gzip_type_has_no_extension() {
    let (server, client) = setup().await;
    let session = open_session(&server, &client).await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path(api("system/backup")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"config-bytes".to_vec()))
        .mount(&server)
        .await;

    let written = session.backup(dir.path()).await.unwrap();

    backup_timestamp(&written, "");
    assert!(written.extension().is_none());
    assert_eq!(std::fs::read(&written).unwrap(), b"config-bytes");
}

#[tokio::test]
async fn test_backup_failure_writes_nothing() {
    let (server, client) = setup().await;
    let session = open_session(&server, &client).await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path(api("system/backup")))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "disk full" })))
        .mount(&server)
        .await;

    let err = session.backup(dir.path()).await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

const NON_UTF8_ARCHIVE: [u8; 8] = [0x1f, 0x8b, 0x08, 0x00, 0xff, 0xfe, 0x80, 0x03];

#[tokio::test]
async fn test_backup_x_gzip_is_written_byte_for_byte() {
    let (server, client) = setup().await;
    let session = open_session(&server, &client).await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path(api("system/backup")))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(NON_UTF8_ARCHIVE.to_vec(), "application/x-gzip"),
        )
        .mount(&server)
        .await;

    let written = session.backup(dir.path()).await.unwrap();

    backup_timestamp(&written, "");
    assert_eq!(std::fs::read(&written).unwrap(), NON_UTF8_ARCHIVE);
}

#[tokio::test]
async fn test_backup_without_content_type_is_written_byte_for_byte() {
    let (server, client) = setup().await;
    let session = open_session(&server, &client).await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path(api("system/backup")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(NON_UTF8_ARCHIVE.to_vec()))
        .mount(&server)
        .await;

    let written = session.backup(dir.path()).await.unwrap();

    assert!(written.extension().is_none());
    assert_eq!(std::fs::read(&written).unwrap(), NON_UTF8_ARCHIVE);
}

#[tokio::test]
async fn test_backup_json_body_is_not_re_encoded() {
    let (server, client) = setup().await;
    let session = open_session(&server, &client).await;
    let dir = tempfile::tempdir().unwrap();

    let sent = "{ \"system\":  { \"hostname\": \"sw-01\" } }\n";
    Mock::given(method("GET"))
        .and(path(api("system/backup")))
        .respond_with(ResponseTemplate::new(200).set_body_raw(sent, "application/json"))
        .mount(&server)
        .await;

    let written = session.backup(dir.path()).await.unwrap();
    assert_eq!(std::fs::read_to_string(&written).unwrap(), sent);
}
