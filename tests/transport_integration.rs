//! Integration tests for the transport core: retry, backoff, and timeouts.

mod support;

use std::time::Duration;

use murasaki_remote::{ConnectionProfile, RemoteError, TranslationRequest};
use murasaki_remote::transport::RequestOptions;
use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use serde_json::{Value, json};
use support::fakes::{Sequence, client_for, client_with_profile, request_count};
use support::socket_guard::{closed_local_address, start_mock_server};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_get_retries_rate_limit_then_succeeds() {
    let Some(mock_server) = start_mock_server().await else {
        return;
    };

    Mock::given(method("GET"))
        .and(path("/api/v1/status"))
        .respond_with(Sequence::new(vec![
            ResponseTemplate::new(429),
            ResponseTemplate::new(429),
            ResponseTemplate::new(200).set_body_json(json!({
                "status": "ok",
                "model_loaded": true,
                "current_model": "murasaki-8b",
                "active_tasks": 2
            })),
        ]))
        .mount(&mock_server)
        .await;

    let (client, sleeper) = client_for(&mock_server);
    let status = client.server_status().await.expect("third attempt succeeds");

    assert_eq!(status.current_model.as_deref(), Some("murasaki-8b"));
    assert_eq!(status.active_tasks, 2);
    assert_eq!(request_count(&mock_server).await, 3);
    assert_eq!(sleeper.delays_ms(), vec![400, 900], "backoff follows the schedule");
}

#[tokio::test]
async fn test_create_translation_is_never_retried() {
    let Some(mock_server) = start_mock_server().await else {
        return;
    };

    Mock::given(method("POST"))
        .and(path("/api/v1/translate"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock_server)
        .await;

    let (client, sleeper) = client_for(&mock_server);
    let err = client
        .create_translation(&TranslationRequest::for_text("猫"))
        .await
        .expect_err("500 should surface");

    match err {
        RemoteError::HttpStatus { status, body, .. } => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("expected raw HttpStatus, got {other:?}"),
    }
    assert_eq!(request_count(&mock_server).await, 1);
    assert!(sleeper.delays().is_empty());
}

#[tokio::test]
async fn test_get_exhausts_retry_budget() {
    let Some(mock_server) = start_mock_server().await else {
        return;
    };

    Mock::given(method("GET"))
        .and(path("/api/v1/models"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let (client, sleeper) = client_for(&mock_server);
    let err = client.list_models().await.expect_err("always 503");

    assert!(err.is_exhausted(), "expected Exhausted, got {err:?}");
    assert_eq!(err.status(), Some(503));
    assert!(
        err.to_string().contains("failed after 3 attempts"),
        "message: {err}"
    );
    assert_eq!(request_count(&mock_server).await, 3);
    assert_eq!(sleeper.delays_ms(), vec![400, 900]);
}

#[tokio::test]
async fn test_not_found_is_not_retried() {
    let Some(mock_server) = start_mock_server().await else {
        return;
    };

    Mock::given(method("GET"))
        .and(path("/api/v1/translate/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("task not found"))
        .mount(&mock_server)
        .await;

    let (client, _sleeper) = client_for(&mock_server);
    let err = client.task_status("missing").await.expect_err("404");

    assert_eq!(err.status(), Some(404));
    assert!(!err.is_exhausted());
    assert!(err.to_string().contains("task not found"));
    assert_eq!(request_count(&mock_server).await, 1);
}

#[tokio::test]
async fn test_slow_response_times_out_and_is_retried() {
    let Some(mock_server) = start_mock_server().await else {
        return;
    };

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "ok"}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let profile = ConnectionProfile::new(mock_server.uri())
        .unwrap()
        .with_timeout(Duration::from_millis(200));
    let (client, sleeper) = client_with_profile(profile);
    let err = client.health().await.expect_err("every attempt times out");

    match &err {
        RemoteError::Exhausted {
            attempts, source, ..
        } => {
            assert_eq!(*attempts, 3);
            assert!(
                matches!(**source, RemoteError::Timeout { .. }),
                "last error should be a timeout: {source:?}"
            );
        }
        other => panic!("expected Exhausted, got {other:?}"),
    }
    assert!(err.to_string().contains("timeout"));
    assert_eq!(sleeper.delays().len(), 2);
}

#[tokio::test]
async fn test_requests_carry_bearer_token_and_json_content_type() {
    let Some(mock_server) = start_mock_server().await else {
        return;
    };

    Mock::given(method("GET"))
        .and(path("/health"))
        .and(header("authorization", "Bearer secret-key"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "version": "1.4.0"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let profile = ConnectionProfile::new(mock_server.uri())
        .unwrap()
        .with_api_key(Some("secret-key"));
    let (client, _sleeper) = client_with_profile(profile);
    let health = client.health().await.expect("authorized request matches");

    assert_eq!(health.status, "ok");
    assert_eq!(health.version.as_deref(), Some("1.4.0"));
}

#[tokio::test]
async fn test_caller_headers_reach_the_wire_and_override_defaults() {
    let Some(mock_server) = start_mock_server().await else {
        return;
    };

    Mock::given(method("POST"))
        .and(path("/api/v1/echo"))
        .and(header("x-request-id", "req-77"))
        .and(header("content-type", "application/vnd.murasaki+json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let options = RequestOptions::json(json!({"ping": 1}))
        .with_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static("req-77"),
        )
        .with_header(
            CONTENT_TYPE,
            HeaderValue::from_static("application/vnd.murasaki+json"),
        );
    let (client, _sleeper) = client_for(&mock_server);
    let body: Value = client
        .transport()
        .request_json(Method::POST, "/api/v1/echo", options, None)
        .await
        .expect("custom headers match");

    assert_eq!(body["ok"], true);
    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(
        requests[0].headers.get_all("content-type").iter().count(),
        1,
        "caller content-type replaces the default"
    );
}

#[tokio::test]
async fn test_requests_without_key_send_no_authorization() {
    let Some(mock_server) = start_mock_server().await else {
        return;
    };

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .mount(&mock_server)
        .await;

    let (client, _sleeper) = client_for(&mock_server);
    client.health().await.expect("health");

    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_invalid_json_is_a_decode_error_without_retry() {
    let Some(mock_server) = start_mock_server().await else {
        return;
    };

    Mock::given(method("GET"))
        .and(path("/api/v1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy</html>"))
        .mount(&mock_server)
        .await;

    let (client, sleeper) = client_for(&mock_server);
    let err = client.server_status().await.expect_err("not json");

    assert!(matches!(err, RemoteError::Decode { .. }), "got {err:?}");
    assert_eq!(request_count(&mock_server).await, 1);
    assert!(sleeper.delays().is_empty());
}

#[tokio::test]
async fn test_post_retries_when_caller_opts_in() {
    let Some(mock_server) = start_mock_server().await else {
        return;
    };

    Mock::given(method("POST"))
        .and(path("/api/v1/echo"))
        .respond_with(Sequence::new(vec![
            ResponseTemplate::new(502),
            ResponseTemplate::new(200).set_body_json(json!({"echo": true})),
        ]))
        .mount(&mock_server)
        .await;

    let (client, sleeper) = client_for(&mock_server);
    let body: Value = client
        .transport()
        .request_json(
            Method::POST,
            "/api/v1/echo",
            RequestOptions::json(json!({"ping": 1})),
            Some(true),
        )
        .await
        .expect("second attempt succeeds");

    assert_eq!(body["echo"], true);
    assert_eq!(request_count(&mock_server).await, 2);
    assert_eq!(sleeper.delays_ms(), vec![400]);

    let requests = mock_server.received_requests().await.unwrap();
    let sent: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(sent, json!({"ping": 1}));
}

#[tokio::test]
async fn test_get_can_opt_out_of_retry() {
    let Some(mock_server) = start_mock_server().await else {
        return;
    };

    Mock::given(method("GET"))
        .and(path("/api/v1/status"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let (client, _sleeper) = client_for(&mock_server);
    let err = client
        .transport()
        .request_json::<Value>(
            Method::GET,
            "/api/v1/status",
            RequestOptions::default(),
            Some(false),
        )
        .await
        .expect_err("503");

    assert!(matches!(err, RemoteError::HttpStatus { status: 503, .. }));
    assert_eq!(request_count(&mock_server).await, 1);
}

#[tokio::test]
async fn test_unreachable_server_is_a_transient_network_failure() {
    if support::socket_guard::localhost_unavailable() {
        return;
    }

    let (client, sleeper) =
        client_with_profile(ConnectionProfile::new(closed_local_address()).unwrap());
    let err = client.health().await.expect_err("nothing listening");

    match &err {
        RemoteError::Exhausted { source, .. } => {
            assert!(
                matches!(**source, RemoteError::Network { .. }),
                "expected network error, got {source:?}"
            );
        }
        other => panic!("expected Exhausted, got {other:?}"),
    }
    assert_eq!(sleeper.delays_ms(), vec![400, 900]);
}

#[tokio::test]
async fn test_connection_probe_reports_failure_as_value() {
    let Some(mock_server) = start_mock_server().await else {
        return;
    };

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
        .mount(&mock_server)
        .await;

    let (client, _sleeper) = client_for(&mock_server);
    let check = client.test_connection().await;

    assert!(!check.ok);
    assert!(check.message.contains("401"), "message: {}", check.message);
    assert!(check.version.is_none());
}
