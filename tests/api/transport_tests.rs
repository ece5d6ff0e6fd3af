//! Transport Tests
//!
//! Retry and status handling through the real reqwest stack.

use pretty_assertions::assert_eq;
use reqwest::{Method, StatusCode};
use serde_json::json;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use kemono_client::domain::value_objects::{Record, UrlRoot};
use kemono_client::infrastructure::http::{ApiRequest, HttpTransport, Transport};
use kemono_client::shared::ClientError;

use crate::common::{api, fast_policy, TestApp};

/// Three rate-limited answers, then success: four requests in total.
#[tokio::test]
async fn test_rate_limited_call_is_retried_until_success() {
    let app = TestApp::spawn().await;

    Mock::given(method("GET"))
        .and(path(api("/app_version")))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(3)
        .expect(3)
        .mount(&app.server)
        .await;
    Mock::given(method("GET"))
        .and(path(api("/app_version")))
        .respond_with(ResponseTemplate::new(200).set_body_string("abc123\n"))
        .expect(1)
        .mount(&app.server)
        .await;

    let text = assert_ok!(app.client.get_text("/app_version").await);
    assert_eq!(text.trim(), "abc123");
}

#[tokio::test]
async fn test_not_found_is_absent_without_retries() {
    let app = TestApp::spawn().await;

    Mock::given(method("GET"))
        .and(path(api("/fanbox/user/1/profile")))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&app.server)
        .await;

    let record = assert_ok!(app.client.get_json::<Record>("/fanbox/user/1/profile").await);
    assert!(record.is_none());
}

#[tokio::test]
async fn test_retry_budget_exhausted() {
    let app = TestApp::with_policy(fast_policy(2)).await;

    Mock::given(method("GET"))
        .and(path(api("/app_version")))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&app.server)
        .await;

    let err = app.client.get_text("/app_version").await.unwrap_err();
    match err {
        ClientError::RetriesExhausted { attempts, status } => {
            assert_eq!(attempts, 3);
            assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let app = TestApp::spawn().await;

    Mock::given(method("GET"))
        .and(path(api("/app_version")))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&app.server)
        .await;

    let err = assert_err!(app.client.get_text("/app_version").await);
    assert!(matches!(
        err,
        ClientError::UnexpectedStatus { status, .. } if status == StatusCode::INTERNAL_SERVER_ERROR
    ));
}

#[tokio::test]
async fn test_json_body_decoded() {
    let app = TestApp::spawn().await;

    Mock::given(method("GET"))
        .and(path(api("/fanbox/user/1/links")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"service": "patreon", "id": "9"}
        ])))
        .mount(&app.server)
        .await;

    let records = app.client.get_records("/fanbox/user/1/links").await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["service"], json!("patreon"));
}

#[tokio::test]
async fn test_request_body_is_sent_as_json() {
    let app = TestApp::spawn().await;
    let payload = json!({"service": "fanbox", "creator_id": "77"});

    Mock::given(method("POST"))
        .and(path(api("/favorites/creator")))
        .and(header("content-type", "application/json"))
        .and(body_json(&payload))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&app.server)
        .await;

    let transport = HttpTransport::with_client(reqwest::Client::new(), app.endpoints.clone());
    let request = ApiRequest::new(Method::POST, UrlRoot::Api, "/favorites/creator").with_body(payload.clone());
    assert_eq!(request.body.as_ref(), Some(&payload));

    let response = assert_ok!(transport.call(&request).await);
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.json::<Record>().unwrap()["ok"], json!(true));
}
