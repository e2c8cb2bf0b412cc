//! Authentication integration tests
//!
//! Login and register calls against a mock auth API.

use crate::common::*;
use cms_client::client::auth::{login, register};
use cms_client::client::Config;
use cms_client::shared::AppConfig;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_login_success() {
    let api = TestApi::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({"email": "officer@cms.gov", "password": "secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": OFFICER_TOKEN,
            "user": {"_id": "o2", "name": "Officer Smith", "email": "officer@cms.gov", "role": "officer"}
        })))
        .expect(1)
        .mount(&api.server)
        .await;

    let response = crate::assert_ok!(login(&api.config(), "officer@cms.gov", "secret").await);
    assert_eq!(response.token, OFFICER_TOKEN);
    assert_eq!(response.user, officer());
}

#[tokio::test]
async fn test_login_failure_uses_server_message() {
    let api = TestApi::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Account locked"})))
        .mount(&api.server)
        .await;

    let err = login(&api.config(), "a@b.c", "x").await.unwrap_err();
    assert_eq!(err, "Account locked");
}

#[tokio::test]
async fn test_login_failure_default_message() {
    let api = TestApi::start().await;
    api.mount_status("POST", "/auth/login", 401).await;

    let err = login(&api.config(), "a@b.c", "x").await.unwrap_err();
    assert_eq!(err, "Invalid email or password");
}

#[tokio::test]
async fn test_login_unexpected_body() {
    let api = TestApi::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&api.server)
        .await;

    let err = login(&api.config(), "a@b.c", "x").await.unwrap_err();
    assert_eq!(err, "Invalid response from server");
}

#[tokio::test]
async fn test_login_network_error() {
    let err = login(&config_for(UNREACHABLE_API), "a@b.c", "x").await.unwrap_err();
    assert_eq!(err, "Network error");
}

#[tokio::test]
async fn test_register_messages() {
    let api = TestApi::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .and(body_json(json!({"name": "Jane Roe", "email": "jane@example.com", "password": "pw"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"message": "Welcome aboard"})))
        .mount(&api.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .respond_with(ResponseTemplate::new(409))
        .mount(&api.server)
        .await;

    let config = api.config();
    let message = register(&config, "Jane Roe", "jane@example.com", "pw").await.unwrap();
    assert_eq!(message, "Welcome aboard");

    let err = register(&config, "John Doe", "citizen@example.com", "pw").await.unwrap_err();
    assert_eq!(err, "User already exists");
}

#[tokio::test]
async fn test_register_default_success_message() {
    let api = TestApi::start().await;
    api.mount_status("POST", "/auth/register", 201).await;

    let message = register(&api.config(), "Jane Roe", "jane@example.com", "pw").await.unwrap();
    assert_eq!(message, "Registration successful");
}

#[tokio::test]
async fn test_login_honors_request_timeout() {
    let api = TestApi::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(5))
                .set_body_json(json!({"token": OFFICER_TOKEN, "user": officer()})),
        )
        .mount(&api.server)
        .await;

    let config = Config::with_builder(
        AppConfig::builder()
            .api_base_url(api.server.uri())
            .request_timeout_secs(1),
    )
    .unwrap();

    let started = std::time::Instant::now();
    let err = login(&config, "officer@cms.gov", "secret").await.unwrap_err();
    assert_eq!(err, "Network error");
    assert!(started.elapsed() < Duration::from_secs(4));
}
