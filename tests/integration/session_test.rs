//! Session integration tests
//!
//! Startup restore, the sign-in lifecycle and cross-session convergence.

use crate::common::*;
use cms_client::client::local_cache::keys;
use cms_client::client::{Config, LocalCache, Session};
use cms_client::shared::{AppConfig, UserRole};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

/// Poll `condition` until it holds or a few seconds pass
async fn eventually(mut condition: impl FnMut() -> bool) -> bool {
    let wait = async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    };
    tokio::time::timeout(Duration::from_secs(5), wait).await.is_ok()
}

async fn mount_admin_login(api: &TestApi) {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": ADMIN_TOKEN,
            "user": admin()
        })))
        .mount(&api.server)
        .await;
}

#[tokio::test]
async fn test_restores_stored_session_and_fetches() {
    let api = TestApi::start().await;
    api.mount_list("/complaints/my", CITIZEN_TOKEN, json!({"complaints": server_complaints()}))
        .await;

    let cache = LocalCache::in_memory();
    sign_in(&cache, &citizen());

    let session = crate::assert_ok!(Session::with_cache(api.config(), cache).await);
    assert!(session.is_authenticated());
    assert_eq!(session.current_user(), Some(citizen()));
    assert_complaint_ids(&session.synchronizer().complaints(), &["7", "c8"]);
}

#[tokio::test]
async fn test_restore_offline_uses_cached_complaints() {
    let cache = LocalCache::in_memory();
    sign_in(&cache, &admin());
    cache.set(keys::COMPLAINTS, json!(server_complaints()).to_string());

    let session = Session::with_cache(config_for(UNREACHABLE_API), cache).await.unwrap();
    assert!(session.is_authenticated());
    assert_eq!(session.synchronizer().complaints().len(), 2);
}

#[tokio::test]
async fn test_login_stores_credential_and_fetches() {
    let api = TestApi::start().await;
    mount_admin_login(&api).await;
    api.mount_list("/complaints/all", ADMIN_TOKEN, json!(server_complaints()))
        .await;

    let cache = LocalCache::in_memory();
    let session = Session::with_cache(api.config(), cache.clone()).await.unwrap();
    assert!(!session.is_authenticated());

    let user = session.login("admin@cms.gov", "secret").await.unwrap();
    assert_eq!(user.role, UserRole::Admin);

    let state = session.auth_state();
    assert!(state.authenticated);
    assert!(!state.loading);
    assert!(state.error.is_none());
    assert_eq!(cache.get(keys::TOKEN).as_deref(), Some(ADMIN_TOKEN));
    assert_eq!(session.synchronizer().complaints().len(), 2);
}

#[tokio::test]
async fn test_failed_login_sets_error() {
    let api = TestApi::start().await;
    api.mount_status("POST", "/auth/login", 401).await;

    let session = Session::with_cache(api.config(), LocalCache::in_memory()).await.unwrap();
    let err = session.login("admin@cms.gov", "wrong").await.unwrap_err();

    let state = session.auth_state();
    assert!(!state.authenticated);
    assert!(!state.loading);
    assert_eq!(state.error.as_deref(), Some(err.as_str()));
}

#[tokio::test]
async fn test_register_failure_sets_error() {
    let api = TestApi::start().await;
    api.mount_status("POST", "/auth/register", 409).await;

    let session = Session::with_cache(api.config(), LocalCache::in_memory()).await.unwrap();
    let err = session.register("John", "citizen@example.com", "pw").await.unwrap_err();

    assert_eq!(err, "User already exists");
    assert_eq!(session.auth_state().error.as_deref(), Some("User already exists"));
}

#[tokio::test]
async fn test_logout_clears_everything_but_cached_lists() {
    let cache = LocalCache::in_memory();
    sign_in(&cache, &admin());
    cache.set(keys::COMPLAINTS, json!(server_complaints()).to_string());

    let session = Session::with_cache(config_for(UNREACHABLE_API), cache.clone()).await.unwrap();
    session.logout();

    assert!(!session.is_authenticated());
    assert!(session.synchronizer().complaints().is_empty());
    assert!(!cache.contains(keys::USER));
    assert!(!cache.contains(keys::TOKEN));
    assert!(cache.contains(keys::COMPLAINTS));
}

#[tokio::test]
async fn test_sessions_sharing_a_cache_converge() {
    let api = TestApi::start().await;
    mount_admin_login(&api).await;
    api.mount_list("/complaints/all", ADMIN_TOKEN, json!(server_complaints()))
        .await;

    let cache = LocalCache::in_memory();
    let first = Session::with_cache(api.config(), cache.clone()).await.unwrap();
    let second = Session::with_cache(api.config(), cache).await.unwrap();
    let _watch = second.watch_storage();

    first.login("admin@cms.gov", "secret").await.unwrap();
    assert!(eventually(|| second.synchronizer().complaints().len() == 2).await);
    assert!(second.is_authenticated());

    first.logout();
    assert!(eventually(|| second.synchronizer().complaints().is_empty()).await);
    assert!(eventually(|| !second.is_authenticated()).await);
}

#[tokio::test]
async fn test_watch_ignores_own_login() {
    let api = TestApi::start().await;
    mount_admin_login(&api).await;
    api.mount_list("/complaints/all", ADMIN_TOKEN, json!(server_complaints()))
        .await;

    let session = Session::with_cache(api.config(), LocalCache::in_memory()).await.unwrap();
    let _watch = session.watch_storage();

    session.login("admin@cms.gov", "secret").await.unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(api.hits("GET", "/complaints/all").await, 1);
    assert!(session.is_authenticated());
    assert_eq!(session.synchronizer().complaints().len(), 2);
}

#[tokio::test]
async fn test_dropped_watch_stops_listening() {
    let cache = LocalCache::in_memory();
    sign_in(&cache, &admin());
    cache.set(keys::COMPLAINTS, json!(server_complaints()).to_string());

    let session = Session::with_cache(config_for(UNREACHABLE_API), cache.clone()).await.unwrap();
    session.watch_storage().stop();
    tokio::task::yield_now().await;

    cache.remove(keys::TOKEN);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(session.synchronizer().complaints().len(), 2);
}

#[tokio::test]
async fn test_open_persists_between_runs() {
    let api = TestApi::start().await;
    mount_admin_login(&api).await;
    api.mount_list("/complaints/all", ADMIN_TOKEN, json!(server_complaints()))
        .await;

    let fixture = TestCache::new();
    let config = Config::with_builder(
        AppConfig::builder()
            .api_base_url(api.server.uri())
            .cache_path(fixture.path()),
    )
    .unwrap();

    let session = Session::open(config.clone()).await.unwrap();
    session.login("admin@cms.gov", "secret").await.unwrap();
    session.cache().flush().await.unwrap();
    drop(session);

    let restored = Session::open(config).await.unwrap();
    assert_eq!(restored.current_user(), Some(admin()));
    assert_eq!(restored.synchronizer().complaints().len(), 2);
}
