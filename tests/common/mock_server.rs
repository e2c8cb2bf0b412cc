//! Mock complaint API helpers for integration tests
//!
//! Wraps a `wiremock` server and wires synchronizers and sessions to it.

use cms_client::client::{ComplaintGateway, ComplaintSynchronizer, Config, LocalCache};
use cms_client::shared::AppConfig;
use serde_json::Value;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Nothing listens here; requests fail at the transport level
pub const UNREACHABLE_API: &str = "http://127.0.0.1:9";

/// Mock complaint API
pub struct TestApi {
    pub server: MockServer,
}

impl TestApi {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn config(&self) -> Config {
        config_for(&self.server.uri())
    }

    pub fn synchronizer(&self, cache: LocalCache) -> ComplaintSynchronizer {
        synchronizer_for(self.config(), cache)
    }

    /// Answer `GET path` carrying `token` with `body`
    pub async fn mount_list(&self, route: &str, token: &str, body: Value) {
        Mock::given(method("GET"))
            .and(path(route))
            .and(header("Authorization", format!("Bearer {}", token).as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Answer `verb path` with a bare status
    pub async fn mount_status(&self, verb: &str, route: &str, status: u16) {
        Mock::given(method(verb))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    /// Requests the server has seen for `verb path`
    pub async fn hits(&self, verb: &str, route: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|request| request.method.as_str() == verb && request.url.path() == route)
            .count()
    }
}

pub fn config_for(base_url: &str) -> Config {
    Config::with_builder(AppConfig::builder().api_base_url(base_url))
        .expect("Failed to build test config")
}

pub fn synchronizer_for(config: Config, cache: LocalCache) -> ComplaintSynchronizer {
    let gateway = ComplaintGateway::new(config).expect("Failed to build gateway");
    ComplaintSynchronizer::new(gateway, cache)
}

/// Synchronizer whose every request fails at the transport level
pub fn offline_synchronizer(cache: LocalCache) -> ComplaintSynchronizer {
    synchronizer_for(config_for(UNREACHABLE_API), cache)
}
