/**
 * Authentication Module
 *
 * Credential storage for the signed-in user and the HTTP calls against the
 * login/register endpoints. The bearer token is opaque to the client.
 */

use crate::client::config::Config;
use crate::client::gateway::{body_message, http_client};
use crate::client::local_cache::{keys, LocalCache};
use crate::shared::user::{AuthResponse, LoginRequest, RegisterRequest, User};
use reqwest::Client;

/// Authentication state
#[derive(Debug, Clone, Default)]
pub struct AuthState {
    pub authenticated: bool,
    pub user: Option<User>,
    pub error: Option<String>,
    pub loading: bool,
}

impl AuthState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signed_in(user: User) -> Self {
        Self {
            authenticated: true,
            user: Some(user),
            error: None,
            loading: false,
        }
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn set_error(&mut self, error: String) {
        self.error = Some(error);
    }
}

/// User record and token as restored from the cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSession {
    pub user: User,
    pub token: String,
}

/// Credential persistence on top of the local cache
#[derive(Debug, Clone)]
pub struct CredentialStore {
    cache: LocalCache,
}

impl CredentialStore {
    pub fn new(cache: LocalCache) -> Self {
        Self { cache }
    }

    pub fn save(&self, user: &User, token: &str) {
        if let Err(e) = self.cache.set_json(keys::USER, user) {
            tracing::error!("[AUTH] Failed to store user record: {}", e);
            return;
        }
        self.cache.set(keys::TOKEN, token);
    }

    /// Restore the stored session.
    ///
    /// A user record without a token is an expired or corrupted session: both
    /// keys are cleared. An unreadable user record is treated the same way.
    pub fn load(&self) -> Option<StoredSession> {
        let token = self.token();
        let user = match self.cache.get_json::<User>(keys::USER) {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!("[AUTH] Discarding unreadable user record: {}", e);
                self.clear();
                return None;
            }
        };

        match (user, token) {
            (Some(user), Some(token)) => Some(StoredSession { user, token }),
            (Some(_), None) => {
                tracing::warn!("[AUTH] User record without token, clearing stored session");
                self.clear();
                None
            }
            (None, _) => None,
        }
    }

    pub fn token(&self) -> Option<String> {
        self.cache.get(keys::TOKEN).filter(|token| !token.trim().is_empty())
    }

    pub fn user(&self) -> Option<User> {
        self.cache.get_json(keys::USER).ok().flatten()
    }

    pub fn clear(&self) {
        self.cache.remove(keys::USER);
        self.cache.remove(keys::TOKEN);
    }
}

fn client_for(config: &Config) -> Result<Client, String> {
    http_client(config).map_err(|e| {
        tracing::error!("[AUTH] Failed to build HTTP client: {}", e);
        "Client configuration error".to_string()
    })
}

/// Log in with email and password
pub async fn login(config: &Config, email: &str, password: &str) -> Result<AuthResponse, String> {
    let client = client_for(config)?;
    let url = config.api_url("/auth/login");

    let request = LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    };

    let response = client.post(&url).json(&request).send().await.map_err(|e| {
        tracing::warn!("[AUTH] Login request failed: {}", e);
        "Network error".to_string()
    })?;

    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    if !status.is_success() {
        return Err(body_message(&body).unwrap_or_else(|| "Invalid email or password".to_string()));
    }

    serde_json::from_str::<AuthResponse>(&body).map_err(|e| {
        tracing::error!("[AUTH] Unexpected login response: {}", e);
        "Invalid response from server".to_string()
    })
}

/// Register a citizen account; returns the server's confirmation message
pub async fn register(config: &Config, name: &str, email: &str, password: &str) -> Result<String, String> {
    let client = client_for(config)?;
    let url = config.api_url("/auth/register");

    let request = RegisterRequest {
        name: name.to_string(),
        email: email.to_string(),
        password: password.to_string(),
    };

    let response = client.post(&url).json(&request).send().await.map_err(|e| {
        tracing::warn!("[AUTH] Register request failed: {}", e);
        "Network error".to_string()
    })?;

    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    if !status.is_success() {
        return Err(body_message(&body).unwrap_or_else(|| "User already exists".to_string()));
    }

    Ok(body_message(&body).unwrap_or_else(|| "Registration successful".to_string()))
}
