//! Session
//!
//! Composition root for one client session. Owns the configuration, the
//! local cache, the credential store and the synchronizer, and runs the
//! sign-in lifecycle on top of them.

use crate::client::auth::{self, AuthState, CredentialStore};
use crate::client::config::Config;
use crate::client::gateway::{ComplaintGateway, GatewayError};
use crate::client::local_cache::{keys, CacheError, LocalCache};
use crate::client::sync::ComplaintSynchronizer;
use crate::shared::config::ConfigError;
use crate::shared::user::User;
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

/// Failures that can stop a session from starting
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Local cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),
}

/// Central state of a signed-in (or signed-out) client
pub struct Session {
    config: Config,
    cache: LocalCache,
    synchronizer: ComplaintSynchronizer,
    auth_state: Arc<RwLock<AuthState>>,
    // Token this session last acted on; the storage watcher skips events that repeat it
    applied_token: Arc<RwLock<Option<String>>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("api", &self.config.api_base_url())
            .field("authenticated", &self.auth_state().authenticated)
            .field("synchronizer", &self.synchronizer)
            .finish()
    }
}

impl Session {
    /// Open the cache at the configured path and initialize
    pub async fn open(config: Config) -> Result<Self, SessionError> {
        let cache = LocalCache::open(config.cache_path()).await?;
        Self::with_cache(config, cache).await
    }

    /// Initialize on top of an existing cache: hydrate, restore the stored
    /// credential and, when signed in, fetch the role's complaints.
    pub async fn with_cache(config: Config, cache: LocalCache) -> Result<Self, SessionError> {
        let gateway = ComplaintGateway::new(config.clone())?;
        let synchronizer = ComplaintSynchronizer::new(gateway, cache.clone());
        synchronizer.hydrate();

        let session = Self {
            config,
            cache,
            synchronizer,
            auth_state: Arc::new(RwLock::new(AuthState::new())),
            applied_token: Arc::new(RwLock::new(None)),
        };

        match session.credentials().load() {
            Some(stored) => {
                tracing::info!("[SESSION] Restored session for {} ({})", stored.user.email, stored.user.role);
                let role = stored.user.role;
                session.set_applied_token(Some(stored.token.clone()));
                session.set_auth_state(AuthState::signed_in(stored.user));
                session.synchronizer.fetch_all(role, Some(&stored.token)).await;
            }
            None => tracing::info!("[SESSION] No stored session"),
        }

        Ok(session)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cache(&self) -> &LocalCache {
        &self.cache
    }

    pub fn synchronizer(&self) -> &ComplaintSynchronizer {
        &self.synchronizer
    }

    pub fn credentials(&self) -> &CredentialStore {
        self.synchronizer.credentials()
    }

    pub fn auth_state(&self) -> AuthState {
        read_auth(&self.auth_state).clone()
    }

    pub fn current_user(&self) -> Option<User> {
        read_auth(&self.auth_state).user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        read_auth(&self.auth_state).authenticated
    }

    /// Refetch complaints for the signed-in user
    pub async fn reload(&self) {
        let Some(user) = self.current_user() else {
            tracing::debug!("[SESSION] Not signed in, nothing to reload");
            return;
        };
        let token = self.credentials().token();
        self.synchronizer.fetch_all(user.role, token.as_deref()).await;
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User, String> {
        self.update_auth_state(|state| {
            state.loading = true;
            state.clear_error();
        });

        match auth::login(&self.config, email, password).await {
            Ok(response) => {
                tracing::info!("[SESSION] Signed in as {} ({})", response.user.email, response.user.role);
                self.set_applied_token(Some(response.token.clone()));
                self.credentials().save(&response.user, &response.token);
                self.set_auth_state(AuthState::signed_in(response.user.clone()));
                self.synchronizer
                    .fetch_all(response.user.role, Some(&response.token))
                    .await;
                Ok(response.user)
            }
            Err(message) => {
                tracing::warn!("[SESSION] Login failed: {}", message);
                self.update_auth_state(|state| {
                    state.loading = false;
                    state.set_error(message.clone());
                });
                Err(message)
            }
        }
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<String, String> {
        self.update_auth_state(|state| {
            state.loading = true;
            state.clear_error();
        });

        let result = auth::register(&self.config, name, email, password).await;
        self.update_auth_state(|state| {
            state.loading = false;
            if let Err(message) = &result {
                state.set_error(message.clone());
            }
        });
        result
    }

    pub fn logout(&self) {
        tracing::info!("[SESSION] Signing out");
        self.set_applied_token(None);
        self.credentials().clear();
        self.set_auth_state(AuthState::new());
        self.synchronizer.clear();
    }

    /// Follow credential changes made through any handle on this cache.
    ///
    /// A new token refetches for the stored user's role; a removed token
    /// signs this session out. Writes this session made itself are skipped.
    /// The listener stops when the returned handle is dropped.
    pub fn watch_storage(&self) -> StorageWatch {
        let mut events = self.cache.subscribe();
        let synchronizer = self.synchronizer.clone();
        let auth_state = Arc::clone(&self.auth_state);
        let applied_token = Arc::clone(&self.applied_token);

        let task = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) if event.key == keys::TOKEN => {
                        let token = event.value.filter(|token| !token.trim().is_empty());
                        if !replace_applied(&applied_token, &token) {
                            continue;
                        }
                        apply_token_change(&synchronizer, &auth_state, token).await;
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!("[SESSION] Missed {} storage events", skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        StorageWatch { task }
    }

    fn set_applied_token(&self, token: Option<String>) {
        *self.applied_token.write().unwrap_or_else(PoisonError::into_inner) = token;
    }

    fn set_auth_state(&self, state: AuthState) {
        *self.auth_state.write().unwrap_or_else(PoisonError::into_inner) = state;
    }

    fn update_auth_state(&self, f: impl FnOnce(&mut AuthState)) {
        let mut state = self.auth_state.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut *state);
    }
}

/// Record `token` as applied; false when it was already the applied one
fn replace_applied(applied: &RwLock<Option<String>>, token: &Option<String>) -> bool {
    let mut applied = applied.write().unwrap_or_else(PoisonError::into_inner);
    if *applied == *token {
        return false;
    }
    *applied = token.clone();
    true
}

async fn apply_token_change(
    synchronizer: &ComplaintSynchronizer,
    auth_state: &RwLock<AuthState>,
    token: Option<String>,
) {
    match token {
        Some(token) => {
            let Some(user) = synchronizer.credentials().user() else {
                tracing::debug!("[SESSION] Token changed without a stored user");
                return;
            };
            tracing::info!("[SESSION] Credential changed elsewhere, refetching as {}", user.role);
            let role = user.role;
            *auth_state.write().unwrap_or_else(PoisonError::into_inner) = AuthState::signed_in(user);
            synchronizer.fetch_all(role, Some(&token)).await;
        }
        None => {
            tracing::info!("[SESSION] Credential removed elsewhere, clearing state");
            *auth_state.write().unwrap_or_else(PoisonError::into_inner) = AuthState::new();
            synchronizer.clear();
        }
    }
}

fn read_auth(state: &RwLock<AuthState>) -> std::sync::RwLockReadGuard<'_, AuthState> {
    state.read().unwrap_or_else(PoisonError::into_inner)
}

/// Storage listener started by [`Session::watch_storage`]; aborted on drop
#[derive(Debug)]
pub struct StorageWatch {
    task: JoinHandle<()>,
}

impl StorageWatch {
    pub fn stop(self) {}
}

impl Drop for StorageWatch {
    fn drop(&mut self) {
        self.task.abort();
    }
}
