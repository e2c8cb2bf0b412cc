//! # Local Cache Module
//!
//! Persistent key-value storage for the client, in the spirit of browser
//! local storage: string keys, string values, a synchronous API. The last
//! known complaint and officer lists and the signed-in credential live here so
//! the client can fall back to them when the API is unreachable.
//!
//! ## Architecture
//!
//! - **In-memory map**: every read is served from memory and every write
//!   lands there before the call returns.
//! - **Durable mirror**: an SQLite table (`kv_store`) written by a single
//!   background writer task, in the order the writes were issued. Writes are
//!   fire-and-forget; `flush` waits for the queue to drain.
//! - **Storage events**: every set/remove is broadcast to subscribers so that
//!   sessions sharing a cache can react to each other's changes.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use cms_client::client::local_cache::{keys, LocalCache};
//!
//! # async fn example() -> Result<(), cms_client::client::local_cache::CacheError> {
//! let cache = LocalCache::open("/tmp/cms-cache.db").await?;
//! cache.set(keys::TOKEN, "jwt-token");
//! cache.flush().await?;
//! assert_eq!(cache.get(keys::TOKEN).as_deref(), Some("jwt-token"));
//! # Ok(())
//! # }
//! ```

pub mod schema;

use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot};

/// Storage keys used by the client
pub mod keys {
    /// JSON array of complaints
    pub const COMPLAINTS: &str = "cms_complaints";
    /// JSON array of officers
    pub const OFFICERS: &str = "cms_officers";
    /// JSON user record of the signed-in user
    pub const USER: &str = "cms_user";
    /// Opaque bearer token
    pub const TOKEN: &str = "cms_token";
}

const EVENT_CAPACITY: usize = 64;

/// Errors raised by the local cache
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("failed to prepare cache directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt cache entry '{key}': {message}")]
    Corrupt { key: String, message: String },

    #[error("failed to encode cache entry '{key}': {message}")]
    Encode { key: String, message: String },

    #[error("cache writer has shut down")]
    WriterClosed,
}

/// A change to a cache entry; `value` is `None` when the key was removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    pub key: String,
    pub value: Option<String>,
}

enum WriteCommand {
    Set { key: String, value: String },
    Remove { key: String },
    Flush(oneshot::Sender<()>),
}

struct CacheInner {
    entries: RwLock<HashMap<String, String>>,
    writer: Option<mpsc::UnboundedSender<WriteCommand>>,
    events: broadcast::Sender<StorageEvent>,
    path: Option<PathBuf>,
}

/// Handle to the local cache. Clones share the same entries and writer.
#[derive(Clone)]
pub struct LocalCache {
    inner: Arc<CacheInner>,
}

impl std::fmt::Debug for LocalCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalCache")
            .field("path", &self.inner.path)
            .field("entries", &self.read_entries().len())
            .finish()
    }
}

impl LocalCache {
    /// Open or create the cache database at `path` and load its entries.
    ///
    /// Must be called from within a tokio runtime; the writer task is spawned
    /// onto it.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, CacheError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        // One connection keeps writes strictly ordered
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        run_migrations(&pool).await?;

        let rows: Vec<(String, String)> = sqlx::query_as(schema::SELECT_ENTRIES)
            .fetch_all(&pool)
            .await?;
        tracing::info!("[CACHE] Opened {} with {} entries", path.display(), rows.len());

        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_writer(pool, rx));

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Ok(Self {
            inner: Arc::new(CacheInner {
                entries: RwLock::new(rows.into_iter().collect()),
                writer: Some(tx),
                events,
                path: Some(path),
            }),
        })
    }

    /// A cache with no durable mirror
    pub fn in_memory() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(CacheInner {
                entries: RwLock::new(HashMap::new()),
                writer: None,
                events,
                path: None,
            }),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.inner.path.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.read_entries().get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.read_entries().contains_key(key)
    }

    pub fn set(&self, key: &str, value: impl Into<String>) {
        let value = value.into();
        self.write_entries().insert(key.to_string(), value.clone());
        self.enqueue(WriteCommand::Set {
            key: key.to_string(),
            value: value.clone(),
        });
        self.notify(key, Some(value));
    }

    pub fn remove(&self, key: &str) {
        let existed = self.write_entries().remove(key).is_some();
        if !existed {
            return;
        }
        self.enqueue(WriteCommand::Remove { key: key.to_string() });
        self.notify(key, None);
    }

    /// Decode a JSON entry. Missing keys are `Ok(None)`.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        let Some(raw) = self.get(key) else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| CacheError::Corrupt {
                key: key.to_string(),
                message: e.to_string(),
            })
    }

    pub fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let raw = serde_json::to_string(value).map_err(|e| CacheError::Encode {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        self.set(key, raw);
        Ok(())
    }

    /// Subscribe to storage events from every handle on this cache
    pub fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.inner.events.subscribe()
    }

    /// Wait until every write issued so far is durable
    pub async fn flush(&self) -> Result<(), CacheError> {
        let Some(writer) = &self.inner.writer else {
            return Ok(());
        };
        let (ack_tx, ack_rx) = oneshot::channel();
        writer
            .send(WriteCommand::Flush(ack_tx))
            .map_err(|_| CacheError::WriterClosed)?;
        ack_rx.await.map_err(|_| CacheError::WriterClosed)
    }

    fn enqueue(&self, command: WriteCommand) {
        if let Some(writer) = &self.inner.writer {
            if writer.send(command).is_err() {
                tracing::error!("[CACHE] Writer task is gone, change kept in memory only");
            }
        }
    }

    fn notify(&self, key: &str, value: Option<String>) {
        // No subscribers is fine
        let _ = self.inner.events.send(StorageEvent {
            key: key.to_string(),
            value,
        });
    }

    fn read_entries(&self) -> RwLockReadGuard<'_, HashMap<String, String>> {
        self.inner.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_entries(&self) -> RwLockWriteGuard<'_, HashMap<String, String>> {
        self.inner.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Apply pending schema migrations
async fn run_migrations(pool: &SqlitePool) -> Result<(), CacheError> {
    sqlx::query(schema::CREATE_MIGRATIONS_TABLE).execute(pool).await?;

    let current_version: (i64,) =
        sqlx::query_as("SELECT COALESCE(MAX(version), 0) FROM schema_migrations")
            .fetch_one(pool)
            .await?;

    if !schema::needs_migration(current_version.0) {
        return Ok(());
    }

    for version in schema::get_pending_migrations(current_version.0) {
        if version == 1 {
            sqlx::query(schema::CREATE_KV_TABLE).execute(pool).await?;
        }
        sqlx::query("INSERT INTO schema_migrations (version, applied_at) VALUES (?, ?)")
            .bind(version)
            .bind(chrono::Utc::now().to_rfc3339())
            .execute(pool)
            .await?;
        tracing::debug!("[CACHE] Applied schema migration {}", version);
    }

    Ok(())
}

async fn run_writer(pool: SqlitePool, mut rx: mpsc::UnboundedReceiver<WriteCommand>) {
    while let Some(command) = rx.recv().await {
        let result = match command {
            WriteCommand::Set { key, value } => sqlx::query(schema::UPSERT_ENTRY)
                .bind(&key)
                .bind(&value)
                .bind(chrono::Utc::now().to_rfc3339())
                .execute(&pool)
                .await
                .map(|_| ())
                .map_err(|e| (key, e)),
            WriteCommand::Remove { key } => sqlx::query(schema::DELETE_ENTRY)
                .bind(&key)
                .execute(&pool)
                .await
                .map(|_| ())
                .map_err(|e| (key, e)),
            WriteCommand::Flush(ack) => {
                let _ = ack.send(());
                Ok(())
            }
        };

        if let Err((key, e)) = result {
            tracing::error!("[CACHE] Failed to persist '{}': {}", key, e);
        }
    }

    pool.close().await;
    tracing::debug!("[CACHE] Writer stopped");
}
