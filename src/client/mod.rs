//! Client Module
//!
//! # Architecture
//!
//! - **`config`** - Runtime configuration (API URL, cache path, timeout)
//! - **`local_cache`** - SQLite-backed key-value cache with change events
//! - **`auth`** - Credential store and the login/register calls
//! - **`gateway`** - HTTP client for the complaint endpoints
//! - **`sync`** - Complaint state synchronizer (optimistic writes)
//! - **`session`** - Composition root and sign-in lifecycle
//! - **`queries`** - Role-scoped projections for views
//!
//! # Module Structure
//!
//! ```text
//! client/
//! ├── mod.rs          - Module exports and documentation
//! ├── main.rs         - Command-line front end (binary)
//! ├── config.rs       - Configuration
//! ├── auth.rs         - Credentials and auth calls
//! ├── gateway.rs      - Complaint API client
//! ├── session.rs      - Session lifecycle
//! ├── queries.rs      - Read-side projections
//! ├── local_cache/    - Durable key-value cache
//! └── sync/           - Synchronizer and pending background work
//! ```

pub mod config;
pub mod local_cache;
pub mod auth;
pub mod gateway;
pub mod sync;
pub mod session;
pub mod queries;

// Re-export commonly used types
pub use config::Config;
pub use local_cache::{CacheError, LocalCache, StorageEvent};
pub use auth::{AuthState, CredentialStore, StoredSession};
pub use gateway::{ComplaintGateway, GatewayError};
pub use sync::{ComplaintSynchronizer, PendingSync, SyncError, SyncSnapshot, WriteOutcome};
pub use session::{Session, SessionError, StorageWatch};
pub use queries::{citizen_directory, status_counts, visible_complaints, ComplaintFilter, StatusCounts};
