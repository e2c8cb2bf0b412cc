//! CMS Client - Main Library
//!
//! Offline-tolerant client for a civic complaint management API. Citizens
//! submit complaints, officers work the ones assigned to them and admins see
//! everything, assign officers and manage the officer roster.
//!
//! # Module Structure
//!
//! - **`shared`** - Plain data types: complaints, officers, users, payload
//!   shapes, configuration and shared errors
//! - **`client`** - Everything that runs: local cache, credential store,
//!   complaint gateway, the synchronizer, the session and read-side queries
//!
//! # Consistency Model
//!
//! Writes apply locally first and sync in the background. The local cache
//! holds the last known complaint and officer lists so a session can start,
//! and keep reading, while the server is unreachable.
//!
//! # Usage
//!
//! ```rust,no_run
//! use cms_client::client::{Config, Session};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let session = Session::open(Config::from_env()?).await?;
//! session.login("admin@cms.gov", "secret").await?;
//!
//! for complaint in session.synchronizer().complaints() {
//!     println!("{} [{}]", complaint.title, complaint.status);
//! }
//! # Ok(())
//! # }
//! ```

/// Shared types and data structures
pub mod shared;

/// Client runtime: cache, gateway, synchronizer and session
pub mod client;
