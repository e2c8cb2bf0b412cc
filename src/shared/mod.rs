//! Shared Module
//!
//! Types shared by every part of the client: the complaint and officer
//! records, the authenticated user, the wire request/response types and the
//! payload shapes the complaint API answers with.
//!
//! # Overview
//!
//! All types are plain data designed for serialization, both over HTTP and
//! into the local cache.

/// Canonical string ids
pub mod record_id;

/// Complaint data structure
pub mod complaint;

/// Officer data structure
pub mod officer;

/// Authenticated user and auth wire types
pub mod user;

/// List and record response shapes
pub mod payload;

/// Shared error types
pub mod error;

/// Application configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use record_id::RecordId;
pub use complaint::{Complaint, ComplaintCategory, ComplaintStatus, NewComplaint};
pub use officer::{NewOfficer, Officer};
pub use user::{AuthResponse, User, UserRole};
pub use payload::{ListPayload, RecordPayload};
pub use error::SharedError;
pub use config::{AppConfig, AppConfigBuilder, ConfigError};
