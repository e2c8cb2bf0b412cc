//! Common test utilities and helpers
//!
//! This module provides shared utilities for all tests including:
//! - Temporary cache files
//! - Mock complaint API helpers
//! - Users and complaint records
//! - Custom assertion macros

pub mod assertions;
pub mod cache;
pub mod fixtures;
pub mod mock_server;

// Re-export commonly used utilities
pub use assertions::*;
pub use cache::*;
pub use fixtures::*;
pub use mock_server::*;
