//! Integration tests
//!
//! Synchronizer, session and cache behavior against a mock complaint API

mod auth_test;
mod cache_test;
mod session_test;
