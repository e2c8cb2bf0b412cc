//! Custom assertion macros and utilities
//!
//! Provides enhanced assertion macros for better test output and
//! more descriptive error messages.

use cms_client::client::WriteOutcome;
use cms_client::shared::Complaint;

/// Assert that a result is ok and return the value
#[macro_export]
macro_rules! assert_ok {
    ($result:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
    ($result:expr, $message:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("{}: {:?}", $message, e),
        }
    };
}

/// Assert that a string contains a substring
#[macro_export]
macro_rules! assert_contains {
    ($haystack:expr, $needle:expr) => {{
        let haystack = $haystack;
        let needle = $needle;
        assert!(
            haystack.contains(needle),
            "Expected '{}' to contain '{}'",
            haystack,
            needle
        );
    }};
}

/// Assert the complaint list holds exactly these ids, in order
pub fn assert_complaint_ids(complaints: &[Complaint], expected: &[&str]) {
    let ids: Vec<&str> = complaints.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, expected, "Unexpected complaint ids");
}

/// Assert a write reached the server
pub fn assert_synced(outcome: &WriteOutcome) {
    assert!(
        outcome.success && outcome.synced,
        "Expected a synced outcome, got {:?}",
        outcome
    );
}

/// Assert a write was kept locally without server confirmation
pub fn assert_local_only(outcome: &WriteOutcome) {
    assert!(
        outcome.success && !outcome.synced,
        "Expected a local-only outcome, got {:?}",
        outcome
    );
}
