//! Property-based tests

mod payload_proptest;
