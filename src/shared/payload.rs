//! Response Payload Shapes
//!
//! The complaint API is not consistent about how it wraps its results. List
//! endpoints answer with any of:
//!
//! - a bare array: `[ {...}, {...} ]`
//! - an object with a named collection field: `{ "complaints": [ ... ] }`
//! - an object with a `data` field: `{ "data": [ ... ] }`
//!
//! and record endpoints (submit) answer with the record itself, or wrap it in
//! `{ "complaint": {...} }` or `{ "data": {...} }`.
//!
//! Each family is modeled as a tagged union with a single discriminator
//! (`from_value`) so callers never probe shapes themselves. Shapes outside the
//! accepted set are `Unrecognized`, which normalizes to "nothing". Inside an
//! accepted list, records that do not decode are skipped one by one; the rest
//! of the list is kept.

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Accepted shapes of a list response
#[derive(Debug, Clone, PartialEq)]
pub enum ListPayload<T> {
    /// `[ ... ]`
    Bare(Vec<T>),
    /// `{ "<collection>": [ ... ] }`
    Named(Vec<T>),
    /// `{ "data": [ ... ] }`
    Data(Vec<T>),
    /// Valid JSON in some other shape
    Unrecognized,
}

impl<T: DeserializeOwned> ListPayload<T> {
    /// Classify a decoded JSON body. `collection` is the named field to look
    /// for (`"complaints"` for the complaint endpoints).
    ///
    pub fn from_value(value: Value, collection: &str) -> Self {
        match value {
            Value::Array(items) => Self::Bare(decode_items(items)),
            Value::Object(mut map) => {
                if let Some(Value::Array(items)) = map.remove(collection) {
                    return Self::Named(decode_items(items));
                }
                if let Some(Value::Array(items)) = map.remove("data") {
                    return Self::Data(decode_items(items));
                }
                Self::Unrecognized
            }
            _ => Self::Unrecognized,
        }
    }
}

impl<T> ListPayload<T> {
    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized)
    }

    pub fn shape(&self) -> &'static str {
        match self {
            Self::Bare(_) => "bare array",
            Self::Named(_) => "named collection",
            Self::Data(_) => "data array",
            Self::Unrecognized => "unrecognized",
        }
    }

    pub fn into_records(self) -> Vec<T> {
        match self {
            Self::Bare(items) | Self::Named(items) | Self::Data(items) => items,
            Self::Unrecognized => Vec::new(),
        }
    }
}

fn decode_items<T: DeserializeOwned>(items: Vec<Value>) -> Vec<T> {
    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("[PAYLOAD] Skipping record {} that does not decode: {}", index, e);
                None
            }
        })
        .collect()
}

/// Accepted shapes of a single-record response
#[derive(Debug, Clone, PartialEq)]
pub enum RecordPayload<T> {
    /// The record itself
    Bare(T),
    /// `{ "<field>": { ... } }`
    Named(T),
    /// `{ "data": { ... } }`
    Data(T),
    Unrecognized,
}

impl<T: DeserializeOwned> RecordPayload<T> {
    /// Classify a decoded JSON body; `field` is the wrapper key (`"complaint"`).
    /// A body that matches no shape, or whose record does not decode, is
    /// `Unrecognized`: submit responses are advisory and never fatal.
    pub fn from_value(value: Value, field: &str) -> Self {
        let Value::Object(mut map) = value else {
            return Self::Unrecognized;
        };

        if let Some(inner @ Value::Object(_)) = map.remove(field) {
            if let Ok(record) = serde_json::from_value(inner) {
                return Self::Named(record);
            }
        }
        if let Some(inner @ Value::Object(_)) = map.remove("data") {
            if let Ok(record) = serde_json::from_value(inner) {
                return Self::Data(record);
            }
        }

        match serde_json::from_value(Value::Object(map)) {
            Ok(record) => Self::Bare(record),
            Err(_) => Self::Unrecognized,
        }
    }
}

impl<T> RecordPayload<T> {
    pub fn into_record(self) -> Option<T> {
        match self {
            Self::Bare(record) | Self::Named(record) | Self::Data(record) => Some(record),
            Self::Unrecognized => None,
        }
    }
}
