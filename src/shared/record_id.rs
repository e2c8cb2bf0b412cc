//! Canonical Record Identifier
//!
//! Complaint and officer ids reach the client as JSON strings from some
//! endpoints and as JSON numbers from others. Everything is normalized to a
//! string here, at the boundary, so that the rest of the crate can compare ids
//! with plain equality.
//!
//! # Usage
//!
//! ```rust
//! use cms_client::shared::RecordId;
//!
//! let from_number = RecordId::from(42u64);
//! let from_text = RecordId::from("42");
//! assert_eq!(from_number, from_text);
//! ```

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

/// Prefix carried by ids generated on the client before the server assigns one
pub const PROVISIONAL_PREFIX: &str = "local-";

/// Identifier of a complaint or officer, always held as a string
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Generate a provisional client-side id (`local-<uuid>`)
    pub fn provisional() -> Self {
        Self(format!("{}{}", PROVISIONAL_PREFIX, Uuid::new_v4()))
    }

    /// Whether this id was generated locally and never confirmed by the server
    pub fn is_provisional(&self) -> bool {
        self.0.starts_with(PROVISIONAL_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<&String> for RecordId {
    fn from(value: &String) -> Self {
        Self(value.clone())
    }
}

impl From<&RecordId> for RecordId {
    fn from(value: &RecordId) -> Self {
        value.clone()
    }
}

macro_rules! record_id_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for RecordId {
                fn from(value: $ty) -> Self {
                    Self(value.to_string())
                }
            }
        )*
    };
}

record_id_from_int!(u32, u64, i32, i64, usize);

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

struct RecordIdVisitor;

impl<'de> Visitor<'de> for RecordIdVisitor {
    type Value = RecordId;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a string or integer id, or an object carrying one")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<RecordId, E> {
        Ok(RecordId::from(value))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<RecordId, E> {
        Ok(RecordId::from(value))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<RecordId, E> {
        Ok(RecordId::from(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<RecordId, E> {
        Ok(RecordId::from(value))
    }

    // Populated references arrive as the referenced record
    fn visit_map<A: de::MapAccess<'de>>(self, mut map: A) -> Result<RecordId, A::Error> {
        let mut found = None;
        while let Some(key) = map.next_key::<String>()? {
            if found.is_none() && (key == "_id" || key == "id") {
                found = Some(map.next_value::<RecordId>()?);
            } else {
                map.next_value::<de::IgnoredAny>()?;
            }
        }
        found.ok_or_else(|| de::Error::missing_field("_id"))
    }

    // Integral floats (`7.0`) are what some JSON encoders emit for numeric ids
    fn visit_f64<E: de::Error>(self, value: f64) -> Result<RecordId, E> {
        if value.fract() == 0.0 && value.is_finite() {
            Ok(RecordId::from(value as i64))
        } else {
            Ok(RecordId::from(value.to_string()))
        }
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RecordIdVisitor)
    }
}
