//! Scalar values stored in registry keys.

use serde::{Deserialize, Serialize};

/// A value attached to a registry key.
///
/// Only strings and null carry meaning for callers of this crate. The other
/// variants stand in for whatever else a backing store can hold, so that
/// "present but not a string" stays representable.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scalar {
    /// A stored null. Distinct from "no such value".
    #[default]
    Null,
    /// Text value.
    String(String),
    /// Numeric value.
    Integer(i64),
    /// Binary value.
    Bytes(Vec<u8>),
}

impl Scalar {
    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    /// Borrow the text of a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }

    /// The kind reported for this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Scalar::String(_) => ValueKind::String,
            Scalar::Null => ValueKind::None,
            Scalar::Integer(_) | Scalar::Bytes(_) => ValueKind::Unknown,
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::String(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::String(s)
    }
}

impl From<Option<String>> for Scalar {
    fn from(s: Option<String>) -> Self {
        s.map(Scalar::String).unwrap_or_default()
    }
}

/// The type of a stored value, as far as this crate distinguishes them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueKind {
    /// A text value.
    String,
    /// No value, or a stored null.
    None,
    /// Any other scalar.
    Unknown,
}
