//! Error types for registry key operations.

use std::fmt;

use crate::path::PathError;

/// A mutating key operation that needs a writable handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    CreateSubKey,
    DeleteSubKeyTree,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::CreateSubKey => write!(f, "create subKeys"),
            Operation::DeleteSubKeyTree => write!(f, "delete subtree"),
        }
    }
}

/// Errors raised by a registry key handle.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A subkey was opened that does not exist.
    #[error("Cannot open non-existent subKey {path}.")]
    NotFound { path: String },

    /// A create or delete was attempted through a readonly handle.
    #[error("Cannot {operation} in a readonly key {path}.")]
    PermissionDenied { path: String, operation: Operation },

    /// The store lost an entry it had just enumerated.
    ///
    /// Always a defect in the store, never an expected outcome.
    #[error("Key {key} was supposed be in the registry but it was not.")]
    InternalInconsistency { key: String },

    /// A key name or path failed validation.
    #[error("{0}")]
    Path(#[from] PathError),
}

impl Error {
    /// True for [`Error::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}
