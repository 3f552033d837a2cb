//! Error types for drive icon operations.

use std::fmt;

use regkey_store::ValueKind;

/// What is wrong with an existing drive icon key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Defect {
    /// The disk key has no `DefaultIcon` subkey.
    MissingDefaultIcon,
    /// The icon value is present but is not text.
    NotAString(ValueKind),
    /// `DefaultIcon` has subkeys of its own.
    UnexpectedSubKeys(Vec<String>),
    /// `DefaultIcon` holds values other than the single unnamed one.
    UnexpectedValues(Vec<String>),
}

impl fmt::Display for Defect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Defect::MissingDefaultIcon => write!(f, "no DefaultIcon subKey"),
            Defect::NotAString(kind) => {
                write!(f, "default icon value is {:?}, not a string", kind)
            }
            Defect::UnexpectedSubKeys(names) => {
                write!(f, "DefaultIcon has subKeys [{}]", names.join(", "))
            }
            Defect::UnexpectedValues(names) => {
                write!(f, "DefaultIcon has values {:?}", names)
            }
        }
    }
}

/// Errors from [`DriveIcons`](crate::DriveIcons).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The disk letter is outside `'A'..='Z'`.
    #[error("Disk {disk} is not in range.")]
    OutOfRange { disk: char },

    /// The disk's key exists but does not have the expected shape.
    #[error("Key for disk {disk} looks very strange: {defect}")]
    Inconsistent { disk: char, defect: Defect },

    /// The underlying registry failed.
    #[error("registry error: {0}")]
    Store(#[from] regkey_store::Error),
}
