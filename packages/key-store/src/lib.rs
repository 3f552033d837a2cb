//! Registry key store: handles over a hierarchical key/value namespace.
//!
//! The namespace follows the Windows registry model:
//! - `KeyPath`: backslash-separated path to a key
//! - `Scalar`: value attached to a key, addressed by name (empty name is
//!   the key's unnamed default value)
//! - `RegistryKey`: a `(path, writable)` handle, the only interface higher
//!   layers use
//!
//! `MemoryRegistry` is a complete in-memory implementation for tests and
//! tools; a host-backed registry implements the same trait.
//!
//! # Example
//!
//! ```rust
//! use regkey_store::{MemoryRegistry, RegistryKey, Error};
//!
//! fn ensure_software(root: &dyn RegistryKey) -> Result<(), Error> {
//!     root.create_sub_key("SOFTWARE")?;
//!     Ok(())
//! }
//!
//! let registry = MemoryRegistry::new("LocalMachine").unwrap();
//! ensure_software(&registry.root_writable()).unwrap();
//! assert!(registry.contains_key(r"LocalMachine\SOFTWARE"));
//! ```

mod error;
mod in_memory;
mod path;
mod traits;
mod value;

pub use error::{Error, Operation};
pub use in_memory::{KeySpaceSnapshot, MemoryKey, MemoryRegistry};
pub use path::{KeyPath, PathError, MAX_NAME_LEN, SEPARATOR};
pub use traits::RegistryKey;
pub use value::{Scalar, ValueKind};
