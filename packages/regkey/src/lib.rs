//! regkey: a uniform handle interface over hierarchical registry keys.
//!
//! Code that reads or repairs registry state is written once against
//! [`RegistryKey`] and runs unchanged on the host registry or on the
//! in-memory [`MemoryRegistry`]. [`DriveIcons`] is built on that interface.

pub use regkey_drive_icons::{self as drive_icons, DriveIcons};
pub use regkey_store::{self as store, MemoryRegistry, RegistryKey};
