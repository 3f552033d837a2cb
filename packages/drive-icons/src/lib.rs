//! Drive icons: per-disk custom icon paths kept in the registry.
//!
//! Works against any [`regkey_store::RegistryKey`] root, so the same code
//! drives the host registry and the in-memory one used in tests.
//!
//! # Example
//!
//! ```rust
//! use regkey_drive_icons::{DriveIcons, Error};
//! use regkey_store::MemoryRegistry;
//!
//! let registry = MemoryRegistry::new("LocalMachine").unwrap();
//! let icons = DriveIcons::new(registry.root_writable());
//!
//! icons.set_icon_path('D', Some(r"D:\disk.ico")).unwrap();
//! icons.set_icon_path('D', None).unwrap();
//! assert_eq!(icons.icon_path('D').unwrap(), None);
//!
//! assert!(matches!(icons.icon_path('@'), Err(Error::OutOfRange { disk: '@' })));
//! ```

mod disk;
mod drive_icons;
mod error;

pub use disk::{disks, validate_disk, MAX_DISK, MIN_DISK};
pub use drive_icons::{DriveIcons, DEFAULT_ICON, DRIVE_ICONS_PATH};
pub use error::{Defect, Error};
