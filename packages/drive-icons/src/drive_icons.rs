//! Custom drive icons, one per disk letter.
//!
//! Explorer reads the icon for drive `T` from the unnamed value of
//!
//! ```text
//! SOFTWARE\Microsoft\Windows\CurrentVersion\Explorer\DriveIcons\T\DefaultIcon
//! ```
//!
//! below the machine root. [`DriveIcons`] reads, writes and removes that
//! value and refuses to touch a disk key whose layout it does not
//! recognize.

use regkey_store::{Error as StoreError, RegistryKey, Scalar, ValueKind, SEPARATOR};

use crate::disk::validate_disk;
use crate::error::{Defect, Error};

/// Segments from the machine root down to the per-disk keys.
pub const DRIVE_ICONS_PATH: [&str; 6] = [
    "SOFTWARE",
    "Microsoft",
    "Windows",
    "CurrentVersion",
    "Explorer",
    "DriveIcons",
];

/// Subkey of a disk key holding the icon path.
pub const DEFAULT_ICON: &str = "DefaultIcon";

type Handle = Box<dyn RegistryKey>;

/// Drive icon settings stored under a registry root.
///
/// The root handle is never closed by this type. Pass `&key` to keep
/// ownership of it.
///
/// # Example
///
/// ```rust
/// use regkey_drive_icons::DriveIcons;
/// use regkey_store::MemoryRegistry;
///
/// let registry = MemoryRegistry::new("LocalMachine").unwrap();
/// let root = registry.root_writable();
/// let icons = DriveIcons::new(&root);
///
/// assert_eq!(icons.icon_path('T').unwrap(), None);
/// icons.write_icon_path('T', r"C:\icons\t.ico").unwrap();
/// assert_eq!(icons.icon_path('T').unwrap().as_deref(), Some(r"C:\icons\t.ico"));
/// ```
pub struct DriveIcons<K> {
    root: K,
}

impl<K: RegistryKey> DriveIcons<K> {
    pub fn new(root: K) -> Self {
        Self { root }
    }

    pub fn into_root(self) -> K {
        self.root
    }

    /// The icon path configured for `disk`, if any.
    ///
    /// A missing key anywhere along the way means no icon is configured.
    /// That includes the fixed `DRIVE_ICONS_PATH` itself: on a registry
    /// where it was never created this returns `Ok(None)` instead of
    /// `Error::NotFound`.
    ///
    /// # Errors
    ///
    /// * `Error::OutOfRange` - `disk` is not in `'A'..='Z'`.
    /// * `Error::Inconsistent` - the disk key lacks `DefaultIcon`, or the
    ///   icon value is not a string.
    pub fn icon_path(&self, disk: char) -> Result<Option<String>, Error> {
        validate_disk(disk)?;
        let letter = disk.to_string();

        let Some(icons) = self.walk(open_existing)? else {
            return Ok(None);
        };
        let Some(disk_key) = open_if_listed(icons.as_ref(), &letter)? else {
            return Ok(None);
        };
        let icon = default_icon(disk, disk_key.as_ref())?;

        match icon.get_value("", Scalar::Null)? {
            Scalar::Null => Ok(None),
            Scalar::String(path) => Ok(Some(path)),
            other => Err(inconsistent(disk, Defect::NotAString(other.kind()))),
        }
    }

    /// Set or remove the icon of `disk`: `None` removes it.
    pub fn set_icon_path(&self, disk: char, path: Option<&str>) -> Result<(), Error> {
        match path {
            Some(path) => self.write_icon_path(disk, path),
            None => self.delete_icon_path(disk),
        }
    }

    /// Store `path` as the icon of `disk`, creating keys as needed.
    ///
    /// # Errors
    ///
    /// * `Error::OutOfRange` - `disk` is not in `'A'..='Z'`.
    /// * `Error::Store` - the root handle is readonly.
    pub fn write_icon_path(&self, disk: char, path: &str) -> Result<(), Error> {
        validate_disk(disk)?;
        let letter = disk.to_string();

        let icons = self
            .walk(|parent, name| parent.create_sub_key(name).map(Some))?
            .ok_or_else(|| self.missing_path())?;
        let disk_key = icons.create_sub_key(&letter)?;
        let icon = disk_key.create_sub_key(DEFAULT_ICON)?;
        icon.set_value("", Scalar::from(path))?;

        log::debug!("Set icon for disk {} to {}", disk, path);
        Ok(())
    }

    /// Remove the icon of `disk` together with its disk key.
    ///
    /// Nothing happens if no key exists for `disk`. The key is only deleted
    /// if it holds exactly a `DefaultIcon` subkey with a single unnamed
    /// string value; anything else is reported rather than destroyed.
    ///
    /// # Errors
    ///
    /// * `Error::OutOfRange` - `disk` is not in `'A'..='Z'`.
    /// * `Error::Inconsistent` - the disk key has an unexpected layout.
    pub fn delete_icon_path(&self, disk: char) -> Result<(), Error> {
        validate_disk(disk)?;
        let letter = disk.to_string();

        let existing = match self.walk(open_existing)? {
            Some(icons) => open_if_listed(icons.as_ref(), &letter)?,
            None => None,
        };
        let Some(disk_key) = existing else {
            log::debug!("No icon key for disk {}, nothing to delete", disk);
            return Ok(());
        };

        let icon = default_icon(disk, disk_key.as_ref())?;
        check_icon_layout(disk, icon.as_ref())?;

        let icons = self
            .walk(|parent, name| parent.open_sub_key_writable(name).map(Some))?
            .ok_or_else(|| self.missing_path())?;
        icons.delete_sub_key_tree(&letter)?;

        log::debug!("Deleted icon for disk {}", disk);
        Ok(())
    }

    /// Follow `DRIVE_ICONS_PATH` from the root, one `step` per segment.
    ///
    /// Each intermediate handle is closed once the next one is open. Stops
    /// with `None` as soon as a step does.
    fn walk<F>(&self, mut step: F) -> Result<Option<Handle>, StoreError>
    where
        F: FnMut(&dyn RegistryKey, &str) -> Result<Option<Handle>, StoreError>,
    {
        let mut current: Option<Handle> = None;
        for segment in DRIVE_ICONS_PATH {
            let parent: &dyn RegistryKey = match &current {
                Some(key) => key.as_ref(),
                None => &self.root,
            };
            let Some(next) = step(parent, segment)? else {
                log::trace!("{} has no subKey {}", parent.path(), segment);
                return Ok(None);
            };
            if let Some(mut previous) = current.replace(next) {
                previous.close();
            }
        }
        Ok(current)
    }

    fn missing_path(&self) -> StoreError {
        let separator = SEPARATOR.to_string();
        StoreError::NotFound {
            path: format!(
                "{}{}{}",
                self.root.path(),
                separator,
                DRIVE_ICONS_PATH.join(separator.as_str())
            ),
        }
    }
}

/// Open `name` below `parent` if the key exists.
fn open_existing(parent: &dyn RegistryKey, name: &str) -> Result<Option<Handle>, StoreError> {
    match parent.open_sub_key(name) {
        Ok(key) => Ok(Some(key)),
        Err(err) if err.is_not_found() => Ok(None),
        Err(err) => Err(err),
    }
}

/// Open `name` below `parent` if `parent` lists it as a subkey.
fn open_if_listed(parent: &dyn RegistryKey, name: &str) -> Result<Option<Handle>, StoreError> {
    if !parent.sub_key_names()?.iter().any(|n| n == name) {
        return Ok(None);
    }
    parent.open_sub_key(name).map(Some)
}

fn default_icon(disk: char, disk_key: &dyn RegistryKey) -> Result<Handle, Error> {
    open_if_listed(disk_key, DEFAULT_ICON)?
        .ok_or_else(|| inconsistent(disk, Defect::MissingDefaultIcon))
}

fn check_icon_layout(disk: char, icon: &dyn RegistryKey) -> Result<(), Error> {
    let sub_keys = icon.sub_key_names()?;
    if !sub_keys.is_empty() {
        return Err(inconsistent(disk, Defect::UnexpectedSubKeys(sub_keys)));
    }

    let values = icon.value_names()?;
    if values.len() != 1 || !values[0].is_empty() {
        return Err(inconsistent(disk, Defect::UnexpectedValues(values)));
    }

    match icon.value_kind("")? {
        ValueKind::String => Ok(()),
        kind => Err(inconsistent(disk, Defect::NotAString(kind))),
    }
}

fn inconsistent(disk: char, defect: Defect) -> Error {
    log::warn!("Drive icon key for disk {} is inconsistent: {}", disk, defect);
    Error::Inconsistent { disk, defect }
}
