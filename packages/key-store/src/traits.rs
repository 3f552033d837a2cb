//! The registry key handle trait.

use std::fmt;

use crate::{Error, KeyPath, Scalar, ValueKind};

/// A handle to one key of a hierarchical registry.
///
/// A handle is a `(path, writable)` view over a store it does not own. Many
/// handles may point at the same key; closing one never affects the others.
/// All names passed to these methods are short, single-segment names
/// relative to the handle's own path.
///
/// # Object Safety
///
/// This trait is object-safe: subkey operations return `Box<dyn RegistryKey>`
/// so host-backed and in-memory stores can be swapped behind one interface.
pub trait RegistryKey: Send + Sync {
    /// Full path of the key this handle refers to.
    fn path(&self) -> &KeyPath;

    /// Whether create/delete operations are permitted through this handle.
    fn is_writable(&self) -> bool;

    /// Open an existing subkey for reading.
    ///
    /// The returned handle is readonly regardless of this handle's flag.
    ///
    /// # Errors
    ///
    /// * `Error::NotFound` - the subkey does not exist.
    fn open_sub_key(&self, name: &str) -> Result<Box<dyn RegistryKey>, Error>;

    /// Open an existing subkey for writing.
    ///
    /// # Errors
    ///
    /// * `Error::NotFound` - the subkey does not exist.
    fn open_sub_key_writable(&self, name: &str) -> Result<Box<dyn RegistryKey>, Error>;

    /// Open a subkey for writing, creating it empty first if it is missing.
    ///
    /// Repeated calls with the same name refer to the same key.
    ///
    /// # Errors
    ///
    /// * `Error::PermissionDenied` - this handle is readonly.
    fn create_sub_key(&self, name: &str) -> Result<Box<dyn RegistryKey>, Error>;

    /// Delete the subkey `name` together with every key below it.
    ///
    /// Values stored under the deleted keys are left in place. Deleting a
    /// subkey that does not exist succeeds without doing anything.
    ///
    /// # Errors
    ///
    /// * `Error::PermissionDenied` - this handle is readonly.
    /// * `Error::InternalInconsistency` - an entry vanished mid-deletion.
    fn delete_sub_key_tree(&self, name: &str) -> Result<(), Error>;

    /// Read the value `name`, or `default` if there is no such value.
    ///
    /// The empty name addresses the key's unnamed default value.
    fn get_value(&self, name: &str, default: Scalar) -> Result<Scalar, Error>;

    /// Store `value` under `name`, replacing any previous value.
    fn set_value(&self, name: &str, value: Scalar) -> Result<(), Error>;

    /// The kind of the value `name`; `ValueKind::None` if it is absent.
    fn value_kind(&self, name: &str) -> Result<ValueKind, Error> {
        Ok(self.get_value(name, Scalar::Null)?.kind())
    }

    /// Short names of the subkeys of this key.
    fn sub_key_names(&self) -> Result<Vec<String>, Error>;

    /// Names of the values of this key.
    fn value_names(&self) -> Result<Vec<String>, Error>;

    /// Release the handle. Calling it again does nothing.
    ///
    /// Owned handles should also release themselves when dropped.
    fn close(&mut self);

    /// Whether `close` has been called.
    fn is_closed(&self) -> bool;
}

impl fmt::Debug for dyn RegistryKey + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryKey")
            .field("path", &self.path().to_string())
            .field("writable", &self.is_writable())
            .finish()
    }
}

// Blanket implementations for references and boxes.
//
// A borrowed handle belongs to someone else, so closing through the borrow
// leaves it open.

impl<T: RegistryKey + ?Sized> RegistryKey for &T {
    fn path(&self) -> &KeyPath {
        (**self).path()
    }

    fn is_writable(&self) -> bool {
        (**self).is_writable()
    }

    fn open_sub_key(&self, name: &str) -> Result<Box<dyn RegistryKey>, Error> {
        (**self).open_sub_key(name)
    }

    fn open_sub_key_writable(&self, name: &str) -> Result<Box<dyn RegistryKey>, Error> {
        (**self).open_sub_key_writable(name)
    }

    fn create_sub_key(&self, name: &str) -> Result<Box<dyn RegistryKey>, Error> {
        (**self).create_sub_key(name)
    }

    fn delete_sub_key_tree(&self, name: &str) -> Result<(), Error> {
        (**self).delete_sub_key_tree(name)
    }

    fn get_value(&self, name: &str, default: Scalar) -> Result<Scalar, Error> {
        (**self).get_value(name, default)
    }

    fn set_value(&self, name: &str, value: Scalar) -> Result<(), Error> {
        (**self).set_value(name, value)
    }

    fn value_kind(&self, name: &str) -> Result<ValueKind, Error> {
        (**self).value_kind(name)
    }

    fn sub_key_names(&self) -> Result<Vec<String>, Error> {
        (**self).sub_key_names()
    }

    fn value_names(&self) -> Result<Vec<String>, Error> {
        (**self).value_names()
    }

    fn close(&mut self) {}

    fn is_closed(&self) -> bool {
        (**self).is_closed()
    }
}

impl<T: RegistryKey + ?Sized> RegistryKey for Box<T> {
    fn path(&self) -> &KeyPath {
        self.as_ref().path()
    }

    fn is_writable(&self) -> bool {
        self.as_ref().is_writable()
    }

    fn open_sub_key(&self, name: &str) -> Result<Box<dyn RegistryKey>, Error> {
        self.as_ref().open_sub_key(name)
    }

    fn open_sub_key_writable(&self, name: &str) -> Result<Box<dyn RegistryKey>, Error> {
        self.as_ref().open_sub_key_writable(name)
    }

    fn create_sub_key(&self, name: &str) -> Result<Box<dyn RegistryKey>, Error> {
        self.as_ref().create_sub_key(name)
    }

    fn delete_sub_key_tree(&self, name: &str) -> Result<(), Error> {
        self.as_ref().delete_sub_key_tree(name)
    }

    fn get_value(&self, name: &str, default: Scalar) -> Result<Scalar, Error> {
        self.as_ref().get_value(name, default)
    }

    fn set_value(&self, name: &str, value: Scalar) -> Result<(), Error> {
        self.as_ref().set_value(name, value)
    }

    fn value_kind(&self, name: &str) -> Result<ValueKind, Error> {
        self.as_ref().value_kind(name)
    }

    fn sub_key_names(&self) -> Result<Vec<String>, Error> {
        self.as_ref().sub_key_names()
    }

    fn value_names(&self) -> Result<Vec<String>, Error> {
        self.as_ref().value_names()
    }

    fn close(&mut self) {
        self.as_mut().close()
    }

    fn is_closed(&self) -> bool {
        self.as_ref().is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryRegistry;

    #[test]
    fn object_safety_works() {
        let registry = MemoryRegistry::new("root").unwrap();
        let boxed: Box<dyn RegistryKey> = Box::new(registry.root_writable());

        let child = boxed.create_sub_key("child").unwrap();
        assert!(child.is_writable());
        assert_eq!(boxed.sub_key_names().unwrap(), vec!["child".to_string()]);
    }

    #[test]
    fn borrowed_handle_is_not_closed_through_the_borrow() {
        let registry = MemoryRegistry::new("root").unwrap();
        let root = registry.root();
        let mut borrowed = &root;

        borrowed.close();
        assert!(!borrowed.is_closed());
        assert!(!root.is_closed());
    }

    #[test]
    fn boxed_handle_close_delegates() {
        let registry = MemoryRegistry::new("root").unwrap();
        let mut boxed: Box<dyn RegistryKey> = Box::new(registry.root());

        boxed.close();
        assert!(boxed.is_closed());
        boxed.close();
        assert!(boxed.is_closed());
    }

    #[test]
    fn trait_object_debug_shows_path_and_flag() {
        let registry = MemoryRegistry::new("root").unwrap();
        let child = registry.root_writable().create_sub_key("child").unwrap();

        assert_eq!(
            format!("{:?}", child),
            r#"RegistryKey { path: "root\\child", writable: true }"#
        );
        let err = registry.root().create_sub_key("x").unwrap_err();
        assert!(matches!(err, Error::PermissionDenied { .. }));
    }

    #[test]
    fn default_value_kind_reads_through_get_value() {
        let registry = MemoryRegistry::new("root").unwrap();
        let root = registry.root_writable();
        let by_ref = &root;

        assert_eq!(by_ref.value_kind("").unwrap(), ValueKind::None);
        root.set_value("", Scalar::Integer(4)).unwrap();
        assert_eq!(by_ref.value_kind("").unwrap(), ValueKind::Unknown);
    }
}
