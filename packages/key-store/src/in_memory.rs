//! In-memory registry built from two flat maps.
//!
//! The key-space maps the full path of every key to the short names of its
//! children. A child name may belong to a subkey or to a value; which one is
//! decided by looking the joined path up in the key-space and the
//! value-space. The value-space maps `key-path\value-name` to a scalar.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::error::Operation;
use crate::{Error, KeyPath, RegistryKey, Scalar};

/// The raw contents of an in-memory registry.
///
/// Used to seed a [`MemoryRegistry`] with fixture data and to inspect it
/// afterwards. Round-trips through serde, so fixtures can live in JSON.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySpaceSnapshot {
    /// Full key path to the short names of its subkeys and values.
    pub keys: BTreeMap<String, Vec<String>>,
    /// Full value path to the stored scalar.
    pub values: BTreeMap<String, Scalar>,
}

#[derive(Debug, Default)]
struct KeySpace {
    keys: BTreeMap<String, Vec<String>>,
    values: BTreeMap<String, Scalar>,
}

impl KeySpace {
    fn contains_key(&self, path: &KeyPath) -> bool {
        self.keys.contains_key(&path.to_string())
    }

    /// Record `name` as a child of `parent`, once.
    fn register_child(&mut self, parent: &KeyPath, name: &str) {
        if let Some(children) = self.keys.get_mut(&parent.to_string()) {
            if !children.iter().any(|c| c == name) {
                children.push(name.to_string());
            }
        }
    }

    fn insert_key(&mut self, path: &KeyPath) {
        let full = path.to_string();
        if self.keys.contains_key(&full) {
            return;
        }
        log::debug!("Creating key {}...", full);
        self.keys.insert(full, Vec::new());
        if let Some(parent) = path.parent() {
            self.register_child(&parent, path.name());
        }
    }

    fn remove_tree(&mut self, root: &KeyPath) -> Result<usize, Error> {
        let doomed: Vec<String> = self
            .keys
            .keys()
            .filter(|k| root.covers(k))
            .cloned()
            .collect();

        for key in &doomed {
            if self.keys.remove(key).is_none() {
                return Err(Error::InternalInconsistency { key: key.clone() });
            }
        }

        if let Some(parent) = root.parent() {
            let name = root.name();
            let value_remains = self.values.contains_key(&parent.value_key(name));
            if !value_remains {
                if let Some(children) = self.keys.get_mut(&parent.to_string()) {
                    children.retain(|c| c != name);
                }
            }
        }

        Ok(doomed.len())
    }

    fn children(&self, path: &KeyPath) -> Result<&[String], Error> {
        self.keys
            .get(&path.to_string())
            .map(Vec::as_slice)
            .ok_or_else(|| Error::NotFound {
                path: path.to_string(),
            })
    }

    fn snapshot(&self) -> KeySpaceSnapshot {
        KeySpaceSnapshot {
            keys: self.keys.clone(),
            values: self.values.clone(),
        }
    }
}

/// An in-memory registry shared by every handle opened from it.
///
/// # Example
///
/// ```rust
/// use regkey_store::{MemoryRegistry, RegistryKey, Scalar};
///
/// let registry = MemoryRegistry::new("LocalMachine").unwrap();
/// let root = registry.root_writable();
///
/// let software = root.create_sub_key("SOFTWARE").unwrap();
/// software.set_value("", Scalar::from("hello")).unwrap();
///
/// let reopened = registry.root().open_sub_key("SOFTWARE").unwrap();
/// assert_eq!(reopened.get_value("", Scalar::Null).unwrap(), Scalar::from("hello"));
/// assert!(!reopened.is_writable());
/// ```
#[derive(Clone, Debug)]
pub struct MemoryRegistry {
    space: Arc<Mutex<KeySpace>>,
    root: KeyPath,
}

impl MemoryRegistry {
    /// Create a registry holding only the empty root key `root`.
    pub fn new(root: &str) -> Result<Self, Error> {
        Self::from_snapshot(root, KeySpaceSnapshot::default())
    }

    /// Create a registry from existing contents.
    ///
    /// The root key is added if the snapshot does not contain it. Child
    /// lists are taken as given, so the snapshot decides which names are
    /// visible.
    pub fn from_snapshot(root: &str, snapshot: KeySpaceSnapshot) -> Result<Self, Error> {
        let root = KeyPath::parse(root)?;
        let mut space = KeySpace {
            keys: snapshot.keys,
            values: snapshot.values,
        };
        space.keys.entry(root.to_string()).or_default();
        Ok(Self {
            space: Arc::new(Mutex::new(space)),
            root,
        })
    }

    /// Path of the root key.
    pub fn root_path(&self) -> &KeyPath {
        &self.root
    }

    /// A readonly handle to the root key.
    pub fn root(&self) -> MemoryKey {
        MemoryKey::new(self.space.clone(), self.root.clone(), false)
    }

    /// A writable handle to the root key.
    pub fn root_writable(&self) -> MemoryKey {
        MemoryKey::new(self.space.clone(), self.root.clone(), true)
    }

    /// Copy out the current contents of both maps.
    pub fn snapshot(&self) -> KeySpaceSnapshot {
        lock(&self.space).snapshot()
    }

    /// Whether a key exists at the full path `path`.
    pub fn contains_key(&self, path: &str) -> bool {
        lock(&self.space).keys.contains_key(path)
    }
}

fn lock(space: &Mutex<KeySpace>) -> MutexGuard<'_, KeySpace> {
    // Every operation leaves the maps valid between statements, so a
    // poisoned lock still guards usable data.
    space.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A handle to one key of a [`MemoryRegistry`].
#[derive(Debug)]
pub struct MemoryKey {
    space: Arc<Mutex<KeySpace>>,
    path: KeyPath,
    writable: bool,
    closed: bool,
}

impl MemoryKey {
    fn new(space: Arc<Mutex<KeySpace>>, path: KeyPath, writable: bool) -> Self {
        log::trace!(
            "Opening {} ({})",
            path,
            if writable { "writable" } else { "readonly" }
        );
        Self {
            space,
            path,
            writable,
            closed: false,
        }
    }

    fn open(&self, name: &str, writable: bool) -> Result<Box<dyn RegistryKey>, Error> {
        let path = self.path.child(name)?;
        if !lock(&self.space).contains_key(&path) {
            return Err(Error::NotFound {
                path: path.to_string(),
            });
        }
        Ok(Box::new(MemoryKey::new(self.space.clone(), path, writable)))
    }

    fn require_writable(&self, operation: Operation) -> Result<(), Error> {
        if self.writable {
            Ok(())
        } else {
            Err(Error::PermissionDenied {
                path: self.path.to_string(),
                operation,
            })
        }
    }

    fn names_where(&self, exists: impl Fn(&KeySpace, &str) -> bool) -> Result<Vec<String>, Error> {
        let guard = lock(&self.space);
        let space: &KeySpace = &guard;
        Ok(space
            .children(&self.path)?
            .iter()
            .filter(|name| exists(space, &self.path.value_key(name)))
            .cloned()
            .collect())
    }
}

impl RegistryKey for MemoryKey {
    fn path(&self) -> &KeyPath {
        &self.path
    }

    fn is_writable(&self) -> bool {
        self.writable
    }

    fn open_sub_key(&self, name: &str) -> Result<Box<dyn RegistryKey>, Error> {
        self.open(name, false)
    }

    fn open_sub_key_writable(&self, name: &str) -> Result<Box<dyn RegistryKey>, Error> {
        self.open(name, true)
    }

    fn create_sub_key(&self, name: &str) -> Result<Box<dyn RegistryKey>, Error> {
        self.require_writable(Operation::CreateSubKey)?;
        let path = self.path.child(name)?;
        lock(&self.space).insert_key(&path);
        Ok(Box::new(MemoryKey::new(self.space.clone(), path, true)))
    }

    fn delete_sub_key_tree(&self, name: &str) -> Result<(), Error> {
        self.require_writable(Operation::DeleteSubKeyTree)?;
        let root = self.path.child(name)?;
        let removed = lock(&self.space).remove_tree(&root)?;
        log::debug!("Deleted {} key(s) under {}", removed, root);
        Ok(())
    }

    fn get_value(&self, name: &str, default: Scalar) -> Result<Scalar, Error> {
        let space = lock(&self.space);
        Ok(space
            .values
            .get(&self.path.value_key(name))
            .cloned()
            .unwrap_or(default))
    }

    fn set_value(&self, name: &str, value: Scalar) -> Result<(), Error> {
        let key = self.path.value_key(name);
        log::debug!("Writing value {}...", key);
        let mut space = lock(&self.space);
        space.values.insert(key, value);
        space.register_child(&self.path, name);
        Ok(())
    }

    fn sub_key_names(&self) -> Result<Vec<String>, Error> {
        // a subkey's full path has the same shape as a value path
        self.names_where(|space, full| space.keys.contains_key(full))
    }

    fn value_names(&self) -> Result<Vec<String>, Error> {
        self.names_where(|space, full| space.values.contains_key(full))
    }

    fn close(&mut self) {
        if !self.closed {
            log::trace!("Closing {}", self.path);
            self.closed = true;
        }
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Drop for MemoryKey {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ValueKind;
    use collection_literals::btree;

    fn empty() -> MemoryRegistry {
        MemoryRegistry::new("localMachine").unwrap()
    }

    #[test]
    fn fresh_registry_is_empty() {
        let registry = empty();
        let root = registry.root();
        assert!(root.sub_key_names().unwrap().is_empty());
        assert!(root.value_names().unwrap().is_empty());

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.keys.len(), 1);
        assert!(snapshot.values.is_empty());
    }

    #[test]
    fn readonly_key_rejects_create() {
        let registry = empty();
        let err = registry.root().create_sub_key("foo").unwrap_err();
        assert!(matches!(
            err,
            Error::PermissionDenied {
                operation: Operation::CreateSubKey,
                ..
            }
        ));
        assert_eq!(registry.snapshot().keys.len(), 1);
    }

    #[test]
    fn readonly_key_rejects_delete() {
        let registry = empty();
        registry.root_writable().create_sub_key("foo").unwrap();

        let err = registry.root().delete_sub_key_tree("foo").unwrap_err();
        assert!(matches!(
            err,
            Error::PermissionDenied {
                operation: Operation::DeleteSubKeyTree,
                ..
            }
        ));
        assert!(registry.contains_key(r"localMachine\foo"));
    }

    #[test]
    fn open_missing_subkey_fails() {
        let registry = empty();
        let root = registry.root_writable();
        assert!(root.open_sub_key("nope").unwrap_err().is_not_found());
        assert!(root.open_sub_key_writable("nope").unwrap_err().is_not_found());
    }

    #[test]
    fn open_flags() {
        let registry = empty();
        registry.root_writable().create_sub_key("a").unwrap();

        let writable_root = registry.root_writable();
        assert!(!writable_root.open_sub_key("a").unwrap().is_writable());
        assert!(registry.root().open_sub_key_writable("a").unwrap().is_writable());
    }

    #[test]
    fn create_is_idempotent() {
        let registry = empty();
        let root = registry.root_writable();

        let first = root.create_sub_key("a").unwrap();
        first.set_value("v", Scalar::from("kept")).unwrap();
        let second = root.create_sub_key("a").unwrap();

        assert_eq!(first.path(), second.path());
        assert_eq!(root.sub_key_names().unwrap(), vec!["a".to_string()]);
        assert_eq!(second.get_value("v", Scalar::Null).unwrap(), Scalar::from("kept"));
        assert_eq!(registry.snapshot().keys.len(), 2);
    }

    #[test]
    fn create_rejects_nested_names() {
        let registry = empty();
        let err = registry.root_writable().create_sub_key(r"a\b").unwrap_err();
        assert!(matches!(err, Error::Path(_)));
    }

    #[test]
    fn values_and_kinds() {
        let registry = empty();
        let root = registry.root_writable();

        assert_eq!(
            root.get_value("missing", Scalar::from("fallback")).unwrap(),
            Scalar::from("fallback")
        );
        assert_eq!(root.value_kind("missing").unwrap(), ValueKind::None);

        root.set_value("", Scalar::from("default")).unwrap();
        root.set_value("n", Scalar::Integer(1)).unwrap();
        root.set_value("nil", Scalar::Null).unwrap();

        assert_eq!(root.value_kind("").unwrap(), ValueKind::String);
        assert_eq!(root.value_kind("n").unwrap(), ValueKind::Unknown);
        assert_eq!(root.value_kind("nil").unwrap(), ValueKind::None);
        assert_eq!(
            root.value_names().unwrap(),
            vec!["".to_string(), "n".to_string(), "nil".to_string()]
        );
        assert!(root.sub_key_names().unwrap().is_empty());
    }

    #[test]
    fn set_value_ignores_writable_flag_and_overwrites() {
        let registry = empty();
        let root = registry.root();

        root.set_value("x", Scalar::from("first")).unwrap();
        root.set_value("x", Scalar::from("second")).unwrap();

        assert_eq!(root.get_value("x", Scalar::Null).unwrap(), Scalar::from("second"));
        assert_eq!(root.value_names().unwrap(), vec!["x".to_string()]);
    }

    #[test]
    fn names_are_told_apart_by_map() {
        let registry = empty();
        let root = registry.root_writable();
        root.create_sub_key("key").unwrap();
        root.set_value("value", Scalar::from("v")).unwrap();

        assert_eq!(root.sub_key_names().unwrap(), vec!["key".to_string()]);
        assert_eq!(root.value_names().unwrap(), vec!["value".to_string()]);
    }

    #[test]
    fn delete_tree_removes_keys_but_keeps_values() {
        let registry = empty();
        let root = registry.root_writable();
        let t = root.create_sub_key("T").unwrap();
        let icon = t.create_sub_key("DefaultIcon").unwrap();
        icon.set_value("", Scalar::from("icon.ico")).unwrap();
        root.create_sub_key("Tools").unwrap();

        root.delete_sub_key_tree("T").unwrap();

        assert!(!registry.contains_key(r"localMachine\T"));
        assert!(!registry.contains_key(r"localMachine\T\DefaultIcon"));
        assert!(registry.contains_key(r"localMachine\Tools"));
        assert_eq!(root.sub_key_names().unwrap(), vec!["Tools".to_string()]);
        assert_eq!(
            registry.snapshot().values.get(r"localMachine\T\DefaultIcon\"),
            Some(&Scalar::from("icon.ico"))
        );
    }

    #[test]
    fn delete_missing_tree_is_noop() {
        let registry = empty();
        let before = registry.snapshot();
        registry.root_writable().delete_sub_key_tree("ghost").unwrap();
        assert_eq!(registry.snapshot(), before);
    }

    #[test]
    fn delete_keeps_name_shared_with_value() {
        let registry = empty();
        let root = registry.root_writable();
        root.create_sub_key("dual").unwrap();
        root.set_value("dual", Scalar::from("v")).unwrap();

        root.delete_sub_key_tree("dual").unwrap();

        assert!(root.sub_key_names().unwrap().is_empty());
        assert_eq!(root.value_names().unwrap(), vec!["dual".to_string()]);
    }

    #[test]
    fn listing_deleted_key_fails() {
        let registry = empty();
        let root = registry.root_writable();
        let child = root.create_sub_key("gone").unwrap();
        root.delete_sub_key_tree("gone").unwrap();

        assert!(child.sub_key_names().unwrap_err().is_not_found());
    }

    #[test]
    fn seeded_snapshot() {
        let snapshot = KeySpaceSnapshot {
            keys: btree! {
                "root".to_string() => vec!["a".to_string(), "stale".to_string()],
                r"root\a".to_string() => vec![],
            },
            values: BTreeMap::new(),
        };
        let registry = MemoryRegistry::from_snapshot("root", snapshot).unwrap();

        // names without a backing entry are not reported
        let root = registry.root();
        assert_eq!(root.sub_key_names().unwrap(), vec!["a".to_string()]);
        assert!(root.value_names().unwrap().is_empty());
    }

    #[test]
    fn snapshot_adds_missing_root() {
        let registry =
            MemoryRegistry::from_snapshot("root", KeySpaceSnapshot::default()).unwrap();
        assert!(registry.contains_key("root"));
        assert_eq!(registry.root_path().to_string(), "root");
    }

    #[test]
    fn close_is_idempotent_and_local() {
        let registry = empty();
        let root = registry.root_writable();
        let mut a = root.create_sub_key("a").unwrap();
        let b = root.open_sub_key("a").unwrap();

        a.close();
        a.close();
        assert!(a.is_closed());
        assert!(!b.is_closed());
        assert!(b.sub_key_names().unwrap().is_empty());
    }

    #[test]
    fn handles_share_one_store() {
        let registry = empty();
        let writer = registry.root_writable();
        let reader = registry.clone().root();

        writer.create_sub_key("shared").unwrap();
        assert_eq!(reader.sub_key_names().unwrap(), vec!["shared".to_string()]);
    }

    #[test]
    fn remove_tree_counts_removed_keys() {
        let mut space = KeySpace::default();
        let root = KeyPath::parse("root").unwrap();
        space.insert_key(&root);
        space.insert_key(&root.child("x").unwrap());
        assert_eq!(space.remove_tree(&root.child("x").unwrap()).unwrap(), 1);
        assert_eq!(space.remove_tree(&root.child("x").unwrap()).unwrap(), 0);
    }
}
