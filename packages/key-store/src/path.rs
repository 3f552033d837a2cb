//! Key paths: ordered name segments joined by a backslash.

use std::fmt;

/// Separator between the segments of a key path.
pub const SEPARATOR: char = '\\';

/// Longest key name the registry accepts.
pub const MAX_NAME_LEN: usize = 255;

/// Errors related to key path parsing and key name validation.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// A key name is not usable as a single path segment.
    #[error("invalid key name '{name}': {message}")]
    InvalidName { name: String, message: String },

    /// The path string is invalid.
    #[error("invalid key path: {message}")]
    InvalidPath { message: String },
}

/// A validated path to a registry key.
///
/// Segments are compared ordinally, so `Software` and `SOFTWARE` are
/// different keys.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct KeyPath {
    components: Vec<String>,
}

impl KeyPath {
    /// Parse a backslash-separated path string.
    ///
    /// Empty segments are ignored, so leading, trailing and doubled
    /// separators are normalized away. A path must keep at least one
    /// segment.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use regkey_store::KeyPath;
    ///
    /// let path = KeyPath::parse(r"LocalMachine\SOFTWARE\Microsoft").unwrap();
    /// assert_eq!(path.len(), 3);
    /// assert_eq!(path.name(), "Microsoft");
    ///
    /// assert_eq!(
    ///     KeyPath::parse(r"LocalMachine\SOFTWARE\").unwrap(),
    ///     KeyPath::parse(r"LocalMachine\SOFTWARE").unwrap(),
    /// );
    /// ```
    pub fn parse(s: &str) -> Result<Self, PathError> {
        let components: Vec<String> = s
            .split(SEPARATOR)
            .filter(|c| !c.is_empty())
            .map(|c| c.to_string())
            .collect();

        if components.is_empty() {
            return Err(PathError::InvalidPath {
                message: format!("'{}' has no segments", s),
            });
        }

        for component in &components {
            Self::validate_name(component)?;
        }

        Ok(KeyPath { components })
    }

    /// Check that `name` can be used as a single key segment.
    pub fn validate_name(name: &str) -> Result<(), PathError> {
        let message = if name.is_empty() {
            "empty name".to_string()
        } else if name.contains(SEPARATOR) {
            format!("contains the separator '{}'", SEPARATOR)
        } else if name.chars().count() > MAX_NAME_LEN {
            format!("longer than {} characters", MAX_NAME_LEN)
        } else {
            return Ok(());
        };

        Err(PathError::InvalidName {
            name: name.to_string(),
            message,
        })
    }

    /// The path of the subkey `name` directly below this key.
    pub fn child(&self, name: &str) -> Result<KeyPath, PathError> {
        Self::validate_name(name)?;
        let mut components = self.components.clone();
        components.push(name.to_string());
        Ok(KeyPath { components })
    }

    /// The parent key, or `None` for a single-segment path.
    pub fn parent(&self) -> Option<KeyPath> {
        if self.components.len() < 2 {
            return None;
        }
        Some(KeyPath {
            components: self.components[..self.components.len() - 1].to_vec(),
        })
    }

    /// The short name of this key (its last segment).
    pub fn name(&self) -> &str {
        // parse/child never build an empty path
        self.components.last().map(String::as_str).unwrap_or_default()
    }

    /// Get the number of segments.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Iterate over segments.
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.components.iter()
    }

    /// The flat storage key of the value `value_name` in this key.
    ///
    /// The empty name addresses the unnamed default value and produces a
    /// key ending in the separator.
    pub fn value_key(&self, value_name: &str) -> String {
        format!("{}{}{}", self, SEPARATOR, value_name)
    }

    /// Whether the flat key-space entry `key` is this key or lies below it.
    pub fn covers(&self, key: &str) -> bool {
        let root = self.to_string();
        match key.strip_prefix(root.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with(SEPARATOR),
            None => false,
        }
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let separator = SEPARATOR.to_string();
        write!(f, "{}", self.components.join(separator.as_str()))
    }
}

impl std::str::FromStr for KeyPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KeyPath::parse(s)
    }
}
