//! Locale tree model
//!
//! A `LocaleTree` holds one language's content for one content unit. Nested
//! objects become [`LocaleValue::Node`], everything else (strings, numbers,
//! booleans, null and arrays) is an opaque [`LocaleValue::Leaf`].

/// Missing-key detection between two trees
mod diff;
/// Dotted key paths and path-based access
mod path;

use indexmap::IndexMap;
use serde::{
    Deserialize,
    Serialize,
};
use serde_json::Value;
use thiserror::Error;

pub use diff::missing_keys;
pub use path::{
    KeyPath,
    get_by_path,
    remove_by_path,
    set_by_path,
};

/// Errors raised when content does not have the shape of a locale tree.
#[derive(Error, Debug)]
pub enum TreeError {
    /// The content is not valid JSON
    #[error("Failed to parse locale content: {0}")]
    Parse(#[from] serde_json::Error),
    /// The root of the content is not a key/value object
    #[error("Locale content must be an object at the root, found {found}")]
    NotAnObject {
        /// JSON type that was found instead
        found: &'static str,
    },
}

/// Key/value tree for one language. Iteration follows insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocaleTree(IndexMap<String, LocaleValue>);

/// A value stored under a key of a [`LocaleTree`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocaleValue {
    /// Nested key/value tree
    Node(LocaleTree),
    /// Any non-object JSON value. Arrays are leaves and are never descended into.
    Leaf(Value),
}

impl LocaleTree {
    #[must_use]
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Parses raw JSON bytes into a tree.
    ///
    /// # Errors
    /// - The bytes are not valid JSON
    /// - The root value is not an object
    pub fn from_slice(raw: &[u8]) -> Result<Self, TreeError> {
        let value: Value = serde_json::from_slice(raw)?;
        Self::try_from(value)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&LocaleValue> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut LocaleValue> {
        self.0.get_mut(key)
    }

    /// Inserts a value, keeping the key's position when it already exists.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<LocaleValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Removes a key while preserving the order of its siblings.
    pub fn remove(&mut self, key: &str) -> Option<LocaleValue> {
        self.0.shift_remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &LocaleValue)> {
        self.0.iter()
    }

    /// Mutable access to an entry, used to build intermediate nodes.
    pub(crate) fn entry(&mut self, key: String) -> indexmap::map::Entry<'_, String, LocaleValue> {
        self.0.entry(key)
    }
}

impl LocaleValue {
    /// Returns true for values that count as "no content": `null` and `""`.
    ///
    /// `0`, `false` and empty arrays are real values and are not missing.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        match self {
            Self::Leaf(Value::Null) => true,
            Self::Leaf(Value::String(s)) => s.is_empty(),
            Self::Leaf(_) | Self::Node(_) => false,
        }
    }

    #[must_use]
    pub const fn as_node(&self) -> Option<&LocaleTree> {
        match self {
            Self::Node(tree) => Some(tree),
            Self::Leaf(_) => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Leaf(Value::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl From<Value> for LocaleValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::Node(LocaleTree(
                map.into_iter().map(|(key, value)| (key, Self::from(value))).collect(),
            )),
            other => Self::Leaf(other),
        }
    }
}

impl From<&str> for LocaleValue {
    fn from(value: &str) -> Self {
        Self::Leaf(Value::String(value.to_string()))
    }
}

impl From<String> for LocaleValue {
    fn from(value: String) -> Self {
        Self::Leaf(Value::String(value))
    }
}

impl From<LocaleTree> for LocaleValue {
    fn from(tree: LocaleTree) -> Self {
        Self::Node(tree)
    }
}

impl TryFrom<Value> for LocaleTree {
    type Error = TreeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match LocaleValue::from(value) {
            LocaleValue::Node(tree) => Ok(tree),
            LocaleValue::Leaf(leaf) => Err(TreeError::NotAnObject { found: json_type_name(&leaf) }),
        }
    }
}

impl From<LocaleValue> for Value {
    fn from(value: LocaleValue) -> Self {
        match value {
            LocaleValue::Node(tree) => tree.into(),
            LocaleValue::Leaf(leaf) => leaf,
        }
    }
}

impl From<LocaleTree> for Value {
    fn from(tree: LocaleTree) -> Self {
        Self::Object(tree.0.into_iter().map(|(key, value)| (key, value.into())).collect())
    }
}

impl FromIterator<(String, LocaleValue)> for LocaleTree {
    fn from_iter<I: IntoIterator<Item = (String, LocaleValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a LocaleTree {
    type Item = (&'a String, &'a LocaleValue);
    type IntoIter = indexmap::map::Iter<'a, String, LocaleValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// JSON type name used in error messages.
const fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
