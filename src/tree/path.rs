//! Dotted key paths into a [`LocaleTree`].

use std::fmt;

use super::{
    LocaleTree,
    LocaleValue,
};

/// Separator used when rendering or parsing a dotted path.
pub const PATH_SEPARATOR: char = '.';

/// Path from the root of a tree to one of its keys.
///
/// Stored as segments, so a key that itself contains `.` is still addressed
/// exactly. Renders as `common.hello`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeyPath(Vec<String>);

impl KeyPath {
    /// Splits a dotted string into segments.
    ///
    /// # Examples
    /// ```
    /// use locale_reconcile::tree::KeyPath;
    ///
    /// let path = KeyPath::parse("common.hello");
    /// assert_eq!(path.segments(), ["common", "hello"]);
    /// assert_eq!(path.to_string(), "common.hello");
    /// ```
    #[must_use]
    pub fn parse(dotted: &str) -> Self {
        if dotted.is_empty() {
            return Self::default();
        }
        Self(dotted.split(PATH_SEPARATOR).map(str::to_string).collect())
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Returns a new path with `key` appended.
    #[must_use]
    pub fn child(&self, key: &str) -> Self {
        let mut segments = Vec::with_capacity(self.0.len() + 1);
        segments.extend_from_slice(&self.0);
        segments.push(key.to_string());
        Self(segments)
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, segment) in self.0.iter().enumerate() {
            if index > 0 {
                write!(f, "{PATH_SEPARATOR}")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl<S: Into<String>> FromIterator<S> for KeyPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Looks up the value at `path`.
///
/// Returns `None` when any segment is absent or when an intermediate segment
/// is a leaf rather than a nested tree.
#[must_use]
pub fn get_by_path<'a>(tree: &'a LocaleTree, path: &KeyPath) -> Option<&'a LocaleValue> {
    let (last, parents) = path.segments().split_last()?;
    let mut current = tree;
    for segment in parents {
        current = current.get(segment)?.as_node()?;
    }
    current.get(last)
}

/// Writes `value` at `path`, creating intermediate trees as needed.
///
/// A leaf found at an intermediate segment is replaced by an empty tree.
/// Sibling keys keep their values and positions. An empty path is ignored.
pub fn set_by_path(tree: &mut LocaleTree, path: &KeyPath, value: LocaleValue) {
    let Some((last, parents)) = path.segments().split_last() else {
        return;
    };

    let mut current = tree;
    for segment in parents {
        let slot = current.entry(segment.clone()).or_insert_with(|| LocaleTree::new().into());
        if let LocaleValue::Leaf(_) = slot {
            *slot = LocaleValue::Node(LocaleTree::new());
        }
        // Replaced with a node just above.
        let LocaleValue::Node(next) = slot else {
            return;
        };
        current = next;
    }
    current.insert(last.clone(), value);
}

/// Removes and returns the value at `path`, leaving parent trees in place.
pub fn remove_by_path(tree: &mut LocaleTree, path: &KeyPath) -> Option<LocaleValue> {
    let (last, parents) = path.segments().split_last()?;
    let mut current = tree;
    for segment in parents {
        current = match current.get_mut(segment)? {
            LocaleValue::Node(next) => next,
            LocaleValue::Leaf(_) => return None,
        };
    }
    current.remove(last)
}
