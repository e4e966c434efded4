use crate::other_bucket::OTHER_BUCKET_SEPARATOR;
use std::borrow::Borrow;
use std::fmt;

/// Addresses one branch of a nested response: the separator followed by the
/// key of every ancestor bucket, outermost first.
///
/// The root has no ancestors and is the empty string, so an ancestor keyed `""`
/// (a lone separator) can never be mistaken for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathKey(String);

impl PathKey {
    pub fn root() -> Self {
        PathKey(String::new())
    }

    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        keys.into_iter()
            .fold(PathKey::root(), |path, key| path.child(key.as_ref()))
    }

    pub fn child(&self, key: &str) -> PathKey {
        let mut path = String::with_capacity(self.0.len() + OTHER_BUCKET_SEPARATOR.len() + key.len());
        path.push_str(&self.0);
        path.push_str(OTHER_BUCKET_SEPARATOR);
        path.push_str(key);
        PathKey(path)
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The ancestor keys this path was built from.
    pub fn segments(&self) -> Vec<&str> {
        match self.0.strip_prefix(OTHER_BUCKET_SEPARATOR) {
            Some(rest) => rest.split(OTHER_BUCKET_SEPARATOR).collect(),
            None => Vec::new(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for PathKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<PathKey> for String {
    fn from(path: PathKey) -> Self {
        path.0
    }
}
