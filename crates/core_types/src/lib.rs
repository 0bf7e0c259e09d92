use std::fmt;

pub type RequestId = u64;

/// Canonical identifier of a document in the navigation tree.
///
/// Holds the path and query of the document's source location, without a
/// fragment. Two links that resolve to the same document produce equal keys.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocKey(String);

impl DocKey {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for DocKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocKey {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for DocKey {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl AsRef<str> for DocKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
