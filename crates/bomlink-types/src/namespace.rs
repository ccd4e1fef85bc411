use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Globally unique identity string of one SPDX document.
///
/// Yocto writes this as a URI such as
/// `http://spdx.org/spdxdoc/recipe-busybox-1f3c...`. Two documents with the
/// same namespace are the same document, regardless of where they were loaded
/// from.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Namespace(String);

impl Namespace {
    /// Wrap a namespace string.
    pub fn new(ns: impl Into<String>) -> Self {
        Self(ns.into())
    }

    /// The raw namespace string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the namespace string is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// File name of this namespace's entry in a `by-namespace` directory.
    ///
    /// Path separators are replaced by `_` so the whole namespace fits in a
    /// single directory entry.
    pub fn link_name(&self) -> String {
        self.0.replace('/', "_")
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Namespace({})", self.0)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Namespace {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Namespace {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Borrow<str> for Namespace {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Namespace {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
