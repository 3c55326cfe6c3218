//! Normalized file extensions
//!
//! An [`Extension`] is the dispatch key of the whole system: lower-case,
//! without a leading dot. Every boundary (metadata, lookups, paths) goes
//! through [`Extension::new`] so two spellings of the same suffix always
//! compare equal.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::path::Path;

/// A normalized file extension such as `py` or `lua`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Extension(String);

impl Extension {
    /// Normalizes a raw extension: trims whitespace, strips one leading `.`
    /// and lower-cases the rest
    pub fn new(raw: &str) -> Self {
        let trimmed = raw.trim();
        let stripped = trimmed.strip_prefix('.').unwrap_or(trimmed);
        Self(stripped.to_lowercase())
    }

    /// Derives the extension of a file path, if it has one
    ///
    /// `script.PY` yields `py`; `Makefile` and `.bashrc` yield `None`.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(Self::new)
            .filter(|ext| !ext.is_empty())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl Borrow<str> for Extension {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Extension {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for Extension {
    fn from(raw: String) -> Self {
        Self::new(&raw)
    }
}

impl From<Extension> for String {
    fn from(ext: Extension) -> Self {
        ext.0
    }
}
