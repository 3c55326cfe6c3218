//! Script lookup by bare name
//!
//! Scripts live anywhere under the script directory. A script is addressed
//! by its file stem (`deploy` for `tools/deploy.py`), restricted to the
//! extensions that currently have a plugin. When two files share a stem the
//! one visited last wins; entries are visited in file-name order.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

use crate::domain::Extension;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("script not found: {0}")]
    NotFound(String),

    #[error("failed to scan script directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// A script file matched by extension
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptEntry {
    /// File stem, the name scripts are run by
    pub name: String,

    pub extension: Extension,

    pub path: PathBuf,
}

/// Finds scripts under a directory tree
#[derive(Debug, Clone)]
pub struct ScriptResolver {
    root: PathBuf,
}

impl ScriptResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every script whose extension is one of `candidates`, in walk order
    pub fn scripts(&self, candidates: &[Extension]) -> Result<Vec<ScriptEntry>, ScriptError> {
        if !self.root.exists() {
            debug!(dir = %self.root.display(), "script directory does not exist");
            return Ok(Vec::new());
        }

        let mut found = Vec::new();

        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = entry?;
            if !entry.path().is_file() {
                continue;
            }

            let path = entry.path();
            let Some(extension) = Extension::from_path(path) else {
                continue;
            };
            if !candidates.contains(&extension) {
                continue;
            }

            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            found.push(ScriptEntry {
                name: name.to_string(),
                extension,
                path: path.to_path_buf(),
            });
        }

        debug!(count = found.len(), candidates = ?candidates, "scripts matched");
        Ok(found)
    }

    /// Path of the script called `name` among `candidates`
    pub fn resolve(&self, name: &str, candidates: &[Extension]) -> Result<PathBuf, ScriptError> {
        let mut by_name: HashMap<String, PathBuf> = HashMap::new();
        for script in self.scripts(candidates)? {
            if let Some(previous) = by_name.insert(script.name, script.path) {
                debug!(shadowed = %previous.display(), "script name appears more than once");
            }
        }

        by_name
            .remove(name)
            .ok_or_else(|| ScriptError::NotFound(name.to_string()))
    }
}
