//! Running a script by name
//!
//! Ties the pieces together: pick the candidate extensions (one forced
//! extension, or everything the registry knows), resolve the script, pick
//! the plugin for the resolved file and run it once.

use std::fs;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use super::descriptor::{PluginDescriptor, RunError};
use super::registry::Registry;
use crate::domain::Extension;
use crate::storage::{ScriptError, ScriptResolver};

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("no plugin registered for extension: {0}")]
    NoPlugin(Extension),

    #[error(transparent)]
    Script(#[from] ScriptError),

    #[error(transparent)]
    Run(#[from] RunError),
}

/// A resolved script and the plugin that will run it
#[derive(Debug, Clone)]
pub struct Selection<'a> {
    pub script: PathBuf,
    pub extension: Extension,
    pub plugin: &'a PluginDescriptor,
}

/// What [`dispatch`] ran
#[derive(Debug, Clone, Serialize)]
pub struct Dispatched {
    pub script: PathBuf,
    pub extension: Extension,
    pub plugin: String,
    pub source: String,
}

/// Extensions a script may have: the forced one, or every registered one
///
/// A forced extension without a plugin is an error.
pub fn candidates(registry: &Registry, forced: Option<&str>) -> Result<Vec<Extension>, DispatchError> {
    match forced {
        Some(raw) => {
            let ext = Extension::new(raw);
            if registry.lookup(ext.as_str()).is_none() {
                return Err(DispatchError::NoPlugin(ext));
            }
            debug!(extension = %ext, "extension forced");
            Ok(vec![ext])
        }
        None => Ok(registry.extensions()),
    }
}

/// Resolves `name` to a script and the plugin for its extension
pub fn select<'a>(
    registry: &'a Registry,
    resolver: &ScriptResolver,
    name: &str,
    forced: Option<&str>,
) -> Result<Selection<'a>, DispatchError> {
    let candidates = candidates(registry, forced)?;
    debug!(script = name, candidates = ?candidates, "searching for script");

    let script = resolver.resolve(name, &candidates)?;
    let extension = Extension::from_path(&script)
        .ok_or_else(|| ScriptError::NotFound(name.to_string()))?;

    let plugin = registry
        .lookup(extension.as_str())
        .ok_or_else(|| DispatchError::NoPlugin(extension.clone()))?;

    info!(
        script = %script.display(),
        extension = %extension,
        plugin = plugin.name(),
        "plugin selected"
    );

    Ok(Selection {
        script,
        extension,
        plugin,
    })
}

/// Resolves and runs `name` with `args`; the plugin runs at most once
pub fn dispatch(
    registry: &Registry,
    resolver: &ScriptResolver,
    name: &str,
    forced: Option<&str>,
    args: &[String],
) -> Result<Dispatched, DispatchError> {
    let selection = select(registry, resolver, name, forced)?;
    let target = fs::canonicalize(&selection.script).unwrap_or(selection.script);

    selection.plugin.run(&target, args)?;

    Ok(Dispatched {
        script: target,
        extension: selection.extension,
        plugin: selection.plugin.name().to_string(),
        source: selection.plugin.source_label(),
    })
}
