//! Plugin descriptors and their execution backends
//!
//! A [`PluginDescriptor`] is what the registry stores per extension. The
//! backend set is closed:
//!
//! | Backend | Origin | Runs |
//! |---------|--------|------|
//! | Native | builtin | an external interpreter with the target appended |
//! | Embedded | builtin | a Lua plugin compiled into the binary |
//! | File | plugin file | a Lua plugin read from disk at call time |

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use super::lua::{self, Sandbox};
use super::meta::{extract_metadata, MetaError};
use crate::domain::Extension;

/// Prefix of every builtin source label
pub const BUILTIN_PREFIX: &str = "builtin:";

#[derive(Debug, Error)]
pub enum RunError {
    #[error("plugin '{plugin}' could not start '{program}': {source}")]
    Spawn {
        plugin: String,
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("plugin '{plugin}': '{program}' exited with status {code} while running {target}")]
    Exit {
        plugin: String,
        program: String,
        target: PathBuf,
        code: i32,
    },

    #[error("plugin '{plugin}': failed to read {path}: {source}")]
    ReadSource {
        plugin: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("plugin '{plugin}' failed on {target}: {message}")]
    Script {
        plugin: String,
        target: PathBuf,
        message: String,
    },
}

/// Where a plugin came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "source", rename_all = "snake_case")]
pub enum PluginOrigin {
    /// Shipped with rune; the string names the runner or embedded resource
    Builtin(String),

    /// Discovered in the plugin directory
    File(PathBuf),
}

impl fmt::Display for PluginOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PluginOrigin::Builtin(resource) => write!(f, "{}{}", BUILTIN_PREFIX, resource),
            PluginOrigin::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug, Clone)]
enum Backend {
    Native { program: String },
    Embedded { source: &'static str },
    File { path: PathBuf },
}

/// One plugin: identity, handled extensions, origin and how to run it
#[derive(Debug, Clone)]
pub struct PluginDescriptor {
    name: String,
    extensions: Vec<Extension>,
    origin: PluginOrigin,
    backend: Backend,
}

impl PluginDescriptor {
    /// A builtin that shells out to `program <target> <args...>`
    pub fn native(name: impl Into<String>, extensions: &[&str], program: impl Into<String>) -> Self {
        let program = program.into();
        Self {
            name: name.into(),
            extensions: normalize(extensions.iter().copied()),
            origin: PluginOrigin::Builtin(program.clone()),
            backend: Backend::Native { program },
        }
    }

    /// A builtin Lua plugin compiled into the binary
    pub fn embedded(resource: &str, source: &'static str) -> Result<Self, MetaError> {
        let meta = extract_metadata(source)?;
        Ok(Self {
            name: meta.name,
            extensions: normalize(meta.extensions.iter().map(String::as_str)),
            origin: PluginOrigin::Builtin(resource.to_string()),
            backend: Backend::Embedded { source },
        })
    }

    /// A Lua plugin discovered on disk, given its already-read source
    pub fn from_file(path: impl Into<PathBuf>, source: impl AsRef<[u8]>) -> Result<Self, MetaError> {
        let path = path.into();
        let meta = extract_metadata(source)?;
        Ok(Self {
            name: meta.name,
            extensions: normalize(meta.extensions.iter().map(String::as_str)),
            origin: PluginOrigin::File(path.clone()),
            backend: Backend::File { path },
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Normalized, de-duplicated extensions in declaration order
    pub fn extensions(&self) -> &[Extension] {
        &self.extensions
    }

    pub fn origin(&self) -> &PluginOrigin {
        &self.origin
    }

    /// `builtin:<resource>` for builtins, the file path otherwise
    pub fn source_label(&self) -> String {
        self.origin.to_string()
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self.origin, PluginOrigin::Builtin(_))
    }

    /// Runs `target` with `args` through this plugin
    ///
    /// Script plugins get a fresh interpreter per call. Nothing is retried.
    pub fn run(&self, target: &Path, args: &[String]) -> Result<(), RunError> {
        info!(plugin = %self.name, source = %self.origin, target = %target.display(), "running plugin");

        match &self.backend {
            Backend::Native { program } => self.run_native(program, target, args),
            Backend::Embedded { source } => {
                self.run_script(&format!("={}", self.origin), source.as_bytes(), target, args)
            }
            Backend::File { path } => {
                let source = fs::read(path).map_err(|source| RunError::ReadSource {
                    plugin: self.name.clone(),
                    path: path.clone(),
                    source,
                })?;
                self.run_script(&format!("@{}", path.display()), &source, target, args)
            }
        }
    }

    /// Compiles a script plugin without running it; native plugins always pass
    pub fn check(&self) -> Result<(), RunError> {
        let compiled = match &self.backend {
            Backend::Native { .. } => return Ok(()),
            Backend::Embedded { source } => lua::compile(&format!("={}", self.origin), source),
            Backend::File { path } => {
                let source = fs::read(path).map_err(|source| RunError::ReadSource {
                    plugin: self.name.clone(),
                    path: path.clone(),
                    source,
                })?;
                lua::compile(&format!("@{}", path.display()), &source)
            }
        };

        compiled.map_err(|e| RunError::Script {
            plugin: self.name.clone(),
            target: PathBuf::new(),
            message: e.to_string(),
        })
    }

    fn run_native(&self, program: &str, target: &Path, args: &[String]) -> Result<(), RunError> {
        debug!(program, args = ?args, "spawning interpreter");

        let status = Command::new(program)
            .arg(target)
            .args(args)
            .status()
            .map_err(|source| RunError::Spawn {
                plugin: self.name.clone(),
                program: program.to_string(),
                source,
            })?;

        if !status.success() {
            return Err(RunError::Exit {
                plugin: self.name.clone(),
                program: program.to_string(),
                target: target.to_path_buf(),
                code: status.code().unwrap_or(-1),
            });
        }

        Ok(())
    }

    fn run_script(
        &self,
        chunk_name: &str,
        source: &[u8],
        target: &Path,
        args: &[String],
    ) -> Result<(), RunError> {
        Sandbox::new(target, args)
            .and_then(|sandbox| sandbox.exec(chunk_name, source))
            .map_err(|e| RunError::Script {
                plugin: self.name.clone(),
                target: target.to_path_buf(),
                message: e.to_string(),
            })
    }
}

fn normalize<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<Extension> {
    let mut extensions: Vec<Extension> = Vec::new();
    for ext in raw.map(Extension::new) {
        if !ext.is_empty() && !extensions.contains(&ext) {
            extensions.push(ext);
        }
    }
    extensions
}
