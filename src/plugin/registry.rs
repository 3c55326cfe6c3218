//! Extension → plugin registry
//!
//! Loading is all-or-nothing:
//! 1. builtins are registered, first declaration of an extension wins
//! 2. the plugin directory is walked for `*.lua` files in file-name order;
//!    each file's metadata is parsed and its extensions are inserted, the
//!    last file wins and file plugins replace builtins
//!
//! A single unreadable or malformed plugin file fails the whole load.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::builtin;
use super::descriptor::PluginDescriptor;
use super::meta::MetaError;
use crate::domain::Extension;

/// File extension reserved for plugin sources
pub const PLUGIN_SUFFIX: &str = "lua";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("plugin {path}: {source}")]
    Plugin {
        path: PathBuf,
        #[source]
        source: MetaError,
    },

    #[error("failed to read plugin {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to scan plugin directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("builtin plugin {resource}: {source}")]
    Builtin {
        resource: String,
        #[source]
        source: MetaError,
    },
}

/// The set of active plugins, keyed by normalized extension
#[derive(Debug, Default)]
pub struct Registry {
    plugins: BTreeMap<Extension, Arc<PluginDescriptor>>,
}

impl Registry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the shipped builtins plus every plugin file under `dir`
    pub fn load(dir: &Path) -> Result<Self, LoadError> {
        Self::load_with(builtin::builtins()?, dir)
    }

    /// Loads an explicit builtin set plus every plugin file under `dir`
    pub fn load_with(builtins: Vec<PluginDescriptor>, dir: &Path) -> Result<Self, LoadError> {
        let mut registry = Self::new();

        for plugin in builtins {
            registry.register_builtin(plugin);
        }

        for plugin in discover(dir)? {
            registry.register_file(plugin);
        }

        info!(
            extensions = registry.len(),
            plugins = registry.plugin_count(),
            dir = %dir.display(),
            "plugins loaded"
        );

        Ok(registry)
    }

    /// Registers a builtin; extensions that are already mapped are skipped
    pub fn register_builtin(&mut self, plugin: PluginDescriptor) {
        let plugin = Arc::new(plugin);

        for ext in plugin.extensions() {
            if let Some(existing) = self.plugins.get(ext) {
                debug!(
                    extension = %ext,
                    kept = %existing.source_label(),
                    skipped = %plugin.source_label(),
                    "builtin already registered for extension"
                );
                continue;
            }
            self.plugins.insert(ext.clone(), Arc::clone(&plugin));
        }
    }

    /// Registers a plugin file; it replaces any current mapping
    pub fn register_file(&mut self, plugin: PluginDescriptor) {
        let plugin = Arc::new(plugin);

        for ext in plugin.extensions() {
            if let Some(previous) = self.plugins.insert(ext.clone(), Arc::clone(&plugin)) {
                if previous.is_builtin() {
                    info!(
                        extension = %ext,
                        builtin = %previous.source_label(),
                        plugin = %plugin.source_label(),
                        "plugin file overrides builtin"
                    );
                } else {
                    warn!(
                        extension = %ext,
                        previous = %previous.source_label(),
                        plugin = %plugin.source_label(),
                        "extension claimed by more than one plugin file, keeping the later one"
                    );
                }
            }
        }
    }

    /// Finds the plugin for an extension, in any spelling (`PY`, `.py`, `py`)
    pub fn lookup(&self, ext: &str) -> Option<&PluginDescriptor> {
        self.plugins
            .get(Extension::new(ext).as_str())
            .map(|plugin| plugin.as_ref())
    }

    /// Every mapping, ordered by extension
    pub fn list(&self) -> impl Iterator<Item = (&Extension, &PluginDescriptor)> {
        self.plugins.iter().map(|(ext, plugin)| (ext, plugin.as_ref()))
    }

    /// Every extension that currently has a plugin
    pub fn extensions(&self) -> Vec<Extension> {
        self.plugins.keys().cloned().collect()
    }

    /// Number of mapped extensions
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Number of distinct plugins still reachable from some extension
    pub fn plugin_count(&self) -> usize {
        let mut seen: Vec<&Arc<PluginDescriptor>> = Vec::new();
        for plugin in self.plugins.values() {
            if !seen.iter().any(|s| Arc::ptr_eq(s, plugin)) {
                seen.push(plugin);
            }
        }
        seen.len()
    }
}

/// Parses every plugin file under `dir`, in walk order
///
/// A missing directory yields no plugins. Any read or parse failure aborts.
pub fn discover(dir: &Path) -> Result<Vec<PluginDescriptor>, LoadError> {
    if !dir.exists() {
        debug!(dir = %dir.display(), "plugin directory does not exist");
        return Ok(Vec::new());
    }

    let mut plugins = Vec::new();

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        // `Path::is_file` follows symlinks, the walk entry's file type does not
        if !entry.path().is_file() || !is_plugin_file(entry.path()) {
            continue;
        }

        let path = entry.path();
        debug!(path = %path.display(), "loading plugin file");

        let source = fs::read(path).map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let plugin =
            PluginDescriptor::from_file(path, &source).map_err(|source| LoadError::Plugin {
                path: path.to_path_buf(),
                source,
            })?;

        debug!(
            name = plugin.name(),
            extensions = ?plugin.extensions(),
            "parsed plugin metadata"
        );
        plugins.push(plugin);
    }

    Ok(plugins)
}

fn is_plugin_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(PLUGIN_SUFFIX))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn plugin_source(name: &str, exts: &str) -> String {
        format!("--[[ rune-meta\nname: {}\next: [{}]\n]]\nprint(target)\n", name, exts)
    }

    fn write(dir: &Path, rel: &str, contents: &str) {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    fn native(name: &str, exts: &[&str]) -> PluginDescriptor {
        PluginDescriptor::native(name, exts, name.to_lowercase())
    }

    #[test]
    fn empty_registry() {
        let registry = Registry::new();
        assert!(registry.is_empty());
        assert!(registry.lookup("py").is_none());
    }

    #[test]
    fn missing_directory_loads_builtins_only() {
        let dir = TempDir::new().unwrap();
        let registry =
            Registry::load_with(vec![native("Lua", &["lua"])], &dir.path().join("absent")).unwrap();

        assert_eq!(registry.len(), 1);
        assert!(registry.lookup("lua").unwrap().is_builtin());
    }

    #[test]
    fn load_includes_shipped_builtins() {
        let dir = TempDir::new().unwrap();
        let registry = Registry::load(dir.path()).unwrap();

        assert_eq!(registry.lookup("lua").unwrap().source_label(), "builtin:lua");
        assert_eq!(registry.lookup("py").unwrap().source_label(), "builtin:python.lua");
        assert!(registry.lookup("sh").is_some());
    }

    #[test]
    fn lookup_normalizes_spelling() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "py.lua", &plugin_source("Py", "py"));
        let registry = Registry::load_with(Vec::new(), dir.path()).unwrap();

        let upper = registry.lookup("PY").unwrap();
        let dotted = registry.lookup(".py").unwrap();
        let plain = registry.lookup("py").unwrap();

        assert!(std::ptr::eq(upper, dotted));
        assert!(std::ptr::eq(dotted, plain));
    }

    #[test]
    fn declared_extensions_are_normalized_on_insert() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "rb.lua", &plugin_source("Ruby", ".RB, Rake"));
        let registry = Registry::load_with(Vec::new(), dir.path()).unwrap();

        let keys: Vec<String> = registry.extensions().into_iter().map(String::from).collect();
        assert_eq!(keys, vec!["rake", "rb"]);
    }

    #[test]
    fn builtins_first_declaration_wins() {
        let dir = TempDir::new().unwrap();
        let registry = Registry::load_with(
            vec![native("First", &["x"]), native("Second", &["x", "y"])],
            dir.path(),
        )
        .unwrap();

        assert_eq!(registry.lookup("x").unwrap().name(), "First");
        assert_eq!(registry.lookup("y").unwrap().name(), "Second");
    }

    #[test]
    fn file_plugin_overrides_builtin() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "custom.lua", &plugin_source("Custom Lua", "lua"));
        let registry = Registry::load_with(vec![native("Lua", &["lua"])], dir.path()).unwrap();

        let plugin = registry.lookup("lua").unwrap();
        assert_eq!(plugin.name(), "Custom Lua");
        assert!(!plugin.is_builtin());
    }

    #[test]
    fn last_discovered_file_wins() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.lua", &plugin_source("A", "x"));
        write(dir.path(), "b.lua", &plugin_source("B", "x"));
        let registry = Registry::load_with(Vec::new(), dir.path()).unwrap();

        assert_eq!(registry.lookup("x").unwrap().name(), "B");
    }

    #[test]
    fn walk_is_depth_first_in_name_order() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a/nested.lua", &plugin_source("Nested", "x"));
        write(dir.path(), "b.lua", &plugin_source("Top", "x"));
        let registry = Registry::load_with(Vec::new(), dir.path()).unwrap();

        assert_eq!(registry.lookup("x").unwrap().name(), "Top");
    }

    #[test]
    fn non_plugin_files_are_ignored() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "README.md", "not a plugin");
        write(dir.path(), "notes.txt", "--[[ rune-meta\nname: Txt\next: [txt]\n]]");
        let registry = Registry::load_with(Vec::new(), dir.path()).unwrap();

        assert!(registry.is_empty());
    }

    #[test]
    fn one_bad_file_fails_the_whole_load() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a_good.lua", &plugin_source("Good", "good"));
        write(dir.path(), "b_bad.lua", "print('no metadata')");
        write(dir.path(), "c_good.lua", &plugin_source("Also Good", "also"));

        let err = Registry::load_with(vec![native("Lua", &["lua"])], dir.path()).unwrap_err();
        match err {
            LoadError::Plugin { path, source } => {
                assert!(path.ends_with("b_bad.lua"));
                assert!(matches!(source, MetaError::MissingBlock));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_metadata_fails_the_load() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "bad.lua", "--[[ rune-meta\nname: [oops\n]]");

        let err = Registry::load_with(Vec::new(), dir.path()).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Plugin { source: MetaError::Decode(_), .. }
        ));
    }

    #[test]
    fn file_label_identifies_the_file() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "py.lua", "--[[ rune-meta\nname: Py\next: [py]\n]]");
        let registry = Registry::load_with(vec![native("Lua", &["lua"])], dir.path()).unwrap();

        let plugin = registry.lookup("py").unwrap();
        assert!(!plugin.is_builtin());
        assert_eq!(plugin.source_label(), dir.path().join("py.lua").display().to_string());
    }

    #[test]
    fn plugin_count_counts_distinct_plugins() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "py.lua", &plugin_source("Py", "py, pyw"));
        let registry = Registry::load_with(vec![native("Lua", &["lua"])], dir.path()).unwrap();

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.plugin_count(), 2);
    }

    #[test]
    fn partially_shadowed_plugin_stays_reachable() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.lua", &plugin_source("Wide", "x, y"));
        write(dir.path(), "b.lua", &plugin_source("Narrow", "x"));
        let registry = Registry::load_with(Vec::new(), dir.path()).unwrap();

        assert_eq!(registry.lookup("x").unwrap().name(), "Narrow");
        assert_eq!(registry.lookup("y").unwrap().name(), "Wide");
        assert_eq!(registry.plugin_count(), 2);
    }

    #[test]
    fn list_is_ordered_by_extension() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "z.lua", &plugin_source("Z", "zz, aa"));
        let registry = Registry::load_with(Vec::new(), dir.path()).unwrap();

        let exts: Vec<&str> = registry.list().map(|(ext, _)| ext.as_str()).collect();
        assert_eq!(exts, vec!["aa", "zz"]);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_plugin_files_are_loaded() {
        let real = TempDir::new().unwrap();
        let dir = TempDir::new().unwrap();
        write(real.path(), "py.lua", &plugin_source("Py", "py"));
        std::os::unix::fs::symlink(real.path().join("py.lua"), dir.path().join("py.lua")).unwrap();

        let registry = Registry::load_with(Vec::new(), dir.path()).unwrap();

        assert_eq!(registry.lookup("py").unwrap().name(), "Py");
    }

    #[test]
    fn non_utf8_plugin_source_loads() {
        let dir = TempDir::new().unwrap();
        let mut source = plugin_source("Py", "py").into_bytes();
        source.extend_from_slice(b"-- caf\xE9\n");
        fs::write(dir.path().join("py.lua"), source).unwrap();

        let registry = Registry::load_with(Vec::new(), dir.path()).unwrap();
        let plugin = registry.lookup("py").unwrap();

        assert_eq!(plugin.name(), "Py");
        plugin.check().unwrap();
    }
}
