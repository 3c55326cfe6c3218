//! Plugin inspection commands

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Subcommand;

use super::app::load_registry;
use super::output::Output;
use crate::domain::Extension;
use crate::plugin::{builtins, PluginDescriptor, Registry};
use crate::storage::Config;

#[derive(Subcommand)]
pub enum PluginCommands {
    /// List active plugins by extension
    #[command(visible_alias = "ls")]
    List {
        /// One plugin name per line (no formatting)
        #[arg(long, short = 'p')]
        plain: bool,
    },

    /// Show the plugin handling an extension
    Info {
        /// Extension (e.g. py, .lua)
        extension: String,
    },

    /// Validate a plugin file without installing it
    Check {
        /// Path to the plugin source
        path: PathBuf,
    },
}

pub fn run(cmd: PluginCommands, output: &Output, config: &Config) -> Result<()> {
    match cmd {
        PluginCommands::List { plain } => list_plugins(output, config, plain),
        PluginCommands::Info { extension } => show_plugin(output, config, &extension),
        PluginCommands::Check { path } => check_plugin(output, &path),
    }
}

fn describe(ext: &Extension, plugin: &PluginDescriptor) -> serde_json::Value {
    serde_json::json!({
        "extension": ext,
        "name": plugin.name(),
        "extensions": plugin.extensions(),
        "source": plugin.source_label(),
        "builtin": plugin.is_builtin(),
    })
}

fn list_plugins(output: &Output, config: &Config, plain: bool) -> Result<()> {
    let registry = load_registry(config)?;

    if output.is_json() {
        let items: Vec<_> = registry
            .list()
            .map(|(ext, plugin)| describe(ext, plugin))
            .collect();
        output.data(&items);
        return Ok(());
    }

    if registry.is_empty() {
        println!("No plugins found.");
        return Ok(());
    }

    if plain {
        let mut names: Vec<&str> = Vec::new();
        for (_, plugin) in registry.list() {
            if !names.contains(&plugin.name()) {
                names.push(plugin.name());
            }
        }
        for name in names {
            println!("{}", name);
        }
        return Ok(());
    }

    println!("{:<12} {:<24} SOURCE", "EXTENSION", "NAME");
    println!("{}", "-".repeat(70));
    for (ext, plugin) in registry.list() {
        println!("{:<12} {:<24} {}", ext, plugin.name(), plugin.source_label());
    }
    println!();
    println!(
        "{} extension(s) handled by {} plugin(s)",
        registry.len(),
        registry.plugin_count()
    );

    Ok(())
}

fn show_plugin(output: &Output, config: &Config, extension: &str) -> Result<()> {
    let registry = load_registry(config)?;
    let ext = Extension::new(extension);

    let plugin = registry
        .lookup(ext.as_str())
        .ok_or_else(|| anyhow::anyhow!("no plugin registered for extension: {}", ext))?;

    if output.is_json() {
        output.data(&describe(&ext, plugin));
    } else {
        println!("Plugin: {}", plugin.name());
        println!(
            "Extensions: {}",
            plugin
                .extensions()
                .iter()
                .map(Extension::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        );
        println!("Source: {}", plugin.source_label());
        println!("Builtin: {}", if plugin.is_builtin() { "yes" } else { "no" });
    }

    Ok(())
}

fn check_plugin(output: &Output, path: &Path) -> Result<()> {
    let source = fs::read(path)
        .with_context(|| format!("Failed to read plugin: {}", path.display()))?;

    let plugin = PluginDescriptor::from_file(path, &source)
        .with_context(|| format!("Invalid plugin: {}", path.display()))?;
    plugin.check()?;

    let shadowed = shadowed_builtins(&plugin)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "valid": true,
            "name": plugin.name(),
            "extensions": plugin.extensions(),
            "overrides_builtin": shadowed,
        }));
    } else {
        let exts: Vec<&str> = plugin.extensions().iter().map(Extension::as_str).collect();
        output.success(&format!(
            "Plugin '{}' is valid (extensions: {})",
            plugin.name(),
            exts.join(", ")
        ));
        if !shadowed.is_empty() {
            let exts: Vec<&str> = shadowed.iter().map(Extension::as_str).collect();
            println!("Overrides builtin plugin for: {}", exts.join(", "));
        }
    }

    Ok(())
}

/// Extensions of `plugin` that currently belong to a builtin
fn shadowed_builtins(plugin: &PluginDescriptor) -> Result<Vec<Extension>> {
    let mut registry = Registry::new();
    for builtin in builtins()? {
        registry.register_builtin(builtin);
    }

    Ok(plugin
        .extensions()
        .iter()
        .filter(|ext| registry.lookup(ext.as_str()).is_some())
        .cloned()
        .collect())
}
