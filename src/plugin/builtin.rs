//! Plugins shipped with rune
//!
//! Two kinds of builtins exist:
//! - native runners, declared in [`NATIVE`], that spawn an interpreter directly
//! - embedded Lua plugins under `src/plugin/builtins/`, parsed exactly like
//!   plugin files on disk
//!
//! Natives are registered before embedded plugins, and among builtins the
//! first declaration of an extension wins.

use super::descriptor::PluginDescriptor;
use super::registry::LoadError;

/// Native runners: (name, extensions, program)
pub const NATIVE: &[(&str, &[&str], &str)] = &[("Lua", &["lua"], "lua")];

/// Embedded plugin resources: (resource name, source)
pub const EMBEDDED: &[(&str, &str)] = &[
    ("lua.lua", include_str!("builtins/lua.lua")),
    ("node.lua", include_str!("builtins/node.lua")),
    ("python.lua", include_str!("builtins/python.lua")),
    ("shell.lua", include_str!("builtins/shell.lua")),
];

/// All builtin descriptors in registration order
pub fn builtins() -> Result<Vec<PluginDescriptor>, LoadError> {
    let mut plugins: Vec<PluginDescriptor> = NATIVE
        .iter()
        .map(|(name, exts, program)| PluginDescriptor::native(*name, exts, *program))
        .collect();

    for &(resource, text) in EMBEDDED {
        let plugin =
            PluginDescriptor::embedded(resource, text).map_err(|source| LoadError::Builtin {
                resource: resource.to_string(),
                source,
            })?;
        plugins.push(plugin);
    }

    Ok(plugins)
}
