//! # Plugin System
//!
//! Routes scripts to interpreters by file extension.
//!
//! ## Overview
//!
//! A plugin is a descriptor (name, extensions, origin) plus a way to run a
//! target script. Plugins are Lua files that start with a metadata block:
//!
//! ```lua
//! --[[ rune-meta
//! name: Python
//! ext: [py, pyw]
//! ]]
//! rune.exec("python3", { target, table.unpack(args) })
//! ```
//!
//! When run, the plugin sees two globals: `target`, the absolute path of the
//! script to run, and `args`, the caller's arguments. It is responsible for
//! invoking the target itself. Every run gets a fresh interpreter.
//!
//! ## Plugin Sources
//!
//! | Source | Origin | Precedence |
//! |--------|--------|------------|
//! | Native runners | builtin | first declaration wins |
//! | Embedded Lua plugins | builtin | first declaration wins |
//! | `*.lua` in the plugin directory | file | last file wins, beats builtins |
//!
//! ## Key Types
//!
//! - [`Registry`] - Extension → plugin map, built by [`Registry::load`]
//! - [`PluginDescriptor`] - One plugin and its backend
//! - [`extract_metadata`] - Parses a `rune-meta` block
//! - [`dispatch`] - Resolve a script by name and run it

mod builtin;
mod descriptor;
mod dispatch;
mod lua;
mod meta;
mod registry;

pub use builtin::{builtins, EMBEDDED, NATIVE};
pub use descriptor::{PluginDescriptor, PluginOrigin, RunError, BUILTIN_PREFIX};
pub use dispatch::{candidates, dispatch, select, DispatchError, Dispatched, Selection};
pub use meta::{extract_metadata, MetaError, PluginMeta};
pub use registry::{discover, LoadError, Registry, PLUGIN_SUFFIX};
