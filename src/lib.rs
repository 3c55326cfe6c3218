//! rune - Universal script runner
//!
//! rune runs scripts by bare name, picking an interpreter from the script's
//! file extension. Interpreters are plugins: a few ship with the binary and
//! the rest are Lua files in the user's plugin directory.

pub mod cli;
pub mod domain;
pub mod plugin;
pub mod storage;

pub use domain::Extension;
pub use plugin::{PluginDescriptor, Registry};
pub use storage::{Config, ScriptResolver};
