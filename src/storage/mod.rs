//! # Storage Layer
//!
//! Everything rune reads from disk besides plugins themselves.
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Config | TOML | `~/.config/rune/config.toml` (or `$RUNE_CONFIG`) |
//! | Plugins | Lua | `~/.local/share/rune/plugins/` (or `$RUNE_PLUGIN`) |
//! | Scripts | any | `~/.local/share/rune/scripts/` (or `$RUNE_REPO`) |
//!
//! ## Key Types
//!
//! - [`Config`] - Resolved plugin and script directories
//! - [`ScriptResolver`] - Finds scripts by bare name

mod config;
mod scripts;

pub use config::{Config, ConfigError, ConfigFile, CONFIG_FILE_ENV, PLUGIN_DIR_ENV, SCRIPT_DIR_ENV};
pub use scripts::{ScriptEntry, ScriptError, ScriptResolver};
