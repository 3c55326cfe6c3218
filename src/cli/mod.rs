//! # Command-Line Interface
//!
//! Thin commands over the plugin engine.
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `run <name> [-x ext] [args...]` | Run a script through its plugin |
//! | `plugin list` / `info` / `check` | Inspect plugins |
//! | `script list` / `which` | Inspect scripts |
//!
//! ## Output Formats
//!
//! All commands support `--format`:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Logging
//!
//! Diagnostics go to stderr. Set `RUNE_LOG=debug` or pass `--verbose`.
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod logging;
mod output;
mod plugin_cmd;
mod run_cmd;
mod script_cmd;

pub use app::{run, Cli, Commands};
pub use logging::LOG_ENV;
pub use output::{Output, OutputFormat};
