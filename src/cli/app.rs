//! Main CLI application structure

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;

use super::output::{Output, OutputFormat};
use super::{logging, plugin_cmd, run_cmd, script_cmd};
use crate::plugin::Registry;
use crate::storage::Config;

#[derive(Parser)]
#[command(name = "rune")]
#[command(author, version, about = "Universal script runner with a Lua plugin engine")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable debug logging (overridden by RUNE_LOG)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a script using the plugin for its extension
    #[command(visible_alias = "r")]
    Run {
        /// Script name (file name without extension)
        name: String,

        /// Force the script extension (e.g. py, lua)
        #[arg(long = "extension", short = 'x')]
        extension: Option<String>,

        /// Arguments passed to the script
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Inspect plugins
    #[command(subcommand)]
    Plugin(plugin_cmd::PluginCommands),

    /// Inspect scripts
    #[command(subcommand)]
    Script(script_cmd::ScriptCommands),
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let output = Output::new(cli.format);
    let config = Config::load()?;
    config.ensure_dirs()?;

    match cli.command {
        Commands::Run {
            name,
            extension,
            args,
        } => run_cmd::run(&output, &config, &name, extension.as_deref(), &args)?,
        Commands::Plugin(cmd) => plugin_cmd::run(cmd, &output, &config)?,
        Commands::Script(cmd) => script_cmd::run(cmd, &output, &config)?,
    }

    debug!("command completed");
    Ok(())
}

/// Loads the registry for the configured plugin directory
pub(super) fn load_registry(config: &Config) -> Result<Registry> {
    Registry::load(&config.plugin_dir).with_context(|| {
        format!(
            "Failed to load plugins from {}",
            config.plugin_dir.display()
        )
    })
}
