//! Script inspection commands

use anyhow::Result;
use clap::Subcommand;

use super::app::load_registry;
use super::output::Output;
use crate::plugin::{candidates, select};
use crate::storage::{Config, ScriptResolver};

#[derive(Subcommand)]
pub enum ScriptCommands {
    /// List scripts that have a plugin
    #[command(visible_alias = "ls")]
    List {
        /// One script name per line (no formatting)
        #[arg(long, short = 'p')]
        plain: bool,

        /// Only scripts with this extension
        #[arg(long = "extension", short = 'x')]
        extension: Option<String>,
    },

    /// Print the file a script name resolves to
    Which {
        /// Script name (file name without extension)
        name: String,

        /// Force the script extension
        #[arg(long = "extension", short = 'x')]
        extension: Option<String>,
    },
}

pub fn run(cmd: ScriptCommands, output: &Output, config: &Config) -> Result<()> {
    match cmd {
        ScriptCommands::List { plain, extension } => {
            list_scripts(output, config, plain, extension.as_deref())
        }
        ScriptCommands::Which { name, extension } => {
            which_script(output, config, &name, extension.as_deref())
        }
    }
}

fn list_scripts(output: &Output, config: &Config, plain: bool, extension: Option<&str>) -> Result<()> {
    let registry = load_registry(config)?;
    let resolver = ScriptResolver::new(&config.script_dir);

    let exts = candidates(&registry, extension)?;
    let scripts = resolver.scripts(&exts)?;

    if output.is_json() {
        output.data(&scripts);
        return Ok(());
    }

    if scripts.is_empty() {
        println!("No scripts found in {}", resolver.root().display());
        return Ok(());
    }

    if plain {
        for script in &scripts {
            println!("{}", script.name);
        }
        return Ok(());
    }

    println!("{:<4} {:<24} {:<10} PLUGIN", "ID", "NAME", "EXTENSION");
    println!("{}", "-".repeat(70));
    for (index, script) in scripts.iter().enumerate() {
        let plugin = registry
            .lookup(script.extension.as_str())
            .map(|p| p.name())
            .unwrap_or("-");
        println!(
            "{:<4} {:<24} {:<10} {}",
            index + 1,
            script.name,
            script.extension,
            plugin
        );
    }

    Ok(())
}

fn which_script(output: &Output, config: &Config, name: &str, extension: Option<&str>) -> Result<()> {
    let registry = load_registry(config)?;
    let resolver = ScriptResolver::new(&config.script_dir);

    let selection = select(&registry, &resolver, name, extension)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "script": selection.script,
            "extension": selection.extension,
            "plugin": selection.plugin.name(),
            "source": selection.plugin.source_label(),
        }));
    } else {
        println!("{}", selection.script.display());
    }

    Ok(())
}
