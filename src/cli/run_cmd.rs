//! `rune run`

use anyhow::Result;

use super::app::load_registry;
use super::output::Output;
use crate::plugin::dispatch;
use crate::storage::{Config, ScriptResolver};

pub fn run(
    output: &Output,
    config: &Config,
    name: &str,
    extension: Option<&str>,
    args: &[String],
) -> Result<()> {
    let registry = load_registry(config)?;
    let resolver = ScriptResolver::new(&config.script_dir);

    let done = dispatch(&registry, &resolver, name, extension, args)?;

    // Text mode stays silent: the script's own output is the result.
    if output.is_json() {
        output.data(&done);
    }

    Ok(())
}
