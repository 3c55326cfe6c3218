//! Lua execution for script plugins
//!
//! Each plugin invocation gets its own [`Sandbox`]: a fresh interpreter with
//! `target`, `args` and the `rune` helper table bound as globals. The sandbox
//! is consumed by [`Sandbox::exec`], so an interpreter can never serve a
//! second call.

use std::path::Path;
use std::process::Command;

use mlua::{Lua, Table};
use tracing::debug;

/// A single-use Lua interpreter prepared for one plugin call
pub struct Sandbox {
    lua: Lua,
}

impl Sandbox {
    /// Creates a fresh interpreter with the plugin globals bound
    pub fn new(target: &Path, args: &[String]) -> mlua::Result<Self> {
        let lua = Lua::new();
        {
            let globals = lua.globals();
            globals.set("target", target.to_string_lossy().into_owned())?;
            globals.set("args", lua.create_sequence_from(args.iter().cloned())?)?;
            globals.set("rune", host_table(&lua)?)?;
        }
        Ok(Self { lua })
    }

    /// Runs a plugin chunk and tears the interpreter down
    pub fn exec(self, chunk_name: &str, source: impl AsRef<[u8]>) -> mlua::Result<()> {
        debug!(chunk = chunk_name, "executing plugin chunk");
        self.lua.load(source.as_ref()).set_name(chunk_name).exec()
    }
}

/// Compiles a plugin chunk without running it
pub fn compile(chunk_name: &str, source: impl AsRef<[u8]>) -> mlua::Result<()> {
    let lua = Lua::new();
    lua.load(source.as_ref()).set_name(chunk_name).into_function()?;
    Ok(())
}

/// Helpers exposed to plugins as the `rune` global
fn host_table(lua: &Lua) -> mlua::Result<Table> {
    let table = lua.create_table()?;

    let exec = lua.create_function(|_, (program, argv): (String, Option<Vec<String>>)| {
        let argv = argv.unwrap_or_default();
        debug!(program = %program, args = ?argv, "rune.exec");

        let status = Command::new(&program)
            .args(&argv)
            .status()
            .map_err(|e| mlua::Error::external(format!("failed to run '{}': {}", program, e)))?;

        Ok(status.code().unwrap_or(-1))
    })?;

    table.set("exec", exec)?;
    table.set("version", env!("CARGO_PKG_VERSION"))?;
    Ok(table)
}
