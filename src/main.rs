//! rune - Universal script runner

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = rune_cli::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
