//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use wikitables_cli::CliError;

fn main() {
    match wikitables_cli::run() {
        Ok(()) => {}
        // Help and version output are reported through clap's own exit path.
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("wikitables: {err}");
            std::process::exit(1);
        }
    }
}
