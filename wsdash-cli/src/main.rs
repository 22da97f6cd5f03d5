//! `wsdash` CLI - live WebSocket data monitor
//!
//! Manages the saved endpoint list and streams readings from the selected
//! endpoint, reconnecting when the connection drops.

mod cli;
mod commands;
mod error;
mod format;
mod util;

use clap::Parser;
use cli::Cli;

fn main() {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    util::init_logging(config_path, cli.verbose, cli.quiet);

    let result = commands::dispatch(config_path, cli.command);

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(e.exit_code());
    }
}
