//! Command handler modules for the CLI.

mod add;
mod completions;
mod delete;
mod list;
mod select;
mod show;
mod update;
mod watch;

use std::path::Path;

use crate::cli::Commands;
use crate::error::CliError;

/// Dispatch a CLI command to the appropriate handler.
pub fn dispatch(config_path: Option<&Path>, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::List { format } => list::cmd_list(config_path, format),
        Commands::Add { name, address } => add::cmd_add(config_path, &name, &address),
        Commands::Update {
            target,
            name,
            address,
        } => update::cmd_update(config_path, &target, name.as_deref(), address.as_deref()),
        Commands::Delete { target } => delete::cmd_delete(config_path, &target),
        Commands::Select { target } => select::cmd_select(config_path, &target),
        Commands::Show { target } => show::cmd_show(config_path, &target),
        Commands::Watch(args) => watch::cmd_watch(config_path, args),
        Commands::Completions { shell } => completions::cmd_completions(shell),
    }
}
