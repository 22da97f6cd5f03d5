//! Delete endpoint command.

use std::path::Path;

use crate::error::CliError;
use crate::util::load_endpoints;

/// Delete endpoint command handler
pub fn cmd_delete(config_path: Option<&Path>, target: &str) -> Result<(), CliError> {
    let mut endpoints = load_endpoints(config_path)?;
    let index = endpoints.find(target)?;

    let removed = endpoints
        .delete(index)
        .map_err(|e| CliError::Config(format!("Failed to delete endpoint: {e}")))?;

    println!("Deleted endpoint '{}' ({})", removed.name, removed.address);
    if let Some(active) = endpoints.active() {
        println!("Active endpoint is now '{}'", active.name);
    }
    Ok(())
}
