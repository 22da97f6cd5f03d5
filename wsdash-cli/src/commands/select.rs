//! Select endpoint command.

use std::path::Path;

use crate::error::CliError;
use crate::util::load_endpoints;

/// Select endpoint command handler
pub fn cmd_select(config_path: Option<&Path>, target: &str) -> Result<(), CliError> {
    let mut endpoints = load_endpoints(config_path)?;
    let index = endpoints.find(target)?;

    endpoints
        .select(index)
        .map_err(|e| CliError::Config(format!("Failed to save selection: {e}")))?;

    if let Some(endpoint) = endpoints.active() {
        println!("Selected endpoint: {endpoint}");
    }
    Ok(())
}
