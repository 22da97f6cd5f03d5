//! Add endpoint command.

use std::path::Path;

use wsdash_core::models::Endpoint;

use crate::error::CliError;
use crate::util::load_endpoints;

/// Add endpoint command handler
pub fn cmd_add(config_path: Option<&Path>, name: &str, address: &str) -> Result<(), CliError> {
    let mut endpoints = load_endpoints(config_path)?;

    let endpoint = Endpoint::new(name, address);
    let index = endpoints
        .add(endpoint.clone())
        .map_err(|e| CliError::Config(format!("Invalid endpoint: {e}")))?;

    println!(
        "Added endpoint '{}' ({}) as #{index}",
        endpoint.name, endpoint.address
    );
    Ok(())
}
