//! Update endpoint command.

use std::path::Path;

use wsdash_core::models::Endpoint;

use crate::error::CliError;
use crate::util::load_endpoints;

/// Update endpoint command handler
pub fn cmd_update(
    config_path: Option<&Path>,
    target: &str,
    name: Option<&str>,
    address: Option<&str>,
) -> Result<(), CliError> {
    if name.is_none() && address.is_none() {
        return Err(CliError::Config(
            "Nothing to update: pass --name and/or --address".to_string(),
        ));
    }

    let mut endpoints = load_endpoints(config_path)?;
    let index = endpoints.find(target)?;
    let current = endpoints
        .get(index)
        .cloned()
        .ok_or_else(|| CliError::EndpointNotFound(target.to_string()))?;

    let updated = Endpoint::new(
        name.unwrap_or(&current.name),
        address.unwrap_or(&current.address),
    );
    endpoints
        .update(index, updated.clone())
        .map_err(|e| CliError::Config(format!("Invalid endpoint: {e}")))?;

    println!("Updated endpoint #{index}: {updated}");
    Ok(())
}
