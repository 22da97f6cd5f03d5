//! Show endpoint details command.

use std::path::Path;

use crate::error::CliError;
use crate::util::load_endpoints;

/// Show endpoint details command handler
pub fn cmd_show(config_path: Option<&Path>, target: &str) -> Result<(), CliError> {
    let endpoints = load_endpoints(config_path)?;
    let index = endpoints.find(target)?;
    let endpoint = endpoints
        .get(index)
        .ok_or_else(|| CliError::EndpointNotFound(target.to_string()))?;

    println!("Endpoint Details:");
    println!("  Index:    {index}");
    println!("  Name:     {}", endpoint.name);
    println!("  Address:  {}", endpoint.address);
    println!(
        "  Active:   {}",
        if endpoints.active_index() == Some(index) {
            "yes"
        } else {
            "no"
        }
    );

    Ok(())
}
