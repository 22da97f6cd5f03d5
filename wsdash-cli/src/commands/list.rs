//! List endpoints command.

use std::fmt::Write as _;
use std::path::Path;

use wsdash_core::endpoint::EndpointManager;

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::format::escape_csv_field;
use crate::util::load_endpoints;

/// List endpoints command handler
pub fn cmd_list(config_path: Option<&Path>, format: OutputFormat) -> Result<(), CliError> {
    let endpoints = load_endpoints(config_path)?;

    match format {
        OutputFormat::Table => println!("{}", format_table(&endpoints)),
        OutputFormat::Json => println!("{}", format_json(&endpoints)?),
        OutputFormat::Csv => println!("{}", format_csv(&endpoints)),
    }

    Ok(())
}

/// Format endpoints as a table string; the active one is marked with `*`
#[must_use]
pub fn format_table(endpoints: &EndpointManager) -> String {
    if endpoints.is_empty() {
        return "No endpoints found.".to_string();
    }

    let mut output = String::new();

    let name_width = endpoints
        .list()
        .iter()
        .map(|e| e.name.len())
        .max()
        .unwrap_or(4)
        .max(4);
    let index_width = endpoints.len().to_string().len().max(1) + 1;

    let _ = writeln!(
        output,
        "  {:<index_width$}  {:<name_width$}  ADDRESS",
        "#", "NAME"
    );
    let _ = writeln!(
        output,
        "  {:-<index_width$}  {:-<name_width$}  {:-<7}",
        "", "", ""
    );

    for (index, endpoint) in endpoints.list().iter().enumerate() {
        let marker = if endpoints.active_index() == Some(index) {
            '*'
        } else {
            ' '
        };
        let _ = writeln!(
            output,
            "{marker} {:<index_width$}  {:<name_width$}  {}",
            index, endpoint.name, endpoint.address
        );
    }

    output.trim_end().to_string()
}

/// Format endpoints as a JSON array
///
/// # Errors
///
/// Returns `CliError::Config` if JSON serialization fails.
pub fn format_json(endpoints: &EndpointManager) -> Result<String, CliError> {
    let output: Vec<EndpointOutput> = endpoints
        .list()
        .iter()
        .enumerate()
        .map(|(index, e)| EndpointOutput {
            index,
            name: e.name.clone(),
            address: e.address.clone(),
            active: endpoints.active_index() == Some(index),
        })
        .collect();
    serde_json::to_string_pretty(&output)
        .map_err(|e| CliError::Config(format!("Failed to serialize to JSON: {e}")))
}

/// Format endpoints as CSV with a header row
#[must_use]
pub fn format_csv(endpoints: &EndpointManager) -> String {
    let mut output = String::from("index,name,address,active\n");

    for (index, endpoint) in endpoints.list().iter().enumerate() {
        let _ = writeln!(
            output,
            "{},{},{},{}",
            index,
            escape_csv_field(&endpoint.name),
            escape_csv_field(&endpoint.address),
            endpoints.active_index() == Some(index)
        );
    }

    output.trim_end().to_string()
}

/// Endpoint as printed by `list --format json`
#[derive(Debug, Clone, serde::Serialize)]
pub struct EndpointOutput {
    pub index: usize,
    pub name: String,
    pub address: String,
    pub active: bool,
}
