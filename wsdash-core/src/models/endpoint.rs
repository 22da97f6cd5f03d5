//! Endpoint model

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::transport::is_valid_address;

/// A named address of a live data source
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    /// Display name
    pub name: String,
    /// `ws://` or `wss://` address
    pub address: String,
}

impl Endpoint {
    /// Creates an endpoint, trimming surrounding whitespace from both fields
    #[must_use]
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into().trim().to_string(),
            address: address.into().trim().to_string(),
        }
    }

    /// Checks the name is non-empty and the address is a `ws`/`wss` URI
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] naming the offending field.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::validation("name", "must not be empty"));
        }
        if self.address.trim().is_empty() {
            return Err(ConfigError::validation("address", "must not be empty"));
        }
        if !is_valid_address(&self.address) {
            return Err(ConfigError::validation(
                "address",
                format!(
                    "'{}' is not a valid address (expected ws://host[:port][/path] or wss://...)",
                    self.address
                ),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.address)
    }
}
