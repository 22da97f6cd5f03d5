//! Endpoint list manager

use tracing::{debug, info, warn};

use crate::config::{ConfigManager, EndpointFile};
use crate::error::{ConfigError, ConfigResult, SessionError, SessionResult};
use crate::models::Endpoint;

/// Owns the endpoint list and the active selection
///
/// Every successful change is written through the [`ConfigManager`].
/// Endpoints are addressed by their position in the list.
#[derive(Debug)]
pub struct EndpointManager {
    endpoints: Vec<Endpoint>,
    active: Option<usize>,
    config_manager: ConfigManager,
}

impl EndpointManager {
    /// Loads the saved list
    ///
    /// Invalid entries and entries repeating an earlier address are dropped.
    /// An out-of-range selection is repaired (to 0, or none when the list is
    /// empty). Any repair is saved.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be loaded or the repair cannot
    /// be saved.
    pub fn new(config_manager: ConfigManager) -> ConfigResult<Self> {
        let EndpointFile { active, endpoints } = config_manager.load_endpoints()?;
        let loaded = endpoints.len();
        let (endpoints, active) = Self::without_bad_entries(endpoints, active);
        let mut manager = Self {
            endpoints,
            active,
            config_manager,
        };

        let repaired = manager.repaired_selection();
        let mut dirty = manager.endpoints.len() != loaded;
        if repaired != manager.active {
            info!(from = ?manager.active, to = ?repaired, "Repairing endpoint selection");
            manager.active = repaired;
            dirty = true;
        }
        if dirty {
            manager.persist()?;
        }

        debug!(count = manager.endpoints.len(), active = ?manager.active, "Endpoints loaded");
        Ok(manager)
    }

    /// Keeps the valid entries with distinct addresses
    ///
    /// A selection pointing at a dropped duplicate follows the kept entry
    /// with the same address.
    fn without_bad_entries(
        endpoints: Vec<Endpoint>,
        active: Option<usize>,
    ) -> (Vec<Endpoint>, Option<usize>) {
        let mut kept: Vec<Endpoint> = Vec::with_capacity(endpoints.len());
        let mut kept_active = None;

        for (index, endpoint) in endpoints.into_iter().enumerate() {
            if let Err(err) = ConfigManager::validate_endpoint(&endpoint) {
                warn!(index, error = %err, "Dropping invalid endpoint");
                continue;
            }
            let position = match kept.iter().position(|e| e.address == endpoint.address) {
                Some(existing) => {
                    warn!(index, address = %endpoint.address, "Dropping duplicate endpoint");
                    existing
                }
                None => {
                    kept.push(endpoint);
                    kept.len() - 1
                }
            };
            if active == Some(index) {
                kept_active = Some(position);
            }
        }

        (kept, kept_active)
    }

    /// Creates an empty manager without reading from disk
    #[must_use]
    pub const fn new_empty(config_manager: ConfigManager) -> Self {
        Self {
            endpoints: Vec::new(),
            active: None,
            config_manager,
        }
    }

    fn repaired_selection(&self) -> Option<usize> {
        match self.active {
            Some(index) if index < self.endpoints.len() => Some(index),
            _ if self.endpoints.is_empty() => None,
            _ => Some(0),
        }
    }

    fn persist(&self) -> ConfigResult<()> {
        self.config_manager.save_endpoints(&EndpointFile {
            active: self.active,
            endpoints: self.endpoints.clone(),
        })
    }

    fn check_index(&self, index: usize) -> ConfigResult<()> {
        if index < self.endpoints.len() {
            Ok(())
        } else {
            Err(ConfigError::validation(
                "index",
                format!("endpoint #{index} does not exist"),
            ))
        }
    }

    fn check_unique(&self, address: &str, exclude: Option<usize>) -> ConfigResult<()> {
        if self.address_exists(address, exclude) {
            Err(ConfigError::validation(
                "address",
                format!("an endpoint with address '{address}' already exists"),
            ))
        } else {
            Ok(())
        }
    }

    /// Appends an endpoint and selects it
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid or duplicate endpoint, or when saving
    /// fails.
    pub fn add(&mut self, endpoint: Endpoint) -> ConfigResult<usize> {
        ConfigManager::validate_endpoint(&endpoint)?;
        self.check_unique(&endpoint.address, None)?;

        info!(name = %endpoint.name, address = %endpoint.address, "Adding endpoint");
        self.endpoints.push(endpoint);
        let index = self.endpoints.len() - 1;
        self.active = Some(index);
        self.persist()?;
        Ok(index)
    }

    /// Replaces the endpoint at `index`; the selection is unchanged
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown index, an invalid endpoint, an address
    /// used by another entry, or when saving fails.
    pub fn update(&mut self, index: usize, endpoint: Endpoint) -> ConfigResult<()> {
        self.check_index(index)?;
        ConfigManager::validate_endpoint(&endpoint)?;
        self.check_unique(&endpoint.address, Some(index))?;

        info!(index, name = %endpoint.name, address = %endpoint.address, "Updating endpoint");
        self.endpoints[index] = endpoint;
        self.persist()
    }

    /// Removes the endpoint at `index`
    ///
    /// Deleting the active entry moves the selection to the first entry (or
    /// none); deleting an earlier entry shifts it down by one.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown index or when saving fails.
    pub fn delete(&mut self, index: usize) -> ConfigResult<Endpoint> {
        self.check_index(index)?;

        let removed = self.endpoints.remove(index);
        self.active = match self.active {
            Some(active) if active == index => (!self.endpoints.is_empty()).then_some(0),
            Some(active) if active > index => Some(active - 1),
            other => other,
        };

        info!(name = %removed.name, active = ?self.active, "Deleted endpoint");
        self.persist()?;
        Ok(removed)
    }

    /// Selects the endpoint at `index`
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown index or when saving fails.
    pub fn select(&mut self, index: usize) -> ConfigResult<()> {
        self.check_index(index)?;
        if self.active != Some(index) {
            self.active = Some(index);
            self.persist()?;
        }
        Ok(())
    }

    /// The selected endpoint
    #[must_use]
    pub fn active(&self) -> Option<&Endpoint> {
        self.active.and_then(|index| self.endpoints.get(index))
    }

    /// Index of the selected endpoint
    #[must_use]
    pub const fn active_index(&self) -> Option<usize> {
        self.active
    }

    /// Endpoint at `index`
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Endpoint> {
        self.endpoints.get(index)
    }

    /// All endpoints in order
    #[must_use]
    pub fn list(&self) -> &[Endpoint] {
        &self.endpoints
    }

    /// Number of endpoints
    #[must_use]
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Returns true when the list is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Returns true if another entry (not `exclude`) already uses `address`
    #[must_use]
    pub fn address_exists(&self, address: &str, exclude: Option<usize>) -> bool {
        self.endpoints
            .iter()
            .enumerate()
            .any(|(i, e)| Some(i) != exclude && e.address == address)
    }

    /// Resolves a user-supplied reference to an index
    ///
    /// Tries, in order: a list index, an exact name, an exact address, a
    /// case-insensitive name and finally a unique name prefix.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownEndpoint`] when nothing matches and
    /// [`SessionError::AmbiguousEndpoint`] when a prefix matches several names.
    pub fn find(&self, query: &str) -> SessionResult<usize> {
        let query = query.trim();

        if let Ok(index) = query.parse::<usize>()
            && index < self.endpoints.len()
        {
            return Ok(index);
        }

        if let Some(index) = self.endpoints.iter().position(|e| e.name == query) {
            return Ok(index);
        }

        if let Some(index) = self.endpoints.iter().position(|e| e.address == query) {
            return Ok(index);
        }

        if let Some(index) = self
            .endpoints
            .iter()
            .position(|e| e.name.eq_ignore_ascii_case(query))
        {
            return Ok(index);
        }

        let lowered = query.to_lowercase();
        let matches: Vec<usize> = self
            .endpoints
            .iter()
            .enumerate()
            .filter(|(_, e)| e.name.to_lowercase().starts_with(&lowered))
            .map(|(i, _)| i)
            .collect();

        match matches.as_slice() {
            [index] => Ok(*index),
            [] => Err(SessionError::UnknownEndpoint(query.to_string())),
            _ => Err(SessionError::AmbiguousEndpoint {
                query: query.to_string(),
                matches: matches
                    .iter()
                    .map(|&i| self.endpoints[i].name.clone())
                    .collect(),
            }),
        }
    }
}
