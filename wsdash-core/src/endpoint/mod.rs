//! Endpoint list management
//!
//! `EndpointManager` handles CRUD and selection for saved endpoints, with
//! persistence through `ConfigManager`. No two endpoints share an address.

mod manager;

pub use manager::EndpointManager;
