//! Core data models

mod endpoint;

pub use endpoint::Endpoint;
