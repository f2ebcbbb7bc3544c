//! Pactum core — wire types, error taxonomy, shared state store, config.

pub mod config;
pub mod error;
pub mod state;
pub mod types;
pub mod utils;

pub use error::{ModelRequestError, StateError, ToolError};
pub use state::{SharedState, StateStore};
