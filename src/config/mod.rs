//! Configuration module for twtvt.
//!
//! This module handles:
//! - Loading configuration from TOML files
//! - Configuration validation

pub mod loader;
pub mod validation;

pub use loader::{AccountConfig, Config, OptionsConfig, ToolsConfig};
pub use validation::validate_config;
