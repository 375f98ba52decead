//! Shared types, error model, and configuration for routeman.
//!
//! This crate is the foundation depended on by the other routeman crates.
//! It provides:
//! - [`RoutemanError`] — the unified error type
//! - Domain types ([`RouteDescriptor`], [`RequestItem`], [`Folder`], [`Collection`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, AuthConfig, CollectionConfig, OutputConfig, RoutesConfig, CONFIG_FILE_NAME,
    home_config_path, init_config, load_config, load_config_from, resolve_config_path,
    validate_config,
};
pub use error::{Result, RoutemanError};
pub use types::{
    BASE_URL_VAR, Collection, Folder, POSTMAN_SCHEMA_URL, RawRoute, RequestItem,
    RouteDescriptor, TOKEN_VAR, Variable,
};
