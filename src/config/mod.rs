//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ResetConfig (validated, immutable)
//!     → cloned into the controller, poller and countdown
//! ```
//!
//! # Design Decisions
//! - All fields have defaults so an empty file is a valid config
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    CountdownConfig, ObservabilityConfig, PollingConfig, ResetConfig, ServiceConfig,
    StorageConfig,
};
