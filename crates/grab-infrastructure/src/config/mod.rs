//! Configuration
//!
//! Layered configuration loaded with figment: built-in defaults, an optional
//! TOML file, then `GRAB_`-prefixed environment variables.

pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::{AppConfig, FirstUsePolicy, LoggingConfig, ResolverConfig};
