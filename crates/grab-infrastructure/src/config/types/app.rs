//! Main application configuration

use serde::{Deserialize, Serialize};

pub use super::logging::LoggingConfig;
pub use super::resolver::{FirstUsePolicy, ResolverConfig};

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Resolver behaviour
    pub resolver: ResolverConfig,

    /// Logging setup
    pub logging: LoggingConfig,
}
