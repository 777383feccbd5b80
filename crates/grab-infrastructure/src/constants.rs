//! Infrastructure layer constants

// ============================================================================
// CONFIGURATION CONSTANTS
// ============================================================================

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "grab.toml";

/// Default configuration directory name
pub const DEFAULT_CONFIG_DIR: &str = "grab";

/// Environment variable prefix for configuration
pub const CONFIG_ENV_PREFIX: &str = "GRAB";

/// Separator between nested keys in environment variable names
///
/// `GRAB_RESOLVER__FIRST_USE=race` sets `resolver.first_use`.
pub const CONFIG_ENV_SEPARATOR: &str = "__";

// ============================================================================
// LOGGING CONSTANTS
// ============================================================================

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Environment variable that overrides the configured log filter
pub const LOG_ENV_VAR: &str = "GRAB_LOG";

/// File name prefix used when the configured log path has no stem
pub const DEFAULT_LOG_FILE_PREFIX: &str = "grab";

/// Maximum number of rotated log files to keep
pub const LOG_MAX_FILES: usize = 7;
