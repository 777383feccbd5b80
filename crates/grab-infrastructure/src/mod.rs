//! # Infrastructure Layer
//!
//! Resolver implementations and the cross-cutting concerns around them.
//!
//! ## Module Categories
//!
//! ### Resolution
//! | Module | Description |
//! |--------|-------------|
//! | [`resolver`] | Memoizing, cycle-detecting resolver |
//! | [`mock`] | Resolver decorator with write-once overrides |
//!
//! ### Configuration
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Figment-layered configuration |
//! | [`constants`] | Centralized configuration constants |
//!
//! ### Observability
//! | Module | Description |
//! |--------|-------------|
//! | [`logging`] | Structured logging with tracing |
//! | [`error_ext`] | Context for foreign errors |

pub mod config;
pub mod constants;
pub mod error_ext;
pub mod logging;
pub mod mock;
pub mod resolver;

// Re-export commonly used types
pub use config::{AppConfig, ConfigLoader, FirstUsePolicy, ResolverConfig};
pub use error_ext::ErrorContext;
pub use mock::MockOverlay;
pub use resolver::Resolver;
