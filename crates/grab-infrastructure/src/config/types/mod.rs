//! Configuration types module

pub mod app;
pub mod logging;
pub mod resolver;

// Re-export main types
pub use app::*;
