//! # Domain Layer
//!
//! Core types of grab, a lazy, memoizing producer registry.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`value_objects`] | Producer handles and produced values |
//! | [`ports`] | The [`Container`] interface producers resolve through |
//! | [`assign`] | Installing produced values into destinations |
//! | [`error`] | Error and result types |
//!
//! Resolver implementations live in the infrastructure crate.

pub mod assign;
pub mod error;
pub mod ports;
pub mod value_objects;

// Re-export commonly used types
pub use error::{Error, Result};
pub use ports::{Container, ContainerExt};
pub use value_objects::{ErasedProducer, ProducedValue, Producer, ProducerId};
