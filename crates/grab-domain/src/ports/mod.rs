//! Ports
//!
//! The container interface producers resolve their dependencies through.

pub mod container;

pub use container::{Container, ContainerExt};
