//! Value objects
//!
//! Producer handles and the values they construct.

pub mod produced;
pub mod producer;

pub use produced::ProducedValue;
pub use producer::{ErasedProducer, Producer, ProducerId};
