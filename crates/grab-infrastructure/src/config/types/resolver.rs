//! Resolver configuration types

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a resolver treats a producer another chain is already constructing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FirstUsePolicy {
    /// Wait for the in-flight construction and reuse its result
    #[default]
    SingleFlight,
    /// Construct independently; the first stored result wins
    Race,
}

impl fmt::Display for FirstUsePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SingleFlight => f.write_str("single_flight"),
            Self::Race => f.write_str("race"),
        }
    }
}

/// Resolver configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Behaviour under concurrent first use of one producer
    pub first_use: FirstUsePolicy,
}

impl ResolverConfig {
    /// Configuration with the given first-use policy
    pub fn with_first_use(first_use: FirstUsePolicy) -> Self {
        Self { first_use }
    }
}
