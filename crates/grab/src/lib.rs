//! # grab
//!
//! A lazy, memoizing object-construction registry.
//!
//! Register construction logic as a [`Producer`], then ask a [`Resolver`] for
//! it. The first request builds the value, every later request receives the
//! same shared instance. Producers resolve their own dependencies through the
//! container they are handed, and a producer that ends up requesting itself is
//! reported as a circular dependency instead of recursing forever.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use grab::prelude::*;
//!
//! trait Speak: Send + Sync {
//!     fn say(&self) -> String;
//! }
//!
//! struct Foo;
//!
//! impl Speak for Foo {
//!     fn say(&self) -> String {
//!         "foo:hello world".to_string()
//!     }
//! }
//!
//! struct Bar {
//!     speak: Arc<dyn Speak>,
//! }
//!
//! let foo: Producer<dyn Speak> = Producer::named("foo", |_| Ok(Arc::new(Foo) as Arc<dyn Speak>));
//! let bar = {
//!     let foo = foo.clone();
//!     Producer::owned(move |c| Ok(Bar { speak: c.get(&foo)? }))
//! };
//!
//! let resolver = Resolver::new();
//! let resolved = resolver.get(&bar).unwrap();
//! assert_eq!(format!("bar:{}", resolved.speak.say()), "bar:foo:hello world");
//! assert!(Arc::ptr_eq(&resolved.speak, &resolver.get(&foo).unwrap()));
//! ```
//!
//! ## Architecture
//!
//! - `domain` - producer handles, produced values, the container port, errors
//! - `infrastructure` - resolver, mock overlay, configuration, logging

/// Domain layer - producer handles, container port and errors
///
/// Re-exports from the domain crate for convenience
pub mod domain {
    pub use grab_domain::*;
}

/// Infrastructure layer - resolvers, configuration and logging
///
/// Re-exports from the infrastructure crate for convenience
pub mod infrastructure {
    pub use grab_infrastructure::*;
}

// Re-export commonly used domain types at the crate root
pub use domain::*;

// Re-export resolvers at the crate root
pub use infrastructure::{
    AppConfig, ConfigLoader, FirstUsePolicy, MockOverlay, Resolver, ResolverConfig,
};

/// Everything needed to declare and resolve producers
pub mod prelude {
    pub use grab_domain::{Container, ContainerExt, Error, Producer, Result};
    pub use grab_infrastructure::{MockOverlay, Resolver};
}
