//! Mock overlay
//!
//! A resolver decorator for tests: values recorded with
//! [`MockOverlay::mock`] are returned for their producer without consulting
//! the cache or running construction. Overrides also apply to requests made by
//! producers while they are being constructed, so a mocked dependency is seen
//! by everything that depends on it.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use grab_domain::{ContainerExt, Producer};
//! use grab_infrastructure::MockOverlay;
//!
//! struct Config {
//!     name: String,
//! }
//!
//! struct Service {
//!     greeting: String,
//! }
//!
//! let config = Producer::owned(|_| {
//!     Ok(Config {
//!         name: "Hello".to_string(),
//!     })
//! });
//! let service = {
//!     let config = config.clone();
//!     Producer::owned(move |c| {
//!         let config = c.get(&config)?;
//!         Ok(Service {
//!             greeting: config.name.clone(),
//!         })
//!     })
//! };
//!
//! let overlay = MockOverlay::new();
//! overlay
//!     .mock(&config, Arc::new(Config { name: "Mocked".to_string() }))
//!     .unwrap();
//!
//! assert_eq!(overlay.get(&service).unwrap().greeting, "Mocked");
//! ```

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::sync::{Arc, RwLock};

use grab_domain::error::{Error, Result};
use grab_domain::ports::Container;
use grab_domain::value_objects::{ErasedProducer, ProducedValue, Producer, ProducerId};
use tracing::debug;

use crate::resolver::{Chain, ChainResolve, Resolver};

/// Resolver decorator with write-once per-producer overrides
pub struct MockOverlay {
    inner: Resolver,
    mocks: RwLock<HashMap<ProducerId, ProducedValue>>,
}

impl Default for MockOverlay {
    fn default() -> Self {
        Self::new()
    }
}

impl MockOverlay {
    /// Overlay over a fresh resolver
    pub fn new() -> Self {
        Self::wrap(Resolver::new())
    }

    /// Overlay over an existing resolver
    pub fn wrap(inner: Resolver) -> Self {
        Self {
            inner,
            mocks: RwLock::new(HashMap::new()),
        }
    }

    /// The wrapped resolver
    pub fn inner(&self) -> &Resolver {
        &self.inner
    }

    /// Pin `value` as the result of `producer`
    ///
    /// Fails with [`Error::AlreadyMocked`] if `producer` already has an
    /// override; the first override stays in place.
    pub fn mock<T>(&self, producer: &Producer<T>, value: Arc<T>) -> Result<()>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.mock_erased(producer.erased(), ProducedValue::new(value))
    }

    /// Pin an already erased value as the result of `producer`
    ///
    /// The value is not checked against the producer's type here; a mismatch
    /// surfaces as [`Error::TypeMismatch`] when the override is read.
    pub fn mock_erased(&self, producer: &ErasedProducer, value: ProducedValue) -> Result<()> {
        let mut mocks = self
            .mocks
            .write()
            .map_err(|_| Error::infrastructure("Mock table lock poisoned"))?;

        match mocks.entry(producer.id()) {
            Entry::Occupied(_) => Err(Error::already_mocked(producer.label())),
            Entry::Vacant(slot) => {
                debug!(producer = %producer.label(), "Override recorded");
                slot.insert(value);
                Ok(())
            }
        }
    }

    fn lookup(&self, producer: &ErasedProducer) -> Result<Option<ProducedValue>> {
        let mocks = self
            .mocks
            .read()
            .map_err(|_| Error::infrastructure("Mock table lock poisoned"))?;
        Ok(mocks.get(&producer.id()).cloned())
    }
}

impl ChainResolve for MockOverlay {
    fn resolve_in_chain(&self, producer: &ErasedProducer, chain: &Chain) -> Result<ProducedValue> {
        if let Some(value) = self.lookup(producer)? {
            debug!(producer = %producer.label(), "Override hit");
            return Ok(value);
        }
        self.inner.resolve_with(self, producer, chain)
    }
}

impl Container for MockOverlay {
    fn resolve(&self, producer: &ErasedProducer) -> Result<ProducedValue> {
        self.resolve_in_chain(producer, &self.inner.ambient_chain())
    }
}

impl fmt::Debug for MockOverlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("MockOverlay");
        debug.field("inner", &self.inner);
        if let Ok(mocks) = self.mocks.read() {
            debug.field("overrides", &mocks.len());
        }
        debug.finish()
    }
}
