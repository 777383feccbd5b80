//! Producer handles
//!
//! A producer is the capability that builds one dependency. Its identity is the
//! [`ProducerId`] allocated when it is created: clones share the id, while two
//! producers built from identical closures are still distinct registry entries.
//!
//! ```
//! use std::sync::Arc;
//! use grab_domain::Producer;
//!
//! struct Config {
//!     name: String,
//! }
//!
//! let config = Producer::named("config", |_| {
//!     Ok(Arc::new(Config {
//!         name: "Hello".to_string(),
//!     }))
//! });
//!
//! assert_eq!(config.name(), Some("config"));
//! assert_eq!(config.clone().id(), config.id());
//! ```

use std::any::type_name;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::Result;
use crate::ports::Container;
use crate::value_objects::ProducedValue;

static NEXT_PRODUCER_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a producer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProducerId(u64);

impl ProducerId {
    fn next() -> Self {
        Self(NEXT_PRODUCER_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw id value
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProducerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "producer#{}", self.0)
    }
}

type ProduceFn = dyn Fn(&dyn Container) -> Result<ProducedValue> + Send + Sync;

/// Type-erased producer, the form containers key and invoke
#[derive(Clone)]
pub struct ErasedProducer {
    id: ProducerId,
    name: Option<Arc<str>>,
    produces: &'static str,
    produce: Arc<ProduceFn>,
}

impl ErasedProducer {
    /// Create an erased producer with a fresh identity
    ///
    /// `produces` is the name of the type the closure yields, used only for
    /// diagnostics.
    pub fn new<F>(name: Option<String>, produces: &'static str, produce: F) -> Self
    where
        F: Fn(&dyn Container) -> Result<ProducedValue> + Send + Sync + 'static,
    {
        Self {
            id: ProducerId::next(),
            name: name.map(Arc::from),
            produces,
            produce: Arc::new(produce),
        }
    }

    /// Identity of this producer
    pub fn id(&self) -> ProducerId {
        self.id
    }

    /// Diagnostic name, if one was given
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Name of the type this producer yields
    pub fn produces(&self) -> &'static str {
        self.produces
    }

    /// Human readable label for errors and log events
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => format!("{name} ({})", self.id),
            None => format!("{} <{}>", self.id, self.produces),
        }
    }

    /// Run the construction logic against `container`
    pub fn produce(&self, container: &dyn Container) -> Result<ProducedValue> {
        (self.produce)(container)
    }
}

impl PartialEq for ErasedProducer {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ErasedProducer {}

impl Hash for ErasedProducer {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ErasedProducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErasedProducer")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("produces", &self.produces)
            .finish_non_exhaustive()
    }
}

/// Typed producer handle for values of type `T`
///
/// `T` may be unsized, so a producer can yield a trait object such as
/// `Producer<dyn Speak>`.
pub struct Producer<T: ?Sized> {
    erased: ErasedProducer,
    _marker: PhantomData<fn() -> Arc<T>>,
}

impl<T> Producer<T>
where
    T: ?Sized + Send + Sync + 'static,
{
    /// Create an anonymous producer
    pub fn new<F>(produce: F) -> Self
    where
        F: Fn(&dyn Container) -> Result<Arc<T>> + Send + Sync + 'static,
    {
        Self::build(None, produce)
    }

    /// Create a producer carrying a diagnostic name
    pub fn named<S, F>(name: S, produce: F) -> Self
    where
        S: Into<String>,
        F: Fn(&dyn Container) -> Result<Arc<T>> + Send + Sync + 'static,
    {
        Self::build(Some(name.into()), produce)
    }

    fn build<F>(name: Option<String>, produce: F) -> Self
    where
        F: Fn(&dyn Container) -> Result<Arc<T>> + Send + Sync + 'static,
    {
        let erased = ErasedProducer::new(name, type_name::<T>(), move |container| {
            produce(container).map(ProducedValue::new)
        });
        Self {
            erased,
            _marker: PhantomData,
        }
    }

    /// Identity of this producer
    pub fn id(&self) -> ProducerId {
        self.erased.id()
    }

    /// Diagnostic name, if one was given
    pub fn name(&self) -> Option<&str> {
        self.erased.name()
    }

    /// Type-erased view used by containers
    pub fn erased(&self) -> &ErasedProducer {
        &self.erased
    }
}

impl<T> Producer<T>
where
    T: Send + Sync + 'static,
{
    /// Create a producer from logic that returns an owned value
    pub fn owned<F>(produce: F) -> Self
    where
        F: Fn(&dyn Container) -> Result<T> + Send + Sync + 'static,
    {
        Self::new(move |container| produce(container).map(Arc::new))
    }
}

impl<T: ?Sized> Clone for Producer<T> {
    fn clone(&self) -> Self {
        Self {
            erased: self.erased.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: ?Sized> fmt::Debug for Producer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Producer").field(&self.erased).finish()
    }
}
