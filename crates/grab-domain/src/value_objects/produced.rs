//! Produced values
//!
//! A [`ProducedValue`] is the type-erased result of a construction. It always
//! wraps an `Arc<T>`, so every consumer that receives it aliases the same
//! allocation.

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

/// Opaque, reference-shaped construction result
#[derive(Clone)]
pub struct ProducedValue {
    inner: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl ProducedValue {
    /// Erase a shared value
    pub fn new<T>(value: Arc<T>) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(value),
            type_name: type_name::<T>(),
        }
    }

    /// Name of the type this value was produced as
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Recover the shared value if it was produced as `T`
    ///
    /// The returned `Arc` points at the stored referent; nothing is copied.
    pub fn downcast<T>(&self) -> Option<Arc<T>>
    where
        T: ?Sized + 'static,
    {
        self.inner.downcast_ref::<Arc<T>>().cloned()
    }

    /// Whether both handles refer to the same stored value
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for ProducedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProducedValue")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}
