//! Container port
//!
//! [`Container`] is the object-safe interface every resolver implements and
//! every producer receives. [`ContainerExt`] layers the typed operations on top
//! of it for any container, including `&dyn Container`.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use grab_domain::{Container, ContainerExt, ErasedProducer, ProducedValue, Producer, Result};
//!
//! /// Container that constructs on every request
//! struct Fresh;
//!
//! impl Container for Fresh {
//!     fn resolve(&self, producer: &ErasedProducer) -> Result<ProducedValue> {
//!         producer.produce(self)
//!     }
//! }
//!
//! let greeting = Producer::owned(|_| Ok("hello".to_string()));
//! let value: Arc<String> = Fresh.get(&greeting).unwrap();
//! assert_eq!(value.as_str(), "hello");
//! ```

use std::sync::Arc;

use crate::assign;
use crate::error::Result;
use crate::value_objects::{ErasedProducer, ProducedValue, Producer};

/// Resolves producers into produced values
pub trait Container: Send + Sync {
    /// Resolve `producer` into its value
    fn resolve(&self, producer: &ErasedProducer) -> Result<ProducedValue>;
}

impl<C: Container + ?Sized> Container for &C {
    fn resolve(&self, producer: &ErasedProducer) -> Result<ProducedValue> {
        (**self).resolve(producer)
    }
}

impl<C: Container + ?Sized> Container for Arc<C> {
    fn resolve(&self, producer: &ErasedProducer) -> Result<ProducedValue> {
        (**self).resolve(producer)
    }
}

/// Typed resolution helpers available on every [`Container`]
pub trait ContainerExt: Container {
    /// Resolve `producer` and return the shared value
    fn get<T>(&self, producer: &Producer<T>) -> Result<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let value = self.resolve(producer.erased())?;
        assign::extract(&value)
    }

    /// Resolve `producer` into the destination slot
    ///
    /// `dest` is only written when resolution and assignment both succeed.
    fn get_into<T>(&self, dest: &mut Option<Arc<T>>, producer: &Producer<T>) -> Result<()>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let value = self.resolve(producer.erased())?;
        assign::assign(dest, &value)
    }
}

impl<C: Container + ?Sized> ContainerExt for C {}
