//! Assignment of produced values into destinations
//!
//! Destinations are reference slots (`Option<Arc<T>>`). Installing a value
//! clones the `Arc`, so every destination aliases the one stored instance and
//! the referent is never copied.
//!
//! Destination shapes are checked by the compiler. A value slot cannot receive
//! a resolved dependency:
//!
//! ```compile_fail
//! use std::sync::Arc;
//! use grab_domain::{Container, ContainerExt, Producer};
//!
//! fn load(container: &dyn Container, producer: &Producer<String>) {
//!     let mut dest = String::new();
//!     container.get_into(&mut dest, producer).unwrap();
//! }
//! ```
//!
//! Nor can a slot of a different type:
//!
//! ```compile_fail
//! use std::sync::Arc;
//! use grab_domain::{Container, ContainerExt, Producer};
//!
//! fn load(container: &dyn Container, producer: &Producer<String>) {
//!     let mut dest: Option<Arc<u32>> = None;
//!     container.get_into(&mut dest, producer).unwrap();
//! }
//! ```
//!
//! What remains a runtime check is the produced value itself: an erased
//! container may hand back a value of another type, which is reported as
//! [`Error::TypeMismatch`] without touching the destination.

use std::any::type_name;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::value_objects::ProducedValue;

/// Recover the shared `Arc<T>` from a produced value
pub fn extract<T>(value: &ProducedValue) -> Result<Arc<T>>
where
    T: ?Sized + 'static,
{
    value
        .downcast::<T>()
        .ok_or_else(|| Error::type_mismatch(type_name::<T>(), value.type_name()))
}

/// Install `value` into `dest` by reference
///
/// On failure `dest` keeps its previous contents.
pub fn assign<T>(dest: &mut Option<Arc<T>>, value: &ProducedValue) -> Result<()>
where
    T: ?Sized + 'static,
{
    let shared = extract::<T>(value)?;
    *dest = Some(shared);
    Ok(())
}
