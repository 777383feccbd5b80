//! Resolver
//!
//! Turns producers into memoized singleton values.
//!
//! ```text
//! get(producer)
//!   │
//!   ├─ cache hit ──────────────────────────────► stored value
//!   ├─ pending on this chain ──────────────────► CircularDependency
//!   ├─ in flight on another chain (single_flight)
//!   │     ├─ wait would close a cycle ─────────► CircularDependency
//!   │     └─ wait, then start over
//!   └─ mark pending → produce(scope) → store + unmark ► stored value
//! ```
//!
//! The state lock is never held while a producer runs, so producers may
//! resolve their own dependencies through the scope they are given, from any
//! thread.

mod chain;
mod pending;
mod system;

pub(crate) use chain::{Chain, ChainResolve};
pub use system::Resolver;
