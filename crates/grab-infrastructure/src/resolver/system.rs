//! Memoizing resolver

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use grab_domain::error::{Error, Result};
use grab_domain::ports::Container;
use grab_domain::value_objects::{ErasedProducer, ProducedValue, ProducerId};
use tracing::{debug, trace, warn};

use super::chain::{
    Chain, ChainResolve, ChainScope, FrameId, FrameIds, ResolverId, ambient, enter,
};
use super::pending::{Latch, PendingTable};
use crate::config::{AppConfig, FirstUsePolicy, ResolverConfig};

#[derive(Debug, Default)]
struct ResolverState {
    cache: HashMap<ProducerId, ProducedValue>,
    pending: PendingTable,
}

enum Step {
    Resolved(ProducedValue),
    Wait(Arc<Latch>),
    Construct(FrameId),
}

/// Thread-safe, memoizing producer resolver
///
/// Each producer is constructed lazily on first request and the result is
/// shared by every later request for the resolver's lifetime. A producer that
/// requests itself, directly or through its dependencies, fails with
/// [`Error::CircularDependency`]. This holds whether the producer goes through
/// the container it is handed or through a resolver it captured. Failed
/// constructions are not memoized.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use grab_domain::{ContainerExt, Producer};
/// use grab_infrastructure::Resolver;
///
/// let counter = Producer::owned(|_| Ok(42_u32));
/// let resolver = Resolver::new();
///
/// let first = resolver.get(&counter).unwrap();
/// let second = resolver.get(&counter).unwrap();
/// assert!(Arc::ptr_eq(&first, &second));
/// ```
pub struct Resolver {
    id: ResolverId,
    state: RwLock<ResolverState>,
    frames: FrameIds,
    config: ResolverConfig,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver {
    /// Create an empty resolver with the default policy
    pub fn new() -> Self {
        Self::with_config(ResolverConfig::default())
    }

    /// Create an empty resolver with the given configuration
    pub fn with_config(config: ResolverConfig) -> Self {
        Self {
            id: ResolverId::next(),
            state: RwLock::new(ResolverState::default()),
            frames: FrameIds::default(),
            config,
        }
    }

    /// Create an empty resolver from the application configuration
    pub fn from_config(config: &AppConfig) -> Self {
        Self::with_config(config.resolver.clone())
    }

    /// Active configuration
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Chain a direct request made on this thread belongs to
    pub(crate) fn ambient_chain(&self) -> Chain {
        ambient(self.id)
    }

    /// Resolve `producer` on behalf of `chain`
    ///
    /// `outer` is the container nested requests are routed through, so a
    /// decorator wrapping this resolver keeps intercepting them.
    pub(crate) fn resolve_with(
        &self,
        outer: &dyn ChainResolve,
        producer: &ErasedProducer,
        chain: &Chain,
    ) -> Result<ProducedValue> {
        let id = producer.id();
        loop {
            {
                let state = self.read_state()?;
                if let Some(value) = state.cache.get(&id) {
                    trace!(producer = %producer.label(), "Cache hit");
                    return Ok(value.clone());
                }
                if state.pending.is_pending_on(id, chain) {
                    return Err(circular(producer));
                }
            }

            match self.claim(producer, chain)? {
                Step::Resolved(value) => return Ok(value),
                Step::Wait(latch) => self.wait_for(producer, chain, &latch)?,
                Step::Construct(frame) => return self.construct(outer, producer, chain, frame),
            }
        }
    }

    /// Decide, under the write lock, how this request proceeds
    fn claim(&self, producer: &ErasedProducer, chain: &Chain) -> Result<Step> {
        let id = producer.id();
        let mut state = self.write_state()?;

        if let Some(value) = state.cache.get(&id) {
            return Ok(Step::Resolved(value.clone()));
        }
        if state.pending.is_pending_on(id, chain) {
            return Err(circular(producer));
        }
        if self.config.first_use == FirstUsePolicy::SingleFlight {
            if let Some(latch) = state.pending.latch(id) {
                if state.pending.would_deadlock(id, chain) {
                    warn!(producer = %producer.label(), "Waiting would close a cycle across chains");
                    return Err(circular(producer));
                }
                state.pending.add_wait(chain, id);
                return Ok(Step::Wait(latch));
            }
        }

        let frame = self.frames.next();
        state.pending.mark(id, frame);
        Ok(Step::Construct(frame))
    }

    fn wait_for(&self, producer: &ErasedProducer, chain: &Chain, latch: &Latch) -> Result<()> {
        debug!(producer = %producer.label(), "Waiting for in-flight construction");
        latch.wait();
        self.write_state()?
            .pending
            .remove_wait(chain, producer.id());
        Ok(())
    }

    fn construct(
        &self,
        outer: &dyn ChainResolve,
        producer: &ErasedProducer,
        chain: &Chain,
        frame: FrameId,
    ) -> Result<ProducedValue> {
        let id = producer.id();
        let guard = PendingGuard {
            state: &self.state,
            id,
            frame,
            armed: true,
        };

        debug!(producer = %producer.label(), depth = chain.depth(), "Constructing");
        let nested = chain.child(frame);
        let active = enter(self.id, nested.clone());
        let scope = ChainScope::new(outer, nested);
        let produced = producer.produce(&scope);
        drop(active);

        // unmark and store in one critical section
        let mut state = self.write_state()?;
        state.pending.unmark(id, frame);
        guard.disarm();

        match produced {
            Err(err) => {
                debug!(producer = %producer.label(), error = %err, "Construction failed");
                Err(err)
            }
            Ok(value) => match state.cache.entry(id) {
                Entry::Occupied(stored) => {
                    debug!(producer = %producer.label(), "Concurrent construction already stored, discarding result");
                    Ok(stored.get().clone())
                }
                Entry::Vacant(slot) => {
                    debug!(producer = %producer.label(), "Stored");
                    Ok(slot.insert(value).clone())
                }
            },
        }
    }

    fn read_state(&self) -> Result<RwLockReadGuard<'_, ResolverState>> {
        self.state
            .read()
            .map_err(|_| Error::infrastructure("Resolver state lock poisoned"))
    }

    fn write_state(&self) -> Result<RwLockWriteGuard<'_, ResolverState>> {
        self.state
            .write()
            .map_err(|_| Error::infrastructure("Resolver state lock poisoned"))
    }
}

fn circular(producer: &ErasedProducer) -> Error {
    debug!(producer = %producer.label(), "Circular dependency");
    Error::circular_dependency(producer.label())
}

impl ChainResolve for Resolver {
    fn resolve_in_chain(&self, producer: &ErasedProducer, chain: &Chain) -> Result<ProducedValue> {
        self.resolve_with(self, producer, chain)
    }
}

impl Container for Resolver {
    fn resolve(&self, producer: &ErasedProducer) -> Result<ProducedValue> {
        self.resolve_with(self, producer, &self.ambient_chain())
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Resolver");
        debug.field("config", &self.config);
        if let Ok(state) = self.state.read() {
            debug
                .field("resolved", &state.cache.len())
                .field("pending", &state.pending.len());
        }
        debug.finish()
    }
}

/// Clears a pending mark if construction unwinds
struct PendingGuard<'a> {
    state: &'a RwLock<ResolverState>,
    id: ProducerId,
    frame: FrameId,
    armed: bool,
}

impl PendingGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            state.pending.unmark(self.id, self.frame);
        }
    }
}
