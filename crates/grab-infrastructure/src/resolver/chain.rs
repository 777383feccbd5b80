//! Resolution chains
//!
//! Every top-level request starts an empty [`Chain`]. Each construction the
//! chain runs gets a fresh [`FrameId`], and the producer under construction is
//! handed a [`ChainScope`]: a container view that routes nested requests back
//! through the outermost resolver while remembering which frames are on the
//! chain. A frame is identified by the chain it was reached from, not by the
//! thread executing it.
//!
//! A producer may also bypass its scope and call a resolver it captured. Each
//! thread therefore records the chains it is constructing on, per resolver,
//! and requests made directly on that resolver continue the innermost one.

use std::cell::RefCell;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

use grab_domain::error::Result;
use grab_domain::ports::Container;
use grab_domain::value_objects::{ErasedProducer, ProducedValue};

/// Identity of one construction in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct FrameId(u64);

/// Allocator for frame ids
#[derive(Debug, Default)]
pub(crate) struct FrameIds(AtomicU64);

impl FrameIds {
    pub(crate) fn next(&self) -> FrameId {
        FrameId(self.0.fetch_add(1, Ordering::Relaxed))
    }
}

static NEXT_RESOLVER_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one resolver instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ResolverId(u64);

impl ResolverId {
    pub(crate) fn next() -> Self {
        Self(NEXT_RESOLVER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

thread_local! {
    static ACTIVE: RefCell<Vec<(ResolverId, Chain)>> = const { RefCell::new(Vec::new()) };
}

/// Chain a direct request on `resolver` belongs to on this thread
///
/// Root unless this thread is inside one of the resolver's constructions.
pub(crate) fn ambient(resolver: ResolverId) -> Chain {
    ACTIVE.with(|active| {
        active
            .borrow()
            .iter()
            .rev()
            .find(|(owner, _)| *owner == resolver)
            .map_or_else(Chain::root, |(_, chain)| chain.clone())
    })
}

/// Record that this thread constructs on `chain` until the guard drops
pub(crate) fn enter(resolver: ResolverId, chain: Chain) -> ActiveChain {
    ACTIVE.with(|active| active.borrow_mut().push((resolver, chain)));
    ActiveChain {
        _thread_bound: PhantomData,
    }
}

/// Pops this thread's innermost active chain on drop
pub(crate) struct ActiveChain {
    _thread_bound: PhantomData<*const ()>,
}

impl Drop for ActiveChain {
    fn drop(&mut self) {
        let _ = ACTIVE.try_with(|active| active.borrow_mut().pop());
    }
}

/// Construction frames a request was issued from, outermost first
#[derive(Debug, Clone, Default)]
pub(crate) struct Chain {
    frames: Vec<FrameId>,
}

impl Chain {
    /// Chain of a request made directly by a caller
    pub(crate) fn root() -> Self {
        Self::default()
    }

    pub(crate) fn contains(&self, frame: FrameId) -> bool {
        self.frames.contains(&frame)
    }

    pub(crate) fn frames(&self) -> &[FrameId] {
        &self.frames
    }

    pub(crate) fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Chain seen by the producer constructed in `frame`
    pub(crate) fn child(&self, frame: FrameId) -> Self {
        let mut frames = Vec::with_capacity(self.frames.len() + 1);
        frames.extend_from_slice(&self.frames);
        frames.push(frame);
        Self { frames }
    }
}

/// Resolution that knows which chain a request belongs to
pub(crate) trait ChainResolve: Send + Sync {
    fn resolve_in_chain(&self, producer: &ErasedProducer, chain: &Chain) -> Result<ProducedValue>;
}

/// Container handed to a producer while it is being constructed
pub(crate) struct ChainScope<'a> {
    outer: &'a dyn ChainResolve,
    chain: Chain,
}

impl<'a> ChainScope<'a> {
    pub(crate) fn new(outer: &'a dyn ChainResolve, chain: Chain) -> Self {
        Self { outer, chain }
    }
}

impl Container for ChainScope<'_> {
    fn resolve(&self, producer: &ErasedProducer) -> Result<ProducedValue> {
        self.outer.resolve_in_chain(producer, &self.chain)
    }
}
