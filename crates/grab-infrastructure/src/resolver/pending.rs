//! Pending table
//!
//! Tracks producers under construction, the frames constructing them, and
//! which frames are blocked waiting on another chain's construction. Lives
//! inside the resolver state and is only touched with the state lock held.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Condvar, Mutex, PoisonError};

use grab_domain::value_objects::ProducerId;

use super::chain::{Chain, FrameId};

/// One-shot gate opened when a producer leaves the pending table
#[derive(Debug, Default)]
pub(crate) struct Latch {
    open: Mutex<bool>,
    ready: Condvar,
}

impl Latch {
    fn open(&self) {
        let mut open = self.open.lock().unwrap_or_else(PoisonError::into_inner);
        *open = true;
        self.ready.notify_all();
    }

    /// Block until the latch is opened
    pub(crate) fn wait(&self) {
        let mut open = self.open.lock().unwrap_or_else(PoisonError::into_inner);
        while !*open {
            open = self
                .ready
                .wait(open)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

#[derive(Debug)]
struct InFlight {
    owners: Vec<FrameId>,
    latch: Arc<Latch>,
}

#[derive(Debug, Default)]
pub(crate) struct PendingTable {
    entries: HashMap<ProducerId, InFlight>,
    waits: HashMap<FrameId, Vec<ProducerId>>,
}

impl PendingTable {
    /// Whether `id` is being constructed by a frame on `chain`
    pub(crate) fn is_pending_on(&self, id: ProducerId, chain: &Chain) -> bool {
        self.entries
            .get(&id)
            .is_some_and(|entry| entry.owners.iter().any(|frame| chain.contains(*frame)))
    }

    /// Latch of an in-flight construction of `id`
    pub(crate) fn latch(&self, id: ProducerId) -> Option<Arc<Latch>> {
        self.entries.get(&id).map(|entry| Arc::clone(&entry.latch))
    }

    /// Record that `frame` constructs `id`
    pub(crate) fn mark(&mut self, id: ProducerId, frame: FrameId) {
        self.entries
            .entry(id)
            .or_insert_with(|| InFlight {
                owners: Vec::with_capacity(1),
                latch: Arc::default(),
            })
            .owners
            .push(frame);
    }

    /// Record that `frame` stopped constructing `id`
    ///
    /// Once no frame constructs `id` any more its latch is opened.
    pub(crate) fn unmark(&mut self, id: ProducerId, frame: FrameId) {
        let Some(entry) = self.entries.get_mut(&id) else {
            return;
        };
        entry.owners.retain(|owner| *owner != frame);
        if entry.owners.is_empty() {
            if let Some(entry) = self.entries.remove(&id) {
                entry.latch.open();
            }
        }
    }

    /// Whether a request on `chain` waiting for `id` would never wake
    ///
    /// Follows owners of `id`, then whatever those owners wait on, and so on.
    /// Reaching a frame of `chain` means the wait closes a cycle.
    pub(crate) fn would_deadlock(&self, id: ProducerId, chain: &Chain) -> bool {
        let mut stack = vec![id];
        let mut visited = HashSet::new();

        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            let Some(entry) = self.entries.get(&current) else {
                continue;
            };
            for owner in &entry.owners {
                if chain.contains(*owner) {
                    return true;
                }
                if let Some(blocked_on) = self.waits.get(owner) {
                    stack.extend(blocked_on.iter().copied());
                }
            }
        }
        false
    }

    /// Record that every frame of `chain` is blocked on `id`
    pub(crate) fn add_wait(&mut self, chain: &Chain, id: ProducerId) {
        for frame in chain.frames() {
            self.waits.entry(*frame).or_default().push(id);
        }
    }

    /// Drop one wait record of `id` for every frame of `chain`
    pub(crate) fn remove_wait(&mut self, chain: &Chain, id: ProducerId) {
        for frame in chain.frames() {
            if let Some(blocked_on) = self.waits.get_mut(frame) {
                if let Some(position) = blocked_on.iter().position(|waited| *waited == id) {
                    blocked_on.swap_remove(position);
                }
                if blocked_on.is_empty() {
                    self.waits.remove(frame);
                }
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
