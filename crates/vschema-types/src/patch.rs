//! # Deferred Patches
//!
//! Schemas may refer to schemas that do not exist yet: a forward reference
//! to a type declared later, or a type that refers to itself. A [`Deferred`]
//! slot stands in for the missing value, and a [`Patch`] fills the slot once
//! it can be computed.
//!
//! Patches wait in a FIFO [`PatchQueue`]. The first patch enqueued after a
//! flush marks a flush as scheduled; the registry decides when that
//! scheduled flush runs (see `FlushPolicy`). Anything that needs resolved
//! state, such as a registry lookup, flushes synchronously first.
//!
//! ## Re-entrancy
//!
//! A patch's evaluator may enqueue further patches or look up named types.
//! [`PatchQueue::flush`] pops one patch at a time and releases the queue
//! lock before running it, so patches enqueued mid-flush are drained by the
//! same flush.
//!
//! One drain runs at a time. A flush holds a re-entrant drain lock for the
//! whole loop: the draining thread may flush again from inside a patch, and
//! a flush on any other thread waits until the drain in progress finishes,
//! so it never returns while a patch it depends on is still running.
//! The scheduled flag is cleared in the same critical section that finds
//! the queue empty, and set by `push` under that lock.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, ReentrantMutex, RwLock};

/// A shared slot filled in later by a [`Patch`].
///
/// Clones share the slot, so a schema can hold one clone while a patch
/// holds another.
pub struct Deferred<T> {
    slot: Arc<RwLock<Option<T>>>,
}

impl<T> Deferred<T> {
    /// An empty slot.
    pub fn new() -> Self {
        Self {
            slot: Arc::new(RwLock::new(None)),
        }
    }

    /// A slot that already holds `value`.
    pub fn resolved(value: T) -> Self {
        Self {
            slot: Arc::new(RwLock::new(Some(value))),
        }
    }

    /// Fill the slot, replacing any earlier value.
    pub fn set(&self, value: T) {
        *self.slot.write() = Some(value);
    }

    /// Empty the slot, returning what it held.
    pub fn clear(&self) -> Option<T> {
        self.slot.write().take()
    }

    pub fn is_resolved(&self) -> bool {
        self.slot.read().is_some()
    }
}

impl<T: Clone> Deferred<T> {
    /// The current value, if the slot has been filled.
    pub fn get(&self) -> Option<T> {
        self.slot.read().clone()
    }
}

impl<T> Clone for Deferred<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> Default for Deferred<T> {
    fn default() -> Self {
        Self::new()
    }
}

// The slot may close a cycle back to its owner; never print its contents.
impl<T> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

/// A pending assignment `target[property] = evaluate()`.
pub struct Patch {
    property: String,
    apply: Box<dyn FnOnce() + Send>,
}

impl Patch {
    /// A patch that fills `target` with the result of `evaluate`.
    pub fn new<T, F>(target: &Deferred<T>, property: impl Into<String>, evaluate: F) -> Self
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let slot = target.clone();
        Self {
            property: property.into(),
            apply: Box::new(move || slot.set(evaluate())),
        }
    }

    /// A patch that runs an arbitrary side effect, e.g. registering a type.
    pub fn from_fn(property: impl Into<String>, apply: impl FnOnce() + Send + 'static) -> Self {
        Self {
            property: property.into(),
            apply: Box::new(apply),
        }
    }

    /// Label of the property being patched, for diagnostics.
    pub fn property(&self) -> &str {
        &self.property
    }

    /// Evaluate and assign.
    pub fn resolve(self) {
        (self.apply)()
    }
}

impl fmt::Debug for Patch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Patch")
            .field("property", &self.property)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
struct QueueState {
    patches: VecDeque<Patch>,
    scheduled: bool,
}

/// FIFO queue of pending patches with a single flush-scheduled flag.
#[derive(Default)]
pub struct PatchQueue {
    state: Mutex<QueueState>,
    draining: ReentrantMutex<()>,
}

impl PatchQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a patch. Returns `true` when this call scheduled a flush,
    /// i.e. none was pending.
    pub fn push(&self, patch: Patch) -> bool {
        let mut state = self.state.lock();
        state.patches.push_back(patch);
        !std::mem::replace(&mut state.scheduled, true)
    }

    /// Run every queued patch in FIFO order, including patches enqueued
    /// while flushing. Returns how many ran on this call.
    ///
    /// Blocks while another thread is draining, then drains whatever is
    /// left.
    pub fn flush(&self) -> usize {
        let _drain = self.draining.lock();
        let mut resolved = 0;
        loop {
            let next = {
                let mut state = self.state.lock();
                let next = state.patches.pop_front();
                if next.is_none() {
                    state.scheduled = false;
                }
                next
            };
            let Some(patch) = next else { break };
            tracing::trace!(property = %patch.property(), "resolving patch");
            patch.resolve();
            resolved += 1;
        }
        resolved
    }

    /// Whether a flush is pending.
    pub fn is_scheduled(&self) -> bool {
        self.state.lock().scheduled
    }

    pub fn len(&self) -> usize {
        self.state.lock().patches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().patches.is_empty()
    }
}

impl fmt::Debug for PatchQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("PatchQueue")
            .field("pending", &state.patches.len())
            .field("scheduled", &state.scheduled)
            .finish()
    }
}
