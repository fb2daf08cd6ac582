#![forbid(unsafe_code)]

//! The single "currently listening trap" slot.
//!
//! At most one trap intercepts document events at a time. A trap acquires
//! the slot when it starts listening, which pauses whichever trap held it
//! before, and releases it when it stops. Releasing is identity-guarded: a
//! trap that no longer holds the slot cannot clear it for the trap that
//! does.
//!
//! Each thread has a default registry ([`TrapRegistry::global`]). Tests can
//! hand a fresh registry to each trap instead, or [`reset`](TrapRegistry::reset)
//! the global one.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

/// Global counter for trap identities.
static TRAP_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identity of a focus trap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TrapId(u64);

impl TrapId {
    pub(crate) fn next() -> Self {
        Self(TRAP_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TrapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "trap-{}", self.0)
    }
}

/// Something that can be told to stop listening.
pub(crate) trait Holder {
    /// Called when another trap takes over the slot.
    fn yield_slot(&self);
}

struct Slot {
    id: TrapId,
    holder: Weak<dyn Holder>,
}

/// Single-slot coordinator for listening traps.
///
/// Cloning shares the slot.
#[derive(Clone, Default)]
pub struct TrapRegistry {
    slot: Rc<RefCell<Option<Slot>>>,
}

thread_local! {
    static GLOBAL: TrapRegistry = TrapRegistry::new();
}

impl TrapRegistry {
    /// A fresh, empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry traps use unless given another one.
    #[must_use]
    pub fn global() -> Self {
        GLOBAL.with(Self::clone)
    }

    /// Make `id` the listening trap, pausing the previous holder first.
    pub(crate) fn acquire(&self, id: TrapId, holder: Weak<dyn Holder>) {
        let previous = self
            .slot
            .borrow()
            .as_ref()
            .filter(|slot| slot.id != id)
            .map(|slot| (slot.id, slot.holder.clone()));

        if let Some((previous_id, previous)) = previous {
            tracing::debug!(
                message = "focus_trap.registry.handoff",
                from = previous_id.raw(),
                to = id.raw()
            );
            // The previous holder releases the slot while pausing.
            if let Some(previous) = previous.upgrade() {
                previous.yield_slot();
            }
        }

        *self.slot.borrow_mut() = Some(Slot { id, holder });
    }

    /// Clear the slot if `id` holds it. Returns whether it did.
    pub(crate) fn release(&self, id: TrapId) -> bool {
        let mut slot = self.slot.borrow_mut();
        if slot.as_ref().is_some_and(|s| s.id == id) {
            *slot = None;
            true
        } else {
            false
        }
    }

    /// The trap currently listening, if any.
    #[must_use]
    pub fn holder(&self) -> Option<TrapId> {
        self.slot.borrow().as_ref().map(|slot| slot.id)
    }

    #[must_use]
    pub fn is_holder(&self, id: TrapId) -> bool {
        self.holder() == Some(id)
    }

    /// Forget the holder without pausing it.
    pub fn reset(&self) {
        self.slot.borrow_mut().take();
    }
}

impl fmt::Debug for TrapRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrapRegistry")
            .field("holder", &self.holder())
            .finish()
    }
}
