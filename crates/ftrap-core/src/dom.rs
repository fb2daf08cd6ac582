#![forbid(unsafe_code)]

//! Document boundary consumed by the focus-trap engine.
//!
//! A host (browser bindings, a retained-mode UI, the in-memory document in
//! `ftrap-dom`) implements [`Document`] and [`TabbableScanner`]. The engine
//! only ever holds [`ElementId`] handles and asks the host about them.
//!
//! # Invariants
//!
//! - Every listener registered through [`Document::add_event_listener`] is a
//!   document-level capture listener: it sees an event before any
//!   target-level handler, and listeners run in registration order.
//! - All methods take `&self`. Hosts are single-threaded and use interior
//!   mutability, and they must not hold internal borrows while invoking
//!   listeners or deferred tasks (listeners call back into the document).
//! - Unknown element ids are answered conservatively: `false`, `None`, or a
//!   no-op. They are never a panic.

use std::fmt;
use std::rc::Rc;

use crate::event::{DomEvent, EventKind};

/// Opaque identity of an element in the host document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(u64);

impl ElementId {
    /// Wrap a host-assigned raw id.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw id value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle returned when a listener is registered, used to remove it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle(u64);

impl ListenerHandle {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// A document-level capture listener.
pub trait EventListener {
    /// Observe (and possibly cancel or stop) an event before it reaches its
    /// target.
    fn handle_event(&self, event: &mut DomEvent);
}

impl<F> EventListener for F
where
    F: Fn(&mut DomEvent),
{
    fn handle_event(&self, event: &mut DomEvent) {
        self(event);
    }
}

/// The UI runtime as seen by a focus trap.
pub trait Document {
    /// The element currently holding keyboard focus, if any.
    fn active_element(&self) -> Option<ElementId>;

    /// Whether `node` is `container` or one of its descendants.
    fn contains(&self, container: ElementId, node: ElementId) -> bool;

    /// First element in document order matching `selector`.
    fn query_selector(&self, selector: &str) -> Option<ElementId>;

    /// Whether the element exposes a focus capability at all.
    fn can_focus(&self, element: ElementId) -> bool;

    /// Move focus to `element`, firing a `Focus` event.
    fn focus(&self, element: ElementId);

    /// Drop focus from `element` if it holds it. No-op otherwise.
    fn blur(&self, element: ElementId);

    /// Whether the element is a text-entry input.
    fn is_text_input(&self, element: ElementId) -> bool;

    /// Select all text of a text-entry input.
    fn select_text(&self, element: ElementId);

    /// The explicit `tabindex` attribute, when present.
    fn tab_index(&self, element: ElementId) -> Option<i32>;

    /// Whether the element is a radio button.
    fn is_radio(&self, element: ElementId) -> bool;

    /// The group a radio button belongs to (its `name`). `None` for
    /// non-radios and unnamed radios, which form a group of their own.
    fn radio_group(&self, element: ElementId) -> Option<String>;

    /// Whether the element is a checked radio button or checkbox.
    fn is_checked(&self, element: ElementId) -> bool;

    /// Subscribe a document-level capture listener for `kind`.
    fn add_event_listener(&self, kind: EventKind, listener: Rc<dyn EventListener>)
    -> ListenerHandle;

    /// Unsubscribe a listener. Unknown handles are ignored.
    fn remove_event_listener(&self, handle: ListenerHandle);

    /// Run `task` on the next scheduling turn, after the current event has
    /// finished dispatching.
    fn defer(&self, task: Box<dyn FnOnce()>);
}

/// The focusable-element scanner.
///
/// Contract: returns the descendants of `root` that take focus via Tab, in
/// native Tab order, excluding invisible and disabled elements and
/// respecting explicit tab-order hints.
pub trait TabbableScanner {
    fn tabbables(&self, root: ElementId) -> Vec<ElementId>;
}

impl<F> TabbableScanner for F
where
    F: Fn(ElementId) -> Vec<ElementId>,
{
    fn tabbables(&self, root: ElementId) -> Vec<ElementId> {
        self(root)
    }
}
