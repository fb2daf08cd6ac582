#![forbid(unsafe_code)]

//! Ordered set of the elements a trap cycles through.
//!
//! The set is the scanner's answer for the container followed by the
//! configured extra nodes. It is rebuilt before every Tab decision and on
//! every activation, since the container can change between events.

use ftrap_core::{ElementId, TabbableScanner};

/// Tabbable elements of one trap, in Tab order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabbableSet {
    nodes: Vec<ElementId>,
    had_empty_native: bool,
}

impl TabbableSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rescan `container` and append `extra`.
    pub fn refresh(
        &mut self,
        scanner: &dyn TabbableScanner,
        container: ElementId,
        extra: &[ElementId],
    ) {
        let mut nodes = scanner.tabbables(container);
        self.had_empty_native = nodes.is_empty();
        for node in extra {
            if !nodes.contains(node) {
                nodes.push(*node);
            }
        }
        self.nodes = nodes;
    }

    /// Whether `node` is one of the trap's stops.
    #[inline]
    #[must_use]
    pub fn contains(&self, node: ElementId) -> bool {
        self.nodes.contains(&node)
    }

    #[must_use]
    pub fn first(&self) -> Option<ElementId> {
        self.nodes.first().copied()
    }

    #[must_use]
    pub fn last(&self) -> Option<ElementId> {
        self.nodes.last().copied()
    }

    #[must_use]
    pub fn position(&self, node: ElementId) -> Option<usize> {
        self.nodes.iter().position(|n| *n == node)
    }

    /// True when the last scan found no native tabbable element, whatever
    /// the extra nodes contributed.
    #[must_use]
    pub fn had_empty_native(&self) -> bool {
        self.had_empty_native
    }

    #[must_use]
    pub fn as_slice(&self) -> &[ElementId] {
        &self.nodes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
