#![forbid(unsafe_code)]

//! Tab-order navigation inside a trap.
//!
//! Given the trap's tabbable sequence, the element that currently has focus
//! and a direction, [`next_tab_stop`] picks the element Tab should land on.
//!
//! # Rules
//!
//! 1. Focus on the boundary in the travel direction, or focus outside the
//!    sequence, wraps to the opposite boundary.
//! 2. Otherwise the index moves by one.
//! 3. Landing on a radio button surfaces the checked member of its group: the
//!    run of adjacent same-group radios starting at the landing index is
//!    searched in the travel direction, falling back to the landing radio
//!    when none is checked.
//! 4. Leaving an unchecked radio is a plain one-step move. Leaving a checked
//!    radio skips the rest of its group.
//!
//! A radio group is a contiguous run of radio buttons sharing a
//! [`radio_group`](Document::radio_group). Unnamed radios are groups of one.

use ftrap_core::{Document, ElementId, KeyEvent};

/// Travel direction of a Tab press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// Shift+Tab and BackTab travel backward.
    #[must_use]
    pub const fn of_key(key: &KeyEvent) -> Self {
        if key.is_backward() {
            Self::Backward
        } else {
            Self::Forward
        }
    }

    #[must_use]
    pub const fn is_backward(self) -> bool {
        matches!(self, Self::Backward)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Backward => "backward",
        }
    }

    /// Index one step from `index`, or `None` past either end.
    fn step(self, index: usize, len: usize) -> Option<usize> {
        match self {
            Self::Forward => (index + 1 < len).then_some(index + 1),
            Self::Backward => index.checked_sub(1),
        }
    }

    /// The boundary index this direction wraps to.
    fn entry(self, len: usize) -> usize {
        match self {
            Self::Forward => 0,
            Self::Backward => len - 1,
        }
    }
}

/// The element Tab should move focus to, or `None` for an empty sequence.
#[must_use]
pub fn next_tab_stop(
    doc: &dyn Document,
    nodes: &[ElementId],
    current: Option<ElementId>,
    direction: Direction,
) -> Option<ElementId> {
    if nodes.is_empty() {
        return None;
    }
    let len = nodes.len();
    let wrapped = || land(doc, nodes, direction.entry(len), direction);

    let Some(index) = current.and_then(|c| nodes.iter().position(|n| *n == c)) else {
        return Some(wrapped());
    };
    let Some(next) = direction.step(index, len) else {
        return Some(wrapped());
    };

    let here = nodes[index];
    if doc.is_radio(here) {
        if !doc.is_checked(here) {
            return Some(nodes[next]);
        }
        let group = doc.radio_group(here);
        let mut cursor = Some(next);
        while let Some(i) = cursor {
            if !in_group(doc, group.as_deref(), nodes[i]) {
                return Some(land(doc, nodes, i, direction));
            }
            cursor = direction.step(i, len);
        }
        return Some(wrapped());
    }

    Some(land(doc, nodes, next, direction))
}

/// Whether `node` is a radio in `group`. Unnamed radios match nothing.
fn in_group(doc: &dyn Document, group: Option<&str>, node: ElementId) -> bool {
    group.is_some() && doc.radio_group(node).as_deref() == group
}

/// Adjust a landing index onto the checked member of its radio group.
fn land(doc: &dyn Document, nodes: &[ElementId], index: usize, direction: Direction) -> ElementId {
    let landing = nodes[index];
    if !doc.is_radio(landing) || doc.is_checked(landing) {
        return landing;
    }
    let group = doc.radio_group(landing);
    let mut cursor = direction.step(index, nodes.len());
    while let Some(i) = cursor {
        let node = nodes[i];
        if !in_group(doc, group.as_deref(), node) {
            break;
        }
        if doc.is_checked(node) {
            return node;
        }
        cursor = direction.step(i, nodes.len());
    }
    landing
}
