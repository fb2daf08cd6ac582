#![forbid(unsafe_code)]

//! Core: element handles, document-level events, and the host traits.
//!
//! # Role in ftrap
//! `ftrap-core` is the boundary between the focus-trap engine and whatever
//! UI runtime hosts it. The engine never touches a real DOM; it talks to a
//! [`dom::Document`] and asks a [`dom::TabbableScanner`] which elements can
//! take keyboard focus.
//!
//! # Primary responsibilities
//! - **ElementId**: opaque, copyable element identity.
//! - **DomEvent**: focus, keydown, click, mousedown and touchstart events with
//!   the mutable dispatch flags (`preventDefault`, propagation stops).
//! - **Document / TabbableScanner / EventListener**: the traits a host
//!   implements so the engine can subscribe, query and move focus.
//!
//! # How it fits in the system
//! `ftrap` consumes these traits and implements the trap state machine.
//! `ftrap-dom` provides a deterministic in-memory implementation used by
//! tests and headless embedders.

pub mod dom;
pub mod event;

pub use dom::{Document, ElementId, EventListener, ListenerHandle, TabbableScanner};
pub use event::{DomEvent, EventKind, EventKinds, KeyCode, KeyEvent, Modifiers};
