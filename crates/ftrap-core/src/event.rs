#![forbid(unsafe_code)]

//! Canonical document-level event types.
//!
//! These are the only events a focus trap intercepts. Every event is
//! delivered to document-level capture listeners before it reaches its
//! target, and listeners may mutate the dispatch flags.
//!
//! # Design Notes
//!
//! - Shift+Tab may arrive either as `Tab` with [`Modifiers::SHIFT`] or as
//!   [`KeyCode::BackTab`]; both count as backward traversal.
//! - `Escape` covers every host spelling of the escape key (`"Escape"`,
//!   `"Esc"`, key code 27). Hosts normalize before constructing the event.
//! - `default_prevented` and the propagation flags are sticky: once set they
//!   stay set for the rest of the dispatch.

use bitflags::bitflags;

use crate::dom::ElementId;

/// Kind of document-level event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// An element received focus.
    Focus,
    /// A key was pressed.
    KeyDown,
    /// A click completed on an element.
    Click,
    /// A mouse button went down on an element.
    MouseDown,
    /// A touch started on an element.
    TouchStart,
}

impl EventKind {
    /// All event kinds, in dispatch-independent declaration order.
    pub const ALL: [Self; 5] = [
        Self::Focus,
        Self::KeyDown,
        Self::Click,
        Self::MouseDown,
        Self::TouchStart,
    ];

    /// Host-facing event name (`"focus"`, `"keydown"`, ...).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Focus => "focus",
            Self::KeyDown => "keydown",
            Self::Click => "click",
            Self::MouseDown => "mousedown",
            Self::TouchStart => "touchstart",
        }
    }

    /// Whether this is a pointer event (click, mousedown, touchstart).
    #[must_use]
    pub const fn is_pointer(self) -> bool {
        matches!(self, Self::Click | Self::MouseDown | Self::TouchStart)
    }

    /// The single-bit set for this kind.
    #[must_use]
    pub const fn as_set(self) -> EventKinds {
        match self {
            Self::Focus => EventKinds::FOCUS,
            Self::KeyDown => EventKinds::KEY_DOWN,
            Self::Click => EventKinds::CLICK,
            Self::MouseDown => EventKinds::MOUSE_DOWN,
            Self::TouchStart => EventKinds::TOUCH_START,
        }
    }
}

bitflags! {
    /// A set of event kinds, used to describe which listeners a trap installs.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EventKinds: u8 {
        const FOCUS       = 0b0_0001;
        const KEY_DOWN    = 0b0_0010;
        const CLICK       = 0b0_0100;
        const MOUSE_DOWN  = 0b0_1000;
        const TOUCH_START = 0b1_0000;
        /// Keyboard and focus containment.
        const KEYBOARD = Self::FOCUS.bits() | Self::KEY_DOWN.bits();
        /// Pointer interception.
        const POINTER = Self::CLICK.bits() | Self::MOUSE_DOWN.bits() | Self::TOUCH_START.bits();
    }
}

impl EventKinds {
    /// Iterate the individual kinds contained in this set.
    pub fn kinds(self) -> impl Iterator<Item = EventKind> {
        EventKind::ALL
            .into_iter()
            .filter(move |kind| self.contains(kind.as_set()))
    }
}

bitflags! {
    /// Modifier keys that can be held during a key event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Alt/Option key.
        const ALT   = 0b0010;
        /// Control key.
        const CTRL  = 0b0100;
        /// Super/Meta/Command key.
        const SUPER = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

/// Key codes for keyboard events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A regular character key.
    Char(char),
    /// Enter/Return key.
    Enter,
    /// Escape key.
    Escape,
    /// Tab key.
    Tab,
    /// Shift+Tab (back-tab).
    BackTab,
    /// Space bar.
    Space,
    /// Up arrow key.
    Up,
    /// Down arrow key.
    Down,
    /// Left arrow key.
    Left,
    /// Right arrow key.
    Right,
}

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key code that was pressed.
    pub code: KeyCode,
    /// Modifier keys held during the event.
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// Create a new key event with no modifiers.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
        }
    }

    /// Tab.
    #[must_use]
    pub const fn tab() -> Self {
        Self::new(KeyCode::Tab)
    }

    /// Shift+Tab.
    #[must_use]
    pub const fn shift_tab() -> Self {
        Self::new(KeyCode::Tab).with_modifiers(Modifiers::SHIFT)
    }

    /// Escape.
    #[must_use]
    pub const fn escape() -> Self {
        Self::new(KeyCode::Escape)
    }

    /// Create a key event with modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Check if Shift modifier is held.
    #[must_use]
    pub const fn shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }

    /// Tab or back-tab, with any modifiers.
    #[must_use]
    pub const fn is_tab(&self) -> bool {
        matches!(self.code, KeyCode::Tab | KeyCode::BackTab)
    }

    /// A tab that traverses backward.
    #[must_use]
    pub const fn is_backward(&self) -> bool {
        match self.code {
            KeyCode::BackTab => true,
            KeyCode::Tab => self.shift(),
            _ => false,
        }
    }

    /// Escape, with any modifiers.
    #[must_use]
    pub const fn is_escape(&self) -> bool {
        matches!(self.code, KeyCode::Escape)
    }
}

/// An event travelling through document-level capture listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomEvent {
    kind: EventKind,
    target: ElementId,
    key: Option<KeyEvent>,
    default_prevented: bool,
    propagation_stopped: bool,
    immediate_propagation_stopped: bool,
}

impl DomEvent {
    fn new(kind: EventKind, target: ElementId, key: Option<KeyEvent>) -> Self {
        Self {
            kind,
            target,
            key,
            default_prevented: false,
            propagation_stopped: false,
            immediate_propagation_stopped: false,
        }
    }

    /// `target` received focus.
    #[must_use]
    pub fn focus(target: ElementId) -> Self {
        Self::new(EventKind::Focus, target, None)
    }

    /// A key went down while `target` held focus.
    #[must_use]
    pub fn key_down(target: ElementId, key: KeyEvent) -> Self {
        Self::new(EventKind::KeyDown, target, Some(key))
    }

    /// A click on `target`.
    #[must_use]
    pub fn click(target: ElementId) -> Self {
        Self::new(EventKind::Click, target, None)
    }

    /// A mouse button went down on `target`.
    #[must_use]
    pub fn mouse_down(target: ElementId) -> Self {
        Self::new(EventKind::MouseDown, target, None)
    }

    /// A touch started on `target`.
    #[must_use]
    pub fn touch_start(target: ElementId) -> Self {
        Self::new(EventKind::TouchStart, target, None)
    }

    #[inline]
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        self.kind
    }

    #[inline]
    #[must_use]
    pub const fn target(&self) -> ElementId {
        self.target
    }

    /// The key, for `KeyDown` events.
    #[inline]
    #[must_use]
    pub const fn key(&self) -> Option<KeyEvent> {
        self.key
    }

    /// Cancel the host's default action for this event.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Stop the event from reaching further nodes in the propagation path.
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Stop propagation and skip any listeners not yet invoked on the
    /// current node.
    pub fn stop_immediate_propagation(&mut self) {
        self.propagation_stopped = true;
        self.immediate_propagation_stopped = true;
    }

    #[must_use]
    pub const fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    #[must_use]
    pub const fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    #[must_use]
    pub const fn immediate_propagation_stopped(&self) -> bool {
        self.immediate_propagation_stopped
    }
}
