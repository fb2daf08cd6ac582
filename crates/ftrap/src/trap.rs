#![forbid(unsafe_code)]

//! The focus trap: lifecycle plus document-level event interception.
//!
//! A [`FocusTrap`] confines keyboard focus to a container element. While it
//! is listening it captures focus, keydown and (unless clicks are ignored)
//! click, mousedown and touchstart events at the document level.
//!
//! # State machine
//!
//! ```text
//!              activate                  pause
//!  Inactive ─────────────▶ Listening ─────────────▶ Paused
//!     ▲                     │    ▲                    │
//!     │      deactivate     │    └──── unpause ───────┤
//!     └─────────────────────┴─────────────────────────┘
//! ```
//!
//! # Invariants
//!
//! 1. **Singleton**: at most one trap per [`TrapRegistry`] is listening.
//!    Starting to listen pauses the previous listener.
//! 2. **Containment**: while listening, Tab and Shift+Tab only ever move
//!    focus between the trap's tabbable nodes, and focus landing outside
//!    them is blocked.
//! 3. **Fail fast**: a configuration error from `activate` or `unpause`
//!    leaves the trap exactly as it was, with no listener installed.
//! 4. **Idempotence**: redundant `activate`, `deactivate`, `pause` and
//!    `unpause` calls are no-ops.
//!
//! # Reentrancy
//!
//! Callbacks, providers and focus changes may call back into the trap (an
//! `on_activate` that deactivates, a focus listener that pauses). No
//! internal borrow is held across any of them, and the trap re-checks its
//! state after each: listeners are installed only while the same activation
//! is still active and unpaused, and at most one set is ever installed.
//!
//! # Failure Modes
//!
//! - Focus return runs on the next scheduling turn. It is skipped when the
//!   trap was activated again before it ran, and a focus-return target that
//!   fails to resolve at that point is logged and dropped.
//! - A trap dropped while listening removes its listeners and releases the
//!   registry slot.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use ftrap_core::{
    Document, DomEvent, ElementId, EventKind, EventListener, KeyEvent, ListenerHandle,
    TabbableScanner,
};

use crate::config::{ActivateOptions, DeactivateOptions, TrapConfig};
use crate::error::{Result, TrapError};
use crate::navigation::{Direction, next_tab_stop};
use crate::registry::{Holder, TrapId, TrapRegistry};
use crate::tabbable::TabbableSet;
use crate::target::{FocusTarget, TargetOption, resolve_option};

/// Externally visible lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrapState {
    Inactive,
    /// Active and intercepting events.
    Listening,
    /// Active, but another trap (or the caller) suspended interception.
    Paused,
}

impl TrapState {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Inactive => "inactive",
            Self::Listening => "listening",
            Self::Paused => "paused",
        }
    }
}

/// Focus the element unless it cannot take focus or already has it. Text
/// inputs get their contents selected.
pub fn try_focus(doc: &dyn Document, node: ElementId) {
    if !doc.can_focus(node) || doc.active_element() == Some(node) {
        return;
    }
    doc.focus(node);
    if doc.is_text_input(node) {
        doc.select_text(node);
    }
}

#[derive(Debug, Default)]
struct Inner {
    tabbables: TabbableSet,
    /// Focus holder at activation time.
    anchor: Option<ElementId>,
    active: bool,
    paused: bool,
    /// Direction of a Tab that targeted a negative-tabindex element.
    pending_tab: Option<Direction>,
    listeners: Vec<ListenerHandle>,
    /// Bumped on every activation.
    generation: u64,
}

struct TrapShared {
    id: TrapId,
    doc: Rc<dyn Document>,
    scanner: Rc<dyn TabbableScanner>,
    container: ElementId,
    config: TrapConfig,
    registry: RefCell<TrapRegistry>,
    inner: RefCell<Inner>,
}

/// A focus trap around one container.
///
/// `FocusTrap` is a cheap handle: clones share the same trap.
///
/// # Example
///
/// ```
/// use ftrap::{FocusTrap, TrapConfig};
/// use ftrap_core::{Document, KeyEvent};
/// use ftrap_dom::{ElementSpec, MemoryDocument};
///
/// let doc = MemoryDocument::shared();
/// let dialog = doc.append(doc.body(), ElementSpec::div());
/// let ok = doc.append(dialog, ElementSpec::button());
/// let cancel = doc.append(dialog, ElementSpec::button());
///
/// let trap = FocusTrap::new(doc.clone(), dialog, TrapConfig::new());
/// trap.activate().unwrap();
/// assert_eq!(doc.active_element(), Some(ok));
///
/// doc.press_key(KeyEvent::tab());
/// doc.press_key(KeyEvent::tab());
/// assert_eq!(doc.active_element(), Some(ok));
/// # let _ = cancel;
/// ```
#[derive(Clone)]
pub struct FocusTrap {
    shared: Rc<TrapShared>,
}

impl FocusTrap {
    /// Trap focus inside `container`, scanning with the document itself.
    pub fn new<D>(doc: Rc<D>, container: ElementId, config: impl Into<TrapConfig>) -> Self
    where
        D: Document + TabbableScanner + 'static,
    {
        let document: Rc<dyn Document> = doc.clone();
        let scanner: Rc<dyn TabbableScanner> = doc;
        Self::with_scanner(document, scanner, container, config)
    }

    /// Trap focus inside `container`, using a separate tabbable scanner.
    pub fn with_scanner(
        doc: Rc<dyn Document>,
        scanner: Rc<dyn TabbableScanner>,
        container: ElementId,
        config: impl Into<TrapConfig>,
    ) -> Self {
        Self {
            shared: Rc::new(TrapShared {
                id: TrapId::next(),
                doc,
                scanner,
                container,
                config: config.into(),
                registry: RefCell::new(TrapRegistry::global()),
                inner: RefCell::new(Inner::default()),
            }),
        }
    }

    /// Trap focus inside the first element matching `selector`.
    ///
    /// # Errors
    ///
    /// [`TrapError::ContainerNotFound`] when nothing matches.
    pub fn for_selector<D>(
        doc: Rc<D>,
        selector: &str,
        config: impl Into<TrapConfig>,
    ) -> Result<Self>
    where
        D: Document + TabbableScanner + 'static,
    {
        let container = doc
            .query_selector(selector)
            .ok_or_else(|| TrapError::ContainerNotFound {
                selector: selector.to_owned(),
            })?;
        Ok(Self::new(doc, container, config))
    }

    /// Coordinate with `registry` instead of the thread's global one.
    ///
    /// A listening trap gives up its slot in the old registry and takes the
    /// slot in `registry` right away, pausing whichever trap held it.
    #[must_use]
    pub fn with_registry(self, registry: TrapRegistry) -> Self {
        self.shared.move_to_registry(registry);
        self
    }

    #[must_use]
    pub fn id(&self) -> TrapId {
        self.shared.id
    }

    #[must_use]
    pub fn container(&self) -> ElementId {
        self.shared.container
    }

    #[must_use]
    pub fn config(&self) -> &TrapConfig {
        &self.shared.config
    }

    #[must_use]
    pub fn registry(&self) -> TrapRegistry {
        self.shared.registry()
    }

    /// Activate with the configured options.
    ///
    /// # Errors
    ///
    /// See [`activate_with`](Self::activate_with).
    pub fn activate(&self) -> Result<&Self> {
        self.activate_with(ActivateOptions::default())
    }

    /// Activate: remember the focused element, run the activation callback,
    /// start listening and move focus into the trap.
    ///
    /// No-op when already active.
    ///
    /// # Errors
    ///
    /// Fails when no initial focus target can be determined, or when a
    /// configured `initial_focus`/`fallback_focus` does not resolve. The
    /// trap is left inactive.
    pub fn activate_with(&self, options: ActivateOptions) -> Result<&Self> {
        self.shared.activate(options)?;
        Ok(self)
    }

    /// Deactivate with the configured options.
    pub fn deactivate(&self) -> &Self {
        self.deactivate_with(DeactivateOptions::default())
    }

    /// Deactivate: stop listening, run the deactivation callback and, if
    /// requested, return focus on the next scheduling turn.
    ///
    /// No-op when inactive.
    pub fn deactivate_with(&self, options: DeactivateOptions) -> &Self {
        self.shared.deactivate(options);
        self
    }

    /// Suspend interception while staying active. No-op unless listening.
    pub fn pause(&self) {
        self.shared.pause();
    }

    /// Resume interception and reapply the initial focus policy. No-op
    /// unless paused.
    ///
    /// # Errors
    ///
    /// Same as [`activate_with`](Self::activate_with). The trap stays
    /// paused.
    pub fn unpause(&self) -> Result<()> {
        self.shared.unpause(None)
    }

    /// Resume interception and focus `node`.
    ///
    /// # Errors
    ///
    /// See [`unpause`](Self::unpause).
    pub fn unpause_to(&self, node: ElementId) -> Result<()> {
        self.shared.unpause(Some(node))
    }

    #[must_use]
    pub fn state(&self) -> TrapState {
        self.shared.state()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state() != TrapState::Inactive
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.state() == TrapState::Paused
    }

    #[must_use]
    pub fn is_listening(&self) -> bool {
        self.state() == TrapState::Listening
    }

    /// The tabbable nodes as of the last scan.
    #[must_use]
    pub fn tabbable_nodes(&self) -> Vec<ElementId> {
        self.shared.inner.borrow().tabbables.as_slice().to_vec()
    }
}

impl fmt::Debug for FocusTrap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FocusTrap")
            .field("id", &self.shared.id)
            .field("container", &self.shared.container)
            .field("state", &self.shared.state())
            .finish()
    }
}

impl TrapShared {
    fn registry(&self) -> TrapRegistry {
        self.registry.borrow().clone()
    }

    fn move_to_registry(self: &Rc<Self>, registry: TrapRegistry) {
        let previous = self.registry.replace(registry);
        if previous.release(self.id) {
            tracing::debug!(
                message = "focus_trap.registry.moved",
                trap_id = self.id.raw()
            );
            let holder: Weak<dyn Holder> = Rc::<TrapShared>::downgrade(self);
            self.registry().acquire(self.id, holder);
        }
    }

    fn state(&self) -> TrapState {
        let inner = self.inner.borrow();
        match (inner.active, inner.paused) {
            (false, _) => TrapState::Inactive,
            (true, true) => TrapState::Paused,
            (true, false) => TrapState::Listening,
        }
    }

    fn is_active(&self) -> bool {
        self.inner.borrow().active
    }

    fn scan(&self) -> TabbableSet {
        let mut set = TabbableSet::new();
        set.refresh(
            &*self.scanner,
            self.container,
            &self.config.extra_tabbable_nodes,
        );
        set
    }

    fn refresh(&self) {
        let set = self.scan();
        self.inner.borrow_mut().tabbables = set;
    }

    /// Initial focus policy: configured target, then the current focus when
    /// the scan found only extra nodes, then the first tabbable node, then
    /// the fallback target.
    fn initial_focus(&self, set: &TabbableSet) -> Result<ElementId> {
        let doc = &*self.doc;
        if let Some(node) =
            resolve_option(self.config.initial_focus.as_ref(), doc, TargetOption::InitialFocus)?
        {
            return Ok(node);
        }
        if set.had_empty_native()
            && let Some(current) = doc.active_element()
            && set.contains(current)
        {
            return Ok(current);
        }
        if let Some(first) = set.first() {
            return Ok(first);
        }
        resolve_option(
            self.config.fallback_focus.as_ref(),
            doc,
            TargetOption::FallbackFocus,
        )?
        .ok_or(TrapError::NoFocusableElement)
    }

    fn activate(self: &Rc<Self>, options: ActivateOptions) -> Result<()> {
        if self.is_active() {
            return Ok(());
        }
        let resolved = options.resolve(&self.config);

        // Surface configuration errors before anything changes.
        self.initial_focus(&self.scan())?;

        let anchor = self.doc.active_element();
        let generation = {
            let mut inner = self.inner.borrow_mut();
            inner.active = true;
            inner.paused = false;
            inner.anchor = anchor;
            inner.generation += 1;
            inner.generation
        };

        tracing::debug!(
            message = "focus_trap.activate",
            trap_id = self.id.raw(),
            container = self.container.raw(),
            anchor = anchor.map(ElementId::raw),
            generation
        );

        if let Some(on_activate) = resolved.on_activate {
            on_activate();
        }

        // A restart from the callback has installed its own listeners.
        if self.inner.borrow().generation != generation {
            return Ok(());
        }

        if let Err(err) = self.listen(None) {
            let mut inner = self.inner.borrow_mut();
            if inner.generation != generation {
                return Err(err);
            }
            inner.active = false;
            inner.anchor = None;
            tracing::warn!(
                message = "focus_trap.activate.rolled_back",
                trap_id = self.id.raw(),
                error = %err
            );
            return Err(err);
        }
        Ok(())
    }

    fn deactivate(self: &Rc<Self>, options: DeactivateOptions) {
        if !self.is_active() {
            return;
        }
        let resolved = options.resolve(&self.config);

        self.stop_listening();
        let (anchor, generation) = {
            let mut inner = self.inner.borrow_mut();
            inner.active = false;
            inner.paused = false;
            inner.pending_tab = None;
            (inner.anchor.take(), inner.generation)
        };

        tracing::debug!(
            message = "focus_trap.deactivate",
            trap_id = self.id.raw(),
            return_focus = resolved.return_focus,
            custom_return = resolved.focus_return.is_some()
        );

        if let Some(on_deactivate) = resolved.on_deactivate {
            on_deactivate();
        }

        if resolved.return_focus {
            let target = resolved
                .focus_return
                .or_else(|| anchor.map(FocusTarget::Element));
            if let Some(target) = target {
                self.schedule_focus_return(target, generation);
            }
        }
    }

    /// Return focus on the next turn unless the trap is activated again
    /// first. The task keeps the document alive but not the trap.
    fn schedule_focus_return(self: &Rc<Self>, target: FocusTarget, generation: u64) {
        let doc = Rc::clone(&self.doc);
        let trap = Rc::downgrade(self);
        let id = self.id;
        self.doc.defer(Box::new(move || {
            if let Some(trap) = trap.upgrade() {
                let current = trap.inner.borrow().generation;
                if current != generation {
                    tracing::debug!(
                        message = "focus_trap.focus_return.stale",
                        trap_id = id.raw(),
                        scheduled = generation,
                        current
                    );
                    return;
                }
            }
            match target.resolve(&*doc, TargetOption::FocusReturn) {
                Ok(node) => {
                    tracing::debug!(
                        message = "focus_trap.focus_return",
                        trap_id = id.raw(),
                        node = node.raw()
                    );
                    try_focus(&*doc, node);
                }
                Err(err) => tracing::warn!(
                    message = "focus_trap.focus_return.unresolved",
                    trap_id = id.raw(),
                    error = %err
                ),
            }
        }));
    }

    fn pause(&self) {
        {
            let mut inner = self.inner.borrow_mut();
            if !inner.active || inner.paused {
                return;
            }
            inner.paused = true;
        }
        tracing::debug!(message = "focus_trap.pause", trap_id = self.id.raw());
        self.stop_listening();
    }

    fn unpause(self: &Rc<Self>, node: Option<ElementId>) -> Result<()> {
        {
            let mut inner = self.inner.borrow_mut();
            if !inner.active || !inner.paused {
                return Ok(());
            }
            inner.paused = false;
        }
        tracing::debug!(
            message = "focus_trap.unpause",
            trap_id = self.id.raw(),
            node = node.map(ElementId::raw)
        );
        if let Err(err) = self.listen(node) {
            self.inner.borrow_mut().paused = true;
            return Err(err);
        }
        Ok(())
    }

    /// Whether the trap is active and not paused in activation `generation`.
    fn still_listening(&self, generation: u64) -> bool {
        let inner = self.inner.borrow();
        inner.active && !inner.paused && inner.generation == generation
    }

    /// Take the registry slot, focus into the trap and subscribe.
    ///
    /// Errors happen before the slot is taken. Does nothing unless the trap
    /// is active and unpaused, and installs nothing if focusing into the trap
    /// paused or deactivated it.
    fn listen(self: &Rc<Self>, node: Option<ElementId>) -> Result<()> {
        let generation = {
            let inner = self.inner.borrow();
            if !inner.active || inner.paused {
                return Ok(());
            }
            inner.generation
        };

        let set = self.scan();
        let target = match node {
            Some(node) => node,
            None => self.initial_focus(&set)?,
        };
        // Providers run above and may have changed the trap's state.
        if !self.still_listening(generation) {
            return Ok(());
        }
        let tabbables = set.len();
        self.inner.borrow_mut().tabbables = set;

        let weak: Weak<Self> = Rc::downgrade(self);
        let holder: Weak<dyn Holder> = weak.clone();
        self.registry().acquire(self.id, holder);

        try_focus(&*self.doc, target);
        if !self.still_listening(generation) {
            return Ok(());
        }

        let stale = std::mem::take(&mut self.inner.borrow_mut().listeners);
        for handle in stale {
            self.doc.remove_event_listener(handle);
        }
        let listener: Rc<dyn EventListener> = Rc::new(TrapListener { trap: weak });
        let handles: Vec<ListenerHandle> = self
            .config
            .listened_events()
            .kinds()
            .map(|kind| self.doc.add_event_listener(kind, Rc::clone(&listener)))
            .collect();

        tracing::debug!(
            message = "focus_trap.listen",
            trap_id = self.id.raw(),
            tabbables,
            focus = target.raw(),
            listeners = handles.len()
        );
        self.inner.borrow_mut().listeners = handles;
        Ok(())
    }

    fn stop_listening(&self) {
        let handles = std::mem::take(&mut self.inner.borrow_mut().listeners);
        for handle in handles {
            self.doc.remove_event_listener(handle);
        }
        self.registry().release(self.id);
    }

    // --- Event handling ---

    fn on_event(self: &Rc<Self>, event: &mut DomEvent) {
        match event.kind() {
            EventKind::Focus => self.check_focus(event),
            EventKind::KeyDown => self.check_key(event),
            EventKind::Click => self.check_click(event),
            EventKind::MouseDown | EventKind::TouchStart => self.check_pointer_down(event),
        }
    }

    fn check_focus(&self, event: &mut DomEvent) {
        let target = event.target();
        let (in_scope, pending) = {
            let inner = self.inner.borrow();
            (inner.tabbables.contains(target), inner.pending_tab)
        };
        if in_scope {
            return;
        }
        event.prevent_default();
        event.stop_immediate_propagation();
        self.doc.blur(target);

        tracing::debug!(
            message = "focus_trap.focus_blocked",
            trap_id = self.id.raw(),
            target = target.raw(),
            readjust = pending.map(Direction::name)
        );

        if let Some(direction) = pending {
            let landing = {
                let inner = self.inner.borrow();
                if direction.is_backward() {
                    inner.tabbables.last()
                } else {
                    inner.tabbables.first()
                }
            };
            if let Some(landing) = landing {
                try_focus(&*self.doc, landing);
            }
        }
    }

    fn check_key(self: &Rc<Self>, event: &mut DomEvent) {
        let Some(key) = event.key() else {
            return;
        };
        if key.is_tab() {
            self.handle_tab(event, key);
        }
        if self.config.escape_deactivates && key.is_escape() {
            tracing::debug!(message = "focus_trap.escape", trap_id = self.id.raw());
            self.deactivate(DeactivateOptions::default());
        }
    }

    fn handle_tab(&self, event: &mut DomEvent, key: KeyEvent) {
        self.refresh();
        let target = event.target();
        let direction = Direction::of_key(&key);

        // The browser moves focus itself; correct it in the focus handler if
        // it leaves the trap.
        if self.doc.tab_index(target).is_some_and(|index| index < 0) {
            self.inner.borrow_mut().pending_tab = Some(direction);
            tracing::trace!(
                message = "focus_trap.tab.native",
                trap_id = self.id.raw(),
                target = target.raw(),
                direction = direction.name()
            );
            return;
        }

        event.prevent_default();
        let next = {
            let inner = self.inner.borrow();
            next_tab_stop(&*self.doc, inner.tabbables.as_slice(), Some(target), direction)
        };
        tracing::trace!(
            message = "focus_trap.tab",
            trap_id = self.id.raw(),
            from = target.raw(),
            to = next.map(ElementId::raw),
            direction = direction.name()
        );
        if let Some(next) = next {
            try_focus(&*self.doc, next);
        }
    }

    fn check_click(&self, event: &mut DomEvent) {
        let target = event.target();
        if self.config.click_outside_deactivates || self.doc.contains(self.container, target) {
            return;
        }
        event.prevent_default();
        event.stop_immediate_propagation();
        tracing::debug!(
            message = "focus_trap.click_blocked",
            trap_id = self.id.raw(),
            target = target.raw()
        );
    }

    fn check_pointer_down(self: &Rc<Self>, event: &mut DomEvent) {
        let target = event.target();
        if !self.config.click_outside_deactivates || self.doc.contains(self.container, target) {
            return;
        }
        tracing::debug!(
            message = "focus_trap.pointer_outside",
            trap_id = self.id.raw(),
            target = target.raw(),
            kind = event.kind().name()
        );
        self.deactivate(DeactivateOptions::new().return_focus(false));
    }
}

impl Holder for TrapShared {
    fn yield_slot(&self) {
        self.pause();
    }
}

impl Drop for TrapShared {
    fn drop(&mut self) {
        let handles = std::mem::take(&mut self.inner.get_mut().listeners);
        for handle in handles {
            self.doc.remove_event_listener(handle);
        }
        self.registry.get_mut().release(self.id);
    }
}

/// Document listener forwarding to a trap that may already be gone.
struct TrapListener {
    trap: Weak<TrapShared>,
}

impl EventListener for TrapListener {
    fn handle_event(&self, event: &mut DomEvent) {
        if let Some(trap) = self.trap.upgrade() {
            trap.on_event(event);
        }
    }
}
