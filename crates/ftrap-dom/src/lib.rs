#![forbid(unsafe_code)]

//! `ftrap-dom` provides a deterministic in-memory document for ftrap.
//!
//! Design goals:
//! - **Host-driven input**: the embedder (usually a test) pushes key and
//!   pointer events explicitly; nothing happens on its own.
//! - **Explicit scheduling turns**: deferred work queues up until the host
//!   calls [`MemoryDocument::run_deferred`], standing in for a browser's
//!   zero-delay timer.
//! - **Browser-shaped defaults**: an uncancelled Tab moves focus through the
//!   whole document, and an uncancelled mouse-down focuses its target.
//!
//! The document implements both [`Document`] and [`TabbableScanner`], so it
//! can be handed straight to a focus trap.

mod element;

pub use element::{ElementSpec, Tag};

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use ahash::AHashMap;
use ftrap_core::{
    Document, DomEvent, ElementId, EventKind, EventListener, KeyEvent, ListenerHandle,
    TabbableScanner,
};

#[derive(Debug)]
struct NodeData {
    spec: ElementSpec,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

#[derive(Debug)]
struct Tree {
    nodes: AHashMap<ElementId, NodeData>,
    body: ElementId,
    next_id: u64,
    active: Option<ElementId>,
    selected_text: Option<ElementId>,
    focus_log: Vec<ElementId>,
}

impl Tree {
    fn new() -> Self {
        let body = ElementId::new(0);
        let mut nodes = AHashMap::new();
        nodes.insert(
            body,
            NodeData {
                spec: ElementSpec::div(),
                parent: None,
                children: Vec::new(),
            },
        );
        Self {
            nodes,
            body,
            next_id: 1,
            active: None,
            selected_text: None,
            focus_log: Vec::new(),
        }
    }

    fn contains(&self, container: ElementId, node: ElementId) -> bool {
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            if id == container {
                return self.nodes.contains_key(&id);
            }
            cursor = self.nodes.get(&id).and_then(|n| n.parent);
        }
        false
    }

    /// Hidden itself or through an ancestor.
    fn is_hidden(&self, element: ElementId) -> bool {
        let mut cursor = Some(element);
        while let Some(id) = cursor {
            let Some(node) = self.nodes.get(&id) else {
                return true;
            };
            if node.spec.hidden {
                return true;
            }
            cursor = node.parent;
        }
        false
    }

    fn can_focus(&self, element: ElementId) -> bool {
        self.nodes
            .get(&element)
            .is_some_and(|n| n.spec.accepts_focus())
            && !self.is_hidden(element)
    }

    /// Pre-order descendants of `root`, excluding `root`.
    fn descendants(&self, root: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementId> = match self.nodes.get(&root) {
            Some(node) => node.children.iter().rev().copied().collect(),
            None => return out,
        };
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(node) = self.nodes.get(&id) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    fn tabbables(&self, root: ElementId) -> Vec<ElementId> {
        let mut ordered: Vec<(i32, ElementId)> = Vec::new();
        let mut in_order: Vec<ElementId> = Vec::new();
        for id in self.descendants(root) {
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            if !node.spec.in_tab_sequence() || self.is_hidden(id) {
                continue;
            }
            match node.spec.tab_index {
                Some(index) if index > 0 => ordered.push((index, id)),
                _ => in_order.push(id),
            }
        }
        // Stable sort keeps document order among equal tab indices.
        ordered.sort_by_key(|(index, _)| *index);
        ordered
            .into_iter()
            .map(|(_, id)| id)
            .chain(in_order)
            .collect()
    }

    fn matches(&self, id: ElementId, selector: &str) -> bool {
        let Some(node) = self.nodes.get(&id) else {
            return false;
        };
        match selector.strip_prefix('#') {
            Some(wanted) => node.spec.id.as_deref() == Some(wanted),
            None => node.spec.tag.name() == selector,
        }
    }
}

struct Registration {
    handle: ListenerHandle,
    kind: EventKind,
    listener: Rc<dyn EventListener>,
}

/// Deterministic in-memory document.
///
/// # Invariants
///
/// - No internal borrow is held while listeners or deferred tasks run, so
///   both may call back into the document.
/// - Listeners registered or removed during a dispatch affect only later
///   dispatches, except that a listener removed mid-dispatch is skipped.
/// - `focus` fires a `Focus` event only when the active element changes.
pub struct MemoryDocument {
    tree: RefCell<Tree>,
    listeners: RefCell<Vec<Registration>>,
    next_listener: Cell<u64>,
    deferred: RefCell<VecDeque<Box<dyn FnOnce()>>>,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryDocument")
            .field("elements", &self.tree.borrow().nodes.len())
            .field("active", &self.tree.borrow().active)
            .field("listeners", &self.listeners.borrow().len())
            .field("deferred", &self.deferred.borrow().len())
            .finish()
    }
}

impl MemoryDocument {
    /// Create a document containing only an empty `body`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: RefCell::new(Tree::new()),
            listeners: RefCell::new(Vec::new()),
            next_listener: Cell::new(1),
            deferred: RefCell::new(VecDeque::new()),
        }
    }

    /// Create a shared document, ready to hand to a focus trap.
    #[must_use]
    pub fn shared() -> Rc<Self> {
        Rc::new(Self::new())
    }

    /// The `body` element every other element descends from.
    #[must_use]
    pub fn body(&self) -> ElementId {
        self.tree.borrow().body
    }

    // --- Structure ---

    /// Append a new element as the last child of `parent`.
    ///
    /// An unknown `parent` falls back to `body`.
    pub fn append(&self, parent: ElementId, spec: ElementSpec) -> ElementId {
        let mut tree = self.tree.borrow_mut();
        let parent = if tree.nodes.contains_key(&parent) {
            parent
        } else {
            tree.body
        };
        let id = ElementId::new(tree.next_id);
        tree.next_id += 1;
        tree.nodes.insert(
            id,
            NodeData {
                spec,
                parent: Some(parent),
                children: Vec::new(),
            },
        );
        if let Some(node) = tree.nodes.get_mut(&parent) {
            node.children.push(id);
        }
        id
    }

    /// Remove an element and its subtree. Focus inside the subtree is lost.
    pub fn remove(&self, element: ElementId) {
        let mut tree = self.tree.borrow_mut();
        if element == tree.body {
            return;
        }
        let Some(parent) = tree.nodes.get(&element).and_then(|n| n.parent) else {
            return;
        };
        if let Some(node) = tree.nodes.get_mut(&parent) {
            node.children.retain(|child| *child != element);
        }
        let mut doomed = tree.descendants(element);
        doomed.push(element);
        for id in doomed {
            tree.nodes.remove(&id);
            if tree.active == Some(id) {
                tree.active = None;
            }
            if tree.selected_text == Some(id) {
                tree.selected_text = None;
            }
        }
    }

    #[must_use]
    pub fn parent(&self, element: ElementId) -> Option<ElementId> {
        self.tree.borrow().nodes.get(&element).and_then(|n| n.parent)
    }

    /// A copy of the element's current description.
    #[must_use]
    pub fn spec(&self, element: ElementId) -> Option<ElementSpec> {
        self.tree.borrow().nodes.get(&element).map(|n| n.spec.clone())
    }

    /// Check or uncheck a radio/checkbox. Checking a named radio unchecks
    /// the other radios sharing its name.
    pub fn set_checked(&self, element: ElementId, checked: bool) {
        let mut tree = self.tree.borrow_mut();
        let group = match tree.nodes.get(&element) {
            Some(node) if node.spec.tag == Tag::Radio && checked => node.spec.name.clone(),
            Some(_) => None,
            None => return,
        };
        if let Some(group) = group {
            for node in tree.nodes.values_mut() {
                if node.spec.tag == Tag::Radio && node.spec.name.as_deref() == Some(group.as_str()) {
                    node.spec.checked = false;
                }
            }
        }
        if let Some(node) = tree.nodes.get_mut(&element) {
            node.spec.checked = checked;
        }
    }

    pub fn set_hidden(&self, element: ElementId, hidden: bool) {
        if let Some(node) = self.tree.borrow_mut().nodes.get_mut(&element) {
            node.spec.hidden = hidden;
        }
    }

    pub fn set_disabled(&self, element: ElementId, disabled: bool) {
        if let Some(node) = self.tree.borrow_mut().nodes.get_mut(&element) {
            node.spec.disabled = disabled;
        }
    }

    // --- Observation ---

    /// Every element that gained focus, oldest first.
    #[must_use]
    pub fn focus_log(&self) -> Vec<ElementId> {
        self.tree.borrow().focus_log.clone()
    }

    pub fn clear_focus_log(&self) {
        self.tree.borrow_mut().focus_log.clear();
    }

    /// The text input whose contents are currently selected.
    #[must_use]
    pub fn selected_text(&self) -> Option<ElementId> {
        self.tree.borrow().selected_text
    }

    /// Number of listeners currently registered for `kind`.
    #[must_use]
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners
            .borrow()
            .iter()
            .filter(|r| r.kind == kind)
            .count()
    }

    /// Number of listeners currently registered, all kinds.
    #[must_use]
    pub fn listener_total(&self) -> usize {
        self.listeners.borrow().len()
    }

    // --- Dispatch ---

    /// Dispatch `event` through the capture listeners for its kind and
    /// return it with its final flags.
    pub fn dispatch(&self, mut event: DomEvent) -> DomEvent {
        let snapshot: Vec<(ListenerHandle, Rc<dyn EventListener>)> = self
            .listeners
            .borrow()
            .iter()
            .filter(|r| r.kind == event.kind())
            .map(|r| (r.handle, Rc::clone(&r.listener)))
            .collect();

        #[cfg(feature = "tracing")]
        tracing::trace!(
            message = "memory_document.dispatch",
            kind = event.kind().name(),
            target = event.target().raw(),
            listeners = snapshot.len()
        );

        for (handle, listener) in snapshot {
            if !self.is_registered(handle) {
                continue;
            }
            listener.handle_event(&mut event);
            if event.immediate_propagation_stopped() {
                break;
            }
        }
        event
    }

    fn is_registered(&self, handle: ListenerHandle) -> bool {
        self.listeners.borrow().iter().any(|r| r.handle == handle)
    }

    /// Press a key at the focused element (or `body`).
    ///
    /// An uncancelled Tab moves focus to the next (or previous) element of
    /// the document-wide Tab sequence, wrapping at the ends.
    pub fn press_key(&self, key: KeyEvent) -> DomEvent {
        let target = self.active_element().unwrap_or_else(|| self.body());
        let event = self.dispatch(DomEvent::key_down(target, key));
        if key.is_tab()
            && !event.default_prevented()
            && let Some(next) = self.native_tab_target(target, key.is_backward())
        {
            self.focus(next);
        }
        event
    }

    fn native_tab_target(&self, from: ElementId, backward: bool) -> Option<ElementId> {
        let tree = self.tree.borrow();
        let sequence = tree.tabbables(tree.body);
        if sequence.is_empty() {
            return None;
        }
        let len = sequence.len();
        if let Some(pos) = sequence.iter().position(|id| *id == from) {
            let next = if backward {
                (pos + len - 1) % len
            } else {
                (pos + 1) % len
            };
            return Some(sequence[next]);
        }
        // Off-sequence origin (body, tabindex=-1): continue from its
        // document position.
        let order = tree.descendants(tree.body);
        let origin = order.iter().position(|id| *id == from);
        let rank = |id: &ElementId| order.iter().position(|o| o == id);
        match (origin, backward) {
            (None, false) => sequence.first().copied(),
            (None, true) => sequence.last().copied(),
            (Some(origin), false) => sequence
                .iter()
                .copied()
                .find(|id| rank(id).is_some_and(|r| r > origin))
                .or_else(|| sequence.first().copied()),
            (Some(origin), true) => sequence
                .iter()
                .rev()
                .copied()
                .find(|id| rank(id).is_some_and(|r| r < origin))
                .or_else(|| sequence.last().copied()),
        }
    }

    /// Dispatch a single `mousedown`.
    pub fn mouse_down(&self, target: ElementId) -> DomEvent {
        self.dispatch(DomEvent::mouse_down(target))
    }

    /// Dispatch a single `touchstart`.
    pub fn touch_start(&self, target: ElementId) -> DomEvent {
        self.dispatch(DomEvent::touch_start(target))
    }

    /// Dispatch a single `click`.
    pub fn click(&self, target: ElementId) -> DomEvent {
        self.dispatch(DomEvent::click(target))
    }

    /// Full mouse interaction: mouse-down, default focus, click.
    ///
    /// Unless mouse-down is cancelled, focus moves to the nearest focusable
    /// ancestor-or-self of `target`, or is dropped when there is none.
    /// Returns the click event.
    pub fn mouse_click(&self, target: ElementId) -> DomEvent {
        let down = self.mouse_down(target);
        if !down.default_prevented() {
            match self.focusable_ancestor(target) {
                Some(focusable) => self.focus(focusable),
                None => {
                    if let Some(active) = self.active_element() {
                        self.blur(active);
                    }
                }
            }
        }
        self.click(target)
    }

    fn focusable_ancestor(&self, element: ElementId) -> Option<ElementId> {
        let tree = self.tree.borrow();
        let mut cursor = Some(element);
        while let Some(id) = cursor {
            if tree.can_focus(id) {
                return Some(id);
            }
            cursor = tree.nodes.get(&id).and_then(|n| n.parent);
        }
        None
    }

    // --- Scheduling ---

    /// Run the tasks deferred before this call. Tasks deferred while they
    /// run wait for the next call. Returns how many tasks ran.
    pub fn run_deferred(&self) -> usize {
        let due = self.deferred.borrow().len();
        let mut ran = 0;
        for _ in 0..due {
            let task = self.deferred.borrow_mut().pop_front();
            let Some(task) = task else {
                break;
            };
            task();
            ran += 1;
        }
        ran
    }

    /// Number of deferred tasks waiting for the next turn.
    #[must_use]
    pub fn pending_deferred(&self) -> usize {
        self.deferred.borrow().len()
    }
}

impl Document for MemoryDocument {
    fn active_element(&self) -> Option<ElementId> {
        self.tree.borrow().active
    }

    fn contains(&self, container: ElementId, node: ElementId) -> bool {
        self.tree.borrow().contains(container, node)
    }

    fn query_selector(&self, selector: &str) -> Option<ElementId> {
        let tree = self.tree.borrow();
        tree.descendants(tree.body)
            .into_iter()
            .find(|id| tree.matches(*id, selector))
    }

    fn can_focus(&self, element: ElementId) -> bool {
        self.tree.borrow().can_focus(element)
    }

    fn focus(&self, element: ElementId) {
        {
            let mut tree = self.tree.borrow_mut();
            if !tree.can_focus(element) || tree.active == Some(element) {
                return;
            }
            tree.active = Some(element);
            if tree.selected_text != Some(element) {
                tree.selected_text = None;
            }
            tree.focus_log.push(element);
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(message = "memory_document.focus", element = element.raw());

        self.dispatch(DomEvent::focus(element));
    }

    fn blur(&self, element: ElementId) {
        let mut tree = self.tree.borrow_mut();
        if tree.active == Some(element) {
            tree.active = None;
            tree.selected_text = None;
        }
    }

    fn is_text_input(&self, element: ElementId) -> bool {
        self.tree
            .borrow()
            .nodes
            .get(&element)
            .is_some_and(|n| n.spec.tag == Tag::TextInput)
    }

    fn select_text(&self, element: ElementId) {
        if self.is_text_input(element) {
            self.tree.borrow_mut().selected_text = Some(element);
        }
    }

    fn tab_index(&self, element: ElementId) -> Option<i32> {
        self.tree
            .borrow()
            .nodes
            .get(&element)
            .and_then(|n| n.spec.tab_index)
    }

    fn is_radio(&self, element: ElementId) -> bool {
        self.tree
            .borrow()
            .nodes
            .get(&element)
            .is_some_and(|n| n.spec.tag == Tag::Radio)
    }

    fn radio_group(&self, element: ElementId) -> Option<String> {
        self.tree
            .borrow()
            .nodes
            .get(&element)
            .filter(|n| n.spec.tag == Tag::Radio)
            .and_then(|n| n.spec.name.clone())
    }

    fn is_checked(&self, element: ElementId) -> bool {
        self.tree
            .borrow()
            .nodes
            .get(&element)
            .is_some_and(|n| matches!(n.spec.tag, Tag::Radio | Tag::Checkbox) && n.spec.checked)
    }

    fn add_event_listener(
        &self,
        kind: EventKind,
        listener: Rc<dyn EventListener>,
    ) -> ListenerHandle {
        let handle = ListenerHandle::new(self.next_listener.get());
        self.next_listener.set(handle.raw() + 1);
        self.listeners.borrow_mut().push(Registration {
            handle,
            kind,
            listener,
        });
        handle
    }

    fn remove_event_listener(&self, handle: ListenerHandle) {
        self.listeners.borrow_mut().retain(|r| r.handle != handle);
    }

    fn defer(&self, task: Box<dyn FnOnce()>) {
        self.deferred.borrow_mut().push_back(task);
    }
}

impl TabbableScanner for MemoryDocument {
    fn tabbables(&self, root: ElementId) -> Vec<ElementId> {
        self.tree.borrow().tabbables(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    fn form() -> (MemoryDocument, ElementId, [ElementId; 3]) {
        let doc = MemoryDocument::new();
        let form = doc.append(doc.body(), ElementSpec::div().with_id("form"));
        let a = doc.append(form, ElementSpec::text_input().with_id("name"));
        let b = doc.append(form, ElementSpec::button().with_id("ok"));
        let c = doc.append(form, ElementSpec::button().with_id("cancel"));
        (doc, form, [a, b, c])
    }

    #[test]
    fn contains_walks_ancestors() {
        let (doc, form, [a, ..]) = form();
        assert!(doc.contains(form, a));
        assert!(doc.contains(form, form));
        assert!(doc.contains(doc.body(), a));
        assert!(!doc.contains(a, form));
        assert!(!doc.contains(form, ElementId::new(999)));
    }

    #[test]
    fn selectors_match_id_then_tag() {
        let (doc, form, [a, b, _]) = form();
        assert_eq!(doc.query_selector("#form"), Some(form));
        assert_eq!(doc.query_selector("#ok"), Some(b));
        assert_eq!(doc.query_selector("input"), Some(a));
        assert_eq!(doc.query_selector("#missing"), None);
        assert_eq!(doc.query_selector("select"), None);
    }

    #[test]
    fn scanner_orders_positive_tab_index_first() {
        let doc = MemoryDocument::new();
        let root = doc.body();
        let plain = doc.append(root, ElementSpec::button());
        let second = doc.append(root, ElementSpec::button().with_tab_index(2));
        let first = doc.append(root, ElementSpec::button().with_tab_index(1));
        let zero = doc.append(root, ElementSpec::div().with_tab_index(0));
        assert_eq!(doc.tabbables(root), vec![first, second, plain, zero]);
    }

    #[test]
    fn scanner_skips_hidden_disabled_and_negative() {
        let doc = MemoryDocument::new();
        let root = doc.body();
        let panel = doc.append(root, ElementSpec::div().hidden());
        let _inside_hidden = doc.append(panel, ElementSpec::button());
        let _disabled = doc.append(root, ElementSpec::button().disabled());
        let _negative = doc.append(root, ElementSpec::button().with_tab_index(-1));
        let _inert = doc.append(root, ElementSpec::span());
        let visible = doc.append(root, ElementSpec::link());
        assert_eq!(doc.tabbables(root), vec![visible]);
    }

    #[test]
    fn scanner_excludes_root() {
        let doc = MemoryDocument::new();
        let root = doc.append(doc.body(), ElementSpec::div().with_tab_index(0));
        let child = doc.append(root, ElementSpec::button());
        assert_eq!(doc.tabbables(root), vec![child]);
    }

    #[test]
    fn focus_fires_only_on_change() {
        let (doc, _, [a, b, _]) = form();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        doc.add_event_listener(
            EventKind::Focus,
            Rc::new(move |e: &mut DomEvent| sink.borrow_mut().push(e.target())),
        );
        doc.focus(a);
        doc.focus(a);
        doc.focus(b);
        assert_eq!(*seen.borrow(), vec![a, b]);
        assert_eq!(doc.focus_log(), vec![a, b]);
    }

    #[test]
    fn focus_refuses_unfocusable() {
        let (doc, form, _) = form();
        doc.focus(form);
        assert_eq!(doc.active_element(), None);
        assert!(!doc.can_focus(form));
    }

    #[test]
    fn blur_only_affects_the_active_element() {
        let (doc, _, [a, b, _]) = form();
        doc.focus(a);
        doc.blur(b);
        assert_eq!(doc.active_element(), Some(a));
        doc.blur(a);
        assert_eq!(doc.active_element(), None);
    }

    #[test]
    fn select_text_requires_text_input() {
        let (doc, _, [a, b, _]) = form();
        doc.select_text(b);
        assert_eq!(doc.selected_text(), None);
        doc.focus(a);
        doc.select_text(a);
        assert_eq!(doc.selected_text(), Some(a));
        doc.focus(b);
        assert_eq!(doc.selected_text(), None);
    }

    #[test]
    fn stop_immediate_propagation_skips_later_listeners() {
        let (doc, _, [a, ..]) = form();
        let hits = Rc::new(Cell::new(0));
        let first = Rc::clone(&hits);
        let second = Rc::clone(&hits);
        doc.add_event_listener(
            EventKind::Click,
            Rc::new(move |e: &mut DomEvent| {
                first.set(first.get() + 1);
                e.stop_immediate_propagation();
            }),
        );
        doc.add_event_listener(
            EventKind::Click,
            Rc::new(move |_: &mut DomEvent| second.set(second.get() + 10)),
        );
        let event = doc.click(a);
        assert!(event.immediate_propagation_stopped());
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn listener_removed_mid_dispatch_is_skipped() {
        let (doc, _, [a, ..]) = form();
        let doc = Rc::new(doc);
        let hits = Rc::new(Cell::new(0));
        let victim = Rc::new(Cell::new(None));

        let remover_doc = Rc::clone(&doc);
        let remover_victim = Rc::clone(&victim);
        doc.add_event_listener(
            EventKind::Click,
            Rc::new(move |_: &mut DomEvent| {
                if let Some(handle) = remover_victim.get() {
                    remover_doc.remove_event_listener(handle);
                }
            }),
        );
        let counter = Rc::clone(&hits);
        let handle = doc.add_event_listener(
            EventKind::Click,
            Rc::new(move |_: &mut DomEvent| counter.set(counter.get() + 1)),
        );
        victim.set(Some(handle));

        doc.click(a);
        assert_eq!(hits.get(), 0);
        assert_eq!(doc.listener_count(EventKind::Click), 1);
    }

    #[test]
    fn uncancelled_tab_moves_through_document() {
        let (doc, _, [a, b, c]) = form();
        doc.focus(a);
        doc.press_key(KeyEvent::tab());
        assert_eq!(doc.active_element(), Some(b));
        doc.press_key(KeyEvent::tab());
        doc.press_key(KeyEvent::tab());
        assert_eq!(doc.active_element(), Some(a));
        doc.press_key(KeyEvent::shift_tab());
        assert_eq!(doc.active_element(), Some(c));
    }

    #[test]
    fn tab_from_off_sequence_element_uses_document_position() {
        let doc = MemoryDocument::new();
        let before = doc.append(doc.body(), ElementSpec::button());
        let skipped = doc.append(doc.body(), ElementSpec::div().with_tab_index(-1));
        let after = doc.append(doc.body(), ElementSpec::button());
        doc.focus(skipped);
        doc.press_key(KeyEvent::tab());
        assert_eq!(doc.active_element(), Some(after));
        doc.focus(skipped);
        doc.press_key(KeyEvent::shift_tab());
        assert_eq!(doc.active_element(), Some(before));
    }

    #[test]
    fn cancelled_tab_keeps_focus() {
        let (doc, _, [a, ..]) = form();
        doc.add_event_listener(
            EventKind::KeyDown,
            Rc::new(|e: &mut DomEvent| e.prevent_default()),
        );
        doc.focus(a);
        let event = doc.press_key(KeyEvent::tab());
        assert!(event.default_prevented());
        assert_eq!(doc.active_element(), Some(a));
    }

    #[test]
    fn mouse_click_focuses_nearest_focusable() {
        let doc = MemoryDocument::new();
        let button = doc.append(doc.body(), ElementSpec::button());
        let label = doc.append(button, ElementSpec::span());
        let plain = doc.append(doc.body(), ElementSpec::span());

        doc.mouse_click(label);
        assert_eq!(doc.active_element(), Some(button));
        doc.mouse_click(plain);
        assert_eq!(doc.active_element(), None);
    }

    #[test]
    fn cancelled_mouse_down_keeps_focus() {
        let (doc, _, [a, b, _]) = form();
        doc.add_event_listener(
            EventKind::MouseDown,
            Rc::new(|e: &mut DomEvent| e.prevent_default()),
        );
        doc.focus(a);
        doc.mouse_click(b);
        assert_eq!(doc.active_element(), Some(a));
    }

    #[test]
    fn deferred_tasks_run_one_turn_at_a_time() {
        let doc = Rc::new(MemoryDocument::new());
        let log = Rc::new(RefCell::new(Vec::new()));

        let inner_doc = Rc::clone(&doc);
        let inner_log = Rc::clone(&log);
        let outer_log = Rc::clone(&log);
        doc.defer(Box::new(move || {
            outer_log.borrow_mut().push("outer");
            inner_doc.defer(Box::new(move || inner_log.borrow_mut().push("inner")));
        }));

        assert_eq!(doc.pending_deferred(), 1);
        assert_eq!(doc.run_deferred(), 1);
        assert_eq!(*log.borrow(), vec!["outer"]);
        assert_eq!(doc.run_deferred(), 1);
        assert_eq!(*log.borrow(), vec!["outer", "inner"]);
        assert_eq!(doc.run_deferred(), 0);
    }

    #[test]
    fn checking_a_radio_unchecks_its_group() {
        let doc = MemoryDocument::new();
        let small = doc.append(doc.body(), ElementSpec::radio("size", true));
        let large = doc.append(doc.body(), ElementSpec::radio("size", false));
        let other = doc.append(doc.body(), ElementSpec::radio("color", true));
        doc.set_checked(large, true);
        assert!(!doc.is_checked(small));
        assert!(doc.is_checked(large));
        assert!(doc.is_checked(other));
        assert!(doc.is_radio(large));
    }

    #[test]
    fn radio_group_is_the_name_of_a_radio() {
        let doc = MemoryDocument::new();
        let small = doc.append(doc.body(), ElementSpec::radio("size", false));
        let unnamed = doc.append(doc.body(), ElementSpec::new(Tag::Radio));
        let named_button = doc.append(doc.body(), ElementSpec::button().with_name("size"));
        assert_eq!(doc.radio_group(small).as_deref(), Some("size"));
        assert_eq!(doc.radio_group(unnamed), None);
        assert_eq!(doc.radio_group(named_button), None);
    }

    #[test]
    fn remove_drops_subtree_and_focus() {
        let (doc, form, [a, ..]) = form();
        doc.focus(a);
        doc.remove(form);
        assert_eq!(doc.active_element(), None);
        assert!(doc.tabbables(doc.body()).is_empty());
        assert_eq!(doc.parent(a), None);
    }

    #[test]
    fn hiding_and_disabling_update_focusability() {
        let (doc, form, [a, b, c]) = form();
        doc.set_hidden(a, true);
        doc.set_disabled(b, true);
        assert_eq!(doc.tabbables(form), vec![c]);
        assert!(!doc.can_focus(a));
        doc.set_hidden(a, false);
        assert_eq!(doc.tabbables(form), vec![a, c]);
    }
}
