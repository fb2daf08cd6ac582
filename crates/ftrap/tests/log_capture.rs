#![forbid(unsafe_code)]

//! Structured log events emitted by focus traps.
//!
//! Every event carries a `message` naming the operation and a `trap_id`
//! field; blocked interactions and skipped focus returns are observable.
//!
//! Run:
//!   cargo test -p ftrap --test log_capture

use std::collections::HashMap;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use ftrap::{DeactivateOptions, FocusTrap, TrapConfig, TrapRegistry};
use ftrap_core::{Document, ElementId, KeyEvent};
use ftrap_dom::{ElementSpec, MemoryDocument};
use tracing_subscriber::layer::SubscriberExt;

// ============================================================================
// Test Infrastructure
// ============================================================================

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    fields: HashMap<String, String>,
}

impl CapturedEvent {
    fn message(&self) -> Option<&str> {
        self.fields.get("message").map(String::as_str)
    }

    fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

struct EventCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for EventCapture {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            fields: visitor.0.into_iter().collect(),
        });
    }
}

fn with_captured_events<F: FnOnce()>(f: F) -> Vec<CapturedEvent> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry()
        .with(tracing_subscriber::filter::LevelFilter::TRACE)
        .with(EventCapture {
            events: Arc::clone(&events),
        });
    tracing::subscriber::with_default(subscriber, f);
    events.lock().unwrap().clone()
}

fn named<'a>(events: &'a [CapturedEvent], message: &str) -> Vec<&'a CapturedEvent> {
    events
        .iter()
        .filter(|e| e.message() == Some(message))
        .collect()
}

struct Page {
    doc: Rc<MemoryDocument>,
    outside: ElementId,
    trap: FocusTrap,
}

fn page(config: TrapConfig) -> Page {
    let doc = MemoryDocument::shared();
    let outside = doc.append(doc.body(), ElementSpec::button());
    let dialog = doc.append(doc.body(), ElementSpec::div());
    doc.append(dialog, ElementSpec::button());
    doc.append(dialog, ElementSpec::button());
    let trap = FocusTrap::new(doc.clone(), dialog, config).with_registry(TrapRegistry::new());
    Page { doc, outside, trap }
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn lifecycle_events_carry_trap_id() {
    let p = page(TrapConfig::new());
    let id = p.trap.id().raw().to_string();
    let events = with_captured_events(|| {
        p.trap.activate().unwrap();
        p.trap.pause();
        p.trap.unpause().unwrap();
        p.trap.deactivate();
    });

    for message in [
        "focus_trap.activate",
        "focus_trap.listen",
        "focus_trap.pause",
        "focus_trap.unpause",
        "focus_trap.deactivate",
    ] {
        let matching = named(&events, message);
        assert!(!matching.is_empty(), "missing {message}");
        for event in matching {
            assert_eq!(event.level, tracing::Level::DEBUG);
            assert_eq!(event.field("trap_id"), Some(id.as_str()));
        }
    }
    assert_eq!(named(&events, "focus_trap.listen").len(), 2);
}

#[test]
fn tab_decisions_log_at_trace() {
    let p = page(TrapConfig::new());
    p.trap.activate().unwrap();
    let events = with_captured_events(|| {
        p.doc.press_key(KeyEvent::tab());
        p.doc.press_key(KeyEvent::shift_tab());
    });

    let tabs = named(&events, "focus_trap.tab");
    assert_eq!(tabs.len(), 2);
    assert!(tabs.iter().all(|e| e.level == tracing::Level::TRACE));
    assert_eq!(tabs[0].field("direction"), Some("forward"));
    assert_eq!(tabs[1].field("direction"), Some("backward"));
}

#[test]
fn blocked_focus_and_click_are_logged() {
    let p = page(TrapConfig::new());
    p.trap.activate().unwrap();
    let outside = p.outside.raw().to_string();
    let events = with_captured_events(|| {
        p.doc.focus(p.outside);
        p.doc.click(p.outside);
    });

    let blocked = named(&events, "focus_trap.focus_blocked");
    assert_eq!(blocked.len(), 1);
    assert_eq!(blocked[0].field("target"), Some(outside.as_str()));
    assert_eq!(named(&events, "focus_trap.click_blocked").len(), 1);
}

#[test]
fn stale_focus_return_is_logged_and_skipped() {
    let p = page(TrapConfig::new());
    p.doc.focus(p.outside);
    p.trap.activate().unwrap();
    let events = with_captured_events(|| {
        p.trap.deactivate();
        p.trap.activate().unwrap();
        p.doc.run_deferred();
    });

    assert_eq!(named(&events, "focus_trap.focus_return.stale").len(), 1);
    assert!(named(&events, "focus_trap.focus_return").is_empty());
}

#[test]
fn unresolved_focus_return_warns() {
    let p = page(TrapConfig::new());
    p.trap.activate().unwrap();
    let events = with_captured_events(|| {
        p.trap
            .deactivate_with(DeactivateOptions::new().customize_focus_return("#gone"));
        p.doc.run_deferred();
    });

    let warned = named(&events, "focus_trap.focus_return.unresolved");
    assert_eq!(warned.len(), 1);
    assert_eq!(warned[0].level, tracing::Level::WARN);
    assert!(warned[0].field("error").is_some_and(|e| e.contains("#gone")));
}

#[test]
fn outside_pointer_down_is_logged() {
    let p = page(TrapConfig::new().with_click_outside_deactivates(true));
    p.trap.activate().unwrap();
    let events = with_captured_events(|| {
        p.doc.touch_start(p.outside);
    });

    let outside = named(&events, "focus_trap.pointer_outside");
    assert_eq!(outside.len(), 1);
    assert_eq!(outside[0].field("kind"), Some("touchstart"));
    assert_eq!(named(&events, "focus_trap.deactivate").len(), 1);
}
