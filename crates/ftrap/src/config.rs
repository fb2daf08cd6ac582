#![forbid(unsafe_code)]

//! Trap configuration and per-call overrides.
//!
//! User input arrives as a partial option bag ([`TrapOptions`], every field
//! optional) and resolves once, at construction, into a fully-defaulted
//! [`TrapConfig`]. Activation and deactivation accept their own overrides
//! ([`ActivateOptions`], [`DeactivateOptions`]) which are resolved against
//! the config on every call. Resolution never fails; missing values take
//! their defaults.
//!
//! | Option | Default |
//! |---|---|
//! | `return_focus_on_deactivate` | `true` |
//! | `escape_deactivates` | `true` |
//! | `ignore_click` | `false` |
//! | `click_outside_deactivates` | `false` |
//! | `extra_tabbable_nodes` | empty |
//! | `initial_focus` / `fallback_focus` | unset |
//! | `on_activate` / `on_deactivate` | unset |

use std::fmt;
use std::rc::Rc;

use ftrap_core::{ElementId, EventKinds};

use crate::target::FocusTarget;

/// Lifecycle callback.
pub type Callback = Rc<dyn Fn()>;

/// Wrap a closure as a [`Callback`].
pub fn callback(f: impl Fn() + 'static) -> Callback {
    Rc::new(f)
}

/// Partial, user-supplied options.
#[derive(Clone, Default)]
pub struct TrapOptions {
    pub return_focus_on_deactivate: Option<bool>,
    pub escape_deactivates: Option<bool>,
    pub ignore_click: Option<bool>,
    pub click_outside_deactivates: Option<bool>,
    pub extra_tabbable_nodes: Option<Vec<ElementId>>,
    pub initial_focus: Option<FocusTarget>,
    pub fallback_focus: Option<FocusTarget>,
    pub on_activate: Option<Callback>,
    pub on_deactivate: Option<Callback>,
}

/// Fully-defaulted trap configuration.
#[derive(Clone)]
pub struct TrapConfig {
    /// Restore the pre-activation focus when deactivating.
    pub return_focus_on_deactivate: bool,
    /// Escape deactivates the trap.
    pub escape_deactivates: bool,
    /// Leave pointer events alone entirely.
    pub ignore_click: bool,
    /// Pointer-down outside the container deactivates the trap.
    pub click_outside_deactivates: bool,
    /// Appended after the container's own tabbable elements.
    pub extra_tabbable_nodes: Vec<ElementId>,
    pub initial_focus: Option<FocusTarget>,
    /// Used when the container has nothing tabbable.
    pub fallback_focus: Option<FocusTarget>,
    pub on_activate: Option<Callback>,
    pub on_deactivate: Option<Callback>,
}

impl Default for TrapConfig {
    fn default() -> Self {
        Self {
            return_focus_on_deactivate: true,
            escape_deactivates: true,
            ignore_click: false,
            click_outside_deactivates: false,
            extra_tabbable_nodes: Vec::new(),
            initial_focus: None,
            fallback_focus: None,
            on_activate: None,
            on_deactivate: None,
        }
    }
}

impl From<TrapOptions> for TrapConfig {
    fn from(options: TrapOptions) -> Self {
        let defaults = Self::default();
        Self {
            return_focus_on_deactivate: options
                .return_focus_on_deactivate
                .unwrap_or(defaults.return_focus_on_deactivate),
            escape_deactivates: options
                .escape_deactivates
                .unwrap_or(defaults.escape_deactivates),
            ignore_click: options.ignore_click.unwrap_or(defaults.ignore_click),
            click_outside_deactivates: options
                .click_outside_deactivates
                .unwrap_or(defaults.click_outside_deactivates),
            extra_tabbable_nodes: options.extra_tabbable_nodes.unwrap_or_default(),
            initial_focus: options.initial_focus,
            fallback_focus: options.fallback_focus,
            on_activate: options.on_activate,
            on_deactivate: options.on_deactivate,
        }
    }
}

impl TrapConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_return_focus_on_deactivate(mut self, enabled: bool) -> Self {
        self.return_focus_on_deactivate = enabled;
        self
    }

    #[must_use]
    pub fn with_escape_deactivates(mut self, enabled: bool) -> Self {
        self.escape_deactivates = enabled;
        self
    }

    #[must_use]
    pub fn with_ignore_click(mut self, ignore: bool) -> Self {
        self.ignore_click = ignore;
        self
    }

    #[must_use]
    pub fn with_click_outside_deactivates(mut self, enabled: bool) -> Self {
        self.click_outside_deactivates = enabled;
        self
    }

    #[must_use]
    pub fn with_extra_tabbable_nodes(mut self, nodes: Vec<ElementId>) -> Self {
        self.extra_tabbable_nodes = nodes;
        self
    }

    #[must_use]
    pub fn with_initial_focus(mut self, target: impl Into<FocusTarget>) -> Self {
        self.initial_focus = Some(target.into());
        self
    }

    #[must_use]
    pub fn with_fallback_focus(mut self, target: impl Into<FocusTarget>) -> Self {
        self.fallback_focus = Some(target.into());
        self
    }

    #[must_use]
    pub fn with_on_activate(mut self, f: impl Fn() + 'static) -> Self {
        self.on_activate = Some(callback(f));
        self
    }

    #[must_use]
    pub fn with_on_deactivate(mut self, f: impl Fn() + 'static) -> Self {
        self.on_deactivate = Some(callback(f));
        self
    }

    /// Event kinds a listening trap subscribes to.
    #[must_use]
    pub fn listened_events(&self) -> EventKinds {
        if self.ignore_click {
            EventKinds::KEYBOARD
        } else {
            EventKinds::KEYBOARD | EventKinds::POINTER
        }
    }
}

impl fmt::Debug for TrapConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrapConfig")
            .field("return_focus_on_deactivate", &self.return_focus_on_deactivate)
            .field("escape_deactivates", &self.escape_deactivates)
            .field("ignore_click", &self.ignore_click)
            .field("click_outside_deactivates", &self.click_outside_deactivates)
            .field("extra_tabbable_nodes", &self.extra_tabbable_nodes)
            .field("initial_focus", &self.initial_focus)
            .field("fallback_focus", &self.fallback_focus)
            .field("on_activate", &self.on_activate.is_some())
            .field("on_deactivate", &self.on_deactivate.is_some())
            .finish()
    }
}

/// Overrides for one `activate` call.
#[derive(Clone, Default)]
pub struct ActivateOptions {
    pub on_activate: Option<Callback>,
}

impl ActivateOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn on_activate(mut self, f: impl Fn() + 'static) -> Self {
        self.on_activate = Some(callback(f));
        self
    }

    #[must_use]
    pub fn resolve(self, config: &TrapConfig) -> ResolvedActivate {
        ResolvedActivate {
            on_activate: self.on_activate.or_else(|| config.on_activate.clone()),
        }
    }
}

#[derive(Clone)]
pub struct ResolvedActivate {
    pub on_activate: Option<Callback>,
}

/// Overrides for one `deactivate` call.
#[derive(Clone, Default)]
pub struct DeactivateOptions {
    pub return_focus: Option<bool>,
    pub on_deactivate: Option<Callback>,
    /// Focus this instead of the pre-activation element.
    pub customize_focus_return: Option<FocusTarget>,
}

impl DeactivateOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn return_focus(mut self, enabled: bool) -> Self {
        self.return_focus = Some(enabled);
        self
    }

    #[must_use]
    pub fn on_deactivate(mut self, f: impl Fn() + 'static) -> Self {
        self.on_deactivate = Some(callback(f));
        self
    }

    #[must_use]
    pub fn customize_focus_return(mut self, target: impl Into<FocusTarget>) -> Self {
        self.customize_focus_return = Some(target.into());
        self
    }

    #[must_use]
    pub fn resolve(self, config: &TrapConfig) -> ResolvedDeactivate {
        ResolvedDeactivate {
            return_focus: self
                .return_focus
                .unwrap_or(config.return_focus_on_deactivate),
            on_deactivate: self.on_deactivate.or_else(|| config.on_deactivate.clone()),
            focus_return: self.customize_focus_return,
        }
    }
}

#[derive(Clone)]
pub struct ResolvedDeactivate {
    pub return_focus: bool,
    pub on_deactivate: Option<Callback>,
    pub focus_return: Option<FocusTarget>,
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::Cell;

    #[test]
    fn empty_options_take_defaults() {
        let config = TrapConfig::from(TrapOptions::default());
        assert!(config.return_focus_on_deactivate);
        assert!(config.escape_deactivates);
        assert!(!config.ignore_click);
        assert!(!config.click_outside_deactivates);
        assert!(config.extra_tabbable_nodes.is_empty());
        assert!(config.initial_focus.is_none());
        assert!(config.fallback_focus.is_none());
        assert!(config.on_activate.is_none());
    }

    #[test]
    fn explicit_options_win() {
        let config = TrapConfig::from(TrapOptions {
            return_focus_on_deactivate: Some(false),
            escape_deactivates: Some(false),
            ignore_click: Some(true),
            extra_tabbable_nodes: Some(vec![ElementId::new(9)]),
            ..TrapOptions::default()
        });
        assert!(!config.return_focus_on_deactivate);
        assert!(!config.escape_deactivates);
        assert!(config.ignore_click);
        assert_eq!(config.extra_tabbable_nodes, vec![ElementId::new(9)]);
    }

    #[test]
    fn ignore_click_drops_pointer_listeners() {
        assert_eq!(
            TrapConfig::new().listened_events(),
            EventKinds::KEYBOARD | EventKinds::POINTER
        );
        assert_eq!(
            TrapConfig::new().with_ignore_click(true).listened_events(),
            EventKinds::KEYBOARD
        );
    }

    #[test]
    fn deactivate_overrides_fall_back_to_config() {
        let config = TrapConfig::new().with_return_focus_on_deactivate(false);
        let resolved = DeactivateOptions::new().resolve(&config);
        assert!(!resolved.return_focus);
        assert!(resolved.on_deactivate.is_none());
        assert!(resolved.focus_return.is_none());

        let resolved = DeactivateOptions::new()
            .return_focus(true)
            .customize_focus_return(ElementId::new(4))
            .resolve(&config);
        assert!(resolved.return_focus);
        assert!(matches!(
            resolved.focus_return,
            Some(FocusTarget::Element(id)) if id == ElementId::new(4)
        ));
    }

    #[test]
    fn per_call_callback_replaces_configured_one() {
        let hits = Rc::new(Cell::new(0));
        let configured = Rc::clone(&hits);
        let config = TrapConfig::new().with_on_activate(move || configured.set(configured.get() + 1));

        let per_call = Rc::clone(&hits);
        let resolved = ActivateOptions::new()
            .on_activate(move || per_call.set(per_call.get() + 100))
            .resolve(&config);
        if let Some(f) = resolved.on_activate {
            f();
        }
        assert_eq!(hits.get(), 100);

        if let Some(f) = ActivateOptions::new().resolve(&config).on_activate {
            f();
        }
        assert_eq!(hits.get(), 101);
    }

    #[test]
    fn debug_reports_callbacks_as_flags() {
        let rendered = format!("{:?}", TrapConfig::new().with_on_deactivate(|| {}));
        assert!(rendered.contains("on_deactivate: true"));
        assert!(rendered.contains("on_activate: false"));
    }
}
