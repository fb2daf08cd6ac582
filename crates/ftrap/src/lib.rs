#![forbid(unsafe_code)]

//! Keyboard focus traps for DOM-like hosts.
//!
//! A [`FocusTrap`] keeps keyboard focus inside a container (a dialog, a
//! menu, a drawer) while it is active: Tab and Shift+Tab cycle through the
//! container's tabbable elements, focus that lands outside is pulled back,
//! and clicks outside are blocked or deactivate the trap.
//!
//! The trap talks to its host only through [`ftrap_core::Document`] and
//! [`ftrap_core::TabbableScanner`]. `ftrap-dom` provides an in-memory host
//! for tests and headless use.
//!
//! # Modules
//!
//! - [`config`]: options, defaults and per-call overrides.
//! - [`target`]: focus targets given as element, selector or provider.
//! - [`tabbable`]: the ordered set of stops.
//! - [`navigation`]: Tab-order stepping with radio-group handling.
//! - [`registry`]: the one-listening-trap coordinator.
//! - [`trap`]: lifecycle and event interception.
//! - `policy` (feature `policy-config`): options loaded from TOML/JSON.

pub mod config;
pub mod error;
pub mod navigation;
#[cfg(feature = "policy-config")]
pub mod policy;
pub mod registry;
pub mod tabbable;
pub mod target;
pub mod trap;

pub use config::{
    ActivateOptions, Callback, DeactivateOptions, ResolvedActivate, ResolvedDeactivate,
    TrapConfig, TrapOptions, callback,
};
pub use error::{Result, TrapError};
pub use navigation::{Direction, next_tab_stop};
#[cfg(feature = "policy-config")]
pub use policy::{PolicyError, TrapPolicy};
pub use registry::{TrapId, TrapRegistry};
pub use tabbable::TabbableSet;
pub use target::{FocusTarget, Provider, TargetOption, resolve_option};
pub use trap::{FocusTrap, TrapState, try_focus};
