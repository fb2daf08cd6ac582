#![forbid(unsafe_code)]

//! Trap options as data.
//!
//! [`TrapPolicy`] is the part of [`TrapOptions`] that can be written down:
//! the behaviour switches plus selector-valued focus targets. Callbacks,
//! providers and extra nodes stay programmatic.
//!
//! ```toml
//! # dialog-trap.toml
//! escape_deactivates = false
//! click_outside_deactivates = true
//! initial_focus = "#email"
//! fallback_focus = "#dialog-close"
//! ```
//!
//! ```rust,ignore
//! let policy = TrapPolicy::from_toml_file("dialog-trap.toml")?;
//! let trap = FocusTrap::new(doc, dialog, policy.into_options());
//! ```
//!
//! Missing keys take the [`TrapConfig`](crate::TrapConfig) defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::TrapOptions;
use crate::target::FocusTarget;

/// Serializable subset of the trap options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrapPolicy {
    pub return_focus_on_deactivate: bool,
    pub escape_deactivates: bool,
    pub ignore_click: bool,
    pub click_outside_deactivates: bool,
    /// Selector for the initial focus target.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_focus: Option<String>,
    /// Selector for the fallback focus target.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_focus: Option<String>,
}

impl Default for TrapPolicy {
    fn default() -> Self {
        Self {
            return_focus_on_deactivate: true,
            escape_deactivates: true,
            ignore_click: false,
            click_outside_deactivates: false,
            initial_focus: None,
            fallback_focus: None,
        }
    }
}

impl TrapPolicy {
    /// Load from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, PolicyError> {
        let policy: Self = toml::from_str(s)?;
        policy.checked()
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, PolicyError> {
        let policy: Self = serde_json::from_str(s)?;
        policy.checked()
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Serialize to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, PolicyError> {
        toml::to_string(self).map_err(PolicyError::TomlSerialize)
    }

    /// Problems that would make the policy unusable. Empty when valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        for (key, selector) in [
            ("initial_focus", &self.initial_focus),
            ("fallback_focus", &self.fallback_focus),
        ] {
            if selector.as_deref().is_some_and(|s| s.trim().is_empty()) {
                errors.push(format!("{key} must not be an empty selector"));
            }
        }
        errors
    }

    fn checked(self) -> Result<Self, PolicyError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(PolicyError::Validation(errors))
        }
    }

    /// Options for [`FocusTrap::new`](crate::FocusTrap::new). Every field is
    /// set explicitly, so the policy fully determines these options.
    #[must_use]
    pub fn into_options(self) -> TrapOptions {
        TrapOptions {
            return_focus_on_deactivate: Some(self.return_focus_on_deactivate),
            escape_deactivates: Some(self.escape_deactivates),
            ignore_click: Some(self.ignore_click),
            click_outside_deactivates: Some(self.click_outside_deactivates),
            initial_focus: self.initial_focus.map(FocusTarget::Selector),
            fallback_focus: self.fallback_focus.map(FocusTarget::Selector),
            ..TrapOptions::default()
        }
    }
}

impl From<TrapPolicy> for TrapOptions {
    fn from(policy: TrapPolicy) -> Self {
        policy.into_options()
    }
}

/// Errors from loading a [`TrapPolicy`].
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(toml::ser::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn empty_document_is_default() {
        assert_eq!(TrapPolicy::from_toml_str("").unwrap(), TrapPolicy::default());
        assert_eq!(TrapPolicy::from_json_str("{}").unwrap(), TrapPolicy::default());
    }

    #[test]
    fn empty_selector_fails_validation() {
        let err = TrapPolicy::from_toml_str("initial_focus = \"  \"").unwrap_err();
        assert!(matches!(err, PolicyError::Validation(ref errors) if errors.len() == 1));
        assert!(err.to_string().contains("initial_focus"));
    }

    #[test]
    fn into_options_sets_every_switch() {
        let options = TrapPolicy {
            escape_deactivates: false,
            ..TrapPolicy::default()
        }
        .into_options();
        assert_eq!(options.escape_deactivates, Some(false));
        assert_eq!(options.return_focus_on_deactivate, Some(true));
        assert!(options.initial_focus.is_none());
        assert!(options.extra_tabbable_nodes.is_none());
    }
}
