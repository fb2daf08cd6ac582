#![forbid(unsafe_code)]

//! Focus targets given as an element, a selector, or a provider.

use std::fmt;
use std::rc::Rc;

use ftrap_core::{Document, ElementId};

use crate::error::{Result, TrapError};

/// Zero-argument element provider.
pub type Provider = Rc<dyn Fn() -> Option<ElementId>>;

/// Which option a target came from, for error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetOption {
    InitialFocus,
    FallbackFocus,
    FocusReturn,
}

impl TargetOption {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::InitialFocus => "initialFocus",
            Self::FallbackFocus => "fallbackFocus",
            Self::FocusReturn => "customizeFocusReturn",
        }
    }
}

impl fmt::Display for TargetOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An element to focus, resolved lazily against the document.
#[derive(Clone)]
pub enum FocusTarget {
    Element(ElementId),
    /// Single-element lookup, resolved at use time.
    Selector(String),
    Provider(Provider),
}

impl FocusTarget {
    /// Wrap a provider closure.
    #[must_use]
    pub fn provider(f: impl Fn() -> Option<ElementId> + 'static) -> Self {
        Self::Provider(Rc::new(f))
    }

    /// Resolve to an element. A selector that matches nothing and a
    /// provider that returns nothing are errors.
    pub fn resolve(&self, doc: &dyn Document, option: TargetOption) -> Result<ElementId> {
        match self {
            Self::Element(element) => Ok(*element),
            Self::Selector(selector) => {
                doc.query_selector(selector)
                    .ok_or_else(|| TrapError::SelectorMatchedNothing {
                        option,
                        selector: selector.clone(),
                    })
            }
            Self::Provider(provider) => {
                provider().ok_or(TrapError::ProviderReturnedNothing { option })
            }
        }
    }
}

/// `Ok(None)` when the option is not configured at all.
pub fn resolve_option(
    target: Option<&FocusTarget>,
    doc: &dyn Document,
    option: TargetOption,
) -> Result<Option<ElementId>> {
    target.map(|t| t.resolve(doc, option)).transpose()
}

impl fmt::Debug for FocusTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Element(element) => f.debug_tuple("Element").field(element).finish(),
            Self::Selector(selector) => f.debug_tuple("Selector").field(selector).finish(),
            Self::Provider(_) => f.write_str("Provider(..)"),
        }
    }
}

impl From<ElementId> for FocusTarget {
    fn from(element: ElementId) -> Self {
        Self::Element(element)
    }
}

impl From<&str> for FocusTarget {
    fn from(selector: &str) -> Self {
        Self::Selector(selector.to_owned())
    }
}

impl From<String> for FocusTarget {
    fn from(selector: String) -> Self {
        Self::Selector(selector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ftrap_dom::{ElementSpec, MemoryDocument};
    use pretty_assertions::assert_eq;

    #[test]
    fn element_resolves_to_itself() {
        let doc = MemoryDocument::new();
        let el = ElementId::new(77);
        assert_eq!(
            FocusTarget::from(el).resolve(&doc, TargetOption::InitialFocus),
            Ok(el)
        );
    }

    #[test]
    fn selector_resolves_through_document() {
        let doc = MemoryDocument::new();
        let ok = doc.append(doc.body(), ElementSpec::button().with_id("ok"));
        assert_eq!(
            FocusTarget::from("#ok").resolve(&doc, TargetOption::InitialFocus),
            Ok(ok)
        );
    }

    #[test]
    fn unmatched_selector_is_an_error() {
        let doc = MemoryDocument::new();
        assert_eq!(
            FocusTarget::from("#nope").resolve(&doc, TargetOption::FallbackFocus),
            Err(TrapError::SelectorMatchedNothing {
                option: TargetOption::FallbackFocus,
                selector: "#nope".into(),
            })
        );
    }

    #[test]
    fn empty_provider_is_an_error() {
        let doc = MemoryDocument::new();
        let target = FocusTarget::provider(|| None);
        assert_eq!(
            target.resolve(&doc, TargetOption::InitialFocus),
            Err(TrapError::ProviderReturnedNothing {
                option: TargetOption::InitialFocus
            })
        );
    }

    #[test]
    fn unconfigured_option_is_none_not_error() {
        let doc = MemoryDocument::new();
        assert_eq!(
            resolve_option(None, &doc, TargetOption::InitialFocus),
            Ok(None)
        );
        let el = ElementId::new(3);
        let target = FocusTarget::provider(move || Some(el));
        assert_eq!(
            resolve_option(Some(&target), &doc, TargetOption::InitialFocus),
            Ok(Some(el))
        );
    }

    #[test]
    fn debug_hides_provider_body() {
        assert_eq!(
            format!("{:?}", FocusTarget::provider(|| None)),
            "Provider(..)"
        );
        assert_eq!(
            format!("{:?}", FocusTarget::from("#a")),
            "Selector(\"#a\")"
        );
    }
}
