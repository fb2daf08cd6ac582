#![forbid(unsafe_code)]

//! Element descriptions for the in-memory document.

/// Element tag, reduced to what focus handling needs to distinguish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Div,
    Span,
    Button,
    /// `<a href>`.
    Link,
    /// `<input type="text">`.
    TextInput,
    /// `<input type="radio">`.
    Radio,
    /// `<input type="checkbox">`.
    Checkbox,
}

impl Tag {
    /// Lowercase tag name used by tag selectors.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Div => "div",
            Self::Span => "span",
            Self::Button => "button",
            Self::Link => "a",
            Self::TextInput | Self::Radio | Self::Checkbox => "input",
        }
    }

    /// Natively focusable without a `tabindex` attribute.
    #[must_use]
    pub const fn is_interactive(self) -> bool {
        !matches!(self, Self::Div | Self::Span)
    }
}

/// Description of an element to append to a [`crate::MemoryDocument`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementSpec {
    pub tag: Tag,
    /// The `id` attribute, matched by `#id` selectors.
    pub id: Option<String>,
    /// The `name` attribute; radios sharing a name are mutually exclusive.
    pub name: Option<String>,
    pub tab_index: Option<i32>,
    pub disabled: bool,
    pub hidden: bool,
    pub checked: bool,
}

impl ElementSpec {
    #[must_use]
    pub const fn new(tag: Tag) -> Self {
        Self {
            tag,
            id: None,
            name: None,
            tab_index: None,
            disabled: false,
            hidden: false,
            checked: false,
        }
    }

    #[must_use]
    pub const fn div() -> Self {
        Self::new(Tag::Div)
    }

    #[must_use]
    pub const fn span() -> Self {
        Self::new(Tag::Span)
    }

    #[must_use]
    pub const fn button() -> Self {
        Self::new(Tag::Button)
    }

    #[must_use]
    pub const fn link() -> Self {
        Self::new(Tag::Link)
    }

    #[must_use]
    pub const fn text_input() -> Self {
        Self::new(Tag::TextInput)
    }

    /// A radio button in group `name`.
    #[must_use]
    pub fn radio(name: impl Into<String>, checked: bool) -> Self {
        Self::new(Tag::Radio).with_name(name).with_checked(checked)
    }

    #[must_use]
    pub fn checkbox(checked: bool) -> Self {
        Self::new(Tag::Checkbox).with_checked(checked)
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_tab_index(mut self, tab_index: i32) -> Self {
        self.tab_index = Some(tab_index);
        self
    }

    #[must_use]
    pub fn with_checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Focusable by script (ignores visibility, which depends on ancestors).
    pub(crate) const fn accepts_focus(&self) -> bool {
        !self.disabled && (self.tag.is_interactive() || self.tab_index.is_some())
    }

    /// Part of the sequential Tab order (ignores visibility).
    pub(crate) fn in_tab_sequence(&self) -> bool {
        self.accepts_focus() && self.tab_index.unwrap_or(0) >= 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containers_need_tabindex() {
        assert!(!ElementSpec::div().accepts_focus());
        assert!(ElementSpec::div().with_tab_index(0).accepts_focus());
        assert!(ElementSpec::div().with_tab_index(-1).accepts_focus());
        assert!(!ElementSpec::div().with_tab_index(-1).in_tab_sequence());
    }

    #[test]
    fn disabled_controls_refuse_focus() {
        assert!(ElementSpec::button().accepts_focus());
        assert!(!ElementSpec::button().disabled().accepts_focus());
        assert!(!ElementSpec::text_input().disabled().in_tab_sequence());
    }

    #[test]
    fn radio_preset_carries_group_and_state() {
        let spec = ElementSpec::radio("size", true);
        assert_eq!(spec.tag, Tag::Radio);
        assert_eq!(spec.name.as_deref(), Some("size"));
        assert!(spec.checked);
        assert_eq!(spec.tag.name(), "input");
    }
}
