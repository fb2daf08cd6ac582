use thiserror::Error;

use crate::target::TargetOption;

pub type Result<T> = std::result::Result<T, TrapError>;

/// Configuration errors. All of them are fatal for the call that hit them
/// and leave the trap unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrapError {
    #[error("`{option}` refers to no known node (selector `{selector}`)")]
    SelectorMatchedNothing {
        option: TargetOption,
        selector: String,
    },

    #[error("`{option}` did not return a node")]
    ProviderReturnedNothing { option: TargetOption },

    #[error("a focus trap needs at least one focusable element")]
    NoFocusableElement,

    #[error("container selector `{selector}` matched no element")]
    ContainerNotFound { selector: String },
}
