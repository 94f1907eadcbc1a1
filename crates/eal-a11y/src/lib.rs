//! Empower Accessibility
//!
//! Keyboard and screen-reader behaviour of the page widgets.
//!
//! Features:
//! - ARIA roles and the attribute contract the widgets maintain
//! - Focusable-element queries and scoped heading focus
//! - Roving-tabindex menubar
//! - Focus-trapping modal dialog
//! - Toggle switches

pub mod aria;
pub mod focus;
pub mod roving;
pub mod modal;
pub mod switch;

pub use aria::AriaRole;
pub use focus::{FocusQuery, TabIndex};
pub use roving::{MenuItem, MenuMode, MenuOutcome, RovingMenu};
pub use modal::{ModalCallbacks, ModalContent, ModalController, ModalSession};
pub use switch::{FormBinding, StateLabels, SwitchComponent, SwitchKind};

/// Accessibility error
#[derive(Debug, thiserror::Error)]
pub enum A11yError {
    #[error("missing required element: {0}")]
    MissingAnchor(String),

    #[error(transparent)]
    Dom(#[from] eal_dom::DomError),
}
