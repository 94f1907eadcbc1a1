//! Empower Forms
//!
//! The "Schedule a Call" form: per-field and whole-form validation, error
//! rendering with `aria-invalid`, the status live region, and checkbox
//! controlled disclosure of optional fields.

pub mod rules;
pub mod validator;
pub mod disclosure;
pub mod controller;

pub use rules::{DisclosureConfig, FieldRule, FormConfig, RuleKind, StatusMessages};
pub use validator::{FieldError, FormValidator, ValidationFailure, Validator};
pub use disclosure::Disclosure;
pub use controller::{FormController, SubmitOutcome};

/// Form error
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("missing required element: {0}")]
    MissingAnchor(String),

    #[error("invalid validation pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error(transparent)]
    Dom(#[from] eal_dom::DomError),
}
