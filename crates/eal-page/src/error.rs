//! Page runtime errors

use eal_a11y::A11yError;
use eal_dom::DomError;
use eal_forms::FormError;
use eal_html::HtmlError;
use eal_nav::NavError;

use crate::config::ConfigError;

/// Page error
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("missing required element: {0}")]
    MissingAnchor(String),

    #[error("no element with id {0:?}")]
    NoSuchElement(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Html(#[from] HtmlError),

    #[error(transparent)]
    Nav(#[from] NavError),

    #[error(transparent)]
    A11y(#[from] A11yError),

    #[error(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    Dom(#[from] DomError),
}

impl PageError {
    /// A page element a feature depends on is absent
    pub fn is_missing_anchor(&self) -> bool {
        matches!(
            self,
            Self::MissingAnchor(_)
                | Self::Nav(NavError::MissingAnchor(_))
                | Self::A11y(A11yError::MissingAnchor(_))
                | Self::Form(FormError::MissingAnchor(_))
        )
    }
}

pub type PageResult<T> = Result<T, PageError>;
