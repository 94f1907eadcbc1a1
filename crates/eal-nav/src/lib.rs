//! Empower Navigation
//!
//! Single-page routing over the panels of the document.
//!
//! Features:
//! - Session history with `pushState`, back, forward and `go`
//! - Route registry (route key → panel → title) and the current-route store
//! - `navigate()` with ordered panel, ARIA, history, title and focus effects

pub mod history;
pub mod routes;
pub mod navigation;

pub use history::{HistoryEntry, HistoryState, SessionHistory};
pub use routes::{Route, RouteRecord, RouteRegistry, RouteStore};
pub use navigation::{resolve_route, NavigateOptions, Navigation, NavigationController};

/// Navigation error
#[derive(Debug, thiserror::Error)]
pub enum NavError {
    #[error("unknown route: {0}")]
    UnknownRoute(String),

    #[error("missing required element: {0}")]
    MissingAnchor(String),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Dom(#[from] eal_dom::DomError),
}

pub type NavResult<T> = Result<T, NavError>;
