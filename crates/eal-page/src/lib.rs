//! Empower Page
//!
//! Runs the Empower Ability Labs page controllers against a loaded document:
//! routing, the roving menubar, the modal dialog, switches and the contact
//! form, driven by a run-to-completion event loop.
//!
//! # Example
//! ```rust,ignore
//! use eal_page::{Page, SiteConfig};
//!
//! let mut page = Page::load(html, "https://empower.example/#services", SiteConfig::default())?;
//! page.click(page.element("nav-schedule")?);
//! assert_eq!(page.current_route(), Some("schedule"));
//! ```

mod config;
mod error;
mod page;

pub use config::{ConfigError, ModalConfig, RouteConfig, SiteConfig, SwitchConfig};
pub use error::{PageError, PageResult};
pub use page::Page;

// Re-export the component crates for embedders
pub use eal_a11y as a11y;
pub use eal_dom as dom;
pub use eal_forms as forms;
pub use eal_nav as nav;
