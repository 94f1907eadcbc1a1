//! Site Configuration
//!
//! Everything the page runtime needs to find its anchors and label its
//! state. `Default` describes the Empower Ability Labs site; a TOML file can
//! override any part of it.

use std::collections::HashMap;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use eal_a11y::{FormBinding, ModalContent, StateLabels, SwitchKind};
use eal_dom::Selector;
use eal_forms::FormConfig;
use serde::Deserialize;

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("no routes configured")]
    NoRoutes,

    #[error("route {0:?} configured twice")]
    DuplicateRoute(String),

    #[error("{field}: {source}")]
    Selector {
        field: &'static str,
        #[source]
        source: eal_dom::DomError,
    },
}

/// A route key and its document title
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RouteConfig {
    pub route: String,
    pub title: String,
}

impl RouteConfig {
    fn new(route: &str, title: &str) -> Self {
        Self { route: route.into(), title: title.into() }
    }
}

/// Dialog triggers and content
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ModalConfig {
    /// Selector of every element opening the dialog
    pub triggers: String,
    pub content: ModalContent,
}

impl Default for ModalConfig {
    fn default() -> Self {
        Self {
            triggers: r#"#meet-community-btn, #interactive [class*="button-secondary"]"#.into(),
            content: ModalContent::default(),
        }
    }
}

/// Switches matched by `selector` and what they render into
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SwitchConfig {
    pub selector: String,
    #[serde(flatten)]
    pub kind: SwitchKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Title for routes without one of their own
    pub site_title: String,
    /// Routes in menu order
    pub routes: Vec<RouteConfig>,
    /// Id of the main content region
    pub main_content: String,
    pub menubar: String,
    pub menu_item_class: String,
    /// Attribute whose value names a panel's route
    pub panel_attr: String,
    /// Element receiving the current year
    pub year_selector: String,
    /// Fixed footer year; the system clock when unset
    pub year: Option<i32>,
    pub modal: ModalConfig,
    pub switches: Vec<SwitchConfig>,
    pub form: FormConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_title: "Empower Ability Labs".into(),
            routes: vec![
                RouteConfig::new("home", "Home | Empower Ability Labs"),
                RouteConfig::new("services", "Services | Empower Ability Labs"),
                RouteConfig::new("schedule", "Schedule a Call | Empower Ability Labs"),
                RouteConfig::new("interactive", "Interactive Tools | Empower Ability Labs"),
            ],
            main_content: "main-content".into(),
            menubar: r#".nav-list[role="menubar"]"#.into(),
            menu_item_class: "nav-link".into(),
            panel_attr: "data-route-panel".into(),
            year_selector: "[data-current-year]".into(),
            year: None,
            modal: ModalConfig::default(),
            switches: vec![
                SwitchConfig {
                    selector: r#".interactive-preview [role="switch"]"#.into(),
                    kind: SwitchKind::PlainToggle { labels: Some(StateLabels::default()) },
                },
                SwitchConfig {
                    selector: "#updates-switch".into(),
                    kind: SwitchKind::FormBound(FormBinding::default()),
                },
            ],
            form: FormConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(src: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(src)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let src = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&src)?;
        tracing::info!("loaded site config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.routes.is_empty() {
            return Err(ConfigError::NoRoutes);
        }
        let mut seen = HashSet::new();
        for r in &self.routes {
            if !seen.insert(r.route.as_str()) {
                return Err(ConfigError::DuplicateRoute(r.route.clone()));
            }
        }

        let selectors = [
            ("menubar", self.menubar.as_str()),
            ("year_selector", self.year_selector.as_str()),
            ("modal.triggers", self.modal.triggers.as_str()),
        ];
        let switches = self.switches.iter().map(|s| ("switches.selector", s.selector.as_str()));
        for (field, src) in selectors.into_iter().chain(switches) {
            Selector::parse(src).map_err(|source| ConfigError::Selector { field, source })?;
        }
        Ok(())
    }

    /// Route key → title
    pub fn route_titles(&self) -> HashMap<String, String> {
        self.routes.iter().map(|r| (r.route.clone(), r.title.clone())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = SiteConfig::default();
        config.validate().unwrap();
        assert_eq!(config.route_titles()["schedule"], "Schedule a Call | Empower Ability Labs");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SiteConfig::from_toml_str(r##"
            site_title = "Lab"
            year = 2024

            [[routes]]
            route = "home"
            title = "Home | Lab"

            [[switches]]
            selector = "#dark-mode"
            kind = "plain-toggle"

            [[switches]]
            selector = "#updates-switch"
            kind = "form-bound"
            hidden_field = "updates"
        "##).unwrap();

        assert_eq!(config.site_title, "Lab");
        assert_eq!(config.year, Some(2024));
        assert_eq!(config.routes.len(), 1);
        assert_eq!(config.main_content, "main-content");
        assert_eq!(config.switches[0].kind, SwitchKind::PlainToggle { labels: None });
        let SwitchKind::FormBound(binding) = &config.switches[1].kind else {
            panic!("expected form-bound switch");
        };
        assert_eq!(binding.hidden_field, "updates");
        assert_eq!(binding.image, "switch-img");
    }

    #[test]
    fn test_rejects_duplicate_route() {
        let err = SiteConfig::from_toml_str(r##"
            [[routes]]
            route = "home"
            title = "Home"

            [[routes]]
            route = "home"
            title = "Home again"
        "##).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateRoute(r) if r == "home"));
    }

    #[test]
    fn test_rejects_empty_routes() {
        assert!(matches!(SiteConfig::from_toml_str("routes = []"), Err(ConfigError::NoRoutes)));
    }

    #[test]
    fn test_rejects_bad_selector() {
        let err = SiteConfig::from_toml_str("menubar = \"ul >\"").unwrap_err();
        assert!(matches!(err, ConfigError::Selector { field: "menubar", .. }));
    }

    #[test]
    fn test_bad_toml() {
        assert!(matches!(SiteConfig::from_toml_str("routes = ["), Err(ConfigError::Toml(_))));
    }
}
