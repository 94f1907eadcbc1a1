//! Routes
//!
//! Route keys, the panels they show and the titles they set, plus the store
//! holding the current route.

use std::collections::HashMap;

use eal_dom::{Document, NodeId};

use crate::{NavError, NavResult};

/// One route: key, panel element and document title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub key: String,
    pub panel: NodeId,
    pub title: String,
}

/// Route registry, read-only after construction
#[derive(Debug, Clone)]
pub struct RouteRegistry {
    routes: Vec<Route>,
    default_title: String,
}

impl RouteRegistry {
    /// Collect every element carrying `panel_attr`; its value is the route
    /// key. Titles come from `titles`, falling back to `default_title`.
    pub fn from_document(
        doc: &Document,
        panel_attr: &str,
        titles: &HashMap<String, String>,
        default_title: &str,
    ) -> NavResult<Self> {
        let tree = doc.tree();
        let routes: Vec<Route> = tree.find_all(NodeId::ROOT, |e| e.has_attr(panel_attr))
            .into_iter()
            .filter_map(|panel| {
                let key = tree.get_attr(panel, panel_attr)?.to_string();
                let title = titles.get(&key).cloned().unwrap_or_else(|| default_title.to_string());
                Some(Route { key, panel, title })
            })
            .collect();

        if routes.is_empty() {
            return Err(NavError::MissingAnchor(format!("[{}] panels", panel_attr)));
        }
        tracing::debug!("{} routes registered", routes.len());
        Ok(Self { routes, default_title: default_title.to_string() })
    }

    pub fn get(&self, key: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Title for `key`: its registered title, or the site default
    pub fn title_for(&self, key: &str) -> &str {
        self.get(key).map(|r| r.title.as_str()).unwrap_or(&self.default_title)
    }

    pub fn default_title(&self) -> &str {
        &self.default_title
    }
}

/// A navigation recorded in history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRecord {
    pub route: String,
    pub title: String,
}

/// Current route and the entries the router pushed
#[derive(Debug, Clone, Default)]
pub struct RouteStore {
    current: Option<String>,
    history_entries: Vec<RouteRecord>,
}

impl RouteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn history_entries(&self) -> &[RouteRecord] {
        &self.history_entries
    }

    pub(crate) fn set_current(&mut self, route: &str) {
        self.current = Some(route.to_string());
    }

    pub(crate) fn record(&mut self, route: &str, title: &str) {
        self.history_entries.push(RouteRecord { route: route.to_string(), title: title.to_string() });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARKUP: &str = r#"
        <main id="main-content">
          <section data-route-panel="home"><h1>Home</h1></section>
          <section data-route-panel="services" hidden><h2>Services</h2></section>
        </main>"#;

    #[test]
    fn test_registry_from_panels() {
        let doc = eal_html::parse(MARKUP, "https://example.com/").unwrap();
        let titles = HashMap::from([("home".to_string(), "Home | Empower Ability Labs".to_string())]);
        let registry = RouteRegistry::from_document(&doc, "data-route-panel", &titles, "Empower Ability Labs").unwrap();

        assert_eq!(registry.routes().len(), 2);
        assert!(registry.contains("services"));
        assert!(!registry.contains("contact"));
        assert_eq!(registry.title_for("home"), "Home | Empower Ability Labs");
        assert_eq!(registry.title_for("services"), "Empower Ability Labs");
        assert_eq!(registry.title_for("contact"), "Empower Ability Labs");
    }

    #[test]
    fn test_no_panels_is_missing_anchor() {
        let doc = eal_html::parse("<main></main>", "https://example.com/").unwrap();
        let err = RouteRegistry::from_document(&doc, "data-route-panel", &HashMap::new(), "x").unwrap_err();
        assert!(matches!(err, NavError::MissingAnchor(_)));
    }

    #[test]
    fn test_store_records() {
        let mut store = RouteStore::new();
        assert_eq!(store.current(), None);
        store.set_current("home");
        store.record("home", "Home");
        assert_eq!(store.current(), Some("home"));
        assert_eq!(store.history_entries(), &[RouteRecord { route: "home".into(), title: "Home".into() }]);
    }
}
