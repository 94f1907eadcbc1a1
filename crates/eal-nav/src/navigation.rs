//! Navigation Controller
//!
//! `navigate()` keeps the visible panel, `aria-current`, history, document
//! title and keyboard focus consistent. Its effects always run in this order:
//!
//! 1. only the target panel is rendered
//! 2. `aria-current="page"` on the matching menu items
//! 3. history entry pushed (user navigation only)
//! 4. document title
//! 5. focus on the panel heading, or the main content region

use std::collections::HashMap;

use eal_a11y::aria::ARIA_CURRENT;
use eal_a11y::{FocusQuery, MenuItem};
use eal_dom::{Document, FocusChange, NodeId};

use crate::history::{fragment_of, HistoryState, SessionHistory};
use crate::routes::{RouteRegistry, RouteStore};
use crate::{NavError, NavResult};

/// How a navigation was caused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigateOptions {
    pub update_history: bool,
    pub move_focus: bool,
}

impl NavigateOptions {
    /// Menu click or keyboard activation
    pub const USER: Self = Self { update_history: true, move_focus: true };
    /// Back/forward
    pub const HISTORY: Self = Self { update_history: false, move_focus: true };
    /// First route at page load
    pub const INITIAL: Self = Self { update_history: false, move_focus: false };
}

/// Result of a completed navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub route: String,
    pub pushed: bool,
    pub focus: Option<FocusChange>,
}

/// Pick the route to show: the history state, else the URL fragment, else
/// the fallback (first menu route)
pub fn resolve_route(state: Option<&str>, fragment: Option<&str>, fallback: &str) -> String {
    state.or(fragment.filter(|f| !f.is_empty()))
        .unwrap_or(fallback)
        .to_string()
}

/// Route → panel → title, and the focus policy
#[derive(Debug, Clone)]
pub struct NavigationController {
    registry: RouteRegistry,
    store: RouteStore,
    main_content: NodeId,
}

impl NavigationController {
    pub fn new(registry: RouteRegistry, main_content: NodeId) -> Self {
        Self { registry, store: RouteStore::new(), main_content }
    }

    /// Locate the main content region and the route panels
    pub fn from_document(
        doc: &Document,
        main_content_id: &str,
        panel_attr: &str,
        titles: &HashMap<String, String>,
        default_title: &str,
    ) -> NavResult<Self> {
        let main = doc.get_element_by_id(main_content_id)
            .ok_or_else(|| NavError::MissingAnchor(format!("#{}", main_content_id)))?;
        let registry = RouteRegistry::from_document(doc, panel_attr, titles, default_title)?;
        Ok(Self::new(registry, main))
    }

    pub fn registry(&self) -> &RouteRegistry {
        &self.registry
    }

    pub fn store(&self) -> &RouteStore {
        &self.store
    }

    pub fn current_route(&self) -> Option<&str> {
        self.store.current()
    }

    pub fn main_content(&self) -> NodeId {
        self.main_content
    }

    /// Route for the initial load: URL fragment, else `fallback`.
    ///
    /// A fragment naming no registered panel (a skip link such as
    /// `#main-content`) also resolves to `fallback`, so the first render
    /// always shows exactly one panel.
    pub fn initial_route(&self, doc: &Document, fallback: &str) -> String {
        let route = resolve_route(None, fragment_of(doc.url()).as_deref(), fallback);
        if self.registry.contains(&route) {
            return route;
        }
        tracing::warn!("initial route {:?} is not registered, showing {:?}", route, fallback);
        fallback.to_string()
    }

    /// Route for a `popstate`: event state, else URL fragment, else `fallback`
    pub fn popstate_route(&self, doc: &Document, state: Option<&str>, fallback: &str) -> String {
        resolve_route(state, fragment_of(doc.url()).as_deref(), fallback)
    }

    /// Show `route`. An unknown route changes nothing and is reported as
    /// [`NavError::UnknownRoute`].
    pub fn navigate(
        &mut self,
        doc: &mut Document,
        history: &mut SessionHistory,
        items: &[MenuItem],
        route: &str,
        options: NavigateOptions,
    ) -> NavResult<Navigation> {
        let Some(target) = self.registry.get(route).cloned() else {
            return Err(NavError::UnknownRoute(route.to_string()));
        };
        tracing::debug!("navigate to {} ({:?})", route, options);

        // 1. Panel visibility
        for panel in self.registry.routes() {
            let tree = doc.tree_mut();
            if panel.panel == target.panel {
                tree.remove_attr(panel.panel, "hidden")?;
                tree.set_style_property(panel.panel, "display", "")?;
            } else {
                tree.set_attr(panel.panel, "hidden", "true")?;
                tree.set_style_property(panel.panel, "display", "none")?;
            }
        }
        self.store.set_current(route);

        // 2. Menu state; tab order belongs to the menu
        for item in items {
            if item.route == route {
                doc.tree_mut().set_attr(item.element, ARIA_CURRENT, "page")?;
            } else {
                doc.tree_mut().remove_attr(item.element, ARIA_CURRENT)?;
            }
        }

        // 3. History
        if options.update_history {
            history.push_state(
                Some(HistoryState { route: route.to_string() }),
                &target.title,
                &format!("#{}", route),
            )?;
            doc.set_url(history.current().url.as_str());
            self.store.record(route, &target.title);
        }

        // 4. Title
        doc.set_title(&target.title);

        // 5. Focus
        let focus = if options.move_focus {
            let heading = FocusQuery::first_heading(doc, target.panel);
            FocusQuery::focus_or(doc, heading, self.main_content)
        } else {
            None
        };

        Ok(Navigation { route: route.to_string(), pushed: options.update_history, focus })
    }
}
