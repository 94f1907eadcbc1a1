//! Roving Tabindex Menubar
//!
//! Two keyboard models share the same items. By default every item is a
//! normal tab stop. Arrow keys, Home and End switch to roving mode where
//! exactly one item carries `tabindex="0"`. Tab, or focus leaving the menubar,
//! returns to the default model; Tab itself is never intercepted.

use eal_dom::{Document, DomResult, Event, FocusChange, Key, NodeId};

use crate::aria::{role_of, AriaRole};
use crate::focus::TabIndex;
use crate::A11yError;

/// A menubar entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub element: NodeId,
    pub route: String,
    pub is_active_tab_stop: bool,
}

/// Keyboard model currently in force
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MenuMode {
    #[default]
    Sequential,
    Roving,
}

/// What a keydown inside the menubar asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuOutcome {
    /// Not a menu key; left to the browser
    Ignored,
    /// Tab pressed: tab order reset, default action left alone
    TabReset,
    /// Roving focus moved to the item at `index`
    Moved { index: usize, focus: Option<FocusChange> },
    /// Enter/Space on an item: navigate to `route`
    Activate { route: String },
}

/// Menubar with roving tabindex
#[derive(Debug, Clone)]
pub struct RovingMenu {
    menubar: NodeId,
    items: Vec<MenuItem>,
    mode: MenuMode,
}

impl RovingMenu {
    /// Collect the items below `menubar` that carry `item_class` and a
    /// `data-route`. Fails when the menubar holds no such item.
    pub fn from_document(doc: &Document, menubar: NodeId, item_class: &str) -> Result<Self, A11yError> {
        let tree = doc.tree();
        if role_of(tree, menubar) != Some(AriaRole::MenuBar) {
            tracing::warn!("menubar {} lacks role=menubar", menubar);
        }

        let items: Vec<MenuItem> = tree.find_all(menubar, |e| e.has_class(item_class))
            .into_iter()
            .filter_map(|element| {
                let route = tree.get_attr(element, "data-route")?.to_string();
                Some(MenuItem { element, route, is_active_tab_stop: false })
            })
            .collect();

        if items.is_empty() {
            return Err(A11yError::MissingAnchor(format!(".{} items with data-route", item_class)));
        }
        tracing::debug!("menubar {} has {} items", menubar, items.len());
        Ok(Self { menubar, items, mode: MenuMode::Sequential })
    }

    pub fn menubar(&self) -> NodeId {
        self.menubar
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn mode(&self) -> MenuMode {
        self.mode
    }

    /// Route of the first item, the fallback route of the site
    pub fn first_route(&self) -> &str {
        &self.items[0].route
    }

    /// Item owning `node` (the item itself or something inside it)
    pub fn item_index_for(&self, doc: &Document, node: NodeId) -> Option<usize> {
        self.items.iter().position(|it| doc.tree().contains(it.element, node))
    }

    /// Route to navigate to when `node` is activated
    pub fn route_for(&self, doc: &Document, node: NodeId) -> Option<&str> {
        self.item_index_for(doc, node).map(|i| self.items[i].route.as_str())
    }

    /// Every item back to `tabindex="0"`
    pub fn reset_tab_order(&mut self, doc: &mut Document) -> DomResult<()> {
        for item in self.items.iter_mut() {
            TabIndex::Sequential(0).apply(doc.tree_mut(), item.element)?;
            item.is_active_tab_stop = false;
        }
        self.mode = MenuMode::Sequential;
        Ok(())
    }

    /// Make `index` the sole tab stop and focus it
    pub fn set_roving(&mut self, doc: &mut Document, index: usize) -> DomResult<Option<FocusChange>> {
        for (i, item) in self.items.iter_mut().enumerate() {
            let active = i == index;
            let tab_index = if active { TabIndex::Sequential(0) } else { TabIndex::ProgrammaticOnly };
            tab_index.apply(doc.tree_mut(), item.element)?;
            item.is_active_tab_stop = active;
        }
        self.mode = MenuMode::Roving;
        Ok(self.items.get(index).and_then(|it| doc.focus(it.element)))
    }

    /// Keydown that reached the menubar
    pub fn handle_key(&mut self, doc: &mut Document, event: &mut Event) -> DomResult<MenuOutcome> {
        let Some(key) = event.keyboard().map(|k| k.key.clone()) else {
            return Ok(MenuOutcome::Ignored);
        };

        if key == Key::Tab {
            self.reset_tab_order(doc)?;
            return Ok(MenuOutcome::TabReset);
        }

        if key.is_activation() {
            let view: &Document = doc;
            let route = event.target_node()
                .and_then(|t| self.route_for(view, t))
                .map(str::to_string);
            return Ok(match route {
                Some(route) => {
                    event.prevent_default();
                    MenuOutcome::Activate { route }
                }
                None => MenuOutcome::Ignored,
            });
        }

        let len = self.items.len();
        let current = doc.active_element()
            .and_then(|a| self.items.iter().position(|it| it.element == a))
            .unwrap_or(0);
        let next = match key {
            Key::ArrowRight => (current + 1) % len,
            Key::ArrowLeft => (current + len - 1) % len,
            Key::Home => 0,
            Key::End => len - 1,
            _ => return Ok(MenuOutcome::Ignored),
        };

        event.prevent_default();
        let focus = self.set_roving(doc, next)?;
        tracing::trace!("roving focus {} -> {}", current, next);
        Ok(MenuOutcome::Moved { index: next, focus })
    }

    /// `focusout` on the menubar: leaving it restores sequential tab order
    pub fn handle_focus_out(&mut self, doc: &mut Document, related: Option<NodeId>) -> DomResult<()> {
        let stays_inside = related
            .map(|r| doc.tree().contains(self.menubar, r))
            .unwrap_or(false);
        if !stays_inside {
            self.reset_tab_order(doc)?;
        }
        Ok(())
    }

    /// `focusin` on the menubar: entering an item by Tab keeps the
    /// sequential model
    pub fn handle_focus_in(&mut self, doc: &mut Document, target: NodeId) -> DomResult<()> {
        if self.mode == MenuMode::Sequential && self.items.iter().any(|it| it.element == target) {
            self.reset_tab_order(doc)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eal_dom::{EventTarget, KeyModifiers};
    use proptest::prelude::*;

    fn menu_doc(n: usize) -> (Document, RovingMenu, NodeId) {
        let mut doc = Document::default();
        let body = doc.body();
        let ul = doc.tree.create_element("ul");
        doc.tree.set_attr(ul, "role", "menubar").unwrap();
        doc.tree.set_attr(ul, "class", "nav-list").unwrap();
        doc.tree.append_child(body, ul).unwrap();
        for i in 0..n {
            let a = doc.tree.create_element("a");
            doc.tree.set_attr(a, "class", "nav-link").unwrap();
            doc.tree.set_attr(a, "href", &format!("#r{}", i)).unwrap();
            doc.tree.set_attr(a, "data-route", &format!("r{}", i)).unwrap();
            doc.tree.append_child(ul, a).unwrap();
        }
        let outside = doc.tree.create_element("button");
        doc.tree.append_child(body, outside).unwrap();

        let mut menu = RovingMenu::from_document(&doc, ul, "nav-link").unwrap();
        menu.reset_tab_order(&mut doc).unwrap();
        (doc, menu, outside)
    }

    fn press(menu: &mut RovingMenu, doc: &mut Document, key: Key) -> (MenuOutcome, bool) {
        let target = doc.active_element().map(EventTarget::Node).unwrap_or(EventTarget::Document);
        let mut ev = Event::key_down(target, key, KeyModifiers::NONE);
        let outcome = menu.handle_key(doc, &mut ev).unwrap();
        (outcome, ev.is_default_prevented())
    }

    fn tabindexes(doc: &Document, menu: &RovingMenu) -> Vec<String> {
        menu.items().iter()
            .map(|it| doc.tree().get_attr(it.element, "tabindex").unwrap_or("").to_string())
            .collect()
    }

    #[test]
    fn test_empty_menu_is_error() {
        let mut doc = Document::default();
        let ul = doc.tree.create_element("ul");
        let body = doc.body();
        doc.tree.append_child(body, ul).unwrap();
        assert!(matches!(
            RovingMenu::from_document(&doc, ul, "nav-link"),
            Err(A11yError::MissingAnchor(_))
        ));
    }

    #[test]
    fn test_arrow_right_wraps() {
        let (mut doc, mut menu, _) = menu_doc(4);
        let last = menu.items()[3].element;
        doc.focus(last);
        let (outcome, prevented) = press(&mut menu, &mut doc, Key::ArrowRight);
        assert!(matches!(outcome, MenuOutcome::Moved { index: 0, .. }));
        assert!(prevented);
        assert_eq!(doc.active_element(), Some(menu.items()[0].element));
        assert_eq!(tabindexes(&doc, &menu), vec!["0", "-1", "-1", "-1"]);
        assert_eq!(menu.mode(), MenuMode::Roving);
    }

    #[test]
    fn test_arrow_left_wraps() {
        let (mut doc, mut menu, _) = menu_doc(4);
        doc.focus(menu.items()[0].element);
        press(&mut menu, &mut doc, Key::ArrowLeft);
        assert_eq!(doc.active_element(), Some(menu.items()[3].element));
    }

    #[test]
    fn test_no_focused_item_treats_first_as_current() {
        let (mut doc, mut menu, _) = menu_doc(4);
        let (outcome, _) = press(&mut menu, &mut doc, Key::ArrowRight);
        assert!(matches!(outcome, MenuOutcome::Moved { index: 1, .. }));
    }

    #[test]
    fn test_tab_resets_and_is_not_prevented() {
        let (mut doc, mut menu, _) = menu_doc(4);
        doc.focus(menu.items()[1].element);
        press(&mut menu, &mut doc, Key::ArrowRight);
        let (outcome, prevented) = press(&mut menu, &mut doc, Key::Tab);
        assert_eq!(outcome, MenuOutcome::TabReset);
        assert!(!prevented);
        assert_eq!(tabindexes(&doc, &menu), vec!["0"; 4]);
        assert_eq!(menu.mode(), MenuMode::Sequential);
        assert!(menu.items().iter().all(|it| !it.is_active_tab_stop));
    }

    #[test]
    fn test_focus_out_of_menu_resets() {
        let (mut doc, mut menu, outside) = menu_doc(3);
        doc.focus(menu.items()[0].element);
        press(&mut menu, &mut doc, Key::End);
        menu.handle_focus_out(&mut doc, Some(menu.items()[1].element)).unwrap();
        assert_eq!(menu.mode(), MenuMode::Roving);
        menu.handle_focus_out(&mut doc, Some(outside)).unwrap();
        assert_eq!(menu.mode(), MenuMode::Sequential);
        assert_eq!(tabindexes(&doc, &menu), vec!["0"; 3]);
    }

    #[test]
    fn test_enter_and_space_activate() {
        let (mut doc, mut menu, _) = menu_doc(3);
        doc.focus(menu.items()[2].element);
        for key in [Key::Enter, Key::Space] {
            let (outcome, prevented) = press(&mut menu, &mut doc, key);
            assert_eq!(outcome, MenuOutcome::Activate { route: "r2".into() });
            assert!(prevented);
        }
    }

    #[test]
    fn test_other_keys_ignored() {
        let (mut doc, mut menu, _) = menu_doc(3);
        let (outcome, prevented) = press(&mut menu, &mut doc, Key::ArrowDown);
        assert_eq!(outcome, MenuOutcome::Ignored);
        assert!(!prevented);
    }

    proptest! {
        #[test]
        fn prop_home_end_land_on_ends(n in 1usize..8, start in 0usize..8) {
            let (mut doc, mut menu, _) = menu_doc(n);
            doc.focus(menu.items()[start % n].element);
            press(&mut menu, &mut doc, Key::Home);
            prop_assert_eq!(doc.active_element(), Some(menu.items()[0].element));

            doc.focus(menu.items()[start % n].element);
            press(&mut menu, &mut doc, Key::End);
            prop_assert_eq!(doc.active_element(), Some(menu.items()[n - 1].element));
        }

        #[test]
        fn prop_exactly_one_tab_stop_in_roving_mode(
            n in 1usize..8,
            keys in proptest::collection::vec(0u8..4, 1..20),
        ) {
            let (mut doc, mut menu, _) = menu_doc(n);
            for k in keys {
                let key = match k {
                    0 => Key::ArrowRight,
                    1 => Key::ArrowLeft,
                    2 => Key::Home,
                    _ => Key::End,
                };
                press(&mut menu, &mut doc, key);
                let stops = tabindexes(&doc, &menu).iter().filter(|t| *t == "0").count();
                prop_assert_eq!(stops, 1);
                prop_assert_eq!(menu.items().iter().filter(|it| it.is_active_tab_stop).count(), 1);
            }
        }
    }
}
