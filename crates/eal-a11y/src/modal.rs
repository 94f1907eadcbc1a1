//! Modal Dialog
//!
//! A single reusable dialog shared by every trigger on the page. The markup
//! is built on the first open and kept for later opens. While open the
//! background is hidden from assistive technology, Escape and overlay clicks
//! close it, and Tab cycles inside the dialog.

use eal_dom::{
    CallbackId, Document, DomResult, DomTree, Event, EventListener, EventTarget, EventType,
    FocusChange, Key, ListenerRegistry, NodeId,
};
use serde::Deserialize;

use crate::aria::{self, AriaRole, ARIA_HIDDEN, ARIA_LABEL, ARIA_LABELLEDBY, ARIA_MODAL};
use crate::focus::{FocusQuery, TabIndex};

/// Text and class names of the dialog
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ModalContent {
    pub overlay_class: String,
    pub dialog_class: String,
    pub content_class: String,
    pub close_class: String,
    pub heading_id: String,
    pub heading: String,
    pub body: String,
    pub items: Vec<String>,
    pub close_label: String,
    pub close_text: String,
}

impl Default for ModalContent {
    fn default() -> Self {
        Self {
            overlay_class: "empower-modal-overlay".into(),
            dialog_class: "empower-modal".into(),
            content_class: "empower-modal__content".into(),
            close_class: "empower-modal__close".into(),
            heading_id: "empower-modal-heading".into(),
            heading: "Community Steering Committee".into(),
            body: "We get an aha! moments from product managers who try our services for the \
                   first time. We offered many lab days, workshops and offered usability testing \
                   services to many companies and organizations including:"
                .into(),
            items: [
                "McGill University",
                "Walmart.ca",
                "Apple.ca",
                "Google.ca",
                "Government of Canada",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            close_label: "Close interactive modal".into(),
            close_text: "Close".into(),
        }
    }
}

/// Callback ids the session registers while open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModalCallbacks {
    pub overlay_click: CallbackId,
    pub key_down: CallbackId,
    pub close_click: CallbackId,
}

/// Open/closed state and where focus goes back to.
///
/// `return_target` is only an id: if that element is gone by the time the
/// dialog closes, restoring focus quietly does nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModalSession {
    pub return_target: Option<NodeId>,
    pub is_open: bool,
}

#[derive(Debug, Clone, Copy)]
struct ModalDom {
    overlay: NodeId,
    dialog: NodeId,
    close_button: NodeId,
    heading: NodeId,
}

/// Singleton modal controller
#[derive(Debug, Clone)]
pub struct ModalController {
    content: ModalContent,
    main_content_id: String,
    callbacks: ModalCallbacks,
    dom: Option<ModalDom>,
    session: ModalSession,
}

impl ModalController {
    pub fn new(content: ModalContent, main_content_id: &str, callbacks: ModalCallbacks) -> Self {
        Self {
            content,
            main_content_id: main_content_id.to_string(),
            callbacks,
            dom: None,
            session: ModalSession::default(),
        }
    }

    pub fn session(&self) -> ModalSession {
        self.session
    }

    pub fn is_open(&self) -> bool {
        self.session.is_open
    }

    pub fn callbacks(&self) -> ModalCallbacks {
        self.callbacks
    }

    /// Overlay element, once built
    pub fn overlay(&self) -> Option<NodeId> {
        self.dom.map(|d| d.overlay)
    }

    /// Dialog element, once built
    pub fn dialog(&self) -> Option<NodeId> {
        self.dom.map(|d| d.dialog)
    }

    pub fn close_button(&self) -> Option<NodeId> {
        self.dom.map(|d| d.close_button)
    }

    fn ensure_dom(&mut self, tree: &mut DomTree) -> DomResult<ModalDom> {
        if let Some(dom) = self.dom {
            return Ok(dom);
        }
        let c = &self.content;

        let overlay = tree.create_element("div");
        tree.set_attr(overlay, "class", &c.overlay_class)?;
        aria::set_role(tree, overlay, AriaRole::Presentation)?;

        let dialog = tree.create_element("div");
        tree.set_attr(dialog, "class", &c.dialog_class)?;
        aria::set_role(tree, dialog, AriaRole::Dialog)?;
        aria::set_bool(tree, dialog, ARIA_MODAL, true)?;
        tree.set_attr(dialog, ARIA_LABELLEDBY, &c.heading_id)?;
        TabIndex::ProgrammaticOnly.apply(tree, dialog)?;

        let content = tree.create_element("div");
        tree.set_attr(content, "class", &c.content_class)?;

        let close_button = tree.create_element("button");
        tree.set_attr(close_button, "class", &c.close_class)?;
        tree.set_attr(close_button, ARIA_LABEL, &c.close_label)?;
        tree.set_attr(close_button, "type", "button")?;
        tree.set_text_content(close_button, &c.close_text)?;

        let heading = tree.create_element("h2");
        tree.set_attr(heading, "id", &c.heading_id)?;
        tree.set_text_content(heading, &c.heading)?;

        let para = tree.create_element("p");
        tree.set_text_content(para, &c.body)?;

        let list = tree.create_element("ul");
        for item in &c.items {
            let li = tree.create_element("li");
            tree.set_text_content(li, item)?;
            tree.append_child(list, li)?;
        }

        for child in [close_button, heading, para, list] {
            tree.append_child(content, child)?;
        }
        tree.append_child(dialog, content)?;
        tree.append_child(overlay, dialog)?;

        let dom = ModalDom { overlay, dialog, close_button, heading };
        self.dom = Some(dom);
        tracing::debug!("modal built: overlay {}, dialog {}", overlay, dialog);
        Ok(dom)
    }

    /// Open the dialog. Opening an open dialog does nothing.
    pub fn open(&mut self, doc: &mut Document, listeners: &mut ListenerRegistry) -> DomResult<Option<FocusChange>> {
        if self.session.is_open {
            return Ok(None);
        }
        self.session.return_target = doc.active_element();

        let dom = self.ensure_dom(doc.tree_mut())?;
        let body = doc.body();
        doc.tree_mut().append_child(body, dom.overlay)?;

        if let Some(main) = doc.get_element_by_id(&self.main_content_id) {
            aria::set_bool(doc.tree_mut(), main, ARIA_HIDDEN, true)?;
        }

        let mut change = FocusQuery::focus_scoped(doc, dom.heading);
        if doc.active_element() != Some(dom.heading) {
            change = match FocusQuery::focusable_within(doc, dom.dialog).first().copied() {
                Some(first) => doc.focus(first),
                None => FocusQuery::focus_scoped(doc, dom.dialog),
            };
        }

        let cb = self.callbacks;
        listeners.add(EventTarget::Node(dom.overlay), EventListener::new(EventType::Click, cb.overlay_click));
        listeners.add(EventTarget::Document, EventListener::new(EventType::KeyDown, cb.key_down));
        listeners.add(EventTarget::Node(dom.close_button), EventListener::new(EventType::Click, cb.close_click));

        self.session.is_open = true;
        tracing::debug!("modal opened, return target {:?}", self.session.return_target);
        Ok(change)
    }

    /// Close the dialog and restore focus. Closing a closed dialog does nothing.
    pub fn close(&mut self, doc: &mut Document, listeners: &mut ListenerRegistry) -> DomResult<Option<FocusChange>> {
        let Some(dom) = self.dom.filter(|_| self.session.is_open) else {
            return Ok(None);
        };

        let cb = self.callbacks;
        listeners.remove(EventTarget::Node(dom.overlay), EventType::Click, cb.overlay_click);
        listeners.remove(EventTarget::Document, EventType::KeyDown, cb.key_down);
        listeners.remove(EventTarget::Node(dom.close_button), EventType::Click, cb.close_click);

        doc.tree_mut().detach(dom.overlay);

        if let Some(main) = doc.get_element_by_id(&self.main_content_id) {
            doc.tree_mut().remove_attr(main, ARIA_HIDDEN)?;
        }

        self.session.is_open = false;
        let change = self.session.return_target.take().and_then(|t| doc.focus(t));
        tracing::debug!("modal closed, focus restored: {}", change.is_some());
        Ok(change)
    }

    /// Click on the overlay: only a click on the overlay itself closes
    pub fn handle_overlay_click(
        &mut self,
        doc: &mut Document,
        listeners: &mut ListenerRegistry,
        event: &Event,
    ) -> DomResult<Option<FocusChange>> {
        match (self.overlay(), event.target_node()) {
            (Some(overlay), Some(target)) if overlay == target => self.close(doc, listeners),
            _ => Ok(None),
        }
    }

    /// Document keydown while open: Escape closes, Tab stays inside
    pub fn handle_key(
        &mut self,
        doc: &mut Document,
        listeners: &mut ListenerRegistry,
        event: &mut Event,
    ) -> DomResult<Option<FocusChange>> {
        if !self.session.is_open {
            return Ok(None);
        }
        let Some(kb) = event.keyboard().cloned() else {
            return Ok(None);
        };
        match kb.key {
            Key::Escape => {
                event.prevent_default();
                self.close(doc, listeners)
            }
            Key::Tab => {
                event.prevent_default();
                Ok(self.trap_tab(doc, kb.modifiers.shift))
            }
            _ => Ok(None),
        }
    }

    /// Move focus to the next (or previous) focusable element of the dialog,
    /// wrapping at the ends. The set is recomputed on every call.
    fn trap_tab(&self, doc: &mut Document, reverse: bool) -> Option<FocusChange> {
        let dialog = self.dialog()?;
        let focusables = FocusQuery::focusable_within(doc, dialog);
        if focusables.is_empty() {
            tracing::trace!("focus trap: nothing focusable, Tab blocked");
            return None;
        }

        let tree = doc.tree();
        let order: Vec<NodeId> = tree.descendants(dialog).collect();
        let position = |id: NodeId| order.iter().position(|&d| d == id);
        let here = doc.active_element().and_then(position);

        let target = match here {
            Some(here) if reverse => focusables.iter().rev()
                .find(|&&f| position(f).map(|p| p < here).unwrap_or(false))
                .or(focusables.last()),
            Some(here) => focusables.iter()
                .find(|&&f| position(f).map(|p| p > here).unwrap_or(false))
                .or(focusables.first()),
            None if reverse => focusables.last(),
            None => focusables.first(),
        }
        .copied()?;

        doc.focus(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eal_dom::KeyModifiers;

    const CALLBACKS: ModalCallbacks = ModalCallbacks {
        overlay_click: CallbackId(1),
        key_down: CallbackId(2),
        close_click: CallbackId(3),
    };

    fn page() -> (Document, ListenerRegistry, ModalController, NodeId) {
        let mut doc = Document::default();
        let body = doc.body();
        let main = doc.tree.create_element("main");
        doc.tree.set_attr(main, "id", "main-content").unwrap();
        doc.tree.append_child(body, main).unwrap();
        let trigger = doc.tree.create_element("button");
        doc.tree.set_attr(trigger, "id", "meet-community-btn").unwrap();
        doc.tree.append_child(main, trigger).unwrap();
        doc.focus(trigger);

        let modal = ModalController::new(ModalContent::default(), "main-content", CALLBACKS);
        (doc, ListenerRegistry::new(), modal, trigger)
    }

    fn key(doc: &Document, k: Key, modifiers: KeyModifiers) -> Event {
        let target = doc.active_element().map(EventTarget::Node).unwrap_or(EventTarget::Document);
        Event::key_down(target, k, modifiers)
    }

    /// Dialog with extra buttons appended to its content block
    fn with_buttons(doc: &mut Document, modal: &ModalController, n: usize) -> Vec<NodeId> {
        let content = doc.tree().children(modal.dialog().unwrap()).next().unwrap();
        (0..n).map(|_| {
            let b = doc.tree.create_element("button");
            doc.tree.append_child(content, b).unwrap();
            b
        }).collect()
    }

    #[test]
    fn test_open_builds_contract() {
        let (mut doc, mut listeners, mut modal, _) = page();
        modal.open(&mut doc, &mut listeners).unwrap();

        let dialog = modal.dialog().unwrap();
        let tree = doc.tree();
        assert_eq!(tree.get_attr(modal.overlay().unwrap(), "role"), Some("presentation"));
        assert_eq!(tree.get_attr(dialog, "role"), Some("dialog"));
        assert_eq!(tree.get_attr(dialog, "aria-modal"), Some("true"));
        assert_eq!(tree.get_attr(dialog, "aria-labelledby"), Some("empower-modal-heading"));
        assert_eq!(tree.get_attr(modal.close_button().unwrap(), "aria-label"), Some("Close interactive modal"));
        assert_eq!(tree.find_all(dialog, |e| e.tag == "li").len(), 5);

        let main = doc.get_element_by_id("main-content").unwrap();
        assert_eq!(doc.tree().get_attr(main, "aria-hidden"), Some("true"));
        assert_eq!(doc.active_element(), doc.get_element_by_id("empower-modal-heading"));
        assert!(modal.is_open());
        assert_eq!(listeners.len(), 3);
    }

    #[test]
    fn test_escape_restores_focus() {
        let (mut doc, mut listeners, mut modal, trigger) = page();
        modal.open(&mut doc, &mut listeners).unwrap();

        let mut ev = key(&doc, Key::Escape, KeyModifiers::NONE);
        let change = modal.handle_key(&mut doc, &mut listeners, &mut ev).unwrap();
        assert!(ev.is_default_prevented());
        assert_eq!(change.and_then(|c| c.to), Some(trigger));
        assert_eq!(doc.active_element(), Some(trigger));
        assert!(!modal.is_open());
        assert!(listeners.is_empty());
        assert!(!doc.tree().is_connected(modal.overlay().unwrap()));
        let main = doc.get_element_by_id("main-content").unwrap();
        assert!(!doc.tree().has_attr(main, "aria-hidden"));
    }

    #[test]
    fn test_tab_wraps_both_ways() {
        let (mut doc, mut listeners, mut modal, _) = page();
        modal.open(&mut doc, &mut listeners).unwrap();
        let extra = with_buttons(&mut doc, &modal, 2);
        let close = modal.close_button().unwrap();

        doc.focus(extra[1]);
        let mut ev = key(&doc, Key::Tab, KeyModifiers::NONE);
        modal.handle_key(&mut doc, &mut listeners, &mut ev).unwrap();
        assert!(ev.is_default_prevented());
        assert_eq!(doc.active_element(), Some(close));

        let mut ev = key(&doc, Key::Tab, KeyModifiers::SHIFT);
        modal.handle_key(&mut doc, &mut listeners, &mut ev).unwrap();
        assert_eq!(doc.active_element(), Some(extra[1]));
    }

    #[test]
    fn test_tab_from_heading_moves_forward() {
        let (mut doc, mut listeners, mut modal, _) = page();
        modal.open(&mut doc, &mut listeners).unwrap();
        let extra = with_buttons(&mut doc, &modal, 1);

        let mut ev = key(&doc, Key::Tab, KeyModifiers::NONE);
        modal.handle_key(&mut doc, &mut listeners, &mut ev).unwrap();
        assert_eq!(doc.active_element(), Some(extra[0]));
    }

    #[test]
    fn test_empty_focus_set_blocks_tab() {
        let (mut doc, mut listeners, mut modal, _) = page();
        modal.open(&mut doc, &mut listeners).unwrap();
        let close = modal.close_button().unwrap();
        doc.tree.set_attr(close, "disabled", "").unwrap();
        let before = doc.active_element();

        let mut ev = key(&doc, Key::Tab, KeyModifiers::NONE);
        let change = modal.handle_key(&mut doc, &mut listeners, &mut ev).unwrap();
        assert!(ev.is_default_prevented());
        assert_eq!(change, None);
        assert_eq!(doc.active_element(), before);
    }

    #[test]
    fn test_overlay_click_only_on_overlay() {
        let (mut doc, mut listeners, mut modal, _) = page();
        modal.open(&mut doc, &mut listeners).unwrap();

        let inside = Event::click(modal.dialog().unwrap());
        modal.handle_overlay_click(&mut doc, &mut listeners, &inside).unwrap();
        assert!(modal.is_open());

        let outside = Event::click(modal.overlay().unwrap());
        modal.handle_overlay_click(&mut doc, &mut listeners, &outside).unwrap();
        assert!(!modal.is_open());
    }

    #[test]
    fn test_reopen_reuses_dom_without_double_registration() {
        let (mut doc, mut listeners, mut modal, trigger) = page();
        modal.open(&mut doc, &mut listeners).unwrap();
        let overlay = modal.overlay();
        modal.open(&mut doc, &mut listeners).unwrap();
        assert_eq!(listeners.count_for(CALLBACKS.key_down), 1);

        modal.close(&mut doc, &mut listeners).unwrap();
        assert_eq!(modal.close(&mut doc, &mut listeners).unwrap(), None);
        assert_eq!(doc.active_element(), Some(trigger));

        modal.open(&mut doc, &mut listeners).unwrap();
        assert_eq!(modal.overlay(), overlay);
        assert_eq!(listeners.len(), 3);
        let body = doc.body();
        assert_eq!(doc.tree().find_all(body, |e| e.has_class("empower-modal-overlay")).len(), 1);
    }

    #[test]
    fn test_detached_return_target_is_ignored() {
        let (mut doc, mut listeners, mut modal, trigger) = page();
        modal.open(&mut doc, &mut listeners).unwrap();
        doc.tree.detach(trigger);
        let change = modal.close(&mut doc, &mut listeners).unwrap();
        assert_eq!(change, None);
        assert!(!modal.is_open());
    }
}
