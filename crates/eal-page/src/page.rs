//! Page - A loaded page and its event loop
//!
//! Events are queued and dispatched one at a time. Anything a handler
//! causes (focus moving, a synthetic click, the `popstate` after `back()`)
//! goes to the back of the queue, so every handler, including a whole
//! `navigate()`, runs to completion before the next event is seen.

use std::collections::VecDeque;

use chrono::Datelike;
use eal_a11y::{MenuOutcome, ModalCallbacks, ModalController, RovingMenu, SwitchComponent, SwitchKind};
use eal_dom::{
    CallbackId, Document, Event, EventKind, EventListener, EventTarget, EventType, FocusChange,
    FocusEventData, Key, KeyModifiers, ListenerRegistry, NodeId, SwitchDetail,
};
use eal_forms::{FormController, SubmitOutcome};
use eal_nav::{NavError, NavigateOptions, NavigationController, SessionHistory};

use crate::config::SiteConfig;
use crate::error::{PageError, PageResult};

/// Events handled in one turn before the loop gives up
const MAX_EVENTS_PER_TURN: usize = 10_000;

/// What a registered callback does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Callback {
    MenuClick,
    MenuKeyDown,
    MenuFocusIn,
    MenuFocusOut,
    PopState,
    ModalTrigger,
    ModalTriggerKey,
    ModalOverlayClick,
    ModalKeyDown,
    ModalClose,
    SwitchClick(usize),
    SwitchKey(usize),
    FormSubmit,
    FieldBlur,
    ControlChange,
}

#[derive(Debug)]
struct Router {
    menu: RovingMenu,
    nav: NavigationController,
}

type SwitchSubscriber = Box<dyn FnMut(NodeId, SwitchDetail)>;

/// A loaded page
pub struct Page {
    doc: Document,
    history: SessionHistory,
    config: SiteConfig,
    listeners: ListenerRegistry,
    callbacks: Vec<Callback>,
    queue: VecDeque<Event>,
    router: Option<Router>,
    modal: Option<ModalController>,
    switches: Vec<SwitchComponent>,
    form: Option<FormController>,
    switch_log: Vec<(NodeId, SwitchDetail)>,
    switch_subscribers: Vec<SwitchSubscriber>,
}

impl Page {
    /// Parse `html` as the page at `url` and bring up every component.
    ///
    /// Components start in a fixed order: footer year, menubar and routing,
    /// modal, switches, form. A component whose elements are missing stays
    /// inactive without affecting the others.
    pub fn load(html: &str, url: &str, config: SiteConfig) -> PageResult<Self> {
        config.validate()?;
        let doc = eal_html::parse(html, url)?;
        let history = SessionHistory::new(url)?;

        let mut page = Self {
            doc,
            history,
            config,
            listeners: ListenerRegistry::new(),
            callbacks: Vec::new(),
            queue: VecDeque::new(),
            router: None,
            modal: None,
            switches: Vec::new(),
            form: None,
            switch_log: Vec::new(),
            switch_subscribers: Vec::new(),
        };

        page.init_step("footer year", Self::init_footer_year);
        page.init_step("menubar and routing", Self::init_routing);
        page.init_step("modal", Self::init_modal);
        page.init_step("switches", Self::init_switches);
        page.init_step("form", Self::init_form);
        page.run();

        tracing::info!("page loaded: {} ({})", page.doc.title(), page.doc.url());
        Ok(page)
    }

    fn init_step(&mut self, name: &str, step: fn(&mut Self) -> PageResult<()>) {
        match step(self) {
            Ok(()) => tracing::info!("{} initialized", name),
            Err(e) if e.is_missing_anchor() => tracing::warn!("{} skipped: {}", name, e),
            Err(e) => tracing::error!("{} failed to initialize: {}", name, e),
        }
    }

    // === Initialization ===

    fn init_footer_year(&mut self) -> PageResult<()> {
        let Some(span) = self.doc.query_selector(&self.config.year_selector)? else {
            tracing::debug!("no {} element", self.config.year_selector);
            return Ok(());
        };
        let year = self.config.year.unwrap_or_else(|| chrono::Local::now().year());
        self.doc.tree_mut().set_text_content(span, &year.to_string())?;
        Ok(())
    }

    fn init_routing(&mut self) -> PageResult<()> {
        let menubar = self.doc.query_selector(&self.config.menubar)?
            .ok_or_else(|| PageError::MissingAnchor(self.config.menubar.clone()))?;
        let mut menu = RovingMenu::from_document(&self.doc, menubar, &self.config.menu_item_class)?;
        let mut nav = NavigationController::from_document(
            &self.doc,
            &self.config.main_content,
            &self.config.panel_attr,
            &self.config.route_titles(),
            &self.config.site_title,
        )?;

        for item in menu.items() {
            self.register(EventTarget::Node(item.element), EventType::Click, Callback::MenuClick);
        }
        let bar = EventTarget::Node(menubar);
        self.register(bar, EventType::KeyDown, Callback::MenuKeyDown);
        self.register(bar, EventType::FocusIn, Callback::MenuFocusIn);
        self.register(bar, EventType::FocusOut, Callback::MenuFocusOut);
        self.register(EventTarget::Window, EventType::PopState, Callback::PopState);

        menu.reset_tab_order(&mut self.doc)?;

        let route = nav.initial_route(&self.doc, menu.first_route());
        match nav.navigate(&mut self.doc, &mut self.history, menu.items(), &route, NavigateOptions::INITIAL) {
            Ok(_) => {}
            Err(NavError::UnknownRoute(r)) => tracing::warn!("first menu route {:?} has no panel", r),
            Err(e) => return Err(e.into()),
        }

        self.router = Some(Router { menu, nav });
        Ok(())
    }

    fn init_modal(&mut self) -> PageResult<()> {
        let triggers = self.doc.query_selector_all(&self.config.modal.triggers)?;
        if triggers.is_empty() {
            return Err(PageError::MissingAnchor(self.config.modal.triggers.clone()));
        }

        let callbacks = ModalCallbacks {
            overlay_click: self.allocate(Callback::ModalOverlayClick),
            key_down: self.allocate(Callback::ModalKeyDown),
            close_click: self.allocate(Callback::ModalClose),
        };
        for trigger in triggers {
            self.register(EventTarget::Node(trigger), EventType::Click, Callback::ModalTrigger);
            self.register(EventTarget::Node(trigger), EventType::KeyDown, Callback::ModalTriggerKey);
        }

        let content = self.config.modal.content.clone();
        self.modal = Some(ModalController::new(content, &self.config.main_content, callbacks));
        Ok(())
    }

    fn init_switches(&mut self) -> PageResult<()> {
        let configs = self.config.switches.clone();
        for config in configs {
            let elements = self.doc.query_selector_all(&config.selector)?;
            if elements.is_empty() {
                tracing::debug!("no switch matches {}", config.selector);
            }
            for element in elements {
                if self.switches.iter().any(|s| s.element() == element) {
                    continue;
                }
                let switch = SwitchComponent::init(&mut self.doc, element, config.kind.clone())?;
                let index = self.switches.len();
                self.switches.push(switch);
                self.register(EventTarget::Node(element), EventType::Click, Callback::SwitchClick(index));
                self.register(EventTarget::Node(element), EventType::KeyDown, Callback::SwitchKey(index));
            }
        }

        if self.switches.is_empty() {
            return Err(PageError::MissingAnchor("role=switch elements".into()));
        }
        Ok(())
    }

    fn init_form(&mut self) -> PageResult<()> {
        let mut form = FormController::from_document(&self.doc, self.config.form.clone())?;
        if let Some(switch) = self.switches.iter().find(|s| matches!(s.kind(), SwitchKind::FormBound(_))) {
            form = form.with_switch(switch.clone());
        }

        self.register(EventTarget::Node(form.form()), EventType::Submit, Callback::FormSubmit);
        let blur_fields: Vec<NodeId> = self.config.form.validate_on_blur.iter()
            .filter_map(|id| self.doc.get_element_by_id(id))
            .collect();
        for field in blur_fields {
            self.register(EventTarget::Node(field), EventType::Blur, Callback::FieldBlur);
        }
        let controls: Vec<NodeId> = form.disclosures().iter().map(|d| d.control()).collect();
        for control in controls {
            self.register(EventTarget::Node(control), EventType::Change, Callback::ControlChange);
        }

        self.form = Some(form);
        Ok(())
    }

    fn allocate(&mut self, callback: Callback) -> CallbackId {
        self.callbacks.push(callback);
        CallbackId(self.callbacks.len() as u32 - 1)
    }

    fn register(&mut self, target: EventTarget, event_type: EventType, callback: Callback) -> CallbackId {
        let id = self.allocate(callback);
        self.listeners.add(target, EventListener::new(event_type, id));
        id
    }

    // === Accessors ===

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn history(&self) -> &SessionHistory {
        &self.history
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    pub fn title(&self) -> &str {
        self.doc.title()
    }

    pub fn url(&self) -> &str {
        self.doc.url()
    }

    pub fn current_route(&self) -> Option<&str> {
        self.router.as_ref().and_then(|r| r.nav.current_route())
    }

    pub fn active_element(&self) -> Option<NodeId> {
        self.doc.active_element()
    }

    pub fn menu(&self) -> Option<&RovingMenu> {
        self.router.as_ref().map(|r| &r.menu)
    }

    pub fn navigation(&self) -> Option<&NavigationController> {
        self.router.as_ref().map(|r| &r.nav)
    }

    pub fn modal(&self) -> Option<&ModalController> {
        self.modal.as_ref()
    }

    pub fn is_modal_open(&self) -> bool {
        self.modal.as_ref().is_some_and(|m| m.is_open())
    }

    pub fn switches(&self) -> &[SwitchComponent] {
        &self.switches
    }

    pub fn form(&self) -> Option<&FormController> {
        self.form.as_ref()
    }

    /// Every switch notification so far, oldest first
    pub fn switch_log(&self) -> &[(NodeId, SwitchDetail)] {
        &self.switch_log
    }

    /// Element by id
    pub fn element(&self, id: &str) -> PageResult<NodeId> {
        self.doc.get_element_by_id(id).ok_or_else(|| PageError::NoSuchElement(id.to_string()))
    }

    /// Subscribe to `empower:switch` notifications
    pub fn on_switch_change(&mut self, subscriber: impl FnMut(NodeId, SwitchDetail) + 'static) {
        self.switch_subscribers.push(Box::new(subscriber));
    }

    // === Input ===

    /// Pointer click: focuses a focusable target, then clicks it
    pub fn click(&mut self, node: NodeId) {
        if self.doc.is_focusable(node) {
            let change = self.doc.focus(node);
            self.queue_focus_events(change);
        }
        self.queue.push_back(Event::click(node));
        self.run();
    }

    /// Key press delivered to the focused element, or the body
    pub fn key_down(&mut self, key: Key, modifiers: KeyModifiers) {
        let target = self.doc.active_element().unwrap_or_else(|| self.doc.body());
        self.queue.push_back(Event::key_down(EventTarget::Node(target), key, modifiers));
        self.run();
    }

    /// Browser back button
    pub fn back(&mut self) -> bool {
        self.traverse(-1)
    }

    /// Browser forward button
    pub fn forward(&mut self) -> bool {
        self.traverse(1)
    }

    /// `history.go(delta)`; false when there is no such entry
    pub fn go(&mut self, delta: i32) -> bool {
        self.traverse(delta)
    }

    fn traverse(&mut self, delta: i32) -> bool {
        let Some(entry) = self.history.go(delta) else {
            return false;
        };
        let url = entry.url.to_string();
        let state = entry.route().map(str::to_string);
        self.doc.set_url(&url);
        self.queue.push_back(Event::pop_state(state));
        self.run();
        true
    }

    /// Replace the value of a text control
    pub fn type_text(&mut self, node: NodeId, text: &str) -> PageResult<()> {
        self.doc.tree_mut().set_value(node, text)?;
        Ok(())
    }

    /// Check or uncheck a checkbox and fire `change`
    pub fn set_checked(&mut self, node: NodeId, checked: bool) -> PageResult<()> {
        self.doc.tree_mut().set_checked(node, checked)?;
        self.queue.push_back(Event::new(EventTarget::Node(node), EventKind::Change));
        self.run();
        Ok(())
    }

    /// Move focus away from `node`
    pub fn blur(&mut self, node: NodeId) {
        if self.doc.active_element() == Some(node) {
            let change = self.doc.blur();
            self.queue_focus_events(change);
        } else {
            self.queue.push_back(Event::new(EventTarget::Node(node), EventKind::Blur));
        }
        self.run();
    }

    /// `form.requestSubmit()`
    pub fn submit(&mut self, form: NodeId) {
        self.queue.push_back(Event::new(EventTarget::Node(form), EventKind::Submit));
        self.run();
    }

    // === Event loop ===

    /// Drain the event queue
    fn run(&mut self) {
        let mut handled = 0;
        while let Some(event) = self.queue.pop_front() {
            handled += 1;
            if handled > MAX_EVENTS_PER_TURN {
                tracing::error!("event loop exceeded {} events, dropping the rest", MAX_EVENTS_PER_TURN);
                self.queue.clear();
                break;
            }
            let event = self.dispatch(event);
            self.default_action(&event);
        }
    }

    fn dispatch(&mut self, mut event: Event) -> Event {
        let event_type = event.event_type();
        tracing::trace!("dispatch {} to {:?}", event_type.name(), event.target);
        let path = ListenerRegistry::propagation_path(self.doc.tree(), event.target, event_type);

        for current in path {
            for id in self.listeners.get(current, event_type) {
                // Listeners removed by an earlier handler of this event are skipped
                if !self.listeners.get(current, event_type).contains(&id) {
                    continue;
                }
                let Some(callback) = self.callbacks.get(id.0 as usize).copied() else {
                    continue;
                };
                if let Err(e) = self.invoke(callback, current, &mut event) {
                    tracing::error!("{:?} handler failed on {}: {}", callback, event_type.name(), e);
                }
            }
            if event.is_propagation_stopped() {
                break;
            }
        }

        if let EventKind::SwitchChange(detail) = event.kind {
            if let Some(node) = event.target_node() {
                self.switch_log.push((node, detail));
                for subscriber in self.switch_subscribers.iter_mut() {
                    subscriber(node, detail);
                }
            }
        }
        event
    }

    /// Browser behaviour for events nobody prevented
    fn default_action(&mut self, event: &Event) {
        if event.is_default_prevented() {
            return;
        }
        let Some(target) = event.target_node() else { return };
        let Some(el) = self.doc.tree().element(target) else { return };
        let tag = el.tag.clone();
        let input_type = el.input_type();

        match &event.kind {
            EventKind::KeyDown(kb) => match kb.key {
                Key::Tab if !kb.modifiers.ctrl && !kb.modifiers.alt => {
                    if let Some(next) = self.doc.next_tab_stop(kb.modifiers.shift) {
                        let change = self.doc.focus(next);
                        self.queue_focus_events(change);
                    }
                }
                Key::Enter if matches!(tag.as_str(), "a" | "button") => {
                    self.queue.push_back(Event::click(target));
                }
                Key::Space if tag == "button" => {
                    self.queue.push_back(Event::click(target));
                }
                _ => {}
            },
            EventKind::Click => {
                if tag == "input" && matches!(input_type.as_str(), "checkbox" | "radio") {
                    let checked = self.doc.tree().element(target).map(|e| e.checked()).unwrap_or(false);
                    if self.doc.tree_mut().set_checked(target, !checked || input_type == "radio").is_ok() {
                        self.queue.push_back(Event::new(EventTarget::Node(target), EventKind::Change));
                    }
                } else if let Some(form) = self.submitter_form(target) {
                    self.queue.push_back(Event::new(EventTarget::Node(form), EventKind::Submit));
                }
            }
            _ => {}
        }
    }

    /// Form submitted by clicking `node`, when it is a submit button
    fn submitter_form(&self, node: NodeId) -> Option<NodeId> {
        let tree = self.doc.tree();
        let el = tree.element(node)?;
        let is_submit = match el.tag.as_str() {
            "button" => el.get_attr("type").is_none_or(|t| t.eq_ignore_ascii_case("submit")),
            "input" => el.input_type() == "submit",
            _ => false,
        };
        if !is_submit {
            return None;
        }
        tree.ancestors(node).find(|&a| tree.tag(a) == Some("form"))
    }

    /// Queue `blur`/`focusout` on the old element and `focusin` on the new one
    fn queue_focus_events(&mut self, change: Option<FocusChange>) {
        let Some(FocusChange { from, to }) = change else { return };
        if let Some(from) = from {
            self.queue.push_back(Event::new(EventTarget::Node(from), EventKind::Blur));
            self.queue.push_back(Event::new(
                EventTarget::Node(from),
                EventKind::FocusOut(FocusEventData { related_target: to }),
            ));
        }
        if let Some(to) = to {
            self.queue.push_back(Event::new(
                EventTarget::Node(to),
                EventKind::FocusIn(FocusEventData { related_target: from }),
            ));
        }
    }

    // === Handlers ===

    fn invoke(&mut self, callback: Callback, current: EventTarget, event: &mut Event) -> PageResult<()> {
        let current_node = match current {
            EventTarget::Node(id) => Some(id),
            _ => None,
        };

        match callback {
            Callback::MenuClick => {
                event.prevent_default();
                let route = match (&self.router, current_node) {
                    (Some(router), Some(node)) => router.menu.route_for(&self.doc, node).map(str::to_string),
                    _ => None,
                };
                if let Some(route) = route {
                    self.navigate(&route, NavigateOptions::USER)?;
                }
            }
            Callback::MenuKeyDown => {
                let Some(router) = self.router.as_mut() else { return Ok(()) };
                match router.menu.handle_key(&mut self.doc, event)? {
                    MenuOutcome::Moved { focus, .. } => self.queue_focus_events(focus),
                    MenuOutcome::Activate { route } => self.navigate(&route, NavigateOptions::USER)?,
                    MenuOutcome::Ignored | MenuOutcome::TabReset => {}
                }
            }
            Callback::MenuFocusIn => {
                if let (Some(router), Some(target)) = (self.router.as_mut(), event.target_node()) {
                    router.menu.handle_focus_in(&mut self.doc, target)?;
                }
            }
            Callback::MenuFocusOut => {
                if let Some(router) = self.router.as_mut() {
                    router.menu.handle_focus_out(&mut self.doc, event.related_target())?;
                }
            }
            Callback::PopState => {
                let EventKind::PopState { state } = &event.kind else { return Ok(()) };
                let route = match &self.router {
                    Some(router) => router.nav.popstate_route(&self.doc, state.as_deref(), router.menu.first_route()),
                    None => return Ok(()),
                };
                self.navigate(&route, NavigateOptions::HISTORY)?;
            }
            Callback::ModalTrigger => {
                event.prevent_default();
                if let Some(modal) = self.modal.as_mut() {
                    let change = modal.open(&mut self.doc, &mut self.listeners)?;
                    self.queue_focus_events(change);
                }
            }
            Callback::ModalTriggerKey => {
                let activates = event.keyboard().is_some_and(|k| k.key.is_activation());
                if let (true, Some(trigger)) = (activates, current_node) {
                    event.prevent_default();
                    self.queue.push_back(Event::click(trigger));
                }
            }
            Callback::ModalOverlayClick => {
                if let Some(modal) = self.modal.as_mut() {
                    let change = modal.handle_overlay_click(&mut self.doc, &mut self.listeners, event)?;
                    self.queue_focus_events(change);
                }
            }
            Callback::ModalKeyDown => {
                if let Some(modal) = self.modal.as_mut() {
                    let change = modal.handle_key(&mut self.doc, &mut self.listeners, event)?;
                    self.queue_focus_events(change);
                }
            }
            Callback::ModalClose => {
                if let Some(modal) = self.modal.as_mut() {
                    let change = modal.close(&mut self.doc, &mut self.listeners)?;
                    self.queue_focus_events(change);
                }
            }
            Callback::SwitchClick(index) => {
                let Some(switch) = self.switches.get(index) else { return Ok(()) };
                let element = switch.element();
                let detail = switch.handle_click(&mut self.doc, event)?;
                self.notify_switch(element, detail);
            }
            Callback::SwitchKey(index) => {
                let Some(switch) = self.switches.get(index) else { return Ok(()) };
                let element = switch.element();
                if let Some(detail) = switch.handle_key(&mut self.doc, event)? {
                    self.notify_switch(element, detail);
                }
            }
            Callback::FormSubmit => {
                event.prevent_default();
                let Some(form) = self.form.as_ref() else { return Ok(()) };
                if let SubmitOutcome::Rejected { focus, .. } = form.submit(&mut self.doc)? {
                    self.queue_focus_events(focus);
                }
            }
            Callback::FieldBlur => {
                if let (Some(form), Some(field)) = (self.form.as_ref(), current_node) {
                    form.handle_blur(&mut self.doc, field)?;
                }
            }
            Callback::ControlChange => {
                if let (Some(form), Some(control)) = (self.form.as_ref(), current_node) {
                    form.on_toggle(&mut self.doc, control)?;
                }
            }
        }
        Ok(())
    }

    /// Queue the `empower:switch` notification of a switch
    fn notify_switch(&mut self, element: NodeId, detail: SwitchDetail) {
        self.queue.push_back(Event::new(EventTarget::Node(element), EventKind::SwitchChange(detail)));
    }

    fn navigate(&mut self, route: &str, options: NavigateOptions) -> PageResult<()> {
        let Some(router) = self.router.as_mut() else { return Ok(()) };
        match router.nav.navigate(&mut self.doc, &mut self.history, router.menu.items(), route, options) {
            Ok(navigation) => {
                self.queue_focus_events(navigation.focus);
                Ok(())
            }
            Err(NavError::UnknownRoute(r)) => {
                tracing::warn!("ignoring navigation to unknown route {:?}", r);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"<main id="main-content"><p>Nothing to enhance</p></main>"#;

    #[test]
    fn test_missing_anchors_leave_page_usable() {
        let page = Page::load(MINIMAL, "https://example.com/", SiteConfig::default()).unwrap();
        assert!(page.current_route().is_none());
        assert!(page.modal().is_none());
        assert!(page.switches().is_empty());
        assert!(page.form().is_none());
        assert!(page.listeners().is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SiteConfig { routes: Vec::new(), ..SiteConfig::default() };
        assert!(matches!(
            Page::load(MINIMAL, "https://example.com/", config),
            Err(PageError::Config(_))
        ));
    }

    #[test]
    fn test_footer_year_from_config() {
        let html = r#"<footer><span data-current-year>2000</span></footer>"#;
        let config = SiteConfig { year: Some(2031), ..SiteConfig::default() };
        let page = Page::load(html, "https://example.com/", config).unwrap();
        let span = page.document().query_selector("[data-current-year]").unwrap().unwrap();
        assert_eq!(page.document().tree().text_content(span), "2031");
    }

    #[test]
    fn test_checkbox_click_fires_change() {
        let html = r#"
            <form id="f"><input type="checkbox" id="c"></form>"#;
        let mut page = Page::load(html, "https://example.com/", SiteConfig::default()).unwrap();
        let c = page.element("c").unwrap();
        page.click(c);
        assert!(page.document().tree().element(c).unwrap().checked());
        assert_eq!(page.active_element(), Some(c));
    }

    #[test]
    fn test_tab_moves_through_document() {
        let html = r#"<button id="a">A</button><button id="b">B</button>"#;
        let mut page = Page::load(html, "https://example.com/", SiteConfig::default()).unwrap();
        page.key_down(Key::Tab, KeyModifiers::NONE);
        assert_eq!(page.active_element(), Some(page.element("a").unwrap()));
        page.key_down(Key::Tab, KeyModifiers::NONE);
        assert_eq!(page.active_element(), Some(page.element("b").unwrap()));
        page.key_down(Key::Tab, KeyModifiers::SHIFT);
        assert_eq!(page.active_element(), Some(page.element("a").unwrap()));
    }

    #[test]
    fn test_unknown_element() {
        let page = Page::load(MINIMAL, "https://example.com/", SiteConfig::default()).unwrap();
        assert!(matches!(page.element("nope"), Err(PageError::NoSuchElement(id)) if id == "nope"));
    }
}
