//! Input Events
//!
//! Keyboard, mouse, focus, form and history events as delivered to page
//! script. Key handling follows the DOM `KeyboardEvent.key` strings.

use crate::{EventTarget, NodeId};

/// Key value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Character(char),

    // Navigation
    ArrowUp, ArrowDown, ArrowLeft, ArrowRight,
    Home, End, PageUp, PageDown,

    // Editing
    Backspace, Delete,
    Enter, Tab, Escape,

    // Whitespace
    Space,

    Unidentified(String),
}

impl Key {
    /// Parse from a `KeyboardEvent.key` string
    pub fn parse(s: &str) -> Self {
        match s {
            "ArrowUp" => Self::ArrowUp,
            "ArrowDown" => Self::ArrowDown,
            "ArrowLeft" => Self::ArrowLeft,
            "ArrowRight" => Self::ArrowRight,
            "Home" => Self::Home,
            "End" => Self::End,
            "PageUp" => Self::PageUp,
            "PageDown" => Self::PageDown,
            "Backspace" => Self::Backspace,
            "Delete" => Self::Delete,
            "Enter" => Self::Enter,
            "Tab" => Self::Tab,
            "Escape" | "Esc" => Self::Escape,
            " " | "Space" | "Spacebar" => Self::Space,
            s => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Self::Character(c),
                    _ => Self::Unidentified(s.to_string()),
                }
            }
        }
    }

    /// Convert back to the key string
    pub fn as_key_string(&self) -> String {
        match self {
            Self::Character(c) => c.to_string(),
            Self::ArrowUp => "ArrowUp".into(),
            Self::ArrowDown => "ArrowDown".into(),
            Self::ArrowLeft => "ArrowLeft".into(),
            Self::ArrowRight => "ArrowRight".into(),
            Self::Home => "Home".into(),
            Self::End => "End".into(),
            Self::PageUp => "PageUp".into(),
            Self::PageDown => "PageDown".into(),
            Self::Backspace => "Backspace".into(),
            Self::Delete => "Delete".into(),
            Self::Enter => "Enter".into(),
            Self::Tab => "Tab".into(),
            Self::Escape => "Escape".into(),
            Self::Space => " ".into(),
            Self::Unidentified(s) => s.clone(),
        }
    }

    /// Enter or Space, the two keys that activate buttons and switches
    pub fn is_activation(&self) -> bool {
        matches!(self, Self::Enter | Self::Space)
    }
}

/// Key modifiers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyModifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl KeyModifiers {
    pub const NONE: KeyModifiers = KeyModifiers { shift: false, ctrl: false, alt: false, meta: false };
    pub const SHIFT: KeyModifiers = KeyModifiers { shift: true, ctrl: false, alt: false, meta: false };

    /// Check if any modifier is pressed
    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta
    }

    pub fn from_flags(shift: bool, ctrl: bool, alt: bool, meta: bool) -> Self {
        Self { shift, ctrl, alt, meta }
    }
}

/// Keyboard event payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyboardEvent {
    pub key: Key,
    pub modifiers: KeyModifiers,
}

impl KeyboardEvent {
    pub fn new(key: Key) -> Self {
        Self { key, modifiers: KeyModifiers::NONE }
    }

    pub fn with_modifiers(mut self, modifiers: KeyModifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Focus event payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusEventData {
    /// Element losing focus for `focusin`, gaining it for `focusout`
    pub related_target: Option<NodeId>,
}

/// Detail of the `empower:switch` notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchDetail {
    pub checked: bool,
}

/// Event types listeners can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    Click,
    KeyDown,
    FocusIn,
    FocusOut,
    Blur,
    Change,
    Submit,
    PopState,
    /// `empower:switch`
    SwitchChange,
}

impl EventType {
    /// Whether the event travels up the ancestor chain
    pub fn bubbles(self) -> bool {
        !matches!(self, Self::Blur | Self::PopState)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::KeyDown => "keydown",
            Self::FocusIn => "focusin",
            Self::FocusOut => "focusout",
            Self::Blur => "blur",
            Self::Change => "change",
            Self::Submit => "submit",
            Self::PopState => "popstate",
            Self::SwitchChange => "empower:switch",
        }
    }
}

/// Event payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Click,
    KeyDown(KeyboardEvent),
    FocusIn(FocusEventData),
    FocusOut(FocusEventData),
    Blur,
    Change,
    Submit,
    /// `state` is the route carried by the history entry, if any
    PopState { state: Option<String> },
    SwitchChange(SwitchDetail),
}

/// A dispatched event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub target: EventTarget,
    pub kind: EventKind,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl Event {
    pub fn new(target: EventTarget, kind: EventKind) -> Self {
        Self { target, kind, default_prevented: false, propagation_stopped: false }
    }

    pub fn click(target: NodeId) -> Self {
        Self::new(EventTarget::Node(target), EventKind::Click)
    }

    pub fn key_down(target: EventTarget, key: Key, modifiers: KeyModifiers) -> Self {
        Self::new(target, EventKind::KeyDown(KeyboardEvent::new(key).with_modifiers(modifiers)))
    }

    pub fn pop_state(state: Option<String>) -> Self {
        Self::new(EventTarget::Window, EventKind::PopState { state })
    }

    pub fn event_type(&self) -> EventType {
        match self.kind {
            EventKind::Click => EventType::Click,
            EventKind::KeyDown(_) => EventType::KeyDown,
            EventKind::FocusIn(_) => EventType::FocusIn,
            EventKind::FocusOut(_) => EventType::FocusOut,
            EventKind::Blur => EventType::Blur,
            EventKind::Change => EventType::Change,
            EventKind::Submit => EventType::Submit,
            EventKind::PopState { .. } => EventType::PopState,
            EventKind::SwitchChange(_) => EventType::SwitchChange,
        }
    }

    /// Target node, when the event targets an element
    pub fn target_node(&self) -> Option<NodeId> {
        match self.target {
            EventTarget::Node(id) => Some(id),
            _ => None,
        }
    }

    /// Keyboard payload of a keydown
    pub fn keyboard(&self) -> Option<&KeyboardEvent> {
        match &self.kind {
            EventKind::KeyDown(k) => Some(k),
            _ => None,
        }
    }

    /// `relatedTarget` of a focus event
    pub fn related_target(&self) -> Option<NodeId> {
        match self.kind {
            EventKind::FocusIn(f) | EventKind::FocusOut(f) => f.related_target,
            _ => None,
        }
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}
