//! Event Listeners
//!
//! Registration table mapping `(target, event type)` to callback ids. The
//! page runtime owns the callbacks; this module only records who listens
//! where and computes the propagation path.

use std::collections::HashMap;

use crate::{DomTree, EventType, NodeId};

/// Opaque handle to a callback owned by the page runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallbackId(pub u32);

/// Something listeners can attach to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTarget {
    Node(NodeId),
    Document,
    Window,
}

/// Listener registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventListener {
    pub event_type: EventType,
    pub callback: CallbackId,
}

impl EventListener {
    pub fn new(event_type: EventType, callback: CallbackId) -> Self {
        Self { event_type, callback }
    }
}

/// Listener table
#[derive(Debug, Default, Clone)]
pub struct ListenerRegistry {
    listeners: HashMap<EventTarget, Vec<EventListener>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a listener. Registering the same listener twice on the same
    /// target is a no-op, like `addEventListener`; returns whether it was added.
    pub fn add(&mut self, target: EventTarget, listener: EventListener) -> bool {
        let slot = self.listeners.entry(target).or_default();
        if slot.contains(&listener) {
            return false;
        }
        slot.push(listener);
        true
    }

    /// Remove a listener; returns whether one was registered
    pub fn remove(&mut self, target: EventTarget, event_type: EventType, callback: CallbackId) -> bool {
        let Some(slot) = self.listeners.get_mut(&target) else { return false };
        let before = slot.len();
        slot.retain(|l| !(l.event_type == event_type && l.callback == callback));
        let removed = slot.len() != before;
        if slot.is_empty() {
            self.listeners.remove(&target);
        }
        removed
    }

    /// Callbacks registered on one target for one event type, in order
    pub fn get(&self, target: EventTarget, event_type: EventType) -> Vec<CallbackId> {
        self.listeners.get(&target)
            .map(|ls| ls.iter().filter(|l| l.event_type == event_type).map(|l| l.callback).collect())
            .unwrap_or_default()
    }

    /// Number of registrations of a callback across all targets
    pub fn count_for(&self, callback: CallbackId) -> usize {
        self.listeners.values()
            .flat_map(|ls| ls.iter())
            .filter(|l| l.callback == callback)
            .count()
    }

    /// Total number of registrations
    pub fn len(&self) -> usize {
        self.listeners.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Targets visited by an event: the target, then (for bubbling events)
    /// its ancestors, the document and the window
    pub fn propagation_path(tree: &DomTree, target: EventTarget, event_type: EventType) -> Vec<EventTarget> {
        let mut path = vec![target];
        if !event_type.bubbles() {
            return path;
        }
        match target {
            EventTarget::Node(id) => {
                path.extend(
                    tree.ancestors(id)
                        .filter(|&a| a != NodeId::ROOT)
                        .map(EventTarget::Node),
                );
                if tree.is_connected(id) {
                    path.push(EventTarget::Document);
                    path.push(EventTarget::Window);
                }
            }
            EventTarget::Document => path.push(EventTarget::Window),
            EventTarget::Window => {}
        }
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_is_idempotent() {
        let mut reg = ListenerRegistry::new();
        let l = EventListener::new(EventType::KeyDown, CallbackId(7));
        assert!(reg.add(EventTarget::Document, l));
        assert!(!reg.add(EventTarget::Document, l));
        assert_eq!(reg.count_for(CallbackId(7)), 1);
    }

    #[test]
    fn test_remove() {
        let mut reg = ListenerRegistry::new();
        reg.add(EventTarget::Document, EventListener::new(EventType::KeyDown, CallbackId(1)));
        reg.add(EventTarget::Document, EventListener::new(EventType::Click, CallbackId(1)));
        assert!(reg.remove(EventTarget::Document, EventType::KeyDown, CallbackId(1)));
        assert!(!reg.remove(EventTarget::Document, EventType::KeyDown, CallbackId(1)));
        assert_eq!(reg.get(EventTarget::Document, EventType::Click), vec![CallbackId(1)]);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_propagation_path() {
        let mut tree = DomTree::new();
        let body = tree.create_element("body");
        let button = tree.create_element("button");
        tree.append_child(tree.root(), body).unwrap();
        tree.append_child(body, button).unwrap();

        let path = ListenerRegistry::propagation_path(&tree, EventTarget::Node(button), EventType::Click);
        assert_eq!(path, vec![
            EventTarget::Node(button),
            EventTarget::Node(body),
            EventTarget::Document,
            EventTarget::Window,
        ]);

        let path = ListenerRegistry::propagation_path(&tree, EventTarget::Node(button), EventType::Blur);
        assert_eq!(path, vec![EventTarget::Node(button)]);
    }
}
