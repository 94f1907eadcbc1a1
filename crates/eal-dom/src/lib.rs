//! Empower DOM - Document Object Model
//!
//! Arena-based document model the page controllers run against. It stands in
//! for the browser: element attributes, inline display style, form control
//! state, keyboard focus, sequential tab order, selectors and event listeners.

mod node;
mod tree;
mod document;
mod events;
mod listeners;
mod selector;

pub use node::{Node, NodeData, ElementData, Attribute, ControlState};
pub use tree::{DomTree, ChildIterator, Descendants};
pub use document::{Document, FocusChange};
pub use events::{
    Event, EventKind, EventType, Key, KeyModifiers, KeyboardEvent, FocusEventData,
    SwitchDetail,
};
pub use listeners::{ListenerRegistry, EventListener, EventTarget, CallbackId};
pub use selector::{Selector, SimpleSelector, AttrOp, Combinator};

/// Node identifier (index into the arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Document root
    pub const ROOT: NodeId = NodeId(0);
    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Whether this id refers to a node slot
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Raw arena index
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// DOM operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("node {0} not found")]
    NotFound(NodeId),

    #[error("node {0} is not an element")]
    NotAnElement(NodeId),

    #[error("hierarchy request error: {child} cannot be inserted under {parent}")]
    HierarchyRequest { parent: NodeId, child: NodeId },

    #[error("node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },

    #[error("invalid selector: {0:?}")]
    InvalidSelector(String),
}
