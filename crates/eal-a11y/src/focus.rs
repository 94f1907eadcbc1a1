//! Focus Management
//!
//! Which elements can take keyboard focus inside a container, and how focus
//! is moved onto elements that are not normally focusable.

use eal_dom::{Document, DomResult, DomTree, ElementData, FocusChange, NodeId};

use crate::aria::{AriaRole, ROLE};

/// Tab index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabIndex {
    /// `tabindex="-1"`: focusable by script, skipped by Tab
    ProgrammaticOnly,
    /// `tabindex="0"` or positive
    Sequential(i32),
}

impl TabIndex {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().parse::<i32>() {
            Ok(n) if n < 0 => Some(Self::ProgrammaticOnly),
            Ok(n) => Some(Self::Sequential(n)),
            Err(_) => None,
        }
    }

    pub fn is_sequential(&self) -> bool {
        matches!(self, Self::Sequential(_))
    }

    /// Attribute value to write back
    pub fn as_attr(&self) -> String {
        match self {
            Self::ProgrammaticOnly => "-1".to_string(),
            Self::Sequential(n) => n.to_string(),
        }
    }

    /// Write this tabindex onto `id`
    pub fn apply(self, tree: &mut DomTree, id: NodeId) -> DomResult<()> {
        tree.set_attr(id, "tabindex", &self.as_attr())
    }
}

/// Focusable-element queries
pub struct FocusQuery;

impl FocusQuery {
    /// Whether an element matches the focusable selector list:
    /// enabled links with `href`, buttons, non-hidden inputs, selects,
    /// textareas, anything with a tabindex other than `-1`, and switches.
    pub fn is_candidate(el: &ElementData) -> bool {
        let enabled = !el.is_disabled();
        let by_tag = match el.tag.as_str() {
            "a" => el.has_attr("href") && enabled,
            "button" | "select" | "textarea" => enabled,
            "input" => enabled && el.input_type() != "hidden",
            _ => false,
        };
        let by_tabindex = el.get_attr("tabindex")
            .map(|v| TabIndex::parse(v).is_none_or(|t| t.is_sequential()))
            .unwrap_or(false);
        let by_role = el.get_attr(ROLE).and_then(AriaRole::parse) == Some(AriaRole::Switch);
        by_tag || by_tabindex || by_role
    }

    /// Ordered, currently visible focusable descendants of `container`.
    /// Computed fresh on every call; content can change while a dialog is open.
    pub fn focusable_within(doc: &Document, container: NodeId) -> Vec<NodeId> {
        let tree = doc.tree();
        tree.descendants(container)
            .filter(|&id| tree.element(id).map(Self::is_candidate).unwrap_or(false))
            .filter(|&id| tree.is_rendered(id))
            .collect()
    }

    /// First `h1` or `h2` below `container`, in tree order
    pub fn first_heading(doc: &Document, container: NodeId) -> Option<NodeId> {
        doc.tree().find_first(container, |e| matches!(e.tag.as_str(), "h1" | "h2"))
    }

    /// Focus an element that may not be focusable on its own: give it
    /// `tabindex="-1"`, focus it, then restore the previous tabindex so it
    /// does not stay in the tab order. Focus remains on the element.
    pub fn focus_scoped(doc: &mut Document, target: NodeId) -> Option<FocusChange> {
        let previous = doc.tree().get_attr(target, "tabindex").map(str::to_string);
        if TabIndex::ProgrammaticOnly.apply(doc.tree_mut(), target).is_err() {
            return None;
        }
        let change = doc.focus(target);
        let restored = match previous {
            Some(value) => doc.tree_mut().set_attr(target, "tabindex", &value),
            None => doc.tree_mut().remove_attr(target, "tabindex").map(|_| ()),
        };
        if let Err(e) = restored {
            tracing::warn!("could not restore tabindex on {}: {}", target, e);
        }
        change
    }

    /// Focus `target`, or `fallback` when `target` is absent or refuses focus
    pub fn focus_or(doc: &mut Document, target: Option<NodeId>, fallback: NodeId) -> Option<FocusChange> {
        if let Some(t) = target {
            if let Some(change) = Self::focus_scoped(doc, t) {
                return Some(change);
            }
            if doc.active_element() == Some(t) {
                return None;
            }
        }
        Self::focus_scoped(doc, fallback)
    }
}
