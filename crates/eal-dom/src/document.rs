//! Document - High-level document API
//!
//! Owns the tree plus the per-document state a browser keeps outside of it:
//! URL, title and the focused element.

use crate::{DomTree, NodeId};

/// Focus moved from one element to another
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusChange {
    pub from: Option<NodeId>,
    pub to: Option<NodeId>,
}

/// HTML Document
#[derive(Debug, Clone)]
pub struct Document {
    /// The DOM tree
    pub tree: DomTree,
    url: String,
    title: String,
    html_element: NodeId,
    head_element: NodeId,
    body_element: NodeId,
    focused: NodeId,
}

impl Document {
    /// Create a document with an empty `html/head/body` skeleton
    pub fn new(url: &str) -> Self {
        let mut tree = DomTree::new();
        let html = tree.create_element("html");
        let head = tree.create_element("head");
        let body = tree.create_element("body");
        // Fresh nodes under a fresh root cannot violate the hierarchy
        let _ = tree.append_child(NodeId::ROOT, html);
        let _ = tree.append_child(html, head);
        let _ = tree.append_child(html, body);

        Self {
            tree,
            url: url.to_string(),
            title: String::new(),
            html_element: html,
            head_element: head,
            body_element: body,
            focused: NodeId::NONE,
        }
    }

    /// Wrap an already built tree, locating `html`, `head`, `body` and `<title>`
    pub fn from_tree(tree: DomTree, url: &str) -> Self {
        let find = |tag: &str| {
            tree.find_first(NodeId::ROOT, |e| e.tag == tag).unwrap_or(NodeId::NONE)
        };
        let html_element = find("html");
        let head_element = find("head");
        let body_element = find("body");
        let title = tree.find_first(NodeId::ROOT, |e| e.tag == "title")
            .map(|t| tree.text_content(t).trim().to_string())
            .unwrap_or_default();

        Self {
            tree,
            url: url.to_string(),
            title,
            html_element,
            head_element,
            body_element,
            focused: NodeId::NONE,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn set_url(&mut self, url: &str) {
        self.url = url.to_string();
    }

    /// `document.title`
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: &str) {
        tracing::trace!("document.title = {:?}", title);
        self.title = title.to_string();
    }

    /// `<html>` element
    pub fn document_element(&self) -> NodeId {
        self.html_element
    }

    pub fn head(&self) -> NodeId {
        self.head_element
    }

    pub fn body(&self) -> NodeId {
        self.body_element
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Access the DOM tree mutably
    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }

    /// Get connected element by `id` attribute
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree.find_first(NodeId::ROOT, |e| e.id() == Some(id))
    }

    // === Focus ===

    /// `document.activeElement`, ignoring elements that were detached
    pub fn active_element(&self) -> Option<NodeId> {
        Some(self.focused).filter(|&f| f.is_valid() && self.tree.is_connected(f))
    }

    /// Whether `element.focus()` would succeed
    pub fn is_focusable(&self, id: NodeId) -> bool {
        let Some(el) = self.tree.element(id) else { return false };
        if el.is_disabled() || !self.tree.is_rendered(id) {
            return false;
        }
        el.is_natively_focusable() || el.tab_index().is_some()
    }

    /// Move focus; `None` when the element cannot take focus or already has it
    pub fn focus(&mut self, id: NodeId) -> Option<FocusChange> {
        if !self.is_focusable(id) {
            tracing::trace!("focus({}) refused: not focusable", id);
            return None;
        }
        let from = self.active_element();
        if from == Some(id) {
            return None;
        }
        self.focused = id;
        Some(FocusChange { from, to: Some(id) })
    }

    /// Drop focus back to the document
    pub fn blur(&mut self) -> Option<FocusChange> {
        let from = self.active_element()?;
        self.focused = NodeId::NONE;
        Some(FocusChange { from: Some(from), to: None })
    }

    /// Sequential focus navigation order: positive tabindex ascending, then
    /// tabindex 0 and natively focusable elements in tree order
    pub fn tab_order(&self) -> Vec<NodeId> {
        let mut positive = Vec::new();
        let mut zero = Vec::new();
        for id in self.tree.descendants(NodeId::ROOT) {
            if !self.is_focusable(id) {
                continue;
            }
            match self.tree.element(id).and_then(|e| e.tab_index()) {
                Some(n) if n < 0 => {}
                Some(n) if n > 0 => positive.push((n, id)),
                _ => zero.push(id),
            }
        }
        positive.sort_by_key(|&(n, _)| n);
        positive.into_iter().map(|(_, id)| id).chain(zero).collect()
    }

    /// Where Tab (or Shift+Tab) moves focus from the current element.
    ///
    /// An element outside the tab order (a heading focused with a temporary
    /// tabindex) continues from its position in tree order.
    pub fn next_tab_stop(&self, reverse: bool) -> Option<NodeId> {
        let order = self.tab_order();
        if order.is_empty() {
            return None;
        }
        let Some(current) = self.active_element() else {
            return if reverse { order.last().copied() } else { order.first().copied() };
        };

        if let Some(pos) = order.iter().position(|&id| id == current) {
            let next = if reverse {
                (pos + order.len() - 1) % order.len()
            } else {
                (pos + 1) % order.len()
            };
            return Some(order[next]);
        }

        let tree_pos = |id: NodeId| self.tree.descendants(NodeId::ROOT).position(|d| d == id);
        let here = tree_pos(current)?;
        let candidate = if reverse {
            order.iter().rev().find(|&&id| tree_pos(id).map(|p| p < here).unwrap_or(false))
                .or(order.last())
        } else {
            order.iter().find(|&&id| tree_pos(id).map(|p| p > here).unwrap_or(false))
                .or(order.first())
        };
        candidate.copied()
    }

    /// `form.reset()`
    pub fn reset_form(&mut self, form: NodeId) {
        self.tree.reset_controls(form);
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("about:blank")
    }
}
