//! DOM Node
//!
//! Nodes link to each other by `NodeId` instead of pointers, so the whole
//! tree lives in one `Vec` and detached subtrees stay addressable.

use crate::NodeId;

/// DOM Node - Core structure
#[derive(Debug, Clone)]
pub struct Node {
    /// Parent node (NONE if root or detached)
    pub parent: NodeId,
    /// First child
    pub first_child: NodeId,
    /// Last child (for O(1) append)
    pub last_child: NodeId,
    /// Previous sibling
    pub prev_sibling: NodeId,
    /// Next sibling
    pub next_sibling: NodeId,
    /// Node-specific data
    pub data: NodeData,
}

impl Node {
    fn with_data(data: NodeData) -> Self {
        Self {
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
            data,
        }
    }

    /// Create a new element node
    pub fn element(tag: &str) -> Self {
        Self::with_data(NodeData::Element(ElementData::new(tag)))
    }

    /// Create a new text node
    pub fn text(content: &str) -> Self {
        Self::with_data(NodeData::Text(content.to_string()))
    }

    /// Create a comment node
    pub fn comment(content: &str) -> Self {
        Self::with_data(NodeData::Comment(content.to_string()))
    }

    /// Create the document node
    pub fn document() -> Self {
        Self::with_data(NodeData::Document)
    }

    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    /// Get element data if this is an element
    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get mutable element data
    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get text content if this is a text node
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(t) => Some(t),
            _ => None,
        }
    }
}

/// Node-specific data
#[derive(Debug, Clone)]
pub enum NodeData {
    /// Document root
    Document,
    /// Element
    Element(ElementData),
    /// Text content
    Text(String),
    /// Comment
    Comment(String),
}

/// Attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// Live state of a form control.
///
/// `value` and `checked` shadow the markup attributes once script or the user
/// touches them; a form reset drops both and the attributes show through
/// again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlState {
    pub value: Option<String>,
    pub checked: Option<bool>,
}

/// Element-specific data
#[derive(Debug, Clone)]
pub struct ElementData {
    /// Lowercase tag name
    pub tag: String,
    /// Attributes in source order
    pub attrs: Vec<Attribute>,
    /// Inline style declarations (`style.display = ...`)
    pub style: Vec<(String, String)>,
    /// Form control state
    pub control: ControlState,
}

impl ElementData {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
            style: Vec::new(),
            control: ControlState::default(),
        }
    }

    /// Get an attribute value
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs.iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Whether the attribute is present
    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|a| a.name == name)
    }

    /// Set an attribute, replacing any previous value
    pub fn set_attr(&mut self, name: &str, value: &str) {
        for attr in self.attrs.iter_mut() {
            if attr.name == name {
                attr.value = value.to_string();
                return;
            }
        }
        self.attrs.push(Attribute { name: name.to_string(), value: value.to_string() });
    }

    /// Remove an attribute, returning its old value
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let pos = self.attrs.iter().position(|a| a.name == name)?;
        Some(self.attrs.remove(pos).value)
    }

    /// `id` attribute
    pub fn id(&self) -> Option<&str> {
        self.get_attr("id")
    }

    /// Class list membership
    pub fn has_class(&self, class: &str) -> bool {
        self.get_attr("class")
            .map(|v| v.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    /// Inline style property
    pub fn style_property(&self, property: &str) -> Option<&str> {
        self.style.iter()
            .find(|(p, _)| p == property)
            .map(|(_, v)| v.as_str())
    }

    /// Set an inline style property; an empty value removes it
    pub fn set_style_property(&mut self, property: &str, value: &str) {
        self.style.retain(|(p, _)| p != property);
        if !value.is_empty() {
            self.style.push((property.to_string(), value.to_string()));
        }
    }

    /// Heading elements (`h1`..`h6`)
    pub fn is_heading(&self) -> bool {
        matches!(self.tag.as_str(), "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
    }

    /// Whether the control is disabled
    pub fn is_disabled(&self) -> bool {
        self.has_attr("disabled")
    }

    /// `type` of an input, lowercased, defaulting to `text`
    pub fn input_type(&self) -> String {
        self.get_attr("type")
            .map(|t| t.to_ascii_lowercase())
            .unwrap_or_else(|| "text".to_string())
    }

    /// Elements the browser puts into the focus order without a tabindex
    pub fn is_natively_focusable(&self) -> bool {
        if self.is_disabled() {
            return false;
        }
        match self.tag.as_str() {
            "a" => self.has_attr("href"),
            "button" | "select" | "textarea" => true,
            "input" => self.input_type() != "hidden",
            _ => false,
        }
    }

    /// Parsed `tabindex`, `None` when absent or malformed
    pub fn tab_index(&self) -> Option<i32> {
        self.get_attr("tabindex").and_then(|v| v.trim().parse().ok())
    }

    /// Current value: live state first, then the `value` attribute
    pub fn value(&self) -> &str {
        self.control.value.as_deref()
            .or_else(|| self.get_attr("value"))
            .unwrap_or("")
    }

    /// Current checkedness: live state first, then the `checked` attribute
    pub fn checked(&self) -> bool {
        self.control.checked.unwrap_or_else(|| self.has_attr("checked"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_roundtrip() {
        let mut el = ElementData::new("A");
        assert_eq!(el.tag, "a");
        el.set_attr("href", "#home");
        el.set_attr("href", "#services");
        assert_eq!(el.get_attr("href"), Some("#services"));
        assert_eq!(el.attrs.len(), 1);
        assert_eq!(el.remove_attr("href").as_deref(), Some("#services"));
        assert!(!el.has_attr("href"));
    }

    #[test]
    fn test_class_list() {
        let mut el = ElementData::new("a");
        el.set_attr("class", "nav-link  active");
        assert!(el.has_class("nav-link"));
        assert!(el.has_class("active"));
        assert!(!el.has_class("nav"));
    }

    #[test]
    fn test_native_focusability() {
        let mut link = ElementData::new("a");
        assert!(!link.is_natively_focusable());
        link.set_attr("href", "#");
        assert!(link.is_natively_focusable());

        let mut hidden = ElementData::new("input");
        hidden.set_attr("type", "hidden");
        assert!(!hidden.is_natively_focusable());

        let mut button = ElementData::new("button");
        button.set_attr("disabled", "");
        assert!(!button.is_natively_focusable());
    }

    #[test]
    fn test_control_state_shadows_attributes() {
        let mut input = ElementData::new("input");
        input.set_attr("value", "false");
        assert_eq!(input.value(), "false");
        input.control.value = Some("true".into());
        assert_eq!(input.value(), "true");
        input.control = ControlState::default();
        assert_eq!(input.value(), "false");
    }

    #[test]
    fn test_style_property() {
        let mut el = ElementData::new("section");
        el.set_style_property("display", "none");
        assert_eq!(el.style_property("display"), Some("none"));
        el.set_style_property("display", "");
        assert_eq!(el.style_property("display"), None);
    }
}
