//! ARIA Support
//!
//! Roles the page widgets use, and small helpers for the boolean and token
//! attributes they keep in sync.

use eal_dom::{DomResult, DomTree, NodeId};

pub const ROLE: &str = "role";
pub const ARIA_CURRENT: &str = "aria-current";
pub const ARIA_CHECKED: &str = "aria-checked";
pub const ARIA_EXPANDED: &str = "aria-expanded";
pub const ARIA_HIDDEN: &str = "aria-hidden";
pub const ARIA_INVALID: &str = "aria-invalid";
pub const ARIA_MODAL: &str = "aria-modal";
pub const ARIA_LABEL: &str = "aria-label";
pub const ARIA_LABELLEDBY: &str = "aria-labelledby";

/// ARIA role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AriaRole {
    // Landmark roles
    Main,
    Navigation,
    Region,
    Form,

    // Widget roles
    Button,
    Checkbox,
    Dialog,
    AlertDialog,
    Link,
    MenuBar,
    MenuItem,
    Status,
    Switch,

    // Document structure
    Group,
    Heading,
    List,
    ListItem,
    Presentation,
}

impl AriaRole {
    /// Parse from string
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s.trim().to_ascii_lowercase().as_str() {
            "main" => Self::Main,
            "navigation" => Self::Navigation,
            "region" => Self::Region,
            "form" => Self::Form,
            "button" => Self::Button,
            "checkbox" => Self::Checkbox,
            "dialog" => Self::Dialog,
            "alertdialog" => Self::AlertDialog,
            "link" => Self::Link,
            "menubar" => Self::MenuBar,
            "menuitem" => Self::MenuItem,
            "status" => Self::Status,
            "switch" => Self::Switch,
            "group" => Self::Group,
            "heading" => Self::Heading,
            "list" => Self::List,
            "listitem" => Self::ListItem,
            "none" | "presentation" => Self::Presentation,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Navigation => "navigation",
            Self::Region => "region",
            Self::Form => "form",
            Self::Button => "button",
            Self::Checkbox => "checkbox",
            Self::Dialog => "dialog",
            Self::AlertDialog => "alertdialog",
            Self::Link => "link",
            Self::MenuBar => "menubar",
            Self::MenuItem => "menuitem",
            Self::Status => "status",
            Self::Switch => "switch",
            Self::Group => "group",
            Self::Heading => "heading",
            Self::List => "list",
            Self::ListItem => "listitem",
            Self::Presentation => "presentation",
        }
    }
}

/// Role of an element, from its `role` attribute
pub fn role_of(tree: &DomTree, id: NodeId) -> Option<AriaRole> {
    tree.get_attr(id, ROLE).and_then(AriaRole::parse)
}

pub fn set_role(tree: &mut DomTree, id: NodeId, role: AriaRole) -> DomResult<()> {
    tree.set_attr(id, ROLE, role.as_str())
}

/// Write a `"true"`/`"false"` state attribute
pub fn set_bool(tree: &mut DomTree, id: NodeId, attr: &str, value: bool) -> DomResult<()> {
    tree.set_attr(id, attr, if value { "true" } else { "false" })
}

/// Read a `"true"`/`"false"` state attribute; absent or other values read as false
pub fn get_bool(tree: &DomTree, id: NodeId, attr: &str) -> bool {
    tree.get_attr(id, attr) == Some("true")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_role() {
        assert_eq!(AriaRole::parse("menubar"), Some(AriaRole::MenuBar));
        assert_eq!(AriaRole::parse(" Switch "), Some(AriaRole::Switch));
        assert_eq!(AriaRole::parse("none"), Some(AriaRole::Presentation));
        assert_eq!(AriaRole::parse("bogus"), None);
    }

    #[test]
    fn test_role_roundtrip() {
        for role in [AriaRole::MenuItem, AriaRole::Dialog, AriaRole::Presentation] {
            assert_eq!(AriaRole::parse(role.as_str()), Some(role));
        }
    }

    #[test]
    fn test_bool_attributes() {
        let mut tree = DomTree::new();
        let el = tree.create_element("button");
        assert!(!get_bool(&tree, el, ARIA_CHECKED));
        set_bool(&mut tree, el, ARIA_CHECKED, true).unwrap();
        assert_eq!(tree.get_attr(el, ARIA_CHECKED), Some("true"));
        assert!(get_bool(&tree, el, ARIA_CHECKED));
        set_role(&mut tree, el, AriaRole::Switch).unwrap();
        assert_eq!(role_of(&tree, el), Some(AriaRole::Switch));
    }
}
