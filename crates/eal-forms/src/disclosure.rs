//! Checkbox-controlled disclosure
//!
//! A checkbox reveals a block while checked and keeps `aria-expanded` in
//! step. Collapsing empties the listed fields together with their error
//! text.

use eal_a11y::aria::{self, ARIA_EXPANDED};
use eal_dom::{Document, DomResult, NodeId};

use crate::rules::DisclosureConfig;
use crate::FormError;

#[derive(Debug, Clone)]
pub struct Disclosure {
    control: NodeId,
    target: NodeId,
    clears: Vec<String>,
    collapse_on_success: bool,
}

impl Disclosure {
    pub fn from_config(doc: &Document, config: &DisclosureConfig) -> Result<Self, FormError> {
        let control = doc.query_selector(&config.control)?
            .ok_or_else(|| FormError::MissingAnchor(config.control.clone()))?;
        let target = doc.query_selector(&config.target)?
            .ok_or_else(|| FormError::MissingAnchor(config.target.clone()))?;
        Ok(Self {
            control,
            target,
            clears: config.clears.clone(),
            collapse_on_success: config.collapse_on_success,
        })
    }

    pub fn control(&self) -> NodeId {
        self.control
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn collapses_on_success(&self) -> bool {
        self.collapse_on_success
    }

    /// Sync the block with the checkbox; returns whether it is expanded
    pub fn on_toggle(&self, doc: &mut Document) -> DomResult<bool> {
        let expanded = doc.tree().element(self.control).map(|e| e.checked()).unwrap_or(false);
        self.set_expanded(doc, expanded)?;
        if !expanded {
            self.clear_fields(doc)?;
        }
        tracing::debug!("disclosure {} -> {}", self.target, if expanded { "expanded" } else { "collapsed" });
        Ok(expanded)
    }

    /// Hide the block without touching the checkbox
    pub fn collapse(&self, doc: &mut Document) -> DomResult<()> {
        self.set_expanded(doc, false)
    }

    fn set_expanded(&self, doc: &mut Document, expanded: bool) -> DomResult<()> {
        let tree = doc.tree_mut();
        if expanded {
            tree.remove_attr(self.target, "hidden")?;
        } else {
            tree.set_attr(self.target, "hidden", "")?;
        }
        aria::set_bool(tree, self.control, ARIA_EXPANDED, expanded)
    }

    fn clear_fields(&self, doc: &mut Document) -> DomResult<()> {
        for field in &self.clears {
            if let Some(node) = doc.get_element_by_id(field) {
                doc.tree_mut().set_value(node, "")?;
            }
            if let Some(error) = doc.get_element_by_id(&format!("{}-error", field)) {
                doc.tree_mut().set_text_content(error, "")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARKUP: &str = r#"
        <input type="checkbox" id="topic-speaker" aria-expanded="false">
        <div id="event-details" hidden>
          <textarea id="event-text"></textarea>
          <span id="event-text-error" class="error">Please describe your event</span>
        </div>"#;

    fn setup() -> (Document, Disclosure) {
        let doc = eal_html::parse(MARKUP, "https://example.com/").unwrap();
        let config = DisclosureConfig {
            control: "#topic-speaker".into(),
            target: "#event-details".into(),
            clears: vec!["event-text".into()],
            collapse_on_success: true,
        };
        let d = Disclosure::from_config(&doc, &config).unwrap();
        (doc, d)
    }

    #[test]
    fn test_toggle_expands_and_collapses() {
        let (mut doc, d) = setup();
        doc.tree.set_checked(d.control(), true).unwrap();
        assert!(d.on_toggle(&mut doc).unwrap());
        assert!(doc.tree().is_rendered(d.target()));
        assert_eq!(doc.tree().get_attr(d.control(), "aria-expanded"), Some("true"));

        let text = doc.get_element_by_id("event-text").unwrap();
        doc.tree.set_value(text, "Panel talk").unwrap();

        doc.tree.set_checked(d.control(), false).unwrap();
        assert!(!d.on_toggle(&mut doc).unwrap());
        assert!(!doc.tree().is_rendered(d.target()));
        assert_eq!(doc.tree().get_attr(d.control(), "aria-expanded"), Some("false"));
        assert_eq!(doc.tree().element(text).unwrap().value(), "");
        let error = doc.get_element_by_id("event-text-error").unwrap();
        assert_eq!(doc.tree().text_content(error), "");
    }

    #[test]
    fn test_missing_target() {
        let doc = eal_html::parse(MARKUP, "https://example.com/").unwrap();
        let config = DisclosureConfig {
            control: "#topic-speaker".into(),
            target: "#feedback-sample".into(),
            clears: Vec::new(),
            collapse_on_success: false,
        };
        assert!(matches!(Disclosure::from_config(&doc, &config), Err(FormError::MissingAnchor(s)) if s == "#feedback-sample"));
    }
}
