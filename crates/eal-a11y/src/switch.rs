//! Toggle Switches
//!
//! `role="switch"` widgets. Each instance owns its state, kept in
//! `aria-checked`, and is told at construction which visual it drives: a
//! text label, or a hidden form field plus an image.

use eal_dom::{Document, DomResult, Event, NodeId, SwitchDetail};
use serde::Deserialize;

use crate::aria::{self, AriaRole, ARIA_CHECKED};
use crate::focus::TabIndex;

/// Text shown by a plain switch
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StateLabels {
    pub on: String,
    pub off: String,
}

impl Default for StateLabels {
    fn default() -> Self {
        Self { on: "On".into(), off: "Off".into() }
    }
}

/// Hidden field and image driven by a form-bound switch
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FormBinding {
    /// Id of the hidden input receiving `"true"`/`"false"`
    pub hidden_field: String,
    /// Id of the status image
    pub image: String,
    pub on_src: String,
    pub off_src: String,
    pub on_alt: String,
    pub off_alt: String,
}

impl Default for FormBinding {
    fn default() -> Self {
        Self {
            hidden_field: "updates-value".into(),
            image: "switch-img".into(),
            on_src: "images/switch-on.png".into(),
            off_src: "images/switch-off.png".into(),
            on_alt: "Updates switch is on".into(),
            off_alt: "Updates switch is off".into(),
        }
    }
}

/// What a switch renders its state into
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SwitchKind {
    /// State only in `aria-checked`, optionally echoed as text
    PlainToggle {
        #[serde(default)]
        labels: Option<StateLabels>,
    },
    /// State also written to a hidden field and an image
    FormBound(FormBinding),
}

/// One switch instance
#[derive(Debug, Clone)]
pub struct SwitchComponent {
    element: NodeId,
    kind: SwitchKind,
}

impl SwitchComponent {
    /// Apply the switch contract to `element` (`role`, `tabindex` and
    /// `aria-checked` defaults) and render its initial state
    pub fn init(doc: &mut Document, element: NodeId, kind: SwitchKind) -> DomResult<Self> {
        let tree = doc.tree_mut();
        aria::set_role(tree, element, AriaRole::Switch)?;
        if !tree.has_attr(element, "tabindex") {
            TabIndex::Sequential(0).apply(tree, element)?;
        }
        if !tree.has_attr(element, ARIA_CHECKED) {
            aria::set_bool(tree, element, ARIA_CHECKED, false)?;
        }

        let switch = Self { element, kind };
        let checked = switch.is_checked(doc);
        switch.render(doc, checked)?;
        tracing::debug!("switch {} initialized ({})", element, if checked { "on" } else { "off" });
        Ok(switch)
    }

    pub fn element(&self) -> NodeId {
        self.element
    }

    pub fn kind(&self) -> &SwitchKind {
        &self.kind
    }

    pub fn is_checked(&self, doc: &Document) -> bool {
        aria::get_bool(doc.tree(), self.element, ARIA_CHECKED)
    }

    /// Flip the state
    pub fn toggle(&self, doc: &mut Document) -> DomResult<SwitchDetail> {
        let next = !self.is_checked(doc);
        self.set_checked(doc, next)
    }

    /// Set the state and every visual bound to it
    pub fn set_checked(&self, doc: &mut Document, checked: bool) -> DomResult<SwitchDetail> {
        aria::set_bool(doc.tree_mut(), self.element, ARIA_CHECKED, checked)?;
        self.render(doc, checked)?;
        Ok(SwitchDetail { checked })
    }

    fn render(&self, doc: &mut Document, checked: bool) -> DomResult<()> {
        match &self.kind {
            SwitchKind::PlainToggle { labels: None } => Ok(()),
            SwitchKind::PlainToggle { labels: Some(labels) } => {
                let text = if checked { &labels.on } else { &labels.off };
                doc.tree_mut().set_text_content(self.element, text)
            }
            SwitchKind::FormBound(binding) => {
                match doc.get_element_by_id(&binding.image) {
                    Some(img) => {
                        let (src, alt) = if checked {
                            (&binding.on_src, &binding.on_alt)
                        } else {
                            (&binding.off_src, &binding.off_alt)
                        };
                        doc.tree_mut().set_attr(img, "src", src)?;
                        doc.tree_mut().set_attr(img, "alt", alt)?;
                    }
                    None => tracing::warn!("switch image #{} not found", binding.image),
                }
                match doc.get_element_by_id(&binding.hidden_field) {
                    Some(field) => doc.tree_mut().set_value(field, if checked { "true" } else { "false" })?,
                    None => tracing::warn!("switch field #{} not found", binding.hidden_field),
                }
                Ok(())
            }
        }
    }

    /// Click toggles
    pub fn handle_click(&self, doc: &mut Document, event: &mut Event) -> DomResult<SwitchDetail> {
        event.prevent_default();
        self.toggle(doc)
    }

    /// Enter or Space toggles; other keys are left alone
    pub fn handle_key(&self, doc: &mut Document, event: &mut Event) -> DomResult<Option<SwitchDetail>> {
        let activates = event.keyboard().map(|k| k.key.is_activation()).unwrap_or(false);
        if !activates {
            return Ok(None);
        }
        event.prevent_default();
        self.toggle(doc).map(Some)
    }
}
