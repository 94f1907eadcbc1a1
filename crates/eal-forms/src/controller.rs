//! Form Controller
//!
//! Wires the validator to the document: blur checks, submit handling,
//! error rendering and the status live region.

use eal_a11y::aria::{self, ARIA_INVALID};
use eal_a11y::SwitchComponent;
use eal_dom::{Document, DomResult, FocusChange, NodeId};

use crate::disclosure::Disclosure;
use crate::rules::{FormConfig, RuleKind};
use crate::validator::{FieldError, FormValidator, ValidationFailure, Validator};
use crate::FormError;

/// Result of a submit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Errors rendered, focus moved to the first invalid field
    Rejected { failure: ValidationFailure, focus: Option<FocusChange> },
    /// Success announced and the form reset
    Accepted,
}

#[derive(Debug, Clone)]
pub struct FormController {
    form: NodeId,
    status: NodeId,
    config: FormConfig,
    validator: FormValidator,
    disclosures: Vec<Disclosure>,
    switch: Option<SwitchComponent>,
}

impl FormController {
    /// Locate the form and its status region. A disclosure whose elements
    /// are missing is skipped; the rest of the form still works.
    pub fn from_document(doc: &Document, config: FormConfig) -> Result<Self, FormError> {
        let form = doc.get_element_by_id(&config.form)
            .ok_or_else(|| FormError::MissingAnchor(format!("#{}", config.form)))?;
        let status = doc.get_element_by_id(&config.status)
            .ok_or_else(|| FormError::MissingAnchor(format!("#{}", config.status)))?;
        let validator = FormValidator::new(config.rules.clone())?;

        let mut disclosures = Vec::new();
        for d in &config.disclosures {
            match Disclosure::from_config(doc, d) {
                Ok(disclosure) => disclosures.push(disclosure),
                Err(FormError::MissingAnchor(what)) => {
                    tracing::warn!("disclosure skipped, missing {}", what);
                }
                Err(e) => return Err(e),
            }
        }

        tracing::debug!("form {} with {} rules, {} disclosures", form, config.rules.len(), disclosures.len());
        Ok(Self { form, status, config, validator, disclosures, switch: None })
    }

    /// Switch reset to off after a successful submit
    pub fn with_switch(mut self, switch: SwitchComponent) -> Self {
        self.switch = Some(switch);
        self
    }

    pub fn form(&self) -> NodeId {
        self.form
    }

    pub fn status(&self) -> NodeId {
        self.status
    }

    pub fn validator(&self) -> &FormValidator {
        &self.validator
    }

    pub fn disclosures(&self) -> &[Disclosure] {
        &self.disclosures
    }

    /// Field id of `node` when it is validated on blur
    fn blur_field(&self, doc: &Document, node: NodeId) -> Option<String> {
        let id = doc.tree().element(node)?.id()?;
        self.config.validate_on_blur.iter().find(|f| *f == id).cloned()
    }

    /// Validate a field as it loses focus and render the result
    pub fn handle_blur(&self, doc: &mut Document, node: NodeId) -> DomResult<Option<FieldError>> {
        let Some(field) = self.blur_field(doc, node) else {
            return Ok(None);
        };
        match self.validator.validate_field(doc, &field) {
            Ok(()) => {
                self.render_field(doc, &field, None)?;
                Ok(None)
            }
            Err(message) => {
                self.render_field(doc, &field, Some(&message))?;
                Ok(Some(FieldError { field, message }))
            }
        }
    }

    /// Checkbox `control` changed: update the block it discloses.
    /// Returns the new expanded state, or `None` when it controls nothing.
    pub fn on_toggle(&self, doc: &mut Document, control: NodeId) -> DomResult<Option<bool>> {
        match self.disclosures.iter().find(|d| d.control() == control) {
            Some(d) => d.on_toggle(doc).map(Some),
            None => Ok(None),
        }
    }

    /// Show or clear one field's error. Without an error element the field
    /// is left unmarked.
    fn render_field(&self, doc: &mut Document, field: &str, message: Option<&str>) -> DomResult<()> {
        let Some(error_el) = doc.get_element_by_id(&format!("{}-error", field)) else {
            tracing::debug!("no error element for {}", field);
            return Ok(());
        };
        let target = self.validator.invalid_target(doc, field);
        doc.tree_mut().set_text_content(error_el, message.unwrap_or(""))?;
        if let Some(target) = target {
            match message {
                Some(_) => aria::set_bool(doc.tree_mut(), target, ARIA_INVALID, true)?,
                None => {
                    doc.tree_mut().remove_attr(target, ARIA_INVALID)?;
                }
            }
        }
        Ok(())
    }

    fn clear_messages(&self, doc: &mut Document) -> DomResult<()> {
        doc.tree_mut().set_text_content(self.status, "")?;
        let error_class = self.config.error_class.as_str();
        let errors = doc.tree().find_all(NodeId::ROOT, |e| e.has_class(error_class));
        for el in errors {
            doc.tree_mut().set_text_content(el, "")?;
        }
        let controls = doc.tree().find_all(NodeId::ROOT, |e| matches!(e.tag.as_str(), "input" | "textarea"));
        for el in controls {
            doc.tree_mut().remove_attr(el, ARIA_INVALID)?;
        }
        Ok(())
    }

    fn announce(&self, doc: &mut Document, class: &str, text: &str) -> DomResult<()> {
        let tree = doc.tree_mut();
        tree.set_attr(self.status, "class", class)?;
        tree.set_text_content(self.status, text)
    }

    /// Focus the element standing for `field`; a group whose fieldset
    /// refuses focus hands it to its first checkbox
    fn focus_field(&self, doc: &mut Document, field: &str) -> Option<FocusChange> {
        let target = self.validator.invalid_target(doc, field)?;
        if let Some(change) = doc.focus(target) {
            return Some(change);
        }
        if doc.active_element() == Some(target) {
            return None;
        }
        match self.validator.rule(field).map(|r| &r.kind) {
            Some(RuleKind::CheckboxGroup { name, .. }) => {
                let first = FormValidator::group_members(doc, name).first().copied()?;
                doc.focus(first)
            }
            _ => None,
        }
    }

    /// Handle a submit
    pub fn submit(&self, doc: &mut Document) -> DomResult<SubmitOutcome> {
        self.clear_messages(doc)?;

        let result = self.validator.validate_all(doc);
        let failure = match result {
            Ok(()) => None,
            Err(failure) => Some(failure),
        };

        for rule in self.validator.rules() {
            let message = failure.as_ref().and_then(|f| f.message_for(&rule.field));
            self.render_field(doc, &rule.field, message)?;
        }

        let Some(failure) = failure else {
            let messages = &self.config.messages;
            self.announce(doc, &messages.success_class, &messages.success)?;
            doc.reset_form(self.form);
            for d in self.disclosures.iter().filter(|d| d.collapses_on_success()) {
                d.collapse(doc)?;
            }
            if let Some(switch) = &self.switch {
                switch.set_checked(doc, false)?;
            }
            tracing::info!("form submitted");
            return Ok(SubmitOutcome::Accepted);
        };

        let focus = self.focus_field(doc, &failure.first_invalid);
        let messages = &self.config.messages;
        self.announce(doc, &messages.failure_class, &messages.failure)?;
        tracing::debug!("form rejected: {} invalid, first {}", failure.errors.len(), failure.first_invalid);
        Ok(SubmitOutcome::Rejected { failure, focus })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eal_a11y::{FormBinding, SwitchKind};

    const PAGE: &str = r#"
        <form id="schedule-form">
          <input id="email" type="email"><span id="email-error" class="error"></span>
          <input id="phone" type="tel" pattern="\d{3}-\d{3}-\d{4}"><span id="phone-error" class="error"></span>
          <fieldset class="form-fieldset">
            <input type="checkbox" name="topic" id="topic-workshop">
            <input type="checkbox" name="topic" id="topic-speaker" aria-expanded="false">
          </fieldset>
          <span id="topic-error" class="error"></span>
          <div id="event-details" hidden>
            <textarea id="event-text"></textarea><span id="event-text-error" class="error"></span>
          </div>
          <button type="button" id="updates-switch" role="switch" aria-checked="false">
            <img id="switch-img" src="images/switch-off.png" alt="Updates switch is off">
          </button>
          <input type="hidden" id="updates-value" name="updates" value="false">
          <button type="submit">Submit</button>
        </form>
        <div id="form-status" role="status"></div>"#;

    fn setup() -> (Document, FormController) {
        let mut doc = eal_html::parse(PAGE, "https://example.com/#schedule").unwrap();
        let switch_el = doc.get_element_by_id("updates-switch").unwrap();
        let switch = SwitchComponent::init(&mut doc, switch_el, SwitchKind::FormBound(FormBinding::default())).unwrap();
        let form = FormController::from_document(&doc, FormConfig::default()).unwrap().with_switch(switch);
        (doc, form)
    }

    fn id(doc: &Document, id: &str) -> NodeId {
        doc.get_element_by_id(id).unwrap()
    }

    fn text(doc: &Document, el: &str) -> String {
        doc.tree().text_content(id(doc, el))
    }

    #[test]
    fn test_missing_interactive_disclosure_is_skipped() {
        let (_, form) = setup();
        assert_eq!(form.disclosures().len(), 1);
    }

    #[test]
    fn test_missing_form_is_error() {
        let doc = eal_html::parse("<p>No form</p>", "https://example.com/").unwrap();
        assert!(matches!(
            FormController::from_document(&doc, FormConfig::default()),
            Err(FormError::MissingAnchor(_))
        ));
    }

    #[test]
    fn test_rejected_submit() {
        let (mut doc, form) = setup();
        let outcome = form.submit(&mut doc).unwrap();
        let SubmitOutcome::Rejected { failure, focus } = outcome else {
            panic!("expected rejection");
        };
        assert_eq!(failure.first_invalid, "email");
        assert_eq!(focus.and_then(|f| f.to), Some(id(&doc, "email")));
        assert_eq!(text(&doc, "email-error"), "A valid email is required.");
        assert_eq!(text(&doc, "topic-error"), "Select at least one topic.");
        assert_eq!(doc.tree().get_attr(id(&doc, "email"), "aria-invalid"), Some("true"));
        let fieldset = doc.query_selector(".form-fieldset").unwrap().unwrap();
        assert_eq!(doc.tree().get_attr(fieldset, "aria-invalid"), Some("true"));
        assert_eq!(text(&doc, "form-status"), "Submission failed: Please correct the highlighted errors.");
        assert_eq!(doc.tree().get_attr(form.status(), "class"), Some("form-status error-status"));
    }

    #[test]
    fn test_resubmit_clears_resolved_errors() {
        let (mut doc, form) = setup();
        form.submit(&mut doc).unwrap();
        let email = id(&doc, "email");
        doc.tree.set_value(email, "a@b.ca").unwrap();

        let outcome = form.submit(&mut doc).unwrap();
        assert!(matches!(outcome, SubmitOutcome::Rejected { ref failure, .. } if failure.first_invalid == "topic"));
        assert_eq!(text(&doc, "email-error"), "");
        assert!(!doc.tree().has_attr(email, "aria-invalid"));
    }

    #[test]
    fn test_group_focus_falls_back_to_first_checkbox() {
        let (mut doc, form) = setup();
        let email = id(&doc, "email");
        doc.tree.set_value(email, "a@b.ca").unwrap();
        let SubmitOutcome::Rejected { focus, .. } = form.submit(&mut doc).unwrap() else {
            panic!("expected rejection");
        };
        assert_eq!(focus.and_then(|f| f.to), Some(id(&doc, "topic-workshop")));
    }

    #[test]
    fn test_accepted_submit_resets() {
        let (mut doc, form) = setup();
        let speaker = id(&doc, "topic-speaker");
        doc.tree.set_value(id(&doc, "email"), "jane@example.ca").unwrap();
        doc.tree.set_checked(speaker, true).unwrap();
        form.on_toggle(&mut doc, speaker).unwrap();
        doc.tree.set_value(id(&doc, "event-text"), "Accessibility keynote").unwrap();
        form.switch.as_ref().unwrap().toggle(&mut doc).unwrap();

        assert_eq!(form.submit(&mut doc).unwrap(), SubmitOutcome::Accepted);
        assert_eq!(
            text(&doc, "form-status"),
            "Thank you! Your call has been successfully scheduled. We will be in touch soon."
        );
        assert_eq!(doc.tree().get_attr(form.status(), "class"), Some("form-status success-status"));
        assert!(!doc.tree().element(speaker).unwrap().checked());
        assert!(!doc.tree().is_rendered(id(&doc, "event-details")));
        assert_eq!(doc.tree().get_attr(speaker, "aria-expanded"), Some("false"));

        let switch = id(&doc, "updates-switch");
        assert_eq!(doc.tree().get_attr(switch, "aria-checked"), Some("false"));
        assert_eq!(doc.tree().element(id(&doc, "updates-value")).unwrap().value(), "false");
        assert_eq!(doc.tree().get_attr(id(&doc, "switch-img"), "src"), Some("images/switch-off.png"));
    }

    #[test]
    fn test_blur_validation() {
        let (mut doc, form) = setup();
        let phone = id(&doc, "phone");
        doc.tree.set_value(phone, "6131231234").unwrap();
        let err = form.handle_blur(&mut doc, phone).unwrap().unwrap();
        assert_eq!(err.message, "Phone number must be in the format 613-123-1234.");
        assert_eq!(doc.tree().get_attr(phone, "aria-invalid"), Some("true"));

        doc.tree.set_value(phone, "613-123-1234").unwrap();
        assert_eq!(form.handle_blur(&mut doc, phone).unwrap(), None);
        assert_eq!(text(&doc, "phone-error"), "");
        assert!(!doc.tree().has_attr(phone, "aria-invalid"));

        // Not a blur-validated field
        let event_text = id(&doc, "event-text");
        assert_eq!(form.handle_blur(&mut doc, event_text).unwrap(), None);
    }

    #[test]
    fn test_on_toggle_ignores_other_controls() {
        let (mut doc, form) = setup();
        let workshop = id(&doc, "topic-workshop");
        assert_eq!(form.on_toggle(&mut doc, workshop).unwrap(), None);
    }
}
