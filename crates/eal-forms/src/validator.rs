//! Field and whole-form validation.
//!
//! Validation only reads the document; rendering errors is the controller's
//! job.

use eal_dom::{Document, NodeId, Selector};
use regex::Regex;

use crate::rules::{FieldRule, RuleKind};
use crate::FormError;

/// WHATWG "valid email address"
const EMAIL_PATTERN: &str = concat!(
    r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@",
    r"[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?",
    r"(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
);

/// A field that failed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Whole-form failure: every message, and the field that gets focus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    pub first_invalid: String,
    pub errors: Vec<FieldError>,
}

impl ValidationFailure {
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.errors.iter().find(|e| e.field == field).map(|e| e.message.as_str())
    }
}

/// Form validation interface
pub trait Validator {
    /// Check one field; `Err` carries the message to show
    fn validate_field(&self, doc: &Document, field_id: &str) -> Result<(), String>;

    /// Check every field in order
    fn validate_all(&self, doc: &Document) -> Result<(), ValidationFailure>;
}

/// Rule-driven validator
#[derive(Debug, Clone)]
pub struct FormValidator {
    rules: Vec<FieldRule>,
    fieldsets: Vec<Option<Selector>>,
    email: Regex,
}

impl FormValidator {
    pub fn new(rules: Vec<FieldRule>) -> Result<Self, FormError> {
        let fieldsets = rules.iter()
            .map(|r| match &r.kind {
                RuleKind::CheckboxGroup { fieldset, .. } => Selector::parse(fieldset).map(Some),
                _ => Ok(None),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules, fieldsets, email: Regex::new(EMAIL_PATTERN)? })
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    pub fn rule(&self, field_id: &str) -> Option<&FieldRule> {
        self.rules.iter().find(|r| r.field == field_id)
    }

    /// Element marked `aria-invalid` (and focused) for a field: the group's
    /// fieldset for checkbox groups, the field itself otherwise
    pub fn invalid_target(&self, doc: &Document, field_id: &str) -> Option<NodeId> {
        let index = self.rules.iter().position(|r| r.field == field_id)?;
        match &self.fieldsets[index] {
            Some(selector) => doc.tree().select_first(NodeId::ROOT, selector),
            None => doc.get_element_by_id(field_id),
        }
    }

    /// Checkboxes of a group, in tree order
    pub fn group_members(doc: &Document, name: &str) -> Vec<NodeId> {
        doc.tree().find_all(NodeId::ROOT, |e| {
            e.tag == "input" && e.input_type() == "checkbox" && e.get_attr("name") == Some(name)
        })
    }

    fn value_of(doc: &Document, id: &str) -> Option<String> {
        let node = doc.get_element_by_id(id)?;
        doc.tree().element(node).map(|e| e.value().to_string())
    }

    fn is_checked(doc: &Document, id: &str) -> bool {
        doc.get_element_by_id(id)
            .and_then(|n| doc.tree().element(n))
            .map(|e| e.checked())
            .unwrap_or(false)
    }

    fn check(&self, doc: &Document, rule: &FieldRule) -> bool {
        match &rule.kind {
            RuleKind::Email => match Self::value_of(doc, &rule.field) {
                Some(value) => {
                    let value = value.trim();
                    !value.is_empty() && self.email.is_match(value)
                }
                None => true,
            },
            RuleKind::Pattern => {
                let Some(node) = doc.get_element_by_id(&rule.field) else { return true };
                let value = Self::value_of(doc, &rule.field).unwrap_or_default();
                let Some(pattern) = doc.tree().get_attr(node, "pattern") else { return true };
                if value.is_empty() {
                    return true;
                }
                match Regex::new(&format!("^(?:{})$", pattern)) {
                    Ok(re) => re.is_match(&value),
                    Err(e) => {
                        // Browsers ignore a pattern that does not compile
                        tracing::warn!("ignoring invalid pattern on #{}: {}", rule.field, e);
                        true
                    }
                }
            }
            RuleKind::CheckboxGroup { name, .. } => {
                Self::group_members(doc, name).into_iter()
                    .any(|n| doc.tree().element(n).map(|e| e.checked()).unwrap_or(false))
            }
            RuleKind::RequiredWhen { controller } => {
                !Self::is_checked(doc, controller)
                    || Self::value_of(doc, &rule.field).map(|v| !v.trim().is_empty()).unwrap_or(true)
            }
        }
    }
}

impl Validator for FormValidator {
    fn validate_field(&self, doc: &Document, field_id: &str) -> Result<(), String> {
        match self.rule(field_id) {
            Some(rule) if !self.check(doc, rule) => Err(rule.message.clone()),
            _ => Ok(()),
        }
    }

    fn validate_all(&self, doc: &Document) -> Result<(), ValidationFailure> {
        let errors: Vec<FieldError> = self.rules.iter()
            .filter(|rule| !self.check(doc, rule))
            .map(|rule| FieldError { field: rule.field.clone(), message: rule.message.clone() })
            .collect();
        match errors.first() {
            None => Ok(()),
            Some(first) => Err(ValidationFailure { first_invalid: first.field.clone(), errors }),
        }
    }
}
