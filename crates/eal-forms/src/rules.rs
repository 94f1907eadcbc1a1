//! Form description: which fields are checked how, which checkboxes reveal
//! which blocks, and the status messages. Deserializable from the site
//! configuration; `Default` describes the Empower Ability Labs form.

use serde::Deserialize;

/// How a field is checked
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "rule", rename_all = "kebab-case")]
pub enum RuleKind {
    /// Required, and a valid email address
    Email,
    /// Optional; when filled it must match the field's `pattern` attribute
    Pattern,
    /// At least one checkbox named `name` is checked. `fieldset` locates the
    /// group element that receives `aria-invalid`.
    CheckboxGroup { name: String, fieldset: String },
    /// Required while the checkbox with id `controller` is checked
    RequiredWhen { controller: String },
}

/// Validation rule for one field. Errors are rendered into `<field>-error`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldRule {
    pub field: String,
    #[serde(flatten)]
    pub kind: RuleKind,
    pub message: String,
}

impl FieldRule {
    pub fn new(field: &str, kind: RuleKind, message: &str) -> Self {
        Self { field: field.to_string(), kind, message: message.to_string() }
    }

    /// Id of the element showing this field's error text
    pub fn error_id(&self) -> String {
        format!("{}-error", self.field)
    }
}

/// A checkbox that shows or hides a block
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DisclosureConfig {
    /// Selector of the controlling checkbox
    pub control: String,
    /// Selector of the block shown while checked
    pub target: String,
    /// Field ids emptied (value and error text) on collapse
    #[serde(default)]
    pub clears: Vec<String>,
    /// Collapse after a successful submit
    #[serde(default)]
    pub collapse_on_success: bool,
}

/// Status region text and classes
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StatusMessages {
    pub failure: String,
    pub failure_class: String,
    pub success: String,
    pub success_class: String,
}

impl Default for StatusMessages {
    fn default() -> Self {
        Self {
            failure: "Submission failed: Please correct the highlighted errors.".into(),
            failure_class: "form-status error-status".into(),
            success: "Thank you! Your call has been successfully scheduled. We will be in touch soon.".into(),
            success_class: "form-status success-status".into(),
        }
    }
}

/// Complete form description
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Id of the `<form>`
    pub form: String,
    /// Id of the status live region
    pub status: String,
    /// Class shared by all error text elements
    pub error_class: String,
    /// Rules in validation order; the first failing one receives focus
    pub rules: Vec<FieldRule>,
    /// Fields validated when they lose focus
    pub validate_on_blur: Vec<String>,
    pub disclosures: Vec<DisclosureConfig>,
    pub messages: StatusMessages,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            form: "schedule-form".into(),
            status: "form-status".into(),
            error_class: "error".into(),
            rules: vec![
                FieldRule::new("email", RuleKind::Email, "A valid email is required."),
                FieldRule::new("phone", RuleKind::Pattern, "Phone number must be in the format 613-123-1234."),
                FieldRule::new(
                    "topic",
                    RuleKind::CheckboxGroup { name: "topic".into(), fieldset: ".form-fieldset".into() },
                    "Select at least one topic.",
                ),
                FieldRule::new(
                    "event-text",
                    RuleKind::RequiredWhen { controller: "topic-speaker".into() },
                    "Please describe your event for speaker requests.",
                ),
            ],
            validate_on_blur: vec!["email".into(), "phone".into()],
            disclosures: vec![
                DisclosureConfig {
                    control: "#topic-speaker".into(),
                    target: "#event-details".into(),
                    clears: vec!["event-text".into()],
                    collapse_on_success: true,
                },
                DisclosureConfig {
                    control: r#"#interactive .interactive-preview input[type="checkbox"]"#.into(),
                    target: "#interactive #feedback-sample".into(),
                    clears: Vec::new(),
                    collapse_on_success: false,
                },
            ],
            messages: StatusMessages::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rule_order() {
        let config = FormConfig::default();
        let fields: Vec<&str> = config.rules.iter().map(|r| r.field.as_str()).collect();
        assert_eq!(fields, ["email", "phone", "topic", "event-text"]);
        assert_eq!(config.rules[2].error_id(), "topic-error");
    }
}
