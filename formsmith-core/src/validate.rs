//! Field validation evaluator.
//!
//! A pure mapping from a field definition and a candidate value to
//! either "valid" or a human-readable error message. The preview
//! re-runs it on every change to a field's value; failures never block
//! other fields from being edited.

use std::collections::HashMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{FormField, FormStep};

/// A candidate value entered in the preview.
///
/// Mirrors what form controls produce: text-like inputs yield strings,
/// checkboxes yield booleans, multi-selects yield lists of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// No value entered yet.
    Null,
    /// A boolean from a checkbox.
    Checked(bool),
    /// A single text value.
    Text(String),
    /// A list of selected values.
    Many(Vec<String>),
}

impl FieldValue {
    /// Whether the value counts as empty for the `required` rule.
    ///
    /// Empty covers null, the empty string, an empty list, and an
    /// unchecked checkbox.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Checked(checked) => !checked,
            Self::Text(text) => text.is_empty(),
            Self::Many(values) => values.is_empty(),
        }
    }

    /// The string content, when this is a single text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<bool> for FieldValue {
    fn from(checked: bool) -> Self {
        Self::Checked(checked)
    }
}

/// Evaluate a field's validation rules against a candidate value.
///
/// Rules run in a fixed order and the first failure wins: required,
/// minimum length, maximum length, pattern. The length and pattern
/// rules apply only to text values; booleans and lists skip them even
/// when configured. Returns `None` when the field has no rules or every
/// rule passes.
#[must_use]
pub fn evaluate(field: &FormField, value: &FieldValue) -> Option<String> {
    let rules = field.validation.as_ref()?;

    if rules.required && value.is_empty() {
        return Some("This field is required".to_string());
    }

    let text = value.as_text()?;
    let length = text.chars().count();

    if let Some(min) = rules.min_length {
        if length < min {
            return Some(format!("Minimum length is {min} characters"));
        }
    }

    if let Some(max) = rules.max_length {
        if length > max {
            return Some(format!("Maximum length is {max} characters"));
        }
    }

    if let Some(pattern) = rules.pattern.as_deref() {
        match full_match_regex(pattern) {
            Ok(regex) => {
                if !regex.is_match(text) {
                    return Some(
                        rules
                            .pattern_error
                            .clone()
                            .unwrap_or_else(|| "Invalid format".to_string()),
                    );
                }
            }
            Err(err) => {
                // A typo in an editor-entered regex must not wedge the preview.
                tracing::warn!("Skipping uncompilable pattern {pattern:?}: {err}");
            }
        }
    }

    None
}

/// Evaluate every field of a step against a map of candidate values.
///
/// Values are looked up by field name; missing entries count as null.
/// Returns a field-name to message map holding only the failures.
#[must_use]
pub fn evaluate_step(step: &FormStep, values: &HashMap<String, FieldValue>) -> HashMap<String, String> {
    let null = FieldValue::Null;
    let mut errors = HashMap::new();
    for field in &step.fields {
        let value = values.get(&field.name).unwrap_or(&null);
        if let Some(message) = evaluate(field, value) {
            errors.insert(field.name.clone(), message);
        }
    }
    errors
}

/// Compile a pattern anchored to the whole value.
fn full_match_regex(source: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{source})$"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FieldKind, FieldValidation, FormField};

    fn text_field(validation: FieldValidation) -> FormField {
        FormField::new(FieldKind::Text, "Text Field", "field_text_1").with_validation(validation)
    }

    #[test]
    fn test_required_empty_string_fails() {
        let field = text_field(FieldValidation::required());
        assert_eq!(
            evaluate(&field, &FieldValue::from("")),
            Some("This field is required".to_string())
        );
    }

    #[test]
    fn test_required_null_fails() {
        let field = text_field(FieldValidation::required());
        assert_eq!(
            evaluate(&field, &FieldValue::Null),
            Some("This field is required".to_string())
        );
    }

    #[test]
    fn test_min_length_fails_short_value() {
        let field = text_field(FieldValidation::default().with_min_length(5));
        assert_eq!(
            evaluate(&field, &FieldValue::from("abc")),
            Some("Minimum length is 5 characters".to_string())
        );
    }

    #[test]
    fn test_max_length_fails_long_value() {
        let field = text_field(FieldValidation::default().with_max_length(3));
        assert_eq!(
            evaluate(&field, &FieldValue::from("abcd")),
            Some("Maximum length is 3 characters".to_string())
        );
    }

    #[test]
    fn test_pattern_mismatch_uses_default_message() {
        let field = FormField::new(FieldKind::Email, "Email Field", "field_email_1")
            .with_validation(FieldValidation::default().with_pattern(r"[\w.-]+@[\w.-]+\.\w+"));
        assert_eq!(
            evaluate(&field, &FieldValue::from("not-an-email")),
            Some("Invalid format".to_string())
        );
        assert_eq!(evaluate(&field, &FieldValue::from("a@b.co")), None);
    }

    #[test]
    fn test_pattern_mismatch_prefers_custom_message() {
        let field = text_field(
            FieldValidation::default()
                .with_pattern("[0-9]+")
                .with_pattern_error("Digits only"),
        );
        assert_eq!(
            evaluate(&field, &FieldValue::from("abc")),
            Some("Digits only".to_string())
        );
    }

    #[test]
    fn test_pattern_is_anchored_to_whole_value() {
        let field = text_field(FieldValidation::default().with_pattern("[0-9]+"));
        // A substring match is not enough.
        assert!(evaluate(&field, &FieldValue::from("abc123")).is_some());
        assert_eq!(evaluate(&field, &FieldValue::from("123")), None);
    }

    #[test]
    fn test_already_anchored_patterns_still_match() {
        let field = FormField::new(FieldKind::Email, "Email Field", "field_email_1")
            .with_validation(
                FieldValidation::default().with_pattern(r"^[\w.-]+@[\w.-]+\.\w+$"),
            );
        assert_eq!(evaluate(&field, &FieldValue::from("a@b.co")), None);
        assert_eq!(
            evaluate(&field, &FieldValue::from("not-an-email")),
            Some("Invalid format".to_string())
        );
    }

    #[test]
    fn test_checked_checkbox_passes_required() {
        let field = FormField::new(FieldKind::new(crate::FieldType::Checkbox), "Checkbox Field", "field_checkbox_1")
            .with_validation(FieldValidation::required());
        assert_eq!(evaluate(&field, &FieldValue::from(true)), None);
    }

    #[test]
    fn test_unchecked_checkbox_fails_required() {
        let field = FormField::new(FieldKind::new(crate::FieldType::Checkbox), "Checkbox Field", "field_checkbox_1")
            .with_validation(FieldValidation::required());
        assert_eq!(
            evaluate(&field, &FieldValue::from(false)),
            Some("This field is required".to_string())
        );
    }

    #[test]
    fn test_non_string_values_skip_length_and_pattern() {
        let field = text_field(
            FieldValidation::default()
                .with_min_length(5)
                .with_pattern("[0-9]+"),
        );
        assert_eq!(evaluate(&field, &FieldValue::from(true)), None);
        assert_eq!(
            evaluate(&field, &FieldValue::Many(vec!["a".to_string()])),
            None
        );
    }

    #[test]
    fn test_no_validation_always_passes() {
        let field = FormField::new(FieldKind::Text, "Text Field", "field_text_1");
        assert_eq!(evaluate(&field, &FieldValue::Null), None);
        assert_eq!(evaluate(&field, &FieldValue::from("anything")), None);
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let field = text_field(FieldValidation::default().with_max_length(3));
        assert_eq!(evaluate(&field, &FieldValue::from("äöü")), None);
    }

    #[test]
    fn test_uncompilable_pattern_is_skipped() {
        let field = text_field(FieldValidation::default().with_pattern("(unclosed"));
        assert_eq!(evaluate(&field, &FieldValue::from("anything")), None);
    }

    #[test]
    fn test_rule_order_required_wins_over_min_length() {
        let field = text_field(FieldValidation::required().with_min_length(5));
        assert_eq!(
            evaluate(&field, &FieldValue::from("")),
            Some("This field is required".to_string())
        );
    }

    #[test]
    fn test_evaluate_step_collects_failures_by_name() {
        let mut step = FormStep::new("Step 1");
        step.fields.push(text_field(FieldValidation::required()));
        step.fields.push(
            FormField::new(FieldKind::Text, "Nickname", "nickname")
                .with_validation(FieldValidation::default().with_min_length(2)),
        );

        let mut values = HashMap::new();
        values.insert("nickname".to_string(), FieldValue::from("x"));

        let errors = evaluate_step(&step, &values);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors["field_text_1"], "This field is required");
        assert_eq!(errors["nickname"], "Minimum length is 2 characters");
    }

    #[test]
    fn test_field_value_deserializes_untagged() {
        assert_eq!(
            serde_json::from_str::<FieldValue>("null").expect("null"),
            FieldValue::Null
        );
        assert_eq!(
            serde_json::from_str::<FieldValue>("true").expect("bool"),
            FieldValue::Checked(true)
        );
        assert_eq!(
            serde_json::from_str::<FieldValue>(r#""hi""#).expect("string"),
            FieldValue::Text("hi".to_string())
        );
        assert_eq!(
            serde_json::from_str::<FieldValue>(r#"["a","b"]"#).expect("list"),
            FieldValue::Many(vec!["a".to_string(), "b".to_string()])
        );
    }
}
