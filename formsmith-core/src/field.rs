//! Form fields - the building blocks of form steps.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::FormError;

/// Unique identifier for a field.
///
/// Generated as a UUID v4 string for new fields. Imported documents may
/// carry arbitrary id strings; they are accepted as-is.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(String);

impl FieldId {
    /// Create a new unique field ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wrap an existing identifier string.
    #[must_use]
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for FieldId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for FieldId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The set of field types offered by the palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Single-line text input.
    Text,
    /// Multi-line text input.
    Textarea,
    /// Numeric input.
    Number,
    /// Email address input.
    Email,
    /// Masked password input.
    Password,
    /// Dropdown with a list of options.
    Select,
    /// Checkbox.
    Checkbox,
    /// Radio button group.
    Radio,
    /// Date picker.
    Date,
}

impl FieldType {
    /// All palette types in display order.
    pub const ALL: [Self; 9] = [
        Self::Text,
        Self::Textarea,
        Self::Number,
        Self::Email,
        Self::Password,
        Self::Select,
        Self::Checkbox,
        Self::Radio,
        Self::Date,
    ];

    /// The wire name of this type (`text`, `select`, ...).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Number => "number",
            Self::Email => "email",
            Self::Password => "password",
            Self::Select => "select",
            Self::Checkbox => "checkbox",
            Self::Radio => "radio",
            Self::Date => "date",
        }
    }

    /// Whether fields of this type carry a list of options.
    #[must_use]
    pub fn is_choice(self) -> bool {
        matches!(self, Self::Select | Self::Checkbox | Self::Radio)
    }

    /// Default label for a freshly created field of this type.
    #[must_use]
    pub fn default_label(self) -> &'static str {
        match self {
            Self::Text => "Text Field",
            Self::Textarea => "Textarea Field",
            Self::Number => "Number Field",
            Self::Email => "Email Field",
            Self::Password => "Password Field",
            Self::Select => "Dropdown Field",
            Self::Checkbox => "Checkbox Field",
            Self::Radio => "Radio Field",
            Self::Date => "Date Field",
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FieldType {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field_type| field_type.as_str() == s)
            .ok_or_else(|| FormError::UnknownFieldType(s.to_string()))
    }
}

/// One choice in a select/radio/checkbox field.
///
/// `value` carries no uniqueness constraint; duplicate values are kept
/// as entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    /// Text shown to the user.
    pub label: String,
    /// Value submitted as form data.
    pub value: String,
}

impl FieldOption {
    /// Create an option.
    #[must_use]
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }

    /// The default option at 1-based position `n` ("Option N" / "optionN").
    #[must_use]
    pub fn numbered(n: usize) -> Self {
        Self::new(format!("Option {n}"), format!("option{n}"))
    }
}

/// Per-field validation rules.
///
/// Every rule is optional; an absent rule is not enforced. There is no
/// cross-check that `min_length <= max_length`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldValidation {
    /// The field must have a non-empty value.
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,
    /// Minimum value length, counted in characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    /// Maximum value length, counted in characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// Regex source the whole value must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Custom message shown when the pattern rule fails.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern_error: Option<String>,
}

// serde's skip_serializing_if passes the field by reference
#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(flag: &bool) -> bool {
    !*flag
}

impl FieldValidation {
    /// Rule set with only `required` enforced.
    #[must_use]
    pub fn required() -> Self {
        Self {
            required: true,
            ..Self::default()
        }
    }

    /// Set the minimum length rule.
    #[must_use]
    pub fn with_min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    /// Set the maximum length rule.
    #[must_use]
    pub fn with_max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    /// Set the pattern rule.
    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Set the custom pattern failure message.
    #[must_use]
    pub fn with_pattern_error(mut self, message: impl Into<String>) -> Self {
        self.pattern_error = Some(message.into());
        self
    }
}

/// The control a field renders as, with the attributes specific to it.
///
/// Only the choice controls (`Select`, `Checkbox`, `Radio`) carry
/// options; every other variant has none to carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
    /// Single-line text input.
    Text,
    /// Multi-line text input.
    Textarea,
    /// Numeric input.
    Number,
    /// Email address input.
    Email,
    /// Masked password input.
    Password,
    /// A dropdown.
    Select {
        /// Selectable options, in display order.
        options: Vec<FieldOption>,
    },
    /// A checkbox.
    Checkbox {
        /// Options, in display order.
        options: Vec<FieldOption>,
    },
    /// A radio button group.
    Radio {
        /// Selectable options, in display order.
        options: Vec<FieldOption>,
    },
    /// Date picker input.
    Date,
}

impl FieldKind {
    /// Build the kind for a palette type.
    ///
    /// Choice controls start with two default options so the preview has
    /// something to render.
    #[must_use]
    pub fn new(field_type: FieldType) -> Self {
        Self::from_parts(field_type, field_type.is_choice().then(default_options))
    }

    /// Build a kind from a type token and an optional option list.
    ///
    /// Choice controls take the given options (an absent list, as in an
    /// imported document, means no options). Options passed for a
    /// non-choice type are dropped.
    #[must_use]
    pub fn from_parts(field_type: FieldType, options: Option<Vec<FieldOption>>) -> Self {
        let options = || options.unwrap_or_default();
        match field_type {
            FieldType::Text => Self::Text,
            FieldType::Textarea => Self::Textarea,
            FieldType::Number => Self::Number,
            FieldType::Email => Self::Email,
            FieldType::Password => Self::Password,
            FieldType::Select => Self::Select { options: options() },
            FieldType::Checkbox => Self::Checkbox { options: options() },
            FieldType::Radio => Self::Radio { options: options() },
            FieldType::Date => Self::Date,
        }
    }

    /// The palette type of this kind.
    #[must_use]
    pub fn field_type(&self) -> FieldType {
        match self {
            Self::Text => FieldType::Text,
            Self::Textarea => FieldType::Textarea,
            Self::Number => FieldType::Number,
            Self::Email => FieldType::Email,
            Self::Password => FieldType::Password,
            Self::Select { .. } => FieldType::Select,
            Self::Checkbox { .. } => FieldType::Checkbox,
            Self::Radio { .. } => FieldType::Radio,
            Self::Date => FieldType::Date,
        }
    }

    /// Options of a choice control, if this is one.
    #[must_use]
    pub fn options(&self) -> Option<&[FieldOption]> {
        match self {
            Self::Select { options } | Self::Checkbox { options } | Self::Radio { options } => {
                Some(options)
            }
            _ => None,
        }
    }

    /// Mutable options of a choice control, if this is one.
    pub fn options_mut(&mut self) -> Option<&mut Vec<FieldOption>> {
        match self {
            Self::Select { options } | Self::Checkbox { options } | Self::Radio { options } => {
                Some(options)
            }
            _ => None,
        }
    }
}

fn default_options() -> Vec<FieldOption> {
    vec![FieldOption::numbered(1), FieldOption::numbered(2)]
}

/// A single form input with its configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    /// Unique identifier, immutable after creation.
    pub id: FieldId,
    /// The control this field renders as.
    pub kind: FieldKind,
    /// Label shown above the control.
    pub label: String,
    /// Form-data key. Not required to be unique within a step.
    pub name: String,
    /// Placeholder text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Help text shown under the control.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    /// Validation rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<FieldValidation>,
}

impl FormField {
    /// Create a field with a fresh id.
    #[must_use]
    pub fn new(kind: FieldKind, label: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: FieldId::new(),
            kind,
            label: label.into(),
            name: name.into(),
            placeholder: None,
            help_text: None,
            validation: None,
        }
    }

    /// Set the placeholder.
    #[must_use]
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Set the help text.
    #[must_use]
    pub fn with_help_text(mut self, help_text: impl Into<String>) -> Self {
        self.help_text = Some(help_text.into());
        self
    }

    /// Set the validation rules.
    #[must_use]
    pub fn with_validation(mut self, validation: FieldValidation) -> Self {
        self.validation = Some(validation);
        self
    }
}
