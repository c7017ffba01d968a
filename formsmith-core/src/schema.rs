//! Canonical serialized representation for form documents.
//!
//! This is the import/export JSON shape: `camelCase` keys, a flat
//! `type` string per field, and `options`/`validation` present only
//! when set.
//! Conversions are lossless in both directions; import validates the
//! whole document before anything replaces the editor state.

use serde::{Deserialize, Serialize};

use crate::{
    FieldId, FieldKind, FieldOption, FieldType, FieldValidation, FormError, FormField, FormResult,
    FormStep, FormTemplate, StepId,
};

/// Document-friendly field description.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDocument {
    /// Field identifier.
    pub id: String,
    /// Field type name (`text`, `select`, ...).
    #[serde(rename = "type")]
    pub field_type: String,
    /// Label shown above the control.
    #[serde(default)]
    pub label: String,
    /// Form-data key.
    #[serde(default)]
    pub name: String,
    /// Placeholder text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Help text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    /// Options for choice fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<FieldOption>>,
    /// Validation rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<FieldValidation>,
}

impl From<&FormField> for FieldDocument {
    fn from(field: &FormField) -> Self {
        Self {
            id: field.id.to_string(),
            field_type: field.kind.field_type().to_string(),
            label: field.label.clone(),
            name: field.name.clone(),
            placeholder: field.placeholder.clone(),
            help_text: field.help_text.clone(),
            options: field.kind.options().map(<[FieldOption]>::to_vec),
            validation: field.validation.clone(),
        }
    }
}

impl FieldDocument {
    /// Convert the document into a runtime field.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::UnknownFieldType`] when `type` is not one of
    /// the supported field types.
    pub fn into_field(self) -> FormResult<FormField> {
        let field_type: FieldType = self.field_type.parse()?;
        Ok(FormField {
            id: FieldId::from_string(self.id),
            kind: FieldKind::from_parts(field_type, self.options),
            label: self.label,
            name: self.name,
            placeholder: self.placeholder,
            help_text: self.help_text,
            validation: self.validation,
        })
    }
}

/// Document-friendly step description.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepDocument {
    /// Step identifier.
    pub id: String,
    /// Step title.
    #[serde(default)]
    pub title: String,
    /// Fields in display order.
    #[serde(default)]
    pub fields: Vec<FieldDocument>,
}

impl From<&FormStep> for StepDocument {
    fn from(step: &FormStep) -> Self {
        Self {
            id: step.id.to_string(),
            title: step.title.clone(),
            fields: step.fields.iter().map(FieldDocument::from).collect(),
        }
    }
}

impl StepDocument {
    /// Convert the document into a runtime step.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::UnknownFieldType`] when any field carries an
    /// unsupported type.
    pub fn into_step(self) -> FormResult<FormStep> {
        let fields = self
            .fields
            .into_iter()
            .map(FieldDocument::into_field)
            .collect::<FormResult<Vec<_>>>()?;
        Ok(FormStep {
            id: StepId::from_string(self.id),
            title: self.title,
            fields,
        })
    }
}

/// Canonical form template document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDocument {
    /// Template identifier.
    pub id: String,
    /// Form name.
    pub name: String,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Steps in display order.
    pub steps: Vec<StepDocument>,
}

impl From<&FormTemplate> for TemplateDocument {
    fn from(template: &FormTemplate) -> Self {
        Self {
            id: template.id.clone(),
            name: template.name.clone(),
            description: template.description.clone(),
            steps: template.steps.iter().map(StepDocument::from).collect(),
        }
    }
}

impl TemplateDocument {
    /// Convert the document into a runtime template.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::EmptyTemplate`] when the document has no
    /// steps (loading it would break the one-step invariant) and
    /// [`FormError::UnknownFieldType`] when any field carries an
    /// unsupported type.
    pub fn into_template(self) -> FormResult<FormTemplate> {
        if self.steps.is_empty() {
            return Err(FormError::EmptyTemplate);
        }
        let steps = self
            .steps
            .into_iter()
            .map(StepDocument::into_step)
            .collect::<FormResult<Vec<_>>>()?;
        Ok(FormTemplate {
            id: self.id,
            name: self.name,
            description: self.description,
            steps,
        })
    }

    /// Serialize as the pretty-printed export document.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::Serialization`] if serialization fails.
    pub fn to_json(&self) -> FormResult<String> {
        serde_json::to_string_pretty(self).map_err(FormError::Serialization)
    }

    /// Parse an imported JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::Serialization`] for unparsable JSON or a
    /// document missing required keys.
    pub fn from_json(json: &str) -> FormResult<Self> {
        serde_json::from_str(json).map_err(FormError::Serialization)
    }
}

/// Export filename for a form: `{slugified-name}-{ISO-date}.json`.
#[must_use]
pub fn export_filename(form_name: &str) -> String {
    let date = chrono::Utc::now().format("%Y-%m-%d");
    format!("{}-{date}.json", slugify(form_name))
}

/// Lowercase a name and collapse whitespace runs into single dashes.
fn slugify(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}
