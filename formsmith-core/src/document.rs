//! Form document tree: templates and the steps they own.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{FieldId, FormError, FormField, FormResult};

/// Unique identifier for a step.
///
/// Generated as a UUID v4 string for new steps; imported documents may
/// carry arbitrary id strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepId(String);

impl StepId {
    /// Create a new unique step ID.
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

impl Default for StepId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for StepId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An ordered group of fields shown together in a multi-step form.
///
/// Field order determines both editor display order and preview
/// rendering order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormStep {
    /// Unique identifier.
    pub id: StepId,
    /// Title shown in the step list and the preview.
    pub title: String,
    /// Fields in display order.
    pub fields: Vec<FormField>,
}

impl FormStep {
    /// Create an empty step with a fresh id.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: StepId::new(),
            title: title.into(),
            fields: Vec::new(),
        }
    }

    /// Number of fields in the step.
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Position of a field within the step.
    #[must_use]
    pub fn position_of(&self, id: &FieldId) -> Option<usize> {
        self.fields.iter().position(|field| &field.id == id)
    }
}

/// A full form document: name, description, ordered steps.
///
/// A template holds at least one step at all times; the operations here
/// refuse any mutation that would leave it empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormTemplate {
    /// Unique identifier.
    pub id: String,
    /// Form name, shown in the header and used for the export filename.
    pub name: String,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Steps in display and navigation order.
    pub steps: Vec<FormStep>,
}

impl FormTemplate {
    /// Create a blank template: a generated id and one empty step.
    #[must_use]
    pub fn blank() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: "Untitled Form".to_string(),
            description: None,
            steps: vec![FormStep::new("Step 1")],
        }
    }

    /// Number of steps.
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Total number of fields across all steps.
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.steps.iter().map(FormStep::field_count).sum()
    }

    /// Iterate all fields in document order.
    pub fn fields(&self) -> impl Iterator<Item = &FormField> {
        self.steps.iter().flat_map(|step| step.fields.iter())
    }

    /// Get a field by id, searching every step.
    #[must_use]
    pub fn field(&self, id: &FieldId) -> Option<&FormField> {
        self.fields().find(|field| &field.id == id)
    }

    /// Index of the step containing a field.
    #[must_use]
    pub fn step_containing(&self, id: &FieldId) -> Option<usize> {
        self.steps.iter().position(|step| step.position_of(id).is_some())
    }

    /// Whether any field in the document uses the given form-data name.
    #[must_use]
    pub fn has_field_name(&self, name: &str) -> bool {
        self.fields().any(|field| field.name == name)
    }

    /// Replace the field with the matching id, preserving its position.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::FieldNotFound`] if no field with that id
    /// exists anywhere in the document.
    pub fn replace_field(&mut self, field: FormField) -> FormResult<()> {
        for step in &mut self.steps {
            if let Some(position) = step.position_of(&field.id) {
                step.fields[position] = field;
                return Ok(());
            }
        }
        Err(FormError::FieldNotFound(field.id.to_string()))
    }

    /// Remove a field by id from whichever step contains it.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::FieldNotFound`] if no field with that id
    /// exists anywhere in the document.
    pub fn remove_field(&mut self, id: &FieldId) -> FormResult<FormField> {
        for step in &mut self.steps {
            if let Some(position) = step.position_of(id) {
                return Ok(step.fields.remove(position));
            }
        }
        Err(FormError::FieldNotFound(id.to_string()))
    }

    /// Move a field within a step so it lands at index `to`.
    ///
    /// Intervening fields shift by one position; moving a field onto
    /// itself is a no-op. Indices outside the field range are rejected
    /// before anything is touched.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::IndexOutOfRange`] for an invalid step or
    /// field index.
    pub fn reorder_fields(&mut self, step_index: usize, from: usize, to: usize) -> FormResult<()> {
        let step_count = self.steps.len();
        let step = self
            .steps
            .get_mut(step_index)
            .ok_or(FormError::IndexOutOfRange {
                index: step_index,
                len: step_count,
            })?;

        let len = step.fields.len();
        for index in [from, to] {
            if index >= len {
                return Err(FormError::IndexOutOfRange { index, len });
            }
        }
        if from == to {
            return Ok(());
        }

        let field = step.fields.remove(from);
        step.fields.insert(to, field);
        Ok(())
    }

    /// Append a new empty step titled `Step {n}` and return its index.
    pub fn add_step(&mut self) -> usize {
        let title = format!("Step {}", self.steps.len() + 1);
        self.steps.push(FormStep::new(title));
        self.steps.len() - 1
    }

    /// Remove the step at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::LastStep`] when it is the only remaining
    /// step, [`FormError::IndexOutOfRange`] for an invalid index. Either
    /// way the document is left untouched.
    pub fn remove_step(&mut self, index: usize) -> FormResult<FormStep> {
        if index >= self.steps.len() {
            return Err(FormError::IndexOutOfRange {
                index,
                len: self.steps.len(),
            });
        }
        if self.steps.len() == 1 {
            return Err(FormError::LastStep);
        }
        Ok(self.steps.remove(index))
    }

    /// Replace the step with the matching id, preserving its position.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::StepNotFound`] if no step with that id
    /// exists.
    pub fn replace_step(&mut self, step: FormStep) -> FormResult<()> {
        let position = self
            .steps
            .iter()
            .position(|existing| existing.id == step.id)
            .ok_or_else(|| FormError::StepNotFound(step.id.to_string()))?;
        self.steps[position] = step;
        Ok(())
    }
}
