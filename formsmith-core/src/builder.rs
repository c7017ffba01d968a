//! Builder state: the controller mediating UI events and the document.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::{
    FieldId, FieldKind, FieldType, FormError, FormField, FormResult, FormStep, FormTemplate,
};

/// Simulated viewport width for the live preview.
///
/// Affects only rendered layout, never document data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewDevice {
    /// Full-width preview.
    #[default]
    Desktop,
    /// Tablet-width preview frame.
    Tablet,
    /// Phone-width preview frame.
    Mobile,
}

/// The form being edited plus the transient editor state around it.
///
/// All mutations go through this type; the document is never touched
/// from outside it. Every operation runs to completion before the next
/// one starts, so consumers always read a consistent snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormBuilder {
    current_form: FormTemplate,
    current_step_index: usize,
    selected_field_id: Option<FieldId>,
    preview_device: PreviewDevice,
    last_saved: Option<u64>,
}

impl FormBuilder {
    /// Start editing a fresh blank form.
    #[must_use]
    pub fn new() -> Self {
        Self::from_template(FormTemplate::blank())
    }

    /// Start editing the given template.
    #[must_use]
    pub fn from_template(template: FormTemplate) -> Self {
        Self {
            current_form: template,
            current_step_index: 0,
            selected_field_id: None,
            preview_device: PreviewDevice::default(),
            last_saved: None,
        }
    }

    /// The form document being edited.
    #[must_use]
    pub fn form(&self) -> &FormTemplate {
        &self.current_form
    }

    /// Index of the step currently being edited.
    #[must_use]
    pub fn current_step_index(&self) -> usize {
        self.current_step_index
    }

    /// The step currently being edited.
    #[must_use]
    #[allow(clippy::missing_panics_doc)] // index kept in range by every mutation
    pub fn current_step(&self) -> &FormStep {
        &self.current_form.steps[self.current_step_index]
    }

    /// Id of the selected field, if any.
    #[must_use]
    pub fn selected_field_id(&self) -> Option<&FieldId> {
        self.selected_field_id.as_ref()
    }

    /// The active preview viewport.
    #[must_use]
    pub fn preview_device(&self) -> PreviewDevice {
        self.preview_device
    }

    /// Millisecond timestamp of the last save, if any.
    #[must_use]
    pub fn last_saved(&self) -> Option<u64> {
        self.last_saved
    }

    /// Create a field of the given type, append it to the current step,
    /// and select it.
    ///
    /// The label defaults per type; the name is the first unused
    /// `field_{type}_{n}` in the document, so repeated creation never
    /// collides.
    pub fn create_field(&mut self, field_type: FieldType) -> FieldId {
        let field = FormField::new(
            FieldKind::new(field_type),
            field_type.default_label(),
            self.next_field_name(field_type),
        );
        let id = field.id.clone();
        self.current_form.steps[self.current_step_index]
            .fields
            .push(field);
        self.selected_field_id = Some(id.clone());
        tracing::debug!(
            "Created {field_type} field in step {}",
            self.current_step_index
        );
        id
    }

    /// Replace the field with the matching id in whichever step holds
    /// it, preserving its position.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::FieldNotFound`] if no field with that id
    /// exists anywhere in the document.
    pub fn update_field(&mut self, field: FormField) -> FormResult<()> {
        self.current_form.replace_field(field)
    }

    /// Delete a field by id, severing a matching selection.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::FieldNotFound`] if no field with that id
    /// exists anywhere in the document.
    pub fn delete_field(&mut self, id: &FieldId) -> FormResult<FormField> {
        let removed = self.current_form.remove_field(id)?;
        if self.selected_field_id.as_ref() == Some(id) {
            self.selected_field_id = None;
        }
        Ok(removed)
    }

    /// Move a field within the current step so it lands at `to`.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::IndexOutOfRange`] for indices outside the
    /// current step's field range; the step is left untouched.
    pub fn reorder_fields(&mut self, from: usize, to: usize) -> FormResult<()> {
        self.current_form
            .reorder_fields(self.current_step_index, from, to)
    }

    /// Append a new empty step and switch the editor to it.
    pub fn add_step(&mut self) -> usize {
        self.current_step_index = self.current_form.add_step();
        self.current_step_index
    }

    /// Delete the step at `index`.
    ///
    /// The current step index is clamped afterwards, preferring the
    /// previous step; a selection pointing into the deleted step is
    /// cleared.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::LastStep`] when `index` names the only
    /// remaining step, [`FormError::IndexOutOfRange`] for an invalid
    /// index. Either way nothing changes.
    pub fn delete_step(&mut self, index: usize) -> FormResult<FormStep> {
        let removed = self.current_form.remove_step(index)?;
        let selection_severed = self
            .selected_field_id
            .as_ref()
            .is_some_and(|selected| removed.position_of(selected).is_some());
        if selection_severed {
            self.selected_field_id = None;
        }
        if index <= self.current_step_index && self.current_step_index > 0 {
            self.current_step_index -= 1;
        }
        Ok(removed)
    }

    /// Replace the step with the matching id, preserving its position.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::StepNotFound`] if no step with that id
    /// exists.
    pub fn update_step(&mut self, step: FormStep) -> FormResult<()> {
        self.current_form.replace_step(step)
    }

    /// Switch the editor to the step at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::IndexOutOfRange`] for an out-of-range index;
    /// the current step is left unchanged.
    pub fn set_current_step(&mut self, index: usize) -> FormResult<()> {
        if index >= self.current_form.step_count() {
            return Err(FormError::IndexOutOfRange {
                index,
                len: self.current_form.step_count(),
            });
        }
        self.current_step_index = index;
        Ok(())
    }

    /// Select a field for the config panel, or clear the selection.
    ///
    /// The id is not checked against the document; a stale id simply
    /// highlights nothing in the view.
    pub fn select_field(&mut self, id: Option<FieldId>) {
        self.selected_field_id = id;
    }

    /// Rename the form.
    pub fn set_form_name(&mut self, name: impl Into<String>) {
        self.current_form.name = name.into();
    }

    /// Switch the preview viewport.
    pub fn set_preview_device(&mut self, device: PreviewDevice) {
        self.preview_device = device;
    }

    /// Replace the document with a fresh blank form.
    pub fn create_new_form(&mut self) {
        self.current_form = FormTemplate::blank();
        self.current_step_index = 0;
        self.selected_field_id = None;
    }

    /// Replace the document wholesale with the given template.
    pub fn load_template(&mut self, template: FormTemplate) {
        tracing::debug!("Loading template {} ({})", template.name, template.id);
        self.current_form = template;
        self.current_step_index = 0;
        self.selected_field_id = None;
    }

    /// Record the save instant and return it.
    ///
    /// The persistence mechanism itself lives outside the core.
    pub fn save_form(&mut self) -> u64 {
        let stamp = timestamp_ms();
        self.last_saved = Some(stamp);
        stamp
    }

    /// Opaque shareable URL for the current form.
    #[must_use]
    pub fn share_link(&self, base: &str) -> String {
        format!("{}/f/{}", base.trim_end_matches('/'), self.current_form.id)
    }

    /// First `field_{type}_{n}` name not yet used in the document.
    fn next_field_name(&self, field_type: FieldType) -> String {
        let mut n = 1usize;
        loop {
            let candidate = format!("field_{field_type}_{n}");
            if !self.current_form.has_field_name(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}

impl Default for FormBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Current Unix timestamp in milliseconds.
fn timestamp_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |d| {
        // Timestamp will not exceed u64 max for millennia
        #[allow(clippy::cast_possible_truncation)]
        {
            d.as_millis() as u64
        }
    })
}
