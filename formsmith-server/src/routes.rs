//! API route handlers for the form-builder operations.
//!
//! Every handler validates untrusted input first, then runs the
//! operation under the store's write lock. Structural-mutation failures
//! map to 4xx responses and never leave the document half-changed.

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use formsmith_core::{
    catalog, evaluate, evaluate_step, export_filename, FieldDocument, FieldId, FieldType,
    FieldValue, FormBuilder, FormError, PreviewDevice, StepDocument, TemplateDocument,
};

use crate::validation::{self, ValidationError};
use crate::{metrics, AppState};

/// Error response carrying a status code and a JSON error body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl From<FormError> for ApiError {
    fn from(err: FormError) -> Self {
        let status = match err {
            FormError::FieldNotFound(_) | FormError::StepNotFound(_) => StatusCode::NOT_FOUND,
            FormError::LastStep => StatusCode::CONFLICT,
            _ => StatusCode::BAD_REQUEST,
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

/// Result alias for route handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Snapshot of a session's editor state.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuilderStateResponse {
    /// The form document being edited.
    pub current_form: TemplateDocument,
    /// Index of the step being edited.
    pub current_step_index: usize,
    /// Selected field id, if any.
    pub selected_field_id: Option<String>,
    /// Active preview device.
    pub preview_device: PreviewDevice,
    /// Millisecond timestamp of the last save, if any.
    pub last_saved: Option<u64>,
}

impl From<&FormBuilder> for BuilderStateResponse {
    fn from(builder: &FormBuilder) -> Self {
        Self {
            current_form: TemplateDocument::from(builder.form()),
            current_step_index: builder.current_step_index(),
            selected_field_id: builder.selected_field_id().map(ToString::to_string),
            preview_device: builder.preview_device(),
            last_saved: builder.last_saved(),
        }
    }
}

fn check_session(session_id: &str) -> ApiResult<()> {
    validation::validate_session_id(session_id).map_err(|err| {
        metrics::record_validation_failure("session_id");
        ApiError::bad_request(err.to_string())
    })
}

fn validation_failure(kind: &str, err: &ValidationError) -> ApiError {
    metrics::record_validation_failure(kind);
    ApiError::bad_request(err.to_string())
}

/// List the built-in template catalog.
#[tracing::instrument(name = "list_templates")]
pub async fn list_templates() -> Json<Vec<catalog::TemplateSummary>> {
    Json(catalog::summaries())
}

/// Fetch a built-in template as a full document.
#[tracing::instrument(name = "get_template")]
pub async fn get_template(Path(template_id): Path<String>) -> ApiResult<Json<TemplateDocument>> {
    let template = catalog::find(&template_id)
        .ok_or_else(|| ApiError::not_found(format!("Template not found: {template_id}")))?;
    Ok(Json(TemplateDocument::from(&template)))
}

/// List known session ids.
#[tracing::instrument(name = "list_sessions", skip(state))]
pub async fn list_sessions(State(state): State<AppState>) -> Json<Vec<String>> {
    let mut ids = state.store.session_ids();
    ids.sort();
    Json(ids)
}

/// Get a session's editor state, creating the session on first access.
#[tracing::instrument(name = "get_session", skip(state))]
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<BuilderStateResponse>> {
    check_session(&session_id)?;
    let builder = state.store.get_or_create(&session_id);
    metrics::set_sessions(state.store.session_ids().len());
    Ok(Json(BuilderStateResponse::from(&builder)))
}

/// Parameters for field creation.
#[derive(Debug, Deserialize)]
pub struct CreateFieldParams {
    /// Palette type of the new field.
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

/// Create a field of the given type in the current step and select it.
#[tracing::instrument(name = "create_field", skip(state))]
pub async fn create_field(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(params): Json<CreateFieldParams>,
) -> ApiResult<(StatusCode, Json<FieldDocument>)> {
    check_session(&session_id)?;

    let snapshot = state.store.get_or_create(&session_id);
    validation::validate_field_count(snapshot.current_step().field_count())
        .map_err(|err| validation_failure("field_count", &err))?;

    let (field, total_fields) = state.store.update(&session_id, |builder| {
        let id = builder.create_field(params.field_type);
        let field = builder
            .form()
            .field(&id)
            .cloned()
            .ok_or_else(|| FormError::FieldNotFound(id.to_string()))?;
        Ok((field, builder.form().field_count()))
    })?;

    metrics::record_operation("create_field", true);
    metrics::set_form_fields(&session_id, total_fields);
    Ok((StatusCode::CREATED, Json(FieldDocument::from(&field))))
}

/// Replace a field wherever it lives, preserving its position.
#[tracing::instrument(name = "update_field", skip(state, document))]
pub async fn update_field(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(document): Json<FieldDocument>,
) -> ApiResult<StatusCode> {
    check_session(&session_id)?;
    validation::validate_name("label", &document.label)
        .map_err(|err| validation_failure("label", &err))?;
    validation::validate_name("name", &document.name)
        .map_err(|err| validation_failure("name", &err))?;
    if let Some(options) = &document.options {
        validation::validate_option_count(options.len())
            .map_err(|err| validation_failure("options", &err))?;
    }
    if let Some(pattern) = document
        .validation
        .as_ref()
        .and_then(|rules| rules.pattern.as_deref())
    {
        validation::validate_pattern(pattern)
            .map_err(|err| validation_failure("pattern", &err))?;
    }

    let field = document.into_field()?;
    let result = state.store.update(&session_id, |builder| builder.update_field(field));
    metrics::record_operation("update_field", result.is_ok());
    result?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a field by id, severing a matching selection.
#[tracing::instrument(name = "delete_field", skip(state))]
pub async fn delete_field(
    State(state): State<AppState>,
    Path((session_id, field_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    check_session(&session_id)?;
    let id = FieldId::from_string(field_id);
    let result = state.store.update(&session_id, |builder| builder.delete_field(&id));
    metrics::record_operation("delete_field", result.is_ok());
    result?;
    Ok(StatusCode::NO_CONTENT)
}

/// Parameters for field reordering.
#[derive(Debug, Deserialize)]
pub struct ReorderParams {
    /// Index the field currently occupies.
    pub from: usize,
    /// Index the field should land at.
    pub to: usize,
}

/// Move a field within the current step.
#[tracing::instrument(name = "reorder_fields", skip(state))]
pub async fn reorder_fields(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(params): Json<ReorderParams>,
) -> ApiResult<StatusCode> {
    check_session(&session_id)?;
    let result = state
        .store
        .update(&session_id, |builder| builder.reorder_fields(params.from, params.to));
    metrics::record_operation("reorder_fields", result.is_ok());
    result?;
    Ok(StatusCode::NO_CONTENT)
}

/// Response for step creation.
#[derive(Debug, Serialize)]
pub struct AddStepResponse {
    /// Index of the new step.
    pub index: usize,
    /// The new step.
    pub step: StepDocument,
}

/// Append a new empty step and switch the editor to it.
#[tracing::instrument(name = "add_step", skip(state))]
pub async fn add_step(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<(StatusCode, Json<AddStepResponse>)> {
    check_session(&session_id)?;
    let response = state.store.update(&session_id, |builder| {
        let index = builder.add_step();
        Ok(AddStepResponse {
            index,
            step: StepDocument::from(builder.current_step()),
        })
    })?;
    metrics::record_operation("add_step", true);
    Ok((StatusCode::CREATED, Json(response)))
}

/// Replace a step by id, preserving its position.
#[tracing::instrument(name = "update_step", skip(state, document))]
pub async fn update_step(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(document): Json<StepDocument>,
) -> ApiResult<StatusCode> {
    check_session(&session_id)?;
    validation::validate_name("title", &document.title)
        .map_err(|err| validation_failure("title", &err))?;

    let step = document.into_step()?;
    let result = state.store.update(&session_id, |builder| builder.update_step(step));
    metrics::record_operation("update_step", result.is_ok());
    result?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete the step at the given index.
///
/// Deleting the only remaining step is refused with 409.
#[tracing::instrument(name = "delete_step", skip(state))]
pub async fn delete_step(
    State(state): State<AppState>,
    Path((session_id, index)): Path<(String, usize)>,
) -> ApiResult<StatusCode> {
    check_session(&session_id)?;
    let result = state.store.update(&session_id, |builder| builder.delete_step(index));
    metrics::record_operation("delete_step", result.is_ok());
    result?;
    Ok(StatusCode::NO_CONTENT)
}

/// Parameters for switching the current step.
#[derive(Debug, Deserialize)]
pub struct CurrentStepParams {
    /// Target step index.
    pub index: usize,
}

/// Switch the editor to another step.
#[tracing::instrument(name = "set_current_step", skip(state))]
pub async fn set_current_step(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(params): Json<CurrentStepParams>,
) -> ApiResult<StatusCode> {
    check_session(&session_id)?;
    state
        .store
        .update(&session_id, |builder| builder.set_current_step(params.index))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Parameters for field selection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionParams {
    /// Field id to select, or null to clear the selection.
    pub field_id: Option<String>,
}

/// Select a field for the config panel, or clear the selection.
///
/// The id is deliberately not checked against the document; a stale id
/// simply highlights nothing.
#[tracing::instrument(name = "select_field", skip(state))]
pub async fn select_field(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(params): Json<SelectionParams>,
) -> ApiResult<StatusCode> {
    check_session(&session_id)?;
    state.store.update(&session_id, |builder| {
        builder.select_field(params.field_id.map(FieldId::from_string));
        Ok(())
    })?;
    Ok(StatusCode::NO_CONTENT)
}

/// Parameters for renaming the form.
#[derive(Debug, Deserialize)]
pub struct FormNameParams {
    /// New form name.
    pub name: String,
}

/// Rename the form.
#[tracing::instrument(name = "set_form_name", skip(state))]
pub async fn set_form_name(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(params): Json<FormNameParams>,
) -> ApiResult<StatusCode> {
    check_session(&session_id)?;
    validation::validate_name("form name", &params.name)
        .map_err(|err| validation_failure("form_name", &err))?;
    state.store.update(&session_id, |builder| {
        builder.set_form_name(params.name);
        Ok(())
    })?;
    Ok(StatusCode::NO_CONTENT)
}

/// Parameters for switching the preview device.
#[derive(Debug, Deserialize)]
pub struct PreviewDeviceParams {
    /// Target device.
    pub device: PreviewDevice,
}

/// Switch the preview viewport.
#[tracing::instrument(name = "set_preview_device", skip(state))]
pub async fn set_preview_device(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(params): Json<PreviewDeviceParams>,
) -> ApiResult<StatusCode> {
    check_session(&session_id)?;
    state.store.update(&session_id, |builder| {
        builder.set_preview_device(params.device);
        Ok(())
    })?;
    Ok(StatusCode::NO_CONTENT)
}

/// Replace the session's document with a fresh blank form.
#[tracing::instrument(name = "new_form", skip(state))]
pub async fn new_form(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<BuilderStateResponse>> {
    check_session(&session_id)?;
    let response = state.store.update(&session_id, |builder| {
        builder.create_new_form();
        Ok(BuilderStateResponse::from(&*builder))
    })?;
    metrics::record_operation("new_form", true);
    Ok(Json(response))
}

/// Parameters for loading a built-in template.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadTemplateParams {
    /// Catalog id of the template to load.
    pub template_id: String,
}

/// Load a built-in template into the session.
#[tracing::instrument(name = "load_template", skip(state))]
pub async fn load_template(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(params): Json<LoadTemplateParams>,
) -> ApiResult<Json<BuilderStateResponse>> {
    check_session(&session_id)?;
    let template = catalog::find(&params.template_id).ok_or_else(|| {
        ApiError::not_found(format!("Template not found: {}", params.template_id))
    })?;
    let response = state.store.update(&session_id, |builder| {
        builder.load_template(template);
        Ok(BuilderStateResponse::from(&*builder))
    })?;
    metrics::record_operation("load_template", true);
    Ok(Json(response))
}

/// Import a form document, replacing the session's current form.
///
/// The document is parsed and shape-checked in full before anything is
/// replaced; a failed import leaves the current form untouched.
#[tracing::instrument(name = "import_form", skip(state, body))]
pub async fn import_form(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    body: String,
) -> ApiResult<Json<BuilderStateResponse>> {
    check_session(&session_id)?;
    validation::validate_import_size(body.len())
        .map_err(|err| validation_failure("import", &err))?;

    let template = TemplateDocument::from_json(&body)
        .and_then(TemplateDocument::into_template)
        .map_err(|err| {
            tracing::warn!("Rejected import for session {session_id}: {err}");
            metrics::record_import(false);
            ApiError::bad_request(
                "Failed to import form. Please make sure it is a valid form JSON file.",
            )
        })?;

    let response = state.store.update(&session_id, |builder| {
        builder.load_template(template);
        Ok(BuilderStateResponse::from(&*builder))
    })?;
    metrics::record_import(true);
    Ok(Json(response))
}

/// Response for a document export.
#[derive(Debug, Serialize)]
pub struct ExportResponse {
    /// Suggested download filename.
    pub filename: String,
    /// The exported document.
    pub document: TemplateDocument,
}

/// Export the session's form as a download-ready document.
#[tracing::instrument(name = "export_form", skip(state))]
pub async fn export_form(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<ExportResponse>> {
    check_session(&session_id)?;
    let builder = state.store.get_or_create(&session_id);
    Ok(Json(ExportResponse {
        filename: export_filename(&builder.form().name),
        document: TemplateDocument::from(builder.form()),
    }))
}

/// Response for a share-link request.
#[derive(Debug, Serialize)]
pub struct ShareResponse {
    /// Opaque shareable URL for the form.
    pub url: String,
}

/// Derive the shareable link for the session's form.
#[tracing::instrument(name = "share_link", skip(state))]
pub async fn share_link(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<ShareResponse>> {
    check_session(&session_id)?;
    let builder = state.store.get_or_create(&session_id);
    Ok(Json(ShareResponse {
        url: builder.share_link(&state.share_base),
    }))
}

/// Response for a save request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResponse {
    /// Millisecond timestamp recorded for the save.
    pub last_saved: u64,
}

/// Record a save. The persistence backend itself is external.
#[tracing::instrument(name = "save_form", skip(state))]
pub async fn save_form(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<SaveResponse>> {
    check_session(&session_id)?;
    let last_saved = state
        .store
        .update(&session_id, |builder| Ok(builder.save_form()))?;
    metrics::record_operation("save_form", true);
    Ok(Json(SaveResponse { last_saved }))
}

fn null_value() -> FieldValue {
    FieldValue::Null
}

/// Parameters for single-field validation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateValueParams {
    /// Id of the field whose rules apply.
    pub field_id: String,
    /// Candidate value; null when absent.
    #[serde(default = "null_value")]
    pub value: FieldValue,
}

/// Response for a validation request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResponse {
    /// Whether the value passed every rule.
    pub valid: bool,
    /// The failure message, when invalid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Evaluate a field's rules against a candidate value.
#[tracing::instrument(name = "validate_value", skip(state, params))]
pub async fn validate_value(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(params): Json<ValidateValueParams>,
) -> ApiResult<Json<ValidationResponse>> {
    check_session(&session_id)?;
    let builder = state.store.get_or_create(&session_id);
    let id = FieldId::from_string(params.field_id);
    let field = builder
        .form()
        .field(&id)
        .ok_or_else(|| ApiError::not_found(format!("Field not found: {id}")))?;

    let error = evaluate(field, &params.value);
    Ok(Json(ValidationResponse {
        valid: error.is_none(),
        error,
    }))
}

/// Parameters for whole-step validation.
#[derive(Debug, Deserialize)]
pub struct ValidateStepParams {
    /// Candidate values keyed by field name.
    #[serde(default)]
    pub values: HashMap<String, FieldValue>,
}

/// Response for a whole-step validation request.
#[derive(Debug, Serialize)]
pub struct StepValidationResponse {
    /// Whether every field in the step passed.
    pub valid: bool,
    /// Failure messages keyed by field name.
    pub errors: HashMap<String, String>,
}

/// Evaluate every field of a step, as the preview does before advancing.
#[tracing::instrument(name = "validate_step", skip(state, params))]
pub async fn validate_step(
    State(state): State<AppState>,
    Path((session_id, index)): Path<(String, usize)>,
    Json(params): Json<ValidateStepParams>,
) -> ApiResult<Json<StepValidationResponse>> {
    check_session(&session_id)?;
    let builder = state.store.get_or_create(&session_id);
    let step = builder
        .form()
        .steps
        .get(index)
        .ok_or_else(|| {
            ApiError::from(FormError::IndexOutOfRange {
                index,
                len: builder.form().step_count(),
            })
        })?;

    let errors = evaluate_step(step, &params.values);
    Ok(Json(StepValidationResponse {
        valid: errors.is_empty(),
        errors,
    }))
}
