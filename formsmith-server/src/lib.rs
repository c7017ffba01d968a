//! # Formsmith Server Library
//!
//! Shared types and functionality for the Formsmith server.
//! This library is used by both the binary and integration tests.

use axum::routing::{delete, get, post};
use axum::Router;

use formsmith_core::BuilderStore;

pub mod health;
pub mod metrics;
pub mod routes;
pub mod validation;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Session-keyed builder storage.
    pub store: BuilderStore,
    /// Base URL used when deriving shareable form links.
    pub share_base: String,
}

impl AppState {
    /// Create state with a fresh store.
    #[must_use]
    pub fn new(share_base: impl Into<String>) -> Self {
        Self {
            store: BuilderStore::new(),
            share_base: share_base.into(),
        }
    }
}

/// Build the application router: health probes plus the builder API.
///
/// The binary layers CORS, request ids, tracing, and the metrics
/// endpoint on top; integration tests drive this router directly.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .route("/health", get(health::readiness)) // Backward compatible
        .route("/api/templates", get(routes::list_templates))
        .route("/api/templates/{template_id}", get(routes::get_template))
        .route("/api/sessions", get(routes::list_sessions))
        .route("/api/sessions/{session_id}", get(routes::get_session))
        .route(
            "/api/sessions/{session_id}/fields",
            post(routes::create_field).put(routes::update_field),
        )
        .route(
            "/api/sessions/{session_id}/fields/reorder",
            post(routes::reorder_fields),
        )
        .route(
            "/api/sessions/{session_id}/fields/{field_id}",
            delete(routes::delete_field),
        )
        .route(
            "/api/sessions/{session_id}/steps",
            post(routes::add_step).put(routes::update_step),
        )
        .route(
            "/api/sessions/{session_id}/steps/{index}",
            delete(routes::delete_step),
        )
        .route(
            "/api/sessions/{session_id}/steps/{index}/validate",
            post(routes::validate_step),
        )
        .route(
            "/api/sessions/{session_id}/current-step",
            post(routes::set_current_step),
        )
        .route(
            "/api/sessions/{session_id}/selection",
            post(routes::select_field),
        )
        .route("/api/sessions/{session_id}/name", post(routes::set_form_name))
        .route(
            "/api/sessions/{session_id}/device",
            post(routes::set_preview_device),
        )
        .route("/api/sessions/{session_id}/new", post(routes::new_form))
        .route(
            "/api/sessions/{session_id}/template",
            post(routes::load_template),
        )
        .route("/api/sessions/{session_id}/import", post(routes::import_form))
        .route("/api/sessions/{session_id}/export", get(routes::export_form))
        .route("/api/sessions/{session_id}/share", get(routes::share_link))
        .route("/api/sessions/{session_id}/save", post(routes::save_form))
        .route(
            "/api/sessions/{session_id}/validate",
            post(routes::validate_value),
        )
        .with_state(state)
}
