//! # Formsmith Core
//!
//! Core logic for the Formsmith form-definition editor: the form
//! document model, the validation evaluator, and the builder state that
//! mediates between UI events and the document.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               formsmith-core                │
//! ├─────────────────────────────────────────────┤
//! │  Document Model  │  Builder Controller      │
//! │  - Templates     │  - Current step          │
//! │  - Steps         │  - Field selection       │
//! │  - Fields        │  - Preview device        │
//! ├─────────────────────────────────────────────┤
//! │  Validation      │  Wire Format             │
//! │  - Rule chain    │  - Import/export JSON    │
//! │  - Step checks   │  - Template catalog      │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod builder;
pub mod catalog;
pub mod document;
pub mod error;
pub mod field;
pub mod schema;
pub mod store;
pub mod validate;

pub use builder::{FormBuilder, PreviewDevice};
pub use document::{FormStep, FormTemplate, StepId};
pub use error::{FormError, FormResult};
pub use field::{FieldId, FieldKind, FieldOption, FieldType, FieldValidation, FormField};
pub use schema::{export_filename, FieldDocument, StepDocument, TemplateDocument};
pub use store::{BuilderStore, DEFAULT_SESSION};
pub use validate::{evaluate, evaluate_step, FieldValue};

/// Formsmith core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
