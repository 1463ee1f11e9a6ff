//! Host-boundary data model for signature decoration
//!
//! The PDF host owns annotations and form fields; this crate describes the
//! read-only view the decoration subsystem works with. Host records arrive in
//! the host's JSON shape (`RawAnnotation`, `FormField`) and are classified
//! once on conversion, so downstream code matches on `AnnotationKind` instead
//! of re-inspecting type strings.

pub mod annotation;
pub mod custom_data;
pub mod form_field;
pub mod geometry;

pub use annotation::{Annotation, AnnotationId, AnnotationKind, RawAnnotation};
pub use custom_data::CustomData;
pub use form_field::FormField;
pub use geometry::BoundingBox;

use thiserror::Error;

/// Errors produced while reading host records
#[derive(Debug, Error)]
pub enum TypesError {
    #[error("Invalid host record: {0}")]
    InvalidRecord(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parse a JSON array of host annotation records into typed annotations
pub fn annotations_from_json(json: &str) -> Result<Vec<Annotation>, TypesError> {
    let raw: Vec<RawAnnotation> = serde_json::from_str(json)?;
    raw.into_iter().map(Annotation::try_from).collect()
}

/// Parse a JSON array of host form-field records
pub fn form_fields_from_json(json: &str) -> Result<Vec<FormField>, TypesError> {
    Ok(serde_json::from_str(json)?)
}
