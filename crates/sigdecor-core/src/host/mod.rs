//! Capability surface of the PDF host
//!
//! The host SDK owns the document. The decoration subsystem only needs to
//! read annotations and form fields, delete entities, and hear about newly
//! created annotations.

pub mod memory;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::mpsc;

use crate::error::HostError;
use sigdecor_types::{Annotation, AnnotationId, FormField};

pub use memory::MemoryHost;

/// Identifies one registered "annotations created" listener
pub type ListenerId = u64;

/// Annotations created together in one host operation
pub type AnnotationBatch = Vec<Annotation>;

/// An entity the host can delete
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteTarget {
    Annotation(AnnotationId),
    FormField(String),
}

impl std::fmt::Display for DeleteTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeleteTarget::Annotation(id) => write!(f, "annotation '{}'", id),
            DeleteTarget::FormField(name) => write!(f, "form field '{}'", name),
        }
    }
}

/// A registered listener and the stream of batches it receives
#[derive(Debug)]
pub struct Subscription {
    pub id: ListenerId,
    pub events: mpsc::UnboundedReceiver<AnnotationBatch>,
}

#[async_trait]
pub trait AnnotationHost: Send + Sync {
    /// All annotations on a page
    async fn annotations(&self, page_index: u32) -> Result<Vec<Annotation>, HostError>;

    /// All form fields of the document
    async fn form_fields(&self) -> Result<Vec<FormField>, HostError>;

    /// Delete an entity; `HostError::NotFound` when it is already gone
    async fn delete(&self, target: DeleteTarget) -> Result<(), HostError>;

    /// Register an "annotations created" listener
    fn subscribe_created(&self) -> Subscription;

    /// Remove a listener. Unknown ids are ignored.
    fn unsubscribe(&self, id: ListenerId);
}
