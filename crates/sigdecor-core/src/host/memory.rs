//! In-process host used by tests and the CLI simulator

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::mpsc;
use tracing::debug;

use super::{AnnotationBatch, AnnotationHost, DeleteTarget, ListenerId, Subscription};
use crate::error::HostError;
use sigdecor_types::{Annotation, FormField};

#[derive(Debug, Default)]
struct HostState {
    annotations: Vec<Annotation>,
    form_fields: Vec<FormField>,
    listeners: BTreeMap<ListenerId, mpsc::UnboundedSender<AnnotationBatch>>,
    next_listener: ListenerId,
    /// Deleting a widget also deletes its form field, like real hosts often do
    cascade_field_removal: bool,
    failures: HashMap<DeleteTarget, HostError>,
    deletions: Vec<DeleteTarget>,
    unavailable: Option<String>,
}

/// Document state held in memory
#[derive(Debug, Default)]
pub struct MemoryHost {
    state: Mutex<HostState>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_annotations(self, annotations: Vec<Annotation>) -> Self {
        self.lock().annotations.extend(annotations);
        self
    }

    pub fn with_form_fields(self, form_fields: Vec<FormField>) -> Self {
        self.lock().form_fields.extend(form_fields);
        self
    }

    /// Make widget deletion remove the widget's form field as a side effect
    pub fn with_cascading_field_removal(self, enabled: bool) -> Self {
        self.lock().cascade_field_removal = enabled;
        self
    }

    /// Make every future deletion of `target` fail with `error`
    pub fn fail_deletion(&self, target: DeleteTarget, error: HostError) {
        self.lock().failures.insert(target, error);
    }

    /// Make reads fail as if the host instance were unloaded
    pub fn set_unavailable(&self, reason: Option<String>) {
        self.lock().unavailable = reason;
    }

    /// Add annotations and notify listeners, as the host does after a user
    /// action. Returns the number of listeners notified.
    pub fn create_annotations(&self, batch: AnnotationBatch) -> usize {
        let mut state = self.lock();
        state.annotations.extend(batch.iter().cloned());

        // Listeners whose receiver is gone are dropped
        state
            .listeners
            .retain(|_, sender| sender.send(batch.clone()).is_ok());
        let notified = state.listeners.len();
        debug!(count = batch.len(), listeners = notified, "Dispatched annotations.create");
        notified
    }

    /// Snapshot of every annotation on every page
    pub fn all_annotations(&self) -> Vec<Annotation> {
        self.lock().annotations.clone()
    }

    pub fn all_form_fields(&self) -> Vec<FormField> {
        self.lock().form_fields.clone()
    }

    /// Successful deletions in the order they happened
    pub fn deletions(&self) -> Vec<DeleteTarget> {
        self.lock().deletions.clone()
    }

    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    fn lock(&self) -> MutexGuard<'_, HostState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl HostState {
    fn check_available(&self) -> Result<(), HostError> {
        match &self.unavailable {
            Some(reason) => Err(HostError::Unavailable(reason.clone())),
            None => Ok(()),
        }
    }

    fn remove(&mut self, target: &DeleteTarget) -> Result<(), HostError> {
        match target {
            DeleteTarget::Annotation(id) => {
                let index = self
                    .annotations
                    .iter()
                    .position(|a| &a.id == id)
                    .ok_or_else(|| HostError::NotFound(format!("Annotation {} does not exist", id)))?;
                let removed = self.annotations.remove(index);

                if self.cascade_field_removal && removed.is_widget() {
                    if let Some(name) = &removed.form_field_name {
                        self.form_fields.retain(|f| &f.name != name);
                    }
                }
            }
            DeleteTarget::FormField(name) => {
                let index = self
                    .form_fields
                    .iter()
                    .position(|f| &f.name == name)
                    .ok_or_else(|| {
                        HostError::NotFound(format!("Form field with name {} does not exist", name))
                    })?;
                self.form_fields.remove(index);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl AnnotationHost for MemoryHost {
    async fn annotations(&self, page_index: u32) -> Result<Vec<Annotation>, HostError> {
        let state = self.lock();
        state.check_available()?;
        Ok(state
            .annotations
            .iter()
            .filter(|a| a.page_index == page_index)
            .cloned()
            .collect())
    }

    async fn form_fields(&self) -> Result<Vec<FormField>, HostError> {
        let state = self.lock();
        state.check_available()?;
        Ok(state.form_fields.clone())
    }

    async fn delete(&self, target: DeleteTarget) -> Result<(), HostError> {
        let mut state = self.lock();
        state.check_available()?;
        if let Some(error) = state.failures.get(&target) {
            return Err(error.clone());
        }
        state.remove(&target)?;
        state.deletions.push(target);
        Ok(())
    }

    fn subscribe_created(&self) -> Subscription {
        let (sender, events) = mpsc::unbounded_channel();
        let mut state = self.lock();
        let id = state.next_listener;
        state.next_listener += 1;
        state.listeners.insert(id, sender);
        Subscription { id, events }
    }

    fn unsubscribe(&self, id: ListenerId) {
        self.lock().listeners.remove(&id);
    }
}
