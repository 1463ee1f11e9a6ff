//! Post-creation cleanup of signature placeholders
//!
//! When the host's signing flow turns a signature widget into an ink or image
//! annotation, it leaves the widget and its form field behind, which shows up
//! as an empty duplicate signature box. The coordinator listens for created
//! annotations and deletes those leftovers.
//!
//! Cleanups run one annotation at a time. Each one waits a settle delay,
//! re-reads host state, picks a target with [`find_cleanup_target`] and issues
//! the deletions. Failures are logged and reported, never propagated into the
//! host's event dispatch.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use crate::config::SignatureRules;
use crate::host::{AnnotationBatch, AnnotationHost, DeleteTarget, ListenerId};
use crate::matching::{find_cleanup_target, MatchStrategy};
use sigdecor_types::{Annotation, AnnotationId};

/// Wait before inspecting host state, so the host's own form-field removal
/// (if any) has landed
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Unread reports kept per attached coordinator; newer ones are dropped
pub const REPORT_BUFFER: usize = 64;

/// Result of one deletion attempt
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum DeletionStatus {
    /// Nothing of this kind was matched
    NotTargeted,
    Deleted,
    /// The host had already removed it
    AlreadyRemoved,
    Failed(String),
}

impl DeletionStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, DeletionStatus::Failed(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CleanupOutcome {
    Cleaned {
        strategy: MatchStrategy,
        widget: DeletionStatus,
        form_field: DeletionStatus,
    },
    /// No placeholder matched the signature
    NoMatch,
    /// The coordinator was detached before this cleanup touched the host
    Cancelled,
    /// Host state could not be read
    HostUnavailable { reason: String },
}

/// Outcome of cleaning up after one created annotation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanupReport {
    pub annotation_id: AnnotationId,
    #[serde(flatten)]
    pub outcome: CleanupOutcome,
}

impl CleanupReport {
    fn new(annotation: &Annotation, outcome: CleanupOutcome) -> Self {
        Self {
            annotation_id: annotation.id.clone(),
            outcome,
        }
    }

    /// Whether any deletion failed for a reason other than absence
    pub fn has_failures(&self) -> bool {
        match &self.outcome {
            CleanupOutcome::Cleaned {
                widget, form_field, ..
            } => widget.is_failure() || form_field.is_failure(),
            CleanupOutcome::HostUnavailable { .. } => true,
            CleanupOutcome::NoMatch | CleanupOutcome::Cancelled => false,
        }
    }
}

/// Teardown signal shared between a handle and its listener task
#[derive(Debug, Clone)]
pub struct CancelSignal {
    receiver: watch::Receiver<bool>,
}

impl CancelSignal {
    /// Linked sender/signal pair
    pub fn channel() -> (watch::Sender<bool>, Self) {
        let (sender, receiver) = watch::channel(false);
        (sender, Self { receiver })
    }

    /// A signal that never fires
    pub fn never() -> Self {
        Self::channel().1
    }

    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Resolves once cancellation is requested; pends forever if the sender
    /// is gone without cancelling
    pub async fn cancelled(&mut self) {
        loop {
            if *self.receiver.borrow_and_update() {
                return;
            }
            if self.receiver.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

/// Removes stale signature widgets and form fields
pub struct CleanupCoordinator<H: AnnotationHost + ?Sized> {
    host: Arc<H>,
    rules: SignatureRules,
    settle_delay: Duration,
}

impl<H: AnnotationHost + ?Sized + 'static> CleanupCoordinator<H> {
    pub fn new(host: Arc<H>, rules: SignatureRules) -> Self {
        Self {
            host,
            rules,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }

    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }

    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    /// Clean up after a batch of created annotations, sequentially.
    ///
    /// Only ink and image annotations are considered. Once `cancel` fires,
    /// remaining annotations are reported as cancelled without touching the
    /// host.
    pub async fn process_batch(&self, batch: &[Annotation], cancel: &CancelSignal) -> Vec<CleanupReport> {
        let mut reports = Vec::new();
        for annotation in batch {
            if !annotation.kind.is_signature_mark() {
                debug!(annotation = %annotation.id, kind = ?annotation.kind, "Ignoring created annotation");
                continue;
            }
            let report = self.cleanup_with_cancel(annotation, cancel.clone()).await;
            reports.push(report);
        }
        reports
    }

    /// Clean up after one created signature mark
    pub async fn cleanup(&self, annotation: &Annotation) -> CleanupReport {
        self.cleanup_with_cancel(annotation, CancelSignal::never()).await
    }

    #[instrument(skip(self, annotation, cancel), fields(annotation = %annotation.id, kind = ?annotation.kind))]
    async fn cleanup_with_cancel(&self, annotation: &Annotation, mut cancel: CancelSignal) -> CleanupReport {
        if cancel.is_cancelled() {
            return CleanupReport::new(annotation, CleanupOutcome::Cancelled);
        }
        if !self.settle_delay.is_zero() {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("Cancelled during settle delay");
                    return CleanupReport::new(annotation, CleanupOutcome::Cancelled);
                }
                _ = tokio::time::sleep(self.settle_delay) => {}
            }
        }

        let annotations = match self.host.annotations(annotation.page_index).await {
            Ok(annotations) => annotations,
            Err(e) => return self.unavailable(annotation, e.to_string()),
        };
        let form_fields = match self.host.form_fields().await {
            Ok(fields) => fields,
            Err(e) => return self.unavailable(annotation, e.to_string()),
        };

        let Some(target) = find_cleanup_target(annotation, &annotations, &form_fields, &self.rules) else {
            warn!(
                form_field = annotation.form_field_name.as_deref().unwrap_or("<none>"),
                widgets = annotations.iter().filter(|a| a.is_widget()).count(),
                "No signature placeholder matched the created annotation"
            );
            return CleanupReport::new(annotation, CleanupOutcome::NoMatch);
        };
        debug!(strategy = ?target.strategy, "Matched signature placeholder");

        let widget = match target.widget {
            Some(widget) => self.delete(DeleteTarget::Annotation(widget.id.clone())).await,
            None => DeletionStatus::NotTargeted,
        };
        let form_field = match target.form_field {
            Some(field) => self.delete(DeleteTarget::FormField(field.name.clone())).await,
            None => DeletionStatus::NotTargeted,
        };

        info!(strategy = ?target.strategy, widget = ?widget, form_field = ?form_field, "Signature placeholder cleanup finished");
        CleanupReport::new(
            annotation,
            CleanupOutcome::Cleaned {
                strategy: target.strategy,
                widget,
                form_field,
            },
        )
    }

    async fn delete(&self, target: DeleteTarget) -> DeletionStatus {
        match self.host.delete(target.clone()).await {
            Ok(()) => {
                debug!(%target, "Deleted");
                DeletionStatus::Deleted
            }
            Err(e) if e.is_missing_entity() => {
                info!(%target, "Already removed by the host");
                DeletionStatus::AlreadyRemoved
            }
            Err(e) => {
                error!(%target, error = %e, "Failed to delete signature placeholder");
                DeletionStatus::Failed(e.to_string())
            }
        }
    }

    fn unavailable(&self, annotation: &Annotation, reason: String) -> CleanupReport {
        error!(%reason, "Could not read host state for cleanup");
        CleanupReport::new(annotation, CleanupOutcome::HostUnavailable { reason })
    }
}

impl<H: AnnotationHost + ?Sized + 'static> CleanupCoordinator<H> {
    /// Subscribe to the host's "annotations created" events and process them
    /// on a background task until the returned handle is detached.
    ///
    /// Must be called inside a tokio runtime.
    pub fn attach(self) -> CoordinatorHandle<H> {
        let host = Arc::clone(&self.host);
        let subscription = host.subscribe_created();
        let (cancel_tx, cancel) = CancelSignal::channel();
        let (report_tx, reports) = mpsc::channel(REPORT_BUFFER);
        let listener = subscription.id;

        debug!(listener, "Attached signature cleanup listener");
        let task = tokio::spawn(run_listener(Arc::new(self), subscription.events, cancel, report_tx));

        CoordinatorHandle {
            host,
            listener,
            cancel: cancel_tx,
            task,
            reports,
        }
    }
}

async fn run_listener<H: AnnotationHost + ?Sized + 'static>(
    coordinator: Arc<CleanupCoordinator<H>>,
    mut events: mpsc::UnboundedReceiver<AnnotationBatch>,
    mut cancel: CancelSignal,
    reports: mpsc::Sender<CleanupReport>,
) {
    loop {
        let batch = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            next = events.recv() => match next {
                Some(batch) => batch,
                None => break,
            },
        };

        for report in coordinator.process_batch(&batch, &cancel).await {
            match reports.try_send(report) {
                Ok(()) => {}
                Err(TrySendError::Full(report)) => {
                    warn!(annotation = %report.annotation_id, "Cleanup report buffer full, dropping report");
                }
                // Nobody listening for reports is fine
                Err(TrySendError::Closed(_)) => {}
            }
        }
    }
    debug!("Signature cleanup listener stopped");
}

/// Owner's handle on an attached coordinator
pub struct CoordinatorHandle<H: AnnotationHost + ?Sized> {
    host: Arc<H>,
    listener: ListenerId,
    cancel: watch::Sender<bool>,
    task: JoinHandle<()>,
    reports: mpsc::Receiver<CleanupReport>,
}

impl<H: AnnotationHost + ?Sized> CoordinatorHandle<H> {
    pub fn listener_id(&self) -> ListenerId {
        self.listener
    }

    /// Next cleanup report; `None` once the listener has stopped and all
    /// reports were consumed
    pub async fn next_report(&mut self) -> Option<CleanupReport> {
        self.reports.recv().await
    }

    /// Report already produced, without waiting
    pub fn try_next_report(&mut self) -> Option<CleanupReport> {
        self.reports.try_recv().ok()
    }

    /// Unregister from the host and stop the listener.
    ///
    /// Pending settle delays are abandoned; a cleanup that already started
    /// deleting finishes first. Returns the reports produced but not yet read.
    pub async fn detach(mut self) -> Vec<CleanupReport> {
        self.host.unsubscribe(self.listener);
        let _ = self.cancel.send(true);
        if let Err(e) = (&mut self.task).await {
            error!(error = %e, "Signature cleanup listener ended abnormally");
        }
        debug!(listener = self.listener, "Detached signature cleanup listener");

        let mut remaining = Vec::new();
        while let Ok(report) = self.reports.try_recv() {
            remaining.push(report);
        }
        remaining
    }
}
