//! `sigdecor simulate`: replay a signing scenario against an in-memory host
//!
//! Scenario file:
//!
//! ```json
//! {
//!   "annotations": [{"id": "w1", "type": "pspdfkit/widget", "formFieldName": "Sig1", "boundingBox": {...}}],
//!   "formFields": [{"name": "Sig1", "type": "pspdfkit/form-field/signature"}],
//!   "created": [{"id": "ink1", "type": "pspdfkit/ink", "boundingBox": {...}}],
//!   "cascadeFieldRemoval": false,
//!   "failDeletions": [{"formField": "Sig1", "message": "Permission denied"}]
//! }
//! ```

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use sigdecor_core::types::{Annotation, AnnotationId, FormField, RawAnnotation};
use sigdecor_core::{
    CleanupReport, DecorConfig, DecorSession, DeleteTarget, HostError, MemoryHost,
    SessionOptions, StyleRegistry,
};

use crate::config::AppConfig;

/// How long to wait for reports beyond the settle delay
const REPORT_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Scenario {
    /// Annotations already on the document
    pub annotations: Vec<RawAnnotation>,
    pub form_fields: Vec<FormField>,
    /// Batch dispatched as one "annotations created" event
    pub created: Vec<RawAnnotation>,
    pub cascade_field_removal: bool,
    pub fail_deletions: Vec<InjectedFailure>,
}

/// A deletion the host will reject
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InjectedFailure {
    #[serde(default)]
    pub annotation: Option<String>,
    #[serde(default)]
    pub form_field: Option<String>,
    pub message: String,
}

impl InjectedFailure {
    fn target(&self) -> anyhow::Result<DeleteTarget> {
        match (&self.annotation, &self.form_field) {
            (Some(id), None) => Ok(DeleteTarget::Annotation(AnnotationId::new(id.as_str()))),
            (None, Some(name)) => Ok(DeleteTarget::FormField(name.clone())),
            _ => bail!("failDeletions entries need exactly one of 'annotation' or 'formField'"),
        }
    }
}

impl Scenario {
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario file: {}", path.display()))?;
        Self::from_str(&content)
    }

    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        serde_json::from_str(s).context("Failed to parse scenario JSON")
    }
}

/// Reports and the host state left behind
#[derive(Debug, Serialize)]
pub struct SimulationResult {
    pub reports: Vec<CleanupReport>,
    pub deletions: Vec<DeleteTarget>,
    pub remaining_annotations: Vec<Annotation>,
    pub remaining_form_fields: Vec<FormField>,
}

fn convert(raw: Vec<RawAnnotation>) -> anyhow::Result<Vec<Annotation>> {
    raw.into_iter()
        .map(|r| Annotation::try_from(r).context("Invalid annotation record"))
        .collect()
}

/// Seed a host, attach a session, dispatch the created batch and collect
/// one report per created signature mark
pub async fn run_scenario(
    scenario: Scenario,
    config: DecorConfig,
    options: SessionOptions,
) -> anyhow::Result<SimulationResult> {
    let created = convert(scenario.created)?;
    let host = MemoryHost::new()
        .with_annotations(convert(scenario.annotations)?)
        .with_form_fields(scenario.form_fields)
        .with_cascading_field_removal(scenario.cascade_field_removal);
    for failure in &scenario.fail_deletions {
        host.fail_deletion(failure.target()?, HostError::Rejected(failure.message.clone()));
    }
    let host = Arc::new(host);

    let wait = options.settle_delay + REPORT_GRACE;
    let registry = StyleRegistry::new();
    let mut session = DecorSession::start(Arc::clone(&host), config, options, &registry)
        .context("Failed to start decoration session")?;

    let expected = created.iter().filter(|a| a.kind.is_signature_mark()).count();
    host.create_annotations(created);

    let mut reports = Vec::with_capacity(expected);
    while reports.len() < expected {
        match tokio::time::timeout(wait, session.next_report()).await {
            Ok(Some(report)) => reports.push(report),
            Ok(None) => break,
            Err(_) => {
                warn!(received = reports.len(), expected, "Timed out waiting for cleanup reports");
                break;
            }
        }
    }
    reports.extend(session.shutdown().await);
    info!(reports = reports.len(), "Simulation finished");

    Ok(SimulationResult {
        reports,
        deletions: host.deletions(),
        remaining_annotations: host.all_annotations(),
        remaining_form_fields: host.all_form_fields(),
    })
}

pub async fn run(scenario_path: &Path, config: &AppConfig) -> anyhow::Result<String> {
    let scenario = Scenario::from_file(scenario_path)?;
    let result = run_scenario(scenario, config.decor_config()?, config.session_options(None)).await?;
    serde_json::to_string_pretty(&result).context("Failed to serialize simulation result")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sigdecor_core::{CleanupOutcome, DeletionStatus, MatchStrategy};

    fn options() -> SessionOptions {
        SessionOptions {
            logged_in_user: None,
            settle_delay: Duration::from_millis(1),
        }
    }

    const SCENARIO: &str = r#"{
        "annotations": [
            {"id": "w-sig1", "type": "pspdfkit/widget", "formFieldName": "Sig1",
             "boundingBox": {"left": 90, "top": 95, "width": 200, "height": 60}}
        ],
        "formFields": [{"name": "Sig1", "type": "pspdfkit/form-field/signature"}],
        "created": [
            {"id": "ink-1", "type": "pspdfkit/ink", "formFieldName": "Sig1",
             "boundingBox": {"left": 100, "top": 100, "width": 150, "height": 50}},
            {"id": "note-1", "type": "pspdfkit/note"}
        ]
    }"#;

    #[tokio::test]
    async fn test_scenario_cleans_up_placeholder() {
        let scenario = Scenario::from_str(SCENARIO).unwrap();
        let result = run_scenario(scenario, DecorConfig::default(), options()).await.unwrap();

        assert_eq!(result.reports.len(), 1);
        assert_eq!(
            result.reports[0].outcome,
            CleanupOutcome::Cleaned {
                strategy: MatchStrategy::ExactName,
                widget: DeletionStatus::Deleted,
                form_field: DeletionStatus::Deleted,
            }
        );
        assert!(result.remaining_form_fields.is_empty());
        let remaining: Vec<_> = result
            .remaining_annotations
            .iter()
            .map(|a| a.id.as_str())
            .collect();
        assert_eq!(remaining, vec!["ink-1", "note-1"]);
    }

    #[tokio::test]
    async fn test_injected_failure_is_reported() {
        let mut scenario = Scenario::from_str(SCENARIO).unwrap();
        scenario.fail_deletions.push(InjectedFailure {
            annotation: None,
            form_field: Some("Sig1".into()),
            message: "Permission denied".into(),
        });
        let result = run_scenario(scenario, DecorConfig::default(), options()).await.unwrap();

        assert!(result.reports[0].has_failures());
        assert_eq!(result.remaining_form_fields.len(), 1);
        assert_eq!(
            result.deletions,
            vec![DeleteTarget::Annotation(AnnotationId::new("w-sig1"))]
        );
    }

    #[test]
    fn test_failure_needs_one_target() {
        let failure = InjectedFailure {
            annotation: Some("a".into()),
            form_field: Some("b".into()),
            message: "nope".into(),
        };
        assert!(failure.target().is_err());
    }

    #[test]
    fn test_result_shape() {
        let result = SimulationResult {
            reports: vec![],
            deletions: vec![DeleteTarget::FormField("Sig1".into())],
            remaining_annotations: vec![],
            remaining_form_fields: vec![],
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["deletions"][0]["form_field"], "Sig1");
        assert!(value.get("remaining_form_fields").is_some());
    }
}
