//! End-to-end signing scenarios
//!
//! Each test drives the public API the way a host integration does: the
//! renderer is asked for overlays, and the cleanup coordinator is attached to
//! a `MemoryHost` that dispatches "annotations created" events.
//!
//! Run with: cargo test -p sigdecor-core --test scenarios

use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

use sigdecor_core::config::CurveOverrides;
use sigdecor_core::types::{
    annotations_from_json, Annotation, AnnotationId, AnnotationKind, BoundingBox, CustomData,
    FormField,
};
use sigdecor_core::{
    CleanupCoordinator, CleanupOutcome, DecorConfig, DecorConfigOverrides, DecorSession,
    DecorationRenderer, DeleteTarget, DeletionStatus, HostError, MatchStrategy, MemoryHost,
    SessionOptions, SignatureRules, StyleRegistry,
};

fn signature_box() -> BoundingBox {
    BoundingBox::new(100.0, 100.0, 150.0, 50.0)
}

fn ink() -> Annotation {
    Annotation::new("ink-1", AnnotationKind::Ink, signature_box())
}

fn render(annotation: &Annotation, config: DecorConfig, user: Option<&str>) -> sigdecor_core::Overlay {
    let now = Utc.with_ymd_and_hms(2026, 10, 17, 9, 30, 0).unwrap();
    DecorationRenderer::new(config)
        .render_at(annotation, user, &now)
        .expect("signature annotations are decorated")
}

fn quick_options() -> SessionOptions {
    SessionOptions {
        logged_in_user: Some("Alice".to_string()),
        settle_delay: Duration::from_millis(5),
    }
}

#[test]
fn scenario_a_logged_in_user_names_the_signer() {
    let overlay = render(&ink(), DecorConfig::default(), Some("Alice"));
    assert_eq!(overlay.signer_label.text, "By Alice");
    assert_eq!(overlay.timestamp_label.text, "10/17/2026, 9:30 AM");
}

#[test]
fn scenario_b_custom_data_signer_takes_precedence() {
    let annotation = ink().with_custom_data(CustomData::new().with("signerName", "Bob"));
    let overlay = render(&annotation, DecorConfig::default(), Some("Alice"));
    assert_eq!(overlay.signer_label.text, "By Bob");
}

#[test]
fn scenario_c_top_curve_length_is_capped() {
    let config = DecorConfig::merged(&DecorConfigOverrides {
        curve: Some(CurveOverrides {
            top_length_ratio: Some(0.25),
            top_length_max: Some(50.0),
            ..Default::default()
        }),
        ..Default::default()
    });
    let annotation = Annotation::new(
        "ink-wide",
        AnnotationKind::Ink,
        BoundingBox::new(0.0, 0.0, 200.0, 50.0),
    );
    let overlay = render(&annotation, config, None);
    assert_eq!(overlay.top_curve.length, 50.0);
    assert_eq!(overlay.signer_label.x, 54.0);
}

#[tokio::test]
async fn scenario_d_exact_name_match_removes_widget_and_field() {
    let host = Arc::new(
        MemoryHost::new()
            .with_annotations(vec![
                Annotation::new("w-sig1", AnnotationKind::Widget, BoundingBox::new(400.0, 400.0, 150.0, 50.0))
                    .with_form_field("Sig1"),
                Annotation::new("w-decoy", AnnotationKind::Widget, signature_box())
                    .with_form_field("OTHER_SIGNATURE"),
            ])
            .with_form_fields(vec![
                FormField::new("Sig1", "pspdfkit/form-field/signature"),
                FormField::new("OTHER_SIGNATURE", "pspdfkit/form-field/signature"),
            ]),
    );
    let mut session = DecorSession::start(
        Arc::clone(&host),
        DecorConfig::default(),
        quick_options(),
        &StyleRegistry::new(),
    )
    .unwrap();

    host.create_annotations(vec![ink().with_form_field("Sig1")]);
    let report = session.next_report().await.unwrap();

    assert_eq!(
        report.outcome,
        CleanupOutcome::Cleaned {
            strategy: MatchStrategy::ExactName,
            widget: DeletionStatus::Deleted,
            form_field: DeletionStatus::Deleted,
        }
    );
    assert_eq!(
        host.deletions(),
        vec![
            DeleteTarget::Annotation(AnnotationId::new("w-sig1")),
            DeleteTarget::FormField("Sig1".to_string()),
        ]
    );
    let remaining: Vec<_> = host.all_form_fields().into_iter().map(|f| f.name).collect();
    assert_eq!(remaining, vec!["OTHER_SIGNATURE".to_string()]);

    session.shutdown().await;
}

#[tokio::test]
async fn scenario_e_overlap_heuristic_removes_signature_widget() {
    let json = r#"[
        {"id": "w-name", "type": "pspdfkit/widget", "pageIndex": 0, "formFieldName": "FullName",
         "boundingBox": {"left": 95, "top": 98, "width": 160, "height": 55}},
        {"id": "w-sign", "type": "pspdfkit/widget", "pageIndex": 0, "formFieldName": "BUYER_SIGNATURE_1",
         "boundingBox": {"left": 90, "top": 95, "width": 200, "height": 60}}
    ]"#;
    let host = Arc::new(
        MemoryHost::new()
            .with_annotations(annotations_from_json(json).unwrap())
            .with_form_fields(vec![
                FormField::new("FullName", "pspdfkit/form-field/text"),
                FormField::new("BUYER_SIGNATURE_1", "pspdfkit/form-field/text"),
            ])
            .with_cascading_field_removal(true),
    );
    let mut session = DecorSession::start(
        Arc::clone(&host),
        DecorConfig::default(),
        quick_options(),
        &StyleRegistry::new(),
    )
    .unwrap();

    host.create_annotations(vec![Annotation::new("img-1", AnnotationKind::Image, signature_box())]);
    let report = session.next_report().await.unwrap();

    assert_eq!(
        report.outcome,
        CleanupOutcome::Cleaned {
            strategy: MatchStrategy::GeometricOverlap,
            widget: DeletionStatus::Deleted,
            form_field: DeletionStatus::AlreadyRemoved,
        }
    );
    let remaining: Vec<_> = host
        .all_annotations()
        .into_iter()
        .map(|a| a.id.to_string())
        .collect();
    assert_eq!(remaining, vec!["w-name".to_string(), "img-1".to_string()]);

    session.shutdown().await;
}

#[tokio::test]
async fn permission_failure_does_not_stop_later_events() {
    let host = Arc::new(
        MemoryHost::new()
            .with_annotations(vec![
                Annotation::new("w-a", AnnotationKind::Widget, signature_box()).with_form_field("SigA"),
                Annotation::new("w-b", AnnotationKind::Widget, signature_box()).with_form_field("SigB"),
            ])
            .with_form_fields(vec![
                FormField::new("SigA", "signature"),
                FormField::new("SigB", "signature"),
            ]),
    );
    host.fail_deletion(
        DeleteTarget::FormField("SigA".into()),
        HostError::Rejected("Permission denied".into()),
    );
    let coordinator = CleanupCoordinator::new(Arc::clone(&host), SignatureRules::default())
        .with_settle_delay(Duration::ZERO);
    let mut handle = coordinator.attach();

    host.create_annotations(vec![ink().with_form_field("SigA")]);
    host.create_annotations(vec![Annotation::new("ink-2", AnnotationKind::Ink, signature_box()).with_form_field("SigB")]);

    let first = handle.next_report().await.unwrap();
    let second = handle.next_report().await.unwrap();
    assert!(first.has_failures());
    assert!(!second.has_failures());
    assert_eq!(
        host.all_form_fields(),
        vec![FormField::new("SigA", "signature")]
    );

    assert!(handle.detach().await.is_empty());
}

#[tokio::test]
async fn no_events_processed_after_shutdown() {
    let host = Arc::new(
        MemoryHost::new()
            .with_annotations(vec![
                Annotation::new("w-sig1", AnnotationKind::Widget, signature_box()).with_form_field("Sig1"),
            ])
            .with_form_fields(vec![FormField::new("Sig1", "signature")]),
    );
    let session = DecorSession::start(
        Arc::clone(&host),
        DecorConfig::default(),
        quick_options(),
        &StyleRegistry::new(),
    )
    .unwrap();
    session.shutdown().await;

    assert_eq!(host.create_annotations(vec![ink().with_form_field("Sig1")]), 0);
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(host.deletions().is_empty());
    assert_eq!(host.all_form_fields().len(), 1);
}
