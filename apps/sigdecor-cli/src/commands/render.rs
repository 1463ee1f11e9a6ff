//! `sigdecor render`: overlays for annotations read from a JSON file

use anyhow::Context;
use chrono::{DateTime, Local, TimeZone};
use clap::ValueEnum;
use serde::Serialize;
use std::fmt::Display;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use sigdecor_core::styles::OVERLAY_STYLESHEET;
use sigdecor_core::types::{annotations_from_json, Annotation, AnnotationId};
use sigdecor_core::{DecorationRenderer, Overlay};

use crate::config::AppConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Html,
}

/// Render result for one input annotation
#[derive(Debug, Clone, Serialize)]
pub struct RenderEntry {
    pub annotation_id: AnnotationId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlay: Option<Overlay>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<String>,
}

/// Render every annotation, recording why the others were skipped
pub fn render_entries<Tz>(
    renderer: &DecorationRenderer,
    annotations: &[Annotation],
    user: Option<&str>,
    now: &DateTime<Tz>,
) -> Vec<RenderEntry>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    annotations
        .iter()
        .map(|annotation| {
            let overlay = renderer.render_at(annotation, user, now);
            let skipped = overlay
                .is_none()
                .then(|| format!("{:?} annotation is not a signature", annotation.kind));
            if let Some(reason) = &skipped {
                debug!(annotation = %annotation.id, reason = %reason, "Skipped");
            }
            RenderEntry {
                annotation_id: annotation.id.clone(),
                overlay,
                skipped,
            }
        })
        .collect()
}

/// A standalone HTML fragment: the stylesheet followed by each overlay
pub fn to_html(renderer: &DecorationRenderer, entries: &[RenderEntry]) -> String {
    let mut html = format!("<style>\n{}</style>\n", OVERLAY_STYLESHEET);
    for overlay in entries.iter().filter_map(|e| e.overlay.as_ref()) {
        html.push_str(&overlay.to_node(renderer.config()).to_markup());
        html.push('\n');
    }
    html
}

pub fn run(
    annotations_path: &Path,
    user: Option<&str>,
    config: &AppConfig,
    format: OutputFormat,
) -> anyhow::Result<String> {
    let json = fs::read_to_string(annotations_path).with_context(|| {
        format!(
            "Failed to read annotations file: {}",
            annotations_path.display()
        )
    })?;
    let annotations = annotations_from_json(&json).context("Failed to parse annotations")?;

    let options = config.session_options(user);
    let renderer = DecorationRenderer::new(config.decor_config()?);
    let entries = render_entries(
        &renderer,
        &annotations,
        options.logged_in_user.as_deref(),
        &Local::now(),
    );
    info!(
        total = entries.len(),
        rendered = entries.iter().filter(|e| e.overlay.is_some()).count(),
        "Rendered overlays"
    );

    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(&entries).context("Failed to serialize overlays")
        }
        OutputFormat::Html => Ok(to_html(&renderer, &entries)),
    }
}
