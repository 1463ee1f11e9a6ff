//! Signature decoration renderer
//!
//! Builds the curve-and-label overlay drawn around signature annotations:
//!
//! ```text
//!   ╭──────────  By Alice
//!   │
//!   ┌──────────────────────┐
//!   │   (signature mark)   │
//!   └──────────────────────┘
//!   │
//!   ╰──────────────  10/17/2026, 3:05 PM
//! ```
//!
//! All coordinates are relative to the annotation's top-left corner, in
//! unscaled page units, so the host can place the overlay inside its own
//! zoomed page container without the overlay reacting to zoom itself.

use chrono::{DateTime, Local, TimeZone};
use serde::Serialize;
use std::fmt::{Display, Write};
use tracing::debug;

use crate::config::{DecorConfig, DEFAULT_TIMESTAMP_FORMAT};
use crate::overlay::{format_number, OverlayNode};
use sigdecor_types::{Annotation, AnnotationId, BoundingBox};

/// Container width as a fraction of the annotation width
const CONTAINER_WIDTH_RATIO: f64 = 0.4;
const CONTAINER_MIN_WIDTH: f64 = 80.0;
/// Extra container height below the annotation for the bottom curve and label
const CONTAINER_EXTRA_HEIGHT: f64 = 50.0;

pub const OVERLAY_CLASS: &str = "sigdecor-overlay";
pub const CURVES_CLASS: &str = "sigdecor-curves";
pub const SIGNER_LABEL_CLASS: &str = "sigdecor-label-signer";
pub const TIMESTAMP_LABEL_CLASS: &str = "sigdecor-label-timestamp";

/// One decoration curve
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurveSegment {
    /// SVG path data
    pub path: String,
    /// Length of the horizontal run
    pub length: f64,
    /// Y coordinate of the horizontal run
    pub anchor_y: f64,
}

/// A positioned text label
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Label {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub font_size: f64,
}

/// Computed decoration for one annotation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overlay {
    pub annotation_id: AnnotationId,
    pub anchor: BoundingBox,
    pub signer_name: String,
    pub width: f64,
    pub height: f64,
    pub top_curve: CurveSegment,
    pub bottom_curve: CurveSegment,
    pub signer_label: Label,
    pub timestamp_label: Label,
}

/// Length of a curve: `min(width × ratio, max)`, never negative
pub fn curve_length(width: f64, ratio: f64, max: f64) -> f64 {
    (width * ratio).min(max).max(0.0)
}

/// Pick the signer: annotation data first, then the session user, then the default
pub fn resolve_signer_name<'a>(
    annotation: &'a Annotation,
    logged_in_user: Option<&'a str>,
    default_name: &'a str,
) -> &'a str {
    annotation
        .custom_data
        .signer_name()
        .or_else(|| logged_in_user.map(str::trim).filter(|user| !user.is_empty()))
        .unwrap_or(default_name)
}

/// Renders signature decorations from a fixed configuration
#[derive(Debug, Clone)]
pub struct DecorationRenderer {
    config: DecorConfig,
}

impl DecorationRenderer {
    pub fn new(config: DecorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecorConfig {
        &self.config
    }

    /// Render using the local clock. Returns `None` for annotations that are
    /// not signatures.
    pub fn render(&self, annotation: &Annotation, logged_in_user: Option<&str>) -> Option<Overlay> {
        self.render_at(annotation, logged_in_user, &Local::now())
    }

    /// Render with an explicit clock reading
    pub fn render_at<Tz>(
        &self,
        annotation: &Annotation,
        logged_in_user: Option<&str>,
        now: &DateTime<Tz>,
    ) -> Option<Overlay>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        if !annotation.qualifies_as_signature() {
            debug!(annotation = %annotation.id, kind = ?annotation.kind, "Skipping non-signature annotation");
            return None;
        }

        let curve = &self.config.curve;
        let text = &self.config.text;
        let offsets = &self.config.offsets;

        let width = annotation.bounding_box.layout_width();
        let height = annotation.bounding_box.layout_height();

        let top_length = curve_length(width, curve.top_length_ratio, curve.top_length_max);
        let bottom_length = curve_length(width, curve.bottom_length_ratio, curve.bottom_length_max);

        let top_y = offsets.top_curve;
        let bottom_y = height + offsets.bottom_curve;

        let signer_name =
            resolve_signer_name(annotation, logged_in_user, &self.config.default_signer_name)
                .to_string();

        Some(Overlay {
            annotation_id: annotation.id.clone(),
            anchor: annotation.bounding_box,
            width: (width * CONTAINER_WIDTH_RATIO).max(CONTAINER_MIN_WIDTH),
            height: height + CONTAINER_EXTRA_HEIGHT,
            top_curve: CurveSegment {
                path: curve_path(top_y, top_length, curve.vertical_segment, curve.corner_radius, true),
                length: top_length,
                anchor_y: top_y,
            },
            bottom_curve: CurveSegment {
                path: curve_path(bottom_y, bottom_length, curve.vertical_segment, curve.corner_radius, false),
                length: bottom_length,
                anchor_y: bottom_y,
            },
            signer_label: Label {
                text: format!("By {}", signer_name),
                x: top_length + text.gap,
                y: offsets.top_label,
                font_size: text.signer_font_size,
            },
            timestamp_label: Label {
                text: format_timestamp(now, &text.timestamp_format),
                x: bottom_length + text.gap,
                y: offsets.bottom_label,
                font_size: text.timestamp_font_size,
            },
            signer_name,
        })
    }

    /// Render straight to a node tree, as the host's overlay hook expects
    pub fn render_node(&self, annotation: &Annotation, logged_in_user: Option<&str>) -> Option<OverlayNode> {
        self.render(annotation, logged_in_user)
            .map(|overlay| overlay.to_node(&self.config))
    }
}

impl Overlay {
    /// Build the non-interactive node tree for this overlay
    pub fn to_node(&self, config: &DecorConfig) -> OverlayNode {
        let px = |value: f64| format!("{}px", format_number(value));
        let width = format_number(self.width);
        let height = format_number(self.height);

        let curves = OverlayNode::element("svg")
            .attr("class", CURVES_CLASS)
            .attr("xmlns", "http://www.w3.org/2000/svg")
            .attr("width", width.clone())
            .attr("height", height.clone())
            .style(&[
                ("position", "absolute".to_string()),
                ("left", "0".to_string()),
                ("top", "0".to_string()),
                ("overflow", "visible".to_string()),
            ])
            .child(curve_node(&self.top_curve, config))
            .child(curve_node(&self.bottom_curve, config));

        OverlayNode::element("div")
            .attr("class", OVERLAY_CLASS)
            .attr("data-annotation-id", self.annotation_id.as_str())
            .attr("aria-hidden", "true")
            .style(&[
                ("position", "absolute".to_string()),
                ("left", px(self.anchor.left)),
                ("top", px(self.anchor.top)),
                ("width", format!("{}px", width)),
                ("height", format!("{}px", height)),
                ("pointer-events", "none".to_string()),
                ("overflow", "visible".to_string()),
            ])
            .child(curves)
            .child(label_node(&self.signer_label, SIGNER_LABEL_CLASS, config))
            .child(label_node(&self.timestamp_label, TIMESTAMP_LABEL_CLASS, config))
    }
}

/// Path for one curve: a vertical lead-in that turns through a rounded
/// corner into a horizontal run of `length` at `anchor_y`.
///
/// The top curve's lead-in comes up from below the anchor (towards the
/// annotation); the bottom curve mirrors it from above.
fn curve_path(anchor_y: f64, length: f64, vertical: f64, corner_radius: f64, above: bool) -> String {
    let radius = corner_radius.min(length).min(vertical).max(0.0);
    let direction = if above { 1.0 } else { -1.0 };
    let start_y = anchor_y + direction * vertical;
    let corner_y = anchor_y + direction * radius;

    format!(
        "M 0 {} L 0 {} Q 0 {} {} {} L {} {}",
        format_number(start_y),
        format_number(corner_y),
        format_number(anchor_y),
        format_number(radius),
        format_number(anchor_y),
        format_number(length),
        format_number(anchor_y),
    )
}

fn curve_node(segment: &CurveSegment, config: &DecorConfig) -> OverlayNode {
    OverlayNode::element("path")
        .attr("d", segment.path.clone())
        .attr("fill", "none")
        .attr("stroke", config.curve.color.clone())
        .attr("stroke-width", format_number(config.curve.stroke_width))
        .attr("stroke-linecap", "round")
}

fn label_node(label: &Label, class: &str, config: &DecorConfig) -> OverlayNode {
    OverlayNode::element("div")
        .attr("class", format!("sigdecor-label {}", class))
        .style(&[
            ("position", "absolute".to_string()),
            ("left", format!("{}px", format_number(label.x))),
            ("top", format!("{}px", format_number(label.y))),
            ("color", config.text.color.clone()),
            ("font-family", config.text.font_family.clone()),
            ("font-size", format!("{}px", format_number(label.font_size))),
            ("white-space", "nowrap".to_string()),
        ])
        .child(OverlayNode::text(label.text.clone()))
}

/// Format `now`, falling back to the default format if `format` is invalid
fn format_timestamp<Tz>(now: &DateTime<Tz>, format: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut out = String::new();
    if write!(out, "{}", now.format(format)).is_ok() {
        return out;
    }
    now.format(DEFAULT_TIMESTAMP_FORMAT).to_string()
}
