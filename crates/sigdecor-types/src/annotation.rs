//! Annotations as seen by the decoration subsystem

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::custom_data::CustomData;
use crate::geometry::BoundingBox;
use crate::TypesError;

/// Host-assigned annotation identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationId(pub String);

impl AnnotationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Closed set of annotation kinds the subsystem distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationKind {
    /// Freehand-drawn signature strokes
    Ink,
    /// Uploaded or typed signature rendered as an image
    Image,
    /// Interactive form-field placeholder
    Widget,
    /// Anything else (text, highlight, shapes, ...)
    Other,
}

impl AnnotationKind {
    /// Classify a host type identifier.
    ///
    /// Accepts namespaced identifiers (`pspdfkit/ink`), bare names (`image`)
    /// and class-style names (`WidgetAnnotation`), case-insensitively.
    pub fn classify(type_name: &str) -> Self {
        let tail = type_name
            .rsplit('/')
            .next()
            .unwrap_or(type_name)
            .trim()
            .to_ascii_lowercase();
        let tail = tail.strip_suffix("annotation").unwrap_or(&tail);

        match tail {
            "ink" => AnnotationKind::Ink,
            "image" => AnnotationKind::Image,
            "widget" => AnnotationKind::Widget,
            _ => AnnotationKind::Other,
        }
    }

    /// Ink and image annotations are what the signing flow leaves behind
    pub fn is_signature_mark(&self) -> bool {
        matches!(self, AnnotationKind::Ink | AnnotationKind::Image)
    }
}

/// A classified annotation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub id: AnnotationId,
    pub kind: AnnotationKind,
    pub page_index: u32,
    pub bounding_box: BoundingBox,
    pub custom_data: CustomData,
    /// Form field this annotation belongs to (widgets, and sometimes the
    /// signature mark that replaced one)
    pub form_field_name: Option<String>,
}

impl Annotation {
    pub fn new(id: impl Into<String>, kind: AnnotationKind, bounding_box: BoundingBox) -> Self {
        Self {
            id: AnnotationId::new(id),
            kind,
            page_index: 0,
            bounding_box,
            custom_data: CustomData::default(),
            form_field_name: None,
        }
    }

    pub fn on_page(mut self, page_index: u32) -> Self {
        self.page_index = page_index;
        self
    }

    pub fn with_custom_data(mut self, custom_data: CustomData) -> Self {
        self.custom_data = custom_data;
        self
    }

    pub fn with_form_field(mut self, name: impl Into<String>) -> Self {
        self.form_field_name = Some(name.into());
        self
    }

    pub fn is_widget(&self) -> bool {
        self.kind == AnnotationKind::Widget
    }

    /// Whether the decoration overlay applies to this annotation
    pub fn qualifies_as_signature(&self) -> bool {
        self.kind.is_signature_mark() || self.custom_data.is_signature()
    }
}

/// Annotation record in the host's JSON shape
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAnnotation {
    pub id: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub page_index: u32,
    #[serde(default)]
    pub bounding_box: BoundingBox,
    #[serde(default)]
    pub custom_data: Option<CustomData>,
    #[serde(default)]
    pub form_field_name: Option<String>,
}

impl TryFrom<RawAnnotation> for Annotation {
    type Error = TypesError;

    fn try_from(raw: RawAnnotation) -> Result<Self, Self::Error> {
        if raw.id.trim().is_empty() {
            return Err(TypesError::InvalidRecord(format!(
                "annotation of type '{}' has an empty id",
                raw.type_name
            )));
        }

        Ok(Annotation {
            id: AnnotationId(raw.id),
            kind: AnnotationKind::classify(&raw.type_name),
            page_index: raw.page_index,
            bounding_box: raw.bounding_box,
            custom_data: raw.custom_data.unwrap_or_default(),
            form_field_name: raw.form_field_name.filter(|name| !name.is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_namespaced() {
        assert_eq!(AnnotationKind::classify("pspdfkit/ink"), AnnotationKind::Ink);
        assert_eq!(AnnotationKind::classify("pspdfkit/image"), AnnotationKind::Image);
        assert_eq!(
            AnnotationKind::classify("pspdfkit/widget"),
            AnnotationKind::Widget
        );
        assert_eq!(
            AnnotationKind::classify("pspdfkit/shape/rectangle"),
            AnnotationKind::Other
        );
    }

    #[test]
    fn test_classify_class_style_names() {
        assert_eq!(AnnotationKind::classify("InkAnnotation"), AnnotationKind::Ink);
        assert_eq!(
            AnnotationKind::classify("WidgetAnnotation"),
            AnnotationKind::Widget
        );
        assert_eq!(AnnotationKind::classify("TextAnnotation"), AnnotationKind::Other);
        assert_eq!(AnnotationKind::classify(""), AnnotationKind::Other);
    }

    #[test]
    fn test_signature_mark_kinds() {
        assert!(AnnotationKind::Ink.is_signature_mark());
        assert!(AnnotationKind::Image.is_signature_mark());
        assert!(!AnnotationKind::Widget.is_signature_mark());
        assert!(!AnnotationKind::Other.is_signature_mark());
    }

    #[test]
    fn test_custom_flag_qualifies_other_kinds() {
        let text = Annotation::new("t1", AnnotationKind::Other, BoundingBox::default());
        assert!(!text.qualifies_as_signature());

        let flagged = text.with_custom_data(CustomData::new().with("isSignature", true));
        assert!(flagged.qualifies_as_signature());
    }

    #[test]
    fn test_raw_conversion_rejects_empty_id() {
        let raw = RawAnnotation {
            id: " ".to_string(),
            type_name: "pspdfkit/ink".to_string(),
            page_index: 0,
            bounding_box: BoundingBox::default(),
            custom_data: None,
            form_field_name: None,
        };
        assert!(Annotation::try_from(raw).is_err());
    }

    #[test]
    fn test_raw_conversion_drops_empty_form_field_name() {
        let raw = RawAnnotation {
            id: "w1".to_string(),
            type_name: "pspdfkit/widget".to_string(),
            page_index: 2,
            bounding_box: BoundingBox::new(1.0, 2.0, 3.0, 4.0),
            custom_data: None,
            form_field_name: Some(String::new()),
        };
        let annotation = Annotation::try_from(raw).unwrap();
        assert_eq!(annotation.form_field_name, None);
        assert_eq!(annotation.page_index, 2);
        assert!(annotation.custom_data.is_empty());
    }
}
