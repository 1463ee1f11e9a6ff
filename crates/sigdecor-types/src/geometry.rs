//! Axis-aligned rectangles in page space

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle with a top-left origin, in unscaled page units
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    #[serde(default)]
    pub left: f64,
    #[serde(default)]
    pub top: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

impl BoundingBox {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Width usable for layout: missing, negative or non-finite widths become zero
    pub fn layout_width(&self) -> f64 {
        clamp_dimension(self.width)
    }

    /// Height usable for layout, clamped the same way as `layout_width`
    pub fn layout_height(&self) -> f64 {
        clamp_dimension(self.height)
    }

    /// Check whether two boxes share any point, edges included.
    ///
    /// Boxes are disjoint only when one lies strictly to the left, right,
    /// above or below the other, so boxes touching along an edge overlap.
    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        !(self.left > other.right()
            || self.right() < other.left
            || self.top > other.bottom()
            || self.bottom() < other.top)
    }
}

fn clamp_dimension(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlapping_boxes() {
        let a = BoundingBox::new(100.0, 100.0, 150.0, 50.0);
        let b = BoundingBox::new(90.0, 95.0, 200.0, 60.0);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn test_disjoint_horizontally() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(20.0, 0.0, 10.0, 10.0);
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn test_disjoint_vertically() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(0.0, 10.5, 10.0, 10.0);
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn test_edge_contact_counts_as_overlap() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let right_neighbour = BoundingBox::new(10.0, 0.0, 10.0, 10.0);
        let lower_neighbour = BoundingBox::new(0.0, 10.0, 10.0, 10.0);
        let corner = BoundingBox::new(10.0, 10.0, 5.0, 5.0);
        assert!(a.overlaps(&right_neighbour));
        assert!(a.overlaps(&lower_neighbour));
        assert!(a.overlaps(&corner));
    }

    #[test]
    fn test_containment_overlaps() {
        let outer = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
        let inner = BoundingBox::new(40.0, 40.0, 5.0, 5.0);
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }

    #[test]
    fn test_layout_width_clamps_invalid_values() {
        assert_eq!(BoundingBox::new(0.0, 0.0, -5.0, 1.0).layout_width(), 0.0);
        assert_eq!(BoundingBox::new(0.0, 0.0, f64::NAN, 1.0).layout_width(), 0.0);
        assert_eq!(
            BoundingBox::new(0.0, 0.0, f64::INFINITY, 1.0).layout_width(),
            0.0
        );
        assert_eq!(BoundingBox::new(0.0, 0.0, 42.0, 1.0).layout_width(), 42.0);
    }

    #[test]
    fn test_missing_fields_deserialize_as_zero() {
        let bbox: BoundingBox = serde_json::from_str(r#"{"left":5}"#).unwrap();
        assert_eq!(bbox, BoundingBox::new(5.0, 0.0, 0.0, 0.0));
    }
}
