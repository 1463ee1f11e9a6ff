//! Locating the placeholder a signature replaced
//!
//! Two strategies run in order:
//!
//! 1. **Exact name**: the signature mark names its form field; take the
//!    widget and field with that name.
//! 2. **Geometric overlap**: otherwise take the first widget (in host order)
//!    whose box overlaps the mark and whose linked field is a signature field.

use serde::Serialize;

use crate::config::SignatureRules;
use sigdecor_types::{Annotation, FormField};

/// Which strategy produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    ExactName,
    GeometricOverlap,
}

/// Widget and form field to remove. At least one is present.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanupTarget<'a> {
    pub strategy: MatchStrategy,
    pub widget: Option<&'a Annotation>,
    pub form_field: Option<&'a FormField>,
}

/// Find the stale widget/form field for a newly created signature mark
pub fn find_cleanup_target<'a>(
    created: &Annotation,
    annotations: &'a [Annotation],
    form_fields: &'a [FormField],
    rules: &SignatureRules,
) -> Option<CleanupTarget<'a>> {
    match_by_name(created, annotations, form_fields)
        .or_else(|| match_by_overlap(created, annotations, form_fields, rules))
}

fn match_by_name<'a>(
    created: &Annotation,
    annotations: &'a [Annotation],
    form_fields: &'a [FormField],
) -> Option<CleanupTarget<'a>> {
    let name = created.form_field_name.as_deref()?;

    let widget = annotations
        .iter()
        .find(|a| a.is_widget() && a.id != created.id && a.form_field_name.as_deref() == Some(name));
    let form_field = form_fields.iter().find(|f| f.name == name);

    if widget.is_none() && form_field.is_none() {
        return None;
    }

    Some(CleanupTarget {
        strategy: MatchStrategy::ExactName,
        widget,
        form_field,
    })
}

fn match_by_overlap<'a>(
    created: &Annotation,
    annotations: &'a [Annotation],
    form_fields: &'a [FormField],
    rules: &SignatureRules,
) -> Option<CleanupTarget<'a>> {
    annotations
        .iter()
        .filter(|a| a.is_widget() && a.id != created.id)
        .filter(|widget| widget.bounding_box.overlaps(&created.bounding_box))
        .find_map(|widget| {
            let field_name = widget.form_field_name.as_deref()?;
            let field = form_fields.iter().find(|f| f.name == field_name)?;
            rules.is_signature_field(field).then_some(CleanupTarget {
                strategy: MatchStrategy::GeometricOverlap,
                widget: Some(widget),
                form_field: Some(field),
            })
        })
}
