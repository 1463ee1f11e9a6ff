//! Form fields backing widget annotations

use serde::{Deserialize, Serialize};

/// A document form field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub name: String,
    /// Host type identifier, e.g. `pspdfkit/form-field/signature`
    #[serde(rename = "type", default)]
    pub field_type: String,
}

impl FormField {
    pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
        }
    }

    /// Normalized type tag: last path segment, lowercased, without a
    /// trailing `formfield` (`SignatureFormField` and
    /// `pspdfkit/form-field/signature` both become `signature`)
    pub fn type_tag(&self) -> String {
        normalize_type_code(&self.field_type)
    }

    /// Whether this field backs a signature.
    ///
    /// Matches when the normalized type equals `type_code` or the name
    /// contains `name_marker` (case-insensitive). An empty marker never
    /// matches by name.
    pub fn is_signature_field(&self, type_code: &str, name_marker: &str) -> bool {
        let wanted = normalize_type_code(type_code);
        if !wanted.is_empty() && self.type_tag() == wanted {
            return true;
        }

        let marker = name_marker.trim();
        !marker.is_empty()
            && self
                .name
                .to_uppercase()
                .contains(&marker.to_uppercase())
    }
}

fn normalize_type_code(code: &str) -> String {
    let tail = code.rsplit('/').next().unwrap_or(code).trim().to_lowercase();
    let tail = tail.replace('-', "");
    match tail.strip_suffix("formfield") {
        Some(stripped) if !stripped.is_empty() => stripped.to_string(),
        _ => tail,
    }
}
