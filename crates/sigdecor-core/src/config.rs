//! Decoration configuration
//!
//! `DecorConfig` is always fully populated. Callers describe changes with
//! `DecorConfigOverrides`, whose leaves are all optional; `DecorConfig::merged`
//! walks both trees level by level and takes the override where one is given
//! and the default everywhere else.
//!
//! ```toml
//! default_signer_name = "Unknown signer"
//!
//! [curve]
//! top_length_ratio = 0.3
//!
//! [text]
//! timestamp_format = "%Y-%m-%d %H:%M"
//! ```

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use sigdecor_types::FormField;

/// Fully-populated decoration configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecorConfig {
    pub curve: CurveConfig,
    pub text: TextConfig,
    pub offsets: OffsetConfig,
    pub signature: SignatureRules,
    /// Signer shown when neither the annotation nor the session names one
    pub default_signer_name: String,
}

/// Geometry and stroke of the two decoration curves
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveConfig {
    pub color: String,
    pub stroke_width: f64,
    pub top_length_ratio: f64,
    pub top_length_max: f64,
    pub bottom_length_ratio: f64,
    pub bottom_length_max: f64,
    /// Length of the vertical lead-in before the rounded corner
    pub vertical_segment: f64,
    pub corner_radius: f64,
}

/// Label typography
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextConfig {
    pub color: String,
    pub font_family: String,
    pub signer_font_size: f64,
    pub timestamp_font_size: f64,
    /// Horizontal space between a curve's end and its label
    pub gap: f64,
    /// strftime-style format for the timestamp label
    pub timestamp_format: String,
}

/// Vertical placement relative to the annotation's top edge.
///
/// Negative values sit above the annotation. Only the bottom curve offset is
/// added to the annotation height; both labels use their offset as is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OffsetConfig {
    pub top_curve: f64,
    pub bottom_curve: f64,
    pub top_label: f64,
    pub bottom_label: f64,
}

/// How signature form fields are recognized
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureRules {
    /// Host type code of signature fields
    pub type_code: String,
    /// Substring that marks a field name as signature-related
    pub name_marker: String,
}

impl SignatureRules {
    pub fn is_signature_field(&self, field: &FormField) -> bool {
        field.is_signature_field(&self.type_code, &self.name_marker)
    }
}

/// 12-hour clock, US month/day order
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%-m/%-d/%Y, %-I:%M %p";

impl Default for CurveConfig {
    fn default() -> Self {
        Self {
            color: "#1d4ed8".to_string(),
            stroke_width: 1.5,
            top_length_ratio: 0.25,
            top_length_max: 50.0,
            bottom_length_ratio: 0.35,
            bottom_length_max: 70.0,
            vertical_segment: 10.0,
            corner_radius: 6.0,
        }
    }
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            color: "#1f2937".to_string(),
            font_family: "Helvetica, Arial, sans-serif".to_string(),
            signer_font_size: 10.0,
            timestamp_font_size: 9.0,
            gap: 4.0,
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
        }
    }
}

impl Default for OffsetConfig {
    fn default() -> Self {
        Self {
            top_curve: -12.0,
            bottom_curve: 12.0,
            top_label: -20.0,
            bottom_label: 6.0,
        }
    }
}

impl Default for SignatureRules {
    fn default() -> Self {
        Self {
            type_code: "pspdfkit/form-field/signature".to_string(),
            name_marker: "SIGNATURE".to_string(),
        }
    }
}

impl Default for DecorConfig {
    fn default() -> Self {
        Self {
            curve: CurveConfig::default(),
            text: TextConfig::default(),
            offsets: OffsetConfig::default(),
            signature: SignatureRules::default(),
            default_signer_name: "Signer".to_string(),
        }
    }
}

/// Partial configuration; `None` means "keep the default"
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecorConfigOverrides {
    pub curve: Option<CurveOverrides>,
    pub text: Option<TextOverrides>,
    pub offsets: Option<OffsetOverrides>,
    pub signature: Option<SignatureRulesOverrides>,
    pub default_signer_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CurveOverrides {
    pub color: Option<String>,
    pub stroke_width: Option<f64>,
    pub top_length_ratio: Option<f64>,
    pub top_length_max: Option<f64>,
    pub bottom_length_ratio: Option<f64>,
    pub bottom_length_max: Option<f64>,
    pub vertical_segment: Option<f64>,
    pub corner_radius: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextOverrides {
    pub color: Option<String>,
    pub font_family: Option<String>,
    pub signer_font_size: Option<f64>,
    pub timestamp_font_size: Option<f64>,
    pub gap: Option<f64>,
    pub timestamp_format: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OffsetOverrides {
    pub top_curve: Option<f64>,
    pub bottom_curve: Option<f64>,
    pub top_label: Option<f64>,
    pub bottom_label: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SignatureRulesOverrides {
    pub type_code: Option<String>,
    pub name_marker: Option<String>,
}

impl DecorConfigOverrides {
    /// Parse overrides from TOML
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Parse overrides from JSON
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

impl DecorConfig {
    /// Defaults with `overrides` applied. Total: every leaf ends up populated.
    pub fn merged(overrides: &DecorConfigOverrides) -> Self {
        Self::default().merge(overrides)
    }

    /// Merged and validated configuration
    pub fn try_from_overrides(overrides: &DecorConfigOverrides) -> Result<Self, ConfigError> {
        let config = Self::merged(overrides);
        config.validate()?;
        Ok(config)
    }

    /// Apply `overrides` on top of this configuration
    pub fn merge(self, overrides: &DecorConfigOverrides) -> Self {
        Self {
            curve: match &overrides.curve {
                Some(o) => self.curve.merge(o),
                None => self.curve,
            },
            text: match &overrides.text {
                Some(o) => self.text.merge(o),
                None => self.text,
            },
            offsets: match &overrides.offsets {
                Some(o) => self.offsets.merge(o),
                None => self.offsets,
            },
            signature: match &overrides.signature {
                Some(o) => self.signature.merge(o),
                None => self.signature,
            },
            default_signer_name: pick(&overrides.default_signer_name, self.default_signer_name),
        }
    }

    /// Check the numeric and textual invariants of the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.curve;
        non_negative("curve.stroke_width", c.stroke_width)?;
        non_negative("curve.top_length_ratio", c.top_length_ratio)?;
        non_negative("curve.top_length_max", c.top_length_max)?;
        non_negative("curve.bottom_length_ratio", c.bottom_length_ratio)?;
        non_negative("curve.bottom_length_max", c.bottom_length_max)?;
        non_negative("curve.vertical_segment", c.vertical_segment)?;
        non_negative("curve.corner_radius", c.corner_radius)?;
        not_empty("curve.color", &c.color)?;

        let t = &self.text;
        non_negative("text.signer_font_size", t.signer_font_size)?;
        non_negative("text.timestamp_font_size", t.timestamp_font_size)?;
        non_negative("text.gap", t.gap)?;
        not_empty("text.color", &t.color)?;
        not_empty("text.font_family", &t.font_family)?;
        not_empty("text.timestamp_format", &t.timestamp_format)?;
        if StrftimeItems::new(&t.timestamp_format).any(|item| matches!(item, Item::Error)) {
            return Err(ConfigError::InvalidTimestampFormat(
                t.timestamp_format.clone(),
            ));
        }

        let o = &self.offsets;
        finite("offsets.top_curve", o.top_curve)?;
        finite("offsets.bottom_curve", o.bottom_curve)?;
        finite("offsets.top_label", o.top_label)?;
        finite("offsets.bottom_label", o.bottom_label)?;

        if self.signature.type_code.trim().is_empty() && self.signature.name_marker.trim().is_empty() {
            return Err(ConfigError::Empty {
                field: "signature.type_code",
            });
        }

        not_empty("default_signer_name", &self.default_signer_name)
    }
}

impl CurveConfig {
    fn merge(self, o: &CurveOverrides) -> Self {
        Self {
            color: pick(&o.color, self.color),
            stroke_width: o.stroke_width.unwrap_or(self.stroke_width),
            top_length_ratio: o.top_length_ratio.unwrap_or(self.top_length_ratio),
            top_length_max: o.top_length_max.unwrap_or(self.top_length_max),
            bottom_length_ratio: o.bottom_length_ratio.unwrap_or(self.bottom_length_ratio),
            bottom_length_max: o.bottom_length_max.unwrap_or(self.bottom_length_max),
            vertical_segment: o.vertical_segment.unwrap_or(self.vertical_segment),
            corner_radius: o.corner_radius.unwrap_or(self.corner_radius),
        }
    }
}

impl TextConfig {
    fn merge(self, o: &TextOverrides) -> Self {
        Self {
            color: pick(&o.color, self.color),
            font_family: pick(&o.font_family, self.font_family),
            signer_font_size: o.signer_font_size.unwrap_or(self.signer_font_size),
            timestamp_font_size: o.timestamp_font_size.unwrap_or(self.timestamp_font_size),
            gap: o.gap.unwrap_or(self.gap),
            timestamp_format: pick(&o.timestamp_format, self.timestamp_format),
        }
    }
}

impl OffsetConfig {
    fn merge(self, o: &OffsetOverrides) -> Self {
        Self {
            top_curve: o.top_curve.unwrap_or(self.top_curve),
            bottom_curve: o.bottom_curve.unwrap_or(self.bottom_curve),
            top_label: o.top_label.unwrap_or(self.top_label),
            bottom_label: o.bottom_label.unwrap_or(self.bottom_label),
        }
    }
}

impl SignatureRules {
    fn merge(self, o: &SignatureRulesOverrides) -> Self {
        Self {
            type_code: pick(&o.type_code, self.type_code),
            name_marker: pick(&o.name_marker, self.name_marker),
        }
    }
}

fn pick(value: &Option<String>, fallback: String) -> String {
    value.clone().unwrap_or(fallback)
}

fn finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite { field })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value < 0.0 {
        return Err(ConfigError::Negative { field });
    }
    Ok(())
}

fn not_empty(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Empty { field });
    }
    Ok(())
}
