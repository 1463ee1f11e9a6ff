//! Free-form annotation metadata written by the signing flow

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

const IS_SIGNATURE_KEY: &str = "isSignature";
const SIGNER_NAME_KEY: &str = "signerName";

/// Arbitrary key/value data attached to an annotation. May be empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomData(BTreeMap<String, Value>);

impl CustomData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the signing flow flagged this annotation as a signature.
    ///
    /// Accepts a JSON boolean or the strings `"true"`/`"1"`; anything else is false.
    pub fn is_signature(&self) -> bool {
        match self.0.get(IS_SIGNATURE_KEY) {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::String(s)) => {
                let s = s.trim();
                s.eq_ignore_ascii_case("true") || s == "1"
            }
            Some(Value::Number(n)) => n.as_i64() == Some(1),
            _ => false,
        }
    }

    /// Signer name recorded by the signing flow, if present and not blank
    pub fn signer_name(&self) -> Option<&str> {
        match self.0.get(SIGNER_NAME_KEY) {
            Some(Value::String(name)) if !name.trim().is_empty() => Some(name.trim()),
            _ => None,
        }
    }
}
