// SPDX-License-Identifier: PMPL-1.0-or-later
//! Plugin manifest (`manifest.json`) decoding

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{Map, Value};

use crate::error::PipelineError;

/// A decoded `manifest.json`
///
/// The well-known fields are lifted out of the raw object; the full object is
/// kept so the record can carry everything the author declared.
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestDocument {
    pub domain: Option<String>,
    pub version: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<Value>,
    pub dependencies: Option<Value>,
    pub documentation_uri: Option<String>,
    pub zip_filename: Option<String>,
    raw: Map<String, Value>,
}

impl ManifestDocument {
    /// Decode the base64 content returned by the contents API.
    ///
    /// Line breaks and other whitespace inside the encoding are ignored.
    pub fn from_base64(content: &str) -> Result<Self, PipelineError> {
        let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| PipelineError::MalformedManifest(format!("invalid base64: {}", e)))?;
        Self::from_slice(&bytes)
    }

    /// Parse raw JSON bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self, PipelineError> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| PipelineError::MalformedManifest(e.to_string()))?;
        Self::from_value(value)
    }

    /// Build from an already parsed JSON value; it must be an object
    pub fn from_value(value: Value) -> Result<Self, PipelineError> {
        let raw = match value {
            Value::Object(map) => map,
            other => {
                return Err(PipelineError::MalformedManifest(format!(
                    "expected a JSON object, got {}",
                    json_type(&other)
                )))
            }
        };

        let text = |key: &str| raw.get(key).and_then(Value::as_str).map(str::to_string);

        Ok(Self {
            domain: text("domain"),
            version: text("version"),
            name: text("name"),
            description: text("description"),
            category: raw.get("category").cloned(),
            dependencies: raw.get("dependencies").cloned(),
            documentation_uri: text("documentation_uri"),
            zip_filename: text("zip_filename"),
            raw,
        })
    }

    pub fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }

    /// Manifest object as stored in the record, minus `exclude` keys
    pub fn to_record(&self, exclude: &[String]) -> Map<String, Value> {
        self.raw
            .iter()
            .filter(|(key, _)| !exclude.iter().any(|e| e == *key))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
