//! Plugin manifest documents.
//!
//! A manifest describes the commands, event listeners and configuration
//! properties a plugin accepts. Decoding is strict about `name` and lenient
//! about everything else: optional sections are filled with empty defaults so
//! consumers never have to handle missing keys.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ManifestError {
    #[error("manifest is invalid: not an object")]
    NotAnObject,

    #[error("manifest is invalid: name is required and must be a non-empty string")]
    MissingName,

    #[error("manifest is invalid: {0}")]
    Malformed(String),
}

/// A command exposed by a plugin.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandSpec {
    #[serde(default)]
    pub description: String,
    #[serde(rename = "ubiquity:example", default)]
    pub example: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub name: String,
    pub description: String,
    pub commands: BTreeMap<String, CommandSpec>,
    #[serde(rename = "ubiquity:listeners")]
    pub listeners: Vec<String>,
    pub configuration: serde_json::Map<String, Value>,
}

/// Wire shape before defaults are applied.
#[derive(Deserialize)]
struct RawManifest {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    commands: Option<BTreeMap<String, CommandSpec>>,
    #[serde(rename = "ubiquity:listeners", default)]
    listeners: Option<Vec<String>>,
    #[serde(default)]
    configuration: Option<serde_json::Map<String, Value>>,
}

impl Manifest {
    /// Decode a JSON document into a manifest, applying defaults.
    pub fn decode(value: Value) -> Result<Self, ManifestError> {
        let object = value.as_object().ok_or(ManifestError::NotAnObject)?;

        let name = match object.get("name") {
            Some(Value::String(name)) if !name.is_empty() => name.clone(),
            _ => return Err(ManifestError::MissingName),
        };

        let raw: RawManifest =
            serde_json::from_value(value).map_err(|e| ManifestError::Malformed(e.to_string()))?;

        Ok(Self {
            name,
            description: raw.description.unwrap_or_default(),
            commands: raw.commands.unwrap_or_default(),
            listeners: raw.listeners.unwrap_or_default(),
            configuration: raw.configuration.unwrap_or_default(),
        })
    }

    /// Parse and decode a JSON string.
    pub fn from_json_str(text: &str) -> Result<Self, ManifestError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| ManifestError::Malformed(e.to_string()))?;
        Self::decode(value)
    }
}
