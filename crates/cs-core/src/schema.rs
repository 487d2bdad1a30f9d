//! Configuration parser and schema validator.
//!
//! The configuration file is YAML whose shape is described by an embedded
//! JSON Schema (draft 7). Two consumers use it differently:
//!
//! - [`parse_config`] is lenient and only extracts plugin locations. It never
//!   fails; a broken file simply yields no plugins.
//! - [`ConfigSchema::validate_yaml`] is strict and reports every violation.
//!   It gates generated output before anything is committed.

use jsonschema::{Draft, JSONSchema};
use serde_json::Value;
use thiserror::Error;

use crate::plugin::PluginLocation;

const PLUGIN_CONFIGURATION_SCHEMA: &str = include_str!("schemas/plugin_configuration.schema.json");

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to parse schema: {0}")]
    Parse(String),

    #[error("failed to compile schema: {0}")]
    Compile(String),
}

/// Why a configuration document yielded no plugin locations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigParseError {
    #[error("invalid YAML: {0}")]
    Yaml(String),

    #[error("unexpected configuration shape: {0}")]
    Shape(String),
}

// ---------------------------------------------------------------------------
// ValidationResult
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub valid: bool,
    /// All violations joined with `", "`.
    pub error: Option<String>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(error.into()),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

// ---------------------------------------------------------------------------
// YAML loading
// ---------------------------------------------------------------------------

/// Load a single YAML document as a JSON value. An empty document is `null`.
pub fn load_yaml(text: &str) -> Result<Value, ConfigParseError> {
    serde_yaml::from_str::<Value>(text).map_err(|e| ConfigParseError::Yaml(e.to_string()))
}

// ---------------------------------------------------------------------------
// ConfigSchema
// ---------------------------------------------------------------------------

pub struct ConfigSchema {
    schema: Value,
    compiled: JSONSchema,
}

impl std::fmt::Debug for ConfigSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigSchema")
            .field("title", &self.schema.get("title"))
            .finish()
    }
}

impl ConfigSchema {
    /// Compile the embedded plugin configuration schema.
    pub fn new() -> Result<Self, SchemaError> {
        let schema: Value = serde_json::from_str(PLUGIN_CONFIGURATION_SCHEMA)
            .map_err(|e| SchemaError::Parse(e.to_string()))?;
        Self::from_value(schema)
    }

    pub fn from_value(schema: Value) -> Result<Self, SchemaError> {
        let compiled = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(&schema)
            .map_err(|e| SchemaError::Compile(e.to_string()))?;
        Ok(Self { schema, compiled })
    }

    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Fill in `default` values declared by the schema for absent keys.
    pub fn apply_defaults(&self, value: &mut Value) {
        apply_defaults(&self.schema, &self.schema, value);
    }

    /// Validate an already-defaulted document.
    pub fn validate_value(&self, value: &Value) -> ValidationResult {
        let messages: Vec<String> = match self.compiled.validate(value) {
            Ok(()) => return ValidationResult::ok(),
            Err(errors) => errors
                .map(|e| {
                    let path = e.instance_path.to_string();
                    if path.is_empty() {
                        e.to_string()
                    } else {
                        format!("{e} at {path}")
                    }
                })
                .collect(),
        };
        ValidationResult::invalid(messages.join(", "))
    }

    /// Parse, apply defaults, then validate.
    pub fn validate_yaml(&self, text: &str) -> ValidationResult {
        let mut document = match load_yaml(text) {
            Ok(doc) => doc,
            Err(e) => return ValidationResult::invalid(e.to_string()),
        };
        self.apply_defaults(&mut document);
        self.validate_value(&document)
    }
}

fn resolve_ref<'a>(root: &'a Value, schema: &'a Value) -> &'a Value {
    schema
        .get("$ref")
        .and_then(Value::as_str)
        .and_then(|r| r.strip_prefix("#/definitions/"))
        .and_then(|name| root.get("definitions").and_then(|d| d.get(name)))
        .unwrap_or(schema)
}

fn type_matches(schema: &Value, value: &Value) -> bool {
    let matches_one = |ty: &str| match ty {
        "object" => value.is_object(),
        "array" => value.is_array(),
        "string" => value.is_string(),
        "boolean" => value.is_boolean(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "null" => value.is_null(),
        _ => false,
    };
    match schema.get("type") {
        Some(Value::String(ty)) => matches_one(ty),
        Some(Value::Array(types)) => types.iter().filter_map(Value::as_str).any(matches_one),
        _ => true,
    }
}

fn apply_defaults<'a>(root: &'a Value, schema: &'a Value, value: &mut Value) {
    let schema = resolve_ref(root, schema);

    if let Some(branches) = schema.get("anyOf").and_then(Value::as_array) {
        let branch = branches
            .iter()
            .map(|b| resolve_ref(root, b))
            .find(|b| type_matches(b, value));
        if let Some(branch) = branch {
            apply_defaults(root, branch, value);
        }
        return;
    }

    match value {
        Value::Object(map) => {
            let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
                return;
            };
            for (key, sub) in properties {
                let sub = resolve_ref(root, sub);
                if !map.contains_key(key) {
                    if let Some(default) = sub.get("default") {
                        map.insert(key.clone(), default.clone());
                    }
                }
                if let Some(child) = map.get_mut(key) {
                    apply_defaults(root, sub, child);
                }
            }
        }
        Value::Array(items) => {
            if let Some(item_schema) = schema.get("items") {
                for item in items.iter_mut() {
                    apply_defaults(root, item_schema, item);
                }
            }
        }
        _ => {}
    }
}

// ---------------------------------------------------------------------------
// Plugin location extraction
// ---------------------------------------------------------------------------

/// Extract plugin locations, distinguishing a broken document from one
/// without plugins.
pub fn try_parse_plugin_locations(text: &str) -> Result<Vec<PluginLocation>, ConfigParseError> {
    let document = load_yaml(text)?;

    let handlers = match &document {
        Value::Null => return Ok(Vec::new()),
        Value::Object(map) => match map.get("plugins") {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(Value::Array(handlers)) => handlers,
            Some(_) => {
                return Err(ConfigParseError::Shape(
                    "`plugins` must be a sequence".into(),
                ))
            }
        },
        _ => {
            return Err(ConfigParseError::Shape(
                "configuration root must be a mapping".into(),
            ))
        }
    };

    let locations = handlers
        .iter()
        .filter_map(|handler| handler.get("uses").and_then(Value::as_array))
        .flatten()
        .filter_map(|entry| match entry {
            Value::String(url) => Some(PluginLocation::url(url.clone())),
            Value::Object(item) => item
                .get("plugin")
                .and_then(Value::as_str)
                .and_then(PluginLocation::from_plugin_reference),
            _ => None,
        })
        .collect();

    Ok(locations)
}

/// Lenient extraction used by the sync pipeline: errors are logged and
/// collapse to an empty list.
pub fn parse_config(text: &str) -> Vec<PluginLocation> {
    match try_parse_plugin_locations(text) {
        Ok(locations) => locations,
        Err(e) => {
            tracing::error!(error = %e, "failed to parse configuration YAML");
            Vec::new()
        }
    }
}
