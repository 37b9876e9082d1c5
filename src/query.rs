//! Model document inspection
//!
//! Extracts a model's own identifier and its direct dependency references
//! from raw DTDL JSON. Dependencies come from two places: `extends` entries
//! and the `schema` of `Component` elements under `contents`. Either may
//! hold a plain DTMI reference or an inline `Interface` object, whose own
//! references are extracted recursively and merged in.
//!
//! This layer works on raw strings and never validates identifiers; the
//! resolution engine and importer apply DTMI validation at their
//! boundaries.

use crate::error::ResolverError;
use serde_json::Value;
use std::collections::HashMap;

const PROP_ID: &str = "@id";
const PROP_TYPE: &str = "@type";
const PROP_EXTENDS: &str = "extends";
const PROP_CONTENTS: &str = "contents";
const PROP_SCHEMA: &str = "schema";
const TYPE_INTERFACE: &str = "Interface";
const TYPE_COMPONENT: &str = "Component";

/// Identity and dependency references extracted from one model document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelMetadata {
    id: String,
    extends: Vec<String>,
    component_schemas: Vec<String>,
}

impl ModelMetadata {
    /// The document's `@id`, or an empty string when absent or not a
    /// string. Absence is not an error at this layer.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// References discovered through `extends`.
    pub fn extends(&self) -> &[String] {
        &self.extends
    }

    /// References discovered through `Component` schemas.
    pub fn component_schemas(&self) -> &[String] {
        &self.component_schemas
    }

    /// Set union of all discovered references, first-seen order.
    pub fn dependencies(&self) -> Vec<String> {
        let mut dependencies: Vec<String> = Vec::new();
        for reference in self.extends.iter().chain(self.component_schemas.iter()) {
            if !dependencies.contains(reference) {
                dependencies.push(reference.clone());
            }
        }
        dependencies
    }
}

/// Read-only queries over one fetched model document.
pub struct ModelQuery<'a> {
    content: &'a str,
}

impl<'a> ModelQuery<'a> {
    pub fn new(content: &'a str) -> Self {
        Self { content }
    }

    /// Parse the document and extract its metadata.
    pub fn parse_model(&self) -> Result<ModelMetadata, serde_json::Error> {
        let root = parse_lenient(self.content)?;
        Ok(parse_interface(&root))
    }

    /// Flatten a pre-expanded bundle (a JSON array of model objects) into a
    /// map keyed by each element's own `@id`, with the element re-serialized
    /// as its value. Non-array documents yield an empty map.
    pub fn list_to_map(&self) -> Result<HashMap<String, String>, serde_json::Error> {
        let root = parse_lenient(self.content)?;
        let mut models = HashMap::new();

        if let Value::Array(elements) = root {
            for element in &elements {
                if element.is_object() {
                    let serialized = serde_json::to_string(element)?;
                    let id = parse_interface(element).id;
                    models.entry(id).or_insert(serialized);
                }
            }
        }

        Ok(models)
    }
}

/// Split a raw document into its individual model documents.
///
/// A top-level object yields one document, a top-level array yields one per
/// element; the returned flag records whether the input was an array. Any
/// other top-level kind is rejected.
pub fn extract_documents(content: &str) -> Result<(Vec<String>, bool), ResolverError> {
    let root = parse_lenient(content).map_err(|e| ResolverError::InvalidModelContent {
        context: "document".to_owned(),
        message: e.to_string(),
    })?;

    match root {
        Value::Object(_) => {
            let document = serialize_value(&root)?;
            Ok((vec![document], false))
        }
        Value::Array(elements) => {
            let mut documents = Vec::with_capacity(elements.len());
            for element in &elements {
                documents.push(serialize_value(element)?);
            }
            Ok((documents, true))
        }
        other => Err(ResolverError::UnsupportedContentKind {
            kind: value_kind(&other),
        }),
    }
}

fn serialize_value(value: &Value) -> Result<String, ResolverError> {
    serde_json::to_string_pretty(value).map_err(|e| ResolverError::InvalidModelContent {
        context: "document".to_owned(),
        message: e.to_string(),
    })
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Parse JSON, tolerating trailing commas.
///
/// Hand-edited model files occasionally carry a comma before a closing
/// bracket; the strict parse is retried once with those commas stripped.
pub(crate) fn parse_lenient(content: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str(content).or_else(|e| {
        serde_json::from_str(&strip_trailing_commas(content)).map_err(|_| e)
    })
}

/// Remove commas that directly precede `}` or `]`, outside string literals.
fn strip_trailing_commas(content: &str) -> String {
    let mut cleaned = String::with_capacity(content.len());
    let mut in_string = false;
    let mut escaped = false;

    for (index, character) in content.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if character == '\\' {
                escaped = true;
            } else if character == '"' {
                in_string = false;
            }
            cleaned.push(character);
            continue;
        }

        match character {
            '"' => {
                in_string = true;
                cleaned.push(character);
            }
            ',' => {
                let next = content[index + 1..].trim_start().chars().next();
                if !matches!(next, Some('}') | Some(']')) {
                    cleaned.push(character);
                }
            }
            _ => cleaned.push(character),
        }
    }

    cleaned
}

fn parse_interface(element: &Value) -> ModelMetadata {
    ModelMetadata {
        id: parse_root_id(element),
        extends: parse_extends(element),
        component_schemas: parse_contents(element),
    }
}

fn parse_root_id(element: &Value) -> String {
    element
        .get(PROP_ID)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned()
}

fn is_inline_interface(element: &Value) -> bool {
    element
        .get(PROP_TYPE)
        .and_then(Value::as_str)
        .is_some_and(|kind| kind == TYPE_INTERFACE)
}

fn parse_extends(element: &Value) -> Vec<String> {
    let mut dependencies = Vec::new();

    let Some(extends) = element.get(PROP_EXTENDS) else {
        return dependencies;
    };

    match extends {
        Value::String(reference) => dependencies.push(reference.clone()),
        // Inline base interfaces contribute their own dependencies, not
        // themselves: they have no independent identifier to fetch.
        Value::Object(_) if is_inline_interface(extends) => {
            dependencies.extend(parse_interface(extends).dependencies());
        }
        Value::Array(entries) => {
            for entry in entries {
                match entry {
                    Value::String(reference) => dependencies.push(reference.clone()),
                    Value::Object(_) if is_inline_interface(entry) => {
                        dependencies.extend(parse_interface(entry).dependencies());
                    }
                    _ => {}
                }
            }
        }
        _ => {}
    }

    dependencies
}

fn parse_contents(element: &Value) -> Vec<String> {
    let mut dependencies = Vec::new();

    let Some(Value::Array(contents)) = element.get(PROP_CONTENTS) else {
        return dependencies;
    };

    for entry in contents {
        let is_component = entry
            .get(PROP_TYPE)
            .and_then(Value::as_str)
            .is_some_and(|kind| kind == TYPE_COMPONENT);
        if is_component {
            dependencies.extend(parse_component_schema(entry));
        }
    }

    dependencies
}

fn parse_component_schema(component: &Value) -> Vec<String> {
    let mut dependencies = Vec::new();

    let Some(schema) = component.get(PROP_SCHEMA) else {
        return dependencies;
    };

    match schema {
        Value::String(reference) => dependencies.push(reference.clone()),
        Value::Object(_) if is_inline_interface(schema) => {
            dependencies.extend(parse_interface(schema).dependencies());
        }
        Value::Array(entries) => {
            for entry in entries {
                match entry {
                    Value::String(reference) => dependencies.push(reference.clone()),
                    Value::Object(_) if is_inline_interface(entry) => {
                        dependencies.extend(parse_interface(entry).dependencies());
                    }
                    _ => {}
                }
            }
        }
        _ => {}
    }

    dependencies
}
