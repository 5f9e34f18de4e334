//! @dose
//! purpose: This module defines the data types that flow through compdoc: the static
//!     ComponentDoc produced by the analyzer, its property/type descriptors, and the
//!     ComponentDocRecord that the aggregator writes to the output array.
//!
//! when-editing:
//!     - !ComponentDocRecord.file is serialized first and must never come from a source bag
//!     - !All serialized names are camelCase to match the established docgen JSON shape
//!     - Optional fields use skip_serializing_if so absent data stays absent in output
//!
//! invariants:
//!     - ComponentDoc.properties is always present on a successful extraction, possibly empty
//!     - ComponentDocRecord.fields never contains the key "file"
//!     - BTreeMap keeps property and field order deterministic across runs
//!
//! gotchas:
//!     - DefaultValue.value is raw source text, not an evaluated value
//!     - A prop can carry both `type` (PropTypes) and `tsType` (TypeScript) descriptors

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Reserved output key holding the aggregator-assigned file identifier
pub const FILE_KEY: &str = "file";

/// Statically extracted documentation for one component definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDoc {
    /// Leading doc comment of the definition (empty when undocumented)
    pub description: String,
    /// Explicit displayName, else the definition identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Public, non-lifecycle methods of class components
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<MethodDoc>,
    /// Property name -> descriptor
    #[serde(default)]
    pub properties: BTreeMap<String, PropDescriptor>,
    /// Modules whose propTypes are spread into this component's propTypes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub composes: Vec<String>,
}

impl ComponentDoc {
    /// Get or create the descriptor for a property
    pub fn prop_mut(&mut self, name: &str) -> &mut PropDescriptor {
        self.properties.entry(name.to_string()).or_default()
    }

    /// Convert into a JSON object for merging
    pub fn into_fields(self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

/// Descriptor of a single component property
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropDescriptor {
    /// Type derived from a PropTypes validator
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub prop_type: Option<TypeDescriptor>,
    /// Type derived from a TypeScript annotation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ts_type: Option<TypeDescriptor>,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<DefaultValue>,
    pub description: String,
}

/// Structured type description (e.g. `{ "name": "arrayOf", "value": { "name": "string" } }`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elements: Option<Vec<TypeDescriptor>>,
}

impl TypeDescriptor {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
            raw: None,
            elements: None,
        }
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_raw(mut self, raw: impl Into<String>) -> Self {
        self.raw = Some(raw.into());
        self
    }

    pub fn with_elements(mut self, elements: Vec<TypeDescriptor>) -> Self {
        self.elements = Some(elements);
        self
    }

    /// JSON form used when a descriptor is nested inside another's `value`
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Default value as written in source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultValue {
    /// Raw source text of the default expression
    pub value: String,
    /// True when the value is not a literal (identifier, call, member access, ...)
    pub computed: bool,
}

/// Documented class method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDoc {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub modifiers: Vec<String>,
    pub params: Vec<MethodParam>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodParam {
    pub name: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
}

/// One element of the output array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDocRecord {
    /// Relative name of the source file
    pub file: String,
    /// Static and runtime fields merged at the top level
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ComponentDocRecord {
    /// A record carrying only the file identifier
    pub fn bare(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            fields: Map::new(),
        }
    }

    /// Build a record from the two sources: static fields first, runtime fields
    /// overlaid on top. `file` from either source is discarded.
    pub fn merge(
        file: impl Into<String>,
        static_fields: Option<Map<String, Value>>,
        runtime_fields: Option<Map<String, Value>>,
    ) -> Self {
        let mut fields = static_fields.unwrap_or_default();
        if let Some(runtime) = runtime_fields {
            for (key, value) in runtime {
                fields.insert(key, value);
            }
        }
        fields.remove(FILE_KEY);

        Self {
            file: file.into(),
            fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_merge_runtime_wins_on_collision() {
        let record = ComponentDocRecord::merge(
            "Button.jsx",
            Some(object(json!({"description": "static", "displayName": "Button"}))),
            Some(object(json!({"description": "runtime", "category": "inputs"}))),
        );

        assert_eq!(record.fields["description"], json!("runtime"));
        assert_eq!(record.fields["displayName"], json!("Button"));
        assert_eq!(record.fields["category"], json!("inputs"));
    }

    #[test]
    fn test_merge_never_overwrites_file() {
        let record = ComponentDocRecord::merge(
            "Button.jsx",
            Some(object(json!({"file": "static.jsx"}))),
            Some(object(json!({"file": "runtime.jsx"}))),
        );

        assert_eq!(record.file, "Button.jsx");
        assert!(!record.fields.contains_key(FILE_KEY));

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value, json!({"file": "Button.jsx"}));
    }

    #[test]
    fn test_merge_both_absent_is_bare() {
        let record = ComponentDocRecord::merge("Broken.jsx", None, None);
        assert_eq!(record, ComponentDocRecord::bare("Broken.jsx"));
        assert!(record.fields.is_empty());
    }

    #[test]
    fn test_record_serializes_file_first() {
        let record = ComponentDocRecord::merge(
            "Card.jsx",
            Some(object(json!({"description": "", "properties": {}}))),
            None,
        );
        let text = serde_json::to_string(&record).unwrap();
        assert!(text.starts_with(r#"{"file":"Card.jsx""#), "got {text}");
    }

    #[test]
    fn test_component_doc_fields_shape() {
        let mut doc = ComponentDoc {
            display_name: Some("Button".to_string()),
            ..Default::default()
        };
        let label = doc.prop_mut("label");
        label.prop_type = Some(TypeDescriptor::named("string"));
        label.required = true;

        let fields = doc.into_fields();
        assert_eq!(fields["displayName"], json!("Button"));
        assert_eq!(
            fields["properties"]["label"],
            json!({"type": {"name": "string"}, "required": true, "description": ""})
        );
        assert!(!fields.contains_key("methods"));
        assert!(!fields.contains_key("composes"));
    }
}
