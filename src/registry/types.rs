//! Input-shape declarations for registered operations
//!
//! A shape is an ordered list of field definitions. It serializes to a
//! JSON Schema object so callers can validate arguments before dispatch;
//! the dispatcher still checks required fields itself.

use serde_json::{json, Map, Value};

use crate::query::QuerySpec;

/// Supported argument types
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    /// UTF-8 string
    String,
    /// String restricted to a fixed set of values
    Enum(&'static [&'static str]),
    /// Whole number
    Integer,
    /// Any JSON number
    Number,
    /// Unix seconds or an RFC 3339 string
    Timestamp,
    /// Boolean
    Bool,
    /// Free-form object forwarded as-is
    Object,
    /// Homogeneous array
    Array(Box<FieldType>),
    /// Nested query specification
    Query,
    /// Object with a fixed set of named fields
    Record(Vec<FieldDef>),
}

impl FieldType {
    /// Returns the JSON Schema type name
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::String | FieldType::Enum(_) => "string",
            FieldType::Integer | FieldType::Timestamp => "integer",
            FieldType::Number => "number",
            FieldType::Bool => "boolean",
            FieldType::Object | FieldType::Query | FieldType::Record(_) => "object",
            FieldType::Array(_) => "array",
        }
    }

    fn to_json_schema(&self) -> Value {
        match self {
            FieldType::Enum(values) => json!({ "type": "string", "enum": values }),
            FieldType::Array(items) => json!({ "type": "array", "items": items.to_json_schema() }),
            FieldType::Query => QuerySpec::json_schema(),
            FieldType::Timestamp => json!({ "type": ["integer", "string"] }),
            FieldType::Record(fields) => object_schema(fields),
            other => json!({ "type": other.type_name() }),
        }
    }
}

/// One named argument
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: &'static str,
    pub field_type: FieldType,
    pub required: bool,
    pub description: &'static str,
}

impl FieldDef {
    pub fn required(name: &'static str, field_type: FieldType, description: &'static str) -> Self {
        Self {
            name,
            field_type,
            required: true,
            description,
        }
    }

    pub fn optional(name: &'static str, field_type: FieldType, description: &'static str) -> Self {
        Self {
            name,
            field_type,
            required: false,
            description,
        }
    }

    /// Create a required string field
    pub fn required_string(name: &'static str, description: &'static str) -> Self {
        Self::required(name, FieldType::String, description)
    }

    /// Create an optional string field
    pub fn optional_string(name: &'static str, description: &'static str) -> Self {
        Self::optional(name, FieldType::String, description)
    }

    /// Create a required integer field
    pub fn required_int(name: &'static str, description: &'static str) -> Self {
        Self::required(name, FieldType::Integer, description)
    }

    /// Create an optional integer field
    pub fn optional_int(name: &'static str, description: &'static str) -> Self {
        Self::optional(name, FieldType::Integer, description)
    }

    /// Create an optional bool field
    pub fn optional_bool(name: &'static str, description: &'static str) -> Self {
        Self::optional(name, FieldType::Bool, description)
    }

    fn to_json_schema(&self) -> Value {
        let mut schema = self.field_type.to_json_schema();
        if !self.description.is_empty() {
            if let Value::Object(map) = &mut schema {
                map.insert("description".into(), Value::String(self.description.into()));
            }
        }
        schema
    }
}

fn object_schema(fields: &[FieldDef]) -> Value {
    let mut properties = Map::new();
    for field in fields {
        properties.insert(field.name.to_string(), field.to_json_schema());
    }
    let required: Vec<&str> = fields.iter().filter(|f| f.required).map(|f| f.name).collect();

    let mut schema = Map::new();
    schema.insert("type".into(), json!("object"));
    schema.insert("properties".into(), Value::Object(properties));
    if !required.is_empty() {
        schema.insert("required".into(), json!(required));
    }
    Value::Object(schema)
}

/// Declared arguments of one operation, in declaration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputShape {
    fields: Vec<FieldDef>,
}

impl InputShape {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Names of required fields, in declaration order
    pub fn required_fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().filter(|f| f.required).map(|f| f.name)
    }

    pub fn has_required_fields(&self) -> bool {
        self.fields.iter().any(|f| f.required)
    }

    /// JSON Schema object advertised to callers
    pub fn to_json_schema(&self) -> Value {
        object_schema(&self.fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker_shape() -> InputShape {
        InputShape::new()
            .with(FieldDef::required_string("datasetSlug", "Dataset slug or 'all'"))
            .with(FieldDef::required_string("message", ""))
            .with(FieldDef::optional_string("url", ""))
            .with(FieldDef::required_int("start_time", ""))
    }

    #[test]
    fn test_required_fields_in_declaration_order() {
        let required: Vec<_> = marker_shape().required_fields().collect();
        assert_eq!(required, vec!["datasetSlug", "message", "start_time"]);
    }

    #[test]
    fn test_schema_preserves_property_order() {
        let schema = marker_shape().to_json_schema();
        let keys: Vec<_> = schema["properties"].as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["datasetSlug", "message", "url", "start_time"]);
        assert_eq!(schema["required"], json!(["datasetSlug", "message", "start_time"]));
        assert_eq!(schema["properties"]["datasetSlug"]["description"], "Dataset slug or 'all'");
        assert!(schema["properties"]["message"].get("description").is_none());
    }

    #[test]
    fn test_empty_shape_omits_required() {
        let schema = InputShape::new().to_json_schema();
        assert_eq!(schema, json!({ "type": "object", "properties": {} }));
        assert!(!InputShape::new().has_required_fields());
    }

    #[test]
    fn test_nested_types() {
        let shape = InputShape::new()
            .with(FieldDef::optional(
                "sort_order",
                FieldType::Enum(&["asc", "desc"]),
                "",
            ))
            .with(FieldDef::optional(
                "query_ids",
                FieldType::Array(Box::new(FieldType::String)),
                "",
            ))
            .with(FieldDef::required(
                "sli",
                FieldType::Record(vec![FieldDef::required_string("alias", "")]),
                "",
            ))
            .with(FieldDef::required("query", FieldType::Query, ""));

        let schema = shape.to_json_schema();
        let props = &schema["properties"];
        assert_eq!(props["sort_order"]["enum"], json!(["asc", "desc"]));
        assert_eq!(props["query_ids"]["items"]["type"], "string");
        assert_eq!(props["sli"]["required"], json!(["alias"]));
        assert!(props["query"]["properties"]["calculations"].is_object());
    }
}
