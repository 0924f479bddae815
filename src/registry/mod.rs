//! Operation registry
//!
//! The fixed, ordered set of operations the gateway advertises and
//! dispatches. Built once at startup and never mutated.

mod catalog;
mod types;

pub use catalog::OperationKind;
pub use types::{FieldDef, FieldType, InputShape};

use serde::ser::{Serialize, SerializeStruct, Serializer};

/// One advertised operation
#[derive(Debug, Clone, PartialEq)]
pub struct OperationDescriptor {
    kind: OperationKind,
    input_shape: InputShape,
}

impl OperationDescriptor {
    pub fn new(kind: OperationKind) -> Self {
        Self {
            kind,
            input_shape: kind.input_shape(),
        }
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn description(&self) -> &'static str {
        self.kind.description()
    }

    pub fn input_shape(&self) -> &InputShape {
        &self.input_shape
    }
}

/// Wire form: `{name, description, inputSchema}`
impl Serialize for OperationDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("OperationDescriptor", 3)?;
        state.serialize_field("name", self.name())?;
        state.serialize_field("description", self.description())?;
        state.serialize_field("inputSchema", &self.input_shape.to_json_schema())?;
        state.end()
    }
}

/// Ordered lookup of operation descriptors
#[derive(Debug, Clone)]
pub struct OperationRegistry {
    descriptors: Vec<OperationDescriptor>,
}

impl OperationRegistry {
    /// Registry holding every known operation in registration order
    pub fn standard() -> Self {
        Self {
            descriptors: OperationKind::ALL
                .iter()
                .map(|kind| OperationDescriptor::new(*kind))
                .collect(),
        }
    }

    pub fn list(&self) -> &[OperationDescriptor] {
        &self.descriptors
    }

    pub fn get(&self, name: &str) -> Option<&OperationDescriptor> {
        self.descriptors.iter().find(|d| d.name() == name)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl Default for OperationRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry_order() {
        let registry = OperationRegistry::standard();
        assert_eq!(registry.len(), 34);
        assert_eq!(registry.list()[0].name(), "honeycomb_auth");
        assert_eq!(registry.list()[33].name(), "honeycomb_trigger_delete");
    }

    #[test]
    fn test_lookup() {
        let registry = OperationRegistry::standard();
        let descriptor = registry.get("honeycomb_query_create").unwrap();
        assert_eq!(descriptor.kind(), OperationKind::QueryCreate);
        assert!(registry.get("HONEYCOMB_QUERY_CREATE").is_none());
        assert!(registry.get("").is_none());
    }

    #[test]
    fn test_required_subset_of_properties() {
        for descriptor in OperationRegistry::standard().list() {
            let schema = descriptor.input_shape().to_json_schema();
            let properties = schema["properties"].as_object().unwrap();
            if let Some(required) = schema["required"].as_array() {
                for name in required {
                    assert!(
                        properties.contains_key(name.as_str().unwrap()),
                        "{} requires undeclared {}",
                        descriptor.name(),
                        name
                    );
                }
            }
        }
    }

    #[test]
    fn test_descriptor_wire_shape() {
        let registry = OperationRegistry::standard();
        let json = serde_json::to_value(registry.get("honeycomb_dataset_get").unwrap()).unwrap();
        assert_eq!(json["name"], "honeycomb_dataset_get");
        assert_eq!(json["inputSchema"]["type"], "object");
        assert_eq!(json["inputSchema"]["required"], serde_json::json!(["datasetSlug"]));

        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["name", "description", "inputSchema"]);
    }
}
