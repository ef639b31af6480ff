//! A minimal config schema used to validate integration and connection
//! config objects against what a connector declares it needs.

use serde_json::Value;

use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Number,
    Bool,
    Object,
    Array,
}

impl FieldType {
    fn matches(self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Number => value.is_number(),
            FieldType::Bool => value.is_boolean(),
            FieldType::Object => value.is_object(),
            FieldType::Array => value.is_array(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FieldSchema {
    pub name: String,
    pub field_type: FieldType,
    pub required: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SchemaDescriptor {
    pub fields: Vec<FieldSchema>,
}

impl SchemaDescriptor {
    pub fn new(fields: Vec<FieldSchema>) -> Self {
        Self { fields }
    }

    pub fn validate(&self, value: &Value) -> Result<(), DomainError> {
        let obj = value
            .as_object()
            .ok_or_else(|| DomainError::InvalidArgument("config must be a JSON object".to_string()))?;
        for field in &self.fields {
            match obj.get(&field.name) {
                Some(v) if !field.field_type.matches(v) => {
                    return Err(DomainError::InvalidArgument(format!(
                        "field {} has the wrong type (expected {:?})",
                        field.name, field.field_type
                    )));
                }
                None if field.required => {
                    return Err(DomainError::InvalidArgument(format!("missing required field {}", field.name)));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_missing_required_field() {
        let schema = SchemaDescriptor::new(vec![FieldSchema { name: "apiKey".to_string(), field_type: FieldType::String, required: true }]);
        let err = schema.validate(&json!({})).unwrap_err();
        assert!(matches!(err, DomainError::InvalidArgument(_)));
    }

    #[test]
    fn accepts_matching_shape() {
        let schema = SchemaDescriptor::new(vec![FieldSchema { name: "apiKey".to_string(), field_type: FieldType::String, required: true }]);
        schema.validate(&json!({"apiKey": "abc"})).unwrap();
    }
}
