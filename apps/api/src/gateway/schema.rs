//! Output schemas handed to the model as `responseSchema`.
//!
//! Only the leaf types the endpoint accepts are modelled: objects with a
//! `required` list, arrays, strings, integers and numbers.

use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Schema {
    Object {
        properties: BTreeMap<String, Schema>,
        required: Vec<String>,
    },
    Array {
        items: Box<Schema>,
    },
    String,
    Integer,
    Number,
}

impl Schema {
    /// An object whose listed properties are all required.
    pub fn object<'a>(properties: impl IntoIterator<Item = (&'a str, Schema)>) -> Self {
        let properties: BTreeMap<String, Schema> = properties
            .into_iter()
            .map(|(name, schema)| (name.to_string(), schema))
            .collect();
        let required = properties.keys().cloned().collect();
        Schema::Object {
            properties,
            required,
        }
    }

    pub fn array(items: Schema) -> Self {
        Schema::Array {
            items: Box::new(items),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_leaf_types_serialize_lowercase() {
        assert_eq!(serde_json::to_value(Schema::String).unwrap(), json!({"type": "string"}));
        assert_eq!(serde_json::to_value(Schema::Integer).unwrap(), json!({"type": "integer"}));
        assert_eq!(serde_json::to_value(Schema::Number).unwrap(), json!({"type": "number"}));
    }

    #[test]
    fn test_object_marks_every_property_required() {
        let schema = Schema::object([
            ("skills", Schema::array(Schema::String)),
            ("experience", Schema::Integer),
        ]);

        assert_eq!(
            serde_json::to_value(&schema).unwrap(),
            json!({
                "type": "object",
                "properties": {
                    "experience": {"type": "integer"},
                    "skills": {"type": "array", "items": {"type": "string"}}
                },
                "required": ["experience", "skills"]
            })
        );
    }
}
