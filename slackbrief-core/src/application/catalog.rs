//! Maps MCP tool descriptors to the function-calling shape models expect.

use super::tooling::ToolDescriptor;
use crate::types::FunctionSpec;
use serde_json::{Value, json};

/// Adapt a fetched catalog, preserving length and order.
pub fn to_function_specs(tools: &[ToolDescriptor]) -> Vec<FunctionSpec> {
    tools.iter().map(to_function_spec).collect()
}

pub fn to_function_spec(tool: &ToolDescriptor) -> FunctionSpec {
    FunctionSpec {
        name: tool.name.clone(),
        description: tool.description.clone().unwrap_or_default(),
        parameters: tool.input_schema.clone().unwrap_or_else(empty_object_schema),
    }
}

// Providers reject a function without a parameter schema.
fn empty_object_schema() -> Value {
    json!({ "type": "object", "properties": {} })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(name: &str, description: Option<&str>, schema: Option<Value>) -> ToolDescriptor {
        ToolDescriptor {
            name: name.into(),
            description: description.map(str::to_string),
            input_schema: schema,
        }
    }

    #[test]
    fn preserves_order_names_descriptions_and_schemas() {
        let schema = json!({
            "type": "object",
            "properties": {"state": {"type": "string"}},
            "required": ["state"]
        });
        let tools = vec![
            descriptor("get_alerts", Some("Get weather alerts"), Some(schema.clone())),
            descriptor("slack_list_channels", Some("List channels"), None),
        ];

        let specs = to_function_specs(&tools);

        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].name, "get_alerts");
        assert_eq!(specs[0].description, "Get weather alerts");
        assert_eq!(specs[0].parameters, schema);
        assert_eq!(specs[1].name, "slack_list_channels");
    }

    #[test]
    fn fills_missing_description_and_schema() {
        let spec = to_function_spec(&descriptor("bare", None, None));
        assert_eq!(spec.description, "");
        assert_eq!(spec.parameters, json!({"type": "object", "properties": {}}));
    }

    #[test]
    fn empty_catalog_maps_to_empty() {
        assert!(to_function_specs(&[]).is_empty());
    }
}
