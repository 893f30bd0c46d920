use serde_json::Value;

use crate::registry::{RegisteredModel, Registry};

/// Renames engine row keys to their exposed names, recursing into related
/// objects and arrays. Primitives and nulls pass through unchanged, as do
/// keys the registry does not know about.
pub fn map_output(registry: &Registry, model: &RegisteredModel, value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| map_output(registry, model, item))
                .collect(),
        ),
        Value::Object(map) => {
            let mut output = serde_json::Map::with_capacity(map.len());
            for (key, value) in map {
                match model.field_by_underlying(&key) {
                    Some(field) => {
                        let destination =
                            registry.model_by_type(field.type_of()).unwrap_or(model);
                        output.insert(
                            field.exposed_name().to_string(),
                            map_output(registry, destination, value),
                        );
                    }
                    None => {
                        output.insert(key, value);
                    }
                }
            }
            Value::Object(output)
        }
        other => other,
    }
}
