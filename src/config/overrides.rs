use serde::Serialize;
use serde_json::Value;

/// Serialize CLI overrides, dropping unset (`null`) values and empty arrays so
/// they do not clobber lower-priority layers.
pub fn filter_unset<T: Serialize>(input: T) -> Value {
    let mut value = serde_json::to_value(input).unwrap_or(Value::Null);
    filter_unset_recursive(&mut value);
    value
}

fn filter_unset_recursive(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, v| match v {
                Value::Null => false,
                Value::Array(arr) => !arr.is_empty(),
                _ => true,
            });

            // Recursively filter nested objects
            for (_, v) in map.iter_mut() {
                filter_unset_recursive(v);
            }
        }
        Value::Array(arr) => {
            for item in arr.iter_mut() {
                filter_unset_recursive(item);
            }
        }
        _ => {}
    }
}
