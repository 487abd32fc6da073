//! Configuration merge logic
//!
//! - Objects: deep-merge by key
//! - Arrays: REPLACE (last wins)
//! - Scalars: override (last wins)

use serde_json::Value;

/// Deep merge two JSON values.
///
/// Null in the overlay overrides too.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (_, overlay) => overlay,
    }
}

/// Merge config layers in order (first is base, last has highest precedence)
pub fn merge_layers(layers: Vec<Value>) -> Value {
    layers.into_iter().fold(Value::Null, deep_merge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_override() {
        let result = deep_merge(json!({"prefix": "version"}), json!({"prefix": "ver"}));
        assert_eq!(result["prefix"], "ver");
    }

    #[test]
    fn test_properties_merge_by_key() {
        let base = json!({
            "properties": {
                "version:junit:junit": "4.8.1",
                "version:org.foo:bar": "1.0"
            }
        });
        let overlay = json!({
            "properties": {
                "version:junit:junit": "4.10"
            }
        });
        let result = deep_merge(base, overlay);

        assert_eq!(result["properties"]["version:junit:junit"], "4.10");
        assert_eq!(result["properties"]["version:org.foo:bar"], "1.0");
    }

    #[test]
    fn test_array_replace() {
        let result = deep_merge(json!({"files": ["a", "b"]}), json!({"files": ["c"]}));
        assert_eq!(result["files"], json!(["c"]));
    }

    #[test]
    fn test_null_override() {
        let result = deep_merge(json!({"separator": ":"}), json!({"separator": null}));
        assert!(result["separator"].is_null());
    }

    #[test]
    fn test_merge_layers() {
        let builtin = json!({"prefix": "version", "inject_missing": true});
        let host = json!({"inject_missing": false});
        let repo = json!({"prefix": "pin"});
        let cli = json!({"inject_missing": true});

        let result = merge_layers(vec![builtin, host, repo, cli]);

        assert_eq!(result["prefix"], "pin");
        assert_eq!(result["inject_missing"], true);
    }
}
