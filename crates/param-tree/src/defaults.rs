use serde_json::{Map, Value};

/// Key whose presence marks an object as a leaf descriptor.
pub const DEFAULT_KEY: &str = "default";

/// Key whose presence on a child excludes that subtree from extraction.
pub const IGNORE_KEY: &str = "ignore";

/// Reduces a parameter schema to a plain tree of default values.
///
/// Walks the tree recursively:
/// - A non-object is returned unchanged.
/// - An object with a `default` key is a leaf descriptor; only its default
///   value survives, all metadata is dropped.
/// - Any other object is a branch. Children that are themselves objects with
///   an `ignore` key are omitted; everything else recurses.
///
/// The `ignore` test looks at key presence only. `"ignore": false` excludes a
/// child exactly like `"ignore": true` does.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use labrig_param_tree::extract_defaults;
///
/// let schema = json!({
///     "GateSweep": {
///         "dependencies": {"ignore": true, "value": []},
///         "gateVoltageMinimum": {"type": "float", "default": -1.0, "units": "V"},
///         "pointsPerVGS": {"type": "int", "default": 1}
///     }
/// });
///
/// assert_eq!(
///     extract_defaults(&schema),
///     json!({"GateSweep": {"gateVoltageMinimum": -1.0, "pointsPerVGS": 1}})
/// );
/// ```
pub fn extract_defaults(node: &Value) -> Value {
    let map = match node.as_object() {
        Some(map) => map,
        None => return node.clone(),
    };
    if let Some(default) = map.get(DEFAULT_KEY) {
        return default.clone();
    }
    let mut extracted = Map::new();
    for (key, child) in map {
        let excluded = match child.as_object() {
            Some(child_map) => child_map.contains_key(IGNORE_KEY),
            None => false,
        };
        if excluded {
            continue;
        }
        extracted.insert(key.clone(), extract_defaults(child));
    }
    Value::Object(extracted)
}

/// Merges a tree of override values into a parameter schema, writing each
/// override through to the matching leaf descriptor's `default` field.
///
/// For every `(key, overrideValue)` entry of `overrides`:
/// - If the schema holds an object at `key` and the override is an object
///   too, the merge recurses.
/// - If the schema holds an object at `key` and the override is not, the
///   override replaces the object's `default` field when it has one. A
///   descriptor without a `default` swallows the override silently, leaving
///   the schema entry untouched.
/// - Otherwise the override value is stored at `key` verbatim, replacing any
///   non-object value already there.
///
/// Descriptor metadata (`type`, `units`, `essential`, ...) is never modified.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use labrig_param_tree::merge_defaults;
///
/// let schema = json!({
///     "pointsPerVGS": {"type": "int", "default": 1, "units": "#"}
/// });
/// let merged = merge_defaults(schema, json!({"pointsPerVGS": 3}));
///
/// assert_eq!(
///     merged,
///     json!({"pointsPerVGS": {"type": "int", "default": 3, "units": "#"}})
/// );
/// ```
pub fn merge_defaults(schema: Value, overrides: Value) -> Value {
    let (mut schema_map, override_map) = match (schema, overrides) {
        (Value::Object(schema_map), Value::Object(override_map)) => (schema_map, override_map),
        (schema, _) => return schema,
    };
    for (key, override_value) in override_map {
        match schema_map.get_mut(&key) {
            Some(existing) if existing.is_object() => {
                if override_value.is_object() {
                    let current = existing.take();
                    *existing = merge_defaults(current, override_value);
                } else if let Some(descriptor) = existing.as_object_mut() {
                    if descriptor.contains_key(DEFAULT_KEY) {
                        descriptor.insert(DEFAULT_KEY.to_string(), override_value);
                    }
                }
            }
            Some(existing) => {
                *existing = override_value;
            }
            None => {
                schema_map.insert(key, override_value);
            }
        }
    }
    Value::Object(schema_map)
}

/// Rebuilds a schema subtree for exactly the keys present in a value tree.
///
/// Iterates the keys of `values` (not of `schema`):
/// - If both sides hold an object at a key, the intersection recurses.
/// - If only the schema side holds an object, that descriptor is copied into
///   the result and, when it has a `default` field, the supplied value is
///   written in as the new default. Metadata comes along unchanged.
/// - Otherwise the supplied value passes through verbatim.
///
/// Schema entries whose keys do not appear in `values` are dropped, so the
/// result is shaped by the value tree while carrying the schema's metadata.
/// Every descriptor in the result is a fresh copy; the input schema is never
/// aliased or modified.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use labrig_param_tree::intersection_defaults;
///
/// let schema = json!({
///     "gateVoltageMinimum": {"type": "float", "default": -1.0, "units": "V"},
///     "gateVoltageMaximum": {"type": "float", "default": 1.0, "units": "V"}
/// });
/// let values = json!({"gateVoltageMinimum": -0.2});
///
/// assert_eq!(
///     intersection_defaults(&values, &schema),
///     json!({"gateVoltageMinimum": {"type": "float", "default": -0.2, "units": "V"}})
/// );
/// ```
pub fn intersection_defaults(values: &Value, schema: &Value) -> Value {
    let (value_map, schema_map) = match (values.as_object(), schema.as_object()) {
        (Some(value_map), Some(schema_map)) => (value_map, schema_map),
        _ => return values.clone(),
    };
    let mut reduced = Map::new();
    for (key, value) in value_map {
        match schema_map.get(key) {
            Some(schema_child @ Value::Object(_)) if value.is_object() => {
                reduced.insert(key.clone(), intersection_defaults(value, schema_child));
            }
            Some(Value::Object(descriptor)) => {
                let mut descriptor = descriptor.clone();
                if descriptor.contains_key(DEFAULT_KEY) {
                    descriptor.insert(DEFAULT_KEY.to_string(), value.clone());
                }
                reduced.insert(key.clone(), Value::Object(descriptor));
            }
            _ => {
                reduced.insert(key.clone(), value.clone());
            }
        }
    }
    Value::Object(reduced)
}
