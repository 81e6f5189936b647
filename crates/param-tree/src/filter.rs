use serde_json::{Map, Value};

/// Returns `true` when the node is an object that carries `keyword` as a key,
/// directly or anywhere inside a nested object.
///
/// Non-objects never include anything. Arrays are not descended into; the
/// marker lives on mapping nodes only.
pub fn eventually_includes(node: &Value, keyword: &str) -> bool {
    let map = match node.as_object() {
        Some(map) => map,
        None => return false,
    };
    if map.contains_key(keyword) {
        return true;
    }
    map.values().any(|child| eventually_includes(child, keyword))
}

/// Filters a schema down to the subtrees that carry `keyword`.
///
/// For each child of `schema`:
/// - A child object holding `keyword` directly is included wholesale, without
///   filtering its interior.
/// - A child object holding `keyword` somewhere deeper is recursed into, so
///   only its marked descendants survive.
/// - Everything else is omitted.
///
/// The result is always an object; filtering a non-object yields an empty one.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use labrig_param_tree::must_include;
///
/// let schema = json!({
///     "gateVoltageMinimum": {"type": "float", "default": -1.0, "essential": true},
///     "stepsInVGSPerDirection": {"type": "int", "default": 100}
/// });
///
/// assert_eq!(
///     must_include(&schema, "essential"),
///     json!({"gateVoltageMinimum": {"type": "float", "default": -1.0, "essential": true}})
/// );
/// ```
pub fn must_include(schema: &Value, keyword: &str) -> Value {
    let mut reduced = Map::new();
    let map = match schema.as_object() {
        Some(map) => map,
        None => return Value::Object(reduced),
    };
    for (key, child) in map {
        let child_map = match child.as_object() {
            Some(child_map) => child_map,
            None => continue,
        };
        if child_map.contains_key(keyword) {
            reduced.insert(key.clone(), child.clone());
        } else if eventually_includes(child, keyword) {
            reduced.insert(key.clone(), must_include(child, keyword));
        }
    }
    Value::Object(reduced)
}
