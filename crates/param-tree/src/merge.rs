use serde_json::Value;

/// Deep-merges an override tree into a target tree, returning the merged tree.
///
/// Merge semantics:
/// - Objects are merged key by key, recursing into entries present on both
///   sides. Keys only present in the target are kept; keys only present in
///   the override are appended.
/// - Arrays are replaced wholesale (no element-wise merge).
/// - Scalars (including `null`) are replaced; the override always wins.
///
/// Key order of the target is preserved; new keys keep the order they have in
/// the override.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use labrig_param_tree::merge;
///
/// let base = json!({"GateSweep": {"gateVoltageMinimum": -1.0, "pointsPerVGS": 1}});
/// let user = json!({"GateSweep": {"gateVoltageMinimum": -0.5}});
///
/// let merged = merge(base, user);
/// assert_eq!(
///     merged,
///     json!({"GateSweep": {"gateVoltageMinimum": -0.5, "pointsPerVGS": 1}})
/// );
/// ```
pub fn merge(target: Value, overrides: Value) -> Value {
    match (target, overrides) {
        (Value::Object(mut target_map), Value::Object(override_map)) => {
            for (key, override_value) in override_map {
                match target_map.get_mut(&key) {
                    Some(existing) => {
                        let current = existing.take();
                        *existing = merge(current, override_value);
                    }
                    None => {
                        target_map.insert(key, override_value);
                    }
                }
            }
            Value::Object(target_map)
        }
        // Anything that is not an object-into-object merge is a full replace.
        (_, overrides) => overrides,
    }
}

/// Merges a stack of override layers, lowest precedence first.
///
/// Each layer is deep-merged over the accumulated result, so later layers win
/// on conflicts. An empty stack yields `null`.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use labrig_param_tree::merge_layers;
///
/// let resolved = merge_layers(vec![
///     json!({"NPLC": 1.0, "system": "B2912A"}),
///     json!({"NPLC": 0.1}),
/// ]);
/// assert_eq!(resolved, json!({"NPLC": 0.1, "system": "B2912A"}));
/// ```
pub fn merge_layers(layers: Vec<Value>) -> Value {
    layers.into_iter().fold(Value::Null, merge)
}
