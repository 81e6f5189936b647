//! Tree operations over typed schema nodes.
//!
//! Each operation takes the receiver by reference and returns a new tree.
//! Branches dispatch on the node kind decided at construction time; raw
//! mapping payloads (only possible in hand-built trees) fall back to the
//! untyped functions so both layers resolve identically.

use labrig_param_tree as param_tree;
use labrig_param_tree::{DEFAULT_KEY, IGNORE_KEY};
use serde_json::{Map, Value};

use crate::node::{Children, Node};

impl Node {
    /// Reduces the schema to a plain tree of default values.
    ///
    /// Children carrying an `ignore` key are omitted. The marker is tested
    /// for presence only, never for truthiness.
    pub fn defaults(&self) -> Value {
        match self {
            Node::Leaf(leaf) => leaf.default.clone(),
            Node::Branch(children) => {
                let mut extracted = Map::new();
                for (key, child) in children {
                    if child.has_key(IGNORE_KEY) {
                        continue;
                    }
                    extracted.insert(key.clone(), child.defaults());
                }
                Value::Object(extracted)
            }
            Node::Raw(value) => match value.as_object() {
                Some(_) => param_tree::extract_defaults(value),
                None => value.clone(),
            },
        }
    }

    /// Merges a tree of override values into the schema, writing each
    /// override through to the matching descriptor's default and leaving all
    /// other metadata untouched.
    ///
    /// Overrides addressed at a branch (or at a descriptor without a default
    /// in its raw form) are swallowed silently; overrides for keys the schema
    /// does not know are inserted as classified nodes.
    pub fn merge_overrides(&self, overrides: &Value) -> Node {
        let override_map = match overrides.as_object() {
            Some(map) => map,
            None => return self.clone(),
        };
        match self {
            Node::Branch(children) => {
                let mut merged = children.clone();
                for (key, override_value) in override_map {
                    match merged.get_mut(key) {
                        Some(child) => {
                            *child = child.merged_child(override_value);
                        }
                        None => {
                            merged.insert(key.clone(), Node::from_value(override_value));
                        }
                    }
                }
                Node::Branch(merged)
            }
            // A leaf receiver is walked as a plain mapping, so an override
            // tree can address individual metadata fields.
            other => Node::from_value(&param_tree::merge_defaults(
                other.to_value(),
                overrides.clone(),
            )),
        }
    }

    fn merged_child(&self, override_value: &Value) -> Node {
        if !self.is_mapping() {
            return Node::from_value(override_value);
        }
        if override_value.is_object() {
            return self.merge_overrides(override_value);
        }
        self.with_default_written(override_value)
    }

    /// Rebuilds a schema tree for exactly the keys present in `values`,
    /// substituting each supplied value as the new default while keeping the
    /// descriptor metadata. Values without a schema counterpart pass through
    /// as classified nodes.
    pub fn hydrate(&self, values: &Value) -> Node {
        match self {
            Node::Branch(children) => {
                let value_map = match values.as_object() {
                    Some(map) => map,
                    None => return Node::from_value(values),
                };
                let mut reduced = Children::new();
                for (key, value) in value_map {
                    let hydrated = match children.get(key) {
                        Some(child) => child.hydrated_child(value),
                        None => Node::from_value(value),
                    };
                    reduced.insert(key.clone(), hydrated);
                }
                Node::Branch(reduced)
            }
            other => Node::from_value(&param_tree::intersection_defaults(
                values,
                &other.to_value(),
            )),
        }
    }

    fn hydrated_child(&self, value: &Value) -> Node {
        if !self.is_mapping() {
            return Node::from_value(value);
        }
        if value.is_object() {
            return self.hydrate(value);
        }
        self.with_default_written(value)
    }

    /// Filters the schema down to the subtrees that carry `keyword`.
    ///
    /// Nodes holding the keyword directly are included wholesale; branches
    /// with a marked descendant are recursed into; everything else is
    /// omitted. Leaf metadata is treated as opaque, so a keyword buried
    /// inside a metadata value does not count as a descendant mark.
    pub fn filter_marked(&self, keyword: &str) -> Node {
        let mut reduced = Children::new();
        if let Node::Branch(children) = self {
            for (key, child) in children {
                if child.has_key(keyword) {
                    reduced.insert(key.clone(), child.clone());
                } else if child.eventually_includes(keyword) {
                    let filtered = match child {
                        Node::Raw(value) => {
                            Node::from_value(&param_tree::must_include(value, keyword))
                        }
                        _ => child.filter_marked(keyword),
                    };
                    reduced.insert(key.clone(), filtered);
                }
            }
        }
        Node::Branch(reduced)
    }

    /// True when the node carries `keyword` as a key, directly or on some
    /// descendant node.
    pub fn eventually_includes(&self, keyword: &str) -> bool {
        match self {
            Node::Leaf(leaf) => leaf.has_meta(keyword),
            Node::Branch(children) => {
                children.contains_key(keyword)
                    || children.values().any(|child| child.eventually_includes(keyword))
            }
            Node::Raw(value) => param_tree::eventually_includes(value, keyword),
        }
    }

    /// Dot-paths of every leaf descriptor in the tree, in declaration order.
    /// A leaf at the root contributes a single empty path.
    pub fn leaf_paths(&self) -> Vec<String> {
        fn walk(node: &Node, prefix: &str, paths: &mut Vec<String>) {
            match node {
                Node::Leaf(_) => paths.push(prefix.to_string()),
                Node::Branch(children) => {
                    for (key, child) in children {
                        let path = if prefix.is_empty() {
                            key.clone()
                        } else {
                            format!("{}.{}", prefix, key)
                        };
                        walk(child, &path, paths);
                    }
                }
                Node::Raw(_) => {}
            }
        }
        let mut paths = Vec::new();
        walk(self, "", &mut paths);
        paths
    }

    /// Leaves and branches are mappings in JSON form; raw nodes only when
    /// their payload is an object.
    fn is_mapping(&self) -> bool {
        match self {
            Node::Leaf(_) | Node::Branch(_) => true,
            Node::Raw(value) => value.is_object(),
        }
    }

    /// Writes `value` through as the node's default. Branches have no
    /// default field and come back unchanged, as do raw mappings without a
    /// `default` key.
    fn with_default_written(&self, value: &Value) -> Node {
        match self {
            Node::Leaf(leaf) => {
                let mut leaf = leaf.clone();
                leaf.default = value.clone();
                Node::Leaf(leaf)
            }
            Node::Branch(_) => self.clone(),
            Node::Raw(raw) => match raw.as_object() {
                Some(map) if map.contains_key(DEFAULT_KEY) => {
                    let mut map = map.clone();
                    map.insert(DEFAULT_KEY.to_string(), value.clone());
                    Node::Raw(Value::Object(map))
                }
                _ => self.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Leaf, ParamType};
    use serde_json::json;

    fn gate_sweep() -> Node {
        Node::from_value(&json!({
            "runConfigs": {
                "GateSweep": {
                    "dependencies": {"ignore": true, "value": []},
                    "gateVoltageMinimum": {"type": "float", "default": -1, "units": "V", "essential": true},
                    "fastSweepSpeed": {"type": "int", "default": 1000, "units": "Hz"}
                }
            }
        }))
    }

    #[test]
    fn test_defaults_skip_ignored_children() {
        assert_eq!(
            gate_sweep().defaults(),
            json!({
                "runConfigs": {
                    "GateSweep": {"gateVoltageMinimum": -1, "fastSweepSpeed": 1000}
                }
            })
        );
    }

    #[test]
    fn test_defaults_ignore_presence_not_truth() {
        let schema = Node::branch(vec![
            ("visible", Node::from(Leaf::new(json!(1)))),
            ("hidden", {
                let mut leaf = Leaf::new(json!(2));
                leaf.ignore = Some(json!(false));
                Node::from(leaf)
            }),
        ]);
        assert_eq!(schema.defaults(), json!({"visible": 1}));
    }

    #[test]
    fn test_merge_overrides_writes_through() {
        let merged = gate_sweep().merge_overrides(&json!({
            "runConfigs": {"GateSweep": {"gateVoltageMinimum": -0.5}}
        }));
        let leaf = merged
            .get_path("runConfigs.GateSweep.gateVoltageMinimum")
            .and_then(Node::as_leaf)
            .unwrap();
        assert_eq!(leaf.default, json!(-0.5));
        assert_eq!(leaf.units.as_deref(), Some("V"));
        assert!(leaf.essential.is_some());
        // Untouched siblings are carried over whole.
        assert_eq!(
            merged.get_path("runConfigs.GateSweep.fastSweepSpeed"),
            gate_sweep().get_path("runConfigs.GateSweep.fastSweepSpeed")
        );
    }

    #[test]
    fn test_merge_overrides_swallows_branch_target() {
        let schema = gate_sweep();
        let merged = schema.merge_overrides(&json!({"runConfigs": 5}));
        assert_eq!(merged, schema);
    }

    #[test]
    fn test_merge_overrides_inserts_unknown_keys() {
        let merged = gate_sweep().merge_overrides(&json!({"scheduleIndex": 2}));
        assert_eq!(merged.get("scheduleIndex"), Some(&Node::Raw(json!(2))));
    }

    #[test]
    fn test_merge_overrides_into_leaf_metadata() {
        let schema = Node::branch(vec![(
            "NPLC",
            Node::from(Leaf::new(json!(1.0)).typed(ParamType::Float)),
        )]);
        // An object-shaped override walks into the descriptor itself.
        let merged = schema.merge_overrides(&json!({"NPLC": {"default": 0.1}}));
        let leaf = merged.get("NPLC").and_then(Node::as_leaf).unwrap();
        assert_eq!(leaf.default, json!(0.1));
        assert_eq!(leaf.type_, Some(ParamType::Float));
    }

    #[test]
    fn test_merge_overrides_replaces_raw_child() {
        let schema = Node::branch(vec![("note", Node::Raw(json!("old")))]);
        let merged = schema.merge_overrides(&json!({"note": {"default": 1}}));
        assert_eq!(merged.get("note").map(Node::kind), Some("leaf"));
    }

    #[test]
    fn test_hydrate_substitutes_defaults() {
        let hydrated = gate_sweep().hydrate(&json!({
            "runConfigs": {"GateSweep": {"gateVoltageMinimum": -0.2}}
        }));
        let leaf = hydrated
            .get_path("runConfigs.GateSweep.gateVoltageMinimum")
            .and_then(Node::as_leaf)
            .unwrap();
        assert_eq!(leaf.default, json!(-0.2));
        assert_eq!(leaf.units.as_deref(), Some("V"));
        // Keys absent from the value tree are dropped.
        assert!(hydrated
            .get_path("runConfigs.GateSweep.fastSweepSpeed")
            .is_none());
    }

    #[test]
    fn test_hydrate_passes_unknown_values_through() {
        let hydrated = gate_sweep().hydrate(&json!({"operatorNote": "second pass"}));
        assert_eq!(
            hydrated.get("operatorNote"),
            Some(&Node::Raw(json!("second pass")))
        );
    }

    #[test]
    fn test_hydrate_value_against_branch_copies_branch() {
        let schema = Node::branch(vec![(
            "Identifiers",
            Node::branch(vec![("user", Node::from(Leaf::new(json!(""))))]),
        )]);
        let hydrated = schema.hydrate(&json!({"Identifiers": 3}));
        assert_eq!(hydrated.get("Identifiers"), schema.get("Identifiers"));
    }

    #[test]
    fn test_filter_marked_end_to_end() {
        let filtered = gate_sweep().filter_marked("essential");
        assert_eq!(
            filtered.to_value(),
            json!({
                "runConfigs": {
                    "GateSweep": {
                        "gateVoltageMinimum": {"default": -1, "type": "float", "units": "V", "essential": true}
                    }
                }
            })
        );
    }

    #[test]
    fn test_filter_marked_no_match_is_empty_branch() {
        let filtered = gate_sweep().filter_marked("invisible");
        assert_eq!(filtered, Node::Branch(Children::new()));
    }

    #[test]
    fn test_filter_marked_direct_hit_kept_wholesale() {
        let schema = Node::from_value(&json!({
            "dependencies": {"ignore": true, "value": ["GateSweep"]},
            "speed": {"default": 1000}
        }));
        let filtered = schema.filter_marked("ignore");
        assert_eq!(
            filtered.to_value(),
            json!({"dependencies": {"ignore": true, "value": ["GateSweep"]}})
        );
    }

    #[test]
    fn test_eventually_includes() {
        let schema = gate_sweep();
        assert!(schema.eventually_includes("essential"));
        assert!(schema.eventually_includes("dependencies"));
        assert!(!schema.eventually_includes("calibration"));
        // Leaf metadata is opaque; markers are seen, interior values are not.
        let leaf = Node::from_value(&json!({"default": {"essential": true}}));
        assert!(!leaf.eventually_includes("essential"));
    }

    #[test]
    fn test_leaf_paths() {
        assert_eq!(
            gate_sweep().leaf_paths(),
            vec![
                "runConfigs.GateSweep.gateVoltageMinimum".to_string(),
                "runConfigs.GateSweep.fastSweepSpeed".to_string(),
            ]
        );
    }
}
