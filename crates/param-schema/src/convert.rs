//! Conversion between typed nodes and their JSON mapping form.

use labrig_param_tree::DEFAULT_KEY;
use serde_json::{Map, Value};

use crate::node::{Children, Leaf, Node, ParamType};

impl Node {
    /// Classifies a JSON tree into typed nodes, once.
    ///
    /// A mapping carrying a `default` key becomes a [`Leaf`], any other
    /// mapping becomes a [`Node::Branch`], and every non-mapping value
    /// becomes [`Node::Raw`].
    pub fn from_value(value: &Value) -> Node {
        match value.as_object() {
            None => Node::Raw(value.clone()),
            Some(map) if map.contains_key(DEFAULT_KEY) => Node::Leaf(Leaf::from_map(map)),
            Some(map) => {
                let children: Children = map
                    .iter()
                    .map(|(key, child)| (key.clone(), Node::from_value(child)))
                    .collect();
                Node::Branch(children)
            }
        }
    }

    /// Serializes the node back to its JSON mapping form.
    ///
    /// Leaf metadata is emitted in a canonical order (`default`, `type`,
    /// `title`, `description`, `units`, `choices`, `essential`, `ignore`,
    /// then extras), so the result may order keys differently than the JSON
    /// the node was parsed from. Mapping equality is unaffected.
    pub fn to_value(&self) -> Value {
        match self {
            Node::Leaf(leaf) => Value::Object(leaf.to_map()),
            Node::Branch(children) => {
                let mut map = Map::new();
                for (key, child) in children {
                    map.insert(key.clone(), child.to_value());
                }
                Value::Object(map)
            }
            Node::Raw(value) => value.clone(),
        }
    }
}

impl Leaf {
    /// Reads a descriptor out of its mapping form.
    ///
    /// Known metadata keys land in the modeled fields when their value has
    /// the expected shape; anything else (unknown keys, a non-string title, a
    /// type tag the model does not know) is preserved in `extra` verbatim.
    pub fn from_map(map: &Map<String, Value>) -> Leaf {
        let mut leaf = Leaf::new(Value::Null);
        for (key, value) in map {
            match key.as_str() {
                DEFAULT_KEY => leaf.default = value.clone(),
                "type" => match value.as_str().and_then(ParamType::parse) {
                    Some(type_) => leaf.type_ = Some(type_),
                    None => {
                        leaf.extra.insert(key.clone(), value.clone());
                    }
                },
                "title" => match value.as_str() {
                    Some(title) => leaf.title = Some(title.to_string()),
                    None => {
                        leaf.extra.insert(key.clone(), value.clone());
                    }
                },
                "description" => match value.as_str() {
                    Some(description) => leaf.description = Some(description.to_string()),
                    None => {
                        leaf.extra.insert(key.clone(), value.clone());
                    }
                },
                "units" => match value.as_str() {
                    Some(units) => leaf.units = Some(units.to_string()),
                    None => {
                        leaf.extra.insert(key.clone(), value.clone());
                    }
                },
                "choices" => match value.as_array() {
                    Some(choices) => leaf.choices = Some(choices.clone()),
                    None => {
                        leaf.extra.insert(key.clone(), value.clone());
                    }
                },
                "essential" => leaf.essential = Some(value.clone()),
                "ignore" => leaf.ignore = Some(value.clone()),
                _ => {
                    leaf.extra.insert(key.clone(), value.clone());
                }
            }
        }
        leaf
    }

    /// Writes the descriptor back to its mapping form, in canonical key
    /// order.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert(DEFAULT_KEY.to_string(), self.default.clone());
        if let Some(type_) = self.type_ {
            map.insert("type".to_string(), Value::String(type_.as_str().to_string()));
        }
        if let Some(title) = &self.title {
            map.insert("title".to_string(), Value::String(title.clone()));
        }
        if let Some(description) = &self.description {
            map.insert("description".to_string(), Value::String(description.clone()));
        }
        if let Some(units) = &self.units {
            map.insert("units".to_string(), Value::String(units.clone()));
        }
        if let Some(choices) = &self.choices {
            map.insert("choices".to_string(), Value::Array(choices.clone()));
        }
        if let Some(essential) = &self.essential {
            map.insert("essential".to_string(), essential.clone());
        }
        if let Some(ignore) = &self.ignore {
            map.insert("ignore".to_string(), ignore.clone());
        }
        for (key, value) in &self.extra {
            map.insert(key.clone(), value.clone());
        }
        map
    }
}
