use indexmap::IndexMap;
use serde_json::{Map, Value};

/// Children of a branch node, in declaration order.
pub type Children = IndexMap<String, Node>;

/// Parameter value type tag carried by leaf descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Float,
    Int,
    Bool,
    String,
    Array,
    Choice,
    KeyChoice,
    Constant,
}

impl ParamType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Float => "float",
            Self::Int => "int",
            Self::Bool => "bool",
            Self::String => "string",
            Self::Array => "array",
            Self::Choice => "choice",
            Self::KeyChoice => "keyChoice",
            Self::Constant => "constant",
        }
    }

    /// Parses a type tag. Unknown tags yield `None`; callers keep the raw
    /// string around instead of failing.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "float" => Some(Self::Float),
            "int" => Some(Self::Int),
            "bool" => Some(Self::Bool),
            "string" => Some(Self::String),
            "array" => Some(Self::Array),
            "choice" => Some(Self::Choice),
            "keyChoice" => Some(Self::KeyChoice),
            "constant" => Some(Self::Constant),
            _ => None,
        }
    }
}

/// A leaf descriptor: a default value plus the metadata describing it.
///
/// Fields other than `default` are optional. Metadata keys that the model
/// does not know about are preserved verbatim in `extra`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Leaf {
    pub default: Value,
    pub type_: Option<ParamType>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub units: Option<String>,
    pub choices: Option<Vec<Value>>,
    /// Marker for parameters a user must supply before a run can start.
    /// Presence is what matters; the wrapped value rides through
    /// serialization unchanged.
    pub essential: Option<Value>,
    /// Marker excluding this leaf from default extraction.
    pub ignore: Option<Value>,
    /// Unrecognized metadata, kept in declaration order.
    pub extra: Map<String, Value>,
}

impl Leaf {
    pub fn new(default: Value) -> Self {
        Leaf {
            default,
            ..Default::default()
        }
    }

    pub fn typed(mut self, type_: ParamType) -> Self {
        self.type_ = Some(type_);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    pub fn choices(mut self, choices: Vec<Value>) -> Self {
        self.choices = Some(choices);
        self
    }

    pub fn essential(mut self) -> Self {
        self.essential = Some(Value::Bool(true));
        self
    }

    pub fn ignored(mut self) -> Self {
        self.ignore = Some(Value::Bool(true));
        self
    }

    /// Key-presence test over the descriptor's mapping form, covering both
    /// the modeled fields and `extra`.
    pub fn has_meta(&self, key: &str) -> bool {
        if self.extra.contains_key(key) {
            return true;
        }
        match key {
            "default" => true,
            "type" => self.type_.is_some(),
            "title" => self.title.is_some(),
            "description" => self.description.is_some(),
            "units" => self.units.is_some(),
            "choices" => self.choices.is_some(),
            "essential" => self.essential.is_some(),
            "ignore" => self.ignore.is_some(),
            _ => false,
        }
    }
}

/// A node of a parameter schema tree.
///
/// The kind is decided once, when the tree is built: a mapping carrying a
/// `default` key is a `Leaf`, any other mapping is a `Branch`, and everything
/// else (scalars, arrays, ad hoc pass-through values) is `Raw`. Conversions
/// from JSON never produce a `Raw` holding a mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Leaf(Leaf),
    Branch(Children),
    Raw(Value),
}

impl Node {
    /// Builds a branch from `(key, child)` pairs, keeping their order.
    pub fn branch<K: Into<String>>(entries: Vec<(K, Node)>) -> Node {
        Node::Branch(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Returns the "kind" string identifier for this node.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Leaf(_) => "leaf",
            Self::Branch(_) => "branch",
            Self::Raw(_) => "raw",
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }

    pub fn is_branch(&self) -> bool {
        matches!(self, Self::Branch(_))
    }

    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            Self::Leaf(leaf) => Some(leaf),
            _ => None,
        }
    }

    pub fn as_branch(&self) -> Option<&Children> {
        match self {
            Self::Branch(children) => Some(children),
            _ => None,
        }
    }

    /// Unified key-presence test, the typed equivalent of `key in mapping`
    /// on the node's JSON form.
    pub fn has_key(&self, key: &str) -> bool {
        match self {
            Self::Leaf(leaf) => leaf.has_meta(key),
            Self::Branch(children) => children.contains_key(key),
            Self::Raw(value) => match value.as_object() {
                Some(map) => map.contains_key(key),
                None => false,
            },
        }
    }

    /// Looks up a direct child of a branch.
    pub fn get(&self, key: &str) -> Option<&Node> {
        match self {
            Self::Branch(children) => children.get(key),
            _ => None,
        }
    }

    /// Walks a dot-separated path of branch keys, e.g.
    /// `"runConfigs.GateSweep.gateVoltageMinimum"`.
    pub fn get_path(&self, path: &str) -> Option<&Node> {
        let mut node = self;
        for part in path.split('.') {
            node = node.get(part)?;
        }
        Some(node)
    }
}

impl From<Leaf> for Node {
    fn from(leaf: Leaf) -> Node {
        Node::Leaf(leaf)
    }
}
