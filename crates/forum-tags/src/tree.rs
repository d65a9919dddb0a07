//! Source name tree for the taxonomy.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A nested mapping from tag name to its children, in declaration order.
///
/// Sibling order is meaningful: it decides interval layout. The JSON form is a
/// plain nested object, e.g. `{"Programming": {"Web": {}, "Systems": {"Rust": {}}}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NameTree {
    children: IndexMap<String, NameTree>,
}

impl NameTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the nested JSON object form.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize back to the nested JSON object form.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Append a child (or return the existing one with that name).
    pub fn child(&mut self, name: &str) -> &mut NameTree {
        self.children.entry(name.to_string()).or_default()
    }

    /// Builder-style append, for literals in tests and seeds.
    pub fn with(mut self, name: &str, subtree: NameTree) -> Self {
        self.children.insert(name.to_string(), subtree);
        self
    }

    /// Direct children in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &NameTree)> {
        self.children.iter().map(|(name, tree)| (name.as_str(), tree))
    }

    /// Number of direct children.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Whether the tree has no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Total number of names at every depth.
    pub fn node_count(&self) -> usize {
        self.children
            .values()
            .map(|child| 1 + child.node_count())
            .sum()
    }
}
