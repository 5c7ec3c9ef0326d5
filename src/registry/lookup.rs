// Dotted-path lookup into nested mappings
//
// `crawl("a.b.c", root)` => root["a"]["b"]["c"]

use serde_json::Value as JsonValue;
use serde_yaml::Value as YamlValue;

use super::Node;

/// A node in a nested mapping structure that can be walked by name
pub trait PathNode {
    /// The named child, or `None` if missing or this node is not a mapping
    fn child(&self, key: &str) -> Option<&Self>;

    /// The member to use when a path ends at this node
    fn default_member(&self) -> Option<&Self> {
        None
    }
}

impl PathNode for Node {
    fn child(&self, key: &str) -> Option<&Self> {
        match self {
            Node::Group(group) => group.get(key),
            Node::Task(_) => None,
        }
    }

    fn default_member(&self) -> Option<&Self> {
        match self {
            Node::Group(group) => group.default.as_deref().and_then(|name| group.get(name)),
            Node::Task(_) => None,
        }
    }
}

impl PathNode for JsonValue {
    fn child(&self, key: &str) -> Option<&Self> {
        self.as_object()?.get(key)
    }
}

impl PathNode for YamlValue {
    fn child(&self, key: &str) -> Option<&Self> {
        self.as_mapping()?.get(key)
    }
}

/// Resolve a dotted name against `root`.
///
/// Missing keys and attempts to descend into a non-mapping both yield `None`.
/// When the path ends at a node with a default member, the member is returned.
pub fn crawl<'a, N: PathNode>(name: &str, root: &'a N) -> Option<&'a N> {
    let result = crawl_path(name, root)?;
    Some(result.default_member().unwrap_or(result))
}

fn crawl_path<'a, N: PathNode>(name: &str, mapping: &'a N) -> Option<&'a N> {
    let (key, rest) = name.split_once('.').unwrap_or((name, ""));
    let value = mapping.child(key)?;
    if rest.is_empty() {
        return Some(value);
    }
    crawl_path(rest, value)
}
