//! Owned, serializable descriptions of subtrees.

use serde::Serialize;

use crate::node::{NodeKind, NodeType};
use crate::{DomTree, NodeId};

/// A detached copy of a subtree's content: kind, name, value, attributes and
/// children. Node identity and listeners are not part of a snapshot, so two
/// structurally equal subtrees produce equal snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeSnapshot {
    /// The node kind.
    pub kind: NodeKind,
    /// The `nodeName`.
    pub name: String,
    /// The `nodeValue`, for text and comments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Attributes as (qualified name, value), in list order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<(String, String)>,
    /// Child snapshots, in order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSnapshot>,
}

impl DomTree {
    /// Snapshot the subtree rooted at `node`.
    #[must_use]
    pub fn snapshot(&self, node: NodeId) -> Option<NodeSnapshot> {
        let entry = self.get(node)?;
        let attributes = match entry.node_type() {
            NodeType::Element(data) => data
                .attrs()
                .iter()
                .map(|attr| (attr.qualified_name(), attr.value().to_string()))
                .collect(),
            _ => Vec::new(),
        };
        Some(NodeSnapshot {
            kind: entry.kind(),
            name: self.node_name(node)?,
            value: self.node_value(node).map(str::to_string),
            attributes,
            children: self
                .children(node)
                .filter_map(|child| self.snapshot(child))
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_serializes_compactly() {
        let mut tree = DomTree::new();
        let p = tree.create_element(NodeId::ROOT, "p").unwrap();
        tree.set_attribute(p, "class", "intro").unwrap();
        let text = tree.create_text_node(NodeId::ROOT, "hi").unwrap();
        let _ = tree.append_child(p, text).unwrap();

        let json = serde_json::to_string(&tree.snapshot(p).unwrap()).unwrap();
        assert_eq!(
            json,
            r##"{"kind":"Element","name":"P","attributes":[["class","intro"]],"children":[{"kind":"Text","name":"#text","value":"hi"}]}"##
        );
    }
}
