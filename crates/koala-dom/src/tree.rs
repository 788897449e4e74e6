//! Arena storage, read accessors, and tree iterators.
//!
//! [§ 4 Nodes](https://dom.spec.whatwg.org/#nodes)

use std::collections::HashMap;
use std::ops::Index;

use crate::element::ElementData;
use crate::error::{DomError, DomResult, ListenerError};
use crate::mutation::Observers;
use crate::node::{DocumentData, DocumentKind, Node, NodeKind, NodeType};
use crate::NodeId;

/// Tree-wide behavior switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomOptions {
    /// Fire the legacy `DOMNodeInserted`/`DOMNodeRemoved`/`DOMSubtreeModified`/
    /// `DOMAttrModified`/`DOMCharacterDataModified` events after mutations.
    pub mutation_events: bool,
}

impl Default for DomOptions {
    fn default() -> Self {
        Self {
            mutation_events: true,
        }
    }
}

/// Arena-based DOM tree with O(1) node access and traversal.
///
/// [§ 4 Nodes](https://dom.spec.whatwg.org/#nodes)
///
/// "The DOM represents a document as a tree. A tree is a finite hierarchical
/// tree structure."
///
/// This structure stores all nodes in a contiguous vector, using indices
/// for all relationships. This provides:
/// - O(1) access to any node by NodeId
/// - O(1) parent/sibling traversal
/// - No borrowing issues (indices instead of references)
///
/// The arena may hold several documents and any number of detached
/// subtrees. Released slots are left empty, so a stale [`NodeId`] reports
/// [`DomError::NoSuchNode`] instead of aliasing a newer node.
#[derive(Debug)]
pub struct DomTree {
    /// All nodes, indexed by NodeId. The initial Document is always at
    /// index 0 (NodeId::ROOT).
    nodes: Vec<Option<Node>>,
    /// Number of occupied slots.
    live: usize,
    options: DomOptions,
    pub(crate) observers: Observers,
    /// Registered listener count per event type, across every node.
    pub(crate) listener_types: HashMap<String, usize>,
    /// Listener failures raised by internally fired mutation events.
    pub(crate) deferred_errors: Vec<ListenerError>,
}

impl DomTree {
    /// Create a new DOM tree with just the (HTML) Document node.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(DomOptions::default())
    }

    /// Create a new DOM tree with the given options.
    #[must_use]
    pub fn with_options(options: DomOptions) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            live: 0,
            options,
            observers: Observers::default(),
            listener_types: HashMap::new(),
            deferred_errors: Vec::new(),
        };
        let _ = tree.alloc(
            NodeType::Document(DocumentData {
                kind: DocumentKind::Html,
            }),
            None,
        );
        tree
    }

    /// The options this tree was created with.
    #[must_use]
    pub const fn options(&self) -> &DomOptions {
        &self.options
    }

    /// Get the root document node ID.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by its ID.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Get a node or fail with `NoSuchNode`.
    pub(crate) fn node(&self, id: NodeId) -> DomResult<&Node> {
        self.get(id).ok_or(DomError::NoSuchNode(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> DomResult<&mut Node> {
        self.get_mut(id).ok_or(DomError::NoSuchNode(id))
    }

    /// Direct mutable access for ids already known to be live.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a live node.
    pub(crate) fn slot_mut(&mut self, id: NodeId) -> &mut Node {
        match self.get_mut(id) {
            Some(node) => node,
            None => panic!("no node {id:?} in this tree"),
        }
    }

    /// Whether `id` names a live node.
    #[must_use]
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Get the number of live nodes in the arena.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.live
    }

    /// Check if the arena is empty (it always holds at least the Document).
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Allocate a new node and return its ID.
    /// The node is not yet attached to the tree.
    pub(crate) fn alloc(&mut self, node_type: NodeType, owner_document: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(Node::new(node_type, owner_document)));
        self.live += 1;
        id
    }

    /// Empty a slot, returning what it held.
    pub(crate) fn free(&mut self, id: NodeId) -> Option<Node> {
        let node = self.nodes.get_mut(id.0).and_then(Option::take)?;
        self.live -= 1;
        Some(node)
    }

    /// Get the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Get the first child of a node.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.first_child)
    }

    /// Get the last child of a node.
    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.last_child)
    }

    /// Get the next sibling of a node.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.next_sibling)
    }

    /// Get the previous sibling of a node.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.prev_sibling)
    }

    /// Number of children of a node.
    #[must_use]
    pub fn child_count(&self, id: NodeId) -> usize {
        self.get(id).map_or(0, |n| n.child_count)
    }

    /// [§ 4.4](https://dom.spec.whatwg.org/#dom-node-haschildnodes)
    #[must_use]
    pub fn has_child_nodes(&self, id: NodeId) -> bool {
        self.first_child(id).is_some()
    }

    /// Iterate over the children of a node, first to last.
    #[must_use]
    pub fn children(&self, id: NodeId) -> ChildIterator<'_> {
        ChildIterator {
            tree: self,
            current: self.first_child(id),
        }
    }

    /// The child at `index`, walking the sibling chain.
    #[must_use]
    pub fn child_at(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.children(id).nth(index)
    }

    /// Position of `id` among its parent's children.
    #[must_use]
    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        let _ = self.parent(id)?;
        Some(self.preceding_siblings(id).count())
    }

    /// The node kind, if `id` is live.
    #[must_use]
    pub fn node_kind(&self, id: NodeId) -> Option<NodeKind> {
        self.get(id).map(Node::kind)
    }

    /// [§ 4.4](https://dom.spec.whatwg.org/#dom-node-nodetype)
    #[must_use]
    pub fn node_type_code(&self, id: NodeId) -> Option<u16> {
        self.node_kind(id).map(NodeKind::code)
    }

    /// Whether `id` is a document node.
    #[must_use]
    pub fn is_document(&self, id: NodeId) -> bool {
        self.node_kind(id) == Some(NodeKind::Document)
    }

    /// Whether `id` is an HTML document.
    #[must_use]
    pub fn is_html_document(&self, id: NodeId) -> bool {
        matches!(
            self.get(id).map(Node::node_type),
            Some(NodeType::Document(DocumentData {
                kind: DocumentKind::Html
            }))
        )
    }

    /// [§ 4.4](https://dom.spec.whatwg.org/#dom-node-ownerdocument)
    ///
    /// "The ownerDocument getter steps are to return null, if this is a
    /// document; otherwise this's node document."
    #[must_use]
    pub fn owner_document(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.owner_document)
    }

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-node-document)
    ///
    /// A document's node document is the document itself.
    #[must_use]
    pub fn node_document(&self, id: NodeId) -> Option<NodeId> {
        if self.is_document(id) {
            Some(id)
        } else {
            self.owner_document(id)
        }
    }

    /// [§ 4.4](https://dom.spec.whatwg.org/#dom-node-parentelement)
    #[must_use]
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).filter(|&p| self.is_element(p))
    }

    /// Whether `id` is an element.
    #[must_use]
    pub fn is_element(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(Node::is_element)
    }

    /// Iterate over the element children of a node.
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id).filter(|&c| self.is_element(c))
    }

    /// [§ 4.2.6](https://dom.spec.whatwg.org/#dom-parentnode-firstelementchild)
    #[must_use]
    pub fn first_element_child(&self, id: NodeId) -> Option<NodeId> {
        self.element_children(id).next()
    }

    /// [§ 4.2.6](https://dom.spec.whatwg.org/#dom-parentnode-lastelementchild)
    #[must_use]
    pub fn last_element_child(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.last_child(id);
        while let Some(child) = current {
            if self.is_element(child) {
                return Some(child);
            }
            current = self.prev_sibling(child);
        }
        None
    }

    /// [§ 4.2.6](https://dom.spec.whatwg.org/#dom-parentnode-childelementcount)
    #[must_use]
    pub fn child_element_count(&self, id: NodeId) -> usize {
        self.element_children(id).count()
    }

    /// [§ 4.2.7](https://dom.spec.whatwg.org/#dom-nondocumenttypechildnode-previouselementsibling)
    #[must_use]
    pub fn previous_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.preceding_siblings(id).find(|&s| self.is_element(s))
    }

    /// [§ 4.2.7](https://dom.spec.whatwg.org/#dom-nondocumenttypechildnode-nextelementsibling)
    #[must_use]
    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.next_sibling(id);
        while let Some(sibling) = current {
            if self.is_element(sibling) {
                return Some(sibling);
            }
            current = self.next_sibling(sibling);
        }
        None
    }

    /// [§ 4.2.6 Descendant](https://dom.spec.whatwg.org/#concept-tree-descendant)
    ///
    /// "An object A is called a descendant of an object B, if either A is a
    /// child of B or A is a child of an object C that is a descendant of B."
    ///
    /// Check if `descendant` is a descendant of `ancestor`.
    #[must_use]
    pub fn is_descendant_of(&self, descendant: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(descendant).any(|id| id == ancestor)
    }

    /// [§ 4.4](https://dom.spec.whatwg.org/#dom-node-contains)
    ///
    /// "The contains(other) method steps are to return true if other is an
    /// inclusive descendant of this; otherwise false."
    #[must_use]
    pub fn contains(&self, node: NodeId, other: NodeId) -> bool {
        self.contains_node(other) && (node == other || self.is_descendant_of(other, node))
    }

    /// [§ 4.2](https://dom.spec.whatwg.org/#concept-tree-root)
    ///
    /// "The root of an object is itself, if its parent is null, or else it is
    /// the root of its parent."
    #[must_use]
    pub fn root_of(&self, id: NodeId) -> NodeId {
        self.ancestors(id).last().unwrap_or(id)
    }

    /// Iterate over all ancestors of a node, from parent to root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            tree: self,
            current: self.parent(id),
        }
    }

    /// Iterate over preceding siblings (from immediately before to first child).
    #[must_use]
    pub fn preceding_siblings(&self, id: NodeId) -> PrecedingSiblingIterator<'_> {
        PrecedingSiblingIterator {
            tree: self,
            current: self.prev_sibling(id),
        }
    }

    /// Iterate over the descendants of a node in tree order, excluding the
    /// node itself.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> DescendantIterator<'_> {
        DescendantIterator {
            tree: self,
            root: id,
            current: self.first_child(id),
        }
    }

    /// Get element data if this node is an element.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(Node::as_element)
    }

    /// Get text content if this node is a text node.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// [§ 4.4](https://dom.spec.whatwg.org/#dom-node-nodename)
    #[must_use]
    pub fn node_name(&self, id: NodeId) -> Option<String> {
        let name = match &self.get(id)?.node_type {
            NodeType::Element(data) => data.tag_name(),
            NodeType::Text(_) => "#text".to_string(),
            NodeType::Comment(_) => "#comment".to_string(),
            NodeType::Document(_) => "#document".to_string(),
            NodeType::DocumentType(doctype) => doctype.name.clone(),
        };
        Some(name)
    }

    /// [§ 4.4](https://dom.spec.whatwg.org/#dom-node-nodevalue)
    ///
    /// The data of text and comment nodes; `None` for everything else.
    #[must_use]
    pub fn node_value(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(Node::character_data)
    }

    /// [§ 4.4](https://dom.spec.whatwg.org/#dom-node-textcontent)
    ///
    /// The concatenated data of all descendant text nodes for elements, the
    /// node's own data for character data, and `None` for documents and
    /// doctypes.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> Option<String> {
        match self.get(id)?.kind() {
            NodeKind::Document | NodeKind::DocumentType => None,
            NodeKind::Text | NodeKind::Comment => self.node_value(id).map(str::to_string),
            NodeKind::Element => Some(
                self.descendants(id)
                    .filter_map(|d| self.as_text(d))
                    .collect(),
            ),
        }
    }

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-node-equals)
    ///
    /// "A node A equals a node B if all of the following conditions are true:
    /// A and B implement the same interfaces; ... ; A and B have the same
    /// number of children; each child of A equals the child of B at the
    /// identical index."
    #[must_use]
    pub fn is_equal_node(&self, a: NodeId, b: NodeId) -> bool {
        let (Some(node_a), Some(node_b)) = (self.get(a), self.get(b)) else {
            return false;
        };
        let same_data = match (&node_a.node_type, &node_b.node_type) {
            (NodeType::Element(x), NodeType::Element(y)) => {
                x.namespace == y.namespace
                    && x.prefix == y.prefix
                    && x.local_name == y.local_name
                    && x.attrs.same_set(&y.attrs)
            }
            (x, y) => x == y,
        };
        same_data
            && node_a.child_count == node_b.child_count
            && self
                .children(a)
                .zip(self.children(b))
                .all(|(ca, cb)| self.is_equal_node(ca, cb))
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<NodeId> for DomTree {
    type Output = Node;

    /// # Panics
    ///
    /// Panics if `id` is not a live node; use [`DomTree::get`] to probe.
    fn index(&self, id: NodeId) -> &Node {
        match self.get(id) {
            Some(node) => node,
            None => panic!("no node {id:?} in this tree"),
        }
    }
}

/// Iterator over the children of a node.
pub struct ChildIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for ChildIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.next_sibling(id);
        Some(id)
    }
}

/// Iterator over ancestors of a node.
pub struct AncestorIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}

/// Iterator over preceding siblings of a node.
pub struct PrecedingSiblingIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for PrecedingSiblingIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.prev_sibling(id);
        Some(id)
    }
}

/// Pre-order iterator over the descendants of a node.
pub struct DescendantIterator<'a> {
    tree: &'a DomTree,
    root: NodeId,
    current: Option<NodeId>,
}

impl Iterator for DescendantIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.first_child(id).or_else(|| {
            // Climb until a node with a next sibling, stopping at the root.
            let mut node = id;
            loop {
                if node == self.root {
                    return None;
                }
                if let Some(sibling) = self.tree.next_sibling(node) {
                    return Some(sibling);
                }
                node = self.tree.parent(node)?;
            }
        });
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(tree: &mut DomTree, name: &str) -> NodeId {
        tree.alloc(NodeType::Element(ElementData::html(name)), Some(NodeId::ROOT))
    }

    fn link(tree: &mut DomTree, parent: NodeId, child: NodeId) {
        let last = tree.last_child(parent);
        {
            let node = tree.slot_mut(child);
            node.parent = Some(parent);
            node.prev_sibling = last;
        }
        match last {
            Some(last) => tree.slot_mut(last).next_sibling = Some(child),
            None => tree.slot_mut(parent).first_child = Some(child),
        }
        let parent_node = tree.slot_mut(parent);
        parent_node.last_child = Some(child);
        parent_node.child_count += 1;
    }

    #[test]
    fn test_new_tree_has_document_root() {
        let tree = DomTree::new();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.root(), NodeId::ROOT);
        assert!(tree.is_document(NodeId::ROOT));
        assert!(tree.is_html_document(NodeId::ROOT));
        assert_eq!(tree.node_document(NodeId::ROOT), Some(NodeId::ROOT));
        assert_eq!(tree.owner_document(NodeId::ROOT), None);
    }

    #[test]
    fn test_descendants_in_tree_order() {
        let mut tree = DomTree::new();
        let html = element(&mut tree, "html");
        let head = element(&mut tree, "head");
        let body = element(&mut tree, "body");
        let p = element(&mut tree, "p");
        link(&mut tree, NodeId::ROOT, html);
        link(&mut tree, html, head);
        link(&mut tree, html, body);
        link(&mut tree, body, p);

        let order: Vec<_> = tree.descendants(NodeId::ROOT).collect();
        assert_eq!(order, vec![html, head, body, p]);

        // A subtree walk never escapes its root.
        let under_head: Vec<_> = tree.descendants(head).collect();
        assert!(under_head.is_empty());
        let under_body: Vec<_> = tree.descendants(body).collect();
        assert_eq!(under_body, vec![p]);
    }

    #[test]
    fn test_positional_accessors() {
        let mut tree = DomTree::new();
        let div = element(&mut tree, "div");
        let a = element(&mut tree, "a");
        let b = element(&mut tree, "b");
        link(&mut tree, NodeId::ROOT, div);
        link(&mut tree, div, a);
        link(&mut tree, div, b);

        assert_eq!(tree.child_at(div, 1), Some(b));
        assert_eq!(tree.child_at(div, 2), None);
        assert_eq!(tree.index_of(b), Some(1));
        assert_eq!(tree.index_of(div), Some(0));
        assert_eq!(tree.root_of(b), NodeId::ROOT);
        assert!(tree.contains(div, b));
        assert!(tree.contains(b, b));
        assert!(!tree.contains(b, div));
    }

    #[test]
    fn test_freed_slots_stay_dead() {
        let mut tree = DomTree::new();
        let div = element(&mut tree, "div");
        assert!(tree.free(div).is_some());
        assert!(tree.get(div).is_none());
        assert!(matches!(tree.node(div), Err(DomError::NoSuchNode(id)) if id == div));
        let span = element(&mut tree, "span");
        assert_ne!(span, div);
        assert_eq!(tree.len(), 2);
    }
}
