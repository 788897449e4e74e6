//! Node storage and node kinds.
//!
//! [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)

use serde::Serialize;
use strum_macros::Display;

use crate::NodeId;
use crate::element::ElementData;
use crate::event_target::EventTarget;

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "Node is an abstract interface that is used by all nodes in a tree."
/// "Each node has an associated node document... and parent (null or an element)."
///
/// This node stores indices for parent/child/sibling relationships,
/// enabling O(1) traversal in any direction. The links are private to the
/// crate: they only change through the mutation algorithms of [`DomTree`],
/// which keep them consistent.
///
/// [`DomTree`]: crate::DomTree
#[derive(Debug)]
pub struct Node {
    /// "Each node has an associated node type"
    pub(crate) node_type: NodeType,

    /// "Each node has an associated node document". `None` for documents
    /// themselves and for doctypes created outside any document.
    pub(crate) owner_document: Option<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-parent)
    /// "An object that participates in a tree has a parent, which is either
    /// null or an object."
    pub(crate) parent: Option<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-first-child)
    pub(crate) first_child: Option<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-last-child)
    pub(crate) last_child: Option<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-next-sibling)
    /// "An object A's next sibling is the object immediately following A
    /// in the children of A's parent."
    pub(crate) next_sibling: Option<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-previous-sibling)
    /// "An object A's previous sibling is the object immediately preceding A
    /// in the children of A's parent."
    pub(crate) prev_sibling: Option<NodeId>,

    /// Number of children, kept in step with the sibling chain.
    pub(crate) child_count: usize,

    /// [§ 2.7 Interface EventTarget](https://dom.spec.whatwg.org/#interface-eventtarget)
    pub(crate) event_target: EventTarget,
}

impl Node {
    pub(crate) fn new(node_type: NodeType, owner_document: Option<NodeId>) -> Self {
        Self {
            node_type,
            owner_document,
            parent: None,
            first_child: None,
            last_child: None,
            next_sibling: None,
            prev_sibling: None,
            child_count: 0,
            event_target: EventTarget::default(),
        }
    }

    /// The node-specific data.
    #[must_use]
    pub const fn node_type(&self) -> &NodeType {
        &self.node_type
    }

    /// The kind of this node.
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        self.node_type.kind()
    }

    /// The node document link, as stored.
    #[must_use]
    pub const fn owner_document(&self) -> Option<NodeId> {
        self.owner_document
    }

    /// The parent node, if attached.
    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// The first child.
    #[must_use]
    pub const fn first_child(&self) -> Option<NodeId> {
        self.first_child
    }

    /// The last child.
    #[must_use]
    pub const fn last_child(&self) -> Option<NodeId> {
        self.last_child
    }

    /// The next sibling.
    #[must_use]
    pub const fn next_sibling(&self) -> Option<NodeId> {
        self.next_sibling
    }

    /// The previous sibling.
    #[must_use]
    pub const fn prev_sibling(&self) -> Option<NodeId> {
        self.prev_sibling
    }

    /// The cached number of children.
    #[must_use]
    pub const fn child_count(&self) -> usize {
        self.child_count
    }

    /// Check if this is an element.
    #[must_use]
    pub const fn is_element(&self) -> bool {
        matches!(self.node_type, NodeType::Element(_))
    }

    /// Check if this is a text node.
    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self.node_type, NodeType::Text(_))
    }

    /// Get element data if this is an element.
    #[must_use]
    pub const fn as_element(&self) -> Option<&ElementData> {
        match &self.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        }
    }

    pub(crate) const fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        }
    }

    /// The data of a text or comment node.
    #[must_use]
    pub fn character_data(&self) -> Option<&str> {
        match &self.node_type {
            NodeType::Text(data) | NodeType::Comment(data) => Some(data.as_str()),
            _ => None,
        }
    }

    pub(crate) const fn character_data_mut(&mut self) -> Option<&mut String> {
        match &mut self.node_type {
            NodeType::Text(data) | NodeType::Comment(data) => Some(data),
            _ => None,
        }
    }
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "Each node has an associated node type"
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeType {
    /// [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#interface-document)
    /// "A document whose type is "html" is known as an HTML document."
    Document(DocumentData),
    /// [§ 4.6 Interface DocumentType](https://dom.spec.whatwg.org/#interface-documenttype)
    /// "Doctypes have an associated name, public ID, and system ID."
    DocumentType(DocumentTypeData),
    /// [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element)
    /// "Element nodes are simply known as elements."
    Element(ElementData),
    /// [§ 4.11 Interface Text](https://dom.spec.whatwg.org/#interface-text)
    /// "Text nodes are known as text."
    Text(String),
    /// [§ 4.14 Interface Comment](https://dom.spec.whatwg.org/#interface-comment)
    /// "Comment nodes are known as comments."
    Comment(String),
}

impl NodeType {
    /// The fieldless kind of this node.
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        match self {
            Self::Document(_) => NodeKind::Document,
            Self::DocumentType(_) => NodeKind::DocumentType,
            Self::Element(_) => NodeKind::Element,
            Self::Text(_) => NodeKind::Text,
            Self::Comment(_) => NodeKind::Comment,
        }
    }
}

/// The kind of a node, without its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
pub enum NodeKind {
    /// A document.
    Document,
    /// A doctype.
    DocumentType,
    /// An element.
    Element,
    /// A text node.
    Text,
    /// A comment.
    Comment,
}

impl NodeKind {
    /// [§ 4.4](https://dom.spec.whatwg.org/#dom-node-nodetype)
    ///
    /// The numeric `nodeType` value scripts see.
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::Element => 1,
            Self::Text => 3,
            Self::Comment => 8,
            Self::Document => 9,
            Self::DocumentType => 10,
        }
    }

    /// Whether nodes of this kind may have children.
    #[must_use]
    pub const fn can_have_children(self) -> bool {
        matches!(self, Self::Document | Self::Element)
    }
}

/// Document-specific data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentData {
    /// "A document is said to be an XML document if its type is "xml";
    /// otherwise an HTML document."
    pub kind: DocumentKind,
}

/// [§ 4.5](https://dom.spec.whatwg.org/#concept-document-type)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum DocumentKind {
    /// An HTML document: element names are lowercased on creation.
    #[strum(serialize = "html")]
    Html,
    /// An XML document: names are taken as given.
    #[strum(serialize = "xml")]
    Xml,
}

/// Doctype-specific data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentTypeData {
    /// The doctype name, e.g. `html`.
    pub name: String,
    /// The public identifier.
    pub public_id: String,
    /// The system identifier.
    pub system_id: String,
}
