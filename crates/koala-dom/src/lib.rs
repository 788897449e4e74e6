//! DOM tree implementation for the Koala browser.
//!
//! This crate provides an arena-based DOM tree structure following the
//! [DOM Living Standard](https://dom.spec.whatwg.org/), together with the
//! event model and the dispatch algorithm that walks it.
//!
//! # Design
//!
//! The tree uses arena allocation with [`NodeId`] indices for all relationships,
//! providing O(1) access and traversal without borrow checker issues. A parent
//! owns its children through the `first_child`/`next_sibling` chain; parent,
//! sibling and owner-document links are plain indices and never extend a
//! node's lifetime.
//!
//! Every node is also an event target. Listeners are stored per node and are
//! invoked with `&mut DomTree`, so they may freely mutate the tree while a
//! dispatch is running: the dispatch engine computes the propagation path and
//! snapshots each node's listener list before invoking anything on it.
//!
//! # Modules
//!
//! - [`tree`] - arena storage, read accessors, iterators
//! - [`manipulation`] - insertion, removal, replacement, cloning, adoption
//! - [`document`] - the element/text/comment factory and document lookups
//! - [`element`] - element data, element kinds, attribute operations
//! - [`character_data`] - text and comment data operations
//! - [`event`], [`event_target`], [`dispatch`] - the event model
//! - [`mutation`] - structural-mutation records, observers, mutation events

pub mod attributes;
pub mod character_data;
pub mod dispatch;
pub mod document;
pub mod element;
pub mod error;
pub mod event;
pub mod event_target;
pub mod manipulation;
pub mod mutation;
pub mod node;
pub mod snapshot;
pub mod tree;

pub use attributes::{Attribute, AttributeList};
pub use element::{ElementData, ElementKind, HTML_NAMESPACE, XML_NAMESPACE, XMLNS_NAMESPACE};
pub use error::{DomError, DomResult, HierarchyViolation, ListenerError};
pub use event::{AttrChange, Event, EventInit, EventPhase, MutationDetail};
pub use event_target::{EventListener, ListenerEntry, ListenerResult};
pub use mutation::{MutationRecord, ObserverId};
pub use node::{DocumentData, DocumentKind, DocumentTypeData, Node, NodeKind, NodeType};
pub use snapshot::NodeSnapshot;
pub use tree::{
    AncestorIterator, ChildIterator, DescendantIterator, DomOptions, DomTree,
    PrecedingSiblingIterator,
};

/// A type-safe index into the DOM tree.
///
/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
/// "Each node has an associated node document..."
///
/// NodeId provides O(1) access to any node in the tree without borrowing issues.
/// Ids are never reused: once a node is released its id stays dead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The root document node is always at index 0.
    pub const ROOT: Self = Self(0);
}
