//! Errors raised by tree mutations, factory calls, and event dispatch.
//!
//! [§ 2.5 DOMException](https://webidl.spec.whatwg.org/#idl-DOMException)
//!
//! Variants mirror the DOMException names the bindings layer reports to a
//! scripting host. Tree mutations validate everything before touching a link,
//! so an `Err` from a mutation always means the tree is unchanged.

use thiserror::Error;

use crate::NodeId;

/// Result alias used throughout the DOM crate.
pub type DomResult<T> = Result<T, DomError>;

/// A failed DOM operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    /// "HierarchyRequestError": the operation would yield an incorrect node tree.
    #[error("hierarchy request error: {0}")]
    HierarchyRequest(HierarchyViolation),

    /// "NotFoundError": a node that was expected to be a child was not.
    #[error("not found: {0}")]
    NotFound(&'static str),

    /// The id does not name a live node of this tree.
    #[error("no node {0:?} in this tree")]
    NoSuchNode(NodeId),

    /// "InvalidStateError": the object is in the wrong state for the call.
    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    /// "InvalidCharacterError": a name does not match the XML `Name` production.
    #[error("invalid character in name {0:?}")]
    InvalidCharacter(String),

    /// "NamespaceError": prefix and namespace do not agree.
    #[error("namespace error: {0}")]
    Namespace(&'static str),

    /// "IndexSizeError": an offset past the end of character data.
    #[error("offset {offset} is past the end of data of length {length}")]
    IndexSize {
        /// The offending offset, in UTF-16 code units.
        offset: usize,
        /// The data length, in UTF-16 code units.
        length: usize,
    },

    /// "NotSupportedError": the operation is not supported for this node.
    #[error("not supported: {0}")]
    NotSupported(&'static str),

    /// The node is not of the kind the operation requires.
    #[error("node {node:?} is not a {expected}")]
    WrongNodeType {
        /// The node that was passed.
        node: NodeId,
        /// What the operation expected, e.g. `"document"`.
        expected: &'static str,
    },

    /// A listener failed while an event was being dispatched.
    #[error(transparent)]
    Listener(#[from] ListenerError),
}

impl DomError {
    /// The DOMException name a script would observe for this error.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::HierarchyRequest(_) => "HierarchyRequestError",
            Self::NotFound(_) | Self::NoSuchNode(_) => "NotFoundError",
            Self::InvalidState(_) => "InvalidStateError",
            Self::InvalidCharacter(_) => "InvalidCharacterError",
            Self::Namespace(_) => "NamespaceError",
            Self::IndexSize { .. } => "IndexSizeError",
            Self::NotSupported(_) => "NotSupportedError",
            Self::WrongNodeType { .. } => "TypeError",
            Self::Listener(_) => "ListenerError",
        }
    }
}

/// The structural rule a rejected mutation would have broken.
///
/// [§ 4.2.3 Mutation algorithms](https://dom.spec.whatwg.org/#mutation-algorithms)
/// "To ensure pre-insertion validity of a node into a parent before a child..."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HierarchyViolation {
    /// The node is an inclusive ancestor of the prospective parent.
    #[error("a node cannot be inserted into itself or one of its descendants")]
    Cycle,
    /// Only documents and elements can have children.
    #[error("this kind of node cannot have children")]
    ParentCannotHaveChildren,
    /// Documents are always tree roots.
    #[error("a document cannot be inserted into a tree")]
    DocumentInserted,
    /// Text cannot be a direct child of a document.
    #[error("text cannot be a child of a document")]
    TextInDocument,
    /// Doctypes only live directly under documents.
    #[error("a doctype can only be a child of a document")]
    DoctypeOutsideDocument,
    /// A document already has a doctype child.
    #[error("the document already has a doctype")]
    DuplicateDoctype,
    /// A document already has an element child.
    #[error("the document already has a document element")]
    DuplicateDocumentElement,
    /// A doctype must come before the document element.
    #[error("a doctype cannot follow the document element")]
    DoctypeAfterElement,
    /// The document element must come after the doctype.
    #[error("the document element cannot precede the doctype")]
    ElementBeforeDoctype,
    /// Only detached nodes can be released.
    #[error("an attached node cannot be released")]
    ReleaseAttached,
}

impl From<HierarchyViolation> for DomError {
    fn from(violation: HierarchyViolation) -> Self {
        Self::HierarchyRequest(violation)
    }
}

/// An error raised by an event listener.
///
/// Listener failures are isolated: the dispatch walk carries on and the first
/// failure is handed back to the `dispatch_event` caller once the walk ends.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("listener for '{event_type}' failed: {message}")]
pub struct ListenerError {
    /// The type of the event being dispatched. Filled in by the dispatcher.
    pub event_type: String,
    /// What went wrong.
    pub message: String,
}

impl ListenerError {
    /// Create a listener error with the given message.
    ///
    /// The event type is filled in by the dispatcher when the error is
    /// collected.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            event_type: String::new(),
            message: message.into(),
        }
    }
}

/// Lets listeners use `?` on tree operations.
impl From<DomError> for ListenerError {
    fn from(error: DomError) -> Self {
        match error {
            DomError::Listener(inner) => inner,
            other => Self::new(format!("{}: {other}", other.name())),
        }
    }
}
