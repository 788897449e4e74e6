//! Errors raised by the reflection protocol and the interface registry.

use koala_dom::DomError;
use thiserror::Error;

use crate::interface::{CallMode, Interface};
use crate::value::{EventHandle, ObjectRef};

/// Result alias for protocol calls.
pub type BindingResult<T> = Result<T, BindingError>;

/// A failed protocol call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BindingError {
    /// The selector names nothing on the object's interface or any of its
    /// bases.
    #[error("{interface} has no member '{member}'")]
    NotFound {
        /// The most-derived interface of the object.
        interface: Interface,
        /// The member name, or the selector number if it has no name.
        member: String,
    },

    /// The member exists but cannot be used in this mode, e.g. a setter
    /// call on a read-only attribute.
    #[error("{interface}.{member} does not support {mode} calls")]
    ModeMismatch {
        /// The most-derived interface of the object.
        interface: Interface,
        /// The member name.
        member: String,
        /// The mode that was requested.
        mode: CallMode,
    },

    /// A required argument was not passed.
    #[error("{member}: argument {index} is required")]
    MissingArgument {
        /// The member being called.
        member: &'static str,
        /// Zero-based argument position.
        index: usize,
    },

    /// An argument has the wrong type.
    #[error("{member}: argument {index} must be {expected}")]
    ArgumentType {
        /// The member being called.
        member: &'static str,
        /// Zero-based argument position.
        index: usize,
        /// What was expected, e.g. `"a node"`.
        expected: &'static str,
    },

    /// The object no longer exists: a released node or a dropped event.
    #[error("{0:?} does not refer to a live object")]
    StaleObject(ObjectRef),

    /// The event is being dispatched and cannot be used until the dispatch
    /// returns.
    #[error("{0:?} is being dispatched")]
    EventInFlight(EventHandle),

    /// The DOM operation behind the member failed.
    #[error(transparent)]
    Dom(#[from] DomError),
}

impl BindingError {
    /// The exception name a script would observe.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::NotFound { .. }
            | Self::ModeMismatch { .. }
            | Self::MissingArgument { .. }
            | Self::ArgumentType { .. } => "TypeError",
            Self::StaleObject(_) => "NotFoundError",
            Self::EventInFlight(_) => "InvalidStateError",
            Self::Dom(error) => error.name(),
        }
    }
}

/// A set of interface tables that cannot be flattened into vtables.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Two tables describe the same interface.
    #[error("interface {0} is defined twice")]
    DuplicateInterface(Interface),

    /// A table names a base interface that has no table.
    #[error("{interface} inherits from {base}, which is not defined")]
    UnknownBase {
        /// The interface whose base is missing.
        interface: Interface,
        /// The missing base.
        base: Interface,
    },

    /// Following base links from this interface leads back to it.
    #[error("inheritance chain of {0} is cyclic")]
    CyclicInheritance(Interface),
}
