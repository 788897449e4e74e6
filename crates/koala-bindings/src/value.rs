//! Values crossing the binding boundary.
//!
//! [Web IDL § 3.2 JavaScript type mapping](https://webidl.spec.whatwg.org/#js-type-mapping)

use std::fmt;

use koala_dom::{EventListener, NodeId};

use crate::error::{BindingError, BindingResult};

/// A handle to an event owned by a [`crate::BindingContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventHandle(pub(crate) u32);

/// An object the protocol can be invoked on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectRef {
    /// A node in the context's tree.
    Node(NodeId),
    /// An event in the context's event store.
    Event(EventHandle),
}

impl ObjectRef {
    /// The node this refers to, if any.
    #[must_use]
    pub const fn node(self) -> Option<NodeId> {
        match self {
            Self::Node(id) => Some(id),
            Self::Event(_) => None,
        }
    }

    /// The event this refers to, if any.
    #[must_use]
    pub const fn event(self) -> Option<EventHandle> {
        match self {
            Self::Event(handle) => Some(handle),
            Self::Node(_) => None,
        }
    }
}

/// A polymorphic argument or result.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// `undefined`; also the result of setters and void operations.
    #[default]
    Undefined,
    /// `null`
    Null,
    /// A boolean.
    Bool(bool),
    /// A number.
    Number(f64),
    /// A string.
    String(String),
    /// A node.
    Node(NodeId),
    /// An event.
    Event(EventHandle),
    /// A callback usable with `addEventListener`.
    Listener(EventListener),
    /// A sequence, e.g. `childNodes`.
    List(Vec<Value>),
}

impl Value {
    /// The object this value refers to, if it is a node or event.
    #[must_use]
    pub const fn as_object(&self) -> Option<ObjectRef> {
        match self {
            Self::Node(id) => Some(ObjectRef::Node(*id)),
            Self::Event(handle) => Some(ObjectRef::Event(*handle)),
            _ => None,
        }
    }

    /// `null` or `undefined`.
    #[must_use]
    pub const fn is_nullish(&self) -> bool {
        matches!(self, Self::Null | Self::Undefined)
    }

    /// [ECMA-262 § 7.1.2 ToBoolean](https://tc39.es/ecma262/#sec-toboolean)
    #[must_use]
    pub fn truthy(&self) -> bool {
        match self {
            Self::Undefined | Self::Null => false,
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::String(s) => !s.is_empty(),
            Self::Node(_) | Self::Event(_) | Self::Listener(_) | Self::List(_) => true,
        }
    }

    /// The string a primitive converts to, as `DOMString` arguments are
    /// converted. Objects do not convert.
    #[must_use]
    pub fn to_dom_string(&self) -> Option<String> {
        match self {
            Self::Undefined => Some("undefined".to_string()),
            Self::Null => Some("null".to_string()),
            Self::Bool(b) => Some(b.to_string()),
            Self::Number(n) => Some(format_number(*n)),
            Self::String(s) => Some(s.clone()),
            Self::Node(_) | Self::Event(_) | Self::Listener(_) | Self::List(_) => None,
        }
    }
}

/// Numbers print without a trailing `.0` when integral.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() {
        format!("{n:.0}")
    } else {
        n.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => f.write_str("undefined"),
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => f.write_str(&format_number(*n)),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Node(id) => write!(f, "node#{}", id.0),
            Self::Event(handle) => write!(f, "event#{}", handle.0),
            Self::Listener(_) => f.write_str("[listener]"),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<usize> for Value {
    #[allow(clippy::cast_precision_loss)]
    fn from(n: usize) -> Self {
        Self::Number(n as f64)
    }
}

impl From<NodeId> for Value {
    fn from(id: NodeId) -> Self {
        Self::Node(id)
    }
}

/// `None` becomes `null`.
impl From<Option<NodeId>> for Value {
    fn from(id: Option<NodeId>) -> Self {
        id.map_or(Self::Null, Self::Node)
    }
}

impl From<Vec<NodeId>> for Value {
    fn from(ids: Vec<NodeId>) -> Self {
        Self::List(ids.into_iter().map(Self::Node).collect())
    }
}

impl From<EventHandle> for Value {
    fn from(handle: EventHandle) -> Self {
        Self::Event(handle)
    }
}

impl From<EventListener> for Value {
    fn from(listener: EventListener) -> Self {
        Self::Listener(listener)
    }
}

/// Positional arguments of one call, with conversions that report which
/// argument was wrong.
pub(crate) struct Args<'a> {
    member: &'static str,
    values: &'a [Value],
}

impl<'a> Args<'a> {
    pub(crate) const fn new(member: &'static str, values: &'a [Value]) -> Self {
        Self { member, values }
    }

    const fn wrong_type(&self, index: usize, expected: &'static str) -> BindingError {
        BindingError::ArgumentType {
            member: self.member,
            index,
            expected,
        }
    }

    pub(crate) fn get(&self, index: usize) -> BindingResult<&'a Value> {
        self.values.get(index).ok_or(BindingError::MissingArgument {
            member: self.member,
            index,
        })
    }

    pub(crate) fn node(&self, index: usize) -> BindingResult<NodeId> {
        match self.get(index)? {
            Value::Node(id) => Ok(*id),
            _ => Err(self.wrong_type(index, "a node")),
        }
    }

    /// A node, or `None` for a missing, `null` or `undefined` argument.
    pub(crate) fn optional_node(&self, index: usize) -> BindingResult<Option<NodeId>> {
        match self.values.get(index) {
            None | Some(Value::Null | Value::Undefined) => Ok(None),
            Some(Value::Node(id)) => Ok(Some(*id)),
            Some(_) => Err(self.wrong_type(index, "a node or null")),
        }
    }

    pub(crate) fn string(&self, index: usize) -> BindingResult<String> {
        self.get(index)?
            .to_dom_string()
            .ok_or_else(|| self.wrong_type(index, "a string"))
    }

    /// A `DOMString?`: `null` and `undefined` map to `None`.
    pub(crate) fn optional_string(&self, index: usize) -> BindingResult<Option<String>> {
        let value = self.get(index)?;
        if value.is_nullish() {
            return Ok(None);
        }
        value
            .to_dom_string()
            .map(Some)
            .ok_or_else(|| self.wrong_type(index, "a string or null"))
    }

    /// An optional boolean, converted with `ToBoolean`.
    pub(crate) fn bool_or(&self, index: usize, default: bool) -> bool {
        self.values.get(index).map_or(default, Value::truthy)
    }

    /// An optional boolean where `undefined` means "not passed".
    pub(crate) fn optional_bool(&self, index: usize) -> Option<bool> {
        match self.values.get(index) {
            None | Some(Value::Undefined) => None,
            Some(value) => Some(value.truthy()),
        }
    }

    /// [Web IDL § 3.2.4.9 unsigned long](https://webidl.spec.whatwg.org/#es-unsigned-long)
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub(crate) fn index(&self, index: usize) -> BindingResult<usize> {
        match self.get(index)? {
            Value::Number(n) if n.is_finite() && *n >= 0.0 && n.fract() == 0.0 => Ok(*n as usize),
            _ => Err(self.wrong_type(index, "a non-negative integer")),
        }
    }

    pub(crate) fn listener(&self, index: usize) -> BindingResult<EventListener> {
        match self.get(index)? {
            Value::Listener(listener) => Ok(listener.clone()),
            _ => Err(self.wrong_type(index, "a listener")),
        }
    }

    pub(crate) fn event(&self, index: usize) -> BindingResult<EventHandle> {
        match self.get(index)? {
            Value::Event(handle) => Ok(*handle),
            _ => Err(self.wrong_type(index, "an event")),
        }
    }
}
