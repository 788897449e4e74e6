//! Interfaces, call modes and selectors.
//!
//! [Web IDL § 3.7 Interfaces](https://webidl.spec.whatwg.org/#es-interfaces)

use std::fmt;

use koala_dom::ElementKind;
use strum_macros::{Display, EnumString, IntoStaticStr};

/// An abstract interface a native object can be addressed as.
///
/// The string form is the Web IDL interface name, which is also how
/// `InstanceOf` calls name the interface they test for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
pub enum Interface {
    /// [§ 2.7 Interface EventTarget](https://dom.spec.whatwg.org/#interface-eventtarget)
    EventTarget,
    /// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
    Node,
    /// [§ 4.10 Interface CharacterData](https://dom.spec.whatwg.org/#interface-characterdata)
    CharacterData,
    /// [§ 4.11 Interface Text](https://dom.spec.whatwg.org/#interface-text)
    Text,
    /// [§ 4.14 Interface Comment](https://dom.spec.whatwg.org/#interface-comment)
    Comment,
    /// [§ 4.6 Interface DocumentType](https://dom.spec.whatwg.org/#interface-documenttype)
    DocumentType,
    /// [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element)
    Element,
    /// [§ 3.2.8 HTMLElement](https://html.spec.whatwg.org/multipage/dom.html#htmlelement)
    #[strum(serialize = "HTMLElement")]
    HtmlElement,
    /// [§ 4.5.1 The a element](https://html.spec.whatwg.org/multipage/text-level-semantics.html#htmlanchorelement)
    #[strum(serialize = "HTMLAnchorElement")]
    HtmlAnchorElement,
    /// [§ 4.10.5 The input element](https://html.spec.whatwg.org/multipage/input.html#htmlinputelement)
    #[strum(serialize = "HTMLInputElement")]
    HtmlInputElement,
    /// [§ 4.10.6 The button element](https://html.spec.whatwg.org/multipage/form-elements.html#htmlbuttonelement)
    #[strum(serialize = "HTMLButtonElement")]
    HtmlButtonElement,
    /// [§ 3.2.2 HTMLUnknownElement](https://html.spec.whatwg.org/multipage/dom.html#htmlunknownelement)
    #[strum(serialize = "HTMLUnknownElement")]
    HtmlUnknownElement,
    /// [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#interface-document)
    Document,
    /// [§ 2.2 Interface Event](https://dom.spec.whatwg.org/#interface-event)
    Event,
}

impl Interface {
    /// The Web IDL name of this interface.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// The most-derived interface for an element of the given kind.
    ///
    /// Element subtypes without members of their own are exposed as plain
    /// `HTMLElement`.
    #[must_use]
    pub const fn for_element(kind: ElementKind) -> Self {
        match kind {
            ElementKind::Anchor => Self::HtmlAnchorElement,
            ElementKind::Input => Self::HtmlInputElement,
            ElementKind::Button => Self::HtmlButtonElement,
            ElementKind::Unknown => Self::HtmlUnknownElement,
            ElementKind::Foreign => Self::Element,
            _ => Self::HtmlElement,
        }
    }
}

/// How a member is being used.
///
/// [Web IDL § 2.5 Members](https://webidl.spec.whatwg.org/#idl-members)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum CallMode {
    /// Read an attribute.
    Getter,
    /// Write an attribute; the new value is the first argument.
    Setter,
    /// Read an indexed property; the index is the first argument.
    IndexedGetter,
    /// Write an indexed property; the index and value are the first two
    /// arguments.
    IndexedSetter,
    /// Call an operation.
    Method,
    /// Test whether the object implements the interface the selector names.
    InstanceOf,
}

impl CallMode {
    /// Whether this mode addresses indexed properties, which ignore the
    /// selector.
    #[must_use]
    pub const fn is_indexed(self) -> bool {
        matches!(self, Self::IndexedGetter | Self::IndexedSetter)
    }
}

/// A stable numeric identifier for a member or interface name.
///
/// Selectors are assigned by an [`crate::InterfaceRegistry`] and are only
/// meaningful for the registry that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Selector(pub u32);

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_interface_names_round_trip() {
        assert_eq!(Interface::HtmlElement.name(), "HTMLElement");
        assert_eq!(Interface::EventTarget.to_string(), "EventTarget");
        assert_eq!(
            Interface::from_str("HTMLInputElement"),
            Ok(Interface::HtmlInputElement)
        );
        assert!(Interface::from_str("HTMLMarqueeElement").is_err());
    }

    #[test]
    fn test_call_mode_names() {
        assert_eq!(CallMode::IndexedGetter.to_string(), "indexed-getter");
        assert_eq!(CallMode::from_str("instance-of"), Ok(CallMode::InstanceOf));
    }

    #[test]
    fn test_element_interfaces() {
        assert_eq!(
            Interface::for_element(ElementKind::Div),
            Interface::HtmlElement
        );
        assert_eq!(
            Interface::for_element(ElementKind::Foreign),
            Interface::Element
        );
    }
}
