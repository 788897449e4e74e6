//! Interface tables and their flattened vtables.
//!
//! Each interface publishes a table of its own members and names its base.
//! [`InterfaceRegistry::new`] checks the base links once and copies every
//! inherited member into a per-interface [`Vtable`], so a call resolves with
//! a single lookup instead of walking the inheritance chain.

use std::collections::HashMap;

use koala_common::warning::{Component, warn_once};

use crate::context::Scope;
use crate::error::{BindingResult, RegistryError};
use crate::interface::{Interface, Selector};
use crate::tables;
use crate::value::{ObjectRef, Value};

/// Native attribute getter.
pub type NativeGetter = fn(&Scope<'_>, ObjectRef) -> BindingResult<Value>;
/// Native attribute setter.
pub type NativeSetter = fn(&mut Scope<'_>, ObjectRef, &Value) -> BindingResult<()>;
/// Native operation.
pub type NativeMethod = fn(&mut Scope<'_>, ObjectRef, &[Value]) -> BindingResult<Value>;
/// Native indexed property getter.
pub type IndexedGetter = fn(&Scope<'_>, ObjectRef, usize) -> BindingResult<Value>;
/// Native indexed property setter.
pub type IndexedSetter = fn(&mut Scope<'_>, ObjectRef, usize, &Value) -> BindingResult<()>;

/// How an attribute is read.
#[derive(Debug, Clone, Copy)]
pub enum Getter {
    /// A native function.
    Native(NativeGetter),
    /// [§ 2.6.1 Reflecting content attributes](https://html.spec.whatwg.org/multipage/common-dom-interfaces.html#reflecting-content-attributes-in-idl-attributes)
    /// A `DOMString` attribute reflecting the named content attribute.
    Reflect(&'static str),
    /// A `boolean` attribute reflecting the presence of the named content
    /// attribute.
    ReflectBool(&'static str),
}

/// How an attribute is written.
#[derive(Debug, Clone, Copy)]
pub enum Setter {
    /// A native function.
    Native(NativeSetter),
    /// Sets the named content attribute to the stringified value.
    Reflect(&'static str),
    /// Adds or removes the named content attribute.
    ReflectBool(&'static str),
}

/// One named member of an interface.
#[derive(Debug, Clone, Copy)]
pub struct Member {
    /// The IDL name.
    pub name: &'static str,
    /// Present for attributes.
    pub getter: Option<Getter>,
    /// Present for writable attributes.
    pub setter: Option<Setter>,
    /// Present for operations.
    pub method: Option<NativeMethod>,
}

impl Member {
    /// A read-only attribute.
    #[must_use]
    pub const fn readonly(name: &'static str, get: NativeGetter) -> Self {
        Self {
            name,
            getter: Some(Getter::Native(get)),
            setter: None,
            method: None,
        }
    }

    /// A writable attribute.
    #[must_use]
    pub const fn attribute(name: &'static str, get: NativeGetter, set: NativeSetter) -> Self {
        Self {
            name,
            getter: Some(Getter::Native(get)),
            setter: Some(Setter::Native(set)),
            method: None,
        }
    }

    /// An operation.
    #[must_use]
    pub const fn method(name: &'static str, call: NativeMethod) -> Self {
        Self {
            name,
            getter: None,
            setter: None,
            method: Some(call),
        }
    }

    /// A string attribute reflecting the content attribute `attribute`.
    #[must_use]
    pub const fn reflect(name: &'static str, attribute: &'static str) -> Self {
        Self {
            name,
            getter: Some(Getter::Reflect(attribute)),
            setter: Some(Setter::Reflect(attribute)),
            method: None,
        }
    }

    /// A boolean attribute reflecting the presence of `attribute`.
    #[must_use]
    pub const fn reflect_bool(name: &'static str, attribute: &'static str) -> Self {
        Self {
            name,
            getter: Some(Getter::ReflectBool(attribute)),
            setter: Some(Setter::ReflectBool(attribute)),
            method: None,
        }
    }
}

/// The members one interface declares itself.
#[derive(Debug, Clone)]
pub struct InterfaceTable {
    /// The interface described.
    pub interface: Interface,
    /// The interface it inherits from.
    pub base: Option<Interface>,
    /// Members declared on this interface.
    pub members: Vec<Member>,
    /// Indexed property getter, if the interface declares one.
    pub indexed_getter: Option<IndexedGetter>,
    /// Indexed property setter, if the interface declares one.
    pub indexed_setter: Option<IndexedSetter>,
}

impl InterfaceTable {
    /// A table with no members.
    #[must_use]
    pub const fn new(interface: Interface, base: Option<Interface>) -> Self {
        Self {
            interface,
            base,
            members: Vec::new(),
            indexed_getter: None,
            indexed_setter: None,
        }
    }

    /// Add members.
    #[must_use]
    pub fn with_members(mut self, members: impl IntoIterator<Item = Member>) -> Self {
        self.members.extend(members);
        self
    }

    /// Declare indexed property accessors.
    #[must_use]
    pub fn with_indexed(mut self, getter: IndexedGetter, setter: Option<IndexedSetter>) -> Self {
        self.indexed_getter = Some(getter);
        self.indexed_setter = setter;
        self
    }
}

/// Every member an interface answers to, its own and inherited.
#[derive(Debug, Clone)]
pub struct Vtable {
    interface: Interface,
    ancestry: Vec<Interface>,
    members: HashMap<Selector, Member>,
    indexed_getter: Option<IndexedGetter>,
    indexed_setter: Option<IndexedSetter>,
}

impl Vtable {
    /// The interface this vtable is for.
    #[must_use]
    pub const fn interface(&self) -> Interface {
        self.interface
    }

    /// The interface followed by its bases, most derived first.
    #[must_use]
    pub fn ancestry(&self) -> &[Interface] {
        &self.ancestry
    }

    /// Whether objects with this vtable implement `interface`.
    #[must_use]
    pub fn implements(&self, interface: Interface) -> bool {
        self.ancestry.contains(&interface)
    }

    /// The member a selector resolves to. Members declared closer to the
    /// interface shadow inherited ones.
    #[must_use]
    pub fn member(&self, selector: Selector) -> Option<&Member> {
        self.members.get(&selector)
    }

    /// Number of resolvable members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether no member resolves.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// The nearest indexed getter along the ancestry.
    #[must_use]
    pub const fn indexed_getter(&self) -> Option<IndexedGetter> {
        self.indexed_getter
    }

    /// The nearest indexed setter along the ancestry.
    #[must_use]
    pub const fn indexed_setter(&self) -> Option<IndexedSetter> {
        self.indexed_setter
    }
}

/// Assigns selectors to names in first-seen order.
#[derive(Default)]
struct Interner {
    names: Vec<&'static str>,
    ids: HashMap<&'static str, Selector>,
}

impl Interner {
    fn intern(&mut self, name: &'static str) -> Selector {
        if let Some(&selector) = self.ids.get(name) {
            return selector;
        }
        let selector = Selector(u32::try_from(self.names.len()).unwrap_or(u32::MAX));
        self.names.push(name);
        let _ = self.ids.insert(name, selector);
        selector
    }
}

/// Selector assignments and flattened vtables for a set of interfaces.
#[derive(Debug)]
pub struct InterfaceRegistry {
    names: Vec<&'static str>,
    selectors: HashMap<&'static str, Selector>,
    vtables: HashMap<Interface, Vtable>,
}

impl InterfaceRegistry {
    /// Validate `tables` and flatten them.
    ///
    /// Selectors are assigned in table order: interface names first, then
    /// member names, so the same tables always produce the same selectors.
    ///
    /// # Errors
    ///
    /// `DuplicateInterface`, `UnknownBase` or `CyclicInheritance` when the
    /// tables do not form a forest.
    pub fn new(tables: Vec<InterfaceTable>) -> Result<Self, RegistryError> {
        let mut order = Vec::with_capacity(tables.len());
        let mut by_interface: HashMap<Interface, InterfaceTable> = HashMap::new();
        for table in tables {
            let interface = table.interface;
            if by_interface.insert(interface, table).is_some() {
                return Err(RegistryError::DuplicateInterface(interface));
            }
            order.push(interface);
        }
        for &interface in &order {
            if let Some(base) = by_interface.get(&interface).and_then(|t| t.base)
                && !by_interface.contains_key(&base)
            {
                return Err(RegistryError::UnknownBase { interface, base });
            }
        }

        let mut interner = Interner::default();
        for &interface in &order {
            let _ = interner.intern(interface.name());
        }

        let mut vtables = HashMap::with_capacity(order.len());
        for &interface in &order {
            // Base links were checked above, so every step finds a table.
            let mut chain: Vec<&InterfaceTable> = Vec::new();
            let mut current = by_interface.get(&interface);
            while let Some(table) = current {
                if chain.iter().any(|t| t.interface == table.interface) {
                    return Err(RegistryError::CyclicInheritance(interface));
                }
                chain.push(table);
                current = table.base.and_then(|base| by_interface.get(&base));
            }

            let mut members = HashMap::new();
            for table in &chain {
                for member in &table.members {
                    let selector = interner.intern(member.name);
                    if members.contains_key(&selector) {
                        if table.interface != interface {
                            warn_once(
                                Component::Bindings,
                                &format!(
                                    "{interface}.{} shadows the member inherited from {}",
                                    member.name, table.interface
                                ),
                            );
                        }
                        continue;
                    }
                    let _ = members.insert(selector, *member);
                }
            }

            let vtable = Vtable {
                interface,
                ancestry: chain.iter().map(|t| t.interface).collect(),
                members,
                indexed_getter: chain.iter().find_map(|t| t.indexed_getter),
                indexed_setter: chain.iter().find_map(|t| t.indexed_setter),
            };
            let _ = vtables.insert(interface, vtable);
        }

        Ok(Self {
            names: interner.names,
            selectors: interner.ids,
            vtables,
        })
    }

    /// The DOM interfaces this crate implements.
    ///
    /// # Panics
    ///
    /// Never in practice: the built-in tables form a valid hierarchy, which
    /// the unit tests check.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(tables::standard()).expect("built-in interface tables form a valid hierarchy")
    }

    /// The selector for a member or interface name.
    #[must_use]
    pub fn selector(&self, name: &str) -> Option<Selector> {
        self.selectors.get(name).copied()
    }

    /// The name a selector was assigned for.
    #[must_use]
    pub fn name(&self, selector: Selector) -> Option<&'static str> {
        usize::try_from(selector.0)
            .ok()
            .and_then(|index| self.names.get(index))
            .copied()
    }

    /// The flattened vtable of an interface.
    #[must_use]
    pub fn vtable(&self, interface: Interface) -> Option<&Vtable> {
        self.vtables.get(&interface)
    }

    /// Whether `interface` is `ancestor` or inherits from it.
    #[must_use]
    pub fn is_a(&self, interface: Interface, ancestor: Interface) -> bool {
        self.vtable(interface)
            .is_some_and(|vtable| vtable.implements(ancestor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nothing(_: &Scope<'_>, _: ObjectRef) -> BindingResult<Value> {
        Ok(Value::Undefined)
    }

    fn one(_: &Scope<'_>, _: ObjectRef) -> BindingResult<Value> {
        Ok(Value::Number(1.0))
    }

    #[test]
    fn test_duplicate_interface() {
        let tables = vec![
            InterfaceTable::new(Interface::Node, None),
            InterfaceTable::new(Interface::Node, None),
        ];
        assert_eq!(
            InterfaceRegistry::new(tables).unwrap_err(),
            RegistryError::DuplicateInterface(Interface::Node)
        );
    }

    #[test]
    fn test_unknown_base() {
        let tables = vec![InterfaceTable::new(Interface::Node, Some(Interface::EventTarget))];
        assert_eq!(
            InterfaceRegistry::new(tables).unwrap_err(),
            RegistryError::UnknownBase {
                interface: Interface::Node,
                base: Interface::EventTarget,
            }
        );
    }

    #[test]
    fn test_cyclic_inheritance() {
        let tables = vec![
            InterfaceTable::new(Interface::Node, Some(Interface::Element)),
            InterfaceTable::new(Interface::Element, Some(Interface::Node)),
        ];
        assert_eq!(
            InterfaceRegistry::new(tables).unwrap_err(),
            RegistryError::CyclicInheritance(Interface::Node)
        );
    }

    #[test]
    fn test_own_members_shadow_inherited_ones() {
        let tables = vec![
            InterfaceTable::new(Interface::Node, None)
                .with_members([Member::readonly("value", nothing), Member::readonly("base", nothing)]),
            InterfaceTable::new(Interface::Element, Some(Interface::Node))
                .with_members([Member::readonly("value", one)]),
        ];
        let registry = InterfaceRegistry::new(tables).unwrap();
        let vtable = registry.vtable(Interface::Element).unwrap();

        assert_eq!(vtable.ancestry(), &[Interface::Element, Interface::Node]);
        assert_eq!(vtable.len(), 2);
        let value = registry.selector("value").unwrap();
        assert!(matches!(
            vtable.member(value).and_then(|m| m.getter),
            Some(Getter::Native(get)) if get == one as NativeGetter
        ));
        assert!(registry.is_a(Interface::Element, Interface::Node));
        assert!(!registry.is_a(Interface::Node, Interface::Element));
    }

    #[test]
    fn test_selectors_are_stable() {
        let first = InterfaceRegistry::standard();
        let second = InterfaceRegistry::standard();
        for name in ["appendChild", "Node", "dispatchEvent", "href"] {
            let selector = first.selector(name).unwrap();
            assert_eq!(second.selector(name), Some(selector));
            assert_eq!(first.name(selector), Some(name));
        }
        assert_eq!(first.selector("Node"), Some(Selector(1)));
        assert_eq!(first.selector("noSuchMember"), None);
        assert_eq!(first.name(Selector(u32::MAX)), None);
    }

    #[test]
    fn test_standard_hierarchy() {
        let registry = InterfaceRegistry::standard();
        assert!(registry.is_a(Interface::HtmlAnchorElement, Interface::EventTarget));
        assert!(registry.is_a(Interface::Text, Interface::CharacterData));
        assert!(!registry.is_a(Interface::Event, Interface::EventTarget));
        let anchor = registry.vtable(Interface::HtmlAnchorElement).unwrap();
        assert_eq!(
            anchor.ancestry(),
            &[
                Interface::HtmlAnchorElement,
                Interface::HtmlElement,
                Interface::Element,
                Interface::Node,
                Interface::EventTarget,
            ]
        );
        assert!(anchor.indexed_getter().is_some());
        assert!(registry.vtable(Interface::Event).unwrap().indexed_getter().is_none());
    }
}
