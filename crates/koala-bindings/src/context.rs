//! The binding context and the protocol entry point.
//!
//! A [`BindingContext`] owns the tree, the registry and the event store.
//! Member handlers and host listeners work through a [`Scope`], a borrowed
//! view of the same three. A scope built for a listener also holds the event
//! being dispatched, so the host can reach `preventDefault`, `currentTarget`
//! and the rest by selector while the walk is running.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::ptr;
use std::rc::Rc;
use std::str::FromStr;

use koala_dom::{DomTree, Event, EventListener, ListenerError, NodeId, NodeKind};

use crate::error::{BindingError, BindingResult};
use crate::interface::{CallMode, Interface, Selector};
use crate::registry::{Getter, InterfaceRegistry, Setter};
use crate::value::{Args, EventHandle, ObjectRef, Value};

/// Events created by the host, addressed by handle.
#[derive(Default)]
struct EventStore {
    events: HashMap<EventHandle, Event>,
    /// Taken out of `events` by a protocol dispatch.
    in_flight: HashSet<EventHandle>,
    next: u32,
    /// Protocol dispatches in progress, innermost last, with the address of
    /// the event each walk is running with.
    walks: Vec<(EventHandle, *const Event)>,
}

impl EventStore {
    fn allocate(&mut self) -> EventHandle {
        let handle = EventHandle(self.next);
        self.next += 1;
        handle
    }

    fn get(&self, handle: EventHandle) -> BindingResult<&Event> {
        if self.in_flight.contains(&handle) {
            return Err(BindingError::EventInFlight(handle));
        }
        self.events
            .get(&handle)
            .ok_or(BindingError::StaleObject(ObjectRef::Event(handle)))
    }

    fn get_mut(&mut self, handle: EventHandle) -> BindingResult<&mut Event> {
        if self.in_flight.contains(&handle) {
            return Err(BindingError::EventInFlight(handle));
        }
        self.events
            .get_mut(&handle)
            .ok_or(BindingError::StaleObject(ObjectRef::Event(handle)))
    }

    fn remove(&mut self, handle: EventHandle) -> BindingResult<Event> {
        if self.in_flight.contains(&handle) {
            return Err(BindingError::EventInFlight(handle));
        }
        self.events
            .remove(&handle)
            .ok_or(BindingError::StaleObject(ObjectRef::Event(handle)))
    }

    /// Move an event out of the store for the length of a dispatch.
    fn take(&mut self, handle: EventHandle) -> BindingResult<Event> {
        let event = self.remove(handle)?;
        let _ = self.in_flight.insert(handle);
        Ok(event)
    }

    fn restore(&mut self, handle: EventHandle, event: Event) {
        let _ = self.in_flight.remove(&handle);
        let _ = self.events.insert(handle, event);
    }

    /// The handle a listener should see for `event`: the protocol handle
    /// when the event was dispatched through `dispatchEvent`, otherwise a
    /// fresh one that is only valid while the listener runs.
    fn handle_for(&mut self, event: &Event) -> EventHandle {
        let walked = self
            .walks
            .iter()
            .rev()
            .find(|(_, address)| ptr::eq(*address, event))
            .map(|(handle, _)| *handle);
        walked.unwrap_or_else(|| self.allocate())
    }
}

/// Everything a scripting host talks to: the tree, the events it has
/// created, and the registry its selectors come from.
pub struct BindingContext {
    tree: DomTree,
    registry: Rc<InterfaceRegistry>,
    store: Rc<RefCell<EventStore>>,
}

impl BindingContext {
    /// Wrap a tree, using the standard interface tables.
    #[must_use]
    pub fn new(tree: DomTree) -> Self {
        Self::with_registry(tree, Rc::new(InterfaceRegistry::standard()))
    }

    /// Wrap a tree, resolving selectors against `registry`.
    #[must_use]
    pub fn with_registry(tree: DomTree, registry: Rc<InterfaceRegistry>) -> Self {
        Self {
            tree,
            registry,
            store: Rc::default(),
        }
    }

    /// The tree.
    #[must_use]
    pub const fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// The tree, mutably.
    pub const fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }

    /// Give up the context, keeping the tree.
    #[must_use]
    pub fn into_tree(self) -> DomTree {
        self.tree
    }

    /// The registry selectors are resolved against.
    #[must_use]
    pub fn registry(&self) -> &InterfaceRegistry {
        &self.registry
    }

    /// The initial document.
    #[must_use]
    pub const fn document(&self) -> ObjectRef {
        ObjectRef::Node(NodeId::ROOT)
    }

    /// A view of the context for running calls.
    pub fn scope(&mut self) -> Scope<'_> {
        Scope {
            tree: &mut self.tree,
            registry: &self.registry,
            store: &self.store,
            current: None,
        }
    }

    /// Take ownership of an event and return a handle scripts can use.
    pub fn create_event(&mut self, event: Event) -> EventHandle {
        self.scope().create_event(event)
    }

    /// Drop an event. Later calls on the handle fail with `StaleObject`.
    ///
    /// # Errors
    ///
    /// `EventInFlight` while the event is being dispatched.
    pub fn release_event(&mut self, handle: EventHandle) -> BindingResult<Event> {
        self.scope().release_event(handle)
    }

    /// Wrap a host callback as a listener for `addEventListener`.
    ///
    /// See [`Scope::listener`].
    pub fn listener(
        &self,
        callback: impl Fn(&mut Scope<'_>, ObjectRef) -> BindingResult<()> + 'static,
    ) -> EventListener {
        host_listener(&self.registry, &self.store, callback)
    }

    /// The most-derived interface an object implements.
    ///
    /// # Errors
    ///
    /// `StaleObject` for a released node or event, `EventInFlight` for an
    /// event that is being dispatched.
    pub fn interface_of(&mut self, object: ObjectRef) -> BindingResult<Interface> {
        self.scope().interface_of(object)
    }

    /// Invoke a member by name. See [`Scope::invoke_named`].
    ///
    /// # Errors
    ///
    /// As [`Scope::invoke`].
    pub fn invoke_named(
        &mut self,
        object: ObjectRef,
        name: &str,
        mode: CallMode,
        args: &[Value],
    ) -> BindingResult<Value> {
        self.scope().invoke_named(object, name, mode, args)
    }

    /// The protocol entry point. See [`Scope::invoke`].
    ///
    /// # Errors
    ///
    /// As [`Scope::invoke`].
    pub fn invoke(
        &mut self,
        object: ObjectRef,
        selector: Selector,
        mode: CallMode,
        args: &[Value],
    ) -> BindingResult<Value> {
        self.scope().invoke(object, selector, mode, args)
    }
}

fn host_listener(
    registry: &Rc<InterfaceRegistry>,
    store: &Rc<RefCell<EventStore>>,
    callback: impl Fn(&mut Scope<'_>, ObjectRef) -> BindingResult<()> + 'static,
) -> EventListener {
    let registry = Rc::clone(registry);
    let store = Rc::clone(store);
    EventListener::new(move |tree, event| {
        let handle = store.borrow_mut().handle_for(event);
        let mut scope = Scope {
            tree,
            registry: &registry,
            store: &store,
            current: Some((handle, event)),
        };
        callback(&mut scope, ObjectRef::Event(handle))
            .map_err(|error| ListenerError::new(error.to_string()))
    })
}

/// A borrowed view of a [`BindingContext`]: what member handlers and host
/// listeners run against.
///
/// Inside a listener the scope also holds the event being dispatched, which
/// is reachable through its handle until the listener returns.
pub struct Scope<'a> {
    tree: &'a mut DomTree,
    registry: &'a Rc<InterfaceRegistry>,
    store: &'a Rc<RefCell<EventStore>>,
    current: Option<(EventHandle, &'a mut Event)>,
}

impl Scope<'_> {
    /// The tree.
    #[must_use]
    pub fn tree(&self) -> &DomTree {
        self.tree
    }

    /// The tree, mutably.
    pub fn tree_mut(&mut self) -> &mut DomTree {
        self.tree
    }

    /// The registry selectors are resolved against.
    #[must_use]
    pub fn registry(&self) -> &InterfaceRegistry {
        self.registry
    }

    /// The initial document.
    #[must_use]
    pub const fn document(&self) -> ObjectRef {
        ObjectRef::Node(NodeId::ROOT)
    }

    /// The event this scope's listener was handed, if any.
    #[must_use]
    pub fn current_event(&self) -> Option<ObjectRef> {
        self.current
            .as_ref()
            .map(|(handle, _)| ObjectRef::Event(*handle))
    }

    /// Take ownership of an event and return a handle scripts can use.
    pub fn create_event(&mut self, event: Event) -> EventHandle {
        let mut store = self.store.borrow_mut();
        let handle = store.allocate();
        let _ = store.events.insert(handle, event);
        handle
    }

    /// Drop an event. Later calls on the handle fail with `StaleObject`.
    ///
    /// # Errors
    ///
    /// `EventInFlight` while the event is being dispatched.
    pub fn release_event(&mut self, handle: EventHandle) -> BindingResult<Event> {
        if self.is_current(handle) {
            return Err(BindingError::EventInFlight(handle));
        }
        self.store.borrow_mut().remove(handle)
    }

    /// Wrap a host callback as a listener for `addEventListener`.
    ///
    /// The callback gets a scope over the same tree and event store, and the
    /// event it was handed as an [`ObjectRef`]. An error it returns becomes
    /// the listener's failure.
    pub fn listener(
        &self,
        callback: impl Fn(&mut Scope<'_>, ObjectRef) -> BindingResult<()> + 'static,
    ) -> EventListener {
        host_listener(self.registry, self.store, callback)
    }

    fn is_current(&self, handle: EventHandle) -> bool {
        self.current
            .as_ref()
            .is_some_and(|(current, _)| *current == handle)
    }

    /// The live node an object refers to.
    pub(crate) fn node(&self, object: ObjectRef) -> BindingResult<NodeId> {
        match object {
            ObjectRef::Node(id) if self.tree.contains_node(id) => Ok(id),
            _ => Err(BindingError::StaleObject(object)),
        }
    }

    /// Read the event an object refers to.
    pub(crate) fn with_event<R>(
        &self,
        object: ObjectRef,
        read: impl FnOnce(&Event) -> R,
    ) -> BindingResult<R> {
        let handle = object.event().ok_or(BindingError::StaleObject(object))?;
        if let Some((current, event)) = &self.current
            && *current == handle
        {
            return Ok(read(event));
        }
        self.store.borrow().get(handle).map(read)
    }

    /// Update the event an object refers to.
    pub(crate) fn with_event_mut<R>(
        &mut self,
        object: ObjectRef,
        update: impl FnOnce(&mut Event) -> R,
    ) -> BindingResult<R> {
        let handle = object.event().ok_or(BindingError::StaleObject(object))?;
        if let Some((current, event)) = &mut self.current
            && *current == handle
        {
            return Ok(update(event));
        }
        self.store.borrow_mut().get_mut(handle).map(update)
    }

    /// Dispatch a stored event at `target`.
    ///
    /// The event leaves the store until the walk ends and is put back even
    /// when a listener failed. Host listeners reach it through its handle.
    pub(crate) fn dispatch(&mut self, target: NodeId, handle: EventHandle) -> BindingResult<bool> {
        if self.is_current(handle) {
            return Err(BindingError::EventInFlight(handle));
        }
        let mut event = self.store.borrow_mut().take(handle)?;
        self.store
            .borrow_mut()
            .walks
            .push((handle, ptr::from_ref(&event)));

        let result = self.tree.dispatch_event(target, &mut event);

        let mut store = self.store.borrow_mut();
        let _ = store.walks.pop();
        store.restore(handle, event);
        Ok(result?)
    }

    /// The most-derived interface an object implements.
    ///
    /// # Errors
    ///
    /// `StaleObject` for a released node or event, `EventInFlight` for an
    /// event that is being dispatched outside this scope.
    pub fn interface_of(&self, object: ObjectRef) -> BindingResult<Interface> {
        match object {
            ObjectRef::Node(id) => {
                let node = self.tree.get(id).ok_or(BindingError::StaleObject(object))?;
                Ok(match node.kind() {
                    NodeKind::Document => Interface::Document,
                    NodeKind::DocumentType => Interface::DocumentType,
                    NodeKind::Text => Interface::Text,
                    NodeKind::Comment => Interface::Comment,
                    NodeKind::Element => node
                        .as_element()
                        .map_or(Interface::Element, |data| Interface::for_element(data.kind())),
                })
            }
            ObjectRef::Event(_) => self.with_event(object, |_| Interface::Event),
        }
    }

    /// Invoke a member by name.
    ///
    /// For `InstanceOf` calls `name` is the interface being tested for.
    ///
    /// # Errors
    ///
    /// As [`Self::invoke`]; a name the registry never assigned a selector to
    /// is `NotFound`. Indexed modes ignore `name`.
    pub fn invoke_named(
        &mut self,
        object: ObjectRef,
        name: &str,
        mode: CallMode,
        args: &[Value],
    ) -> BindingResult<Value> {
        if mode.is_indexed() {
            let interface = self.interface_of(object)?;
            return self.invoke_indexed(object, interface, mode, args);
        }
        match self.registry.selector(name) {
            Some(selector) => self.invoke(object, selector, mode, args),
            None => Err(BindingError::NotFound {
                interface: self.interface_of(object)?,
                member: name.to_string(),
            }),
        }
    }

    /// The protocol entry point.
    ///
    /// Resolves `selector` against the flattened vtable of the object's
    /// most-derived interface and runs the handler for `mode`. Indexed modes
    /// ignore the selector and take the index as their first argument;
    /// setters take the new value as their first argument.
    ///
    /// # Errors
    ///
    /// - `NotFound` when no interface in the object's ancestry declares the
    ///   selector.
    /// - `ModeMismatch` when the member exists but has no handler for `mode`.
    /// - `StaleObject` / `EventInFlight` when the object cannot be used.
    /// - Argument and DOM errors raised by the member itself.
    pub fn invoke(
        &mut self,
        object: ObjectRef,
        selector: Selector,
        mode: CallMode,
        args: &[Value],
    ) -> BindingResult<Value> {
        let interface = self.interface_of(object)?;
        let registry = Rc::clone(self.registry);
        let not_found = || BindingError::NotFound {
            interface,
            member: registry
                .name(selector)
                .map_or_else(|| selector.to_string(), str::to_string),
        };

        if mode == CallMode::InstanceOf {
            let tested = registry
                .name(selector)
                .and_then(|name| Interface::from_str(name).ok())
                .ok_or_else(not_found)?;
            return Ok(Value::Bool(registry.is_a(interface, tested)));
        }

        if mode.is_indexed() {
            return self.invoke_indexed(object, interface, mode, args);
        }

        let vtable = registry.vtable(interface).ok_or_else(not_found)?;
        let mismatch = |member: &str| BindingError::ModeMismatch {
            interface,
            member: member.to_string(),
            mode,
        };

        let member = *vtable.member(selector).ok_or_else(not_found)?;
        match mode {
            CallMode::Getter => match member.getter.ok_or_else(|| mismatch(member.name))? {
                Getter::Native(get) => get(self, object),
                Getter::Reflect(attribute) => {
                    let element = self.node(object)?;
                    Ok(Value::from(
                        self.tree.get_attribute(element, attribute).unwrap_or_default(),
                    ))
                }
                Getter::ReflectBool(attribute) => {
                    let element = self.node(object)?;
                    Ok(Value::Bool(self.tree.has_attribute(element, attribute)))
                }
            },
            CallMode::Setter => {
                let setter = member.setter.ok_or_else(|| mismatch(member.name))?;
                let value = Args::new(member.name, args).get(0)?;
                match setter {
                    Setter::Native(set) => set(self, object, value)?,
                    Setter::Reflect(attribute) => {
                        let element = self.node(object)?;
                        let text = Args::new(member.name, args).string(0)?;
                        self.tree.set_attribute(element, attribute, &text)?;
                    }
                    Setter::ReflectBool(attribute) => {
                        let element = self.node(object)?;
                        let _ = self
                            .tree
                            .toggle_attribute(element, attribute, Some(value.truthy()))?;
                    }
                }
                Ok(Value::Undefined)
            }
            CallMode::Method => {
                let call = member.method.ok_or_else(|| mismatch(member.name))?;
                call(self, object, args)
            }
            CallMode::IndexedGetter | CallMode::IndexedSetter | CallMode::InstanceOf => {
                Err(mismatch(member.name))
            }
        }
    }

    /// Indexed getter and setter calls. The index is the first argument and
    /// the setter's value the second.
    fn invoke_indexed(
        &mut self,
        object: ObjectRef,
        interface: Interface,
        mode: CallMode,
        args: &[Value],
    ) -> BindingResult<Value> {
        let registry = Rc::clone(self.registry);
        let mismatch = || BindingError::ModeMismatch {
            interface,
            member: "[index]".to_string(),
            mode,
        };
        let vtable = registry.vtable(interface).ok_or_else(mismatch)?;
        let args = Args::new("[index]", args);
        let index = args.index(0)?;
        if mode == CallMode::IndexedGetter {
            let get = vtable.indexed_getter().ok_or_else(mismatch)?;
            get(self, object, index)
        } else {
            let set = vtable.indexed_setter().ok_or_else(mismatch)?;
            set(self, object, index, args.get(1)?).map(|()| Value::Undefined)
        }
    }
}
