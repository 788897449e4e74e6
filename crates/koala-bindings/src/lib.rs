//! Reflection protocol between the Koala DOM and a scripting host.
//!
//! A host never calls tree methods directly. It addresses an object (a node
//! or an event) with a [`Selector`] naming a member and a [`CallMode`]
//! saying how the member is used, and gets a polymorphic [`Value`] back:
//!
//! ```text
//! invoke(object, selector, mode, args) -> Result<Value, BindingError>
//! ```
//!
//! # Design
//!
//! Each [`Interface`] publishes an [`InterfaceTable`] of the members it
//! declares and names its base interface. The [`InterfaceRegistry`] checks
//! those base links once and flattens every interface into a [`Vtable`], so
//! resolving a call is a single lookup keyed by the object's most-derived
//! interface. An unknown selector ends in `NotFound`; there is no forwarding
//! loop to run away.
//!
//! Events live in the [`BindingContext`]'s event store and are addressed by
//! [`EventHandle`]. While an event is being dispatched it is moved out of the
//! store: listeners made with [`BindingContext::listener`] reach it through
//! the [`Scope`] they are called with, and everyone else gets
//! `EventInFlight`.

pub mod context;
pub mod error;
pub mod interface;
pub mod registry;
mod tables;
pub mod value;

pub use context::{BindingContext, Scope};
pub use error::{BindingError, BindingResult, RegistryError};
pub use interface::{CallMode, Interface, Selector};
pub use registry::{
    Getter, IndexedGetter, IndexedSetter, InterfaceRegistry, InterfaceTable, Member, NativeGetter,
    NativeMethod, NativeSetter, Setter, Vtable,
};
pub use value::{EventHandle, ObjectRef, Value};
