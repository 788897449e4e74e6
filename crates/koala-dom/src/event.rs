//! The event object.
//!
//! [§ 2.2 Interface Event](https://dom.spec.whatwg.org/#interface-event)
//!
//! An [`Event`] is mutable until it is dispatched. While a dispatch is in
//! flight the per-walk state (target, current target, phase, stop flags) is
//! owned by a dispatch guard that restores the idle state when the walk
//! ends, so none of it is observable outside `dispatch_event`.

use std::ops::{Deref, DerefMut};
use std::time::{SystemTime, UNIX_EPOCH};

use strum_macros::Display;

use crate::NodeId;

/// Fired at a node after it has been inserted into a parent.
pub const DOM_NODE_INSERTED: &str = "DOMNodeInserted";
/// Fired at a node just before it is removed from its parent.
pub const DOM_NODE_REMOVED: &str = "DOMNodeRemoved";
/// Fired at a parent after its children changed.
pub const DOM_SUBTREE_MODIFIED: &str = "DOMSubtreeModified";
/// Fired at an element after one of its attributes changed.
pub const DOM_ATTR_MODIFIED: &str = "DOMAttrModified";
/// Fired at a text or comment node after its data changed.
pub const DOM_CHARACTER_DATA_MODIFIED: &str = "DOMCharacterDataModified";

/// [§ 2.2](https://dom.spec.whatwg.org/#dictdef-eventinit)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventInit {
    /// "bubbles"
    pub bubbles: bool,
    /// "cancelable"
    pub cancelable: bool,
}

/// [§ 2.2](https://dom.spec.whatwg.org/#dom-event-eventphase)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display)]
pub enum EventPhase {
    /// "NONE": the event is not being dispatched.
    #[default]
    #[strum(serialize = "none")]
    None,
    /// "CAPTURING_PHASE": walking from the root towards the target.
    #[strum(serialize = "capturing")]
    Capturing,
    /// "AT_TARGET": invoking listeners on the target itself.
    #[strum(serialize = "at-target")]
    AtTarget,
    /// "BUBBLING_PHASE": walking from the target's parent to the root.
    #[strum(serialize = "bubbling")]
    Bubbling,
}

impl EventPhase {
    /// The numeric `eventPhase` value scripts see.
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::None => 0,
            Self::Capturing => 1,
            Self::AtTarget => 2,
            Self::Bubbling => 3,
        }
    }
}

/// How an attribute changed, as reported by `DOMAttrModified`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum AttrChange {
    /// "MODIFICATION"
    Modification,
    /// "ADDITION"
    Addition,
    /// "REMOVAL"
    Removal,
}

impl AttrChange {
    /// The numeric `attrChange` value.
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::Modification => 1,
            Self::Addition => 2,
            Self::Removal => 3,
        }
    }
}

/// Payload of the legacy mutation events fired by the tree itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationDetail {
    /// The parent for insert/remove events.
    pub related_node: Option<NodeId>,
    /// The value before the change.
    pub prev_value: Option<String>,
    /// The value after the change.
    pub new_value: Option<String>,
    /// The attribute name for `DOMAttrModified`.
    pub attr_name: Option<String>,
    /// The kind of attribute change for `DOMAttrModified`.
    pub attr_change: Option<AttrChange>,
}

/// [§ 2.2 Interface Event](https://dom.spec.whatwg.org/#interface-event)
///
/// "An event allows for signaling that something has occurred."
#[derive(Debug)]
pub struct Event {
    event_type: String,
    bubbles: bool,
    cancelable: bool,
    target: Option<NodeId>,
    current_target: Option<NodeId>,
    phase: EventPhase,
    /// "stop propagation flag"
    stop_propagation: bool,
    /// "stop immediate propagation flag"
    stop_immediate: bool,
    /// "canceled flag"
    canceled: bool,
    trusted: bool,
    /// "initialized flag"
    initialized: bool,
    /// "dispatch flag"
    dispatching: bool,
    time_stamp: f64,
    mutation: Option<MutationDetail>,
}

fn now_millis() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0.0, |elapsed| elapsed.as_secs_f64() * 1000.0)
}

impl Event {
    /// [§ 2.2](https://dom.spec.whatwg.org/#dom-event-event)
    ///
    /// "The new Event(type, eventInitDict) constructor steps..." The event
    /// is initialized and ready to dispatch.
    #[must_use]
    pub fn new(event_type: &str, init: EventInit) -> Self {
        Self {
            event_type: event_type.to_string(),
            bubbles: init.bubbles,
            cancelable: init.cancelable,
            initialized: true,
            ..Self::uninitialized()
        }
    }

    /// [§ 4.5](https://dom.spec.whatwg.org/#dom-document-createevent)
    ///
    /// What `createEvent` hands out: an empty event whose initialized flag is
    /// unset. It cannot be dispatched until [`Event::init_event`] is called.
    #[must_use]
    pub fn uninitialized() -> Self {
        Self {
            event_type: String::new(),
            bubbles: false,
            cancelable: false,
            target: None,
            current_target: None,
            phase: EventPhase::None,
            stop_propagation: false,
            stop_immediate: false,
            canceled: false,
            trusted: false,
            initialized: false,
            dispatching: false,
            time_stamp: now_millis(),
            mutation: None,
        }
    }

    /// A trusted, non-cancelable mutation event.
    pub(crate) fn mutation(event_type: &str, bubbles: bool, detail: MutationDetail) -> Self {
        Self {
            trusted: true,
            mutation: Some(detail),
            ..Self::new(
                event_type,
                EventInit {
                    bubbles,
                    cancelable: false,
                },
            )
        }
    }

    /// [§ 2.2](https://dom.spec.whatwg.org/#dom-event-initevent)
    ///
    /// "1. If this's dispatch flag is set, then return."
    ///
    /// The initialized flag is set first, so re-initializing an in-flight
    /// event only marks it initialized and leaves everything else alone.
    pub fn init_event(&mut self, event_type: &str, bubbles: bool, cancelable: bool) {
        self.initialized = true;
        if self.dispatching {
            return;
        }
        self.stop_propagation = false;
        self.stop_immediate = false;
        self.canceled = false;
        self.trusted = false;
        self.target = None;
        self.event_type = event_type.to_string();
        self.bubbles = bubbles;
        self.cancelable = cancelable;
    }

    /// "type"
    #[must_use]
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// "bubbles"
    #[must_use]
    pub const fn bubbles(&self) -> bool {
        self.bubbles
    }

    /// "cancelable"
    #[must_use]
    pub const fn cancelable(&self) -> bool {
        self.cancelable
    }

    /// "target": set when a dispatch starts, kept after it ends.
    #[must_use]
    pub const fn target(&self) -> Option<NodeId> {
        self.target
    }

    /// "currentTarget": the node whose listeners are running, if any.
    #[must_use]
    pub const fn current_target(&self) -> Option<NodeId> {
        self.current_target
    }

    /// "eventPhase"
    #[must_use]
    pub const fn event_phase(&self) -> EventPhase {
        self.phase
    }

    /// "defaultPrevented"
    #[must_use]
    pub const fn default_prevented(&self) -> bool {
        self.canceled
    }

    /// "isTrusted": true only for events the tree fires itself.
    #[must_use]
    pub const fn is_trusted(&self) -> bool {
        self.trusted
    }

    /// Whether the initialized flag is set.
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Whether the event is currently being dispatched.
    #[must_use]
    pub const fn is_dispatching(&self) -> bool {
        self.dispatching
    }

    /// Whether `stop_propagation` was called during the current dispatch.
    #[must_use]
    pub const fn propagation_stopped(&self) -> bool {
        self.stop_propagation
    }

    /// Whether `stop_immediate_propagation` was called during the current
    /// dispatch.
    #[must_use]
    pub const fn immediate_propagation_stopped(&self) -> bool {
        self.stop_immediate
    }

    /// "timeStamp", in milliseconds since the Unix epoch.
    #[must_use]
    pub const fn time_stamp(&self) -> f64 {
        self.time_stamp
    }

    /// Detail carried by mutation events fired by the tree.
    #[must_use]
    pub const fn mutation_detail(&self) -> Option<&MutationDetail> {
        self.mutation.as_ref()
    }

    /// [§ 2.2](https://dom.spec.whatwg.org/#dom-event-preventdefault)
    ///
    /// "set the canceled flag if cancelable is true"
    pub const fn prevent_default(&mut self) {
        if self.cancelable {
            self.canceled = true;
        }
    }

    /// [§ 2.2](https://dom.spec.whatwg.org/#dom-event-stoppropagation)
    pub const fn stop_propagation(&mut self) {
        self.stop_propagation = true;
    }

    /// [§ 2.2](https://dom.spec.whatwg.org/#dom-event-stopimmediatepropagation)
    ///
    /// "set this's stop propagation flag and this's stop immediate
    /// propagation flag."
    pub const fn stop_immediate_propagation(&mut self) {
        self.stop_propagation = true;
        self.stop_immediate = true;
    }

    /// Mark the event in flight and hand the walk state to a guard.
    pub(crate) fn begin_dispatch(&mut self, target: NodeId) -> DispatchGuard<'_> {
        self.dispatching = true;
        self.target = Some(target);
        DispatchGuard { event: self }
    }

    pub(crate) const fn enter(&mut self, node: NodeId, phase: EventPhase) {
        self.current_target = Some(node);
        self.phase = phase;
    }
}

/// Owns an event for the duration of one dispatch walk.
///
/// Dropping the guard (including on unwind) returns the event to the idle
/// state: phase `None`, no current target, stop flags and dispatch flag
/// cleared. The target and canceled flag survive for the caller to inspect.
pub(crate) struct DispatchGuard<'a> {
    event: &'a mut Event,
}

impl Deref for DispatchGuard<'_> {
    type Target = Event;

    fn deref(&self) -> &Event {
        &*self.event
    }
}

impl DerefMut for DispatchGuard<'_> {
    fn deref_mut(&mut self) -> &mut Event {
        &mut *self.event
    }
}

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        self.event.phase = EventPhase::None;
        self.event.current_target = None;
        self.event.stop_propagation = false;
        self.event.stop_immediate = false;
        self.event.dispatching = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prevent_default_requires_cancelable() {
        let mut event = Event::new("click", EventInit::default());
        event.prevent_default();
        assert!(!event.default_prevented());

        let mut event = Event::new(
            "click",
            EventInit {
                bubbles: false,
                cancelable: true,
            },
        );
        event.prevent_default();
        assert!(event.default_prevented());
    }

    #[test]
    fn test_init_event_resets_flags_when_idle() {
        let mut event = Event::new(
            "a",
            EventInit {
                bubbles: false,
                cancelable: true,
            },
        );
        event.prevent_default();
        event.stop_immediate_propagation();
        event.init_event("b", true, false);
        assert_eq!(event.event_type(), "b");
        assert!(event.bubbles());
        assert!(!event.default_prevented());
        assert!(!event.propagation_stopped());
        assert!(!event.immediate_propagation_stopped());
    }

    #[test]
    fn test_init_event_is_noop_while_dispatching() {
        let mut event = Event::uninitialized();
        event.init_event("first", false, true);
        {
            let mut guard = event.begin_dispatch(NodeId(1));
            guard.enter(NodeId(1), EventPhase::AtTarget);
            guard.stop_propagation();
            guard.init_event("second", true, false);
            assert_eq!(guard.event_type(), "first");
            assert!(guard.propagation_stopped());
            assert_eq!(guard.event_phase(), EventPhase::AtTarget);
        }
        assert!(!event.is_dispatching());
        assert_eq!(event.event_phase(), EventPhase::None);
        assert_eq!(event.current_target(), None);
        assert_eq!(event.target(), Some(NodeId(1)));
        assert!(!event.propagation_stopped());
    }

    #[test]
    fn test_uninitialized_event() {
        let event = Event::uninitialized();
        assert!(!event.is_initialized());
        assert_eq!(event.event_type(), "");
        assert!(event.time_stamp() > 0.0);
    }

    #[test]
    fn test_phase_codes() {
        assert_eq!(EventPhase::None.code(), 0);
        assert_eq!(EventPhase::Bubbling.code(), 3);
        assert_eq!(EventPhase::AtTarget.to_string(), "at-target");
    }
}
