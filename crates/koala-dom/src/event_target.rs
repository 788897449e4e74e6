//! Listener registration.
//!
//! [§ 2.7 Interface EventTarget](https://dom.spec.whatwg.org/#interface-eventtarget)
//!
//! "Each EventTarget object has an associated event listener list (a list
//! of zero or more event listeners). It is initially the empty list."

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::error::{DomResult, ListenerError};
use crate::event::{Event, EventPhase};
use crate::{DomTree, NodeId};

/// What a listener returns: `Err` marks a failed invocation. The walk keeps
/// going either way.
pub type ListenerResult = Result<(), ListenerError>;

/// [§ 2.7](https://dom.spec.whatwg.org/#callbackdef-eventlistener)
///
/// A shared callback. Two `EventListener`s are the same listener when they
/// are clones of one another.
#[derive(Clone)]
pub struct EventListener(Rc<dyn Fn(&mut DomTree, &mut Event) -> ListenerResult>);

impl EventListener {
    /// Wrap a callback.
    pub fn new(callback: impl Fn(&mut DomTree, &mut Event) -> ListenerResult + 'static) -> Self {
        Self(Rc::new(callback))
    }

    pub(crate) fn call(&self, tree: &mut DomTree, event: &mut Event) -> ListenerResult {
        (self.0)(tree, event)
    }
}

impl PartialEq for EventListener {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for EventListener {}

impl fmt::Debug for EventListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventListener({:p})", Rc::as_ptr(&self.0).cast::<()>())
    }
}

/// One registration: "an event listener is a struct" of type, callback and
/// capture. The type is the key of the list it lives in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerEntry {
    /// The callback.
    pub listener: EventListener,
    /// Registered for the capturing phase.
    pub capture: bool,
}

impl ListenerEntry {
    /// Whether this registration runs when a node is visited in `phase`.
    ///
    /// At the target every registration runs, whatever its capture flag.
    #[must_use]
    pub const fn runs_in(&self, phase: EventPhase) -> bool {
        match phase {
            EventPhase::Capturing => self.capture,
            EventPhase::Bubbling => !self.capture,
            EventPhase::AtTarget => true,
            EventPhase::None => false,
        }
    }
}

/// The per-node listener registry.
#[derive(Debug, Default)]
pub(crate) struct EventTarget {
    listeners: HashMap<String, Vec<ListenerEntry>>,
}

impl EventTarget {
    /// Append a registration unless the same (type, listener, capture) is
    /// already present. Returns whether it was added.
    pub(crate) fn add(&mut self, event_type: &str, listener: EventListener, capture: bool) -> bool {
        let entries = self.listeners.entry(event_type.to_string()).or_default();
        let entry = ListenerEntry { listener, capture };
        if entries.contains(&entry) {
            return false;
        }
        entries.push(entry);
        true
    }

    /// Remove the exact (type, listener, capture) registration. Returns
    /// whether one was removed.
    pub(crate) fn remove(&mut self, event_type: &str, listener: &EventListener, capture: bool) -> bool {
        let Some(entries) = self.listeners.get_mut(event_type) else {
            return false;
        };
        let Some(index) = entries
            .iter()
            .position(|entry| &entry.listener == listener && entry.capture == capture)
        else {
            return false;
        };
        let _ = entries.remove(index);
        if entries.is_empty() {
            let _ = self.listeners.remove(event_type);
        }
        true
    }

    /// A stable copy of the registrations of `event_type` that run in
    /// `phase`, in registration order.
    pub(crate) fn snapshot(&self, event_type: &str, phase: EventPhase) -> Vec<ListenerEntry> {
        self.listeners
            .get(event_type)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|entry| entry.runs_in(phase))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// All registrations of `event_type`, in registration order.
    pub(crate) fn entries(&self, event_type: &str) -> &[ListenerEntry] {
        self.listeners.get(event_type).map_or(&[], Vec::as_slice)
    }

    /// Registration counts per type.
    pub(crate) fn counts(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.listeners
            .iter()
            .map(|(event_type, entries)| (event_type.as_str(), entries.len()))
    }
}

impl DomTree {
    /// [§ 2.7](https://dom.spec.whatwg.org/#dom-eventtarget-addeventlistener)
    ///
    /// "If eventTarget's event listener list does not contain an event
    /// listener whose type is listener's type, callback is listener's
    /// callback, and capture is listener's capture, then append listener to
    /// eventTarget's event listener list."
    ///
    /// # Errors
    ///
    /// `NoSuchNode` if `target` is not a live node.
    pub fn add_event_listener(
        &mut self,
        target: NodeId,
        event_type: &str,
        listener: EventListener,
        capture: bool,
    ) -> DomResult<()> {
        let added = self
            .node_mut(target)?
            .event_target
            .add(event_type, listener, capture);
        if added {
            *self
                .listener_types
                .entry(event_type.to_string())
                .or_default() += 1;
        }
        Ok(())
    }

    /// [§ 2.7](https://dom.spec.whatwg.org/#dom-eventtarget-removeeventlistener)
    ///
    /// Removing a registration that does not exist is a no-op.
    ///
    /// # Errors
    ///
    /// `NoSuchNode` if `target` is not a live node.
    pub fn remove_event_listener(
        &mut self,
        target: NodeId,
        event_type: &str,
        listener: &EventListener,
        capture: bool,
    ) -> DomResult<()> {
        let removed = self
            .node_mut(target)?
            .event_target
            .remove(event_type, listener, capture);
        if removed {
            self.forget_listeners(event_type, 1);
        }
        Ok(())
    }

    /// The registrations of `event_type` on `target`, in registration order.
    #[must_use]
    pub fn event_listeners(&self, target: NodeId, event_type: &str) -> Vec<ListenerEntry> {
        self.get(target)
            .map(|node| node.event_target.entries(event_type).to_vec())
            .unwrap_or_default()
    }

    /// Whether any node of this arena has a listener for `event_type`.
    #[must_use]
    pub fn has_listeners_for(&self, event_type: &str) -> bool {
        self.listener_types.get(event_type).is_some_and(|&n| n > 0)
    }

    pub(crate) fn forget_listeners(&mut self, event_type: &str, count: usize) {
        if let Some(n) = self.listener_types.get_mut(event_type) {
            *n = n.saturating_sub(count);
            if *n == 0 {
                let _ = self.listener_types.remove(event_type);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> EventListener {
        EventListener::new(|_, _| Ok(()))
    }

    #[test]
    fn test_add_is_idempotent_per_capture_flag() {
        let mut target = EventTarget::default();
        let listener = noop();
        assert!(target.add("click", listener.clone(), false));
        assert!(!target.add("click", listener.clone(), false));
        assert!(target.add("click", listener.clone(), true));
        assert_eq!(target.entries("click").len(), 2);
    }

    #[test]
    fn test_remove_matches_exact_registration() {
        let mut target = EventTarget::default();
        let listener = noop();
        let other = noop();
        assert!(target.add("click", listener.clone(), true));
        assert!(!target.remove("click", &listener, false));
        assert!(!target.remove("click", &other, true));
        assert!(target.remove("click", &listener, true));
        assert!(target.entries("click").is_empty());
        assert_eq!(target.counts().count(), 0);
    }

    #[test]
    fn test_snapshot_filters_by_phase() {
        let mut target = EventTarget::default();
        let capture = noop();
        let bubble = noop();
        assert!(target.add("x", bubble.clone(), false));
        assert!(target.add("x", capture.clone(), true));

        let at_target = target.snapshot("x", EventPhase::AtTarget);
        assert_eq!(at_target.len(), 2);
        assert_eq!(at_target[0].listener, bubble);

        let capturing = target.snapshot("x", EventPhase::Capturing);
        assert_eq!(capturing.len(), 1);
        assert_eq!(capturing[0].listener, capture);

        let bubbling = target.snapshot("x", EventPhase::Bubbling);
        assert_eq!(bubbling.len(), 1);
        assert_eq!(bubbling[0].listener, bubble);
    }

    #[test]
    fn test_clones_are_the_same_listener() {
        let a = noop();
        let b = a.clone();
        assert_eq!(a, b);
        assert_ne!(a, noop());
    }
}
