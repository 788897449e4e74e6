//! Structural-mutation records, observers, and legacy mutation events.
//!
//! [§ 4.3 Mutation observers](https://dom.spec.whatwg.org/#mutation-observers)
//!
//! Every successful mutation produces a [`MutationRecord`] that is handed,
//! synchronously, to each registered observer. Observers only see the record;
//! they cannot reach the tree, which keeps them out of the mutation itself.
//!
//! The legacy `DOMNodeInserted` family is layered on top: events are queued
//! while a mutation runs and dispatched once it has committed, so their
//! listeners always see a consistent tree.

use std::fmt;

use koala_common::warning::{Component, warn};

use crate::error::{DomError, ListenerError};
use crate::event::{
    DOM_NODE_INSERTED, DOM_NODE_REMOVED, DOM_SUBTREE_MODIFIED, Event, MutationDetail,
};
use crate::{DomTree, NodeId};

/// [§ 4.3.5 Interface MutationRecord](https://dom.spec.whatwg.org/#interface-mutationrecord)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationRecord {
    /// Children were added to or removed from `target`.
    ChildList {
        /// The parent whose children changed.
        target: NodeId,
        /// Nodes inserted, in order.
        added: Vec<NodeId>,
        /// Nodes removed, in order.
        removed: Vec<NodeId>,
        /// The sibling before the changed range.
        previous_sibling: Option<NodeId>,
        /// The sibling after the changed range.
        next_sibling: Option<NodeId>,
    },
    /// An attribute of `target` was set or removed.
    Attributes {
        /// The element.
        target: NodeId,
        /// The attribute's local name (qualified name for null-namespace
        /// attributes).
        name: String,
        /// The attribute's namespace.
        namespace: Option<String>,
        /// The value before the change.
        old_value: Option<String>,
    },
    /// The data of a text or comment node changed.
    CharacterData {
        /// The text or comment node.
        target: NodeId,
        /// The data before the change.
        old_value: String,
    },
}

impl MutationRecord {
    /// The node the record is about.
    #[must_use]
    pub const fn target(&self) -> NodeId {
        match self {
            Self::ChildList { target, .. }
            | Self::Attributes { target, .. }
            | Self::CharacterData { target, .. } => *target,
        }
    }
}

/// Handle returned by [`DomTree::observe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type ObserverCallback = Box<dyn FnMut(&MutationRecord)>;

/// Registered observers, in registration order.
#[derive(Default)]
pub(crate) struct Observers {
    next_id: u64,
    callbacks: Vec<(ObserverId, ObserverCallback)>,
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("count", &self.callbacks.len())
            .finish()
    }
}

/// A mutation event waiting for its mutation to commit.
pub(crate) struct PendingEvent {
    target: NodeId,
    /// Path captured before the mutation, for nodes that are being unlinked.
    path: Option<Vec<NodeId>>,
    event: Event,
}

impl PendingEvent {
    /// Dispatch along the target's path as it is once the mutation commits.
    pub(crate) fn at(target: NodeId, event: Event) -> Self {
        Self {
            target,
            path: None,
            event,
        }
    }

    /// Dispatch along a path captured earlier.
    pub(crate) fn along(target: NodeId, path: Vec<NodeId>, event: Event) -> Self {
        Self {
            target,
            path: Some(path),
            event,
        }
    }
}

impl DomTree {
    /// Register a structural-mutation observer. It is called after every
    /// successful mutation, in registration order.
    pub fn observe(&mut self, callback: impl FnMut(&MutationRecord) + 'static) -> ObserverId {
        let id = ObserverId(self.observers.next_id);
        self.observers.next_id += 1;
        self.observers.callbacks.push((id, Box::new(callback)));
        id
    }

    /// Remove an observer. Returns whether it was registered.
    pub fn unobserve(&mut self, id: ObserverId) -> bool {
        let before = self.observers.callbacks.len();
        self.observers.callbacks.retain(|(existing, _)| *existing != id);
        self.observers.callbacks.len() != before
    }

    /// Drain listener failures raised by mutation events.
    ///
    /// Mutation events are fired by the tree, not by a `dispatch_event`
    /// caller, so their failures are kept here until someone asks.
    pub fn take_deferred_errors(&mut self) -> Vec<ListenerError> {
        std::mem::take(&mut self.deferred_errors)
    }

    pub(crate) fn notify(&mut self, record: &MutationRecord) {
        for (_, callback) in &mut self.observers.callbacks {
            callback(record);
        }
    }

    /// Whether a mutation event of `event_type` has anyone to hear it.
    pub(crate) fn wants_mutation_event(&self, event_type: &str) -> bool {
        self.options().mutation_events && self.has_listeners_for(event_type)
    }

    /// Queue `DOMNodeRemoved` for `node`, capturing its path while it is
    /// still attached to `parent`.
    pub(crate) fn queue_removed(
        &self,
        node: NodeId,
        parent: NodeId,
        pending: &mut Vec<PendingEvent>,
    ) {
        if self.wants_mutation_event(DOM_NODE_REMOVED) {
            let detail = MutationDetail {
                related_node: Some(parent),
                ..MutationDetail::default()
            };
            pending.push(PendingEvent::along(
                node,
                self.event_path(node),
                Event::mutation(DOM_NODE_REMOVED, true, detail),
            ));
        }
    }

    /// Queue `DOMNodeInserted` for `node`.
    pub(crate) fn queue_inserted(
        &self,
        node: NodeId,
        parent: NodeId,
        pending: &mut Vec<PendingEvent>,
    ) {
        if self.wants_mutation_event(DOM_NODE_INSERTED) {
            let detail = MutationDetail {
                related_node: Some(parent),
                ..MutationDetail::default()
            };
            pending.push(PendingEvent::at(
                node,
                Event::mutation(DOM_NODE_INSERTED, true, detail),
            ));
        }
    }

    /// Queue `DOMSubtreeModified` for `parent`.
    pub(crate) fn queue_subtree_modified(&self, parent: NodeId, pending: &mut Vec<PendingEvent>) {
        if self.wants_mutation_event(DOM_SUBTREE_MODIFIED) {
            pending.push(PendingEvent::at(
                parent,
                Event::mutation(DOM_SUBTREE_MODIFIED, true, MutationDetail::default()),
            ));
        }
    }

    /// Dispatch queued mutation events now that the mutation has committed.
    pub(crate) fn flush_mutation_events(&mut self, pending: Vec<PendingEvent>) {
        for PendingEvent {
            target,
            path,
            mut event,
        } in pending
        {
            // An earlier listener may have released the target.
            if !self.contains_node(target) {
                continue;
            }
            let path = path.unwrap_or_else(|| self.event_path(target));
            match self.dispatch_along(&path, target, &mut event) {
                Ok(_) => {}
                Err(DomError::Listener(error)) => {
                    warn(Component::Events, &error.to_string());
                    self.deferred_errors.push(error);
                }
                Err(error) => warn(Component::Events, &error.to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn test_observers_receive_records_until_unobserved() {
        let mut tree = DomTree::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let id = tree.observe(move |record| sink.borrow_mut().push(record.clone()));

        let div = tree.create_element(NodeId::ROOT, "div").unwrap();
        let _ = tree.append_child(NodeId::ROOT, div).unwrap();
        assert_eq!(
            seen.borrow().as_slice(),
            &[MutationRecord::ChildList {
                target: NodeId::ROOT,
                added: vec![div],
                removed: vec![],
                previous_sibling: None,
                next_sibling: None,
            }]
        );

        assert!(tree.unobserve(id));
        assert!(!tree.unobserve(id));
        tree.set_attribute(div, "id", "x").unwrap();
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_record_target() {
        let record = MutationRecord::CharacterData {
            target: NodeId(4),
            old_value: String::new(),
        };
        assert_eq!(record.target(), NodeId(4));
    }
}
