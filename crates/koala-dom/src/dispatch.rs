//! The event dispatch algorithm.
//!
//! [§ 2.9 Dispatching events](https://dom.spec.whatwg.org/#dispatching-events)
//!
//! The propagation path is computed once, before any listener runs, and each
//! node's listener list is copied at the moment the walk reaches that node.
//! Listeners may therefore mutate the tree, add or remove listeners, and
//! dispatch other events without disturbing the walk in progress.

#[cfg(feature = "dispatch-trace")]
use std::cell::Cell;

use koala_common::warning::{Component, warn};

use crate::error::{DomError, DomResult, ListenerError};
use crate::event::{Event, EventPhase};
use crate::{DomTree, NodeId};

#[cfg(feature = "dispatch-trace")]
thread_local! {
    static DISPATCH_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// The first listener failure of a walk; later ones are only reported.
#[derive(Default)]
struct Failures {
    first: Option<ListenerError>,
}

impl Failures {
    fn record(&mut self, mut error: ListenerError, event_type: &str) {
        event_type.clone_into(&mut error.event_type);
        if self.first.is_some() {
            warn(Component::Events, &error.to_string());
        } else {
            self.first = Some(error);
        }
    }
}

impl DomTree {
    /// [§ 2.9](https://dom.spec.whatwg.org/#dom-eventtarget-dispatchevent)
    ///
    /// Dispatch `event` at `target`: capture listeners on each ancestor from
    /// the root down, every listener on the target, then (if the event
    /// bubbles) bubble listeners on each ancestor from the parent up.
    ///
    /// Returns `Ok(false)` if a listener canceled the event, `Ok(true)`
    /// otherwise.
    ///
    /// # Errors
    ///
    /// - `NoSuchNode` if `target` is not a live node.
    /// - `InvalidState` if the event is uninitialized, has an empty type, or
    ///   is already being dispatched.
    /// - `Listener` with the first listener failure, once the whole walk has
    ///   run. The event's flags remain readable by the caller.
    pub fn dispatch_event(&mut self, target: NodeId, event: &mut Event) -> DomResult<bool> {
        let _ = self.node(target)?;
        let path = self.event_path(target);
        self.dispatch_along(&path, target, event)
    }

    /// [§ 2.9](https://dom.spec.whatwg.org/#concept-event-path)
    ///
    /// The ancestors of `target`, root first. The target itself is not part
    /// of the returned list.
    #[must_use]
    pub fn event_path(&self, target: NodeId) -> Vec<NodeId> {
        let mut path: Vec<NodeId> = self.ancestors(target).collect();
        path.reverse();
        path
    }

    /// Walk a precomputed path. `path` holds the ancestors of `target`, root
    /// first; it need not match the current tree, which lets removal events
    /// use the path from before the node was unlinked.
    pub(crate) fn dispatch_along(
        &mut self,
        path: &[NodeId],
        target: NodeId,
        event: &mut Event,
    ) -> DomResult<bool> {
        // STEP 1: "If event's dispatch flag is set, or if its initialized
        //          flag is not set, then throw an InvalidStateError."
        if event.is_dispatching() {
            return Err(DomError::InvalidState("the event is already being dispatched"));
        }
        if !event.is_initialized() || event.event_type().is_empty() {
            return Err(DomError::InvalidState("the event is not initialized"));
        }

        #[cfg(feature = "dispatch-trace")]
        let depth = DISPATCH_DEPTH.with(|d| {
            let current = d.get();
            d.set(current + 1);
            current
        });
        #[cfg(feature = "dispatch-trace")]
        eprintln!(
            "{:indent$}[DISPATCH] '{}' at {target:?}, path {path:?}, bubbles={}",
            "",
            event.event_type(),
            event.bubbles(),
            indent = depth * 2
        );

        let mut failures = Failures::default();
        {
            let mut guard = event.begin_dispatch(target);
            let event = &mut *guard;

            // Capturing: root towards the target's parent.
            for &node in path {
                if event.propagation_stopped() {
                    break;
                }
                self.invoke(node, event, EventPhase::Capturing, &mut failures);
            }

            // At target: every listener, regardless of its capture flag.
            if !event.propagation_stopped() {
                self.invoke(target, event, EventPhase::AtTarget, &mut failures);
            }

            // Bubbling: the target's parent back up to the root.
            if event.bubbles() {
                for &node in path.iter().rev() {
                    if event.propagation_stopped() {
                        break;
                    }
                    self.invoke(node, event, EventPhase::Bubbling, &mut failures);
                }
            }
        }

        #[cfg(feature = "dispatch-trace")]
        {
            DISPATCH_DEPTH.with(|d| d.set(depth));
            eprintln!(
                "{:indent$}[DISPATCH] '{}' done, canceled={}",
                "",
                event.event_type(),
                event.default_prevented(),
                indent = depth * 2
            );
        }

        match failures.first {
            Some(error) => Err(error.into()),
            None => Ok(!event.default_prevented()),
        }
    }

    /// [§ 2.10](https://dom.spec.whatwg.org/#concept-event-listener-inner-invoke)
    ///
    /// Run the listeners of one node for one phase.
    fn invoke(
        &mut self,
        node: NodeId,
        event: &mut Event,
        phase: EventPhase,
        failures: &mut Failures,
    ) {
        // A listener may have released a node further along the path.
        let Some(listeners) = self
            .get(node)
            .map(|n| n.event_target.snapshot(event.event_type(), phase))
        else {
            return;
        };
        if listeners.is_empty() {
            return;
        }

        event.enter(node, phase);
        for entry in listeners {
            #[cfg(feature = "dispatch-trace")]
            eprintln!(
                "[DISPATCH]   {phase} {node:?} capture={} {:?}",
                entry.capture, entry.listener
            );

            if let Err(error) = entry.listener.call(self, event) {
                failures.record(error, event.event_type());
            }
            if event.immediate_propagation_stopped() {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::event::EventInit;
    use crate::event_target::EventListener;

    #[test]
    fn test_event_path_is_root_first() {
        let mut tree = DomTree::new();
        let html = tree.create_element(NodeId::ROOT, "html").unwrap();
        let body = tree.create_element(NodeId::ROOT, "body").unwrap();
        let _ = tree.append_child(NodeId::ROOT, html).unwrap();
        let _ = tree.append_child(html, body).unwrap();
        assert_eq!(tree.event_path(body), vec![NodeId::ROOT, html]);
        assert!(tree.event_path(NodeId::ROOT).is_empty());
    }

    #[test]
    fn test_dispatch_sets_current_target_and_phase() {
        let mut tree = DomTree::new();
        let div = tree.create_element(NodeId::ROOT, "div").unwrap();
        let _ = tree.append_child(NodeId::ROOT, div).unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        for (node, capture) in [(NodeId::ROOT, true), (div, false), (NodeId::ROOT, false)] {
            let seen = Rc::clone(&seen);
            tree.add_event_listener(
                node,
                "ping",
                EventListener::new(move |_, event| {
                    seen.borrow_mut()
                        .push((event.current_target(), event.event_phase()));
                    Ok(())
                }),
                capture,
            )
            .unwrap();
        }

        let mut event = Event::new(
            "ping",
            EventInit {
                bubbles: true,
                cancelable: false,
            },
        );
        assert!(tree.dispatch_event(div, &mut event).unwrap());
        assert_eq!(
            *seen.borrow(),
            vec![
                (Some(NodeId::ROOT), EventPhase::Capturing),
                (Some(div), EventPhase::AtTarget),
                (Some(NodeId::ROOT), EventPhase::Bubbling),
            ]
        );
        assert_eq!(event.target(), Some(div));
        assert_eq!(event.current_target(), None);
        assert_eq!(event.event_phase(), EventPhase::None);
    }

    #[test]
    fn test_failures_keep_first_and_fill_event_type() {
        let mut failures = Failures::default();
        failures.record(ListenerError::new("one"), "click");
        failures.record(ListenerError::new("two"), "click");
        let first = failures.first.unwrap();
        assert_eq!(first.message, "one");
        assert_eq!(first.event_type, "click");
    }
}
