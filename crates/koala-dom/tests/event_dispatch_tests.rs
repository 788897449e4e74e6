//! Tests for event dispatch: listener ordering across the capture, target and
//! bubble phases, propagation control, cancellation, and listener changes made
//! while an event is in flight.

use std::cell::RefCell;
use std::rc::Rc;

use koala_dom::{
    DomError, DomTree, Event, EventInit, EventListener, EventPhase, ListenerError, NodeId,
};

type Log = Rc<RefCell<Vec<String>>>;

fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

/// A listener that appends `label` to `log`.
fn record(log: &Log, label: &str) -> EventListener {
    let log = Rc::clone(log);
    let label = label.to_string();
    EventListener::new(move |_, _| {
        log.borrow_mut().push(label.clone());
        Ok(())
    })
}

/// Document > div > button, with the div as document element.
struct Scene {
    tree: DomTree,
    div: NodeId,
    button: NodeId,
}

fn scene() -> Scene {
    let mut tree = DomTree::new();
    let div = tree.create_element(NodeId::ROOT, "div").unwrap();
    let button = tree.create_element(NodeId::ROOT, "button").unwrap();
    let _ = tree.append_child(NodeId::ROOT, div).unwrap();
    let _ = tree.append_child(div, button).unwrap();
    Scene { tree, div, button }
}

fn click() -> Event {
    Event::new(
        "click",
        EventInit {
            bubbles: true,
            cancelable: true,
        },
    )
}

/// The capture listener on the document, two target listeners on the
/// button, and a bubble listener on the div.
fn standard_listeners(scene: &mut Scene, log: &Log, first_target: EventListener) {
    let Scene { tree, div, button } = scene;
    tree.add_event_listener(NodeId::ROOT, "click", record(log, "A-capture"), true)
        .unwrap();
    tree.add_event_listener(*button, "click", first_target, false)
        .unwrap();
    tree.add_event_listener(*button, "click", record(log, "C-target2"), true)
        .unwrap();
    tree.add_event_listener(*div, "click", record(log, "B-bubble"), false)
        .unwrap();
}

// ========== ordering ==========

#[test]
fn test_capture_target_bubble_order() {
    let mut scene = scene();
    let log = new_log();
    let first = record(&log, "C-target1");
    standard_listeners(&mut scene, &log, first);

    let mut event = click();
    let result = scene.tree.dispatch_event(scene.button, &mut event);

    assert_eq!(result, Ok(true));
    assert_eq!(
        *log.borrow(),
        vec!["A-capture", "C-target1", "C-target2", "B-bubble"]
    );
}

#[test]
fn test_phases_and_current_target_seen_by_listeners() {
    let mut scene = scene();
    let seen = Rc::new(RefCell::new(Vec::new()));
    for (node, capture) in [
        (NodeId::ROOT, true),
        (scene.div, true),
        (scene.button, false),
        (scene.div, false),
        (NodeId::ROOT, false),
    ] {
        let sink = Rc::clone(&seen);
        scene
            .tree
            .add_event_listener(
                node,
                "click",
                EventListener::new(move |_, event| {
                    sink.borrow_mut().push((
                        event.current_target(),
                        event.event_phase(),
                        event.target(),
                    ));
                    Ok(())
                }),
                capture,
            )
            .unwrap();
    }

    let mut event = click();
    let _ = scene.tree.dispatch_event(scene.button, &mut event).unwrap();

    let target = Some(scene.button);
    assert_eq!(
        *seen.borrow(),
        vec![
            (Some(NodeId::ROOT), EventPhase::Capturing, target),
            (Some(scene.div), EventPhase::Capturing, target),
            (Some(scene.button), EventPhase::AtTarget, target),
            (Some(scene.div), EventPhase::Bubbling, target),
            (Some(NodeId::ROOT), EventPhase::Bubbling, target),
        ]
    );
}

#[test]
fn test_non_bubbling_event_skips_bubble_phase() {
    let mut scene = scene();
    let log = new_log();
    let first = record(&log, "C-target1");
    standard_listeners(&mut scene, &log, first);

    let mut event = Event::new("click", EventInit::default());
    let _ = scene.tree.dispatch_event(scene.button, &mut event).unwrap();

    assert_eq!(*log.borrow(), vec!["A-capture", "C-target1", "C-target2"]);
}

#[test]
fn test_capture_and_bubble_registrations_are_distinct() {
    let mut scene = scene();
    let log = new_log();
    let listener = record(&log, "div");
    scene
        .tree
        .add_event_listener(scene.div, "click", listener.clone(), true)
        .unwrap();
    scene
        .tree
        .add_event_listener(scene.div, "click", listener.clone(), false)
        .unwrap();
    // Registering the same tuple again is a no-op.
    scene
        .tree
        .add_event_listener(scene.div, "click", listener.clone(), false)
        .unwrap();
    assert_eq!(scene.tree.event_listeners(scene.div, "click").len(), 2);

    let mut event = click();
    let _ = scene.tree.dispatch_event(scene.button, &mut event).unwrap();
    assert_eq!(*log.borrow(), vec!["div", "div"]);

    scene
        .tree
        .remove_event_listener(scene.div, "click", &listener, true)
        .unwrap();
    let entries = scene.tree.event_listeners(scene.div, "click");
    assert_eq!(entries.len(), 1);
    assert!(!entries[0].capture);
}

#[test]
fn test_other_event_types_are_ignored() {
    let mut scene = scene();
    let log = new_log();
    scene
        .tree
        .add_event_listener(scene.button, "input", record(&log, "input"), false)
        .unwrap();
    let mut event = click();
    assert_eq!(scene.tree.dispatch_event(scene.button, &mut event), Ok(true));
    assert!(log.borrow().is_empty());
}

// ========== propagation control ==========

#[test]
fn test_stop_immediate_propagation() {
    let mut scene = scene();
    let log = new_log();
    let sink = Rc::clone(&log);
    let first = EventListener::new(move |_, event| {
        sink.borrow_mut().push("C-target1".to_string());
        event.stop_immediate_propagation();
        Ok(())
    });
    standard_listeners(&mut scene, &log, first);

    let mut event = click();
    let _ = scene.tree.dispatch_event(scene.button, &mut event).unwrap();

    assert_eq!(*log.borrow(), vec!["A-capture", "C-target1"]);
}

#[test]
fn test_stop_propagation_finishes_current_node() {
    let mut scene = scene();
    let log = new_log();
    let sink = Rc::clone(&log);
    let first = EventListener::new(move |_, event| {
        sink.borrow_mut().push("C-target1".to_string());
        event.stop_propagation();
        Ok(())
    });
    standard_listeners(&mut scene, &log, first);

    let mut event = click();
    let _ = scene.tree.dispatch_event(scene.button, &mut event).unwrap();

    assert_eq!(*log.borrow(), vec!["A-capture", "C-target1", "C-target2"]);
}

#[test]
fn test_stop_propagation_during_capture_skips_target() {
    let mut scene = scene();
    let log = new_log();
    scene
        .tree
        .add_event_listener(
            NodeId::ROOT,
            "click",
            EventListener::new(|_, event| {
                event.stop_propagation();
                Ok(())
            }),
            true,
        )
        .unwrap();
    scene
        .tree
        .add_event_listener(NodeId::ROOT, "click", record(&log, "A-capture2"), true)
        .unwrap();
    scene
        .tree
        .add_event_listener(scene.button, "click", record(&log, "C-target"), false)
        .unwrap();

    let mut event = click();
    let _ = scene.tree.dispatch_event(scene.button, &mut event).unwrap();
    assert_eq!(*log.borrow(), vec!["A-capture2"]);
}

#[test]
fn test_flags_are_reset_after_dispatch() {
    let mut scene = scene();
    scene
        .tree
        .add_event_listener(
            scene.button,
            "click",
            EventListener::new(|_, event| {
                event.stop_immediate_propagation();
                Ok(())
            }),
            false,
        )
        .unwrap();

    let mut event = click();
    let _ = scene.tree.dispatch_event(scene.button, &mut event).unwrap();

    assert_eq!(event.event_phase(), EventPhase::None);
    assert_eq!(event.current_target(), None);
    assert_eq!(event.target(), Some(scene.button));
    assert!(!event.is_dispatching());
    assert!(!event.propagation_stopped());
    assert!(!event.immediate_propagation_stopped());

    // The same event object can be dispatched again.
    assert_eq!(scene.tree.dispatch_event(scene.div, &mut event), Ok(true));
    assert_eq!(event.target(), Some(scene.div));
}

// ========== cancellation ==========

#[test]
fn test_prevent_default_on_cancelable_event() {
    let mut scene = scene();
    scene
        .tree
        .add_event_listener(
            scene.div,
            "click",
            EventListener::new(|_, event| {
                event.prevent_default();
                Ok(())
            }),
            false,
        )
        .unwrap();

    let mut event = click();
    assert_eq!(scene.tree.dispatch_event(scene.button, &mut event), Ok(false));
    assert!(event.default_prevented());
}

#[test]
fn test_prevent_default_on_non_cancelable_event() {
    let mut scene = scene();
    scene
        .tree
        .add_event_listener(
            scene.div,
            "click",
            EventListener::new(|_, event| {
                event.prevent_default();
                Ok(())
            }),
            false,
        )
        .unwrap();

    let mut event = Event::new(
        "click",
        EventInit {
            bubbles: true,
            cancelable: false,
        },
    );
    assert_eq!(scene.tree.dispatch_event(scene.button, &mut event), Ok(true));
    assert!(!event.default_prevented());
}

#[test]
fn test_no_listeners_returns_true() {
    let mut scene = scene();
    let mut event = click();
    assert_eq!(scene.tree.dispatch_event(scene.button, &mut event), Ok(true));
}

// ========== invalid dispatch ==========

#[test]
fn test_uninitialized_event_is_rejected() {
    let mut scene = scene();
    let log = new_log();
    scene
        .tree
        .add_event_listener(scene.button, "click", record(&log, "ran"), false)
        .unwrap();

    let mut event = Event::uninitialized();
    assert!(matches!(
        scene.tree.dispatch_event(scene.button, &mut event),
        Err(DomError::InvalidState(_))
    ));
    assert!(log.borrow().is_empty());

    event.init_event("click", true, true);
    assert_eq!(scene.tree.dispatch_event(scene.button, &mut event), Ok(true));
    assert_eq!(*log.borrow(), vec!["ran"]);
}

#[test]
fn test_empty_type_is_rejected() {
    let mut scene = scene();
    let mut event = Event::new("", EventInit::default());
    let err = scene
        .tree
        .dispatch_event(scene.button, &mut event)
        .unwrap_err();
    assert_eq!(err.name(), "InvalidStateError");
}

#[test]
fn test_redispatching_in_flight_event_is_rejected() {
    let mut scene = scene();
    let inner = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&inner);
    let div = scene.div;
    scene
        .tree
        .add_event_listener(
            scene.button,
            "click",
            EventListener::new(move |tree, event| {
                *sink.borrow_mut() = Some(tree.dispatch_event(div, event));
                Ok(())
            }),
            false,
        )
        .unwrap();

    let mut event = click();
    assert_eq!(scene.tree.dispatch_event(scene.button, &mut event), Ok(true));
    assert!(matches!(
        *inner.borrow(),
        Some(Err(DomError::InvalidState(_)))
    ));
}

#[test]
fn test_dispatch_at_dead_node() {
    let mut tree = DomTree::new();
    let mut event = click();
    assert_eq!(
        tree.dispatch_event(NodeId(42), &mut event),
        Err(DomError::NoSuchNode(NodeId(42)))
    );
    assert!(!event.is_dispatching());
}

#[test]
fn test_init_event_during_dispatch_keeps_flags() {
    let mut scene = scene();
    let log = new_log();
    scene
        .tree
        .add_event_listener(
            scene.button,
            "click",
            EventListener::new(|_, event| {
                event.stop_propagation();
                event.init_event("other", false, false);
                Ok(())
            }),
            false,
        )
        .unwrap();
    scene
        .tree
        .add_event_listener(scene.div, "click", record(&log, "bubble"), false)
        .unwrap();

    let mut event = click();
    let _ = scene.tree.dispatch_event(scene.button, &mut event).unwrap();

    assert_eq!(event.event_type(), "click");
    assert!(event.bubbles());
    assert!(log.borrow().is_empty());
}

// ========== listener failures ==========

#[test]
fn test_listener_failure_does_not_abort_walk() {
    let mut scene = scene();
    let log = new_log();
    scene
        .tree
        .add_event_listener(
            scene.button,
            "click",
            EventListener::new(|_, _| Err(ListenerError::new("first"))),
            false,
        )
        .unwrap();
    scene
        .tree
        .add_event_listener(scene.button, "click", record(&log, "sibling"), false)
        .unwrap();
    scene
        .tree
        .add_event_listener(
            scene.div,
            "click",
            EventListener::new(|_, event| {
                event.prevent_default();
                Err(ListenerError::new("second"))
            }),
            false,
        )
        .unwrap();
    scene
        .tree
        .add_event_listener(NodeId::ROOT, "click", record(&log, "document"), false)
        .unwrap();

    let mut event = click();
    let result = scene.tree.dispatch_event(scene.button, &mut event);

    let Err(DomError::Listener(error)) = result else {
        panic!("expected a listener error, got {result:?}");
    };
    assert_eq!(error.message, "first");
    assert_eq!(error.event_type, "click");
    assert_eq!(*log.borrow(), vec!["sibling", "document"]);
    // The caller can still see what listeners did.
    assert!(event.default_prevented());
    assert!(!event.is_dispatching());
}

// ========== changes during dispatch ==========

#[test]
fn test_removing_a_peer_during_dispatch_does_not_skip_it() {
    let mut scene = scene();
    let log = new_log();
    let second = record(&log, "second");
    let peer = second.clone();
    let button = scene.button;
    let sink = Rc::clone(&log);
    let first = EventListener::new(move |tree, _| {
        sink.borrow_mut().push("first".to_string());
        tree.remove_event_listener(button, "click", &peer, false)?;
        Ok(())
    });
    scene
        .tree
        .add_event_listener(button, "click", first, false)
        .unwrap();
    scene
        .tree
        .add_event_listener(button, "click", second, false)
        .unwrap();

    let mut event = click();
    let _ = scene.tree.dispatch_event(button, &mut event).unwrap();
    assert_eq!(*log.borrow(), vec!["first", "second"]);

    // Gone for the next dispatch.
    let mut event = click();
    let _ = scene.tree.dispatch_event(button, &mut event).unwrap();
    assert_eq!(*log.borrow(), vec!["first", "second", "first"]);
}

#[test]
fn test_listener_removing_itself_runs_once() {
    let mut scene = scene();
    let count = Rc::new(RefCell::new(0));
    let button = scene.button;
    let slot: Rc<RefCell<Option<EventListener>>> = Rc::new(RefCell::new(None));
    let this = Rc::clone(&slot);
    let counter = Rc::clone(&count);
    let listener = EventListener::new(move |tree, _| {
        *counter.borrow_mut() += 1;
        if let Some(me) = this.borrow().as_ref() {
            tree.remove_event_listener(button, "click", me, false)?;
        }
        Ok(())
    });
    *slot.borrow_mut() = Some(listener.clone());
    scene
        .tree
        .add_event_listener(button, "click", listener, false)
        .unwrap();

    for _ in 0..3 {
        let mut event = click();
        let _ = scene.tree.dispatch_event(button, &mut event).unwrap();
    }
    assert_eq!(*count.borrow(), 1);
    assert!(scene.tree.event_listeners(button, "click").is_empty());
    // Break the listener's reference to itself.
    *slot.borrow_mut() = None;
}

#[test]
fn test_listener_added_during_dispatch_waits_for_next_pass() {
    let mut scene = scene();
    let log = new_log();
    let button = scene.button;
    let late = record(&log, "late");
    let sink = Rc::clone(&log);
    let adder = EventListener::new(move |tree, _| {
        sink.borrow_mut().push("adder".to_string());
        tree.add_event_listener(button, "click", late.clone(), false)?;
        Ok(())
    });
    scene
        .tree
        .add_event_listener(button, "click", adder, false)
        .unwrap();

    let mut event = click();
    let _ = scene.tree.dispatch_event(button, &mut event).unwrap();
    assert_eq!(*log.borrow(), vec!["adder"]);

    let mut event = click();
    let _ = scene.tree.dispatch_event(button, &mut event).unwrap();
    assert_eq!(*log.borrow(), vec!["adder", "adder", "late"]);
}

#[test]
fn test_path_is_fixed_before_listeners_run() {
    let mut scene = scene();
    let log = new_log();
    let (div, button) = (scene.div, scene.button);
    // Detach the button while the event is at the target.
    scene
        .tree
        .add_event_listener(
            button,
            "click",
            EventListener::new(move |tree, _| {
                if tree.parent(button) == Some(div) {
                    let _ = tree.remove_child(div, button)?;
                }
                Ok(())
            }),
            false,
        )
        .unwrap();
    scene
        .tree
        .add_event_listener(div, "click", record(&log, "div"), false)
        .unwrap();

    let mut event = click();
    let _ = scene.tree.dispatch_event(button, &mut event).unwrap();

    assert_eq!(*log.borrow(), vec!["div"]);
    assert_eq!(scene.tree.parent(button), None);

    // The next dispatch sees the new tree.
    let mut event = click();
    let _ = scene.tree.dispatch_event(button, &mut event).unwrap();
    assert_eq!(*log.borrow(), vec!["div"]);
}

#[test]
fn test_nested_dispatch_of_another_event() {
    let mut scene = scene();
    let log = new_log();
    let div = scene.div;
    scene
        .tree
        .add_event_listener(
            scene.button,
            "click",
            EventListener::new(move |tree, _| {
                let mut focus = Event::new("focus", EventInit::default());
                let _ = tree.dispatch_event(div, &mut focus)?;
                Ok(())
            }),
            false,
        )
        .unwrap();
    scene
        .tree
        .add_event_listener(div, "focus", record(&log, "focus"), false)
        .unwrap();
    scene
        .tree
        .add_event_listener(div, "click", record(&log, "click"), false)
        .unwrap();

    let mut event = click();
    let _ = scene.tree.dispatch_event(scene.button, &mut event).unwrap();
    assert_eq!(*log.borrow(), vec!["focus", "click"]);
}

#[test]
fn test_dispatch_on_detached_subtree() {
    let mut tree = DomTree::new();
    let section = tree.create_element(NodeId::ROOT, "section").unwrap();
    let p = tree.create_element(NodeId::ROOT, "p").unwrap();
    let _ = tree.append_child(section, p).unwrap();
    let log = new_log();
    tree.add_event_listener(NodeId::ROOT, "click", record(&log, "document"), true)
        .unwrap();
    tree.add_event_listener(section, "click", record(&log, "section"), true)
        .unwrap();

    assert_eq!(tree.event_path(p), vec![section]);
    let mut event = click();
    let _ = tree.dispatch_event(p, &mut event).unwrap();
    assert_eq!(*log.borrow(), vec!["section"]);
}

#[test]
fn test_untrusted_events_and_timestamps() {
    let event = click();
    assert!(!event.is_trusted());
    assert!(event.is_initialized());
    assert!(event.time_stamp() > 0.0);
    assert!(event.mutation_detail().is_none());
}
