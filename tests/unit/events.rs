use super::*;
use std::{cell::RefCell, rc::Rc};

#[test]
fn listeners_and_log_both_receive_events() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut bus = EventBus::new();
    let sink = seen.clone();
    bus.subscribe(Box::new(move |ev| sink.borrow_mut().push(ev.clone())));

    bus.emit(ControllerEvent::ReadyChanged { ready: true });
    assert_eq!(seen.borrow().len(), 1);
    assert_eq!(bus.pending(), 1);
    assert_eq!(
        bus.drain(),
        vec![ControllerEvent::ReadyChanged { ready: true }]
    );
    assert_eq!(bus.pending(), 0);
}

#[test]
fn unsubscribe_stops_delivery() {
    let count = Rc::new(RefCell::new(0));
    let mut bus = EventBus::new();
    let c = count.clone();
    let id = bus.subscribe(Box::new(move |_| *c.borrow_mut() += 1));
    bus.emit(ControllerEvent::GeometryRecomputed { cards: 1 });
    assert!(bus.unsubscribe(id));
    assert!(!bus.unsubscribe(id));
    bus.emit(ControllerEvent::GeometryRecomputed { cards: 1 });
    assert_eq!(*count.borrow(), 1);
}

#[test]
fn deferred_bus_queues_until_dispatched() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut bus = EventBus::new();
    bus.set_deferred(true);
    let sink = seen.clone();
    bus.subscribe(Box::new(move |ev| sink.borrow_mut().push(format!("{ev:?}"))));

    let card_sink = seen.clone();
    let cb: CardCallback = Box::new(move |ev: &CardEvent<'_>| {
        card_sink.borrow_mut().push(format!("card {}", ev.id));
    });
    let callback: SharedCardCallback = Rc::new(RefCell::new(cb));
    bus.emit(ControllerEvent::ReadyChanged { ready: true });
    bus.card(CardCall::new(&callback, "hero", 0, TransitionCause::Scroll));
    assert!(seen.borrow().is_empty());
    assert_eq!(bus.queued(), 2);
    assert_eq!(bus.pending(), 1);

    let dispatch = bus.take_dispatch();
    assert_eq!(dispatch.len(), 2);
    assert_eq!(bus.queued(), 0);
    dispatch.run();
    assert_eq!(
        *seen.borrow(),
        vec!["ReadyChanged { ready: true }".to_string(), "card hero".to_string()]
    );
}

#[test]
fn log_is_bounded() {
    let mut bus = EventBus::new();
    for cards in 0..(MAX_LOGGED_EVENTS + 5) {
        bus.emit(ControllerEvent::GeometryRecomputed { cards });
    }
    let drained = bus.drain();
    assert_eq!(drained.len(), MAX_LOGGED_EVENTS);
    assert_eq!(drained[0], ControllerEvent::GeometryRecomputed { cards: 5 });
}

#[test]
fn events_serialize_with_tag() {
    let json = serde_json::to_value(ControllerEvent::Activated {
        id: "about".to_string(),
        index: 1,
        cause: TransitionCause::Scroll,
    })
    .unwrap();
    assert_eq!(json["event"], "activated");
    assert_eq!(json["cause"], "scroll");
    assert_eq!(json["index"], 1);
}
