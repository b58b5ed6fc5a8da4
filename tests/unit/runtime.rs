use super::*;
use crate::animation::timeline::TweenTimeline;
use crate::controller::TieBreak;
use crate::events::ControllerEvent;
use crate::foundation::core::{Millis, Rect};
use crate::registry::CardDescriptor;
use crate::scroll::driver::RecordingScrollDriver;
use crate::scroll::observer::SectionAnchor;

fn viewport() -> Viewport {
    Viewport::new(1280.0, 800.0).unwrap()
}

/// Each test gets a fresh UI thread so installs never leak between tests.
fn on_fresh_thread(f: impl FnOnce() + Send + 'static) {
    std::thread::spawn(f).join().unwrap();
}

#[test]
fn init_is_idempotent_per_thread() {
    on_fresh_thread(|| {
        assert!(!is_initialized());
        assert!(controller().is_none());

        let first =
            init(ControllerConfig::default(), viewport(), RecordingScrollDriver::new()).unwrap();
        let other = ControllerConfig {
            tie_break: TieBreak::LowerIndexWins,
            ..ControllerConfig::default()
        };
        let second = init(other, viewport(), RecordingScrollDriver::new()).unwrap();

        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(second.borrow().config().tie_break, TieBreak::HigherIndexWins);
        assert!(Rc::ptr_eq(&first, &controller().unwrap()));
    });
}

#[test]
fn failed_init_installs_nothing() {
    on_fresh_thread(|| {
        let bad = ControllerConfig {
            navigation_timeout_ms: 0,
            ..ControllerConfig::default()
        };
        assert!(init(bad, viewport(), RecordingScrollDriver::new()).is_err());
        assert!(!is_initialized());
    });
}

#[test]
fn threads_get_their_own_controller() {
    on_fresh_thread(|| {
        init(ControllerConfig::default(), viewport(), RecordingScrollDriver::new()).unwrap();
        let other_thread_saw = std::thread::spawn(is_initialized).join().unwrap();
        assert!(!other_thread_saw);
        assert!(is_initialized());
    });
}

#[test]
fn callbacks_can_read_the_shared_handle() {
    on_fresh_thread(|| {
        init(ControllerConfig::default(), viewport(), RecordingScrollDriver::new()).unwrap();
        let anchor = SectionAnchor::new("hero", Rect::new(0.0, 0.0, 1280.0, 800.0));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let desc = CardDescriptor::new(&anchor, Box::new(TweenTimeline::empty())).on_activate(
            move |ev| {
                let shared = controller().unwrap();
                let ctrl = shared.borrow();
                sink.borrow_mut()
                    .push((ev.index, ctrl.is_ready(), ctrl.active_index()));
            },
        );
        with_controller(|c| {
            c.register_card(desc).unwrap();
            c.mark_registration_complete();
        })
        .unwrap();

        with_controller(|c| c.on_frame(Millis(16))).unwrap();
        assert_eq!(*seen.borrow(), vec![(0, true, Some(0))]);
    });
}

#[test]
fn listeners_can_navigate_through_the_handle() {
    on_fresh_thread(|| {
        init(ControllerConfig::default(), viewport(), RecordingScrollDriver::new()).unwrap();
        let anchors: Vec<_> = (0..2)
            .map(|i| {
                let top = f64::from(i) * 800.0;
                SectionAnchor::new(format!("c{i}"), Rect::new(0.0, top, 1280.0, top + 800.0))
            })
            .collect();
        let accepted = Rc::new(RefCell::new(None));
        let sink = accepted.clone();
        with_controller(|c| {
            for a in &anchors {
                c.register_card(CardDescriptor::new(a, Box::new(TweenTimeline::empty())))
                    .unwrap();
            }
            c.mark_registration_complete();
            c.subscribe(Box::new(move |ev| {
                if let ControllerEvent::ReadyChanged { ready: true } = ev {
                    *sink.borrow_mut() = Some(with_controller(|c| c.navigate_to_card(1)));
                }
            }));
        })
        .unwrap();

        with_controller(|c| c.on_frame(Millis(16))).unwrap();
        assert!(matches!(*accepted.borrow(), Some(Ok(true))));
        assert!(controller().unwrap().borrow().is_transition_in_flight());
    });
}

#[test]
fn direct_borrows_queue_until_dispatched() {
    on_fresh_thread(|| {
        let shared =
            init(ControllerConfig::default(), viewport(), RecordingScrollDriver::new()).unwrap();
        let anchor = SectionAnchor::new("hero", Rect::new(0.0, 0.0, 1280.0, 800.0));
        let fired = Rc::new(RefCell::new(0));
        let count = fired.clone();
        let desc = CardDescriptor::new(&anchor, Box::new(TweenTimeline::empty())).on_activate(
            move |_| {
                // reading the handle must not collide with the host's borrow
                assert!(controller().unwrap().borrow().is_ready());
                *count.borrow_mut() += 1;
            },
        );
        {
            let mut ctrl = shared.borrow_mut();
            ctrl.register_card(desc).unwrap();
            ctrl.mark_registration_complete();
            ctrl.on_frame(Millis(16));
        }
        assert_eq!(*fired.borrow(), 0);
        assert!(dispatch_pending().unwrap() > 0);
        assert_eq!(*fired.borrow(), 1);
        assert_eq!(dispatch_pending().unwrap(), 0);
    });
}

#[test]
fn handle_reports_unavailable_instead_of_panicking() {
    on_fresh_thread(|| {
        assert!(matches!(
            with_controller(|c| c.is_ready()),
            Err(CardError::Unavailable(_))
        ));
        let shared =
            init(ControllerConfig::default(), viewport(), RecordingScrollDriver::new()).unwrap();
        let _guard = shared.borrow_mut();
        assert!(matches!(
            with_controller(|c| c.is_ready()),
            Err(CardError::Unavailable(_))
        ));
        assert!(dispatch_pending().is_err());
    });
}
