use super::*;
use crate::animation::config::{ATTR_ANIMATION, ATTR_DURATION, ATTR_THRESHOLD};
use crate::events::ControllerEvent;
use crate::foundation::core::Rect;
use crate::registry::CardState;
use crate::scroll::driver::RecordingScrollDriver;

fn page() -> Page {
    let section = |id: &str, top: f64| {
        Element::new(id).with_rect(Rect::new(0.0, top, 1280.0, top + 800.0))
    };
    Page {
        viewport: Viewport::new(1280.0, 800.0).unwrap(),
        sections: vec![
            section("hero", 0.0).with_attr(ATTR_ANIMATION, "fade"),
            section("about", 800.0)
                .with_attr(ATTR_ANIMATION, "slide-up")
                .with_attr(ATTR_DURATION, "0.4")
                .with_attr(ATTR_THRESHOLD, "0.6")
                .with_child(Element::new("about-title"))
                .with_child(Element::new("about-copy")),
            section("contact", 1600.0),
        ],
    }
}

fn controller() -> AnimationController {
    AnimationController::new(
        ControllerConfig::default(),
        Viewport::new(1280.0, 800.0).unwrap(),
        RecordingScrollDriver::new(),
    )
    .unwrap()
}

fn mounted() -> (
    LifecycleCoordinator,
    AnimationController,
    Vec<Rc<SectionAnchor>>,
) {
    let page = page();
    let anchors = page.mount_anchors();
    let mut ctrl = controller();
    let mut lc = LifecycleCoordinator::from_config(ctrl.config());
    lc.mount_page(&mut ctrl, &page, &anchors).unwrap();
    (lc, ctrl, anchors)
}

#[test]
fn mount_page_registers_in_order_and_completes_registration() {
    let (lc, ctrl, _anchors) = mounted();
    assert_eq!(lc.mounted(), 3);
    assert_eq!(ctrl.card_index_by_section_id("hero"), 0);
    assert_eq!(ctrl.card_index_by_section_id("contact"), 2);

    let about = ctrl.card_by_id("about").unwrap();
    assert_eq!(about.activation_threshold(), 0.6);
    assert!(!about.timeline().is_playing());
    assert_eq!(about.timeline().progress(), 0.0);
    // both children start hidden and offset
    let style = about.timeline().sample("about-copy");
    assert_eq!(style.opacity, 0.0);
    assert!(style.translate.y > 0.0);

    // no animation declared: default threshold, static timeline
    assert_eq!(ctrl.card_by_id("contact").unwrap().activation_threshold(), 0.3);
}

#[test]
fn mount_rejects_mismatched_anchor() {
    let mut ctrl = controller();
    let mut lc = LifecycleCoordinator::new(150);
    let anchor = SectionAnchor::new("other", Rect::ZERO);
    let err = lc.mount(&mut ctrl, &Element::new("hero"), &anchor).unwrap_err();
    assert!(matches!(err, CardError::Validation(_)));
    assert!(ctrl.is_empty());
}

#[test]
fn mount_page_requires_matching_anchor_count() {
    let page = page();
    let anchors = page.mount_anchors();
    let mut ctrl = controller();
    let mut lc = LifecycleCoordinator::new(150);
    assert!(lc.mount_page(&mut ctrl, &page, &anchors[..2]).is_err());
}

#[test]
fn resize_burst_recomputes_once() {
    let (mut lc, mut ctrl, _anchors) = mounted();
    ctrl.drain_events();

    for i in 0..10u64 {
        let vp = Viewport::new(1280.0 - i as f64, 800.0).unwrap();
        lc.on_resize(Millis(i * 5), vp);
        assert!(!lc.on_frame(&mut ctrl, Millis(i * 5)));
    }
    assert!(lc.has_pending());

    // last resize at 45ms; window closes at 195ms
    assert!(!lc.on_frame(&mut ctrl, Millis(194)));
    assert!(lc.on_frame(&mut ctrl, Millis(195)));
    for t in (211..600).step_by(16) {
        assert!(!lc.on_frame(&mut ctrl, Millis(t)));
    }
    assert_eq!(lc.recomputations(), 1);
    assert!(!lc.has_pending());
    assert_eq!(ctrl.observer().viewport().width, 1280.0 - 9.0);

    let recomputes = ctrl
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, ControllerEvent::GeometryRecomputed { .. }))
        .count();
    assert_eq!(recomputes, 1);
}

#[test]
fn poll_arms_frame_without_recomputing() {
    let (mut lc, mut ctrl, _anchors) = mounted();
    lc.on_resize(Millis(0), Viewport::new(640.0, 800.0).unwrap());
    assert!(!lc.poll(Millis(100)));
    assert!(lc.poll(Millis(150)));
    assert_eq!(lc.recomputations(), 0);
    assert!(lc.on_frame(&mut ctrl, Millis(160)));
    assert_eq!(lc.recomputations(), 1);
}

#[test]
fn content_loaded_skips_debounce() {
    let (mut lc, mut ctrl, _anchors) = mounted();
    lc.on_content_loaded();
    assert!(lc.on_frame(&mut ctrl, Millis(16)));
    assert_eq!(lc.recomputations(), 1);
}

#[test]
fn recompute_picks_up_reflowed_geometry() {
    let (mut lc, mut ctrl, anchors) = mounted();
    lc.on_frame(&mut ctrl, Millis(16));
    assert_eq!(ctrl.observer().progress_of(1), Some(0.0));

    // hero grew; everything below shifted up into view
    anchors[1].set_rect(Rect::new(0.0, 400.0, 1280.0, 1200.0));
    lc.on_content_loaded();
    lc.on_frame(&mut ctrl, Millis(32));
    assert_eq!(ctrl.observer().progress_of(1), Some(0.5));
}

#[test]
fn refresh_section_rebuilds_in_place() {
    let (mut lc, mut ctrl, anchors) = mounted();
    for t in 1..100 {
        lc.on_frame(&mut ctrl, Millis(t * 16));
    }
    assert_eq!(ctrl.card(0).unwrap().state(), CardState::Active);

    let grown = page().sections[0]
        .clone()
        .with_rect(Rect::new(0.0, 0.0, 1280.0, 1000.0))
        .with_child(Element::new("hero-title"));
    assert!(lc.refresh_section(&mut ctrl, &grown));
    assert_eq!(anchors[0].rect().height(), 1000.0);
    let hero = ctrl.card(0).unwrap();
    assert_eq!(hero.state(), CardState::Active);
    assert_eq!(hero.timeline().progress(), 1.0);
    assert_eq!(hero.timeline().sample("hero-title").opacity, 1.0);
    assert!(lc.has_pending());

    assert!(!lc.refresh_section(&mut ctrl, &Element::new("nope")));
}

#[test]
fn unmount_all_cancels_pending_work() {
    let (mut lc, mut ctrl, _anchors) = mounted();
    lc.on_resize(Millis(0), Viewport::new(640.0, 480.0).unwrap());
    lc.on_content_loaded();

    assert_eq!(lc.unmount_all(&mut ctrl), 3);
    assert!(ctrl.is_empty());
    assert!(!lc.has_pending());
    assert!(!lc.on_frame(&mut ctrl, Millis(1_000)));
    assert_eq!(lc.recomputations(), 0);
}

#[test]
fn unmount_single_section() {
    let (mut lc, mut ctrl, _anchors) = mounted();
    assert!(lc.unmount(&mut ctrl, "about"));
    assert!(!lc.unmount(&mut ctrl, "about"));
    assert_eq!(lc.mounted(), 2);
    assert_eq!(ctrl.card_index_by_section_id("contact"), 1);
}

#[test]
fn dropped_anchor_is_forgotten_on_recompute() {
    let (mut lc, mut ctrl, mut anchors) = mounted();
    drop(anchors.remove(2));
    lc.on_content_loaded();
    assert!(lc.on_frame(&mut ctrl, Millis(16)));
    assert_eq!(ctrl.len(), 2);
    assert_eq!(lc.mounted(), 2);
}
