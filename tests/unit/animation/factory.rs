use super::*;
use crate::foundation::core::Rect;

fn section_with_children(n: usize) -> Element {
    let mut el = Element::new("about").with_rect(Rect::new(0.0, 0.0, 1000.0, 900.0));
    for i in 0..n {
        el = el.with_child(
            Element::new(format!("about-{i}")).with_rect(Rect::new(0.0, 0.0, 1000.0, 40.0)),
        );
    }
    el
}

fn config(kind: EffectKind) -> AnimationConfig {
    AnimationConfig {
        ease: Ease::Linear,
        ..AnimationConfig::new(kind)
    }
}

#[test]
fn built_timeline_is_paused_at_zero() {
    let tl = TimelineFactory::build(&section_with_children(3), &config(EffectKind::Fade));
    assert_eq!(tl.progress(), 0.0);
    assert!(!tl.is_playing());
    assert_eq!(tl.tweens().len(), 3);
    assert_eq!(tl.sample("about-0").opacity, 0.0);
}

#[test]
fn children_are_staggered_after_group_delay() {
    let cfg = AnimationConfig {
        delay_s: 0.1,
        stagger_s: 0.2,
        group_delay_s: 0.5,
        ..config(EffectKind::Slide { dir: SlideDir::Up })
    };
    let tl = TimelineFactory::build(&section_with_children(3), &cfg);
    let starts: Vec<f64> = tl
        .tweens()
        .iter()
        .filter(|t| t.property == Property::Opacity)
        .map(|t| t.start_s)
        .collect();
    assert_eq!(starts.len(), 3);
    assert!((starts[0] - 0.6).abs() < 1e-9);
    assert!((starts[1] - 0.8).abs() < 1e-9);
    assert!((starts[2] - 1.0).abs() < 1e-9);
    assert!((tl.duration_s() - 2.0).abs() < 1e-9);
}

#[test]
fn slide_directions_map_to_offsets() {
    let el = section_with_children(1);
    let down = TimelineFactory::build(&el, &config(EffectKind::Slide { dir: SlideDir::Down }));
    assert_eq!(down.sample("about-0").translate.y, -60.0);
    let left = TimelineFactory::build(&el, &config(EffectKind::Slide { dir: SlideDir::Left }));
    assert_eq!(left.sample("about-0").translate.x, 80.0);
    let right = TimelineFactory::build(&el, &config(EffectKind::Slide { dir: SlideDir::Right }));
    assert_eq!(right.sample("about-0").translate.x, -80.0);
}

#[test]
fn childless_container_animates_itself() {
    let el = Element::new("hero");
    let tl = TimelineFactory::build(&el, &config(EffectKind::Fade));
    assert_eq!(tl.tweens().len(), 1);
    assert_eq!(tl.tweens()[0].target, "hero");
}

#[test]
fn zoom_in_targets_container_with_overshoot() {
    let tl = TimelineFactory::build(&section_with_children(2), &config(EffectKind::ZoomIn));
    assert!(tl.tweens().iter().all(|t| t.target == "about"));
    let scale = tl
        .tweens()
        .iter()
        .find(|t| t.property == Property::Scale)
        .unwrap();
    assert_eq!(scale.ease, Ease::OutBack);
    assert_eq!(scale.from, 0.8);
}

#[test]
fn text_reveal_uses_element_height() {
    let tl = TimelineFactory::build(&section_with_children(1), &config(EffectKind::TextReveal));
    assert_eq!(tl.sample("about-0").translate.y, 40.0);
}

#[test]
fn svg_draw_measures_path_length_at_build() {
    let mut el = Element::new("skills")
        .with_child(Element::new("stroke-a").with_path_length(300.0))
        .with_child(Element::new("label"));
    let mut tl = TimelineFactory::build(&el, &config(EffectKind::SvgDraw));
    assert_eq!(tl.tweens().len(), 1);
    assert_eq!(tl.sample("stroke-a").dash_offset, Some(300.0));

    // later re-measurement does not leak into an existing timeline
    el.children[0].path_length = Some(999.0);
    tl.seek(0.5).unwrap();
    assert_eq!(tl.sample("stroke-a").dash_offset, Some(150.0));
}

#[test]
fn rebuild_kills_previous_timeline() {
    let el = section_with_children(2);
    let cfg = config(EffectKind::Fade);
    let mut slot: Box<dyn Timeline> = Box::new(TimelineFactory::build(&el, &cfg));
    slot.play().unwrap();
    TimelineFactory::rebuild(&mut slot, &el, &cfg);
    assert!(!slot.is_killed());
    assert!(!slot.is_playing());
    assert_eq!(slot.progress(), 0.0);
}
