use crate::{
    animation::config::{AnimationConfig, EffectKind, SlideDir},
    animation::ease::Ease,
    animation::timeline::{Property, Timeline, Tween, TweenTimeline},
    page::Element,
};

const SLIDE_Y_PX: f64 = 60.0;
const SLIDE_X_PX: f64 = 80.0;
const ZOOM_FROM_SCALE: f64 = 0.8;
const TEXT_REVEAL_FALLBACK_PX: f64 = 24.0;

/// Builds paused entrance timelines from parsed animation intent.
pub struct TimelineFactory;

impl TimelineFactory {
    /// Build the entrance timeline for `container`.
    ///
    /// Targets are the immediate children, or the container itself when it
    /// has none. `zoom-in` always animates the container as one unit. Vector
    /// path lengths for `svg-draw` are read here, once; playback never
    /// re-measures.
    #[tracing::instrument(skip(container, config), fields(container = %container.id, kind = config.kind.as_str()))]
    pub fn build(container: &Element, config: &AnimationConfig) -> TweenTimeline {
        let targets: Vec<&Element> = match config.kind {
            EffectKind::ZoomIn => vec![container],
            EffectKind::SvgDraw => {
                let stroked: Vec<&Element> = container
                    .children
                    .iter()
                    .filter(|c| c.path_length.is_some())
                    .collect();
                if stroked.is_empty() {
                    vec![container]
                } else {
                    stroked
                }
            }
            _ if container.children.is_empty() => vec![container],
            _ => container.children.iter().collect(),
        };

        let base = config.group_delay_s + config.delay_s;
        let mut tweens = Vec::with_capacity(targets.len() * 2);
        for (k, target) in targets.iter().enumerate() {
            let start_s = base + (k as f64) * config.stagger_s;
            let mut push = |property, from, to, ease| {
                tweens.push(Tween {
                    target: target.id.clone(),
                    property,
                    from,
                    to,
                    start_s,
                    duration_s: config.duration_s,
                    ease,
                });
            };

            match config.kind {
                EffectKind::Slide { dir } => {
                    let (property, offset) = match dir {
                        SlideDir::Up => (Property::TranslateY, SLIDE_Y_PX),
                        SlideDir::Down => (Property::TranslateY, -SLIDE_Y_PX),
                        SlideDir::Left => (Property::TranslateX, SLIDE_X_PX),
                        SlideDir::Right => (Property::TranslateX, -SLIDE_X_PX),
                    };
                    push(property, offset, 0.0, config.ease);
                    push(Property::Opacity, 0.0, 1.0, config.ease);
                }
                EffectKind::Fade => push(Property::Opacity, 0.0, 1.0, config.ease),
                EffectKind::ZoomIn => {
                    push(Property::Scale, ZOOM_FROM_SCALE, 1.0, Ease::OutBack);
                    push(Property::Opacity, 0.0, 1.0, config.ease);
                }
                EffectKind::TextReveal => {
                    let h = target.rect.height().abs();
                    let offset = if h > 0.0 { h } else { TEXT_REVEAL_FALLBACK_PX };
                    push(Property::TranslateY, offset, 0.0, config.ease);
                    push(Property::Opacity, 0.0, 1.0, config.ease);
                }
                EffectKind::SvgDraw => {
                    let len = target.path_length.unwrap_or(0.0).max(0.0);
                    push(Property::DashOffset, len, 0.0, config.ease);
                }
            }
        }

        tracing::debug!(tweens = tweens.len(), "built entrance timeline");
        TweenTimeline::new(tweens)
    }

    /// Replace the timeline in `slot`, killing the old one first.
    pub fn rebuild(slot: &mut Box<dyn Timeline>, container: &Element, config: &AnimationConfig) {
        slot.kill();
        *slot = Box::new(Self::build(container, config));
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/factory.rs"]
mod tests;
