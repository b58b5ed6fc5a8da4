use std::collections::BTreeMap;

use crate::{animation::ease::Ease, page::Element};

/// Effect kind, e.g. `slide-up` or `svg-draw`.
pub const ATTR_ANIMATION: &str = "data-animation";
/// Per-child duration in seconds; a trailing `s` is accepted.
pub const ATTR_DURATION: &str = "data-duration";
/// Easing name such as `power3.out`.
pub const ATTR_EASE: &str = "data-ease";
/// Delay before the first child, in seconds.
pub const ATTR_DELAY: &str = "data-delay";
/// Offset between consecutive children, in seconds.
pub const ATTR_STAGGER: &str = "data-stagger";
/// Section-level offset, in seconds.
pub const ATTR_GROUP_DELAY: &str = "data-group-delay";
/// Activation threshold override in `[0, 1]`.
pub const ATTR_THRESHOLD: &str = "data-threshold";

/// Read-only access to declared markup attributes.
pub trait AttributeSource {
    /// Value of attribute `name`, if declared.
    fn attr(&self, name: &str) -> Option<&str>;
}

impl AttributeSource for Element {
    fn attr(&self, name: &str) -> Option<&str> {
        Element::attr(self, name)
    }
}

impl AttributeSource for BTreeMap<String, String> {
    fn attr(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

/// Direction a slide effect travels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum SlideDir {
    /// Rises into place.
    Up,
    /// Drops into place.
    Down,
    /// Moves in toward the left.
    Left,
    /// Moves in toward the right.
    Right,
}

/// Closed set of entrance effects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum EffectKind {
    /// Translate children into place while fading in.
    Slide {
        /// Travel direction.
        dir: SlideDir,
    },
    /// Opacity only.
    Fade,
    /// Scale up from below full size.
    ZoomIn,
    /// Staggered per-child rise.
    TextReveal,
    /// Stroke drawing driven by the measured path length.
    SvgDraw,
}

impl EffectKind {
    /// Parse a markup name; case and `_`/`-` are normalised.
    pub fn parse(raw: &str) -> Option<Self> {
        let kind = raw.trim().to_ascii_lowercase().replace('_', "-");
        let kind = match kind.as_str() {
            "slide-up" => Self::Slide { dir: SlideDir::Up },
            "slide-down" => Self::Slide {
                dir: SlideDir::Down,
            },
            "slide-left" => Self::Slide {
                dir: SlideDir::Left,
            },
            "slide-right" => Self::Slide {
                dir: SlideDir::Right,
            },
            "fade" | "fade-in" => Self::Fade,
            "zoom-in" => Self::ZoomIn,
            "text-reveal" => Self::TextReveal,
            "svg-draw" => Self::SvgDraw,
            _ => return None,
        };
        Some(kind)
    }

    /// Canonical markup name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Slide { dir: SlideDir::Up } => "slide-up",
            Self::Slide {
                dir: SlideDir::Down,
            } => "slide-down",
            Self::Slide {
                dir: SlideDir::Left,
            } => "slide-left",
            Self::Slide {
                dir: SlideDir::Right,
            } => "slide-right",
            Self::Fade => "fade",
            Self::ZoomIn => "zoom-in",
            Self::TextReveal => "text-reveal",
            Self::SvgDraw => "svg-draw",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Fallbacks applied when markup omits or garbles a field.
#[serde(default)]
pub struct AnimationDefaults {
    /// Duration in seconds.
    pub duration_s: f64,
    /// Ease used when `data-ease` is missing or unknown.
    pub ease: Ease,
}

impl Default for AnimationDefaults {
    fn default() -> Self {
        Self {
            duration_s: 1.0,
            ease: Ease::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Typed animation intent for one element, parsed once at mount.
pub struct AnimationConfig {
    /// Entrance effect.
    pub kind: EffectKind,
    /// Per-child tween duration in seconds.
    pub duration_s: f64,
    /// Easing curve.
    pub ease: Ease,
    /// Delay before the first child starts, in seconds.
    pub delay_s: f64,
    /// Offset between consecutive children, in seconds.
    pub stagger_s: f64,
    /// Section-level offset applied ahead of `delay_s`, in seconds.
    pub group_delay_s: f64,
}

impl AnimationConfig {
    /// Config for `kind` with stock defaults and no offsets.
    pub fn new(kind: EffectKind) -> Self {
        let defaults = AnimationDefaults::default();
        Self {
            kind,
            duration_s: defaults.duration_s,
            ease: defaults.ease,
            delay_s: 0.0,
            stagger_s: 0.0,
            group_delay_s: 0.0,
        }
    }
}

/// Parse animation intent with the stock defaults.
pub fn parse_animation(source: &impl AttributeSource) -> Option<AnimationConfig> {
    parse_animation_with(source, &AnimationDefaults::default())
}

/// Parse animation intent; `None` means the element declares no animation.
pub fn parse_animation_with(
    source: &impl AttributeSource,
    defaults: &AnimationDefaults,
) -> Option<AnimationConfig> {
    let raw_kind = source.attr(ATTR_ANIMATION)?;
    if raw_kind.trim().is_empty() {
        return None;
    }
    let Some(kind) = EffectKind::parse(raw_kind) else {
        tracing::warn!(kind = raw_kind, "unknown animation kind, element left static");
        return None;
    };

    let ease = source
        .attr(ATTR_EASE)
        .and_then(Ease::from_name)
        .unwrap_or(defaults.ease);

    Some(AnimationConfig {
        kind,
        duration_s: parse_secs(source.attr(ATTR_DURATION), defaults.duration_s),
        ease,
        delay_s: parse_secs(source.attr(ATTR_DELAY), 0.0),
        stagger_s: parse_secs(source.attr(ATTR_STAGGER), 0.0),
        group_delay_s: parse_secs(source.attr(ATTR_GROUP_DELAY), 0.0),
    })
}

/// Optional per-section activation threshold, clamped to `[0, 1]`.
pub fn parse_threshold(source: &impl AttributeSource) -> Option<f64> {
    source
        .attr(ATTR_THRESHOLD)
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .map(|v| v.clamp(0.0, 1.0))
}

fn parse_secs(raw: Option<&str>, default: f64) -> f64 {
    raw.map(str::trim)
        .map(|s| s.strip_suffix('s').unwrap_or(s))
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v >= 0.0)
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "../../tests/unit/animation/config.rs"]
mod tests;
