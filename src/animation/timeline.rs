use crate::{
    animation::ease::Ease,
    foundation::core::{Vec2, clamp01},
    foundation::error::{CardError, CardResult},
};

/// Linear interpolation between two values.
pub trait Lerp: Sized {
    /// Value at `t` between `a` (0) and `b` (1).
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

/// Playback direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Direction {
    /// Toward progress 1.
    Forward,
    /// Toward progress 0.
    Reverse,
}

/// Reported by [`Timeline::advance`] when playback reaches an end.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Completion {
    /// Reached progress 1 while playing forward.
    Forward,
    /// Reached progress 0 while reversing.
    Reverse,
}

/// Seekable, replayable animation sequence.
///
/// This is the tweening capability the controller orchestrates. Errors from
/// any method are treated by the controller as a critical animation failure.
pub trait Timeline {
    /// Play forward from the current playhead.
    fn play(&mut self) -> CardResult<()>;
    /// Play backward from the current playhead.
    fn reverse(&mut self) -> CardResult<()>;
    /// Stop advancing, keeping the playhead.
    fn pause(&mut self) -> CardResult<()>;
    /// Jump to `progress` in `[0, 1]` without changing play state.
    fn seek(&mut self, progress: f64) -> CardResult<()>;
    /// Normalised playhead in `[0, 1]`.
    fn progress(&self) -> f64;
    /// Direction of the last play or reverse.
    fn direction(&self) -> Direction;
    /// Style of `target` at the current playhead.
    fn sample(&self, target: &str) -> ElementStyle;
    /// Whether [`Timeline::advance`] will move the playhead.
    fn is_playing(&self) -> bool;
    /// Move the playhead by `dt_ms`. Returns a completion at most once per
    /// play/reverse call.
    fn advance(&mut self, dt_ms: u64) -> CardResult<Option<Completion>>;
    /// Dispose; a killed timeline never reports completion again.
    fn kill(&mut self);
    /// Whether [`Timeline::kill`] has been called.
    fn is_killed(&self) -> bool;
}

/// Style channel a tween writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Property {
    /// Horizontal offset in px.
    TranslateX,
    /// Vertical offset in px.
    TranslateY,
    /// Uniform scale factor.
    Scale,
    /// Opacity in `[0, 1]`.
    Opacity,
    /// Stroke dash offset in px.
    DashOffset,
}

/// One property animated on one target.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Tween {
    /// Element id.
    pub target: String,
    /// Channel written.
    pub property: Property,
    /// Value before `start_s`.
    pub from: f64,
    /// Value from `end_s` on.
    pub to: f64,
    /// Start offset from the timeline origin, in seconds.
    pub start_s: f64,
    /// Length in seconds; zero means a step at `start_s`.
    pub duration_s: f64,
    /// Curve applied across the tween.
    pub ease: Ease,
}

impl Tween {
    /// End offset in seconds.
    pub fn end_s(&self) -> f64 {
        self.start_s + self.duration_s
    }

    /// Value at timeline time `t_s`, held at the ends.
    pub fn sample(&self, t_s: f64) -> f64 {
        if self.duration_s <= 0.0 {
            return if t_s >= self.start_s {
                self.to
            } else {
                self.from
            };
        }
        let local = clamp01((t_s - self.start_s) / self.duration_s);
        <f64 as Lerp>::lerp(&self.from, &self.to, self.ease.apply(local))
    }
}

/// Resolved visual state of one element at the current playhead.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct ElementStyle {
    /// Translation in px.
    pub translate: Vec2,
    /// Scale factor.
    pub scale: f64,
    /// Opacity.
    pub opacity: f64,
    /// Stroke dash offset; `None` for elements without a stroke tween.
    pub dash_offset: Option<f64>,
}

impl Default for ElementStyle {
    fn default() -> Self {
        Self {
            translate: Vec2::ZERO,
            scale: 1.0,
            opacity: 1.0,
            dash_offset: None,
        }
    }
}

/// Reference [`Timeline`] built from flat tweens.
///
/// The playhead is stored as normalized progress so zero-length timelines
/// still flip cleanly between their two end states.
#[derive(Clone, Debug)]
pub struct TweenTimeline {
    tweens: Vec<Tween>,
    duration_s: f64,
    progress: f64,
    direction: Direction,
    playing: bool,
    killed: bool,
}

impl TweenTimeline {
    /// Paused timeline at progress 0, spanning the latest tween end.
    pub fn new(tweens: Vec<Tween>) -> Self {
        let duration_s = tweens.iter().map(Tween::end_s).fold(0.0, f64::max);
        Self {
            tweens,
            duration_s,
            progress: 0.0,
            direction: Direction::Forward,
            playing: false,
            killed: false,
        }
    }

    /// A timeline with no tweens, for sections that declare no animation.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Total length in seconds.
    pub fn duration_s(&self) -> f64 {
        self.duration_s
    }

    /// Tweens in build order.
    pub fn tweens(&self) -> &[Tween] {
        &self.tweens
    }

    fn ensure_alive(&self, op: &str) -> CardResult<()> {
        if self.killed {
            return Err(CardError::animation(format!(
                "cannot {op} a killed timeline"
            )));
        }
        Ok(())
    }
}

impl Timeline for TweenTimeline {
    fn play(&mut self) -> CardResult<()> {
        self.ensure_alive("play")?;
        self.direction = Direction::Forward;
        self.playing = true;
        Ok(())
    }

    fn reverse(&mut self) -> CardResult<()> {
        self.ensure_alive("reverse")?;
        self.direction = Direction::Reverse;
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) -> CardResult<()> {
        self.ensure_alive("pause")?;
        self.playing = false;
        Ok(())
    }

    fn seek(&mut self, progress: f64) -> CardResult<()> {
        self.ensure_alive("seek")?;
        if !progress.is_finite() {
            return Err(CardError::animation("seek progress must be finite"));
        }
        self.progress = progress.clamp(0.0, 1.0);
        Ok(())
    }

    fn progress(&self) -> f64 {
        self.progress
    }

    fn direction(&self) -> Direction {
        self.direction
    }

    fn sample(&self, target: &str) -> ElementStyle {
        let t_s = self.progress * self.duration_s;
        let mut style = ElementStyle::default();
        for tween in self.tweens.iter().filter(|tw| tw.target == target) {
            let v = tween.sample(t_s);
            match tween.property {
                Property::TranslateX => style.translate.x = v,
                Property::TranslateY => style.translate.y = v,
                Property::Scale => style.scale = v,
                Property::Opacity => style.opacity = v,
                Property::DashOffset => style.dash_offset = Some(v),
            }
        }
        style
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn advance(&mut self, dt_ms: u64) -> CardResult<Option<Completion>> {
        if self.killed || !self.playing {
            return Ok(None);
        }
        let step = if self.duration_s <= 0.0 {
            1.0
        } else {
            (dt_ms as f64 / 1000.0) / self.duration_s
        };
        match self.direction {
            Direction::Forward => {
                self.progress = (self.progress + step).min(1.0);
                if self.progress >= 1.0 {
                    self.playing = false;
                    return Ok(Some(Completion::Forward));
                }
            }
            Direction::Reverse => {
                self.progress = (self.progress - step).max(0.0);
                if self.progress <= 0.0 {
                    self.playing = false;
                    return Ok(Some(Completion::Reverse));
                }
            }
        }
        Ok(None)
    }

    fn kill(&mut self) {
        self.killed = true;
        self.playing = false;
        self.tweens.clear();
    }

    fn is_killed(&self) -> bool {
        self.killed
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/timeline.rs"]
mod tests;
