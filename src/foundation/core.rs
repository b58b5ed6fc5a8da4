use crate::foundation::error::{CardError, CardResult};

pub use kurbo::{Point, Rect, Vec2};

/// Monotonic host timestamp in milliseconds.
///
/// The controller never reads a wall clock; every frame, resize and settle
/// notification carries the host's notion of "now".
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct Millis(pub u64);

impl Millis {
    /// `self + ms`, saturating at `u64::MAX`.
    pub fn saturating_add(self, ms: u64) -> Self {
        Self(self.0.saturating_add(ms))
    }

    /// Milliseconds elapsed since `earlier`, zero if `earlier` is in the future.
    pub fn since(self, earlier: Millis) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    /// The timestamp in fractional seconds.
    pub fn as_secs_f64(self) -> f64 {
        (self.0 as f64) / 1000.0
    }
}

/// Visible window size in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    /// Window width.
    pub width: f64,
    /// Window height; always > 0.
    pub height: f64,
}

impl Viewport {
    /// Validated viewport; both dimensions must be finite and positive.
    pub fn new(width: f64, height: f64) -> CardResult<Self> {
        if !width.is_finite() || !height.is_finite() {
            return Err(CardError::validation("Viewport dimensions must be finite"));
        }
        if width <= 0.0 || height <= 0.0 {
            return Err(CardError::validation("Viewport dimensions must be > 0"));
        }
        Ok(Self { width, height })
    }
}

/// Vertical scroll region of a card in document coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Region {
    /// Document offset of the top edge.
    pub top: f64,
    /// Box height; never negative.
    pub height: f64,
}

impl Region {
    /// Vertical extent of a layout box.
    pub fn from_rect(rect: Rect) -> Self {
        Self {
            top: rect.y0.min(rect.y1),
            height: rect.height().abs(),
        }
    }

    /// Document offset of the bottom edge.
    pub fn bottom(self) -> f64 {
        self.top + self.height
    }

    /// Linear scrub mapping: 0 when the top edge reaches the viewport bottom,
    /// 1 when the bottom edge does.
    pub fn progress_at(self, scroll: f64, viewport_height: f64) -> f64 {
        let viewport_bottom = scroll + viewport_height;
        if self.height <= f64::EPSILON {
            return if viewport_bottom >= self.top { 1.0 } else { 0.0 };
        }
        clamp01((viewport_bottom - self.top) / self.height)
    }

    /// Whether any part of the region is inside the viewport at `scroll`.
    ///
    /// A region scrolled fully past the top keeps progress 1 but no longer
    /// intersects.
    pub fn intersects(self, scroll: f64, viewport_height: f64) -> bool {
        let viewport_bottom = scroll + viewport_height;
        if self.height <= f64::EPSILON {
            return self.top >= scroll && self.top <= viewport_bottom;
        }
        self.top < viewport_bottom && self.bottom() > scroll
    }
}

/// Clamp to `[0, 1]`, mapping NaN to 0.
pub(crate) fn clamp01(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
