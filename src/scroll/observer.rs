use std::{
    cell::Cell,
    rc::{Rc, Weak},
};

use crate::foundation::core::{Rect, Region, Viewport};

/// Host-owned handle to a section's DOM anchor.
///
/// The controller and observer only ever hold `Weak` references; dropping the
/// `Rc` is how a host tells us the element is gone.
#[derive(Debug)]
pub struct SectionAnchor {
    id: String,
    rect: Cell<Rect>,
}

impl SectionAnchor {
    /// Mount an anchor; the caller keeps the only strong reference.
    pub fn new(id: impl Into<String>, rect: Rect) -> Rc<Self> {
        Rc::new(Self {
            id: id.into(),
            rect: Cell::new(rect),
        })
    }

    /// Section id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Current layout box in document coordinates.
    pub fn rect(&self) -> Rect {
        self.rect.get()
    }

    /// Record a new layout box after reflow; observers pick it up on re-prime.
    pub fn set_rect(&self, rect: Rect) {
        self.rect.set(rect);
    }

    /// Vertical extent used for progress.
    pub fn region(&self) -> Region {
        Region::from_rect(self.rect.get())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
/// Handle returned by [`ScrollObserver::observe`].
pub struct Subscription(pub u64);

/// Crossing of a region's scrub range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Edge {
    /// Progress moved into `(0, 1)`.
    Enter,
    /// Progress moved out of `(0, 1)`.
    Leave,
}

/// One card's measurement for a frame.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct ProgressUpdate {
    /// Registry index of the card.
    pub card: usize,
    /// Scrub progress in `[0, 1]`.
    pub progress: f64,
    /// Whether the card's region intersects the viewport.
    pub in_view: bool,
    /// Set when progress moved into or out of `(0, 1)` this frame.
    pub edge: Option<Edge>,
}

#[derive(Debug)]
struct Observed {
    sub: Subscription,
    card: usize,
    anchor: Weak<SectionAnchor>,
    region: Region,
    last_progress: Option<f64>,
}

/// Coalescing scroll observer.
///
/// Raw scroll offsets are recorded by [`ScrollObserver::set_scroll`] as often
/// as the host likes; progress is only computed in
/// [`ScrollObserver::on_frame`], once per frame and in card-index order.
#[derive(Debug)]
pub struct ScrollObserver {
    viewport: Viewport,
    scroll: f64,
    dirty: bool,
    measured: bool,
    next_sub: u64,
    observed: Vec<Observed>, // sorted by card index
}

impl ScrollObserver {
    /// Observer at scroll 0; the first frame measures every subscription.
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            scroll: 0.0,
            dirty: true,
            measured: false,
            next_sub: 0,
            observed: Vec::new(),
        }
    }

    /// Start measuring `anchor` on behalf of `card`.
    pub fn observe(&mut self, card: usize, anchor: &Rc<SectionAnchor>) -> Subscription {
        let sub = Subscription(self.next_sub);
        self.next_sub += 1;
        let pos = self.observed.partition_point(|o| o.card <= card);
        self.observed.insert(
            pos,
            Observed {
                sub,
                card,
                anchor: Rc::downgrade(anchor),
                region: anchor.region(),
                last_progress: None,
            },
        );
        self.dirty = true;
        sub
    }

    /// Stop delivering updates for `sub`. Returns whether it was still live.
    pub fn unobserve(&mut self, sub: Subscription) -> bool {
        let before = self.observed.len();
        self.observed.retain(|o| o.sub != sub);
        before != self.observed.len()
    }

    /// Record a raw offset. Negative and non-finite values clamp to 0.
    pub fn set_scroll(&mut self, offset: f64) {
        let offset = if offset.is_finite() { offset.max(0.0) } else { 0.0 };
        if offset != self.scroll {
            self.scroll = offset;
            self.dirty = true;
        }
    }

    /// Latest recorded offset.
    pub fn scroll_offset(&self) -> f64 {
        self.scroll
    }

    /// Viewport used for progress.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Force the next frame to re-emit every live subscription.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// At least one frame has computed progress.
    pub fn has_measured(&self) -> bool {
        self.measured
    }

    /// Live subscriptions.
    pub fn len(&self) -> usize {
        self.observed.len()
    }

    /// No live subscriptions.
    pub fn is_empty(&self) -> bool {
        self.observed.is_empty()
    }

    /// Progress last reported for `card`.
    pub fn progress_of(&self, card: usize) -> Option<f64> {
        self.observed
            .iter()
            .find(|o| o.card == card)
            .and_then(|o| o.last_progress)
    }

    /// Re-read every live anchor's geometry. Subscriptions whose anchor was
    /// dropped are removed; their count is returned.
    pub fn reprime(&mut self, viewport: Option<Viewport>) -> usize {
        if let Some(v) = viewport {
            self.viewport = v;
        }
        let before = self.observed.len();
        self.observed.retain_mut(|o| match o.anchor.upgrade() {
            Some(anchor) => {
                o.region = anchor.region();
                true
            }
            None => false,
        });
        let dropped = before - self.observed.len();
        if dropped > 0 {
            tracing::warn!(dropped, "dropped subscriptions for detached anchors");
        }
        self.dirty = true;
        dropped
    }

    /// Apply an old→new card index remapping after registry compaction.
    pub fn remap(&mut self, remap: &[Option<usize>]) {
        self.observed.retain_mut(|o| match remap.get(o.card).copied().flatten() {
            Some(new) => {
                o.card = new;
                true
            }
            None => false,
        });
        self.observed.sort_by_key(|o| o.card);
    }

    /// One coalesced measurement. Empty when nothing changed since the last frame.
    pub fn on_frame(&mut self) -> Vec<ProgressUpdate> {
        if !self.dirty {
            return Vec::new();
        }
        self.dirty = false;
        self.measured = true;

        let mut out = Vec::with_capacity(self.observed.len());
        for o in &mut self.observed {
            if o.anchor.strong_count() == 0 {
                continue;
            }
            let progress = o.region.progress_at(self.scroll, self.viewport.height);
            let in_view = o.region.intersects(self.scroll, self.viewport.height);
            let was_inside = o.last_progress.is_some_and(|p| p > 0.0 && p < 1.0);
            let is_inside = progress > 0.0 && progress < 1.0;
            let edge = match (was_inside, is_inside) {
                (false, true) => Some(Edge::Enter),
                (true, false) => Some(Edge::Leave),
                _ => None,
            };
            o.last_progress = Some(progress);
            out.push(ProgressUpdate {
                card: o.card,
                progress,
                in_view,
                edge,
            });
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scroll/observer.rs"]
mod tests;
