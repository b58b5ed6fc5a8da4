use std::rc::{Rc, Weak};

use crate::{
    animation::config::{parse_animation_with, parse_threshold},
    animation::factory::TimelineFactory,
    animation::timeline::{Timeline, TweenTimeline},
    controller::{AnimationController, ControllerConfig},
    foundation::core::{Millis, Viewport},
    foundation::error::{CardError, CardResult},
    page::{Element, Page},
    registry::CardDescriptor,
    scroll::observer::SectionAnchor,
};

#[derive(Debug)]
struct Mounted {
    id: String,
    anchor: Weak<SectionAnchor>,
}

/// Debounced geometry maintenance and mount/unmount bookkeeping.
///
/// A resize burst collapses into one recomputation: each `on_resize` restarts
/// the debounce window, `poll` arms a frame request once the window has
/// elapsed, and the recomputation itself runs inside the next `on_frame`.
#[derive(Debug)]
pub struct LifecycleCoordinator {
    debounce_ms: u64,
    pending_deadline: Option<Millis>,
    pending_viewport: Option<Viewport>,
    frame_requested: bool,
    mounted: Vec<Mounted>,
    recomputations: usize,
}

impl LifecycleCoordinator {
    /// Coordinator with the given resize debounce window.
    pub fn new(debounce_ms: u64) -> Self {
        Self {
            debounce_ms,
            pending_deadline: None,
            pending_viewport: None,
            frame_requested: false,
            mounted: Vec::new(),
            recomputations: 0,
        }
    }

    /// Uses [`ControllerConfig::resize_debounce_ms`].
    pub fn from_config(config: &ControllerConfig) -> Self {
        Self::new(config.resize_debounce_ms)
    }

    /// Parse, build and register one section.
    ///
    /// Sections without a recognised `data-animation` get an empty timeline so
    /// they still participate in activation and navigation.
    pub fn mount(
        &mut self,
        ctrl: &mut AnimationController,
        element: &Element,
        anchor: &Rc<SectionAnchor>,
    ) -> CardResult<usize> {
        if element.id != anchor.id() {
            return Err(CardError::validation(format!(
                "element '{}' mounted on anchor '{}'",
                element.id,
                anchor.id()
            )));
        }
        let timeline: Box<dyn Timeline> =
            match parse_animation_with(element, &ctrl.config().animation) {
                Some(config) => Box::new(TimelineFactory::build(element, &config)),
                None => Box::new(TweenTimeline::empty()),
            };
        let mut desc = CardDescriptor::new(anchor, timeline);
        if let Some(t) = parse_threshold(element) {
            desc = desc.with_threshold(t);
        }
        let index = ctrl.register_card(desc)?;
        self.mounted.push(Mounted {
            id: element.id.clone(),
            anchor: Rc::downgrade(anchor),
        });
        Ok(index)
    }

    /// Mount every section of `page` in document order, then declare
    /// registration complete. `anchors` must pair up with `page.sections`.
    pub fn mount_page(
        &mut self,
        ctrl: &mut AnimationController,
        page: &Page,
        anchors: &[Rc<SectionAnchor>],
    ) -> CardResult<Vec<usize>> {
        if anchors.len() != page.sections.len() {
            return Err(CardError::validation(format!(
                "{} anchors for {} sections",
                anchors.len(),
                page.sections.len()
            )));
        }
        let indices = page
            .sections
            .iter()
            .zip(anchors)
            .map(|(section, anchor)| self.mount(ctrl, section, anchor))
            .collect::<CardResult<Vec<_>>>()?;
        ctrl.mark_registration_complete();
        tracing::debug!(cards = indices.len(), "page mounted");
        Ok(indices)
    }

    /// Restart the debounce window. Only the last viewport of a burst is kept.
    pub fn on_resize(&mut self, now: Millis, viewport: Viewport) {
        self.pending_deadline = Some(now.saturating_add(self.debounce_ms));
        self.pending_viewport = Some(viewport);
    }

    /// Fonts or images finished loading; recompute on the next frame.
    pub fn on_content_loaded(&mut self) {
        self.frame_requested = true;
    }

    /// Arm a frame request if the debounce window has elapsed.
    pub fn poll(&mut self, now: Millis) -> bool {
        if self.pending_deadline.is_some_and(|d| now >= d) {
            self.pending_deadline = None;
            self.frame_requested = true;
        }
        self.frame_requested
    }

    /// Animation-frame callback: run any due recomputation, then forward the
    /// frame to the controller. Returns whether geometry was recomputed.
    pub fn on_frame(&mut self, ctrl: &mut AnimationController, now: Millis) -> bool {
        self.poll(now);
        let recomputed = if self.frame_requested {
            self.frame_requested = false;
            let cards = ctrl.recompute_geometry(self.pending_viewport.take());
            self.recomputations += 1;
            self.mounted.retain(|m| ctrl.card_by_id(&m.id).is_some());
            tracing::debug!(cards, "geometry recomputed");
            true
        } else {
            false
        };
        ctrl.on_frame(now);
        recomputed
    }

    /// Push a re-measured element into its anchor and rebuild that card's
    /// timeline in place.
    pub fn refresh_section(&mut self, ctrl: &mut AnimationController, element: &Element) -> bool {
        let Some(anchor) = self
            .mounted
            .iter()
            .find(|m| m.id == element.id)
            .and_then(|m| m.anchor.upgrade())
        else {
            return false;
        };
        anchor.set_rect(element.rect);
        if let Some(config) = parse_animation_with(element, &ctrl.config().animation) {
            ctrl.rebuild_timeline(&element.id, element, &config);
        }
        self.frame_requested = true;
        true
    }

    /// Forget one section and unregister its card.
    pub fn unmount(&mut self, ctrl: &mut AnimationController, id: &str) -> bool {
        let before = self.mounted.len();
        self.mounted.retain(|m| m.id != id);
        ctrl.unregister_card(id) || before != self.mounted.len()
    }

    /// Unregister every owned card and cancel pending debounce/frame work.
    pub fn unmount_all(&mut self, ctrl: &mut AnimationController) -> usize {
        self.pending_deadline = None;
        self.pending_viewport = None;
        self.frame_requested = false;
        self.mounted
            .drain(..)
            .filter(|m| ctrl.unregister_card(&m.id))
            .count()
    }

    /// Geometry recomputations run so far.
    pub fn recomputations(&self) -> usize {
        self.recomputations
    }

    /// A debounced resize or a frame-scheduled recompute is outstanding.
    pub fn has_pending(&self) -> bool {
        self.pending_deadline.is_some() || self.frame_requested
    }

    /// Sections currently mounted through this coordinator.
    pub fn mounted(&self) -> usize {
        self.mounted.len()
    }
}

#[cfg(test)]
#[path = "../tests/unit/lifecycle.rs"]
mod tests;
