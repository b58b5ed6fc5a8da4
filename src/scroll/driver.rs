use std::{cell::RefCell, rc::Rc};

/// Identifies one smooth-scroll request so its settle signal can be matched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ScrollTicket(pub u64);

/// The host's viewport-moving capability.
pub trait ScrollDriver {
    /// Start a smooth scroll to `offset`. Completion is reported back through
    /// [`crate::AnimationController::on_scroll_settled`] with the same ticket.
    fn smooth_scroll_to(&mut self, offset: f64) -> ScrollTicket;

    /// Native scroll-into-view fallback; carries no card-state side effects.
    fn scroll_into_view(&mut self, anchor_id: &str);
}

impl<D: ScrollDriver> ScrollDriver for Rc<RefCell<D>> {
    fn smooth_scroll_to(&mut self, offset: f64) -> ScrollTicket {
        self.borrow_mut().smooth_scroll_to(offset)
    }

    fn scroll_into_view(&mut self, anchor_id: &str) {
        self.borrow_mut().scroll_into_view(anchor_id);
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
/// A request recorded by [`RecordingScrollDriver`].
pub enum ScrollRequest {
    /// [`ScrollDriver::smooth_scroll_to`].
    Smooth {
        /// Ticket handed back to the caller.
        ticket: ScrollTicket,
        /// Target document offset.
        offset: f64,
    },
    /// [`ScrollDriver::scroll_into_view`].
    IntoView {
        /// Anchor the host scrolls to.
        anchor_id: String,
    },
}

/// Driver that records requests instead of moving anything.
#[derive(Clone, Debug, Default)]
pub struct RecordingScrollDriver {
    next_ticket: u64,
    requests: Vec<ScrollRequest>,
}

impl RecordingScrollDriver {
    /// Empty recorder; tickets start at 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// A recorder the test keeps a handle to while the controller drives it.
    pub fn shared() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Every request, oldest first.
    pub fn requests(&self) -> &[ScrollRequest] {
        &self.requests
    }

    /// Most recent smooth-scroll request, if any.
    pub fn last_smooth(&self) -> Option<(ScrollTicket, f64)> {
        self.requests.iter().rev().find_map(|r| match r {
            ScrollRequest::Smooth { ticket, offset } => Some((*ticket, *offset)),
            ScrollRequest::IntoView { .. } => None,
        })
    }

    /// Number of scroll-into-view fallbacks.
    pub fn into_view_count(&self) -> usize {
        self.requests
            .iter()
            .filter(|r| matches!(r, ScrollRequest::IntoView { .. }))
            .count()
    }
}

impl ScrollDriver for RecordingScrollDriver {
    fn smooth_scroll_to(&mut self, offset: f64) -> ScrollTicket {
        let ticket = ScrollTicket(self.next_ticket);
        self.next_ticket += 1;
        self.requests.push(ScrollRequest::Smooth { ticket, offset });
        ticket
    }

    fn scroll_into_view(&mut self, anchor_id: &str) {
        self.requests.push(ScrollRequest::IntoView {
            anchor_id: anchor_id.to_string(),
        });
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scroll/driver.rs"]
mod tests;
