use std::{cell::RefCell, collections::VecDeque, rc::Rc};

use crate::scroll::driver::ScrollTicket;

/// Oldest entries are dropped beyond this many undrained events.
pub const MAX_LOGGED_EVENTS: usize = 1024;

/// Why a card changed state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionCause {
    /// Scroll progress crossed a threshold.
    Scroll,
    /// A programmatic navigation forced the state.
    Navigation,
}

/// Argument passed to per-card activation callbacks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CardEvent<'a> {
    /// Section id of the card.
    pub id: &'a str,
    /// Registry index at the time of the transition.
    pub index: usize,
    /// What drove the transition.
    pub cause: TransitionCause,
}

/// Per-card `on_activate` / `on_deactivate` hook.
pub type CardCallback = Box<dyn FnMut(&CardEvent<'_>)>;

pub(crate) type SharedCardCallback = Rc<RefCell<CardCallback>>;
type SharedListener = Rc<RefCell<Listener>>;

/// One card callback invocation, detached from the descriptor that owns the
/// callback so it can run after the controller is released.
pub(crate) struct CardCall {
    callback: SharedCardCallback,
    id: String,
    index: usize,
    cause: TransitionCause,
}

impl CardCall {
    pub(crate) fn new(
        callback: &SharedCardCallback,
        id: &str,
        index: usize,
        cause: TransitionCause,
    ) -> Self {
        Self {
            callback: Rc::clone(callback),
            id: id.to_string(),
            index,
            cause,
        }
    }

    fn invoke(&self) {
        // a callback that re-enters its own card is skipped, not double-borrowed
        if let Ok(mut cb) = self.callback.try_borrow_mut() {
            (*cb)(&CardEvent {
                id: &self.id,
                index: self.index,
                cause: self.cause,
            });
        }
    }
}

enum Delivery {
    Card(CardCall),
    Event(ControllerEvent),
}

/// Callback work queued while the controller was mutably borrowed.
///
/// Obtained from [`crate::AnimationController::take_dispatch`]; run it once
/// the borrow has been released so callbacks may freely read or drive the
/// shared controller.
#[must_use = "queued callbacks only run when the dispatch is run"]
pub struct Dispatch {
    listeners: Vec<SharedListener>,
    deliveries: Vec<Delivery>,
}

impl Dispatch {
    /// Number of queued card callbacks and events.
    pub fn len(&self) -> usize {
        self.deliveries.len()
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.deliveries.is_empty()
    }

    /// Invoke every queued callback in emission order.
    pub fn run(self) {
        for delivery in &self.deliveries {
            match delivery {
                Delivery::Card(call) => call.invoke(),
                Delivery::Event(event) => deliver(&self.listeners, event),
            }
        }
    }
}

impl std::fmt::Debug for Dispatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatch")
            .field("listeners", &self.listeners.len())
            .field("deliveries", &self.deliveries.len())
            .finish()
    }
}

fn deliver<'a>(listeners: impl IntoIterator<Item = &'a SharedListener>, event: &ControllerEvent) {
    for listener in listeners {
        if let Ok(mut l) = listener.try_borrow_mut() {
            (*l)(event);
        }
    }
}

/// Everything the controller reports, in emission order.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ControllerEvent {
    /// A card joined the registry.
    Registered {
        /// Section id.
        id: String,
        /// Assigned index.
        index: usize,
    },
    /// A card left the registry; `index` is its index before removal.
    Unregistered {
        /// Section id.
        id: String,
        /// Index the card held.
        index: usize,
    },
    /// A card started entering.
    Activated {
        /// Section id.
        id: String,
        /// Card index.
        index: usize,
        /// Scroll crossing or forced by navigation.
        cause: TransitionCause,
    },
    /// A card started leaving.
    Deactivated {
        /// Section id.
        id: String,
        /// Card index.
        index: usize,
        /// Scroll crossing or forced by navigation.
        cause: TransitionCause,
    },
    /// [`crate::AnimationController::is_ready`] flipped.
    ReadyChanged {
        /// New readiness.
        ready: bool,
    },
    /// A smooth scroll was requested for a programmatic jump.
    NavigationStarted {
        /// Target card index.
        target: usize,
        /// Ticket the settle signal must carry.
        ticket: ScrollTicket,
    },
    /// The in-flight navigation cleared.
    NavigationSettled {
        /// Ticket of the cleared flight.
        ticket: ScrollTicket,
        /// Cleared by the timeout rather than a settle signal.
        timed_out: bool,
    },
    /// The settle signal never arrived in time.
    StaleTransitionTimeout {
        /// Ticket of the stale flight.
        ticket: ScrollTicket,
        /// Time waited before force-clearing.
        waited_ms: u64,
    },
    /// Card geometry was re-read.
    GeometryRecomputed {
        /// Live cards after the pass.
        cards: usize,
    },
    /// The page is no longer navigable; the host decides whether to reset.
    CriticalAnimationFailure {
        /// Card whose timeline failed, when known.
        card: Option<String>,
        /// Rendered error.
        message: String,
    },
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Bus subscriber.
pub type Listener = Box<dyn FnMut(&ControllerEvent)>;

/// Single in-process bus owned by the controller.
///
/// By default listeners and card callbacks run synchronously as events are
/// emitted. In deferred mode they are queued instead and handed out as a
/// [`Dispatch`]. Every event is also logged for hosts that prefer to poll via
/// [`EventBus::drain`].
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<(ListenerId, SharedListener)>,
    log: VecDeque<ControllerEvent>,
    deferred: bool,
    outbox: Vec<Delivery>,
    next_id: u64,
}

impl EventBus {
    /// An inline bus with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a listener; it sees every later event.
    pub fn subscribe(&mut self, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Rc::new(RefCell::new(listener))));
        id
    }

    /// Remove a listener. Returns whether it was subscribed.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        before != self.listeners.len()
    }

    /// Queue callbacks instead of running them inline.
    ///
    /// Switching back to inline delivery keeps anything already queued.
    pub fn set_deferred(&mut self, deferred: bool) {
        self.deferred = deferred;
    }

    /// Whether callbacks are currently queued rather than run inline.
    pub fn is_deferred(&self) -> bool {
        self.deferred
    }

    /// Log `event` and deliver it to listeners, inline or queued.
    pub fn emit(&mut self, event: ControllerEvent) {
        if self.deferred {
            self.outbox.push(Delivery::Event(event.clone()));
        } else {
            deliver(self.listeners.iter().map(|(_, l)| l), &event);
        }
        if self.log.len() == MAX_LOGGED_EVENTS {
            self.log.pop_front();
        }
        self.log.push_back(event);
    }

    pub(crate) fn card(&mut self, call: CardCall) {
        if self.deferred {
            self.outbox.push(Delivery::Card(call));
        } else {
            call.invoke();
        }
    }

    /// Hand out everything queued in deferred mode, with the current
    /// listener set.
    pub fn take_dispatch(&mut self) -> Dispatch {
        Dispatch {
            listeners: self.listeners.iter().map(|(_, l)| Rc::clone(l)).collect(),
            deliveries: std::mem::take(&mut self.outbox),
        }
    }

    /// Take every logged event, oldest first.
    pub fn drain(&mut self) -> Vec<ControllerEvent> {
        self.log.drain(..).collect()
    }

    /// Logged events not yet drained.
    pub fn pending(&self) -> usize {
        self.log.len()
    }

    /// Callbacks queued in deferred mode and not yet dispatched.
    pub fn queued(&self) -> usize {
        self.outbox.len()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .field("log", &self.log.len())
            .field("deferred", &self.deferred)
            .field("queued", &self.outbox.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "../tests/unit/events.rs"]
mod tests;
