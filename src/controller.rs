use std::{fs::File, io::BufReader, path::Path};

use crate::{
    animation::config::{AnimationConfig, AnimationDefaults},
    animation::factory::TimelineFactory,
    animation::timeline::Completion,
    events::{ControllerEvent, Dispatch, EventBus, Listener, ListenerId, TransitionCause},
    foundation::core::{Millis, Viewport},
    foundation::error::{CardError, CardResult},
    page::Element,
    registry::{CardDescriptor, CardRegistry, CardState},
    scroll::driver::{ScrollDriver, ScrollTicket},
    scroll::observer::{ProgressUpdate, ScrollObserver},
};

/// Which card wins when several are at or above their threshold.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// The card furthest along in scroll order wins.
    #[default]
    HigherIndexWins,
    /// The card earliest in scroll order wins.
    LowerIndexWins,
}

impl TieBreak {
    fn pick(self, a: usize, b: usize) -> usize {
        match self {
            Self::HigherIndexWins => a.max(b),
            Self::LowerIndexWins => a.min(b),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Controller tuning. Every field has a default, so `{}` is a valid config.
#[serde(default)]
pub struct ControllerConfig {
    /// Threshold for cards that do not declare one.
    pub default_activation_threshold: f64,
    /// Resize debounce window.
    pub resize_debounce_ms: u64,
    /// Upper bound on waiting for a navigation's scroll-settled signal.
    pub navigation_timeout_ms: u64,
    /// Selection policy for simultaneous threshold crossings.
    pub tie_break: TieBreak,
    /// Fallbacks for unparsable animation attributes.
    pub animation: AnimationDefaults,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            default_activation_threshold: 0.3,
            resize_debounce_ms: 150,
            navigation_timeout_ms: 1200,
            tie_break: TieBreak::default(),
            animation: AnimationDefaults::default(),
        }
    }
}

impl ControllerConfig {
    /// Parse and validate a config from JSON text.
    pub fn from_json_str(s: &str) -> CardResult<Self> {
        let cfg: Self = serde_json::from_str(s)
            .map_err(|e| CardError::serde(format!("parse controller config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load and validate a config from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> CardResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            CardError::validation(format!("open controller config '{}': {e}", path.display()))
        })?;
        let cfg: Self = serde_json::from_reader(BufReader::new(f)).map_err(|e| {
            CardError::serde(format!(
                "parse controller config '{}': {e}",
                path.display()
            ))
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Threshold in `[0, 1]`, a non-zero timeout and a finite default duration.
    pub fn validate(&self) -> CardResult<()> {
        let t = self.default_activation_threshold;
        if !t.is_finite() || !(0.0..=1.0).contains(&t) {
            return Err(CardError::validation(
                "default_activation_threshold must be in [0, 1]",
            ));
        }
        if self.navigation_timeout_ms == 0 {
            return Err(CardError::validation("navigation_timeout_ms must be > 0"));
        }
        let d = self.animation.duration_s;
        if !d.is_finite() || d < 0.0 {
            return Err(CardError::validation(
                "animation.duration_s must be finite and >= 0",
            ));
        }
        Ok(())
    }
}

/// Observable state of one card.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct CardSnapshot {
    /// Section id.
    pub id: String,
    /// Registry index.
    pub index: usize,
    /// State machine position.
    pub state: CardState,
    /// Last measured scroll progress.
    pub progress: f64,
    /// Whether the region intersected the viewport at that measurement.
    pub in_view: bool,
    /// Effective activation threshold.
    pub threshold: f64,
    /// Timeline playhead in `[0, 1]`.
    pub timeline_progress: f64,
}

/// Observable controller state.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ControllerSnapshot {
    /// Cards in index order.
    pub cards: Vec<CardSnapshot>,
    /// See [`AnimationController::active_index`].
    pub active_index: Option<usize>,
    /// A programmatic navigation is waiting for its scroll to settle.
    pub transition_in_flight: bool,
    /// See [`AnimationController::is_ready`].
    pub ready: bool,
    /// A timeline error has latched the failure state.
    pub failed: bool,
}

impl ControllerSnapshot {
    /// Cards fully Active; never more than one.
    pub fn active_count(&self) -> usize {
        self.cards
            .iter()
            .filter(|c| c.state == CardState::Active)
            .count()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
/// Why a section navigation fell back to a native scroll-into-view.
pub enum FallbackReason {
    /// No card is registered for the section id.
    UnknownSection,
    /// Registration is incomplete or the controller has failed.
    NotReady,
    /// Another navigation is still in flight.
    Busy,
    /// The card's anchor has been dropped.
    Detached,
}

/// Result of [`AnimationController::navigate_to_section`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NavigationOutcome {
    /// A controlled navigation to the card started.
    Accepted {
        /// Target card index.
        index: usize,
    },
    /// A native scroll-into-view was issued instead.
    Fallback {
        /// Why the fallback was used.
        reason: FallbackReason,
    },
}

#[derive(Clone, Copy, Debug)]
struct Flight {
    ticket: ScrollTicket,
    target: usize,
    started: Millis,
    deadline: Millis,
}

/// Orchestrates card activation from scroll progress and programmatic
/// navigation.
///
/// The controller is the single owner of every card timeline. Hosts drive it
/// with [`set_scroll`](Self::set_scroll), [`on_frame`](Self::on_frame),
/// [`poll`](Self::poll) and [`on_scroll_settled`](Self::on_scroll_settled);
/// all methods run on the UI thread.
pub struct AnimationController {
    config: ControllerConfig,
    registry: CardRegistry,
    observer: ScrollObserver,
    driver: Box<dyn ScrollDriver>,
    bus: EventBus,
    active_index: Option<usize>,
    flight: Option<Flight>,
    registration_complete: bool,
    measured: bool,
    ready: bool,
    failed: bool,
    now: Millis,
    last_frame: Option<Millis>,
}

impl AnimationController {
    /// Validate `config` and build an empty controller.
    pub fn new(
        config: ControllerConfig,
        viewport: Viewport,
        driver: impl ScrollDriver + 'static,
    ) -> CardResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            registry: CardRegistry::new(),
            observer: ScrollObserver::new(viewport),
            driver: Box::new(driver),
            bus: EventBus::new(),
            active_index: None,
            flight: None,
            registration_complete: false,
            measured: false,
            ready: false,
            failed: false,
            now: Millis::default(),
            last_frame: None,
        })
    }

    /// Effective tuning.
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Latest host-supplied time.
    pub fn now(&self) -> Millis {
        self.now
    }

    // ---- registration ----

    /// Register a mounted section. The anchor must still be alive.
    pub fn register_card(&mut self, mut desc: CardDescriptor) -> CardResult<usize> {
        let anchor = desc.anchor().ok_or_else(|| {
            CardError::validation(format!("anchor for card '{}' is not mounted", desc.id))
        })?;
        if desc.activation_threshold.is_none() {
            desc.activation_threshold = Some(self.config.default_activation_threshold);
        }
        let id = desc.id.clone();
        let index = self.registry.register(desc)?;
        let sub = self.observer.observe(index, &anchor);
        if let Some(d) = self.registry.get_mut(index) {
            d.subscription = Some(sub);
        }
        tracing::debug!(card = %id, index, "registered card");
        self.bus.emit(ControllerEvent::Registered { id, index });
        Ok(index)
    }

    /// Unregister a card; unknown ids are a no-op returning `false`.
    pub fn unregister_card(&mut self, id: &str) -> bool {
        let Some(index) = self.registry.index_of(id) else {
            return false;
        };
        let Some(desc) = self.registry.unregister(id) else {
            return false;
        };
        if let Some(sub) = desc.subscription {
            self.observer.unobserve(sub);
        }
        if self.active_index == Some(index) {
            self.active_index = None;
        }
        tracing::debug!(card = %id, index, "unregistered card");
        self.bus.emit(ControllerEvent::Unregistered {
            id: desc.id,
            index,
        });
        if self.flight.is_none() {
            self.reclaim_slots();
        }
        self.observer.mark_dirty();
        true
    }

    /// Unregister every card, e.g. on route change. Returns how many were removed.
    pub fn unregister_all(&mut self) -> usize {
        let mut removed = 0;
        for id in self.registry.ids() {
            if self.unregister_card(&id) {
                removed += 1;
            }
        }
        removed
    }

    /// Declare that every section of the current route has registered.
    pub fn mark_registration_complete(&mut self) {
        self.registration_complete = true;
        self.refresh_ready();
    }

    fn reclaim_slots(&mut self) {
        if let Some(remap) = self.registry.reclaim() {
            self.observer.remap(&remap);
            self.active_index = self
                .active_index
                .and_then(|i| remap.get(i).copied().flatten());
        }
    }

    // ---- queries ----

    /// Registration is complete, geometry has been measured, and no timeline has failed.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Whether a timeline error has latched; cleared by `reset`.
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    /// A navigation is waiting for its scroll to settle or time out.
    pub fn is_transition_in_flight(&self) -> bool {
        self.flight.is_some()
    }

    /// The engaged card, if any. Moves as soon as a card starts Entering.
    pub fn active_index(&self) -> Option<usize> {
        self.active_index
    }

    /// Registered cards.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// No cards registered.
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Index for a section id, or `-1` when no such card is registered.
    pub fn card_index_by_section_id(&self, id: &str) -> isize {
        self.registry
            .index_of(id)
            .and_then(|i| isize::try_from(i).ok())
            .unwrap_or(-1)
    }

    /// Card at `index`.
    pub fn card(&self, index: usize) -> Option<&CardDescriptor> {
        self.registry.get(index)
    }

    /// Card registered for section `id`.
    pub fn card_by_id(&self, id: &str) -> Option<&CardDescriptor> {
        self.registry.by_id(id)
    }

    /// The scroll observer feeding progress to the cards.
    pub fn observer(&self) -> &ScrollObserver {
        &self.observer
    }

    /// Copy of every observable field, for assertions and traces.
    pub fn snapshot(&self) -> ControllerSnapshot {
        ControllerSnapshot {
            cards: self
                .registry
                .iter()
                .map(|d| CardSnapshot {
                    id: d.id.clone(),
                    index: d.index,
                    state: d.state,
                    progress: d.progress,
                    in_view: d.in_view,
                    threshold: d.activation_threshold(),
                    timeline_progress: d.timeline.progress(),
                })
                .collect(),
            active_index: self.active_index,
            transition_in_flight: self.flight.is_some(),
            ready: self.ready,
            failed: self.failed,
        }
    }

    // ---- event bus ----

    /// Add a listener for every [`ControllerEvent`].
    pub fn subscribe(&mut self, listener: Listener) -> ListenerId {
        self.bus.subscribe(listener)
    }

    /// Remove a listener; `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.bus.unsubscribe(id)
    }

    /// Take every logged event, oldest first.
    pub fn drain_events(&mut self) -> Vec<ControllerEvent> {
        self.bus.drain()
    }

    /// Queue card callbacks and listener deliveries instead of running them
    /// inside controller methods.
    ///
    /// Needed whenever the controller lives behind a `RefCell` that callbacks
    /// read; [`crate::runtime::init`] turns it on.
    pub fn set_deferred_dispatch(&mut self, deferred: bool) {
        self.bus.set_deferred(deferred);
    }

    /// Callbacks queued since the last call. Run the result after releasing
    /// any borrow of the controller.
    pub fn take_dispatch(&mut self) -> Dispatch {
        self.bus.take_dispatch()
    }

    // ---- host inputs ----

    /// Record a raw scroll offset; coalesced until the next frame.
    pub fn set_scroll(&mut self, offset: f64) {
        self.observer.set_scroll(offset);
    }

    /// Advance the clock without a frame, e.g. from a timer callback.
    pub fn poll(&mut self, now: Millis) {
        self.now = self.now.max(now);
        self.check_flight_timeout();
    }

    /// Animation-frame callback.
    ///
    /// Applies at most one coalesced progress measurement, then advances every
    /// timeline by the time elapsed since the previous frame.
    pub fn on_frame(&mut self, now: Millis) {
        let dt = self.last_frame.map_or(0, |prev| now.since(prev));
        self.last_frame = Some(now);
        self.now = self.now.max(now);
        self.check_flight_timeout();

        let updates = self.observer.on_frame();
        if self.observer.has_measured() {
            self.measured = true;
        }
        self.apply_progress(&updates);
        self.advance_timelines(dt);
    }

    /// Feed progress measured by an external observer.
    pub fn on_progress(&mut self, updates: &[ProgressUpdate]) {
        self.measured = true;
        self.apply_progress(updates);
    }

    /// Scroll-settled signal for a navigation ticket. Stale tickets are ignored.
    pub fn on_scroll_settled(&mut self, ticket: ScrollTicket) -> bool {
        match self.flight {
            Some(f) if f.ticket == ticket => {
                self.settle(false);
                true
            }
            _ => false,
        }
    }

    fn apply_progress(&mut self, updates: &[ProgressUpdate]) {
        let mut crossed = Vec::new();
        for u in updates {
            if let Some(d) = self.registry.get_mut(u.card) {
                let was_eligible = d.is_eligible();
                d.progress = u.progress;
                d.in_view = u.in_view;
                if d.is_eligible() && !was_eligible {
                    crossed.push(u.card);
                }
            }
        }
        self.refresh_ready();
        if !updates.is_empty() && self.flight.is_none() && !self.failed {
            self.reconcile(&crossed, TransitionCause::Scroll);
        }
    }

    fn refresh_ready(&mut self) {
        let ready = self.registration_complete && self.measured && !self.failed;
        if ready != self.ready {
            self.ready = ready;
            tracing::debug!(ready, "readiness changed");
            self.bus.emit(ControllerEvent::ReadyChanged { ready });
        }
    }

    // ---- scroll-driven state machine ----

    /// Converge card states to the latest measurements.
    ///
    /// Cards that became eligible in this update and are not engaged compete;
    /// the tie-break winner enters and every other engaged card leaves.
    /// Without a winner, engaged cards that lost eligibility leave. If that
    /// leaves nothing engaged, the tie-break winner among all eligible cards
    /// enters, which is how the visible card takes over after a reset or a
    /// settled jump.
    fn reconcile(&mut self, crossed: &[usize], cause: TransitionCause) {
        let tie_break = self.config.tie_break;
        let winner = crossed
            .iter()
            .copied()
            .filter(|&i| self.registry.get(i).is_some_and(|d| !d.state.is_engaged()))
            .reduce(|a, b| tie_break.pick(a, b));

        let leaving: Vec<usize> = self
            .registry
            .iter()
            .filter(|d| d.state.is_engaged())
            .filter(|d| match winner {
                Some(w) => d.index != w,
                None => !d.is_eligible(),
            })
            .map(|d| d.index)
            .collect();
        for index in leaving {
            self.begin_leave(index, cause);
        }

        let entering = winner.or_else(|| {
            if self.registry.iter().any(|d| d.state.is_engaged()) {
                return None;
            }
            self.registry
                .iter()
                .filter(|d| d.is_eligible())
                .map(|d| d.index)
                .reduce(|a, b| tie_break.pick(a, b))
        });
        match entering {
            Some(index) if !self.failed => self.begin_enter(index, cause),
            _ => {}
        }

        self.active_index = if self.failed {
            None
        } else {
            self.registry
                .iter()
                .find(|d| d.state.is_engaged())
                .map(|d| d.index)
        };
    }

    fn begin_enter(&mut self, index: usize, cause: TransitionCause) {
        let Some(desc) = self.registry.get_mut(index) else {
            return;
        };
        if let Err(e) = desc.timeline.play() {
            let id = desc.id.clone();
            self.critical_failure(Some(id), e);
            return;
        }
        desc.state = CardState::Entering;
        let call = desc.activate_call(cause);
        let id = desc.id.clone();
        tracing::debug!(card = %id, index, ?cause, "card entering");
        if let Some(call) = call {
            self.bus.card(call);
        }
        self.bus
            .emit(ControllerEvent::Activated { id, index, cause });
    }

    fn begin_leave(&mut self, index: usize, cause: TransitionCause) {
        let Some(desc) = self.registry.get_mut(index) else {
            return;
        };
        if let Err(e) = desc.timeline.reverse() {
            let id = desc.id.clone();
            self.critical_failure(Some(id), e);
            return;
        }
        desc.state = CardState::Leaving;
        let call = desc.deactivate_call(cause);
        let id = desc.id.clone();
        tracing::debug!(card = %id, index, ?cause, "card leaving");
        if let Some(call) = call {
            self.bus.card(call);
        }
        self.bus
            .emit(ControllerEvent::Deactivated { id, index, cause });
    }

    fn advance_timelines(&mut self, dt_ms: u64) {
        if self.failed {
            return;
        }
        let mut failure = None;
        for desc in self.registry.iter_mut() {
            match desc.timeline.advance(dt_ms) {
                Ok(Some(Completion::Forward)) if desc.state == CardState::Entering => {
                    desc.state = CardState::Active;
                }
                Ok(Some(Completion::Reverse)) if desc.state == CardState::Leaving => {
                    desc.state = CardState::Inactive;
                }
                Ok(_) => {}
                Err(e) => {
                    failure = Some((desc.id.clone(), e));
                    break;
                }
            }
        }
        if let Some((id, e)) = failure {
            self.critical_failure(Some(id), e);
        }
    }

    fn critical_failure(&mut self, card: Option<String>, err: CardError) {
        if self.failed {
            return;
        }
        self.failed = true;
        tracing::error!(card = ?card, error = %err, "critical animation failure");
        self.bus.emit(ControllerEvent::CriticalAnimationFailure {
            card,
            message: err.to_string(),
        });
        self.refresh_ready();
    }

    // ---- programmatic navigation ----

    /// Request a smooth jump to `target`.
    ///
    /// Returns `false` without side effects when `target` is out of range, the
    /// controller is not ready, or another navigation is still in flight.
    /// `true` acknowledges acceptance; visual state is forced immediately and
    /// the flight clears when the scroll settles or times out.
    #[tracing::instrument(skip(self))]
    pub fn navigate_to_card(&mut self, target: usize) -> bool {
        if self.flight.is_some() {
            tracing::debug!("navigation rejected: transition in flight");
            return false;
        }
        if !self.ready {
            tracing::debug!("navigation rejected: not ready");
            return false;
        }
        let Some(anchor) = self.registry.get(target).and_then(CardDescriptor::anchor) else {
            tracing::debug!("navigation rejected: no live card at index");
            return false;
        };

        let offset = anchor.region().top.max(0.0);
        let ticket = self.driver.smooth_scroll_to(offset);
        self.flight = Some(Flight {
            ticket,
            target,
            started: self.now,
            deadline: self.now.saturating_add(self.config.navigation_timeout_ms),
        });
        self.bus
            .emit(ControllerEvent::NavigationStarted { target, ticket });
        self.force_states(target);
        true
    }

    /// Header/menu entry point: navigate by section id, or fall back to a
    /// native scroll-into-view.
    pub fn navigate_to_section(&mut self, id: &str) -> NavigationOutcome {
        let reason = match self.registry.index_of(id) {
            None => FallbackReason::UnknownSection,
            Some(_) if self.flight.is_some() => FallbackReason::Busy,
            Some(_) if !self.ready => FallbackReason::NotReady,
            Some(index) => {
                if self.navigate_to_card(index) {
                    return NavigationOutcome::Accepted { index };
                }
                FallbackReason::Detached
            }
        };
        tracing::debug!(section = id, ?reason, "falling back to native scroll");
        self.driver.scroll_into_view(id);
        NavigationOutcome::Fallback { reason }
    }

    /// Navigate to the card after the active one (or the first card).
    pub fn next(&mut self) -> bool {
        let target = self.active_index.map_or(0, |i| i + 1);
        self.navigate_to_card(target)
    }

    /// Navigate to the card before the active one; `false` at the first card or with none active.
    pub fn previous(&mut self) -> bool {
        match self.active_index {
            Some(i) if i > 0 => self.navigate_to_card(i - 1),
            _ => false,
        }
    }

    fn force_states(&mut self, target: usize) {
        let others: Vec<usize> = self
            .registry
            .iter()
            .filter(|d| d.index != target && d.state != CardState::Inactive)
            .map(|d| d.index)
            .collect();
        for index in others {
            self.force_inactive(index);
        }
        self.force_active(target);
        self.active_index = Some(target);
    }

    fn force_active(&mut self, index: usize) {
        let Some(desc) = self.registry.get_mut(index) else {
            return;
        };
        if let Err(e) = desc.timeline.pause().and_then(|()| desc.timeline.seek(1.0)) {
            let id = desc.id.clone();
            self.critical_failure(Some(id), e);
            return;
        }
        let was = desc.state;
        desc.state = CardState::Active;
        if !was.is_engaged() {
            let call = desc.activate_call(TransitionCause::Navigation);
            let id = desc.id.clone();
            if let Some(call) = call {
                self.bus.card(call);
            }
            self.bus.emit(ControllerEvent::Activated {
                id,
                index,
                cause: TransitionCause::Navigation,
            });
        }
    }

    fn force_inactive(&mut self, index: usize) {
        let Some(desc) = self.registry.get_mut(index) else {
            return;
        };
        if let Err(e) = desc.timeline.pause().and_then(|()| desc.timeline.seek(0.0)) {
            let id = desc.id.clone();
            self.critical_failure(Some(id), e);
            return;
        }
        let was = desc.state;
        desc.state = CardState::Inactive;
        if was.is_engaged() {
            let call = desc.deactivate_call(TransitionCause::Navigation);
            let id = desc.id.clone();
            if let Some(call) = call {
                self.bus.card(call);
            }
            self.bus.emit(ControllerEvent::Deactivated {
                id,
                index,
                cause: TransitionCause::Navigation,
            });
        }
    }

    fn check_flight_timeout(&mut self) {
        let Some(flight) = self.flight else {
            return;
        };
        if self.now < flight.deadline {
            return;
        }
        let waited_ms = self.now.since(flight.started);
        let err = CardError::StaleTransitionTimeout {
            ticket: flight.ticket.0,
            waited_ms,
        };
        tracing::warn!(error = %err, target = flight.target, "force-clearing stale navigation");
        self.bus.emit(ControllerEvent::StaleTransitionTimeout {
            ticket: flight.ticket,
            waited_ms,
        });
        self.settle(true);
    }

    fn settle(&mut self, timed_out: bool) {
        let Some(flight) = self.flight.take() else {
            return;
        };
        self.bus.emit(ControllerEvent::NavigationSettled {
            ticket: flight.ticket,
            timed_out,
        });
        self.reclaim_slots();
        // the next frame re-measures and reconciles against the settled offset
        self.observer.mark_dirty();
    }

    // ---- geometry & lifecycle ----

    /// Re-read every card's region and re-prime the observer.
    ///
    /// Cards whose anchor has been dropped are unregistered. Returns the
    /// number of live cards.
    #[tracing::instrument(skip(self))]
    pub fn recompute_geometry(&mut self, viewport: Option<Viewport>) -> usize {
        let detached: Vec<String> = self
            .registry
            .iter()
            .filter(|d| d.anchor().is_none())
            .map(|d| d.id.clone())
            .collect();
        for id in &detached {
            tracing::warn!(card = %id, "anchor detached without unregister");
            self.unregister_card(id);
        }
        self.observer.reprime(viewport);
        let cards = self.registry.len();
        self.bus.emit(ControllerEvent::GeometryRecomputed { cards });
        cards
    }

    /// Rebuild a card's timeline from re-measured content, keeping its state
    /// and playhead.
    pub fn rebuild_timeline(
        &mut self,
        id: &str,
        element: &Element,
        config: &AnimationConfig,
    ) -> bool {
        let Some(index) = self.registry.index_of(id) else {
            return false;
        };
        let Some(desc) = self.registry.get_mut(index) else {
            return false;
        };
        let progress = desc.timeline.progress();
        TimelineFactory::rebuild(&mut desc.timeline, element, config);
        let resumed = desc
            .timeline
            .seek(progress)
            .and_then(|()| match desc.state {
                CardState::Entering => desc.timeline.play(),
                CardState::Leaving => desc.timeline.reverse(),
                CardState::Active | CardState::Inactive => Ok(()),
            });
        if let Err(e) = resumed {
            let id = desc.id.clone();
            self.critical_failure(Some(id), e);
        }
        true
    }

    /// Clear a critical failure and return every card to Inactive.
    pub fn reset(&mut self) {
        self.failed = false;
        self.flight = None;
        self.active_index = None;
        let mut failure = None;
        for desc in self.registry.iter_mut() {
            desc.state = CardState::Inactive;
            if let Err(e) = desc.timeline.pause().and_then(|()| desc.timeline.seek(0.0)) {
                failure.get_or_insert((desc.id.clone(), e));
            }
        }
        self.observer.mark_dirty();
        self.refresh_ready();
        if let Some((id, e)) = failure {
            self.critical_failure(Some(id), e);
        }
    }
}

impl std::fmt::Debug for AnimationController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationController")
            .field("cards", &self.registry.len())
            .field("active_index", &self.active_index)
            .field("in_flight", &self.flight.is_some())
            .field("ready", &self.ready)
            .field("failed", &self.failed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../tests/unit/controller.rs"]
mod tests;
