use std::{cell::RefCell, fs::File, io::BufReader, path::Path, rc::Rc};

use crate::{
    animation::config::{AnimationConfig, AnimationDefaults, parse_animation_with, parse_threshold},
    animation::factory::TimelineFactory,
    controller::{AnimationController, ControllerConfig, ControllerSnapshot, NavigationOutcome},
    events::ControllerEvent,
    foundation::core::{Millis, Viewport},
    foundation::error::{CardError, CardResult},
    lifecycle::LifecycleCoordinator,
    page::Page,
    scroll::driver::{RecordingScrollDriver, ScrollRequest, ScrollTicket},
    scroll::observer::SectionAnchor,
};

/// A scripted host session: scroll input, frames, resizes and navigation.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Script {
    /// Virtual milliseconds per animation frame.
    pub frame_ms: u64,
    /// Executed in order.
    pub steps: Vec<Step>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            frame_ms: 16,
            steps: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
/// One script instruction, tagged by `op` in JSON.
pub enum Step {
    /// Raw scroll offset; applied on the next frame.
    Scroll {
        /// Document offset of the viewport top.
        to: f64,
    },
    /// Run animation frames, each advancing the clock by `frame_ms`.
    Frames {
        /// Number of frames.
        count: u32,
    },
    /// Viewport resize; recompute runs once the debounce window passes.
    Resize {
        /// New viewport width.
        width: f64,
        /// New viewport height.
        height: f64,
    },
    /// Header/menu navigation by section id.
    Navigate {
        /// Target section id.
        section: String,
    },
    /// Navigation by card index, as a host's next/previous buttons would.
    NavigateIndex {
        /// Target card index.
        index: usize,
    },
    /// The in-flight smooth scroll reaches its target and reports back.
    Settle,
    /// Advance the clock without frames.
    Wait {
        /// Virtual milliseconds.
        ms: u64,
    },
    /// Late content such as fonts or images finished loading.
    ContentLoaded,
    /// The host removes a section's element.
    Unmount {
        /// Section id to drop.
        section: String,
    },
}

impl Script {
    /// Parse and validate a script from JSON text.
    pub fn from_json_str(s: &str) -> CardResult<Self> {
        let script: Self = serde_json::from_str(s)
            .map_err(|e| CardError::serde(format!("parse script JSON: {e}")))?;
        script.validate()?;
        Ok(script)
    }

    /// Load and validate a script from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> CardResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            CardError::validation(format!("open script JSON '{}': {e}", path.display()))
        })?;
        let script: Self = serde_json::from_reader(BufReader::new(f)).map_err(|e| {
            CardError::serde(format!("parse script JSON '{}': {e}", path.display()))
        })?;
        script.validate()?;
        Ok(script)
    }

    /// Rejects a zero frame length and non-finite scroll offsets.
    pub fn validate(&self) -> CardResult<()> {
        if self.frame_ms == 0 {
            return Err(CardError::validation("script frame_ms must be > 0"));
        }
        let bad_scroll = self
            .steps
            .iter()
            .any(|s| matches!(s, Step::Scroll { to } if !to.is_finite()));
        if bad_scroll {
            return Err(CardError::validation("scroll offsets must be finite"));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// A controller event stamped with the virtual clock.
pub struct TraceEntry {
    /// Virtual time the event was drained at.
    pub at_ms: u64,
    /// The event.
    pub event: ControllerEvent,
}

/// Everything observable about a finished run.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Trace {
    /// Events in emission order.
    pub entries: Vec<TraceEntry>,
    /// One outcome per `navigate` step.
    pub navigations: Vec<NavigationOutcome>,
    /// Everything the controller asked the scroll driver to do.
    pub scroll_requests: Vec<ScrollRequest>,
    /// Geometry recomputations performed by the lifecycle coordinator.
    pub recomputations: usize,
    /// Controller state after the last step.
    pub snapshot: ControllerSnapshot,
}

impl Trace {
    /// Events without their timestamps.
    pub fn events(&self) -> impl Iterator<Item = &ControllerEvent> {
        self.entries.iter().map(|e| &e.event)
    }
}

struct Session {
    ctrl: AnimationController,
    lifecycle: LifecycleCoordinator,
    driver: Rc<RefCell<RecordingScrollDriver>>,
    anchors: Vec<Rc<SectionAnchor>>,
    now: Millis,
    frame_ms: u64,
    pending: Option<(ScrollTicket, f64)>,
    entries: Vec<TraceEntry>,
    navigations: Vec<NavigationOutcome>,
}

impl Session {
    fn collect(&mut self) {
        let at_ms = self.now.0;
        self.entries.extend(
            self.ctrl
                .drain_events()
                .into_iter()
                .map(|event| TraceEntry { at_ms, event }),
        );
    }

    fn frame(&mut self) {
        self.now = self.now.saturating_add(self.frame_ms);
        self.lifecycle.on_frame(&mut self.ctrl, self.now);
        self.collect();
    }

    /// Host-side effect of a native scroll-into-view: jump straight there.
    fn jump_to(&mut self, section: &str) {
        if let Some(anchor) = self.anchors.iter().find(|a| a.id() == section) {
            self.ctrl.set_scroll(anchor.region().top);
        }
    }

    fn after_navigation(&mut self, accepted: bool) {
        if accepted {
            self.pending = self.driver.borrow().last_smooth();
        }
    }

    fn step(&mut self, step: &Step) -> CardResult<()> {
        match step {
            Step::Scroll { to } => self.ctrl.set_scroll(*to),
            Step::Frames { count } => {
                for _ in 0..*count {
                    self.frame();
                }
            }
            Step::Resize { width, height } => {
                let viewport = Viewport::new(*width, *height)?;
                self.lifecycle.on_resize(self.now, viewport);
            }
            Step::Navigate { section } => {
                let outcome = self.ctrl.navigate_to_section(section);
                match outcome {
                    NavigationOutcome::Accepted { .. } => self.after_navigation(true),
                    NavigationOutcome::Fallback { .. } => self.jump_to(section),
                }
                self.navigations.push(outcome);
            }
            Step::NavigateIndex { index } => {
                let accepted = self.ctrl.navigate_to_card(*index);
                self.after_navigation(accepted);
            }
            Step::Settle => {
                if let Some((ticket, offset)) = self.pending.take() {
                    self.ctrl.set_scroll(offset);
                    self.ctrl.on_scroll_settled(ticket);
                }
            }
            Step::Wait { ms } => {
                self.now = self.now.saturating_add(*ms);
                self.ctrl.poll(self.now);
                self.lifecycle.poll(self.now);
            }
            Step::ContentLoaded => self.lifecycle.on_content_loaded(),
            Step::Unmount { section } => {
                self.lifecycle.unmount(&mut self.ctrl, section);
                self.anchors.retain(|a| a.id() != section.as_str());
            }
        }
        self.collect();
        Ok(())
    }
}

/// Replay `script` against a freshly mounted `page`.
#[tracing::instrument(skip(page, script, config), fields(sections = page.sections.len(), steps = script.steps.len()))]
pub fn run(page: &Page, script: &Script, config: ControllerConfig) -> CardResult<Trace> {
    page.validate()?;
    script.validate()?;

    let driver = RecordingScrollDriver::shared();
    let lifecycle = LifecycleCoordinator::from_config(&config);
    let ctrl = AnimationController::new(config, page.viewport, driver.clone())?;
    let mut session = Session {
        ctrl,
        lifecycle,
        driver,
        anchors: page.mount_anchors(),
        now: Millis::default(),
        frame_ms: script.frame_ms,
        pending: None,
        entries: Vec::new(),
        navigations: Vec::new(),
    };
    session
        .lifecycle
        .mount_page(&mut session.ctrl, page, &session.anchors)?;
    session.collect();

    for step in &script.steps {
        session.step(step)?;
    }

    let scroll_requests = session.driver.borrow().requests().to_vec();
    tracing::debug!(events = session.entries.len(), "simulation finished");
    Ok(Trace {
        snapshot: session.ctrl.snapshot(),
        recomputations: session.lifecycle.recomputations(),
        entries: session.entries,
        navigations: session.navigations,
        scroll_requests,
    })
}

/// Parsed animation intent of one section.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct SectionReport {
    /// Section id.
    pub id: String,
    /// `None` when the section declares no animation.
    pub animation: Option<AnimationConfig>,
    /// Per-section threshold override.
    pub threshold: Option<f64>,
    /// Tweens the factory would build.
    pub tweens: usize,
    /// Length of the built timeline in seconds.
    pub duration_s: f64,
}

/// Parse every section of `page` without mounting anything.
pub fn inspect(page: &Page, defaults: &AnimationDefaults) -> Vec<SectionReport> {
    page.sections
        .iter()
        .map(|section| {
            let animation = parse_animation_with(section, defaults);
            let timeline = animation
                .as_ref()
                .map(|cfg| TimelineFactory::build(section, cfg));
            SectionReport {
                id: section.id.clone(),
                threshold: parse_threshold(section),
                tweens: timeline.as_ref().map_or(0, |tl| tl.tweens().len()),
                duration_s: timeline.as_ref().map_or(0.0, |tl| tl.duration_s()),
                animation,
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "../tests/unit/simulate.rs"]
mod tests;
