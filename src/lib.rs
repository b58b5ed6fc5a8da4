//! cardscroll drives scroll-synchronized "card" entrance animations for
//! single-page layouts.
//!
//! Each page section is a card: it carries a declarative intent
//! (`data-animation`, `data-duration`, ...) that is parsed once into a typed
//! [`AnimationConfig`], built into a paused entrance [`Timeline`], and
//! registered with the [`AnimationController`]. The controller keeps exactly
//! one card active as the reader scrolls, and supports programmatic jumps from
//! header or menu navigation.
//!
//! # Host model
//!
//! The crate never touches a real DOM or clock. A host:
//!
//! 1. mounts sections through [`LifecycleCoordinator::mount_page`],
//! 2. forwards raw scroll offsets with [`AnimationController::set_scroll`],
//! 3. calls [`LifecycleCoordinator::on_frame`] once per animation frame with a
//!    monotonic [`Millis`] timestamp,
//! 4. reports smooth-scroll completion with
//!    [`AnimationController::on_scroll_settled`].
//!
//! Everything runs on one UI thread; see [`runtime`] for the per-thread
//! controller handle.
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic**: given the same inputs and timestamps, the same events
//!   are emitted in the same order.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod animation;
mod controller;
mod events;
mod foundation;
mod lifecycle;
mod page;
mod registry;
mod scroll;
mod simulate;

/// Explicit one-time controller installation for the UI thread.
pub mod runtime;

pub use animation::config::{
    ATTR_ANIMATION, ATTR_DELAY, ATTR_DURATION, ATTR_EASE, ATTR_GROUP_DELAY, ATTR_STAGGER,
    ATTR_THRESHOLD, AnimationConfig, AnimationDefaults, AttributeSource, EffectKind, SlideDir,
    parse_animation, parse_animation_with, parse_threshold,
};
pub use animation::ease::Ease;
pub use animation::factory::TimelineFactory;
pub use animation::timeline::{
    Completion, Direction, ElementStyle, Lerp, Property, Timeline, Tween, TweenTimeline,
};
pub use controller::{
    AnimationController, CardSnapshot, ControllerConfig, ControllerSnapshot, FallbackReason,
    NavigationOutcome, TieBreak,
};
pub use events::{
    CardCallback, CardEvent, ControllerEvent, Dispatch, EventBus, Listener, ListenerId,
    MAX_LOGGED_EVENTS, TransitionCause,
};
pub use foundation::core::{Millis, Point, Rect, Region, Vec2, Viewport};
pub use foundation::error::{CardError, CardResult};
pub use lifecycle::LifecycleCoordinator;
pub use page::{Element, Page};
pub use registry::{CardDescriptor, CardRegistry, CardState, IndexRemap};
pub use scroll::driver::{RecordingScrollDriver, ScrollDriver, ScrollRequest, ScrollTicket};
pub use scroll::observer::{Edge, ProgressUpdate, ScrollObserver, SectionAnchor, Subscription};
pub use simulate::{Script, SectionReport, Step, Trace, TraceEntry, inspect, run as simulate};
