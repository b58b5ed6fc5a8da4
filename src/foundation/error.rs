/// Convenience result type used across cardscroll.
pub type CardResult<T> = Result<T, CardError>;

/// Top-level error taxonomy used by controller, registry and timeline APIs.
///
/// Only registration and configuration surface these to callers. Navigation
/// entry points on [`crate::AnimationController`] translate them into
/// booleans and sentinels so UI code can fall back to native scrolling.
#[derive(thiserror::Error, Debug)]
pub enum CardError {
    /// A card with the same section id is already registered.
    #[error("duplicate card id '{0}'")]
    DuplicateId(String),

    /// No card is registered under the given id or index.
    #[error("unknown card '{0}'")]
    UnknownCard(String),

    /// Navigation was attempted before the controller reported readiness.
    #[error("controller is not ready")]
    NotReady,

    /// A programmatic navigation never received its scroll-settled signal.
    #[error("navigation ticket {ticket} did not settle within {waited_ms}ms")]
    StaleTransitionTimeout {
        /// Ticket returned by the scroll driver for the navigation.
        ticket: u64,
        /// Time waited before the flight was force-cleared.
        waited_ms: u64,
    },

    /// The thread's shared controller is not installed or is already borrowed.
    #[error("controller unavailable: {0}")]
    Unavailable(String),

    /// Invalid user-provided page, config or card data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Failure raised by timeline playback.
    #[error("animation error: {0}")]
    Animation(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CardError {
    /// Build a [`CardError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`CardError::Animation`] value.
    pub fn animation(msg: impl Into<String>) -> Self {
        Self::Animation(msg.into())
    }

    /// Build a [`CardError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Build a [`CardError::UnknownCard`] value.
    pub fn unknown_card(id: impl Into<String>) -> Self {
        Self::UnknownCard(id.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
