//! Engine error taxonomy.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors surfaced by the engine and by its data-source ports.
///
/// Store and upstream failures are kept distinct so callers can tell "our
/// data is broken" from "the calendar provider is unavailable". Nothing here
/// is retried by the engine; retries belong to callers.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The requested instant does not correspond to any bookable slot.
    #[error("no bookable slot starts at {0}")]
    SlotNotFound(DateTime<Utc>),

    /// The pre-commit conflict check found the slot occupied.
    #[error("slot {start}..{end} is no longer free")]
    SlotBusy {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// The template store failed, or a stored record did not parse.
    #[error("slot store error: {0}")]
    Store(String),

    /// The external calendar could not be reached or rejected the call.
    #[error("calendar upstream error: {0}")]
    Upstream(String),
}

impl EngineError {
    /// Create a store error.
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store(message.into())
    }

    /// Create an upstream error.
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream(message.into())
    }

    /// Whether resubmitting the same request could ever succeed.
    ///
    /// `SlotNotFound` is terminal until the timetable changes; `SlotBusy` is
    /// terminal until the caller re-lists and picks another slot.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::SlotNotFound(_) | Self::SlotBusy { .. })
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
