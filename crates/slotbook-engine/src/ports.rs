//! Port traits for the engine's two external data sources.
//!
//! The engine never talks to Google or SQLite directly; it is handed one
//! implementation of each trait at construction. Both the conflict check and
//! the event create go through the same `CalendarProvider` value, so a
//! stronger booking guarantee (a reservation, a server-side idempotency key)
//! can be added behind the port without touching engine control flow.

use async_trait::async_trait;
use chrono::{DateTime, Utc, Weekday};

use crate::error::Result;
use crate::interval::Interval;
use crate::types::{EventDraft, EventRef, SlotTemplate};

/// Read/write access to the external calendar.
#[async_trait]
pub trait CalendarProvider: Send + Sync {
    /// Busy intervals for the configured calendar identity within
    /// `[from, to)`, sorted ascending by start.
    ///
    /// Implementations must not cache: correctness of the booking path
    /// depends on this being a live query. An identity absent from the
    /// upstream response means "no busy data", not an error.
    ///
    /// # Errors
    /// Returns `EngineError::Upstream` on transport, auth, quota, or
    /// deadline failure.
    async fn busy_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Vec<Interval>>;

    /// Create an event in the external calendar.
    ///
    /// # Errors
    /// Returns `EngineError::Upstream` on any failure; the engine treats a
    /// failed create as "not committed".
    async fn create_event(&self, draft: &EventDraft) -> Result<EventRef>;
}

/// Read access to the recurring slot timetable.
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// The full template set, ordered. An empty result is zero slots, not an
    /// error.
    ///
    /// # Errors
    /// Returns `EngineError::Store` if the read fails or a stored record
    /// does not parse.
    async fn all_templates(&self) -> Result<Vec<SlotTemplate>>;

    /// Templates keyed to a single weekday, used by the booking path's
    /// single-slot lookup.
    ///
    /// # Errors
    /// Returns `EngineError::Store` if the read fails or a stored record
    /// does not parse.
    async fn templates_for_weekday(&self, weekday: Weekday) -> Result<Vec<SlotTemplate>>;
}
