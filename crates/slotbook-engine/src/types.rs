//! Engine data types: templates, resolved slots, booking inputs and outputs.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::interval::Interval;

/// A participant attached to a slot template or a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
    pub name: String,
    pub email: String,
}

/// A recurring, weekday-keyed definition of a bookable window.
///
/// Owned by the store; read-only to the engine. Defines the *shape* of a
/// slot, not a concrete date.
#[derive(Debug, Clone)]
pub struct SlotTemplate {
    pub id: i64,
    pub weekday: Weekday,
    /// Wall-clock start in the configured zone.
    pub start_time: NaiveTime,
    pub duration: Duration,
    /// Fixed roster invited to every booking of this slot, in stored order.
    pub attendees: Vec<Attendee>,
}

/// A slot template instantiated onto a concrete calendar date.
///
/// Derived per request, never persisted.
#[derive(Debug, Clone)]
pub struct ResolvedSlot {
    pub date: NaiveDate,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub attendees: Vec<Attendee>,
}

impl ResolvedSlot {
    /// The slot bounds as a half-open interval.
    pub fn interval(&self) -> Interval {
        Interval::new(self.start, self.end)
    }
}

/// A booking submission.
///
/// The engine re-derives the authoritative slot from `target_start`; an end
/// time supplied by a client is never trusted.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub target_start: DateTime<Utc>,
    pub requester_name: String,
    pub requester_email: String,
    pub description: Option<String>,
}

/// The event payload handed to the calendar provider for creation.
#[derive(Debug, Clone)]
pub struct EventDraft {
    pub summary: String,
    pub description: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Requester first, then the template roster in stored order.
    pub attendees: Vec<Attendee>,
    /// Idempotent-request marker forwarded to the provider.
    pub request_id: String,
}

/// Reference to an event created in the external calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRef {
    pub id: String,
    pub html_link: Option<String>,
}
