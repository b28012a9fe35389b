//! Availability and conflict-safe booking engine.
//!
//! Lists bookable free slots by subtracting live calendar busy time from a
//! recurring slot timetable, and commits a booking only after a fresh
//! conflict re-check against the live calendar. All I/O goes through the
//! [`ports`] traits; the engine itself holds no mutable state, so any number
//! of requests can run against one instance concurrently.

pub mod error;
pub mod interval;
pub mod ports;
pub mod resolver;
pub mod types;

mod availability;
mod booking;

use std::sync::Arc;

use chrono_tz::Tz;

pub use availability::FreeSlotSet;
pub use error::{EngineError, Result};
pub use types::{Attendee, BookingRequest, EventDraft, EventRef, ResolvedSlot, SlotTemplate};

use ports::{CalendarProvider, TemplateStore};

/// The engine facade. Construct once at startup with the real adapters (or
/// stubs in tests) and share via `Arc`.
pub struct Engine {
    store: Arc<dyn TemplateStore>,
    calendar: Arc<dyn CalendarProvider>,
    zone: Tz,
}

impl Engine {
    pub fn new(store: Arc<dyn TemplateStore>, calendar: Arc<dyn CalendarProvider>, zone: Tz) -> Self {
        Self {
            store,
            calendar,
            zone,
        }
    }

    /// The zone all wall-clock times resolve through.
    pub fn zone(&self) -> Tz {
        self.zone
    }
}
