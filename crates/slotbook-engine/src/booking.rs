//! Conflict-safe booking: resolve, re-check, commit.

use chrono::Datelike;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::error::{EngineError, Result};
use crate::resolver;
use crate::types::{Attendee, BookingRequest, EventDraft, EventRef};
use crate::Engine;

impl Engine {
    /// Book the slot starting at `request.target_start`.
    ///
    /// Linear pipeline, early exit at each gate:
    /// 1. Resolve the target against the timetable (weekday-scoped store
    ///    read). No match is `SlotNotFound`, with zero calendar calls made.
    /// 2. Fresh busy query scoped to the resolved slot's own bounds. Any
    ///    overlap is `SlotBusy`. The check is never reused from an earlier
    ///    listing: time has passed since the client saw availability, and
    ///    only a query issued immediately before the commit is trustworthy.
    /// 3. Create the event: requester first in the attendee list, then the
    ///    template roster in stored order. A failed create surfaces as
    ///    `Upstream` and the booking is not committed; nothing local was
    ///    mutated, so no compensation is needed.
    ///
    /// The gap between the check and the create is not locked; two requests
    /// racing for one slot inside it is an accepted best-effort limit.
    #[instrument(skip(self, request), fields(target = %request.target_start), level = "info")]
    pub async fn book(&self, request: BookingRequest) -> Result<EventRef> {
        let weekday = request.target_start.with_timezone(&self.zone).weekday();
        let templates = self.store.templates_for_weekday(weekday).await?;

        let slot = resolver::resolve_at(&templates, self.zone, request.target_start)
            .ok_or(EngineError::SlotNotFound(request.target_start))?;
        debug!(start = %slot.start, end = %slot.end, "slot resolved");

        let busy = self.calendar.busy_between(slot.start, slot.end).await?;
        let bounds = slot.interval();
        if busy.iter().any(|b| bounds.overlaps(b)) {
            warn!(start = %slot.start, "conflict check found slot busy");
            return Err(EngineError::SlotBusy {
                start: slot.start,
                end: slot.end,
            });
        }

        let mut attendees = Vec::with_capacity(slot.attendees.len() + 1);
        attendees.push(Attendee {
            name: request.requester_name.clone(),
            email: request.requester_email.clone(),
        });
        attendees.extend(slot.attendees.iter().cloned());

        let draft = EventDraft {
            summary: format!("Booking for {}", request.requester_name),
            description: request.description,
            start: slot.start,
            end: slot.end,
            attendees,
            request_id: Uuid::new_v4().to_string(),
        };

        let event = self.calendar.create_event(&draft).await?;
        info!(event_id = %event.id, start = %slot.start, "booking committed");
        Ok(event)
    }
}
