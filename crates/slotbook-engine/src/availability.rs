//! Free-slot listing: timetable candidates minus live busy time.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::{debug, instrument};

use crate::error::Result;
use crate::interval::{self, Interval};
use crate::resolver;
use crate::types::ResolvedSlot;
use crate::Engine;

/// Free slots grouped by date, dates ascending, slots chronological.
///
/// A date mapped to an empty list means the timetable offered slots that day
/// but every one of them was busy; a date with no timetable coverage is
/// absent altogether.
pub type FreeSlotSet = BTreeMap<NaiveDate, Vec<Interval>>;

/// Tightest window covering every candidate slot, for the single batched
/// busy query.
fn candidate_window(candidates: &BTreeMap<NaiveDate, Vec<ResolvedSlot>>) -> Option<Interval> {
    let start = candidates.values().flatten().map(|s| s.start).min()?;
    let end = candidates.values().flatten().map(|s| s.end).max()?;
    Some(Interval::new(start, end))
}

impl Engine {
    /// List free slots for the inclusive date range `[from, to]`.
    ///
    /// One store read, one batched busy query covering all candidates; zero
    /// candidates short-circuits without touching the calendar. A candidate
    /// overlapping any busy interval is dropped whole, never truncated.
    /// Read-only and safe to call concurrently; given unchanged external
    /// state the output is a pure function of the inputs.
    #[instrument(skip(self), level = "info")]
    pub async fn list_free(&self, from: NaiveDate, to: NaiveDate) -> Result<FreeSlotSet> {
        let templates = self.store.all_templates().await?;
        let candidates = resolver::resolve_range(&templates, self.zone, from, to);

        let Some(window) = candidate_window(&candidates) else {
            debug!("no timetable candidates in range, skipping busy query");
            return Ok(FreeSlotSet::new());
        };

        let busy = self.calendar.busy_between(window.start, window.end).await?;
        let busy = interval::merge(busy);

        let mut free = FreeSlotSet::new();
        for (date, slots) in candidates {
            let kept: Vec<Interval> = slots
                .iter()
                .map(ResolvedSlot::interval)
                .filter(|slot| !interval::overlaps_any(slot, &busy))
                .collect();
            free.insert(date, kept);
        }

        debug!(
            days = free.len(),
            slots = free.values().map(Vec::len).sum::<usize>(),
            "availability computed"
        );
        Ok(free)
    }

    /// Legacy range-grid mode: step-length free slots between busy periods
    /// in `[from, to)`, without consulting the timetable.
    #[instrument(skip(self), level = "info")]
    pub async fn free_grid(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        step: Duration,
    ) -> Result<Vec<Interval>> {
        let busy = interval::merge(self.calendar.busy_between(from, to).await?);
        Ok(interval::free_steps(&busy, from, to, step))
    }
}
