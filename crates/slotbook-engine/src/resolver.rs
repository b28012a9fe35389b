//! Timetable resolution: recurring slot templates onto concrete dates.
//!
//! Templates carry a weekday and a wall-clock time in the configured zone;
//! resolution converts each match into UTC instants. Date ranges here are
//! inclusive on both ends, unlike the half-open interval convention used for
//! instants. That asymmetry is deliberate: a caller asking for "Monday
//! through Friday" expects Friday's slots.

use std::collections::BTreeMap;

use chrono::offset::LocalResult;
use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

use crate::types::{ResolvedSlot, SlotTemplate};

/// Instantiate one template onto one date.
///
/// Returns `None` when the local wall-clock time does not exist on that date
/// (DST spring-forward gap). Ambiguous local times (fall-back repeat) take
/// the earlier instant.
fn instantiate(template: &SlotTemplate, zone: Tz, date: NaiveDate) -> Option<ResolvedSlot> {
    let local = date.and_time(template.start_time);
    let start = match zone.from_local_datetime(&local) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earlier, _) => earlier,
        LocalResult::None => return None,
    };

    let start = start.with_timezone(&Utc);
    Some(ResolvedSlot {
        date,
        start,
        end: start + template.duration,
        attendees: template.attendees.clone(),
    })
}

/// Expand templates over `[from, to]` inclusive.
///
/// For every date in the range, every template whose weekday matches emits
/// one resolved slot. Slots within a date are chronological. Dates where no
/// template matched are omitted entirely; "date present with an empty list"
/// is reserved for the availability layer's no-free-slots signal.
pub fn resolve_range(
    templates: &[SlotTemplate],
    zone: Tz,
    from: NaiveDate,
    to: NaiveDate,
) -> BTreeMap<NaiveDate, Vec<ResolvedSlot>> {
    let mut resolved = BTreeMap::new();

    for date in from.iter_days().take_while(|d| *d <= to) {
        let mut slots: Vec<ResolvedSlot> = templates
            .iter()
            .filter(|t| t.weekday == date.weekday())
            .filter_map(|t| instantiate(t, zone, date))
            .collect();

        if slots.is_empty() {
            continue;
        }

        slots.sort_by_key(|s| s.start);
        resolved.insert(date, slots);
    }

    resolved
}

/// Locate the single template instance whose resolved start equals
/// `target_start` exactly.
///
/// Matching is exact by design: no tolerance window. The target's date (in
/// the configured zone) selects the weekday to try.
pub fn resolve_at(
    templates: &[SlotTemplate],
    zone: Tz,
    target_start: DateTime<Utc>,
) -> Option<ResolvedSlot> {
    let date = target_start.with_timezone(&zone).date_naive();

    templates
        .iter()
        .filter(|t| t.weekday == date.weekday())
        .filter_map(|t| instantiate(t, zone, date))
        .find(|slot| slot.start == target_start)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use chrono::{Duration, NaiveTime, Weekday};
    use chrono_tz::Tz;

    fn template(weekday: Weekday, hh: u32, mm: u32, minutes: i64) -> SlotTemplate {
        SlotTemplate {
            id: 1,
            weekday,
            start_time: NaiveTime::from_hms_opt(hh, mm, 0).unwrap(),
            duration: Duration::minutes(minutes),
            attendees: vec![],
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn expands_matching_weekdays_only() {
        let templates = vec![template(Weekday::Mon, 9, 0, 30)];
        // 2025-06-02 is a Monday.
        let resolved = resolve_range(&templates, chrono_tz::UTC, date(2025, 6, 2), date(2025, 6, 8));

        assert_eq!(resolved.len(), 1);
        let slots = &resolved[&date(2025, 6, 2)];
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].end - slots[0].start, Duration::minutes(30));
    }

    #[test]
    fn boundary_dates_are_inclusive() {
        let templates = vec![template(Weekday::Mon, 9, 0, 30)];
        let monday = date(2025, 6, 2);

        let resolved = resolve_range(&templates, chrono_tz::UTC, monday, monday);
        assert!(resolved.contains_key(&monday));
    }

    #[test]
    fn slots_within_a_date_are_chronological() {
        let templates = vec![
            template(Weekday::Mon, 14, 0, 30),
            template(Weekday::Mon, 9, 0, 30),
        ];
        let resolved = resolve_range(&templates, chrono_tz::UTC, date(2025, 6, 2), date(2025, 6, 2));

        let slots = &resolved[&date(2025, 6, 2)];
        assert_eq!(slots.len(), 2);
        assert!(slots[0].start < slots[1].start);
    }

    #[test]
    fn resolves_in_configured_zone() {
        let zone: Tz = "America/New_York".parse().unwrap();
        let templates = vec![template(Weekday::Mon, 9, 0, 30)];
        let resolved = resolve_range(&templates, zone, date(2025, 6, 2), date(2025, 6, 2));

        // 09:00 EDT (UTC-4) is 13:00 UTC.
        let slots = &resolved[&date(2025, 6, 2)];
        assert_eq!(
            slots[0].start,
            Utc.with_ymd_and_hms(2025, 6, 2, 13, 0, 0).unwrap()
        );
    }

    #[test]
    fn spring_forward_gap_yields_no_slot() {
        let zone: Tz = "America/New_York".parse().unwrap();
        // 2025-03-09 is a Sunday; 02:30 local does not exist that day.
        let templates = vec![template(Weekday::Sun, 2, 30, 30)];
        let resolved = resolve_range(&templates, zone, date(2025, 3, 9), date(2025, 3, 9));

        assert!(resolved.is_empty());
    }

    #[test]
    fn fall_back_ambiguity_takes_earlier_instant() {
        let zone: Tz = "America/New_York".parse().unwrap();
        // 2025-11-02 is a Sunday; 01:30 local occurs twice. Earlier is EDT (UTC-4).
        let templates = vec![template(Weekday::Sun, 1, 30, 30)];
        let resolved = resolve_range(&templates, zone, date(2025, 11, 2), date(2025, 11, 2));

        let slots = &resolved[&date(2025, 11, 2)];
        assert_eq!(
            slots[0].start,
            Utc.with_ymd_and_hms(2025, 11, 2, 5, 30, 0).unwrap()
        );
    }

    #[test]
    fn resolve_at_requires_exact_start() {
        let templates = vec![template(Weekday::Mon, 9, 0, 30)];
        let exact = Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap();

        let slot = resolve_at(&templates, chrono_tz::UTC, exact).unwrap();
        assert_eq!(slot.end, exact + Duration::minutes(30));

        let off_by_a_minute = Utc.with_ymd_and_hms(2025, 6, 2, 9, 1, 0).unwrap();
        assert!(resolve_at(&templates, chrono_tz::UTC, off_by_a_minute).is_none());

        // Right time, wrong weekday (2025-06-03 is a Tuesday).
        let tuesday = Utc.with_ymd_and_hms(2025, 6, 3, 9, 0, 0).unwrap();
        assert!(resolve_at(&templates, chrono_tz::UTC, tuesday).is_none());
    }
}
