//! Half-open time intervals and the set operations built on them.
//!
//! Everything here is a pure function over UTC instants. Callers normalize
//! local times through the configured zone *before* intervals are formed, so
//! comparisons and merges are never exposed to DST ambiguity.

use chrono::{DateTime, Duration, Utc};

/// A half-open time interval `[start, end)`.
///
/// Invariant: `start < end`. The engine only constructs intervals from a
/// start plus a positive duration or from validated adapter data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Interval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Strict half-open overlap: `a.start < b.end && b.start < a.end`.
    ///
    /// Touching endpoints (one interval ending exactly where another starts)
    /// do not overlap.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Half-open membership: `start <= instant < end`.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    /// Interval length.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// True iff `candidate` overlaps at least one member of `busy`.
///
/// This is the conflict rule for candidate slots: any overlap, however
/// partial, voids the whole slot. A candidate is never split around a busy
/// period.
pub fn overlaps_any(candidate: &Interval, busy: &[Interval]) -> bool {
    busy.iter().any(|b| candidate.overlaps(b))
}

/// Merge overlapping or adjacent intervals into a sorted, non-overlapping
/// ascending sequence.
pub fn merge(mut intervals: Vec<Interval>) -> Vec<Interval> {
    if intervals.is_empty() {
        return intervals;
    }

    intervals.sort_by_key(|iv| (iv.start, iv.end));

    let mut merged: Vec<Interval> = Vec::with_capacity(intervals.len());
    for iv in intervals {
        if let Some(last) = merged.last_mut() {
            if iv.start <= last.end {
                // Overlapping or adjacent: extend the current interval.
                last.end = last.end.max(iv.end);
                continue;
            }
        }
        merged.push(iv);
    }

    merged
}

/// Successive non-overlapping `step`-length intervals covering `[from, to)`.
///
/// A trailing remainder shorter than `step` is not emitted. A nonpositive
/// `step` yields no intervals.
pub fn grid(from: DateTime<Utc>, to: DateTime<Utc>, step: Duration) -> Vec<Interval> {
    if step <= Duration::zero() {
        return Vec::new();
    }

    let mut slots = Vec::new();
    let mut cursor = from;
    while cursor + step <= to {
        slots.push(Interval::new(cursor, cursor + step));
        cursor += step;
    }

    slots
}

/// `step`-length slots in the gaps between busy periods within `[from, to)`.
///
/// The cursor walks the busy sequence: each gap is filled with whole steps,
/// then the cursor realigns to the end of the busy period that closed the
/// gap, so later slots snap to busy ends rather than to the original `from`
/// grid. `busy` must be sorted and non-overlapping (see [`merge`]).
pub fn free_steps(
    busy: &[Interval],
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    step: Duration,
) -> Vec<Interval> {
    if step <= Duration::zero() {
        return Vec::new();
    }

    let mut slots = Vec::new();
    let mut cursor = from;

    for b in busy {
        if cursor < b.start {
            slots.extend(grid(cursor, b.start.min(to), step));
        }
        if cursor < b.end {
            cursor = b.end;
        }
    }

    slots.extend(grid(cursor, to, step));
    slots
}
