//! The [`TimeSlice`] value type: a range of time bounded by two instants,
//! either of which may be open (infinite).
//!
//! A slice is a plain `Copy` value owned and mutated by a single caller.
//! Its [`Direction`] is never stored; it is derived from the current
//! boundaries on every query, so boundary mutation can freely flip a
//! slice between chronological and anti-chronological order.
//!
//! Boundary openness is modeled as `Option<Moment>` — `None` means "no
//! instant here", an unbounded past for `from` or an unbounded future for
//! `to`. All instant comparisons are by absolute time, independent of the
//! display offset each [`Moment`] carries.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Datelike, Duration, Timelike};
use chrono_tz::Tz;
use serde::Serialize;

use crate::error::{Result, TimesliceError};
use crate::span::Span;

/// A concrete point in time, carrying its own zone for display.
pub type Moment = DateTime<Tz>;

/// Chronological ordering of a slice's boundaries.
///
/// Derived, never stored: an open `from` is anti-chronological, an open
/// `to` chronological, both open or equal boundaries undefined, and two
/// finite boundaries order by `sign(to - from)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    AntiChronological,
    Undefined,
    Chronological,
}

/// Tri-valued boundary comparison between two slices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SliceEquality {
    /// Boundary pairs differ.
    Distinct,
    /// Same boundaries, same direction.
    Same,
    /// Same boundaries with `from` and `to` swapped.
    Reversed,
}

/// A range of time between two boundaries, each independently open or
/// finite. May be zero-length (a single instant) or reversed (`to`
/// earlier than `from`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeSlice {
    pub from: Option<Moment>,
    pub to: Option<Moment>,
}

impl TimeSlice {
    /// Create a slice anchored at `seed` spanning `span`.
    ///
    /// A positive span makes `seed` the beginning, a negative span makes
    /// it the end, and a zero span yields a single-instant slice.
    pub fn new(seed: Moment, span: Span) -> Self {
        TimeSlice {
            from: Some(seed),
            to: Some(seed + span),
        }
    }

    /// Create a slice directly from its boundaries; `None` is an open
    /// boundary.
    pub fn between(from: Option<Moment>, to: Option<Moment>) -> Self {
        TimeSlice { from, to }
    }

    pub fn direction(&self) -> Direction {
        match (self.from, self.to) {
            (None, None) => Direction::Undefined,
            (None, Some(_)) => Direction::AntiChronological,
            (Some(_), None) => Direction::Chronological,
            (Some(from), Some(to)) => match to.cmp(&from) {
                Ordering::Less => Direction::AntiChronological,
                Ordering::Equal => Direction::Undefined,
                Ordering::Greater => Direction::Chronological,
            },
        }
    }

    /// Move the beginning to `request`.
    ///
    /// If the request lands beyond a finite `to` on the current
    /// direction's far side, `cap == true` clamps the request to `to`
    /// (the slice collapses to a single instant) while `cap == false`
    /// drags `to` along to the request.
    pub fn move_from(&mut self, request: Moment, cap: bool) {
        let mut request = request;
        if let Some(to) = self.to {
            let beyond = match self.direction() {
                Direction::Chronological => request > to,
                Direction::AntiChronological => request < to,
                Direction::Undefined => false,
            };
            if beyond {
                if cap {
                    request = to;
                } else {
                    self.to = Some(request);
                }
            }
        }
        self.from = Some(request);
    }

    /// Move the end to `request`; the mirror of [`move_from`].
    ///
    /// [`move_from`]: TimeSlice::move_from
    pub fn move_to(&mut self, request: Moment, cap: bool) {
        let mut request = request;
        if let Some(from) = self.from {
            let beyond = match self.direction() {
                Direction::Chronological => request < from,
                Direction::AntiChronological => request > from,
                Direction::Undefined => false,
            };
            if beyond {
                if cap {
                    request = from;
                } else {
                    self.from = Some(request);
                }
            }
        }
        self.to = Some(request);
    }

    /// Open the beginning: the slice becomes unbounded in the past.
    pub fn unbound_from(&mut self) {
        self.from = None;
    }

    /// Open the end: the slice becomes unbounded in the future.
    pub fn unbound_to(&mut self) {
        self.to = None;
    }

    /// Add `delta` to the end. An open end stays open; a negative delta
    /// moves the end backward and may flip the direction.
    pub fn extend_to(&mut self, delta: Span) {
        if let Some(to) = self.to {
            self.to = Some(to + delta);
        }
    }

    /// Add `delta` to the beginning. An open beginning stays open; the
    /// end is never touched.
    pub fn extend_from(&mut self, delta: Span) {
        if let Some(from) = self.from {
            self.from = Some(from + delta);
        }
    }

    /// Round both finite boundaries down to a multiple of `step` since
    /// the Unix epoch. A non-positive `step` is a pass-through.
    pub fn truncate(mut self, step: Span) -> Self {
        let step_s = step.num_seconds();
        if step_s <= 0 {
            return self;
        }
        self.from = self.from.map(|t| truncate_moment(t, step_s));
        self.to = self.to.map(|t| truncate_moment(t, step_s));
        self
    }

    /// Compare boundaries with `other`, by instant value only.
    ///
    /// [`SliceEquality::Same`] wins over [`SliceEquality::Reversed`] when
    /// both apply (equal single-instant slices).
    pub fn equality(&self, other: &TimeSlice) -> SliceEquality {
        if self.from == other.from && self.to == other.to {
            SliceEquality::Same
        } else if self.from == other.to && self.to == other.from {
            SliceEquality::Reversed
        } else {
            SliceEquality::Distinct
        }
    }

    /// Signed elapsed time from `from` to `to`; `None` when either
    /// boundary is open, zero when they coincide.
    pub fn duration(&self) -> Option<Span> {
        match (self.from, self.to) {
            (Some(from), Some(to)) => Some(Span::new(to - from)),
            _ => None,
        }
    }

    /// Fraction of the slice elapsed up to `at`, measured from `from`
    /// whatever the direction, at second resolution, clamped to `[0, 1]`.
    ///
    /// Returns `0.5` for a slice with no duration — open-boundary and
    /// single-instant slices alike.
    pub fn progress(&self, at: Moment) -> f64 {
        let (from, to) = match (self.from, self.to) {
            (Some(from), Some(to)) => (from, to),
            _ => return 0.5,
        };
        let total = (to - from).num_seconds();
        if total == 0 {
            return 0.5;
        }
        let rate = (at - from).num_seconds() as f64 / total as f64;
        rate.clamp(0.0, 1.0)
    }

    /// The instant at fractional position `rate` from `from` toward
    /// `to`, rounded to the second and clamped inside the slice.
    ///
    /// Returns `None` when the duration is undefined; a single-instant
    /// slice returns that instant for every rate.
    pub fn instant_at(&self, rate: f64) -> Option<Moment> {
        let (from, to) = match (self.from, self.to) {
            (Some(from), Some(to)) => (from, to),
            _ => return None,
        };
        let total = (to - from).num_seconds();
        let mut at = from + Duration::seconds((total as f64 * rate).round() as i64);
        match total.cmp(&0) {
            Ordering::Greater => at = at.clamp(from, to),
            Ordering::Less => at = at.clamp(to, from),
            Ordering::Equal => at = from,
        }
        Some(at)
    }

    /// Partition into consecutive sub-slices of length `step`, the sign
    /// of `step` flipped to match the direction. Each piece's end is
    /// exactly the next piece's start; the last piece is shortened to
    /// fit and dropped when zero-length.
    ///
    /// # Errors
    ///
    /// [`TimesliceError::InvalidStep`] when `step` is not strictly
    /// positive; [`TimesliceError::UnboundedSlice`] when either boundary
    /// is open.
    pub fn split(&self, step: Span) -> Result<Vec<TimeSlice>> {
        if !step.is_positive() {
            return Err(TimesliceError::InvalidStep(format!(
                "split step must be strictly positive, got {step}"
            )));
        }
        let (from, to) = match (self.from, self.to) {
            (Some(from), Some(to)) => (from, to),
            _ => {
                return Err(TimesliceError::UnboundedSlice(
                    "cannot split a slice with an open boundary".to_string(),
                ));
            }
        };

        let chronological = to >= from;
        let step = if chronological { step } else { -step };

        let mut pieces = Vec::new();
        let mut cursor = from;
        loop {
            let end = cursor + step;
            let overshoot = if chronological { end > to } else { end < to };
            if overshoot {
                if cursor != to {
                    pieces.push(TimeSlice::between(Some(cursor), Some(to)));
                }
                break;
            }
            pieces.push(TimeSlice::between(Some(cursor), Some(end)));
            cursor = end;
        }
        Ok(pieces)
    }
}

/// Floor `t` to a multiple of `step_s` seconds since the Unix epoch,
/// clearing any sub-second part.
fn truncate_moment(t: Moment, step_s: i64) -> Moment {
    let ts = t.timestamp();
    let over = ts - ts.div_euclid(step_s) * step_s;
    t - Duration::seconds(over) - Duration::nanoseconds(i64::from(t.timestamp_subsec_nanos()))
}

impl fmt::Display for TimeSlice {
    /// `{ <from> - <to> : <duration> }`, with `past`/`future` for open
    /// boundaries, date-only rendering for midnight boundaries, and
    /// time-only rendering for a `to` on the same calendar day as `from`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let strfrom = match self.from {
            None => "past".to_string(),
            Some(t) => format_bound(t, None),
        };
        let strto = match self.to {
            None => "future".to_string(),
            Some(t) => format_bound(t, self.from),
        };
        let strdur = match self.duration() {
            Some(d) => d.magnitude(3),
            None => "infinite".to_string(),
        };
        write!(f, "{{ {strfrom} - {strto} : {strdur} }}")
    }
}

fn format_bound(t: Moment, from: Option<Moment>) -> String {
    if t.hour() == 0 && t.minute() == 0 && t.second() == 0 {
        t.format("%Y%m%d %Z").to_string()
    } else if from.is_some_and(|f| {
        f.year() == t.year() && f.month() == t.month() && f.day() == t.day()
    }) {
        t.format("%H:%M:%S").to_string()
    } else {
        t.format("%Y%m%d %H:%M:%S %Z").to_string()
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
