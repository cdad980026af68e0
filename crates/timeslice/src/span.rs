//! Signed elapsed-time spans with calendar-nominal units.
//!
//! A [`Span`] wraps a [`chrono::Duration`] and adds the pieces the slice
//! algebra needs: nominal calendar lengths (a month is 30.4375 days, a
//! twelfth of a julian year), scaling by a real factor, and a compact
//! magnitude-limited rendering used by [`TimeSlice`](crate::TimeSlice)'s
//! `Display` output.
//!
//! # Magnitude rendering
//!
//! [`Span::magnitude`] decomposes the span into `y/M/d/h/m/s` components
//! and prints at most `units` consecutive unit slots starting at the most
//! significant non-zero one. Zero components inside the window are
//! skipped; a non-zero whole unit below the window appends a trailing `~`
//! to mark the truncation.
//!
//! ```
//! use timeslice::Span;
//!
//! assert_eq!(Span::days(7).magnitude(3), "7d");
//! assert_eq!((Span::weeks(1) + Span::hours(31)).magnitude(3), "8d7h");
//! assert_eq!(Span::months(3).magnitude(3), "3M");
//! ```

use std::fmt;
use std::ops::{Add, Neg, Sub};

use chrono::{DateTime, Duration};
use chrono_tz::Tz;

/// Seconds in a nominal month: 30.4375 days, a twelfth of a julian year.
const MONTH_SECS: i64 = 2_629_800;
/// Seconds in a julian year: 365.25 days.
const YEAR_SECS: i64 = 31_557_600;

/// Unit table for [`Span::magnitude`], most significant first.
const UNITS: [(i64, &str); 6] = [
    (YEAR_SECS, "y"),
    (MONTH_SECS, "M"),
    (86_400, "d"),
    (3_600, "h"),
    (60, "m"),
    (1, "s"),
];

/// A signed amount of elapsed time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Span(Duration);

impl Span {
    pub fn new(inner: Duration) -> Self {
        Span(inner)
    }

    pub fn zero() -> Self {
        Span(Duration::zero())
    }

    pub fn seconds(n: i64) -> Self {
        Span(Duration::seconds(n))
    }

    pub fn minutes(n: i64) -> Self {
        Span(Duration::minutes(n))
    }

    pub fn hours(n: i64) -> Self {
        Span(Duration::hours(n))
    }

    pub fn days(n: i64) -> Self {
        Span(Duration::days(n))
    }

    pub fn weeks(n: i64) -> Self {
        Span(Duration::weeks(n))
    }

    /// One nominal month: 30.4375 days.
    pub fn month() -> Self {
        Span::seconds(MONTH_SECS)
    }

    /// `n` nominal months.
    pub fn months(n: i64) -> Self {
        Span::seconds(MONTH_SECS * n)
    }

    /// One nominal quarter: three nominal months.
    pub fn quarter() -> Self {
        Span::seconds(MONTH_SECS * 3)
    }

    /// One julian year: 365.25 days.
    pub fn year() -> Self {
        Span::seconds(YEAR_SECS)
    }

    pub fn inner(&self) -> Duration {
        self.0
    }

    /// Whole seconds, truncated toward zero.
    pub fn num_seconds(&self) -> i64 {
        self.0.num_seconds()
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Duration::zero()
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Duration::zero()
    }

    pub fn abs(&self) -> Span {
        if self.is_negative() {
            -*self
        } else {
            *self
        }
    }

    /// Scale by a real factor, truncating toward zero at nanosecond
    /// resolution. Spans too large for nanosecond precision (beyond
    /// roughly ±292 years) are scaled at whole-second resolution instead.
    pub fn adjust(&self, factor: f64) -> Span {
        match self.0.num_nanoseconds() {
            Some(ns) => Span(Duration::nanoseconds((ns as f64 * factor).trunc() as i64)),
            None => Span(Duration::seconds(
                (self.0.num_seconds() as f64 * factor).trunc() as i64,
            )),
        }
    }

    /// Render at most `units` unit slots starting at the most significant
    /// non-zero unit, e.g. `"8d7h"`, `"3M"`, `"17h45m4s"`. A non-zero
    /// whole unit truncated below the window appends `~`; the zero span
    /// renders `"0"`; negative spans carry a leading `-`.
    pub fn magnitude(&self, units: usize) -> String {
        let units = units.max(1);
        let total = self.num_seconds();
        let mut out = String::new();
        if total < 0 {
            out.push('-');
        }

        let mut rem = total.abs();
        let mut window_start = None;
        let mut truncated = false;
        for (i, (size, tag)) in UNITS.iter().enumerate() {
            let n = rem / size;
            rem %= size;
            if n == 0 && window_start.is_none() {
                continue;
            }
            let start = *window_start.get_or_insert(i);
            if i < start + units {
                if n > 0 {
                    out.push_str(&format!("{n}{tag}"));
                }
            } else if n > 0 {
                truncated = true;
            }
        }

        if window_start.is_none() {
            return "0".to_string();
        }
        if truncated {
            out.push('~');
        }
        out
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.magnitude(3))
    }
}

impl Neg for Span {
    type Output = Span;

    fn neg(self) -> Span {
        Span(-self.0)
    }
}

impl Add for Span {
    type Output = Span;

    fn add(self, rhs: Span) -> Span {
        Span(self.0 + rhs.0)
    }
}

impl Sub for Span {
    type Output = Span;

    fn sub(self, rhs: Span) -> Span {
        Span(self.0 - rhs.0)
    }
}

impl Add<Span> for DateTime<Tz> {
    type Output = DateTime<Tz>;

    fn add(self, rhs: Span) -> DateTime<Tz> {
        self + rhs.0
    }
}

impl Sub<Span> for DateTime<Tz> {
    type Output = DateTime<Tz>;

    fn sub(self, rhs: Span) -> DateTime<Tz> {
        self - rhs.0
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
