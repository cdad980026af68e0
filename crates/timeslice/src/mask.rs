//! Calendar-aligned quantization grids.
//!
//! A [`Mask`] names one granularity of a fixed, totally ordered catalog
//! running from [`Mask::Minute`] to [`Mask::Year`]. Each granularity can
//! truncate an instant down to the start of its containing grid cell,
//! step one cell forward or backward, and pick a display format whose
//! precision matches the grid.
//!
//! Sub-day cells have a fixed length; month, quarter and year cells are
//! true calendar cells, so stepping across them uses the actual month
//! lengths rather than a nominal average. Quantization works on the
//! instant's own wall clock.

use chrono::{Datelike, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Timelike};
use chrono_tz::Tz;
use serde::Serialize;
use std::fmt;

use crate::slice::Moment;
use crate::span::Span;

/// One granularity of the quantization catalog, ordered finest to
/// coarsest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Mask {
    Minute,
    QuarterHour,
    HalfHour,
    Hour,
    FourHours,
    HalfDay,
    Day,
    Month,
    Quarter,
    Year,
}

impl Mask {
    /// The whole catalog, finest first. Drives auto-selection and
    /// enumeration.
    pub const ALL: [Mask; 10] = [
        Mask::Minute,
        Mask::QuarterHour,
        Mask::HalfHour,
        Mask::Hour,
        Mask::FourHours,
        Mask::HalfDay,
        Mask::Day,
        Mask::Month,
        Mask::Quarter,
        Mask::Year,
    ];

    /// Canonical short name, used verbatim in diagnostics.
    pub fn label(self) -> &'static str {
        match self {
            Mask::Minute => "minute",
            Mask::QuarterHour => "15 minutes",
            Mask::HalfHour => "half-hour",
            Mask::Hour => "hour",
            Mask::FourHours => "4 hours",
            Mask::HalfDay => "half-day",
            Mask::Day => "day",
            Mask::Month => "month",
            Mask::Quarter => "quarter",
            Mask::Year => "year",
        }
    }

    /// Nominal cell length, used for point-count estimates. Calendar
    /// cells use their average length (a month is 30.4375 days).
    pub fn nominal_step(self) -> Span {
        match self {
            Mask::Minute => Span::minutes(1),
            Mask::QuarterHour => Span::minutes(15),
            Mask::HalfHour => Span::minutes(30),
            Mask::Hour => Span::hours(1),
            Mask::FourHours => Span::hours(4),
            Mask::HalfDay => Span::hours(12),
            Mask::Day => Span::days(1),
            Mask::Month => Span::month(),
            Mask::Quarter => Span::quarter(),
            Mask::Year => Span::year(),
        }
    }

    /// Truncate `t` down to the start of its containing grid cell, on
    /// `t`'s own wall clock.
    pub fn floor(self, t: Moment) -> Moment {
        self.try_floor(t).unwrap_or(t)
    }

    /// The next grid boundary strictly after `t`'s cell start.
    pub fn advance(self, t: Moment) -> Moment {
        self.try_advance(t).unwrap_or(t)
    }

    /// The previous grid boundary strictly before `t`'s cell start.
    pub fn retreat(self, t: Moment) -> Moment {
        self.try_retreat(t).unwrap_or(t)
    }

    fn try_floor(self, t: Moment) -> Option<Moment> {
        let tz = t.timezone();
        match self {
            Mask::Minute => Some(t - sub_minute(t)),
            Mask::QuarterHour => {
                Some(t - sub_minute(t) - Duration::minutes(i64::from(t.minute() % 15)))
            }
            Mask::HalfHour => {
                Some(t - sub_minute(t) - Duration::minutes(i64::from(t.minute() % 30)))
            }
            Mask::Hour => Some(t - sub_minute(t) - Duration::minutes(i64::from(t.minute()))),
            Mask::FourHours => Some(
                t - sub_minute(t)
                    - Duration::minutes(i64::from(t.minute()))
                    - Duration::hours(i64::from(t.hour() % 4)),
            ),
            Mask::HalfDay => Some(
                t - sub_minute(t)
                    - Duration::minutes(i64::from(t.minute()))
                    - Duration::hours(i64::from(t.hour() % 12)),
            ),
            Mask::Day => Some(local_midnight(tz, t.date_naive())),
            Mask::Month => Some(local_midnight(
                tz,
                NaiveDate::from_ymd_opt(t.year(), t.month(), 1)?,
            )),
            Mask::Quarter => {
                let start = (t.month() - 1) / 3 * 3 + 1;
                Some(local_midnight(
                    tz,
                    NaiveDate::from_ymd_opt(t.year(), start, 1)?,
                ))
            }
            Mask::Year => Some(local_midnight(tz, NaiveDate::from_ymd_opt(t.year(), 1, 1)?)),
        }
    }

    fn try_advance(self, t: Moment) -> Option<Moment> {
        let base = self.try_floor(t)?;
        let tz = base.timezone();
        match self {
            Mask::Minute
            | Mask::QuarterHour
            | Mask::HalfHour
            | Mask::Hour
            | Mask::FourHours
            | Mask::HalfDay => Some(base + self.nominal_step()),
            Mask::Day => Some(local_midnight(tz, base.date_naive().succ_opt()?)),
            Mask::Month => {
                let (y, m) = month_add(base.year(), base.month(), 1);
                Some(local_midnight(tz, NaiveDate::from_ymd_opt(y, m, 1)?))
            }
            Mask::Quarter => {
                let (y, m) = month_add(base.year(), base.month(), 3);
                Some(local_midnight(tz, NaiveDate::from_ymd_opt(y, m, 1)?))
            }
            Mask::Year => Some(local_midnight(
                tz,
                NaiveDate::from_ymd_opt(base.year() + 1, 1, 1)?,
            )),
        }
    }

    fn try_retreat(self, t: Moment) -> Option<Moment> {
        let base = self.try_floor(t)?;
        let tz = base.timezone();
        match self {
            Mask::Minute
            | Mask::QuarterHour
            | Mask::HalfHour
            | Mask::Hour
            | Mask::FourHours
            | Mask::HalfDay => Some(base - self.nominal_step()),
            Mask::Day => Some(local_midnight(tz, base.date_naive().pred_opt()?)),
            Mask::Month => {
                let (y, m) = month_add(base.year(), base.month(), -1);
                Some(local_midnight(tz, NaiveDate::from_ymd_opt(y, m, 1)?))
            }
            Mask::Quarter => {
                let (y, m) = month_add(base.year(), base.month(), -3);
                Some(local_midnight(tz, NaiveDate::from_ymd_opt(y, m, 1)?))
            }
            Mask::Year => Some(local_midnight(
                tz,
                NaiveDate::from_ymd_opt(base.year() - 1, 1, 1)?,
            )),
        }
    }

    /// A chrono format string for `t` whose precision matches this
    /// granularity, suppressing leading calendar components already
    /// implied by `reference`.
    ///
    /// Rendering a scanned sequence with each element's predecessor as
    /// the reference prints full detail once and then only the changing
    /// suffix.
    pub fn time_format(self, t: Moment, reference: Moment) -> &'static str {
        let same_year = t.year() == reference.year();
        let same_month = same_year && t.month() == reference.month();
        let same_day = same_month && t.day() == reference.day();
        match self {
            Mask::Minute | Mask::QuarterHour | Mask::HalfHour | Mask::Hour | Mask::FourHours => {
                if same_day {
                    "%H:%M"
                } else if same_year {
                    "%a, %b %-d %H:%M"
                } else {
                    "%a, %b %-d %Y %H:%M"
                }
            }
            Mask::HalfDay => {
                if same_month {
                    "%a, %-d %H:%M"
                } else if same_year {
                    "%a, %b %-d %H:%M"
                } else {
                    "%a, %b %-d %Y %H:%M"
                }
            }
            Mask::Day => {
                if same_month {
                    "%a, %-d"
                } else if same_year {
                    "%a, %b %-d"
                } else {
                    "%a, %b %-d %Y"
                }
            }
            Mask::Month | Mask::Quarter => {
                if same_year {
                    "%b"
                } else {
                    "%b %Y"
                }
            }
            Mask::Year => "%Y",
        }
    }
}

impl fmt::Display for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Seconds and sub-second part of `t`'s current minute.
fn sub_minute(t: Moment) -> Duration {
    Duration::seconds(i64::from(t.second())) + Duration::nanoseconds(i64::from(t.nanosecond()))
}

/// Midnight of `date` in `tz`, sliding forward when a DST gap removes
/// midnight from the wall clock.
fn local_midnight(tz: Tz, date: NaiveDate) -> Moment {
    let naive = date.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(t) | LocalResult::Ambiguous(t, _) => t,
        LocalResult::None => tz
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest()
            .unwrap_or_else(|| tz.from_utc_datetime(&naive)),
    }
}

/// Year/month pair `delta` months away from `(year, month)`.
fn month_add(year: i32, month: u32, delta: i32) -> (i32, u32) {
    let index = year * 12 + month as i32 - 1 + delta;
    (index.div_euclid(12), (index.rem_euclid(12) + 1) as u32)
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> Moment {
        Tz::UTC.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_catalog_order_and_labels() {
        let labels: Vec<&str> = Mask::ALL.iter().map(|m| m.label()).collect();
        assert_eq!(
            labels,
            [
                "minute",
                "15 minutes",
                "half-hour",
                "hour",
                "4 hours",
                "half-day",
                "day",
                "month",
                "quarter",
                "year"
            ]
        );
        // Enum order is granularity order.
        assert!(Mask::Minute < Mask::Day && Mask::Day < Mask::Year);
    }

    #[test]
    fn test_floor_sub_day_grids() {
        let t = utc(2008, 10, 30, 21, 12, 59);
        assert_eq!(Mask::Minute.floor(t), utc(2008, 10, 30, 21, 12, 0));
        assert_eq!(Mask::QuarterHour.floor(t), utc(2008, 10, 30, 21, 0, 0));
        assert_eq!(Mask::HalfHour.floor(t), utc(2008, 10, 30, 21, 0, 0));
        assert_eq!(Mask::Hour.floor(t), utc(2008, 10, 30, 21, 0, 0));
        assert_eq!(Mask::FourHours.floor(t), utc(2008, 10, 30, 20, 0, 0));
        assert_eq!(Mask::HalfDay.floor(t), utc(2008, 10, 30, 12, 0, 0));
        assert_eq!(Mask::Day.floor(t), utc(2008, 10, 30, 0, 0, 0));
    }

    #[test]
    fn test_floor_quarter_hour_variants() {
        assert_eq!(
            Mask::QuarterHour.floor(utc(2022, 1, 6, 7, 38, 21)),
            utc(2022, 1, 6, 7, 30, 0)
        );
        assert_eq!(
            Mask::HalfDay.floor(utc(2022, 1, 6, 7, 30, 0)),
            utc(2022, 1, 6, 0, 0, 0)
        );
    }

    #[test]
    fn test_floor_calendar_grids() {
        let t = utc(2022, 1, 7, 19, 30, 0);
        assert_eq!(Mask::Month.floor(t), utc(2022, 1, 1, 0, 0, 0));
        assert_eq!(Mask::Quarter.floor(t), utc(2022, 1, 1, 0, 0, 0));
        assert_eq!(Mask::Year.floor(t), utc(2022, 1, 1, 0, 0, 0));

        // November sits in the quarter starting in October.
        assert_eq!(
            Mask::Quarter.floor(utc(2008, 11, 15, 8, 0, 0)),
            utc(2008, 10, 1, 0, 0, 0)
        );
    }

    #[test]
    fn test_floor_is_idempotent() {
        for mask in Mask::ALL {
            let t = utc(2008, 10, 30, 21, 12, 59);
            let once = mask.floor(t);
            assert_eq!(mask.floor(once), once, "mask {mask}");
        }
    }

    #[test]
    fn test_advance_steps_one_cell() {
        assert_eq!(
            Mask::HalfDay.advance(utc(2022, 1, 6, 7, 30, 0)),
            utc(2022, 1, 6, 12, 0, 0)
        );
        assert_eq!(
            Mask::FourHours.advance(utc(2008, 10, 31, 21, 0, 0)),
            utc(2008, 11, 1, 0, 0, 0)
        );
        assert_eq!(
            Mask::Day.advance(utc(2022, 1, 31, 5, 0, 0)),
            utc(2022, 2, 1, 0, 0, 0)
        );
    }

    #[test]
    fn test_advance_uses_true_calendar_lengths() {
        // February 2022 has 28 days; the month cell still ends March 1.
        assert_eq!(
            Mask::Month.advance(utc(2022, 2, 15, 10, 0, 0)),
            utc(2022, 3, 1, 0, 0, 0)
        );
        assert_eq!(
            Mask::Quarter.advance(utc(2008, 11, 15, 8, 0, 0)),
            utc(2009, 1, 1, 0, 0, 0)
        );
        assert_eq!(
            Mask::Year.advance(utc(2008, 10, 30, 21, 12, 59)),
            utc(2009, 1, 1, 0, 0, 0)
        );
    }

    #[test]
    fn test_retreat_steps_one_cell_back() {
        assert_eq!(
            Mask::HalfDay.retreat(utc(2022, 1, 6, 12, 0, 0)),
            utc(2022, 1, 6, 0, 0, 0)
        );
        assert_eq!(
            Mask::Month.retreat(utc(2022, 3, 1, 0, 0, 0)),
            utc(2022, 2, 1, 0, 0, 0)
        );
        assert_eq!(
            Mask::Quarter.retreat(utc(2022, 1, 1, 0, 0, 0)),
            utc(2021, 10, 1, 0, 0, 0)
        );
        assert_eq!(
            Mask::Day.retreat(utc(2022, 3, 1, 0, 0, 0)),
            utc(2022, 2, 28, 0, 0, 0)
        );
    }

    #[test]
    fn test_month_add_wraps_years() {
        assert_eq!(month_add(2022, 12, 1), (2023, 1));
        assert_eq!(month_add(2022, 1, -1), (2021, 12));
        assert_eq!(month_add(2008, 10, 3), (2009, 1));
        assert_eq!(month_add(2022, 1, -3), (2021, 10));
    }

    #[test]
    fn test_time_format_against_self() {
        // Rendering an instant against itself keeps only what the
        // granularity needs.
        let t = utc(2008, 10, 30, 21, 12, 59);
        let expected = [
            (Mask::Minute, "21:12"),
            (Mask::QuarterHour, "21:12"),
            (Mask::HalfHour, "21:12"),
            (Mask::Hour, "21:12"),
            (Mask::FourHours, "21:12"),
            (Mask::HalfDay, "Thu, 30 21:12"),
            (Mask::Day, "Thu, 30"),
            (Mask::Month, "Oct"),
            (Mask::Quarter, "Oct"),
            (Mask::Year, "2008"),
        ];
        for (mask, want) in expected {
            let got = t.format(mask.time_format(t, t)).to_string();
            assert_eq!(got, want, "mask {mask}");
        }
    }

    #[test]
    fn test_time_format_reintroduces_changed_components() {
        let t1 = utc(2008, 10, 30, 21, 12, 59);
        let t2 = t1 + Span::hours(24 * 31);
        // Same year, different month and day.
        let got = t2.format(Mask::Hour.time_format(t2, t1)).to_string();
        assert_eq!(got, "Sun, Nov 30 21:12");
    }

    #[test]
    fn test_time_format_across_years() {
        let t1 = utc(2008, 12, 30, 21, 0, 0);
        let t2 = utc(2009, 1, 2, 9, 30, 0);
        assert_eq!(
            t2.format(Mask::Hour.time_format(t2, t1)).to_string(),
            "Fri, Jan 2 2009 09:30"
        );
        assert_eq!(
            t2.format(Mask::Day.time_format(t2, t1)).to_string(),
            "Fri, Jan 2 2009"
        );
        assert_eq!(
            t2.format(Mask::Month.time_format(t2, t1)).to_string(),
            "Jan 2009"
        );
    }

    #[test]
    fn test_nominal_steps() {
        assert_eq!(Mask::Minute.nominal_step(), Span::minutes(1));
        assert_eq!(Mask::HalfDay.nominal_step(), Span::hours(12));
        assert_eq!(Mask::Month.nominal_step(), Span::month());
        assert_eq!(Mask::Year.nominal_step(), Span::year());
    }
}
