//! # timeslice
//!
//! Bounded-or-unbounded ranges of time as plain values.
//!
//! A [`TimeSlice`] is a pair of boundaries, each independently finite or
//! open, in chronological or reversed order. The crate provides the
//! boundary-mutation algebra (moves with capping, extends, truncation),
//! the progress/inverse-progress mapping between an instant and its
//! normalized position inside the range, partitioning into fixed-size
//! sub-slices, and a calendar-aligned [`Mask`] grid with a
//! direction-aware scan engine and coarsest-fit auto-selection.
//!
//! Everything is synchronous, deterministic value computation: no clock
//! access, no I/O, no shared state.
//!
//! ## Modules
//!
//! - [`slice`] — the [`TimeSlice`] value type and its algebra
//! - [`span`] — signed elapsed time with calendar-nominal units
//! - [`mask`] — the ordered catalog of quantization granularities
//! - [`scan`] — cursor-driven grid traversal and mask auto-selection
//! - [`error`] — error types
//!
//! ## Example
//!
//! ```
//! use chrono::TimeZone;
//! use chrono_tz::Tz;
//! use timeslice::{Span, TimeSlice};
//!
//! let start = Tz::UTC.with_ymd_and_hms(2022, 1, 6, 7, 30, 0).unwrap();
//! let ts = TimeSlice::new(start, Span::days(3));
//!
//! let mask = ts.scan_mask(10);
//! assert_eq!(mask.label(), "half-day");
//!
//! let grid: Vec<_> = ts.scan_iter(mask, true).collect();
//! assert_eq!(grid.len(), 8);
//! assert_eq!(grid.first(), ts.from.as_ref());
//! assert_eq!(grid.last(), ts.to.as_ref());
//! ```

pub mod error;
pub mod mask;
pub mod scan;
pub mod slice;
pub mod span;

pub use error::TimesliceError;
pub use mask::Mask;
pub use scan::{ScanCursor, ScanIter};
pub use slice::{Direction, Moment, SliceEquality, TimeSlice};
pub use span::Span;
