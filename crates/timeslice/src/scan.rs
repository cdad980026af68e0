//! Cursor-driven traversal of the grid-aligned instants inside a slice.
//!
//! A scan produces, one call at a time, the lazy sequence of
//! [`Mask`]-aligned instants a [`TimeSlice`] contains, walking in the
//! slice's own [`Direction`]. The caller owns a [`ScanCursor`] and passes
//! it into every call; the sequence is strictly monotonic, restartable
//! only through [`ScanCursor::reset`], and unbounded only when the slice
//! has an open end (callers guard that case themselves).
//!
//! [`TimeSlice::scan_iter`] wraps the cursor protocol in a plain
//! `Iterator` for the common forward loop.

use serde::Serialize;

use crate::mask::Mask;
use crate::slice::{Direction, Moment, TimeSlice};

/// Traversal state owned by the caller of [`TimeSlice::scan`].
///
/// `Exhausted` is terminal and authoritative: further calls keep
/// returning `None` until the cursor is [`reset`](ScanCursor::reset).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ScanCursor {
    #[default]
    NotStarted,
    InProgress(Moment),
    Exhausted,
}

impl ScanCursor {
    /// Return to `NotStarted` so the next scan call restarts the
    /// sequence.
    pub fn reset(&mut self) {
        *self = ScanCursor::NotStarted;
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, ScanCursor::Exhausted)
    }

    /// The last instant yielded, when the scan is mid-sequence.
    pub fn position(&self) -> Option<Moment> {
        match self {
            ScanCursor::InProgress(at) => Some(*at),
            _ => None,
        }
    }
}

impl TimeSlice {
    /// Yield the next `mask`-aligned instant inside the slice, or `None`
    /// when the traversal is over.
    ///
    /// The first call yields `from` when `include_bounds` is set or
    /// `from` already lies on the grid. Afterwards the cursor steps one
    /// grid cell per call in the slice's direction. When the step passes
    /// a finite `to`, the scan yields `to` once (only with
    /// `include_bounds`, and only if it was not already yielded as a
    /// grid point) and then exhausts.
    ///
    /// A slice with an open `from` cannot be scanned: the call yields
    /// `None` and leaves the cursor untouched. An open `to` never bounds
    /// the traversal.
    pub fn scan(
        &self,
        cursor: &mut ScanCursor,
        mask: Mask,
        include_bounds: bool,
    ) -> Option<Moment> {
        let from = self.from?;
        let current = match *cursor {
            ScanCursor::Exhausted => return None,
            ScanCursor::NotStarted => {
                if include_bounds || mask.floor(from) == from {
                    *cursor = ScanCursor::InProgress(from);
                    return Some(from);
                }
                from
            }
            ScanCursor::InProgress(at) => at,
        };

        let next = if self.direction() == Direction::AntiChronological {
            if mask.floor(current) == current {
                mask.retreat(current)
            } else {
                mask.floor(current)
            }
        } else {
            mask.advance(current)
        };

        if let Some(to) = self.to {
            let passed = match self.direction() {
                Direction::AntiChronological => next < to,
                _ => next > to,
            };
            if passed {
                if include_bounds && current != to {
                    *cursor = ScanCursor::InProgress(to);
                    return Some(to);
                }
                *cursor = ScanCursor::Exhausted;
                return None;
            }
        }

        *cursor = ScanCursor::InProgress(next);
        Some(next)
    }

    /// Iterator over the scan sequence; see [`TimeSlice::scan`].
    pub fn scan_iter(&self, mask: Mask, include_bounds: bool) -> ScanIter {
        ScanIter {
            slice: *self,
            mask,
            include_bounds,
            cursor: ScanCursor::NotStarted,
        }
    }

    /// The finest [`Mask`] whose grid covers the slice with at most
    /// `max_steps` points — equivalently, the coarsest grid a renderer
    /// needs to stay under that ceiling, since every coarser mask fits
    /// too. Point counts use each mask's nominal cell length.
    ///
    /// Falls back to [`Mask::Year`] when no granularity fits or when the
    /// duration is undefined (open boundary).
    pub fn scan_mask(&self, max_steps: u32) -> Mask {
        let total = match self.duration() {
            Some(span) => span.abs().num_seconds(),
            None => return Mask::Year,
        };
        for mask in Mask::ALL {
            let step = mask.nominal_step().num_seconds();
            if (total as u64).div_ceil(step as u64) <= u64::from(max_steps) {
                return mask;
            }
        }
        Mask::Year
    }
}

/// Borrowed-nothing iterator over a slice's scan sequence.
#[derive(Debug, Clone)]
pub struct ScanIter {
    slice: TimeSlice,
    mask: Mask,
    include_bounds: bool,
    cursor: ScanCursor,
}

impl Iterator for ScanIter {
    type Item = Moment;

    fn next(&mut self) -> Option<Moment> {
        self.slice.scan(&mut self.cursor, self.mask, self.include_bounds)
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
