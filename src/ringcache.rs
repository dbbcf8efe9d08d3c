// SPDX-License-Identifier: MIT
//! # Row Cache / Ring Buffer Scheduler (M3)
//!
//! Slice-driven scaling can't materialize every horizontally-scaled row up
//! front — a row may be needed by several vertical filter windows, and the
//! source arrives in arbitrary-height slices. [`RowCache`] stores just
//! enough recently-horizontally-scaled rows to satisfy the widest vertical
//! filter in flight, addressed by source row index modulo the cache depth
//! (doubled so a window never has to wrap mid-read).

use crate::filter::FilterBank;

/// A ring of horizontally-scaled rows for one plane.
///
/// Internally over-allocated to `2 * depth` rows so that any contiguous
/// window of up to `depth` rows can be read as a single slice even when the
/// logical ring has wrapped — a "doubled storage" trick that avoids copying
/// on wraparound.
pub struct RowCache {
    depth: usize,
    row_width: usize,
    storage: Vec<i16>,
    /// Source row index of the next row to be filled (`-1` initially).
    filled_up_to: i64,
}

impl RowCache {
    /// `depth` should be at least the tallest vertical filter's tap count.
    pub fn new(depth: usize, row_width: usize) -> Self {
        Self {
            depth,
            row_width,
            storage: vec![0; 2 * depth * row_width],
            filled_up_to: -1,
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn row_width(&self) -> usize {
        self.row_width
    }

    fn slot(&self, src_row: i64) -> usize {
        (src_row.rem_euclid(self.depth as i64)) as usize
    }

    /// Returns the mutable row buffer a horizontal scaler should fill for
    /// `src_row`, writing it to both halves of the doubled storage so later
    /// windowed reads stay contiguous.
    pub fn row_mut(&mut self, src_row: i64) -> RowWriteGuard<'_> {
        let slot = self.slot(src_row);
        RowWriteGuard {
            cache: self,
            slot,
            src_row,
        }
    }

    fn write_both_halves(&mut self, slot: usize, data: &[i16]) {
        let w = self.row_width;
        self.storage[slot * w..slot * w + w].copy_from_slice(data);
        let mirror = slot + self.depth;
        self.storage[mirror * w..mirror * w + w].copy_from_slice(data);
    }

    /// A window of `taps` contiguous rows starting at source row
    /// `first_src_row`, as a slice of row references suitable for
    /// [`crate::vscale::combine_to_u8_sample`] and friends.
    pub fn window(&self, first_src_row: i64, taps: usize) -> Vec<&[i16]> {
        let w = self.row_width;
        let mut out = Vec::with_capacity(taps);
        for k in 0..taps {
            let slot = self.slot(first_src_row + k as i64);
            out.push(&self.storage[slot * w..slot * w + w]);
        }
        out
    }

    pub fn mark_filled(&mut self, src_row: i64) {
        if src_row > self.filled_up_to {
            self.filled_up_to = src_row;
        }
    }

    pub fn filled_up_to(&self) -> i64 {
        self.filled_up_to
    }
}

/// A handle into [`RowCache`] for writing one row; on drop (after the
/// caller fills `as_mut_slice()`), the row is mirrored into both ring
/// halves and marked filled.
pub struct RowWriteGuard<'a> {
    cache: &'a mut RowCache,
    slot: usize,
    src_row: i64,
}

impl RowWriteGuard<'_> {
    pub fn as_mut_slice(&mut self) -> &mut [i16] {
        let w = self.cache.row_width;
        &mut self.cache.storage[self.slot * w..self.slot * w + w]
    }
}

impl Drop for RowWriteGuard<'_> {
    fn drop(&mut self) {
        let w = self.cache.row_width;
        let start = self.slot * w;
        let data: Vec<i16> = self.cache.storage[start..start + w].to_vec();
        self.cache.write_both_halves(self.slot, &data);
        self.cache.mark_filled(self.src_row);
    }
}

/// Computes the set of source rows a vertical [`FilterBank`] needs filled
/// before output row `out_i` can be produced: `(first_row, last_row)`
/// inclusive, derived from `bank.offset[out_i]` and `bank.taps`.
pub fn required_source_rows(bank: &FilterBank, out_i: usize) -> (i64, i64) {
    let first = bank.offset[out_i] as i64;
    let last = first + bank.taps as i64 - 1;
    (first, last)
}

/// Given a vertical bank and the highest source row filled so far, returns
/// how many leading output rows can now be produced (the scheduling core of
/// the slice-driven entry point: a slice that doesn't reach a filter
/// window's last required row defers that output row to the next call).
pub fn producible_output_rows(bank: &FilterBank, filled_up_to: i64) -> usize {
    let mut count = 0;
    for i in 0..bank.dst_len {
        let (_, last) = required_source_rows(bank, i);
        if last > filled_up_to {
            break;
        }
        count += 1;
    }
    count
}
