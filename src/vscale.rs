// SPDX-License-Identifier: MIT
//! # Vertical Combiner and Packer (M2)
//!
//! Applies a vertical [`FilterBank`](crate::filter::FilterBank) across a
//! window of horizontally-scaled intermediate rows (as handed out by
//! [`crate::ringcache::RowCache`]), producing one row of final-depth output
//! samples, and finishes the job for RGB destinations by running those
//! samples through the colorspace lookup tables and bit-packing them.
//!
//! Two output widths are supported directly: 8-bit (rounding offset `1 <<
//! 18`, shift 19) and 16-bit (rounding offset `1 << 10`, shift 11) — both
//! just narrower or wider final normalizations of the same accumulate-then-
//! round-then-shift shape the horizontal scaler uses.

use crate::colorspace::{clip_u8, RgbTables, YuvToRgbCoeffs};
use crate::filter::FilterBank;
use crate::rowconv::{pack_rgb_row, BitLayout};

/// Combines `rows[0..bank.taps]` at output column `x` using `bank`'s filter
/// for output row `out_i`, returning a value clamped to `[0, 255]`.
#[inline]
pub fn combine_to_u8_sample(bank: &FilterBank, out_i: usize, rows: &[&[i16]], x: usize) -> i32 {
    let row = bank.row(out_i);
    let mut acc: i64 = 1i64 << 18;
    for (k, &c) in row.iter().enumerate() {
        acc += rows[k][x] as i64 * c as i64;
    }
    ((acc >> 19) as i32).clamp(0, 255)
}

/// Same as [`combine_to_u8_sample`] but clamped to `[0, 65535]` for 16-bit
/// destinations.
#[inline]
pub fn combine_to_u16_sample(bank: &FilterBank, out_i: usize, rows: &[&[i16]], x: usize) -> i32 {
    let row = bank.row(out_i);
    let mut acc: i64 = 1i64 << 10;
    for (k, &c) in row.iter().enumerate() {
        acc += rows[k][x] as i64 * c as i64;
    }
    ((acc >> 11) as i32).clamp(0, 65535)
}

/// Vertically combines a full plane row into 8-bit samples.
pub fn vscale_row_u8(bank: &FilterBank, out_i: usize, rows: &[&[i16]], dst: &mut [u8]) {
    for (x, d) in dst.iter_mut().enumerate() {
        *d = combine_to_u8_sample(bank, out_i, rows, x) as u8;
    }
}

/// Vertically combines a full plane row into 16-bit little-endian samples.
pub fn vscale_row_u16le(bank: &FilterBank, out_i: usize, rows: &[&[i16]], dst: &mut [u8]) {
    for (x, chunk) in dst.chunks_exact_mut(2).enumerate() {
        let v = combine_to_u16_sample(bank, out_i, rows, x) as u16;
        chunk.copy_from_slice(&v.to_le_bytes());
    }
}

pub fn vscale_row_u16be(bank: &FilterBank, out_i: usize, rows: &[&[i16]], dst: &mut [u8]) {
    for (x, chunk) in dst.chunks_exact_mut(2).enumerate() {
        let v = combine_to_u16_sample(bank, out_i, rows, x) as u16;
        chunk.copy_from_slice(&v.to_be_bytes());
    }
}

/// Converts one combined `(Y, U, V)` triple (all already full-resolution,
/// 8-bit) into `(R, G, B)` using precomputed colorspace tables.
#[inline]
pub fn yuv_to_rgb_pixel(y: i32, u: i32, v: i32, coeffs: &YuvToRgbCoeffs, tables: &RgbTables) -> (u8, u8, u8) {
    // y_offset is Q9 (kept within i16 range); align it to y_coeff's Q13
    // before combining.
    let y_term = coeffs.y_coeff * y + (coeffs.y_offset << 4);
    let base = y_term >> 13;
    let r = base + tables.r[v as usize];
    let g = base + tables.g_u[u as usize] + tables.g_v[v as usize];
    let b = base + tables.b[u as usize];
    (clip_u8(r), clip_u8(g), clip_u8(b))
}

/// Combines and packs one destination row of a full-chroma RGB(A) format
/// (`SWS_FULL_CHR_H_INT` path): `y`, `u`, `v` are full-width, already
/// vertically combined and horizontally upsampled to luma resolution by the
/// caller. `row_y` is this row's destination-y, used to phase the ordered
/// dither applied to any channel narrower than 8 bits (RGB15/16/RGB4Byte).
/// `alpha`, when present, is a full-width already-combined alpha row (8-bit
/// domain) passed straight through without dithering -- none of our packed
/// alpha-carrying layouts (RGB32/RGB32_1 and BGR counterparts) use fewer
/// than 8 bits for the alpha field.
#[allow(clippy::too_many_arguments)]
pub fn pack_rgb_plane_row(
    y: &[i32],
    u: &[i32],
    v: &[i32],
    alpha: Option<&[i32]>,
    coeffs: &YuvToRgbCoeffs,
    tables: &RgbTables,
    layout: BitLayout,
    row_y: usize,
    dst: &mut [u8],
) {
    let width = y.len();
    let mut r = vec![0i16; width];
    let mut g = vec![0i16; width];
    let mut b = vec![0i16; width];
    for i in 0..width {
        let (rv, gv, bv) = yuv_to_rgb_pixel(y[i], u[i], v[i], coeffs, tables);
        let rv = apply_dither(rv as i32, i, row_y, layout.r_bits as u8).clamp(0, 255);
        let gv = apply_dither(gv as i32, i, row_y, layout.g_bits as u8).clamp(0, 255);
        let bv = apply_dither(bv as i32, i, row_y, layout.b_bits as u8).clamp(0, 255);
        r[i] = (rv as i16) << 7;
        g[i] = (gv as i16) << 7;
        b[i] = (bv as i16) << 7;
    }
    let a: Option<Vec<i16>> = alpha.map(|a| a.iter().map(|&v| (v.clamp(0, 255) as i16) << 7).collect());
    pack_rgb_row(layout, &r, &g, &b, a.as_deref(), dst);
}

/// A 2x2 ordered-dither bias matrix, values in `0..4`, used before packing
/// into 5/6-bit RGB15/16 channels.
pub const DITHER_2X2: [[i32; 2]; 2] = [[0, 2], [3, 1]];

/// An 8x8 ordered-dither bias matrix (standard Bayer pattern), values in
/// `0..64`, used before packing into 4-bit palette indices or monochrome.
pub const DITHER_8X8: [[i32; 8]; 8] = [
    [0, 32, 8, 40, 2, 34, 10, 42],
    [48, 16, 56, 24, 50, 18, 58, 26],
    [12, 44, 4, 36, 14, 46, 6, 38],
    [60, 28, 52, 20, 62, 30, 54, 22],
    [3, 35, 11, 43, 1, 33, 9, 41],
    [51, 19, 59, 27, 49, 17, 57, 25],
    [15, 47, 7, 39, 13, 45, 5, 37],
    [63, 31, 55, 23, 61, 29, 53, 21],
];

/// Adds an ordered-dither bias to `value` (an 8-bit sample) before it is
/// truncated to `target_bits`: 2x2 for 5- or 6-bit targets, 8x8 for anything
/// narrower. The matrix origin never moves with slice position — there is no
/// dither-phase swap between passes, matching the original's unconditional
/// `dither[y&1][x&1]` / `dither[y&7][x&7]` indexing.
pub fn apply_dither(value: i32, x: usize, y: usize, target_bits: u8) -> i32 {
    if target_bits >= 7 {
        return value;
    }
    let drop_bits = 8 - target_bits as u32;
    if target_bits >= 5 {
        let bias = DITHER_2X2[y & 1][x & 1];
        value + ((bias << drop_bits) >> 2)
    } else {
        let bias = DITHER_8X8[y & 7][x & 7];
        value + ((bias << drop_bits) >> 6)
    }
}
