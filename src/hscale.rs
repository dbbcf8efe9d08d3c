// SPDX-License-Identifier: MIT
//! # Horizontal Scaler (M1)
//!
//! Applies one row of a [`FilterBank`] to an unpacked 15-bit intermediate
//! row, producing a `dst_len`-wide row of Q15 samples. Dedicated loops for
//! the identity and 2-tap (bilinear) cases avoid the general multiply-add
//! loop's per-output indirection; everything else falls back to the generic
//! path. There is no runtime-codegenerated fast path here — the generic
//! 2-tap loop already covers the bilinear case a hand-tuned variant would
//! target.

use crate::filter::FilterBank;

/// Scales `src` (length >= `bank.offset[dst_len-1] + bank.taps`) into `dst`
/// (length `bank.dst_len`) using `bank`.
///
/// Each output sample is `clip_i16(sum(src[offset[i]+j] * coeff[i][j])) >> 7`.
/// The fixed `>> 7` shift is why the filter bank passed in must have been
/// built with `one == 1 << 7` ([`crate::context::Context::new`]) — the Q7
/// intermediate domain in and out.
pub fn scale_row(bank: &FilterBank, src: &[i16], dst: &mut [i16]) {
    debug_assert_eq!(dst.len(), bank.dst_len);
    match bank.taps {
        1 => scale_row_identity(bank, src, dst),
        2 => scale_row_bilinear(bank, src, dst),
        _ => scale_row_generic(bank, src, dst),
    }
}

fn scale_row_identity(bank: &FilterBank, src: &[i16], dst: &mut [i16]) {
    for i in 0..bank.dst_len {
        let off = bank.offset[i] as usize;
        let coeff = bank.row(i)[0] as i32;
        let acc = src[off] as i32 * coeff;
        dst[i] = clip_and_shift(acc);
    }
}

fn scale_row_bilinear(bank: &FilterBank, src: &[i16], dst: &mut [i16]) {
    for i in 0..bank.dst_len {
        let off = bank.offset[i] as usize;
        let row = bank.row(i);
        let acc = src[off] as i32 * row[0] as i32 + src[off + 1] as i32 * row[1] as i32;
        dst[i] = clip_and_shift(acc);
    }
}

fn scale_row_generic(bank: &FilterBank, src: &[i16], dst: &mut [i16]) {
    for i in 0..bank.dst_len {
        let off = bank.offset[i] as usize;
        let row = bank.row(i);
        let mut acc = 0i64;
        for (j, &c) in row.iter().enumerate() {
            acc += src[off + j] as i64 * c as i64;
        }
        dst[i] = clip_and_shift(acc as i32);
    }
}

#[inline]
fn clip_and_shift(acc: i32) -> i16 {
    let shifted = acc >> 7;
    shifted.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{build_filter, KernelKind};

    #[test]
    fn identity_geometry_is_byte_exact() {
        let bank = build_filter(8, 8, KernelKind::Bilinear, [0.0, 0.0], None, None, 1, 1 << 7).unwrap();
        let src: Vec<i16> = (0..8).map(|i| (i as i16) * 100 << 7).collect();
        let mut dst = vec![0i16; 8];
        scale_row(&bank, &src, &mut dst);
        // identity filter: coeff == one == 1<<7, so the >>7 exactly undoes
        // the single-tap multiply and dst reproduces src.
        assert_eq!(dst, src.as_slice());
    }

    #[test]
    fn point_upscale_repeats_samples() {
        let bank = build_filter(4, 8, KernelKind::Point, [0.0, 0.0], None, None, 1, 1 << 7).unwrap();
        let src: Vec<i16> = vec![0, 85 << 7, 170 << 7, 255 << 7];
        let mut dst = vec![0i16; 8];
        scale_row(&bank, &src, &mut dst);
        assert_eq!(dst[0], dst[1]);
        assert_eq!(dst[2], dst[3]);
        assert_eq!(dst[4], dst[5]);
        assert_eq!(dst[6], dst[7]);
    }
}
