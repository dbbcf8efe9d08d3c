// SPDX-License-Identifier: MIT
//! # Filter Builder (L3)
//!
//! Turns a `(srcLen, dstLen, kernel)` triple into a [`FilterBank`]: a
//! per-output-sample list of integer tap weights and source offsets, ready
//! for [`crate::hscale::scale_row`] or [`crate::vscale::combine_rows`] to
//! walk without bounds checks. This is the core this whole crate exists to
//! provide.

use crate::error::{Error, Result};
use crate::format::MAX_ROW_WIDTH;
use crate::vector::KernelVector;

/// Implementation-defined ceiling on tap count, analogous to `MAX_FILTER_SIZE`.
pub const MAX_FILTER_SIZE: usize = 256;

/// Near-zero magnitude (relative to `one`) below which a tap is considered
/// reducible. Mirrors `SWS_MAX_REDUCE_CUTOFF`.
const MAX_REDUCE_CUTOFF: f64 = 0.002;

/// Resampling kernel choice. Exactly one must be selected per filter build;
/// [`crate::ScaleFlags`] enforces that at the public API boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum KernelKind {
    Point,
    Bilinear,
    FastBilinear,
    Area,
    Bicubic,
    /// Generalized cosine kernel, exponent from `param[0]` (default 1.0).
    X,
    Gauss,
    Lanczos,
    Sinc,
    Spline,
}

/// The built filter bank: taps, per-output source offsets, and quantized
/// integer coefficients, satisfying:
///
/// - `0 <= offset[i] <= srcLen - taps` and `offset` is non-decreasing;
/// - row `i` of `coeff` sums to `one` exactly, after error-diffused rounding;
/// - a trailing sentinel row, equal to the last real row, absorbs a
///   one-past-end SIMD-style read;
/// - `offset[dstLen] == offset[dstLen - 1]`.
#[derive(Debug, Clone)]
pub struct FilterBank {
    pub taps: usize,
    pub dst_len: usize,
    pub offset: Vec<i32>,
    pub coeff: Vec<i16>,
}

impl FilterBank {
    #[inline]
    pub fn row(&self, i: usize) -> &[i16] {
        &self.coeff[i * self.taps..(i + 1) * self.taps]
    }

    /// `true` if every structural invariant documented on [`FilterBank`]
    /// holds. Intended for tests, not the hot path.
    pub fn check_invariants(&self, src_len: usize, one: i64) -> bool {
        if self.offset.len() != self.dst_len + 1 {
            return false;
        }
        for i in 0..self.dst_len {
            let off = self.offset[i];
            if off < 0 || (off as usize) + self.taps > src_len {
                return false;
            }
            if i + 1 < self.dst_len && self.offset[i] > self.offset[i + 1] {
                return false;
            }
            let sum: i64 = self.row(i).iter().map(|&c| c as i64).sum();
            if sum != one {
                return false;
            }
        }
        self.offset[self.dst_len] == self.offset[self.dst_len - 1]
    }
}

/// Builds a [`FilterBank`] mapping `src_len` source samples to `dst_len`
/// output samples.
///
/// `one` is the caller-supplied fixed-point unit: [`crate::hscale::scale_row`]
/// narrows its accumulator with a fixed `>> 7`, so the horizontal pass must
/// use `1 << 7`; [`crate::vscale`]'s combiners are built around `1 << 12` for
/// the vertical pass. `pre`/`post` are optional user-supplied convolution
/// kernels (step 4); `tap_align` rounds the final common tap count up to a
/// multiple of itself (use `1` for no alignment).
pub fn build_filter(
    src_len: u32,
    dst_len: u32,
    kernel: KernelKind,
    param: [f64; 2],
    pre: Option<&KernelVector>,
    post: Option<&KernelVector>,
    tap_align: usize,
    one: i64,
) -> Result<FilterBank> {
    if src_len == 0 || dst_len == 0 || src_len > MAX_ROW_WIDTH || dst_len > MAX_ROW_WIDTH {
        return Err(Error::InvalidGeometry(format!(
            "src_len={src_len} dst_len={dst_len} (limit {MAX_ROW_WIDTH})"
        )));
    }
    let src_len = src_len as i64;
    let dst_len_u = dst_len as usize;
    let dst_len = dst_len as i64;

    let x_inc = ((src_len << 16) + dst_len / 2) / dst_len;

    let (mut filter_size, mut raw, mut offset) = if (x_inc - 0x10000).abs() < 10 {
        // Unscaled: identity.
        let raw = vec![1.0f64; dst_len_u];
        let offset: Vec<i32> = (0..dst_len_u as i32).collect();
        (1usize, raw, offset)
    } else if kernel == KernelKind::Point {
        point_filter(x_inc, dst_len_u)
    } else if (x_inc <= 1 << 16 && kernel == KernelKind::Area) || kernel == KernelKind::FastBilinear
    {
        bilinear_upscale_filter(x_inc, dst_len_u)
    } else {
        general_kernel_filter(kernel, param, x_inc, src_len, dst_len, dst_len_u)?
    };

    // Step 4: apply caller pre/post kernels by convolving each row.
    if let Some(pre) = pre {
        apply_side_kernel(&mut raw, &mut offset, filter_size, pre);
        filter_size = raw.len() / dst_len_u;
    }
    if let Some(post) = post {
        apply_side_kernel(&mut raw, &mut offset, filter_size, post);
        filter_size = raw.len() / dst_len_u;
    }

    // Step 5: reduction - shift left while near-zero, preserving monotonicity,
    // then trim right to find the minimum common width.
    let mut min_filter_size = 0usize;
    for i in (0..dst_len_u).rev() {
        let row_start = i * filter_size;
        let mut cutoff = 0.0;
        let mut shifted = 0usize;
        loop {
            if shifted >= filter_size {
                break;
            }
            cutoff += raw[row_start + shifted].abs();
            if cutoff > MAX_REDUCE_CUTOFF * one as f64 {
                break;
            }
            if i + 1 < dst_len_u && offset[i] >= offset[i + 1] {
                break;
            }
            shifted += 1;
            offset[i] += 1;
        }
        if shifted > 0 {
            for k in 0..filter_size - shifted {
                raw[row_start + k] = raw[row_start + k + shifted];
            }
            for k in filter_size - shifted..filter_size {
                raw[row_start + k] = 0.0;
            }
        }

        let mut cutoff = 0.0;
        let mut min = filter_size;
        for j in (1..filter_size).rev() {
            cutoff += raw[row_start + j].abs();
            if cutoff > MAX_REDUCE_CUTOFF * one as f64 {
                break;
            }
            min -= 1;
        }
        min_filter_size = min_filter_size.max(min);
    }
    if min_filter_size == 0 {
        min_filter_size = 1;
    }
    let tap_align = tap_align.max(1);
    let reduced_size = (min_filter_size + tap_align - 1) / tap_align * tap_align;
    if reduced_size >= MAX_FILTER_SIZE {
        return Err(Error::FilterTooLarge {
            taps: reduced_size,
            max: MAX_FILTER_SIZE,
        });
    }

    let mut coeff_f = vec![0.0f64; reduced_size * dst_len_u];
    for i in 0..dst_len_u {
        for j in 0..reduced_size {
            coeff_f[i * reduced_size + j] = if j < filter_size {
                raw[i * filter_size + j]
            } else {
                0.0
            };
        }
    }
    let taps = reduced_size;

    // Step 6: border repair - fold overflow at the edges into the boundary column.
    for i in 0..dst_len_u {
        let row = i * taps;
        if offset[i] < 0 {
            for j in 1..taps {
                let left = (j as i32 + offset[i]).max(0) as usize;
                let v = coeff_f[row + j];
                coeff_f[row + left] += v;
                if left != j {
                    coeff_f[row + j] = 0.0;
                }
            }
            offset[i] = 0;
        }
        if offset[i] as i64 + taps as i64 > src_len {
            let shift = offset[i] as i64 + taps as i64 - src_len;
            for j in (0..taps - 1).rev() {
                let right = ((j as i64 + shift) as usize).min(taps - 1);
                let v = coeff_f[row + j];
                coeff_f[row + right] += v;
                if right != j {
                    coeff_f[row + j] = 0.0;
                }
            }
            offset[i] = (src_len - taps as i64) as i32;
        }
    }

    // Step 7: quantize with error-diffused rounding so each row sums to `one` exactly.
    let mut coeff = vec![0i16; taps * dst_len_u + taps]; // +taps for the sentinel row
    for i in 0..dst_len_u {
        let row = i * taps;
        let sum: f64 = coeff_f[row..row + taps].iter().sum();
        let mut error = 0.0f64;
        for j in 0..taps {
            let v = coeff_f[row + j] + error;
            let q = if sum.abs() > 1e-12 {
                (v * one as f64 / sum).round()
            } else {
                0.0
            };
            coeff[row + j] = q as i16;
            error = v - q * sum / one as f64;
        }
    }
    // Step 8: sentinel row duplicates the last real row.
    if dst_len_u > 0 {
        let last = (dst_len_u - 1) * taps;
        let sentinel = dst_len_u * taps;
        coeff.copy_within(last..last + taps, sentinel);
    }
    offset.push(*offset.last().unwrap_or(&0));

    Ok(FilterBank {
        taps,
        dst_len: dst_len_u,
        offset,
        coeff,
    })
}

fn point_filter(x_inc: i64, dst_len: usize) -> (usize, Vec<f64>, Vec<i32>) {
    let mut offset = Vec::with_capacity(dst_len);
    let mut x_dst_in_src = x_inc / 2 - 0x8000;
    for _ in 0..dst_len {
        let xx = (x_dst_in_src + (1 << 15)) >> 16;
        offset.push(xx as i32);
        x_dst_in_src += x_inc;
    }
    (1, vec![1.0; dst_len], offset)
}

fn bilinear_upscale_filter(x_inc: i64, dst_len: usize) -> (usize, Vec<f64>, Vec<i32>) {
    let filter_size = 2;
    let mut raw = Vec::with_capacity(dst_len * filter_size);
    let mut offset = Vec::with_capacity(dst_len);
    let mut x_dst_in_src = x_inc / 2 - 0x8000;
    for _ in 0..dst_len {
        let xx = (x_dst_in_src - (1 << 15) + (1 << 15)) >> 16;
        offset.push(xx as i32);
        for j in 0..filter_size {
            let sample_pos = (xx + j) << 16;
            let mut coeff = 1.0 - (sample_pos - x_dst_in_src).unsigned_abs() as f64 / 65536.0;
            if coeff < 0.0 {
                coeff = 0.0;
            }
            raw.push(coeff);
        }
        x_dst_in_src += x_inc;
    }
    (filter_size, raw, offset)
}

fn general_kernel_filter(
    kernel: KernelKind,
    param: [f64; 2],
    x_inc: i64,
    src_len: i64,
    dst_len: i64,
    dst_len_u: usize,
) -> Result<(usize, Vec<f64>, Vec<i32>)> {
    let size_factor = match kernel {
        KernelKind::Bicubic => 4.0,
        KernelKind::X => 8.0,
        KernelKind::Area => 1.0,
        KernelKind::Gauss => 8.0,
        KernelKind::Lanczos => {
            if param[0] != 0.0 {
                (2.0 * param[0]).ceil()
            } else {
                6.0
            }
        }
        KernelKind::Sinc => 20.0,
        KernelKind::Spline => 20.0,
        KernelKind::Bilinear => 2.0,
        KernelKind::Point | KernelKind::FastBilinear => unreachable!("handled separately"),
    };

    let upscale = x_inc <= 1 << 16;
    let mut filter_size = if upscale {
        1 + size_factor as i64
    } else {
        1 + (size_factor as i64 * src_len + dst_len - 1) / dst_len
    };
    if filter_size > src_len - 2 {
        filter_size = (src_len - 2).max(1);
    }
    let filter_size = filter_size.max(1) as usize;

    let mut raw = vec![0.0f64; dst_len_u * filter_size];
    let mut offset = Vec::with_capacity(dst_len_u);
    let mut x_dst_in_src = x_inc - 0x10000;
    for i in 0..dst_len_u {
        let xx = (x_dst_in_src - ((filter_size as i64 - 2) << 16)) / (1 << 17);
        offset.push(xx as i32);
        for j in 0..filter_size {
            let mut d = ((xx + j as i64) << 17) - x_dst_in_src;
            d = d.abs();
            let mut float_d = d as f64 / (1i64 << 17) as f64;
            if x_inc > 1 << 16 {
                float_d = float_d * dst_len as f64 / src_len as f64;
            }
            let coeff = evaluate_kernel(kernel, param, float_d);
            raw[i * filter_size + j] = coeff;
        }
        x_dst_in_src += 2 * x_inc;
    }
    Ok((filter_size, raw, offset))
}

fn evaluate_kernel(kernel: KernelKind, param: [f64; 2], d: f64) -> f64 {
    match kernel {
        KernelKind::Bicubic => {
            let b = param[0];
            let c = if param[1] != 0.0 { param[1] } else { 0.6 };
            let dd = d * d;
            let ddd = dd * d;
            if d < 1.0 {
                (12.0 - 9.0 * b - 6.0 * c) * ddd + (-18.0 + 12.0 * b + 6.0 * c) * dd
                    + (6.0 - 2.0 * b)
            } else if d < 2.0 {
                (-b - 6.0 * c) * ddd + (6.0 * b + 30.0 * c) * dd + (-12.0 * b - 48.0 * c) * d
                    + (8.0 * b + 24.0 * c)
            } else {
                0.0
            }
        }
        KernelKind::X => {
            let a = if param[0] != 0.0 { param[0] } else { 1.0 };
            let c = if d < 1.0 { (d * std::f64::consts::PI).cos() } else { -1.0 };
            let c = if c < 0.0 { -(-c).powf(a) } else { c.powf(a) };
            c * 0.5 + 0.5
        }
        KernelKind::Area => {
            // Trapezoid of half-width 1/x_inc relative to the Q17 distance `d`;
            // collapses to the bilinear tent for upscale ratios.
            (1.0 - d).clamp(0.0, 1.0)
        }
        KernelKind::Gauss => {
            let p = if param[0] != 0.0 { param[0] } else { 3.0 };
            2f64.powf(-p * d * d)
        }
        KernelKind::Sinc => sinc(d),
        KernelKind::Lanczos => {
            let p = if param[0] != 0.0 { param[0] } else { 3.0 };
            if d > p {
                0.0
            } else {
                sinc(d) * sinc(d / p)
            }
        }
        KernelKind::Bilinear => (1.0 - d).max(0.0),
        KernelKind::Spline => spline_coeff(1.0, 0.0, -2.196152422706632, 2.196152422706632 - 1.0, d),
        KernelKind::Point | KernelKind::FastBilinear => unreachable!("handled separately"),
    }
}

fn sinc(x: f64) -> f64 {
    if x.abs() < 1e-12 {
        1.0
    } else {
        let px = std::f64::consts::PI * x;
        px.sin() / px
    }
}

/// Recursive cubic B-spline segment evaluator (`getSplineCoeff` in the
/// original). The constant `-2.196152422706632` is preserved verbatim —
/// no further derivation is available for it.
fn spline_coeff(a: f64, b: f64, c: f64, d: f64, dist: f64) -> f64 {
    if dist <= 1.0 {
        ((d * dist + c) * dist + b) * dist + a
    } else {
        spline_coeff(
            0.0,
            b + 2.0 * c + 3.0 * d,
            c + 3.0 * d,
            -b - 3.0 * c - 6.0 * d,
            dist - 1.0,
        )
    }
}

/// Convolves every row of the raw coefficient matrix with `side`, shifting
/// offsets by `(tapsNew - tapsOld) / 2` to keep the window centered.
fn apply_side_kernel(raw: &mut Vec<f64>, offset: &mut [i32], taps_old: usize, side: &KernelVector) {
    let dst_len = offset.len();
    let taps_new = taps_old + side.len() - 1;
    let mut out = vec![0.0f64; dst_len * taps_new];
    for i in 0..dst_len {
        for (k, &sv) in side.coeff.iter().enumerate() {
            for j in 0..taps_old {
                out[i * taps_new + k + j] += sv * raw[i * taps_old + j];
            }
        }
        offset[i] += (taps_old as i32 - 1) / 2 - (taps_new as i32 - 1) / 2;
    }
    *raw = out;
}
