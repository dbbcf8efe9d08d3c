// SPDX-License-Identifier: MIT
//! # Kernel Vector Helper (L2)
//!
//! A tiny convolution-kernel helper: a thin, owned `Vec<f64>` wrapper with a
//! handful of free functions rather than a heavyweight builder. Consumed by
//! [`crate::filter::build_filter`] as the optional pre/post filter and by
//! [`default_filter`] to assemble blur/sharpen kernels.

/// A finite sequence of `f64` coefficients used as a convolution kernel.
///
/// Length is always `>= 1`. Convolving two vectors of length `a` and `b`
/// yields length `a + b - 1`; summing or differencing two vectors yields
/// `max(a, b)`, center-aligning the shorter one; shifting by `k` extends the
/// vector by `2|k|`.
#[derive(Debug, Clone)]
pub struct KernelVector {
    pub coeff: Vec<f64>,
}

impl KernelVector {
    /// A single-tap identity kernel: `[1.0]`.
    pub fn identity() -> Self {
        Self { coeff: vec![1.0] }
    }

    /// A single-tap constant kernel: `[value]`.
    pub fn constant(value: f64) -> Self {
        Self { coeff: vec![value] }
    }

    /// A discretized Gaussian of the given variance, with `quality` extra
    /// standard deviations of support on each side (higher quality widens
    /// the kernel and lowers truncation error).
    pub fn gaussian(variance: f64, quality: f64) -> Self {
        let variance = variance.max(1e-6);
        let sd = variance.sqrt();
        let radius = ((sd * quality).ceil() as i64).max(1);
        let len = (2 * radius + 1) as usize;
        let mut coeff = Vec::with_capacity(len);
        for i in -radius..=radius {
            let x = i as f64;
            coeff.push((-x * x / (2.0 * variance)).exp());
        }
        let mut v = Self { coeff };
        v.normalize(1.0);
        v
    }

    pub fn len(&self) -> usize {
        self.coeff.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coeff.is_empty()
    }

    /// Scales every coefficient by `scalar` in place.
    pub fn scale(&mut self, scalar: f64) {
        for c in &mut self.coeff {
            *c *= scalar;
        }
    }

    /// Rescales so the coefficients sum to `height`.
    pub fn normalize(&mut self, height: f64) {
        let sum: f64 = self.coeff.iter().sum();
        if sum != 0.0 {
            self.scale(height / sum);
        }
    }

    /// Full discrete convolution: length `a.len() + b.len() - 1`.
    pub fn convolve(&self, other: &KernelVector) -> KernelVector {
        let (a, b) = (&self.coeff, &other.coeff);
        let mut out = vec![0.0; a.len() + b.len() - 1];
        for (i, &av) in a.iter().enumerate() {
            for (j, &bv) in b.iter().enumerate() {
                out[i + j] += av * bv;
            }
        }
        KernelVector { coeff: out }
    }

    /// Elementwise sum, center-aligning the shorter operand. Result length
    /// is `max(self.len(), other.len())`.
    pub fn add(&self, other: &KernelVector) -> KernelVector {
        self.combine(other, |x, y| x + y)
    }

    /// Elementwise difference, center-aligning the shorter operand.
    pub fn sub(&self, other: &KernelVector) -> KernelVector {
        self.combine(other, |x, y| x - y)
    }

    fn combine(&self, other: &KernelVector, op: impl Fn(f64, f64) -> f64) -> KernelVector {
        let (long, short, swapped) = if self.len() >= other.len() {
            (self, other, false)
        } else {
            (other, self, true)
        };
        let mut out = long.coeff.clone();
        let offset = (long.len() - short.len()) / 2;
        for (i, &sv) in short.coeff.iter().enumerate() {
            let lv = out[offset + i];
            out[offset + i] = if swapped { op(sv, lv) } else { op(lv, sv) };
        }
        KernelVector { coeff: out }
    }

    /// Shifts the kernel by `shift` taps, extending the vector by `2|shift|`
    /// and zero-filling the new positions (matches `sws_getShiftedVec`).
    pub fn shifted(&self, shift: i64) -> KernelVector {
        let pad = 2 * shift.unsigned_abs() as usize;
        let mut coeff = vec![0.0; self.len() + pad];
        // Center the original data, then slide it by `shift` taps.
        let at = (pad as i64 / 2 + shift) as usize;
        for (i, &v) in self.coeff.iter().enumerate() {
            coeff[at + i] = v;
        }
        KernelVector { coeff }
    }

    pub fn shift(&mut self, shift: i64) {
        *self = self.shifted(shift);
    }
}

/// Assembles the pre/post blur and sharpen vectors used to build a default
/// source/destination filter pair, mirroring `sws_getDefaultFilter`.
///
/// `lumaBlur`/`chromaBlur` become Gaussian blur kernels convolved onto the
/// identity; `lumaSharpen`/`chromaSharpen` subtract a blur from a doubled
/// identity (unsharp masking). `hShift`/`vShift` apply [`KernelVector::shift`]
/// to the resulting luma vector. Returns `(luma, chroma)`.
pub fn default_filter(
    luma_blur: f64,
    chroma_blur: f64,
    luma_sharpen: f64,
    chroma_sharpen: f64,
    h_shift: f64,
    v_shift: f64,
) -> (KernelVector, KernelVector) {
    let _ = v_shift; // vertical shift applies to the caller's vertical filter, not modeled here.
    let mut luma = if luma_sharpen == 0.0 {
        KernelVector::identity()
    } else {
        let mut blurred = KernelVector::gaussian(luma_sharpen, 3.0);
        blurred.normalize(1.0);
        let mut doubled_identity = KernelVector::identity();
        doubled_identity.scale(2.0);
        doubled_identity.sub(&blurred)
    };
    if luma_blur != 0.0 {
        let mut blur = KernelVector::gaussian(luma_blur, 3.0);
        blur.normalize(1.0);
        luma = luma.convolve(&blur);
    }
    if h_shift != 0.0 {
        luma.shift(h_shift.round() as i64);
    }

    let mut chroma = if chroma_sharpen == 0.0 {
        KernelVector::identity()
    } else {
        let mut blurred = KernelVector::gaussian(chroma_sharpen, 3.0);
        blurred.normalize(1.0);
        let mut doubled_identity = KernelVector::identity();
        doubled_identity.scale(2.0);
        doubled_identity.sub(&blurred)
    };
    if chroma_blur != 0.0 {
        let mut blur = KernelVector::gaussian(chroma_blur, 3.0);
        blur.normalize(1.0);
        chroma = chroma.convolve(&blur);
    }

    (luma, chroma)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_single_tap_one() {
        let v = KernelVector::identity();
        assert_eq!(v.coeff, vec![1.0]);
    }

    #[test]
    fn convolve_length_is_sum_minus_one() {
        let a = KernelVector { coeff: vec![1.0, 2.0] };
        let b = KernelVector { coeff: vec![1.0, 1.0, 1.0] };
        let c = a.convolve(&b);
        assert_eq!(c.len(), a.len() + b.len() - 1);
    }

    #[test]
    fn normalize_sums_to_target() {
        let mut v = KernelVector::gaussian(4.0, 3.0);
        v.normalize(1.0);
        let sum: f64 = v.coeff.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn shift_extends_by_twice_the_shift() {
        let v = KernelVector::identity();
        let shifted = v.shifted(3);
        assert_eq!(shifted.len(), v.len() + 6);
    }
}
