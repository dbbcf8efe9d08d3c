// SPDX-License-Identifier: MIT
//! # Colorspace Configurator (L4)
//!
//! Derives the integer YUV<->RGB coefficients the vertical combiner/packer
//! (`vscale.rs`) needs from a colorspace matrix, source/destination range,
//! and brightness/contrast/saturation knobs. Mirrors the classic
//! `sws_setColorspaceDetails` calling convention.

use crate::error::{Error, Result};

/// The 8 colorspace matrices carried by the classic `rgb2yuv_table`, in
/// table order. Rows 0/1 and 2/3/5/6 are duplicates in that table; kept as
/// distinct variants here since they map to distinct `SWS_CS_*` selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMatrix {
    Bt709,
    Bt709Unspecified,
    Bt601,
    Bt601Unspecified,
    Fcc,
    Bt601B,
    Smpte170M,
    Smpte240M,
}

impl ColorMatrix {
    /// `(kr, kb)` luma weights and the four RGB->YUV matrix rows
    /// `(ry, gy, by, ru_uv, gu, bu, rv, gv, bv)` is overkill for what this
    /// crate actually consumes (YUV->RGB inverse coefficients); only `kr`
    /// and `kb` (red/blue luma weights) are needed to derive those, so this
    /// returns just those two. Row 7 (SMPTE 240M) is given its intended
    /// split (`kb = 0.116`'s complement) rather than the `kb = 0.384` a
    /// stray missing comma (`0.5 -0.116` parsed as subtraction) would give
    /// in a naive transcription.
    fn kr_kb(self) -> (f64, f64) {
        use ColorMatrix::*;
        match self {
            Bt709 | Bt709Unspecified => (0.2126, 0.0722),
            Bt601 | Bt601Unspecified | Bt601B => (0.299, 0.114),
            Fcc => (0.30, 0.11),
            Smpte170M => (0.299, 0.114),
            Smpte240M => (0.212, 0.087),
        }
    }
}

/// Limited ("MPEG", 16-235/240) vs full ("JPEG", 0-255) sample range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Range {
    Mpeg,
    Jpeg,
}

/// Colorspace configuration, as accepted by `set_colorspace_details`.
#[derive(Debug, Clone, Copy)]
pub struct ColorspaceParams {
    pub matrix: ColorMatrix,
    pub src_range: Range,
    pub dst_range: Range,
    /// Q16.16 fixed point, `1 << 16` is neutral.
    pub contrast: i64,
    /// Q16.16 fixed point, `1 << 16` is neutral.
    pub saturation: i64,
    /// Plain integer offset, `0` is neutral.
    pub brightness: i64,
}

impl Default for ColorspaceParams {
    fn default() -> Self {
        Self {
            matrix: ColorMatrix::Bt601,
            src_range: Range::Mpeg,
            dst_range: Range::Mpeg,
            contrast: 1 << 16,
            saturation: 1 << 16,
            brightness: 0,
        }
    }
}

/// Integer YUV->RGB coefficients, Q13 fixed point (matches
/// `yuv2rgb_y_coeff` et al. in the original), consumed by the full-chroma
/// RGB packer path and by the R/G/B lookup-table builder below.
#[derive(Debug, Clone, Copy)]
pub struct YuvToRgbCoeffs {
    pub y_coeff: i32,
    pub y_offset: i32,
    pub v_to_r: i32,
    pub v_to_g: i32,
    pub u_to_g: i32,
    pub u_to_b: i32,
}

fn round_to_i16(v: f64) -> i32 {
    (v.round() as i64).clamp(-0x7FFF, 0x7FFF) as i32
}

/// Derives [`YuvToRgbCoeffs`] from [`ColorspaceParams`]. `dst_is_yuv_or_gray`
/// must be `false` — like the original, converting *to* YUV or gray never
/// needs an inverse matrix, so this rejects the call the way
/// `sws_setColorspaceDetails` returns `-1`.
pub fn build_yuv_to_rgb(params: &ColorspaceParams, dst_is_yuv_or_gray: bool) -> Result<YuvToRgbCoeffs> {
    if dst_is_yuv_or_gray {
        return Err(Error::InvalidFlags(
            "setColorspaceDetails requires an RGB destination".into(),
        ));
    }
    let (kr, kb) = params.matrix.kr_kb();
    let crv = 2.0 * (1.0 - kr);
    let cbu = 2.0 * (1.0 - kb);
    let cgu = -2.0 * kb * (1.0 - kb) / (1.0 - kr - kb);
    let cgv = -2.0 * kr * (1.0 - kr) / (1.0 - kr - kb);

    let mut crv = crv;
    let mut cbu = cbu;
    let mut cgu = cgu;
    let mut cgv = cgv;
    let mut cy = 1.0;
    let mut oy = 0.0;

    if params.src_range == Range::Mpeg {
        cy = cy * 255.0 / 219.0;
        oy = 16.0;
    } else {
        crv = crv * 224.0 / 255.0;
        cbu = cbu * 224.0 / 255.0;
        cgu = cgu * 224.0 / 255.0;
        cgv = cgv * 224.0 / 255.0;
    }

    let contrast = params.contrast as f64 / 65536.0;
    let saturation = params.saturation as f64 / 65536.0;
    cy *= contrast;
    crv *= contrast * saturation;
    cbu *= contrast * saturation;
    cgu *= contrast * saturation;
    cgv *= contrast * saturation;
    oy -= params.brightness as f64;

    let to_fixed = |v: f64, shift: i64| round_to_i16(v * (1i64 << shift) as f64);

    Ok(YuvToRgbCoeffs {
        y_coeff: to_fixed(cy, 13),
        // base = cy*(Y - oy), so the stored offset is -cy*oy, not oy on its
        // own -- oy is a plain pixel-value black point (16 for limited
        // range), not yet scaled by cy. Kept at Q9 (the consumer aligns it
        // to y_coeff's Q13 with a <<4) so the product fits i16.
        y_offset: to_fixed(-cy * oy, 9),
        v_to_r: to_fixed(crv, 13),
        v_to_g: to_fixed(cgv, 13),
        u_to_g: to_fixed(cgu, 13),
        u_to_b: to_fixed(cbu, 13),
    })
}

/// Per-channel 8-bit contribution tables, indexed by a clipped 8-bit Y/U/V
/// sample. The destination row packer (see `rowconv.rs`) combines
/// `r[tab_v]`, `g_u[tab_u] + g_v[tab_v]`, `b[tab_u]` and shifts/masks the
/// sum into the destination pixel's bit layout — this module only computes
/// the per-channel contributions, since those are format-independent; the
/// format-specific bit-packing lives in one place (the row packer) rather
/// than being duplicated per table.
#[derive(Debug, Clone)]
pub struct RgbTables {
    pub r: Box<[i32; 256]>,
    pub g_u: Box<[i32; 256]>,
    pub g_v: Box<[i32; 256]>,
    pub b: Box<[i32; 256]>,
}

pub fn build_rgb_tables(coeffs: &YuvToRgbCoeffs) -> RgbTables {
    let mut r = Box::new([0i32; 256]);
    let mut g_u = Box::new([0i32; 256]);
    let mut g_v = Box::new([0i32; 256]);
    let mut b = Box::new([0i32; 256]);
    for i in 0..256i32 {
        let v = i - 128;
        r[i as usize] = (coeffs.v_to_r * v) >> 13;
        g_u[i as usize] = (coeffs.u_to_g * v) >> 13;
        g_v[i as usize] = (coeffs.v_to_g * v) >> 13;
        b[i as usize] = (coeffs.u_to_b * v) >> 13;
    }
    RgbTables { r, g_u, g_v, b }
}

/// Integer RGB->YUV coefficients, Q16 fixed point, consumed when the
/// *source* is RGB/BGR and the destination is YUV/gray (the forward half of
/// the matrix `build_yuv_to_rgb` derives the inverse of).
#[derive(Debug, Clone, Copy)]
pub struct RgbToYuvCoeffs {
    pub r_to_y: i32,
    pub g_to_y: i32,
    pub b_to_y: i32,
    pub y_add: i32,
    pub r_to_u: i32,
    pub g_to_u: i32,
    pub b_to_u: i32,
    pub r_to_v: i32,
    pub g_to_v: i32,
    pub b_to_v: i32,
}

/// Derives [`RgbToYuvCoeffs`] from the same [`ColorMatrix`]/range pair
/// `build_yuv_to_rgb` uses, for the RGB(A)->YUV source direction. `flags`'s
/// [`crate::context::ScaleFlags::FAST_CHROMA`] selects a coarser, faster
/// chroma weighting that skips the green contribution's cross term --
/// the reduced-precision `FAST_BGR2YV12` mode.
pub fn build_rgb_to_yuv(params: &ColorspaceParams, fast_chroma: bool) -> RgbToYuvCoeffs {
    let (kr, kb) = params.matrix.kr_kb();
    let kg = 1.0 - kr - kb;

    let (y_scale, y_add) = match params.src_range {
        Range::Mpeg => (219.0 / 255.0, 16.0),
        Range::Jpeg => (1.0, 0.0),
    };
    let uv_scale = match params.dst_range {
        Range::Mpeg => 224.0 / 255.0,
        Range::Jpeg => 1.0,
    };

    let contrast = params.contrast as f64 / 65536.0;
    let saturation = if fast_chroma { 1.0 } else { params.saturation as f64 / 65536.0 };

    let ry = kr * y_scale * contrast;
    let gy = kg * y_scale * contrast;
    let by = kb * y_scale * contrast;

    let cb_scale = uv_scale * saturation / (2.0 * (1.0 - kb));
    let cr_scale = uv_scale * saturation / (2.0 * (1.0 - kr));

    let to_fixed = |v: f64| round_to_i16(v * 65536.0);

    RgbToYuvCoeffs {
        r_to_y: to_fixed(ry),
        g_to_y: to_fixed(gy),
        b_to_y: to_fixed(by),
        y_add: (y_add * 256.0) as i32,
        r_to_u: to_fixed(-kr * cb_scale),
        g_to_u: to_fixed(-kg * cb_scale),
        b_to_u: to_fixed((1.0 - kb) * cb_scale),
        r_to_v: to_fixed((1.0 - kr) * cr_scale),
        g_to_v: to_fixed(-kg * cr_scale),
        b_to_v: to_fixed(-kb * cr_scale),
    }
}

/// Converts one `(R, G, B)` 8-bit sample to `(Y, U, V)` 8-bit samples.
#[inline]
pub fn rgb_to_yuv_pixel(r: i32, g: i32, b: i32, coeffs: &RgbToYuvCoeffs) -> (u8, u8, u8) {
    let y = (coeffs.r_to_y * r + coeffs.g_to_y * g + coeffs.b_to_y * b) >> 16;
    let y = y + (coeffs.y_add >> 8);
    let u = ((coeffs.r_to_u * r + coeffs.g_to_u * g + coeffs.b_to_u * b) >> 16) + 128;
    let v = ((coeffs.r_to_v * r + coeffs.g_to_v * g + coeffs.b_to_v * b) >> 16) + 128;
    (clip_u8(y), clip_u8(u), clip_u8(v))
}

/// A 768-entry saturation-clip table, offset so index `256 + x` holds
/// `clamp(x, 0, 255)` for `x` in `-256..512`. Computed entirely at compile
/// time (`const fn`), replacing the original's lazily-initialized global.
pub const CLIP_TABLE_OFFSET: usize = 256;

const fn build_clip_table() -> [u8; 768] {
    let mut table = [0u8; 768];
    let mut i = 0;
    while i < 768 {
        let v = i as i32 - CLIP_TABLE_OFFSET as i32;
        table[i] = if v < 0 {
            0
        } else if v > 255 {
            255
        } else {
            v as u8
        };
        i += 1;
    }
    table
}

pub const CLIP_TABLE: [u8; 768] = build_clip_table();

#[inline]
pub fn clip_u8(v: i32) -> u8 {
    CLIP_TABLE[(v + CLIP_TABLE_OFFSET as i32).clamp(0, 767) as usize]
}
