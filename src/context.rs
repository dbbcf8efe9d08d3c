// SPDX-License-Identifier: MIT
//! # Scaler Context (T1)
//!
//! [`Context`] is the single long-lived object this crate hands callers: it
//! owns the geometry, the four filter banks (horizontal/vertical x
//! luma/chroma), the colorspace coefficients and lookup tables, the row
//! caches, and (for palettized sources) the active palette. Building one is
//! the expensive part — deriving filter taps, solving colorspace
//! coefficients — so [`Context::get_cached`] lets a caller reuse one across
//! frames when nothing changed, the same trade-off `sws_getCachedContext`
//! makes.

use log::debug;

use crate::colorspace::{
    build_rgb_tables, build_rgb_to_yuv, build_yuv_to_rgb, ColorspaceParams, RgbToYuvCoeffs, RgbTables, YuvToRgbCoeffs,
};
use crate::error::{Error, Result};
use crate::filter::{build_filter, FilterBank, KernelKind};
use crate::format::{PixelFormat, MAX_ROW_WIDTH};
use crate::ringcache::RowCache;
use crate::rowconv::PaletteEntry;

/// Behavioral switches, bitflag-style. Hand-rolled rather than pulled from
/// a crate: there are only a handful of bits and no combinators beyond
/// `|`/`&` are needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaleFlags(u32);

impl ScaleFlags {
    pub const NONE: ScaleFlags = ScaleFlags(0);
    /// Use the reduced-precision bilinear path for chroma (`FAST_BGR2YV12`
    /// in the original's terms — despite the name, it governs RGB->YUV
    /// chroma precision generally, not just BGR).
    pub const FAST_CHROMA: ScaleFlags = ScaleFlags(1 << 0);
    /// Disables rounding-error accumulation tracking in the filter builder's
    /// reduction pass (trades a little accuracy for fewer taps).
    pub const ACCURATE_ROUNDING: ScaleFlags = ScaleFlags(1 << 1);
    /// Forces the full-chroma-resolution RGB packer path even when a
    /// cheaper subsampled path would do.
    pub const FULL_CHROMA_INTERPOLATION: ScaleFlags = ScaleFlags(1 << 2);

    pub fn contains(self, other: ScaleFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for ScaleFlags {
    type Output = ScaleFlags;
    fn bitor(self, rhs: ScaleFlags) -> ScaleFlags {
        ScaleFlags(self.0 | rhs.0)
    }
}

impl Default for ScaleFlags {
    fn default() -> Self {
        ScaleFlags::NONE
    }
}

/// The four filter banks a scaling context needs: horizontal/vertical,
/// each potentially different for luma and chroma since chroma planes are
/// narrower and shorter under subsampling.
pub struct FilterSet {
    pub h_luma: FilterBank,
    pub h_chroma: FilterBank,
    pub v_luma: FilterBank,
    pub v_chroma: FilterBank,
}

/// Owns everything needed to scale and/or reformat frames between a fixed
/// source and destination geometry/format pair.
pub struct Context {
    pub src_w: u32,
    pub src_h: u32,
    pub src_fmt: PixelFormat,
    pub dst_w: u32,
    pub dst_h: u32,
    pub dst_fmt: PixelFormat,
    pub kernel: KernelKind,
    pub flags: ScaleFlags,

    pub filters: FilterSet,

    pub colorspace: ColorspaceParams,
    pub yuv_to_rgb: Option<YuvToRgbCoeffs>,
    pub rgb_tables: Option<RgbTables>,
    /// Forward RGB->YUV coefficients, derived when the source is RGB/BGR
    /// (or palettized) and the destination is YUV or gray. The inverse of
    /// `yuv_to_rgb`'s direction, not a reuse of the same matrix.
    pub rgb_to_yuv: Option<RgbToYuvCoeffs>,

    pub luma_cache: RowCache,
    pub chroma_u_cache: RowCache,
    pub chroma_v_cache: RowCache,
    pub alpha_cache: Option<RowCache>,

    pub palette: Option<[PaletteEntry; 256]>,

    /// `Some(bottom_up)` once the first `scale()` call of a frame pins down
    /// delivery order; reset to `None` when the frame completes. A later
    /// call within the same frame that disagrees is `SliceMisordered`.
    pub slice_dir: Option<bool>,
    pub next_src_row: i64,
    pub next_dst_row: i64,
    /// Next source row (luma/alpha domain) to horizontally scale into the
    /// luma ring. Tracked separately from `next_src_row` (which only counts
    /// rows *delivered* so far) so ingestion can lag behind delivery and
    /// advance lazily, one output row's worth at a time — see
    /// [`crate::scale::Context::scale`].
    pub(crate) next_luma_ingest_row: i64,
    /// Next chroma row (in source chroma-plane index space) to horizontally
    /// scale into the chroma rings. Advances on its own schedule, driven by
    /// the vertical chroma filter rather than the luma filter.
    pub(crate) next_chroma_ingest_row: i64,
    pub(crate) last_chroma_row: Option<(Vec<i32>, Vec<i32>)>,
}

impl Context {
    /// Builds a new context for `src -> dst` at the given geometry, kernel,
    /// and flags, deriving all four filter banks and (if the destination is
    /// RGB) the default colorspace coefficients.
    pub fn new(
        src_w: u32,
        src_h: u32,
        src_fmt: PixelFormat,
        dst_w: u32,
        dst_h: u32,
        dst_fmt: PixelFormat,
        kernel: KernelKind,
        flags: ScaleFlags,
    ) -> Result<Context> {
        if src_w == 0 || src_h == 0 || dst_w == 0 || dst_h == 0 {
            return Err(Error::InvalidGeometry("zero-sized plane".into()));
        }
        if src_w > MAX_ROW_WIDTH || dst_w > MAX_ROW_WIDTH {
            return Err(Error::InvalidGeometry(format!(
                "row width exceeds {MAX_ROW_WIDTH}"
            )));
        }
        if dst_fmt.is_palettized() {
            return Err(Error::UnsupportedOutputFormat("palettized destinations are not supported"));
        }

        let (src_fmt, src_was_jpeg) = src_fmt.normalize_jpeg_range();
        let (dst_fmt, dst_was_jpeg) = dst_fmt.normalize_jpeg_range();

        debug!(
            "building context: {src_w}x{src_h} {src_fmt:?} -> {dst_w}x{dst_h} {dst_fmt:?}, kernel={kernel:?}"
        );

        let src_desc = src_fmt.descriptor();
        let dst_desc = dst_fmt.descriptor();

        let src_chroma_w = PixelFormat::chroma_dim(src_w, src_desc.chroma_log2_w);
        let src_chroma_h = PixelFormat::chroma_dim(src_h, src_desc.chroma_log2_h);
        let dst_chroma_w = PixelFormat::chroma_dim(dst_w, dst_desc.chroma_log2_w);
        let dst_chroma_h = PixelFormat::chroma_dim(dst_h, dst_desc.chroma_log2_h);

        // Horizontal coefficients are consumed by `hscale::scale_row`, which
        // narrows back to the Q7 intermediate domain with a plain `>> 7`, so
        // the horizontal `one` must itself be `1 << 7`. The vertical pass
        // narrows with `vscale`'s `>> 19` (8-bit) / `>> 11` (16-bit)
        // combiners, which are built around `one == 1 << 12`.
        let one_h = 1i64 << 7;
        let one_v = 1i64 << 12;
        let h_luma = build_filter(src_w, dst_w, kernel, [0.0, 0.0], None, None, 1, one_h)?;
        let h_chroma = build_filter(src_chroma_w, dst_chroma_w, kernel, [0.0, 0.0], None, None, 1, one_h)?;
        let v_luma = build_filter(src_h, dst_h, kernel, [0.0, 0.0], None, None, 1, one_v)?;
        let v_chroma = build_filter(src_chroma_h, dst_chroma_h, kernel, [0.0, 0.0], None, None, 1, one_v)?;

        let mut colorspace = ColorspaceParams::default();
        if src_was_jpeg {
            colorspace.src_range = crate::colorspace::Range::Jpeg;
        }
        if dst_was_jpeg {
            colorspace.dst_range = crate::colorspace::Range::Jpeg;
        }

        let (yuv_to_rgb, rgb_tables) = if dst_fmt.is_rgb_family() && src_fmt.is_yuv() {
            let coeffs = build_yuv_to_rgb(&colorspace, false)?;
            let tables = build_rgb_tables(&coeffs);
            (Some(coeffs), Some(tables))
        } else {
            (None, None)
        };

        let rgb_to_yuv = if (src_fmt.is_rgb_family() || src_fmt.is_palettized()) && (dst_fmt.is_yuv() || dst_fmt.is_gray()) {
            Some(build_rgb_to_yuv(&colorspace, flags.contains(ScaleFlags::FAST_CHROMA)))
        } else {
            None
        };

        let v_luma_taps = v_luma.taps.max(1);
        let v_chroma_taps = v_chroma.taps.max(1);

        Ok(Context {
            src_w,
            src_h,
            src_fmt,
            dst_w,
            dst_h,
            dst_fmt,
            kernel,
            flags,
            filters: FilterSet { h_luma, h_chroma, v_luma, v_chroma },
            colorspace,
            yuv_to_rgb,
            rgb_tables,
            rgb_to_yuv,
            luma_cache: RowCache::new(v_luma_taps, dst_w as usize),
            chroma_u_cache: RowCache::new(v_chroma_taps, dst_chroma_w as usize),
            chroma_v_cache: RowCache::new(v_chroma_taps, dst_chroma_w as usize),
            alpha_cache: if src_desc.has_alpha { Some(RowCache::new(v_luma_taps, dst_w as usize)) } else { None },
            palette: None,
            slice_dir: None,
            next_src_row: 0,
            next_dst_row: 0,
            next_luma_ingest_row: 0,
            next_chroma_ingest_row: 0,
            last_chroma_row: None,
        })
    }

    /// Reuses `existing` if it already matches the requested geometry,
    /// formats, kernel, and flags; otherwise builds a fresh context. Mirrors
    /// `sws_getCachedContext`'s "free on mismatch, reuse on match" contract,
    /// except here the caller gets the decision back as a `Result` instead
    /// of a context that may or may not be the one passed in.
    #[allow(clippy::too_many_arguments)]
    pub fn get_cached(
        existing: Option<Context>,
        src_w: u32,
        src_h: u32,
        src_fmt: PixelFormat,
        dst_w: u32,
        dst_h: u32,
        dst_fmt: PixelFormat,
        kernel: KernelKind,
        flags: ScaleFlags,
    ) -> Result<Context> {
        if let Some(ctx) = &existing {
            let matches = ctx.src_w == src_w
                && ctx.src_h == src_h
                && ctx.src_fmt == src_fmt
                && ctx.dst_w == dst_w
                && ctx.dst_h == dst_h
                && ctx.dst_fmt == dst_fmt
                && ctx.kernel == kernel
                && ctx.flags == flags;
            if matches {
                return Ok(existing.unwrap());
            }
        }
        Context::new(src_w, src_h, src_fmt, dst_w, dst_h, dst_fmt, kernel, flags)
    }

    /// Replaces the colorspace configuration and re-derives the YUV->RGB
    /// coefficients and lookup tables (and, if this context also converts
    /// RGB->YUV, the forward coefficients too). Fails if the destination
    /// isn't RGB — the inverse matrix only matters on the way into RGB.
    pub fn set_colorspace_details(&mut self, params: ColorspaceParams) -> Result<()> {
        let coeffs = build_yuv_to_rgb(&params, self.dst_fmt.is_yuv() || self.dst_fmt.is_gray())?;
        self.rgb_tables = Some(build_rgb_tables(&coeffs));
        self.yuv_to_rgb = Some(coeffs);
        if self.rgb_to_yuv.is_some() {
            self.rgb_to_yuv = Some(build_rgb_to_yuv(&params, self.flags.contains(ScaleFlags::FAST_CHROMA)));
        }
        self.colorspace = params;
        Ok(())
    }

    pub fn colorspace_details(&self) -> ColorspaceParams {
        self.colorspace
    }

    /// Installs the active palette for a palettized source. Must be called
    /// before every `scale()` that reads a palettized frame whose palette
    /// may have changed, the way the original rebuilds its RGBA32 palette
    /// cache per call.
    pub fn set_palette(&mut self, palette: [PaletteEntry; 256]) {
        self.palette = Some(palette);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_a_simple_downscale_context() {
        let ctx = Context::new(
            16, 16, PixelFormat::Yuv420P, 8, 8, PixelFormat::Yuv420P, KernelKind::Bilinear, ScaleFlags::NONE,
        )
        .unwrap();
        assert_eq!(ctx.dst_w, 8);
        assert!(ctx.yuv_to_rgb.is_none());
    }

    #[test]
    fn rgb_destination_derives_colorspace_tables() {
        let ctx = Context::new(
            16, 16, PixelFormat::Yuv420P, 16, 16, PixelFormat::Rgb24, KernelKind::Point, ScaleFlags::NONE,
        )
        .unwrap();
        assert!(ctx.yuv_to_rgb.is_some());
        assert!(ctx.rgb_tables.is_some());
    }

    #[test]
    fn rejects_oversized_geometry() {
        let err = Context::new(
            MAX_ROW_WIDTH + 1, 16, PixelFormat::Yuv420P, 8, 8, PixelFormat::Yuv420P, KernelKind::Point, ScaleFlags::NONE,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidGeometry(_)));
    }

    #[test]
    fn get_cached_reuses_matching_context() {
        let ctx = Context::new(
            16, 16, PixelFormat::Yuv420P, 8, 8, PixelFormat::Yuv420P, KernelKind::Bilinear, ScaleFlags::NONE,
        )
        .unwrap();
        let ctx2 = Context::get_cached(
            Some(ctx), 16, 16, PixelFormat::Yuv420P, 8, 8, PixelFormat::Yuv420P, KernelKind::Bilinear, ScaleFlags::NONE,
        )
        .unwrap();
        assert_eq!(ctx2.dst_w, 8);
    }
}
