// SPDX-License-Identifier: MIT
//! # Pixel-Format Registry (L1)
//!
//! A closed enumeration of every pixel layout the scaler understands, each
//! paired with an immutable [`FormatDescriptor`]. Nothing here allocates;
//! `descriptor()` is a match over `'static` data, the Rust equivalent of a
//! process-wide format-descriptor table built once at static-init time.

/// Compile-time upper bound on a single scaled row's intermediate width.
///
/// The chroma half-width is capped so U and V planes can share one
/// ring-buffer row via a fixed stride offset (see
/// [`crate::ringcache::RowCache`]). Exceeding it is an
/// [`crate::Error::InvalidGeometry`].
pub const MAX_ROW_WIDTH: u32 = 8192;

/// Which broad pixel family a format belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Yuv,
    Rgb,
    Bgr,
    Gray,
    Pal,
    Mono,
}

/// Static, per-format metadata. One instance per [`PixelFormat`] variant,
/// all `'static` — never allocated, never mutated after the table is built.
#[derive(Debug, Clone, Copy)]
pub struct FormatDescriptor {
    pub depth_bits: u8,
    pub component_count: u8,
    pub chroma_log2_w: u8,
    pub chroma_log2_h: u8,
    pub is_planar: bool,
    pub is_packed: bool,
    pub family: Family,
    pub endian_big: bool,
    pub has_alpha: bool,
}

/// The closed set of pixel formats this crate can read or write.
///
/// Round-trip-compatible with itself: scaling a format to itself at identity
/// geometry reproduces the input byte-exactly for planar layouts, and for
/// packed layouts whose stride matches the natural row pitch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    // Planar YUV, 8-bit components.
    Yuv410P,
    Yuv420P,
    Yuva420P,
    Yuv422P,
    Yuv440P,
    Yuv444P,
    // JPEG-range planar variants, normalized away before use (see `normalize_jpeg_range`).
    YuvJ420P,
    YuvJ422P,
    YuvJ444P,
    YuvJ440P,
    // 16-bit planar YUV, 4:2:0.
    Yuv420P16Le,
    Yuv420P16Be,
    // Semi-planar (interleaved chroma).
    Nv12,
    Nv21,
    // Packed YUV 4:2:2.
    Yuyv422,
    Uyvy422,
    // Packed RGB/BGR.
    Rgb15,
    Bgr15,
    Rgb16,
    Bgr16,
    Rgb24,
    Bgr24,
    Rgb32,
    Bgr32,
    Rgb32_1,
    Bgr32_1,
    Rgb4Byte,
    Bgr4Byte,
    // 48-bit RGB.
    Rgb48Le,
    Rgb48Be,
    // Palettized.
    Pal8,
    Rgb8Pal,
    Bgr8Pal,
    Rgb4Pal,
    Bgr4Pal,
    // Gray / mono.
    Gray8,
    Gray16Le,
    Gray16Be,
    MonoWhite,
    MonoBlack,
}

impl PixelFormat {
    /// Returns the immutable descriptor for this format.
    pub fn descriptor(self) -> FormatDescriptor {
        use Family::*;
        use PixelFormat::*;
        match self {
            Yuv410P => FormatDescriptor { depth_bits: 8, component_count: 3, chroma_log2_w: 2, chroma_log2_h: 2, is_planar: true, is_packed: false, family: Yuv, endian_big: false, has_alpha: false },
            Yuv420P | YuvJ420P => FormatDescriptor { depth_bits: 8, component_count: 3, chroma_log2_w: 1, chroma_log2_h: 1, is_planar: true, is_packed: false, family: Yuv, endian_big: false, has_alpha: false },
            Yuva420P => FormatDescriptor { depth_bits: 8, component_count: 4, chroma_log2_w: 1, chroma_log2_h: 1, is_planar: true, is_packed: false, family: Yuv, endian_big: false, has_alpha: true },
            Yuv422P | YuvJ422P => FormatDescriptor { depth_bits: 8, component_count: 3, chroma_log2_w: 1, chroma_log2_h: 0, is_planar: true, is_packed: false, family: Yuv, endian_big: false, has_alpha: false },
            Yuv440P | YuvJ440P => FormatDescriptor { depth_bits: 8, component_count: 3, chroma_log2_w: 0, chroma_log2_h: 1, is_planar: true, is_packed: false, family: Yuv, endian_big: false, has_alpha: false },
            Yuv444P | YuvJ444P => FormatDescriptor { depth_bits: 8, component_count: 3, chroma_log2_w: 0, chroma_log2_h: 0, is_planar: true, is_packed: false, family: Yuv, endian_big: false, has_alpha: false },
            Yuv420P16Le => FormatDescriptor { depth_bits: 16, component_count: 3, chroma_log2_w: 1, chroma_log2_h: 1, is_planar: true, is_packed: false, family: Yuv, endian_big: false, has_alpha: false },
            Yuv420P16Be => FormatDescriptor { depth_bits: 16, component_count: 3, chroma_log2_w: 1, chroma_log2_h: 1, is_planar: true, is_packed: false, family: Yuv, endian_big: true, has_alpha: false },
            Nv12 | Nv21 => FormatDescriptor { depth_bits: 8, component_count: 3, chroma_log2_w: 1, chroma_log2_h: 1, is_planar: true, is_packed: false, family: Yuv, endian_big: false, has_alpha: false },
            Yuyv422 | Uyvy422 => FormatDescriptor { depth_bits: 8, component_count: 3, chroma_log2_w: 1, chroma_log2_h: 0, is_planar: false, is_packed: true, family: Yuv, endian_big: false, has_alpha: false },
            Rgb15 => FormatDescriptor { depth_bits: 15, component_count: 3, chroma_log2_w: 0, chroma_log2_h: 0, is_planar: false, is_packed: true, family: Rgb, endian_big: false, has_alpha: false },
            Bgr15 => FormatDescriptor { depth_bits: 15, component_count: 3, chroma_log2_w: 0, chroma_log2_h: 0, is_planar: false, is_packed: true, family: Bgr, endian_big: false, has_alpha: false },
            Rgb16 => FormatDescriptor { depth_bits: 16, component_count: 3, chroma_log2_w: 0, chroma_log2_h: 0, is_planar: false, is_packed: true, family: Rgb, endian_big: false, has_alpha: false },
            Bgr16 => FormatDescriptor { depth_bits: 16, component_count: 3, chroma_log2_w: 0, chroma_log2_h: 0, is_planar: false, is_packed: true, family: Bgr, endian_big: false, has_alpha: false },
            Rgb24 => FormatDescriptor { depth_bits: 24, component_count: 3, chroma_log2_w: 0, chroma_log2_h: 0, is_planar: false, is_packed: true, family: Rgb, endian_big: false, has_alpha: false },
            Bgr24 => FormatDescriptor { depth_bits: 24, component_count: 3, chroma_log2_w: 0, chroma_log2_h: 0, is_planar: false, is_packed: true, family: Bgr, endian_big: false, has_alpha: false },
            Rgb32 | Rgb32_1 => FormatDescriptor { depth_bits: 32, component_count: 4, chroma_log2_w: 0, chroma_log2_h: 0, is_planar: false, is_packed: true, family: Rgb, endian_big: false, has_alpha: true },
            Bgr32 | Bgr32_1 => FormatDescriptor { depth_bits: 32, component_count: 4, chroma_log2_w: 0, chroma_log2_h: 0, is_planar: false, is_packed: true, family: Bgr, endian_big: false, has_alpha: true },
            Rgb4Byte => FormatDescriptor { depth_bits: 8, component_count: 3, chroma_log2_w: 0, chroma_log2_h: 0, is_planar: false, is_packed: true, family: Rgb, endian_big: false, has_alpha: false },
            Bgr4Byte => FormatDescriptor { depth_bits: 8, component_count: 3, chroma_log2_w: 0, chroma_log2_h: 0, is_planar: false, is_packed: true, family: Bgr, endian_big: false, has_alpha: false },
            Rgb48Le => FormatDescriptor { depth_bits: 48, component_count: 3, chroma_log2_w: 0, chroma_log2_h: 0, is_planar: false, is_packed: true, family: Rgb, endian_big: false, has_alpha: false },
            Rgb48Be => FormatDescriptor { depth_bits: 48, component_count: 3, chroma_log2_w: 0, chroma_log2_h: 0, is_planar: false, is_packed: true, family: Rgb, endian_big: true, has_alpha: false },
            Pal8 | Rgb8Pal | Bgr8Pal => FormatDescriptor { depth_bits: 8, component_count: 1, chroma_log2_w: 0, chroma_log2_h: 0, is_planar: false, is_packed: false, family: Pal, endian_big: false, has_alpha: false },
            Rgb4Pal | Bgr4Pal => FormatDescriptor { depth_bits: 4, component_count: 1, chroma_log2_w: 0, chroma_log2_h: 0, is_planar: false, is_packed: false, family: Pal, endian_big: false, has_alpha: false },
            Gray8 => FormatDescriptor { depth_bits: 8, component_count: 1, chroma_log2_w: 0, chroma_log2_h: 0, is_planar: true, is_packed: false, family: Gray, endian_big: false, has_alpha: false },
            Gray16Le => FormatDescriptor { depth_bits: 16, component_count: 1, chroma_log2_w: 0, chroma_log2_h: 0, is_planar: true, is_packed: false, family: Gray, endian_big: false, has_alpha: false },
            Gray16Be => FormatDescriptor { depth_bits: 16, component_count: 1, chroma_log2_w: 0, chroma_log2_h: 0, is_planar: true, is_packed: false, family: Gray, endian_big: true, has_alpha: false },
            MonoWhite | MonoBlack => FormatDescriptor { depth_bits: 1, component_count: 1, chroma_log2_w: 0, chroma_log2_h: 0, is_planar: false, is_packed: true, family: Mono, endian_big: false, has_alpha: false },
        }
    }

    #[inline]
    pub fn is_yuv(self) -> bool {
        matches!(self.descriptor().family, Family::Yuv)
    }

    #[inline]
    pub fn is_gray(self) -> bool {
        matches!(self.descriptor().family, Family::Gray)
    }

    #[inline]
    pub fn is_rgb_family(self) -> bool {
        matches!(self.descriptor().family, Family::Rgb | Family::Bgr)
    }

    #[inline]
    pub fn is_palettized(self) -> bool {
        matches!(self.descriptor().family, Family::Pal)
    }

    /// Ceiling-divided chroma dimension: `-((-dim) >> subsample)`.
    #[inline]
    pub fn chroma_dim(dim: u32, log2_subsample: u8) -> u32 {
        let dim = dim as i64;
        (-((-dim) >> log2_subsample)) as u32
    }

    /// Normalizes a JPEG-range planar tag (`YUVJ*`) to its non-JPEG
    /// equivalent, returning whether the format was JPEG-range (the caller
    /// should then treat the corresponding side's range as full-range).
    pub fn normalize_jpeg_range(self) -> (PixelFormat, bool) {
        use PixelFormat::*;
        match self {
            YuvJ420P => (Yuv420P, true),
            YuvJ422P => (Yuv422P, true),
            YuvJ444P => (Yuv444P, true),
            YuvJ440P => (Yuv440P, true),
            other => (other, false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chroma_dim_ceil_division() {
        assert_eq!(PixelFormat::chroma_dim(8, 1), 4);
        assert_eq!(PixelFormat::chroma_dim(9, 1), 5);
        assert_eq!(PixelFormat::chroma_dim(1, 1), 1);
    }

    #[test]
    fn jpeg_range_normalizes() {
        let (fmt, was_jpeg) = PixelFormat::YuvJ420P.normalize_jpeg_range();
        assert_eq!(fmt, PixelFormat::Yuv420P);
        assert!(was_jpeg);

        let (fmt, was_jpeg) = PixelFormat::Yuv420P.normalize_jpeg_range();
        assert_eq!(fmt, PixelFormat::Yuv420P);
        assert!(!was_jpeg);
    }

    #[test]
    fn descriptor_family_matches_expectations() {
        assert!(PixelFormat::Yuv420P.is_yuv());
        assert!(PixelFormat::Gray8.is_gray());
        assert!(PixelFormat::Rgb24.is_rgb_family());
        assert!(PixelFormat::Pal8.is_palettized());
    }
}
