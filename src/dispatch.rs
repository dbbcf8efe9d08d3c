// SPDX-License-Identifier: MIT
//! # Format Dispatch Table
//!
//! Classifies a [`PixelFormat`] into the shape its row converter needs:
//! plain planar (handled directly by the driver using the format's own
//! [`FormatDescriptor`]), packed YUV, semi-planar YUV, packed RGB/BGR (as a
//! [`BitLayout`]), palettized, or monochrome. [`crate::scale`] matches on
//! these to pick which `rowconv` functions to call per row, instead of
//! re-deriving the same format-family checks in several places.

use crate::format::PixelFormat;
use crate::rowconv::BitLayout;

#[derive(Debug, Clone, Copy)]
pub enum RowShape {
    /// Separate Y/U/V (or single gray) planes, `depth_bits` 8 or 16.
    Planar,
    Yuyv422,
    Uyvy422,
    Nv { v_then_u: bool },
    Rgb(BitLayout),
    Pal8,
    Pal4,
    Mono { white_is_zero: bool },
}

pub fn row_shape(fmt: PixelFormat) -> RowShape {
    use PixelFormat::*;
    match fmt {
        Yuv410P | Yuv420P | Yuva420P | Yuv422P | Yuv440P | Yuv444P | Yuv420P16Le | Yuv420P16Be
        | Gray8 | Gray16Le | Gray16Be => RowShape::Planar,
        YuvJ420P | YuvJ422P | YuvJ444P | YuvJ440P => RowShape::Planar,
        Nv12 => RowShape::Nv { v_then_u: false },
        Nv21 => RowShape::Nv { v_then_u: true },
        Yuyv422 => RowShape::Yuyv422,
        Uyvy422 => RowShape::Uyvy422,
        Rgb15 => RowShape::Rgb(BitLayout::RGB15),
        Bgr15 => RowShape::Rgb(BitLayout::BGR15),
        Rgb16 => RowShape::Rgb(BitLayout::RGB16),
        Bgr16 => RowShape::Rgb(BitLayout::BGR16),
        Rgb24 => RowShape::Rgb(BitLayout::RGB24),
        Bgr24 => RowShape::Rgb(BitLayout::BGR24),
        Rgb32 => RowShape::Rgb(BitLayout::RGB32),
        Bgr32 => RowShape::Rgb(BitLayout::BGR32),
        Rgb32_1 => RowShape::Rgb(BitLayout::RGB32_1),
        Bgr32_1 => RowShape::Rgb(BitLayout::BGR32_1),
        Rgb4Byte => RowShape::Rgb(BitLayout::RGB4_BYTE),
        Bgr4Byte => RowShape::Rgb(BitLayout::BGR4_BYTE),
        Rgb48Le => RowShape::Rgb(BitLayout::RGB48LE),
        Rgb48Be => RowShape::Rgb(BitLayout::RGB48BE),
        // Palettized formats: the index width differs (8 vs 4 bit) but the
        // palette itself is always a 256-entry RGBA table regardless of the
        // nominal RGB/BGR channel order in the name -- that naming only
        // matters for formats that pack raw bits directly, not an index.
        Pal8 | Rgb8Pal | Bgr8Pal => RowShape::Pal8,
        Rgb4Pal | Bgr4Pal => RowShape::Pal4,
        MonoWhite => RowShape::Mono { white_is_zero: true },
        MonoBlack => RowShape::Mono { white_is_zero: false },
    }
}

/// Whether converting `src -> dst` at identical geometry can skip the
/// filter/ring-cache machinery entirely and go through a row-by-row
/// reformat instead.
pub fn is_unscaled(src_w: u32, src_h: u32, dst_w: u32, dst_h: u32) -> bool {
    src_w == dst_w && src_h == dst_h
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planar_formats_classify_as_planar() {
        assert!(matches!(row_shape(PixelFormat::Yuv420P), RowShape::Planar));
        assert!(matches!(row_shape(PixelFormat::Gray8), RowShape::Planar));
    }

    #[test]
    fn packed_rgb_formats_carry_a_layout() {
        assert!(matches!(row_shape(PixelFormat::Bgr24), RowShape::Rgb(_)));
    }

    #[test]
    fn palettized_rgb_formats_go_through_the_palette_not_a_bit_layout() {
        assert!(matches!(row_shape(PixelFormat::Rgb8Pal), RowShape::Pal8));
        assert!(matches!(row_shape(PixelFormat::Bgr8Pal), RowShape::Pal8));
        assert!(matches!(row_shape(PixelFormat::Rgb4Pal), RowShape::Pal4));
        assert!(matches!(row_shape(PixelFormat::Bgr4Pal), RowShape::Pal4));
        assert!(matches!(row_shape(PixelFormat::Rgb4Byte), RowShape::Rgb(_)));
    }

    #[test]
    fn unscaled_requires_both_dimensions_equal() {
        assert!(is_unscaled(100, 50, 100, 50));
        assert!(!is_unscaled(100, 50, 100, 51));
    }
}
