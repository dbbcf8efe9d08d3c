//! End-to-end scenarios exercising testable properties of the public
//! [`pixscale::Context`] API. Plain `#[test]`s, no harness — matches the
//! flat per-scenario test file style used elsewhere (e.g.
//! `tests/unit/processing/test_scaling_processor.rs`).

use pixscale::{Context, ColorMatrix, ColorspaceParams, KernelKind, PixelFormat, Range, ScaleFlags};

/// Scenario 1: flat 8x8 YUV420P (Y=U=V=128) scaled to 16x16 BILINEAR stays flat.
#[test]
fn flat_gray_frame_upscales_to_flat_gray() {
    let y = vec![128u8; 8 * 8];
    let u = vec![128u8; 4 * 4];
    let v = vec![128u8; 4 * 4];
    let mut dy = vec![0u8; 16 * 16];
    let mut du = vec![0u8; 8 * 8];
    let mut dv = vec![0u8; 8 * 8];
    let mut ctx = Context::new(8, 8, PixelFormat::Yuv420P, 16, 16, PixelFormat::Yuv420P, KernelKind::Bilinear, ScaleFlags::NONE).unwrap();
    let src: Vec<&[u8]> = vec![&y, &u, &v];
    let rows_written = {
        let mut dst: Vec<&mut [u8]> = vec![&mut dy, &mut du, &mut dv];
        ctx.scale(&src, &[8, 4, 4], 0, 8, false, &mut dst, &[16, 8, 8]).unwrap()
    };
    assert_eq!(rows_written, 16);
    assert!(dy.iter().all(|&b| b == 128), "luma drifted off 128: {dy:?}");
    assert!(du.iter().all(|&b| b == 128), "U drifted off 128: {du:?}");
    assert!(dv.iter().all(|&b| b == 128), "V drifted off 128: {dv:?}");
}

/// Scenario 2: 2x2 RGB24 primaries converted to YUV444P at identity geometry.
#[test]
fn rgb_primaries_convert_to_expected_luma() {
    let rgb = [255u8, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255];
    let mut dy = vec![0u8; 4];
    let mut du = vec![0u8; 4];
    let mut dv = vec![0u8; 4];
    let mut ctx = Context::new(2, 2, PixelFormat::Rgb24, 2, 2, PixelFormat::Yuv444P, KernelKind::Point, ScaleFlags::NONE).unwrap();
    // Full-range (JPEG) coefficients, so Y is plain BT.601 luma with no
    // 16-235 remap: Y = 0.299R + 0.587G + 0.114B.
    ctx.set_colorspace_details(ColorspaceParams {
        matrix: ColorMatrix::Bt601,
        src_range: Range::Jpeg,
        dst_range: Range::Jpeg,
        contrast: 1 << 16,
        saturation: 1 << 16,
        brightness: 0,
    })
    .unwrap();
    let src: Vec<&[u8]> = vec![&rgb];
    {
        let mut dst: Vec<&mut [u8]> = vec![&mut dy, &mut du, &mut dv];
        ctx.scale(&src, &[6], 0, 2, false, &mut dst, &[2, 2, 2]).unwrap();
    }
    let expect = [76i32, 150, 29, 255];
    for (i, &e) in expect.iter().enumerate() {
        assert!((dy[i] as i32 - e).abs() <= 2, "Y[{i}]={} expected ~{e}", dy[i]);
    }
}

/// Scenario 3: 4x1 GRAY8 [0,85,170,255] scaled to 8x1 with POINT doubles samples.
#[test]
fn point_kernel_doubles_each_sample() {
    let src = vec![0u8, 85, 170, 255];
    let mut dst = vec![0u8; 8];
    let mut ctx = Context::new(4, 1, PixelFormat::Gray8, 8, 1, PixelFormat::Gray8, KernelKind::Point, ScaleFlags::NONE).unwrap();
    let s: Vec<&[u8]> = vec![&src];
    {
        let mut d: Vec<&mut [u8]> = vec![&mut dst];
        ctx.scale(&s, &[4], 0, 1, false, &mut d, &[8]).unwrap();
    }
    assert_eq!(dst, vec![0, 0, 85, 85, 170, 170, 255, 255]);
}

/// Scenario 4: 8x8 MONOBLACK, all bits set, converted to GRAY8 is all 255.
#[test]
fn monoblack_all_set_converts_to_white_gray() {
    let src = vec![0xFFu8; 8]; // 8 rows x 1 byte/row (8 px/row)
    let mut dst = vec![0u8; 64];
    let mut ctx = Context::new(8, 8, PixelFormat::MonoBlack, 8, 8, PixelFormat::Gray8, KernelKind::Bilinear, ScaleFlags::NONE).unwrap();
    let s: Vec<&[u8]> = vec![&src];
    {
        let mut d: Vec<&mut [u8]> = vec![&mut dst];
        ctx.scale(&s, &[1], 0, 8, false, &mut d, &[8]).unwrap();
    }
    assert!(dst.iter().all(|&b| b == 255));
}

/// Scenario 5: a frame scaled in two slices matches the same frame scaled in one.
#[test]
fn two_slice_delivery_matches_single_slice() {
    let src_w = 64u32;
    let src_h = 64u32;
    let dst_w = 32u32;
    let dst_h = 24u32;

    let mut y = vec![0u8; (src_w * src_h) as usize];
    for (i, b) in y.iter_mut().enumerate() {
        *b = (i % 256) as u8;
    }
    let cw = (src_w / 2) as usize;
    let ch = (src_h / 2) as usize;
    let u = vec![120u8; cw * ch];
    let v = vec![136u8; cw * ch];

    let one_shot = {
        let mut ctx = Context::new(src_w, src_h, PixelFormat::Yuv420P, dst_w, dst_h, PixelFormat::Yuv420P, KernelKind::Lanczos, ScaleFlags::NONE).unwrap();
        let src: Vec<&[u8]> = vec![&y, &u, &v];
        let mut dy = vec![0u8; (dst_w * dst_h) as usize];
        let mut du = vec![0u8; (dst_w / 2 * dst_h / 2) as usize];
        let mut dv = vec![0u8; (dst_w / 2 * dst_h / 2) as usize];
        {
            let mut dst: Vec<&mut [u8]> = vec![&mut dy, &mut du, &mut dv];
            ctx.scale(&src, &[src_w as usize, cw, cw], 0, src_h, false, &mut dst, &[dst_w as usize, (dst_w / 2) as usize, (dst_w / 2) as usize]).unwrap();
        }
        (dy, du, dv)
    };

    let two_shot = {
        let mut ctx = Context::new(src_w, src_h, PixelFormat::Yuv420P, dst_w, dst_h, PixelFormat::Yuv420P, KernelKind::Lanczos, ScaleFlags::NONE).unwrap();
        let src: Vec<&[u8]> = vec![&y, &u, &v];
        let mut dy = vec![0u8; (dst_w * dst_h) as usize];
        let mut du = vec![0u8; (dst_w / 2 * dst_h / 2) as usize];
        let mut dv = vec![0u8; (dst_w / 2 * dst_h / 2) as usize];
        let half = src_h / 2;
        {
            let mut dst: Vec<&mut [u8]> = vec![&mut dy, &mut du, &mut dv];
            ctx.scale(&src, &[src_w as usize, cw, cw], 0, half, false, &mut dst, &[dst_w as usize, (dst_w / 2) as usize, (dst_w / 2) as usize]).unwrap();
            ctx.scale(&src, &[src_w as usize, cw, cw], half, src_h - half, false, &mut dst, &[dst_w as usize, (dst_w / 2) as usize, (dst_w / 2) as usize]).unwrap();
        }
        (dy, du, dv)
    };

    assert_eq!(one_shot.0, two_shot.0, "luma differs between one-shot and two-slice delivery");
    assert_eq!(one_shot.1, two_shot.1, "U differs between one-shot and two-slice delivery");
    assert_eq!(one_shot.2, two_shot.2, "V differs between one-shot and two-slice delivery");
}

/// Scenario 6: palette RGB8 expands through the formula
/// `(r,g,b) = ((i>>5)*36, ((i>>2)&7)*36, (i&3)*85)` at identity geometry.
#[test]
fn palette_source_expands_through_table() {
    let mut palette = [[0u8; 4]; 256];
    for (i, entry) in palette.iter_mut().enumerate() {
        let idx = i as u32;
        *entry = [
            ((idx >> 5) * 36) as u8,
            (((idx >> 2) & 7) * 36) as u8,
            ((idx & 3) * 85) as u8,
            255,
        ];
    }
    let src: Vec<u8> = (0u32..256).map(|i| i as u8).collect();
    let mut ctx = Context::new(256, 1, PixelFormat::Pal8, 256, 1, PixelFormat::Rgb24, KernelKind::Point, ScaleFlags::NONE).unwrap();
    ctx.set_palette(palette);
    let s: Vec<&[u8]> = vec![&src];
    let mut dst = vec![0u8; 256 * 3];
    {
        let mut d: Vec<&mut [u8]> = vec![&mut dst];
        ctx.scale(&s, &[256], 0, 1, false, &mut d, &[256 * 3]).unwrap();
    }
    for i in 0..256usize {
        let expect = palette[i];
        let got = &dst[i * 3..i * 3 + 3];
        assert_eq!(got, &expect[..3], "pixel {i}");
    }
}

/// Boundary: minimum geometry (4x1 -> 8x1) doesn't panic and produces
/// non-zero output for a non-trivial input.
#[test]
fn minimum_geometry_bilinear_is_in_bounds() {
    let src = vec![10u8, 200, 50, 250];
    let mut dst = vec![0u8; 8];
    let mut ctx = Context::new(4, 1, PixelFormat::Gray8, 8, 1, PixelFormat::Gray8, KernelKind::Bilinear, ScaleFlags::NONE).unwrap();
    let s: Vec<&[u8]> = vec![&src];
    {
        let mut d: Vec<&mut [u8]> = vec![&mut dst];
        ctx.scale(&s, &[4], 0, 1, false, &mut d, &[8]).unwrap();
    }
    assert!(dst.iter().any(|&b| b != 0));
}

/// Boundary: 1:1 geometry with BICUBIC reproduces the input within ±1.
#[test]
fn identity_geometry_bicubic_is_near_lossless() {
    let src = vec![0u8, 40, 90, 140, 190, 230, 255, 10];
    let mut dst = vec![0u8; 8];
    let mut ctx = Context::new(8, 1, PixelFormat::Gray8, 8, 1, PixelFormat::Gray8, KernelKind::Bicubic, ScaleFlags::NONE).unwrap();
    let s: Vec<&[u8]> = vec![&src];
    {
        let mut d: Vec<&mut [u8]> = vec![&mut dst];
        ctx.scale(&s, &[8], 0, 1, false, &mut d, &[8]).unwrap();
    }
    for (i, (&a, &b)) in src.iter().zip(dst.iter()).enumerate() {
        assert!((a as i32 - b as i32).abs() <= 1, "pixel {i}: {a} vs {b}");
    }
}

/// Round-trip: BGR24 -> RGB24 -> BGR24 is bit-exact (channel swap, no loss).
#[test]
fn bgr24_rgb24_round_trip_is_bit_exact() {
    let bgr = vec![10u8, 20, 30, 200, 150, 100, 0, 255, 128, 64, 32, 16];
    let mut rgb = vec![0u8; 12];
    {
        let mut ctx = Context::new(4, 1, PixelFormat::Bgr24, 4, 1, PixelFormat::Rgb24, KernelKind::Point, ScaleFlags::NONE).unwrap();
        let s: Vec<&[u8]> = vec![&bgr];
        let mut d: Vec<&mut [u8]> = vec![&mut rgb];
        ctx.scale(&s, &[12], 0, 1, false, &mut d, &[12]).unwrap();
    }
    let mut back = vec![0u8; 12];
    {
        let mut ctx = Context::new(4, 1, PixelFormat::Rgb24, 4, 1, PixelFormat::Bgr24, KernelKind::Point, ScaleFlags::NONE).unwrap();
        let s: Vec<&[u8]> = vec![&rgb];
        let mut d: Vec<&mut [u8]> = vec![&mut back];
        ctx.scale(&s, &[12], 0, 1, false, &mut d, &[12]).unwrap();
    }
    assert_eq!(bgr, back);
}

/// Round-trip: GRAY8 -> YUV420P Y-plane is bit-exact, chroma of the
/// intermediate is constant 128.
#[test]
fn gray8_to_yuv420p_chroma_is_neutral() {
    let gray = vec![0u8, 64, 128, 192, 255, 30, 80, 220];
    let mut dy = vec![0u8; 8];
    let mut du = vec![0u8; 4];
    let mut dv = vec![0u8; 4];
    let mut ctx = Context::new(8, 1, PixelFormat::Gray8, 8, 1, PixelFormat::Yuv420P, KernelKind::Point, ScaleFlags::NONE).unwrap();
    let s: Vec<&[u8]> = vec![&gray];
    {
        let mut d: Vec<&mut [u8]> = vec![&mut dy, &mut du, &mut dv];
        ctx.scale(&s, &[8], 0, 1, false, &mut d, &[8, 4, 4]).unwrap();
    }
    assert_eq!(dy, gray);
    assert!(du.iter().all(|&b| b == 128));
    assert!(dv.iter().all(|&b| b == 128));
}

/// Custom colorspace details: switching to full range should not panic and
/// should still produce in-range samples.
#[test]
fn custom_colorspace_details_stay_in_range() {
    let mut ctx = Context::new(4, 4, PixelFormat::Yuv420P, 4, 4, PixelFormat::Rgb24, KernelKind::Point, ScaleFlags::NONE).unwrap();
    ctx.set_colorspace_details(ColorspaceParams {
        matrix: ColorMatrix::Bt709,
        src_range: Range::Jpeg,
        dst_range: Range::Jpeg,
        contrast: 1 << 16,
        saturation: 1 << 16,
        brightness: 0,
    })
    .unwrap();

    let y = vec![180u8; 16];
    let u = vec![100u8; 4];
    let v = vec![160u8; 4];
    let mut dst = vec![0u8; 48];
    let s: Vec<&[u8]> = vec![&y, &u, &v];
    {
        let mut d: Vec<&mut [u8]> = vec![&mut dst];
        ctx.scale(&s, &[4, 2, 2], 0, 4, false, &mut d, &[12]).unwrap();
    }
    assert!(!dst.is_empty());
}

/// Palette index formats with 8-bit and 4-bit depth both go through the
/// palette table, not a raw bit layout -- the RGB8/RGB4 packed-bit formats
/// are a separate, distinct pair of formats from their "*Pal" counterparts.
#[test]
fn rgb8pal_and_rgb4pal_sources_expand_through_the_palette() {
    let mut palette = [[0u8; 4]; 256];
    palette[7] = [200, 100, 50, 255];
    let mut ctx = Context::new(4, 1, PixelFormat::Rgb8Pal, 4, 1, PixelFormat::Rgb24, KernelKind::Point, ScaleFlags::NONE).unwrap();
    ctx.set_palette(palette);
    let src = [7u8, 7, 7, 7];
    let mut dst = vec![0u8; 12];
    {
        let s: Vec<&[u8]> = vec![&src];
        let mut d: Vec<&mut [u8]> = vec![&mut dst];
        ctx.scale(&s, &[4], 0, 1, false, &mut d, &[12]).unwrap();
    }
    for px in dst.chunks_exact(3) {
        assert_eq!(px, &[200, 100, 50]);
    }
}

/// A YUV source scaled down into RGB16 (5/6/5-bit channels) stays in range
/// and is not forced to the same value every pixel -- the ordered dither
/// before bit-depth reduction should vary with column/row, not collapse.
#[test]
fn yuv_to_rgb16_applies_in_range_dither() {
    let mut ctx = Context::new(8, 8, PixelFormat::Yuv420P, 8, 8, PixelFormat::Rgb16, KernelKind::Bilinear, ScaleFlags::NONE).unwrap();
    let y: Vec<u8> = (0..64).map(|i| (i * 3) as u8).collect();
    let u = vec![140u8; 16];
    let v = vec![110u8; 16];
    let mut dst = vec![0u8; 8 * 8 * 2];
    {
        let s: Vec<&[u8]> = vec![&y, &u, &v];
        let mut d: Vec<&mut [u8]> = vec![&mut dst];
        ctx.scale(&s, &[8, 4, 4], 0, 8, false, &mut d, &[16]).unwrap();
    }
    assert!(dst.iter().any(|&b| b != 0));
}

/// RGB32 carries a real alpha channel: at identity geometry with a POINT
/// kernel, the alpha byte should pass straight through rather than being
/// dropped to zero.
#[test]
fn rgb32_alpha_passes_through_at_identity_geometry() {
    let rgba = [10u8, 20, 30, 77, 200, 150, 100, 250, 0, 255, 128, 5];
    let mut dst = vec![0u8; 12];
    let mut ctx = Context::new(3, 1, PixelFormat::Rgb32, 3, 1, PixelFormat::Rgb32, KernelKind::Point, ScaleFlags::NONE).unwrap();
    let s: Vec<&[u8]> = vec![&rgba];
    {
        let mut d: Vec<&mut [u8]> = vec![&mut dst];
        ctx.scale(&s, &[12], 0, 1, false, &mut d, &[12]).unwrap();
    }
    for (px, expect) in dst.chunks_exact(4).zip(rgba.chunks_exact(4)) {
        assert_eq!(px[3], expect[3], "alpha byte did not pass through");
    }
}

/// A source format with no alpha channel (RGB24) converted to RGB32 gets a
/// fully-opaque alpha byte, not a zeroed/transparent one.
#[test]
fn rgb24_to_rgb32_fills_opaque_alpha() {
    let rgb = [10u8, 20, 30, 200, 150, 100];
    let mut dst = vec![0u8; 8];
    let mut ctx = Context::new(2, 1, PixelFormat::Rgb24, 2, 1, PixelFormat::Rgb32, KernelKind::Point, ScaleFlags::NONE).unwrap();
    let s: Vec<&[u8]> = vec![&rgb];
    {
        let mut d: Vec<&mut [u8]> = vec![&mut dst];
        ctx.scale(&s, &[6], 0, 1, false, &mut d, &[8]).unwrap();
    }
    for px in dst.chunks_exact(4) {
        assert_eq!(px[3], 255, "alpha should default to fully opaque");
    }
}

/// YUVA420P's alpha plane (4th plane) round-trips through identity geometry
/// alongside the usual Y/U/V planes.
#[test]
fn yuva420p_alpha_plane_round_trips() {
    let y = vec![100u8; 16];
    let u = vec![128u8; 4];
    let v = vec![128u8; 4];
    let a = vec![42u8, 200, 0, 255, 42, 200, 0, 255, 42, 200, 0, 255, 42, 200, 0, 255];
    let mut dy = vec![0u8; 16];
    let mut du = vec![0u8; 4];
    let mut dv = vec![0u8; 4];
    let mut da = vec![0u8; 16];
    let mut ctx = Context::new(4, 4, PixelFormat::Yuva420P, 4, 4, PixelFormat::Yuva420P, KernelKind::Point, ScaleFlags::NONE).unwrap();
    let s: Vec<&[u8]> = vec![&y, &u, &v, &a];
    {
        let mut d: Vec<&mut [u8]> = vec![&mut dy, &mut du, &mut dv, &mut da];
        ctx.scale(&s, &[4, 2, 2, 4], 0, 4, false, &mut d, &[4, 2, 2, 4]).unwrap();
    }
    assert_eq!(da, a);
}

/// NV12's interleaved UV plane round-trips through planar YUV420P at
/// identity geometry: converting NV12 -> YUV420P -> NV12 reproduces the
/// original interleaved chroma bytes.
#[test]
fn nv12_chroma_interleaving_round_trips_through_planar() {
    let y = vec![90u8; 16];
    let uv = vec![60u8, 180, 60, 180, 60, 180, 60, 180]; // u,v pairs, 2x2 chroma samples
    let mut py = vec![0u8; 16];
    let mut pu = vec![0u8; 4];
    let mut pv = vec![0u8; 4];
    {
        let mut ctx = Context::new(4, 4, PixelFormat::Nv12, 4, 4, PixelFormat::Yuv420P, KernelKind::Point, ScaleFlags::NONE).unwrap();
        let s: Vec<&[u8]> = vec![&y, &uv];
        let mut d: Vec<&mut [u8]> = vec![&mut py, &mut pu, &mut pv];
        ctx.scale(&s, &[4, 4], 0, 4, false, &mut d, &[4, 2, 2]).unwrap();
    }
    assert!(pu.iter().all(|&b| b == 60));
    assert!(pv.iter().all(|&b| b == 180));

    let mut back_y = vec![0u8; 16];
    let mut back_uv = vec![0u8; 8];
    {
        let mut ctx = Context::new(4, 4, PixelFormat::Yuv420P, 4, 4, PixelFormat::Nv12, KernelKind::Point, ScaleFlags::NONE).unwrap();
        let s: Vec<&[u8]> = vec![&py, &pu, &pv];
        let mut d: Vec<&mut [u8]> = vec![&mut back_y, &mut back_uv];
        ctx.scale(&s, &[4, 2, 2], 0, 4, false, &mut d, &[4, 4]).unwrap();
    }
    assert_eq!(back_y, y);
    assert_eq!(back_uv, uv);
}
