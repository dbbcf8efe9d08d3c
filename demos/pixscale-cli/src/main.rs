//! Command-line demo driver for `pixscale`: reads one raw frame from disk
//! (planes concatenated in Y/U/V/A order, tightly packed — no stride padding),
//! builds a [`pixscale::Context`] for the requested geometry/format change,
//! scales the whole frame in a single slice, and writes the result back out
//! the same way. Exercises the library end to end; not a format prober.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context as _, Result};
use clap::Parser;

use pixscale::dispatch::{row_shape, RowShape};
use pixscale::{Context, KernelKind, PixelFormat, ScaleFlags};

#[derive(Parser, Debug)]
#[command(name = "pixscale-cli")]
#[command(about = "Scale or reformat a raw planar/packed YUV/RGB frame")]
struct Args {
    /// Input raw frame file (planes concatenated, no padding).
    input: PathBuf,
    /// Output raw frame file.
    output: PathBuf,

    #[arg(long, value_enum)]
    src_format: CliFormat,
    #[arg(long, value_enum)]
    dst_format: CliFormat,

    #[arg(long)]
    src_width: u32,
    #[arg(long)]
    src_height: u32,
    #[arg(long)]
    dst_width: u32,
    #[arg(long)]
    dst_height: u32,

    #[arg(long, value_enum, default_value = "bilinear")]
    kernel: KernelKind,

    /// 256-entry RGBA palette file, required for Pal8/Rgb4Pal/Bgr4Pal sources.
    #[arg(long)]
    palette: Option<PathBuf>,
}

/// CLI-facing mirror of [`PixelFormat`]: `clap::ValueEnum` can't be derived
/// on the library's enum without pulling `clap` into the library's public
/// surface for variants the library itself never parses from a string, so
/// this demo keeps its own small parse table instead.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliFormat {
    Yuv420p,
    Yuv422p,
    Yuv444p,
    Nv12,
    Yuyv422,
    Rgb24,
    Bgr24,
    Gray8,
    Pal8,
}

impl From<CliFormat> for PixelFormat {
    fn from(f: CliFormat) -> PixelFormat {
        match f {
            CliFormat::Yuv420p => PixelFormat::Yuv420P,
            CliFormat::Yuv422p => PixelFormat::Yuv422P,
            CliFormat::Yuv444p => PixelFormat::Yuv444P,
            CliFormat::Nv12 => PixelFormat::Nv12,
            CliFormat::Yuyv422 => PixelFormat::Yuyv422,
            CliFormat::Rgb24 => PixelFormat::Rgb24,
            CliFormat::Bgr24 => PixelFormat::Bgr24,
            CliFormat::Gray8 => PixelFormat::Gray8,
            CliFormat::Pal8 => PixelFormat::Pal8,
        }
    }
}

/// `(stride_bytes, rows)` for each plane of `fmt` at `w x h`, in plane order
/// (Y/U/V/A for planar and semi-planar layouts, a single entry for packed
/// ones).
fn plane_layout(fmt: PixelFormat, w: u32, h: u32) -> Vec<(usize, usize)> {
    let desc = fmt.descriptor();
    let bytes_per_sample = if desc.depth_bits <= 8 { 1 } else { 2 };
    let cw = PixelFormat::chroma_dim(w, desc.chroma_log2_w) as usize;
    let ch = PixelFormat::chroma_dim(h, desc.chroma_log2_h) as usize;

    match row_shape(fmt) {
        RowShape::Planar => {
            let mut planes = vec![(w as usize * bytes_per_sample, h as usize)];
            if desc.component_count >= 3 {
                planes.push((cw * bytes_per_sample, ch));
                planes.push((cw * bytes_per_sample, ch));
            }
            if desc.has_alpha && desc.component_count == 4 {
                planes.push((w as usize * bytes_per_sample, h as usize));
            }
            planes
        }
        RowShape::Nv { .. } => vec![(w as usize, h as usize), (cw * 2, ch)],
        RowShape::Yuyv422 | RowShape::Uyvy422 => vec![(w as usize * 2, h as usize)],
        RowShape::Rgb(layout) => vec![(w as usize * layout.word_bytes, h as usize)],
        RowShape::Pal8 => vec![(w as usize, h as usize)],
        RowShape::Pal4 => vec![(w.div_ceil(2) as usize, h as usize)],
        RowShape::Mono { .. } => vec![((w as usize).div_ceil(8), h as usize)],
    }
}

fn split_planes<'a>(buf: &'a [u8], layout: &[(usize, usize)]) -> Vec<&'a [u8]> {
    let mut out = Vec::with_capacity(layout.len());
    let mut off = 0;
    for &(stride, rows) in layout {
        let len = stride * rows;
        out.push(&buf[off..off + len]);
        off += len;
    }
    out
}

fn split_planes_mut(buf: &mut [u8], layout: &[(usize, usize)]) -> Vec<&mut [u8]> {
    let mut out = Vec::with_capacity(layout.len());
    let mut rest = buf;
    for &(stride, rows) in layout {
        let len = stride * rows;
        let (head, tail) = rest.split_at_mut(len);
        out.push(head);
        rest = tail;
    }
    out
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let src_fmt: PixelFormat = args.src_format.into();
    let dst_fmt: PixelFormat = args.dst_format.into();

    let src_layout = plane_layout(src_fmt, args.src_width, args.src_height);
    let dst_layout = plane_layout(dst_fmt, args.dst_width, args.dst_height);

    let src_strides: Vec<usize> = src_layout.iter().map(|&(s, _)| s).collect();
    let dst_strides: Vec<usize> = dst_layout.iter().map(|&(s, _)| s).collect();

    let src_buf = fs::read(&args.input)
        .with_context(|| format!("reading input frame {:?}", args.input))?;
    let expected: usize = src_layout.iter().map(|&(s, r)| s * r).sum();
    if src_buf.len() != expected {
        bail!(
            "input file is {} bytes, expected {} for {:?} at {}x{}",
            src_buf.len(),
            expected,
            src_fmt,
            args.src_width,
            args.src_height
        );
    }

    let mut ctx = Context::new(
        args.src_width,
        args.src_height,
        src_fmt,
        args.dst_width,
        args.dst_height,
        dst_fmt,
        args.kernel,
        ScaleFlags::NONE,
    )
    .context("building scaler context")?;

    if src_fmt.is_palettized() {
        let palette_path = args
            .palette
            .context("--palette is required for a palettized source format")?;
        let raw = fs::read(&palette_path)
            .with_context(|| format!("reading palette {:?}", palette_path))?;
        if raw.len() != 256 * 4 {
            bail!("palette file must be exactly 1024 bytes (256 RGBA entries)");
        }
        let mut palette = [[0u8; 4]; 256];
        for (i, entry) in palette.iter_mut().enumerate() {
            entry.copy_from_slice(&raw[i * 4..i * 4 + 4]);
        }
        ctx.set_palette(palette);
    }

    let src_planes = split_planes(&src_buf, &src_layout);
    let dst_total: usize = dst_layout.iter().map(|&(s, r)| s * r).sum();
    let mut dst_buf = vec![0u8; dst_total];
    let rows_written = {
        let mut dst_planes = split_planes_mut(&mut dst_buf, &dst_layout);
        ctx.scale(
            &src_planes,
            &src_strides,
            0,
            args.src_height,
            false,
            &mut dst_planes,
            &dst_strides,
        )
        .context("scaling frame")?
    };

    if rows_written != args.dst_height as usize {
        bail!(
            "scaler produced {} of {} expected destination rows from a single full-height slice",
            rows_written,
            args.dst_height
        );
    }

    fs::write(&args.output, &dst_buf)
        .with_context(|| format!("writing output frame {:?}", args.output))?;
    log::info!(
        "scaled {:?} {}x{} -> {:?} {}x{} ({} bytes written)",
        src_fmt,
        args.src_width,
        args.src_height,
        dst_fmt,
        args.dst_width,
        args.dst_height,
        dst_buf.len()
    );
    Ok(())
}
