// SPDX-License-Identifier: MIT
//! # Slice-Driven Entry Point (T2)
//!
//! [`Context::scale`] is the one function callers actually drive a frame
//! through. It accepts an arbitrary vertical slice of the source image at a
//! time (a single call with the whole image is just the `src_slice_h ==
//! src_h` case) and, for each destination row in turn, ingests just the
//! source rows that row's vertical window needs before producing it — never
//! further ahead than that. The luma and chroma row caches are only as deep
//! as their respective vertical filter's tap count, so ingesting a whole
//! slice before emitting anything would let a tall slice overwrite rows an
//! earlier, not-yet-emitted output row still has to read; interleaving
//! ingestion with emission one output row at a time keeps each ring exactly
//! as full as the row currently being produced needs. Luma/alpha and chroma
//! are scheduled independently (`next_luma_ingest_row` /
//! `next_chroma_ingest_row`) since they advance at different cadences
//! whenever the source or destination subsamples chroma.
//!
//! Unlike the original's raw-pointer-plus-signed-stride API, slice order is
//! expressed here as an explicit `bottom_up: bool` rather than the sign of a
//! stride: Rust slices don't support negative strides safely, and the sign
//! trick exists in the original purely to let a bottom-up caller avoid a
//! buffer copy. Slices from a single frame still can't mix directions
//! mid-stream — that invariant is unchanged, only how direction is signaled.

use crate::colorspace::{rgb_to_yuv_pixel, RgbToYuvCoeffs};
use crate::context::Context;
use crate::dispatch::{row_shape, RowShape};
use crate::error::{Error, Result};
use crate::filter::FilterBank;
use crate::format::{FormatDescriptor, PixelFormat};
use crate::hscale::scale_row;
use crate::rowconv::{
    pack_mono_row, pack_nv_chroma_row, pack_rgb_row, pack_u8_row, pack_u16be_row, pack_u16le_row, pack_uyvy_row,
    pack_yuyv_row, unpack_mono_row, unpack_nv_chroma_row, unpack_pal4_row, unpack_pal8_row, unpack_rgb_row,
    unpack_u16be_row, unpack_u16le_row, unpack_u8_row, unpack_uyvy_row, unpack_yuyv_row,
};
use crate::vscale::{apply_dither, combine_to_u8_sample, pack_rgb_plane_row};

#[inline]
fn row_slice<'a>(plane: &'a [u8], stride: usize, row: usize, len: usize) -> &'a [u8] {
    &plane[row * stride..row * stride + len]
}

#[inline]
fn row_slice_mut<'a>(plane: &'a mut [u8], stride: usize, row: usize, len: usize) -> &'a mut [u8] {
    &mut plane[row * stride..row * stride + len]
}

fn combine_full(bank: &FilterBank, out_i: usize, rows: &[&[i16]], width: usize) -> Vec<i32> {
    (0..width).map(|x| combine_to_u8_sample(bank, out_i, rows, x)).collect()
}

/// Runs combined, same-resolution-as-caches R/G/B samples through the
/// forward colorspace matrix. `r_full` is luma-resolution (as produced by
/// the luma cache, reused as the R channel for RGB sources); `g`/`b` are at
/// whatever chroma resolution the destination format calls for (reused
/// chroma caches, per [`crate::dispatch`]'s RGB-source-channel-reuse
/// design). Luma is computed from a nearest-neighbor upsample of G/B back to
/// full width; chroma is computed from a point-downsample of R — an
/// approximation (not a true per-pixel RGB->YUV conversion) when the
/// destination subsamples chroma, traded for not needing a second full-width
/// G/B cache.
fn rgb_to_yuv_planes(
    coeffs: &RgbToYuvCoeffs,
    r_full: &[i32],
    g: &[i32],
    b: &[i32],
    chroma_log2_w: u8,
) -> (Vec<i32>, Vec<i32>, Vec<i32>) {
    let dst_w = r_full.len();
    let chroma_w = g.len();
    let mut y = vec![0i32; dst_w];
    for (x, slot) in y.iter_mut().enumerate() {
        let gx = (x >> chroma_log2_w).min(chroma_w - 1);
        let (yy, _, _) = rgb_to_yuv_pixel(r_full[x], g[gx], b[gx], coeffs);
        *slot = yy as i32;
    }
    let mut u = vec![0i32; chroma_w];
    let mut v = vec![0i32; chroma_w];
    for cx in 0..chroma_w {
        let rx = (cx << chroma_log2_w).min(dst_w - 1);
        let (_, uu, vv) = rgb_to_yuv_pixel(r_full[rx], g[cx], b[cx], coeffs);
        u[cx] = uu as i32;
        v[cx] = vv as i32;
    }
    (y, u, v)
}

fn write_planar_channel(vals: &[i32], plane: &mut [u8], stride: usize, row: usize, depth_bits: u8, big_endian: bool) {
    let mid: Vec<i16> = vals.iter().map(|&v| (v.clamp(0, 255) as i16) << 7).collect();
    if depth_bits <= 8 {
        let row = row_slice_mut(plane, stride, row, vals.len());
        pack_u8_row(&mid, row);
    } else {
        let row = row_slice_mut(plane, stride, row, vals.len() * 2);
        if big_endian {
            pack_u16be_row(&mid, row);
        } else {
            pack_u16le_row(&mid, row);
        }
    }
}

impl Context {
    /// Feeds `src_slice_h` new rows of the source image, starting at
    /// `src_slice_y`, into the scaler, and writes every destination row that
    /// is now fully determined into `dst`. Returns the number of
    /// destination rows written this call.
    ///
    /// `src`/`dst` are full plane buffers (not pre-offset to the slice); up
    /// to 4 planes each (Y/U/V/A, or a single packed plane 0 for packed
    /// formats). `src_stride`/`dst_stride` are row pitches in bytes.
    pub fn scale(
        &mut self,
        src: &[&[u8]],
        src_stride: &[usize],
        src_slice_y: u32,
        src_slice_h: u32,
        bottom_up: bool,
        dst: &mut [&mut [u8]],
        dst_stride: &[usize],
    ) -> Result<usize> {
        if src_slice_h == 0 {
            return Err(Error::InvalidGeometry("zero-height slice".into()));
        }

        match self.slice_dir {
            None => self.slice_dir = Some(bottom_up),
            Some(dir) if dir != bottom_up => return Err(Error::SliceMisordered),
            Some(_) => {}
        }

        if !bottom_up {
            if src_slice_y as i64 != self.next_src_row {
                return Err(Error::SliceMisordered);
            }
        } else {
            let slice_bottom = src_slice_y as i64 + src_slice_h as i64 - 1;
            let expected = self.src_h as i64 - 1 - self.next_src_row;
            if slice_bottom != expected {
                return Err(Error::SliceMisordered);
            }
        }

        let src_desc = self.src_fmt.descriptor();
        let shape = row_shape(self.src_fmt);
        let is_rgb_source = self.src_fmt.is_rgb_family() || self.src_fmt.is_palettized();
        let single_channel = src_desc.component_count == 1 && !self.src_fmt.is_palettized();

        self.next_src_row += src_slice_h as i64;

        // Contiguous-from-row-0 bound on what's actually readable from `src`
        // right now. Top-down delivery is contiguous from row 0 by
        // construction (the order check above enforces it); bottom-up
        // delivery starts at the *bottom* of the image, so no row is
        // contiguously available from 0 until the whole frame has arrived.
        let available_last: i64 = if bottom_up {
            if self.next_src_row >= self.src_h as i64 { self.src_h as i64 - 1 } else { -1 }
        } else {
            self.next_src_row - 1
        };

        let dst_desc = self.dst_fmt.descriptor();
        let dst_shape = row_shape(self.dst_fmt);
        let dst_is_rgb = self.dst_fmt.is_rgb_family();

        let mut rows_written = 0usize;
        while (self.next_dst_row as usize) < self.dst_h as usize {
            let dy = self.next_dst_row as usize;

            let v_luma = &self.filters.v_luma;
            let need_luma = v_luma.offset[dy] as i64 + v_luma.taps as i64 - 1;

            let need_chroma = if single_channel {
                None
            } else {
                let cdy = dy >> dst_desc.chroma_log2_h;
                let v_chroma = &self.filters.v_chroma;
                Some(v_chroma.offset[cdy] as i64 + v_chroma.taps as i64 - 1)
            };
            let need_chroma_src = need_chroma.map(|last| last << src_desc.chroma_log2_h);

            let overall_need = need_chroma_src.map_or(need_luma, |c| need_luma.max(c));
            if overall_need > available_last {
                // This output row's window reaches beyond what's been
                // delivered so far; defer it (and everything after it,
                // since offsets are monotonic) to a later slice.
                break;
            }

            while self.next_luma_ingest_row <= need_luma {
                let sy = self.next_luma_ingest_row as u32;
                self.ingest_luma_row(sy, src, src_stride, shape, src_desc)?;
                self.next_luma_ingest_row += 1;
            }
            if let Some(chroma_last) = need_chroma {
                while self.next_chroma_ingest_row <= chroma_last {
                    let idx = self.next_chroma_ingest_row as u32;
                    self.ingest_chroma_row(idx, src, src_stride, shape, src_desc)?;
                    self.next_chroma_ingest_row += 1;
                }
            }

            self.emit_dst_row(dy, dst, dst_stride, dst_shape, dst_desc, single_channel, is_rgb_source, dst_is_rgb)?;
            self.next_dst_row += 1;
            rows_written += 1;
        }

        if self.next_src_row >= self.src_h as i64 {
            self.slice_dir = None;
            self.next_src_row = 0;
            self.next_dst_row = 0;
            self.next_luma_ingest_row = 0;
            self.next_chroma_ingest_row = 0;
            self.last_chroma_row = None;
        }

        Ok(rows_written)
    }

    /// Unpacks and horizontally scales source row `sy`'s luma (and alpha,
    /// where present) data into the luma/alpha rings. For packed row shapes
    /// that carry chroma in the same bytes as luma (`Yuyv422`/`Uyvy422`/
    /// `Rgb`/`Pal8`/`Pal4`), the row is unpacked here too but only the
    /// luma/alpha channels are kept — [`Context::ingest_chroma_row`]
    /// independently re-unpacks the same row for its chroma channels,
    /// since luma and chroma ingestion can run ahead of each other at
    /// different paces when their vertical filters disagree on cadence.
    fn ingest_luma_row(
        &mut self,
        sy: u32,
        src: &[&[u8]],
        src_stride: &[usize],
        shape: RowShape,
        src_desc: FormatDescriptor,
    ) -> Result<()> {
        let sy = sy as usize;
        let src_w = self.src_w as usize;

        match shape {
            RowShape::Planar => {
                let bytes = if src_desc.depth_bits <= 8 { 1 } else { 2 };
                let row = row_slice(src[0], src_stride[0], sy, src_w * bytes);
                let mut mid = vec![0i16; src_w];
                unpack_plane(row, &mut mid, src_desc);
                let mut out = vec![0i16; self.dst_w as usize];
                scale_row(&self.filters.h_luma, &mid, &mut out);
                self.luma_cache.row_mut(sy as i64).as_mut_slice().copy_from_slice(&out);

                if src_desc.component_count == 4 {
                    let arow = row_slice(src[3], src_stride[3], sy, src_w * bytes);
                    let mut amid = vec![0i16; src_w];
                    unpack_plane(arow, &mut amid, src_desc);
                    self.scale_and_store_alpha(sy, &amid);
                }
                Ok(())
            }
            RowShape::Yuyv422 | RowShape::Uyvy422 => {
                let row = row_slice(src[0], src_stride[0], sy, src_w * 2);
                let mut ymid = vec![0i16; src_w];
                let mut umid = vec![0i16; src_w / 2];
                let mut vmid = vec![0i16; src_w / 2];
                if matches!(shape, RowShape::Yuyv422) {
                    unpack_yuyv_row(row, &mut ymid, &mut umid, &mut vmid);
                } else {
                    unpack_uyvy_row(row, &mut ymid, &mut umid, &mut vmid);
                }
                let mut out = vec![0i16; self.dst_w as usize];
                scale_row(&self.filters.h_luma, &ymid, &mut out);
                self.luma_cache.row_mut(sy as i64).as_mut_slice().copy_from_slice(&out);
                Ok(())
            }
            RowShape::Nv { .. } => {
                let row = row_slice(src[0], src_stride[0], sy, src_w);
                let mut mid = vec![0i16; src_w];
                unpack_u8_row(row, &mut mid);
                let mut out = vec![0i16; self.dst_w as usize];
                scale_row(&self.filters.h_luma, &mid, &mut out);
                self.luma_cache.row_mut(sy as i64).as_mut_slice().copy_from_slice(&out);
                Ok(())
            }
            RowShape::Rgb(layout) => {
                let row = row_slice(src[0], src_stride[0], sy, src_w * layout.word_bytes);
                let mut rmid = vec![0i16; src_w];
                let mut gmid = vec![0i16; src_w];
                let mut bmid = vec![0i16; src_w];
                let want_alpha = layout.a_shift.is_some() && self.alpha_cache.is_some();
                let mut amid = vec![0i16; src_w];
                unpack_rgb_row(layout, row, &mut rmid, &mut gmid, &mut bmid, if want_alpha { Some(&mut amid) } else { None });
                let mut out = vec![0i16; self.dst_w as usize];
                scale_row(&self.filters.h_luma, &rmid, &mut out);
                self.luma_cache.row_mut(sy as i64).as_mut_slice().copy_from_slice(&out);
                if want_alpha {
                    self.scale_and_store_alpha(sy, &amid);
                }
                Ok(())
            }
            RowShape::Pal8 => {
                let palette = self
                    .palette
                    .ok_or_else(|| Error::InvalidFlags("palettized source needs set_palette".into()))?;
                let row = row_slice(src[0], src_stride[0], sy, src_w);
                let (mut rmid, mut gmid, mut bmid, mut amid) =
                    (vec![0i16; src_w], vec![0i16; src_w], vec![0i16; src_w], vec![0i16; src_w]);
                unpack_pal8_row(row, &palette, &mut rmid, &mut gmid, &mut bmid, &mut amid);
                let mut out = vec![0i16; self.dst_w as usize];
                scale_row(&self.filters.h_luma, &rmid, &mut out);
                self.luma_cache.row_mut(sy as i64).as_mut_slice().copy_from_slice(&out);
                Ok(())
            }
            RowShape::Pal4 => {
                let palette16 = {
                    let p = self
                        .palette
                        .ok_or_else(|| Error::InvalidFlags("palettized source needs set_palette".into()))?;
                    let mut p16 = [[0u8; 4]; 16];
                    p16.copy_from_slice(&p[..16]);
                    p16
                };
                let row = row_slice(src[0], src_stride[0], sy, src_w.div_ceil(2));
                let (mut rmid, mut gmid, mut bmid, mut amid) =
                    (vec![0i16; src_w], vec![0i16; src_w], vec![0i16; src_w], vec![0i16; src_w]);
                unpack_pal4_row(row, src_w, &palette16, &mut rmid, &mut gmid, &mut bmid, &mut amid);
                let mut out = vec![0i16; self.dst_w as usize];
                scale_row(&self.filters.h_luma, &rmid, &mut out);
                self.luma_cache.row_mut(sy as i64).as_mut_slice().copy_from_slice(&out);
                Ok(())
            }
            RowShape::Mono { white_is_zero } => {
                let row = row_slice(src[0], src_stride[0], sy, src_w.div_ceil(8));
                let mut mid = vec![0i16; src_w];
                unpack_mono_row(row, &mut mid, white_is_zero);
                let mut out = vec![0i16; self.dst_w as usize];
                scale_row(&self.filters.h_luma, &mid, &mut out);
                self.luma_cache.row_mut(sy as i64).as_mut_slice().copy_from_slice(&out);
                Ok(())
            }
        }
    }

    /// Unpacks and horizontally scales chroma data into the chroma U/V
    /// rings, at chroma index `idx` (source chroma-plane row index for
    /// `Planar`/`Nv`; plain source row index for the unsubsampled packed
    /// shapes, where chroma lives one-per-row alongside luma). Never called
    /// for `Mono` (no chroma channel exists).
    fn ingest_chroma_row(
        &mut self,
        idx: u32,
        src: &[&[u8]],
        src_stride: &[usize],
        shape: RowShape,
        src_desc: FormatDescriptor,
    ) -> Result<()> {
        let idx = idx as usize;
        let src_w = self.src_w as usize;

        match shape {
            RowShape::Planar => {
                let bytes = if src_desc.depth_bits <= 8 { 1 } else { 2 };
                let cw = PixelFormat::chroma_dim(self.src_w, src_desc.chroma_log2_w) as usize;
                let urow = row_slice(src[1], src_stride[1], idx, cw * bytes);
                let vrow = row_slice(src[2], src_stride[2], idx, cw * bytes);
                let mut umid = vec![0i16; cw];
                let mut vmid = vec![0i16; cw];
                unpack_plane(urow, &mut umid, src_desc);
                unpack_plane(vrow, &mut vmid, src_desc);
                self.scale_and_store_chroma(idx, &umid, &vmid);
                Ok(())
            }
            RowShape::Nv { v_then_u } => {
                let cw = PixelFormat::chroma_dim(self.src_w, src_desc.chroma_log2_w) as usize;
                let crow = row_slice(src[1], src_stride[1], idx, cw * 2);
                let mut umid = vec![0i16; cw];
                let mut vmid = vec![0i16; cw];
                unpack_nv_chroma_row(crow, &mut umid, &mut vmid, v_then_u);
                self.scale_and_store_chroma(idx, &umid, &vmid);
                Ok(())
            }
            RowShape::Yuyv422 | RowShape::Uyvy422 => {
                let row = row_slice(src[0], src_stride[0], idx, src_w * 2);
                let mut ymid = vec![0i16; src_w];
                let mut umid = vec![0i16; src_w / 2];
                let mut vmid = vec![0i16; src_w / 2];
                if matches!(shape, RowShape::Yuyv422) {
                    unpack_yuyv_row(row, &mut ymid, &mut umid, &mut vmid);
                } else {
                    unpack_uyvy_row(row, &mut ymid, &mut umid, &mut vmid);
                }
                self.scale_and_store_chroma(idx, &umid, &vmid);
                Ok(())
            }
            RowShape::Rgb(layout) => {
                let row = row_slice(src[0], src_stride[0], idx, src_w * layout.word_bytes);
                let mut rmid = vec![0i16; src_w];
                let mut gmid = vec![0i16; src_w];
                let mut bmid = vec![0i16; src_w];
                unpack_rgb_row(layout, row, &mut rmid, &mut gmid, &mut bmid, None);
                self.scale_and_store_chroma(idx, &gmid, &bmid);
                Ok(())
            }
            RowShape::Pal8 => {
                let palette = self
                    .palette
                    .ok_or_else(|| Error::InvalidFlags("palettized source needs set_palette".into()))?;
                let row = row_slice(src[0], src_stride[0], idx, src_w);
                let (mut rmid, mut gmid, mut bmid, mut amid) =
                    (vec![0i16; src_w], vec![0i16; src_w], vec![0i16; src_w], vec![0i16; src_w]);
                unpack_pal8_row(row, &palette, &mut rmid, &mut gmid, &mut bmid, &mut amid);
                self.scale_and_store_chroma(idx, &gmid, &bmid);
                Ok(())
            }
            RowShape::Pal4 => {
                let palette16 = {
                    let p = self
                        .palette
                        .ok_or_else(|| Error::InvalidFlags("palettized source needs set_palette".into()))?;
                    let mut p16 = [[0u8; 4]; 16];
                    p16.copy_from_slice(&p[..16]);
                    p16
                };
                let row = row_slice(src[0], src_stride[0], idx, src_w.div_ceil(2));
                let (mut rmid, mut gmid, mut bmid, mut amid) =
                    (vec![0i16; src_w], vec![0i16; src_w], vec![0i16; src_w], vec![0i16; src_w]);
                unpack_pal4_row(row, src_w, &palette16, &mut rmid, &mut gmid, &mut bmid, &mut amid);
                self.scale_and_store_chroma(idx, &gmid, &bmid);
                Ok(())
            }
            RowShape::Mono { .. } => unreachable!("mono sources have no chroma channel"),
        }
    }

    fn scale_and_store_chroma(&mut self, cy: usize, umid: &[i16], vmid: &[i16]) {
        let mut uout = vec![0i16; self.chroma_u_cache.row_width()];
        let mut vout = vec![0i16; self.chroma_v_cache.row_width()];
        scale_row(&self.filters.h_chroma, umid, &mut uout);
        scale_row(&self.filters.h_chroma, vmid, &mut vout);
        self.chroma_u_cache.row_mut(cy as i64).as_mut_slice().copy_from_slice(&uout);
        self.chroma_v_cache.row_mut(cy as i64).as_mut_slice().copy_from_slice(&vout);
    }

    /// Alpha always rides at luma resolution (no subsampling), so this
    /// shares `h_luma`/`v_luma` with the luma plane rather than needing its
    /// own filter bank.
    fn scale_and_store_alpha(&mut self, sy: usize, amid: &[i16]) {
        let Some(cache) = self.alpha_cache.as_ref() else { return };
        let mut out = vec![0i16; cache.row_width()];
        scale_row(&self.filters.h_luma, amid, &mut out);
        self.alpha_cache.as_mut().unwrap().row_mut(sy as i64).as_mut_slice().copy_from_slice(&out);
    }

    /// Vertically combines the alpha cache at destination row `dy`, or
    /// returns a fully-opaque row when the source carries no alpha.
    fn combine_alpha_row(&self, dy: usize) -> Vec<i32> {
        match &self.alpha_cache {
            Some(cache) => {
                let v_luma = &self.filters.v_luma;
                let rows = cache.window(v_luma.offset[dy] as i64, v_luma.taps);
                combine_full(v_luma, dy, &rows, self.dst_w as usize)
            }
            None => vec![255i32; self.dst_w as usize],
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn emit_dst_row(
        &mut self,
        dy: usize,
        dst: &mut [&mut [u8]],
        dst_stride: &[usize],
        dst_shape: RowShape,
        dst_desc: FormatDescriptor,
        single_channel_src: bool,
        is_rgb_source: bool,
        dst_is_rgb: bool,
    ) -> Result<()> {
        let v_luma = self.filters.v_luma.clone();
        let v_chroma = self.filters.v_chroma.clone();

        let luma_rows = self.luma_cache.window(v_luma.offset[dy] as i64, v_luma.taps);
        let chan_a = combine_full(&v_luma, dy, &luma_rows, self.dst_w as usize);

        let log2h = dst_desc.chroma_log2_h;
        let is_new_chroma_row = dy & ((1usize << log2h) - 1) == 0;
        let cdy = dy >> log2h;

        let (chan_b, chan_c) = if !single_channel_src {
            if is_new_chroma_row {
                let cu_rows = self.chroma_u_cache.window(v_chroma.offset[cdy] as i64, v_chroma.taps);
                let cv_rows = self.chroma_v_cache.window(v_chroma.offset[cdy] as i64, v_chroma.taps);
                let cw = self.chroma_u_cache.row_width();
                let u = combine_full(&v_chroma, cdy, &cu_rows, cw);
                let v = combine_full(&v_chroma, cdy, &cv_rows, cw);
                self.last_chroma_row = Some((u, v));
            }
            self.last_chroma_row.clone().unwrap()
        } else {
            let w = if dst_is_rgb { self.dst_w as usize } else { self.chroma_u_cache.row_width() };
            (vec![128i32; w], vec![128i32; w])
        };

        let (chan_a, chan_b, chan_c) = if is_rgb_source && !dst_is_rgb {
            let coeffs = self
                .rgb_to_yuv
                .as_ref()
                .ok_or_else(|| Error::InvalidFlags("missing RGB->YUV colorspace coefficients".into()))?;
            rgb_to_yuv_planes(coeffs, &chan_a, &chan_b, &chan_c, dst_desc.chroma_log2_w)
        } else {
            (chan_a, chan_b, chan_c)
        };

        match dst_shape {
            RowShape::Planar => {
                write_planar_channel(&chan_a, dst[0], dst_stride[0], dy, dst_desc.depth_bits, dst_desc.endian_big);
                if dst_desc.component_count >= 3 && is_new_chroma_row {
                    write_planar_channel(&chan_b, dst[1], dst_stride[1], cdy, dst_desc.depth_bits, dst_desc.endian_big);
                    write_planar_channel(&chan_c, dst[2], dst_stride[2], cdy, dst_desc.depth_bits, dst_desc.endian_big);
                }
                if dst_desc.component_count == 4 {
                    let alpha = self.combine_alpha_row(dy);
                    write_planar_channel(&alpha, dst[3], dst_stride[3], dy, dst_desc.depth_bits, dst_desc.endian_big);
                }
            }
            RowShape::Yuyv422 | RowShape::Uyvy422 => {
                let y8: Vec<i16> = chan_a.iter().map(|&v| (v as i16) << 7).collect();
                let u8v: Vec<i16> = chan_b.iter().map(|&v| (v as i16) << 7).collect();
                let v8: Vec<i16> = chan_c.iter().map(|&v| (v as i16) << 7).collect();
                let row = row_slice_mut(dst[0], dst_stride[0], dy, self.dst_w as usize * 2);
                if matches!(dst_shape, RowShape::Yuyv422) {
                    pack_yuyv_row(&y8, &u8v, &v8, row);
                } else {
                    pack_uyvy_row(&y8, &u8v, &v8, row);
                }
            }
            RowShape::Nv { v_then_u } => {
                write_planar_channel(&chan_a, dst[0], dst_stride[0], dy, 8, false);
                if is_new_chroma_row {
                    let u8v: Vec<i16> = chan_b.iter().map(|&v| (v as i16) << 7).collect();
                    let v8: Vec<i16> = chan_c.iter().map(|&v| (v as i16) << 7).collect();
                    let row = row_slice_mut(dst[1], dst_stride[1], cdy, chan_b.len() * 2);
                    pack_nv_chroma_row(&u8v, &v8, row, v_then_u);
                }
            }
            RowShape::Rgb(layout) => {
                let row = row_slice_mut(dst[0], dst_stride[0], dy, self.dst_w as usize * layout.word_bytes);
                if is_rgb_source {
                    // Sub-8-bit channels (RGB15/16's 5/6-bit fields,
                    // RGB4Byte's 3/3/2-bit fields) get an ordered-dither bias
                    // before quantizing; `apply_dither` is a no-op at 7+ bits
                    // so RGB24/RGB32/RGB48 pass through unchanged.
                    let r: Vec<i16> = chan_a
                        .iter()
                        .enumerate()
                        .map(|(x, &v)| (apply_dither(v, x, dy, layout.r_bits as u8).clamp(0, 255) as i16) << 7)
                        .collect();
                    let g: Vec<i16> = chan_b
                        .iter()
                        .enumerate()
                        .map(|(x, &v)| (apply_dither(v, x, dy, layout.g_bits as u8).clamp(0, 255) as i16) << 7)
                        .collect();
                    let b: Vec<i16> = chan_c
                        .iter()
                        .enumerate()
                        .map(|(x, &v)| (apply_dither(v, x, dy, layout.b_bits as u8).clamp(0, 255) as i16) << 7)
                        .collect();
                    let a: Option<Vec<i16>> = layout
                        .a_shift
                        .is_some()
                        .then(|| self.combine_alpha_row(dy).iter().map(|&v| (v.clamp(0, 255) as i16) << 7).collect());
                    pack_rgb_row(layout, &r, &g, &b, a.as_deref(), row);
                } else {
                    let coeffs = self
                        .yuv_to_rgb
                        .as_ref()
                        .ok_or_else(|| Error::InvalidFlags("missing YUV->RGB colorspace coefficients".into()))?;
                    let tables = self.rgb_tables.as_ref().unwrap();
                    let alpha = layout.a_shift.is_some().then(|| self.combine_alpha_row(dy));
                    pack_rgb_plane_row(&chan_a, &chan_b, &chan_c, alpha.as_deref(), coeffs, tables, layout, dy, row);
                }
            }
            RowShape::Mono { white_is_zero } => {
                let y8: Vec<i16> = chan_a
                    .iter()
                    .enumerate()
                    .map(|(x, &v)| (apply_dither(v, x, dy, 1).clamp(0, 255) as i16) << 7)
                    .collect();
                let row = row_slice_mut(dst[0], dst_stride[0], dy, (self.dst_w as usize).div_ceil(8));
                pack_mono_row(&y8, row, white_is_zero);
            }
            RowShape::Pal8 | RowShape::Pal4 => {
                return Err(Error::UnsupportedOutputFormat("palettized destination"));
            }
        }
        Ok(())
    }
}

fn unpack_plane(row: &[u8], mid: &mut [i16], desc: FormatDescriptor) {
    if desc.depth_bits <= 8 {
        unpack_u8_row(row, mid);
    } else if desc.endian_big {
        unpack_u16be_row(row, mid);
    } else {
        unpack_u16le_row(row, mid);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ScaleFlags;
    use crate::filter::KernelKind;

    fn planar_rows(w: usize, h: usize, value: u8) -> Vec<u8> {
        vec![value; w * h]
    }

    #[test]
    fn identity_yuv420_round_trips_luma() {
        let mut ctx = Context::new(
            4, 4, PixelFormat::Yuv420P, 4, 4, PixelFormat::Yuv420P, KernelKind::Bilinear, ScaleFlags::NONE,
        )
        .unwrap();
        let y = planar_rows(4, 4, 100);
        let u = planar_rows(2, 2, 128);
        let v = planar_rows(2, 2, 128);
        let src: Vec<&[u8]> = vec![&y, &u, &v];
        let src_stride = [4usize, 2, 2];

        let mut dy = vec![0u8; 16];
        let mut du = vec![0u8; 4];
        let mut dv = vec![0u8; 4];
        let rows_written = {
            let mut dst: Vec<&mut [u8]> = vec![&mut dy, &mut du, &mut dv];
            let dst_stride = [4usize, 2, 2];
            ctx.scale(&src, &src_stride, 0, 4, false, &mut dst, &dst_stride).unwrap()
        };
        assert_eq!(rows_written, 4);
        assert!(dy.iter().all(|&b| b == 100));
    }

    #[test]
    fn mismatched_slice_order_is_rejected() {
        let mut ctx = Context::new(
            4, 4, PixelFormat::Gray8, 4, 4, PixelFormat::Gray8, KernelKind::Bilinear, ScaleFlags::NONE,
        )
        .unwrap();
        let y = planar_rows(4, 4, 50);
        let src: Vec<&[u8]> = vec![&y];
        let src_stride = [4usize];
        let mut out = vec![0u8; 16];
        {
            let mut dst: Vec<&mut [u8]> = vec![&mut out];
            ctx.scale(&src, &src_stride, 1, 1, false, &mut dst, &[4]).unwrap_err();
        }
    }
}
