// SPDX-License-Identifier: MIT
//! Software image scaler and pixel-format converter for planar and packed
//! YUV/RGB video frames, modeled on `libswscale`'s separable-filter
//! architecture: a horizontal polyphase pass, a ring-buffered vertical pass,
//! and a row-shape dispatch table covering planar, semi-planar, packed, and
//! palettized pixel layouts.
//!
//! The entry points most callers need are [`Context`] (build once per
//! geometry/format/kernel combination) and [`Context::scale`] (feed slices,
//! get output rows back). [`PixelFormat`] enumerates every supported layout;
//! [`KernelKind`] the available resampling filters.

pub mod colorspace;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod filter;
pub mod format;
pub mod hscale;
pub mod ringcache;
pub mod rowconv;
pub mod scale;
pub mod vector;
pub mod vscale;

pub use colorspace::{ColorMatrix, ColorspaceParams, Range};
pub use context::{Context, ScaleFlags};
pub use error::{Error, Result};
pub use filter::KernelKind;
pub use format::PixelFormat;
pub use rowconv::PaletteEntry;
