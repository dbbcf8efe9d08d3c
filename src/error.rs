// SPDX-License-Identifier: MIT
//! # Error Types
//!
//! A single flat error enum covering every failure mode a [`crate::Context`]
//! can hit: geometry validation, flag validation, allocation, filter-size
//! blowup, and unsupported formats. Constructed by hand (`Display` +
//! `std::error::Error`, no derive macro) to match the plain-enum pattern used
//! elsewhere for CPU-scaling errors.

use std::fmt;

/// Everything that can go wrong building or driving a [`crate::Context`].
///
/// All of them are surfaced at context-construction time (`Context::new`
/// returns `Err`), except [`Error::SliceMisordered`] which can also occur
/// from `Context::scale`.
#[derive(Debug)]
pub enum Error {
    /// The source pixel format is not in the supported set.
    UnsupportedInputFormat(&'static str),
    /// The destination pixel format is not in the supported set.
    UnsupportedOutputFormat(&'static str),
    /// A dimension was non-positive, or exceeded the compile-time width limit
    /// (`VOFW`, see [`crate::format::MAX_ROW_WIDTH`]).
    InvalidGeometry(String),
    /// Zero or more than one kernel bit was set in [`crate::ScaleFlags`].
    InvalidFlags(String),
    /// The first slice of a frame did not start at `srcSliceY == 0` and did
    /// not end at `srcH`, so top-down/bottom-up direction could not be
    /// determined.
    SliceMisordered,
    /// A buffer allocation failed or a caller-supplied buffer was undersized.
    OutOfMemory(String),
    /// The filter builder produced a tap count beyond the implementation
    /// limit ([`crate::filter::MAX_FILTER_SIZE`]).
    FilterTooLarge { taps: usize, max: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnsupportedInputFormat(name) => {
                write!(f, "unsupported input pixel format: {name}")
            }
            Error::UnsupportedOutputFormat(name) => {
                write!(f, "unsupported output pixel format: {name}")
            }
            Error::InvalidGeometry(msg) => write!(f, "invalid geometry: {msg}"),
            Error::InvalidFlags(msg) => write!(f, "invalid flags: {msg}"),
            Error::SliceMisordered => {
                write!(f, "first slice of a frame must start at y=0 or end at srcH")
            }
            Error::OutOfMemory(msg) => write!(f, "allocation failed: {msg}"),
            Error::FilterTooLarge { taps, max } => {
                write!(f, "filter has {taps} taps, exceeding the limit of {max}")
            }
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
