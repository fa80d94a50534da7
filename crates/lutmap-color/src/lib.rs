//! # lutmap-color
//!
//! Resolves human-readable color codes into numeric triples.
//!
//! Map specifications for segmentation masks are usually written with color
//! names (`"red"`, `"sky_blue"`, `"grey.5"`) rather than raw tuples. This
//! crate turns such tokens into three channels before a lookup table is
//! compiled.
//!
//! # Grammar
//!
//! - `name` - a base color from [`NAMED_COLORS`] (case-insensitive)
//! - `name.tint` - the base color scaled by `0.tint`; for black the scale
//!   is `1 - 0.tint` applied to full intensity
//!
//! # Usage
//!
//! ```rust
//! use lutmap_color::{resolve, ChannelOrder, ColorEncoding};
//!
//! let c = resolve("grey", ColorEncoding::Normalized, ChannelOrder::Rgb).unwrap();
//! assert!((c[0] - 127.0 / 255.0).abs() < 1e-6);
//! ```
//!
//! # Used By
//!
//! - `lutmap-lut` - resolves color keys and values while building
//! - `lutmap-cli` - `lutmap color`

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod code;

pub use code::{
    list_colors, resolve, resolve_u8, ChannelOrder, ColorCode, ColorEncoding, NAMED_COLORS,
};
