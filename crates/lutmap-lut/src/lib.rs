//! # lutmap-lut
//!
//! Compiles (key, value) map specifications into lookup tables and applies
//! them to N-dimensional arrays.
//!
//! A typical use is recoloring segmentation masks: a map from class colors
//! to label ids becomes a table that relabels a whole `H x W x 3` image in
//! one pass, and the reverse map paints labels back into colors.
//!
//! # Lookup Modes
//!
//! - [`LookupKind::Direct`] - quantized keys are exactly `0..n`
//! - [`LookupKind::Indexed`] - sparse keys through an indirection table
//! - [`LookupKind::Nearest`] - closest declared key by Euclidean distance
//!
//! The mode is picked when building, from the keys and the
//! [`Sampling`](lutmap_core::Sampling) option.
//!
//! # Usage
//!
//! ```rust
//! use lutmap_core::MapSpec;
//! use lutmap_lut::{build_transform, BuildOptions, LookupKind};
//! use ndarray::array;
//!
//! let spec = MapSpec::new()
//!     .with_entry([0, 0, 255], 1)
//!     .with_entry([0, 255, 0], 2);
//! let lut = build_transform::<u8, u8>(&spec, &BuildOptions::new().with_axis(-1)).unwrap();
//! assert_eq!(lut.kind(), LookupKind::Indexed);
//!
//! let image = array![[[0u8, 0, 255], [0, 255, 0], [9, 9, 9]]];
//! let labels = lut.apply(&image).unwrap();
//! assert_eq!(labels.shape(), &[1, 3, 1]);
//! ```
//!
//! # Features
//!
//! - `parallel` (default) - per-position lookups on the rayon pool
//!
//! # Dependencies
//!
//! - [`lutmap-core`] - Core types
//! - [`lutmap-color`] - Color tokens in specifications
//! - [`ndarray`] - Array storage and views
//!
//! # Used By
//!
//! - `lutmap-config` - builds transforms from map documents
//! - `lutmap-cli` - `lutmap inspect`, `lutmap lookup`

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod apply;
mod builder;
mod cache;
pub mod encoder;
mod transform;

pub use apply::{apply, LutSource};
pub use builder::{build_transform, BuildOptions, DEFAULT_MAX_TABLE_LEN};
pub use cache::{TransformCache, DEFAULT_CAPACITY};
pub use encoder::{encode, effective_sampling, EncodedKeys, Lattice};
pub use transform::{CompiledTransform, LookupKind, LookupMode};
