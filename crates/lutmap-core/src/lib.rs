//! # lutmap-core
//!
//! Core types for compiling and applying lookup tables over N-dimensional
//! arrays.
//!
//! This crate provides the foundational types used throughout lutmap:
//!
//! - [`MapSpec`], [`MapValue`] - ordered (key, value) map specifications
//! - [`Element`], [`ElementType`] - numeric element types of keys and arrays
//! - [`Sampling`] - key quantization modes
//! - [`AxisSpec`] - which array axes form the key
//! - [`Error`] - the shared error taxonomy
//!
//! ## Crate Structure
//!
//! ```text
//! lutmap-core (this crate)
//!    ^
//!    |
//!    +-- lutmap-color (color tokens)
//!    +-- lutmap-lut (encoder, builder, applicator)
//!    +-- lutmap-config (YAML map documents)
//!    +-- lutmap-cli
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod axis;
pub mod element;
pub mod error;
pub mod sampling;
pub mod spec;

pub use axis::{checked_volume, move_axes_order, normalize_axis, AxisSpec};
pub use element::{Element, ElementType, MAX_EXACT_INTEGER};
pub use error::{Error, Result};
pub use sampling::{Sampling, NORMALIZED_STEP};
pub use spec::{MapSpec, MapValue, Tensor};

/// Prelude module for convenient imports.
///
/// ```
/// use lutmap_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::axis::AxisSpec;
    pub use crate::element::{Element, ElementType};
    pub use crate::error::{Error, Result};
    pub use crate::sampling::Sampling;
    pub use crate::spec::{MapSpec, MapValue};
}
