//! Error types for lutmap operations.
//!
//! A single [`Error`] enum covers every failure mode of the LUT pipeline:
//! - Map specification validation (empty maps, inconsistent shapes)
//! - Color token resolution
//! - Axis and sampling parameters
//! - Array shape checks at apply time
//!
//! Values outside the key domain of a compiled transform are never errors;
//! they resolve to the default destination or to the nearest declared key.
//!
//! # Usage
//!
//! ```rust
//! use lutmap_core::{Error, Result};
//!
//! fn check_rank(found: usize) -> Result<()> {
//!     if found == 0 {
//!         return Err(Error::invalid_axis_spec("axis list is empty"));
//!     }
//!     Ok(())
//! }
//! assert!(check_rank(0).is_err());
//! ```
//!
//! # Used By
//!
//! - `lutmap-color` - invalid color codes
//! - `lutmap-lut` - build and apply failures
//! - `lutmap-config` - wrapped into `ConfigError`

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or applying a lookup transform.
///
/// # Categories
///
/// - **Specification errors**: [`InvalidMapSpec`](Error::InvalidMapSpec), [`InvalidColorCode`](Error::InvalidColorCode)
/// - **Parameter errors**: [`InvalidAxisSpec`](Error::InvalidAxisSpec), [`InvalidSamplingMode`](Error::InvalidSamplingMode)
/// - **Array errors**: [`ShapeMismatch`](Error::ShapeMismatch), [`Array`](Error::Array)
/// - **Arithmetic errors**: [`LatticeOverflow`](Error::LatticeOverflow), [`TableTooLarge`](Error::TableTooLarge)
#[derive(Debug, Error)]
pub enum Error {
    /// The map specification is empty or its entries disagree on shape.
    #[error("invalid map specification: {reason}")]
    InvalidMapSpec {
        /// What is wrong with the specification
        reason: String,
    },

    /// A color token could not be resolved.
    ///
    /// Returned for unknown base names, malformed tints and empty tokens.
    ///
    /// # Example
    ///
    /// ```rust
    /// use lutmap_core::Error;
    ///
    /// let err = Error::invalid_color_code("mauve");
    /// assert!(err.to_string().contains("mauve"));
    /// ```
    #[error("invalid color code: {code:?}")]
    InvalidColorCode {
        /// The offending token
        code: String,
    },

    /// The axis argument is malformed (out of range, duplicated, empty, or
    /// not an integer / list of integers).
    #[error("invalid axis specification: {reason}")]
    InvalidAxisSpec {
        /// Why the axis argument was rejected
        reason: String,
    },

    /// The sampling argument is not a recognized marker or a valid step.
    #[error("invalid sampling mode: {mode}")]
    InvalidSamplingMode {
        /// Description of the rejected sampling value
        mode: String,
    },

    /// The designated key axes of an array don't match the transform's
    /// source shape.
    #[error("invalid dimensions on axis {axes:?}: expected {expected:?}, received {found:?}")]
    ShapeMismatch {
        /// Array axes designated as key axes
        axes: Vec<usize>,
        /// Source shape of the transform
        expected: Vec<usize>,
        /// Extents found on the designated axes
        found: Vec<usize>,
    },

    /// The bounding box of the quantized keys is too large to index.
    #[error("key lattice with extents {extents:?} overflows the index range")]
    LatticeOverflow {
        /// Per-dimension extents of the lattice
        extents: Vec<u64>,
    },

    /// The indirection table for sparse keys exceeds the configured slot
    /// limit or could not be allocated.
    #[error("indirection table of {slots} slots exceeds the limit of {limit} slots")]
    TableTooLarge {
        /// Bounding-box volume of the key lattice
        slots: usize,
        /// Largest table the build was allowed to allocate
        limit: usize,
    },

    /// Failure reported by the array library (reshape, layout).
    #[error("array error: {0}")]
    Array(String),
}

impl Error {
    /// Creates an [`Error::InvalidMapSpec`] error.
    #[inline]
    pub fn invalid_map_spec(reason: impl Into<String>) -> Self {
        Self::InvalidMapSpec {
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::InvalidColorCode`] error.
    #[inline]
    pub fn invalid_color_code(code: impl Into<String>) -> Self {
        Self::InvalidColorCode { code: code.into() }
    }

    /// Creates an [`Error::InvalidAxisSpec`] error.
    #[inline]
    pub fn invalid_axis_spec(reason: impl Into<String>) -> Self {
        Self::InvalidAxisSpec {
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::InvalidSamplingMode`] error.
    #[inline]
    pub fn invalid_sampling_mode(mode: impl Into<String>) -> Self {
        Self::InvalidSamplingMode { mode: mode.into() }
    }

    /// Creates an [`Error::ShapeMismatch`] error.
    #[inline]
    pub fn shape_mismatch(axes: Vec<usize>, expected: &[usize], found: Vec<usize>) -> Self {
        Self::ShapeMismatch {
            axes,
            expected: expected.to_vec(),
            found,
        }
    }

    /// Creates an [`Error::TableTooLarge`] error.
    #[inline]
    pub fn table_too_large(slots: usize, limit: usize) -> Self {
        Self::TableTooLarge { slots, limit }
    }

    /// Creates an [`Error::Array`] error.
    #[inline]
    pub fn array(msg: impl Into<String>) -> Self {
        Self::Array(msg.into())
    }

    /// Returns `true` if the specification itself was rejected.
    #[inline]
    pub fn is_spec_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidMapSpec { .. } | Self::InvalidColorCode { .. }
        )
    }

    /// Returns `true` if this is a shape mismatch.
    #[inline]
    pub fn is_shape_mismatch(&self) -> bool {
        matches!(self, Self::ShapeMismatch { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_mismatch_message() {
        let err = Error::shape_mismatch(vec![2], &[3], vec![4]);
        let msg = err.to_string();
        assert!(msg.contains("[2]"));
        assert!(msg.contains("[3]"));
        assert!(msg.contains("[4]"));
        assert!(err.is_shape_mismatch());
        assert!(!err.is_spec_error());
    }

    #[test]
    fn test_spec_errors() {
        assert!(Error::invalid_map_spec("empty").is_spec_error());
        assert!(Error::invalid_color_code("mauve").is_spec_error());
        assert!(!Error::invalid_sampling_mode("fast").is_spec_error());
    }

    #[test]
    fn test_table_too_large_message() {
        let msg = Error::table_too_large(1 << 30, 1 << 28).to_string();
        assert!(msg.contains(&(1usize << 30).to_string()));
        assert!(msg.contains(&(1usize << 28).to_string()));
    }
}
