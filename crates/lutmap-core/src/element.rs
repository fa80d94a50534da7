//! Numeric element types for keys, arrays and destination tables.
//!
//! Every array handled by lutmap has a statically known element type. The
//! [`Element`] trait is implemented for the integer and floating-point types
//! that show up in label maps and color images:
//!
//! - `u8`, `u16`, `u32` - unsigned integers (8-bit images, label maps)
//! - `i16`, `i32`, `i64` - signed integers
//! - `f16`, `f32`, `f64` - floating point (normalized color, scores)
//!
//! Unlike pixel formats, elements are never normalized: `200u8` converts to
//! `200.0`, not `0.784`. Keys are compared on the raw numeric value.
//!
//! ```
//! use lutmap_core::{Element, ElementType};
//!
//! assert_eq!(200u8.to_f64(), 200.0);
//! assert_eq!(u8::from_f64(300.0), 255); // saturates
//! assert_eq!(<f32 as Element>::TYPE, ElementType::F32);
//! ```

use half::f16;
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Runtime marker for an element type.
///
/// Mirrors the static [`Element::TYPE`] so that compiled transforms can
/// report their source type and command-line tools can pick one by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    /// 8-bit unsigned integer.
    U8,
    /// 16-bit unsigned integer.
    U16,
    /// 32-bit unsigned integer.
    U32,
    /// 16-bit signed integer.
    I16,
    /// 32-bit signed integer.
    I32,
    /// 64-bit signed integer.
    I64,
    /// 16-bit half-precision float.
    F16,
    /// 32-bit single-precision float.
    F32,
    /// 64-bit double-precision float.
    F64,
}

impl ElementType {
    /// All element types, in declaration order.
    pub const ALL: [ElementType; 9] = [
        Self::U8,
        Self::U16,
        Self::U32,
        Self::I16,
        Self::I32,
        Self::I64,
        Self::F16,
        Self::F32,
        Self::F64,
    ];

    /// Whether this is a floating-point type.
    #[inline]
    pub const fn is_float(&self) -> bool {
        matches!(self, Self::F16 | Self::F32 | Self::F64)
    }

    /// Whether this is an integer type.
    #[inline]
    pub const fn is_integer(&self) -> bool {
        !self.is_float()
    }

    /// Short lowercase name (`"u8"`, `"f32"`, ...).
    pub const fn name(&self) -> &'static str {
        match self {
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::F16 => "f16",
            Self::F32 => "f32",
            Self::F64 => "f64",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ElementType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.name() == lower)
            .or(match lower.as_str() {
                "uint8" => Some(Self::U8),
                "uint16" => Some(Self::U16),
                "int32" => Some(Self::I32),
                "half" | "float16" => Some(Self::F16),
                "float" | "float32" => Some(Self::F32),
                "double" | "float64" => Some(Self::F64),
                _ => None,
            })
            .ok_or_else(|| Error::invalid_map_spec(format!("unknown element type: {s}")))
    }
}

/// Largest magnitude up to which every integer survives the trip through
/// `f64` (2^53).
///
/// Keys are quantized from their `f64` value, so `i64` and `u32`-range keys
/// beyond this bound can collapse onto the same lattice cell.
pub const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Trait for array element types.
///
/// Values cross the trait as `f64`; integer elements are exact up to
/// [`MAX_EXACT_INTEGER`].
///
/// # Required Methods
///
/// - [`to_f64`](Element::to_f64) - Widen to `f64` without normalization
/// - [`from_f64`](Element::from_f64) - Narrow from `f64`; integers truncate
///   toward zero and saturate at the type bounds
pub trait Element: Copy + Default + Send + Sync + PartialOrd + fmt::Debug + 'static {
    /// Runtime marker for this type.
    const TYPE: ElementType;

    /// Widen to `f64`.
    fn to_f64(self) -> f64;

    /// Narrow from `f64`.
    fn from_f64(v: f64) -> Self;

    /// Zero value.
    #[inline]
    fn zero() -> Self {
        Self::from_f64(0.0)
    }
}

macro_rules! impl_element_primitive {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl Element for $t {
                const TYPE: ElementType = ElementType::$variant;

                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }

                #[inline]
                fn from_f64(v: f64) -> Self {
                    v as $t
                }
            }
        )*
    };
}

impl_element_primitive! {
    u8 => U8,
    u16 => U16,
    u32 => U32,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    f32 => F32,
    f64 => F64,
}

impl Element for f16 {
    const TYPE: ElementType = ElementType::F16;

    #[inline]
    fn to_f64(self) -> f64 {
        f16::to_f64(self)
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        f16::from_f64(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_narrowing() {
        assert_eq!(u8::from_f64(12.9), 12);
        assert_eq!(u8::from_f64(-4.0), 0);
        assert_eq!(i16::from_f64(-3.7), -3);
        assert_eq!(u16::from_f64(1e9), u16::MAX);
        assert_eq!(i32::from_f64(f64::NAN), 0);
    }

    #[test]
    fn test_half_roundtrip() {
        let v = f16::from_f64(0.5);
        assert_eq!(v.to_f64(), 0.5);
        assert!(<f16 as Element>::TYPE.is_float());
    }

    #[test]
    fn test_parse_type() {
        assert_eq!("u8".parse::<ElementType>().unwrap(), ElementType::U8);
        assert_eq!("Float32".parse::<ElementType>().unwrap(), ElementType::F32);
        assert_eq!("half".parse::<ElementType>().unwrap(), ElementType::F16);
        assert!("complex".parse::<ElementType>().is_err());
    }
}
