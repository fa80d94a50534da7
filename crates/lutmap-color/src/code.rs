//! Color code parsing.
//!
//! A color code is `name` or `name.tint`, where `name` is one of the
//! [`NAMED_COLORS`] and `tint` is the digit string of a decimal fraction
//! (`"red.5"` is red at 50%). Tinting multiplies every channel of the
//! full-intensity base color by the fraction. Black is the exception: a
//! tinted black starts from full intensity and is scaled by `1 - tint`, so
//! `"black.25"` is a light grey rather than black again.

use std::fmt;
use std::str::FromStr;

use lutmap_core::{Error, Result};

/// Base colors as full-intensity RGB triples.
pub const NAMED_COLORS: &[(&str, [u8; 3])] = &[
    ("black", [0, 0, 0]),
    ("white", [255, 255, 255]),
    ("grey", [127, 127, 127]),
    ("red", [255, 0, 0]),
    ("green", [0, 255, 0]),
    ("blue", [0, 0, 255]),
    ("cyan", [0, 255, 255]),
    ("magenta", [255, 0, 255]),
    ("yellow", [255, 255, 0]),
    ("orange", [255, 127, 0]),
    ("turquoise", [0, 255, 127]),
    ("sky_blue", [0, 127, 255]),
    ("apple_green", [127, 255, 0]),
    ("purple", [127, 0, 255]),
    ("pink", [255, 0, 127]),
];

/// Order of the three output channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelOrder {
    /// Red, green, blue.
    Rgb,
    /// Blue, green, red (OpenCV-style images).
    Bgr,
}

impl FromStr for ChannelOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rgb" | "forward" => Ok(Self::Rgb),
            "bgr" | "reversed" => Ok(Self::Bgr),
            other => Err(Error::invalid_map_spec(format!(
                "unknown channel order {other:?} (expected rgb or bgr)"
            ))),
        }
    }
}

impl fmt::Display for ChannelOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Rgb => "rgb",
            Self::Bgr => "bgr",
        })
    }
}

/// Numeric range of resolved channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorEncoding {
    /// Integers in `0..=255` (truncated after tinting).
    Uint8,
    /// Floats in `[0, 1]`.
    Normalized,
}

/// Parsed color code: base color plus tint multiplier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorCode {
    base: [u8; 3],
    scale: f32,
}

impl ColorCode {
    /// Parses `name` or `name.tint`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidColorCode`] for empty tokens, unknown names, tints
    /// that aren't plain digits, or more than one `.`.
    pub fn parse(token: &str) -> Result<Self> {
        let invalid = || Error::invalid_color_code(token);

        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(invalid());
        }
        let (name, tint) = match trimmed.split_once('.') {
            Some((name, digits)) => {
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(invalid());
                }
                let t: f32 = format!("0.{digits}").parse().map_err(|_| invalid())?;
                (name, Some(t))
            }
            None => (trimmed, None),
        };

        let name = name.to_ascii_lowercase();
        let base = lookup(&name).ok_or_else(invalid)?;

        Ok(match tint {
            None => Self { base, scale: 1.0 },
            Some(t) if name == "black" => Self {
                base: [255, 255, 255],
                scale: 1.0 - t,
            },
            Some(t) => Self { base, scale: t },
        })
    }

    /// Channels in `order` and `encoding`.
    pub fn to_channels(&self, encoding: ColorEncoding, order: ChannelOrder) -> [f32; 3] {
        let mut c = self.base.map(|v| v as f32 * self.scale);
        match encoding {
            ColorEncoding::Uint8 => {
                for v in &mut c {
                    *v = v.clamp(0.0, 255.0).trunc();
                }
            }
            ColorEncoding::Normalized => {
                for v in &mut c {
                    *v /= 255.0;
                }
            }
        }
        if order == ChannelOrder::Bgr {
            c.reverse();
        }
        c
    }
}

impl FromStr for ColorCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn lookup(name: &str) -> Option<[u8; 3]> {
    NAMED_COLORS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, rgb)| *rgb)
}

/// Resolves a color token to three channels.
///
/// # Example
///
/// ```rust
/// use lutmap_color::{resolve, ChannelOrder, ColorEncoding};
///
/// let red = resolve("red", ColorEncoding::Uint8, ChannelOrder::Rgb).unwrap();
/// assert_eq!(red, [255.0, 0.0, 0.0]);
///
/// let red = resolve("red", ColorEncoding::Uint8, ChannelOrder::Bgr).unwrap();
/// assert_eq!(red, [0.0, 0.0, 255.0]);
/// ```
pub fn resolve(token: &str, encoding: ColorEncoding, order: ChannelOrder) -> Result<[f32; 3]> {
    Ok(ColorCode::parse(token)?.to_channels(encoding, order))
}

/// Resolves a color token to 8-bit channels.
pub fn resolve_u8(token: &str, order: ChannelOrder) -> Result<[u8; 3]> {
    Ok(resolve(token, ColorEncoding::Uint8, order)?.map(|v| v as u8))
}

/// Names of the base colors, in table order.
pub fn list_colors() -> impl Iterator<Item = &'static str> {
    NAMED_COLORS.iter().map(|(name, _)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_plain_names() {
        assert_eq!(resolve_u8("red", ChannelOrder::Rgb).unwrap(), [255, 0, 0]);
        assert_eq!(resolve_u8("Blue", ChannelOrder::Rgb).unwrap(), [0, 0, 255]);
        assert_eq!(resolve_u8("sky_blue", ChannelOrder::Bgr).unwrap(), [255, 127, 0]);
        assert_eq!(resolve_u8("black", ChannelOrder::Rgb).unwrap(), [0, 0, 0]);
    }

    #[test]
    fn test_tint() {
        assert_eq!(resolve_u8("red.5", ChannelOrder::Rgb).unwrap(), [127, 0, 0]);
        assert_eq!(resolve_u8("white.25", ChannelOrder::Rgb).unwrap(), [63, 63, 63]);
    }

    #[test]
    fn test_black_tint_inverted() {
        let c = resolve_u8("black.5", ChannelOrder::Rgb).unwrap();
        for v in c {
            assert!(v == 127 || v == 128, "got {v}");
        }
        let c = resolve_u8("black.75", ChannelOrder::Rgb).unwrap();
        assert_eq!(c, [63, 63, 63]);
    }

    #[test]
    fn test_normalized() {
        let c = resolve("orange", ColorEncoding::Normalized, ChannelOrder::Rgb).unwrap();
        assert_relative_eq!(c[0], 1.0);
        assert_relative_eq!(c[1], 127.0 / 255.0, epsilon = 1e-6);
        assert_relative_eq!(c[2], 0.0);
    }

    #[test]
    fn test_invalid_codes() {
        for token in ["", "mauve", "red.", "red.x5", "red.5.5", ".5"] {
            let err = ColorCode::parse(token).unwrap_err();
            assert!(matches!(err, Error::InvalidColorCode { .. }), "{token:?}");
        }
    }

    #[test]
    fn test_channel_order_parse() {
        assert_eq!("BGR".parse::<ChannelOrder>().unwrap(), ChannelOrder::Bgr);
        assert_eq!("forward".parse::<ChannelOrder>().unwrap(), ChannelOrder::Rgb);
        assert!("rbg".parse::<ChannelOrder>().is_err());
    }

    #[test]
    fn test_list_colors() {
        let names: Vec<_> = list_colors().collect();
        assert!(names.contains(&"grey"));
        assert_eq!(names.len(), NAMED_COLORS.len());
    }
}
