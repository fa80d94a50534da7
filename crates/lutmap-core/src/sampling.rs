//! Sampling modes for key quantization.
//!
//! Keys are quantized onto an integer lattice by dividing each coordinate by
//! its sampling step and truncating. The step is chosen by [`Sampling`]:
//!
//! | mode | step |
//! |------|------|
//! | [`Auto`](Sampling::Auto) | `1/255` for float keys inside `[0, 1]`, else `1` |
//! | [`Fixed`](Sampling::Fixed) | caller-supplied, one value or one per key element |
//! | [`Gcd`](Sampling::Gcd) | `1 / (2 * gcd)` of each key element across all keys |
//! | [`Nearest`](Sampling::Nearest) | no lattice, nearest-neighbor matching |

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::{Error, Result};

/// Step used when float keys all lie inside `[0, 1]`.
pub const NORMALIZED_STEP: f64 = 1.0 / 255.0;

/// How keys are discretized before lookup.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Sampling {
    /// Pick a step from the key values and element type.
    #[default]
    Auto,
    /// Explicit step, broadcast when it has a single entry.
    Fixed(Vec<f64>),
    /// Derive the step per key element from the gcd of its values.
    Gcd,
    /// Skip quantization and match by Euclidean distance.
    Nearest,
}

impl Sampling {
    /// Single step for every key element.
    pub fn fixed(step: f64) -> Self {
        Self::Fixed(vec![step])
    }

    /// One step per key element.
    pub fn per_dimension(steps: impl Into<Vec<f64>>) -> Self {
        Self::Fixed(steps.into())
    }

    /// Expands a fixed step to `len` key elements.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidSamplingMode`] if a step is not finite and positive,
    /// or the vector length is neither 1 nor `len`.
    pub fn expand_fixed(steps: &[f64], len: usize) -> Result<Vec<f64>> {
        if let Some(bad) = steps.iter().find(|s| !s.is_finite() || **s <= 0.0) {
            return Err(Error::invalid_sampling_mode(format!(
                "sampling step must be finite and positive, got {bad}"
            )));
        }
        match steps.len() {
            1 => Ok(vec![steps[0]; len]),
            n if n == len => Ok(steps.to_vec()),
            n => Err(Error::invalid_sampling_mode(format!(
                "expected 1 or {len} sampling steps, got {n}"
            ))),
        }
    }
}

impl Hash for Sampling {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        if let Self::Fixed(steps) = self {
            for &s in steps {
                crate::spec::hash_f64(s, state);
            }
        }
    }
}

impl fmt::Display for Sampling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            Self::Gcd => f.write_str("gcd"),
            Self::Nearest => f.write_str("nearest"),
            Self::Fixed(steps) if steps.len() == 1 => write!(f, "{}", steps[0]),
            Self::Fixed(steps) => write!(f, "{steps:?}"),
        }
    }
}

impl FromStr for Sampling {
    type Err = Error;

    /// Parses `"auto"`, `"gcd"`, `"nearest"` or a number.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "auto" => Ok(Self::Auto),
            "gcd" => Ok(Self::Gcd),
            "nearest" => Ok(Self::Nearest),
            other => other
                .parse::<f64>()
                .map(Self::fixed)
                .map_err(|_| Error::invalid_sampling_mode(format!("unknown marker {other:?}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("nearest".parse::<Sampling>().unwrap(), Sampling::Nearest);
        assert_eq!("gcd".parse::<Sampling>().unwrap(), Sampling::Gcd);
        assert_eq!("0.5".parse::<Sampling>().unwrap(), Sampling::fixed(0.5));
        assert!(matches!(
            "bilinear".parse::<Sampling>(),
            Err(Error::InvalidSamplingMode { .. })
        ));
    }

    #[test]
    fn test_expand_fixed() {
        assert_eq!(Sampling::expand_fixed(&[2.0], 3).unwrap(), vec![2.0; 3]);
        assert_eq!(Sampling::expand_fixed(&[1.0, 2.0], 2).unwrap(), vec![1.0, 2.0]);
        assert!(Sampling::expand_fixed(&[1.0, 2.0], 3).is_err());
        assert!(Sampling::expand_fixed(&[0.0], 3).is_err());
        assert!(Sampling::expand_fixed(&[f64::NAN], 1).is_err());
    }

    #[test]
    fn test_hash_matches_eq() {
        use std::collections::hash_map::DefaultHasher;

        let hash_of = |s: &Sampling| {
            let mut hasher = DefaultHasher::new();
            s.hash(&mut hasher);
            hasher.finish()
        };
        let a = Sampling::per_dimension(vec![0.0, 2.0]);
        let b = Sampling::per_dimension(vec![-0.0, 2.0]);
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }
}
