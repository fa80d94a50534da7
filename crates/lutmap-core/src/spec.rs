//! Map specifications: ordered (source key, destination value) pairs.
//!
//! A [`MapSpec`] is the caller-facing description of a lookup table. Keys and
//! values are [`MapValue`]s: scalars, numeric tuples, nested tuples for
//! multi-dimensional shapes, or color tokens such as `"red"` / `"grey.5"`
//! which are resolved to numeric triples before the table is compiled.
//!
//! ```rust
//! use lutmap_core::{MapSpec, MapValue};
//!
//! let spec = MapSpec::new()
//!     .with_entry([0, 0, 255], 1)
//!     .with_entry([255, 0, 0], 2)
//!     .with_entry("green", 3);
//!
//! assert_eq!(spec.len(), 3);
//! assert!(matches!(spec.entries()[2].0, MapValue::Color(_)));
//! ```

use std::hash::{Hash, Hasher};

use crate::{Error, Result};

/// A key or destination value of a map specification.
#[derive(Debug, Clone, PartialEq)]
pub enum MapValue {
    /// Single number (scalar shape).
    Scalar(f64),
    /// Color token, `name` or `name.tint`.
    Color(String),
    /// Flat numeric tuple (shape `(n,)`).
    Tuple(Vec<f64>),
    /// Nested values for multi-dimensional shapes. Every child must resolve
    /// to the same shape.
    Nested(Vec<MapValue>),
}

/// A resolved numeric value: row-major data plus its shape.
///
/// A scalar has an empty shape and exactly one element.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    /// Shape of the value (empty for scalars)
    pub shape: Vec<usize>,
    /// Row-major elements
    pub data: Vec<f64>,
}

impl Tensor {
    /// Whether this value has the empty (scalar) shape.
    #[inline]
    pub fn is_scalar(&self) -> bool {
        self.shape.is_empty()
    }
}

impl MapValue {
    /// Resolves this value to numbers, calling `color` for every color token.
    ///
    /// `color` returns the numeric tuple for a token; its length becomes the
    /// innermost dimension.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidMapSpec`] for empty or ragged nested values
    /// - whatever `color` returns for bad tokens
    pub fn resolve_with<F>(&self, color: &mut F) -> Result<Tensor>
    where
        F: FnMut(&str) -> Result<Vec<f64>>,
    {
        match self {
            Self::Scalar(v) => Ok(Tensor {
                shape: Vec::new(),
                data: vec![*v],
            }),
            Self::Color(token) => {
                let data = color(token)?;
                Ok(Tensor {
                    shape: vec![data.len()],
                    data,
                })
            }
            Self::Tuple(values) => {
                if values.is_empty() {
                    return Err(Error::invalid_map_spec("empty tuple"));
                }
                Ok(Tensor {
                    shape: vec![values.len()],
                    data: values.clone(),
                })
            }
            Self::Nested(children) => {
                let mut data = Vec::new();
                let mut inner: Option<Vec<usize>> = None;
                for child in children {
                    let t = child.resolve_with(color)?;
                    match &inner {
                        None => inner = Some(t.shape),
                        Some(shape) if *shape != t.shape => {
                            return Err(Error::invalid_map_spec(format!(
                                "ragged nested value: shape {:?} vs {:?}",
                                shape, t.shape
                            )));
                        }
                        Some(_) => {}
                    }
                    data.extend(t.data);
                }
                let inner = inner.ok_or_else(|| Error::invalid_map_spec("empty nested value"))?;
                let mut shape = vec![children.len()];
                shape.extend(inner);
                Ok(Tensor { shape, data })
            }
        }
    }
}

/// Hashes a float by bit pattern, with `-0.0` folded into `0.0` so that
/// values equal under `==` hash alike.
pub(crate) fn hash_f64<H: Hasher>(v: f64, state: &mut H) {
    let v = if v == 0.0 { 0.0 } else { v };
    v.to_bits().hash(state);
}

// Floats hash by bit pattern so specifications can key a cache.
impl Hash for MapValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Scalar(v) => hash_f64(*v, state),
            Self::Color(token) => token.hash(state),
            Self::Tuple(values) => {
                values.len().hash(state);
                for &v in values {
                    hash_f64(v, state);
                }
            }
            Self::Nested(children) => children.hash(state),
        }
    }
}

impl From<f64> for MapValue {
    fn from(v: f64) -> Self {
        Self::Scalar(v)
    }
}

impl From<f32> for MapValue {
    fn from(v: f32) -> Self {
        Self::Scalar(v as f64)
    }
}

impl From<i32> for MapValue {
    fn from(v: i32) -> Self {
        Self::Scalar(v as f64)
    }
}

impl From<i64> for MapValue {
    fn from(v: i64) -> Self {
        Self::Scalar(v as f64)
    }
}

impl From<u8> for MapValue {
    fn from(v: u8) -> Self {
        Self::Scalar(v as f64)
    }
}

impl From<&str> for MapValue {
    fn from(token: &str) -> Self {
        Self::Color(token.to_string())
    }
}

impl From<String> for MapValue {
    fn from(token: String) -> Self {
        Self::Color(token)
    }
}

impl From<Vec<f64>> for MapValue {
    fn from(values: Vec<f64>) -> Self {
        Self::Tuple(values)
    }
}

impl From<Vec<MapValue>> for MapValue {
    fn from(children: Vec<MapValue>) -> Self {
        Self::Nested(children)
    }
}

macro_rules! impl_from_array {
    ($($t:ty),*) => {
        $(
            impl<const N: usize> From<[$t; N]> for MapValue {
                fn from(values: [$t; N]) -> Self {
                    Self::Tuple(values.iter().map(|&v| v as f64).collect())
                }
            }
        )*
    };
}

impl_from_array!(f64, f32, i32, i64, u8, u16);

/// Ordered collection of (source key, destination value) pairs.
///
/// Order matters: when two keys quantize to the same lattice cell the later
/// entry wins, and nearest-neighbor ties resolve to the earlier entry.
#[derive(Debug, Clone, Default, PartialEq, Hash)]
pub struct MapSpec {
    entries: Vec<(MapValue, MapValue)>,
}

impl MapSpec {
    /// Creates an empty specification.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a specification from (key, value) pairs.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<MapValue>,
        V: Into<MapValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        pairs.into_iter().collect()
    }

    /// Appends an entry (builder style).
    pub fn with_entry(mut self, key: impl Into<MapValue>, value: impl Into<MapValue>) -> Self {
        self.push(key, value);
        self
    }

    /// Appends an entry.
    pub fn push(&mut self, key: impl Into<MapValue>, value: impl Into<MapValue>) {
        self.entries.push((key.into(), value.into()));
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the specification has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in declaration order.
    #[inline]
    pub fn entries(&self) -> &[(MapValue, MapValue)] {
        &self.entries
    }

    /// Iterates over (key, value) references in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&MapValue, &MapValue)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }
}

impl<K: Into<MapValue>, V: Into<MapValue>> FromIterator<(K, V)> for MapSpec {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_signed_zero_hashes_alike() {
        assert_eq!(MapValue::from(0.0), MapValue::from(-0.0));
        assert_eq!(hash_of(&MapValue::from(0.0)), hash_of(&MapValue::from(-0.0)));

        let a = MapSpec::from_pairs([([0.0, 1.0], 1.0)]);
        let b = MapSpec::from_pairs([([-0.0, 1.0], 1.0)]);
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    fn no_colors(token: &str) -> Result<Vec<f64>> {
        Err(Error::invalid_color_code(token))
    }

    #[test]
    fn test_resolve_shapes() {
        let scalar = MapValue::from(3).resolve_with(&mut no_colors).unwrap();
        assert!(scalar.is_scalar());
        assert_eq!(scalar.data, vec![3.0]);

        let tuple = MapValue::from([1, 2, 3]).resolve_with(&mut no_colors).unwrap();
        assert_eq!(tuple.shape, vec![3]);

        let nested = MapValue::Nested(vec![[1, 2].into(), [3, 4].into(), [5, 6].into()])
            .resolve_with(&mut no_colors)
            .unwrap();
        assert_eq!(nested.shape, vec![3, 2]);
        assert_eq!(nested.data, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_ragged_nested_rejected() {
        let ragged = MapValue::Nested(vec![[1, 2].into(), [3].into()]);
        let err = ragged.resolve_with(&mut no_colors).unwrap_err();
        assert!(matches!(err, Error::InvalidMapSpec { .. }));
    }

    #[test]
    fn test_color_callback() {
        let mut lookup = |token: &str| -> Result<Vec<f64>> {
            assert_eq!(token, "red");
            Ok(vec![255.0, 0.0, 0.0])
        };
        let t = MapValue::from("red").resolve_with(&mut lookup).unwrap();
        assert_eq!(t.shape, vec![3]);
    }

    #[test]
    fn test_spec_order_preserved() {
        let spec = MapSpec::from_pairs([(2, 20), (1, 10)]);
        let keys: Vec<_> = spec.iter().map(|(k, _)| k.clone()).collect();
        assert_eq!(keys, vec![MapValue::Scalar(2.0), MapValue::Scalar(1.0)]);
    }
}
