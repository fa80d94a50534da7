//! Compiled lookup transforms.
//!
//! A [`CompiledTransform`] is the immutable result of
//! [`build_transform`](crate::build_transform). It owns everything needed to
//! map arrays: the key lattice (or raw keys), the lookup mode and the
//! destination table. Nothing in it changes after construction, so one
//! transform can be shared across threads and applied concurrently.
//!
//! # Destination table
//!
//! Row 0 of the destination table is always the default value. Rows `1..`
//! hold the declared destinations, sorted by flattened key index in
//! [`Direct`](LookupMode::Direct) / [`Indexed`](LookupMode::Indexed) modes
//! and in declaration order in [`Nearest`](LookupMode::Nearest) mode.

use std::fmt;
use std::marker::PhantomData;

use lutmap_core::{AxisSpec, Element, ElementType, Sampling};
use ndarray::{Array2, ArrayView2};

use crate::encoder::Lattice;

/// How a key is turned into a destination row.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupMode {
    /// Flattened keys are exactly `0..len`; the flattened key is the row.
    Direct {
        /// Key lattice
        lattice: Lattice,
        /// Number of declared destination rows
        len: usize,
    },
    /// Indirection table over the whole bounding box; slot 0 means unmapped.
    Indexed {
        /// Key lattice
        lattice: Lattice,
        /// `volume` slots holding destination rows
        table: Vec<u32>,
    },
    /// Brute-force nearest key by squared Euclidean distance.
    Nearest {
        /// Raw keys in declaration order
        keys: Array2<f64>,
    },
}

/// Lookup mode marker for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupKind {
    /// See [`LookupMode::Direct`].
    Direct,
    /// See [`LookupMode::Indexed`].
    Indexed,
    /// See [`LookupMode::Nearest`].
    Nearest,
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Direct => "direct",
            Self::Indexed => "indexed",
            Self::Nearest => "nearest",
        })
    }
}

impl LookupMode {
    /// Mode marker.
    pub fn kind(&self) -> LookupKind {
        match self {
            Self::Direct { .. } => LookupKind::Direct,
            Self::Indexed { .. } => LookupKind::Indexed,
            Self::Nearest { .. } => LookupKind::Nearest,
        }
    }

    /// Key lattice, `None` in nearest mode.
    pub fn lattice(&self) -> Option<&Lattice> {
        match self {
            Self::Direct { lattice, .. } | Self::Indexed { lattice, .. } => Some(lattice),
            Self::Nearest { .. } => None,
        }
    }

    /// Destination row for one key; 0 selects the default.
    #[inline]
    pub(crate) fn slot(&self, key: &[f64]) -> usize {
        match self {
            Self::Direct { lattice, len } => match lattice.locate(key) {
                Some(i) if i < *len => i + 1,
                _ => 0,
            },
            Self::Indexed { lattice, table } => {
                lattice.locate(key).map_or(0, |i| table[i] as usize)
            }
            Self::Nearest { keys } => {
                let mut best = 0;
                let mut best_dist = f64::INFINITY;
                for (i, row) in keys.outer_iter().enumerate() {
                    let dist: f64 = row
                        .iter()
                        .zip(key)
                        .map(|(&a, &b)| (a - b) * (a - b))
                        .sum();
                    // strict comparison keeps the first-listed key on ties
                    if dist < best_dist {
                        best = i;
                        best_dist = dist;
                    }
                }
                best + 1
            }
        }
    }
}

/// Immutable, reusable lookup transform from `S` keys to `D` values.
#[derive(Clone)]
pub struct CompiledTransform<S: Element, D: Element> {
    pub(crate) quantized: Option<Array2<i64>>,
    pub(crate) mode: LookupMode,
    pub(crate) dests: Array2<D>,
    pub(crate) source_shape: Vec<usize>,
    pub(crate) dest_shape: Vec<usize>,
    pub(crate) scalar_source: bool,
    pub(crate) axis: AxisSpec,
    pub(crate) sampling: Sampling,
    pub(crate) keep_dims: bool,
    pub(crate) _source: PhantomData<fn() -> S>,
}

impl<S: Element, D: Element> CompiledTransform<S, D> {
    /// Quantized keys in declaration order (`None` in nearest mode).
    #[inline]
    pub fn quantized_keys(&self) -> Option<ArrayView2<'_, i64>> {
        self.quantized.as_ref().map(|q| q.view())
    }

    /// Lookup mode with its tables.
    #[inline]
    pub fn mode(&self) -> &LookupMode {
        &self.mode
    }

    /// Lookup mode marker.
    #[inline]
    pub fn kind(&self) -> LookupKind {
        self.mode.kind()
    }

    /// Per-element minimum of the key lattice.
    pub fn mins(&self) -> Option<&[i64]> {
        self.mode.lattice().map(Lattice::mins)
    }

    /// Per-element maximum of the key lattice.
    pub fn maxs(&self) -> Option<&[i64]> {
        self.mode.lattice().map(Lattice::maxs)
    }

    /// Row-major stride of the key lattice.
    pub fn stride(&self) -> Option<&[usize]> {
        self.mode.lattice().map(Lattice::stride)
    }

    /// Indirection table (indexed mode only).
    pub fn table(&self) -> Option<&[u32]> {
        match &self.mode {
            LookupMode::Indexed { table, .. } => Some(table),
            _ => None,
        }
    }

    /// Destination table, one flattened value per row, default at row 0.
    #[inline]
    pub fn destinations(&self) -> ArrayView2<'_, D> {
        self.dests.view()
    }

    /// Default destination value (row 0).
    pub fn default_value(&self) -> Vec<D> {
        self.dests.row(0).to_vec()
    }

    /// Number of declared entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.dests.nrows() - 1
    }

    /// Always `false`: empty specifications are rejected when building.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Effective sampling: [`Sampling::Fixed`] with one step per key
    /// element, or [`Sampling::Nearest`].
    #[inline]
    pub fn sampling(&self) -> &Sampling {
        &self.sampling
    }

    /// Source element type.
    #[inline]
    pub fn source_type(&self) -> ElementType {
        S::TYPE
    }

    /// Key shape, `(1,)` for scalar keys.
    #[inline]
    pub fn source_shape(&self) -> &[usize] {
        &self.source_shape
    }

    /// Destination shape, `(1,)` for scalar values.
    #[inline]
    pub fn dest_shape(&self) -> &[usize] {
        &self.dest_shape
    }

    /// Whether keys were declared as scalars.
    #[inline]
    pub fn has_scalar_keys(&self) -> bool {
        self.scalar_source
    }

    /// Key axes used by [`apply`](Self::apply).
    #[inline]
    pub fn axis(&self) -> &AxisSpec {
        &self.axis
    }

    /// Whether a singleton destination dimension is kept.
    #[inline]
    pub fn keep_dims(&self) -> bool {
        self.keep_dims
    }

    /// Same tables, different key axes.
    pub fn with_axis(mut self, axis: impl Into<AxisSpec>) -> Self {
        self.axis = axis.into();
        self
    }

    /// Same tables, different squeeze policy.
    pub fn with_keep_dims(mut self, keep_dims: bool) -> Self {
        self.keep_dims = keep_dims;
        self
    }

    /// Number of elements in one key.
    #[inline]
    pub(crate) fn key_len(&self) -> usize {
        self.source_shape.iter().product()
    }
}

impl<S: Element, D: Element> fmt::Debug for CompiledTransform<S, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledTransform")
            .field("kind", &self.kind())
            .field("source_type", &S::TYPE)
            .field("dest_type", &D::TYPE)
            .field("source_shape", &self.source_shape)
            .field("dest_shape", &self.dest_shape)
            .field("entries", &self.len())
            .field("sampling", &self.sampling)
            .field("axis", &self.axis)
            .field("keep_dims", &self.keep_dims)
            .finish()
    }
}
