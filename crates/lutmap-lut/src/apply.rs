//! LUT applicator.
//!
//! Maps every payload position of an array through a compiled transform:
//!
//! 1. Align: resolve the key axes and check their extents against the
//!    transform's source shape.
//! 2. Gather: permute payload axes first and key axes last, read one key
//!    per payload position.
//! 3. Look up: one destination row per key (default, table, or nearest).
//! 4. Scatter: write rows as `payload_shape + dest_shape`, then move the
//!    destination axes to where the key axes were.
//!
//! Lookups are independent per payload position; with the `parallel`
//! feature they run on the rayon pool.

use lutmap_core::{move_axes_order, AxisSpec, Element, Error, MapSpec, Result};
use ndarray::{ArrayD, ArrayViewD, AsArray, Axis, Dimension, IxDyn};
use tracing::trace;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::builder::{build_transform, BuildOptions};
use crate::transform::CompiledTransform;

impl<S: Element, D: Element> CompiledTransform<S, D> {
    /// Applies the transform to `array`.
    ///
    /// Accepts any array or view of `S` elements. The input is never
    /// modified; the output is a new standard-layout array of `D` elements.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidAxisSpec`] if the key axes don't exist in `array`
    /// - [`Error::ShapeMismatch`] if their extents differ from
    ///   [`source_shape`](Self::source_shape)
    ///
    /// # Example
    ///
    /// ```rust
    /// use lutmap_core::MapSpec;
    /// use lutmap_lut::{build_transform, BuildOptions};
    /// use ndarray::array;
    ///
    /// let spec = MapSpec::from_pairs([(1, 10), (2, 20)]);
    /// let lut = build_transform::<u8, u8>(&spec, &BuildOptions::new().keep_dims(false)).unwrap();
    /// let out = lut.apply(&array![[1u8, 2], [3, 1]]).unwrap();
    /// assert_eq!(out, array![[10u8, 20], [0, 10]].into_dyn());
    /// ```
    pub fn apply<'a, V, Dm>(&self, array: V) -> Result<ArrayD<D>>
    where
        V: AsArray<'a, S, Dm>,
        Dm: Dimension,
        S: 'a,
    {
        let view: ArrayViewD<'a, S> = array.into().into_dyn();
        let (view, axes) = self.align(view)?;

        let ndim = view.ndim();
        let payload_axes: Vec<usize> = (0..ndim).filter(|a| !axes.contains(a)).collect();
        let payload_shape: Vec<usize> = payload_axes.iter().map(|&a| view.shape()[a]).collect();
        let order: Vec<usize> = payload_axes.iter().chain(&axes).copied().collect();

        let keyed = view.permuted_axes(order.as_slice());
        let keys: Vec<f64> = keyed.iter().map(|v| v.to_f64()).collect();

        let key_len = self.key_len();
        let slots = self.lookup_slots(&keys, key_len);
        trace!(
            positions = slots.len(),
            key_len,
            payload = ?payload_shape,
            "applying lookup transform"
        );
        let values = self.gather(&slots);

        let mut out_shape = payload_shape.clone();
        out_shape.extend_from_slice(&self.dest_shape);
        let out = ArrayD::from_shape_vec(IxDyn(&out_shape), values).map_err(|e| Error::array(e.to_string()))?;

        let payload_rank = payload_shape.len();
        let dest_rank = self.dest_shape.len();
        let moved: Vec<usize> = (payload_rank..payload_rank + dest_rank).collect();
        let targets: Vec<usize> = if dest_rank == axes.len() {
            axes.clone()
        } else {
            let start = axes.iter().copied().min().unwrap_or(0);
            (start..start + dest_rank).collect()
        };
        let order = move_axes_order(out.ndim(), &moved, &targets);
        let mut out = out.permuted_axes(order.as_slice());

        if !self.keep_dims && self.dest_shape == [1] {
            out = out.remove_axis(Axis(targets[0]));
        }

        Ok(out.as_standard_layout().into_owned())
    }

    /// Resolves key axes and validates their extents.
    fn align<'a>(&self, view: ArrayViewD<'a, S>) -> Result<(ArrayViewD<'a, S>, Vec<usize>)> {
        let (view, axes) = if self.scalar_source && self.axis == AxisSpec::Leading {
            (view.insert_axis(Axis(0)), vec![0])
        } else {
            let axes = self.axis.resolve(view.ndim(), self.source_shape.len())?;
            (view, axes)
        };

        let found: Vec<usize> = axes.iter().map(|&a| view.shape()[a]).collect();
        if found != self.source_shape {
            return Err(Error::shape_mismatch(axes, &self.source_shape, found));
        }
        Ok((view, axes))
    }

    /// Destination row index of every key in `keys` (row-major, `key_len`
    /// elements per key).
    #[cfg(feature = "parallel")]
    fn lookup_slots(&self, keys: &[f64], key_len: usize) -> Vec<usize> {
        keys.par_chunks(key_len).map(|key| self.mode.slot(key)).collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn lookup_slots(&self, keys: &[f64], key_len: usize) -> Vec<usize> {
        keys.chunks(key_len).map(|key| self.mode.slot(key)).collect()
    }

    /// Copies destination rows for every slot.
    #[cfg(feature = "parallel")]
    fn gather(&self, slots: &[usize]) -> Vec<D> {
        let width = self.dests.ncols();
        let mut out = vec![D::default(); slots.len() * width];
        out.par_chunks_mut(width)
            .zip(slots.par_iter())
            .for_each(|(row, &slot)| {
                for (o, &v) in row.iter_mut().zip(self.dests.row(slot)) {
                    *o = v;
                }
            });
        out
    }

    #[cfg(not(feature = "parallel"))]
    fn gather(&self, slots: &[usize]) -> Vec<D> {
        let width = self.dests.ncols();
        let mut out = Vec::with_capacity(slots.len() * width);
        for &slot in slots {
            out.extend(self.dests.row(slot).iter().copied());
        }
        out
    }
}

/// Where [`apply`] gets its transform from.
pub enum LutSource<'t, S: Element, D: Element> {
    /// Build from a specification, apply once, discard.
    Spec(&'t MapSpec),
    /// Reuse a compiled transform.
    Transform(&'t CompiledTransform<S, D>),
}

impl<'t, S: Element, D: Element> From<&'t MapSpec> for LutSource<'t, S, D> {
    fn from(spec: &'t MapSpec) -> Self {
        Self::Spec(spec)
    }
}

impl<'t, S: Element, D: Element> From<&'t CompiledTransform<S, D>> for LutSource<'t, S, D> {
    fn from(transform: &'t CompiledTransform<S, D>) -> Self {
        Self::Transform(transform)
    }
}

/// Applies a specification or a compiled transform to `array`.
///
/// With a raw specification the transform is built with `options`, applied
/// once and dropped. With a compiled transform `options` are ignored.
///
/// ```rust
/// use lutmap_core::MapSpec;
/// use lutmap_lut::{apply, BuildOptions};
/// use ndarray::array;
///
/// let spec = MapSpec::from_pairs([(1, 5)]);
/// let out = apply::<u8, u8, _, _>(&spec, &array![1u8, 2], &BuildOptions::new()).unwrap();
/// assert_eq!(out.shape(), &[1, 2]);
/// ```
pub fn apply<'t, 'a, S, D, V, Dm>(
    source: impl Into<LutSource<'t, S, D>>,
    array: V,
    options: &BuildOptions,
) -> Result<ArrayD<D>>
where
    S: Element + 'a,
    D: Element,
    V: AsArray<'a, S, Dm>,
    Dm: Dimension,
{
    match source.into() {
        LutSource::Spec(spec) => build_transform::<S, D>(spec, options)?.apply(array),
        LutSource::Transform(transform) => transform.apply(array),
    }
}
