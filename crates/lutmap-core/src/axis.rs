//! Key axis selection and axis permutation helpers.
//!
//! A transform consumes some axes of the input array as the key (for example
//! the channel axis of an `H x W x 3` image) and maps every position of the
//! remaining "payload" axes independently. [`AxisSpec`] names the key axes;
//! negative indices count from the end, as in `-1` for the last axis.

use crate::{Error, Result};

/// Which array axes form the key, in key order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum AxisSpec {
    /// The leading axes, as many as the rank of the key shape.
    #[default]
    Leading,
    /// Explicit axes; negative values count from the last axis.
    Axes(Vec<isize>),
}

impl AxisSpec {
    /// Resolves to absolute axis indices for an array of rank `ndim`.
    ///
    /// `key_rank` is only used by [`AxisSpec::Leading`].
    ///
    /// # Errors
    ///
    /// [`Error::InvalidAxisSpec`] for an empty list, an axis outside
    /// `-ndim..ndim`, or a repeated axis.
    pub fn resolve(&self, ndim: usize, key_rank: usize) -> Result<Vec<usize>> {
        match self {
            Self::Leading => Ok((0..key_rank.min(ndim)).collect()),
            Self::Axes(axes) => {
                if axes.is_empty() {
                    return Err(Error::invalid_axis_spec("axis list is empty"));
                }
                let mut out = Vec::with_capacity(axes.len());
                for &axis in axes {
                    let a = normalize_axis(axis, ndim)?;
                    if out.contains(&a) {
                        return Err(Error::invalid_axis_spec(format!(
                            "axis {axis} is repeated in {axes:?}"
                        )));
                    }
                    out.push(a);
                }
                Ok(out)
            }
        }
    }
}

impl From<isize> for AxisSpec {
    fn from(axis: isize) -> Self {
        Self::Axes(vec![axis])
    }
}

impl From<i32> for AxisSpec {
    fn from(axis: i32) -> Self {
        Self::Axes(vec![axis as isize])
    }
}

impl From<Vec<isize>> for AxisSpec {
    fn from(axes: Vec<isize>) -> Self {
        Self::Axes(axes)
    }
}

impl From<&[isize]> for AxisSpec {
    fn from(axes: &[isize]) -> Self {
        Self::Axes(axes.to_vec())
    }
}

/// Maps a possibly negative axis onto `0..ndim`.
pub fn normalize_axis(axis: isize, ndim: usize) -> Result<usize> {
    let n = ndim as isize;
    let a = if axis < 0 { axis + n } else { axis };
    if a < 0 || a >= n {
        return Err(Error::invalid_axis_spec(format!(
            "axis {axis} is out of range for an array of rank {ndim}"
        )));
    }
    Ok(a as usize)
}

/// Computes the permutation that moves axes `source[i]` to `destination[i]`,
/// keeping the other axes in their original relative order.
///
/// The returned order is suitable for `permuted_axes`: output axis `k` is
/// input axis `order[k]`. Both slices must hold distinct in-range axes of the
/// same length.
pub fn move_axes_order(ndim: usize, source: &[usize], destination: &[usize]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..ndim).filter(|a| !source.contains(a)).collect();
    let mut moves: Vec<(usize, usize)> = destination
        .iter()
        .copied()
        .zip(source.iter().copied())
        .collect();
    moves.sort_unstable();
    for (dst, src) in moves {
        order.insert(dst, src);
    }
    order
}

/// Product of `extents`, `None` on overflow.
pub fn checked_volume(extents: &[usize]) -> Option<usize> {
    extents.iter().try_fold(1usize, |acc, &e| acc.checked_mul(e))
}
