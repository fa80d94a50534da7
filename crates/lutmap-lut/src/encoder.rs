//! Quantizing key encoder.
//!
//! Turns a set of same-shaped numeric keys into points of an integer
//! lattice. Each key element is divided by its sampling step and truncated;
//! the per-element bounding box of the quantized keys then defines a dense
//! row-major grid, and every lattice point flattens to a single index:
//!
//! ```text
//! extents  = maxs - mins + 1
//! stride   = [e1*e2*...*ek, ..., ek, 1]
//! index    = sum((coord - mins) * stride)
//! ```
//!
//! With [`Sampling::Nearest`] no lattice is built and the raw keys are kept
//! for distance matching.

use lutmap_core::{checked_volume, ElementType, Error, Result, Sampling, NORMALIZED_STEP};
use ndarray::{Array2, ArrayView2, Axis};
use tracing::debug;

/// Truncating quantization of one key element.
#[inline]
pub(crate) fn quantize_value(v: f64, step: f64) -> i64 {
    if step == 1.0 {
        v.trunc() as i64
    } else {
        (v / step).trunc() as i64
    }
}

/// Integer lattice spanned by the quantized keys.
///
/// The lattice is computed once when a transform is built and reused for
/// every array it is applied to.
#[derive(Debug, Clone, PartialEq)]
pub struct Lattice {
    sampling: Vec<f64>,
    mins: Vec<i64>,
    maxs: Vec<i64>,
    stride: Vec<usize>,
    volume: usize,
}

impl Lattice {
    /// Builds the lattice bounding `coords` (one quantized key per row).
    ///
    /// # Errors
    ///
    /// [`Error::LatticeOverflow`] if the bounding-box volume doesn't fit in
    /// `usize`; [`Error::InvalidMapSpec`] if there are no keys.
    pub fn from_coords(coords: ArrayView2<'_, i64>, sampling: Vec<f64>) -> Result<Self> {
        if coords.nrows() == 0 || coords.ncols() == 0 {
            return Err(Error::invalid_map_spec("no keys to encode"));
        }

        let mut mins = Vec::with_capacity(coords.ncols());
        let mut maxs = Vec::with_capacity(coords.ncols());
        for column in coords.axis_iter(Axis(1)) {
            mins.push(column.iter().copied().fold(i64::MAX, i64::min));
            maxs.push(column.iter().copied().fold(i64::MIN, i64::max));
        }

        let wide: Vec<u64> = mins
            .iter()
            .zip(&maxs)
            .map(|(&lo, &hi)| u64::try_from(hi as i128 - lo as i128 + 1).unwrap_or(u64::MAX))
            .collect();
        let overflow = || Error::LatticeOverflow {
            extents: wide.clone(),
        };

        let extents = wide
            .iter()
            .map(|&e| usize::try_from(e).map_err(|_| overflow()))
            .collect::<Result<Vec<usize>>>()?;

        let k = extents.len();
        let mut stride = vec![1usize; k];
        for d in (0..k - 1).rev() {
            stride[d] = stride[d + 1]
                .checked_mul(extents[d + 1])
                .ok_or_else(overflow)?;
        }
        let volume = checked_volume(&extents).ok_or_else(overflow)?;

        Ok(Self {
            sampling,
            mins,
            maxs,
            stride,
            volume,
        })
    }

    /// Sampling step per key element.
    #[inline]
    pub fn sampling(&self) -> &[f64] {
        &self.sampling
    }

    /// Per-element minimum of the quantized keys.
    #[inline]
    pub fn mins(&self) -> &[i64] {
        &self.mins
    }

    /// Per-element maximum of the quantized keys.
    #[inline]
    pub fn maxs(&self) -> &[i64] {
        &self.maxs
    }

    /// Row-major stride per key element.
    #[inline]
    pub fn stride(&self) -> &[usize] {
        &self.stride
    }

    /// Number of lattice points in the bounding box.
    #[inline]
    pub fn volume(&self) -> usize {
        self.volume
    }

    /// Quantizes and flattens a raw key, `None` outside the box.
    pub fn locate(&self, key: &[f64]) -> Option<usize> {
        let mut index = 0usize;
        for (d, &v) in key.iter().enumerate() {
            let q = quantize_value(v, self.sampling[d]);
            if q < self.mins[d] || q > self.maxs[d] {
                return None;
            }
            index += (q - self.mins[d]) as usize * self.stride[d];
        }
        Some(index)
    }
}

/// Output of [`encode`].
#[derive(Debug, Clone)]
pub enum EncodedKeys {
    /// Keys placed on an integer lattice.
    Lattice {
        /// Quantized keys, one row per specification entry
        coords: Array2<i64>,
        /// Flattened index of each row
        flat: Vec<usize>,
        /// Bounding lattice
        lattice: Lattice,
    },
    /// Unquantized keys for nearest-neighbor matching.
    Raw(Array2<f64>),
}

/// Resolves the sampling step of every key element.
///
/// Returns `None` for [`Sampling::Nearest`].
pub fn effective_sampling(
    sampling: &Sampling,
    keys: ArrayView2<'_, f64>,
    dtype: ElementType,
) -> Result<Option<Vec<f64>>> {
    let k = keys.ncols();
    let steps = match sampling {
        Sampling::Nearest => return Ok(None),
        Sampling::Fixed(steps) => Sampling::expand_fixed(steps, k)?,
        Sampling::Auto => {
            let normalized = dtype.is_float() && keys.iter().all(|&v| (0.0..=1.0).contains(&v));
            vec![if normalized { NORMALIZED_STEP } else { 1.0 }; k]
        }
        Sampling::Gcd => keys
            .axis_iter(Axis(1))
            .map(|column| {
                let g = column
                    .iter()
                    .map(|v| v.round().abs() as u64)
                    .fold(0, gcd);
                if g == 0 { 1.0 } else { 1.0 / (2.0 * g as f64) }
            })
            .collect(),
    };
    Ok(Some(steps))
}

/// Encodes keys (one per row) for the given sampling mode.
///
/// `dtype` is the source element type; it drives the automatic step choice.
pub fn encode(keys: ArrayView2<'_, f64>, sampling: &Sampling, dtype: ElementType) -> Result<EncodedKeys> {
    let Some(steps) = effective_sampling(sampling, keys, dtype)? else {
        debug!(keys = keys.nrows(), "nearest sampling, keeping raw keys");
        return Ok(EncodedKeys::Raw(keys.to_owned()));
    };

    let mut coords = Array2::<i64>::zeros(keys.raw_dim());
    for (mut out, key) in coords.outer_iter_mut().zip(keys.outer_iter()) {
        for ((q, &v), &step) in out.iter_mut().zip(key.iter()).zip(&steps) {
            *q = quantize_value(v, step);
        }
    }

    let lattice = Lattice::from_coords(coords.view(), steps)?;
    let flat = coords
        .outer_iter()
        .map(|row| {
            row.iter()
                .zip(lattice.mins())
                .zip(lattice.stride())
                .map(|((&q, &lo), &s)| (q - lo) as usize * s)
                .sum()
        })
        .collect();

    debug!(
        keys = keys.nrows(),
        sampling = ?lattice.sampling(),
        volume = lattice.volume(),
        "encoded keys onto lattice"
    );

    Ok(EncodedKeys::Lattice {
        coords,
        flat,
        lattice,
    })
}

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 { a } else { gcd(b, a % b) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn lattice_of(keys: Array2<f64>, sampling: &Sampling, dtype: ElementType) -> (Array2<i64>, Vec<usize>, Lattice) {
        match encode(keys.view(), sampling, dtype).unwrap() {
            EncodedKeys::Lattice { coords, flat, lattice } => (coords, flat, lattice),
            EncodedKeys::Raw(_) => panic!("expected lattice"),
        }
    }

    #[test]
    fn test_row_major_stride() {
        let keys = array![[0.0, 0.0, 0.0], [1.0, 2.0, 3.0]];
        let (_, flat, lattice) = lattice_of(keys, &Sampling::Auto, ElementType::U8);
        // extents [2, 3, 4]
        assert_eq!(lattice.stride(), &[12, 4, 1]);
        assert_eq!(lattice.volume(), 24);
        assert_eq!(flat, vec![0, 23]);
    }

    #[test]
    fn test_mins_offset() {
        let keys = array![[10.0, 5.0], [12.0, 7.0], [11.0, 5.0]];
        let (_, flat, lattice) = lattice_of(keys, &Sampling::Auto, ElementType::I32);
        assert_eq!(lattice.mins(), &[10, 5]);
        assert_eq!(lattice.maxs(), &[12, 7]);
        assert_eq!(flat, vec![0, 8, 3]);
        assert_eq!(lattice.locate(&[12.0, 6.0]), Some(7));
        assert_eq!(lattice.locate(&[13.0, 6.0]), None);
        assert_eq!(lattice.locate(&[9.0, 6.0]), None);
    }

    #[test]
    fn test_auto_sampling_normalized_floats() {
        let keys = array![[0.0, 1.0], [0.5, 0.2]];
        let steps = effective_sampling(&Sampling::Auto, keys.view(), ElementType::F32)
            .unwrap()
            .unwrap();
        assert_relative_eq!(steps[0], 1.0 / 255.0);

        // integers never get the normalized step
        let steps = effective_sampling(&Sampling::Auto, keys.view(), ElementType::U8)
            .unwrap()
            .unwrap();
        assert_eq!(steps, vec![1.0, 1.0]);

        // floats outside [0, 1]
        let keys = array![[0.0, 2.0]];
        let steps = effective_sampling(&Sampling::Auto, keys.view(), ElementType::F64)
            .unwrap()
            .unwrap();
        assert_eq!(steps, vec![1.0, 1.0]);
    }

    #[test]
    fn test_gcd_sampling() {
        let keys = array![[10.0, 0.0], [20.0, 0.0], [30.0, 0.0]];
        let steps = effective_sampling(&Sampling::Gcd, keys.view(), ElementType::I32)
            .unwrap()
            .unwrap();
        assert_relative_eq!(steps[0], 1.0 / 20.0);
        assert_eq!(steps[1], 1.0);
    }

    #[test]
    fn test_fixed_sampling() {
        let keys = array![[0.0, 4.0], [9.0, 8.0]];
        let (coords, _, lattice) = lattice_of(keys, &Sampling::per_dimension(vec![3.0, 4.0]), ElementType::F32);
        assert_eq!(coords, array![[0, 1], [3, 2]]);
        assert_eq!(lattice.sampling(), &[3.0, 4.0]);
    }

    #[test]
    fn test_nearest_keeps_raw() {
        let keys = array![[0.25, 0.75]];
        match encode(keys.view(), &Sampling::Nearest, ElementType::F32).unwrap() {
            EncodedKeys::Raw(raw) => assert_eq!(raw, keys),
            EncodedKeys::Lattice { .. } => panic!("expected raw keys"),
        }
    }

    #[test]
    fn test_overflow_detected() {
        let keys = array![[0.0, 0.0, 0.0], [4e18, 4e18, 4e18]];
        let err = encode(keys.view(), &Sampling::fixed(1.0), ElementType::I64).unwrap_err();
        assert!(matches!(err, Error::LatticeOverflow { .. }));
    }
}
