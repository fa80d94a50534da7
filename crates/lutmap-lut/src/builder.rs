//! LUT builder: compiles a [`MapSpec`] into a [`CompiledTransform`].
//!
//! # Procedure
//!
//! 1. Resolve color tokens and check that all keys share one shape and all
//!    values share one shape. Scalars become shape `(1,)`.
//! 2. Cast keys through the source element type and encode them
//!    ([`encoder::encode`](crate::encoder::encode)).
//! 3. Stable-sort keys by flattened index. Equal indices keep declaration
//!    order, so the later entry ends up owning the cell.
//! 4. Pick the mode: [`Direct`](LookupMode::Direct) when the sorted indices
//!    are exactly `0..n`, [`Indexed`](LookupMode::Indexed) otherwise,
//!    [`Nearest`](LookupMode::Nearest) for nearest sampling.

use std::marker::PhantomData;

use lutmap_color::{ChannelOrder, ColorEncoding};
use lutmap_core::{AxisSpec, Element, Error, MapSpec, MapValue, Result, Sampling, Tensor, MAX_EXACT_INTEGER};
use ndarray::Array2;
use tracing::{debug, warn};

use crate::encoder::{self, EncodedKeys, Lattice};
use crate::transform::{CompiledTransform, LookupMode};

/// Default cap on the indirection table, in slots (1 GiB of `u32`).
pub const DEFAULT_MAX_TABLE_LEN: usize = 1 << 28;

/// Parameters of [`build_transform`].
///
/// ```rust
/// use lutmap_lut::BuildOptions;
/// use lutmap_core::Sampling;
///
/// let options = BuildOptions::new()
///     .with_axis(-1)
///     .with_sampling(Sampling::Nearest)
///     .with_default(0)
///     .keep_dims(false);
/// assert!(!options.keep_dims);
/// ```
#[derive(Debug, Clone, PartialEq, Hash)]
pub struct BuildOptions {
    /// Key axes of the arrays the transform is applied to.
    pub axis: AxisSpec,
    /// Quantization mode.
    pub sampling: Sampling,
    /// Value for unmapped keys; zeros of the destination shape when `None`.
    pub default: Option<MapValue>,
    /// Keep a singleton destination dimension in the output.
    pub keep_dims: bool,
    /// Channel order of color tokens.
    pub channel_order: ChannelOrder,
    /// Largest indirection table an Indexed build may allocate.
    pub max_table_len: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            axis: AxisSpec::Leading,
            sampling: Sampling::Auto,
            default: None,
            keep_dims: true,
            channel_order: ChannelOrder::Bgr,
            max_table_len: DEFAULT_MAX_TABLE_LEN,
        }
    }
}

impl BuildOptions {
    /// Default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the key axes.
    pub fn with_axis(mut self, axis: impl Into<AxisSpec>) -> Self {
        self.axis = axis.into();
        self
    }

    /// Sets the sampling mode.
    pub fn with_sampling(mut self, sampling: Sampling) -> Self {
        self.sampling = sampling;
        self
    }

    /// Sets the default value.
    pub fn with_default(mut self, default: impl Into<MapValue>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Sets the squeeze policy.
    pub fn keep_dims(mut self, keep_dims: bool) -> Self {
        self.keep_dims = keep_dims;
        self
    }

    /// Sets the channel order of color tokens.
    pub fn with_channel_order(mut self, order: ChannelOrder) -> Self {
        self.channel_order = order;
        self
    }

    /// Sets the slot limit of the indirection table.
    ///
    /// Sparse keys that are far apart span a huge bounding box; past this
    /// limit the build fails with [`Error::TableTooLarge`] instead of
    /// allocating. Nearest sampling needs no table.
    pub fn with_max_table_len(mut self, slots: usize) -> Self {
        self.max_table_len = slots;
        self
    }
}

fn encoding_for<T: Element>() -> ColorEncoding {
    if T::TYPE.is_float() {
        ColorEncoding::Normalized
    } else {
        ColorEncoding::Uint8
    }
}

fn resolve_value(value: &MapValue, encoding: ColorEncoding, order: ChannelOrder) -> Result<Tensor> {
    value.resolve_with(&mut |token: &str| {
        lutmap_color::resolve(token, encoding, order).map(|c| c.iter().map(|&v| v as f64).collect::<Vec<f64>>())
    })
}

/// Resolved column of keys or values sharing one shape.
struct Column {
    shape: Vec<usize>,
    scalar: bool,
    data: Vec<f64>,
}

impl Column {
    fn collect<'a>(
        values: impl Iterator<Item = &'a MapValue>,
        encoding: ColorEncoding,
        order: ChannelOrder,
        what: &str,
    ) -> Result<Self> {
        let mut shape: Option<Vec<usize>> = None;
        let mut data = Vec::new();
        for (i, value) in values.enumerate() {
            let t = resolve_value(value, encoding, order)?;
            match &shape {
                None => shape = Some(t.shape),
                Some(s) if *s != t.shape => {
                    return Err(Error::invalid_map_spec(format!(
                        "{what} #{i} has shape {:?}, expected {s:?}",
                        t.shape
                    )));
                }
                Some(_) => {}
            }
            data.extend(t.data);
        }
        let shape = shape.ok_or_else(|| Error::invalid_map_spec("map specification is empty"))?;
        let scalar = shape.is_empty();
        let shape = if scalar { vec![1] } else { shape };
        if shape.iter().any(|&e| e == 0) {
            return Err(Error::invalid_map_spec(format!("{what}s have empty shape {shape:?}")));
        }
        Ok(Self { shape, scalar, data })
    }

    fn width(&self) -> usize {
        self.shape.iter().product()
    }
}

/// Compiles `spec` into a reusable transform.
///
/// `S` is the element type of keys and of the arrays the transform applies
/// to; `D` is the element type of the output.
///
/// # Errors
///
/// - [`Error::InvalidMapSpec`] for an empty specification, inconsistent
///   shapes, or a default value of the wrong shape
/// - [`Error::InvalidColorCode`] for unresolvable tokens
/// - [`Error::InvalidSamplingMode`] for bad fixed steps
/// - [`Error::LatticeOverflow`] when the key bounding box can't be indexed
/// - [`Error::TableTooLarge`] when sparse keys need a table past
///   [`BuildOptions::max_table_len`] or the allocation fails
///
/// Keys are quantized from `f64`, so `i64` keys are exact only up to
/// [`MAX_EXACT_INTEGER`]; larger neighbors may share a cell.
///
/// # Example
///
/// ```rust
/// use lutmap_core::MapSpec;
/// use lutmap_lut::{build_transform, BuildOptions, LookupKind};
///
/// let spec = MapSpec::from_pairs([(0, 10), (1, 20), (2, 30)]);
/// let lut = build_transform::<u8, u8>(&spec, &BuildOptions::new()).unwrap();
/// assert_eq!(lut.kind(), LookupKind::Direct);
/// ```
pub fn build_transform<S: Element, D: Element>(
    spec: &MapSpec,
    options: &BuildOptions,
) -> Result<CompiledTransform<S, D>> {
    if spec.is_empty() {
        return Err(Error::invalid_map_spec("map specification is empty"));
    }
    let order = options.channel_order;
    let keys = Column::collect(spec.iter().map(|(k, _)| k), encoding_for::<S>(), order, "key")?;
    let values = Column::collect(spec.iter().map(|(_, v)| v), encoding_for::<D>(), order, "value")?;

    let n = spec.len();
    if u32::try_from(n).is_err() {
        return Err(Error::invalid_map_spec(format!("{n} entries exceed the table range")));
    }
    let key_len = keys.width();
    let width = values.width();

    let key_data: Vec<f64> = keys.data.iter().map(|&v| S::from_f64(v).to_f64()).collect();
    if S::TYPE.is_integer() && key_data.iter().any(|v| v.abs() > MAX_EXACT_INTEGER) {
        warn!(dtype = %S::TYPE, "integer keys beyond 2^53 are not exact and may share a cell");
    }
    let key_rows = Array2::from_shape_vec((n, key_len), key_data).map_err(|e| Error::array(e.to_string()))?;
    let value_rows: Vec<D> = values.data.iter().map(|&v| D::from_f64(v)).collect();
    let default_row = default_row::<D>(options.default.as_ref(), &values, order)?;

    let encoded = encoder::encode(key_rows.view(), &options.sampling, S::TYPE)?;

    let (quantized, mode, row_order, sampling) = match encoded {
        EncodedKeys::Raw(raw) => {
            debug!(entries = n, "built nearest-neighbor transform");
            (None, LookupMode::Nearest { keys: raw }, (0..n).collect::<Vec<_>>(), Sampling::Nearest)
        }
        EncodedKeys::Lattice { coords, flat, lattice } => {
            let mut sorted: Vec<usize> = (0..n).collect();
            sorted.sort_by_key(|&i| flat[i]);
            let dense = sorted.iter().enumerate().all(|(i, &row)| flat[row] == i);
            let sampling = Sampling::Fixed(lattice.sampling().to_vec());
            let mode = if dense {
                debug!(entries = n, "built direct transform");
                LookupMode::Direct { lattice, len: n }
            } else {
                let mut table = alloc_table(&lattice, options.max_table_len)?;
                for (i, &row) in sorted.iter().enumerate() {
                    table[flat[row]] = i as u32 + 1;
                }
                debug!(entries = n, volume = table.len(), "built indexed transform");
                LookupMode::Indexed { lattice, table }
            };
            (Some(coords), mode, sorted, sampling)
        }
    };

    let mut dests = Vec::with_capacity((n + 1) * width);
    dests.extend_from_slice(&default_row);
    for &row in &row_order {
        dests.extend_from_slice(&value_rows[row * width..(row + 1) * width]);
    }
    let dests = Array2::from_shape_vec((n + 1, width), dests).map_err(|e| Error::array(e.to_string()))?;

    Ok(CompiledTransform {
        quantized,
        mode,
        dests,
        source_shape: keys.shape,
        dest_shape: values.shape,
        scalar_source: keys.scalar,
        axis: options.axis.clone(),
        sampling,
        keep_dims: options.keep_dims,
        _source: PhantomData,
    })
}

/// Zero-filled indirection table covering the lattice volume.
fn alloc_table(lattice: &Lattice, limit: usize) -> Result<Vec<u32>> {
    let slots = lattice.volume();
    if slots > limit {
        return Err(Error::table_too_large(slots, limit));
    }
    let mut table = Vec::new();
    table
        .try_reserve_exact(slots)
        .map_err(|_| Error::table_too_large(slots, limit))?;
    table.resize(slots, 0);
    Ok(table)
}

fn default_row<D: Element>(default: Option<&MapValue>, values: &Column, order: ChannelOrder) -> Result<Vec<D>> {
    let width = values.width();
    let Some(default) = default else {
        return Ok(vec![D::zero(); width]);
    };
    let t = resolve_value(default, encoding_for::<D>(), order)?;
    if t.is_scalar() {
        return Ok(vec![D::from_f64(t.data[0]); width]);
    }
    if t.shape != values.shape {
        return Err(Error::invalid_map_spec(format!(
            "default has shape {:?}, values have {:?}",
            t.shape, values.shape
        )));
    }
    Ok(t.data.iter().map(|&v| D::from_f64(v)).collect())
}
