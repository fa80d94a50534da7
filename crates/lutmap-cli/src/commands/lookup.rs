//! Key lookup command

use crate::LookupArgs;
use anyhow::{bail, Context, Result};
use lutmap_color::{ChannelOrder, ColorEncoding};
use lutmap_config::MapDocument;
use lutmap_core::Element;
use lutmap_lut::CompiledTransform;
use ndarray::{ArrayD, IxDyn};
use tracing::trace;

use super::{format_tuple, load_document, with_source_type};

pub fn run(args: LookupArgs, verbose: u8) -> Result<()> {
    let document = load_document(&args.source)?;
    with_source_type!(args.source.dtype, S => lookup_as::<S>(&document, &args.keys, verbose))
}

fn lookup_as<S: Element>(document: &MapDocument, keys: &[String], verbose: u8) -> Result<()> {
    let lut: CompiledTransform<S, f64> = document.build().context("Failed to build map")?;
    if verbose > 0 {
        println!("{} map, {} entries, keys {:?}", lut.kind(), lut.len(), lut.source_shape());
    }

    let key_shape = lut.source_shape().to_vec();
    let key_len: usize = key_shape.iter().product();
    let encoding = if S::TYPE.is_float() {
        ColorEncoding::Normalized
    } else {
        ColorEncoding::Uint8
    };

    let mut data = Vec::with_capacity(keys.len() * key_len);
    for key in keys {
        let values = parse_key(key, encoding, document.options.channel_order)?;
        if values.len() != key_len {
            bail!("Key '{}' has {} values, map keys have {}", key, values.len(), key_len);
        }
        data.extend(values.into_iter().map(S::from_f64));
    }

    // one key per row, key axes after the row axis
    let mut shape = vec![keys.len()];
    shape.extend_from_slice(&key_shape);
    let array = ArrayD::from_shape_vec(IxDyn(&shape), data)?;
    let axes: Vec<isize> = (1..=key_shape.len() as isize).collect();
    let lut = lut.with_axis(axes).with_keep_dims(true);
    trace!(?shape, "looking up keys");

    let out = lut.apply(&array).context("Failed to apply map")?;
    for (key, value) in keys.iter().zip(out.outer_iter()) {
        println!("{:<16} -> {}", key, format_tuple(value));
    }
    Ok(())
}

/// Comma-separated numbers, or a color code
fn parse_key(key: &str, encoding: ColorEncoding, order: ChannelOrder) -> Result<Vec<f64>> {
    let numbers: Result<Vec<f64>, _> = key.split(',').map(|p| p.trim().parse::<f64>()).collect();
    if let Ok(numbers) = numbers {
        return Ok(numbers);
    }
    let channels = lutmap_color::resolve(key.trim(), encoding, order)
        .with_context(|| format!("Key '{key}' is neither numbers nor a color code"))?;
    Ok(channels.iter().map(|&c| c as f64).collect())
}
