//! Transform inspection command

use crate::InspectArgs;
use anyhow::{Context, Result};
use lutmap_config::MapDocument;
use lutmap_core::Element;
use lutmap_lut::CompiledTransform;

use super::{format_tuple, load_document, with_source_type};

pub fn run(args: InspectArgs, verbose: u8) -> Result<()> {
    let document = load_document(&args.source)?;
    if verbose > 0 {
        println!("Building {} entries as {}", document.spec.len(), args.source.dtype);
    }
    with_source_type!(args.source.dtype, S => inspect_as::<S>(&document, args.table))
}

fn inspect_as<S: Element>(document: &MapDocument, table: bool) -> Result<()> {
    let lut: CompiledTransform<S, f64> = document.build().context("Failed to build map")?;

    println!("Mode:         {}", lut.kind());
    println!("Entries:      {}", lut.len());
    println!("Source:       {} {:?}", lut.source_type(), lut.source_shape());
    println!("Destination:  {:?}", lut.dest_shape());
    println!("Axis:         {:?}", lut.axis());
    println!("Keep dims:    {}", lut.keep_dims());
    println!("Sampling:     {}", lut.sampling());
    if let (Some(mins), Some(maxs), Some(stride)) = (lut.mins(), lut.maxs(), lut.stride()) {
        println!("Mins:         {}", format_tuple(mins));
        println!("Maxs:         {}", format_tuple(maxs));
        println!("Stride:       {}", format_tuple(stride));
    }
    if let Some(slots) = lut.table() {
        let used = slots.iter().filter(|&&s| s != 0).count();
        println!("Table:        {} slots, {} used", slots.len(), used);
    }
    println!("Default:      {}", format_tuple(lut.default_value()));

    if table {
        println!("Destinations (slot 0 is the default):");
        for (i, row) in lut.destinations().outer_iter().enumerate() {
            println!("  {:>4}  {}", i, format_tuple(row));
        }
        if let Some(keys) = lut.quantized_keys() {
            println!("Quantized keys (declaration order):");
            for (i, key) in keys.outer_iter().enumerate() {
                println!("  {:>4}  {}", i, format_tuple(key));
            }
        }
    }
    Ok(())
}
