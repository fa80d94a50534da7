//! Color code resolution command

use crate::ColorArgs;
use anyhow::{Context, Result};
use lutmap_color::{list_colors, resolve, ChannelOrder, ColorEncoding};
use tracing::debug;

use super::format_tuple;

pub fn run(args: ColorArgs, verbose: u8) -> Result<()> {
    let order = if args.rgb { ChannelOrder::Rgb } else { ChannelOrder::Bgr };
    let encoding = if args.normalized {
        ColorEncoding::Normalized
    } else {
        ColorEncoding::Uint8
    };

    if verbose > 0 {
        println!("Channel order: {order}");
    }

    if args.list {
        for name in list_colors() {
            let channels = resolve(name, encoding, order)?;
            println!("{:<12} {}", name, format_channels(channels, encoding));
        }
        return Ok(());
    }

    for code in &args.codes {
        let channels = resolve(code, encoding, order)
            .with_context(|| format!("Failed to resolve color: {code}"))?;
        debug!(code = %code, ?channels, "resolved color");
        println!("{:<12} {}", code, format_channels(channels, encoding));
    }
    Ok(())
}

fn format_channels(channels: [f32; 3], encoding: ColorEncoding) -> String {
    match encoding {
        ColorEncoding::Uint8 => format_tuple(channels.map(|c| c as u8)),
        ColorEncoding::Normalized => format_tuple(channels.map(|c| format!("{c:.4}"))),
    }
}
