//! Fixtures shared by the lutmap benchmarks.
//!
//! Run with: `cargo bench -p lutmap-bench`

use lutmap_core::MapSpec;
use ndarray::Array3;

/// `n` distinct 3-channel colors mapped to labels `1..=n`.
pub fn palette_spec(n: usize) -> MapSpec {
    (0..n)
        .map(|i| {
            let key = [(i * 37 % 256) as u8, (i * 91 % 256) as u8, (i / 256 % 256) as u8];
            (key, (i + 1) as i64)
        })
        .collect()
}

/// Labels `0..n` mapped to colors, the inverse direction of [`palette_spec`].
pub fn label_spec(n: usize) -> MapSpec {
    (0..n)
        .map(|i| {
            let value = [(i * 37 % 256) as u8, (i * 91 % 256) as u8, (i / 256 % 256) as u8];
            (i as i64, value)
        })
        .collect()
}

/// `H x W x 3` image whose pixels cycle through the first `n` palette colors.
pub fn palette_image(height: usize, width: usize, n: usize) -> Array3<u8> {
    Array3::from_shape_fn((height, width, 3), |(y, x, c)| {
        let i = (y * width + x) % n.max(1);
        match c {
            0 => (i * 37 % 256) as u8,
            1 => (i * 91 % 256) as u8,
            _ => (i / 256 % 256) as u8,
        }
    })
}
