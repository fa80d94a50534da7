//! Benchmarks for building and applying lookup transforms.
//!
//! Run with: `cargo bench`

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use lutmap_bench::{label_spec, palette_image, palette_spec};
use lutmap_core::Sampling;
use lutmap_lut::{build_transform, BuildOptions};

/// Benchmark transform compilation.
fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    let options = BuildOptions::new().with_axis(-1);

    for entries in [16, 256, 1024].iter() {
        let spec = palette_spec(*entries);
        group.throughput(Throughput::Elements(*entries as u64));

        group.bench_with_input(BenchmarkId::new("indexed", entries), &spec, |b, s| {
            b.iter(|| build_transform::<u8, u16>(black_box(s), &options).unwrap())
        });

        let nearest = options.clone().with_sampling(Sampling::Nearest);
        group.bench_with_input(BenchmarkId::new("nearest", entries), &spec, |b, s| {
            b.iter(|| build_transform::<u8, u16>(black_box(s), &nearest).unwrap())
        });
    }

    group.finish();
}

/// Benchmark per-pixel application in each lookup mode.
fn bench_apply(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply");
    let entries = 64;
    let options = BuildOptions::new().with_axis(-1).keep_dims(false);

    let indexed = build_transform::<u8, u16>(&palette_spec(entries), &options).unwrap();
    let nearest = build_transform::<u8, u16>(
        &palette_spec(entries),
        &options.clone().with_sampling(Sampling::Nearest),
    )
    .unwrap();
    let direct = build_transform::<u16, u8>(&label_spec(entries), &BuildOptions::new().with_axis(-1)).unwrap();

    for size in [64, 256, 1024].iter() {
        let image = palette_image(*size, *size, entries);
        let labels = indexed.apply(&image).unwrap().insert_axis(ndarray::Axis(2));
        group.throughput(Throughput::Elements((*size * *size) as u64));

        group.bench_with_input(BenchmarkId::new("indexed", size), &image, |b, img| {
            b.iter(|| indexed.apply(black_box(img)).unwrap())
        });

        group.bench_with_input(BenchmarkId::new("nearest", size), &image, |b, img| {
            b.iter(|| nearest.apply(black_box(img)).unwrap())
        });

        group.bench_with_input(BenchmarkId::new("direct", size), &labels, |b, l| {
            b.iter(|| direct.apply(black_box(l)).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_build, bench_apply);
criterion_main!(benches);
