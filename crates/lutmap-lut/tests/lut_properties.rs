//! End-to-end behavior of built transforms on arrays.

use std::sync::Arc;
use std::thread;

use lutmap_color::ChannelOrder;
use lutmap_core::{AxisSpec, Error, MapSpec, Sampling};
use lutmap_lut::{apply, build_transform, BuildOptions, LookupKind, TransformCache};
use ndarray::{array, Array1, Array3, ArrayD, IxDyn};

fn labels_of_pixels() -> MapSpec {
    MapSpec::new()
        .with_entry([0, 0, 255], 1)
        .with_entry([255, 0, 0], 2)
}

#[test]
fn dense_keys_use_direct_mode() {
    let spec: MapSpec = (0..10).map(|k| (k, k * 3 + 1)).collect();
    let lut = build_transform::<u16, u16>(&spec, &BuildOptions::new().keep_dims(false)).unwrap();

    assert_eq!(lut.kind(), LookupKind::Direct);
    assert!(lut.table().is_none());

    let input = Array1::from_iter(0u16..10);
    let out = lut.apply(&input).unwrap();
    let expected: Vec<u16> = (0..10).map(|k| k * 3 + 1).collect();
    assert_eq!(out.iter().copied().collect::<Vec<_>>(), expected);
}

#[test]
fn sparse_keys_fall_back_to_default() {
    let spec = MapSpec::new()
        .with_entry([1, 2], 10)
        .with_entry([2, 1], 20)
        .with_entry([7, 7], 30);
    let options = BuildOptions::new()
        .with_axis(-1)
        .with_default(99)
        .keep_dims(false);
    let lut = build_transform::<i32, i32>(&spec, &options).unwrap();
    assert_eq!(lut.kind(), LookupKind::Indexed);

    let input = array![[1, 2], [2, 1], [7, 7], [1, 1], [2, 2], [-5, 3], [100, 100]];
    let out = lut.apply(&input).unwrap();
    assert_eq!(out, array![10, 20, 30, 99, 99, 99, 99].into_dyn());
}

#[test]
fn direct_mode_unmapped_cells_use_default() {
    // three keys fill the first three cells of a 2x2 box
    let spec = MapSpec::new()
        .with_entry([0, 0], 1)
        .with_entry([0, 1], 2)
        .with_entry([1, 0], 3);
    let options = BuildOptions::new()
        .with_axis(-1)
        .with_default(9)
        .keep_dims(false);
    let lut = build_transform::<i32, i32>(&spec, &options).unwrap();
    assert_eq!(lut.kind(), LookupKind::Direct);

    // (1, 1) is inside the box past the last key, the rest are outside
    let input = array![[0, 0], [0, 1], [1, 0], [1, 1], [2, 0], [-1, 0]];
    let out = lut.apply(&input).unwrap();
    assert_eq!(out, array![1, 2, 3, 9, 9, 9].into_dyn());
}

#[test]
fn gcd_sampling_builds_and_applies() {
    let spec = MapSpec::from_pairs([(10, 1), (20, 2), (30, 3)]);
    let options = BuildOptions::new().with_sampling(Sampling::Gcd).keep_dims(false);
    let lut = build_transform::<i32, u8>(&spec, &options).unwrap();

    assert_eq!(lut.kind(), LookupKind::Indexed);
    assert_eq!(lut.sampling(), &Sampling::Fixed(vec![1.0 / 20.0]));
    assert_eq!(lut.table().map(<[u32]>::len), Some(401));

    let out = lut.apply(&array![10, 20, 30, 15, 40]).unwrap();
    assert_eq!(out, array![1u8, 2, 3, 0, 0].into_dyn());
}

#[test]
fn applying_twice_is_identical() {
    let lut = build_transform::<u8, u8>(&labels_of_pixels(), &BuildOptions::new().with_axis(-1)).unwrap();
    let image = Array3::from_shape_fn((8, 8, 3), |(y, x, c)| ((y * 31 + x * 17 + c * 255) % 256) as u8);
    let first = lut.apply(&image).unwrap();
    let second = lut.apply(&image).unwrap();
    assert_eq!(first, second);
}

#[test]
fn later_entry_wins_shared_cell() {
    // 0.5 and 0.9 truncate to the same integer cell
    let spec = MapSpec::new()
        .with_entry(0.5, 1.0)
        .with_entry(3.0, 2.0)
        .with_entry(0.9, 7.0);
    let options = BuildOptions::new().with_sampling(Sampling::fixed(1.0)).keep_dims(false);
    let lut = build_transform::<f64, f64>(&spec, &options).unwrap();
    let out = lut.apply(&array![0.0, 0.7, 3.2]).unwrap();
    assert_eq!(out, array![7.0, 7.0, 2.0].into_dyn());
}

#[test]
fn nearest_matches_closest_key() {
    let spec = MapSpec::new()
        .with_entry([0, 0], 1)
        .with_entry([10, 10], 2);
    let options = BuildOptions::new()
        .with_axis(-1)
        .with_sampling(Sampling::Nearest)
        .keep_dims(false);
    let lut = build_transform::<f32, u8>(&spec, &options).unwrap();
    assert_eq!(lut.kind(), LookupKind::Nearest);

    let out = lut.apply(&array![[4.0f32, 4.0], [6.0, 6.0], [5.0, 5.0], [-3.0, 20.0]]).unwrap();
    // (5, 5) is equidistant and goes to the first-listed key
    assert_eq!(out, array![1u8, 2, 1, 2].into_dyn());
}

#[test]
fn pixel_triples_become_labels() {
    let options = BuildOptions::new()
        .with_axis(-1)
        .with_default(0)
        .keep_dims(false);
    let lut = build_transform::<u8, u8>(&labels_of_pixels(), &options).unwrap();

    let image = array![
        [[0u8, 0, 255], [255, 0, 0]],
        [[255, 0, 1], [0, 0, 255]],
    ];
    let labels = lut.apply(&image).unwrap();
    assert_eq!(labels, array![[1u8, 2], [0, 1]].into_dyn());
}

#[test]
fn labels_become_pixel_triples() {
    let spec = MapSpec::new()
        .with_entry(1, [0, 0, 255])
        .with_entry(2, [255, 0, 0]);
    let lut = build_transform::<u8, u8>(&spec, &BuildOptions::new().with_axis(-1)).unwrap();

    // (2, 2, 1) labels with a trailing singleton key axis
    let labels = array![[[1u8], [2]], [[0], [1]]];
    let image = lut.apply(&labels).unwrap();
    assert_eq!(image.shape(), &[2, 2, 3]);
    assert_eq!(image.slice(ndarray::s![0, 0, ..]).to_vec(), vec![0, 0, 255]);
    assert_eq!(image.slice(ndarray::s![0, 1, ..]).to_vec(), vec![255, 0, 0]);
    assert_eq!(image.slice(ndarray::s![1, 0, ..]).to_vec(), vec![0, 0, 0]);
}

#[test]
fn color_names_follow_channel_order() {
    let spec = MapSpec::new().with_entry("red", 1).with_entry("blue", 2);
    let rgb = BuildOptions::new()
        .with_axis(-1)
        .with_channel_order(ChannelOrder::Rgb)
        .keep_dims(false);
    let lut = build_transform::<u8, u8>(&spec, &rgb).unwrap();
    assert_eq!(lut.apply(&array![[255u8, 0, 0], [0, 0, 255]]).unwrap(), array![1u8, 2].into_dyn());

    // default order is BGR
    let bgr = BuildOptions::new().with_axis(-1).keep_dims(false);
    let lut = build_transform::<u8, u8>(&spec, &bgr).unwrap();
    assert_eq!(lut.apply(&array![[255u8, 0, 0], [0, 0, 255]]).unwrap(), array![2u8, 1].into_dyn());
}

#[test]
fn normalized_float_keys() {
    let spec = MapSpec::new()
        .with_entry([0.0, 0.0, 1.0], 1)
        .with_entry([1.0, 0.0, 0.0], 2);
    let lut = build_transform::<f32, u8>(&spec, &BuildOptions::new().with_axis(-1).keep_dims(false)).unwrap();
    let steps = match lut.sampling() {
        Sampling::Fixed(steps) => steps.clone(),
        other => panic!("unexpected sampling {other}"),
    };
    assert_eq!(steps.len(), 3);
    assert!((steps[0] - 1.0 / 255.0).abs() < 1e-12);

    let out = lut.apply(&array![[0.0f32, 0.0, 1.0], [1.0, 0.0, 0.0], [0.5, 0.5, 0.5]]).unwrap();
    assert_eq!(out, array![1u8, 2, 0].into_dyn());
}

#[test]
fn half_float_scalar_keys() {
    use half::f16;

    let spec = MapSpec::new().with_entry(0.25, 1).with_entry(0.75, 2);
    let lut = build_transform::<f16, u8>(&spec, &BuildOptions::new().keep_dims(false)).unwrap();
    let image = array![f16::from_f32(0.75), f16::from_f32(0.25), f16::from_f32(0.5)];
    assert_eq!(lut.apply(&image).unwrap(), array![2u8, 1, 0].into_dyn());
}

#[test]
fn shape_mismatch_is_reported() {
    let lut = build_transform::<u8, u8>(&labels_of_pixels(), &BuildOptions::new().with_axis(-1)).unwrap();
    let image = Array3::<u8>::zeros((2, 2, 4));
    let err = lut.apply(&image).unwrap_err();
    match err {
        Error::ShapeMismatch { expected, found, .. } => {
            assert_eq!(expected, vec![3]);
            assert_eq!(found, vec![4]);
        }
        other => panic!("unexpected error {other}"),
    }
    // the input is only borrowed; nothing was written
    assert!(image.iter().all(|&v| v == 0));
}

#[test]
fn leading_axis_rank_too_high() {
    let key = lutmap_core::MapValue::Nested(vec![[1i32, 2].into(), [3i32, 4].into()]);
    let spec = MapSpec::new().with_entry(key, 1);
    let lut = build_transform::<u8, u8>(&spec, &BuildOptions::new()).unwrap();
    let err = lut.apply(&array![1u8, 2]).unwrap_err();
    assert!(err.is_shape_mismatch() || matches!(err, Error::InvalidAxisSpec { .. }));
}

#[test]
fn spec_and_transform_sources_agree() {
    let options = BuildOptions::new().with_axis(AxisSpec::Axes(vec![-1]));
    let spec = labels_of_pixels();
    let lut = build_transform::<u8, u8>(&spec, &options).unwrap();
    let image = Array3::from_shape_fn((3, 4, 3), |(y, x, c)| if (y + x) % 2 == 0 && c == 2 { 255u8 } else { 0 });

    let from_spec = apply::<u8, u8, _, _>(&spec, &image, &options).unwrap();
    let from_lut = apply::<u8, u8, _, _>(&lut, &image, &options).unwrap();
    assert_eq!(from_spec, from_lut);
    assert_eq!(from_lut[[0, 0, 0]], 1);
    assert_eq!(from_lut[[0, 1, 0]], 0);
}

#[test]
fn dynamic_rank_input() {
    let lut = build_transform::<u8, u8>(&labels_of_pixels(), &BuildOptions::new().with_axis(-1).keep_dims(false)).unwrap();
    let input = ArrayD::from_shape_vec(IxDyn(&[1, 1, 1, 3]), vec![255u8, 0, 0]).unwrap();
    let out = lut.apply(input.view()).unwrap();
    assert_eq!(out.shape(), &[1, 1, 1]);
    assert_eq!(out[[0, 0, 0]], 2);
}

#[test]
fn shared_across_threads() {
    let cache = Arc::new(TransformCache::<u8, u8>::new());
    let options = BuildOptions::new().with_axis(-1).keep_dims(false);
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let cache = Arc::clone(&cache);
            let options = options.clone();
            thread::spawn(move || {
                let lut = cache.get_or_build(&labels_of_pixels(), &options).unwrap();
                let pixel = if i % 2 == 0 { [0u8, 0, 255] } else { [255, 0, 0] };
                let image = Array3::from_shape_fn((16, 16, 3), |(_, _, c)| pixel[c]);
                let out = lut.apply(&image).unwrap();
                out.iter().all(|&v| v == if i % 2 == 0 { 1 } else { 2 })
            })
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap());
    }
    assert_eq!(cache.len(), 1);
}
