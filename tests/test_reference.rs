use eegtrial::reference::common_average_reference_inplace;
use ndarray::{s, Array3, Axis};

#[test]
fn channel_sum_vanishes_at_every_sample() {
    let mut data = Array3::from_shape_fn((3, 12, 400), |(n, c, t)| {
        ((n * 13 + c * 7) as f64 + t as f64 * 0.02).sin() * (c + 1) as f64 + 5.0
    });
    common_average_reference_inplace(&mut data);
    for trial in data.axis_iter(Axis(0)) {
        for (t, s) in trial.sum_axis(Axis(0)).iter().enumerate() {
            assert!(s.abs() < 1e-9, "sample {t} sum = {s:.2e} after reference");
        }
    }
}

#[test]
fn shared_component_is_removed() {
    // Every channel carries the same common-mode drift plus its own tone.
    let mut data = Array3::from_shape_fn((1, 4, 200), |(_, c, t)| {
        let drift = 0.5 * t as f64;
        let own = if c == 0 { (t as f64 * 0.3).sin() } else { 0.0 };
        drift + own
    });
    common_average_reference_inplace(&mut data);
    for t in 0..200 {
        let own = (t as f64 * 0.3).sin();
        approx::assert_abs_diff_eq!(data[[0, 0, t]], 0.75 * own, epsilon = 1e-9);
        approx::assert_abs_diff_eq!(data[[0, 1, t]], -0.25 * own, epsilon = 1e-9);
    }
}

#[test]
fn single_channel_becomes_zero() {
    let mut data = Array3::from_shape_fn((2, 1, 50), |(n, _, t)| (n * 50 + t) as f64);
    common_average_reference_inplace(&mut data);
    assert!(data.slice(s![.., 0, ..]).iter().all(|&v| v == 0.0));
}
