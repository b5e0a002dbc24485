use eegtrial::filter::{butter_lowpass, filtfilt, filtfilt_inplace, lowpass_inplace};
use eegtrial::PipelineConfig;
use ndarray::Array3;
use rustfft::{num_complex::Complex64, FftPlanner};
use std::f64::consts::PI;

const SFREQ: f64 = 1000.0;
const N: usize = 4000;

fn sine(freq: f64, amp: f64) -> Vec<f64> {
    (0..N).map(|i| amp * (2.0 * PI * freq * i as f64 / SFREQ).sin()).collect()
}

/// Magnitude of the FFT bin holding `freq` (exact bin for whole-cycle tones).
fn bin_magnitude(x: &[f64], freq: f64) -> f64 {
    let mut buf: Vec<Complex64> = x.iter().map(|&v| Complex64::new(v, 0.0)).collect();
    FftPlanner::<f64>::new().plan_fft_forward(buf.len()).process(&mut buf);
    let k = (freq * x.len() as f64 / SFREQ).round() as usize;
    buf[k].norm()
}

// ── Coefficient tests ─────────────────────────────────────────────────────────

#[test]
fn default_design_has_order_seven() {
    let cfg = PipelineConfig::default();
    let c = butter_lowpass(cfg.filter_order, cfg.normalized_cutoff()).unwrap();
    assert_eq!(c.b.len(), 8);
    assert_eq!(c.a.len(), 8);
    assert!((c.a[0] - 1.0).abs() < 1e-12);
}

#[test]
fn coefficients_sum_to_unit_dc_gain() {
    let c = butter_lowpass(7, 0.1).unwrap();
    let gain = c.b.iter().sum::<f64>() / c.a.iter().sum::<f64>();
    assert!((gain - 1.0).abs() < 1e-9, "DC gain = {gain}");
}

#[test]
fn invalid_cutoff_is_rejected() {
    assert!(butter_lowpass(7, 0.0).is_err());
    assert!(butter_lowpass(7, 1.0).is_err());
    assert!(butter_lowpass(0, 0.1).is_err());
}

// ── Application tests ─────────────────────────────────────────────────────────

#[test]
fn stopband_tone_is_removed_passband_kept() {
    // 10 Hz (pass band) + 150 Hz (stop band), both whole-cycle in 4 s.
    let x: Vec<f64> = sine(10.0, 1.0).iter().zip(sine(150.0, 1.0))
        .map(|(a, b)| a + b)
        .collect();
    let c = butter_lowpass(7, 50.0 / (SFREQ / 2.0)).unwrap();
    let y = filtfilt(&c, &x);
    assert_eq!(y.len(), x.len());

    let pass_before = bin_magnitude(&x, 10.0);
    let pass_after = bin_magnitude(&y, 10.0);
    let stop_before = bin_magnitude(&x, 150.0);
    let stop_after = bin_magnitude(&y, 150.0);

    assert!((pass_after / pass_before - 1.0).abs() < 0.02,
        "10 Hz gain {:.4}", pass_after / pass_before);
    assert!(stop_after / stop_before < 0.01,
        "150 Hz gain {:.2e} (stop band not attenuated?)", stop_after / stop_before);
}

#[test]
fn passband_tone_has_no_phase_shift() {
    let x = sine(5.0, 1.0);
    let c = butter_lowpass(7, 0.1).unwrap();
    let y = filtfilt(&c, &x);
    let max_err = x[200..N - 200].iter().zip(&y[200..N - 200])
        .map(|(a, b)| (a - b).abs())
        .fold(0.0_f64, f64::max);
    assert!(max_err < 1e-3, "max interior deviation {max_err:.2e}");
}

#[test]
fn constant_series_is_preserved() {
    let x = vec![3.5; 500];
    let c = butter_lowpass(7, 0.1).unwrap();
    for v in filtfilt(&c, &x) {
        assert!((v - 3.5).abs() < 1e-8, "got {v}");
    }
}

#[test]
fn batch_filter_matches_single_series() {
    let mut data = Array3::from_shape_fn((2, 3, 600), |(n, ch, t)| {
        ((t as f64) * 0.05 * (ch + 1) as f64).sin() + (t as f64 * 0.9).cos() * n as f64
    });
    let c = butter_lowpass(7, 0.1).unwrap();
    let expected = filtfilt(&c, &data.slice(ndarray::s![1, 2, ..]).to_vec());
    filtfilt_inplace(&mut data, &c);
    for (a, b) in data.slice(ndarray::s![1, 2, ..]).iter().zip(&expected) {
        assert_eq!(a, b);
    }
}

#[test]
fn short_series_are_filtered_without_panicking() {
    let cfg = PipelineConfig::default();
    let mut data = Array3::from_shape_fn((1, 2, 5), |(_, c, t)| (c * t) as f64);
    lowpass_inplace(&mut data, &cfg).unwrap();
    assert_eq!(data.dim(), (1, 2, 5));
    assert!(data.iter().all(|v| v.is_finite()));
}
