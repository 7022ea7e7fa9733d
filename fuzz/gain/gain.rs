#![no_main]

use inkgain::{GainOptions, MeasurementRow, NormalizationMode, generate_simple_scaling_gain};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: (Vec<(f64, f64)>, u16, bool, f64, f64)| {
    let measurements = data
        .0
        .iter()
        .take(256)
        .map(|&(input, lab)| MeasurementRow::new(input, lab))
        .collect::<Vec<_>>();
    let resolution = (data.1 % 1024) as usize;
    let normalization_mode = if data.2 {
        NormalizationMode::Density
    } else {
        NormalizationMode::Lightness
    };
    let (clamp_min, clamp_max) = if data.3.is_finite() && data.4.is_finite() && data.3 <= data.4 {
        (data.3, data.4)
    } else {
        (0.85, 1.9)
    };
    let options = GainOptions {
        clamp_min,
        clamp_max,
        resolution,
        normalization_mode,
        ..Default::default()
    };
    let curve = generate_simple_scaling_gain(&measurements, &options);
    assert_eq!(curve.samples.len(), resolution);
    for &v in curve.samples.iter().chain(curve.raw_samples.iter()) {
        assert!(v >= clamp_min && v <= clamp_max);
    }
});
