/*
 * // Copyright 2026 (c) the Radzivon Bartoshyk. All rights reserved.
 * //
 * // Use of this source code is governed by a BSD-style
 * // license that can be found in the LICENSE file.
 */
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use inkgain::{
    ChannelSet, CorrectionOptions, DensityWeights, GainOptions, InkChannel, MeasurementRow,
    MonotoneSpline, RedistributionOptions, apply_gain_to_channels, generate_simple_scaling_gain,
    lstar_from_density, run_simple_scaling_correction,
};

fn wedge(patches: usize) -> Vec<MeasurementRow> {
    (0..patches)
        .map(|i| {
            let t = i as f64 / (patches - 1) as f64;
            MeasurementRow::new(t * 100., lstar_from_density(1.5 * t.powf(1.3)))
        })
        .collect()
}

fn channels(resolution: usize) -> (ChannelSet, DensityWeights) {
    let ramp = |end: u16, start: f64| {
        (0..resolution)
            .map(|i| {
                let t = i as f64 / (resolution - 1) as f64;
                if t < start {
                    0
                } else {
                    ((t - start) / (1. - start) * end as f64).round() as u16
                }
            })
            .collect::<Vec<u16>>()
    };
    let mut set = ChannelSet::new();
    set.insert("K".to_string(), InkChannel::anchor(ramp(52000, 0.5), 52000));
    set.insert("C".to_string(), InkChannel::new(ramp(30000, 0.2), 30000));
    set.insert("M".to_string(), InkChannel::new(ramp(28000, 0.2), 28000));
    set.insert("LK".to_string(), InkChannel::new(ramp(22000, 0.), 22000));
    let weights = [("K", 1.), ("C", 0.4), ("M", 0.4), ("LK", 0.25)]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    (set, weights)
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let measurements = wedge(21);
    let (set, weights) = channels(256);

    c.bench_function("inkgain: gain curve 21 patches", |b| {
        let options = GainOptions::default();
        b.iter(|| {
            black_box(generate_simple_scaling_gain(&measurements, &options));
        })
    });

    c.bench_function("inkgain: gain curve 101 patches", |b| {
        let dense = wedge(101);
        let options = GainOptions::default();
        b.iter(|| {
            black_box(generate_simple_scaling_gain(&dense, &options));
        })
    });

    c.bench_function("inkgain: PCHIP evaluate", |b| {
        let knots = (0..21).map(|i| i as f64 / 20.).collect::<Vec<_>>();
        let values = knots.iter().map(|&t| t * t).collect::<Vec<_>>();
        let spline = MonotoneSpline::new(&knots, &values);
        b.iter(|| {
            for i in 0..1000 {
                black_box(spline.evaluate(i as f64 / 999.));
            }
        })
    });

    c.bench_function("inkgain: redistribute 4 channels", |b| {
        let gain = generate_simple_scaling_gain(&measurements, &GainOptions::default()).samples;
        let options = RedistributionOptions::default();
        b.iter(|| {
            black_box(apply_gain_to_channels(&set, &gain, &options, &weights).unwrap());
        })
    });

    c.bench_function("inkgain: full correction", |b| {
        let options = CorrectionOptions {
            allow_ceiling_lift: true,
            ..Default::default()
        };
        b.iter(|| {
            black_box(
                run_simple_scaling_correction(&measurements, &set, &weights, &options).unwrap(),
            );
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
