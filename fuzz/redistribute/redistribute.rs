#![no_main]

use inkgain::{
    ChannelSet, DensityWeights, InkChannel, RedistributionOptions, apply_gain_to_channels,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: (Vec<(Vec<u16>, u16, bool, f32)>, Vec<f32>, bool, f32)| {
    let mut channels = ChannelSet::new();
    let mut weights = DensityWeights::new();
    for (i, (samples, end_value, anchor, weight)) in data.0.iter().take(8).enumerate() {
        let name = format!("ink{i}");
        let channel = if *anchor {
            InkChannel::anchor(samples.clone(), *end_value)
        } else {
            InkChannel::new(samples.clone(), *end_value)
        };
        channels.insert(name.clone(), channel);
        weights.insert(name, *weight as f64);
    }
    let gain = data.1.iter().take(1024).map(|&g| g as f64).collect::<Vec<_>>();
    let options = RedistributionOptions {
        allow_ceiling_lift: data.2,
        max_lift_percent: data.3 as f64,
    };
    let Ok(result) = apply_gain_to_channels(&channels, &gain, &options, &weights) else {
        assert!(gain.is_empty());
        return;
    };
    assert_eq!(result.metadata.residual_overflow.len(), gain.len());
    for (name, adjusted) in result.channels.iter() {
        let source = &channels[name];
        assert_eq!(adjusted.samples.len(), gain.len());
        if !data.2 {
            assert!(adjusted.end_value <= source.end_value);
        }
        if source.protected_anchor {
            let baseline = source.samples_at(gain.len());
            for (&out, &base) in adjusted.samples.iter().zip(baseline.iter()) {
                assert!(out <= base);
            }
        }
    }
});
