/*
 * // Copyright (c) Radzivon Bartoshyk 10/2026. All rights reserved.
 * //
 * // Redistribution and use in source and binary forms, with or without modification,
 * // are permitted provided that the following conditions are met:
 * //
 * // 1.  Redistributions of source code must retain the above copyright notice, this
 * // list of conditions and the following disclaimer.
 * //
 * // 2.  Redistributions in binary form must reproduce the above copyright notice,
 * // this list of conditions and the following disclaimer in the documentation
 * // and/or other materials provided with the distribution.
 * //
 * // 3.  Neither the name of the copyright holder nor the names of its
 * // contributors may be used to endorse or promote products derived from
 * // this software without specific prior written permission.
 * //
 * // THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
 * // AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
 * // IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
 * // DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE
 * // FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL
 * // DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
 * // SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER
 * // CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY,
 * // OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
 * // OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.
 */
use crate::channels::{AdjustedChannel, ChannelSet, DensityWeights, InkChannel, resample_nearest};
use crate::config::{
    DEFAULT_BLEND_PERCENT, DEFAULT_MAX_ITERATIONS, DEFAULT_MAX_LIFT_PERCENT,
    DEFAULT_RESIDUAL_INTENSITY, DEFAULT_RESIDUAL_THRESHOLD, ScalingOptions, SmoothingOptions,
    configure_simple_scaling,
};
use crate::err::ScalingError;
use crate::gain::{GainCurve, GainOptions, generate_simple_scaling_gain};
use crate::math::{EPSILON, clamp_to_band, finite_or, m_clamp, m_max};
use crate::measurement::{MeasurementRow, NormalizationMode};
use crate::redistribute::{RedistributionOptions, apply_gain_to_channels};
use log::debug;
use std::collections::BTreeMap;

/// Declares options of a full correction run
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct CorrectionOptions {
    /// Gain band and resolution overrides
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub scaling: ScalingOptions,
    pub smoothing: SmoothingOptions,
    pub normalization_mode: NormalizationMode,
    pub allow_ceiling_lift: bool,
    /// Ink limit lift budget when `allow_ceiling_lift` is set.
    ///
    /// Much more conservative than the per-sample amplification ceiling,
    /// raising ink limits changes the whole channel, not one tone.
    pub max_lift_percent: f64,
    /// A second pass runs only when this is above 1
    pub max_iterations: usize,
    /// Worst residual a pass may leave before another pass is run
    pub residual_threshold: f64,
    /// Fraction of the remaining correction applied by each follow-up pass
    pub residual_intensity: f64,
    /// Strength of the final result between the input (0) and the full correction (100)
    pub blend_percent: f64,
}

impl Default for CorrectionOptions {
    fn default() -> Self {
        Self {
            scaling: ScalingOptions::default(),
            smoothing: SmoothingOptions::default(),
            normalization_mode: NormalizationMode::default(),
            allow_ceiling_lift: false,
            max_lift_percent: DEFAULT_MAX_LIFT_PERCENT,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            residual_threshold: DEFAULT_RESIDUAL_THRESHOLD,
            residual_intensity: DEFAULT_RESIDUAL_INTENSITY,
            blend_percent: DEFAULT_BLEND_PERCENT,
        }
    }
}

/// Gap between requested and achieved gain.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResidualStats {
    pub max: f64,
    pub mean: f64,
    /// `|target / applied - 1|` per position
    pub profile: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CorrectionPass {
    /// Gain handed to the redistribution engine by this pass
    pub gain_curve: Vec<f64>,
    /// Residual against the synthesized gain after this pass
    pub residual: ResidualStats,
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CorrectionMetadata {
    pub blend_percent: f64,
    pub per_channel_lift: BTreeMap<String, u16>,
    /// Residual of the last pass
    pub residual: ResidualStats,
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CorrectionResult {
    pub gain: GainCurve,
    /// Every input channel, untouched ones included
    pub channels: BTreeMap<String, AdjustedChannel>,
    pub passes: Vec<CorrectionPass>,
    pub metadata: CorrectionMetadata,
}

/// Compares the gain a pass actually achieved against the requested one.
///
/// Positions where nothing was achieved count as matched.
pub fn analyze_residual(target_gain: &[f64], applied_gain: &[f64]) -> ResidualStats {
    let profile = target_gain
        .iter()
        .zip(applied_gain.iter())
        .map(|(&target, &applied)| {
            let target = finite_or(target, 1.);
            let applied = finite_or(applied, 0.);
            let ratio = if applied > EPSILON { target / applied } else { 1. };
            (ratio - 1.).abs()
        })
        .collect::<Vec<_>>();
    let max = profile.iter().copied().fold(0f64, f64::max);
    let mean = if profile.is_empty() {
        0.
    } else {
        profile.iter().sum::<f64>() / profile.len() as f64
    };
    ResidualStats { max, mean, profile }
}

fn ink_totals<'a>(samples: impl Iterator<Item = &'a [u16]>, resolution: usize) -> Vec<f64> {
    let mut totals = vec![0f64; resolution];
    for channel in samples {
        let stretched = resample_nearest(channel, resolution);
        for (total, &v) in totals.iter_mut().zip(stretched.iter()) {
            *total += v as f64;
        }
    }
    totals
}

/// Aggregate multiplicative effect of a pass at every position.
fn achieved_gain(baseline_totals: &[f64], totals: &[f64]) -> Vec<f64> {
    baseline_totals
        .iter()
        .zip(totals.iter())
        .map(|(&base, &total)| total / m_max(EPSILON, base))
        .collect()
}

/// Adds back channels a pass did not touch.
fn merge_untouched(
    mut adjusted: BTreeMap<String, AdjustedChannel>,
    channels: &ChannelSet,
    resolution: usize,
) -> BTreeMap<String, AdjustedChannel> {
    for (name, channel) in channels.iter() {
        adjusted
            .entry(name.clone())
            .or_insert_with(|| AdjustedChannel::untouched(channel, resolution));
    }
    adjusted
}

fn blend_channel(
    original: &InkChannel,
    updated: &AdjustedChannel,
    resolution: usize,
    factor: f64,
) -> AdjustedChannel {
    let original_samples = original.samples_at(resolution);
    let updated_samples = resample_nearest(&updated.samples, resolution);
    let samples = original_samples
        .iter()
        .zip(updated_samples.iter())
        .map(|(&base, &next)| {
            let (base, next) = (base as f64, next as f64);
            (base + (next - base) * factor).round() as u16
        })
        .collect();
    let original_end = original.end_value as f64;
    let end_value =
        (original_end + (updated.end_value as f64 - original_end) * factor).round() as u16;
    AdjustedChannel {
        samples,
        end_value,
        lift_applied: end_value.saturating_sub(updated.base_end),
        base_end: updated.base_end,
    }
}

/// Synthesizes a gain curve from `measurements` and applies it to `channels`.
///
/// When `max_iterations` allows it and the first pass leaves a residual
/// above the threshold, a single second pass applies a damped correction of
/// what is left, starting from the first pass's output. The result can be
/// blended back toward the input with `blend_percent`.
pub fn run_simple_scaling_correction(
    measurements: &[MeasurementRow],
    channels: &ChannelSet,
    density_weights: &DensityWeights,
    options: &CorrectionOptions,
) -> Result<CorrectionResult, ScalingError> {
    let config = configure_simple_scaling(&options.scaling);
    let resolution = config.resolution;
    let residual_threshold = m_max(
        finite_or(options.residual_threshold, DEFAULT_RESIDUAL_THRESHOLD),
        0.,
    );
    let residual_intensity = m_clamp(
        finite_or(options.residual_intensity, DEFAULT_RESIDUAL_INTENSITY),
        0.,
        1.,
    );
    let blend_percent = m_clamp(
        finite_or(options.blend_percent, DEFAULT_BLEND_PERCENT),
        0.,
        100.,
    );
    let redistribution = RedistributionOptions {
        allow_ceiling_lift: options.allow_ceiling_lift,
        max_lift_percent: m_max(
            finite_or(options.max_lift_percent, DEFAULT_MAX_LIFT_PERCENT),
            0.,
        ),
    };

    let gain = generate_simple_scaling_gain(
        measurements,
        &GainOptions {
            smoothing: options.smoothing,
            normalization_mode: options.normalization_mode,
            ..GainOptions::from(config)
        },
    );

    let baseline_totals = ink_totals(
        channels.values().map(|channel| channel.samples.as_slice()),
        resolution,
    );

    let first = apply_gain_to_channels(channels, &gain.samples, &redistribution, density_weights)?;
    let mut working = merge_untouched(first.channels, channels, resolution);
    let mut effective = achieved_gain(
        &baseline_totals,
        &ink_totals(
            working.values().map(|channel| channel.samples.as_slice()),
            resolution,
        ),
    );
    let mut passes = vec![CorrectionPass {
        gain_curve: gain.samples.clone(),
        residual: analyze_residual(&gain.samples, &effective),
    }];
    debug!(
        "Correction pass 1: residual max {:.4}, mean {:.4}",
        passes[0].residual.max, passes[0].residual.mean
    );

    if options.max_iterations > 1 && passes[0].residual.max > residual_threshold {
        let residual_gain = gain
            .samples
            .iter()
            .zip(effective.iter())
            .map(|(&target, &applied)| {
                let correction = if applied > EPSILON { target / applied } else { 1. };
                let damped = 1. + (correction - 1.) * residual_intensity;
                clamp_to_band(damped, gain.clamp_min, gain.clamp_max)
            })
            .collect::<Vec<_>>();

        // First pass output becomes the new baseline; ink limits stay measured
        // against the input so lift budgets do not compound.
        let next_input = channels
            .iter()
            .map(|(name, channel)| {
                let next = match working.get(name) {
                    Some(adjusted) if channel.enabled => InkChannel {
                        samples: adjusted.samples.clone(),
                        ..channel.clone()
                    },
                    _ => channel.clone(),
                };
                (name.clone(), next)
            })
            .collect::<ChannelSet>();

        let pass = apply_gain_to_channels(
            &next_input,
            &residual_gain,
            &redistribution,
            density_weights,
        )?;
        working = merge_untouched(pass.channels, &next_input, resolution);
        effective = achieved_gain(
            &baseline_totals,
            &ink_totals(
                working.values().map(|channel| channel.samples.as_slice()),
                resolution,
            ),
        );
        let residual = analyze_residual(&gain.samples, &effective);
        debug!(
            "Correction pass {}: residual max {:.4}, mean {:.4}",
            passes.len() + 1,
            residual.max,
            residual.mean
        );
        passes.push(CorrectionPass {
            gain_curve: residual_gain,
            residual,
        });
    }

    let factor = blend_percent / 100.;
    let final_channels = if factor < 1. {
        debug!("Blending correction at {blend_percent}%");
        channels
            .iter()
            .filter_map(|(name, original)| {
                working.get(name).map(|updated| {
                    (
                        name.clone(),
                        blend_channel(original, updated, resolution, factor),
                    )
                })
            })
            .collect::<BTreeMap<_, _>>()
    } else {
        working
    };

    let per_channel_lift = final_channels
        .iter()
        .map(|(name, adjusted)| {
            let base_end = channels.get(name).map_or(adjusted.base_end, |c| c.end_value);
            (name.clone(), adjusted.end_value.saturating_sub(base_end))
        })
        .collect();

    let residual = passes
        .last()
        .map(|pass| pass.residual.clone())
        .unwrap_or_default();

    Ok(CorrectionResult {
        gain,
        channels: final_channels,
        passes,
        metadata: CorrectionMetadata {
            blend_percent,
            per_channel_lift,
            residual,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gain::tests::measurement_set;
    use rand::Rng;

    fn ramp(resolution: usize, mapper: impl Fn(f64) -> f64) -> Vec<u16> {
        (0..resolution)
            .map(|i| {
                let t = if resolution > 1 {
                    i as f64 / (resolution - 1) as f64
                } else {
                    0.
                };
                mapper(t).round() as u16
            })
            .collect()
    }

    fn k_and_c(resolution: usize) -> ChannelSet {
        let mut channels = ChannelSet::new();
        channels.insert(
            "K".to_string(),
            InkChannel::anchor(ramp(resolution, |t| 52000. * t), 52000),
        );
        channels.insert(
            "C".to_string(),
            InkChannel::new(ramp(resolution, |t| 18000. * t.powf(0.55)), 18000),
        );
        channels
    }

    fn k_and_c_weights() -> DensityWeights {
        [("K".to_string(), 0.6), ("C".to_string(), 0.2)]
            .into_iter()
            .collect()
    }

    fn resolution(resolution: usize) -> ScalingOptions {
        ScalingOptions {
            resolution: Some(resolution),
            ..Default::default()
        }
    }

    #[test]
    fn follow_up_pass_reduces_residual() {
        let result = run_simple_scaling_correction(
            &measurement_set(|p| p * 0.5),
            &k_and_c(32),
            &k_and_c_weights(),
            &CorrectionOptions {
                scaling: resolution(32),
                residual_threshold: 0.,
                max_iterations: 2,
                residual_intensity: 0.5,
                allow_ceiling_lift: false,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(result.passes.len(), 2);
        let first = result.passes[0].residual.max;
        assert!(first > 0.);
        assert!(result.metadata.residual.max <= first);
        assert_eq!(result.metadata.residual, result.passes[1].residual);
        for (name, adjusted) in result.channels.iter() {
            assert_eq!(adjusted.samples.len(), 32);
            assert!(adjusted.end_value <= k_and_c(32)[name].end_value);
        }
    }

    #[test]
    fn blend_interpolates_toward_input() {
        let channels = k_and_c(32);
        let measurements = measurement_set(|p| p * 0.7);
        let options = CorrectionOptions {
            scaling: resolution(32),
            max_iterations: 1,
            ..Default::default()
        };
        let full =
            run_simple_scaling_correction(&measurements, &channels, &k_and_c_weights(), &options)
                .unwrap();
        let half = run_simple_scaling_correction(
            &measurements,
            &channels,
            &k_and_c_weights(),
            &CorrectionOptions {
                blend_percent: 50.,
                ..options
            },
        )
        .unwrap();
        assert_eq!(half.metadata.blend_percent, 50.);
        assert_eq!(full.metadata.blend_percent, 100.);
        for (name, original) in channels.iter() {
            let corrected = &full.channels[name].samples;
            let blended = &half.channels[name].samples;
            assert_eq!(blended.len(), 32);
            for i in 0..32 {
                let base = original.samples[i] as f64;
                let expected = (base + (corrected[i] as f64 - base) * 0.5).round() as u16;
                assert_eq!(blended[i], expected);
            }
        }
    }

    #[test]
    fn full_blend_is_unblended_result() {
        let channels = k_and_c(48);
        let measurements = measurement_set(|p| p * 0.8);
        let options = CorrectionOptions {
            scaling: resolution(48),
            ..Default::default()
        };
        let a = run_simple_scaling_correction(
            &measurements,
            &channels,
            &k_and_c_weights(),
            &options,
        )
        .unwrap();
        let b = run_simple_scaling_correction(
            &measurements,
            &channels,
            &k_and_c_weights(),
            &CorrectionOptions {
                blend_percent: 250.,
                ..options
            },
        )
        .unwrap();
        assert_eq!(a.channels, b.channels);
    }

    #[test]
    fn without_measurements_channels_are_untouched() {
        let mut channels = k_and_c(64);
        let mut disabled = InkChannel::new(ramp(64, |t| 9000. * t), 9000);
        disabled.enabled = false;
        channels.insert("Y".to_string(), disabled);
        let result = run_simple_scaling_correction(
            &[],
            &channels,
            &DensityWeights::new(),
            &CorrectionOptions {
                scaling: resolution(64),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(result.gain.samples.iter().all(|&g| g == 1.));
        assert_eq!(result.passes.len(), 1);
        assert_eq!(result.metadata.residual.max, 0.);
        assert_eq!(result.channels.len(), 3);
        for (name, channel) in channels.iter() {
            assert_eq!(result.channels[name].samples, channel.samples);
            assert_eq!(result.channels[name].end_value, channel.end_value);
            assert_eq!(result.metadata.per_channel_lift[name], 0);
        }
    }

    #[test]
    fn single_iteration_runs_one_pass() {
        let result = run_simple_scaling_correction(
            &measurement_set(|p| p * 0.5),
            &k_and_c(32),
            &k_and_c_weights(),
            &CorrectionOptions {
                scaling: resolution(32),
                max_iterations: 0,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(result.passes.len(), 1);
        assert_eq!(result.passes[0].gain_curve, result.gain.samples);
    }

    #[test]
    fn at_most_one_follow_up_pass() {
        let result = run_simple_scaling_correction(
            &measurement_set(|p| p * 0.5),
            &k_and_c(32),
            &DensityWeights::new(),
            &CorrectionOptions {
                scaling: resolution(32),
                residual_threshold: 0.,
                max_iterations: 3,
                ..Default::default()
            },
        )
        .unwrap();
        assert!(result.passes[0].residual.max > 0.);
        assert_eq!(result.passes.len(), 2);
        assert_eq!(result.metadata.residual, result.passes[1].residual);
    }

    #[test]
    fn residual_analysis() {
        let stats = analyze_residual(&[1., 1.5, 1.2, 1.1], &[1., 1.2, 0., f64::NAN]);
        assert_eq!(stats.profile[0], 0.);
        assert!((stats.profile[1] - 0.25).abs() < 1e-12);
        assert_eq!(stats.profile[2], 0.);
        assert_eq!(stats.profile[3], 0.);
        assert!((stats.max - 0.25).abs() < 1e-12);
        assert!((stats.mean - 0.0625).abs() < 1e-12);
        assert_eq!(analyze_residual(&[], &[]), ResidualStats::default());
    }

    #[test]
    fn ink_limits_hold_across_passes() {
        let mut rng = rand::rng();
        for _ in 0..20 {
            let resolution_value = rng.random_range(16..96);
            let mut channels = ChannelSet::new();
            for (name, anchor) in [("K", true), ("C", false), ("LC", false), ("LK", false)] {
                let end_value = rng.random_range(1000..=60000u16);
                let exponent = rng.random_range(0.4f64..2.5f64);
                let samples = ramp(resolution_value, |t| end_value as f64 * t.powf(exponent));
                let channel = if anchor {
                    InkChannel::anchor(samples, end_value)
                } else {
                    InkChannel::new(samples, end_value)
                };
                channels.insert(name.to_string(), channel);
            }
            let scale = rng.random_range(0.4f64..1.3f64);
            let measurements = measurement_set(|p| if p >= 1. { 1. } else { p * scale });
            let max_lift_percent = rng.random_range(0f64..0.1f64);
            for allow_ceiling_lift in [false, true] {
                let result = run_simple_scaling_correction(
                    &measurements,
                    &channels,
                    &DensityWeights::new(),
                    &CorrectionOptions {
                        scaling: resolution(resolution_value),
                        normalization_mode: NormalizationMode::Density,
                        residual_threshold: 0.,
                        max_iterations: 3,
                        allow_ceiling_lift,
                        max_lift_percent,
                        ..Default::default()
                    },
                )
                .unwrap();
                for (name, adjusted) in result.channels.iter() {
                    let source = &channels[name];
                    let base_end = source.end_value as f64;
                    if allow_ceiling_lift {
                        assert!(adjusted.end_value as f64 <= (base_end * (1. + max_lift_percent)).round());
                    } else {
                        assert!(adjusted.end_value <= source.end_value);
                    }
                    if source.protected_anchor {
                        for (&out, &base) in adjusted.samples.iter().zip(source.samples.iter()) {
                            assert!(out <= base);
                        }
                    }
                }
                assert!(result.passes.len() <= 2);
                for pair in result.passes.windows(2) {
                    assert!(pair[1].residual.max <= pair[0].residual.max + 1e-3);
                }
            }
        }
    }
}
