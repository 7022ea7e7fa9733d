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
use crate::config::{
    DEFAULT_CLAMP_MAX, DEFAULT_CLAMP_MIN, DEFAULT_RESOLUTION, ScalingConfig, SmoothingOptions,
};
use crate::math::{EPSILON, clamp_to_band, clamp01, exp, m_max};
use crate::measurement::{
    MeasurementRow, NormalizationMode, ResponseMetadata, normalized_response,
    sanitize_measurements,
};
use crate::spline::MonotoneSpline;
use log::debug;

/// Options of gain curve synthesis.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct GainOptions {
    pub clamp_min: f64,
    pub clamp_max: f64,
    /// Number of evenly spaced samples of the resulting curve
    pub resolution: usize,
    pub smoothing: SmoothingOptions,
    pub normalization_mode: NormalizationMode,
}

impl Default for GainOptions {
    fn default() -> Self {
        Self {
            clamp_min: DEFAULT_CLAMP_MIN,
            clamp_max: DEFAULT_CLAMP_MAX,
            resolution: DEFAULT_RESOLUTION,
            smoothing: SmoothingOptions::default(),
            normalization_mode: NormalizationMode::default(),
        }
    }
}

impl From<ScalingConfig> for GainOptions {
    fn from(value: ScalingConfig) -> Self {
        Self {
            clamp_min: value.clamp_min,
            clamp_max: value.clamp_max,
            resolution: value.resolution,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct GainMetadata {
    /// `None` when no usable measurement was supplied
    pub normalization_mode: Option<NormalizationMode>,
    pub target_normalized: Vec<f64>,
    pub normalized_response: Vec<f64>,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub response: ResponseMetadata,
}

/// Multiplicative correction per tone position.
///
/// Every entry of `samples` and `raw_samples` lies in `[clamp_min, clamp_max]`,
/// control point gains at the first and last measurement are exactly 1.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct GainCurve {
    pub clamp_min: f64,
    pub clamp_max: f64,
    /// Measurement inputs as fractions
    pub positions: Vec<f64>,
    pub raw_gain: Vec<f64>,
    pub smoothed_gain: Vec<f64>,
    /// Smoothed curve sampled at `resolution` points
    pub samples: Vec<f64>,
    /// Unsmoothed curve sampled at `resolution` points
    pub raw_samples: Vec<f64>,
    /// Normalized response used to size the smoothing window
    pub normalized_density: Vec<f64>,
    pub metadata: GainMetadata,
}

impl GainCurve {
    /// Curve that leaves every channel untouched.
    pub fn unity(resolution: usize, clamp_min: f64, clamp_max: f64) -> GainCurve {
        GainCurve {
            clamp_min,
            clamp_max,
            samples: vec![1.; resolution],
            raw_samples: vec![1.; resolution],
            ..Default::default()
        }
    }

    #[inline]
    pub fn resolution(&self) -> usize {
        self.samples.len()
    }
}

/// Gaussian smoothing with a window that widens with density.
///
/// Shadow readings are noisier relative to their spread and get averaged
/// over more neighbours than highlights.
fn smooth_gain(
    positions: &[f64],
    raw_gain: &[f64],
    normalized_density: &[f64],
    smoothing: &SmoothingOptions,
) -> Vec<f64> {
    if positions.len() != raw_gain.len() || positions.len() != normalized_density.len() {
        return raw_gain.to_vec();
    }
    let (min_sigma, max_sigma) = smoothing.resolved();

    positions
        .iter()
        .zip(normalized_density.iter())
        .enumerate()
        .map(|(i, (&center, &density))| {
            let sigma = min_sigma + clamp01(density) * (max_sigma - min_sigma);
            let radius = sigma * 3.;
            let two_sigma_sq = 2. * sigma * sigma;
            let mut total_weight = 0f64;
            let mut weighted_sum = 0f64;
            for (&position, &gain) in positions.iter().zip(raw_gain.iter()) {
                let distance = (position - center).abs();
                if distance > radius {
                    continue;
                }
                let weight = exp(-(distance * distance) / two_sigma_sq);
                weighted_sum += gain * weight;
                total_weight += weight;
            }
            if total_weight > EPSILON {
                weighted_sum / total_weight
            } else {
                raw_gain[i]
            }
        })
        .collect()
}

/// Builds the gain curve that maps measured response onto the linear target.
///
/// Never fails: without usable measurements the curve is unity.
pub fn generate_simple_scaling_gain(
    measurements: &[MeasurementRow],
    options: &GainOptions,
) -> GainCurve {
    let GainOptions {
        clamp_min,
        clamp_max,
        resolution,
        smoothing,
        normalization_mode,
    } = *options;

    let sorted = sanitize_measurements(measurements);
    if sorted.is_empty() {
        debug!("No usable measurements, gain curve is unity");
        return GainCurve::unity(resolution, clamp_min, clamp_max);
    }

    let positions = sorted
        .iter()
        .map(|row| clamp01(row.input / 100.))
        .collect::<Vec<_>>();
    let response = normalized_response(&sorted, &positions, normalization_mode);
    let last = positions.len() - 1;

    let raw_gain = (0..positions.len())
        .map(|i| {
            if i == 0 || i == last {
                return 1.;
            }
            let desired = clamp01(response.target_values[i]);
            let actual = clamp01(response.normalized_values[i]);
            if desired <= EPSILON && actual <= EPSILON {
                1.
            } else if actual <= EPSILON {
                // nothing measured yet where ink is expected
                clamp_max
            } else {
                clamp_to_band(desired / m_max(EPSILON, actual), clamp_min, clamp_max)
            }
        })
        .collect::<Vec<_>>();

    let smoothed_gain = smooth_gain(
        &positions,
        &raw_gain,
        &response.normalized_values,
        &smoothing,
    )
    .into_iter()
    .enumerate()
    .map(|(i, value)| {
        if i == 0 || i == last {
            1.
        } else {
            clamp_to_band(value, clamp_min, clamp_max)
        }
    })
    .collect::<Vec<_>>();

    let spline = MonotoneSpline::new(&positions, &smoothed_gain);
    let raw_spline = MonotoneSpline::new(&positions, &raw_gain);

    let mut samples = Vec::with_capacity(resolution);
    let mut raw_samples = Vec::with_capacity(resolution);
    for i in 0..resolution {
        let t = if positions.len() == 1 {
            positions[0]
        } else if resolution > 1 {
            i as f64 / (resolution - 1) as f64
        } else {
            0.
        };
        samples.push(clamp_to_band(spline.evaluate(t), clamp_min, clamp_max));
        raw_samples.push(clamp_to_band(raw_spline.evaluate(t), clamp_min, clamp_max));
    }

    debug!(
        "Gain curve from {} measurements in {} space, samples within [{:.4}, {:.4}]",
        positions.len(),
        normalization_mode,
        samples.iter().copied().fold(f64::INFINITY, f64::min),
        samples.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    );

    GainCurve {
        clamp_min,
        clamp_max,
        positions,
        raw_gain,
        smoothed_gain,
        samples,
        raw_samples,
        normalized_density: response.normalized_values.clone(),
        metadata: GainMetadata {
            normalization_mode: Some(normalization_mode),
            target_normalized: response.target_values,
            normalized_response: response.normalized_values,
            response: response.metadata,
        },
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::measurement::lstar_from_density;
    use rand::Rng;

    /// Eleven patches whose density follows `mapper` over a 0.02..0.8 range.
    pub(crate) fn measurement_set(mapper: impl Fn(f64) -> f64) -> Vec<MeasurementRow> {
        const MIN_DENSITY: f64 = 0.02;
        const MAX_DENSITY: f64 = 0.8;
        (0..=10)
            .map(|step| {
                let input = step as f64 * 10.;
                let shaped = clamp01(mapper(input / 100.));
                let density = MIN_DENSITY + shaped * (MAX_DENSITY - MIN_DENSITY);
                MeasurementRow::new(input, lstar_from_density(density))
            })
            .collect()
    }

    fn density_options() -> GainOptions {
        GainOptions {
            normalization_mode: NormalizationMode::Density,
            ..Default::default()
        }
    }

    #[test]
    fn linear_data_keeps_unity() {
        let result = generate_simple_scaling_gain(&measurement_set(|p| p), &density_options());
        assert_eq!(result.samples.len(), 256);
        let max_deviation = result
            .samples
            .iter()
            .map(|v| (1. - v).abs())
            .fold(0f64, f64::max);
        assert!(max_deviation < 0.05);
        assert_eq!(result.raw_gain[0], 1.);
        assert_eq!(result.raw_gain[result.raw_gain.len() - 1], 1.);
    }

    #[test]
    fn undershooting_response_boosts_highlights() {
        let measurements = measurement_set(|p| if p >= 1. { 1. } else { p * 0.65 });
        let result = generate_simple_scaling_gain(
            &measurements,
            &GainOptions {
                clamp_max: 1.9,
                ..density_options()
            },
        );
        let highlight_max = result.samples[1..80]
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        assert!(highlight_max > 1.);
        assert!(highlight_max <= 1.9);
        assert!(result.samples[1..80].iter().all(|&v| v > 1.));
    }

    #[test]
    fn overshooting_response_attenuates_shadows() {
        let measurements = measurement_set(|p| (p * 1.25 + 0.05).min(1.));
        let result = generate_simple_scaling_gain(
            &measurements,
            &GainOptions {
                clamp_min: 0.8,
                ..density_options()
            },
        );
        // ~86% input
        let shadow_sample = result.samples[220];
        assert!(shadow_sample < 1.);
        assert!(shadow_sample >= 0.8);
    }

    #[test]
    fn lightness_mode_boosts_flat_midtones() {
        // Interior L* falls at 65% of the expected rate
        let measurements = (0..=10)
            .map(|step| {
                let p = step as f64 / 10.;
                let lab = if step == 10 { 20. } else { 95. - 75. * 0.65 * p };
                MeasurementRow::new(p * 100., lab)
            })
            .collect::<Vec<_>>();
        let result = generate_simple_scaling_gain(&measurements, &GainOptions::default());
        assert_eq!(
            result.metadata.normalization_mode,
            Some(NormalizationMode::Lightness)
        );
        assert_eq!(result.metadata.response.highlight_lab, Some(95.));
        assert!((result.raw_gain[5] - 1. / 0.65).abs() < 1e-9);
        assert!(result.samples[128] > 1.3);
    }

    #[test]
    fn empty_measurements_yield_unity() {
        let result = generate_simple_scaling_gain(
            &[MeasurementRow {
                input: None,
                lab: Some(50.),
            }],
            &GainOptions {
                resolution: 64,
                ..Default::default()
            },
        );
        assert_eq!(result.samples, vec![1.; 64]);
        assert_eq!(result.raw_samples, vec![1.; 64]);
        assert!(result.positions.is_empty());
        assert_eq!(result.metadata.normalization_mode, None);
    }

    #[test]
    fn single_measurement_is_flat() {
        let result =
            generate_simple_scaling_gain(&[MeasurementRow::new(40., 55.)], &GainOptions::default());
        assert_eq!(result.raw_gain, vec![1.]);
        assert!(result.samples.iter().all(|&v| v == 1.));
    }

    #[test]
    fn zero_response_pins_to_clamp_max() {
        let measurements = [
            MeasurementRow::new(0., 95.),
            MeasurementRow::new(30., 95.),
            MeasurementRow::new(100., 20.),
        ];
        let result = generate_simple_scaling_gain(&measurements, &GainOptions::default());
        assert_eq!(result.raw_gain, vec![1., 1.9, 1.]);
    }

    #[test]
    fn samples_stay_in_band_for_noisy_data() {
        let mut rng = rand::rng();
        for _ in 0..40 {
            let count = rng.random_range(2..24);
            let measurements = (0..count)
                .map(|_| {
                    MeasurementRow::new(
                        rng.random_range(-10f64..110f64),
                        rng.random_range(-5f64..105f64),
                    )
                })
                .collect::<Vec<_>>();
            let options = GainOptions {
                clamp_min: rng.random_range(0.5f64..1f64),
                clamp_max: rng.random_range(1f64..2.5f64),
                resolution: rng.random_range(16..300),
                normalization_mode: if rng.random_bool(0.5) {
                    NormalizationMode::Density
                } else {
                    NormalizationMode::Lightness
                },
                ..Default::default()
            };
            let result = generate_simple_scaling_gain(&measurements, &options);
            assert_eq!(result.samples.len(), options.resolution);
            for (&s, &r) in result.samples.iter().zip(result.raw_samples.iter()) {
                assert!(s >= options.clamp_min && s <= options.clamp_max);
                assert!(r >= options.clamp_min && r <= options.clamp_max);
            }
            assert_eq!(result.raw_gain[0], 1.);
            assert_eq!(result.smoothed_gain[result.smoothed_gain.len() - 1], 1.);
        }
    }
}
