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
use crate::err::ScalingError;
use crate::math::{EPSILON, cbrt, clamp01, exp, log10, m_clamp, m_max};
use std::fmt::Display;
use std::str::FromStr;

/// Measurement row as delivered by a measurement file parser.
///
/// Field names produced by the various parsers are accepted as aliases.
/// Missing values are kept as `None` and dropped by [sanitize_measurements].
#[derive(Debug, Copy, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeasurementRow {
    #[cfg_attr(
        feature = "serde",
        serde(default, alias = "inputPercent", alias = "gray", alias = "GRAY")
    )]
    pub input: Option<f64>,
    #[cfg_attr(
        feature = "serde",
        serde(default, alias = "labL", alias = "LAB_L", alias = "l", alias = "L")
    )]
    pub lab: Option<f64>,
}

impl MeasurementRow {
    pub const fn new(input: f64, lab: f64) -> MeasurementRow {
        MeasurementRow {
            input: Some(input),
            lab: Some(lab),
        }
    }
}

/// Sanitized spot measurement, both fields in `[0, 100]`.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeasurementPoint {
    /// Input tone position in percent
    pub input: f64,
    /// Measured L*
    pub lab: f64,
}

/// Space in which measured response is compared against the linear target.
#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NormalizationMode {
    /// Response is linear in L* between paper white and the deepest patch.
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "lstar"))]
    Lightness,
    /// Response is linear in CIE density.
    #[cfg_attr(feature = "serde", serde(rename = "density"))]
    Density,
}

impl FromStr for NormalizationMode {
    type Err = ScalingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lstar" => Ok(NormalizationMode::Lightness),
            "density" => Ok(NormalizationMode::Density),
            _ => Err(ScalingError::UnknownNormalizationMode),
        }
    }
}

impl Display for NormalizationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NormalizationMode::Lightness => f.write_str("lstar"),
            NormalizationMode::Density => f.write_str("density"),
        }
    }
}

/// Drops rows with missing or non-finite fields, clamps both fields to
/// `[0, 100]` and sorts by input. Rows sharing an input keep their order.
pub fn sanitize_measurements(rows: &[MeasurementRow]) -> Vec<MeasurementPoint> {
    let mut points = rows
        .iter()
        .filter_map(|row| match (row.input, row.lab) {
            (Some(input), Some(lab)) if input.is_finite() && lab.is_finite() => {
                Some(MeasurementPoint {
                    input: m_clamp(input, 0., 100.),
                    lab: m_clamp(lab, 0., 100.),
                })
            }
            _ => None,
        })
        .collect::<Vec<_>>();
    points.sort_by(|a, b| a.input.total_cmp(&b.input));
    points
}

/// CIE L* to relative luminance Y.
///
/// Cube law above L* = 8, linear segment below.
#[inline]
pub fn lstar_to_y(lstar: f64) -> f64 {
    let l = m_clamp(lstar, 0., 100.);
    if l > 8. {
        let f = (l + 16.) / 116.;
        f * f * f
    } else {
        l / 903.3
    }
}

/// CIE density `-log10(Y)`, luminance floored at 1e-6.
#[inline]
pub fn cie_density_from_lstar(lstar: f64) -> f64 {
    let y = m_clamp(lstar_to_y(lstar), 1e-6, 1.);
    -log10(y)
}

/// Inverse of [cie_density_from_lstar].
#[inline]
pub fn lstar_from_density(density: f64) -> f64 {
    let y = exp(-density * std::f64::consts::LN_10);
    if y > 0.008856 {
        116. * cbrt(y) - 16.
    } else {
        903.3 * y
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct DensityProfile {
    pub(crate) min_density: f64,
    pub(crate) max_density: f64,
    pub(crate) normalized: Vec<f64>,
}

pub(crate) fn density_profile(data: &[MeasurementPoint]) -> DensityProfile {
    if data.is_empty() {
        return DensityProfile::default();
    }
    let raw = data
        .iter()
        .map(|row| cie_density_from_lstar(row.lab))
        .collect::<Vec<_>>();
    let min_density = raw.iter().copied().fold(f64::INFINITY, f64::min);
    let max_density = raw.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = m_max(EPSILON, max_density - min_density);
    DensityProfile {
        min_density,
        max_density,
        normalized: raw
            .iter()
            .map(|&d| clamp01((d - min_density) / span))
            .collect(),
    }
}

/// Scale of the measured data, reported alongside the gain curve.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ResponseMetadata {
    pub min_density: f64,
    pub max_density: f64,
    /// L* of the lightest patch, lightness mode only
    pub highlight_lab: Option<f64>,
    /// L* of the deepest patch, lightness mode only
    pub shadow_lab: Option<f64>,
}

/// Measured response against the linear target, both in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct NormalizedResponse {
    pub normalized_values: Vec<f64>,
    pub target_values: Vec<f64>,
    pub metadata: ResponseMetadata,
}

fn pin_endpoints(values: &mut [f64]) {
    if let Some(last) = values.last_mut() {
        *last = 1.;
    }
    if let Some(first) = values.first_mut() {
        *first = 0.;
    }
}

/// Normalizes `data` in the chosen space.
///
/// `positions` are the measurement inputs as fractions and double as the
/// target: a linearized device tracks its input in the chosen space.
/// The first value of both series is pinned to 0 and the last to 1.
pub fn normalized_response(
    data: &[MeasurementPoint],
    positions: &[f64],
    mode: NormalizationMode,
) -> NormalizedResponse {
    if data.is_empty() {
        return NormalizedResponse::default();
    }

    let mut target_values = positions.iter().map(|&p| clamp01(p)).collect::<Vec<_>>();
    pin_endpoints(&mut target_values);

    let density = density_profile(data);

    let (mut normalized_values, metadata) = match mode {
        NormalizationMode::Density => (
            density.normalized,
            ResponseMetadata {
                min_density: density.min_density,
                max_density: density.max_density,
                highlight_lab: None,
                shadow_lab: None,
            },
        ),
        NormalizationMode::Lightness => {
            let highlight_lab = data[0].lab;
            let shadow_lab = data[data.len() - 1].lab;
            let lab_span = m_max(EPSILON, highlight_lab - shadow_lab);
            (
                data.iter()
                    .map(|row| clamp01((highlight_lab - row.lab) / lab_span))
                    .collect(),
                ResponseMetadata {
                    min_density: density.min_density,
                    max_density: density.max_density,
                    highlight_lab: Some(highlight_lab),
                    shadow_lab: Some(shadow_lab),
                },
            )
        }
    };
    pin_endpoints(&mut normalized_values);

    NormalizedResponse {
        normalized_values,
        target_values,
        metadata,
    }
}
