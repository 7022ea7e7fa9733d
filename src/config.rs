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
use crate::math::{finite_or, m_max};

pub const DEFAULT_CLAMP_MIN: f64 = 0.85;
pub const DEFAULT_CLAMP_MAX: f64 = 1.9;
pub const DEFAULT_RESOLUTION: usize = 256;
/// Gain curves coarser than this cannot describe a tone response.
pub const MIN_RESOLUTION: usize = 16;

pub const DEFAULT_MIN_SIGMA: f64 = 0.02;
pub const DEFAULT_MAX_SIGMA: f64 = 0.08;
pub const MIN_SIGMA_FLOOR: f64 = 0.005;

/// Hard ceiling on per-sample amplification and on any channel's ink limit lift.
pub const MAX_RELATIVE_GAIN: f64 = 0.15;
pub const MAX_REDISTRIBUTION_ROUNDS: usize = 6;

pub const DEFAULT_MAX_LIFT_PERCENT: f64 = 0.02;
pub const DEFAULT_MAX_ITERATIONS: usize = 2;
pub const DEFAULT_RESIDUAL_THRESHOLD: f64 = 0.05;
pub const DEFAULT_RESIDUAL_INTENSITY: f64 = 0.3;
pub const DEFAULT_BLEND_PERCENT: f64 = 100.;

/// Caller overrides for the gain band and curve resolution.
///
/// Unset or non-finite fields take the defaults.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct ScalingOptions {
    pub clamp_min: Option<f64>,
    pub clamp_max: Option<f64>,
    pub resolution: Option<usize>,
}

/// Resolved gain band and resolution.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ScalingConfig {
    pub clamp_min: f64,
    pub clamp_max: f64,
    pub resolution: usize,
}

impl Default for ScalingConfig {
    fn default() -> Self {
        Self {
            clamp_min: DEFAULT_CLAMP_MIN,
            clamp_max: DEFAULT_CLAMP_MAX,
            resolution: DEFAULT_RESOLUTION,
        }
    }
}

/// Merges overrides with the defaults. Resolution is floored at [MIN_RESOLUTION].
pub fn configure_simple_scaling(options: &ScalingOptions) -> ScalingConfig {
    ScalingConfig {
        clamp_min: options
            .clamp_min
            .map_or(DEFAULT_CLAMP_MIN, |v| finite_or(v, DEFAULT_CLAMP_MIN)),
        clamp_max: options
            .clamp_max
            .map_or(DEFAULT_CLAMP_MAX, |v| finite_or(v, DEFAULT_CLAMP_MAX)),
        resolution: options
            .resolution
            .map_or(DEFAULT_RESOLUTION, |v| m_max(v, MIN_RESOLUTION)),
    }
}

/// Width of the adaptive Gaussian window used to smooth raw gain.
///
/// Highlights use `min_sigma`, the deepest measured tone uses `max_sigma`.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct SmoothingOptions {
    pub min_sigma: f64,
    pub max_sigma: f64,
}

impl Default for SmoothingOptions {
    fn default() -> Self {
        Self {
            min_sigma: DEFAULT_MIN_SIGMA,
            max_sigma: DEFAULT_MAX_SIGMA,
        }
    }
}

impl SmoothingOptions {
    /// Returns `(min_sigma, max_sigma)` with the floor applied and the
    /// upper bound never below the lower one.
    pub(crate) fn resolved(&self) -> (f64, f64) {
        let min_sigma = m_max(finite_or(self.min_sigma, DEFAULT_MIN_SIGMA), MIN_SIGMA_FLOOR);
        let max_sigma = m_max(finite_or(self.max_sigma, DEFAULT_MAX_SIGMA), min_sigma);
        (min_sigma, max_sigma)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_merge_with_defaults() {
        let config = configure_simple_scaling(&ScalingOptions {
            clamp_min: Some(0.9),
            ..Default::default()
        });
        assert_eq!(config.clamp_min, 0.9);
        assert_eq!(config.clamp_max, 1.9);
        assert_eq!(config.resolution, 256);
    }

    #[test]
    fn non_finite_overrides_fall_back() {
        let config = configure_simple_scaling(&ScalingOptions {
            clamp_min: Some(f64::NAN),
            clamp_max: Some(f64::INFINITY),
            resolution: Some(4),
        });
        assert_eq!(config.clamp_min, DEFAULT_CLAMP_MIN);
        assert_eq!(config.clamp_max, DEFAULT_CLAMP_MAX);
        assert_eq!(config.resolution, MIN_RESOLUTION);
    }

    #[test]
    fn sigma_floor() {
        let (lo, hi) = SmoothingOptions {
            min_sigma: 0.001,
            max_sigma: 0.0001,
        }
        .resolved();
        assert_eq!(lo, MIN_SIGMA_FLOOR);
        assert_eq!(hi, MIN_SIGMA_FLOOR);
    }
}
