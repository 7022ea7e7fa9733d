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
#![allow(clippy::manual_clamp)]
#![deny(unreachable_pub)]
//! Tonal correction for printer ink curves.
//!
//! Spot measurements of a printed step wedge are turned into a smooth
//! multiplicative gain curve, which is then applied to the ink channels of
//! a profile under per-sample and ink-limit constraints.
mod channels;
mod config;
mod correction;
mod err;
mod gain;
mod math;
mod measurement;
mod redistribute;
mod spline;

pub use channels::{
    AdjustedChannel, ChannelSet, DensityWeights, InkChannel, TOTAL_INK, resample_nearest,
};
pub use config::{
    DEFAULT_BLEND_PERCENT, DEFAULT_CLAMP_MAX, DEFAULT_CLAMP_MIN, DEFAULT_MAX_ITERATIONS,
    DEFAULT_MAX_LIFT_PERCENT, DEFAULT_MAX_SIGMA, DEFAULT_MIN_SIGMA, DEFAULT_RESIDUAL_INTENSITY,
    DEFAULT_RESIDUAL_THRESHOLD, DEFAULT_RESOLUTION, MAX_REDISTRIBUTION_ROUNDS, MAX_RELATIVE_GAIN,
    MIN_RESOLUTION, MIN_SIGMA_FLOOR, ScalingConfig, ScalingOptions, SmoothingOptions,
    configure_simple_scaling,
};
pub use correction::{
    CorrectionMetadata, CorrectionOptions, CorrectionPass, CorrectionResult, ResidualStats,
    analyze_residual, run_simple_scaling_correction,
};
pub use err::ScalingError;
pub use gain::{GainCurve, GainMetadata, GainOptions, generate_simple_scaling_gain};
pub use measurement::{
    MeasurementPoint, MeasurementRow, NormalizationMode, NormalizedResponse, ResponseMetadata,
    cie_density_from_lstar, lstar_from_density, lstar_to_y, normalized_response,
    sanitize_measurements,
};
pub use redistribute::{
    Redistribution, RedistributionMetadata, RedistributionOptions, apply_gain_to_channels,
};
pub use spline::MonotoneSpline;
