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
use crate::channels::{AdjustedChannel, ChannelSet, DensityWeights, TOTAL_INK};
use crate::config::{MAX_REDISTRIBUTION_ROUNDS, MAX_RELATIVE_GAIN};
use crate::err::ScalingError;
use crate::math::{EPSILON, finite_or, m_clamp, m_max, m_min};
use log::{debug, trace};
use std::collections::BTreeMap;

/// Blend of the recipient weight: ink share at the position, density weight
/// share, and a flat floor so channels without ink there can still receive.
const BASE_SHARE_WEIGHT: f64 = 0.55;
const DENSITY_SHARE_WEIGHT: f64 = 0.35;
const FLOOR_WEIGHT: f64 = 0.1;

#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct RedistributionOptions {
    /// Lets a channel's ink limit rise above its current end value
    pub allow_ceiling_lift: bool,
    /// Upper bound of the limit lift as a fraction of the end value
    pub max_lift_percent: f64,
}

impl Default for RedistributionOptions {
    fn default() -> Self {
        Self {
            allow_ceiling_lift: false,
            max_lift_percent: MAX_RELATIVE_GAIN,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct RedistributionMetadata {
    /// Ink increase per position that no channel could take
    pub residual_overflow: Vec<f64>,
    pub per_channel_lift: BTreeMap<String, u16>,
    /// Limit lift the gain curve asked for, as a fraction of the end value
    pub requested_lift_ratio: BTreeMap<String, f64>,
    /// Highest ink amount the gain curve asked for
    pub requested_peak: BTreeMap<String, f64>,
}

/// Result of [apply_gain_to_channels]. Only participating channels are present.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Redistribution {
    pub channels: BTreeMap<String, AdjustedChannel>,
    pub metadata: RedistributionMetadata,
}

/// Per pass working state of one channel.
struct ChannelState<'a> {
    name: &'a str,
    base_end: u16,
    max_lift: f64,
    current_limit: f64,
    samples: Vec<u16>,
    adjusted: Vec<f64>,
    requested_peak: f64,
    requested_lift_ratio: f64,
    protected_anchor: bool,
    density_share: f64,
}

/// Standing of one channel at a single tone position.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub(crate) struct Slot {
    pub(crate) applied: f64,
    pub(crate) cap: f64,
    /// Channel's share of baseline ink at this position
    pub(crate) base_share: f64,
    pub(crate) density_share: f64,
}

impl Slot {
    #[inline]
    fn capacity(&self) -> f64 {
        m_max(0., self.cap - self.applied)
    }
}

/// Spreads `overflow` over slots with spare capacity, proportionally to
/// weight times capacity and never past a slot's cap. Repeats while both
/// overflow and capacity remain, at most `max_rounds` times.
///
/// Returns the overflow that could not be placed.
pub(crate) fn cascade_overflow(slots: &mut [Slot], overflow: f64, max_rounds: usize) -> f64 {
    let mut remaining = overflow;
    let mut recipients = Vec::with_capacity(slots.len());
    for _ in 0..max_rounds {
        if remaining <= EPSILON {
            break;
        }
        recipients.clear();
        recipients.extend(slots.iter().enumerate().filter_map(|(index, slot)| {
            let capacity = slot.capacity();
            if capacity <= EPSILON {
                return None;
            }
            let weight = BASE_SHARE_WEIGHT * slot.base_share
                + DENSITY_SHARE_WEIGHT * slot.density_share
                + FLOOR_WEIGHT;
            Some((index, capacity, weight * capacity))
        }));
        if recipients.is_empty() {
            break;
        }
        let total_weight = recipients.iter().map(|&(_, _, w)| w).sum::<f64>();
        if total_weight <= EPSILON {
            break;
        }

        let mut consumed = 0f64;
        for &(index, capacity, weight) in recipients.iter() {
            let share = m_min(capacity, weight / total_weight * remaining);
            if share <= EPSILON {
                continue;
            }
            let slot = &mut slots[index];
            let next = m_min(slot.cap, slot.applied + share);
            let delta = m_max(0., next - slot.applied);
            if delta > EPSILON {
                slot.applied = next;
                consumed += delta;
            }
        }
        if consumed <= EPSILON {
            break;
        }
        remaining = m_max(0., remaining - consumed);
    }
    remaining
}

/// Scales every participating channel by `gain_curve` under the per-sample
/// amplification ceiling and the channel ink limit, then hands whatever a
/// channel could not take to channels with spare room at the same position.
///
/// A channel participates if it is enabled and carries ink. The curve length
/// sets the working resolution; channel samples are stretched onto it.
/// Protected anchors are never raised above their own samples.
/// Fails only when the gain curve is empty.
pub fn apply_gain_to_channels(
    channels: &ChannelSet,
    gain_curve: &[f64],
    options: &RedistributionOptions,
    density_weights: &DensityWeights,
) -> Result<Redistribution, ScalingError> {
    apply_gain_with_rounds(
        channels,
        gain_curve,
        options,
        density_weights,
        MAX_REDISTRIBUTION_ROUNDS,
    )
}

pub(crate) fn apply_gain_with_rounds(
    channels: &ChannelSet,
    gain_curve: &[f64],
    options: &RedistributionOptions,
    density_weights: &DensityWeights,
    max_rounds: usize,
) -> Result<Redistribution, ScalingError> {
    if gain_curve.is_empty() {
        return Err(ScalingError::EmptyGainCurve);
    }
    let resolution = gain_curve.len();
    let gain = gain_curve
        .iter()
        .map(|&g| finite_or(g, 1.))
        .collect::<Vec<_>>();
    let total = TOTAL_INK as f64;
    let max_lift_percent = m_max(0., finite_or(options.max_lift_percent, 0.));

    let mut states = channels
        .iter()
        .filter(|(_, channel)| channel.enabled)
        .filter_map(|(name, channel)| {
            let samples = channel.samples_at(resolution);
            if samples.iter().all(|&v| v == 0) {
                return None;
            }
            let base_end = channel.end_value;
            let base_end_f = base_end as f64;
            let requested_peak = samples
                .iter()
                .zip(gain.iter())
                .map(|(&v, &g)| m_clamp(v as f64 * g, 0., total))
                .fold(0f64, f64::max);
            let requested_lift_ratio = if base_end > 0 {
                m_max(0., (requested_peak - base_end_f) / base_end_f)
            } else {
                0.
            };
            let lift_percent = if channel.protected_anchor {
                0.
            } else {
                m_min(
                    m_min(max_lift_percent, requested_lift_ratio),
                    MAX_RELATIVE_GAIN,
                )
            };
            let max_lift = if options.allow_ceiling_lift {
                m_min(total, (base_end_f * (1. + lift_percent)).round())
            } else {
                base_end_f
            };
            Some(ChannelState {
                name: name.as_str(),
                base_end,
                max_lift,
                current_limit: base_end_f,
                samples,
                adjusted: vec![0.; resolution],
                requested_peak,
                requested_lift_ratio,
                protected_anchor: channel.protected_anchor,
                density_share: 0.,
            })
        })
        .collect::<Vec<_>>();

    let raw_weights = states
        .iter()
        .map(|state| {
            let weight = density_weights.get(state.name).copied().unwrap_or(0.);
            m_max(0., finite_or(weight, 0.))
        })
        .collect::<Vec<_>>();
    let weight_sum = raw_weights.iter().sum::<f64>();
    for (state, &weight) in states.iter_mut().zip(raw_weights.iter()) {
        state.density_share = if weight_sum > EPSILON {
            weight / weight_sum
        } else {
            // uniform when no density weights were supplied
            1. / raw_weights.len() as f64
        };
    }

    debug!(
        "Applying gain over {} positions to {} of {} channels, ceiling lift {}",
        resolution,
        states.len(),
        channels.len(),
        options.allow_ceiling_lift
    );

    let mut residual_overflow = vec![0f64; resolution];
    let mut slots = vec![Slot::default(); states.len()];

    for (index, &g) in gain.iter().enumerate() {
        let baseline_total = states
            .iter()
            .map(|state| state.samples[index] as f64)
            .sum::<f64>();
        let requested_gain = m_max(0., g - 1.);
        let allowed_gain = m_min(requested_gain, MAX_RELATIVE_GAIN);

        let mut overflow = 0f64;
        for (state, slot) in states.iter().zip(slots.iter_mut()) {
            let base_value = state.samples[index] as f64;
            let requested = m_clamp(base_value * g, 0., total);

            let mut cap = if base_value > EPSILON {
                m_clamp(base_value * (1. + allowed_gain), 0., state.max_lift)
            } else if requested > 0. {
                m_clamp(state.base_end as f64 * allowed_gain, 0., state.max_lift)
            } else {
                0.
            };
            if state.protected_anchor {
                cap = m_min(cap, base_value);
            }

            let applied = m_min(cap, requested);
            overflow += m_max(0., requested - applied);
            *slot = Slot {
                applied,
                cap,
                base_share: if baseline_total > EPSILON {
                    base_value / baseline_total
                } else {
                    0.
                },
                density_share: state.density_share,
            };
        }

        let remaining = cascade_overflow(&mut slots, overflow, max_rounds);

        for (state, slot) in states.iter_mut().zip(slots.iter()) {
            state.adjusted[index] = slot.applied;
            state.current_limit = m_max(state.current_limit, slot.applied);
        }

        if remaining > EPSILON {
            trace!("Position {index}: {remaining:.1} ink of overflow left unplaced");
            residual_overflow[index] = remaining;
        }
    }

    let mut adjusted = BTreeMap::new();
    let mut per_channel_lift = BTreeMap::new();
    let mut requested_lift_ratio = BTreeMap::new();
    let mut requested_peak = BTreeMap::new();
    for state in states {
        let end_value = m_min(state.current_limit, state.max_lift).round() as u16;
        let lift_applied = end_value.saturating_sub(state.base_end);
        let samples = state
            .adjusted
            .iter()
            .map(|&v| m_clamp(v, 0., total).round() as u16)
            .collect();
        adjusted.insert(
            state.name.to_string(),
            AdjustedChannel {
                samples,
                end_value,
                lift_applied,
                base_end: state.base_end,
            },
        );
        per_channel_lift.insert(state.name.to_string(), lift_applied);
        requested_lift_ratio.insert(
            state.name.to_string(),
            finite_or(state.requested_lift_ratio, 0.),
        );
        requested_peak.insert(state.name.to_string(), state.requested_peak);
    }

    Ok(Redistribution {
        channels: adjusted,
        metadata: RedistributionMetadata {
            residual_overflow,
            per_channel_lift,
            requested_lift_ratio,
            requested_peak,
        },
    })
}
