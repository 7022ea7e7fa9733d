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
use crate::math::m_min;
use std::collections::BTreeMap;

/// Full-scale ink amount of a channel sample and of an ink limit.
pub const TOTAL_INK: u16 = 65535;

/// One ink channel of a printer profile.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct InkChannel {
    /// Ink amount per input position, evenly spaced from paper white to full input
    pub samples: Vec<u16>,
    /// Ink limit of the channel
    pub end_value: u16,
    /// Disabled channels are passed through untouched
    pub enabled: bool,
    /// Tonal anchor such as a black ink: may be reduced, never amplified
    pub protected_anchor: bool,
}

impl Default for InkChannel {
    fn default() -> Self {
        Self {
            samples: Vec::new(),
            end_value: 0,
            enabled: true,
            protected_anchor: false,
        }
    }
}

impl InkChannel {
    pub fn new(samples: Vec<u16>, end_value: u16) -> InkChannel {
        InkChannel {
            samples,
            end_value,
            ..Default::default()
        }
    }

    /// Same channel marked as the tonal anchor.
    pub fn anchor(samples: Vec<u16>, end_value: u16) -> InkChannel {
        InkChannel {
            protected_anchor: true,
            ..InkChannel::new(samples, end_value)
        }
    }

    /// Samples stretched onto `resolution` positions if the length differs.
    #[inline]
    pub fn samples_at(&self, resolution: usize) -> Vec<u16> {
        resample_nearest(&self.samples, resolution)
    }
}

/// Channels keyed by ink name.
pub type ChannelSet = BTreeMap<String, InkChannel>;

/// Relative usefulness of each ink for carrying density, keyed by ink name.
///
/// Missing or negative entries count as zero.
pub type DensityWeights = BTreeMap<String, f64>;

/// Channel after correction.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct AdjustedChannel {
    pub samples: Vec<u16>,
    pub end_value: u16,
    /// How far the ink limit was raised above `base_end`
    pub lift_applied: u16,
    /// Ink limit the correction started from
    pub base_end: u16,
}

impl AdjustedChannel {
    /// Channel carried through a correction without changes.
    pub(crate) fn untouched(channel: &InkChannel, resolution: usize) -> AdjustedChannel {
        AdjustedChannel {
            samples: channel.samples_at(resolution),
            end_value: channel.end_value,
            lift_applied: 0,
            base_end: channel.end_value,
        }
    }
}

/// Stretches `values` onto `resolution` positions by picking the nearest
/// source index, no interpolation between neighbours. Missing data reads as zero.
pub fn resample_nearest(values: &[u16], resolution: usize) -> Vec<u16> {
    if values.len() == resolution {
        return values.to_vec();
    }
    if values.is_empty() {
        return vec![0; resolution];
    }
    let last = values.len() - 1;
    let scale = if resolution > 1 { resolution - 1 } else { 1 };
    (0..resolution)
        .map(|i| {
            let t = i as f64 / scale as f64;
            values[m_min(last, (t * last as f64).round() as usize)]
        })
        .collect()
}
