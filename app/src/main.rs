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
use inkgain::{
    ChannelSet, CorrectionOptions, DensityWeights, InkChannel, MeasurementRow, TOTAL_INK,
    lstar_from_density, run_simple_scaling_correction,
};
use log::{error, info};
use rand::Rng;

const RESOLUTION: usize = 256;

fn ramp(resolution: usize, start: f64, end: u16, gamma: f64) -> Vec<u16> {
    (0..resolution)
        .map(|i| {
            let t = i as f64 / (resolution - 1) as f64;
            if t < start {
                0
            } else {
                let local = (t - start) / (1. - start);
                (local.powf(gamma) * end as f64).round() as u16
            }
        })
        .collect()
}

fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .parse_default_env()
        .init();

    let mut rng = rand::rng();
    // 21 patch wedge printing a little too light in the midtones
    let measurements = (0..=20)
        .map(|i| {
            let input = i as f64 * 5.;
            let t = input / 100.;
            let density = 1.6 * t.powf(1.35) + rng.random_range(-0.01..0.01);
            MeasurementRow::new(input, lstar_from_density(density.max(0.)))
        })
        .collect::<Vec<_>>();

    let mut channels = ChannelSet::new();
    channels.insert(
        "K".to_string(),
        InkChannel::anchor(ramp(RESOLUTION, 0.45, 52000, 1.4), 52000),
    );
    channels.insert(
        "C".to_string(),
        InkChannel::new(ramp(RESOLUTION, 0.2, 30000, 1.1), 30000),
    );
    channels.insert(
        "LK".to_string(),
        InkChannel::new(ramp(RESOLUTION, 0., 24000, 0.9), 24000),
    );

    let weights: DensityWeights = [("K", 1.0), ("C", 0.45), ("LK", 0.3)]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

    let options = CorrectionOptions {
        allow_ceiling_lift: true,
        ..Default::default()
    };

    let result = match run_simple_scaling_correction(&measurements, &channels, &weights, &options)
    {
        Ok(result) => result,
        Err(err) => {
            error!("Correction failed: {err}");
            return;
        }
    };

    for (i, pass) in result.passes.iter().enumerate() {
        info!(
            "Pass {}: residual max {:.4}, mean {:.4}",
            i + 1,
            pass.residual.max,
            pass.residual.mean
        );
    }
    for (name, channel) in result.channels.iter() {
        let mid = channel.samples[channel.samples.len() / 2];
        info!(
            "{name}: end {} (was {}, +{}), midpoint {} ({:.1}% of full ink)",
            channel.end_value,
            channel.base_end,
            channel.lift_applied,
            mid,
            mid as f64 / TOTAL_INK as f64 * 100.
        );
    }
    let resolution = result.gain.resolution();
    let step = (resolution / 8).max(1);
    for i in (0..resolution).step_by(step) {
        println!(
            "{:>5.1}%  raw {:.4}  smoothed {:.4}",
            i as f64 / (resolution - 1).max(1) as f64 * 100.,
            result.gain.raw_samples[i],
            result.gain.samples[i]
        );
    }
}
