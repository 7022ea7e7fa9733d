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
use crate::math::{EPSILON, m_min};

/// Piecewise cubic Hermite interpolant with shape-preserving tangents.
///
/// Between two knots the curve never leaves the range of their values,
/// so a gain curve fitted through sparse control points cannot overshoot
/// the band of its neighbours.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MonotoneSpline {
    knots: Vec<f64>,
    values: Vec<f64>,
    tangents: Vec<f64>,
}

impl MonotoneSpline {
    /// Knots must be ascending; repeated knots are allowed and act as a step.
    /// Extra entries of the longer slice are ignored.
    pub fn new(knots: &[f64], values: &[f64]) -> MonotoneSpline {
        let n = m_min(knots.len(), values.len());
        let knots = knots[..n].to_vec();
        let values = values[..n].to_vec();
        if n < 2 {
            return MonotoneSpline {
                knots,
                values,
                tangents: vec![0.; n],
            };
        }

        let widths = knots.windows(2).map(|w| w[1] - w[0]).collect::<Vec<_>>();
        let secants = widths
            .iter()
            .zip(values.windows(2))
            .map(|(&h, y)| if h > EPSILON { (y[1] - y[0]) / h } else { 0. })
            .collect::<Vec<_>>();

        let mut tangents = vec![0f64; n];
        tangents[0] = secants[0];
        tangents[n - 1] = secants[n - 2];
        for i in 1..n - 1 {
            let (d0, d1) = (secants[i - 1], secants[i]);
            if d0 * d1 <= 0. {
                // local extremum
                tangents[i] = 0.;
            } else {
                let w1 = 2. * widths[i] + widths[i - 1];
                let w2 = widths[i] + 2. * widths[i - 1];
                tangents[i] = (w1 + w2) / (w1 / d0 + w2 / d1);
            }
        }

        MonotoneSpline {
            knots,
            values,
            tangents,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.knots.is_empty()
    }

    /// Evaluates the curve, holding the end values outside the knot range.
    pub fn evaluate(&self, t: f64) -> f64 {
        let n = self.knots.len();
        if n == 0 {
            return 0.;
        }
        if n == 1 || t <= self.knots[0] {
            return self.values[0];
        }
        if t >= self.knots[n - 1] {
            return self.values[n - 1];
        }

        // knots[i] <= t < knots[i + 1], hence a non-empty interval
        let i = self.knots.partition_point(|&x| x <= t).saturating_sub(1);
        let i = m_min(i, n - 2);
        let h = self.knots[i + 1] - self.knots[i];
        let s = (t - self.knots[i]) / h;
        let s2 = s * s;
        let s3 = s2 * s;
        // Hermite basis
        let h00 = 2. * s3 - 3. * s2 + 1.;
        let h10 = s3 - 2. * s2 + s;
        let h01 = -2. * s3 + 3. * s2;
        let h11 = s3 - s2;
        self.values[i] * h00
            + h * self.tangents[i] * h10
            + self.values[i + 1] * h01
            + h * self.tangents[i + 1] * h11
    }
}
