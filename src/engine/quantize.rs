// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

/// Highest value a fader reports. The range is asymmetric: +8192 never occurs.
pub const HW_SLIDER_MAX: i32 = 8191;
/// Lowest value a fader reports.
pub const HW_SLIDER_MIN: i32 = -8192;
/// Span of the fader range.
pub const HW_SLIDER_RANGE: i32 = HW_SLIDER_MAX - HW_SLIDER_MIN;

/// Rounds noisy fader samples down to a fixed grid so that small jitter does not
/// turn into pointer drags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Quantizer {
    step: i32,
}

impl Quantizer {
    /// Creates a quantizer with an explicit step. Steps below one are raised to one.
    pub fn new(step: i32) -> Quantizer {
        Quantizer { step: step.max(1) }
    }

    /// Derives the step from a sample period: the full range is split into
    /// `sample_period / 2` buckets.
    pub fn from_sample_period(sample_period: u16) -> Quantizer {
        let period = i32::from(sample_period.max(1));
        Quantizer::new((HW_SLIDER_RANGE + 1) / period * 2)
    }

    pub fn step(&self) -> i32 {
        self.step
    }

    /// Quantizes a raw fader sample toward zero. The top of the range passes
    /// through untouched, since the grid would otherwise pull it below its end stop.
    pub fn quantize(&self, raw: i32) -> i32 {
        if raw == HW_SLIDER_MAX {
            return raw;
        }

        let magnitude = raw.abs();
        let quantized = magnitude - magnitude % self.step;
        if raw < 0 {
            -quantized
        } else {
            quantized
        }
    }
}
