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
use super::quantize::{HW_SLIDER_MAX, HW_SLIDER_MIN, HW_SLIDER_RANGE};

/// The controller number the jog wheel reports on.
pub const JOG_CONTROLLER: u8 = 60;

/// Clockwise detent.
const JOG_INCREASE: u8 = 1;
/// Counter-clockwise detent.
const JOG_DECREASE: u8 = 65;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JogDirection {
    Increase,
    Decrease,
}

impl JogDirection {
    /// Decodes a jog wheel value. Anything but the two detent codes is ignored.
    pub fn from_value(value: u8) -> Option<JogDirection> {
        match value {
            JOG_INCREASE => Some(JogDirection::Increase),
            JOG_DECREASE => Some(JogDirection::Decrease),
            _ => None,
        }
    }

    /// Horizontal pointer movement for one detent. Always a single pixel,
    /// whatever the logical step is.
    pub fn pixels(self) -> i32 {
        match self {
            JogDirection::Increase => 1,
            JogDirection::Decrease => -1,
        }
    }
}

/// The logical value one detent moves a slider by, given how many steps the
/// on-screen slider has.
pub fn fine_grain_delta(software_steps: u16) -> i32 {
    (HW_SLIDER_RANGE + 1) / i32::from(software_steps.max(1))
}

/// The delta to apply to `last` for one detent. Zero if the step would carry the
/// value past the end of the range.
pub fn step(last: i32, direction: JogDirection, fine_grain_delta: i32) -> i32 {
    match direction {
        JogDirection::Increase if last + fine_grain_delta <= HW_SLIDER_MAX => fine_grain_delta,
        JogDirection::Decrease if last - fine_grain_delta >= HW_SLIDER_MIN => -fine_grain_delta,
        _ => 0,
    }
}
