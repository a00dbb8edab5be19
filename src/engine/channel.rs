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
use std::{
    collections::VecDeque,
    fmt,
    ops::{Index, IndexMut},
};

use crate::automation::Point;

use super::quantize::{HW_SLIDER_MAX, HW_SLIDER_MIN, HW_SLIDER_RANGE};

/// The number of sliders the bridge drives.
pub const CHANNEL_COUNT: usize = 7;

/// The hardware strip that has no slider behind it. Events on it are dropped.
pub const RESERVED_CHANNEL: u8 = 7;

/// How many quantized samples each channel remembers.
const SLIDER_BUFFER_SIZE: usize = 2;

/// A validated slider channel in [0, CHANNEL_COUNT).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelIndex(u8);

impl ChannelIndex {
    /// The channel the bridge starts on and returns to after a resync.
    pub const FIRST: ChannelIndex = ChannelIndex(0);

    /// Validates a raw channel number. The reserved strip and anything past it
    /// have no slider and are rejected.
    pub fn new(raw: u8) -> Option<ChannelIndex> {
        if usize::from(raw) < CHANNEL_COUNT {
            Some(ChannelIndex(raw))
        } else {
            None
        }
    }

    /// Iterates over every usable channel in order.
    pub fn all() -> impl Iterator<Item = ChannelIndex> {
        (0..CHANNEL_COUNT as u8).map(ChannelIndex)
    }

    pub fn as_u8(self) -> u8 {
        self.0
    }

    pub fn as_usize(self) -> usize {
        usize::from(self.0)
    }
}

impl fmt::Display for ChannelIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The most recent quantized samples for one slider, oldest first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SampleBuffer {
    values: VecDeque<i32>,
}

impl SampleBuffer {
    pub fn new(initial: i32) -> SampleBuffer {
        let mut values = VecDeque::with_capacity(SLIDER_BUFFER_SIZE + 1);
        values.push_back(initial);
        SampleBuffer { values }
    }

    /// Appends a sample, dropping the oldest one on overflow.
    pub fn push(&mut self, value: i32) {
        self.values.push_back(value);
        while self.values.len() > SLIDER_BUFFER_SIZE {
            self.values.pop_front();
        }
    }

    /// Replaces the whole history with a single known value.
    pub fn reset(&mut self, value: i32) {
        self.values.clear();
        self.values.push_back(value);
    }

    /// The most recent sample.
    pub fn last(&self) -> i32 {
        // Never empty: construction and reset both leave one value behind.
        self.values.back().copied().unwrap_or_default()
    }

    /// The sample before the most recent one, if there is one.
    pub fn previous(&self) -> Option<i32> {
        self.values
            .len()
            .checked_sub(2)
            .and_then(|i| self.values.get(i).copied())
    }

    /// Shifts the most recent sample without recording a new one.
    pub fn adjust_last(&mut self, delta: i32) {
        if let Some(last) = self.values.back_mut() {
            *last += delta;
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
}

impl Default for SampleBuffer {
    fn default() -> Self {
        SampleBuffer::new(0)
    }
}

/// Per-channel sample history.
#[derive(Clone, Debug, Default)]
pub struct ChannelStore {
    buffers: [SampleBuffer; CHANNEL_COUNT],
}

impl Index<ChannelIndex> for ChannelStore {
    type Output = SampleBuffer;

    fn index(&self, channel: ChannelIndex) -> &SampleBuffer {
        &self.buffers[channel.as_usize()]
    }
}

impl IndexMut<ChannelIndex> for ChannelStore {
    fn index_mut(&mut self, channel: ChannelIndex) -> &mut SampleBuffer {
        &mut self.buffers[channel.as_usize()]
    }
}

/// Where the sliders sit on screen. Measured once at startup.
#[derive(Clone, Debug, PartialEq)]
pub struct Layout {
    /// Left edge of each slider.
    anchors: [Point; CHANNEL_COUNT],
    /// Slider width in pixels. All sliders share it.
    width: f64,
}

impl Layout {
    pub fn new(anchors: [Point; CHANNEL_COUNT], width: f64) -> Layout {
        Layout { anchors, width }
    }

    pub fn anchor(&self, channel: ChannelIndex) -> Point {
        self.anchors[channel.as_usize()]
    }

    /// Pixels per raw hardware unit.
    pub fn scale(&self) -> f64 {
        self.width / f64::from(HW_SLIDER_RANGE)
    }

    pub fn half_width(&self) -> f64 {
        self.width / 2.0
    }

    /// The screen point that represents `value` on the given slider.
    pub fn target(&self, channel: ChannelIndex, value: i32, y_offset: f64) -> Point {
        let anchor = self.anchor(channel);
        Point::new(
            anchor.x + self.scale() * f64::from(value) + self.half_width(),
            anchor.y + y_offset,
        )
    }
}

/// The active channel bookkeeping shared by the router, translator and LEDs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ControllerState {
    /// The channel receiving slider and jog input.
    pub active: ChannelIndex,
    /// The channel whose LED was last lit. None until the first activation.
    pub last_active: Option<ChannelIndex>,
}

impl Default for ControllerState {
    fn default() -> Self {
        ControllerState {
            active: ChannelIndex::FIRST,
            last_active: None,
        }
    }
}

/// Whether a value sits on either end of the hardware range.
pub fn is_extreme(value: i32) -> bool {
    value == HW_SLIDER_MAX || value == HW_SLIDER_MIN
}
