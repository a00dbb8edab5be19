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
use std::{sync::Arc, thread, time::Duration};

use midly::{
    live::LiveEvent,
    num::{u4, u7},
    MidiMessage,
};
use tracing::{debug, warn};

use crate::midi::Device;

use super::{
    buttons::TRACK_SELECT_OFFSET,
    channel::{ChannelIndex, ControllerState},
};

const LED_OFF: u8 = 0;
const LED_ON: u8 = 127;

/// Loading indicator, F1 through F5.
const LOADING_LED_BASE: u8 = 54;
pub const NUM_LOADING_LEDS: usize = 5;

/// Every strip LED: the red row (0-15) and the green row (16-31).
const STRIP_LEDS: std::ops::Range<u8> = 0..32;
/// Transport and shortcut LEDs lit at startup.
const SHORTCUT_LEDS: [u8; 4] = [0, 1, 91, 92];

/// LED groups swept by the self test.
const TEST_BANDS: [std::ops::Range<u8>; 5] = [0..16, 16..32, 91..96, 54..59, 46..48];

/// Drives the control surface LEDs. Output is fire and forget: failures are
/// logged and otherwise ignored.
pub struct Leds {
    device: Arc<dyn Device>,
}

impl Leds {
    pub fn new(device: Arc<dyn Device>) -> Leds {
        Leds { device }
    }

    /// Cycles every LED the bridge uses so that all strips start out in their
    /// secondary color.
    pub fn initialize(&self) {
        for key in STRIP_LEDS.chain(SHORTCUT_LEDS) {
            self.send(key, LED_OFF);
            self.send(key, LED_ON);
        }
    }

    /// Marks `channel` as the active strip. The new strip turns primary and the
    /// previous one falls back to the secondary color. Activating the strip that
    /// is already active sends nothing.
    pub fn activate(&self, state: &mut ControllerState, channel: ChannelIndex) {
        if state.last_active == Some(channel) {
            return;
        }

        debug!(
            channel = channel.as_u8(),
            previous = ?state.last_active.map(ChannelIndex::as_u8),
            "Activating channel LED."
        );
        self.send(strip_note(channel), LED_OFF);
        if let Some(previous) = state.last_active {
            self.send(strip_note(previous), LED_ON);
        }
        state.last_active = Some(channel);
    }

    /// Shows loading progress. Stages below NUM_LOADING_LEDS light that LED;
    /// NUM_LOADING_LEDS and above clear the whole indicator.
    pub fn loading(&self, stage: usize) {
        if stage >= NUM_LOADING_LEDS {
            for offset in 0..NUM_LOADING_LEDS as u8 {
                self.send(LOADING_LED_BASE + offset, LED_OFF);
            }
            return;
        }
        self.send(LOADING_LED_BASE + stage as u8, LED_ON);
    }

    /// Lights a button the user just pressed.
    pub fn echo(&self, channel: u8, key: u8, velocity: u8, on: bool) {
        let key = u7::from(key);
        let vel = u7::from(velocity);
        let message = if on {
            MidiMessage::NoteOn { key, vel }
        } else {
            MidiMessage::NoteOff { key, vel }
        };
        self.emit(LiveEvent::Midi {
            channel: u4::from(channel),
            message,
        });
    }

    /// Walks every LED band on and then off.
    pub fn sweep(&self, delay: Duration) {
        for velocity in [LED_ON, LED_OFF] {
            for band in TEST_BANDS {
                for key in band {
                    self.send(key, velocity);
                    thread::sleep(delay);
                }
            }
        }
    }

    fn send(&self, key: u8, velocity: u8) {
        self.emit(LiveEvent::Midi {
            channel: u4::from(0),
            message: MidiMessage::NoteOn {
                key: u7::from(key),
                vel: u7::from(velocity),
            },
        });
    }

    fn emit(&self, event: LiveEvent<'static>) {
        if let Err(e) = self.device.emit(event) {
            warn!(err = e.as_ref(), "Unable to update LED.");
        }
    }
}

/// The note that lights a channel's strip LED.
fn strip_note(channel: ChannelIndex) -> u8 {
    channel.as_u8() + TRACK_SELECT_OFFSET
}
