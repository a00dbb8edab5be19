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
use midly::{live::LiveEvent, MidiMessage};

/// A control surface event, reduced to the fields the engine acts on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlEvent {
    /// A fader moved. `value` is in [-8192, 8191].
    PitchBend { channel: u8, value: i16 },

    /// A continuous controller changed. The jog wheel reports here.
    ControlChange {
        channel: u8,
        controller: u8,
        value: u8,
    },

    /// A button was pressed or released.
    Note {
        channel: u8,
        key: u8,
        velocity: u8,
        on: bool,
    },

    /// Any other channel message (aftertouch, program change, ...).
    Other { channel: u8 },
}

impl ControlEvent {
    /// Converts a parsed MIDI event. System and realtime messages carry no
    /// channel and yield None.
    pub fn from_live(event: &LiveEvent) -> Option<ControlEvent> {
        let LiveEvent::Midi { channel, message } = event else {
            return None;
        };
        let channel = channel.as_int();

        Some(match *message {
            MidiMessage::PitchBend { bend } => ControlEvent::PitchBend {
                channel,
                value: bend.as_int(),
            },
            MidiMessage::Controller { controller, value } => ControlEvent::ControlChange {
                channel,
                controller: controller.as_int(),
                value: value.as_int(),
            },
            MidiMessage::NoteOn { key, vel } => ControlEvent::Note {
                channel,
                key: key.as_int(),
                velocity: vel.as_int(),
                on: true,
            },
            MidiMessage::NoteOff { key, vel } => ControlEvent::Note {
                channel,
                key: key.as_int(),
                velocity: vel.as_int(),
                on: false,
            },
            MidiMessage::Aftertouch { .. }
            | MidiMessage::ProgramChange { .. }
            | MidiMessage::ChannelAftertouch { .. } => ControlEvent::Other { channel },
        })
    }

    /// Parses raw MIDI bytes. Unparseable input yields None.
    pub fn parse(raw: &[u8]) -> Option<ControlEvent> {
        LiveEvent::parse(raw)
            .ok()
            .and_then(|event| ControlEvent::from_live(&event))
    }

    /// The channel the event was sent on.
    pub fn channel(&self) -> u8 {
        match *self {
            ControlEvent::PitchBend { channel, .. }
            | ControlEvent::ControlChange { channel, .. }
            | ControlEvent::Note { channel, .. }
            | ControlEvent::Other { channel } => channel,
        }
    }

    /// Whether the event moves the active channel to its own channel. Control
    /// changes and notes act on whatever channel is already active.
    pub fn adopts_channel(&self) -> bool {
        matches!(
            self,
            ControlEvent::PitchBend { .. } | ControlEvent::Other { .. }
        )
    }
}
