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
use tracing::debug;

use super::{
    buttons::TRACK_SELECT_OFFSET,
    channel::{ChannelIndex, ControllerState, RESERVED_CHANNEL},
    event::ControlEvent,
};

/// Buttons on the reserved strip: its record button and its track select.
const RESERVED_NOTES: [u8; 2] = [RESERVED_CHANNEL, TRACK_SELECT_OFFSET + RESERVED_CHANNEL];

/// Assigns the event to a channel. Returns false if the event must be dropped,
/// in which case the state is untouched.
pub fn route(state: &mut ControllerState, event: &ControlEvent) -> bool {
    if event.channel() == RESERVED_CHANNEL {
        debug!(event = ?event, "Dropping event on the reserved channel.");
        return false;
    }

    if let ControlEvent::Note { key, .. } = event {
        if RESERVED_NOTES.contains(key) {
            debug!(key, "Dropping reserved strip button.");
            return false;
        }
    }

    if event.adopts_channel() {
        match ChannelIndex::new(event.channel()) {
            Some(channel) => state.active = channel,
            None => {
                debug!(channel = event.channel(), "Dropping event without a slider.");
                return false;
            }
        }
    }

    true
}
