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
use crate::automation::PointerAction;

use super::channel::{is_extreme, ChannelIndex, ControllerState, Layout, SampleBuffer};

/// Decides what the pointer should do after a new fader sample was pushed onto
/// `buffer`.
///
/// Touching a different slider than last time clicks onto it, so the pointer is
/// seated without dragging from wherever it was. On the same slider the pointer
/// drags, but only when the quantized value moved or sits on an end stop.
pub fn slider_action(
    state: &ControllerState,
    layout: &Layout,
    channel: ChannelIndex,
    buffer: &SampleBuffer,
    y_offset: f64,
) -> Option<PointerAction> {
    let value = buffer.last();
    let target = layout.target(channel, value, y_offset);

    if state.last_active != Some(channel) {
        return Some(PointerAction::ClickAt(target));
    }

    if buffer.previous() != Some(value) || is_extreme(value) {
        Some(PointerAction::DragTo(target))
    } else {
        None
    }
}
