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
use std::collections::HashMap;

use crate::automation::UiAction;

use super::channel::ChannelIndex;

/// Velocity the surface reports for a button press.
pub const PRESS_VELOCITY: u8 = 127;

/// The first track select button. Track select `n` is note `n + 8`.
pub const TRACK_SELECT_OFFSET: u8 = 8;

/// Number of notes in the track select band.
const TRACK_SELECT_BAND: u8 = 16;

/// What a mapped button does.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Binding {
    /// The UI action to perform.
    pub action: UiAction,
    /// Re-read every slider value after the action succeeded.
    pub resync: bool,
}

/// The outcome of looking up a pressed button.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Press {
    Bound(Binding),
    Select(ChannelIndex),
    Ignored,
}

/// Maps button notes to actions.
#[derive(Clone, Debug, Default)]
pub struct ButtonMap {
    bindings: HashMap<u8, Binding>,
}

impl ButtonMap {
    pub fn new(bindings: impl IntoIterator<Item = (u8, Binding)>) -> ButtonMap {
        ButtonMap {
            bindings: bindings.into_iter().collect(),
        }
    }

    /// Resolves a pressed note. Bound notes win over the track select band.
    pub fn resolve(&self, key: u8) -> Press {
        if let Some(binding) = self.bindings.get(&key) {
            return Press::Bound(*binding);
        }

        match key.checked_sub(TRACK_SELECT_OFFSET) {
            Some(index) if index < TRACK_SELECT_BAND => {
                ChannelIndex::new(index).map_or(Press::Ignored, Press::Select)
            }
            _ => Press::Ignored,
        }
    }
}

#[cfg(test)]
mod test {
    use crate::automation::UiAction;
    use crate::engine::channel::ChannelIndex;

    use super::{Binding, ButtonMap, Press};

    fn map() -> ButtonMap {
        ButtonMap::new([
            (
                0,
                Binding {
                    action: UiAction::ToggleEditPane,
                    resync: false,
                },
            ),
            (
                1,
                Binding {
                    action: UiAction::ApplyPresetEdits,
                    resync: true,
                },
            ),
            (
                47,
                Binding {
                    action: UiAction::NavigateNext,
                    resync: false,
                },
            ),
        ])
    }

    #[test]
    fn bound_buttons() {
        let map = map();
        assert_eq!(
            Press::Bound(Binding {
                action: UiAction::NavigateNext,
                resync: false
            }),
            map.resolve(47)
        );
        assert_eq!(
            Press::Bound(Binding {
                action: UiAction::ApplyPresetEdits,
                resync: true
            }),
            map.resolve(1)
        );
    }

    #[test]
    fn track_select_band() {
        let map = map();
        for index in 0..7 {
            assert_eq!(
                Press::Select(ChannelIndex::new(index).expect("valid channel")),
                map.resolve(index + 8)
            );
        }
        // The reserved strip and the mute/solo rows above it have no slider.
        for key in 15..=23 {
            assert_eq!(Press::Ignored, map.resolve(key));
        }
    }

    #[test]
    fn unknown_buttons_are_ignored() {
        let map = map();
        for key in [2, 5, 24, 46, 54, 91, 127] {
            assert_eq!(Press::Ignored, map.resolve(key));
        }
    }
}
