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
use serde::Deserialize;

use crate::{automation::UiAction, engine::Binding};

/// A YAML representation of a button mapping.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct ButtonBinding {
    /// The note the button sends.
    note: u8,

    /// The action to perform when it is pressed.
    action: UiAction,

    /// Re-read all slider values once the action succeeds.
    #[serde(default)]
    resync: bool,
}

impl ButtonBinding {
    pub fn new(note: u8, action: UiAction, resync: bool) -> ButtonBinding {
        ButtonBinding {
            note,
            action,
            resync,
        }
    }

    pub fn note(&self) -> u8 {
        self.note
    }

    /// Converts the mapping into the engine's binding.
    pub fn to_binding(&self) -> (u8, Binding) {
        (
            self.note,
            Binding {
                action: self.action,
                resync: self.resync,
            },
        )
    }
}

/// The stock Graphite MF8 layout: the record buttons on the first three strips
/// toggle the edit pane and apply presets, the arrows and transport buttons
/// navigate between photos.
pub fn default_bindings() -> Vec<ButtonBinding> {
    vec![
        ButtonBinding::new(0, UiAction::ToggleEditPane, false),
        ButtonBinding::new(1, UiAction::ApplyPresetEdits, true),
        ButtonBinding::new(2, UiAction::ApplyPresetEdits, false),
        ButtonBinding::new(46, UiAction::NavigatePrevious, false),
        ButtonBinding::new(91, UiAction::NavigatePrevious, false),
        ButtonBinding::new(47, UiAction::NavigateNext, false),
        ButtonBinding::new(92, UiAction::NavigateNext, false),
    ]
}
