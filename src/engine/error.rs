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
use crate::{
    automation::{AutomationError, UiAction},
    config::ConfigError,
};

/// Errors that stop the bridge.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Automation(#[from] AutomationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{action} returned exit code {code}")]
    ActionFailed { action: UiAction, code: i32 },

    #[error("slider \"{description}\" not found after {attempts} attempts, is the edit pane open?")]
    EditPaneNotFound { description: String, attempts: u32 },

    #[error("unable to parse {attribute} of \"{description}\" from {reply:?}")]
    MalformedReply {
        attribute: &'static str,
        description: String,
        reply: String,
    },
}
