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
use std::{fmt, io, sync::Arc};

use serde::Deserialize;

mod macos;
mod mock;

/// A screen coordinate in points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Point {
        Point { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

/// A UI action performed through the accessibility driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UiAction {
    /// Brings the target application to the front.
    #[serde(skip)]
    Activate,
    NavigatePrevious,
    NavigateNext,
    ToggleEditPane,
    ApplyPresetEdits,
}

impl fmt::Display for UiAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UiAction::Activate => "activate",
            UiAction::NavigatePrevious => "navigate_previous",
            UiAction::NavigateNext => "navigate_next",
            UiAction::ToggleEditPane => "toggle_edit_pane",
            UiAction::ApplyPresetEdits => "apply_preset_edits",
        })
    }
}

/// A pointer command.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerAction {
    /// Moves to the point and clicks there.
    ClickAt(Point),
    /// Moves without pressing.
    MoveTo(Point),
    /// Presses at the current position and releases at the point.
    DragTo(Point),
    /// Presses at the current position and releases at an offset from it.
    DragBy { dx: i32, dy: i32 },
}

impl PointerAction {
    /// Sends the action to the given pointer.
    pub fn apply(self, pointer: &dyn Pointer) -> Result<(), AutomationError> {
        match self {
            PointerAction::ClickAt(point) => pointer.click_at(point),
            PointerAction::MoveTo(point) => pointer.move_to(point),
            PointerAction::DragTo(point) => pointer.drag_to(point),
            PointerAction::DragBy { dx, dy } => pointer.drag_by(dx, dy),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AutomationError {
    #[error("unable to run {program}: {source}")]
    Spawn {
        program: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("{program} exited with status {status}: {stderr}")]
    Failed {
        program: &'static str,
        status: i32,
        stderr: String,
    },
}

/// Reads and clicks elements of the target application's window.
pub trait Ui: Send + Sync {
    /// Reads `attribute` of the slider with the given accessibility description.
    /// An empty string means the slider is not on screen.
    fn query(&self, attribute: &str, description: &str) -> Result<String, AutomationError>;

    /// Clicks the first element of class `class` with the given description.
    fn click(&self, class: &str, description: &str) -> Result<(), AutomationError>;

    /// Performs an action and returns its exit code. Zero is success.
    fn perform(&self, action: UiAction) -> Result<i32, AutomationError>;
}

/// Synthesizes pointer input.
pub trait Pointer: Send + Sync {
    fn click_at(&self, point: Point) -> Result<(), AutomationError>;

    fn move_to(&self, point: Point) -> Result<(), AutomationError>;

    fn drag_to(&self, point: Point) -> Result<(), AutomationError>;

    fn drag_by(&self, dx: i32, dy: i32) -> Result<(), AutomationError>;
}

/// Gets the UI driver and pointer for the given application. Application names
/// starting with "mock" get the recording mock.
pub fn get(application: &str) -> (Arc<dyn Ui>, Arc<dyn Pointer>) {
    if application.starts_with("mock") {
        let automation = Arc::new(mock::Automation::new(application));
        return (automation.clone(), automation);
    }

    (
        Arc::new(macos::AppleScript::new(application)),
        Arc::new(macos::Cliclick::default()),
    )
}
