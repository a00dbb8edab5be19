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
use std::process::{Command, Output, Stdio};

use tracing::{debug, warn};

use super::{AutomationError, Point, UiAction};

const OSASCRIPT: &str = "osascript";
const CLICLICK: &str = "cliclick";

/// Runs AppleScript against the target application through System Events.
pub struct AppleScript {
    application: String,
}

impl AppleScript {
    pub fn new(application: &str) -> AppleScript {
        AppleScript {
            application: application.to_string(),
        }
    }

    /// Walks the front window's contents looking for the first element of
    /// `class` with `description`, then runs `body` against it.
    fn find_element_script(&self, class: &str, description: &str, body: &str) -> String {
        let application = escape(&self.application);
        format!(
            r#"tell application "{application}" to activate
tell application "System Events"
    tell process "{application}"
        set itemVals to {{}}
        set listItems to (entire contents of window 1 as list)
        repeat with thisItem in listItems
            if (class of thisItem is {class}) then
                if description of thisItem is "{description}" then
                    {body}
                    exit repeat
                end if
            end if
        end repeat
        return itemVals
    end tell
end tell"#,
            description = escape(description),
        )
    }

    fn action_script(&self, action: UiAction) -> String {
        let keys = match action {
            UiAction::Activate => {
                return format!(
                    r#"tell application "{}" to activate"#,
                    escape(&self.application)
                )
            }
            UiAction::NavigatePrevious => "key code 123",
            UiAction::NavigateNext => "key code 124",
            UiAction::ToggleEditPane => "key code 36",
            UiAction::ApplyPresetEdits => r#"keystroke "e" using {command down}"#,
        };
        format!(r#"tell application "System Events" to {keys}"#)
    }
}

impl super::Ui for AppleScript {
    fn query(&self, attribute: &str, description: &str) -> Result<String, AutomationError> {
        let script = self.find_element_script(
            "slider",
            description,
            &format!("copy {attribute} of thisItem to end of itemVals"),
        );
        let output = run(OSASCRIPT, &["-e", &script])?;
        if !output.status.success() {
            warn!(
                attribute,
                description,
                stderr = String::from_utf8_lossy(&output.stderr).trim(),
                "Slider query failed."
            );
            return Ok(String::new());
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn click(&self, class: &str, description: &str) -> Result<(), AutomationError> {
        let script = self.find_element_script(class, description, "click thisItem");
        let output = run(OSASCRIPT, &["-e", &script])?;
        if !output.status.success() {
            warn!(
                class,
                description,
                stderr = String::from_utf8_lossy(&output.stderr).trim(),
                "Click failed."
            );
        }
        Ok(())
    }

    fn perform(&self, action: UiAction) -> Result<i32, AutomationError> {
        let output = run(OSASCRIPT, &["-e", &self.action_script(action)])?;
        let code = output.status.code().unwrap_or(-1);
        if code != 0 {
            warn!(
                %action,
                code,
                stderr = String::from_utf8_lossy(&output.stderr).trim(),
                "Action failed."
            );
        }
        Ok(code)
    }
}

/// Synthesizes pointer input with cliclick.
#[derive(Default)]
pub struct Cliclick {}

impl Cliclick {
    fn run(&self, commands: &[String]) -> Result<(), AutomationError> {
        let args = commands.iter().map(String::as_str).collect::<Vec<&str>>();
        let output = run(CLICLICK, &args)?;
        if !output.status.success() {
            return Err(AutomationError::Failed {
                program: CLICLICK,
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

impl super::Pointer for Cliclick {
    fn click_at(&self, point: Point) -> Result<(), AutomationError> {
        self.run(&[format!("c:{}", coordinates(point))])
    }

    fn move_to(&self, point: Point) -> Result<(), AutomationError> {
        self.run(&[format!("m:{}", coordinates(point))])
    }

    fn drag_to(&self, point: Point) -> Result<(), AutomationError> {
        let coordinates = coordinates(point);
        self.run(&[
            String::from("dd:."),
            format!("dm:{coordinates}"),
            format!("du:{coordinates}"),
        ])
    }

    fn drag_by(&self, dx: i32, dy: i32) -> Result<(), AutomationError> {
        self.run(&[String::from("dd:."), format!("du:{dx:+},{dy:+}")])
    }
}

fn run(program: &'static str, args: &[&str]) -> Result<Output, AutomationError> {
    debug!(program, args = ?args, "Running automation command.");
    Command::new(program)
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|source| AutomationError::Spawn { program, source })
}

/// cliclick takes whole points.
fn coordinates(point: Point) -> String {
    format!("{},{}", point.x.round() as i64, point.y.round() as i64)
}

/// Escapes a value for use inside an AppleScript string literal.
fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
