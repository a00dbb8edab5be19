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
    collections::{HashMap, VecDeque},
    sync::Mutex,
};

use tracing::debug;

use super::{AutomationError, Point, PointerAction, UiAction};

/// A call made against the mock.
#[derive(Clone, Debug, PartialEq)]
pub enum Recorded {
    Query {
        attribute: String,
        description: String,
    },
    Click {
        class: String,
        description: String,
    },
    Perform(UiAction),
    Pointer(PointerAction),
}

/// A mock application. Records everything and answers queries from scripted
/// replies.
pub struct Automation {
    name: String,
    recorded: Mutex<Vec<Recorded>>,
    /// Replies per (attribute, description). The last reply is sticky.
    replies: Mutex<HashMap<(String, String), VecDeque<String>>>,
    exit_codes: Mutex<HashMap<UiAction, i32>>,
}

impl Automation {
    pub fn new(name: &str) -> Automation {
        Automation {
            name: name.to_string(),
            recorded: Mutex::new(Vec::new()),
            replies: Mutex::new(HashMap::new()),
            exit_codes: Mutex::new(HashMap::new()),
        }
    }

    fn record(&self, call: Recorded) {
        debug!(application = self.name, call = ?call, "Mock automation call.");
        if let Ok(mut recorded) = self.recorded.lock() {
            recorded.push(call);
        }
    }

    #[cfg(test)]
    /// Queues replies for queries of `attribute` on `description`.
    pub fn reply(&self, attribute: &str, description: &str, replies: &[&str]) {
        self.replies
            .lock()
            .expect("unable to get replies lock")
            .entry((attribute.to_string(), description.to_string()))
            .or_default()
            .extend(replies.iter().map(|reply| reply.to_string()));
    }

    #[cfg(test)]
    /// Makes `action` exit with `code` from now on.
    pub fn exit_code(&self, action: UiAction, code: i32) {
        self.exit_codes
            .lock()
            .expect("unable to get exit codes lock")
            .insert(action, code);
    }

    #[cfg(test)]
    pub fn recorded(&self) -> Vec<Recorded> {
        self.recorded
            .lock()
            .expect("unable to get recorded lock")
            .clone()
    }

    #[cfg(test)]
    pub fn pointer_actions(&self) -> Vec<PointerAction> {
        self.recorded()
            .into_iter()
            .filter_map(|call| match call {
                Recorded::Pointer(action) => Some(action),
                _ => None,
            })
            .collect()
    }

    #[cfg(test)]
    pub fn performed(&self) -> Vec<UiAction> {
        self.recorded()
            .into_iter()
            .filter_map(|call| match call {
                Recorded::Perform(action) => Some(action),
                _ => None,
            })
            .collect()
    }

    #[cfg(test)]
    pub fn clear(&self) {
        self.recorded
            .lock()
            .expect("unable to get recorded lock")
            .clear();
    }
}

impl super::Ui for Automation {
    fn query(&self, attribute: &str, description: &str) -> Result<String, AutomationError> {
        self.record(Recorded::Query {
            attribute: attribute.to_string(),
            description: description.to_string(),
        });

        let Ok(mut replies) = self.replies.lock() else {
            return Ok(String::new());
        };
        let Some(queue) = replies.get_mut(&(attribute.to_string(), description.to_string()))
        else {
            return Ok(String::new());
        };
        if queue.len() > 1 {
            return Ok(queue.pop_front().unwrap_or_default());
        }
        Ok(queue.front().cloned().unwrap_or_default())
    }

    fn click(&self, class: &str, description: &str) -> Result<(), AutomationError> {
        self.record(Recorded::Click {
            class: class.to_string(),
            description: description.to_string(),
        });
        Ok(())
    }

    fn perform(&self, action: UiAction) -> Result<i32, AutomationError> {
        self.record(Recorded::Perform(action));
        Ok(self
            .exit_codes
            .lock()
            .ok()
            .and_then(|exit_codes| exit_codes.get(&action).copied())
            .unwrap_or(0))
    }
}

impl super::Pointer for Automation {
    fn click_at(&self, point: Point) -> Result<(), AutomationError> {
        self.record(Recorded::Pointer(PointerAction::ClickAt(point)));
        Ok(())
    }

    fn move_to(&self, point: Point) -> Result<(), AutomationError> {
        self.record(Recorded::Pointer(PointerAction::MoveTo(point)));
        Ok(())
    }

    fn drag_to(&self, point: Point) -> Result<(), AutomationError> {
        self.record(Recorded::Pointer(PointerAction::DragTo(point)));
        Ok(())
    }

    fn drag_by(&self, dx: i32, dy: i32) -> Result<(), AutomationError> {
        self.record(Recorded::Pointer(PointerAction::DragBy { dx, dy }));
        Ok(())
    }
}
