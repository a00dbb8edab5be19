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

use tracing::{info, span, warn, Level};

use crate::{
    automation::{Point, Ui, UiAction},
    engine::{
        channel::{ChannelIndex, Layout, CHANNEL_COUNT},
        quantize::{HW_SLIDER_MAX, HW_SLIDER_MIN, HW_SLIDER_RANGE},
        EngineError, NUM_LOADING_LEDS,
    },
};

/// The button that opens the edit pane when the sliders are hidden.
const EDIT_BUTTON_CLASS: &str = "button";
const EDIT_BUTTON_DESCRIPTION: &str = "Edit";

/// How hard to try to bring the sliders on screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Retry {
    /// Queries per slider before giving up. At least one is always made.
    pub attempts: u32,
    /// Pause after clicking the edit button.
    pub delay: Duration,
}

/// Finds and reads the sliders in the target application.
pub struct Calibration {
    ui: Arc<dyn Ui>,
    sliders: [String; CHANNEL_COUNT],
    retry: Retry,
}

impl Calibration {
    /// `sliders` are the accessibility descriptions of the sliders, in channel order.
    pub fn new(ui: Arc<dyn Ui>, sliders: [String; CHANNEL_COUNT], retry: Retry) -> Calibration {
        Calibration {
            ui,
            sliders,
            retry,
        }
    }

    /// Brings the application forward and measures where every slider sits.
    pub fn locate(&self) -> Result<Layout, EngineError> {
        let span = span!(Level::INFO, "locate sliders");
        let _enter = span.enter();

        let code = self.ui.perform(UiAction::Activate)?;
        if code != 0 {
            return Err(EngineError::ActionFailed {
                action: UiAction::Activate,
                code,
            });
        }

        let mut anchors = [Point::new(0.0, 0.0); CHANNEL_COUNT];
        for (channel, description) in ChannelIndex::all().zip(self.sliders.iter()) {
            let (x, y) = self.query_pair("position", description)?;
            info!(channel = channel.as_u8(), description, x, y, "Found slider.");
            anchors[channel.as_usize()] = Point::new(x, y);
        }

        // Every slider shares the first one's width.
        let (width, _) = self.query_pair("size", &self.sliders[0])?;
        info!(width, "Measured slider width.");

        Ok(Layout::new(anchors, width))
    }

    /// Reads every slider's current value as a raw hardware value. `progress`
    /// is called after each slider with a stage in [0, NUM_LOADING_LEDS]; the
    /// last slider always reports NUM_LOADING_LEDS.
    pub fn read_values(
        &self,
        mut progress: impl FnMut(usize),
    ) -> Result<[i32; CHANNEL_COUNT], EngineError> {
        let span = span!(Level::INFO, "read slider values");
        let _enter = span.enter();

        let mut values = [0; CHANNEL_COUNT];
        for (i, description) in self.sliders.iter().enumerate() {
            let reply = self.query_visible("value", description)?;
            let value = reply
                .trim()
                .parse::<f64>()
                .map_err(|_| malformed("value", description, &reply))?;
            values[i] = to_raw(value);
            info!(description, value, raw = values[i], "Read slider value.");

            progress(i * NUM_LOADING_LEDS / (CHANNEL_COUNT - 1));
        }

        Ok(values)
    }

    fn query_pair(
        &self,
        attribute: &'static str,
        description: &str,
    ) -> Result<(f64, f64), EngineError> {
        let reply = self.query_visible(attribute, description)?;
        parse_pair(&reply).ok_or_else(|| malformed(attribute, description, &reply))
    }

    /// Queries a slider attribute. An empty reply means the edit pane is closed,
    /// so the edit button is clicked and the query retried.
    fn query_visible(&self, attribute: &str, description: &str) -> Result<String, EngineError> {
        let attempts = self.retry.attempts.max(1);
        for attempt in 1..=attempts {
            let reply = self.ui.query(attribute, description)?;
            if !reply.trim().is_empty() {
                return Ok(reply);
            }

            warn!(
                attribute,
                description, attempt, attempts, "Slider not visible, opening the edit pane."
            );
            if attempt < attempts {
                self.ui.click(EDIT_BUTTON_CLASS, EDIT_BUTTON_DESCRIPTION)?;
                thread::sleep(self.retry.delay);
            }
        }

        Err(EngineError::EditPaneNotFound {
            description: description.to_string(),
            attempts,
        })
    }
}

fn malformed(attribute: &'static str, description: &str, reply: &str) -> EngineError {
    EngineError::MalformedReply {
        attribute,
        description: description.to_string(),
        reply: reply.to_string(),
    }
}

/// Parses an "x, y" reply.
pub fn parse_pair(reply: &str) -> Option<(f64, f64)> {
    let (first, second) = reply.split_once(',')?;
    Some((first.trim().parse().ok()?, second.trim().parse().ok()?))
}

/// Converts an on-screen slider value in [-1, 1] to the hardware range.
pub fn to_raw(value: f64) -> i32 {
    let raw = (value * f64::from(HW_SLIDER_RANGE + 1) / 2.0).round();
    raw.clamp(f64::from(HW_SLIDER_MIN), f64::from(HW_SLIDER_MAX)) as i32
}
