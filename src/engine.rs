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
use std::sync::Arc;

use tracing::{debug, info, span, Level};

use crate::{
    automation::{Pointer, PointerAction, Ui},
    calibration::Calibration,
    config::Settings,
};

pub mod buttons;
pub mod channel;
mod error;
pub mod event;
pub mod jog;
pub mod leds;
pub mod quantize;
pub mod router;
pub mod translator;

pub use buttons::{Binding, ButtonMap, Press, PRESS_VELOCITY};
pub use channel::{ChannelIndex, ChannelStore, ControllerState, Layout, CHANNEL_COUNT};
pub use error::EngineError;
pub use event::ControlEvent;
pub use jog::{fine_grain_delta, JogDirection, JOG_CONTROLLER};
pub use leds::{Leds, NUM_LOADING_LEDS};
pub use quantize::Quantizer;

/// Everything the bridge knows about the sliders, and the handles it drives
/// them with. Events are handled one at a time, in arrival order.
pub struct Engine {
    quantizer: Quantizer,
    y_offset: f64,
    fine_grain_delta: i32,
    buttons: ButtonMap,
    echo_button_leds: bool,

    calibration: Calibration,
    layout: Layout,
    store: ChannelStore,
    state: ControllerState,

    ui: Arc<dyn Ui>,
    pointer: Arc<dyn Pointer>,
    leds: Leds,
}

impl Engine {
    /// Creates the engine and locates the sliders on screen. Slider values are
    /// not read until synchronize is called.
    pub fn new(
        settings: &Settings,
        ui: Arc<dyn Ui>,
        pointer: Arc<dyn Pointer>,
        leds: Leds,
    ) -> Result<Engine, EngineError> {
        let calibration = Calibration::new(ui.clone(), settings.sliders()?, settings.retry()?);
        let layout = calibration.locate()?;

        Ok(Engine {
            quantizer: settings.quantizer(),
            y_offset: settings.y_offset(),
            fine_grain_delta: settings.fine_grain_delta(),
            buttons: settings.button_map(),
            echo_button_leds: settings.echo_button_leds(),
            calibration,
            layout,
            store: ChannelStore::default(),
            state: ControllerState::default(),
            ui,
            pointer,
            leds,
        })
    }

    /// Handles a single control surface event. An error means the target
    /// application is out of step with the engine and the bridge must stop.
    pub fn handle(&mut self, event: &ControlEvent) -> Result<(), EngineError> {
        if !router::route(&mut self.state, event) {
            return Ok(());
        }

        match *event {
            ControlEvent::PitchBend { value, .. } => self.slider(value),
            ControlEvent::ControlChange {
                controller, value, ..
            } => self.jog(controller, value),
            ControlEvent::Note {
                channel,
                key,
                velocity,
                on,
            } => {
                if self.echo_button_leds && velocity != 0 {
                    self.leds.echo(channel, key, velocity, on);
                }
                if on && velocity == PRESS_VELOCITY {
                    self.button(key)
                } else {
                    Ok(())
                }
            }
            ControlEvent::Other { .. } => Ok(()),
        }
    }

    /// Re-reads every slider's value from the application, then parks the
    /// pointer on the first slider and makes it active.
    pub fn synchronize(&mut self) -> Result<(), EngineError> {
        let span = span!(Level::INFO, "synchronize");
        let _enter = span.enter();

        let leds = &self.leds;
        let values = self
            .calibration
            .read_values(|stage| leds.loading(stage))?;
        for (channel, value) in ChannelIndex::all().zip(values) {
            self.store[channel].reset(value);
        }

        info!(values = ?values, "Synchronized slider values.");
        self.select(ChannelIndex::FIRST)
    }

    /// The active channel bookkeeping.
    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// The most recent value recorded for a channel.
    pub fn value(&self, channel: ChannelIndex) -> i32 {
        self.store[channel].last()
    }

    fn slider(&mut self, raw: i16) -> Result<(), EngineError> {
        let channel = self.state.active;
        let value = self.quantizer.quantize(i32::from(raw));
        self.store[channel].push(value);

        if let Some(action) = translator::slider_action(
            &self.state,
            &self.layout,
            channel,
            &self.store[channel],
            self.y_offset,
        ) {
            debug!(channel = channel.as_u8(), raw, value, action = ?action, "Moving slider.");
            action.apply(self.pointer.as_ref())?;
        }

        self.leds.activate(&mut self.state, channel);
        Ok(())
    }

    fn jog(&mut self, controller: u8, value: u8) -> Result<(), EngineError> {
        if controller != JOG_CONTROLLER {
            debug!(controller, value, "Ignoring controller.");
            return Ok(());
        }
        let Some(direction) = JogDirection::from_value(value) else {
            debug!(value, "Ignoring jog value.");
            return Ok(());
        };

        let channel = self.state.active;
        let delta = jog::step(self.store[channel].last(), direction, self.fine_grain_delta);
        if delta == 0 {
            debug!(channel = channel.as_u8(), "Jog at end of range.");
            return Ok(());
        }

        PointerAction::DragBy {
            dx: direction.pixels(),
            dy: 0,
        }
        .apply(self.pointer.as_ref())?;
        self.store[channel].adjust_last(delta);
        debug!(
            channel = channel.as_u8(),
            value = self.store[channel].last(),
            "Jogged slider."
        );
        Ok(())
    }

    fn button(&mut self, key: u8) -> Result<(), EngineError> {
        match self.buttons.resolve(key) {
            Press::Bound(binding) => {
                info!(key, action = %binding.action, "Performing action.");
                let code = self.ui.perform(binding.action)?;
                if code != 0 {
                    return Err(EngineError::ActionFailed {
                        action: binding.action,
                        code,
                    });
                }
                if binding.resync {
                    self.synchronize()?;
                }
                Ok(())
            }
            Press::Select(channel) => {
                debug!(key, channel = channel.as_u8(), "Selecting channel.");
                self.select(channel)
            }
            Press::Ignored => {
                debug!(key, "Ignoring button.");
                Ok(())
            }
        }
    }

    /// Makes `channel` active and moves the pointer onto its last known value
    /// without touching the slider.
    fn select(&mut self, channel: ChannelIndex) -> Result<(), EngineError> {
        self.state.active = channel;
        let target = self
            .layout
            .target(channel, self.store[channel].last(), self.y_offset);
        PointerAction::MoveTo(target).apply(self.pointer.as_ref())?;
        self.leds.activate(&mut self.state, channel);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use crate::{
        automation::{test::Automation, Point, PointerAction, UiAction},
        config::Settings,
        midi,
    };

    use super::{ChannelIndex, ControlEvent, Engine, EngineError, Leds, Quantizer};

    const SLIDERS: [&str; 7] = [
        "Brilliance",
        "Exposure",
        "Highlights",
        "Shadows",
        "Brightness",
        "Contrast",
        "Black Point",
    ];

    /// Anchors at x = 500 and y = 100, 140, ... with a 16383 pixel wide slider,
    /// so one raw unit is one pixel and the slider's middle sits at x = 8691.5.
    fn automation(name: &str) -> Arc<Automation> {
        let automation = Arc::new(Automation::new(name));
        for (i, slider) in SLIDERS.iter().enumerate() {
            automation.reply(
                "position",
                slider,
                &[format!("500, {}", 100 + 40 * i).as_str()],
            );
        }
        automation.reply("size", SLIDERS[0], &["16383, 21"]);
        automation
    }

    fn channel(raw: u8) -> ChannelIndex {
        ChannelIndex::new(raw).expect("valid channel")
    }

    fn x(value: i32) -> f64 {
        500.0 + f64::from(value) + 8191.5
    }

    fn y(channel: u8) -> f64 {
        100.0 + 40.0 * f64::from(channel) + 2.0
    }

    fn setup(name: &str) -> (Arc<Automation>, Arc<midi::test::Device>, Engine) {
        let automation = automation(name);
        let device = Arc::new(midi::test::Device::get(name));
        let engine = Engine::new(
            &Settings::default(),
            automation.clone(),
            automation.clone(),
            Leds::new(device.clone()),
        )
        .expect("unable to create engine");
        automation.clear();
        (automation, device, engine)
    }

    fn bend(channel: u8, value: i16) -> ControlEvent {
        ControlEvent::PitchBend { channel, value }
    }

    fn jog(value: u8) -> ControlEvent {
        ControlEvent::ControlChange {
            channel: 0,
            controller: 60,
            value,
        }
    }

    fn press(key: u8) -> ControlEvent {
        ControlEvent::Note {
            channel: 0,
            key,
            velocity: 127,
            on: true,
        }
    }

    #[test]
    fn repeated_sample_clicks_once() -> Result<(), EngineError> {
        let (automation, device, mut engine) = setup("mock-repeat");
        engine.quantizer = Quantizer::new(1024);

        engine.handle(&bend(2, 4096))?;
        engine.handle(&bend(2, 4096))?;

        assert_eq!(
            vec![PointerAction::ClickAt(Point::new(x(4096), y(2)))],
            automation.pointer_actions()
        );
        assert_eq!(vec![(10, 0)], device.emitted_notes());
        assert_eq!(channel(2), engine.state().active);
        assert_eq!(Some(channel(2)), engine.state().last_active);
        Ok(())
    }

    #[test]
    fn same_slider_drags_on_change() -> Result<(), EngineError> {
        let (automation, _device, mut engine) = setup("mock-drag");

        engine.handle(&bend(1, 100))?;
        engine.handle(&bend(1, 2100))?;
        engine.handle(&bend(1, 2200))?;
        engine.handle(&bend(1, 8191))?;
        engine.handle(&bend(1, 8191))?;

        assert_eq!(
            vec![
                PointerAction::ClickAt(Point::new(x(0), y(1))),
                PointerAction::DragTo(Point::new(x(2048), y(1))),
                PointerAction::DragTo(Point::new(x(8191), y(1))),
                PointerAction::DragTo(Point::new(x(8191), y(1))),
            ],
            automation.pointer_actions()
        );
        assert_eq!(8191, engine.value(channel(1)));
        Ok(())
    }

    #[test]
    fn switching_sliders_clicks_and_moves_leds() -> Result<(), EngineError> {
        let (automation, device, mut engine) = setup("mock-switch");

        engine.handle(&bend(0, -4096))?;
        engine.handle(&bend(3, 2048))?;

        assert_eq!(
            vec![
                PointerAction::ClickAt(Point::new(x(-4096), y(0))),
                PointerAction::ClickAt(Point::new(x(2048), y(3))),
            ],
            automation.pointer_actions()
        );
        assert_eq!(vec![(8, 0), (11, 0), (8, 127)], device.emitted_notes());
        Ok(())
    }

    #[test]
    fn navigate_performs_without_touching_state() -> Result<(), EngineError> {
        let (automation, _device, mut engine) = setup("mock-navigate");
        engine.handle(&bend(4, 1024))?;
        let state = engine.state();
        automation.clear();

        engine.handle(&press(47))?;

        assert_eq!(vec![UiAction::NavigateNext], automation.performed());
        assert!(automation.pointer_actions().is_empty());
        assert_eq!(state, engine.state());
        Ok(())
    }

    #[test]
    fn reserved_channel_is_ignored() -> Result<(), EngineError> {
        let (automation, device, mut engine) = setup("mock-reserved");

        engine.handle(&press(15))?;
        engine.handle(&bend(7, 4096))?;
        engine.handle(&press(7))?;

        assert!(automation.recorded().is_empty());
        assert!(device.emitted_notes().is_empty());
        assert_eq!(channel(0), engine.state().active);
        assert_eq!(None, engine.state().last_active);
        Ok(())
    }

    #[test]
    fn track_select_moves_to_last_value() -> Result<(), EngineError> {
        let (automation, device, mut engine) = setup("mock-select");
        engine.handle(&bend(5, -2048))?;
        automation.clear();
        device.reset_emitted_events();

        engine.handle(&press(8 + 2))?;

        assert_eq!(
            vec![PointerAction::MoveTo(Point::new(x(0), y(2)))],
            automation.pointer_actions()
        );
        // Echo of the press, then the LED swap.
        assert_eq!(vec![(10, 127), (10, 0), (13, 127)], device.emitted_notes());
        assert_eq!(channel(2), engine.state().active);

        // Coming back to the fader on channel five clicks on its last value.
        automation.clear();
        engine.handle(&bend(5, -2048))?;
        assert_eq!(
            vec![PointerAction::ClickAt(Point::new(x(-2048), y(5)))],
            automation.pointer_actions()
        );
        Ok(())
    }

    #[test]
    fn jog_nudges_active_slider() -> Result<(), EngineError> {
        let (automation, _device, mut engine) = setup("mock-jog");
        engine.handle(&bend(3, 2048))?;
        automation.clear();

        engine.handle(&jog(1))?;
        engine.handle(&jog(1))?;
        engine.handle(&jog(65))?;
        engine.handle(&jog(64))?;
        engine.handle(&ControlEvent::ControlChange {
            channel: 0,
            controller: 7,
            value: 1,
        })?;

        assert_eq!(
            vec![
                PointerAction::DragBy { dx: 1, dy: 0 },
                PointerAction::DragBy { dx: 1, dy: 0 },
                PointerAction::DragBy { dx: -1, dy: 0 },
            ],
            automation.pointer_actions()
        );
        assert_eq!(2048 + 81, engine.value(channel(3)));
        assert_eq!(channel(3), engine.state().active);
        Ok(())
    }

    #[test]
    fn jog_stops_at_the_end_stop() -> Result<(), EngineError> {
        let (automation, _device, mut engine) = setup("mock-jog-end");
        engine.handle(&bend(0, 8191))?;
        automation.clear();

        engine.handle(&jog(1))?;

        assert!(automation.pointer_actions().is_empty());
        assert_eq!(8191, engine.value(channel(0)));
        Ok(())
    }

    #[test]
    fn apply_preset_resynchronizes() -> Result<(), EngineError> {
        let (automation, device, mut engine) = setup("mock-resync");
        engine.handle(&bend(4, 4096))?;
        for (i, slider) in SLIDERS.iter().enumerate() {
            automation.reply("value", slider, &[if i == 4 { "-0.25" } else { "0" }]);
        }
        automation.clear();
        device.reset_emitted_events();

        engine.handle(&press(1))?;

        assert_eq!(vec![UiAction::ApplyPresetEdits], automation.performed());
        assert_eq!(-2048, engine.value(channel(4)));
        assert_eq!(
            vec![PointerAction::MoveTo(Point::new(x(0), y(0)))],
            automation.pointer_actions()
        );
        assert_eq!(channel(0), engine.state().active);
        assert_eq!(Some(channel(0)), engine.state().last_active);

        let notes = device.emitted_notes();
        assert!(notes.contains(&(58, 0)));
        assert_eq!(&[(8, 0), (12, 127)], &notes[notes.len() - 2..]);
        Ok(())
    }

    #[test]
    fn apply_without_resync_keeps_values() -> Result<(), EngineError> {
        let (automation, _device, mut engine) = setup("mock-no-resync");
        engine.handle(&bend(4, 4096))?;
        automation.clear();

        engine.handle(&press(2))?;

        assert_eq!(vec![UiAction::ApplyPresetEdits], automation.performed());
        assert_eq!(4096, engine.value(channel(4)));
        assert!(automation.pointer_actions().is_empty());
        Ok(())
    }

    #[test]
    fn failed_action_is_fatal() {
        let (automation, _device, mut engine) = setup("mock-fatal");
        automation.exit_code(UiAction::NavigatePrevious, 1);

        assert!(matches!(
            engine.handle(&press(46)),
            Err(EngineError::ActionFailed {
                action: UiAction::NavigatePrevious,
                code: 1
            })
        ));
    }

    #[test]
    fn releases_and_soft_presses_do_not_dispatch() -> Result<(), EngineError> {
        let (automation, device, mut engine) = setup("mock-release");

        engine.handle(&ControlEvent::Note {
            channel: 0,
            key: 47,
            velocity: 0,
            on: true,
        })?;
        engine.handle(&ControlEvent::Note {
            channel: 0,
            key: 47,
            velocity: 64,
            on: true,
        })?;

        assert!(automation.performed().is_empty());
        assert_eq!(vec![(47, 64)], device.emitted_notes());
        Ok(())
    }

    #[test]
    fn other_messages_adopt_the_channel() -> Result<(), EngineError> {
        let (automation, device, mut engine) = setup("mock-other");

        engine.handle(&ControlEvent::Other { channel: 6 })?;
        engine.handle(&jog(1))?;

        assert_eq!(channel(6), engine.state().active);
        assert_eq!(None, engine.state().last_active);
        assert!(device.emitted_notes().is_empty());
        assert_eq!(
            vec![PointerAction::DragBy { dx: 1, dy: 0 }],
            automation.pointer_actions()
        );
        Ok(())
    }
}
