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
use std::{error::Error, sync::Arc};

use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, error, info, span, Level};

use crate::{
    automation,
    config::Settings,
    engine::{ControlEvent, Engine, EngineError, Leds},
    midi::{self, Device},
};

/// Feeds control surface events into the engine until the surface goes away or
/// the engine hits a fatal error.
pub struct Bridge {
    handle: JoinHandle<Result<(), EngineError>>,
}

impl Bridge {
    /// Starts watching the device and handing its events to the engine. Must be
    /// called from within a tokio runtime.
    pub fn start(engine: Engine, device: Arc<dyn Device>) -> Result<Bridge, Box<dyn Error>> {
        let (midi_events_tx, mut midi_events_rx) = mpsc::channel::<Vec<u8>>(10);
        device.watch_events(midi_events_tx)?;

        let handle = tokio::task::spawn_blocking(move || {
            let span = span!(Level::INFO, "bridge");
            let _enter = span.enter();

            info!(device = device.name(), "Bridge started.");

            let mut engine = engine;
            while let Some(raw_event) = midi_events_rx.blocking_recv() {
                let Some(event) = ControlEvent::parse(&raw_event) else {
                    debug!(raw_event = ?raw_event, "Ignoring unrecognized MIDI event.");
                    continue;
                };

                debug!(event = ?event, "Received event.");
                if let Err(e) = engine.handle(&event) {
                    error!(err = %e, event = ?event, "Stopping bridge.");
                    device.stop_watch_events();
                    return Err(e);
                }
            }

            info!("MIDI watcher closed.");
            Ok(())
        });

        Ok(Bridge { handle })
    }

    /// Join will block until the bridge stops.
    pub async fn join(self) -> Result<(), Box<dyn Error>> {
        self.handle.await??;
        Ok(())
    }
}

/// Connects to the controller and the application named in the settings, reads
/// the current slider values and starts the bridge.
pub fn init(settings: &Settings) -> Result<Bridge, Box<dyn Error>> {
    let device = midi::get_device(settings.controller())?;
    let leds = Leds::new(device.clone());
    leds.initialize();

    let (ui, pointer) = automation::get(settings.application());
    let mut engine = Engine::new(settings, ui, pointer, leds)?;
    engine.synchronize()?;

    Bridge::start(engine, device)
}

#[cfg(test)]
mod test {
    use std::{error::Error, sync::Arc};

    use midly::{
        live::LiveEvent,
        num::{u14, u4, u7},
        MidiMessage, PitchBend,
    };

    use crate::{
        automation::{test::Automation, PointerAction, UiAction},
        config::Settings,
        engine::{Engine, EngineError, Leds},
        midi::{self, Device},
        testutil::eventually,
    };

    use super::Bridge;

    const SLIDERS: [&str; 7] = [
        "Brilliance",
        "Exposure",
        "Highlights",
        "Shadows",
        "Brightness",
        "Contrast",
        "Black Point",
    ];

    fn encode(channel: u8, message: MidiMessage) -> Vec<u8> {
        let mut buf: Vec<u8> = Vec::with_capacity(8);
        LiveEvent::Midi {
            channel: u4::from(channel),
            message,
        }
        .write(&mut buf)
        .expect("failed to encode MIDI event");
        buf
    }

    fn bend(channel: u8, value: i16) -> Vec<u8> {
        encode(
            channel,
            MidiMessage::PitchBend {
                bend: PitchBend(u14::from((i32::from(value) + 8192) as u16)),
            },
        )
    }

    fn press(key: u8) -> Vec<u8> {
        encode(
            0,
            MidiMessage::NoteOn {
                key: u7::from(key),
                vel: u7::from(127),
            },
        )
    }

    fn setup(name: &str) -> (Arc<Automation>, Arc<midi::test::Device>, Engine) {
        let automation = Arc::new(Automation::new(name));
        for (i, slider) in SLIDERS.iter().enumerate() {
            automation.reply(
                "position",
                slider,
                &[format!("500, {}", 100 + 40 * i).as_str()],
            );
            automation.reply("value", slider, &["0"]);
        }
        automation.reply("size", SLIDERS[0], &["16383, 21"]);

        let device = Arc::new(midi::test::Device::get(name));
        let mut engine = Engine::new(
            &Settings::default(),
            automation.clone(),
            automation.clone(),
            Leds::new(device.clone()),
        )
        .expect("unable to create engine");
        engine.synchronize().expect("unable to synchronize");
        automation.clear();
        device.reset_emitted_events();

        (automation, device, engine)
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_bridge() -> Result<(), Box<dyn Error>> {
        let (automation, device, engine) = setup("mock-bridge");
        let bridge = Bridge::start(engine, device.clone())?;

        // Garbage and system messages are skipped.
        device.mock_event(&[1, 2, 3, 4]);
        device.mock_event(&[0xF8]);

        device.mock_event(&bend(2, 4096));
        eventually(
            || automation.pointer_actions().len() == 1,
            "Slider never moved",
        );
        assert!(matches!(
            automation.pointer_actions()[0],
            PointerAction::ClickAt(_)
        ));
        eventually(
            || device.emitted_notes() == vec![(10, 0), (8, 127)],
            "Channel LED never moved",
        );

        device.mock_event(&bend(2, 6200));
        eventually(
            || automation.pointer_actions().len() == 2,
            "Slider never dragged",
        );
        assert!(matches!(
            automation.pointer_actions()[1],
            PointerAction::DragTo(_)
        ));

        device.mock_event(&press(47));
        eventually(
            || automation.performed() == vec![UiAction::NavigateNext],
            "Navigation never performed",
        );

        // Closing the watcher ends the bridge cleanly.
        device.stop_watch_events();
        bridge.join().await?;

        Ok(())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_bridge_stops_on_failed_action() -> Result<(), Box<dyn Error>> {
        let (automation, device, engine) = setup("mock-bridge-fatal");
        automation.exit_code(UiAction::ToggleEditPane, 1);
        let bridge = Bridge::start(engine, device.clone())?;

        device.mock_event(&press(0));

        let result = bridge.join().await;
        let err = result.expect_err("bridge should have stopped");
        assert!(matches!(
            err.downcast_ref::<EngineError>(),
            Some(EngineError::ActionFailed {
                action: UiAction::ToggleEditPane,
                code: 1
            })
        ));

        Ok(())
    }
}
