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
    error::Error,
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Barrier, Mutex,
    },
};

use midly::live::LiveEvent;
use tokio::{sync::mpsc::Sender, task::JoinHandle};

/// A mock control surface. Input is fed by tests, output is recorded.
#[derive(Clone)]
pub struct Device {
    name: String,
    barrier: Arc<Barrier>,
    closed: Arc<AtomicBool>,
    event: Arc<Mutex<Vec<u8>>>,
    emitted: Arc<Mutex<Vec<Vec<u8>>>>,
    event_thread: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl Device {
    /// Gets the given mock device.
    pub fn get(name: &str) -> Device {
        Device {
            name: name.to_string(),
            closed: Arc::new(AtomicBool::new(false)),
            barrier: Arc::new(Barrier::new(2)),
            event: Arc::new(Mutex::new(Vec::new())),
            emitted: Arc::new(Mutex::new(Vec::new())),
            event_thread: Arc::new(Mutex::new(None)),
        }
    }

    #[cfg(test)]
    /// Sends the mock event through to the sender.
    pub fn mock_event(&self, event: &[u8]) {
        {
            let mut mutex_event = self.event.lock().expect("unable to get event lock");
            *mutex_event = event.to_vec();
        }
        // Wait until the thread goes to receive the event.
        self.barrier.wait();
        // Wait until the thread has locked the mutex.
        self.barrier.wait();
    }

    #[cfg(test)]
    /// Gets every event emitted so far, in order.
    pub fn get_emitted_events(&self) -> Vec<Vec<u8>> {
        self.emitted
            .lock()
            .expect("unable to get emitted lock")
            .clone()
    }

    #[cfg(test)]
    /// Gets the (key, velocity) pairs of every emitted note on and note off.
    pub fn emitted_notes(&self) -> Vec<(u8, u8)> {
        use midly::MidiMessage;

        self.get_emitted_events()
            .iter()
            .filter_map(|raw| match LiveEvent::parse(raw) {
                Ok(LiveEvent::Midi {
                    message:
                        MidiMessage::NoteOn { key, vel } | MidiMessage::NoteOff { key, vel },
                    ..
                }) => Some((key.as_int(), vel.as_int())),
                _ => None,
            })
            .collect()
    }

    #[cfg(test)]
    /// Forgets every emitted event.
    pub fn reset_emitted_events(&self) {
        self.emitted
            .lock()
            .expect("unable to get emitted lock")
            .clear();
    }
}

impl super::Device for Device {
    fn name(&self) -> String {
        self.name.clone()
    }

    /// Watches MIDI input for events and sends them to the given sender.
    fn watch_events(&self, sender: Sender<Vec<u8>>) -> Result<(), Box<dyn Error>> {
        let mut event_thread = self
            .event_thread
            .lock()
            .map_err(|_| "event thread lock poisoned")?;
        if event_thread.is_some() {
            return Err("Already watching events.".into());
        }

        let barrier = self.barrier.clone();
        let event = self.event.clone();
        let closed = self.closed.clone();
        *event_thread = Some(tokio::task::spawn_blocking(move || loop {
            barrier.wait();

            {
                if closed.load(Ordering::Relaxed) {
                    return;
                }
                let Ok(event) = event.lock() else {
                    return;
                };
                if sender.blocking_send(event.to_vec()).is_err() {
                    return;
                }
            }
            barrier.wait();
        }));

        Ok(())
    }

    /// Stops watching events.
    fn stop_watch_events(&self) {
        self.closed.store(true, Ordering::Relaxed);
        // Wait for watcher thread to move to next loop iteration.
        self.barrier.wait();
    }

    /// Records the event.
    fn emit(&self, event: LiveEvent<'static>) -> Result<(), Box<dyn Error>> {
        let mut buf: Vec<u8> = Vec::with_capacity(8);
        event.write(&mut buf)?;
        self.emitted
            .lock()
            .map_err(|_| "emitted lock poisoned")?
            .push(buf);
        Ok(())
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (Mock)", self.name,)
    }
}
