// Copyright (C) 2025 Michael Wilson <mike@mdwn.dev>
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
use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use clap::{crate_version, Parser, Subcommand};
use duration_string::DurationString;
use faderbridge::automation;
use faderbridge::bridge;
use faderbridge::calibration::Calibration;
use faderbridge::config::Settings;
use faderbridge::engine::{ChannelIndex, Leds};
use faderbridge::midi;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "Drives photo editor sliders from a MIDI control surface."
)]
struct Cli {
    /// Logs every incoming event and the decision made for it.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start bridges the control surface to the application.
    Start {
        /// The path to the settings file. Defaults are used if absent.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Lists the available MIDI input/output devices.
    MidiDevices {},
    /// Locates the sliders and prints their positions and current values.
    Probe {
        /// The path to the settings file. Defaults are used if absent.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Sweeps every LED on the control surface on and off.
    LedTest {
        /// The path to the settings file. Defaults are used if absent.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// The pause between LEDs.
        #[arg(short, long, default_value = "50ms")]
        delay: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Commands::Start { config } => {
            let settings = Settings::load(config.as_deref())?;
            let bridge = bridge::init(&settings)?;
            bridge.join().await?;
        }
        Commands::MidiDevices {} => {
            let devices = midi::list_devices()?;

            if devices.is_empty() {
                println!("No devices found.");
                return Ok(());
            }

            println!("Devices:");
            for device in devices {
                println!("- {}", device);
            }
        }
        Commands::Probe { config } => {
            let settings = Settings::load(config.as_deref())?;
            let sliders = settings.sliders()?;
            let (ui, _) = automation::get(settings.application());
            let calibration = Calibration::new(ui, sliders.clone(), settings.retry()?);

            let layout = calibration.locate()?;
            let values = calibration.read_values(|_| {})?;

            println!("Slider width: {}", layout.half_width() * 2.0);
            println!("Sliders:");
            for ((channel, description), value) in ChannelIndex::all().zip(sliders).zip(values) {
                println!(
                    "- {} {}: anchor {}, value {}",
                    channel,
                    description,
                    layout.anchor(channel),
                    value
                );
            }
        }
        Commands::LedTest { config, delay } => {
            let settings = Settings::load(config.as_deref())?;
            let delay: Duration = DurationString::from_string(delay)?.into();
            let leds = Leds::new(midi::get_device(settings.controller())?);

            println!("Sweeping LEDs on {}.", settings.controller());
            tokio::task::spawn_blocking(move || leds.sweep(delay)).await?;
        }
    }

    Ok(())
}
