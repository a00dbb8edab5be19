// Copyright (C) 2024 Michael Wilson <mike@mdwn.dev>
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
use std::{collections::HashSet, path::Path, time::Duration};

use config::{Config, File};
use duration_string::DurationString;
use serde::Deserialize;

use crate::{
    calibration::Retry,
    engine::{fine_grain_delta, ButtonMap, Quantizer, CHANNEL_COUNT},
};

mod buttons;
mod error;

pub use buttons::ButtonBinding;
pub use error::ConfigError;

const DEFAULT_CONTROLLER: &str = "SAMSON Graphite MF8";
const DEFAULT_APPLICATION: &str = "Photos";
const DEFAULT_SAMPLE_PERIOD: u16 = 16;
const DEFAULT_FINE_GRAIN_STEPS: u16 = 200;
const DEFAULT_Y_OFFSET: f64 = 2.0;
const DEFAULT_EDIT_PANE_ATTEMPTS: u32 = 10;
const DEFAULT_EDIT_PANE_RETRY_DELAY: &str = "500ms";

/// The Light section of the Photos adjustment pane, top to bottom.
const DEFAULT_SLIDERS: [&str; CHANNEL_COUNT] = [
    "Brilliance",
    "Exposure",
    "Highlights",
    "Shadows",
    "Brightness",
    "Contrast",
    "Black Point",
];

/// The bridge settings. Every key is optional.
#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct Settings {
    /// The MIDI device name. Any device whose name contains this is used.
    controller: String,

    /// The application whose sliders are driven.
    application: String,

    /// Controls the quantization step: the fader range is split into
    /// `sample_period / 2` buckets.
    sample_period: u16,

    /// How many steps the on-screen sliders have. One jog detent moves one step.
    fine_grain_steps: u16,

    /// Vertical offset from a slider's anchor to its grab point.
    y_offset: f64,

    /// Light buttons on the controller while they are held.
    echo_button_leds: bool,

    /// How to bring the edit pane up when the sliders are hidden.
    edit_pane: EditPane,

    /// The accessibility descriptions of the sliders, in channel order.
    sliders: Vec<String>,

    /// Button mappings.
    buttons: Vec<ButtonBinding>,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
struct EditPane {
    attempts: u32,
    retry_delay: String,
}

impl Default for EditPane {
    fn default() -> Self {
        EditPane {
            attempts: DEFAULT_EDIT_PANE_ATTEMPTS,
            retry_delay: DEFAULT_EDIT_PANE_RETRY_DELAY.to_string(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            controller: DEFAULT_CONTROLLER.to_string(),
            application: DEFAULT_APPLICATION.to_string(),
            sample_period: DEFAULT_SAMPLE_PERIOD,
            fine_grain_steps: DEFAULT_FINE_GRAIN_STEPS,
            y_offset: DEFAULT_Y_OFFSET,
            echo_button_leds: true,
            edit_pane: EditPane::default(),
            sliders: DEFAULT_SLIDERS.iter().map(|s| s.to_string()).collect(),
            buttons: buttons::default_bindings(),
        }
    }
}

impl Settings {
    /// Loads settings from the given YAML file, or the defaults if there is none.
    pub fn load(path: Option<&Path>) -> Result<Settings, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        let settings = builder.build()?.try_deserialize::<Settings>()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_period == 0 {
            return Err(ConfigError::Invalid("sample_period must be positive".into()));
        }
        if self.fine_grain_steps == 0 {
            return Err(ConfigError::Invalid(
                "fine_grain_steps must be positive".into(),
            ));
        }
        if self.edit_pane.attempts == 0 {
            return Err(ConfigError::Invalid(
                "edit_pane.attempts must be positive".into(),
            ));
        }
        self.sliders()?;
        self.retry()?;

        let mut notes = HashSet::new();
        for binding in self.buttons.iter() {
            if binding.note() > 127 {
                return Err(ConfigError::Invalid(format!(
                    "button note {} is out of range",
                    binding.note()
                )));
            }
            if !notes.insert(binding.note()) {
                return Err(ConfigError::Invalid(format!(
                    "button note {} is mapped more than once",
                    binding.note()
                )));
            }
        }

        Ok(())
    }

    pub fn controller(&self) -> &str {
        &self.controller
    }

    pub fn application(&self) -> &str {
        &self.application
    }

    pub fn quantizer(&self) -> Quantizer {
        Quantizer::from_sample_period(self.sample_period)
    }

    /// The logical value one jog detent moves a slider by.
    pub fn fine_grain_delta(&self) -> i32 {
        fine_grain_delta(self.fine_grain_steps)
    }

    pub fn y_offset(&self) -> f64 {
        self.y_offset
    }

    pub fn echo_button_leds(&self) -> bool {
        self.echo_button_leds
    }

    pub fn button_map(&self) -> ButtonMap {
        ButtonMap::new(self.buttons.iter().map(ButtonBinding::to_binding))
    }

    /// The slider descriptions, one per channel.
    pub fn sliders(&self) -> Result<[String; CHANNEL_COUNT], ConfigError> {
        self.sliders.clone().try_into().map_err(|sliders: Vec<String>| {
            ConfigError::Invalid(format!(
                "expected {} sliders, found {}",
                CHANNEL_COUNT,
                sliders.len()
            ))
        })
    }

    pub fn retry(&self) -> Result<Retry, ConfigError> {
        let delay: Duration = DurationString::from_string(self.edit_pane.retry_delay.clone())
            .map_err(|e| {
                ConfigError::Invalid(format!(
                    "edit_pane.retry_delay {:?}: {}",
                    self.edit_pane.retry_delay, e
                ))
            })?
            .into();

        Ok(Retry {
            attempts: self.edit_pane.attempts,
            delay,
        })
    }
}

#[cfg(test)]
mod test {
    use std::{error::Error, fs, time::Duration};

    use crate::{
        automation::UiAction,
        engine::{Binding, Press},
    };

    use super::{ConfigError, Settings};

    fn load(yaml: &str) -> Result<Settings, ConfigError> {
        let dir = tempfile::tempdir().expect("unable to create temp dir");
        let path = dir.path().join("faderbridge.yaml");
        fs::write(&path, yaml).expect("unable to write settings");
        Settings::load(Some(&path))
    }

    #[test]
    fn defaults() -> Result<(), Box<dyn Error>> {
        let settings = Settings::load(None)?;
        assert_eq!("SAMSON Graphite MF8", settings.controller());
        assert_eq!("Photos", settings.application());
        assert_eq!(2048, settings.quantizer().step());
        assert_eq!(81, settings.fine_grain_delta());
        assert_eq!(2.0, settings.y_offset());
        assert!(settings.echo_button_leds());
        assert_eq!("Black Point", settings.sliders()?[6]);

        let retry = settings.retry()?;
        assert_eq!(10, retry.attempts);
        assert_eq!(Duration::from_millis(500), retry.delay);

        let buttons = settings.button_map();
        assert_eq!(
            Press::Bound(Binding {
                action: UiAction::ApplyPresetEdits,
                resync: true
            }),
            buttons.resolve(1)
        );
        assert_eq!(
            Press::Bound(Binding {
                action: UiAction::NavigatePrevious,
                resync: false
            }),
            buttons.resolve(91)
        );
        Ok(())
    }

    #[test]
    fn overrides() -> Result<(), Box<dyn Error>> {
        let settings = load(
            r#"
            controller: mock-controller
            application: mock-photos
            sample_period: 32
            fine_grain_steps: 100
            y_offset: 4
            echo_button_leds: false
            edit_pane:
              attempts: 3
              retry_delay: 2s
            buttons:
              - note: 93
                action: navigate_next
              - note: 94
                action: apply_preset_edits
                resync: true
            "#,
        )?;

        assert_eq!("mock-controller", settings.controller());
        assert_eq!("mock-photos", settings.application());
        assert_eq!(1024, settings.quantizer().step());
        assert_eq!(163, settings.fine_grain_delta());
        assert_eq!(4.0, settings.y_offset());
        assert!(!settings.echo_button_leds());

        let retry = settings.retry()?;
        assert_eq!(3, retry.attempts);
        assert_eq!(Duration::from_secs(2), retry.delay);

        let buttons = settings.button_map();
        assert_eq!(Press::Ignored, buttons.resolve(1));
        assert_eq!(
            Press::Bound(Binding {
                action: UiAction::ApplyPresetEdits,
                resync: true
            }),
            buttons.resolve(94)
        );
        Ok(())
    }

    #[test]
    fn rejects_wrong_slider_count() {
        let result = load(
            r#"
            sliders:
              - Exposure
              - Contrast
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_duplicate_buttons() {
        let result = load(
            r#"
            buttons:
              - note: 46
                action: navigate_previous
              - note: 46
                action: navigate_next
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_bad_values() {
        for yaml in [
            "sample_period: 0",
            "fine_grain_steps: 0",
            "edit_pane:\n  attempts: 0",
            "edit_pane:\n  retry_delay: soon",
        ] {
            assert!(
                matches!(load(yaml), Err(ConfigError::Invalid(_))),
                "accepted {}",
                yaml
            );
        }
    }

    #[test]
    fn rejects_unknown_actions() {
        let result = load(
            r#"
            buttons:
              - note: 3
                action: activate
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Load(_))));
    }
}
