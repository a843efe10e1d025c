//! Preset file format: parsing, validation and writing.
//!
//! # TOML Format
//!
//! ```toml
//! name = "Hollow"
//! description = "Square lead with a sine sub"
//!
//! osc1 = "square"
//! osc2 = "sine"
//! osc3 = "triangle"
//! level1 = 1.0
//! level2 = 0.5
//! level3 = 0.8
//! pan1 = 0.5
//! pan2 = -0.5
//! pan3 = 0.0
//! detune2 = 0.0
//! detune3 = 12
//!
//! filter = "lowpass"
//! filterFreq = 8000
//! filterQ = 1.0
//! ```
//!
//! `osc1`..`osc3` and `filter` are mandatory. Every other key is optional
//! and defaults as documented on [`Preset`]. Unknown keys are ignored.
//! Numeric keys accept integers or floats.

use std::path::Path;

use osc3x_core::{FilterKind, MAX_Q, MIN_Q};
use osc3x_synth::{
    DEFAULT_DETUNE, DEFAULT_LEVEL, DEFAULT_PAN, DEFAULT_Q, FilterSettings, OSCILLATOR_COUNT,
    OscillatorKind, OscillatorSettings, Preset,
};
use serde::Serialize;
use toml::{Table, Value};

use crate::error::ConfigError;

const OSC_KEYS: [&str; OSCILLATOR_COUNT] = ["osc1", "osc2", "osc3"];
const LEVEL_KEYS: [&str; OSCILLATOR_COUNT] = ["level1", "level2", "level3"];
const PAN_KEYS: [&str; OSCILLATOR_COUNT] = ["pan1", "pan2", "pan3"];

/// Parses and validates a preset from TOML text.
///
/// # Example
///
/// ```rust
/// use osc3x_config::load_preset;
///
/// let preset = load_preset(r#"
///     osc1 = "saw"
///     osc2 = "Square"
///     osc3 = "sine"
///     filter = "highpass"
///     detune2 = 7
/// "#).unwrap();
///
/// assert_eq!(preset.detune2, 7.0);
/// assert_eq!(preset.filter.frequency, 0.0);
/// assert_eq!(preset.oscillators[0].level, 1.0);
/// ```
pub fn load_preset(text: &str) -> Result<Preset, ConfigError> {
    let table: Table = toml::from_str(text)?;
    preset_from_table(&table)
}

/// Reads and validates a preset file.
pub fn load_preset_file(path: impl AsRef<Path>) -> Result<Preset, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
    load_preset(&content)
}

/// Validates an already-parsed TOML table.
pub fn preset_from_table(table: &Table) -> Result<Preset, ConfigError> {
    let mut kinds = [OscillatorKind::Sine; OSCILLATOR_COUNT];
    for (kind, key) in kinds.iter_mut().zip(OSC_KEYS) {
        let name = required_str(table, key)?;
        *kind = OscillatorKind::from_name(name).ok_or_else(|| ConfigError::UnknownOscillator {
            field: key.to_string(),
            value: name.to_string(),
        })?;
    }

    let filter_name = required_str(table, "filter")?;
    let filter_kind = FilterKind::from_name(filter_name)
        .ok_or_else(|| ConfigError::UnknownFilter(filter_name.to_string()))?;

    let mut oscillators = kinds.map(OscillatorSettings::new);
    for (i, slot) in oscillators.iter_mut().enumerate() {
        slot.level = number_or(table, LEVEL_KEYS[i], DEFAULT_LEVEL)?;
        slot.pan = number_or(table, PAN_KEYS[i], DEFAULT_PAN)?.clamp(-1.0, 1.0);
    }

    let frequency = number_or(table, "filterFreq", filter_kind.default_frequency())?;
    if frequency < 0.0 {
        return Err(ConfigError::invalid_value(
            "filterFreq",
            format!("frequency must not be negative, found {frequency}"),
        ));
    }

    Ok(Preset {
        name: optional_str(table, "name")?.map(str::to_string),
        description: optional_str(table, "description")?.map(str::to_string),
        oscillators,
        detune2: number_or(table, "detune2", DEFAULT_DETUNE)?,
        detune3: number_or(table, "detune3", DEFAULT_DETUNE)?,
        filter: FilterSettings {
            kind: filter_kind,
            frequency,
            q: number_or(table, "filterQ", DEFAULT_Q)?.clamp(MIN_Q, MAX_Q),
        },
    })
}

fn required_str<'a>(table: &'a Table, key: &str) -> Result<&'a str, ConfigError> {
    optional_str(table, key)?.ok_or_else(|| ConfigError::MissingField(key.to_string()))
}

fn optional_str<'a>(table: &'a Table, key: &str) -> Result<Option<&'a str>, ConfigError> {
    match table.get(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(ConfigError::invalid_value(
            key,
            format!("expected a string, found {}", other.type_str()),
        )),
    }
}

fn number_or(table: &Table, key: &str, default: f32) -> Result<f32, ConfigError> {
    let value = match table.get(key) {
        None => return Ok(default),
        Some(Value::Integer(i)) => *i as f32,
        Some(Value::Float(f)) => *f as f32,
        Some(other) => {
            return Err(ConfigError::invalid_value(
                key,
                format!("expected a number, found {}", other.type_str()),
            ));
        }
    };
    if !value.is_finite() {
        return Err(ConfigError::invalid_value(key, "expected a finite number"));
    }
    Ok(value)
}

/// On-disk layout written by [`PresetFile::to_toml`].
#[derive(Serialize)]
struct PresetDocument<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    osc1: &'static str,
    osc2: &'static str,
    osc3: &'static str,
    level1: f32,
    level2: f32,
    level3: f32,
    pan1: f32,
    pan2: f32,
    pan3: f32,
    detune2: f32,
    detune3: f32,
    filter: &'static str,
    #[serde(rename = "filterFreq")]
    filter_freq: f32,
    #[serde(rename = "filterQ")]
    filter_q: f32,
}

impl<'a> From<&'a Preset> for PresetDocument<'a> {
    fn from(preset: &'a Preset) -> Self {
        let [o1, o2, o3] = &preset.oscillators;
        Self {
            name: preset.name.as_deref(),
            description: preset.description.as_deref(),
            osc1: o1.kind.name(),
            osc2: o2.kind.name(),
            osc3: o3.kind.name(),
            level1: o1.level,
            level2: o2.level,
            level3: o3.level,
            pan1: o1.pan,
            pan2: o2.pan,
            pan3: o3.pan,
            detune2: preset.detune2,
            detune3: preset.detune3,
            filter: preset.filter.kind.name(),
            filter_freq: preset.filter.frequency,
            filter_q: preset.filter.q,
        }
    }
}

/// File operations on [`Preset`].
pub trait PresetFile: Sized {
    /// Reads and validates a preset file.
    fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError>;

    /// Parses and validates TOML text.
    fn from_toml(text: &str) -> Result<Self, ConfigError>;

    /// Writes every key, including defaults, in the documented layout.
    fn to_toml(&self) -> Result<String, ConfigError>;

    /// Writes the preset to `path`, creating parent directories as needed.
    fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError>;
}

impl PresetFile for Preset {
    fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        load_preset_file(path)
    }

    fn from_toml(text: &str) -> Result<Self, ConfigError> {
        load_preset(text)
    }

    fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(&PresetDocument::from(self))?)
    }

    fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }
}
