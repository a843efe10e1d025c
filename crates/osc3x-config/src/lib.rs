//! Preset management for the osc3x synthesizer.
//!
//! Presets are small TOML documents describing one Osc3x voice: three
//! oscillator kinds with level and pan, two detunes, and a filter. This
//! crate turns that text into a validated [`Preset`] (or a [`ConfigError`]
//! naming the offending key), writes presets back, and ships a handful of
//! factory presets.
//!
//! # Features
//!
//! - **Loader**: [`load_preset`], [`load_preset_file`] with field-level errors
//! - **Writing**: [`PresetFile::to_toml`] and [`PresetFile::save`]
//! - **Factory Presets**: built-ins available by name, including `default`
//! - **Lookup**: [`resolve_preset`] accepts a path, a user preset or a factory name
//!
//! # Example
//!
//! ```rust,no_run
//! use osc3x_config::{PresetFile, load_preset_file, resolve_preset};
//! use osc3x_synth::Preset;
//!
//! // Load a preset from file
//! let preset = load_preset_file("presets/00.toml").unwrap();
//!
//! // Or by factory name
//! let preset = resolve_preset("hollow_lead").unwrap();
//!
//! // Save a tweaked copy
//! let tweaked = preset.with_detune(0.0, 12.0);
//! tweaked.save("presets/hollow_octave.toml").unwrap();
//! ```

mod error;
mod loader;

/// Preset lookup in files, the user directory, and factory presets.
pub mod paths;

/// Factory presets bundled with the library.
pub mod factory_presets;

pub use error::ConfigError;
pub use factory_presets::{
    factory_preset, factory_preset_names, factory_presets, get_factory_preset, is_factory_preset,
};
pub use loader::{PresetFile, load_preset, load_preset_file, preset_from_table};
pub use paths::{
    find_preset, list_presets_in_dir, preset_name_from_path, resolve_preset, user_presets_dir,
};

/// Re-export the preset data model from osc3x-synth
pub use osc3x_synth::{FilterSettings, OscillatorKind, OscillatorSettings, Preset};
