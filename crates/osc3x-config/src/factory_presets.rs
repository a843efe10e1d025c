//! Factory presets bundled with the library.
//!
//! These are embedded at compile time, always available, and go through the
//! same loader as user files.

use osc3x_synth::Preset;

use crate::error::ConfigError;
use crate::loader::load_preset;

/// TOML content for factory presets, keyed by lookup name.
static FACTORY_PRESETS_TOML: &[(&str, &str)] = &[
    ("default", DEFAULT_PRESET),
    ("init", INIT_PRESET),
    ("hollow_lead", HOLLOW_LEAD_PRESET),
    ("detuned_saw", DETUNED_SAW_PRESET),
    ("glass_bell", GLASS_BELL_PRESET),
    ("thin_buzz", THIN_BUZZ_PRESET),
];

/// Built-in voice: three sines, mostly right, under an open low-pass.
const DEFAULT_PRESET: &str = r#"
name = "default"
description = "Three sines panned around centre"
osc1 = "sine"
osc2 = "sine"
osc3 = "sine"
level1 = 0.5
level2 = 0.2
level3 = 0.1
pan1 = 0.5
pan2 = -0.2
pan3 = -0.1
filter = "lowpass"
filterFreq = 22500
filterQ = 1.0
"#;

/// Everything at its default.
const INIT_PRESET: &str = r#"
name = "init"
description = "Three centred sines, filter wide open"
osc1 = "sine"
osc2 = "sine"
osc3 = "sine"
filter = "lowpass"
"#;

const HOLLOW_LEAD_PRESET: &str = r#"
name = "hollow_lead"
description = "Square, sine and triangle spread across the stereo field"
osc1 = "square"
osc2 = "sine"
osc3 = "triangle"
level1 = 1.0
level2 = 0.5
level3 = 0.8
pan1 = 0.5
pan2 = -0.5
pan3 = 0.0
filter = "lowpass"
filterFreq = 6000
filterQ = 0.8
"#;

const DETUNED_SAW_PRESET: &str = r#"
name = "detuned_saw"
description = "Three saws a few cents apart"
osc1 = "saw"
osc2 = "saw"
osc3 = "saw"
level1 = 0.4
level2 = 0.4
level3 = 0.4
pan1 = 0.0
pan2 = -0.7
pan3 = 0.7
detune2 = 0.08
detune3 = -0.08
filter = "lowpass"
filterFreq = 3500
filterQ = 1.5
"#;

const GLASS_BELL_PRESET: &str = r#"
name = "glass_bell"
description = "Sine with octave and twelfth partials through a band-pass"
osc1 = "sine"
osc2 = "triangle"
osc3 = "sine"
level1 = 0.6
level2 = 0.3
level3 = 0.2
pan2 = -0.3
pan3 = 0.3
detune2 = 12
detune3 = 19
filter = "bandpass"
filterFreq = 2500
filterQ = 0.7
"#;

const THIN_BUZZ_PRESET: &str = r#"
name = "thin_buzz"
description = "Square and saw with the low end removed"
osc1 = "square"
osc2 = "saw"
osc3 = "square"
level1 = 0.5
level2 = 0.5
level3 = 0.3
detune3 = -12
filter = "highpass"
filterFreq = 900
filterQ = 2.0
"#;

/// Get all factory presets.
///
/// # Example
///
/// ```rust
/// use osc3x_config::factory_presets;
///
/// let presets = factory_presets();
/// assert!(presets.len() >= 6);
/// ```
pub fn factory_presets() -> Vec<Preset> {
    FACTORY_PRESETS_TOML
        .iter()
        .filter_map(|(_, toml)| load_preset(toml).ok())
        .collect()
}

/// Get a factory preset by name. The match is case-insensitive.
///
/// # Example
///
/// ```rust
/// use osc3x_config::get_factory_preset;
///
/// let preset = get_factory_preset("Default").unwrap();
/// assert_eq!(preset.oscillators[0].level, 0.5);
/// assert!(get_factory_preset("nonexistent").is_none());
/// ```
pub fn get_factory_preset(name: &str) -> Option<Preset> {
    let (_, toml) = FACTORY_PRESETS_TOML
        .iter()
        .find(|(preset_name, _)| preset_name.eq_ignore_ascii_case(name.trim()))?;
    load_preset(toml).ok()
}

/// Like [`get_factory_preset`], as a `Result`.
pub fn factory_preset(name: &str) -> Result<Preset, ConfigError> {
    get_factory_preset(name).ok_or_else(|| ConfigError::PresetNotFound(name.to_string()))
}

/// Names of all factory presets, in listing order.
pub fn factory_preset_names() -> Vec<&'static str> {
    FACTORY_PRESETS_TOML.iter().map(|(name, _)| *name).collect()
}

/// Check if a preset name is a factory preset (case-insensitive).
pub fn is_factory_preset(name: &str) -> bool {
    FACTORY_PRESETS_TOML
        .iter()
        .any(|(preset_name, _)| preset_name.eq_ignore_ascii_case(name.trim()))
}
