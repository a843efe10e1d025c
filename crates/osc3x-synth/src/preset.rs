//! The Osc3x preset data model.
//!
//! A [`Preset`] is plain data: three oscillator slots, two detunes and a
//! filter. Parsing and validation live in `osc3x-config`; a value of this
//! type is assumed valid.

#[cfg(not(feature = "std"))]
use alloc::string::String;

use osc3x_core::{FilterKind, MAX_Q, MIN_Q};

use crate::oscillator::OscillatorKind;

/// Number of oscillators in an Osc3x voice.
pub const OSCILLATOR_COUNT: usize = 3;

/// Oscillator level when a preset leaves it out.
pub const DEFAULT_LEVEL: f32 = 1.0;

/// Oscillator pan when a preset leaves it out (centre).
pub const DEFAULT_PAN: f32 = 0.0;

/// Detune in semitones when a preset leaves it out.
pub const DEFAULT_DETUNE: f32 = 0.0;

/// Filter Q when a preset leaves it out.
pub const DEFAULT_Q: f32 = 1.0;

/// One oscillator slot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OscillatorSettings {
    /// Waveform.
    pub kind: OscillatorKind,
    /// Gain into the mixer.
    pub level: f32,
    /// Stereo position in [-1, 1]; -1 is hard left.
    pub pan: f32,
}

impl OscillatorSettings {
    /// A slot at default level and pan.
    pub fn new(kind: OscillatorKind) -> Self {
        Self {
            kind,
            level: DEFAULT_LEVEL,
            pan: DEFAULT_PAN,
        }
    }
}

/// The filter stage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FilterSettings {
    /// Response.
    pub kind: FilterKind,
    /// Cutoff or centre frequency in Hz.
    pub frequency: f32,
    /// Q in `[MIN_Q, MAX_Q]`.
    pub q: f32,
}

impl FilterSettings {
    /// A filter at the kind's default frequency and the default Q.
    pub fn new(kind: FilterKind) -> Self {
        Self {
            kind,
            frequency: kind.default_frequency(),
            q: DEFAULT_Q,
        }
    }
}

/// A complete Osc3x voice configuration.
///
/// `Default` is the built-in patch: three sines at levels 0.5/0.2/0.1,
/// panned 0.5/-0.2/-0.1, into a low-pass at 22500 Hz.
#[derive(Clone, Debug, PartialEq)]
pub struct Preset {
    /// Display name.
    pub name: Option<String>,
    /// Free-form notes; ignored by the voice.
    pub description: Option<String>,
    /// Oscillator slots 1 to 3.
    pub oscillators: [OscillatorSettings; OSCILLATOR_COUNT],
    /// Detune of oscillator 2 in semitones.
    pub detune2: f32,
    /// Detune of oscillator 3 in semitones.
    pub detune3: f32,
    /// Filter stage.
    pub filter: FilterSettings,
}

impl Preset {
    /// A preset with the given kinds and every other field at its default.
    pub fn new(kinds: [OscillatorKind; OSCILLATOR_COUNT], filter: FilterKind) -> Self {
        Self {
            name: None,
            description: None,
            oscillators: kinds.map(OscillatorSettings::new),
            detune2: DEFAULT_DETUNE,
            detune3: DEFAULT_DETUNE,
            filter: FilterSettings::new(filter),
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets levels for slots 1 to 3.
    pub fn with_levels(mut self, levels: [f32; OSCILLATOR_COUNT]) -> Self {
        for (slot, level) in self.oscillators.iter_mut().zip(levels) {
            slot.level = level;
        }
        self
    }

    /// Sets pans for slots 1 to 3, clamped to [-1, 1].
    pub fn with_pans(mut self, pans: [f32; OSCILLATOR_COUNT]) -> Self {
        for (slot, pan) in self.oscillators.iter_mut().zip(pans) {
            slot.pan = pan.clamp(-1.0, 1.0);
        }
        self
    }

    /// Sets detune of oscillators 2 and 3 in semitones.
    pub fn with_detune(mut self, detune2: f32, detune3: f32) -> Self {
        self.detune2 = detune2;
        self.detune3 = detune3;
        self
    }

    /// Sets filter frequency and Q (clamped).
    pub fn with_filter(mut self, frequency: f32, q: f32) -> Self {
        self.filter.frequency = frequency;
        self.filter.q = q.clamp(MIN_Q, MAX_Q);
        self
    }

    /// True when either detune is non-zero.
    pub fn is_detuned(&self) -> bool {
        self.detune2 != 0.0 || self.detune3 != 0.0
    }
}

impl Default for Preset {
    fn default() -> Self {
        Self::new([OscillatorKind::Sine; OSCILLATOR_COUNT], FilterKind::LowPass)
            .with_name("default")
            .with_levels([0.5, 0.2, 0.1])
            .with_pans([0.5, -0.2, -0.1])
            .with_filter(22500.0, DEFAULT_Q)
    }
}
