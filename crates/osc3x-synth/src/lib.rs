//! Osc3x Synth - the three-oscillator voice and its allocator
//!
//! # Core Components
//!
//! ## Oscillators
//!
//! Audio-rate oscillators with PolyBLEP anti-aliasing:
//!
//! - [`Oscillator`] - Oscillator with its own amplitude
//! - [`OscillatorKind`] - Sine, Triangle, Square, Sawtooth
//!
//! ```rust
//! use osc3x_synth::{Oscillator, OscillatorKind};
//!
//! let mut osc = Oscillator::new(OscillatorKind::Square, 48000.0);
//! osc.note_on(440.0, 0.5);
//!
//! let sample = osc.advance();
//! ```
//!
//! ## Presets
//!
//! - [`Preset`] - Oscillator kinds, levels, pans, detunes and the filter
//!
//! ## Voices
//!
//! - [`Osc3xVoice`] - Three oscillators into a [`StereoMixer`] into a biquad
//!   pair, wired as a static graph
//! - [`VoiceAllocator`] - Fixed voice pool with retrigger, least-recently-released
//!   reuse and oldest-note stealing
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! osc3x-synth = { version = "0.1", default-features = false }
//! ```
//!
//! # Example: Rendering a chord
//!
//! ```rust
//! use osc3x_core::{TimeStamp, pitch_to_frequency};
//! use osc3x_synth::{MAX_VOICES, Preset, VoiceAllocator};
//!
//! let mut synth = VoiceAllocator::new(&Preset::default(), MAX_VOICES, 48000.0, 256).unwrap();
//!
//! for pitch in [60u8, 64, 67] {
//!     synth.note_on(pitch, pitch_to_frequency(f32::from(pitch)), 0.4, TimeStamp::ZERO);
//! }
//!
//! let (left, right) = synth.process(256);
//! assert_eq!(left.len(), right.len());
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod allocator;
pub mod mixer;
pub mod oscillator;
pub mod preset;
pub mod voice;

pub use allocator::{Allocation, MAX_VOICES, VoiceAllocator};
pub use mixer::{StereoMixer, pan_gains};
pub use oscillator::{Oscillator, OscillatorKind};
pub use preset::{
    DEFAULT_DETUNE, DEFAULT_LEVEL, DEFAULT_PAN, DEFAULT_Q, FilterSettings, OSCILLATOR_COUNT,
    OscillatorSettings, Preset,
};
pub use voice::{Osc3xVoice, VoiceUnit};
