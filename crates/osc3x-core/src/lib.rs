//! Osc3x Core - signal primitives shared by the Osc3x synthesizer
//!
//! This crate holds the pieces every other Osc3x crate builds on. None of
//! them know about presets, MIDI files or audio devices.
//!
//! # Core Abstractions
//!
//! ## Signal Graph
//!
//! - [`GraphBuilder`] - Collects units and port connections, then sorts them
//! - [`Graph`] - A static, topologically ordered arena of [`Unit`]s
//! - [`StereoSamples`] - Left/right sample buffers for whole renders
//!
//! ## Filters
//!
//! - [`Biquad`] - Second-order IIR section with RBJ cookbook coefficients
//! - [`BiquadFilter`] - A biquad that remembers its [`FilterKind`], frequency and Q
//!
//! ## Time and Pitch
//!
//! - [`TimeStamp`] - Seconds from the start of playback
//! - [`ticks_to_seconds`] - MIDI tick conversion at an external tempo
//! - [`frequency_to_pitch`] / [`pitch_to_frequency`] - Fractional MIDI pitch
//!
//! ## Note Events
//!
//! - [`NoteSink`] - Anything that accepts timestamped note-on/note-off calls
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature in
//! your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! osc3x-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use osc3x_core::{pitch_to_frequency, ticks_to_seconds, TimeStamp};
//!
//! // One beat at 120 BPM lasts half a second.
//! let secs = ticks_to_seconds(480, 120.0, 480);
//! assert!((secs - 0.5).abs() < 1e-12);
//!
//! let at = TimeStamp::from_secs(secs);
//! assert_eq!(at.to_sample_index(48000.0), 24000);
//!
//! assert!((pitch_to_frequency(69.0) - 440.0).abs() < 1e-3);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod biquad;
pub mod graph;
pub mod note;
pub mod pitch;
pub mod time;

// Re-export main types at crate root
pub use biquad::{
    Biquad, BiquadFilter, FilterKind, MAX_FREQUENCY_RATIO, MAX_Q, MIN_COEFFICIENT_FREQUENCY,
    MIN_Q, bandpass_coefficients, highpass_coefficients, lowpass_coefficients,
};
pub use graph::{Graph, GraphBuilder, GraphError, Inputs, NodeId, StereoSamples, Unit};
pub use note::NoteSink;
pub use pitch::{CONCERT_A_HZ, CONCERT_A_PITCH, frequency_to_pitch, pitch_to_frequency};
pub use time::{TimeStamp, ticks_to_seconds};
