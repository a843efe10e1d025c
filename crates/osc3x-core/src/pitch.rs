//! Conversion between frequency in Hz and fractional MIDI pitch.
//!
//! Equal temperament anchored at A4: pitch 69 is 440 Hz, one unit is one
//! semitone. Pitches are `f32` so detuned oscillators can sit between keys.

use libm::{exp2f, log2f};

/// MIDI pitch of the tuning reference (A4).
pub const CONCERT_A_PITCH: f32 = 69.0;

/// Frequency of the tuning reference in Hz.
pub const CONCERT_A_HZ: f32 = 440.0;

/// Converts a frequency in Hz to a fractional MIDI pitch.
///
/// `pitch = 69 + 12 * log2(f / 440)`. Non-positive frequencies have no
/// pitch and return negative infinity or NaN, as `log2` does.
///
/// # Example
///
/// ```rust
/// use osc3x_core::frequency_to_pitch;
///
/// assert!((frequency_to_pitch(880.0) - 81.0).abs() < 1e-4);
/// ```
#[inline]
pub fn frequency_to_pitch(frequency: f32) -> f32 {
    CONCERT_A_PITCH + 12.0 * log2f(frequency / CONCERT_A_HZ)
}

/// Converts a fractional MIDI pitch to a frequency in Hz.
///
/// `f = 440 * 2^((pitch - 69) / 12)`.
#[inline]
pub fn pitch_to_frequency(pitch: f32) -> f32 {
    CONCERT_A_HZ * exp2f((pitch - CONCERT_A_PITCH) / 12.0)
}
