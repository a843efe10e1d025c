//! Playback time stamps and MIDI tick conversion.
//!
//! Times are seconds from the start of playback. The tempo is an external
//! parameter: tempo meta events in a file never reach this module.

use core::fmt;
use core::ops::Sub;

use libm::round;

/// A point in time, in seconds from the start of playback.
///
/// Ordered by value. Negative stamps are allowed during arithmetic and
/// saturate to sample 0 when converted.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct TimeStamp(f64);

impl TimeStamp {
    /// The start of playback.
    pub const ZERO: TimeStamp = TimeStamp(0.0);

    /// Creates a time stamp from seconds.
    #[inline]
    pub const fn from_secs(secs: f64) -> Self {
        Self(secs)
    }

    /// Seconds since the start of playback.
    #[inline]
    pub const fn as_secs(self) -> f64 {
        self.0
    }

    /// Sample index this time falls on: `round(secs * sample_rate)`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use osc3x_core::TimeStamp;
    ///
    /// assert_eq!(TimeStamp::from_secs(0.5).to_sample_index(44100.0), 22050);
    /// assert_eq!(TimeStamp::from_secs(-1.0).to_sample_index(44100.0), 0);
    /// ```
    #[inline]
    pub fn to_sample_index(self, sample_rate: f32) -> u64 {
        let index = round(self.0 * f64::from(sample_rate));
        if index <= 0.0 { 0 } else { index as u64 }
    }

    /// Time stamp of a sample index.
    #[inline]
    pub fn from_sample_index(index: u64, sample_rate: f32) -> Self {
        Self(index as f64 / f64::from(sample_rate))
    }
}

impl Sub for TimeStamp {
    type Output = TimeStamp;

    fn sub(self, rhs: TimeStamp) -> TimeStamp {
        TimeStamp(self.0 - rhs.0)
    }
}

impl fmt::Display for TimeStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s", self.0)
    }
}

/// Converts an absolute MIDI tick to seconds at a fixed tempo.
///
/// `seconds = tick * 60 / (tempo_bpm * ticks_per_beat)`.
///
/// # Example
///
/// ```rust
/// use osc3x_core::ticks_to_seconds;
///
/// // Two beats at 60 BPM.
/// assert!((ticks_to_seconds(192, 60.0, 96) - 2.0).abs() < 1e-12);
/// ```
#[inline]
pub fn ticks_to_seconds(tick: u64, tempo_bpm: f64, ticks_per_beat: u16) -> f64 {
    tick as f64 * 60.0 / (tempo_bpm * f64::from(ticks_per_beat))
}
