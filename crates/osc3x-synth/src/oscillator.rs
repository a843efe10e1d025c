//! Audio-rate oscillators with anti-aliasing.
//!
//! The Osc3x voice uses four waveforms. Sawtooth and square are corrected
//! with PolyBLEP (Polynomial Band-Limited Step); the triangle is a leaky
//! integral of the corrected square. Each oscillator carries its own
//! amplitude, so note-on and note-off are amplitude changes rather than an
//! envelope.

use core::f32::consts::PI;
use core::fmt;

use libm::{floorf, sinf};

/// Euclidean remainder for f32, compatible with no_std.
#[inline]
fn rem_euclid_f32(a: f32, b: f32) -> f32 {
    let r = a - b * floorf(a / b);
    if r < 0.0 { r + b } else { r }
}

/// Oscillator waveform selected by a preset slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OscillatorKind {
    /// Sine waveform, pure fundamental.
    #[default]
    Sine,
    /// Triangle waveform, odd harmonics rolling off quickly.
    Triangle,
    /// Square waveform (50% duty cycle).
    Square,
    /// Sawtooth waveform, all harmonics.
    Sawtooth,
}

impl OscillatorKind {
    /// All oscillator kinds, in declaration order.
    pub const ALL: [OscillatorKind; 4] = [Self::Sine, Self::Triangle, Self::Square, Self::Sawtooth];

    /// Lower-case name as written in preset files.
    pub fn name(self) -> &'static str {
        match self {
            Self::Sine => "sine",
            Self::Triangle => "triangle",
            Self::Square => "square",
            Self::Sawtooth => "saw",
        }
    }

    /// Parses a preset name, ignoring ASCII case. `sawtooth` is accepted as
    /// an alias of `saw`.
    ///
    /// ```rust
    /// use osc3x_synth::OscillatorKind;
    ///
    /// assert_eq!(OscillatorKind::from_name("Square"), Some(OscillatorKind::Square));
    /// assert_eq!(OscillatorKind::from_name("sawtooth"), Some(OscillatorKind::Sawtooth));
    /// assert_eq!(OscillatorKind::from_name("noise"), None);
    /// ```
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.eq_ignore_ascii_case("sawtooth") {
            return Some(Self::Sawtooth);
        }
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for OscillatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Audio-rate oscillator with PolyBLEP anti-aliasing and an output amplitude.
///
/// A fresh oscillator is silent (amplitude 0). [`note_on`](Self::note_on)
/// sets frequency and amplitude together; [`note_off`](Self::note_off)
/// drops the amplitude to 0. The phase runs continuously across notes.
///
/// # Example
///
/// ```rust
/// use osc3x_synth::{Oscillator, OscillatorKind};
///
/// let mut osc = Oscillator::new(OscillatorKind::Sawtooth, 48000.0);
/// assert_eq!(osc.advance(), 0.0);
///
/// osc.note_on(440.0, 0.5);
/// let sample = osc.advance();
/// assert!(sample.abs() <= 0.5 + 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct Oscillator {
    /// Current phase position [0.0, 1.0)
    phase: f32,
    /// Phase increment per sample
    phase_inc: f32,
    sample_rate: f32,
    frequency: f32,
    amplitude: f32,
    kind: OscillatorKind,
    /// Integrator state for the triangle
    prev_output: f32,
}

impl Oscillator {
    /// Create a silent oscillator at 440 Hz.
    pub fn new(kind: OscillatorKind, sample_rate: f32) -> Self {
        Self {
            phase: 0.0,
            phase_inc: 440.0 / sample_rate,
            sample_rate,
            frequency: 440.0,
            amplitude: 0.0,
            kind,
            prev_output: 0.0,
        }
    }

    /// Start sounding at `frequency` Hz with peak `amplitude`.
    pub fn note_on(&mut self, frequency: f32, amplitude: f32) {
        self.set_frequency(frequency);
        self.amplitude = amplitude;
    }

    /// Silence the oscillator.
    pub fn note_off(&mut self) {
        self.amplitude = 0.0;
    }

    /// Set frequency in Hz. Negative values clamp to 0.
    ///
    /// Frequencies above Nyquist alias: the phase increment is folded into
    /// `[0, 0.5]`, the rate a sampled tone at `freq_hz` would actually show.
    /// [`frequency`](Self::frequency) still reports the requested value.
    pub fn set_frequency(&mut self, freq_hz: f32) {
        self.frequency = freq_hz.max(0.0);
        let inc = rem_euclid_f32(self.frequency / self.sample_rate, 1.0);
        self.phase_inc = if inc > 0.5 { 1.0 - inc } else { inc };
    }

    /// Current frequency in Hz.
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Current output amplitude.
    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }

    /// Waveform.
    pub fn kind(&self) -> OscillatorKind {
        self.kind
    }

    /// True while the amplitude is non-zero.
    pub fn is_sounding(&self) -> bool {
        self.amplitude != 0.0
    }

    /// Reset phase and integrator state. Amplitude is untouched.
    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.prev_output = 0.0;
    }

    /// Generate the next sample, scaled by the amplitude.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        let output = self.waveform_at(self.phase) * self.amplitude;
        self.phase += self.phase_inc;
        if self.phase >= 1.0 {
            self.phase -= floorf(self.phase);
        }
        output
    }

    /// Fill `out` with consecutive samples.
    pub fn fill(&mut self, out: &mut [f32]) {
        for sample in out.iter_mut() {
            *sample = self.advance();
        }
    }

    /// Unscaled waveform value at `phase`.
    ///
    /// Sine needs no correction. Saw is a naive ramp minus a PolyBLEP at the
    /// wrap. Square adds a PolyBLEP at both edges. Triangle leaks-integrates
    /// the corrected square, with a leak that tracks frequency.
    #[inline]
    fn waveform_at(&mut self, phase: f32) -> f32 {
        let dt = self.phase_inc;
        match self.kind {
            OscillatorKind::Sine => sinf(phase * 2.0 * PI),

            OscillatorKind::Sawtooth => 2.0 * phase - 1.0 - poly_blep(phase, dt),

            OscillatorKind::Square => square_blep(phase, dt),

            OscillatorKind::Triangle => {
                let leak = 1.0 - (self.frequency / self.sample_rate).min(0.1);
                self.prev_output = leak * self.prev_output + square_blep(phase, dt) * dt * 4.0;
                self.prev_output
            }
        }
    }
}

#[inline]
fn square_blep(phase: f32, dt: f32) -> f32 {
    let naive = if phase < 0.5 { 1.0 } else { -1.0 };
    naive + poly_blep(phase, dt) - poly_blep(rem_euclid_f32(phase + 0.5, 1.0), dt)
}

/// 4th-order PolyBLEP correction near a unit step at phase 0.
///
/// The window spans two samples on each side of the discontinuity. Inside
/// `[0, 1)` samples the residual is a C²-continuous quartic; inside `[1, 2)`
/// it is `C * (2 - n)^4`. The backward side mirrors the forward side with
/// opposite sign.
///
/// Returns 0.0 when `t` is more than two samples from the step.
#[inline]
fn poly_blep(t: f32, dt: f32) -> f32 {
    const A4: f32 = -43.0 / 48.0;
    const A3: f32 = 7.0 / 6.0;
    const A2: f32 = 0.5;
    const A0: f32 = -1.0;
    const C: f32 = -11.0 / 48.0;

    let residual = |n: f32| {
        if n < 1.0 {
            let n2 = n * n;
            A4 * n2 * n2 + A3 * n2 * n + A2 * n2 + A0
        } else {
            let u = 2.0 - n;
            let u2 = u * u;
            C * u2 * u2
        }
    };

    if dt <= 0.0 {
        return 0.0;
    }
    let window = 2.0 * dt;
    if t < window {
        residual(t / dt)
    } else if t > 1.0 - window {
        -residual((1.0 - t) / dt)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positive_zero_crossings(osc: &mut Oscillator, samples: usize) -> i32 {
        let mut crossings = 0;
        let mut prev = 0.0;
        for _ in 0..samples {
            let sample = osc.advance();
            if prev <= 0.0 && sample > 0.0 {
                crossings += 1;
            }
            prev = sample;
        }
        crossings
    }

    #[test]
    fn test_silent_until_note_on() {
        for kind in OscillatorKind::ALL {
            let mut osc = Oscillator::new(kind, 48000.0);
            assert!(!osc.is_sounding());
            assert!((0..256).all(|_| osc.advance() == 0.0), "{kind} not silent");
        }
    }

    #[test]
    fn test_sine_frequency_440hz() {
        let mut osc = Oscillator::new(OscillatorKind::Sine, 48000.0);
        osc.note_on(440.0, 1.0);
        let crossings = positive_zero_crossings(&mut osc, 48000);
        assert!(
            (crossings - 440).abs() <= 2,
            "Expected ~440 zero crossings, got {}",
            crossings
        );
    }

    #[test]
    fn test_square_frequency_1000hz() {
        let mut osc = Oscillator::new(OscillatorKind::Square, 48000.0);
        osc.note_on(1000.0, 1.0);
        let crossings = positive_zero_crossings(&mut osc, 48000);
        assert!((crossings - 1000).abs() <= 2, "got {}", crossings);
    }

    #[test]
    fn test_amplitude_scales_output() {
        for kind in [OscillatorKind::Sine, OscillatorKind::Square, OscillatorKind::Sawtooth] {
            let mut osc = Oscillator::new(kind, 48000.0);
            osc.note_on(220.0, 0.25);
            let peak = (0..4800).map(|_| osc.advance().abs()).fold(0.0f32, f32::max);
            assert!(peak > 0.2 && peak < 0.3, "{kind}: peak {peak}");
        }
    }

    #[test]
    fn test_triangle_stays_bounded() {
        let mut osc = Oscillator::new(OscillatorKind::Triangle, 48000.0);
        osc.note_on(110.0, 1.0);
        let peak = (0..48000).map(|_| osc.advance().abs()).fold(0.0f32, f32::max);
        assert!(peak > 0.5 && peak < 1.5, "triangle peak {peak}");
    }

    #[test]
    fn test_note_off_silences() {
        let mut osc = Oscillator::new(OscillatorKind::Sawtooth, 48000.0);
        osc.note_on(330.0, 0.8);
        osc.advance();
        osc.note_off();
        assert_eq!(osc.amplitude(), 0.0);
        assert!((0..64).all(|_| osc.advance() == 0.0));
    }

    #[test]
    fn test_kind_names() {
        for kind in OscillatorKind::ALL {
            assert_eq!(OscillatorKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(OscillatorKind::from_name("SINE"), Some(OscillatorKind::Sine));
        assert_eq!(OscillatorKind::from_name("Triangle"), Some(OscillatorKind::Triangle));
        assert_eq!(OscillatorKind::from_name("pulse"), None);
    }

    #[test]
    fn test_above_sample_rate_stays_bounded() {
        for kind in OscillatorKind::ALL {
            let mut osc = Oscillator::new(kind, 44100.0);
            osc.note_on(66976.0, 0.5);
            assert_eq!(osc.frequency(), 66976.0);
            let peak = (0..44100).map(|_| osc.advance().abs()).fold(0.0f32, f32::max);
            assert!(peak.is_finite(), "{kind}: peak {peak}");
            if kind != OscillatorKind::Triangle {
                assert!(peak < 1.5, "{kind}: peak {peak}");
            }
        }
    }

    #[test]
    fn test_above_sample_rate_aliases() {
        // 44100 + 1000 Hz shows up as 1000 Hz.
        let mut osc = Oscillator::new(OscillatorKind::Sine, 44100.0);
        osc.note_on(45100.0, 1.0);
        let crossings = positive_zero_crossings(&mut osc, 44100);
        assert!((crossings - 1000).abs() <= 2, "got {}", crossings);
    }

    #[test]
    fn test_exact_sample_rate_is_finite() {
        let mut osc = Oscillator::new(OscillatorKind::Sawtooth, 48000.0);
        osc.note_on(48000.0, 1.0);
        assert!((0..256).all(|_| osc.advance().abs() <= 1.0));
    }

    #[test]
    fn test_zero_frequency_is_finite() {
        let mut osc = Oscillator::new(OscillatorKind::Square, 48000.0);
        osc.note_on(0.0, 1.0);
        assert!((0..128).all(|_| osc.advance().is_finite()));
    }
}
