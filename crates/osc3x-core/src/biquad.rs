//! Biquad (bi-quadratic) filters for the voice output stage.
//!
//! Provides the raw second-order IIR section ([`Biquad`]), the three
//! response shapes a preset can select ([`FilterKind`]), and
//! [`BiquadFilter`], which keeps the configured frequency and Q alongside
//! the derived coefficients.
//!
//! Coefficient calculation uses the RBJ Audio EQ Cookbook formulas.

use core::f32::consts::PI;
use libm::{cosf, sinf};

/// Lowest frequency handed to the coefficient formulas, in Hz.
pub const MIN_COEFFICIENT_FREQUENCY: f32 = 10.0;

/// Highest frequency handed to the coefficient formulas, as a fraction of
/// the sample rate. Keeps the cookbook formulas away from Nyquist.
pub const MAX_FREQUENCY_RATIO: f32 = 0.49;

/// Lower bound of the filter Q range.
pub const MIN_Q: f32 = 0.1;

/// Upper bound of the filter Q range.
pub const MAX_Q: f32 = 10.0;

/// Generic biquad filter coefficients and state.
///
/// Implements the Direct Form I biquad structure:
/// ```text
/// y[n] = b0*x[n] + b1*x[n-1] + b2*x[n-2]
///                - a1*y[n-1] - a2*y[n-2]
/// ```
#[derive(Debug, Clone)]
pub struct Biquad {
    /// Feedforward coefficients
    b0: f32,
    b1: f32,
    b2: f32,

    /// Feedback coefficients, normalized by a0
    a1: f32,
    a2: f32,

    /// Input delay line: x[n-1], x[n-2]
    x1: f32,
    x2: f32,

    /// Output delay line: y[n-1], y[n-2]
    y1: f32,
    y2: f32,
}

impl Biquad {
    /// Creates a new biquad with passthrough coefficients.
    ///
    /// Initial state: `y[n] = x[n]` (no filtering)
    pub fn new() -> Self {
        Self {
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    /// Sets the biquad coefficients.
    ///
    /// Normalizes by `a0` internally.
    pub fn set_coefficients(&mut self, b0: f32, b1: f32, b2: f32, a0: f32, a1: f32, a2: f32) {
        let a0_inv = 1.0 / a0;
        self.b0 = b0 * a0_inv;
        self.b1 = b1 * a0_inv;
        self.b2 = b2 * a0_inv;
        self.a1 = a1 * a0_inv;
        self.a2 = a2 * a0_inv;
    }

    /// Processes a single sample through the biquad filter.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let output = self.b0 * input + self.b1 * self.x1 + self.b2 * self.x2
            - self.a1 * self.y1
            - self.a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;

        output
    }

    /// Clears the filter state (delay lines) without touching coefficients.
    pub fn clear(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }
}

impl Default for Biquad {
    fn default() -> Self {
        Self::new()
    }
}

/// Filter response selected by a preset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FilterKind {
    /// Low-pass: passes content below the cutoff.
    LowPass,
    /// High-pass: passes content above the cutoff.
    HighPass,
    /// Band-pass with constant 0 dB peak gain.
    BandPass,
}

impl FilterKind {
    /// All filter kinds, in declaration order.
    pub const ALL: [FilterKind; 3] = [Self::LowPass, Self::HighPass, Self::BandPass];

    /// Frequency used when a preset names the kind but not the frequency.
    ///
    /// A wide-open low-pass, a high-pass at 0 Hz, and a band-pass centred in
    /// the middle of the audible range.
    pub fn default_frequency(self) -> f32 {
        match self {
            Self::LowPass => 44100.0,
            Self::HighPass => 0.0,
            Self::BandPass => 11500.0,
        }
    }

    /// Lower-case name as written in preset files.
    pub fn name(self) -> &'static str {
        match self {
            Self::LowPass => "lowpass",
            Self::HighPass => "highpass",
            Self::BandPass => "bandpass",
        }
    }

    /// Parses a preset name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name.trim()))
    }

    /// RBJ cookbook coefficients for this response.
    ///
    /// Returns `(b0, b1, b2, a0, a1, a2)`.
    pub fn coefficients(
        self,
        frequency: f32,
        q: f32,
        sample_rate: f32,
    ) -> (f32, f32, f32, f32, f32, f32) {
        match self {
            Self::LowPass => lowpass_coefficients(frequency, q, sample_rate),
            Self::HighPass => highpass_coefficients(frequency, q, sample_rate),
            Self::BandPass => bandpass_coefficients(frequency, q, sample_rate),
        }
    }
}

impl core::fmt::Display for FilterKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Calculates low-pass filter coefficients using the RBJ cookbook formula.
///
/// Returns `(b0, b1, b2, a0, a1, a2)`.
pub fn lowpass_coefficients(frequency: f32, q: f32, sample_rate: f32) -> (f32, f32, f32, f32, f32, f32) {
    let omega = 2.0 * PI * frequency / sample_rate;
    let cos_omega = cosf(omega);
    let sin_omega = sinf(omega);
    let alpha = sin_omega / (2.0 * q);

    let b0 = (1.0 - cos_omega) / 2.0;
    let b1 = 1.0 - cos_omega;
    let b2 = (1.0 - cos_omega) / 2.0;
    let a0 = 1.0 + alpha;
    let a1 = -2.0 * cos_omega;
    let a2 = 1.0 - alpha;

    (b0, b1, b2, a0, a1, a2)
}

/// Calculates high-pass filter coefficients using the RBJ cookbook formula.
///
/// Returns `(b0, b1, b2, a0, a1, a2)`.
pub fn highpass_coefficients(frequency: f32, q: f32, sample_rate: f32) -> (f32, f32, f32, f32, f32, f32) {
    let omega = 2.0 * PI * frequency / sample_rate;
    let cos_omega = cosf(omega);
    let sin_omega = sinf(omega);
    let alpha = sin_omega / (2.0 * q);

    let b0 = (1.0 + cos_omega) / 2.0;
    let b1 = -(1.0 + cos_omega);
    let b2 = (1.0 + cos_omega) / 2.0;
    let a0 = 1.0 + alpha;
    let a1 = -2.0 * cos_omega;
    let a2 = 1.0 - alpha;

    (b0, b1, b2, a0, a1, a2)
}

/// Calculates band-pass filter coefficients using the RBJ cookbook formula.
///
/// This version has constant 0 dB peak gain.
///
/// Returns `(b0, b1, b2, a0, a1, a2)`.
pub fn bandpass_coefficients(frequency: f32, q: f32, sample_rate: f32) -> (f32, f32, f32, f32, f32, f32) {
    let omega = 2.0 * PI * frequency / sample_rate;
    let cos_omega = cosf(omega);
    let sin_omega = sinf(omega);
    let alpha = sin_omega / (2.0 * q);

    let b0 = alpha;
    let b1 = 0.0;
    let b2 = -alpha;
    let a0 = 1.0 + alpha;
    let a1 = -2.0 * cos_omega;
    let a2 = 1.0 - alpha;

    (b0, b1, b2, a0, a1, a2)
}

/// A configured biquad: kind, frequency and Q plus the running section.
///
/// The configured frequency is stored as given (a low-pass at 44100 Hz stays
/// 44100 Hz for inspection); only the value handed to the coefficient
/// formulas is clamped into
/// `[MIN_COEFFICIENT_FREQUENCY, MAX_FREQUENCY_RATIO * sample_rate]`.
///
/// # Example
///
/// ```rust
/// use osc3x_core::{BiquadFilter, FilterKind};
///
/// let mut lp = BiquadFilter::new(FilterKind::LowPass, 1000.0, 0.707, 44100.0);
/// let y = lp.process(1.0);
/// assert!(y.is_finite());
/// ```
#[derive(Debug, Clone)]
pub struct BiquadFilter {
    kind: FilterKind,
    frequency: f32,
    q: f32,
    sample_rate: f32,
    section: Biquad,
}

impl BiquadFilter {
    /// Creates a filter; `q` is clamped to `[MIN_Q, MAX_Q]`.
    pub fn new(kind: FilterKind, frequency: f32, q: f32, sample_rate: f32) -> Self {
        let mut filter = Self {
            kind,
            frequency,
            q: q.clamp(MIN_Q, MAX_Q),
            sample_rate,
            section: Biquad::new(),
        };
        filter.update_coefficients();
        filter
    }

    /// Filter response.
    pub fn kind(&self) -> FilterKind {
        self.kind
    }

    /// Configured frequency in Hz (unclamped).
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Q factor after clamping.
    pub fn q(&self) -> f32 {
        self.q
    }

    /// Frequency actually used for the coefficients.
    pub fn effective_frequency(&self) -> f32 {
        let max = self.sample_rate * MAX_FREQUENCY_RATIO;
        self.frequency.clamp(MIN_COEFFICIENT_FREQUENCY, max)
    }

    /// Sets the frequency in Hz and recomputes coefficients.
    pub fn set_frequency(&mut self, frequency: f32) {
        self.frequency = frequency;
        self.update_coefficients();
    }

    /// Sets Q (clamped) and recomputes coefficients.
    pub fn set_q(&mut self, q: f32) {
        self.q = q.clamp(MIN_Q, MAX_Q);
        self.update_coefficients();
    }

    /// Processes one sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        self.section.process(input)
    }

    /// Clears the delay lines.
    pub fn clear(&mut self) {
        self.section.clear();
    }

    fn update_coefficients(&mut self) {
        let (b0, b1, b2, a0, a1, a2) =
            self.kind
                .coefficients(self.effective_frequency(), self.q, self.sample_rate);
        self.section.set_coefficients(b0, b1, b2, a0, a1, a2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settle(filter: &mut BiquadFilter, input: f32, samples: usize) -> f32 {
        let mut output = 0.0;
        for _ in 0..samples {
            output = filter.process(input);
        }
        output
    }

    #[test]
    fn test_biquad_passthrough() {
        let mut biquad = Biquad::new();

        for i in 0..10 {
            let input = i as f32 * 0.1;
            let output = biquad.process(input);
            assert!((output - input).abs() < 0.0001);
        }
    }

    #[test]
    fn test_biquad_clear() {
        let mut biquad = Biquad::new();
        for _ in 0..10 {
            biquad.process(1.0);
        }

        biquad.clear();

        assert_eq!(biquad.x1, 0.0);
        assert_eq!(biquad.x2, 0.0);
        assert_eq!(biquad.y1, 0.0);
        assert_eq!(biquad.y2, 0.0);
    }

    #[test]
    fn test_coefficients_finite() {
        for kind in FilterKind::ALL {
            let (b0, b1, b2, a0, a1, a2) = kind.coefficients(1000.0, 0.707, 44100.0);
            for c in [b0, b1, b2, a0, a1, a2] {
                assert!(c.is_finite(), "{kind}: non-finite coefficient {c}");
            }
            assert!(a0 > 0.0);
        }
    }

    #[test]
    fn test_lowpass_passes_dc() {
        let mut lp = BiquadFilter::new(FilterKind::LowPass, 1000.0, 0.707, 44100.0);
        let out = settle(&mut lp, 1.0, 1000);
        assert!((out - 1.0).abs() < 0.05, "DC through low-pass: {out}");
    }

    #[test]
    fn test_highpass_blocks_dc() {
        let mut hp = BiquadFilter::new(FilterKind::HighPass, 1000.0, 0.707, 44100.0);
        let out = settle(&mut hp, 1.0, 4000);
        assert!(out.abs() < 0.01, "DC through high-pass: {out}");
    }

    #[test]
    fn test_bandpass_attenuates_dc() {
        let mut bp = BiquadFilter::new(FilterKind::BandPass, 11500.0, 1.0, 44100.0);
        let out = settle(&mut bp, 1.0, 4000);
        assert!(out.abs() < 0.01, "DC through band-pass: {out}");
    }

    #[test]
    fn test_wide_open_lowpass_is_clamped_and_stable() {
        let mut lp = BiquadFilter::new(FilterKind::LowPass, 44100.0, 1.0, 44100.0);
        assert_eq!(lp.frequency(), 44100.0);
        assert!((lp.effective_frequency() - 44100.0 * MAX_FREQUENCY_RATIO).abs() < 0.01);

        let out = settle(&mut lp, 0.5, 2000);
        assert!((out - 0.5).abs() < 0.01, "open low-pass should pass DC: {out}");
    }

    #[test]
    fn test_zero_hz_highpass_uses_floor() {
        let hp = BiquadFilter::new(FilterKind::HighPass, 0.0, 1.0, 44100.0);
        assert_eq!(hp.frequency(), 0.0);
        assert_eq!(hp.effective_frequency(), MIN_COEFFICIENT_FREQUENCY);
    }

    #[test]
    fn test_q_is_clamped() {
        let mut f = BiquadFilter::new(FilterKind::BandPass, 1000.0, 50.0, 48000.0);
        assert_eq!(f.q(), MAX_Q);
        f.set_q(0.0);
        assert_eq!(f.q(), MIN_Q);
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(FilterKind::from_name("LowPass"), Some(FilterKind::LowPass));
        assert_eq!(FilterKind::from_name("HIGHPASS"), Some(FilterKind::HighPass));
        assert_eq!(FilterKind::from_name(" bandpass "), Some(FilterKind::BandPass));
        assert_eq!(FilterKind::from_name("notch"), None);
    }

    #[test]
    fn test_default_frequencies() {
        assert_eq!(FilterKind::LowPass.default_frequency(), 44100.0);
        assert_eq!(FilterKind::HighPass.default_frequency(), 0.0);
        assert_eq!(FilterKind::BandPass.default_frequency(), 11500.0);
    }
}
