//! Mono-to-stereo mixer with per-input level and pan.

use crate::preset::OscillatorSettings;

/// Left/right gains for a pan position.
///
/// Constant-power pan law: `angle = (pan + 1) * pi/4` maps [-1, 1] onto
/// [0, pi/2], then `left = cos(angle)`, `right = sin(angle)`. Centre gives
/// `1/sqrt(2)` on both sides. Pan is clamped to [-1, 1].
#[inline]
pub fn pan_gains(pan: f32) -> (f32, f32) {
    let angle = (pan.clamp(-1.0, 1.0) + 1.0) * core::f32::consts::FRAC_PI_4;
    let (sin_a, cos_a) = libm::sincosf(angle);
    (cos_a, sin_a)
}

/// Sums `N` mono inputs into a stereo pair.
///
/// Each input has a level and a pan; the effective left/right gains are
/// precomputed whenever either changes.
#[derive(Debug, Clone)]
pub struct StereoMixer<const N: usize> {
    levels: [f32; N],
    pans: [f32; N],
    gains: [(f32, f32); N],
}

impl<const N: usize> StereoMixer<N> {
    /// A mixer with every input at unity level, centred.
    pub fn new() -> Self {
        let mut mixer = Self {
            levels: [1.0; N],
            pans: [0.0; N],
            gains: [(0.0, 0.0); N],
        };
        for input in 0..N {
            mixer.update_gains(input);
        }
        mixer
    }

    /// A mixer seeded from preset oscillator slots.
    pub fn from_settings(settings: &[OscillatorSettings; N]) -> Self {
        let mut mixer = Self::new();
        for (input, slot) in settings.iter().enumerate() {
            mixer.levels[input] = slot.level;
            mixer.pans[input] = slot.pan.clamp(-1.0, 1.0);
            mixer.update_gains(input);
        }
        mixer
    }

    /// Sets the level of `input`. Out-of-range inputs are ignored.
    pub fn set_level(&mut self, input: usize, level: f32) {
        if input < N {
            self.levels[input] = level;
            self.update_gains(input);
        }
    }

    /// Sets the pan of `input`, clamped to [-1, 1].
    pub fn set_pan(&mut self, input: usize, pan: f32) {
        if input < N {
            self.pans[input] = pan.clamp(-1.0, 1.0);
            self.update_gains(input);
        }
    }

    /// Level of `input`.
    pub fn level(&self, input: usize) -> Option<f32> {
        self.levels.get(input).copied()
    }

    /// Pan of `input`.
    pub fn pan(&self, input: usize) -> Option<f32> {
        self.pans.get(input).copied()
    }

    /// Effective `(left, right)` gains of `input`.
    pub fn gains(&self, input: usize) -> Option<(f32, f32)> {
        self.gains.get(input).copied()
    }

    /// Mixes one sample per input.
    #[inline]
    pub fn mix(&self, samples: &[f32; N]) -> (f32, f32) {
        let mut left = 0.0;
        let mut right = 0.0;
        for (&x, &(gl, gr)) in samples.iter().zip(self.gains.iter()) {
            left += x * gl;
            right += x * gr;
        }
        (left, right)
    }

    fn update_gains(&mut self, input: usize) {
        let (l, r) = pan_gains(self.pans[input]);
        self.gains[input] = (l * self.levels[input], r * self.levels[input]);
    }
}

impl<const N: usize> Default for StereoMixer<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f32::consts::FRAC_1_SQRT_2;

    #[test]
    fn test_pan_law_endpoints() {
        let (l, r) = pan_gains(-1.0);
        assert!((l - 1.0).abs() < 1e-6 && r.abs() < 1e-6);
        let (l, r) = pan_gains(1.0);
        assert!(l.abs() < 1e-6 && (r - 1.0).abs() < 1e-6);
        let (l, r) = pan_gains(0.0);
        assert!((l - FRAC_1_SQRT_2).abs() < 1e-6 && (r - FRAC_1_SQRT_2).abs() < 1e-6);
    }

    #[test]
    fn test_pan_law_constant_power() {
        for i in 0..=20 {
            let pan = -1.0 + i as f32 * 0.1;
            let (l, r) = pan_gains(pan);
            assert!((l * l + r * r - 1.0).abs() < 1e-5, "pan {pan}");
        }
    }

    #[test]
    fn test_mix_applies_level_and_pan() {
        let mut mixer = StereoMixer::<3>::new();
        mixer.set_level(0, 0.5);
        mixer.set_pan(0, -1.0);
        mixer.set_level(1, 0.0);
        mixer.set_pan(2, 1.0);

        let (l, r) = mixer.mix(&[1.0, 1.0, 1.0]);
        assert!((l - 0.5).abs() < 1e-6, "left {l}");
        assert!((r - 1.0).abs() < 1e-6, "right {r}");
    }

    #[test]
    fn test_out_of_range_input_ignored() {
        let mut mixer = StereoMixer::<2>::new();
        mixer.set_level(5, 0.0);
        assert_eq!(mixer.level(5), None);
        assert_eq!(mixer.level(1), Some(1.0));
    }
}
