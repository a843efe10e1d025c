//! Property-based tests for osc3x-core primitives.
//!
//! Tests filter stability across the clamped frequency range, tick
//! conversion monotonicity, and pitch/frequency inversion using proptest.

use proptest::prelude::*;
use osc3x_core::{
    BiquadFilter, FilterKind, TimeStamp, frequency_to_pitch, pitch_to_frequency,
    ticks_to_seconds,
};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// For any configured frequency (including values past Nyquist and 0 Hz)
    /// and any Q, every filter kind produces finite output.
    #[test]
    fn filter_stability(
        freq in 0.0f32..60000.0f32,
        q in 0.0f32..20.0f32,
        kind in 0usize..3,
        input in prop::array::uniform32(-1.0f32..=1.0f32),
    ) {
        let kind = FilterKind::ALL[kind];
        let mut filter = BiquadFilter::new(kind, freq, q, 44100.0);

        for _ in 0..32 {
            for &sample in &input {
                let out = filter.process(sample);
                prop_assert!(
                    out.is_finite(),
                    "{} (freq={}, q={}) produced non-finite output {}",
                    kind, freq, q, out
                );
            }
        }
    }

    /// Later ticks never map to earlier times, and zero maps to zero.
    #[test]
    fn ticks_monotonic(
        a in 0u64..10_000_000,
        b in 0u64..10_000_000,
        bpm in 20.0f64..300.0,
        tpb in 24u16..1920,
    ) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(ticks_to_seconds(lo, bpm, tpb) <= ticks_to_seconds(hi, bpm, tpb));
        prop_assert_eq!(ticks_to_seconds(0, bpm, tpb), 0.0);
    }

    /// Doubling the tempo halves every event time.
    #[test]
    fn ticks_scale_with_tempo(
        tick in 0u64..1_000_000,
        bpm in 20.0f64..300.0,
        tpb in 24u16..1920,
    ) {
        let slow = ticks_to_seconds(tick, bpm, tpb);
        let fast = ticks_to_seconds(tick, bpm * 2.0, tpb);
        prop_assert!((slow - 2.0 * fast).abs() <= slow.abs() * 1e-12 + 1e-12);
    }

    /// Pitch and frequency conversions invert each other over the MIDI range.
    #[test]
    fn pitch_round_trip(pitch in 0.0f32..127.0f32) {
        let back = frequency_to_pitch(pitch_to_frequency(pitch));
        prop_assert!((back - pitch).abs() < 1e-3, "{} -> {}", pitch, back);
    }

    /// Sample indices never decrease as time moves forward.
    #[test]
    fn sample_index_monotonic(a in 0.0f64..60.0, b in 0.0f64..60.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(
            TimeStamp::from_secs(lo).to_sample_index(48000.0)
                <= TimeStamp::from_secs(hi).to_sample_index(48000.0)
        );
    }
}
