//! Property-based tests for the voice allocator.
//!
//! Random note-on/note-off streams must keep the pitch table consistent
//! with what the voices are actually playing.

use osc3x_core::TimeStamp;
use osc3x_synth::{Allocation, Preset, VoiceAllocator};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Event {
    On(u8),
    Off(u8),
    AllOff,
}

fn event() -> impl Strategy<Value = Event> {
    prop_oneof![
        6 => (36u8..84).prop_map(Event::On),
        4 => (36u8..84).prop_map(Event::Off),
        1 => Just(Event::AllOff),
    ]
}

fn check_invariants(synth: &VoiceAllocator) -> Result<(), TestCaseError> {
    let mut seen = vec![false; synth.voice_count()];
    for pitch in synth.sounding_pitches() {
        let voice = synth.voice_for(pitch).unwrap();
        prop_assert!(!seen[voice], "voice {} mapped twice", voice);
        seen[voice] = true;
        prop_assert_eq!(synth.pitch_of(voice), Some(pitch));
        prop_assert!(synth.voice(voice).unwrap().is_active());
    }
    let mapped = seen.iter().filter(|&&s| s).count();
    prop_assert_eq!(mapped, synth.active_voice_count());
    prop_assert!(synth.active_voice_count() <= synth.voice_count());
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Every sounding pitch maps to exactly one active voice playing it.
    #[test]
    fn pitch_table_matches_voices(
        voices in 1usize..10,
        events in prop::collection::vec(event(), 1..120),
    ) {
        let mut synth = VoiceAllocator::new(&Preset::default(), voices, 48000.0, 16).unwrap();
        let mut steals = 0u64;

        for (i, ev) in events.iter().enumerate() {
            let at = TimeStamp::from_secs(i as f64 * 0.01);
            match *ev {
                Event::On(pitch) => {
                    let was_sounding = synth.voice_for(pitch);
                    let full = synth.active_voice_count() == synth.voice_count();
                    match synth.note_on(pitch, 440.0, 0.5, at) {
                        Allocation::Retriggered { voice } => {
                            prop_assert_eq!(was_sounding, Some(voice));
                        }
                        Allocation::Allocated { .. } => {
                            prop_assert!(was_sounding.is_none() && !full);
                        }
                        Allocation::Stolen { previous_pitch, .. } => {
                            prop_assert!(was_sounding.is_none() && full);
                            prop_assert_eq!(synth.voice_for(previous_pitch), None);
                            steals += 1;
                        }
                    }
                    prop_assert!(synth.voice_for(pitch).is_some());
                }
                Event::Off(pitch) => {
                    synth.note_off(pitch, at);
                    prop_assert_eq!(synth.voice_for(pitch), None);
                }
                Event::AllOff => {
                    let before = synth.active_voice_count();
                    prop_assert_eq!(synth.all_notes_off(at), before);
                }
            }
            check_invariants(&synth)?;
        }
        prop_assert_eq!(synth.steal_count(), steals);
    }
}
