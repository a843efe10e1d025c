//! Synthesis demo: oscillator kinds, a detuned voice, and voice stealing.
//!
//! Run with: cargo run -p osc3x-synth --example synthesis_demo

use osc3x_core::{FilterKind, TimeStamp, pitch_to_frequency};
use osc3x_synth::{Allocation, Oscillator, OscillatorKind, Preset, VoiceAllocator};

fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()))
}

fn main() {
    let sample_rate = 48000.0;

    // --- Oscillator kinds ---
    println!("=== Oscillator Kinds (440 Hz, first 5 samples) ===\n");

    for kind in OscillatorKind::ALL {
        let mut osc = Oscillator::new(kind, sample_rate);
        osc.note_on(440.0, 1.0);

        let samples: Vec<f32> = (0..5).map(|_| osc.advance()).collect();
        println!(
            "{:<10} {:>8.4} {:>8.4} {:>8.4} {:>8.4} {:>8.4}",
            kind.name(),
            samples[0],
            samples[1],
            samples[2],
            samples[3],
            samples[4]
        );
    }

    // --- One detuned voice through a low-pass pair ---
    println!("\n=== Detuned Saw Stack, Low-Pass at 2 kHz ===\n");

    let preset = Preset::new(
        [OscillatorKind::Sawtooth, OscillatorKind::Sawtooth, OscillatorKind::Square],
        FilterKind::LowPass,
    )
    .with_name("demo")
    .with_pans([0.0, -0.6, 0.6])
    .with_detune(0.1, -12.0)
    .with_filter(2000.0, 0.9);

    let Ok(mut synth) = VoiceAllocator::new(&preset, 4, sample_rate, 512) else {
        eprintln!("failed to build the voice pool");
        return;
    };

    synth.note_on(57, pitch_to_frequency(57.0), 0.4, TimeStamp::ZERO);
    if let Some(voice) = synth.voice(0) {
        let [f1, f2, f3] = voice.oscillator_frequencies();
        println!("Oscillator frequencies: {f1:.2} Hz, {f2:.2} Hz, {f3:.2} Hz");
    }
    let (left, right) = synth.process(512);
    println!("Block peak: L {:.3}  R {:.3}", peak(left), peak(right));

    // --- Voice stealing ---
    println!("\n=== Stealing with a 4-voice pool ===\n");

    for (i, pitch) in [60u8, 64, 67, 71, 74].into_iter().enumerate() {
        let at = TimeStamp::from_secs(0.05 * (i + 1) as f64);
        match synth.note_on(pitch, pitch_to_frequency(f32::from(pitch)), 0.3, at) {
            Allocation::Allocated { voice } => println!("pitch {pitch:3} -> voice {voice}"),
            Allocation::Retriggered { voice } => {
                println!("pitch {pitch:3} -> voice {voice} (retriggered)")
            }
            Allocation::Stolen {
                voice,
                previous_pitch,
            } => println!("pitch {pitch:3} -> voice {voice} (stole pitch {previous_pitch})"),
        }
    }
    println!(
        "\n{} of {} voices active, {} stolen",
        synth.active_voice_count(),
        synth.voice_count(),
        synth.steal_count()
    );
}
