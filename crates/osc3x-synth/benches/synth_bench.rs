//! Criterion benchmarks for osc3x-synth components
//!
//! Run with: cargo bench -p osc3x-synth

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use osc3x_core::{FilterKind, TimeStamp, pitch_to_frequency};
use osc3x_synth::{MAX_VOICES, Osc3xVoice, Oscillator, OscillatorKind, Preset, VoiceAllocator};

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512, 1024];

// ============================================================================
// Oscillator benchmarks
// ============================================================================

fn bench_oscillator_kinds(c: &mut Criterion) {
    let mut group = c.benchmark_group("Oscillator");

    for kind in OscillatorKind::ALL {
        for &block_size in BLOCK_SIZES {
            let mut osc = Oscillator::new(kind, SAMPLE_RATE);
            osc.note_on(440.0, 1.0);
            let mut buffer = vec![0.0f32; block_size];

            group.bench_with_input(
                BenchmarkId::new(kind.name(), block_size),
                &block_size,
                |b, _| {
                    b.iter(|| {
                        osc.fill(&mut buffer);
                        black_box(buffer[0])
                    })
                },
            );
        }
    }

    group.finish();
}

// ============================================================================
// Voice benchmarks
// ============================================================================

fn bench_voice(c: &mut Criterion) {
    let mut group = c.benchmark_group("Osc3xVoice");

    let presets = [
        ("default", Preset::default()),
        (
            "detuned_saw",
            Preset::new([OscillatorKind::Sawtooth; 3], FilterKind::LowPass)
                .with_detune(0.07, -0.07)
                .with_filter(3000.0, 2.0),
        ),
    ];

    for (name, preset) in &presets {
        for &block_size in BLOCK_SIZES {
            let Ok(mut voice) = Osc3xVoice::new(preset, SAMPLE_RATE, block_size) else {
                continue;
            };
            voice.note_on(220.0, 0.5, TimeStamp::ZERO);

            group.bench_with_input(BenchmarkId::new(*name, block_size), &block_size, |b, &size| {
                b.iter(|| {
                    voice.process(size);
                    black_box(voice.output().0[0])
                })
            });
        }
    }

    group.finish();
}

fn bench_allocator_full_pool(c: &mut Criterion) {
    let mut group = c.benchmark_group("VoiceAllocator");

    for &block_size in BLOCK_SIZES {
        let Ok(mut synth) =
            VoiceAllocator::new(&Preset::default(), MAX_VOICES, SAMPLE_RATE, block_size)
        else {
            continue;
        };
        for pitch in 60..60 + MAX_VOICES as u8 {
            synth.note_on(pitch, pitch_to_frequency(f32::from(pitch)), 0.2, TimeStamp::ZERO);
        }

        group.bench_with_input(
            BenchmarkId::new("8_voices", block_size),
            &block_size,
            |b, &size| b.iter(|| black_box(synth.process(size).0[0])),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_oscillator_kinds, bench_voice, bench_allocator_full_pool);
criterion_main!(benches);
