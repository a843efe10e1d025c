//! Integration tests for osc3x-io rendering and WAV output.

use osc3x_core::TimeStamp;
use osc3x_io::{
    BitDepth, BufferSink, NoteCommand, RenderConfig, RenderEngine, TrialContext, WavFormat,
    WavSink, read_wav_info, read_wav_stereo,
};
use osc3x_midi::{SchedulerConfig, Sequence, TrackEvent};
use osc3x_synth::Preset;
use tempfile::TempDir;

/// A four-note arpeggio on track 1, with an empty conductor track 0.
fn arpeggio() -> Sequence {
    let mut events = Vec::new();
    for (i, pitch) in [57u8, 60, 64, 69].into_iter().enumerate() {
        let tick = i as u64 * 48;
        events.push(TrackEvent::note_on(tick, 0, pitch, 100));
        events.push(TrackEvent::note_off(tick + 40, 0, pitch, 0));
    }
    Sequence::new(96).with_track(Vec::new()).with_track(events)
}

fn config(sample_rate: f32, render_length: f64) -> RenderConfig {
    RenderConfig {
        sample_rate,
        render_length,
        ..RenderConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Render engine timing
// ---------------------------------------------------------------------------

#[test]
fn command_takes_effect_on_exact_sample() {
    let sr = 44100.0;
    for at in [0.01, 0.0123, 0.25] {
        let mut engine = RenderEngine::new(&Preset::default(), config(sr, 0.3)).unwrap();
        let mut sink = BufferSink::new();
        let on = NoteCommand::note_on(TimeStamp::from_secs(at), 69, 440.0, 0.5);
        engine.render_commands([on], &mut sink).unwrap();

        let start = TimeStamp::from_secs(at).to_sample_index(sr) as usize;
        let left = &sink.samples().left;
        assert!(left[..start].iter().all(|&s| s == 0.0), "silence before {at}");
        assert!(
            left[start..start + 8].iter().any(|&s| s != 0.0),
            "signal right after {at}"
        );
    }
}

#[test]
fn hard_stop_silences_every_voice() {
    let mut engine = RenderEngine::new(
        &Preset::default(),
        RenderConfig {
            voices: 2,
            ..config(8000.0, 0.5)
        },
    )
    .unwrap();
    let commands = (0..5u8).map(|i| {
        NoteCommand::note_on(TimeStamp::from_secs(f64::from(i) * 0.05), 60 + i, 200.0, 0.3)
    });
    let mut sink = BufferSink::new();
    let stats = engine.render_commands(commands, &mut sink).unwrap();

    assert_eq!(stats.commands_applied, 5);
    assert_eq!(stats.voices_stolen, 3);
    assert_eq!(stats.frames, 4000);
    assert_eq!(engine.allocator().active_voice_count(), 0);
    assert!(sink.is_finished());
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

#[test]
fn session_writes_wav_with_expected_shape() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("arp.wav");
    let sequence = arpeggio();

    let trial = TrialContext::new("arp", Preset::default(), &sequence, 1)
        .with_scheduler(SchedulerConfig::with_tempo(150.0))
        .with_render(config(22050.0, 2.0));
    let mut sink = WavSink::create(&path, 22050, BitDepth::Pcm16).unwrap();
    let report = trial.run(&mut sink).unwrap();
    drop(sink);

    assert_eq!(report.playback.note_ons, 4);
    assert_eq!(report.render.commands_applied, 8);

    let info = read_wav_info(&path).unwrap();
    assert_eq!(info.channels, 2);
    assert_eq!(info.sample_rate, 22050);
    assert_eq!(info.bits_per_sample, 16);
    assert_eq!(info.format, WavFormat::Pcm);
    assert_eq!(info.num_frames, 44100);

    let (samples, _) = read_wav_stereo(&path).unwrap();
    assert!(samples.peak() > 0.01);
}

#[test]
fn trials_are_independent_and_deterministic() {
    let sequence = arpeggio();
    let render = |label: &str| {
        let trial = TrialContext::new(label, Preset::default(), &sequence, 1)
            .with_render(config(8000.0, 1.0));
        let mut sink = BufferSink::new();
        trial.run(&mut sink).unwrap();
        sink.into_samples()
    };

    let (a, b) = std::thread::scope(|scope| {
        let a = scope.spawn(|| render("first"));
        let b = scope.spawn(|| render("second"));
        (a.join().unwrap(), b.join().unwrap())
    });
    assert_eq!(a, b);
    assert_eq!(a, render("third"));
}

#[test]
fn float_output_is_unclipped() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("loud.wav");
    let sequence = Sequence::new(96).with_track(
        (0..8u8)
            .map(|i| TrackEvent::note_on(0, 0, 48 + i * 3, 127))
            .collect(),
    );
    let loud = Preset::default().with_levels([1.0, 1.0, 1.0]);

    let trial =
        TrialContext::new("loud", loud, &sequence, 0).with_render(config(16000.0, 0.25));
    let mut sink = WavSink::create(&path, 16000, BitDepth::Float32).unwrap();
    let report = trial.run(&mut sink).unwrap();
    drop(sink);

    let (samples, _) = read_wav_stereo(&path).unwrap();
    assert!((samples.peak() - report.render.peak).abs() < 1e-6);
    assert!(report.render.peak > 1.0, "eight loud voices exceed full scale");
}
