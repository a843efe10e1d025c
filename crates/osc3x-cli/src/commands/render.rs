//! Render one MIDI track to a WAV file.

use crate::commands::common::{
    RenderSettings, TimingArgs, linear_to_db, load_preset, load_sequence, preset_label,
};
use clap::Args;
use osc3x_io::{
    BufferSink, PlaybackConfig, SessionReport, TrialContext, WavSink, play_buffer,
    write_wav_stereo,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Args)]
pub struct RenderArgs {
    /// Standard MIDI File to render
    #[arg(value_name = "MIDI")]
    midi: PathBuf,

    /// Preset name or path to a preset file
    #[arg(short, long, default_value = "default")]
    preset: String,

    #[command(flatten)]
    timing: TimingArgs,

    #[command(flatten)]
    settings: RenderSettings,

    /// Output WAV file (defaults to the MIDI file name with a .wav extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Play the render through an output device after writing it
    #[arg(long)]
    play: bool,

    /// Output device for --play (index or partial name)
    #[arg(long)]
    device: Option<String>,
}

pub fn run(args: RenderArgs) -> anyhow::Result<()> {
    let preset = load_preset(&args.preset)?;
    let sequence = load_sequence(&args.midi)?;
    sequence.track(args.timing.track)?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| args.midi.with_extension("wav"));

    let label = preset_label(&preset, &args.preset).to_string();
    println!("Rendering {} with preset '{}'...", args.midi.display(), label);
    println!(
        "  track {} of {}, {} BPM, {:.1}s window, {} voices",
        args.timing.track,
        sequence.track_count(),
        args.timing.tempo,
        args.timing.window,
        args.settings.voices
    );

    let trial = TrialContext::new(label, preset, &sequence, args.timing.track)
        .with_scheduler(args.timing.scheduler_config())
        .with_render(args.settings.render_config(args.timing.window));
    trial.render_config().validate()?;

    let sample_rate = args.settings.sample_rate;
    let report = if args.play {
        let mut sink = BufferSink::new();
        let report = trial.run(&mut sink)?;
        let samples = sink.into_samples();
        write_wav_stereo(&output, &samples, sample_rate, args.settings.bits)?;
        print_report(&report, sample_rate);

        let running = Arc::new(AtomicBool::new(true));
        let r = Arc::clone(&running);
        ctrlc::set_handler(move || {
            println!("\nStopping...");
            r.store(false, Ordering::SeqCst);
        })?;
        println!("\nPlaying... Press Ctrl+C to stop.");
        let config = PlaybackConfig {
            device: args.device.clone(),
            ..PlaybackConfig::default()
        };
        play_buffer(samples, sample_rate, &config, running)?;
        report
    } else {
        let mut sink = WavSink::create(&output, sample_rate, args.settings.bits)?;
        let report = trial.run(&mut sink)?;
        print_report(&report, sample_rate);
        report
    };

    println!(
        "\nWrote {} ({} frames, {}-bit)",
        output.display(),
        report.render.frames,
        args.settings.bits.bits()
    );
    Ok(())
}

fn print_report(report: &SessionReport, sample_rate: u32) {
    let playback = &report.playback;
    let render = &report.render;
    println!("\nStats:");
    println!(
        "  Notes:    {} on, {} off, {} past the window, {} other events",
        playback.note_ons, playback.note_offs, playback.dropped, playback.skipped
    );
    println!(
        "  Render:   {} ({} voices stolen)",
        render.duration(sample_rate as f32),
        render.voices_stolen
    );
    println!("  Peak:     {:.1} dB", linear_to_db(render.peak));
    if render.peak > 1.0 {
        println!("  Warning: output exceeds full scale and will clip in 16-bit files");
    }
}
