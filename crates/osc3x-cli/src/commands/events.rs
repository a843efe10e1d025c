//! Print the note schedule of one MIDI track.

use crate::commands::common::{TimingArgs, load_sequence};
use clap::Args;
use osc3x_midi::Scheduler;
use std::path::PathBuf;

#[derive(Args)]
pub struct EventsArgs {
    /// Standard MIDI File
    #[arg(value_name = "MIDI")]
    midi: PathBuf,

    #[command(flatten)]
    timing: TimingArgs,

    /// Only print the summary
    #[arg(short, long)]
    quiet: bool,
}

pub fn run(args: EventsArgs) -> anyhow::Result<()> {
    let sequence = load_sequence(&args.midi)?;
    let schedule =
        Scheduler::new(args.timing.scheduler_config()).schedule(&sequence, args.timing.track)?;

    println!(
        "{}: {} tracks, {} ticks per beat",
        args.midi.display(),
        sequence.track_count(),
        sequence.ticks_per_beat()
    );
    println!(
        "Track {} at {} BPM, first note at {} (shifted to 0)\n",
        args.timing.track, args.timing.tempo, schedule.offset
    );

    if !args.quiet {
        for event in &schedule.events {
            println!("  {event}");
        }
        println!();
    }

    println!(
        "{} events scheduled, {} past the {:.1}s window, {} non-note events skipped",
        schedule.events.len(),
        schedule.dropped,
        args.timing.window,
        schedule.skipped
    );
    Ok(())
}
