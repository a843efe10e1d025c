//! Render every song of a manifest with every preset of a directory.
//!
//! The manifest is TOML:
//!
//! ```toml
//! [[songs]]
//! file = "midi/theme.mid"   # relative to the manifest
//! tempo = 133
//! track = 4
//! ```
//!
//! Each song/preset pair is one trial writing `<song>_<preset>.wav`. A
//! failing trial is logged and skipped; the command fails at the end if any
//! trial failed.

use crate::commands::common::{RenderSettings, load_sequence};
use anyhow::Context;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use osc3x_config::{list_presets_in_dir, load_preset_file, preset_name_from_path};
use osc3x_io::{TrialContext, WavSink};
use osc3x_midi::{DEFAULT_PLAYBACK_WINDOW, DEFAULT_TEMPO_BPM, SchedulerConfig};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Args)]
pub struct BatchArgs {
    /// Song manifest (TOML with [[songs]] entries)
    #[arg(value_name = "MANIFEST")]
    manifest: PathBuf,

    /// Directory of preset files; every *.toml file is used
    #[arg(short, long)]
    presets: PathBuf,

    /// Directory for the rendered WAV files
    #[arg(short, long)]
    output: PathBuf,

    /// Playback window in seconds
    #[arg(long, default_value_t = DEFAULT_PLAYBACK_WINDOW)]
    window: f64,

    #[command(flatten)]
    settings: RenderSettings,
}

#[derive(Debug, Deserialize)]
struct Manifest {
    songs: Vec<Song>,
}

#[derive(Debug, Deserialize)]
struct Song {
    file: PathBuf,
    #[serde(default = "default_tempo")]
    tempo: f64,
    #[serde(default = "default_track")]
    track: usize,
}

fn default_tempo() -> f64 {
    DEFAULT_TEMPO_BPM
}

fn default_track() -> usize {
    1
}

impl Song {
    fn stem(&self) -> String {
        preset_name_from_path(&self.file).unwrap_or_else(|| "song".to_string())
    }
}

fn load_manifest(path: &Path) -> anyhow::Result<Manifest> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read manifest {}", path.display()))?;
    let mut manifest: Manifest = toml::from_str(&text)
        .with_context(|| format!("failed to parse manifest {}", path.display()))?;

    let base = path.parent().unwrap_or_else(|| Path::new("."));
    for song in &mut manifest.songs {
        if song.file.is_relative() {
            song.file = base.join(&song.file);
        }
    }
    Ok(manifest)
}

pub fn run(args: BatchArgs) -> anyhow::Result<()> {
    let manifest = load_manifest(&args.manifest)?;
    let presets = list_presets_in_dir(&args.presets)?;
    if manifest.songs.is_empty() || presets.is_empty() {
        anyhow::bail!(
            "nothing to render: {} songs, {} presets",
            manifest.songs.len(),
            presets.len()
        );
    }
    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;

    let total = manifest.songs.len() * presets.len();
    println!(
        "Rendering {} songs x {} presets into {}",
        manifest.songs.len(),
        presets.len(),
        args.output.display()
    );

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("##-"),
    );

    let mut failures: Vec<(String, anyhow::Error)> = Vec::new();
    for song in &manifest.songs {
        let sequence = load_sequence(&song.file);
        for preset_path in &presets {
            let label = format!(
                "{}_{}",
                song.stem(),
                preset_name_from_path(preset_path).unwrap_or_else(|| "preset".to_string())
            );
            pb.set_message(label.clone());

            let result = match &sequence {
                Ok(sequence) => run_trial(&args, song, sequence, preset_path, &label),
                Err(e) => Err(anyhow::anyhow!("{e:#}")),
            };
            if let Err(e) = result {
                tracing::error!(trial = %label, "{e:#}");
                failures.push((label, e));
            }
            pb.inc(1);
        }
    }
    pb.finish_with_message("done");

    println!(
        "\n{} of {} trials rendered",
        total - failures.len(),
        total
    );
    if !failures.is_empty() {
        for (label, e) in &failures {
            println!("  FAILED {label}: {e:#}");
        }
        anyhow::bail!("{} of {} trials failed", failures.len(), total);
    }
    Ok(())
}

fn run_trial(
    args: &BatchArgs,
    song: &Song,
    sequence: &osc3x_midi::Sequence,
    preset_path: &Path,
    label: &str,
) -> anyhow::Result<()> {
    let preset = load_preset_file(preset_path)?;
    let trial = TrialContext::new(label, preset, sequence, song.track)
        .with_scheduler(SchedulerConfig::with_tempo(song.tempo).with_window(args.window))
        .with_render(args.settings.render_config(args.window));

    let path = args.output.join(format!("{label}.wav"));
    let mut sink = WavSink::create(&path, args.settings.sample_rate, args.settings.bits)?;
    if let Err(e) = trial.run(&mut sink) {
        drop(sink);
        let _ = std::fs::remove_file(&path);
        return Err(e.into());
    }
    Ok(())
}
