//! Shared CLI helpers used across multiple commands.

use anyhow::Context;
use clap::Args;
use osc3x_config::{Preset, resolve_preset};
use osc3x_io::{BitDepth, DEFAULT_BLOCK_SIZE, DEFAULT_TAIL, RenderConfig};
use osc3x_midi::{DEFAULT_PLAYBACK_WINDOW, DEFAULT_TEMPO_BPM, SchedulerConfig, Sequence};
use osc3x_synth::MAX_VOICES;
use std::path::Path;

/// Track selection and timing.
#[derive(Args, Debug, Clone)]
pub struct TimingArgs {
    /// Track index (0-based; track 0 is often the conductor track)
    #[arg(short, long, default_value_t = 1)]
    pub track: usize,

    /// Tempo in beats per minute (tempo events in the file are ignored)
    #[arg(long, default_value_t = DEFAULT_TEMPO_BPM)]
    pub tempo: f64,

    /// Playback window in seconds; later events are dropped
    #[arg(long, default_value_t = DEFAULT_PLAYBACK_WINDOW)]
    pub window: f64,
}

impl TimingArgs {
    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig::with_tempo(self.tempo).with_window(self.window)
    }
}

/// Render engine and output format settings.
#[derive(Args, Debug, Clone)]
pub struct RenderSettings {
    /// Number of voices
    #[arg(long, default_value_t = MAX_VOICES)]
    pub voices: usize,

    /// Sample rate in Hz
    #[arg(long, default_value_t = 44100)]
    pub sample_rate: u32,

    /// Output bit depth (16 or 32)
    #[arg(long, default_value = "16", value_parser = parse_bit_depth)]
    pub bits: BitDepth,

    /// Seconds rendered after the playback window
    #[arg(long, default_value_t = DEFAULT_TAIL)]
    pub tail: f64,

    /// Largest render block in frames
    #[arg(long, default_value_t = DEFAULT_BLOCK_SIZE)]
    pub block_size: usize,
}

impl RenderSettings {
    /// Render config for a playback window of `window` seconds.
    pub fn render_config(&self, window: f64) -> RenderConfig {
        RenderConfig {
            sample_rate: self.sample_rate as f32,
            voices: self.voices,
            block_size: self.block_size,
            render_length: window + self.tail,
        }
    }
}

fn parse_bit_depth(s: &str) -> Result<BitDepth, String> {
    s.parse::<u16>()
        .ok()
        .and_then(BitDepth::from_bits)
        .ok_or_else(|| format!("unsupported bit depth '{s}' (expected 16 or 32)"))
}

/// Load a preset by path, user preset name, or factory preset name.
pub fn load_preset(name: &str) -> anyhow::Result<Preset> {
    resolve_preset(name).with_context(|| {
        format!("failed to load preset '{name}'. Use 'osc3x preset --list' to see available presets")
    })
}

/// Load a Standard MIDI File.
pub fn load_sequence(path: &Path) -> anyhow::Result<Sequence> {
    Sequence::load(path).with_context(|| format!("failed to load MIDI file {}", path.display()))
}

/// Display name for a preset: its `name`, or the fallback.
pub fn preset_label<'a>(preset: &'a Preset, fallback: &'a str) -> &'a str {
    preset.name.as_deref().unwrap_or(fallback)
}

/// Convert linear amplitude to dBFS.
pub fn linear_to_db(linear: f32) -> f32 {
    if linear <= 0.0 {
        -120.0
    } else {
        20.0 * linear.log10()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bit_depth() {
        assert_eq!(parse_bit_depth("16"), Ok(BitDepth::Pcm16));
        assert_eq!(parse_bit_depth("32"), Ok(BitDepth::Float32));
        assert!(parse_bit_depth("24").is_err());
        assert!(parse_bit_depth("loud").is_err());
    }

    #[test]
    fn test_linear_to_db() {
        assert_eq!(linear_to_db(0.0), -120.0);
        assert!((linear_to_db(1.0)).abs() < 1e-6);
        assert!((linear_to_db(0.5) + 6.0206).abs() < 1e-3);
    }
}
