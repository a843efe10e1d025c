//! Integration tests for osc3x-cli.
//!
//! Tests run the CLI binary against MIDI files generated into a temporary
//! directory.

use osc3x_io::read_wav_info;
use osc3x_midi::{Sequence, TrackEvent};
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Helper to get the path to the `osc3x` binary built by cargo.
fn osc3x_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_osc3x"))
}

/// Two tracks: an empty conductor track and a short melody.
fn write_song(dir: &Path, name: &str) -> PathBuf {
    let mut melody = Vec::new();
    for (i, pitch) in [60u8, 64, 67, 72].into_iter().enumerate() {
        let tick = 192 + i as u64 * 96;
        melody.push(TrackEvent::note_on(tick, 0, pitch, 100));
        melody.push(TrackEvent::note_off(tick + 80, 0, pitch, 0));
    }
    let path = dir.join(name);
    Sequence::new(96)
        .with_track(vec![TrackEvent::controller(0, 0, 7, 100)])
        .with_track(melody)
        .save(&path)
        .unwrap();
    path
}

// ---------------------------------------------------------------------------
// `osc3x preset`
// ---------------------------------------------------------------------------

#[test]
fn cli_preset_list_shows_factory_presets() {
    let output = osc3x_bin()
        .args(["preset", "--list"])
        .output()
        .expect("failed to run osc3x preset --list");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Factory Presets"));
    for name in ["default", "init", "hollow_lead", "detuned_saw", "glass_bell", "thin_buzz"] {
        assert!(stdout.contains(name), "listing should contain '{name}'");
    }
}

#[test]
fn cli_preset_show_and_save() {
    let temp = TempDir::new().unwrap();
    let saved = temp.path().join("copy.toml");
    let output = osc3x_bin()
        .args(["preset", "hollow_lead", "--save"])
        .arg(&saved)
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("square"));
    assert!(stdout.contains("triangle"));
    assert!(stdout.contains("lowpass"));
    assert!(saved.is_file());
}

#[test]
fn cli_preset_unknown_fails() {
    let output = osc3x_bin()
        .args(["preset", "no_such_preset"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no_such_preset"));
}

// ---------------------------------------------------------------------------
// `osc3x events` and `osc3x render`
// ---------------------------------------------------------------------------

#[test]
fn cli_events_prints_schedule() {
    let temp = TempDir::new().unwrap();
    let song = write_song(temp.path(), "song.mid");

    let output = osc3x_bin().arg("events").arg(&song).output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("2 tracks"));
    assert!(stdout.contains("note-on"));
    assert!(stdout.contains("8 events scheduled"));
}

#[test]
fn cli_render_writes_wav() {
    let temp = TempDir::new().unwrap();
    let song = write_song(temp.path(), "song.mid");
    let wav = temp.path().join("out.wav");

    let output = osc3x_bin()
        .arg("render")
        .arg(&song)
        .args(["--preset", "detuned_saw", "--sample-rate", "8000"])
        .args(["--window", "2", "--tail", "0.5", "--output"])
        .arg(&wav)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "render failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let info = read_wav_info(&wav).unwrap();
    assert_eq!(info.channels, 2);
    assert_eq!(info.sample_rate, 8000);
    assert_eq!(info.bits_per_sample, 16);
    assert_eq!(info.num_frames, 20000);
}

#[test]
fn cli_render_track_out_of_range_names_count() {
    let temp = TempDir::new().unwrap();
    let song = write_song(temp.path(), "song.mid");

    let output = osc3x_bin()
        .arg("render")
        .arg(&song)
        .args(["--track", "5", "--output"])
        .arg(temp.path().join("never.wav"))
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("2 tracks"), "stderr was: {stderr}");
}

#[test]
fn cli_render_rejects_empty_voice_pool() {
    let temp = TempDir::new().unwrap();
    let song = write_song(temp.path(), "song.mid");
    let wav = temp.path().join("never.wav");

    let output = osc3x_bin()
        .arg("render")
        .arg(&song)
        .args(["--voices", "0", "--output"])
        .arg(&wav)
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("at least one voice"), "stderr was: {stderr}");
    assert!(!wav.exists());
}

// ---------------------------------------------------------------------------
// `osc3x batch`
// ---------------------------------------------------------------------------

#[test]
fn cli_batch_isolates_failing_trials() {
    let temp = TempDir::new().unwrap();
    write_song(temp.path(), "first.mid");
    write_song(temp.path(), "second.mid");

    let manifest = temp.path().join("songs.toml");
    std::fs::write(
        &manifest,
        r#"
[[songs]]
file = "first.mid"
tempo = 133
track = 1

[[songs]]
file = "second.mid"
tempo = 90
"#,
    )
    .unwrap();

    let presets = temp.path().join("presets");
    std::fs::create_dir(&presets).unwrap();
    std::fs::write(
        presets.join("00.toml"),
        "osc1 = \"sine\"\nosc2 = \"square\"\nosc3 = \"saw\"\nfilter = \"lowpass\"\n",
    )
    .unwrap();
    std::fs::write(
        presets.join("01.toml"),
        "osc1 = \"organ\"\nosc2 = \"sine\"\nosc3 = \"sine\"\nfilter = \"lowpass\"\n",
    )
    .unwrap();

    let out_dir = temp.path().join("out");
    let output = osc3x_bin()
        .arg("batch")
        .arg(&manifest)
        .arg("--presets")
        .arg(&presets)
        .arg("--output")
        .arg(&out_dir)
        .args(["--window", "1", "--tail", "0", "--sample-rate", "8000"])
        .output()
        .unwrap();

    assert!(!output.status.success(), "one preset is invalid");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("2 of 4 trials rendered"), "stdout was: {stdout}");

    assert!(out_dir.join("first_00.wav").is_file());
    assert!(out_dir.join("second_00.wav").is_file());
    assert!(!out_dir.join("first_01.wav").exists());
    assert_eq!(read_wav_info(out_dir.join("second_00.wav")).unwrap().num_frames, 8000);
}
