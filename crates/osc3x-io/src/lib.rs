//! Rendering and audio output for the osc3x synthesizer.
//!
//! This crate provides:
//!
//! - **Command queue**: [`command_queue`] carries timestamped [`NoteCommand`]s
//!   from a scheduler thread to the render thread
//! - **Render engine**: [`RenderEngine`] applies each command at its exact
//!   sample and renders the voice pool into a [`RenderSink`]
//! - **Sessions**: [`TrialContext`] runs one preset against one MIDI track
//!   with a scoped producer thread
//! - **WAV file I/O**: [`WavSink`], [`write_wav_stereo`] and [`read_wav_stereo`]
//! - **Playback**: [`play_buffer`] sends a rendered buffer to a speaker
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use osc3x_io::{RenderConfig, TrialContext, WavSink, BitDepth};
//! use osc3x_midi::{SchedulerConfig, Sequence};
//! use osc3x_synth::Preset;
//!
//! let sequence = Sequence::load("songs/intro.mid")?;
//! let trial = TrialContext::new("intro", Preset::default(), &sequence, 1)
//!     .with_scheduler(SchedulerConfig::with_tempo(96.0));
//!
//! let mut sink = WavSink::create("intro.wav", 44100, BitDepth::Pcm16)?;
//! let report = trial.run(&mut sink)?;
//! println!("{} frames, peak {:.3}", report.render.frames, report.render.peak);
//! # Ok::<(), osc3x_io::Error>(())
//! ```

mod engine;
mod queue;
mod session;
mod sink;
mod stream;
mod wav;

pub use engine::{
    DEFAULT_BLOCK_SIZE, DEFAULT_SAMPLE_RATE, DEFAULT_TAIL, RenderConfig, RenderEngine, RenderStats,
};
pub use queue::{CommandReceiver, CommandSender, NoteCommand, NoteCommandKind, command_queue};
pub use session::{SessionReport, TrialContext};
pub use sink::{BitDepth, BufferSink, RenderSink, WavSink};
pub use stream::{
    AudioDevice, PlaybackConfig, default_output_device, list_output_devices, play_buffer,
};
pub use wav::{WavFormat, WavInfo, read_wav_info, read_wav_stereo, write_wav_stereo};

pub use osc3x_core::StereoSamples;

/// Error types for rendering and audio I/O.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Audio stream setup or runtime error.
    #[error("Audio stream error: {0}")]
    Stream(String),

    /// No audio device available on the system.
    #[error("No audio device available")]
    NoDevice,

    /// The requested audio device was not found.
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// The MIDI track could not be loaded or scheduled.
    #[error(transparent)]
    Midi(#[from] osc3x_midi::MidiError),

    /// The voice graph could not be built.
    #[error("voice graph error: {0}")]
    Graph(#[from] osc3x_core::GraphError),

    /// Render settings that cannot produce audio.
    #[error("invalid render settings: {0}")]
    InvalidConfig(String),

    /// The sink was written to after it was finished.
    #[error("sink is already finished")]
    SinkClosed,

    /// The scheduler thread panicked.
    #[error("note producer thread panicked")]
    ProducerPanicked,

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for rendering and audio I/O.
pub type Result<T> = std::result::Result<T, Error>;
