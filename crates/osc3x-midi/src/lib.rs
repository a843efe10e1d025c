//! MIDI input for the osc3x synthesizer.
//!
//! A [`Sequence`] holds the channel events of a Standard MIDI File with
//! absolute tick positions. The [`Scheduler`] turns one of its tracks into
//! timestamped note-on/note-off calls on any [`NoteSink`], converting ticks to
//! seconds with an externally supplied tempo:
//!
//! ```text
//! time = tick * 60 / (tempo_bpm * ticks_per_beat)
//! ```
//!
//! Playback is anchored so the first note event lands at zero seconds, and
//! anything past the playback window is dropped.
//!
//! # Example
//!
//! ```rust,no_run
//! use osc3x_midi::{Scheduler, SchedulerConfig, Sequence};
//!
//! let sequence = Sequence::load("songs/intro.mid").unwrap();
//! let scheduler = Scheduler::new(SchedulerConfig::default());
//! let schedule = scheduler.schedule(&sequence, 1).unwrap();
//! for event in &schedule.events {
//!     println!("{event}");
//! }
//! ```
//!
//! [`NoteSink`]: osc3x_core::NoteSink

mod error;
mod scheduler;
mod sequence;

pub use error::MidiError;
pub use scheduler::{
    DEFAULT_PLAYBACK_WINDOW, DEFAULT_TEMPO_BPM, NoteKind, PlaybackSummary, Schedule,
    ScheduledEvent, Scheduler, SchedulerConfig,
};
pub use sequence::{NOTE_OFF, NOTE_ON, Sequence, TrackEvent};
