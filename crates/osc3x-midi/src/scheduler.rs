//! Tick-to-time conversion and note dispatch for one MIDI track.

use std::fmt;

use osc3x_core::{NoteSink, TimeStamp, pitch_to_frequency, ticks_to_seconds};

use crate::error::MidiError;
use crate::sequence::{NOTE_OFF, NOTE_ON, Sequence, TrackEvent};

/// Tempo used when none is given.
pub const DEFAULT_TEMPO_BPM: f64 = 120.0;

/// Playback window used when none is given, in seconds.
pub const DEFAULT_PLAYBACK_WINDOW: f64 = 10.0;

/// Divisor mapping a 7-bit velocity to a linear amplitude.
const VELOCITY_SCALE: f32 = 256.0;

/// Tempo and window for converting a track into a schedule.
///
/// Tempo meta events in the file are ignored; the tempo is always this one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulerConfig {
    /// Beats per minute.
    pub tempo_bpm: f64,
    /// Events later than this many seconds after the first note are dropped.
    pub playback_window: f64,
}

impl SchedulerConfig {
    /// Config with the given tempo and the default window.
    pub fn with_tempo(tempo_bpm: f64) -> Self {
        Self {
            tempo_bpm,
            ..Self::default()
        }
    }

    /// Replace the playback window.
    pub fn with_window(mut self, seconds: f64) -> Self {
        self.playback_window = seconds;
        self
    }

    fn validate(&self) -> Result<(), MidiError> {
        if !self.tempo_bpm.is_finite() || self.tempo_bpm <= 0.0 {
            return Err(MidiError::InvalidTiming(format!(
                "tempo must be a positive number of beats per minute, got {}",
                self.tempo_bpm
            )));
        }
        if !self.playback_window.is_finite() || self.playback_window < 0.0 {
            return Err(MidiError::InvalidTiming(format!(
                "playback window must be a non-negative number of seconds, got {}",
                self.playback_window
            )));
        }
        Ok(())
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tempo_bpm: DEFAULT_TEMPO_BPM,
            playback_window: DEFAULT_PLAYBACK_WINDOW,
        }
    }
}

/// Whether a scheduled event starts or releases a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteKind {
    /// Start (or retrigger) a note.
    NoteOn,
    /// Release a note.
    NoteOff,
}

impl fmt::Display for NoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NoteKind::NoteOn => "note-on",
            NoteKind::NoteOff => "note-off",
        })
    }
}

/// A note event with its playback time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledEvent {
    /// Seconds after the first note of the track.
    pub at: TimeStamp,
    /// MIDI key.
    pub pitch: u8,
    /// Velocity of a note-on. `None` for releases.
    pub velocity: Option<u8>,
    /// On or off.
    pub kind: NoteKind,
}

impl ScheduledEvent {
    /// Equal-tempered frequency of the pitch.
    pub fn frequency(&self) -> f32 {
        pitch_to_frequency(f32::from(self.pitch))
    }

    /// Linear amplitude, `velocity / 256`. Zero for releases.
    pub fn amplitude(&self) -> f32 {
        self.velocity
            .map_or(0.0, |v| f32::from(v) / VELOCITY_SCALE)
    }

    /// Deliver this event to `sink`.
    pub fn dispatch<S: NoteSink + ?Sized>(&self, sink: &mut S) {
        match self.kind {
            NoteKind::NoteOn => {
                sink.note_on(self.pitch, self.frequency(), self.amplitude(), self.at);
            }
            NoteKind::NoteOff => sink.note_off(self.pitch, self.at),
        }
    }
}

impl fmt::Display for ScheduledEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>9} {:<8} pitch {:>3}", self.at, self.kind, self.pitch)?;
        if let Some(velocity) = self.velocity {
            write!(
                f,
                " velocity {velocity:>3} ({:.1} Hz, amplitude {:.3})",
                self.frequency(),
                self.amplitude()
            )?;
        }
        Ok(())
    }
}

/// The note events of one track, in source order, ready to dispatch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schedule {
    /// Events inside the playback window.
    pub events: Vec<ScheduledEvent>,
    /// Note events past the playback window.
    pub dropped: usize,
    /// Channel events that are not notes.
    pub skipped: usize,
    /// Tick-derived time of the first note, subtracted from every event.
    pub offset: TimeStamp,
}

impl Schedule {
    /// Time of the last scheduled event, or zero if there is none.
    pub fn end(&self) -> TimeStamp {
        self.events.last().map_or(TimeStamp::ZERO, |e| e.at)
    }

    /// Deliver every event to `sink` in order.
    pub fn dispatch<S: NoteSink + ?Sized>(&self, sink: &mut S) -> PlaybackSummary {
        let mut summary = PlaybackSummary {
            dropped: self.dropped,
            skipped: self.skipped,
            end: self.end(),
            ..PlaybackSummary::default()
        };
        for event in &self.events {
            event.dispatch(sink);
            match event.kind {
                NoteKind::NoteOn => summary.note_ons += 1,
                NoteKind::NoteOff => summary.note_offs += 1,
            }
        }
        summary
    }
}

/// What [`Scheduler::play`] delivered.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlaybackSummary {
    /// Note-ons dispatched.
    pub note_ons: usize,
    /// Note-offs dispatched, including zero-velocity note-ons.
    pub note_offs: usize,
    /// Note events past the playback window.
    pub dropped: usize,
    /// Non-note channel events.
    pub skipped: usize,
    /// Time of the last dispatched event.
    pub end: TimeStamp,
}

impl PlaybackSummary {
    /// Total events dispatched.
    pub fn dispatched(&self) -> usize {
        self.note_ons + self.note_offs
    }
}

/// Converts a track of a [`Sequence`] into timestamped note calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct Scheduler {
    config: SchedulerConfig,
}

impl Scheduler {
    /// Create a scheduler.
    pub fn new(config: SchedulerConfig) -> Self {
        Self { config }
    }

    /// Current configuration.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Decode and time every note event of `track`.
    ///
    /// The first note event defines time zero. Zero-velocity note-ons become
    /// note-offs. Events more than `playback_window` seconds after the first
    /// note are dropped.
    pub fn schedule(&self, sequence: &Sequence, track: usize) -> Result<Schedule, MidiError> {
        self.config.validate()?;
        let events = sequence.track(track)?;
        let ticks_per_beat = sequence.ticks_per_beat();
        if ticks_per_beat == 0 {
            return Err(MidiError::InvalidTiming("ticks per beat is zero".into()));
        }

        let mut schedule = Schedule::default();
        let mut anchor: Option<f64> = None;

        for event in events {
            let Some((kind, pitch, velocity)) = decode(event) else {
                schedule.skipped += 1;
                continue;
            };

            let time = ticks_to_seconds(event.tick, self.config.tempo_bpm, ticks_per_beat);
            let first = *anchor.get_or_insert(time);
            // Out-of-order ticks never schedule before the anchor.
            let at = (time - first).max(0.0);

            if at > self.config.playback_window {
                schedule.dropped += 1;
                continue;
            }

            let scheduled = ScheduledEvent {
                at: TimeStamp::from_secs(at),
                pitch,
                velocity,
                kind,
            };
            tracing::trace!(%scheduled, tick = event.tick, "scheduled");
            schedule.events.push(scheduled);
        }

        schedule.offset = TimeStamp::from_secs(anchor.unwrap_or(0.0));
        tracing::debug!(
            track,
            events = schedule.events.len(),
            dropped = schedule.dropped,
            skipped = schedule.skipped,
            offset = %schedule.offset,
            tempo_bpm = self.config.tempo_bpm,
            "track scheduled"
        );
        Ok(schedule)
    }

    /// Schedule `track` and dispatch it to `sink`.
    ///
    /// Nothing is dispatched if the track cannot be scheduled.
    pub fn play<S: NoteSink + ?Sized>(
        &self,
        sequence: &Sequence,
        track: usize,
        sink: &mut S,
    ) -> Result<PlaybackSummary, MidiError> {
        let schedule = self.schedule(sequence, track)?;
        let summary = schedule.dispatch(sink);
        tracing::info!(
            track,
            note_ons = summary.note_ons,
            note_offs = summary.note_offs,
            dropped = summary.dropped,
            end = %summary.end,
            "track dispatched"
        );
        Ok(summary)
    }
}

/// Command, pitch and velocity of a note event. `None` for other commands.
fn decode(event: &TrackEvent) -> Option<(NoteKind, u8, Option<u8>)> {
    let [pitch, velocity] = event.data;
    match event.command() {
        NOTE_ON if velocity == 0 => Some((NoteKind::NoteOff, pitch, None)),
        NOTE_ON => Some((NoteKind::NoteOn, pitch, Some(velocity))),
        NOTE_OFF => Some((NoteKind::NoteOff, pitch, None)),
        _ => None,
    }
}
