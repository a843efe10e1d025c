//! In-memory MIDI sequences with absolute tick positions.
//!
//! Only channel events are kept. Meta and system exclusive events still
//! advance the tick clock but are not stored, so a [`TrackEvent`] is always a
//! status byte plus two data bytes.

use std::fmt;
use std::path::Path;

use midly::num::{u4, u7, u14, u15, u28};
use midly::{Format, Header, MetaMessage, MidiMessage, PitchBend, Smf, Timing, TrackEventKind};

use crate::error::MidiError;

/// Command nibble of a note-on status byte.
pub const NOTE_ON: u8 = 0x90;

/// Command nibble of a note-off status byte.
pub const NOTE_OFF: u8 = 0x80;

const AFTERTOUCH: u8 = 0xA0;
const CONTROLLER: u8 = 0xB0;
const PROGRAM_CHANGE: u8 = 0xC0;
const CHANNEL_AFTERTOUCH: u8 = 0xD0;
const PITCH_BEND: u8 = 0xE0;

/// Largest delta time a track event can encode (28 bits).
const MAX_DELTA: u64 = (1 << 28) - 1;

/// One channel event at an absolute tick position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackEvent {
    /// Ticks since the start of the track.
    pub tick: u64,
    /// Status byte: command in the high nibble, channel in the low nibble.
    pub status: u8,
    /// Data bytes. Unused bytes are zero.
    pub data: [u8; 2],
}

impl TrackEvent {
    /// Create an event from raw bytes.
    pub const fn new(tick: u64, status: u8, data: [u8; 2]) -> Self {
        Self { tick, status, data }
    }

    /// Note-on on `channel` (0-15).
    pub const fn note_on(tick: u64, channel: u8, pitch: u8, velocity: u8) -> Self {
        Self::new(tick, NOTE_ON | (channel & 0x0F), [pitch & 0x7F, velocity & 0x7F])
    }

    /// Note-off on `channel` (0-15).
    pub const fn note_off(tick: u64, channel: u8, pitch: u8, velocity: u8) -> Self {
        Self::new(tick, NOTE_OFF | (channel & 0x0F), [pitch & 0x7F, velocity & 0x7F])
    }

    /// Controller change on `channel` (0-15).
    pub const fn controller(tick: u64, channel: u8, controller: u8, value: u8) -> Self {
        Self::new(tick, CONTROLLER | (channel & 0x0F), [controller & 0x7F, value & 0x7F])
    }

    /// Command nibble (`status & 0xF0`).
    pub const fn command(&self) -> u8 {
        self.status & 0xF0
    }

    /// Channel nibble (`status & 0x0F`).
    pub const fn channel(&self) -> u8 {
        self.status & 0x0F
    }

    fn from_midly(tick: u64, channel: u4, message: MidiMessage) -> Self {
        let (command, data) = match message {
            MidiMessage::NoteOff { key, vel } => (NOTE_OFF, [key.as_int(), vel.as_int()]),
            MidiMessage::NoteOn { key, vel } => (NOTE_ON, [key.as_int(), vel.as_int()]),
            MidiMessage::Aftertouch { key, vel } => (AFTERTOUCH, [key.as_int(), vel.as_int()]),
            MidiMessage::Controller { controller, value } => {
                (CONTROLLER, [controller.as_int(), value.as_int()])
            }
            MidiMessage::ProgramChange { program } => (PROGRAM_CHANGE, [program.as_int(), 0]),
            MidiMessage::ChannelAftertouch { vel } => (CHANNEL_AFTERTOUCH, [vel.as_int(), 0]),
            MidiMessage::PitchBend { bend } => {
                let raw = bend.0.as_int();
                (PITCH_BEND, [(raw & 0x7F) as u8, (raw >> 7) as u8])
            }
        };
        Self::new(tick, command | channel.as_int(), data)
    }

    fn to_midly(self) -> Option<MidiMessage> {
        let [a, b] = self.data;
        let (a, b) = (u7::from_int_lossy(a), u7::from_int_lossy(b));
        let message = match self.command() {
            NOTE_OFF => MidiMessage::NoteOff { key: a, vel: b },
            NOTE_ON => MidiMessage::NoteOn { key: a, vel: b },
            AFTERTOUCH => MidiMessage::Aftertouch { key: a, vel: b },
            CONTROLLER => MidiMessage::Controller {
                controller: a,
                value: b,
            },
            PROGRAM_CHANGE => MidiMessage::ProgramChange { program: a },
            CHANNEL_AFTERTOUCH => MidiMessage::ChannelAftertouch { vel: a },
            PITCH_BEND => {
                let raw = u16::from(a.as_int()) | (u16::from(b.as_int()) << 7);
                MidiMessage::PitchBend {
                    bend: PitchBend(u14::from_int_lossy(raw)),
                }
            }
            _ => return None,
        };
        Some(message)
    }
}

impl fmt::Display for TrackEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tick {} status {:#04x} data [{}, {}]",
            self.tick, self.status, self.data[0], self.data[1]
        )
    }
}

/// A multi-track sequence at a fixed ticks-per-beat resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    ticks_per_beat: u16,
    tracks: Vec<Vec<TrackEvent>>,
}

impl Sequence {
    /// Empty sequence at the given resolution.
    pub fn new(ticks_per_beat: u16) -> Self {
        Self {
            ticks_per_beat,
            tracks: Vec::new(),
        }
    }

    /// Append a track. Events should be in non-decreasing tick order.
    pub fn with_track(mut self, events: Vec<TrackEvent>) -> Self {
        self.push_track(events);
        self
    }

    /// Append a track, returning its index.
    pub fn push_track(&mut self, events: Vec<TrackEvent>) -> usize {
        self.tracks.push(events);
        self.tracks.len() - 1
    }

    /// Ticks per quarter note.
    pub fn ticks_per_beat(&self) -> u16 {
        self.ticks_per_beat
    }

    /// Number of tracks.
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// All tracks.
    pub fn tracks(&self) -> &[Vec<TrackEvent>] {
        &self.tracks
    }

    /// Events of one track, or `TrackOutOfRange`.
    pub fn track(&self, index: usize) -> Result<&[TrackEvent], MidiError> {
        self.tracks
            .get(index)
            .map(Vec::as_slice)
            .ok_or(MidiError::TrackOutOfRange {
                index,
                count: self.tracks.len(),
            })
    }

    /// Parse a Standard MIDI File.
    ///
    /// Delta times are accumulated into absolute ticks. Files using SMPTE
    /// timecode are rejected with [`MidiError::UnsupportedTiming`].
    pub fn from_smf(bytes: &[u8]) -> Result<Self, MidiError> {
        let smf = Smf::parse(bytes)?;

        let ticks_per_beat = match smf.header.timing {
            Timing::Metrical(tpb) => tpb.as_int(),
            Timing::Timecode(fps, subframe) => {
                return Err(MidiError::UnsupportedTiming(format!(
                    "{} fps timecode with {subframe} subframes",
                    fps.as_int()
                )));
            }
        };
        if ticks_per_beat == 0 {
            return Err(MidiError::InvalidTiming("ticks per beat is zero".into()));
        }

        let tracks: Vec<Vec<TrackEvent>> = smf
            .tracks
            .iter()
            .map(|track| {
                let mut tick = 0u64;
                track
                    .iter()
                    .filter_map(|event| {
                        tick += u64::from(event.delta.as_int());
                        match event.kind {
                            TrackEventKind::Midi { channel, message } => {
                                Some(TrackEvent::from_midly(tick, channel, message))
                            }
                            _ => None,
                        }
                    })
                    .collect()
            })
            .collect();

        tracing::debug!(
            tracks = tracks.len(),
            ticks_per_beat,
            events = tracks.iter().map(Vec::len).sum::<usize>(),
            "parsed MIDI file"
        );

        Ok(Self {
            ticks_per_beat,
            tracks,
        })
    }

    /// Read and parse a Standard MIDI File from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MidiError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| MidiError::read_file(path, e))?;
        Self::from_smf(&bytes)
    }

    /// Encode as a Standard MIDI File (format 0 for one track, 1 otherwise).
    pub fn to_smf_bytes(&self) -> Vec<u8> {
        let format = if self.tracks.len() == 1 {
            Format::SingleTrack
        } else {
            Format::Parallel
        };
        let timing = Timing::Metrical(u15::from_int_lossy(self.ticks_per_beat));
        let mut smf = Smf::new(Header::new(format, timing));

        for events in &self.tracks {
            let mut previous = 0u64;
            let mut track = Vec::with_capacity(events.len() + 1);
            for event in events {
                let Some(message) = event.to_midly() else {
                    continue;
                };
                let delta = event.tick.saturating_sub(previous);
                previous = previous.max(event.tick);
                track.push(midly::TrackEvent {
                    delta: u28::from_int_lossy(delta.min(MAX_DELTA) as u32),
                    kind: TrackEventKind::Midi {
                        channel: u4::from_int_lossy(event.channel()),
                        message,
                    },
                });
            }
            track.push(midly::TrackEvent {
                delta: u28::from_int_lossy(0),
                kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
            });
            smf.tracks.push(track);
        }

        let mut bytes = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = smf.write_std(&mut bytes);
        bytes
    }

    /// Write as a Standard MIDI File.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), MidiError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_smf_bytes()).map_err(|e| MidiError::write_file(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn melody() -> Sequence {
        Sequence::new(96)
            .with_track(Vec::new())
            .with_track(vec![
                TrackEvent::note_on(0, 0, 60, 100),
                TrackEvent::note_off(96, 0, 60, 0),
                TrackEvent::controller(96, 0, 7, 90),
                TrackEvent::note_on(96, 1, 64, 80),
                TrackEvent::note_on(480, 1, 64, 0),
            ])
    }

    #[test]
    fn test_event_nibbles() {
        let event = TrackEvent::note_on(0, 9, 36, 127);
        assert_eq!(event.status, 0x99);
        assert_eq!(event.command(), NOTE_ON);
        assert_eq!(event.channel(), 9);
    }

    #[test]
    fn test_smf_round_trip_keeps_absolute_ticks() {
        let original = melody();
        let parsed = Sequence::from_smf(&original.to_smf_bytes()).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_meta_events_advance_ticks() {
        let mut smf = Smf::new(Header::new(
            Format::SingleTrack,
            Timing::Metrical(u15::from_int_lossy(480)),
        ));
        smf.tracks.push(vec![
            midly::TrackEvent {
                delta: u28::from_int_lossy(240),
                kind: TrackEventKind::Meta(MetaMessage::TrackName(b"lead")),
            },
            midly::TrackEvent {
                delta: u28::from_int_lossy(240),
                kind: TrackEventKind::Midi {
                    channel: u4::from_int_lossy(0),
                    message: MidiMessage::NoteOn {
                        key: u7::from_int_lossy(69),
                        vel: u7::from_int_lossy(64),
                    },
                },
            },
            midly::TrackEvent {
                delta: u28::from_int_lossy(0),
                kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
            },
        ]);
        let mut bytes = Vec::new();
        smf.write_std(&mut bytes).unwrap();

        let sequence = Sequence::from_smf(&bytes).unwrap();
        assert_eq!(sequence.ticks_per_beat(), 480);
        assert_eq!(sequence.track(0).unwrap(), [TrackEvent::note_on(480, 0, 69, 64)]);
    }

    #[test]
    fn test_pitch_bend_round_trip() {
        let bend = TrackEvent::new(10, PITCH_BEND | 2, [0x12, 0x55]);
        let sequence = Sequence::new(24).with_track(vec![bend]);
        let parsed = Sequence::from_smf(&sequence.to_smf_bytes()).unwrap();
        assert_eq!(parsed.track(0).unwrap(), [bend]);
    }

    #[test]
    fn test_track_out_of_range() {
        let sequence = melody();
        assert!(sequence.track(1).is_ok());
        let err = sequence.track(2).unwrap_err();
        assert!(matches!(err, MidiError::TrackOutOfRange { index: 2, count: 2 }));
    }

    #[test]
    fn test_garbage_is_parse_error() {
        let err = Sequence::from_smf(b"not a midi file").unwrap_err();
        assert!(matches!(err, MidiError::Parse(_)));
    }

    #[test]
    fn test_timecode_rejected() {
        let mut smf = Smf::new(Header::new(
            Format::SingleTrack,
            Timing::Timecode(midly::Fps::Fps25, 40),
        ));
        smf.tracks.push(vec![midly::TrackEvent {
            delta: u28::from_int_lossy(0),
            kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
        }]);
        let mut bytes = Vec::new();
        smf.write_std(&mut bytes).unwrap();

        let err = Sequence::from_smf(&bytes).unwrap_err();
        assert!(matches!(err, MidiError::UnsupportedTiming(_)));
    }
}
