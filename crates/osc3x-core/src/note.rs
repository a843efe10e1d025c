//! The seam between note sources and note consumers.
//!
//! A scheduler walking a MIDI track, a command queue feeding a render
//! thread, and a voice allocator all speak [`NoteSink`], so any source can
//! drive any consumer.

use crate::time::TimeStamp;

/// Receives timestamped note events.
///
/// `pitch` is the MIDI key that identifies the note for the matching
/// note-off. `frequency` and `amplitude` are what the voice should play;
/// the source decides the mapping (equal temperament, velocity scaling).
pub trait NoteSink {
    /// Starts (or retriggers) `pitch` at `at`.
    fn note_on(&mut self, pitch: u8, frequency: f32, amplitude: f32, at: TimeStamp);

    /// Releases `pitch` at `at`. Releasing a pitch that is not sounding is
    /// not an error.
    fn note_off(&mut self, pitch: u8, at: TimeStamp);

    /// Releases every sounding note at `at`.
    fn all_notes_off(&mut self, at: TimeStamp);
}

impl<T: NoteSink + ?Sized> NoteSink for &mut T {
    fn note_on(&mut self, pitch: u8, frequency: f32, amplitude: f32, at: TimeStamp) {
        (**self).note_on(pitch, frequency, amplitude, at);
    }

    fn note_off(&mut self, pitch: u8, at: TimeStamp) {
        (**self).note_off(pitch, at);
    }

    fn all_notes_off(&mut self, at: TimeStamp) {
        (**self).all_notes_off(at);
    }
}
