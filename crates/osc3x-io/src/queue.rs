//! Timestamped note commands passed from a scheduler thread to the render
//! thread.
//!
//! The queue is unbounded so a producer never blocks. Commands carry the
//! time they take effect; the consumer decides when that is in samples.

use crossbeam_channel::{Receiver, Sender, unbounded};
use osc3x_core::{NoteSink, TimeStamp};

/// What a [`NoteCommand`] does.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NoteCommandKind {
    /// Start (or retrigger) a note.
    NoteOn {
        /// MIDI key.
        pitch: u8,
        /// Oscillator frequency in Hz.
        frequency: f32,
        /// Linear amplitude.
        amplitude: f32,
    },
    /// Release a note.
    NoteOff {
        /// MIDI key.
        pitch: u8,
    },
    /// Release everything.
    AllNotesOff,
}

/// A note event with the time it takes effect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteCommand {
    /// When the command takes effect.
    pub at: TimeStamp,
    /// The command itself.
    pub kind: NoteCommandKind,
}

impl NoteCommand {
    /// Note-on at `at`.
    pub fn note_on(at: TimeStamp, pitch: u8, frequency: f32, amplitude: f32) -> Self {
        Self {
            at,
            kind: NoteCommandKind::NoteOn {
                pitch,
                frequency,
                amplitude,
            },
        }
    }

    /// Note-off at `at`.
    pub fn note_off(at: TimeStamp, pitch: u8) -> Self {
        Self {
            at,
            kind: NoteCommandKind::NoteOff { pitch },
        }
    }

    /// All-notes-off at `at`.
    pub fn all_notes_off(at: TimeStamp) -> Self {
        Self {
            at,
            kind: NoteCommandKind::AllNotesOff,
        }
    }

    /// Sample on which this command takes effect.
    pub fn sample_index(&self, sample_rate: f32) -> u64 {
        self.at.to_sample_index(sample_rate)
    }

    /// Deliver to `sink`.
    pub fn apply<S: NoteSink + ?Sized>(&self, sink: &mut S) {
        match self.kind {
            NoteCommandKind::NoteOn {
                pitch,
                frequency,
                amplitude,
            } => sink.note_on(pitch, frequency, amplitude, self.at),
            NoteCommandKind::NoteOff { pitch } => sink.note_off(pitch, self.at),
            NoteCommandKind::AllNotesOff => sink.all_notes_off(self.at),
        }
    }
}

/// Creates a connected sender/receiver pair.
pub fn command_queue() -> (CommandSender, CommandReceiver) {
    let (tx, rx) = unbounded();
    (
        CommandSender {
            tx,
            sent: 0,
            hung_up: false,
        },
        CommandReceiver { rx },
    )
}

/// Producer half. Implements [`NoteSink`], so a scheduler can dispatch
/// straight into it.
///
/// Dropping every sender tells the receiver no more commands will come.
#[derive(Debug)]
pub struct CommandSender {
    tx: Sender<NoteCommand>,
    sent: usize,
    hung_up: bool,
}

impl CommandSender {
    /// Queue a command. Returns `false` once the receiver is gone.
    pub fn send(&mut self, command: NoteCommand) -> bool {
        if self.hung_up {
            return false;
        }
        if self.tx.send(command).is_err() {
            tracing::debug!(sent = self.sent, "render thread stopped listening");
            self.hung_up = true;
            return false;
        }
        self.sent += 1;
        true
    }

    /// Commands successfully queued.
    pub fn sent(&self) -> usize {
        self.sent
    }
}

impl NoteSink for CommandSender {
    fn note_on(&mut self, pitch: u8, frequency: f32, amplitude: f32, at: TimeStamp) {
        self.send(NoteCommand::note_on(at, pitch, frequency, amplitude));
    }

    fn note_off(&mut self, pitch: u8, at: TimeStamp) {
        self.send(NoteCommand::note_off(at, pitch));
    }

    fn all_notes_off(&mut self, at: TimeStamp) {
        self.send(NoteCommand::all_notes_off(at));
    }
}

/// Consumer half.
#[derive(Debug)]
pub struct CommandReceiver {
    rx: Receiver<NoteCommand>,
}

impl CommandReceiver {
    /// Waits for the next command. `None` once every sender is dropped and
    /// the queue is empty.
    pub fn recv(&self) -> Option<NoteCommand> {
        self.rx.recv().ok()
    }

    /// Next command if one is already queued.
    pub fn try_recv(&self) -> Option<NoteCommand> {
        self.rx.try_recv().ok()
    }
}
