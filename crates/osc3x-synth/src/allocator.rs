//! Polyphonic voice allocation with oldest-note stealing.
//!
//! A fixed pool of [`Osc3xVoice`]s is built once from a preset. Each
//! note-on picks a voice in this order:
//!
//! 1. the voice already playing that pitch (retrigger),
//! 2. the free voice released longest ago (ties: lowest index),
//! 3. the sounding voice with the oldest note-on, which is stolen.
//!
//! The pitch table only ever points at sounding voices.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use osc3x_core::{GraphError, NoteSink, TimeStamp};

use crate::preset::Preset;
use crate::voice::Osc3xVoice;

/// Default size of the voice pool.
pub const MAX_VOICES: usize = 8;

const PITCH_SLOTS: usize = u8::MAX as usize + 1;

/// How a note-on was placed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Allocation {
    /// A free voice took the note.
    Allocated {
        /// Voice index.
        voice: usize,
    },
    /// The pitch was already sounding; its voice restarted.
    Retriggered {
        /// Voice index.
        voice: usize,
    },
    /// Every voice was busy; the oldest one was cut off and reused.
    Stolen {
        /// Voice index.
        voice: usize,
        /// Pitch the voice was playing before.
        previous_pitch: u8,
    },
}

impl Allocation {
    /// Index of the voice now playing the note.
    pub fn voice(self) -> usize {
        match self {
            Allocation::Allocated { voice }
            | Allocation::Retriggered { voice }
            | Allocation::Stolen { voice, .. } => voice,
        }
    }
}

#[derive(Debug)]
struct Slot {
    voice: Osc3xVoice,
    /// Pitch currently sounding on this voice.
    pitch: Option<u8>,
    /// Allocator clock at the latest note-on.
    age: u64,
    /// Allocator clock at the latest release.
    released: u64,
}

/// Maps note-on/note-off events onto a fixed pool of voices.
///
/// # Example
///
/// ```rust
/// use osc3x_core::TimeStamp;
/// use osc3x_synth::{Allocation, Preset, VoiceAllocator};
///
/// let mut alloc = VoiceAllocator::new(&Preset::default(), 2, 48000.0, 256).unwrap();
/// let t = TimeStamp::ZERO;
/// assert_eq!(alloc.note_on(60, 261.6, 0.5, t), Allocation::Allocated { voice: 0 });
/// assert_eq!(alloc.note_on(64, 329.6, 0.5, t), Allocation::Allocated { voice: 1 });
/// assert_eq!(
///     alloc.note_on(67, 392.0, 0.5, t),
///     Allocation::Stolen { voice: 0, previous_pitch: 60 }
/// );
/// ```
#[derive(Debug)]
pub struct VoiceAllocator {
    slots: Vec<Slot>,
    sounding: [Option<usize>; PITCH_SLOTS],
    clock: u64,
    steals: u64,
    left: Vec<f32>,
    right: Vec<f32>,
    max_block: usize,
}

impl VoiceAllocator {
    /// Builds `voices` voices from `preset` (at least one).
    pub fn new(
        preset: &Preset,
        voices: usize,
        sample_rate: f32,
        max_block: usize,
    ) -> Result<Self, GraphError> {
        let slots = (0..voices.max(1))
            .map(|_| {
                Ok(Slot {
                    voice: Osc3xVoice::new(preset, sample_rate, max_block)?,
                    pitch: None,
                    age: 0,
                    released: 0,
                })
            })
            .collect::<Result<Vec<_>, GraphError>>()?;

        #[cfg(feature = "tracing")]
        tracing::debug!(voices = slots.len(), sample_rate, max_block, "voice pool built");

        Ok(Self {
            slots,
            sounding: [None; PITCH_SLOTS],
            clock: 0,
            steals: 0,
            left: vec![0.0; max_block],
            right: vec![0.0; max_block],
            max_block,
        })
    }

    /// Starts `pitch` at `frequency` Hz with `amplitude`.
    pub fn note_on(&mut self, pitch: u8, frequency: f32, amplitude: f32, at: TimeStamp) -> Allocation {
        self.clock += 1;

        if let Some(index) = self.sounding[usize::from(pitch)] {
            let slot = &mut self.slots[index];
            slot.age = self.clock;
            slot.voice.note_on(frequency, amplitude, at);
            return Allocation::Retriggered { voice: index };
        }

        let free = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.pitch.is_none())
            .min_by_key(|(index, slot)| (slot.released, *index))
            .map(|(index, _)| index);

        let allocation = match free {
            Some(index) => Allocation::Allocated { voice: index },
            None => {
                let (index, previous_pitch) = self
                    .slots
                    .iter()
                    .enumerate()
                    .filter_map(|(index, slot)| slot.pitch.map(|p| (index, p, slot.age)))
                    .min_by_key(|&(index, _, age)| (age, index))
                    .map_or((0, pitch), |(index, p, _)| (index, p));

                self.sounding[usize::from(previous_pitch)] = None;
                self.slots[index].voice.note_off(at);
                self.steals += 1;

                #[cfg(feature = "tracing")]
                tracing::debug!(voice = index, previous_pitch, pitch, %at, "voice stolen");

                Allocation::Stolen {
                    voice: index,
                    previous_pitch,
                }
            }
        };

        let index = allocation.voice();
        let slot = &mut self.slots[index];
        slot.pitch = Some(pitch);
        slot.age = self.clock;
        slot.voice.note_on(frequency, amplitude, at);
        self.sounding[usize::from(pitch)] = Some(index);
        allocation
    }

    /// Releases `pitch`. Returns the voice it was on, or `None` when the
    /// pitch was not sounding (which is not an error).
    pub fn note_off(&mut self, pitch: u8, at: TimeStamp) -> Option<usize> {
        let index = self.sounding[usize::from(pitch)].take()?;
        self.clock += 1;
        let slot = &mut self.slots[index];
        slot.pitch = None;
        slot.released = self.clock;
        slot.voice.note_off(at);
        Some(index)
    }

    /// Releases every sounding voice and clears the pitch table. Returns
    /// how many voices were turned off.
    pub fn all_notes_off(&mut self, at: TimeStamp) -> usize {
        self.clock += 1;
        let mut count = 0;
        for slot in &mut self.slots {
            if slot.pitch.take().is_some() {
                slot.released = self.clock;
                slot.voice.note_off(at);
                count += 1;
            }
        }
        self.sounding = [None; PITCH_SLOTS];

        #[cfg(feature = "tracing")]
        tracing::debug!(count, %at, "all notes off");

        count
    }

    /// Renders every voice for `frames` samples (capped at `max_block`) and
    /// returns the summed stereo block.
    pub fn process(&mut self, frames: usize) -> (&[f32], &[f32]) {
        let frames = frames.min(self.max_block);
        let left = &mut self.left[..frames];
        let right = &mut self.right[..frames];
        left.fill(0.0);
        right.fill(0.0);

        for slot in &mut self.slots {
            slot.voice.process(frames);
            let (l, r) = slot.voice.output();
            for (acc, x) in left.iter_mut().zip(l) {
                *acc += x;
            }
            for (acc, x) in right.iter_mut().zip(r) {
                *acc += x;
            }
        }
        (&self.left[..frames], &self.right[..frames])
    }

    /// Returns the allocator to its freshly built state: every voice off,
    /// counters at zero.
    pub fn reset(&mut self) {
        self.all_notes_off(TimeStamp::ZERO);
        for slot in &mut self.slots {
            slot.age = 0;
            slot.released = 0;
        }
        self.clock = 0;
        self.steals = 0;
    }

    /// Voice playing `pitch`, if it is sounding.
    pub fn voice_for(&self, pitch: u8) -> Option<usize> {
        self.sounding[usize::from(pitch)]
    }

    /// Pitch sounding on `voice`.
    pub fn pitch_of(&self, voice: usize) -> Option<u8> {
        self.slots.get(voice)?.pitch
    }

    /// Sounding pitches in ascending order.
    pub fn sounding_pitches(&self) -> impl Iterator<Item = u8> + '_ {
        self.sounding
            .iter()
            .enumerate()
            .filter(|(_, voice)| voice.is_some())
            .map(|(pitch, _)| pitch as u8)
    }

    /// Number of voices with a sounding pitch.
    pub fn active_voice_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.pitch.is_some()).count()
    }

    /// Size of the pool.
    pub fn voice_count(&self) -> usize {
        self.slots.len()
    }

    /// Voices stolen since construction or the last [`reset`](Self::reset).
    pub fn steal_count(&self) -> u64 {
        self.steals
    }

    /// Voice `index`.
    pub fn voice(&self, index: usize) -> Option<&Osc3xVoice> {
        self.slots.get(index).map(|slot| &slot.voice)
    }

    /// Largest block [`process`](Self::process) renders at once.
    pub fn max_block(&self) -> usize {
        self.max_block
    }
}

impl NoteSink for VoiceAllocator {
    fn note_on(&mut self, pitch: u8, frequency: f32, amplitude: f32, at: TimeStamp) {
        VoiceAllocator::note_on(self, pitch, frequency, amplitude, at);
    }

    fn note_off(&mut self, pitch: u8, at: TimeStamp) {
        VoiceAllocator::note_off(self, pitch, at);
    }

    fn all_notes_off(&mut self, at: TimeStamp) {
        VoiceAllocator::all_notes_off(self, at);
    }
}
