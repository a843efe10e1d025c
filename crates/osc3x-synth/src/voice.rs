//! The Osc3x voice: three oscillators, a stereo mixer and a filter pair.
//!
//! Each voice owns a static [`Graph`] wired once at construction:
//!
//! ```text
//! osc1 ─┐
//! osc2 ─┼─> mixer ─┬─ L ─> filter L ─┐
//! osc3 ─┘          └─ R ─> filter R ─┴─> output (L, R)
//! ```
//!
//! Notes only change oscillator frequencies and amplitudes; the topology
//! and filter settings come from the [`Preset`] and never change.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use osc3x_core::{
    BiquadFilter, Graph, GraphBuilder, GraphError, Inputs, NodeId, TimeStamp, Unit,
    frequency_to_pitch, pitch_to_frequency,
};

use crate::mixer::StereoMixer;
use crate::oscillator::Oscillator;
use crate::preset::{OSCILLATOR_COUNT, Preset};

/// A node in the voice graph.
#[derive(Debug, Clone)]
pub enum VoiceUnit {
    /// Tone source: no inputs, one output.
    Oscillator(Oscillator),
    /// Three mono inputs, stereo output.
    Mixer(StereoMixer<OSCILLATOR_COUNT>),
    /// One channel of the filter pair.
    Filter(BiquadFilter),
    /// Stereo passthrough the voice reads its block from.
    Output,
}

impl Unit for VoiceUnit {
    fn input_count(&self) -> usize {
        match self {
            VoiceUnit::Oscillator(_) => 0,
            VoiceUnit::Mixer(_) => OSCILLATOR_COUNT,
            VoiceUnit::Filter(_) => 1,
            VoiceUnit::Output => 2,
        }
    }

    fn output_count(&self) -> usize {
        match self {
            VoiceUnit::Oscillator(_) | VoiceUnit::Filter(_) => 1,
            VoiceUnit::Mixer(_) | VoiceUnit::Output => 2,
        }
    }

    fn process(&mut self, inputs: &Inputs<'_>, outputs: &mut [Vec<f32>], frames: usize) {
        match self {
            VoiceUnit::Oscillator(osc) => osc.fill(&mut outputs[0][..frames]),
            VoiceUnit::Mixer(mixer) => {
                let sources: [Option<&[f32]>; OSCILLATOR_COUNT] =
                    core::array::from_fn(|port| inputs.port(port));
                let (left, right) = outputs.split_at_mut(1);
                for i in 0..frames {
                    let samples = sources.map(|s| s.map_or(0.0, |b| b[i]));
                    let (l, r) = mixer.mix(&samples);
                    left[0][i] = l;
                    right[0][i] = r;
                }
            }
            VoiceUnit::Filter(filter) => match inputs.port(0) {
                Some(input) => {
                    for (out, &x) in outputs[0][..frames].iter_mut().zip(input) {
                        *out = filter.process(x);
                    }
                }
                None => {
                    for out in &mut outputs[0][..frames] {
                        *out = filter.process(0.0);
                    }
                }
            },
            VoiceUnit::Output => {
                for (channel, out) in outputs.iter_mut().enumerate() {
                    match inputs.port(channel) {
                        Some(input) => out[..frames].copy_from_slice(input),
                        None => out[..frames].fill(0.0),
                    }
                }
            }
        }
    }
}

/// One Osc3x voice.
///
/// Built once from a [`Preset`] and reused for every note it plays.
///
/// # Example
///
/// ```rust
/// use osc3x_core::TimeStamp;
/// use osc3x_synth::{Osc3xVoice, Preset};
///
/// let mut voice = Osc3xVoice::new(&Preset::default(), 48000.0, 256).unwrap();
/// voice.note_on(440.0, 0.5, TimeStamp::ZERO);
/// voice.process(256);
/// let (left, right) = voice.output();
/// assert_eq!(left.len(), 256);
/// assert!(left.iter().chain(right).any(|s| *s != 0.0));
/// ```
pub struct Osc3xVoice {
    graph: Graph<VoiceUnit>,
    oscillators: [NodeId; OSCILLATOR_COUNT],
    mixer: NodeId,
    filters: [NodeId; 2],
    output: NodeId,
    detune2: f32,
    detune3: f32,
    active: bool,
    started_at: Option<TimeStamp>,
}

impl Osc3xVoice {
    /// Builds the voice graph for `preset`.
    ///
    /// `max_block` is the largest block [`process`](Self::process) will be
    /// asked to render.
    pub fn new(preset: &Preset, sample_rate: f32, max_block: usize) -> Result<Self, GraphError> {
        let mut builder = GraphBuilder::new();

        let oscillators = preset.oscillators.map(|slot| {
            builder.add(VoiceUnit::Oscillator(Oscillator::new(slot.kind, sample_rate)))
        });
        let mixer = builder.add(VoiceUnit::Mixer(StereoMixer::from_settings(
            &preset.oscillators,
        )));
        let filter = preset.filter;
        let filters = [(); 2].map(|()| {
            builder.add(VoiceUnit::Filter(BiquadFilter::new(
                filter.kind,
                filter.frequency,
                filter.q,
                sample_rate,
            )))
        });
        let output = builder.add(VoiceUnit::Output);

        for (port, &osc) in oscillators.iter().enumerate() {
            builder.connect(osc, 0, mixer, port)?;
        }
        for (channel, &filter) in filters.iter().enumerate() {
            builder.connect(mixer, channel, filter, 0)?;
            builder.connect(filter, 0, output, channel)?;
        }

        Ok(Self {
            graph: builder.build(max_block)?,
            oscillators,
            mixer,
            filters,
            output,
            detune2: preset.detune2,
            detune3: preset.detune3,
            active: false,
            started_at: None,
        })
    }

    /// Starts a note.
    ///
    /// Oscillator 1 plays `frequency`. Oscillators 2 and 3 play it shifted by
    /// their detunes in semitones; with both detunes at zero they play
    /// `frequency` exactly. All three take `amplitude`.
    pub fn note_on(&mut self, frequency: f32, amplitude: f32, at: TimeStamp) {
        let frequencies = if self.detune2 == 0.0 && self.detune3 == 0.0 {
            [frequency; OSCILLATOR_COUNT]
        } else {
            let pitch = frequency_to_pitch(frequency);
            [
                frequency,
                pitch_to_frequency(pitch + self.detune2),
                pitch_to_frequency(pitch + self.detune3),
            ]
        };

        for (id, f) in self.oscillators.iter().zip(frequencies) {
            if let Some(VoiceUnit::Oscillator(osc)) = self.graph.unit_mut(*id) {
                osc.note_on(f, amplitude);
            }
        }
        self.active = true;
        self.started_at = Some(at);
    }

    /// Silences all three oscillators. There is no release stage.
    pub fn note_off(&mut self, at: TimeStamp) {
        for id in self.oscillators {
            if let Some(VoiceUnit::Oscillator(osc)) = self.graph.unit_mut(id) {
                osc.note_off();
            }
        }
        self.active = false;

        #[cfg(feature = "tracing")]
        tracing::trace!(%at, "voice off");
        #[cfg(not(feature = "tracing"))]
        let _ = at;
    }

    /// Renders `frames` samples (at most the `max_block` given at
    /// construction).
    pub fn process(&mut self, frames: usize) {
        self.graph.process(frames);
    }

    /// Left and right samples from the last [`process`](Self::process) call.
    pub fn output(&self) -> (&[f32], &[f32]) {
        (
            self.graph.output(self.output, 0).unwrap_or(&[]),
            self.graph.output(self.output, 1).unwrap_or(&[]),
        )
    }

    /// True between note-on and note-off.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Time of the latest note-on.
    pub fn started_at(&self) -> Option<TimeStamp> {
        self.started_at
    }

    /// Oscillator `index` (0 to 2).
    pub fn oscillator(&self, index: usize) -> Option<&Oscillator> {
        match self.graph.unit(*self.oscillators.get(index)?)? {
            VoiceUnit::Oscillator(osc) => Some(osc),
            _ => None,
        }
    }

    /// Current frequencies of the three oscillators.
    pub fn oscillator_frequencies(&self) -> [f32; OSCILLATOR_COUNT] {
        core::array::from_fn(|i| self.oscillator(i).map_or(0.0, Oscillator::frequency))
    }

    /// The stereo mixer.
    pub fn mixer(&self) -> Option<&StereoMixer<OSCILLATOR_COUNT>> {
        match self.graph.unit(self.mixer)? {
            VoiceUnit::Mixer(mixer) => Some(mixer),
            _ => None,
        }
    }

    /// Filter for `channel` (0 left, 1 right).
    pub fn filter(&self, channel: usize) -> Option<&BiquadFilter> {
        match self.graph.unit(*self.filters.get(channel)?)? {
            VoiceUnit::Filter(filter) => Some(filter),
            _ => None,
        }
    }

    /// Largest block the voice renders at once.
    pub fn max_block(&self) -> usize {
        self.graph.max_block()
    }
}

impl core::fmt::Debug for Osc3xVoice {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Osc3xVoice")
            .field("active", &self.active)
            .field("started_at", &self.started_at)
            .field("frequencies", &self.oscillator_frequencies())
            .finish_non_exhaustive()
    }
}
