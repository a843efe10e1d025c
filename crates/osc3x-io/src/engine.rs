//! Sample-accurate rendering of a voice pool driven by a command queue.

use osc3x_core::TimeStamp;
use osc3x_midi::DEFAULT_PLAYBACK_WINDOW;
use osc3x_synth::{MAX_VOICES, Preset, VoiceAllocator};

use crate::queue::{CommandReceiver, NoteCommand, command_queue};
use crate::sink::RenderSink;
use crate::{Error, Result};

/// Sample rate used when none is given, in Hz.
pub const DEFAULT_SAMPLE_RATE: f32 = 44100.0;

/// Largest block rendered in one call, in frames.
pub const DEFAULT_BLOCK_SIZE: usize = 256;

/// Silence rendered after the playback window, in seconds.
pub const DEFAULT_TAIL: f64 = 1.0;

/// Render settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderConfig {
    /// Sample rate in Hz.
    pub sample_rate: f32,
    /// Voices in the pool.
    pub voices: usize,
    /// Largest block rendered in one call, in frames.
    pub block_size: usize,
    /// Total render length in seconds. The hard stop happens here.
    pub render_length: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            voices: MAX_VOICES,
            block_size: DEFAULT_BLOCK_SIZE,
            render_length: DEFAULT_PLAYBACK_WINDOW + DEFAULT_TAIL,
        }
    }
}

impl RenderConfig {
    /// Total length in frames.
    pub fn length_frames(&self) -> u64 {
        TimeStamp::from_secs(self.render_length).to_sample_index(self.sample_rate)
    }

    /// Rejects settings that cannot produce audio.
    pub fn validate(&self) -> Result<()> {
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "sample rate must be positive, got {}",
                self.sample_rate
            )));
        }
        if self.voices == 0 {
            return Err(Error::InvalidConfig(
                "the voice pool needs at least one voice".to_string(),
            ));
        }
        if !self.render_length.is_finite() || self.render_length < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "render length must be a non-negative number of seconds, got {}",
                self.render_length
            )));
        }
        Ok(())
    }
}

/// Counters from one render.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RenderStats {
    /// Frames written to the sink.
    pub frames: u64,
    /// Commands applied to the voice pool.
    pub commands_applied: usize,
    /// Commands that arrived for a time at or past the hard stop.
    pub commands_discarded: usize,
    /// Largest absolute sample written.
    pub peak: f32,
    /// Notes that had to steal a voice.
    pub voices_stolen: u64,
}

impl RenderStats {
    /// Rendered duration.
    pub fn duration(&self, sample_rate: f32) -> TimeStamp {
        TimeStamp::from_sample_index(self.frames, sample_rate)
    }
}

/// Owns a voice pool and renders it while applying queued note commands.
///
/// A command timestamped `t` takes effect on sample `round(t * sample_rate)`:
/// blocks are split at command boundaries, never rounded to block edges.
/// Commands already in the past are applied before the next sample. The
/// engine only renders past a position once it holds a command at or beyond
/// it, or once every sender has hung up.
pub struct RenderEngine {
    allocator: VoiceAllocator,
    sample_rate: f32,
    block_size: usize,
    length: u64,
    position: u64,
}

impl RenderEngine {
    /// Build the voice pool for `preset`.
    pub fn new(preset: &Preset, config: RenderConfig) -> Result<Self> {
        config.validate()?;
        let block_size = config.block_size.max(1);
        let allocator =
            VoiceAllocator::new(preset, config.voices, config.sample_rate, block_size)?;
        Ok(Self {
            allocator,
            sample_rate: config.sample_rate,
            block_size,
            length: config.length_frames(),
            position: 0,
        })
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Render length in frames.
    pub fn length_frames(&self) -> u64 {
        self.length
    }

    /// Frames rendered so far.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// The voice pool.
    pub fn allocator(&self) -> &VoiceAllocator {
        &self.allocator
    }

    /// Render until the hard stop, applying commands from `commands`.
    ///
    /// At the hard stop every voice is forced off, the sink is finished, and
    /// any commands still queued are counted as discarded once the producer
    /// hangs up.
    pub fn render<S: RenderSink + ?Sized>(
        &mut self,
        commands: &CommandReceiver,
        sink: &mut S,
    ) -> Result<RenderStats> {
        let mut stats = RenderStats::default();
        let mut pending: Option<NoteCommand> = None;
        let mut hung_up = false;

        tracing::debug!(
            length = self.length,
            sample_rate = self.sample_rate,
            block_size = self.block_size,
            "render started"
        );

        while self.position < self.length {
            if pending.is_none() && !hung_up {
                pending = commands.recv();
                hung_up = pending.is_none();
            }

            if let Some(command) = pending {
                if command.sample_index(self.sample_rate) <= self.position {
                    tracing::trace!(?command.kind, at = %command.at, sample = self.position, "apply");
                    command.apply(&mut self.allocator);
                    stats.commands_applied += 1;
                    pending = None;
                    continue;
                }
            }

            let boundary = pending.map_or(self.length, |c| {
                c.sample_index(self.sample_rate).min(self.length)
            });
            let frames = ((boundary - self.position) as usize).min(self.block_size);

            let (left, right) = self.allocator.process(frames);
            stats.peak = left
                .iter()
                .chain(right)
                .fold(stats.peak, |peak, s| peak.max(s.abs()));
            sink.write(left, right)?;
            self.position += frames as u64;
            stats.frames += frames as u64;
        }

        self.hard_stop(sink)?;

        stats.commands_discarded = usize::from(pending.is_some());
        if !hung_up {
            while commands.recv().is_some() {
                stats.commands_discarded += 1;
            }
        }
        stats.voices_stolen = self.allocator.steal_count();

        tracing::debug!(
            frames = stats.frames,
            applied = stats.commands_applied,
            discarded = stats.commands_discarded,
            stolen = stats.voices_stolen,
            peak = stats.peak,
            "render finished"
        );
        Ok(stats)
    }

    /// Render a fixed list of commands on the calling thread.
    pub fn render_commands<S, I>(&mut self, commands: I, sink: &mut S) -> Result<RenderStats>
    where
        S: RenderSink + ?Sized,
        I: IntoIterator<Item = NoteCommand>,
    {
        let (mut tx, rx) = command_queue();
        for command in commands {
            tx.send(command);
        }
        drop(tx);
        self.render(&rx, sink)
    }

    fn hard_stop<S: RenderSink + ?Sized>(&mut self, sink: &mut S) -> Result<()> {
        let at = TimeStamp::from_sample_index(self.position, self.sample_rate);
        let released = self.allocator.all_notes_off(at);
        tracing::debug!(%at, released, "hard stop");
        sink.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::BufferSink;

    fn engine(render_length: f64) -> RenderEngine {
        let config = RenderConfig {
            sample_rate: 1000.0,
            voices: 2,
            block_size: 64,
            render_length,
        };
        RenderEngine::new(&Preset::default(), config).unwrap()
    }

    #[test]
    fn test_length_is_exact() {
        let mut engine = engine(0.5);
        let mut sink = BufferSink::new();
        let stats = engine.render_commands([], &mut sink).unwrap();
        assert_eq!(stats.frames, 500);
        assert_eq!(sink.samples().len(), 500);
        assert!(sink.is_finished());
        assert_eq!(stats.peak, 0.0);
    }

    #[test]
    fn test_note_starts_on_its_sample() {
        let mut engine = engine(0.2);
        let mut sink = BufferSink::new();
        let on = NoteCommand::note_on(TimeStamp::from_secs(0.1), 69, 50.0, 0.8);
        let stats = engine.render_commands([on], &mut sink).unwrap();
        assert_eq!(stats.commands_applied, 1);

        let samples = sink.into_samples();
        assert!(samples.left[..100].iter().all(|&s| s == 0.0));
        assert!(samples.left[100..].iter().any(|&s| s != 0.0));
    }

    #[test]
    fn test_commands_past_the_end_are_discarded() {
        let mut engine = engine(0.1);
        let mut sink = BufferSink::new();
        let commands = [
            NoteCommand::note_on(TimeStamp::ZERO, 60, 100.0, 0.5),
            NoteCommand::note_off(TimeStamp::from_secs(0.1), 60),
            NoteCommand::note_off(TimeStamp::from_secs(5.0), 60),
        ];
        let stats = engine.render_commands(commands, &mut sink).unwrap();
        assert_eq!(stats.commands_applied, 1);
        assert_eq!(stats.commands_discarded, 2);
        assert_eq!(engine.allocator().active_voice_count(), 0, "hard stop");
    }

    #[test]
    fn test_invalid_config() {
        let config = RenderConfig {
            sample_rate: 0.0,
            ..RenderConfig::default()
        };
        assert!(matches!(
            RenderEngine::new(&Preset::default(), config),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_zero_voices_rejected() {
        let config = RenderConfig {
            voices: 0,
            ..RenderConfig::default()
        };
        match RenderEngine::new(&Preset::default(), config) {
            Err(err @ Error::InvalidConfig(_)) => {
                assert!(err.to_string().contains("at least one voice"));
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("a pool of zero voices was accepted"),
        }
    }

    #[test]
    fn test_default_length_is_window_plus_tail() {
        let config = RenderConfig::default();
        assert_eq!(config.length_frames(), 11 * 44100);
    }
}
