//! One render session: a preset, a MIDI track, and a sink.
//!
//! The scheduler runs on a scoped producer thread and feeds the command
//! queue; the render engine consumes it on the calling thread. Every trial
//! builds its own voice pool, so trials never share state.

use std::thread;

use osc3x_midi::{PlaybackSummary, Scheduler, SchedulerConfig, Sequence};
use osc3x_synth::Preset;

use crate::engine::{RenderConfig, RenderEngine, RenderStats};
use crate::queue::command_queue;
use crate::sink::RenderSink;
use crate::{Error, Result};

/// What a trial produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionReport {
    /// What the scheduler dispatched.
    pub playback: PlaybackSummary,
    /// What the render engine did with it.
    pub render: RenderStats,
}

/// Everything one trial needs, owned by the trial.
#[derive(Debug, Clone)]
pub struct TrialContext<'a> {
    label: String,
    preset: Preset,
    sequence: &'a Sequence,
    track: usize,
    scheduler: SchedulerConfig,
    render: RenderConfig,
}

impl<'a> TrialContext<'a> {
    /// Trial of `preset` on `track` of `sequence`, with default tempo,
    /// window and render settings.
    pub fn new(label: impl Into<String>, preset: Preset, sequence: &'a Sequence, track: usize) -> Self {
        Self {
            label: label.into(),
            preset,
            sequence,
            track,
            scheduler: SchedulerConfig::default(),
            render: RenderConfig::default(),
        }
    }

    /// Replace the tempo and window.
    pub fn with_scheduler(mut self, config: SchedulerConfig) -> Self {
        self.scheduler = config;
        self
    }

    /// Replace the render settings.
    pub fn with_render(mut self, config: RenderConfig) -> Self {
        self.render = config;
        self
    }

    /// Label used in logs.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Render settings.
    pub fn render_config(&self) -> &RenderConfig {
        &self.render
    }

    /// Run the trial into `sink`.
    ///
    /// The track is scheduled before anything is rendered, so a bad track
    /// fails without touching the sink.
    pub fn run<S: RenderSink + ?Sized>(&self, sink: &mut S) -> Result<SessionReport> {
        let span = tracing::info_span!("trial", label = %self.label);
        let _guard = span.enter();

        let schedule = Scheduler::new(self.scheduler).schedule(self.sequence, self.track)?;
        let mut engine = RenderEngine::new(&self.preset, self.render)?;
        let (mut sender, receiver) = command_queue();

        let (playback, render) = thread::scope(|scope| {
            let producer = scope.spawn(move || schedule.dispatch(&mut sender));
            let render = engine.render(&receiver, sink);
            let playback = producer.join().map_err(|_| Error::ProducerPanicked);
            (playback, render)
        });
        let report = SessionReport {
            playback: playback?,
            render: render?,
        };

        tracing::info!(
            notes = report.playback.note_ons,
            dropped = report.playback.dropped,
            frames = report.render.frames,
            stolen = report.render.voices_stolen,
            peak = report.render.peak,
            "trial rendered"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::BufferSink;
    use osc3x_midi::{MidiError, TrackEvent};

    fn sequence() -> Sequence {
        Sequence::new(96).with_track(vec![
            TrackEvent::note_on(96, 0, 69, 120),
            TrackEvent::note_off(192, 0, 69, 0),
        ])
    }

    fn short() -> RenderConfig {
        RenderConfig {
            sample_rate: 8000.0,
            render_length: 1.0,
            ..RenderConfig::default()
        }
    }

    #[test]
    fn test_trial_renders_track() {
        let sequence = sequence();
        let trial = TrialContext::new("a4", Preset::default(), &sequence, 0).with_render(short());
        let mut sink = BufferSink::new();
        let report = trial.run(&mut sink).unwrap();

        assert_eq!(report.playback.note_ons, 1);
        assert_eq!(report.playback.note_offs, 1);
        assert_eq!(report.render.commands_applied, 2);
        assert_eq!(report.render.frames, 8000);
        assert!(report.render.peak > 0.0);

        // Note-on at 0 s, note-off one beat (0.5 s at 120 BPM) later.
        let samples = sink.into_samples();
        assert!(samples.left[..4000].iter().any(|&s| s != 0.0));
        // The filter rings briefly after the release.
        assert!(samples.left[4400..].iter().all(|&s| s.abs() < 1e-3));
    }

    #[test]
    fn test_bad_track_leaves_sink_untouched() {
        let sequence = sequence();
        let trial = TrialContext::new("bad", Preset::default(), &sequence, 4).with_render(short());
        let mut sink = BufferSink::new();
        let err = trial.run(&mut sink).unwrap_err();
        assert!(matches!(
            err,
            Error::Midi(MidiError::TrackOutOfRange { index: 4, count: 1 })
        ));
        assert!(sink.samples().is_empty());
        assert!(!sink.is_finished());
    }
}
