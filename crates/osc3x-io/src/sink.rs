//! Destinations for rendered stereo audio.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavWriter};
use osc3x_core::StereoSamples;

use crate::{Error, Result};

/// Receives rendered blocks in order.
///
/// `finish` flushes and closes the sink. Writing after `finish` is an error.
pub trait RenderSink {
    /// Append one block. `left` and `right` have the same length.
    fn write(&mut self, left: &[f32], right: &[f32]) -> Result<()>;

    /// Flush and close.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<T: RenderSink + ?Sized> RenderSink for &mut T {
    fn write(&mut self, left: &[f32], right: &[f32]) -> Result<()> {
        (**self).write(left, right)
    }

    fn finish(&mut self) -> Result<()> {
        (**self).finish()
    }
}

/// Sample encoding of a WAV file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BitDepth {
    /// 16-bit signed PCM.
    #[default]
    Pcm16,
    /// 32-bit IEEE float.
    Float32,
}

impl BitDepth {
    /// Bits per sample.
    pub fn bits(self) -> u16 {
        match self {
            BitDepth::Pcm16 => 16,
            BitDepth::Float32 => 32,
        }
    }

    /// Depth for a bit count (16 or 32).
    pub fn from_bits(bits: u16) -> Option<Self> {
        match bits {
            16 => Some(BitDepth::Pcm16),
            32 => Some(BitDepth::Float32),
            _ => None,
        }
    }

    pub(crate) fn wav_spec(self, sample_rate: u32) -> hound::WavSpec {
        hound::WavSpec {
            channels: 2,
            sample_rate,
            bits_per_sample: self.bits(),
            sample_format: match self {
                BitDepth::Pcm16 => SampleFormat::Int,
                BitDepth::Float32 => SampleFormat::Float,
            },
        }
    }
}

/// Scale a float sample to 16-bit PCM, clipping out-of-range values.
pub(crate) fn to_pcm16(sample: f32) -> i16 {
    const MAX_VAL: f32 = 32768.0;
    (sample * MAX_VAL).clamp(-MAX_VAL, MAX_VAL - 1.0) as i16
}

/// Streams stereo blocks into a WAV file.
///
/// The header is finalized by [`RenderSink::finish`], or on drop if the
/// sink is abandoned early.
pub struct WavSink {
    writer: Option<WavWriter<BufWriter<File>>>,
    depth: BitDepth,
    path: PathBuf,
    frames: u64,
}

impl WavSink {
    /// Create (or truncate) `path`.
    pub fn create(path: impl AsRef<Path>, sample_rate: u32, depth: BitDepth) -> Result<Self> {
        let path = path.as_ref();
        let writer = WavWriter::create(path, depth.wav_spec(sample_rate))?;
        tracing::debug!(path = %path.display(), sample_rate, bits = depth.bits(), "WAV sink opened");
        Ok(Self {
            writer: Some(writer),
            depth,
            path: path.to_path_buf(),
            frames: 0,
        })
    }

    /// Frames written so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Output path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RenderSink for WavSink {
    fn write(&mut self, left: &[f32], right: &[f32]) -> Result<()> {
        let writer = self.writer.as_mut().ok_or(Error::SinkClosed)?;
        match self.depth {
            BitDepth::Float32 => {
                for (&l, &r) in left.iter().zip(right) {
                    writer.write_sample(l)?;
                    writer.write_sample(r)?;
                }
            }
            BitDepth::Pcm16 => {
                for (&l, &r) in left.iter().zip(right) {
                    writer.write_sample(to_pcm16(l))?;
                    writer.write_sample(to_pcm16(r))?;
                }
            }
        }
        self.frames += left.len().min(right.len()) as u64;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.take() {
            writer.finalize()?;
            tracing::debug!(path = %self.path.display(), frames = self.frames, "WAV sink finalized");
        }
        Ok(())
    }
}

/// Collects rendered audio in memory.
#[derive(Debug, Default)]
pub struct BufferSink {
    samples: StereoSamples,
    finished: bool,
}

impl BufferSink {
    /// Empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Audio collected so far.
    pub fn samples(&self) -> &StereoSamples {
        &self.samples
    }

    /// Whether [`RenderSink::finish`] was called.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Take the collected audio.
    pub fn into_samples(self) -> StereoSamples {
        self.samples
    }
}

impl RenderSink for BufferSink {
    fn write(&mut self, left: &[f32], right: &[f32]) -> Result<()> {
        if self.finished {
            return Err(Error::SinkClosed);
        }
        self.samples.extend_from(left, right);
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.finished = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_pcm16_clips() {
        assert_eq!(to_pcm16(0.0), 0);
        assert_eq!(to_pcm16(2.0), i16::MAX);
        assert_eq!(to_pcm16(-2.0), i16::MIN);
        assert_eq!(to_pcm16(0.5), 16384);
    }

    #[test]
    fn test_bit_depth_from_bits() {
        assert_eq!(BitDepth::from_bits(16), Some(BitDepth::Pcm16));
        assert_eq!(BitDepth::from_bits(32), Some(BitDepth::Float32));
        assert_eq!(BitDepth::from_bits(24), None);
        assert_eq!(BitDepth::default().bits(), 16);
    }

    #[test]
    fn test_buffer_sink_rejects_after_finish() {
        let mut sink = BufferSink::new();
        sink.write(&[0.1, 0.2], &[0.3, 0.4]).unwrap();
        sink.finish().unwrap();
        assert!(sink.is_finished());
        assert!(matches!(sink.write(&[0.0], &[0.0]), Err(Error::SinkClosed)));
        assert_eq!(sink.into_samples().left, vec![0.1, 0.2]);
    }

    #[test]
    fn test_wav_sink_counts_frames() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.wav");
        let mut sink = WavSink::create(&path, 22050, BitDepth::Float32).unwrap();
        sink.write(&[0.0; 100], &[0.0; 100]).unwrap();
        sink.write(&[0.5; 28], &[-0.5; 28]).unwrap();
        assert_eq!(sink.frames(), 128);
        sink.finish().unwrap();
        sink.finish().unwrap();
        assert!(matches!(sink.write(&[0.0], &[0.0]), Err(Error::SinkClosed)));

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().channels, 2);
        assert_eq!(reader.duration(), 128);
    }

    #[test]
    fn test_wav_sink_finalizes_on_drop() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("dropped.wav");
        {
            let mut sink = WavSink::create(&path, 44100, BitDepth::Pcm16).unwrap();
            sink.write(&[0.25; 64], &[0.25; 64]).unwrap();
        }
        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.duration(), 64);
    }
}
