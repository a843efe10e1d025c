//! Stereo audio buffer for whole renders.
//!
//! [`StereoSamples`] holds a pair of `Vec<f32>` buffers (left/right channels).
//! The in-memory render sink appends to one, and WAV reading returns one.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// A pair of stereo audio buffers (left and right channels).
///
/// Each channel is a `Vec<f32>` of equal length.
///
/// # Example
///
/// ```rust
/// use osc3x_core::StereoSamples;
///
/// let mut samples = StereoSamples::default();
/// samples.extend_from(&[1.0, 0.0], &[0.5, 0.25]);
/// assert_eq!(samples.len(), 2);
/// assert_eq!(samples.to_interleaved(), vec![1.0, 0.5, 0.0, 0.25]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StereoSamples {
    /// Left channel samples.
    pub left: Vec<f32>,
    /// Right channel samples.
    pub right: Vec<f32>,
}

impl StereoSamples {
    /// Create new stereo samples from left and right channels.
    pub fn new(left: Vec<f32>, right: Vec<f32>) -> Self {
        debug_assert_eq!(left.len(), right.len(), "Channels must have same length");
        Self { left, right }
    }

    /// Get the number of samples per channel.
    pub fn len(&self) -> usize {
        self.left.len()
    }

    /// Check if the buffers are empty.
    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    /// Appends a block. Both slices must have the same length.
    pub fn extend_from(&mut self, left: &[f32], right: &[f32]) {
        debug_assert_eq!(left.len(), right.len(), "Channels must have same length");
        self.left.extend_from_slice(left);
        self.right.extend_from_slice(right);
    }

    /// Largest absolute sample value across both channels.
    pub fn peak(&self) -> f32 {
        self.left
            .iter()
            .chain(self.right.iter())
            .fold(0.0f32, |peak, s| peak.max(s.abs()))
    }

    /// Convert to interleaved format (L, R, L, R, ...).
    pub fn to_interleaved(&self) -> Vec<f32> {
        let mut interleaved = Vec::with_capacity(self.left.len() * 2);
        for (l, r) in self.left.iter().zip(self.right.iter()) {
            interleaved.push(*l);
            interleaved.push(*r);
        }
        interleaved
    }

    /// Create from interleaved format (L, R, L, R, ...).
    pub fn from_interleaved(interleaved: &[f32]) -> Self {
        let len = interleaved.len() / 2;
        let mut left = Vec::with_capacity(len);
        let mut right = Vec::with_capacity(len);

        for chunk in interleaved.chunks_exact(2) {
            left.push(chunk[0]);
            right.push(chunk[1]);
        }

        Self { left, right }
    }
}
