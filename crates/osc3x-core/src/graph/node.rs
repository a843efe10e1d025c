//! Graph node identity, the [`Unit`] trait, and input port access.

use core::fmt;

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Unique identifier for a node in a graph.
///
/// Node IDs are assigned sequentially by [`GraphBuilder::add`](super::GraphBuilder::add)
/// and stay valid in the [`Graph`](super::Graph) built from that builder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// An output port of an upstream node, resolved to its processing slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PortRef {
    pub slot: usize,
    pub port: usize,
}

/// A processing unit living in a [`Graph`](super::Graph).
///
/// Units declare a fixed number of mono input and output ports. On each
/// [`Graph::process`](super::Graph::process) call a unit reads its inputs
/// and fills the first `frames` samples of every output buffer.
pub trait Unit {
    /// Number of input ports.
    fn input_count(&self) -> usize;

    /// Number of output ports.
    fn output_count(&self) -> usize;

    /// Renders `frames` samples into `outputs` (one buffer per output port,
    /// each at least `frames` long).
    fn process(&mut self, inputs: &Inputs<'_>, outputs: &mut [Vec<f32>], frames: usize);
}

/// Read access to the buffers feeding a unit's input ports.
///
/// Only nodes earlier in processing order are visible, which is what the
/// topological sort guarantees for every connected source.
pub struct Inputs<'a> {
    pub(crate) sources: &'a [Option<PortRef>],
    pub(crate) upstream: &'a [Vec<Vec<f32>>],
    pub(crate) frames: usize,
}

impl<'a> Inputs<'a> {
    /// Number of input ports.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// True when the unit has no input ports.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// The samples arriving at input `port`, or `None` when nothing is
    /// connected to it. Unconnected inputs read as silence.
    pub fn port(&self, port: usize) -> Option<&'a [f32]> {
        let source = self.sources.get(port).copied().flatten()?;
        let buffer = self.upstream.get(source.slot)?.get(source.port)?;
        Some(&buffer[..self.frames])
    }

    /// Sample `index` of input `port`, 0.0 when unconnected.
    #[inline]
    pub fn sample(&self, port: usize, index: usize) -> f32 {
        self.port(port).map_or(0.0, |buffer| buffer[index])
    }
}
