//! Static signal graphs built from typed units.
//!
//! A graph is assembled once with a [`GraphBuilder`]: add units, connect
//! output ports to input ports, then [`build`](GraphBuilder::build). Building
//! sorts the units topologically (Kahn's algorithm) and allocates every output
//! buffer up front. The resulting [`Graph`] is an arena indexed by [`NodeId`]
//! whose topology never changes; [`Graph::process`] runs each unit once per
//! block in dependency order without allocating.
//!
//! Ports are mono `f32` buffers. Stereo signals use two ports.
//!
//! # no_std Support
//!
//! This module is `no_std` compatible with `alloc`.

pub mod node;
mod processing;
pub mod stereo_samples;

pub use node::{Inputs, NodeId, Unit};
pub use processing::{Graph, GraphBuilder, GraphError};
pub use stereo_samples::StereoSamples;
