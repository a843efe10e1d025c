//! Graph construction, topological sorting and block processing.

use core::fmt;

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use super::node::{Inputs, NodeId, PortRef, Unit};

/// Errors that can occur while wiring a graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// The specified node was not added to this builder.
    NodeNotFound(NodeId),
    /// A port index is outside the node's declared port count.
    PortOutOfRange {
        /// Node owning the port.
        node: NodeId,
        /// Requested port index.
        port: usize,
        /// Ports the node declares in that direction.
        available: usize,
    },
    /// The input port already has a source; inputs take one connection.
    InputAlreadyConnected {
        /// Node owning the input.
        node: NodeId,
        /// Input port index.
        port: usize,
    },
    /// The connections form a cycle, so no processing order exists.
    CycleDetected,
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NodeNotFound(id) => write!(f, "node {id} not found"),
            Self::PortOutOfRange {
                node,
                port,
                available,
            } => write!(
                f,
                "port {port} out of range for {node} ({available} available)"
            ),
            Self::InputAlreadyConnected { node, port } => {
                write!(f, "input {port} of {node} is already connected")
            }
            Self::CycleDetected => write!(f, "connections form a cycle"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for GraphError {}

#[derive(Debug, Clone, Copy)]
struct Connection {
    from: NodeId,
    output: usize,
    to: NodeId,
    input: usize,
}

/// Collects units and connections before they are frozen into a [`Graph`].
///
/// # Example
///
/// ```rust
/// use osc3x_core::{GraphBuilder, Inputs, Unit};
///
/// struct Constant(f32);
///
/// impl Unit for Constant {
///     fn input_count(&self) -> usize { 0 }
///     fn output_count(&self) -> usize { 1 }
///     fn process(&mut self, _: &Inputs<'_>, outputs: &mut [Vec<f32>], frames: usize) {
///         outputs[0][..frames].fill(self.0);
///     }
/// }
///
/// struct Double;
///
/// impl Unit for Double {
///     fn input_count(&self) -> usize { 1 }
///     fn output_count(&self) -> usize { 1 }
///     fn process(&mut self, inputs: &Inputs<'_>, outputs: &mut [Vec<f32>], frames: usize) {
///         for i in 0..frames {
///             outputs[0][i] = 2.0 * inputs.sample(0, i);
///         }
///     }
/// }
///
/// enum Node { Constant(Constant), Double(Double) }
///
/// impl Unit for Node {
///     fn input_count(&self) -> usize {
///         match self { Node::Constant(u) => u.input_count(), Node::Double(u) => u.input_count() }
///     }
///     fn output_count(&self) -> usize {
///         match self { Node::Constant(u) => u.output_count(), Node::Double(u) => u.output_count() }
///     }
///     fn process(&mut self, inputs: &Inputs<'_>, outputs: &mut [Vec<f32>], frames: usize) {
///         match self {
///             Node::Constant(u) => u.process(inputs, outputs, frames),
///             Node::Double(u) => u.process(inputs, outputs, frames),
///         }
///     }
/// }
///
/// let mut builder = GraphBuilder::new();
/// let double = builder.add(Node::Double(Double));
/// let source = builder.add(Node::Constant(Constant(0.25)));
/// builder.connect(source, 0, double, 0).unwrap();
///
/// let mut graph = builder.build(64).unwrap();
/// graph.process(8);
/// assert_eq!(graph.output(double, 0).unwrap(), &[0.5; 8]);
/// ```
pub struct GraphBuilder<U: Unit> {
    units: Vec<U>,
    connections: Vec<Connection>,
}

impl<U: Unit> GraphBuilder<U> {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self {
            units: Vec::new(),
            connections: Vec::new(),
        }
    }

    /// Adds a unit and returns its ID.
    pub fn add(&mut self, unit: U) -> NodeId {
        let id = NodeId(self.units.len() as u32);
        self.units.push(unit);
        id
    }

    /// Number of units added so far.
    pub fn node_count(&self) -> usize {
        self.units.len()
    }

    /// Connects output `output` of `from` to input `input` of `to`.
    ///
    /// An output may feed any number of inputs; an input accepts exactly one
    /// source. A node connected to itself is rejected as a cycle here, longer
    /// cycles are caught by [`build`](Self::build).
    pub fn connect(
        &mut self,
        from: NodeId,
        output: usize,
        to: NodeId,
        input: usize,
    ) -> Result<(), GraphError> {
        let source = self.unit(from)?;
        if output >= source.output_count() {
            return Err(GraphError::PortOutOfRange {
                node: from,
                port: output,
                available: source.output_count(),
            });
        }
        let target = self.unit(to)?;
        if input >= target.input_count() {
            return Err(GraphError::PortOutOfRange {
                node: to,
                port: input,
                available: target.input_count(),
            });
        }
        if self
            .connections
            .iter()
            .any(|c| c.to == to && c.input == input)
        {
            return Err(GraphError::InputAlreadyConnected {
                node: to,
                port: input,
            });
        }
        if from == to {
            return Err(GraphError::CycleDetected);
        }

        self.connections.push(Connection {
            from,
            output,
            to,
            input,
        });
        Ok(())
    }

    /// Sorts the units into processing order and allocates one buffer of
    /// `max_block` samples per output port.
    pub fn build(self, max_block: usize) -> Result<Graph<U>, GraphError> {
        let order = self.kahn_sort()?;
        let n = self.units.len();

        let mut slot_of = vec![0usize; n];
        for (slot, &node) in order.iter().enumerate() {
            slot_of[node] = slot;
        }

        let mut pending: Vec<Option<U>> = self.units.into_iter().map(Some).collect();
        let mut units = Vec::with_capacity(n);
        let mut ids = Vec::with_capacity(n);
        let mut buffers = Vec::with_capacity(n);
        let mut sources = Vec::with_capacity(n);

        for &node in &order {
            let Some(unit) = pending[node].take() else {
                continue;
            };
            let mut inputs = vec![None; unit.input_count()];
            for c in self.connections.iter().filter(|c| c.to.0 as usize == node) {
                inputs[c.input] = Some(PortRef {
                    slot: slot_of[c.from.0 as usize],
                    port: c.output,
                });
            }
            buffers.push(vec![vec![0.0; max_block]; unit.output_count()]);
            sources.push(inputs);
            ids.push(NodeId(node as u32));
            units.push(unit);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            nodes = units.len(),
            connections = self.connections.len(),
            max_block,
            "graph built"
        );

        Ok(Graph {
            units,
            ids,
            buffers,
            sources,
            slot_of,
            max_block,
            frames: 0,
        })
    }

    fn unit(&self, id: NodeId) -> Result<&U, GraphError> {
        self.units
            .get(id.0 as usize)
            .ok_or(GraphError::NodeNotFound(id))
    }

    /// Kahn's algorithm. Among ready nodes the lowest ID goes first, so the
    /// order is deterministic.
    fn kahn_sort(&self) -> Result<Vec<usize>, GraphError> {
        let n = self.units.len();
        let mut in_degree = vec![0u32; n];
        for c in &self.connections {
            in_degree[c.to.0 as usize] += 1;
        }

        // Stack popped from the back; keep it sorted descending.
        let mut ready: Vec<usize> = (0..n).rev().filter(|&i| in_degree[i] == 0).collect();
        let mut sorted = Vec::with_capacity(n);

        while let Some(idx) = ready.pop() {
            sorted.push(idx);
            for c in self.connections.iter().filter(|c| c.from.0 as usize == idx) {
                let to = c.to.0 as usize;
                in_degree[to] -= 1;
                if in_degree[to] == 0 {
                    let at = ready.partition_point(|&r| r > to);
                    ready.insert(at, to);
                }
            }
        }

        if sorted.len() != n {
            return Err(GraphError::CycleDetected);
        }
        Ok(sorted)
    }
}

impl<U: Unit> Default for GraphBuilder<U> {
    fn default() -> Self {
        Self::new()
    }
}

/// A static signal graph: units stored in topological order, each with
/// preallocated output buffers.
///
/// The topology is fixed at [`GraphBuilder::build`]. Units can still be
/// reached through [`unit_mut`](Self::unit_mut) to change their parameters
/// between blocks. Processing never allocates.
pub struct Graph<U: Unit> {
    units: Vec<U>,
    ids: Vec<NodeId>,
    buffers: Vec<Vec<Vec<f32>>>,
    sources: Vec<Vec<Option<PortRef>>>,
    slot_of: Vec<usize>,
    max_block: usize,
    frames: usize,
}

impl<U: Unit> Graph<U> {
    /// Renders `frames` samples through every unit in order.
    ///
    /// `frames` is capped at the block size given to
    /// [`build`](GraphBuilder::build).
    pub fn process(&mut self, frames: usize) {
        debug_assert!(frames <= self.max_block, "block larger than graph buffers");
        let frames = frames.min(self.max_block);

        for slot in 0..self.units.len() {
            let (upstream, rest) = self.buffers.split_at_mut(slot);
            let inputs = Inputs {
                sources: &self.sources[slot],
                upstream,
                frames,
            };
            self.units[slot].process(&inputs, &mut rest[0], frames);
        }
        self.frames = frames;
    }

    /// Samples written to output `port` of `id` by the last
    /// [`process`](Self::process) call.
    pub fn output(&self, id: NodeId, port: usize) -> Option<&[f32]> {
        let slot = *self.slot_of.get(id.0 as usize)?;
        let buffer = self.buffers[slot].get(port)?;
        Some(&buffer[..self.frames])
    }

    /// Shared access to a unit.
    pub fn unit(&self, id: NodeId) -> Option<&U> {
        let slot = *self.slot_of.get(id.0 as usize)?;
        self.units.get(slot)
    }

    /// Mutable access to a unit, for parameter changes between blocks.
    pub fn unit_mut(&mut self, id: NodeId) -> Option<&mut U> {
        let slot = *self.slot_of.get(id.0 as usize)?;
        self.units.get_mut(slot)
    }

    /// Node IDs in processing order.
    pub fn processing_order(&self) -> &[NodeId] {
        &self.ids
    }

    /// Number of units.
    pub fn node_count(&self) -> usize {
        self.units.len()
    }

    /// Largest block [`process`](Self::process) accepts.
    pub fn max_block(&self) -> usize {
        self.max_block
    }
}
