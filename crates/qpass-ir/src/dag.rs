//! Instruction dependency graph.
//!
//! Node `i` of a [`DependencyDag`] is instruction `i` of the circuit it was
//! built from. An edge `a -> b` means `b` is the next instruction after `a`
//! on at least one shared qubit, so an instruction may run once all of its
//! predecessors have run. Routers drive their front layer from this graph.

use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex as PetNodeIndex};
use serde::{Deserialize, Serialize};

use crate::circuit::Circuit;
use crate::error::{IrError, IrResult};
use crate::qubit::QubitId;

/// Node index type for the dependency DAG.
pub type NodeIndex = PetNodeIndex<u32>;

/// An edge in the dependency DAG: the first qubit the two instructions share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DagEdge {
    /// The wire this edge follows.
    pub qubit: QubitId,
}

/// Dependency DAG over a circuit's instructions.
#[derive(Debug, Clone)]
pub struct DependencyDag {
    graph: DiGraph<usize, DagEdge, u32>,
}

impl DependencyDag {
    /// Build the dependency graph of `circuit`.
    pub fn from_circuit(circuit: &Circuit) -> Self {
        let instructions = circuit.instructions();
        let mut graph = DiGraph::with_capacity(instructions.len(), instructions.len() * 2);
        // Last node seen on each qubit wire.
        let mut wire_front: Vec<Option<NodeIndex>> = vec![None; circuit.num_qubits() as usize];

        for (idx, inst) in instructions.iter().enumerate() {
            let node = graph.add_node(idx);
            for &qubit in &inst.qubits {
                if let Some(prev) = wire_front[qubit.index()] {
                    if graph.find_edge(prev, node).is_none() {
                        graph.add_edge(prev, node, DagEdge { qubit });
                    }
                }
                wire_front[qubit.index()] = Some(node);
            }
        }

        Self { graph }
    }

    /// Number of nodes (instructions).
    pub fn num_nodes(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of dependency edges.
    pub fn num_edges(&self) -> usize {
        self.graph.edge_count()
    }

    /// Node of instruction `index`.
    #[inline]
    pub fn node(index: usize) -> NodeIndex {
        NodeIndex::new(index)
    }

    /// Instruction index held by `node`.
    #[inline]
    pub fn instruction_index(&self, node: NodeIndex) -> usize {
        self.graph[node]
    }

    /// Direct successors of `node`, in ascending instruction order.
    pub fn successors(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut succ: Vec<_> = self
            .graph
            .neighbors_directed(node, Direction::Outgoing)
            .collect();
        succ.sort_unstable();
        succ
    }

    /// Number of direct predecessors of `node`.
    pub fn in_degree(&self, node: NodeIndex) -> usize {
        self.graph
            .neighbors_directed(node, Direction::Incoming)
            .count()
    }

    /// Predecessor count of every node, indexed by instruction.
    pub fn predecessor_counts(&self) -> Vec<usize> {
        self.graph
            .node_indices()
            .map(|n| self.in_degree(n))
            .collect()
    }

    /// Nodes without predecessors, in instruction order.
    pub fn front_layer(&self) -> Vec<NodeIndex> {
        self.graph
            .node_indices()
            .filter(|n| self.in_degree(*n) == 0)
            .collect()
    }

    /// Instruction indices in a topological order.
    pub fn topological_order(&self) -> IrResult<Vec<usize>> {
        toposort(&self.graph, None)
            .map(|order| order.into_iter().map(|n| self.graph[n]).collect())
            .map_err(|cycle| {
                IrError::InvalidDag(format!(
                    "cycle through instruction {}",
                    self.graph[cycle.node_id()]
                ))
            })
    }

    /// Group instructions into layers: each layer holds instructions whose
    /// predecessors all sit in earlier layers.
    pub fn layers(&self) -> Vec<Vec<usize>> {
        let mut remaining = self.predecessor_counts();
        let mut current = self.front_layer();
        let mut layers = vec![];
        while !current.is_empty() {
            let mut next = vec![];
            for &node in &current {
                for succ in self.successors(node) {
                    remaining[succ.index()] -= 1;
                    if remaining[succ.index()] == 0 {
                        next.push(succ);
                    }
                }
            }
            layers.push(current.iter().map(|n| self.graph[*n]).collect());
            next.sort_unstable();
            next.dedup();
            current = next;
        }
        layers
    }

    /// Access the underlying graph.
    pub fn graph(&self) -> &DiGraph<usize, DagEdge, u32> {
        &self.graph
    }
}
