//! Device connectivity graph.
//!
//! A [`Connectivity`] lists which pairs of physical qubits may host a
//! two-qubit native gate. It is built once per device and shared read-only
//! by every pass of a transpilation run.
//!
//! ## Performance
//!
//! On construction, all-pairs distance and predecessor matrices are computed
//! with one BFS per node. `distance()` is O(1) and `shortest_path()` is
//! O(distance).
//!
//! ## Tie-breaking
//!
//! Adjacency lists are sorted and BFS visits neighbors in ascending order,
//! keeping the first discovery. Among equally short paths, the one through
//! the lowest physical indices wins.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::error::{CompileError, CompileResult};

const UNREACHABLE: u32 = u32::MAX;

/// Undirected coupling graph over physical qubits `0..num_qubits`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ConnectivityRepr", into = "ConnectivityRepr")]
pub struct Connectivity {
    num_qubits: u32,
    /// Normalized `(low, high)` edges in insertion order.
    edges: Vec<(u32, u32)>,
    /// Sorted neighbor lists.
    adjacency: Vec<Vec<u32>>,
    /// `dist[from][to]`, or `UNREACHABLE`.
    dist: Vec<Vec<u32>>,
    /// `pred[from][to]`: the node before `to` on the BFS path from `from`.
    pred: Vec<Vec<u32>>,
}

/// Serialized form: the qubit count and edge list only.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConnectivityRepr {
    num_qubits: u32,
    edges: Vec<(u32, u32)>,
}

impl TryFrom<ConnectivityRepr> for Connectivity {
    type Error = CompileError;

    fn try_from(repr: ConnectivityRepr) -> CompileResult<Self> {
        Self::from_edges(repr.num_qubits, repr.edges)
    }
}

impl From<Connectivity> for ConnectivityRepr {
    fn from(c: Connectivity) -> Self {
        Self {
            num_qubits: c.num_qubits,
            edges: c.edges,
        }
    }
}

impl Connectivity {
    /// Build a graph from an edge list. Duplicate edges (in either
    /// direction) are merged; self-loops and out-of-range endpoints fail.
    pub fn from_edges(
        num_qubits: u32,
        edges: impl IntoIterator<Item = (u32, u32)>,
    ) -> CompileResult<Self> {
        let n = num_qubits as usize;
        let mut adjacency = vec![Vec::new(); n];
        let mut normalized = Vec::new();

        for (a, b) in edges {
            if a >= num_qubits || b >= num_qubits {
                return Err(CompileError::InvalidConnectivity(format!(
                    "edge ({a}, {b}) out of range for {num_qubits} qubits"
                )));
            }
            if a == b {
                return Err(CompileError::InvalidConnectivity(format!(
                    "self-loop on qubit {a}"
                )));
            }
            let edge = (a.min(b), a.max(b));
            if normalized.contains(&edge) {
                continue;
            }
            normalized.push(edge);
            adjacency[a as usize].push(b);
            adjacency[b as usize].push(a);
        }
        for list in &mut adjacency {
            list.sort_unstable();
        }

        let mut graph = Self {
            num_qubits,
            edges: normalized,
            adjacency,
            dist: vec![],
            pred: vec![],
        };
        graph.precompute_distances();
        Ok(graph)
    }

    /// All-pairs BFS.
    fn precompute_distances(&mut self) {
        let n = self.num_qubits as usize;
        self.dist = vec![vec![UNREACHABLE; n]; n];
        self.pred = vec![vec![UNREACHABLE; n]; n];

        for src in 0..n {
            self.dist[src][src] = 0;
            let mut queue = VecDeque::new();
            queue.push_back(src);

            while let Some(cur) = queue.pop_front() {
                for &neighbor in &self.adjacency[cur] {
                    let nb = neighbor as usize;
                    if self.dist[src][nb] == UNREACHABLE {
                        self.dist[src][nb] = self.dist[src][cur] + 1;
                        self.pred[src][nb] = cur as u32;
                        queue.push_back(nb);
                    }
                }
            }
        }
    }

    // =========================================================================
    // Constructors
    // =========================================================================

    /// Star graph: center `n / 2` coupled to every other qubit.
    pub fn star(n: u32) -> Self {
        let center = n / 2;
        Self::from_known_edges(n, (0..n).filter(|&i| i != center).map(|i| (center, i)))
    }

    /// Linear chain `0-1-2-...`.
    pub fn line(n: u32) -> Self {
        Self::from_known_edges(n, (1..n).map(|i| (i - 1, i)))
    }

    /// Ring `0-1-...-(n-1)-0`.
    pub fn cycle(n: u32) -> Self {
        let closing = (n > 2).then(|| (0, n - 1));
        Self::from_known_edges(n, (1..n).map(|i| (i - 1, i)).chain(closing))
    }

    /// All-to-all coupling.
    pub fn complete(n: u32) -> Self {
        Self::from_known_edges(n, (0..n).flat_map(|i| ((i + 1)..n).map(move |j| (i, j))))
    }

    /// `rows x cols` lattice, qubit `r * cols + c`.
    pub fn grid(rows: u32, cols: u32) -> Self {
        let mut edges = Vec::new();
        for r in 0..rows {
            for c in 0..cols {
                let q = r * cols + c;
                if c + 1 < cols {
                    edges.push((q, q + 1));
                }
                if r + 1 < rows {
                    edges.push((q, q + cols));
                }
            }
        }
        Self::from_known_edges(rows * cols, edges)
    }

    /// The 20-qubit IQM square-lattice device (30 couplers).
    pub fn iqm20() -> Self {
        const EDGES: [(u32, u32); 30] = [
            (0, 1),
            (0, 3),
            (2, 3),
            (1, 4),
            (3, 4),
            (4, 5),
            (9, 10),
            (5, 6),
            (6, 11),
            (10, 11),
            (11, 16),
            (15, 16),
            (15, 19),
            (14, 15),
            (18, 19),
            (10, 15),
            (14, 18),
            (17, 18),
            (13, 17),
            (13, 14),
            (12, 13),
            (9, 14),
            (8, 13),
            (7, 12),
            (8, 9),
            (7, 8),
            (2, 7),
            (5, 10),
            (4, 9),
            (3, 8),
        ];
        Self::from_known_edges(20, EDGES)
    }

    /// Constructor for edge lists that are in range by construction.
    fn from_known_edges(n: u32, edges: impl IntoIterator<Item = (u32, u32)>) -> Self {
        let mut adjacency = vec![Vec::new(); n as usize];
        let mut normalized = Vec::new();
        for (a, b) in edges {
            normalized.push((a.min(b), a.max(b)));
            adjacency[a as usize].push(b);
            adjacency[b as usize].push(a);
        }
        for list in &mut adjacency {
            list.sort_unstable();
        }
        let mut graph = Self {
            num_qubits: n,
            edges: normalized,
            adjacency,
            dist: vec![],
            pred: vec![],
        };
        graph.precompute_distances();
        graph
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Number of physical qubits.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// The coupling edges, each as `(low, high)`.
    pub fn edges(&self) -> &[(u32, u32)] {
        &self.edges
    }

    /// Neighbors of `qubit` in ascending order.
    pub fn neighbors(&self, qubit: u32) -> &[u32] {
        self.adjacency
            .get(qubit as usize)
            .map_or(&[], Vec::as_slice)
    }

    /// Degree of `qubit`.
    pub fn degree(&self, qubit: u32) -> usize {
        self.neighbors(qubit).len()
    }

    /// Check if two qubits are directly coupled.
    #[inline]
    pub fn is_connected(&self, q1: u32, q2: u32) -> bool {
        self.neighbors(q1).binary_search(&q2).is_ok()
    }

    /// Shortest-path distance, `None` if unreachable or out of range.
    pub fn distance(&self, from: u32, to: u32) -> Option<u32> {
        let d = *self.dist.get(from as usize)?.get(to as usize)?;
        (d != UNREACHABLE).then_some(d)
    }

    /// Shortest path `from ..= to` with lowest-index tie-breaking, `None`
    /// if the qubits are disconnected.
    pub fn shortest_path(&self, from: u32, to: u32) -> Option<Vec<u32>> {
        self.distance(from, to)?;
        let row = &self.pred[from as usize];
        let mut path = vec![to];
        let mut current = to;
        while current != from {
            current = row[current as usize];
            path.push(current);
        }
        path.reverse();
        Some(path)
    }

    /// True if every qubit can reach every other qubit.
    pub fn is_fully_connected(&self) -> bool {
        self.dist
            .first()
            .is_none_or(|row| row.iter().all(|d| *d != UNREACHABLE))
    }

    /// The hub of a star graph, `None` if this graph is not a star.
    ///
    /// For two qubits either end qualifies and `n / 2` is reported, matching
    /// [`Connectivity::star`].
    pub fn center(&self) -> Option<u32> {
        let n = self.num_qubits;
        if n < 2 || self.edges.len() != (n - 1) as usize {
            return None;
        }
        let hubs: Vec<u32> = (0..n)
            .filter(|&q| self.degree(q) == (n - 1) as usize)
            .collect();
        if hubs.contains(&(n / 2)) {
            Some(n / 2)
        } else {
            hubs.first().copied()
        }
    }
}

/// Star connectivity on `n` qubits with center `n / 2`.
pub fn star_connectivity(n: u32) -> Connectivity {
    Connectivity::star(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line() {
        let map = Connectivity::line(5);
        assert!(map.is_connected(0, 1));
        assert!(map.is_connected(1, 0));
        assert!(!map.is_connected(0, 2));
        assert_eq!(map.distance(0, 4), Some(4));
        assert_eq!(map.shortest_path(0, 3), Some(vec![0, 1, 2, 3]));
    }

    #[test]
    fn test_star() {
        let map = star_connectivity(5);
        assert_eq!(map.edges().len(), 4);
        assert_eq!(map.center(), Some(2));
        assert!(map.is_connected(2, 0));
        assert!(!map.is_connected(0, 1));
        assert_eq!(map.distance(0, 4), Some(2));
        assert_eq!(map.shortest_path(0, 4), Some(vec![0, 2, 4]));
    }

    #[test]
    fn test_center_rejects_non_star() {
        assert_eq!(Connectivity::line(4).center(), None);
        assert_eq!(Connectivity::cycle(4).center(), None);
        assert_eq!(Connectivity::line(3).center(), Some(1));
        assert_eq!(Connectivity::star(2).center(), Some(1));
    }

    #[test]
    fn test_shortest_path_lowest_index_tie() {
        // 0 reaches 3 through 1 or 2; 1 must win.
        let map = Connectivity::from_edges(4, [(0, 2), (0, 1), (1, 3), (2, 3)]).unwrap();
        assert_eq!(map.shortest_path(0, 3), Some(vec![0, 1, 3]));
        assert_eq!(map.neighbors(0), &[1, 2]);
    }

    #[test]
    fn test_grid() {
        let map = Connectivity::grid(3, 4);
        assert_eq!(map.num_qubits(), 12);
        assert_eq!(map.edges().len(), 3 * 3 + 2 * 4);
        assert!(map.is_connected(0, 4));
        assert!(!map.is_connected(3, 4));
        assert_eq!(map.distance(0, 11), Some(5));
    }

    #[test]
    fn test_complete_and_cycle() {
        let full = Connectivity::complete(5);
        assert_eq!(full.edges().len(), 10);
        assert_eq!(full.distance(0, 4), Some(1));

        let ring = Connectivity::cycle(6);
        assert_eq!(ring.edges().len(), 6);
        assert_eq!(ring.distance(0, 5), Some(1));
        assert_eq!(ring.distance(0, 3), Some(3));
    }

    #[test]
    fn test_iqm20() {
        let map = Connectivity::iqm20();
        assert_eq!(map.num_qubits(), 20);
        assert_eq!(map.edges().len(), 30);
        assert!(map.is_fully_connected());
    }

    #[test]
    fn test_from_edges_validation() {
        assert!(matches!(
            Connectivity::from_edges(3, [(0, 3)]),
            Err(CompileError::InvalidConnectivity(_))
        ));
        assert!(matches!(
            Connectivity::from_edges(3, [(1, 1)]),
            Err(CompileError::InvalidConnectivity(_))
        ));
        let dedup = Connectivity::from_edges(3, [(0, 1), (1, 0), (1, 2)]).unwrap();
        assert_eq!(dedup.edges(), &[(0, 1), (1, 2)]);
    }

    #[test]
    fn test_disconnected() {
        let map = Connectivity::from_edges(4, [(0, 1), (2, 3)]).unwrap();
        assert!(!map.is_fully_connected());
        assert_eq!(map.distance(0, 3), None);
        assert_eq!(map.shortest_path(1, 2), None);
    }

    #[test]
    fn test_serde_rebuilds_caches() {
        let map = Connectivity::grid(2, 3);
        let json = serde_json::to_string(&map).unwrap();
        assert!(!json.contains("dist"));
        let back: Connectivity = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
        assert_eq!(back.distance(0, 5), Some(3));

        let bad = r#"{"num_qubits": 2, "edges": [[0, 5]]}"#;
        assert!(serde_json::from_str::<Connectivity>(bad).is_err());
    }
}
