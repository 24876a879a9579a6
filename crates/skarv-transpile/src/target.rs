//! Device targets: basis gate sets and qubit connectivity.

use std::fmt;

use petgraph::graph::{NodeIndex, UnGraph};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// The set of gate names a device (or a transpile call) accepts natively.
///
/// Measurement, reset, and barrier are always accepted and never listed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BasisGates {
    names: FxHashSet<String>,
}

impl BasisGates {
    /// Build a basis from gate names.
    pub fn new(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Check whether a gate name is in the basis.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Number of gate names in the basis.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check whether the basis is empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate over the gate names in sorted order.
    pub fn iter_sorted(&self) -> impl Iterator<Item = &str> {
        let mut names: Vec<&str> = self.names.iter().map(String::as_str).collect();
        names.sort_unstable();
        names.into_iter()
    }
}

impl fmt::Display for BasisGates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for name in self.iter_sorted() {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{name}")?;
            first = false;
        }
        Ok(())
    }
}

impl<S: Into<String>> FromIterator<S> for BasisGates {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self::new(iter)
    }
}

/// Qubit connectivity of a device, as an undirected graph.
#[derive(Debug, Clone)]
pub struct CouplingGraph {
    graph: UnGraph<u32, ()>,
}

impl CouplingGraph {
    /// Build a coupling graph over `num_qubits` qubits from an edge list.
    pub fn new(num_qubits: u32, edges: impl IntoIterator<Item = (u32, u32)>) -> Self {
        let mut graph = UnGraph::new_undirected();
        for i in 0..num_qubits {
            graph.add_node(i);
        }
        for (a, b) in edges {
            let (a, b) = (NodeIndex::new(a as usize), NodeIndex::new(b as usize));
            if graph.find_edge(a, b).is_none() {
                graph.add_edge(a, b, ());
            }
        }
        Self { graph }
    }

    /// Number of qubits on the device.
    pub fn num_qubits(&self) -> u32 {
        self.graph.node_count() as u32
    }

    /// Number of couplings.
    pub fn num_edges(&self) -> usize {
        self.graph.edge_count()
    }

    /// Check whether two qubits are directly coupled.
    pub fn are_connected(&self, a: u32, b: u32) -> bool {
        self.graph
            .find_edge(NodeIndex::new(a as usize), NodeIndex::new(b as usize))
            .is_some()
    }

    /// Degree of a qubit (number of neighbors).
    pub fn degree(&self, qubit: u32) -> usize {
        self.graph.neighbors(NodeIndex::new(qubit as usize)).count()
    }
}

/// A transpilation target: a named device with connectivity and a native
/// gate set.
#[derive(Debug, Clone)]
pub struct Target {
    name: String,
    coupling: CouplingGraph,
    basis: BasisGates,
}

impl Target {
    /// Build a target from its parts.
    pub fn new(name: impl Into<String>, coupling: CouplingGraph, basis: BasisGates) -> Self {
        Self {
            name: name.into(),
            coupling,
            basis,
        }
    }

    /// A 20-qubit mock device with grid-and-diagonals connectivity,
    /// modeled on the IBM Tokyo layout.
    pub fn tokyo() -> Self {
        let edges = [
            (0, 1),
            (1, 2),
            (2, 3),
            (3, 4),
            (0, 5),
            (1, 6),
            (1, 7),
            (2, 6),
            (2, 7),
            (3, 8),
            (3, 9),
            (4, 8),
            (4, 9),
            (5, 6),
            (5, 10),
            (5, 11),
            (6, 10),
            (6, 11),
            (7, 12),
            (7, 13),
            (8, 12),
            (8, 13),
            (9, 14),
            (10, 15),
            (11, 16),
            (11, 17),
            (12, 16),
            (12, 17),
            (13, 18),
            (13, 19),
            (14, 18),
            (14, 19),
            (15, 16),
            (16, 17),
            (17, 18),
            (18, 19),
        ];
        Self::new(
            "tokyo",
            CouplingGraph::new(20, edges),
            BasisGates::new(["id", "u1", "u2", "u3", "cx"]),
        )
    }

    /// The target's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of qubits on the target.
    pub fn num_qubits(&self) -> u32 {
        self.coupling.num_qubits()
    }

    /// The target's coupling graph.
    pub fn coupling(&self) -> &CouplingGraph {
        &self.coupling
    }

    /// The target's native gate set.
    pub fn basis(&self) -> &BasisGates {
        &self.basis
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basis_contains() {
        let basis = BasisGates::new(["u3", "cx"]);
        assert!(basis.contains("u3"));
        assert!(basis.contains("cx"));
        assert!(!basis.contains("h"));
        assert_eq!(basis.len(), 2);
    }

    #[test]
    fn test_basis_display_sorted() {
        let basis = BasisGates::new(["u3", "cx", "id"]);
        assert_eq!(basis.to_string(), "cx, id, u3");
    }

    #[test]
    fn test_coupling_symmetric() {
        let coupling = CouplingGraph::new(3, [(0, 1), (1, 2)]);
        assert!(coupling.are_connected(0, 1));
        assert!(coupling.are_connected(1, 0));
        assert!(!coupling.are_connected(0, 2));
    }

    #[test]
    fn test_coupling_dedups_edges() {
        let coupling = CouplingGraph::new(2, [(0, 1), (1, 0), (0, 1)]);
        assert_eq!(coupling.num_edges(), 1);
    }

    #[test]
    fn test_tokyo_shape() {
        let target = Target::tokyo();
        assert_eq!(target.name(), "tokyo");
        assert_eq!(target.num_qubits(), 20);
        assert_eq!(target.coupling().num_edges(), 36);
        assert!(target.basis().contains("cx"));
        assert!(target.basis().contains("u3"));
        assert!(!target.basis().contains("h"));
    }

    #[test]
    fn test_tokyo_row_connectivity() {
        let target = Target::tokyo();
        for i in 0..4 {
            assert!(target.coupling().are_connected(i, i + 1));
        }
        assert!(!target.coupling().are_connected(4, 5));
    }
}
