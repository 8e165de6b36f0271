//! Structural statistics over the directed graph
//!
//! All functions are linear in the size of the graph.

use petgraph::algo::connected_components;
use serde::{Deserialize, Serialize};

use crate::graph::Graph;

/// Overview numbers shown at the top of the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphStatistics {
    pub nodes: usize,
    pub edges: usize,
    pub density: f64,
    pub is_connected: bool,
}

impl GraphStatistics {
    pub fn compute(graph: &Graph) -> Self {
        Self {
            nodes: node_count(graph),
            edges: edge_count(graph),
            density: density(graph),
            is_connected: is_weakly_connected(graph),
        }
    }
}

pub fn node_count(graph: &Graph) -> usize {
    graph.node_count()
}

pub fn edge_count(graph: &Graph) -> usize {
    graph.edge_count()
}

/// Directed density `E / (N * (N - 1))`, or 0 with fewer than two nodes
pub fn density(graph: &Graph) -> f64 {
    let n = graph.node_count();
    if n < 2 {
        return 0.0;
    }
    graph.edge_count() as f64 / (n * (n - 1)) as f64
}

/// Whether the undirected projection forms a single component
///
/// An empty graph is not connected.
pub fn is_weakly_connected(graph: &Graph) -> bool {
    if graph.is_empty() {
        return false;
    }
    // Union-find over edges ignores direction on a directed graph.
    connected_components(graph.inner()) == 1
}
