//! Graph data structures for the exported knowledge graph
//!
//! Uses `petgraph::DiGraph` with a key → index map on the side. Nodes are
//! never removed, so node indices stay dense and follow insertion order,
//! which is the tie-break order every ranking relies on.

use std::collections::{HashMap, HashSet};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};

/// Open-ended node attributes, exactly as the store exported them
pub type Props = serde_json::Map<String, serde_json::Value>;

/// A node in the graph, identified by its store key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique key assigned by the graph store
    pub id: String,
    /// Attribute name → JSON value; empty for implicitly created nodes
    #[serde(default)]
    pub props: Props,
}

impl Node {
    /// Create a node without attributes
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            props: Props::new(),
        }
    }
}

/// A directed edge between two nodes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Relationship label, if the store provided one
    pub label: Option<String>,
}

/// The directed graph
///
/// Stores at most one edge per ordered `(from, to)` pair; adding a second
/// one replaces the label of the first.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    /// The underlying graph (private to enforce encapsulation)
    inner: DiGraph<Node, Edge>,

    /// Maps node keys to their NodeIndex for O(1) lookups
    index: HashMap<String, NodeIndex>,
}

impl Graph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node, replacing the attributes of an existing node with the same key
    ///
    /// A re-declared node keeps its index and its edges.
    pub fn upsert_node(&mut self, id: &str, props: Props) -> NodeIndex {
        match self.index.get(id) {
            Some(&idx) => {
                self.inner[idx].props = props;
                idx
            }
            None => {
                let idx = self.inner.add_node(Node {
                    id: id.to_string(),
                    props,
                });
                self.index.insert(id.to_string(), idx);
                idx
            }
        }
    }

    /// Return the index of `id`, creating it with empty attributes if missing
    pub fn ensure_node(&mut self, id: &str) -> NodeIndex {
        if let Some(&idx) = self.index.get(id) {
            return idx;
        }
        let idx = self.inner.add_node(Node::new(id));
        self.index.insert(id.to_string(), idx);
        idx
    }

    /// Add or replace the edge `from → to`
    ///
    /// Missing endpoints are created with empty attributes.
    pub fn upsert_edge(&mut self, from: &str, to: &str, label: Option<String>) {
        let a = self.ensure_node(from);
        let b = self.ensure_node(to);
        self.inner.update_edge(a, b, Edge { label });
    }

    /// Get the number of nodes in the graph
    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    /// Get the number of edges in the graph
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.node_count() == 0
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Find a node by its key
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&idx| &self.inner[idx])
    }

    /// Dense position of a node in insertion order
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).map(|idx| idx.index())
    }

    /// Key of the node at a dense position
    pub(crate) fn key_at(&self, position: usize) -> &str {
        &self.inner[NodeIndex::new(position)].id
    }

    /// Iterate over all nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.inner.node_weights()
    }

    /// Iterate over `(from, to, edge)` triples in insertion order
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, &Edge)> {
        self.inner.edge_references().map(|e| {
            (
                self.inner[e.source()].id.as_str(),
                self.inner[e.target()].id.as_str(),
                e.weight(),
            )
        })
    }

    /// Look up the edge `from → to`
    pub fn edge(&self, from: &str, to: &str) -> Option<&Edge> {
        let a = *self.index.get(from)?;
        let b = *self.index.get(to)?;
        self.inner.find_edge(a, b).map(|e| &self.inner[e])
    }

    pub fn in_degree(&self, id: &str) -> Option<usize> {
        self.index
            .get(id)
            .map(|&idx| self.inner.edges_directed(idx, Direction::Incoming).count())
    }

    pub fn out_degree(&self, id: &str) -> Option<usize> {
        self.index
            .get(id)
            .map(|&idx| self.inner.edges_directed(idx, Direction::Outgoing).count())
    }

    /// Build the dense adjacency view consumed by the analysis algorithms
    pub fn adjacency(&self) -> Adjacency {
        let n = self.node_count();
        let mut outgoing = vec![Vec::new(); n];
        let mut incoming = vec![Vec::new(); n];
        for e in self.inner.edge_references() {
            let (s, t) = (e.source().index(), e.target().index());
            outgoing[s].push(t);
            incoming[t].push(s);
        }
        Adjacency { outgoing, incoming }
    }

    pub(crate) fn inner(&self) -> &DiGraph<Node, Edge> {
        &self.inner
    }
}

/// Read-only adjacency lists indexed by node position
///
/// Neighbours appear in edge insertion order.
#[derive(Debug, Clone)]
pub struct Adjacency {
    pub outgoing: Vec<Vec<usize>>,
    pub incoming: Vec<Vec<usize>>,
}

impl Adjacency {
    pub fn len(&self) -> usize {
        self.outgoing.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outgoing.is_empty()
    }

    /// Undirected projection: each unordered pair once per side, self-loops once
    pub fn undirected(&self) -> Vec<Vec<usize>> {
        let mut neighbors: Vec<Vec<usize>> = vec![Vec::new(); self.len()];
        let mut seen = HashSet::new();
        for (u, outs) in self.outgoing.iter().enumerate() {
            for &v in outs {
                if !seen.insert((u.min(v), u.max(v))) {
                    continue;
                }
                neighbors[u].push(v);
                if u != v {
                    neighbors[v].push(u);
                }
            }
        }
        neighbors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(value: serde_json::Value) -> Props {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_upsert_node_overwrites_props() {
        let mut graph = Graph::new();
        graph.upsert_node("a", props(json!({"kind": "person"})));
        graph.upsert_node("a", props(json!({"age": 3})));

        assert_eq!(graph.node_count(), 1);
        let node = graph.node("a").unwrap();
        assert_eq!(node.props.get("age"), Some(&json!(3)));
        assert!(node.props.get("kind").is_none());
    }

    #[test]
    fn test_redeclared_node_keeps_position_and_edges() {
        let mut graph = Graph::new();
        graph.upsert_node("a", Props::new());
        graph.upsert_node("b", Props::new());
        graph.upsert_edge("a", "b", None);
        graph.upsert_node("a", props(json!({"x": true})));

        assert_eq!(graph.position("a"), Some(0));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_upsert_edge_creates_missing_endpoints() {
        let mut graph = Graph::new();
        graph.upsert_edge("x", "y", Some("knows".into()));

        assert_eq!(graph.node_count(), 2);
        assert!(graph.node("x").unwrap().props.is_empty());
        assert!(graph.node("y").unwrap().props.is_empty());
    }

    #[test]
    fn test_duplicate_edge_replaces_label() {
        let mut graph = Graph::new();
        graph.upsert_edge("a", "b", Some("first".into()));
        graph.upsert_edge("a", "b", Some("second".into()));

        assert_eq!(graph.edge_count(), 1);
        assert_eq!(
            graph.edge("a", "b").unwrap().label.as_deref(),
            Some("second")
        );
    }

    #[test]
    fn test_reverse_edge_is_distinct() {
        let mut graph = Graph::new();
        graph.upsert_edge("a", "b", None);
        graph.upsert_edge("b", "a", None);

        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.in_degree("a"), Some(1));
        assert_eq!(graph.out_degree("a"), Some(1));
    }

    #[test]
    fn test_self_loop_counts_both_directions() {
        let mut graph = Graph::new();
        graph.upsert_edge("a", "a", None);

        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.in_degree("a"), Some(1));
        assert_eq!(graph.out_degree("a"), Some(1));
    }

    #[test]
    fn test_degree_of_unknown_node() {
        let graph = Graph::new();
        assert_eq!(graph.in_degree("ghost"), None);
        assert!(graph.is_empty());
    }

    #[test]
    fn test_adjacency_follows_insertion_order() {
        let mut graph = Graph::new();
        graph.upsert_edge("a", "c", None);
        graph.upsert_edge("a", "b", None);
        graph.upsert_edge("b", "c", None);

        let adj = graph.adjacency();
        let (a, b, c) = (0, 2, 1);
        assert_eq!(graph.key_at(c), "c");
        assert_eq!(adj.outgoing[a], vec![c, b]);
        assert_eq!(adj.incoming[c], vec![a, b]);
    }

    #[test]
    fn test_undirected_projection_merges_directions() {
        let mut graph = Graph::new();
        graph.upsert_edge("a", "b", None);
        graph.upsert_edge("b", "a", None);
        graph.upsert_edge("b", "b", None);

        let undirected = graph.adjacency().undirected();
        assert_eq!(undirected[0], vec![1]);
        assert_eq!(undirected[1], vec![0, 1]);
    }
}
