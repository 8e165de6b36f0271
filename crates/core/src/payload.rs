//! Wire payload of the graph store's `/export` endpoint and graph construction
//!
//! The store answers with:
//!
//! ```text
//! { "nodes": { "<id>": { "props": {...} }, ... },
//!   "edges": [ { "From": "<id>", "To": "<id>", "Label": "<string>" }, ... ] }
//! ```
//!
//! Node existence is the union of the declared nodes and every edge
//! endpoint: an edge may reference a key that `nodes` never declared, and
//! that node is created with empty attributes.

use std::str::FromStr;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::graph::{Graph, Props};

/// Errors raised while decoding an export payload
#[derive(Debug, Error)]
pub enum PayloadError {
    /// Body is not JSON, or lacks the `nodes`/`edges` keys
    #[error("malformed export payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// A node entry is not an object, or its `props` is not an object
    #[error("malformed node entry '{id}': {reason}")]
    InvalidNode { id: String, reason: &'static str },
}

/// One edge record as exported by the store
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EdgeRecord {
    #[serde(rename = "From")]
    pub from: String,
    #[serde(rename = "To")]
    pub to: String,
    #[serde(rename = "Label", default)]
    pub label: Option<String>,
}

/// The decoded `/export` body
///
/// `nodes` keeps the JSON object order, which becomes node insertion order.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportPayload {
    pub nodes: serde_json::Map<String, Value>,
    pub edges: Vec<EdgeRecord>,
}

impl ExportPayload {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, PayloadError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

impl FromStr for ExportPayload {
    type Err = PayloadError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Extract the attribute map of one node entry
fn node_props(id: &str, entry: &Value) -> Result<Props, PayloadError> {
    let object = entry.as_object().ok_or_else(|| PayloadError::InvalidNode {
        id: id.to_string(),
        reason: "entry is not an object",
    })?;

    match object.get("props") {
        None | Some(Value::Null) => Ok(Props::new()),
        Some(Value::Object(props)) => Ok(props.clone()),
        Some(_) => Err(PayloadError::InvalidNode {
            id: id.to_string(),
            reason: "props is not an object",
        }),
    }
}

/// Build a graph from a decoded payload
///
/// Declared nodes are inserted first, in payload order; edges follow and
/// create any endpoint that was not declared.
pub fn build_graph(payload: &ExportPayload) -> Result<Graph, PayloadError> {
    let mut graph = Graph::new();

    for (id, entry) in &payload.nodes {
        graph.upsert_node(id, node_props(id, entry)?);
    }

    let declared = graph.node_count();
    for edge in &payload.edges {
        graph.upsert_edge(&edge.from, &edge.to, edge.label.clone());
    }

    debug!(
        declared,
        implicit = graph.node_count() - declared,
        edges = graph.edge_count(),
        "built graph from export payload"
    );

    Ok(graph)
}

impl Graph {
    /// See [`build_graph`]
    pub fn from_payload(payload: &ExportPayload) -> Result<Graph, PayloadError> {
        build_graph(payload)
    }
}
