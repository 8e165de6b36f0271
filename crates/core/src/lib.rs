//! Graph Analyzer Core Library
//!
//! This library builds an in-memory directed graph from a graph store
//! export and computes statistics, centrality rankings, communities and
//! shortest paths over it. The graph is built once and only read afterwards.

pub mod centrality;
pub mod community;
pub mod config;
pub mod graph;
pub mod paths;
pub mod payload;
pub mod report;
pub mod stats;

// Re-export commonly used types
pub use centrality::{CentralityKind, CentralityReport, Ranking};
pub use community::{detect_communities, Community};
pub use config::{AnalysisConfig, CentralityConfig, PageRankConfig};
pub use graph::{Edge, Graph, Node, Props};
pub use paths::find_paths;
pub use payload::{build_graph, ExportPayload, PayloadError};
pub use report::AnalysisReport;
pub use stats::GraphStatistics;
