//! Tuning parameters for the analysis pipeline
//!
//! Defaults reproduce the behaviour the export consumers expect: top-10
//! rankings, betweenness only below 1000 nodes, PageRank with damping 0.85.

/// PageRank power-iteration settings
#[derive(Debug, Clone, PartialEq)]
pub struct PageRankConfig {
    /// Damping factor (default: 0.85)
    pub damping: f64,
    /// Convergence tolerance per node (default: 1e-6)
    pub tolerance: f64,
    /// Maximum iterations before giving up (default: 100)
    pub max_iterations: usize,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self {
            damping: 0.85,
            tolerance: 1e-6,
            max_iterations: 100,
        }
    }
}

/// Centrality ranking settings
#[derive(Debug, Clone, PartialEq)]
pub struct CentralityConfig {
    /// Length of every ranking (default: 10)
    pub top_k: usize,
    /// Betweenness runs only when `node_count < betweenness_node_limit` (default: 1000)
    pub betweenness_node_limit: usize,
    pub pagerank: PageRankConfig,
}

impl Default for CentralityConfig {
    fn default() -> Self {
        Self {
            top_k: 10,
            betweenness_node_limit: 1000,
            pagerank: PageRankConfig::default(),
        }
    }
}

/// Settings for a whole analysis run
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub centrality: CentralityConfig,
    /// Communities listed individually in the text report (default: 5)
    pub report_community_limit: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            centrality: CentralityConfig::default(),
            report_community_limit: 5,
        }
    }
}
