//! Analysis report: text rendering and JSON export
//!
//! [`AnalysisReport::analyze`] runs every engine once; both renderings read
//! the same result.

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use tracing::info;

use crate::centrality::{analyze_centrality, CentralityKind, CentralityReport, Ranking};
use crate::community::{detect_communities, Community};
use crate::config::AnalysisConfig;
use crate::graph::Graph;
use crate::stats::GraphStatistics;

const RULE_WIDTH: usize = 60;

/// Everything computed for one graph
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub statistics: GraphStatistics,
    pub centrality: CentralityReport,
    pub communities: Vec<Community>,
    community_limit: usize,
}

/// The machine-readable export document
#[derive(Debug, Serialize)]
pub struct AnalysisDocument<'a> {
    pub statistics: &'a GraphStatistics,
    pub centrality: &'a CentralityReport,
    pub communities: &'a [Community],
    pub community_count: usize,
}

impl AnalysisReport {
    pub fn analyze(graph: &Graph, config: &AnalysisConfig) -> Self {
        let statistics = GraphStatistics::compute(graph);
        let centrality = analyze_centrality(graph, &config.centrality);
        let communities = detect_communities(graph);

        info!(
            nodes = statistics.nodes,
            edges = statistics.edges,
            rankings = centrality.len(),
            communities = communities.len(),
            "graph analysis complete"
        );

        Self {
            statistics,
            centrality,
            communities,
            community_limit: config.report_community_limit,
        }
    }

    pub fn document(&self) -> AnalysisDocument<'_> {
        AnalysisDocument {
            statistics: &self.statistics,
            centrality: &self.centrality,
            communities: &self.communities,
            community_count: self.communities.len(),
        }
    }

    /// Human-oriented multi-section report
    pub fn render_text(&self) -> String {
        self.to_string()
    }

    /// Write the export document as pretty-printed JSON
    pub fn write_export(&self, path: &Path) -> anyhow::Result<()> {
        write_export(self, path)
    }
}

fn render_ranking(f: &mut fmt::Formatter<'_>, title: &str, ranking: &Ranking) -> fmt::Result {
    writeln!(f, "\n{title}")?;
    for (i, (node, score)) in ranking.iter().enumerate() {
        writeln!(f, "  {}. {}: {:.4}", i + 1, node, score)?;
    }
    Ok(())
}

/// The text report
///
/// An empty graph prints the overview and an empty-graph notice only.
impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(RULE_WIDTH);
        let stats = &self.statistics;

        writeln!(f, "\n{rule}")?;
        writeln!(f, "KNOWLEDGE GRAPH ANALYSIS REPORT")?;
        writeln!(f, "{rule}")?;

        writeln!(f, "\n📊 Basic Statistics:")?;
        writeln!(f, "  Nodes: {}", stats.nodes)?;
        writeln!(f, "  Edges: {}", stats.edges)?;
        writeln!(f, "  Density: {:.4}", stats.density)?;
        writeln!(f, "  Weakly Connected: {}", stats.is_connected)?;

        if stats.nodes == 0 {
            return writeln!(f, "\n⚠️  Graph is empty");
        }

        if let Some(ranking) = self.centrality.get(CentralityKind::Degree) {
            render_ranking(f, "🎯 Top 10 Nodes by Degree Centrality:", ranking)?;
        }
        if let Some(ranking) = self.centrality.get(CentralityKind::PageRank) {
            render_ranking(f, "📈 Top 10 Nodes by PageRank:", ranking)?;
        }

        if !self.communities.is_empty() {
            writeln!(f, "\n🔗 Community Detection:")?;
            writeln!(f, "  Found {} communities", self.communities.len())?;
            for (i, community) in self.communities.iter().take(self.community_limit).enumerate() {
                writeln!(f, "  Community {}: {} nodes", i + 1, community.len())?;
            }
        }

        writeln!(f, "\n{rule}")
    }
}

/// Write the export document to `path`
pub fn write_export(report: &AnalysisReport, path: &Path) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create export file {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &report.document())
        .with_context(|| format!("failed to serialize analysis to {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("failed to write export file {}", path.display()))?;

    info!(path = %path.display(), "analysis exported");
    Ok(())
}
