//! Node centrality rankings
//!
//! Every score function returns a `Vec<f64>` indexed by node position
//! (insertion order). [`top_k`] turns such a vector into a ranking with a
//! stable sort, so equal scores keep insertion order.
//!
//! - **Degree**: `(in + out) / (n - 1)`, zero for graphs with fewer than two nodes
//! - **In/out degree**: raw edge counts
//! - **Betweenness**: Brandes accumulation over directed BFS, skipped on large graphs
//! - **PageRank**: power iteration, omitted when it does not converge

use serde::ser::{Serialize, SerializeMap, Serializer};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{CentralityConfig, PageRankConfig};
use crate::graph::{Adjacency, Graph};

/// Ordered `(node key, score)` pairs, best first
pub type Ranking = Vec<(String, f64)>;

/// The kinds of ranking the engine can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CentralityKind {
    Degree,
    InDegree,
    OutDegree,
    Betweenness,
    PageRank,
}

impl CentralityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CentralityKind::Degree => "degree",
            CentralityKind::InDegree => "in_degree",
            CentralityKind::OutDegree => "out_degree",
            CentralityKind::Betweenness => "betweenness",
            CentralityKind::PageRank => "pagerank",
        }
    }
}

impl std::fmt::Display for CentralityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why PageRank produced no scores
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PageRankError {
    #[error("pagerank did not converge within {iterations} iterations")]
    NotConverged { iterations: usize },

    #[error("pagerank produced a non-finite score")]
    NonFinite,

    #[error("pagerank damping factor {0} is outside [0, 1]")]
    InvalidDamping(f64),
}

/// Rankings that were computed for one graph, in a fixed kind order
///
/// Missing kinds were skipped (betweenness on large graphs) or failed
/// (PageRank that did not converge).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CentralityReport {
    rankings: Vec<(CentralityKind, Ranking)>,
}

impl CentralityReport {
    pub fn get(&self, kind: CentralityKind) -> Option<&Ranking> {
        self.rankings
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, ranking)| ranking)
    }

    pub fn contains(&self, kind: CentralityKind) -> bool {
        self.get(kind).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.rankings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rankings.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CentralityKind, &Ranking)> {
        self.rankings.iter().map(|(k, r)| (*k, r))
    }

    fn push(&mut self, kind: CentralityKind, ranking: Ranking) {
        self.rankings.push((kind, ranking));
    }
}

/// Serialized as `{ "degree": [["node", score], ...], ... }`
impl Serialize for CentralityReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.rankings.len()))?;
        for (kind, ranking) in &self.rankings {
            map.serialize_entry(kind.as_str(), ranking)?;
        }
        map.end()
    }
}

/// Compute every ranking the configuration allows
///
/// An empty graph yields an empty report.
pub fn analyze_centrality(graph: &Graph, config: &CentralityConfig) -> CentralityReport {
    let mut report = CentralityReport::default();
    if graph.is_empty() {
        return report;
    }

    let adj = graph.adjacency();
    let k = config.top_k;

    report.push(CentralityKind::Degree, top_k(graph, &degree_centrality(&adj), k));
    report.push(CentralityKind::InDegree, top_k(graph, &in_degrees(&adj), k));
    report.push(CentralityKind::OutDegree, top_k(graph, &out_degrees(&adj), k));

    if graph.node_count() < config.betweenness_node_limit {
        report.push(
            CentralityKind::Betweenness,
            top_k(graph, &betweenness_centrality(&adj), k),
        );
    } else {
        debug!(
            nodes = graph.node_count(),
            limit = config.betweenness_node_limit,
            "skipping betweenness centrality"
        );
    }

    match pagerank(&adj, &config.pagerank) {
        Ok(scores) => report.push(CentralityKind::PageRank, top_k(graph, &scores, k)),
        Err(err) => warn!(error = %err, "pagerank omitted from centrality report"),
    }

    report
}

/// Rank positions by score, highest first, keeping insertion order among ties
pub fn top_k(graph: &Graph, scores: &[f64], k: usize) -> Ranking {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    // `sort_by` is stable: equal scores stay in insertion order.
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
    order
        .into_iter()
        .take(k)
        .map(|i| (graph.key_at(i).to_string(), scores[i]))
        .collect()
}

/// Total degree normalised by the maximum possible degree `n - 1`
pub fn degree_centrality(adj: &Adjacency) -> Vec<f64> {
    let n = adj.len();
    if n < 2 {
        return vec![0.0; n];
    }
    let scale = 1.0 / (n - 1) as f64;
    (0..n)
        .map(|v| (adj.incoming[v].len() + adj.outgoing[v].len()) as f64 * scale)
        .collect()
}

pub fn in_degrees(adj: &Adjacency) -> Vec<f64> {
    adj.incoming.iter().map(|preds| preds.len() as f64).collect()
}

pub fn out_degrees(adj: &Adjacency) -> Vec<f64> {
    adj.outgoing.iter().map(|succs| succs.len() as f64).collect()
}

/// Shortest-path betweenness for a directed, unweighted graph
///
/// Endpoints are excluded. Scores are normalised by `1 / ((n-1)(n-2))`
/// when `n > 2`.
pub fn betweenness_centrality(adj: &Adjacency) -> Vec<f64> {
    let n = adj.len();
    let mut betweenness = vec![0.0; n];

    let mut stack = Vec::with_capacity(n);
    let mut queue = std::collections::VecDeque::with_capacity(n);
    let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut sigma = vec![0.0_f64; n];
    let mut dist: Vec<Option<usize>> = vec![None; n];
    let mut delta = vec![0.0_f64; n];

    for s in 0..n {
        stack.clear();
        for v in 0..n {
            preds[v].clear();
            sigma[v] = 0.0;
            dist[v] = None;
            delta[v] = 0.0;
        }
        sigma[s] = 1.0;
        dist[s] = Some(0);
        queue.push_back(s);

        while let Some(v) = queue.pop_front() {
            stack.push(v);
            let dv = dist[v].unwrap_or(0);
            for &w in &adj.outgoing[v] {
                if dist[w].is_none() {
                    dist[w] = Some(dv + 1);
                    queue.push_back(w);
                }
                if dist[w] == Some(dv + 1) {
                    sigma[w] += sigma[v];
                    preds[w].push(v);
                }
            }
        }

        while let Some(w) = stack.pop() {
            for &v in &preds[w] {
                delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
            }
            if w != s {
                betweenness[w] += delta[w];
            }
        }
    }

    if n > 2 {
        let scale = 1.0 / ((n - 1) * (n - 2)) as f64;
        for score in &mut betweenness {
            *score *= scale;
        }
    }
    betweenness
}

/// PageRank by power iteration
///
/// Teleportation is uniform and the mass of dangling nodes is spread
/// uniformly. Converges once the L1 change between iterations drops below
/// `n * tolerance`.
pub fn pagerank(adj: &Adjacency, config: &PageRankConfig) -> Result<Vec<f64>, PageRankError> {
    let n = adj.len();
    if n == 0 {
        return Ok(Vec::new());
    }
    let alpha = config.damping;
    if !(0.0..=1.0).contains(&alpha) {
        return Err(PageRankError::InvalidDamping(alpha));
    }

    let uniform = 1.0 / n as f64;
    let dangling: Vec<usize> = (0..n).filter(|&v| adj.outgoing[v].is_empty()).collect();
    let mut scores = vec![uniform; n];
    let mut next = vec![0.0; n];

    for iteration in 1..=config.max_iterations {
        let dangling_sum: f64 = alpha * dangling.iter().map(|&v| scores[v]).sum::<f64>();
        let base = (dangling_sum + (1.0 - alpha)) * uniform;
        next.iter_mut().for_each(|s| *s = base);

        for (v, succs) in adj.outgoing.iter().enumerate() {
            if succs.is_empty() {
                continue;
            }
            let share = alpha * scores[v] / succs.len() as f64;
            for &w in succs {
                next[w] += share;
            }
        }

        if next.iter().any(|s| !s.is_finite()) {
            return Err(PageRankError::NonFinite);
        }

        let err: f64 = scores.iter().zip(&next).map(|(a, b)| (a - b).abs()).sum();
        std::mem::swap(&mut scores, &mut next);

        if err < n as f64 * config.tolerance {
            debug!(iteration, "pagerank converged");
            return Ok(scores);
        }
    }

    Err(PageRankError::NotConverged {
        iterations: config.max_iterations,
    })
}
