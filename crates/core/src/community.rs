//! Community detection by greedy modularity maximisation
//!
//! Works on the undirected projection of the graph: `u — v` exists when
//! either `u → v` or `v → u` does. Starting from singleton communities,
//! the pair whose merge raises modularity the most is merged until no
//! merge raises it (Clauset, Newman & Moore).

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::debug;

use crate::graph::Graph;

/// Node keys of one community, in insertion order
pub type Community = Vec<String>;

/// Merges below this gain are treated as rounding noise
const MIN_GAIN: f64 = 1e-12;

/// Inputs that cannot be partitioned
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommunityError {
    #[error("graph has no nodes")]
    EmptyGraph,
}

/// Undirected degrees (self-loops count twice) and the undirected edge count
fn undirected_degrees(neighbors: &[Vec<usize>]) -> (Vec<usize>, usize) {
    let mut degrees = vec![0; neighbors.len()];
    let mut ends = 0;
    for (u, ns) in neighbors.iter().enumerate() {
        for &v in ns {
            let d = if u == v { 2 } else { 1 };
            degrees[u] += d;
            ends += d;
        }
    }
    (degrees, ends / 2)
}

/// Partition the graph into communities
///
/// Communities are ordered by size, largest first; equal sizes keep the
/// order of their earliest member. Without edges no merge can raise
/// modularity, so every node stays a singleton.
pub fn greedy_modularity_communities(graph: &Graph) -> Result<Vec<Community>, CommunityError> {
    if graph.is_empty() {
        return Err(CommunityError::EmptyGraph);
    }

    let neighbors = graph.adjacency().undirected();
    let n = neighbors.len();
    let (degrees, m) = undirected_degrees(&neighbors);
    if m == 0 {
        return Ok((0..n).map(|v| vec![graph.key_at(v).to_string()]).collect());
    }
    let two_m = 2.0 * m as f64;

    // a[i]: fraction of edge ends in community i
    // e[i][j]: fraction of edge ends linking i to j (i != j), symmetric
    let mut a: Vec<f64> = degrees.iter().map(|&k| k as f64 / two_m).collect();
    let mut e: Vec<BTreeMap<usize, f64>> = vec![BTreeMap::new(); n];
    for (u, ns) in neighbors.iter().enumerate() {
        for &v in ns {
            if u != v {
                e[u].insert(v, 1.0 / two_m);
            }
        }
    }
    let mut members: Vec<Vec<usize>> = (0..n).map(|v| vec![v]).collect();
    let mut alive = vec![true; n];
    let mut merges = 0;

    loop {
        let mut best: Option<(f64, usize, usize)> = None;
        for i in (0..n).filter(|&i| alive[i]) {
            for (&j, &e_ij) in e[i].range(i + 1..) {
                let gain = 2.0 * (e_ij - a[i] * a[j]);
                if best.map_or(true, |(g, _, _)| gain > g) {
                    best = Some((gain, i, j));
                }
            }
        }

        let (i, j) = match best {
            Some((gain, i, j)) if gain > MIN_GAIN => (i, j),
            _ => break,
        };

        // Fold j into i
        let row = std::mem::take(&mut e[j]);
        for (k, w) in row {
            if k == i {
                continue;
            }
            e[k].remove(&j);
            *e[k].entry(i).or_insert(0.0) += w;
            *e[i].entry(k).or_insert(0.0) += w;
        }
        e[i].remove(&j);
        a[i] += a[j];
        a[j] = 0.0;
        let moved = std::mem::take(&mut members[j]);
        members[i].extend(moved);
        alive[j] = false;
        merges += 1;
    }

    let mut communities: Vec<Vec<usize>> = (0..n)
        .filter(|&i| alive[i])
        .map(|i| {
            let mut group = std::mem::take(&mut members[i]);
            group.sort_unstable();
            group
        })
        .collect();
    communities.sort_by_key(|c| c[0]);
    communities.sort_by(|x, y| y.len().cmp(&x.len()));

    debug!(merges, communities = communities.len(), "greedy modularity finished");

    Ok(communities
        .into_iter()
        .map(|group| group.into_iter().map(|v| graph.key_at(v).to_string()).collect())
        .collect())
}

/// Communities of the graph, or an empty list for a graph without nodes
pub fn detect_communities(graph: &Graph) -> Vec<Community> {
    match greedy_modularity_communities(graph) {
        Ok(communities) => communities,
        Err(err) => {
            debug!(error = %err, "community detection produced no result");
            Vec::new()
        }
    }
}

/// Modularity of a partition over the undirected projection
///
/// Keys that are not in the graph are ignored. Returns 0 for a graph
/// without edges.
pub fn modularity(graph: &Graph, communities: &[Community]) -> f64 {
    let neighbors = graph.adjacency().undirected();
    let (degrees, m) = undirected_degrees(&neighbors);
    if m == 0 {
        return 0.0;
    }
    let m = m as f64;

    let mut label = vec![usize::MAX; neighbors.len()];
    for (c, community) in communities.iter().enumerate() {
        for key in community {
            if let Some(pos) = graph.position(key) {
                label[pos] = c;
            }
        }
    }

    let mut internal = vec![0.0; communities.len()];
    let mut degree_sum = vec![0.0; communities.len()];
    for (u, ns) in neighbors.iter().enumerate() {
        let c = label[u];
        if c == usize::MAX {
            continue;
        }
        degree_sum[c] += degrees[u] as f64;
        for &v in ns {
            // Each undirected edge appears on both sides except self-loops
            if label[v] == c {
                internal[c] += if u == v { 1.0 } else { 0.5 };
            }
        }
    }

    internal
        .iter()
        .zip(&degree_sum)
        .map(|(l, d)| l / m - (d / (2.0 * m)).powi(2))
        .sum()
}
