//! Bounded shortest-path queries
//!
//! Paths follow edge direction and are measured in hops. Unknown endpoints
//! and unreachable targets are ordinary outcomes and yield no paths.

use std::collections::VecDeque;

use crate::graph::{Adjacency, Graph};

/// BFS from `source` that stops once the level containing `target` is done
///
/// Returns hop distances and, for every reached node, its predecessors on
/// shortest paths in discovery order.
fn shortest_path_dag(
    adj: &Adjacency,
    source: usize,
    target: usize,
) -> (Vec<Option<usize>>, Vec<Vec<usize>>) {
    let n = adj.len();
    let mut dist: Vec<Option<usize>> = vec![None; n];
    let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut queue = VecDeque::new();

    dist[source] = Some(0);
    queue.push_back(source);

    while let Some(v) = queue.pop_front() {
        let dv = dist[v].unwrap_or(0);
        if matches!(dist[target], Some(dt) if dv >= dt) {
            break;
        }
        for &w in &adj.outgoing[v] {
            match dist[w] {
                None => {
                    dist[w] = Some(dv + 1);
                    preds[w].push(v);
                    queue.push_back(w);
                }
                Some(dw) if dw == dv + 1 => preds[w].push(v),
                Some(_) => {}
            }
        }
    }

    (dist, preds)
}

/// Up to `k` shortest directed paths from `source` to `target`
///
/// Each path lists node keys from `source` to `target` inclusive, and all
/// returned paths have the same minimal length. Enumeration stops after
/// `k` paths.
pub fn find_paths(graph: &Graph, source: &str, target: &str, k: usize) -> Vec<Vec<String>> {
    let (s, t) = match (graph.position(source), graph.position(target)) {
        (Some(s), Some(t)) if k > 0 => (s, t),
        _ => return Vec::new(),
    };

    let adj = graph.adjacency();
    let (dist, preds) = shortest_path_dag(&adj, s, t);
    if dist[t].is_none() {
        return Vec::new();
    }

    // Walk predecessor lists back from the target; the stack holds
    // (node, next predecessor to try) and spells a path in reverse.
    let mut paths = Vec::new();
    let mut stack: Vec<(usize, usize)> = vec![(t, 0)];
    while let Some(top) = stack.last_mut() {
        let (node, next) = *top;
        if node == s {
            paths.push(
                stack
                    .iter()
                    .rev()
                    .map(|&(v, _)| graph.key_at(v).to_string())
                    .collect(),
            );
            if paths.len() == k {
                break;
            }
            stack.pop();
            continue;
        }
        match preds[node].get(next) {
            Some(&p) => {
                top.1 += 1;
                stack.push((p, 0));
            }
            None => {
                stack.pop();
            }
        }
    }

    paths
}

/// Directed hop distance from `source` to `target`, if reachable
pub fn shortest_path_length(graph: &Graph, source: &str, target: &str) -> Option<usize> {
    let s = graph.position(source)?;
    let t = graph.position(target)?;
    let (dist, _) = shortest_path_dag(&graph.adjacency(), s, t);
    dist[t]
}
