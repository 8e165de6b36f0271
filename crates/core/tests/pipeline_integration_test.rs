//! Integration test for the full analysis pipeline
//!
//! Uses the fixture at `tests/test-fixtures/export.json`: two triangles of
//! colleagues joined by `carol → dave`, a duplicate `alice → bob` edge and
//! an edge to `grace`, who is never declared as a node.

use graph_analyzer_core::centrality::CentralityKind;
use graph_analyzer_core::community::modularity;
use graph_analyzer_core::paths::shortest_path_length;
use graph_analyzer_core::{find_paths, AnalysisConfig, AnalysisReport, ExportPayload, Graph};
use std::collections::HashSet;
use std::path::Path;

fn load_fixture() -> Graph {
    let fixture_path = Path::new("tests/test-fixtures/export.json");
    assert!(fixture_path.exists(), "Fixture file should exist");

    let bytes = std::fs::read(fixture_path).unwrap();
    let payload = ExportPayload::from_slice(&bytes).unwrap();
    Graph::from_payload(&payload).unwrap()
}

#[test]
fn test_integration_graph_construction() {
    let graph = load_fixture();

    // 6 declared + grace from the last-but-one edge
    assert_eq!(graph.node_count(), 7);
    // The duplicate alice → bob edge replaces the first one
    assert_eq!(graph.edge_count(), 8);
    assert_eq!(
        graph.edge("alice", "bob").unwrap().label.as_deref(),
        Some("pairs_with")
    );

    let grace = graph.node("grace").expect("implicit node should exist");
    assert!(grace.props.is_empty());
    assert_eq!(
        graph.node("alice").unwrap().props.get("team"),
        Some(&serde_json::json!("graph"))
    );
}

#[test]
fn test_integration_report() {
    let graph = load_fixture();
    let report = AnalysisReport::analyze(&graph, &AnalysisConfig::default());

    assert_eq!(report.statistics.nodes, 7);
    assert!((report.statistics.density - 8.0 / 42.0).abs() < 1e-12);
    assert!(report.statistics.is_connected);

    for kind in [
        CentralityKind::Degree,
        CentralityKind::InDegree,
        CentralityKind::OutDegree,
        CentralityKind::Betweenness,
        CentralityKind::PageRank,
    ] {
        assert!(report.centrality.contains(kind), "missing {kind}");
    }

    // carol and dave carry every path between the two triangles
    let betweenness = report.centrality.get(CentralityKind::Betweenness).unwrap();
    let top_two: HashSet<&str> = betweenness.iter().take(2).map(|(n, _)| n.as_str()).collect();
    assert_eq!(top_two, HashSet::from(["carol", "dave"]));

    assert_eq!(
        report.communities,
        vec![
            vec!["dave", "erin", "frank", "grace"],
            vec!["alice", "bob", "carol"],
        ]
    );
    assert!(modularity(&graph, &report.communities) > 0.0);

    let text = report.render_text();
    assert!(text.contains("Found 2 communities"));
    assert!(text.contains("Community 1: 4 nodes"));
}

#[test]
fn test_integration_paths() {
    let graph = load_fixture();

    assert_eq!(
        find_paths(&graph, "alice", "erin", 5),
        vec![vec!["alice", "bob", "carol", "dave", "erin"]]
    );
    assert_eq!(shortest_path_length(&graph, "alice", "grace"), Some(6));
    assert!(find_paths(&graph, "grace", "alice", 5).is_empty());
}

#[test]
fn test_integration_export_roundtrip() {
    let graph = load_fixture();
    let report = AnalysisReport::analyze(&graph, &AnalysisConfig::default());

    let temp_dir = tempfile::TempDir::new().unwrap();
    let path = temp_dir.path().join("graph_analysis.json");
    report.write_export(&path).unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec!["statistics", "centrality", "communities", "community_count"]
    );
    assert_eq!(value["community_count"], 2);

    let pagerank = value["centrality"]["pagerank"].as_array().unwrap();
    assert!(pagerank.len() <= 10);
}
