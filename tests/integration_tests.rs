// Black-box integration tests: only the public `layout_core` API surface
// (`Graph`, `layout`, `config::presets`) is exercised here, mirroring the
// teacher's top-level `tests/` directory of compiler-level integration
// tests run against its public `EDSLCompiler` entry point.

use layout_core::config::presets;
use layout_core::ir::{EdgePath, NodeKind};
use layout_core::{layout, Graph, LayoutCoreError};

#[test]
fn sugiyama_standard_lays_out_a_chain() {
    let mut g = Graph::new();
    g.add_node(1, "A", 10).unwrap();
    g.add_node(2, "B", 10).unwrap();
    g.add_node(3, "C", 10).unwrap();
    g.add_edge(1, 2, true, None).unwrap();
    g.add_edge(2, 3, true, None).unwrap();

    let (config, reqs) = presets::sugiyama_standard();
    let ir = layout(&g, &config, reqs).expect("chain should lay out");

    assert_eq!(ir.nodes.len(), 3);
    assert_eq!(ir.edges.len(), 2);
    assert_eq!(ir.level_count, 3);
    assert!(ir.node_by_id(1).unwrap().y < ir.node_by_id(3).unwrap().y);
}

#[test]
fn sugiyama_quality_splits_a_skip_level_edge_through_a_dummy() {
    let mut g = Graph::new();
    g.add_node(1, "A", 10).unwrap();
    g.add_node(2, "B", 10).unwrap();
    g.add_node(3, "C", 10).unwrap();
    g.add_edge(1, 2, true, None).unwrap();
    g.add_edge(2, 3, true, None).unwrap();
    g.add_edge(1, 3, true, None).unwrap();

    let (config, reqs) = presets::sugiyama_quality();
    let ir = layout(&g, &config, reqs).expect("skip-level edge should lay out");

    let dummy_count = ir
        .nodes
        .iter()
        .filter(|n| matches!(n.kind, NodeKind::Dummy))
        .count();
    assert_eq!(dummy_count, 1);

    let skip_pieces = ir
        .edges
        .iter()
        .filter(|e| e.from_id == 1 && e.to_id == 3)
        .count();
    assert_eq!(skip_pieces, 2);
}

#[test]
fn cyclic_graph_is_rejected_through_the_public_entry_point() {
    let mut g = Graph::new();
    g.add_node(1, "A", 10).unwrap();
    g.add_node(2, "B", 10).unwrap();
    g.add_edge(1, 2, true, None).unwrap();
    g.add_edge(2, 1, true, None).unwrap();

    let (config, reqs) = presets::sugiyama_standard();
    let err = layout(&g, &config, reqs).unwrap_err();
    assert!(matches!(err, LayoutCoreError::CycleDetected));
    assert_eq!(err.code(), "E.Graph.Dag.003");
}

#[test]
fn force_directed_ring_is_deterministic_across_separate_layout_calls() {
    let mut g = Graph::new();
    for i in 1..=5u64 {
        g.add_node(i, format!("n{i}"), 1).unwrap();
    }
    g.add_edge(1, 2, false, None).unwrap();
    g.add_edge(2, 3, false, None).unwrap();
    g.add_edge(3, 4, false, None).unwrap();
    g.add_edge(4, 5, false, None).unwrap();
    g.add_edge(5, 1, false, None).unwrap();

    let (config, reqs) = presets::fdg_standard();
    let a = layout(&g, &config, reqs).unwrap();
    let b = layout(&g, &config, reqs).unwrap();

    assert_eq!(serde_json::to_string(&a).unwrap(), serde_json::to_string(&b).unwrap());
    assert!(a.edges.iter().all(|e| !e.directed));
}

#[test]
fn spline_routing_is_reachable_through_the_quality_preset() {
    let mut g = Graph::new();
    g.add_node(1, "A", 10).unwrap();
    g.add_node(2, "B", 10).unwrap();
    g.add_node(3, "C", 10).unwrap();
    g.add_edge(1, 2, true, None).unwrap();
    g.add_edge(2, 3, true, None).unwrap();

    let (config, reqs) = presets::sugiyama_quality();
    let ir = layout(&g, &config, reqs).unwrap();
    assert!(ir
        .edges
        .iter()
        .all(|e| matches!(e.path, EdgePath::Spline { .. })));
}

#[test]
fn disconnected_graph_succeeds_under_standard_preset_but_fails_under_a_connectivity_requirement() {
    let mut g = Graph::new();
    g.add_node(1, "a", 10).unwrap();
    g.add_node(2, "b", 10).unwrap();
    g.add_node(3, "c", 10).unwrap();
    g.add_edge(1, 2, true, None).unwrap();

    let (config, reqs) = presets::sugiyama_standard();
    assert!(layout(&g, &config, reqs).is_ok());

    let mut strict_reqs = reqs;
    strict_reqs.requires_connected = true;
    let err = layout(&g, &config, strict_reqs).unwrap_err();
    assert_eq!(err.code(), "E.Graph.Component.003");
}

#[test]
fn resource_caps_are_enforced_before_insertion() {
    let mut g = Graph::with_caps(2, 10);
    g.add_node(1, "a", 10).unwrap();
    g.add_node(2, "b", 10).unwrap();
    let err = g.add_node(3, "c", 10).unwrap_err();
    assert_eq!(err.code(), "E.Graph.Node.026");
}
