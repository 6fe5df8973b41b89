//! End-to-end scenarios built from edge-list descriptions
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use labelflow_core::{
    parse_edge_list, CapacityMatrix, Direction, FlowError, MaxFlowAlgorithm, MaxFlowSolver, StepKind,
    StepRecorder,
};

const FIVE_NODES: &str = "\
0 1 3
0 2 2
1 3 2
1 4 1
2 3 1
3 4 3
";

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn five_node_network() {
    init_logging();
    let network = CapacityMatrix::<i64>::from_edge_list(FIVE_NODES, 5).unwrap();

    for algorithm in MaxFlowAlgorithm::ALL {
        let result = MaxFlowSolver::new(algorithm)
            .with_verification(true)
            .solve(&network)
            .unwrap();
        assert_eq!(result.max_flow, 4, "{algorithm}");
        assert_eq!(result.min_cut, vec![0, 2], "{algorithm}");
        assert_eq!(result.min_cut_capacity, 4);
    }
}

#[test]
fn five_node_labeling_uses_a_backward_arc() {
    init_logging();
    let network = CapacityMatrix::<i64>::from_edge_list(FIVE_NODES, 5).unwrap();
    let result = MaxFlowSolver::default().solve(&network).unwrap();

    assert_eq!(result.path_weights, vec![2, 1, 1]);
    assert!(result
        .paths
        .iter()
        .flat_map(|path| path.directions.iter())
        .any(|&direction| direction == Direction::Backward));
}

#[test]
fn single_edge() {
    init_logging();
    let network = CapacityMatrix::<i64>::from_edge_list("0 3 7\n", 4).unwrap();
    let result = MaxFlowSolver::default().solve(&network).unwrap();

    assert_eq!(result.max_flow, 7);
    let flows: Vec<_> = result.edge_flows().edges().collect();
    assert_eq!(flows, vec![(0, 3, 7)]);
    assert_eq!(result.net_flow.get(3, 0), -7);
}

#[test]
fn source_without_capacity() {
    init_logging();
    let network = CapacityMatrix::<i64>::from_edge_list("1 2 5\n2 3 5\n", 4).unwrap();
    let result = MaxFlowSolver::default().solve(&network).unwrap();

    assert_eq!(result.max_flow, 0);
    assert_eq!(result.net_flow, CapacityMatrix::new(4));
}

#[test]
fn disconnected_source_and_sink() {
    init_logging();
    let network = CapacityMatrix::<i64>::from_edge_list("0 1 5\n2 3 5\n", 4).unwrap();
    assert_eq!(MaxFlowSolver::default().solve(&network).unwrap().max_flow, 0);
}

#[test]
fn duplicate_edges_overwrite() {
    init_logging();
    let network = CapacityMatrix::<i64>::from_edge_list("0 1 9\n0 1 2\n", 2).unwrap();
    assert_eq!(MaxFlowSolver::default().solve(&network).unwrap().max_flow, 2);
}

#[test]
fn invalid_descriptions_fail_before_solving() {
    init_logging();
    let err = CapacityMatrix::<i64>::from_edge_list("0 7 1\n", 5).unwrap_err();
    assert!(matches!(err, FlowError::NodeOutOfRange { node: 7, nodes: 5 }));
    assert!(err.is_invalid_input());

    let err = parse_edge_list::<i64>("0 1 2\n\n1 2\n").unwrap_err();
    assert!(matches!(err, FlowError::MalformedEdge { line: 3, .. }));

    let err = CapacityMatrix::<i64>::from_edge_list("0 1 -4\n", 2).unwrap_err();
    assert!(matches!(err, FlowError::NegativeCapacity { from: 0, to: 1, .. }));
}

#[test]
fn huge_capacities_report_overflow() {
    init_logging();
    let max = i64::MAX;
    let text = format!("0 1 {max}\n1 0 {max}\n1 2 {max}\n");
    let network = CapacityMatrix::<i64>::from_edge_list(&text, 3).unwrap();
    let err = MaxFlowSolver::default().solve(&network).unwrap_err();
    assert!(matches!(err, FlowError::CapacityOverflow(_)));
}

#[test]
fn float_network_passes_verification() {
    init_logging();
    let text = "0 1 0.1\n0 2 0.1\n1 2 0.1\n2 3 0.7\n1 3 0.2\n";
    let network = CapacityMatrix::<f64>::from_edge_list(text, 4).unwrap();
    for algorithm in MaxFlowAlgorithm::ALL {
        let result = MaxFlowSolver::new(algorithm)
            .with_verification(true)
            .solve(&network)
            .unwrap();
        assert!((result.max_flow - 0.2).abs() < 1e-12, "{algorithm}: {}", result.max_flow);
    }
}

#[test]
fn observer_sees_inspections_and_moves() {
    init_logging();
    let network = CapacityMatrix::<i64>::from_edge_list(FIVE_NODES, 5).unwrap();
    let mut recorder = StepRecorder::<i64>::new();
    let result = MaxFlowSolver::default()
        .solve_with_observer(&network, Some(&mut recorder))
        .unwrap();

    assert_eq!(recorder.len(), result.metrics.steps);
    for snapshot in recorder.snapshots() {
        assert_eq!(snapshot.highlighted, snapshot.marks.highlighted_edges());
        assert!(snapshot.residual.to_rows().iter().flatten().all(|&capacity| capacity >= 0));
        if let StepKind::Advance { to } = snapshot.kind {
            assert_eq!(snapshot.current, to);
            assert!(snapshot.marks.is_marked(to));
        }
    }
    let sink_arrivals = recorder
        .snapshots()
        .iter()
        .filter(|snapshot| snapshot.kind == StepKind::Advance { to: 4 })
        .count();
    assert_eq!(sink_arrivals, result.path_weights.len());
}
