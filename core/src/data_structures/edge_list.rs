//! Edge-list text format
//!
//! One edge per line: `start_node end_node capacity`, whitespace separated,
//! no header and no edge-count prefix. Blank lines are skipped.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::algorithm::traits::{FlowError, NodeId};
use crate::data_structures::capacity_matrix::{is_valid_capacity, Capacity};

/// Directed edge with its capacity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge<C> {
    pub from: NodeId,
    pub to: NodeId,
    pub capacity: C,
}

/// Parses an edge-list description
pub fn parse_edge_list<C: Capacity>(text: &str) -> Result<Vec<Edge<C>>, FlowError> {
    let mut edges = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let fields: Vec<&str> = raw.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        if fields.len() != 3 {
            return Err(FlowError::MalformedEdge {
                line,
                reason: format!("expected 3 fields, found {}", fields.len()),
            });
        }

        let from = parse_node(fields[0], line)?;
        let to = parse_node(fields[1], line)?;
        let capacity: C = fields[2].parse().map_err(|_| FlowError::MalformedEdge {
            line,
            reason: format!("invalid capacity '{}'", fields[2]),
        })?;
        if !is_valid_capacity(capacity) {
            return Err(FlowError::NegativeCapacity {
                from,
                to,
                capacity: fields[2].to_string(),
            });
        }

        edges.push(Edge { from, to, capacity });
    }

    debug!("parsed {} edges", edges.len());
    Ok(edges)
}

fn parse_node(field: &str, line: usize) -> Result<NodeId, FlowError> {
    field.parse().map_err(|_| FlowError::MalformedEdge {
        line,
        reason: format!("invalid node index '{field}'"),
    })
}

/// Reads and parses an edge-list file
pub fn read_edge_list<C: Capacity>(path: impl AsRef<Path>) -> Result<Vec<Edge<C>>, FlowError> {
    let text = fs::read_to_string(path.as_ref())?;
    parse_edge_list(&text)
}

/// Smallest node count that contains every referenced node
pub fn infer_node_count<C>(edges: &[Edge<C>]) -> usize {
    edges
        .iter()
        .map(|edge| edge.from.max(edge.to) + 1)
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structures::capacity_matrix::CapacityMatrix;

    #[test]
    fn test_parse_simple_list() {
        let edges: Vec<Edge<i64>> = parse_edge_list("0 1 3\n0 2 2\n\n1 2 5\n").unwrap();
        assert_eq!(edges.len(), 3);
        assert_eq!(edges[2], Edge { from: 1, to: 2, capacity: 5 });
        assert_eq!(infer_node_count(&edges), 3);
    }

    #[test]
    fn test_tabs_and_extra_spaces() {
        let edges: Vec<Edge<f64>> = parse_edge_list("  0\t1   2.5  ").unwrap();
        assert_eq!(edges, vec![Edge { from: 0, to: 1, capacity: 2.5 }]);
    }

    #[test]
    fn test_wrong_field_count() {
        let err = parse_edge_list::<i64>("0 1 3\n0 1\n").unwrap_err();
        assert!(matches!(err, FlowError::MalformedEdge { line: 2, .. }));
    }

    #[test]
    fn test_invalid_numbers() {
        assert!(matches!(
            parse_edge_list::<i64>("a 1 3").unwrap_err(),
            FlowError::MalformedEdge { line: 1, .. }
        ));
        assert!(matches!(
            parse_edge_list::<i64>("-1 1 3").unwrap_err(),
            FlowError::MalformedEdge { line: 1, .. }
        ));
        assert!(matches!(
            parse_edge_list::<i64>("0 1 x").unwrap_err(),
            FlowError::MalformedEdge { line: 1, .. }
        ));
    }

    #[test]
    fn test_negative_capacity() {
        let err = parse_edge_list::<i64>("0 1 -4").unwrap_err();
        assert!(matches!(err, FlowError::NegativeCapacity { from: 0, to: 1, .. }));
    }

    #[test]
    fn test_matrix_from_edge_list() {
        let matrix = CapacityMatrix::<i64>::from_edge_list("0 1 3\n1 2 4", 3).unwrap();
        assert_eq!(matrix.get(0, 1), 3);
        assert_eq!(matrix.get(1, 2), 4);

        let err = CapacityMatrix::<i64>::from_edge_list("0 5 3", 3).unwrap_err();
        assert!(matches!(err, FlowError::NodeOutOfRange { node: 5, nodes: 3 }));
    }

    #[test]
    fn test_read_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.txt");
        fs::write(&path, "0 1 7\n").unwrap();

        let edges: Vec<Edge<i64>> = read_edge_list(&path).unwrap();
        assert_eq!(edges, vec![Edge { from: 0, to: 1, capacity: 7 }]);

        let missing = read_edge_list::<i64>(dir.path().join("missing.txt")).unwrap_err();
        assert!(matches!(missing, FlowError::Io(_)));
    }
}
